use pcbsolid_core::Point;
use pcbsolid_geometry::{Shape, Wire};
use tracing::{debug, info, info_span};

use crate::builder::ShapeBuilder;
use crate::composer::Composer;
use crate::config::{ColorRole, ShapeKind};
use crate::error::Result;
use crate::fill_polygon::extract_rings;

impl<B: ShapeBuilder> Composer<'_, B> {
    /// Filled zones of the current layer.
    ///
    /// Stored fills come out thinner than the copper they describe, so each
    /// fill is grown by `zone_fill_correction` times the zone's
    /// `min_thickness`.
    pub fn make_zones(&mut self, kind: ShapeKind, thickness: f64, fuse: bool) -> Result<Option<Shape>> {
        let _span = info_span!("zones", layer = %self.layer.name).entered();

        let fill = kind != ShapeKind::Path;
        let mut objs = Vec::new();
        let board = self.board;
        let layer_name = self.layer.name.clone();
        for z in board.zone.iter().filter(|z| z.layer == layer_name) {
            let _zone = info_span!("zone", net = %z.net_name).entered();
            let mut wires = Vec::new();
            for poly in &z.filled_polygon {
                let pts: Vec<Point> = poly.pts.iter().copied().map(Point::from_board).collect();
                let rings = extract_rings(&pts)?;
                debug!("filled polygon with {} holes", rings.holes.len());
                if rings.outer.is_empty() {
                    continue;
                }
                wires.push(Wire::new(rings.outer));
                wires.extend(rings.holes.into_iter().map(Wire::new));
            }
            if wires.is_empty() {
                continue;
            }
            let delta = self.config.zone_fill_correction * z.min_thickness;
            let label = (!z.net_name.is_empty()).then_some(z.net_name.as_str());
            let shape = if delta > 0.0 {
                self.make_offset(&Shape::path(wires), "zone", delta, fill, true, label)?
            } else {
                self.make_path(wires, "zone", fill, label)?
            };
            objs.push(shape);
        }
        info!("zones: {}", objs.len());
        if objs.is_empty() {
            return Ok(None);
        }

        let out = if kind == ShapeKind::Solid {
            self.make_solid(objs, "zones", thickness, fuse)?
        } else {
            self.make_compound(objs, "zones", None, fuse)
        };
        self.set_color(ColorRole::Zone);
        Ok(out)
    }
}
