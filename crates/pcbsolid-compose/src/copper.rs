use pcbsolid_geometry::Shape;
use tracing::{debug, info_span};

use crate::builder::ShapeBuilder;
use crate::composer::{Composer, place};
use crate::config::ShapeKind;
use crate::error::{ComposeError, Result};
use crate::holes::HoleFilter;

/// Margin by which a hole tool overshoots the copper it drills.
const DRILL_OVERSHOOT: f64 = 1e-3;

/// Base heights of `count` copper layers, front to back.
///
/// The front layer sits one copper thickness above the board top, the back
/// layer one copper thickness below the board bottom, and inner layers are
/// evenly spaced in between.
#[must_use]
pub fn copper_z_offsets(board_thickness: f64, copper_thickness: f64, count: usize) -> Vec<f64> {
    let top = board_thickness + copper_thickness;
    let step = if count > 1 {
        (top + copper_thickness) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(|i| top - step * i as f64).collect()
}

impl<B: ShapeBuilder> Composer<'_, B> {
    /// Pads, zones and tracks of the current layer as one shape at height `z`.
    ///
    /// Solid layers fuse each compositor's output on its own and keep the
    /// three apart; other kinds fuse the combined layer. With `with_holes`
    /// every kept drill hole is cut out of faces and solids.
    pub fn make_copper(
        &mut self,
        kind: ShapeKind,
        thickness: f64,
        with_holes: bool,
        z: f64,
    ) -> Result<Option<Shape>> {
        let _span = info_span!("copper", layer = %self.layer.name).entered();

        let (fuse, sub_fuse) = match kind {
            ShapeKind::Solid => (false, self.config.fuse),
            _ => (self.config.fuse, false),
        };

        let mut objs = Vec::new();
        if let Some(pads) = self.make_pads(kind, thickness, sub_fuse)? {
            let pads = if kind == ShapeKind::Solid {
                let offset = if self.layer.is_bottom() { -thickness } else { thickness };
                place(pads, [0.0, 0.0, offset], 0.0)
            } else {
                pads
            };
            objs.push(pads);
        }
        objs.extend(self.make_zones(kind, thickness, sub_fuse)?);
        objs.extend(self.make_tracks(kind, thickness, sub_fuse)?);

        let Some(mut copper) = self.make_compound(objs, "copper", None, fuse) else {
            return Ok(None);
        };
        if with_holes && kind != ShapeKind::Path {
            copper = self.drill(copper, kind)?;
        }
        Ok(Some(place(copper, [0.0, 0.0, z], 0.0)))
    }

    fn drill(&mut self, copper: Shape, kind: ShapeKind) -> Result<Shape> {
        let filter = HoleFilter::from_config(self.config);
        let Some(holes) = self.make_holes(ShapeKind::Face, filter, None, false)? else {
            return Ok(copper);
        };
        let tool = match (kind, copper.bounding_box()) {
            (ShapeKind::Solid, Some(bb)) => {
                let height = bb.max[2] - bb.min[2] + 2.0 * DRILL_OVERSHOOT;
                let solid = holes.extrude(height)?;
                place(solid, [0.0, 0.0, bb.min[2] - DRILL_OVERSHOOT], 0.0)
            }
            _ => holes,
        };
        debug!("drilling copper");
        self.make_cut(&copper, &tool, "copper")
    }

    /// Every copper layer of the board, front to back, stacked with
    /// [`copper_z_offsets`]. Layers with nothing on them are skipped. The
    /// current layer is restored afterwards.
    pub fn make_coppers(&mut self, kind: ShapeKind, thickness: f64, with_holes: bool) -> Result<Vec<Shape>> {
        let _span = info_span!("coppers").entered();

        let layers = self.board.copper_layers();
        if layers.is_empty() {
            return Err(ComposeError::NoCopperLayer);
        }
        let offsets = copper_z_offsets(self.board_thickness(), thickness, layers.len());

        let saved = self.layer.clone();
        let build = || -> Result<Vec<Shape>> {
            let mut out = Vec::new();
            for (layer, z) in layers.into_iter().zip(offsets) {
                self.layer = layer;
                out.extend(self.make_copper(kind, thickness, with_holes, z)?);
            }
            Ok(out)
        };
        let result = build();
        self.layer = saved;
        result
    }
}
