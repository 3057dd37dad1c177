use indexmap::IndexMap;
use pcbsolid_core::{Drill, Point};
use pcbsolid_geometry::primitives::{make_circle, make_oval};
use pcbsolid_geometry::{Shape, Wire};
use tracing::{debug, info, info_span};

use crate::builder::ShapeBuilder;
use crate::composer::{Composer, bucket_key, place};
use crate::config::{ComposeConfig, ShapeKind};
use crate::error::Result;

/// Which drill holes to keep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoleFilter {
    pub min_size: f64,
    /// Zero means no upper bound.
    pub max_size: f64,
    pub oval: bool,
}

impl HoleFilter {
    #[must_use]
    pub fn from_config(config: &ComposeConfig) -> Self {
        Self {
            min_size: config.min_hole_size,
            max_size: config.max_hole_size,
            oval: config.oval_holes,
        }
    }

    #[must_use]
    pub fn keeps(&self, diameter: f64) -> bool {
        diameter >= self.min_size && (self.max_size == 0.0 || diameter <= self.max_size)
    }
}

impl Default for HoleFilter {
    fn default() -> Self {
        Self {
            min_size: 0.0,
            max_size: 0.0,
            oval: false,
        }
    }
}

/// Place a pad-local outline on the board. The pad's own angle is used only
/// when its module is unrotated, since rotated modules already carry it.
pub(crate) fn place_pad_outline(
    outline: Wire,
    pad_at: Point,
    pad_angle: f64,
    module_at: Point,
    module_angle: f64,
) -> Wire {
    let mut w = outline;
    if module_angle == 0.0 && pad_angle != 0.0 {
        w = w.rotated(pad_angle);
    }
    w = w.translated(pad_at);
    if module_angle != 0.0 {
        w = w.rotated(module_angle);
    }
    w.translated(module_at)
}

impl<B: ShapeBuilder> Composer<'_, B> {
    /// Drill holes of every pad and via, bucketed by size so equal holes are
    /// composed together.
    ///
    /// Solids default to twice the board thickness starting half a board
    /// below it, so they pierce the board and both outer coppers.
    pub fn make_holes(
        &mut self,
        kind: ShapeKind,
        filter: HoleFilter,
        thickness: Option<f64>,
        fuse: bool,
    ) -> Result<Option<Shape>> {
        let _span = info_span!("holes").entered();

        let mut holes: IndexMap<u64, (f64, Vec<Wire>)> = IndexMap::new();
        let mut ovals: IndexMap<u64, (f64, Vec<Wire>)> = IndexMap::new();

        let (mut count, mut skip_count, mut oval_count) = (0usize, 0usize, 0usize);
        for m in &self.board.module {
            let (m_at, m_angle) = (m.at.position(), m.at.angle);
            for p in &m.pad {
                let Some(drill) = p.drill else {
                    continue;
                };
                let (bucket, size, outline) = match drill {
                    Drill::Oval { oval: [dx, dy] } => {
                        if !filter.oval {
                            continue;
                        }
                        oval_count += 1;
                        (&mut ovals, dx.min(dy), make_oval(dx, dy))
                    }
                    Drill::Round(d) if filter.keeps(d) => {
                        count += 1;
                        (&mut holes, d, make_circle(d))
                    }
                    Drill::Round(_) => {
                        skip_count += 1;
                        continue;
                    }
                };
                let placed = place_pad_outline(outline, p.at.position(), p.at.angle, m_at, m_angle);
                bucket
                    .entry(bucket_key(size))
                    .or_insert_with(|| (size, vec![]))
                    .1
                    .push(placed);
            }
        }
        info!("pad holes: {}, skipped: {}", count + skip_count, skip_count);
        if filter.oval {
            info!("oval holes: {oval_count}");
        }

        let mut via_skip = 0usize;
        for v in &self.board.via {
            if filter.keeps(v.drill) {
                holes
                    .entry(bucket_key(v.drill))
                    .or_insert_with(|| (v.drill, vec![]))
                    .1
                    .push(make_circle(v.drill).translated(Point::from_board(v.at)));
            } else {
                via_skip += 1;
            }
        }
        let vias = self.board.via.len();
        info!("via holes: {vias}, skipped: {via_skip}");
        info!("total holes added: {}", count + oval_count + vias - via_skip);

        let fill = kind != ShapeKind::Path;
        let mut objs = Vec::new();
        for (bucket, name) in [(ovals, "oval"), (holes, "hole")] {
            for (_, (size, wires)) in bucket {
                debug!("{} {name} holes of size {size}", wires.len());
                objs.push(self.make_path(wires, name, fill, Some(&size.to_string()))?);
            }
        }
        if objs.is_empty() {
            return Ok(None);
        }

        if kind == ShapeKind::Solid {
            let (height, z) = match thickness {
                Some(t) => (t, 0.0),
                None => {
                    let t = 2.0 * self.board_thickness();
                    (t, -t * 0.25)
                }
            };
            let solid = self.make_solid(objs, "holes", height, fuse)?;
            return Ok(solid.map(|s| place(s, [0.0, 0.0, z], 0.0)));
        }
        Ok(self.make_compound(objs, "holes", None, fuse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn filter_bounds_are_inclusive() {
        let f = HoleFilter {
            min_size: 0.5,
            max_size: 2.0,
            oval: false,
        };
        assert!(!f.keeps(0.3));
        assert!(f.keeps(0.5));
        assert!(f.keeps(2.0));
        assert!(!f.keeps(2.1));
        assert!(HoleFilter::default().keeps(100.0));
    }

    #[test]
    fn pad_angle_applies_only_to_unrotated_modules() {
        let outline = pcbsolid_geometry::primitives::make_rect(2.0, 1.0);
        let origin = Point::new(0.0, 0.0);

        let turned = place_pad_outline(outline.clone(), origin, 90.0, origin, 0.0);
        let r = pcbsolid_geometry::Region::from_wires(&[turned]).unwrap();
        let (x0, _, x1, _) = r.extents().unwrap();
        assert_abs_diff_eq!(x1 - x0, 1.0, epsilon = 1e-9);

        // The module angle wins; the pad's own 90 degrees are not added on top.
        let turned = place_pad_outline(outline, Point::new(1.0, 0.0), 90.0, origin, 90.0);
        let r = pcbsolid_geometry::Region::from_wires(&[turned]).unwrap();
        let (x0, y0, x1, y1) = r.extents().unwrap();
        assert_abs_diff_eq!(x1 - x0, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!((y0 + y1) / 2.0, 1.0, epsilon = 1e-9);
    }
}
