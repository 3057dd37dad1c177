use cavalier_contours::polyline::PlineSource;

use crate::offset::{dilate_wire, offset_region};
use crate::{GeometryError, OffsetOptions, Point, Region, Result, Wire};

/// Heights closer than this are the same plane.
const Z_EPS: f64 = 1e-9;

/// Axis-aligned box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    #[must_use]
    pub fn union(self, other: BoundingBox) -> BoundingBox {
        let mut out = self;
        for i in 0..3 {
            out.min[i] = out.min[i].min(other.min[i]);
            out.max[i] = out.max[i].max(other.max[i]);
        }
        out
    }

    #[must_use]
    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// A composed board shape. Faces and paths lie in the plane `z`; solids are
/// faces extruded from `z` up by `height`.
#[derive(Debug, Clone)]
pub enum Shape {
    Path { wires: Vec<Wire>, z: f64 },
    Face { region: Region, z: f64 },
    Solid { region: Region, z: f64, height: f64 },
    Compound(Vec<Shape>),
}

impl Shape {
    #[must_use]
    pub fn path(wires: Vec<Wire>) -> Self {
        Shape::Path { wires, z: 0.0 }
    }

    #[must_use]
    pub fn face(region: Region) -> Self {
        Shape::Face { region, z: 0.0 }
    }

    /// Group shapes without merging them. A single shape is returned as is.
    #[must_use]
    pub fn compound(mut shapes: Vec<Shape>) -> Self {
        if shapes.len() == 1 {
            return shapes.remove(0);
        }
        Shape::Compound(shapes)
    }

    /// Face covering the closed `wires`, nested loops becoming holes.
    pub fn face_from_wires(wires: &[Wire]) -> Result<Self> {
        Ok(Shape::face(Region::from_wires(wires)?))
    }

    /// Every non-compound shape, depth first.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Shape> {
        match self {
            Shape::Compound(items) => items.iter().flat_map(Shape::leaves).collect(),
            other => vec![other],
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves().iter().all(|s| match s {
            Shape::Path { wires, .. } => wires.iter().all(Wire::is_empty),
            Shape::Face { region, .. } | Shape::Solid { region, .. } => region.is_empty(),
            Shape::Compound(_) => true,
        })
    }

    /// Planar area of faces and solid cross sections.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.leaves()
            .iter()
            .map(|s| match s {
                Shape::Face { region, .. } | Shape::Solid { region, .. } => region.area(),
                _ => 0.0,
            })
            .sum()
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        self.leaves()
            .iter()
            .map(|s| match s {
                Shape::Solid { region, height, .. } => region.area() * height,
                _ => 0.0,
            })
            .sum()
    }

    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            Shape::Compound(items) => items
                .iter()
                .filter_map(Shape::bounding_box)
                .reduce(BoundingBox::union),
            Shape::Path { wires, z } => wires
                .iter()
                .filter_map(|w| w.to_polyline().extents())
                .map(|e| BoundingBox {
                    min: [e.min_x, e.min_y, *z],
                    max: [e.max_x, e.max_y, *z],
                })
                .reduce(BoundingBox::union),
            Shape::Face { region, z } => region.extents().map(|(x0, y0, x1, y1)| BoundingBox {
                min: [x0, y0, *z],
                max: [x1, y1, *z],
            }),
            Shape::Solid { region, z, height } => {
                region.extents().map(|(x0, y0, x1, y1)| BoundingBox {
                    min: [x0, y0, *z],
                    max: [x1, y1, z + height],
                })
            }
        }
    }

    #[must_use]
    pub fn translated(&self, by: [f64; 3]) -> Shape {
        let d = Point::new(by[0], by[1]);
        match self {
            Shape::Path { wires, z } => Shape::Path {
                wires: wires.iter().map(|w| w.translated(d)).collect(),
                z: z + by[2],
            },
            Shape::Face { region, z } => Shape::Face {
                region: region.translated(d),
                z: z + by[2],
            },
            Shape::Solid { region, z, height } => Shape::Solid {
                region: region.translated(d),
                z: z + by[2],
                height: *height,
            },
            Shape::Compound(items) => {
                Shape::Compound(items.iter().map(|s| s.translated(by)).collect())
            }
        }
    }

    /// Rotate about the Z axis through the origin.
    #[must_use]
    pub fn rotated_z(&self, angle_deg: f64) -> Shape {
        match self {
            Shape::Path { wires, z } => Shape::Path {
                wires: wires.iter().map(|w| w.rotated(angle_deg)).collect(),
                z: *z,
            },
            Shape::Face { region, z } => Shape::Face {
                region: region.rotated(angle_deg),
                z: *z,
            },
            Shape::Solid { region, z, height } => Shape::Solid {
                region: region.rotated(angle_deg),
                z: *z,
                height: *height,
            },
            Shape::Compound(items) => {
                Shape::Compound(items.iter().map(|s| s.rotated_z(angle_deg)).collect())
            }
        }
    }

    /// Extrude faces along +Z.
    pub fn extrude(&self, height: f64) -> Result<Shape> {
        if !(height.is_finite() && height > 0.0) {
            return Err(GeometryError::Unsupported("extrusion height must be positive"));
        }
        match self {
            Shape::Face { region, z } => Ok(Shape::Solid {
                region: region.clone(),
                z: *z,
                height,
            }),
            Shape::Compound(items) => Ok(Shape::Compound(
                items
                    .iter()
                    .map(|s| s.extrude(height))
                    .collect::<Result<_>>()?,
            )),
            Shape::Path { .. } => Err(GeometryError::Unsupported("extruding an unfilled path")),
            Shape::Solid { .. } => Err(GeometryError::Unsupported("extruding a solid")),
        }
    }

    /// Union overlapping pieces. Faces merge when coplanar, solids when they
    /// share base and height, closed path loops merge into their combined
    /// outline; open path wires are kept as they are. A shape with a single
    /// piece comes back unchanged.
    #[must_use]
    pub fn fuse(&self) -> Shape {
        let leaves = self.leaves();
        if leaves.len() <= 1 {
            return self.clone();
        }

        let mut paths: Vec<(f64, Vec<Wire>)> = Vec::new();
        let mut faces: Vec<(f64, Region)> = Vec::new();
        let mut solids: Vec<((f64, f64), Region)> = Vec::new();

        for leaf in leaves {
            match leaf {
                Shape::Path { wires, z } => match paths.iter_mut().find(|(k, _)| same(*k, *z)) {
                    Some((_, ws)) => ws.extend(wires.iter().cloned()),
                    None => paths.push((*z, wires.clone())),
                },
                Shape::Face { region, z } => match faces.iter_mut().find(|(k, _)| same(*k, *z)) {
                    Some((_, r)) => *r = r.union(region),
                    None => faces.push((*z, region.clone())),
                },
                Shape::Solid { region, z, height } => {
                    match solids
                        .iter_mut()
                        .find(|((kz, kh), _)| same(*kz, *z) && same(*kh, *height))
                    {
                        Some((_, r)) => *r = r.union(region),
                        None => solids.push(((*z, *height), region.clone())),
                    }
                }
                Shape::Compound(_) => {}
            }
        }

        let mut out: Vec<Shape> = Vec::new();
        for (z, wires) in paths {
            let (closed, open): (Vec<Wire>, Vec<Wire>) =
                wires.into_iter().partition(Wire::is_closed);
            let mut merged = match Region::from_wires(&closed) {
                Ok(r) => r.boundaries(),
                Err(_) => closed,
            };
            merged.extend(open);
            out.push(Shape::Path { wires: merged, z });
        }
        for (z, region) in faces {
            out.push(Shape::Face { region, z });
        }
        for ((z, height), region) in solids {
            out.push(Shape::Solid { region, z, height });
        }
        Shape::compound(out)
    }

    /// Offset every piece by `delta`. Closed path loops are grown as the
    /// region they bound; open path wires become round-ended ribbons when
    /// `opts.open_result` is set. Unfilled results come back as paths.
    pub fn offset(&self, delta: f64, opts: &OffsetOptions) -> Result<Shape> {
        let out_as = |region: Region, z: f64| {
            if opts.fill {
                Shape::Face { region, z }
            } else {
                Shape::Path {
                    wires: region.boundaries(),
                    z,
                }
            }
        };
        let shape = match self {
            Shape::Compound(items) => {
                let parts = items
                    .iter()
                    .map(|s| s.offset(delta, opts))
                    .collect::<Result<Vec<_>>>()?;
                let c = Shape::Compound(parts);
                if opts.intersection { c.fuse() } else { c }
            }
            Shape::Face { region, z } => out_as(offset_region(region, delta, opts)?, *z),
            Shape::Solid { region, z, height } => Shape::Solid {
                region: offset_region(region, delta, opts)?,
                z: *z,
                height: *height,
            },
            Shape::Path { wires, z } => {
                let (closed, open): (Vec<Wire>, Vec<Wire>) =
                    wires.iter().cloned().partition(Wire::is_closed);
                let mut region = offset_region(&Region::from_wires(&closed)?, delta, opts)?;
                if opts.open_result {
                    for w in &open {
                        region = region.union(&dilate_wire(w, delta, opts)?);
                    }
                    out_as(region, *z)
                } else {
                    let mut shape = out_as(region, *z);
                    if !open.is_empty() {
                        shape = Shape::Compound(vec![shape, Shape::Path { wires: open, z: *z }]);
                    }
                    shape
                }
            }
        };
        Ok(shape)
    }

    /// Remove `tool` from this shape. A solid tool must span the full height
    /// of a solid it overlaps; tools lying outside a piece leave it alone.
    pub fn cut(&self, tool: &Shape) -> Result<Shape> {
        if let Shape::Compound(tools) = tool {
            return tools.iter().try_fold(self.clone(), |base, t| base.cut(t));
        }
        match self {
            Shape::Compound(items) => Ok(Shape::Compound(
                items.iter().map(|s| s.cut(tool)).collect::<Result<_>>()?,
            )),
            Shape::Path { .. } => Err(GeometryError::Unsupported("cutting a path")),
            Shape::Face { region, z } => {
                let covers = match tool {
                    Shape::Face { z: tz, .. } => same(*tz, *z),
                    Shape::Solid { z: tz, height, .. } => {
                        *tz <= z + Z_EPS && tz + height >= z - Z_EPS
                    }
                    _ => return Err(GeometryError::Unsupported("cutting with a path")),
                };
                let region = match (covers, cutter_region(tool)) {
                    (true, Some(cut)) => region.subtract(cut),
                    _ => region.clone(),
                };
                Ok(Shape::Face { region, z: *z })
            }
            Shape::Solid { region, z, height } => {
                let (lo, hi) = (*z, z + height);
                let (tlo, thi) = match tool {
                    Shape::Solid { z, height, .. } => (*z, z + height),
                    Shape::Face { .. } => return Ok(self.clone()),
                    _ => return Err(GeometryError::Unsupported("cutting with a path")),
                };
                if thi <= lo + Z_EPS || tlo >= hi - Z_EPS {
                    return Ok(self.clone());
                }
                if tlo > lo + Z_EPS || thi < hi - Z_EPS {
                    return Err(GeometryError::Unsupported("partial-depth cut"));
                }
                let region = match cutter_region(tool) {
                    Some(cut) => region.subtract(cut),
                    None => region.clone(),
                };
                Ok(Shape::Solid {
                    region,
                    z: *z,
                    height: *height,
                })
            }
        }
    }

    /// The planar faces on z = 0, including the bottoms of solids standing
    /// there, merged into one face or returned as their boundary wires.
    pub fn planar_faces(&self, wires: bool) -> Result<Shape> {
        let mut region = Region::empty();
        for leaf in self.leaves() {
            match leaf {
                Shape::Face { region: r, z } | Shape::Solid { region: r, z, .. }
                    if same(*z, 0.0) =>
                {
                    region = region.union(r);
                }
                _ => {}
            }
        }
        if region.is_empty() {
            return Err(GeometryError::NullShape);
        }
        Ok(if wires {
            Shape::path(region.boundaries())
        } else {
            Shape::face(region)
        })
    }
}

fn cutter_region(tool: &Shape) -> Option<&Region> {
    match tool {
        Shape::Face { region, .. } | Shape::Solid { region, .. } => Some(region),
        _ => None,
    }
}

fn same(a: f64, b: f64) -> bool {
    (a - b).abs() <= Z_EPS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{make_circle, make_rect};
    use approx::assert_abs_diff_eq;

    fn square_face(s: f64, at: (f64, f64)) -> Shape {
        Shape::face(Region::from_wires(&[make_rect(s, s).translated(Point::new(at.0, at.1))]).unwrap())
    }

    #[test]
    fn extrude_gives_area_times_height() {
        let solid = square_face(10.0, (0.0, 0.0)).extrude(1.6).unwrap();
        assert_abs_diff_eq!(solid.volume(), 160.0, epsilon = 1e-9);
        let bb = solid.bounding_box().unwrap();
        assert_abs_diff_eq!(bb.max[2], 1.6, epsilon = 1e-12);
        assert!(Shape::path(vec![make_rect(1.0, 1.0)]).extrude(1.0).is_err());
    }

    #[test]
    fn fuse_single_body_is_unchanged() {
        let face = square_face(2.0, (0.0, 0.0));
        let fused = face.fuse();
        assert_eq!(fused.leaves().len(), 1);
        assert_abs_diff_eq!(fused.area(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn fuse_merges_coplanar_faces() {
        let c = Shape::compound(vec![square_face(2.0, (0.0, 0.0)), square_face(2.0, (1.0, 0.0))]);
        assert_abs_diff_eq!(c.area(), 8.0, epsilon = 1e-12);
        let fused = c.fuse();
        assert_eq!(fused.leaves().len(), 1);
        assert_abs_diff_eq!(fused.area(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn fuse_keeps_different_planes_apart() {
        let a = square_face(2.0, (0.0, 0.0));
        let b = square_face(2.0, (0.0, 0.0)).translated([0.0, 0.0, 1.0]);
        assert_eq!(Shape::compound(vec![a, b]).fuse().leaves().len(), 2);
    }

    #[test]
    fn cut_drills_through_a_solid() {
        let board = square_face(10.0, (0.0, 0.0)).extrude(1.6).unwrap();
        let drill = Shape::face(Region::from_wires(&[make_circle(1.0)]).unwrap())
            .extrude(3.2)
            .unwrap()
            .translated([0.0, 0.0, -0.8]);
        let cut = board.cut(&drill).unwrap();
        let expected = (100.0 - std::f64::consts::PI * 0.25) * 1.6;
        assert_abs_diff_eq!(cut.volume(), expected, epsilon = 1e-6);

        let above = drill.translated([0.0, 0.0, 10.0]);
        assert_abs_diff_eq!(board.cut(&above).unwrap().volume(), 160.0, epsilon = 1e-9);

        let shallow = Shape::face(Region::from_wires(&[make_circle(1.0)]).unwrap())
            .extrude(0.5)
            .unwrap();
        assert!(board.cut(&shallow).is_err());
    }

    #[test]
    fn planar_faces_take_the_ground_plane() {
        let low = square_face(2.0, (0.0, 0.0)).extrude(1.0).unwrap();
        let high = square_face(4.0, (0.0, 0.0)).translated([0.0, 0.0, 2.0]);
        let c = Shape::compound(vec![low, high]);
        let faces = c.planar_faces(false).unwrap();
        assert_abs_diff_eq!(faces.area(), 4.0, epsilon = 1e-12);
        let wires = c.planar_faces(true).unwrap();
        assert!(matches!(wires, Shape::Path { ref wires, .. } if wires.len() == 1));

        let lifted = square_face(2.0, (0.0, 0.0)).translated([0.0, 0.0, 1.0]);
        assert!(matches!(lifted.planar_faces(false), Err(GeometryError::NullShape)));
    }

    #[test]
    fn offset_path_fills_closed_loops() {
        let path = Shape::path(vec![make_rect(2.0, 2.0)]);
        let grown = path.offset(0.5, &OffsetOptions::default()).unwrap();
        assert_abs_diff_eq!(grown.area(), 8.0 + std::f64::consts::PI * 0.25, epsilon = 1e-6);
    }

    #[test]
    fn transforms_move_the_box() {
        let s = square_face(2.0, (0.0, 0.0)).rotated_z(90.0).translated([5.0, 1.0, 0.5]);
        let bb = s.bounding_box().unwrap();
        assert_abs_diff_eq!(bb.min[0], 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bb.max[1], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bb.min[2], 0.5, epsilon = 1e-12);
    }
}
