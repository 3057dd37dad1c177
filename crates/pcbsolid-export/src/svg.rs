use cavalier_contours::core::math::angle_from_bulge;
use cavalier_contours::polyline::{PlineSource, PlineVertex, seg_arc_radius_and_center, seg_bounding_box};
use pcbsolid_geometry::{Point, Polyline, Shape};

use crate::{ExportError, fmt_num};

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Bounds {
    fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn update_bbox(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        self.min_x = self.min_x.min(min_x);
        self.max_x = self.max_x.max(max_x);
        self.min_y = self.min_y.min(min_y);
        self.max_y = self.max_y.max(max_y);
    }

    fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.max_x.is_finite()
            && self.min_y.is_finite()
            && self.max_y.is_finite()
    }
}

/// Render the planar outlines of `shape` as one SVG path.
///
/// Faces and solids contribute their boundary loops, paths their wires;
/// heights are ignored. The board's Y-up coordinates are flipped back to
/// screen orientation.
pub fn shape_to_svg(shape: &Shape) -> Result<String, ExportError> {
    let mut loops: Vec<Polyline<f64>> = Vec::new();
    for leaf in shape.leaves() {
        match leaf {
            Shape::Face { region, .. } | Shape::Solid { region, .. } => {
                loops.extend(region.areas.iter().flat_map(|a| a.loops()).cloned());
            }
            Shape::Path { wires, .. } => loops.extend(wires.iter().map(|w| w.to_polyline())),
            Shape::Compound(_) => {}
        }
    }

    let mut bounds = Bounds::new();
    for pl in &loops {
        update_bounds_for_polyline(&mut bounds, pl);
    }
    if !bounds.is_valid() {
        return Err(ExportError::Empty);
    }
    let width = bounds.max_x - bounds.min_x;
    let height = bounds.max_y - bounds.min_y;
    if width <= 0.0 || height <= 0.0 {
        return Err(ExportError::Empty);
    }

    let transform = |x: f64, y: f64| Point::new(x - bounds.min_x, bounds.max_y - y);
    let mut path = String::new();
    for pl in &loops {
        let sub = polyline_path(pl, transform);
        if sub.is_empty() {
            continue;
        }
        if !path.is_empty() {
            path.push(' ');
        }
        path.push_str(&sub);
    }

    Ok(format!(
        "<svg width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\" xmlns=\"http://www.w3.org/2000/svg\"><g id=\"svgGroup\" stroke-linecap=\"round\" fill-rule=\"evenodd\" font-size=\"9pt\" stroke=\"#000\" stroke-width=\"0.25mm\" fill=\"none\" style=\"stroke:#000;stroke-width:0.25mm;fill:none\"><path d=\"{path}\" vector-effect=\"non-scaling-stroke\"/></g></svg>",
        w = fmt_num(width),
        h = fmt_num(height),
        path = path
    ))
}

fn polyline_path(pl: &Polyline<f64>, transform: impl Fn(f64, f64) -> Point) -> String {
    let n = pl.vertex_count();
    if n < 2 {
        return String::new();
    }
    let closed = pl.is_closed();
    let mut out = String::new();
    let v0 = pl.at(0);
    let start = transform(v0.x, v0.y);
    out.push_str(&format!("M {} {}", fmt_num(start.x), fmt_num(start.y)));

    let segs = if closed { n } else { n - 1 };
    for i in 0..segs {
        let v1 = pl.at(i);
        let v2 = pl.at((i + 1) % n);
        let end = transform(v2.x, v2.y);
        if v1.bulge.abs() <= EPS {
            out.push_str(&format!(" L {} {}", fmt_num(end.x), fmt_num(end.y)));
            continue;
        }
        let (radius, _) = seg_arc_radius_and_center(v1, v2);
        // The Y flip mirrors the sweep direction.
        let bulge_svg = -v1.bulge;
        let angle = angle_from_bulge(bulge_svg).abs().to_degrees();
        let large = if angle > 180.0 { 1 } else { 0 };
        let sweep_flag = if bulge_svg >= 0.0 { 1 } else { 0 };
        let r = radius.abs();
        out.push_str(&format!(
            " A {} {} 0 {} {} {} {}",
            fmt_num(r),
            fmt_num(r),
            large,
            sweep_flag,
            fmt_num(end.x),
            fmt_num(end.y)
        ));
    }

    if closed {
        out.push_str(" Z");
    }
    out
}

fn update_bounds_for_polyline(bounds: &mut Bounds, pl: &Polyline<f64>) {
    let n = pl.vertex_count();
    if n < 2 {
        return;
    }
    let segs = if pl.is_closed() { n } else { n - 1 };
    for i in 0..segs {
        let v1: PlineVertex<f64> = pl.at(i);
        let v2 = pl.at((i + 1) % n);
        let aabb = seg_bounding_box(v1, v2);
        bounds.update_bbox(aabb.min_x, aabb.min_y, aabb.max_x, aabb.max_y);
    }
}
