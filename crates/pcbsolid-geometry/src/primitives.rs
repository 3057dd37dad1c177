//! Closed outlines for pad and drill footprints, centered at the origin.

use std::f64::consts::PI;

use crate::{Edge, Point, Wire};

fn lines_through(pts: &[Point]) -> Wire {
    let n = pts.len();
    Wire::new(
        (0..n)
            .map(|i| Edge::new(pts[i], pts[(i + 1) % n], 0.0))
            .collect(),
    )
}

/// Axis-aligned `w` x `h` box.
#[must_use]
pub fn make_rect(w: f64, h: f64) -> Wire {
    let (hw, hh) = (w / 2.0, h / 2.0);
    lines_through(&[
        Point::new(-hw, -hh),
        Point::new(hw, -hh),
        Point::new(hw, hh),
        Point::new(-hw, hh),
    ])
}

/// Circle of diameter `d`, as two half-circle arcs.
#[must_use]
pub fn make_circle(d: f64) -> Wire {
    let r = d / 2.0;
    let (a, b) = (Point::new(-r, 0.0), Point::new(r, 0.0));
    Wire::new(vec![Edge::new(a, b, 1.0), Edge::new(b, a, 1.0)])
}

/// Stadium of overall size `w` x `h`: two half-circle caps on the shorter
/// dimension joined by two straight runs. Equal sides give a circle.
#[must_use]
pub fn make_oval(w: f64, h: f64) -> Wire {
    if w == h {
        return make_circle(w);
    }
    let edges = if w < h {
        let (r, d) = (w / 2.0, (h - w) / 2.0);
        vec![
            Edge::new(Point::new(r, d), Point::new(-r, d), 1.0),
            Edge::new(Point::new(-r, d), Point::new(-r, -d), 0.0),
            Edge::new(Point::new(-r, -d), Point::new(r, -d), 1.0),
            Edge::new(Point::new(r, -d), Point::new(r, d), 0.0),
        ]
    } else {
        let (r, d) = (h / 2.0, (w - h) / 2.0);
        vec![
            Edge::new(Point::new(-d, r), Point::new(-d, -r), 1.0),
            Edge::new(Point::new(-d, -r), Point::new(d, -r), 0.0),
            Edge::new(Point::new(d, -r), Point::new(d, r), 1.0),
            Edge::new(Point::new(d, r), Point::new(-d, r), 0.0),
        ]
    };
    Wire::new(edges)
}

/// Box with quarter-circle corners of radius `r`, clamped to fit.
#[must_use]
pub fn make_rounded_rect(w: f64, h: f64, r: f64) -> Wire {
    let (hw, hh) = (w / 2.0, h / 2.0);
    let r = r.min(hw).min(hh).max(0.0);
    if r == 0.0 {
        return make_rect(w, h);
    }
    let b = (PI / 8.0).tan();
    // Counter-clockwise: bottom, right, top and left runs, each followed by a corner.
    let corners = [
        (Point::new(-hw + r, -hh), Point::new(hw - r, -hh), Point::new(hw, -hh + r)),
        (Point::new(hw, -hh + r), Point::new(hw, hh - r), Point::new(hw - r, hh)),
        (Point::new(hw - r, hh), Point::new(-hw + r, hh), Point::new(-hw, hh - r)),
        (Point::new(-hw, hh - r), Point::new(-hw, -hh + r), Point::new(-hw + r, -hh)),
    ];
    let mut edges = Vec::with_capacity(8);
    for (a, b_pt, c) in corners {
        if a.distance(b_pt) > 0.0 {
            edges.push(Edge::new(a, b_pt, 0.0));
        }
        edges.push(Edge::new(b_pt, c, b));
    }
    Wire::new(edges)
}

/// Stadium that covers the segment `p1`-`p2` thickened by `half_width`.
#[must_use]
pub fn make_thick_line(p1: Point, p2: Point, half_width: f64) -> Wire {
    let length = p1.distance(p2);
    let angle = if length > 0.0 { p1.bearing_deg(p2) } else { 0.0 };
    make_oval(length + 2.0 * half_width, 2.0 * half_width)
        .translated(Point::new(length / 2.0, 0.0))
        .rotated(angle)
        .translated(p1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Region;
    use approx::assert_abs_diff_eq;

    fn bbox(w: &Wire) -> (f64, f64, f64, f64) {
        let r = Region::from_wires(std::slice::from_ref(w)).unwrap();
        r.extents().unwrap()
    }

    #[test]
    fn rect_area_and_bounds() {
        let r = Region::from_wires(&[make_rect(3.0, 2.0)]).unwrap();
        assert_abs_diff_eq!(r.area(), 6.0, epsilon = 1e-12);
        let (x0, y0, x1, y1) = r.extents().unwrap();
        assert_abs_diff_eq!(x1 - x0, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y1 - y0, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn square_oval_is_the_circle() {
        assert_eq!(make_oval(1.5, 1.5), make_circle(1.5));
        let r = Region::from_wires(&[make_circle(2.0)]).unwrap();
        assert_abs_diff_eq!(r.area(), PI, epsilon = 1e-9);
    }

    #[test]
    fn oval_is_four_closed_segments() {
        for (w, h) in [(3.0, 1.0), (1.0, 3.0)] {
            let o = make_oval(w, h);
            assert_eq!(o.len(), 4);
            assert!(o.is_closed());
            for pair in o.edges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
            let (x0, y0, x1, y1) = bbox(&o);
            assert_abs_diff_eq!(x1 - x0, w, epsilon = 1e-9);
            assert_abs_diff_eq!(y1 - y0, h, epsilon = 1e-9);
            let r = Region::from_wires(&[o]).unwrap();
            assert_abs_diff_eq!(r.area(), 2.0 + PI * 0.25, epsilon = 1e-9);
        }
    }

    #[test]
    fn rounded_rect_trims_the_corners() {
        let r = Region::from_wires(&[make_rounded_rect(4.0, 2.0, 0.5)]).unwrap();
        assert_abs_diff_eq!(r.area(), 8.0 - (4.0 - PI) * 0.25, epsilon = 1e-9);
        assert_eq!(make_rounded_rect(4.0, 2.0, 0.0), make_rect(4.0, 2.0));
    }

    #[test]
    fn thick_line_follows_the_segment() {
        let w = make_thick_line(Point::new(1.0, 1.0), Point::new(1.0, 5.0), 0.5);
        let (x0, y0, x1, y1) = bbox(&w);
        assert_abs_diff_eq!(x0, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(x1, 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(y0, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(y1, 5.5, epsilon = 1e-9);
    }
}
