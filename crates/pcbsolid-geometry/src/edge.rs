use std::f64::consts::PI;

use cavalier_contours::polyline::{PlineVertex, seg_arc_radius_and_center};

use crate::{GeometryError, Point, Result};

/// Shortest edge the kernel accepts.
pub const MIN_EDGE_LENGTH: f64 = 1e-9;

/// A line segment or circular arc from `start` to `end`.
///
/// Arcs are encoded as a polyline bulge (`tan(sweep / 4)`): positive bulges run
/// counter-clockwise, zero means a straight line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: Point,
    pub end: Point,
    pub bulge: f64,
}

impl Edge {
    #[must_use]
    pub const fn new(start: Point, end: Point, bulge: f64) -> Self {
        Self { start, end, bulge }
    }

    #[must_use]
    pub fn is_arc(&self) -> bool {
        self.bulge != 0.0
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start, -self.bulge)
    }

    /// Signed sweep in radians; zero for lines.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        4.0 * self.bulge.atan()
    }

    #[must_use]
    pub fn chord_length(&self) -> f64 {
        self.start.distance(self.end)
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        match self.center_and_radius() {
            Some((_, r)) => r * self.sweep().abs(),
            None => self.chord_length(),
        }
    }

    #[must_use]
    pub fn center_and_radius(&self) -> Option<(Point, f64)> {
        if !self.is_arc() {
            return None;
        }
        let (radius, center) = seg_arc_radius_and_center(
            PlineVertex::new(self.start.x, self.start.y, self.bulge),
            PlineVertex::new(self.end.x, self.end.y, 0.0),
        );
        Some((Point::new(center.x, center.y), radius.abs()))
    }

    #[must_use]
    pub fn rotated(&self, angle_deg: f64) -> Self {
        Self::new(
            self.start.rotated(angle_deg),
            self.end.rotated(angle_deg),
            self.bulge,
        )
    }

    #[must_use]
    pub fn translated(&self, by: Point) -> Self {
        Self::new(self.start.translated(by), self.end.translated(by), self.bulge)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.bulge.is_finite()
    }

    /// Points approximating this edge within `tolerance`, from `start` up to
    /// but excluding `end`.
    #[must_use]
    pub fn flatten(&self, tolerance: f64) -> Vec<Point> {
        let Some((center, radius)) = self.center_and_radius() else {
            return vec![self.start];
        };
        let sweep = self.sweep();
        let max_step = if tolerance > 0.0 && tolerance < radius {
            2.0 * (1.0 - tolerance / radius).acos()
        } else {
            PI / 2.0
        };
        let steps = ((sweep.abs() / max_step).ceil() as usize).clamp(1, 1024);
        let a0 = (self.start.y - center.y).atan2(self.start.x - center.x);
        std::iter::once(self.start)
            .chain((1..steps).map(|i| {
                let a = a0 + sweep * (i as f64) / (steps as f64);
                Point::new(center.x + radius * a.cos(), center.y + radius * a.sin())
            }))
            .collect()
    }
}

/// A straight edge between two distinct points.
pub fn make_line(start: Point, end: Point) -> Result<Edge> {
    let edge = Edge::new(start, end, 0.0);
    if !edge.is_finite() {
        return Err(GeometryError::InvalidEdge(format!(
            "non-finite line {start:?} -> {end:?}"
        )));
    }
    if edge.chord_length() < MIN_EDGE_LENGTH {
        return Err(GeometryError::InvalidEdge(format!(
            "zero-length line at {start:?}"
        )));
    }
    Ok(edge)
}

/// An arc around `center` beginning at `start` and sweeping `angle_deg`
/// clockwise, as board documents describe arcs.
///
/// The arc is built counter-clockwise from the far end back to `start` and then
/// reversed, so the returned edge starts at `start`.
pub fn make_arc(center: Point, start: Point, angle_deg: f64) -> Result<Edge> {
    if !center.is_finite() || !start.is_finite() || !angle_deg.is_finite() {
        return Err(GeometryError::InvalidEdge("non-finite arc".to_string()));
    }
    let radius = center.distance(start);
    if radius < MIN_EDGE_LENGTH {
        return Err(GeometryError::InvalidEdge(format!(
            "zero-radius arc at {center:?}"
        )));
    }
    if angle_deg.abs() < 1e-9 || angle_deg.abs() >= 360.0 {
        return Err(GeometryError::InvalidEdge(format!(
            "arc sweep {angle_deg} must be within (0, 360) degrees"
        )));
    }
    let a = center.bearing_deg(start);
    let (s, c) = (a - angle_deg).to_radians().sin_cos();
    let far = Point::new(center.x + radius * c, center.y + radius * s);
    let ccw = Edge::new(far, start, (angle_deg.to_radians() / 4.0).tan());
    Ok(ccw.reversed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn line_rejects_degenerate_input() {
        let p = Point::new(1.0, 1.0);
        assert!(make_line(p, p).is_err());
        assert!(make_line(p, Point::new(f64::NAN, 0.0)).is_err());
        assert!(make_line(p, Point::new(2.0, 1.0)).is_ok());
    }

    #[test]
    fn arc_starts_at_start_and_runs_clockwise() {
        let arc = make_arc(Point::new(0.0, 0.0), Point::new(1.0, 0.0), 90.0).unwrap();
        assert_eq!(arc.start, Point::new(1.0, 0.0));
        assert_abs_diff_eq!(arc.end.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(arc.end.y, -1.0, epsilon = 1e-12);
        assert!(arc.bulge < 0.0);
        assert_abs_diff_eq!(arc.sweep(), -PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(arc.length(), PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn arc_center_round_trips() {
        let arc = make_arc(Point::new(2.0, 3.0), Point::new(4.0, 3.0), 120.0).unwrap();
        let (center, radius) = arc.center_and_radius().unwrap();
        assert_abs_diff_eq!(center.x, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(center.y, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(radius, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn flatten_stays_on_the_circle() {
        let arc = make_arc(Point::new(0.0, 0.0), Point::new(5.0, 0.0), 180.0).unwrap();
        let pts = arc.flatten(0.01);
        assert!(pts.len() > 8);
        assert_eq!(pts[0], arc.start);
        for p in pts {
            assert_abs_diff_eq!(p.x.hypot(p.y), 5.0, epsilon = 1e-9);
            assert!(p.y <= 1e-9);
        }
    }

    #[test]
    fn full_turn_arcs_are_rejected() {
        assert!(make_arc(Point::new(0.0, 0.0), Point::new(1.0, 0.0), 360.0).is_err());
        assert!(make_arc(Point::new(0.0, 0.0), Point::new(0.0, 0.0), 90.0).is_err());
    }
}
