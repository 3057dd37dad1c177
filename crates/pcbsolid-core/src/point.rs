use serde::{Deserialize, Serialize};

/// A point in the output frame (Y up, counter-clockwise positive).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert a board-document coordinate (Y down) into the output frame.
    #[must_use]
    pub fn from_board(p: [f64; 2]) -> Self {
        Self::new(p[0], -p[1])
    }

    /// Rotate about the origin by `angle_deg`, counter-clockwise.
    #[must_use]
    pub fn rotated(self, angle_deg: f64) -> Self {
        if angle_deg == 0.0 {
            return self;
        }
        let (s, c) = angle_deg.to_radians().sin_cos();
        Self::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    #[must_use]
    pub fn translated(self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Direction from `self` to `to`, in degrees.
    #[must_use]
    pub fn bearing_deg(self, to: Point) -> f64 {
        (to.y - self.y).atan2(to.x - self.x).to_degrees()
    }

    #[must_use]
    pub fn approx_eq(self, other: Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn board_points_flip_y() {
        let p = Point::from_board([3.0, 4.5]);
        assert_abs_diff_eq!(p.x, 3.0);
        assert_abs_diff_eq!(p.y, -4.5);
    }

    #[test]
    fn rotate_quarter_turn() {
        let p = Point::new(1.0, 0.0).rotated(90.0);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn bearing_follows_atan2() {
        let a = Point::new(1.0, 1.0);
        assert_abs_diff_eq!(a.bearing_deg(Point::new(1.0, 3.0)), 90.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a.bearing_deg(Point::new(-1.0, 1.0)), 180.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a.distance(Point::new(4.0, 5.0)), 5.0, epsilon = 1e-12);
    }
}
