use serde::{Deserialize, Serialize};

use super::{Matrix4, Vector3};

/// Line segment between two points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Line3 {
    /// Start point
    pub start: Vector3,
    /// End point
    pub end: Vector3,
}

impl Line3 {
    /// Create a segment
    #[must_use]
    pub const fn new(start: Vector3, end: Vector3) -> Self {
        Self { start, end }
    }

    /// Midpoint
    #[must_use]
    pub fn center(&self) -> Vector3 {
        (self.start + self.end) * 0.5
    }

    /// `end - start`
    #[must_use]
    pub fn delta(&self) -> Vector3 {
        self.end - self.start
    }

    /// Squared length
    #[must_use]
    pub fn distance_sq(&self) -> f32 {
        self.start.distance_to_squared(self.end)
    }

    /// Length
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.start.distance_to(self.end)
    }

    /// Point at parameter `t` (0 = start, 1 = end)
    #[must_use]
    pub fn at(&self, t: f32) -> Vector3 {
        self.start + self.delta() * t
    }

    /// Parameter of the point on the line closest to `point`
    #[must_use]
    pub fn closest_point_to_point_parameter(&self, point: Vector3, clamp_to_line: bool) -> f32 {
        let start_p = point - self.start;
        let start_end = self.delta();
        let denominator = start_end.length_squared();
        let t = if denominator == 0.0 { 0.0 } else { start_end.dot(start_p) / denominator };
        if clamp_to_line {
            t.clamp(0.0, 1.0)
        } else {
            t
        }
    }

    /// Point on the line (or segment, when clamped) closest to `point`
    #[must_use]
    pub fn closest_point_to_point(&self, point: Vector3, clamp_to_line: bool) -> Vector3 {
        self.at(self.closest_point_to_point_parameter(point, clamp_to_line))
    }

    /// Transform both endpoints
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        self.start.apply_matrix4(m);
        self.end.apply_matrix4(m);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_closest_point_clamping() {
        let line = Line3::new(Vector3::ZERO, Vector3::new(2.0, 0.0, 0.0));
        let beyond = Vector3::new(5.0, 1.0, 0.0);

        assert_relative_eq!(line.closest_point_to_point_parameter(beyond, false), 2.5);
        assert_relative_eq!(line.closest_point_to_point(beyond, true), Vector3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(line.center(), Vector3::X);
        assert_relative_eq!(line.distance(), 2.0);
    }
}
