use serde::{Deserialize, Serialize};

use super::{Box3, Line3, Matrix3, Matrix4, Sphere, Vector3};

/// Infinite plane `normal · p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal
    pub normal: Vector3,
    /// Signed distance from the origin along `-normal`
    pub constant: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self::new(Vector3::X, 0.0)
    }
}

impl Plane {
    /// Create a plane from a unit normal and constant
    #[must_use]
    pub const fn new(normal: Vector3, constant: f32) -> Self {
        Self { normal, constant }
    }

    /// Overwrite normal and constant
    pub fn set(&mut self, normal: Vector3, constant: f32) -> &mut Self {
        *self = Self::new(normal, constant);
        self
    }

    /// Overwrite from raw components
    pub fn set_components(&mut self, x: f32, y: f32, z: f32, w: f32) -> &mut Self {
        self.set(Vector3::new(x, y, z), w)
    }

    /// Plane through `point` with the given normal
    pub fn set_from_normal_and_coplanar_point(&mut self, normal: Vector3, point: Vector3) -> &mut Self {
        self.set(normal, -point.dot(normal))
    }

    /// Plane through three points, wound counter-clockwise
    pub fn set_from_coplanar_points(&mut self, a: Vector3, b: Vector3, c: Vector3) -> &mut Self {
        let normal = (c - b).cross(a - b).normalized();
        self.set_from_normal_and_coplanar_point(normal, a)
    }

    /// Rescale so the normal has unit length
    pub fn normalize(&mut self) -> &mut Self {
        let inverse_length = 1.0 / self.normal.length();
        self.normal *= inverse_length;
        self.constant *= inverse_length;
        self
    }

    /// Flip the facing
    pub fn negate(&mut self) -> &mut Self {
        self.constant = -self.constant;
        self.normal.negate();
        self
    }

    /// Signed distance from `point`
    #[must_use]
    pub fn distance_to_point(&self, point: Vector3) -> f32 {
        self.normal.dot(point) + self.constant
    }

    /// Signed distance from the surface of `sphere`
    #[must_use]
    pub fn distance_to_sphere(&self, sphere: &Sphere) -> f32 {
        self.distance_to_point(sphere.center) - sphere.radius
    }

    /// Orthogonal projection of `point` onto the plane
    #[must_use]
    pub fn project_point(&self, point: Vector3) -> Vector3 {
        point - self.normal * self.distance_to_point(point)
    }

    /// Where the segment crosses the plane, if it does
    #[must_use]
    pub fn intersect_line(&self, line: &Line3) -> Option<Vector3> {
        let direction = line.delta();
        let denominator = self.normal.dot(direction);

        if denominator == 0.0 {
            // Parallel; the segment either lies in the plane or misses it
            return (self.distance_to_point(line.start) == 0.0).then_some(line.start);
        }

        let t = -(line.start.dot(self.normal) + self.constant) / denominator;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        Some(line.at(t))
    }

    /// Whether the segment endpoints straddle the plane
    #[must_use]
    pub fn intersects_line(&self, line: &Line3) -> bool {
        let start_sign = self.distance_to_point(line.start);
        let end_sign = self.distance_to_point(line.end);
        (start_sign < 0.0 && end_sign > 0.0) || (end_sign < 0.0 && start_sign > 0.0)
    }

    /// Whether the plane passes through `b`
    #[must_use]
    pub fn intersects_box(&self, b: &Box3) -> bool {
        b.intersects_plane(self)
    }

    /// Whether the plane passes through `sphere`
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        sphere.intersects_plane(self)
    }

    /// The point on the plane closest to the origin
    #[must_use]
    pub fn coplanar_point(&self) -> Vector3 {
        self.normal * -self.constant
    }

    /// Transform the plane; pass a precomputed normal matrix to avoid
    /// recomputing it for every plane
    pub fn apply_matrix4(&mut self, m: &Matrix4, optional_normal_matrix: Option<&Matrix3>) -> &mut Self {
        let normal_matrix = optional_normal_matrix.copied().unwrap_or_else(|| Matrix3::normal_matrix(m));
        let mut reference_point = self.coplanar_point();
        reference_point.apply_matrix4(m);
        let mut normal = self.normal;
        normal.apply_normal_matrix(&normal_matrix);
        self.set_from_normal_and_coplanar_point(normal, reference_point)
    }

    /// Move the plane by `offset`
    pub fn translate(&mut self, offset: Vector3) -> &mut Self {
        self.constant -= offset.dot(self.normal);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_coplanar_points_and_distance() {
        let mut plane = Plane::default();
        plane.set_from_coplanar_points(
            Vector3::new(0.0, 2.0, 0.0),
            Vector3::new(1.0, 2.0, 1.0),
            Vector3::new(1.0, 2.0, 0.0),
        );
        assert_relative_eq!(plane.normal, Vector3::Y, epsilon = EPSILON);
        assert_relative_eq!(plane.distance_to_point(Vector3::new(5.0, 5.0, 5.0)), 3.0, epsilon = EPSILON);
        assert_relative_eq!(
            plane.project_point(Vector3::new(5.0, 5.0, 5.0)),
            Vector3::new(5.0, 2.0, 5.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_segment_crossing() {
        let plane = Plane::new(Vector3::Y, -1.0);
        let crossing = Line3::new(Vector3::ZERO, Vector3::new(0.0, 4.0, 0.0));
        assert!(plane.intersects_line(&crossing));
        assert_relative_eq!(plane.intersect_line(&crossing).unwrap(), Vector3::Y, epsilon = EPSILON);

        let short = Line3::new(Vector3::ZERO, Vector3::new(0.0, 0.5, 0.0));
        assert!(plane.intersect_line(&short).is_none());
    }

    #[test]
    fn test_apply_matrix4_moves_plane() {
        let mut plane = Plane::new(Vector3::Y, 0.0);
        let m = Matrix4::from_translation(Vector3::new(0.0, 3.0, 0.0));
        plane.apply_matrix4(&m, None);
        assert_relative_eq!(plane.constant, -3.0, epsilon = EPSILON);

        plane.translate(Vector3::new(0.0, -3.0, 0.0));
        assert_relative_eq!(plane.constant, 0.0, epsilon = EPSILON);
        plane.negate();
        assert_relative_eq!(plane.normal, -Vector3::Y);
    }
}
