use serde::{Deserialize, Serialize};

use super::{Matrix4, Plane, Sphere, Triangle, Vector3};

/// Axis-aligned bounding box.
///
/// The empty box has `min = +∞` and `max = −∞` so that expanding it by any
/// point yields a degenerate box at that point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Box3 {
    /// Minimum corner
    pub min: Vector3,
    /// Maximum corner
    pub max: Vector3,
}

impl Default for Box3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Box3 {
    /// Box containing nothing
    pub const EMPTY: Self = Self {
        min: Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    /// Create a box from its corners
    #[must_use]
    pub const fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing `points`
    #[must_use]
    pub fn from_points(points: &[Vector3]) -> Self {
        let mut b = Self::EMPTY;
        b.set_from_points(points);
        b
    }

    /// Overwrite the corners
    pub fn set(&mut self, min: Vector3, max: Vector3) -> &mut Self {
        *self = Self::new(min, max);
        self
    }

    /// Bound a flat `[x, y, z, x, y, z, ...]` array
    pub fn set_from_array(&mut self, array: &[f32]) -> &mut Self {
        self.make_empty();
        for chunk in array.chunks_exact(3) {
            self.expand_by_point(Vector3::new(chunk[0], chunk[1], chunk[2]));
        }
        self
    }

    /// Bound a list of points
    pub fn set_from_points(&mut self, points: &[Vector3]) -> &mut Self {
        self.make_empty();
        for p in points {
            self.expand_by_point(*p);
        }
        self
    }

    /// Box of the given size centered on `center`
    pub fn set_from_center_and_size(&mut self, center: Vector3, size: Vector3) -> &mut Self {
        let half = size * 0.5;
        self.set(center - half, center + half)
    }

    /// Reset to the empty box
    pub fn make_empty(&mut self) -> &mut Self {
        *self = Self::EMPTY;
        self
    }

    /// Whether the box contains no points
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Center point; zero for the empty box
    #[must_use]
    pub fn get_center(&self) -> Vector3 {
        if self.is_empty() {
            Vector3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }

    /// Extent along each axis; zero for the empty box
    #[must_use]
    pub fn get_size(&self) -> Vector3 {
        if self.is_empty() {
            Vector3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Grow to contain `point`
    pub fn expand_by_point(&mut self, point: Vector3) -> &mut Self {
        self.min.min(point);
        self.max.max(point);
        self
    }

    /// Grow by `v` in both directions along each axis
    pub fn expand_by_vector(&mut self, v: Vector3) -> &mut Self {
        self.min -= v;
        self.max += v;
        self
    }

    /// Grow by `scalar` in every direction
    pub fn expand_by_scalar(&mut self, scalar: f32) -> &mut Self {
        self.expand_by_vector(Vector3::new(scalar, scalar, scalar))
    }

    /// Whether `point` is inside or on the boundary
    #[must_use]
    pub fn contains_point(&self, point: Vector3) -> bool {
        !(point.x < self.min.x
            || point.x > self.max.x
            || point.y < self.min.y
            || point.y > self.max.y
            || point.z < self.min.z
            || point.z > self.max.z)
    }

    /// Whether `b` lies entirely inside this box
    #[must_use]
    pub fn contains_box(&self, b: &Self) -> bool {
        self.min.x <= b.min.x
            && b.max.x <= self.max.x
            && self.min.y <= b.min.y
            && b.max.y <= self.max.y
            && self.min.z <= b.min.z
            && b.max.z <= self.max.z
    }

    /// Position of `point` relative to the box, `(0,0,0)` at `min` and
    /// `(1,1,1)` at `max`
    #[must_use]
    pub fn get_parameter(&self, point: Vector3) -> Vector3 {
        Vector3::new(
            (point.x - self.min.x) / (self.max.x - self.min.x),
            (point.y - self.min.y) / (self.max.y - self.min.y),
            (point.z - self.min.z) / (self.max.z - self.min.z),
        )
    }

    /// Whether two boxes overlap
    #[must_use]
    pub fn intersects_box(&self, b: &Self) -> bool {
        !(b.max.x < self.min.x
            || b.min.x > self.max.x
            || b.max.y < self.min.y
            || b.min.y > self.max.y
            || b.max.z < self.min.z
            || b.min.z > self.max.z)
    }

    /// Whether the box overlaps `sphere`
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let closest = self.clamp_point(sphere.center);
        closest.distance_to_squared(sphere.center) <= sphere.radius * sphere.radius
    }

    /// Whether `plane` passes through the box
    #[must_use]
    pub fn intersects_plane(&self, plane: &Plane) -> bool {
        let n = plane.normal;
        let (mut min, mut max) = (0.0, 0.0);
        for axis in 0..3 {
            let (lo, hi) = (self.min.component(axis), self.max.component(axis));
            if n.component(axis) > 0.0 {
                min += n.component(axis) * lo;
                max += n.component(axis) * hi;
            } else {
                min += n.component(axis) * hi;
                max += n.component(axis) * lo;
            }
        }
        min <= -plane.constant && max >= -plane.constant
    }

    /// Separating-axis test against a triangle
    #[must_use]
    pub fn intersects_triangle(&self, triangle: &Triangle) -> bool {
        if self.is_empty() {
            return false;
        }

        let center = self.get_center();
        let extents = self.max - center;

        // Translate the triangle so the box is centered on the origin.
        let v0 = triangle.a - center;
        let v1 = triangle.b - center;
        let v2 = triangle.c - center;

        let f0 = v1 - v0;
        let f1 = v2 - v1;
        let f2 = v0 - v2;

        let sat = |axes: &[Vector3]| {
            axes.iter().all(|axis| {
                let r = extents.x * axis.x.abs() + extents.y * axis.y.abs() + extents.z * axis.z.abs();
                let p0 = v0.dot(*axis);
                let p1 = v1.dot(*axis);
                let p2 = v2.dot(*axis);
                (-p0.max(p1).max(p2)).max(p0.min(p1).min(p2)) <= r
            })
        };

        // Cross products of the triangle edges with the box axes
        let edge_axes = [
            Vector3::new(0.0, -f0.z, f0.y),
            Vector3::new(0.0, -f1.z, f1.y),
            Vector3::new(0.0, -f2.z, f2.y),
            Vector3::new(f0.z, 0.0, -f0.x),
            Vector3::new(f1.z, 0.0, -f1.x),
            Vector3::new(f2.z, 0.0, -f2.x),
            Vector3::new(-f0.y, f0.x, 0.0),
            Vector3::new(-f1.y, f1.x, 0.0),
            Vector3::new(-f2.y, f2.x, 0.0),
        ];
        if !sat(&edge_axes) {
            return false;
        }

        if !sat(&[Vector3::X, Vector3::Y, Vector3::Z]) {
            return false;
        }

        sat(&[f0.cross(f1)])
    }

    /// Nearest point inside the box
    #[must_use]
    pub fn clamp_point(&self, point: Vector3) -> Vector3 {
        let mut p = point;
        p.clamp(self.min, self.max);
        p
    }

    /// Distance from `point` to the box; zero inside
    #[must_use]
    pub fn distance_to_point(&self, point: Vector3) -> f32 {
        (self.clamp_point(point) - point).length()
    }

    /// Sphere circumscribing the box
    #[must_use]
    pub fn get_bounding_sphere(&self) -> Sphere {
        if self.is_empty() {
            return Sphere::EMPTY;
        }
        Sphere::new(self.get_center(), self.get_size().length() * 0.5)
    }

    /// Shrink to the overlap with `b`; disjoint boxes give the empty box
    pub fn intersect(&mut self, b: &Self) -> &mut Self {
        self.min.max(b.min);
        self.max.min(b.max);
        if self.is_empty() {
            self.make_empty();
        }
        self
    }

    /// Grow to contain `b`
    pub fn union(&mut self, b: &Self) -> &mut Self {
        self.min.min(b.min);
        self.max.max(b.max);
        self
    }

    /// Transform all eight corners and re-bound them
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        if self.is_empty() {
            return self;
        }
        let (lo, hi) = (self.min, self.max);
        let mut corners = [Vector3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            corner.set(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            corner.apply_matrix4(m);
        }
        self.set_from_points(&corners)
    }

    /// Move both corners
    pub fn translate(&mut self, offset: Vector3) -> &mut Self {
        self.min += offset;
        self.max += offset;
        self
    }

    /// Exact equality
    #[must_use]
    pub fn equals(&self, b: &Self) -> bool {
        self == b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-6;

    fn unit_box() -> Box3 {
        Box3::new(Vector3::new(-0.5, -0.5, -0.5), Vector3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_empty_box_behaviour() {
        let mut b = Box3::default();
        assert!(b.is_empty());
        assert_eq!(b.get_center(), Vector3::ZERO);
        assert_eq!(b.get_size(), Vector3::ZERO);

        b.expand_by_point(Vector3::new(1.0, 2.0, 3.0));
        assert!(!b.is_empty());
        assert_eq!(b.min, b.max);
    }

    #[test]
    fn test_set_from_array() {
        let mut b = Box3::EMPTY;
        b.set_from_array(&[1.0, -2.0, 0.0, -1.0, 4.0, 3.0]);
        assert_eq!(b, Box3::new(Vector3::new(-1.0, -2.0, 0.0), Vector3::new(1.0, 4.0, 3.0)));
    }

    #[test]
    fn test_apply_matrix4_rebounds_rotated_box() {
        let mut b = unit_box();
        b.apply_matrix4(&Matrix4::from_axis_angle(Vector3::Y, std::f32::consts::FRAC_PI_4));
        let half_diagonal = 0.5 * std::f32::consts::SQRT_2;
        assert_relative_eq!(b.max.x, half_diagonal, epsilon = EPSILON);
        assert_relative_eq!(b.max.y, 0.5, epsilon = EPSILON);
    }

    #[test]
    fn test_overlap_queries() {
        let b = unit_box();
        assert!(b.intersects_box(&Box3::new(Vector3::new(0.4, 0.4, 0.4), Vector3::ONE)));
        assert!(!b.intersects_box(&Box3::new(Vector3::new(0.6, 0.6, 0.6), Vector3::ONE)));
        assert!(b.intersects_sphere(&Sphere::new(Vector3::new(1.0, 0.0, 0.0), 0.6)));
        assert!(b.intersects_plane(&Plane::new(Vector3::Y, 0.2)));
        assert!(!b.intersects_plane(&Plane::new(Vector3::Y, -0.8)));
        assert!(b.contains_box(&Box3::new(Vector3::ZERO, Vector3::new(0.5, 0.5, 0.5))));

        let mut clipped = b;
        clipped.intersect(&Box3::new(Vector3::new(2.0, 2.0, 2.0), Vector3::new(3.0, 3.0, 3.0)));
        assert!(clipped.is_empty());
    }

    #[test]
    fn test_triangle_separating_axes() {
        let b = unit_box();
        let crossing = Triangle::new(
            Vector3::new(-2.0, 0.0, -2.0),
            Vector3::new(2.0, 0.0, -2.0),
            Vector3::new(0.0, 0.0, 2.0),
        );
        assert!(b.intersects_triangle(&crossing));

        let above = Triangle::new(
            Vector3::new(-2.0, 1.0, -2.0),
            Vector3::new(2.0, 1.0, -2.0),
            Vector3::new(0.0, 1.0, 2.0),
        );
        assert!(!b.intersects_triangle(&above));

        // Lies in the x = y plane but beyond the box corner
        let diagonal = Triangle::new(
            Vector3::new(1.0, 1.0, -5.0),
            Vector3::new(1.0, 1.0, 5.0),
            Vector3::new(3.0, 3.0, 0.0),
        );
        assert!(!b.intersects_triangle(&diagonal));
    }

    #[test]
    fn test_bounding_sphere_and_distance() {
        let b = unit_box();
        let sphere = b.get_bounding_sphere();
        assert_relative_eq!(sphere.radius, 0.75f32.sqrt(), epsilon = EPSILON);
        assert_relative_eq!(b.distance_to_point(Vector3::new(2.5, 0.0, 0.0)), 2.0);
        assert_relative_eq!(b.get_parameter(Vector3::new(0.5, -0.5, 0.0)), Vector3::new(1.0, 0.0, 0.5));
    }
}
