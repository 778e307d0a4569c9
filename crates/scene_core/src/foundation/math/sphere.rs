use serde::{Deserialize, Serialize};

use super::{Box3, Matrix4, Plane, Vector3};

/// Bounding sphere.
///
/// A negative radius marks the sphere as empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Center point
    pub center: Vector3,
    /// Radius; negative when empty
    pub radius: f32,
}

impl Default for Sphere {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Sphere {
    /// Sphere containing nothing
    pub const EMPTY: Self = Self { center: Vector3::ZERO, radius: -1.0 };

    /// Create a sphere
    #[must_use]
    pub const fn new(center: Vector3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Overwrite center and radius
    pub fn set(&mut self, center: Vector3, radius: f32) -> &mut Self {
        *self = Self::new(center, radius);
        self
    }

    /// Smallest sphere around `points` centered at `optional_center`, or at
    /// the center of their bounding box when no center is given
    pub fn set_from_points(&mut self, points: &[Vector3], optional_center: Option<Vector3>) -> &mut Self {
        self.center = optional_center.unwrap_or_else(|| Box3::from_points(points).get_center());
        let max_radius_sq = points
            .iter()
            .map(|p| self.center.distance_to_squared(*p))
            .fold(0.0_f32, f32::max);
        self.radius = max_radius_sq.sqrt();
        self
    }

    /// Whether the sphere is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.radius < 0.0
    }

    /// Reset to the empty sphere
    pub fn make_empty(&mut self) -> &mut Self {
        *self = Self::EMPTY;
        self
    }

    /// Whether `point` is inside or on the surface
    #[must_use]
    pub fn contains_point(&self, point: Vector3) -> bool {
        point.distance_to_squared(self.center) <= self.radius * self.radius
    }

    /// Signed distance from the surface; negative inside
    #[must_use]
    pub fn distance_to_point(&self, point: Vector3) -> f32 {
        point.distance_to(self.center) - self.radius
    }

    /// Whether two spheres overlap
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &Self) -> bool {
        let radius_sum = self.radius + sphere.radius;
        sphere.center.distance_to_squared(self.center) <= radius_sum * radius_sum
    }

    /// Whether the sphere overlaps `b`
    #[must_use]
    pub fn intersects_box(&self, b: &Box3) -> bool {
        b.intersects_sphere(self)
    }

    /// Whether the plane cuts through the sphere
    #[must_use]
    pub fn intersects_plane(&self, plane: &Plane) -> bool {
        plane.distance_to_point(self.center).abs() <= self.radius
    }

    /// Nearest point to `point` that lies inside the sphere
    #[must_use]
    pub fn clamp_point(&self, point: Vector3) -> Vector3 {
        let delta_sq = self.center.distance_to_squared(point);
        if delta_sq > self.radius * self.radius {
            self.center + (point - self.center).normalized() * self.radius
        } else {
            point
        }
    }

    /// Axis-aligned box enclosing the sphere
    #[must_use]
    pub fn get_bounding_box(&self) -> Box3 {
        if self.is_empty() {
            return Box3::EMPTY;
        }
        let mut b = Box3::new(self.center, self.center);
        b.expand_by_scalar(self.radius);
        b
    }

    /// Transform the center; the radius grows by the largest axis scale
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        self.center.apply_matrix4(m);
        self.radius *= m.get_max_scale_on_axis();
        self
    }

    /// Move the center
    pub fn translate(&mut self, offset: Vector3) -> &mut Self {
        self.center += offset;
        self
    }

    /// Grow just enough to contain `point`
    pub fn expand_by_point(&mut self, point: Vector3) -> &mut Self {
        if self.is_empty() {
            return self.set(point, 0.0);
        }
        let delta = point - self.center;
        let length_sq = delta.length_squared();
        if length_sq > self.radius * self.radius {
            let length = length_sq.sqrt();
            let missing = (length - self.radius) * 0.5;
            self.center.add_scaled_vector(delta, missing / length);
            self.radius += missing;
        }
        self
    }

    /// Grow to contain `sphere`
    pub fn union(&mut self, sphere: &Self) -> &mut Self {
        if sphere.is_empty() {
            return self;
        }
        if self.is_empty() {
            *self = *sphere;
            return self;
        }
        if self.center == sphere.center {
            self.radius = self.radius.max(sphere.radius);
        } else {
            let direction = (sphere.center - self.center).normalized();
            self.expand_by_point(sphere.center + direction * sphere.radius);
            self.expand_by_point(sphere.center - direction * sphere.radius);
        }
        self
    }
}
