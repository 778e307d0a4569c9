use serde::{Deserialize, Serialize};

use super::{Box3, Matrix4, Plane, Sphere, Vector3};

/// Half-line starting at `origin` and extending along `direction`.
///
/// `direction` is expected to be unit length for distances to be meaningful;
/// the constructor does not normalize it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Start point
    pub origin: Vector3,
    /// Unit direction
    pub direction: Vector3,
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vector3::ZERO, -Vector3::Z)
    }
}

/// Closest approach between a ray and a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentApproach {
    /// Squared distance between the two closest points
    pub distance_sq: f32,
    /// Closest point on the ray
    pub point_on_ray: Vector3,
    /// Closest point on the segment
    pub point_on_segment: Vector3,
}

impl Ray {
    /// Create a ray
    #[must_use]
    pub const fn new(origin: Vector3, direction: Vector3) -> Self {
        Self { origin, direction }
    }

    /// Overwrite origin and direction
    pub fn set(&mut self, origin: Vector3, direction: Vector3) -> &mut Self {
        *self = Self::new(origin, direction);
        self
    }

    /// Point at distance `t` along the ray
    #[must_use]
    pub fn at(&self, t: f32) -> Vector3 {
        self.origin + self.direction * t
    }

    /// Aim the ray at `v`
    pub fn look_at(&mut self, v: Vector3) -> &mut Self {
        self.direction = (v - self.origin).normalized();
        self
    }

    /// Move the origin to the point at distance `t`
    pub fn recast(&mut self, t: f32) -> &mut Self {
        self.origin = self.at(t);
        self
    }

    /// Point on the ray closest to `point`
    #[must_use]
    pub fn closest_point_to_point(&self, point: Vector3) -> Vector3 {
        let direction_distance = (point - self.origin).dot(self.direction);
        if direction_distance < 0.0 {
            self.origin
        } else {
            self.at(direction_distance)
        }
    }

    /// Distance from `point` to the ray
    #[must_use]
    pub fn distance_to_point(&self, point: Vector3) -> f32 {
        self.distance_sq_to_point(point).sqrt()
    }

    /// Squared distance from `point` to the ray
    #[must_use]
    pub fn distance_sq_to_point(&self, point: Vector3) -> f32 {
        self.closest_point_to_point(point).distance_to_squared(point)
    }

    /// Closest approach between the ray and the segment `v0`–`v1`
    #[must_use]
    #[allow(clippy::many_single_char_names)]
    pub fn distance_sq_to_segment(&self, v0: Vector3, v1: Vector3) -> SegmentApproach {
        let seg_center = (v0 + v1) * 0.5;
        let seg_dir = (v1 - v0).normalized();
        let diff = self.origin - seg_center;

        let seg_extent = v0.distance_to(v1) * 0.5;
        let a01 = -self.direction.dot(seg_dir);
        let b0 = diff.dot(self.direction);
        let b1 = -diff.dot(seg_dir);
        let c = diff.length_squared();
        let det = a01.mul_add(-a01, 1.0).abs();

        let clamp_extent = |v: f32| v.max(-seg_extent).min(seg_extent);
        let (s0, s1, distance_sq);

        if det > 0.0 {
            // Ray and segment are not parallel.
            let mut t0 = a01 * b1 - b0;
            let mut t1 = a01 * b0 - b1;
            let ext_det = seg_extent * det;

            if t0 >= 0.0 {
                if t1 >= -ext_det {
                    if t1 <= ext_det {
                        // Minimum at interior points of ray and segment
                        let inv_det = 1.0 / det;
                        t0 *= inv_det;
                        t1 *= inv_det;
                        s0 = t0;
                        s1 = t1;
                        distance_sq = t0 * (t0 + a01 * t1 + 2.0 * b0) + t1 * (a01 * t0 + t1 + 2.0 * b1) + c;
                    } else {
                        s1 = seg_extent;
                        s0 = (-(a01 * s1 + b0)).max(0.0);
                        distance_sq = -s0 * s0 + s1 * (s1 + 2.0 * b1) + c;
                    }
                } else {
                    s1 = -seg_extent;
                    s0 = (-(a01 * s1 + b0)).max(0.0);
                    distance_sq = -s0 * s0 + s1 * (s1 + 2.0 * b1) + c;
                }
            } else if t1 <= -ext_det {
                s0 = (-(-a01 * seg_extent + b0)).max(0.0);
                s1 = if s0 > 0.0 { -seg_extent } else { clamp_extent(-b1) };
                distance_sq = -s0 * s0 + s1 * (s1 + 2.0 * b1) + c;
            } else if t1 <= ext_det {
                s0 = 0.0;
                s1 = clamp_extent(-b1);
                distance_sq = s1 * (s1 + 2.0 * b1) + c;
            } else {
                s0 = (-(a01 * seg_extent + b0)).max(0.0);
                s1 = if s0 > 0.0 { seg_extent } else { clamp_extent(-b1) };
                distance_sq = -s0 * s0 + s1 * (s1 + 2.0 * b1) + c;
            }
        } else {
            // Parallel
            s1 = if a01 > 0.0 { -seg_extent } else { seg_extent };
            s0 = (-(a01 * s1 + b0)).max(0.0);
            distance_sq = -s0 * s0 + s1 * (s1 + 2.0 * b1) + c;
        }

        SegmentApproach {
            distance_sq: distance_sq.max(0.0),
            point_on_ray: self.at(s0),
            point_on_segment: seg_center + seg_dir * s1,
        }
    }

    /// First point where the ray enters `sphere`, or the exit point when the
    /// origin is inside
    #[must_use]
    pub fn intersect_sphere(&self, sphere: &Sphere) -> Option<Vector3> {
        let v = sphere.center - self.origin;
        let tca = v.dot(self.direction);
        let d2 = tca.mul_add(-tca, v.length_squared());
        let radius2 = sphere.radius * sphere.radius;

        if d2 > radius2 {
            return None;
        }

        let thc = (radius2 - d2).sqrt();
        let t0 = tca - thc;
        let t1 = tca + thc;

        if t0 < 0.0 && t1 < 0.0 {
            return None;
        }
        Some(self.at(if t0 < 0.0 { t1 } else { t0 }))
    }

    /// Whether the ray touches `sphere`
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.distance_sq_to_point(sphere.center) <= sphere.radius * sphere.radius
    }

    /// Distance along the ray to `plane`, if the ray reaches it
    #[must_use]
    pub fn distance_to_plane(&self, plane: &Plane) -> Option<f32> {
        let denominator = plane.normal.dot(self.direction);

        if denominator == 0.0 {
            // Parallel; only coplanar rays touch the plane
            return (plane.distance_to_point(self.origin) == 0.0).then_some(0.0);
        }

        let t = -(self.origin.dot(plane.normal) + plane.constant) / denominator;
        (t >= 0.0).then_some(t)
    }

    /// Where the ray meets `plane`
    #[must_use]
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vector3> {
        self.distance_to_plane(plane).map(|t| self.at(t))
    }

    /// Whether the ray meets `plane`
    #[must_use]
    pub fn intersects_plane(&self, plane: &Plane) -> bool {
        let dist_to_point = plane.distance_to_point(self.origin);
        if dist_to_point == 0.0 {
            return true;
        }
        plane.normal.dot(self.direction) * dist_to_point < 0.0
    }

    /// Slab test against an axis-aligned box.
    ///
    /// Returns the entry point, or the exit point when the origin is inside.
    #[must_use]
    pub fn intersect_box(&self, b: &Box3) -> Option<Vector3> {
        let slab = |origin: f32, inv_dir: f32, min: f32, max: f32| {
            if inv_dir >= 0.0 {
                ((min - origin) * inv_dir, (max - origin) * inv_dir)
            } else {
                ((max - origin) * inv_dir, (min - origin) * inv_dir)
            }
        };

        let o = self.origin;
        let d = self.direction;
        let (mut tmin, mut tmax) = slab(o.x, 1.0 / d.x, b.min.x, b.max.x);
        let (tymin, tymax) = slab(o.y, 1.0 / d.y, b.min.y, b.max.y);

        if tmin > tymax || tymin > tmax {
            return None;
        }
        // NaN appears when the origin lies on a slab boundary with a zero
        // direction component.
        if tymin > tmin || tmin.is_nan() {
            tmin = tymin;
        }
        if tymax < tmax || tmax.is_nan() {
            tmax = tymax;
        }

        let (tzmin, tzmax) = slab(o.z, 1.0 / d.z, b.min.z, b.max.z);
        if tmin > tzmax || tzmin > tmax {
            return None;
        }
        if tzmin > tmin || tmin.is_nan() {
            tmin = tzmin;
        }
        if tzmax < tmax || tmax.is_nan() {
            tmax = tzmax;
        }

        if tmax < 0.0 {
            return None;
        }
        Some(self.at(if tmin >= 0.0 { tmin } else { tmax }))
    }

    /// Whether the ray hits `b`
    #[must_use]
    pub fn intersects_box(&self, b: &Box3) -> bool {
        self.intersect_box(b).is_some()
    }

    /// Möller–Trumbore style ray/triangle test.
    ///
    /// With `backface_culling`, triangles whose counter-clockwise winding
    /// faces away from the ray are ignored.
    #[must_use]
    pub fn intersect_triangle(&self, a: Vector3, b: Vector3, c: Vector3, backface_culling: bool) -> Option<Vector3> {
        let edge1 = b - a;
        let edge2 = c - a;
        let normal = edge1.cross(edge2);

        let mut d_dot_n = self.direction.dot(normal);
        let sign = if d_dot_n > 0.0 {
            if backface_culling {
                return None;
            }
            1.0
        } else if d_dot_n < 0.0 {
            d_dot_n = -d_dot_n;
            -1.0
        } else {
            return None;
        };

        let diff = self.origin - a;
        let d_dot_q_x_e2 = sign * self.direction.dot(diff.cross(edge2));
        if d_dot_q_x_e2 < 0.0 {
            return None;
        }

        let d_dot_e1_x_q = sign * self.direction.dot(edge1.cross(diff));
        if d_dot_e1_x_q < 0.0 {
            return None;
        }

        if d_dot_q_x_e2 + d_dot_e1_x_q > d_dot_n {
            return None;
        }

        // Line intersects the triangle; reject hits behind the origin.
        let q_dot_n = -sign * diff.dot(normal);
        if q_dot_n < 0.0 {
            return None;
        }

        Some(self.at(q_dot_n / d_dot_n))
    }

    /// Transform origin as a point and direction as a direction
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        self.origin.apply_matrix4(m);
        self.direction.transform_direction(m);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-6;

    fn down_z() -> Ray {
        Ray::new(Vector3::new(0.0, 0.0, 5.0), -Vector3::Z)
    }

    #[test]
    fn test_box_entry_point() {
        let b = Box3::new(Vector3::new(-0.5, -0.5, -0.5), Vector3::new(0.5, 0.5, 0.5));
        let hit = down_z().intersect_box(&b).unwrap();
        assert_relative_eq!(hit, Vector3::new(0.0, 0.0, 0.5), epsilon = EPSILON);

        // Origin inside returns the exit point
        let inside = Ray::new(Vector3::ZERO, Vector3::X);
        assert_relative_eq!(inside.intersect_box(&b).unwrap(), Vector3::new(0.5, 0.0, 0.0));

        // Box behind the ray
        let away = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::Z);
        assert!(!away.intersects_box(&b));
    }

    #[test]
    fn test_sphere_intersection() {
        let sphere = Sphere::new(Vector3::ZERO, 1.0);
        assert_relative_eq!(
            down_z().intersect_sphere(&sphere).unwrap(),
            Vector3::new(0.0, 0.0, 1.0),
            epsilon = EPSILON
        );
        let miss = Ray::new(Vector3::new(2.0, 0.0, 5.0), -Vector3::Z);
        assert!(miss.intersect_sphere(&sphere).is_none());
        assert!(!miss.intersects_sphere(&sphere));
    }

    #[test]
    fn test_triangle_culling() {
        // Counter-clockwise when seen from +Z, i.e. facing the ray origin
        let a = Vector3::new(-1.0, -1.0, 0.0);
        let b = Vector3::new(1.0, -1.0, 0.0);
        let c = Vector3::new(0.0, 1.0, 0.0);
        let ray = down_z();

        assert_relative_eq!(ray.intersect_triangle(a, b, c, true).unwrap(), Vector3::ZERO, epsilon = EPSILON);
        assert!(ray.intersect_triangle(a, c, b, true).is_none());
        assert!(ray.intersect_triangle(a, c, b, false).is_some());

        let beside = Ray::new(Vector3::new(3.0, 0.0, 5.0), -Vector3::Z);
        assert!(beside.intersect_triangle(a, b, c, false).is_none());
    }

    #[test]
    fn test_plane_distance() {
        let plane = Plane::new(Vector3::Z, 0.0);
        assert_relative_eq!(down_z().distance_to_plane(&plane).unwrap(), 5.0);
        assert!(down_z().intersects_plane(&plane));

        let parallel = Ray::new(Vector3::new(0.0, 0.0, 1.0), Vector3::X);
        assert!(parallel.distance_to_plane(&plane).is_none());
        assert!(!parallel.intersects_plane(&plane));
    }

    #[test]
    fn test_segment_distance() {
        let ray = Ray::new(Vector3::ZERO, Vector3::X);

        // Segment crossing above the ray
        let approach = ray.distance_sq_to_segment(Vector3::new(3.0, 2.0, -1.0), Vector3::new(3.0, 2.0, 1.0));
        assert_relative_eq!(approach.distance_sq, 4.0, epsilon = 1e-5);
        assert_relative_eq!(approach.point_on_ray, Vector3::new(3.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(approach.point_on_segment, Vector3::new(3.0, 2.0, 0.0), epsilon = 1e-5);

        // Segment behind the origin clamps the ray parameter to zero
        let behind = ray.distance_sq_to_segment(Vector3::new(-3.0, 1.0, 0.0), Vector3::new(-3.0, 2.0, 0.0));
        assert_relative_eq!(behind.point_on_ray, Vector3::ZERO, epsilon = 1e-5);
        assert_relative_eq!(behind.distance_sq, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_apply_matrix4_and_recast() {
        let mut ray = down_z();
        ray.apply_matrix4(&Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0)));
        assert_relative_eq!(ray.origin, Vector3::new(1.0, 0.0, 5.0));
        assert_relative_eq!(ray.direction, -Vector3::Z);

        ray.recast(2.0);
        assert_relative_eq!(ray.origin, Vector3::new(1.0, 0.0, 3.0));
        assert_relative_eq!(ray.distance_to_point(Vector3::new(1.0, 4.0, 0.0)), 4.0);
    }
}
