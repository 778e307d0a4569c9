use serde::{Deserialize, Serialize};

use super::{Box3, Plane, Vector2, Vector3};

/// Triangle with counter-clockwise front face winding `a → b → c`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Triangle {
    /// First vertex
    pub a: Vector3,
    /// Second vertex
    pub b: Vector3,
    /// Third vertex
    pub c: Vector3,
}

impl Triangle {
    /// Create a triangle
    #[must_use]
    pub const fn new(a: Vector3, b: Vector3, c: Vector3) -> Self {
        Self { a, b, c }
    }

    /// Overwrite the vertices
    pub fn set(&mut self, a: Vector3, b: Vector3, c: Vector3) -> &mut Self {
        *self = Self::new(a, b, c);
        self
    }

    /// Take the vertices from `points` at the given indices
    pub fn set_from_points_and_indices(&mut self, points: &[Vector3], i0: usize, i1: usize, i2: usize) -> &mut Self {
        self.set(points[i0], points[i1], points[i2])
    }

    /// Unit normal of the triangle `a, b, c`; zero when degenerate
    #[must_use]
    pub fn get_normal(a: Vector3, b: Vector3, c: Vector3) -> Vector3 {
        let normal = (c - b).cross(a - b);
        if normal.length_squared() > 0.0 {
            normal.normalized()
        } else {
            Vector3::ZERO
        }
    }

    /// Barycentric coordinates of `point` relative to `a, b, c`, or `None`
    /// when the triangle is degenerate
    #[must_use]
    pub fn get_barycoord(point: Vector3, a: Vector3, b: Vector3, c: Vector3) -> Option<Vector3> {
        let v0 = c - a;
        let v1 = b - a;
        let v2 = point - a;

        let dot00 = v0.dot(v0);
        let dot01 = v0.dot(v1);
        let dot02 = v0.dot(v2);
        let dot11 = v1.dot(v1);
        let dot12 = v1.dot(v2);

        let denominator = dot00 * dot11 - dot01 * dot01;
        if denominator == 0.0 {
            return None;
        }

        let inv_denominator = 1.0 / denominator;
        let u = (dot11 * dot02 - dot01 * dot12) * inv_denominator;
        let v = (dot00 * dot12 - dot01 * dot02) * inv_denominator;

        // barycentric x, y, z weight a, b, c respectively
        Some(Vector3::new(1.0 - u - v, v, u))
    }

    /// Whether `point`, projected into the triangle plane, lies inside
    #[must_use]
    pub fn contains(point: Vector3, a: Vector3, b: Vector3, c: Vector3) -> bool {
        Self::get_barycoord(point, a, b, c).is_some_and(|bary| bary.x >= 0.0 && bary.y >= 0.0 && bary.x + bary.y <= 1.0)
    }

    /// Interpolate per-vertex texture coordinates at `point`
    #[must_use]
    pub fn get_uv(point: Vector3, p1: Vector3, p2: Vector3, p3: Vector3, uv1: Vector2, uv2: Vector2, uv3: Vector2) -> Option<Vector2> {
        Self::get_barycoord(point, p1, p2, p3).map(|bary| uv1 * bary.x + uv2 * bary.y + uv3 * bary.z)
    }

    /// Whether a ray travelling along `direction` sees the front face
    #[must_use]
    pub fn is_front_facing_points(a: Vector3, b: Vector3, c: Vector3, direction: Vector3) -> bool {
        (c - b).cross(a - b).dot(direction) < 0.0
    }

    /// Unit normal
    #[must_use]
    pub fn normal(&self) -> Vector3 {
        Self::get_normal(self.a, self.b, self.c)
    }

    /// Barycentric coordinates of `point`
    #[must_use]
    pub fn barycoord(&self, point: Vector3) -> Option<Vector3> {
        Self::get_barycoord(point, self.a, self.b, self.c)
    }

    /// Whether `point` lies inside the triangle
    #[must_use]
    pub fn contains_point(&self, point: Vector3) -> bool {
        Self::contains(point, self.a, self.b, self.c)
    }

    /// Texture coordinates at `point`
    #[must_use]
    pub fn uv(&self, point: Vector3, uv1: Vector2, uv2: Vector2, uv3: Vector2) -> Option<Vector2> {
        Self::get_uv(point, self.a, self.b, self.c, uv1, uv2, uv3)
    }

    /// Whether the front face is visible along `direction`
    #[must_use]
    pub fn is_front_facing(&self, direction: Vector3) -> bool {
        Self::is_front_facing_points(self.a, self.b, self.c, direction)
    }

    /// Surface area
    #[must_use]
    pub fn area(&self) -> f32 {
        (self.c - self.b).cross(self.a - self.b).length() * 0.5
    }

    /// Centroid
    #[must_use]
    pub fn midpoint(&self) -> Vector3 {
        (self.a + self.b + self.c) * (1.0 / 3.0)
    }

    /// Plane containing the triangle
    #[must_use]
    pub fn plane(&self) -> Plane {
        let mut plane = Plane::default();
        plane.set_from_coplanar_points(self.a, self.b, self.c);
        plane
    }

    /// Bounding box of the three vertices
    #[must_use]
    pub fn bounding_box(&self) -> Box3 {
        Box3::from_points(&[self.a, self.b, self.c])
    }

    /// Closest point on the triangle to `point`, classified by Voronoi region
    #[must_use]
    pub fn closest_point_to_point(&self, point: Vector3) -> Vector3 {
        let (a, b, c) = (self.a, self.b, self.c);
        let ab = b - a;
        let ac = c - a;

        // Vertex region outside a
        let ap = point - a;
        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        // Vertex region outside b
        let bp = point - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        // Edge region ab
        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            return a + ab * (d1 / (d1 - d3));
        }

        // Vertex region outside c
        let cp = point - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        // Edge region ac
        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            return a + ac * (d2 / (d2 - d6));
        }

        // Edge region bc
        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        // Face region
        let denominator = 1.0 / (va + vb + vc);
        let v = vb * denominator;
        let w = vc * denominator;
        a + ab * v + ac * w
    }
}
