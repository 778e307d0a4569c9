use serde::{Deserialize, Serialize};

use super::{Box3, Matrix4, Plane, Sphere, Vector3};

/// Six clipping planes with normals pointing inwards
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frustum {
    /// Right, left, bottom, top, far, near
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Frustum of a combined projection * view matrix
    #[must_use]
    pub fn from_projection_matrix(m: &Matrix4) -> Self {
        let mut frustum = Self::default();
        frustum.set_from_projection_matrix(m);
        frustum
    }

    /// Extract the planes from a projection (or projection * view) matrix
    pub fn set_from_projection_matrix(&mut self, m: &Matrix4) -> &mut Self {
        let me = &m.elements;
        let row = |i: usize| [me[i], me[i + 4], me[i + 8], me[i + 12]];
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let combos = [
            (r0, -1.0),
            (r0, 1.0),
            (r1, 1.0),
            (r1, -1.0),
            (r2, -1.0),
            (r2, 1.0),
        ];
        for (plane, (r, sign)) in self.planes.iter_mut().zip(combos) {
            plane
                .set_components(
                    r3[0] + sign * r[0],
                    r3[1] + sign * r[1],
                    r3[2] + sign * r[2],
                    r3[3] + sign * r[3],
                )
                .normalize();
        }
        self
    }

    /// Whether any part of `sphere` is inside
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(sphere.center) >= -sphere.radius)
    }

    /// Whether any part of `b` is inside
    #[must_use]
    pub fn intersects_box(&self, b: &Box3) -> bool {
        self.planes.iter().all(|plane| {
            // corner furthest along the plane normal
            let n = plane.normal;
            let corner = Vector3::new(
                if n.x > 0.0 { b.max.x } else { b.min.x },
                if n.y > 0.0 { b.max.y } else { b.min.y },
                if n.z > 0.0 { b.max.z } else { b.min.z },
            );
            plane.distance_to_point(corner) >= 0.0
        })
    }

    /// Whether `point` is inside every plane
    #[must_use]
    pub fn contains_point(&self, point: Vector3) -> bool {
        self.planes.iter().all(|plane| plane.distance_to_point(point) >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_frustum() -> Frustum {
        let mut projection = Matrix4::IDENTITY;
        projection.make_perspective(-1.0, 1.0, 1.0, -1.0, 1.0, 100.0);
        Frustum::from_projection_matrix(&projection)
    }

    #[test]
    fn test_points_inside_and_outside() {
        let frustum = camera_frustum();
        assert!(frustum.contains_point(Vector3::new(0.0, 0.0, -10.0)));
        assert!(!frustum.contains_point(Vector3::new(0.0, 0.0, 10.0)));
        assert!(!frustum.contains_point(Vector3::new(0.0, 0.0, -200.0)));
        assert!(!frustum.contains_point(Vector3::new(50.0, 0.0, -10.0)));
    }

    #[test]
    fn test_bounding_volume_culling() {
        let frustum = camera_frustum();
        assert!(frustum.intersects_sphere(&Sphere::new(Vector3::new(0.0, 0.0, -50.0), 1.0)));
        assert!(!frustum.intersects_sphere(&Sphere::new(Vector3::new(0.0, 0.0, 5.0), 1.0)));

        let straddling = Box3::new(Vector3::new(9.0, -1.0, -11.0), Vector3::new(11.0, 1.0, -9.0));
        assert!(frustum.intersects_box(&straddling));
        let behind = Box3::new(Vector3::new(-1.0, -1.0, 1.0), Vector3::new(1.0, 1.0, 3.0));
        assert!(!frustum.intersects_box(&behind));
    }
}
