//! Procedural geometry generators
//!
//! Every generator emits indexed triangles wound counter-clockwise when seen
//! from outside, with `position`, `normal` and `uv` attributes.

use std::f32::consts::PI;

use super::attribute::BufferAttribute;
use super::buffer_geometry::{names, BufferGeometry};
use crate::foundation::math::Vector3;

#[derive(Default)]
struct Builder {
    positions: Vec<f32>,
    normals: Vec<f32>,
    uvs: Vec<f32>,
    indices: Vec<u32>,
}

impl Builder {
    fn vertex_count(&self) -> u32 {
        u32::try_from(self.positions.len() / 3).unwrap_or(u32::MAX)
    }

    fn push_vertex(&mut self, position: Vector3, normal: Vector3, u: f32, v: f32) {
        self.positions.extend_from_slice(&position.to_array());
        self.normals.extend_from_slice(&normal.to_array());
        self.uvs.extend_from_slice(&[u, v]);
    }

    fn build(self, name: &str) -> BufferGeometry {
        let mut geometry = BufferGeometry::new();
        geometry.name = name.to_string();
        geometry
            .set_attribute(names::POSITION, BufferAttribute::float32(self.positions, 3))
            .set_attribute(names::NORMAL, BufferAttribute::float32(self.normals, 3))
            .set_attribute(names::UV, BufferAttribute::float32(self.uvs, 2))
            .set_indices(&self.indices);
        geometry
    }
}

/// Axis-aligned box centered on the origin, one material group per face
/// (+X, -X, +Y, -Y, +Z, -Z)
#[must_use]
pub fn box_geometry(width: f32, height: f32, depth: f32) -> BufferGeometry {
    let mut builder = Builder::default();
    let mut group_start = 0;
    let mut groups = Vec::with_capacity(6);

    // (u axis, v axis, w axis, u direction, v direction, extents, material)
    let faces = [
        (2, 1, 0, -1.0, -1.0, depth, height, width, 0),
        (2, 1, 0, 1.0, -1.0, depth, height, -width, 1),
        (0, 2, 1, 1.0, 1.0, width, depth, height, 2),
        (0, 2, 1, 1.0, -1.0, width, depth, -height, 3),
        (0, 1, 2, 1.0, -1.0, width, height, depth, 4),
        (0, 1, 2, -1.0, -1.0, width, height, -depth, 5),
    ];

    for (u, v, w, u_dir, v_dir, face_width, face_height, face_depth, material) in faces {
        let start = builder.vertex_count();
        for iy in 0..2u8 {
            for ix in 0..2u8 {
                let x = f32::from(ix).mul_add(face_width, -face_width / 2.0);
                let y = f32::from(iy).mul_add(face_height, -face_height / 2.0);

                let mut position = Vector3::ZERO;
                position.set_component(u, x * u_dir);
                position.set_component(v, y * v_dir);
                position.set_component(w, face_depth / 2.0);

                let mut normal = Vector3::ZERO;
                normal.set_component(w, if face_depth > 0.0 { 1.0 } else { -1.0 });

                builder.push_vertex(position, normal, f32::from(ix), 1.0 - f32::from(iy));
            }
        }

        let (a, b, c, d) = (start, start + 2, start + 3, start + 1);
        builder.indices.extend_from_slice(&[a, b, d, b, c, d]);
        groups.push((group_start, 6, material));
        group_start += 6;
    }

    let mut geometry = builder.build("box");
    for (start, count, material) in groups {
        geometry.add_group(start, count, material);
    }
    geometry
}

/// Rectangle in the XY plane facing +Z, subdivided into a grid
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn plane_geometry(width: f32, height: f32, width_segments: u32, height_segments: u32) -> BufferGeometry {
    let grid_x = width_segments.max(1);
    let grid_y = height_segments.max(1);
    let segment_width = width / grid_x as f32;
    let segment_height = height / grid_y as f32;

    let mut builder = Builder::default();
    for iy in 0..=grid_y {
        let y = (iy as f32).mul_add(segment_height, -height / 2.0);
        for ix in 0..=grid_x {
            let x = (ix as f32).mul_add(segment_width, -width / 2.0);
            builder.push_vertex(
                Vector3::new(x, -y, 0.0),
                Vector3::Z,
                ix as f32 / grid_x as f32,
                1.0 - iy as f32 / grid_y as f32,
            );
        }
    }

    let row = grid_x + 1;
    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = ix + row * iy;
            let b = ix + row * (iy + 1);
            let c = (ix + 1) + row * (iy + 1);
            let d = (ix + 1) + row * iy;
            builder.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    builder.build("plane")
}

/// UV sphere centered on the origin
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sphere_geometry(radius: f32, width_segments: u32, height_segments: u32) -> BufferGeometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut builder = Builder::default();
    let mut grid = Vec::with_capacity(height_segments as usize + 1);

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        // shift pole texture coordinates to the middle of their segment
        let u_offset = if iy == 0 {
            0.5 / width_segments as f32
        } else if iy == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };

        let mut row = Vec::with_capacity(width_segments as usize + 1);
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let (sin_phi, cos_phi) = (u * 2.0 * PI).sin_cos();
            let (sin_theta, cos_theta) = (v * PI).sin_cos();

            let position = Vector3::new(-radius * cos_phi * sin_theta, radius * cos_theta, radius * sin_phi * sin_theta);
            row.push(builder.vertex_count());
            builder.push_vertex(position, position.normalized(), u + u_offset, 1.0 - v);
        }
        grid.push(row);
    }

    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];

            if iy != 0 {
                builder.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                builder.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    builder.build("sphere")
}

/// Regular icosahedron with shared vertices; normals are smooth
#[must_use]
pub fn icosahedron_geometry(radius: f32) -> BufferGeometry {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;

    #[rustfmt::skip]
    let corners = [
        (-1.0, t, 0.0), (1.0, t, 0.0), (-1.0, -t, 0.0), (1.0, -t, 0.0),
        (0.0, -1.0, t), (0.0, 1.0, t), (0.0, -1.0, -t), (0.0, 1.0, -t),
        (t, 0.0, -1.0), (t, 0.0, 1.0), (-t, 0.0, -1.0), (-t, 0.0, 1.0),
    ];

    #[rustfmt::skip]
    let indices: [u32; 60] = [
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11,
        1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1, 8,
        3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9,
        4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
    ];

    let mut builder = Builder::default();
    for (x, y, z) in corners {
        let direction = Vector3::new(x, y, z).normalized();
        let u = 0.5 + direction.z.atan2(-direction.x) / (2.0 * PI);
        let v = 0.5 + direction.y.clamp(-1.0, 1.0).asin() / PI;
        builder.push_vertex(direction * radius, direction, u, v);
    }
    builder.indices.extend_from_slice(&indices);

    let mut geometry = builder.build("icosahedron");
    geometry.compute_vertex_normals();
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn assert_outward_unit_normals(geometry: &BufferGeometry) {
        let positions = geometry.attribute(names::POSITION).unwrap();
        let normals = geometry.attribute(names::NORMAL).unwrap();
        for i in 0..normals.count() {
            let n = normals.get_vector3(i);
            assert_relative_eq!(n.length(), 1.0, epsilon = EPSILON);
            assert!(n.dot(positions.get_vector3(i)) > 0.0);
        }
    }

    #[test]
    fn test_box_layout() {
        let geometry = box_geometry(1.0, 2.0, 3.0);
        assert_eq!(geometry.vertex_count(), 24);
        assert_eq!(geometry.index().unwrap().count(), 36);
        assert_eq!(geometry.groups().len(), 6);
        assert!(geometry.validate().is_ok());

        let mut geometry = geometry;
        let bounds = geometry.ensure_bounding_box();
        assert_relative_eq!(bounds.min, Vector3::new(-0.5, -1.0, -1.5));
        assert_relative_eq!(bounds.max, Vector3::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn test_box_faces_wind_outward() {
        let geometry = box_geometry(1.0, 1.0, 1.0);
        let positions = geometry.attribute(names::POSITION).unwrap();
        let normals = geometry.attribute(names::NORMAL).unwrap();
        let index = geometry.index().unwrap();
        for tri in 0..index.count() / 3 {
            let (a, b, c) = (index.get_index(tri * 3), index.get_index(tri * 3 + 1), index.get_index(tri * 3 + 2));
            let (pa, pb, pc) = (positions.get_vector3(a), positions.get_vector3(b), positions.get_vector3(c));
            let winding = (pc - pb).cross(pa - pb);
            assert!(winding.dot(normals.get_vector3(a)) > 0.0);
        }
    }

    #[test]
    fn test_plane_grid() {
        let geometry = plane_geometry(2.0, 2.0, 2, 3);
        assert_eq!(geometry.vertex_count(), 12);
        assert_eq!(geometry.index().unwrap().count(), 36);
        let normals = geometry.attribute(names::NORMAL).unwrap();
        assert_eq!(normals.get_vector3(5), Vector3::Z);
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let geometry = sphere_geometry(2.0, 8, 6);
        let positions = geometry.attribute(names::POSITION).unwrap();
        for i in 0..positions.count() {
            assert_relative_eq!(positions.get_vector3(i).length(), 2.0, epsilon = EPSILON);
        }
        // poles have one triangle per segment, every other band two
        assert_eq!(geometry.index().unwrap().count(), (8 * 2 + 8 * 4 * 2) * 3);
        assert_outward_unit_normals(&geometry);
    }

    #[test]
    fn test_icosahedron_normals_are_unit_length() {
        let geometry = icosahedron_geometry(1.5);
        assert_eq!(geometry.vertex_count(), 12);
        assert_eq!(geometry.index().unwrap().count(), 60);
        assert_outward_unit_normals(&geometry);
    }

    #[test]
    fn test_icosahedron_bounding_sphere_contains_vertices() {
        let mut geometry = icosahedron_geometry(3.0);
        let sphere = geometry.ensure_bounding_sphere();
        let positions = geometry.attribute(names::POSITION).unwrap();
        for i in 0..positions.count() {
            assert!(sphere.center.distance_to(positions.get_vector3(i)) <= sphere.radius + EPSILON);
        }
    }
}
