//! Renderable payloads and their ray hit tests
//!
//! Meshes, lines and point clouds reference a [`SharedGeometry`]; the hit
//! tests read it through the `RefCell` and only borrow it mutably to fill
//! in a missing bounding sphere.

use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::foundation::math::constants::EPSILON;
use crate::foundation::math::{Matrix4, Ray, Sphere, Triangle, Vector3};
use crate::geometry::{names, BufferAttribute, BufferGeometry, SharedGeometry};
use crate::spatial::{Face, Intersection, Raycast, Raycaster};

/// Which triangle faces are hit (and drawn)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Side {
    /// Counter-clockwise faces only
    #[default]
    Front,
    /// Clockwise faces only
    Back,
    /// Both
    Double,
}

/// Triangle mesh
#[derive(Debug, Clone)]
pub struct MeshObject {
    /// Vertex data, possibly shared with other nodes
    pub geometry: SharedGeometry,
    /// Face culling mode
    pub side: Side,
}

impl MeshObject {
    /// Front-sided mesh
    #[must_use]
    pub fn new(geometry: SharedGeometry) -> Self {
        Self { geometry, side: Side::Front }
    }

    /// Set the culling mode
    #[must_use]
    pub const fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }
}

/// How consecutive vertices form line segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineKind {
    /// Each vertex connects to the next
    #[default]
    Strip,
    /// Vertex pairs form independent segments
    Segments,
    /// Strip with the last vertex connected back to the first
    Loop,
}

/// Polyline
#[derive(Debug, Clone)]
pub struct LineObject {
    /// Vertex data, possibly shared with other nodes
    pub geometry: SharedGeometry,
    /// Segment topology
    pub kind: LineKind,
}

impl LineObject {
    /// Line with the given topology
    #[must_use]
    pub const fn new(geometry: SharedGeometry, kind: LineKind) -> Self {
        Self { geometry, kind }
    }
}

/// Point cloud
#[derive(Debug, Clone)]
pub struct PointsObject {
    /// Vertex data, possibly shared with other nodes
    pub geometry: SharedGeometry,
}

impl PointsObject {
    /// Point cloud over `geometry`
    #[must_use]
    pub const fn new(geometry: SharedGeometry) -> Self {
        Self { geometry }
    }
}

/// Light source; only its placement matters to the kernel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// Linear RGB color
    pub color: Vector3,
    /// Intensity multiplier
    pub intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self { color: Vector3::ONE, intensity: 1.0 }
    }
}

/// World bounding sphere grown by `padding`, computing the local one if
/// the geometry has none yet
fn world_bounding_sphere(geometry: &SharedGeometry, matrix_world: &Matrix4, padding: f32) -> Option<Sphere> {
    let mut sphere = geometry.borrow_mut().ensure_bounding_sphere();
    if sphere.is_empty() {
        return None;
    }
    sphere.apply_matrix4(matrix_world);
    sphere.radius += padding;
    Some(sphere)
}

/// Ray in the object's local space, or `None` for a singular transform
fn local_ray(raycaster: &Raycaster, matrix_world: &Matrix4) -> Option<Ray> {
    let inverse = matrix_world.try_inverse()?;
    let mut ray = raycaster.ray;
    ray.apply_matrix4(&inverse);
    Some(ray)
}

/// World-space threshold converted to local units using the average scale
fn local_threshold_sq(threshold: f32, matrix_world: &Matrix4) -> f32 {
    let mut scale = Vector3::ZERO;
    scale.set_from_matrix_scale(matrix_world);
    let local = threshold / ((scale.x + scale.y + scale.z) / 3.0);
    local * local
}

/// Position attribute usable as 3D points; anything narrower is skipped
fn positions_3d(geometry: &BufferGeometry, object: NodeId) -> Option<&BufferAttribute> {
    let position = geometry.attribute(names::POSITION)?;
    if position.item_size() < 3 {
        log::warn!(
            "{object:?}: position item_size {} cannot be hit-tested, skipping",
            position.item_size()
        );
        return None;
    }
    Some(position)
}

/// Material slot of the group covering `element`, 0 outside every group
fn material_index_at(geometry: &BufferGeometry, element: usize) -> usize {
    geometry
        .groups()
        .iter()
        .find(|group| (group.start..group.start + group.count).contains(&element))
        .map_or(0, |group| group.material_index)
}

/// Half-open range of element positions within the draw range
fn drawn_elements(geometry: &BufferGeometry, position: &BufferAttribute) -> (usize, usize) {
    let len = geometry.index().map_or_else(|| position.count(), BufferAttribute::count);
    geometry.draw_range().clamp(len)
}

/// Vertex referenced by element `i`
fn vertex_at(geometry: &BufferGeometry, i: usize) -> usize {
    geometry.index().map_or(i, |index| index.get_index(i))
}

impl MeshObject {
    fn hit_triangle(
        &self,
        ray: &Ray,
        raycaster: &Raycaster,
        matrix_world: &Matrix4,
        triangle: [Vector3; 3],
    ) -> Option<(Vector3, Vector3, f32)> {
        let [a, b, c] = triangle;
        let local_point = match self.side {
            Side::Front => ray.intersect_triangle(a, b, c, true),
            Side::Back => ray.intersect_triangle(c, b, a, true),
            Side::Double => ray.intersect_triangle(a, b, c, false),
        }?;

        let mut world_point = local_point;
        world_point.apply_matrix4(matrix_world);
        let distance = raycaster.ray.origin.distance_to(world_point);
        raycaster
            .accepts(distance)
            .then_some((local_point, world_point, distance))
    }
}

impl Raycast for MeshObject {
    fn raycast(&self, object: NodeId, matrix_world: &Matrix4, raycaster: &Raycaster, intersects: &mut Vec<Intersection>) {
        let Some(sphere) = world_bounding_sphere(&self.geometry, matrix_world, 0.0) else {
            return;
        };
        if !raycaster.ray.intersects_sphere(&sphere) {
            return;
        }
        let Some(ray) = local_ray(raycaster, matrix_world) else {
            log::trace!("mesh {object:?}: singular world matrix, skipping");
            return;
        };

        let geometry = self.geometry.borrow();
        if geometry.bounding_box().is_some_and(|bounds| !ray.intersects_box(bounds)) {
            return;
        }
        let Some(position) = positions_3d(&geometry, object) else {
            return;
        };
        let uv = geometry.attribute(names::UV);
        let vertex_count = position.count();

        let (start, end) = drawn_elements(&geometry, position);
        let mut hits: Vec<Intersection> = Vec::new();
        let mut i = start;
        while i + 2 < end {
            let (a, b, c) = (vertex_at(&geometry, i), vertex_at(&geometry, i + 1), vertex_at(&geometry, i + 2));
            let element = i;
            i += 3;
            if a >= vertex_count || b >= vertex_count || c >= vertex_count {
                continue;
            }

            let (va, vb, vc) = (position.get_vector3(a), position.get_vector3(b), position.get_vector3(c));
            let Some((local_point, point, distance)) = self.hit_triangle(&ray, raycaster, matrix_world, [va, vb, vc])
            else {
                continue;
            };

            // a ray through an edge shared by two triangles reports the surface once
            let tolerance = EPSILON * distance.max(1.0);
            if hits.iter().any(|hit| hit.point.distance_to(point) <= tolerance) {
                continue;
            }

            let mut hit = Intersection::new(distance, point, object);
            hit.face = Some(Face {
                a,
                b,
                c,
                normal: Triangle::get_normal(va, vb, vc),
                material_index: material_index_at(&geometry, element),
            });
            hit.face_index = Some(element / 3);
            hit.uv = uv.and_then(|uv| {
                Triangle::get_uv(local_point, va, vb, vc, uv.get_vector2(a), uv.get_vector2(b), uv.get_vector2(c))
            });
            hits.push(hit);
        }

        intersects.extend(hits);
    }
}

impl Raycast for LineObject {
    fn raycast(&self, object: NodeId, matrix_world: &Matrix4, raycaster: &Raycaster, intersects: &mut Vec<Intersection>) {
        let threshold = raycaster.params.line_threshold;
        let Some(sphere) = world_bounding_sphere(&self.geometry, matrix_world, threshold) else {
            return;
        };
        if !raycaster.ray.intersects_sphere(&sphere) {
            return;
        }
        let Some(ray) = local_ray(raycaster, matrix_world) else {
            return;
        };
        let threshold_sq = local_threshold_sq(threshold, matrix_world);

        let geometry = self.geometry.borrow();
        let Some(position) = positions_3d(&geometry, object) else {
            return;
        };
        let vertex_count = position.count();
        let (start, end) = drawn_elements(&geometry, position);
        if end <= start + 1 {
            return;
        }

        let step = if self.kind == LineKind::Segments { 2 } else { 1 };
        let mut segments: Vec<(usize, usize, usize)> = (start..end - 1)
            .step_by(step)
            .map(|i| (i, vertex_at(&geometry, i), vertex_at(&geometry, i + 1)))
            .collect();
        if self.kind == LineKind::Loop {
            segments.push((end - 1, vertex_at(&geometry, end - 1), vertex_at(&geometry, start)));
        }

        for (element, a, b) in segments {
            if a >= vertex_count || b >= vertex_count {
                continue;
            }
            let approach = ray.distance_sq_to_segment(position.get_vector3(a), position.get_vector3(b));
            if approach.distance_sq > threshold_sq {
                continue;
            }

            let mut on_ray = approach.point_on_ray;
            on_ray.apply_matrix4(matrix_world);
            let distance = raycaster.ray.origin.distance_to(on_ray);
            if !raycaster.accepts(distance) {
                continue;
            }

            let mut point = approach.point_on_segment;
            point.apply_matrix4(matrix_world);
            let mut hit = Intersection::new(distance, point, object);
            hit.index = Some(element);
            intersects.push(hit);
        }
    }
}

impl Raycast for PointsObject {
    fn raycast(&self, object: NodeId, matrix_world: &Matrix4, raycaster: &Raycaster, intersects: &mut Vec<Intersection>) {
        let threshold = raycaster.params.points_threshold;
        let Some(sphere) = world_bounding_sphere(&self.geometry, matrix_world, threshold) else {
            return;
        };
        if !raycaster.ray.intersects_sphere(&sphere) {
            return;
        }
        let Some(ray) = local_ray(raycaster, matrix_world) else {
            return;
        };
        let threshold_sq = local_threshold_sq(threshold, matrix_world);

        let geometry = self.geometry.borrow();
        let Some(position) = positions_3d(&geometry, object) else {
            return;
        };
        let (start, end) = drawn_elements(&geometry, position);

        for element in start..end {
            let vertex = vertex_at(&geometry, element);
            if vertex >= position.count() {
                continue;
            }
            let local = position.get_vector3(vertex);
            let ray_distance_sq = ray.distance_sq_to_point(local);
            if ray_distance_sq >= threshold_sq {
                continue;
            }

            let mut point = ray.closest_point_to_point(local);
            point.apply_matrix4(matrix_world);
            let distance = raycaster.ray.origin.distance_to(point);
            if !raycaster.accepts(distance) {
                continue;
            }

            let mut hit = Intersection::new(distance, point, object);
            hit.distance_to_ray = Some(ray_distance_sq.sqrt());
            hit.index = Some(vertex);
            intersects.push(hit);
        }
    }
}
