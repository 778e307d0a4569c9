//! Ray picking against a node hierarchy
//!
//! The raycaster walks the hierarchy, hands the world-space ray to every
//! node that implements [`Raycast`], and returns the collected hits sorted
//! by distance. Nodes are expected to have up-to-date world matrices; call
//! [`Scene::update_all`](crate::scene::Scene::update_all) first.

use serde::{Deserialize, Serialize};

use crate::config::RaycasterConfig;
use crate::error::{SceneError, SceneResult};
use crate::foundation::math::{Matrix4, Ray, Vector2, Vector3};
use crate::scene::{Layers, NodeId, NodeKind, Scene};

/// Per-node hit test.
///
/// Implementations append zero or more hits for `object` alone, never for
/// its children, and must discard hits outside
/// `[raycaster.near, raycaster.far]`.
pub trait Raycast {
    /// Test `raycaster.ray` (world space) against this payload placed at
    /// `matrix_world`
    fn raycast(&self, object: NodeId, matrix_world: &Matrix4, raycaster: &Raycaster, intersects: &mut Vec<Intersection>);
}

/// Triangle that produced a mesh hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// First vertex index
    pub a: usize,
    /// Second vertex index
    pub b: usize,
    /// Third vertex index
    pub c: usize,
    /// Geometric normal in the object's local space
    pub normal: Vector3,
    /// Material slot of the geometry group holding the triangle, 0 when
    /// no group covers it
    pub material_index: usize,
}

/// One ray hit
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    /// Distance from the ray origin to `point`
    pub distance: f32,
    /// Distance between the ray and the hit primitive (points only)
    pub distance_to_ray: Option<f32>,
    /// World-space hit point
    pub point: Vector3,
    /// Node that was hit
    pub object: NodeId,
    /// Triangle that was hit (meshes only)
    pub face: Option<Face>,
    /// Index of that triangle (meshes only)
    pub face_index: Option<usize>,
    /// Vertex or segment index (lines and points)
    pub index: Option<usize>,
    /// Interpolated texture coordinate, when the geometry has one
    pub uv: Option<Vector2>,
}

impl Intersection {
    /// Hit with only the mandatory fields set
    #[must_use]
    pub const fn new(distance: f32, point: Vector3, object: NodeId) -> Self {
        Self {
            distance,
            distance_to_ray: None,
            point,
            object,
            face: None,
            face_index: None,
            index: None,
            uv: None,
        }
    }
}

/// Hit-test tolerances for primitives without area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaycastParams {
    /// World-space pick radius around line segments
    pub line_threshold: f32,
    /// World-space pick radius around points
    pub points_threshold: f32,
}

impl Default for RaycastParams {
    fn default() -> Self {
        Self { line_threshold: 1.0, points_threshold: 1.0 }
    }
}

/// World-space ray plus the query settings every hit test shares
#[derive(Debug, Clone, PartialEq)]
pub struct Raycaster {
    /// Ray in world space; the direction must be normalized
    pub ray: Ray,
    /// Hits closer than this are discarded
    pub near: f32,
    /// Hits farther than this are discarded
    pub far: f32,
    /// Camera the ray was last cast from
    pub camera: Option<NodeId>,
    /// Only nodes sharing a channel are hit tested
    pub layers: Layers,
    /// Line and point tolerances
    pub params: RaycastParams,
}

impl Default for Raycaster {
    fn default() -> Self {
        Self::from_config(&RaycasterConfig::default())
    }
}

impl Raycaster {
    /// Raycaster for a ray and distance window
    #[must_use]
    pub fn new(origin: Vector3, direction: Vector3, near: f32, far: f32) -> Self {
        Self {
            ray: Ray::new(origin, direction),
            near,
            far,
            ..Self::default()
        }
    }

    /// Raycaster with settings taken from configuration; the ray starts at the
    /// origin looking down -Z
    #[must_use]
    pub fn from_config(config: &RaycasterConfig) -> Self {
        Self {
            ray: Ray::default(),
            near: config.near,
            far: config.far,
            camera: None,
            layers: Layers::from_mask(config.layers),
            params: RaycastParams {
                line_threshold: config.line_threshold,
                points_threshold: config.points_threshold,
            },
        }
    }

    /// Replace the ray; `direction` must be normalized
    pub fn set(&mut self, origin: Vector3, direction: Vector3) -> &mut Self {
        self.ray.set(origin, direction);
        self
    }

    /// Cast from a camera through normalized device coordinates
    /// (`-1..1` on both axes, +Y up)
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle and
    /// [`SceneError::UnsupportedCamera`] when the node is not a camera.
    pub fn set_from_camera(&mut self, coords: Vector2, scene: &Scene, camera: NodeId) -> SceneResult<&mut Self> {
        let node = scene.get(camera)?;
        let matrix_world = node.matrix_world;

        match &node.kind {
            NodeKind::PerspectiveCamera(lens) => {
                let mut origin = Vector3::ZERO;
                origin.set_from_matrix_position(&matrix_world);
                let mut direction = Vector3::new(coords.x, coords.y, 0.5);
                direction.unproject(&lens.projection_matrix_inverse, &matrix_world);
                direction -= origin;
                self.ray.set(origin, direction.normalized());
            }
            NodeKind::OrthographicCamera(lens) => {
                let mut origin = Vector3::new(coords.x, coords.y, (lens.near + lens.far) / (lens.near - lens.far));
                origin.unproject(&lens.projection_matrix_inverse, &matrix_world);
                let mut direction = Vector3::new(0.0, 0.0, -1.0);
                direction.transform_direction(&matrix_world);
                self.ray.set(origin, direction);
            }
            other => {
                log::error!("Raycaster::set_from_camera: unsupported camera type {}", other.type_name());
                return Err(SceneError::UnsupportedCamera(other.type_name().to_string()));
            }
        }

        self.camera = Some(camera);
        Ok(self)
    }

    /// Hits on `object` (and its descendants when `recursive`), nearest first
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn intersect_object(&self, scene: &Scene, object: NodeId, recursive: bool) -> SceneResult<Vec<Intersection>> {
        let mut intersects = Vec::new();
        self.intersect_object_into(scene, object, recursive, &mut intersects)?;
        Ok(intersects)
    }

    /// Append hits to `intersects`, then sort the whole accumulator
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn intersect_object_into(
        &self,
        scene: &Scene,
        object: NodeId,
        recursive: bool,
        intersects: &mut Vec<Intersection>,
    ) -> SceneResult<()> {
        scene.get(object)?;
        self.visit(scene, object, recursive, intersects);
        sort_by_distance(intersects);
        Ok(())
    }

    /// Hits on several roots, nearest first
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] when any handle is stale.
    pub fn intersect_objects(&self, scene: &Scene, objects: &[NodeId], recursive: bool) -> SceneResult<Vec<Intersection>> {
        let mut intersects = Vec::new();
        self.intersect_objects_into(scene, objects, recursive, &mut intersects)?;
        Ok(intersects)
    }

    /// Append hits on several roots to `intersects`, then sort it
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] when any handle is stale.
    pub fn intersect_objects_into(
        &self,
        scene: &Scene,
        objects: &[NodeId],
        recursive: bool,
        intersects: &mut Vec<Intersection>,
    ) -> SceneResult<()> {
        for &object in objects {
            scene.get(object)?;
        }
        for &object in objects {
            self.visit(scene, object, recursive, intersects);
        }
        sort_by_distance(intersects);
        Ok(())
    }

    fn visit(&self, scene: &Scene, id: NodeId, recursive: bool, intersects: &mut Vec<Intersection>) {
        let Some(node) = scene.node(id) else {
            return;
        };
        if !node.visible {
            return;
        }

        if node.layers.test(&self.layers) {
            if let Some(target) = node.kind.as_raycast() {
                let before = intersects.len();
                target.raycast(id, &node.matrix_world, self, intersects);
                log::trace!("raycast {:?} ({}): {} hit(s)", id, node.kind.type_name(), intersects.len() - before);
            }
        }

        if recursive {
            for &child in node.children() {
                self.visit(scene, child, true, intersects);
            }
        }
    }

    /// Whether `distance` lies inside `[near, far]`
    #[must_use]
    pub fn accepts(&self, distance: f32) -> bool {
        distance >= self.near && distance <= self.far
    }
}

/// Stable ascending sort; ties keep insertion order
fn sort_by_distance(intersects: &mut [Intersection]) {
    intersects.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives::{box_geometry, plane_geometry};
    use crate::geometry::{names, BufferAttribute, BufferGeometry};
    use crate::scene::{LineKind, LineObject, MeshObject, OrthographicCamera, PerspectiveCamera, PointsObject, Side};
    use approx::assert_relative_eq;
    use std::rc::Rc;

    const EPSILON: f32 = 1e-5;

    fn mesh(scene: &mut Scene, geometry: BufferGeometry, z: f32) -> NodeId {
        let id = scene.create(NodeKind::Mesh(MeshObject::new(geometry.into_shared())));
        scene.node_mut(id).unwrap().set_position(Vector3::new(0.0, 0.0, z));
        id
    }

    fn down_z(origin_z: f32) -> Raycaster {
        Raycaster::new(Vector3::new(0.0, 0.0, origin_z), Vector3::new(0.0, 0.0, -1.0), 0.0, f32::INFINITY)
    }

    #[test]
    fn test_unit_box_single_hit() {
        let mut scene = Scene::new();
        let cube = mesh(&mut scene, box_geometry(1.0, 1.0, 1.0), 0.0);
        scene.update_all(false);

        let hits = down_z(5.0).intersect_object(&scene, cube, false).unwrap();
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].distance, 4.5, epsilon = EPSILON);
        assert_relative_eq!(hits[0].point, Vector3::new(0.0, 0.0, 0.5), epsilon = EPSILON);
        assert_eq!(hits[0].object, cube);

        let face = hits[0].face.unwrap();
        assert_relative_eq!(face.normal, Vector3::Z, epsilon = EPSILON);
        assert_eq!(face.material_index, 4);
        assert!(hits[0].face_index.is_some());
        assert_relative_eq!(hits[0].uv.unwrap(), Vector2::new(0.5, 0.5), epsilon = EPSILON);
    }

    #[test]
    fn test_hits_sorted_and_invisible_skipped() {
        let mut scene = Scene::new();
        let root = scene.create(NodeKind::Group);
        let far = mesh(&mut scene, plane_geometry(1.0, 1.0, 1, 1), -3.0);
        let near = mesh(&mut scene, plane_geometry(1.0, 1.0, 1, 1), 1.0);
        let middle = mesh(&mut scene, plane_geometry(1.0, 1.0, 1, 1), -1.0);
        for id in [far, near, middle] {
            scene.add(root, id).unwrap();
        }
        scene.update_all(false);

        let raycaster = down_z(5.0);
        let hits = raycaster.intersect_object(&scene, root, true).unwrap();
        let order: Vec<NodeId> = hits.iter().map(|h| h.object).collect();
        assert_eq!(order, vec![near, middle, far]);
        assert!(hits.windows(2).all(|w| w[0].distance < w[1].distance));

        scene.node_mut(middle).unwrap().visible = false;
        let hits = raycaster.intersect_object(&scene, root, true).unwrap();
        assert!(hits.iter().all(|h| h.object != middle));
        assert_eq!(hits.len(), 2);

        scene.node_mut(root).unwrap().visible = false;
        assert!(raycaster.intersect_object(&scene, root, true).unwrap().is_empty());
    }

    #[test]
    fn test_non_recursive_ignores_children() {
        let mut scene = Scene::new();
        let parent = mesh(&mut scene, plane_geometry(1.0, 1.0, 1, 1), 0.0);
        let child = mesh(&mut scene, plane_geometry(1.0, 1.0, 1, 1), 1.0);
        scene.add(parent, child).unwrap();
        scene.update_all(false);

        let raycaster = down_z(5.0);
        assert_eq!(raycaster.intersect_object(&scene, parent, false).unwrap().len(), 1);
        assert_eq!(raycaster.intersect_object(&scene, parent, true).unwrap().len(), 2);
    }

    #[test]
    fn test_layers_skip_hit_test_but_not_children() {
        let mut scene = Scene::new();
        let parent = mesh(&mut scene, plane_geometry(1.0, 1.0, 1, 1), 0.0);
        let child = mesh(&mut scene, plane_geometry(1.0, 1.0, 1, 1), 1.0);
        scene.add(parent, child).unwrap();
        scene.node_mut(parent).unwrap().layers.set(4);
        scene.update_all(false);

        let hits = down_z(5.0).intersect_object(&scene, parent, true).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].object, child);
    }

    #[test]
    fn test_near_far_window() {
        let mut scene = Scene::new();
        let plane = mesh(&mut scene, plane_geometry(1.0, 1.0, 1, 1), 0.0);
        scene.update_all(false);

        let mut raycaster = down_z(5.0);
        raycaster.far = 4.0;
        assert!(raycaster.intersect_object(&scene, plane, false).unwrap().is_empty());
        raycaster.far = 6.0;
        raycaster.near = 5.5;
        assert!(raycaster.intersect_object(&scene, plane, false).unwrap().is_empty());
        raycaster.near = 0.0;
        assert_eq!(raycaster.intersect_object(&scene, plane, false).unwrap().len(), 1);
    }

    #[test]
    fn test_side_culling() {
        let mut scene = Scene::new();
        let plane = mesh(&mut scene, plane_geometry(1.0, 1.0, 1, 1), 0.0);
        scene.update_all(false);

        let mut from_behind = down_z(-5.0);
        from_behind.set(Vector3::new(0.0, 0.0, -5.0), Vector3::Z);
        assert!(from_behind.intersect_object(&scene, plane, false).unwrap().is_empty());

        if let NodeKind::Mesh(m) = &mut scene.node_mut(plane).unwrap().kind {
            m.side = Side::Double;
        }
        assert_eq!(from_behind.intersect_object(&scene, plane, false).unwrap().len(), 1);

        if let NodeKind::Mesh(m) = &mut scene.node_mut(plane).unwrap().kind {
            m.side = Side::Back;
        }
        assert_eq!(from_behind.intersect_object(&scene, plane, false).unwrap().len(), 1);
        assert!(down_z(5.0).intersect_object(&scene, plane, false).unwrap().is_empty());
    }

    #[test]
    fn test_face_material_index_follows_groups() {
        let mut scene = Scene::new();
        let cube = mesh(&mut scene, box_geometry(1.0, 1.0, 1.0), 0.0);
        scene.update_all(false);

        let mut from_below = down_z(-5.0);
        from_below.set(Vector3::new(0.0, 0.0, -5.0), Vector3::Z);
        let hits = from_below.intersect_object(&scene, cube, false).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].face.unwrap().material_index, 5);

        let mut ungrouped = box_geometry(1.0, 1.0, 1.0);
        ungrouped.clear_groups();
        let plain = mesh(&mut scene, ungrouped, 0.0);
        scene.update_all(false);
        let hits = from_below.intersect_object(&scene, plain, false).unwrap();
        assert_eq!(hits[0].face.unwrap().material_index, 0);
    }

    #[test]
    fn test_two_component_positions_are_skipped() {
        crate::foundation::logging::init_for_tests();
        let mut geometry = BufferGeometry::new();
        geometry.set_from_points(&[
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ]);
        // cached bounds survive the swap, so the hit tests see the flat attribute
        geometry.ensure_bounding_sphere();
        geometry.set_attribute(names::POSITION, BufferAttribute::float32(vec![-1.0, -1.0, 1.0, -1.0, 0.0, 1.0], 2));
        let shared = geometry.into_shared();

        let mut scene = Scene::new();
        let triangle = scene.create(NodeKind::Mesh(MeshObject::new(Rc::clone(&shared))));
        let line = scene.create(NodeKind::Line(LineObject::new(Rc::clone(&shared), LineKind::Strip)));
        let points = scene.create(NodeKind::Points(PointsObject::new(shared)));
        scene.update_all(false);

        let mut raycaster = down_z(5.0);
        raycaster.params.line_threshold = 2.0;
        raycaster.params.points_threshold = 2.0;
        for id in [triangle, line, points] {
            assert!(raycaster.intersect_object(&scene, id, false).unwrap().is_empty());
        }
    }

    #[test]
    fn test_transformed_mesh_reports_world_point() {
        let mut scene = Scene::new();
        let cube = mesh(&mut scene, box_geometry(1.0, 1.0, 1.0), 0.0);
        {
            let node = scene.node_mut(cube).unwrap();
            node.set_position(Vector3::new(0.25, -0.1, -2.0));
            node.set_scale(Vector3::new(2.0, 2.0, 2.0));
        }
        scene.update_all(false);

        let hits = down_z(5.0).intersect_object(&scene, cube, false).unwrap();
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].point.z, -1.0, epsilon = EPSILON);
        assert_relative_eq!(hits[0].distance, 6.0, epsilon = EPSILON);
    }

    #[test]
    fn test_line_and_points_thresholds() {
        let mut geometry = BufferGeometry::new();
        geometry.set_from_points(&[Vector3::new(-1.0, 0.3, 0.0), Vector3::new(1.0, 0.3, 0.0)]);
        let shared = geometry.into_shared();

        let mut scene = Scene::new();
        let line = scene.create(NodeKind::Line(LineObject::new(Rc::clone(&shared), LineKind::Strip)));
        let points = scene.create(NodeKind::Points(PointsObject::new(Rc::clone(&shared))));
        scene.update_all(false);

        let mut raycaster = down_z(5.0);
        raycaster.params.line_threshold = 0.5;
        raycaster.params.points_threshold = 0.5;

        let line_hits = raycaster.intersect_object(&scene, line, false).unwrap();
        assert_eq!(line_hits.len(), 1);
        assert_eq!(line_hits[0].index, Some(0));
        assert_relative_eq!(line_hits[0].point, Vector3::new(0.0, 0.3, 0.0), epsilon = EPSILON);

        assert!(raycaster.intersect_object(&scene, points, false).unwrap().is_empty());
        raycaster.set(Vector3::new(1.1, 0.3, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let point_hits = raycaster.intersect_object(&scene, points, false).unwrap();
        assert_eq!(point_hits.len(), 1);
        assert_eq!(point_hits[0].index, Some(1));
        assert_relative_eq!(point_hits[0].distance_to_ray.unwrap(), 0.1, epsilon = EPSILON);

        raycaster.params.line_threshold = 0.05;
        raycaster.set(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(raycaster.intersect_object(&scene, line, false).unwrap().is_empty());
    }

    #[test]
    fn test_line_loop_closes() {
        let mut geometry = BufferGeometry::new();
        geometry.set_from_points(&[
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(-1.0, 1.0, 0.0),
        ]);
        let shared = geometry.into_shared();

        let mut scene = Scene::new();
        let strip = scene.create(NodeKind::Line(LineObject::new(Rc::clone(&shared), LineKind::Strip)));
        let closed = scene.create(NodeKind::Line(LineObject::new(shared, LineKind::Loop)));
        scene.update_all(false);

        let mut raycaster = Raycaster::new(Vector3::new(-1.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0), 0.0, f32::INFINITY);
        raycaster.params.line_threshold = 0.1;
        assert!(raycaster.intersect_object(&scene, strip, false).unwrap().is_empty());
        assert_eq!(raycaster.intersect_object(&scene, closed, false).unwrap().len(), 1);
    }

    #[test]
    fn test_indexed_draw_range_limits_triangles() {
        let mut geometry = plane_geometry(2.0, 2.0, 2, 1);
        geometry.set_draw_range(0, 6);
        let mut scene = Scene::new();
        let plane = mesh(&mut scene, geometry, 0.0);
        scene.update_all(false);

        // left cell is drawn, right cell is not
        let mut raycaster = down_z(5.0);
        raycaster.set(Vector3::new(-0.5, 0.3, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(raycaster.intersect_object(&scene, plane, false).unwrap().len(), 1);
        raycaster.set(Vector3::new(0.5, 0.3, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(raycaster.intersect_object(&scene, plane, false).unwrap().is_empty());
    }

    #[test]
    fn test_non_indexed_mesh_hit() {
        let mut geometry = box_geometry(1.0, 1.0, 1.0).to_non_indexed();
        geometry.remove_attribute(names::UV);
        let mut scene = Scene::new();
        let cube = mesh(&mut scene, geometry, 0.0);
        scene.update_all(false);

        let hits = down_z(5.0).intersect_object(&scene, cube, false).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].uv.is_none());
    }

    #[test]
    fn test_set_from_perspective_camera() {
        let mut scene = Scene::new();
        let camera = scene.create(NodeKind::PerspectiveCamera(PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0)));
        scene.node_mut(camera).unwrap().set_position(Vector3::new(0.0, 0.0, 10.0));
        scene.update_all(false);

        let mut raycaster = Raycaster::default();
        raycaster.set_from_camera(Vector2::ZERO, &scene, camera).unwrap();
        assert_relative_eq!(raycaster.ray.origin, Vector3::new(0.0, 0.0, 10.0), epsilon = EPSILON);
        assert_relative_eq!(raycaster.ray.direction, Vector3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
        assert_eq!(raycaster.camera, Some(camera));

        raycaster.set_from_camera(Vector2::new(1.0, 0.0), &scene, camera).unwrap();
        assert!(raycaster.ray.direction.x > 0.0);
        assert_relative_eq!(raycaster.ray.direction.length(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_set_from_orthographic_camera() {
        let mut scene = Scene::new();
        let camera = scene.create(NodeKind::OrthographicCamera(OrthographicCamera::new(-2.0, 2.0, 2.0, -2.0, 1.0, 10.0)));
        scene.node_mut(camera).unwrap().set_position(Vector3::new(0.0, 0.0, 10.0));
        scene.update_all(false);

        let mut raycaster = Raycaster::default();
        raycaster.set_from_camera(Vector2::new(0.5, -0.5), &scene, camera).unwrap();
        // origin lies in the camera plane
        assert_relative_eq!(raycaster.ray.origin, Vector3::new(1.0, -1.0, 10.0), epsilon = 1e-4);
        assert_relative_eq!(raycaster.ray.direction, Vector3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_set_from_non_camera_fails() {
        let mut scene = Scene::new();
        let group = scene.create(NodeKind::Group);
        let mut raycaster = Raycaster::default();
        assert!(matches!(
            raycaster.set_from_camera(Vector2::ZERO, &scene, group),
            Err(SceneError::UnsupportedCamera(name)) if name == "Group"
        ));
        assert!(raycaster.camera.is_none());
    }

    #[test]
    fn test_custom_raycast_and_stable_ties() {
        struct Marker(f32);
        impl Raycast for Marker {
            fn raycast(&self, object: NodeId, _: &Matrix4, raycaster: &Raycaster, intersects: &mut Vec<Intersection>) {
                if raycaster.accepts(self.0) {
                    intersects.push(Intersection::new(self.0, raycaster.ray.at(self.0), object));
                }
            }
        }

        let mut scene = Scene::new();
        let first = scene.create(NodeKind::Custom(Rc::new(Marker(2.0))));
        let second = scene.create(NodeKind::Custom(Rc::new(Marker(2.0))));
        let closest = scene.create(NodeKind::Custom(Rc::new(Marker(1.0))));

        let hits = down_z(0.0).intersect_objects(&scene, &[first, second, closest], false).unwrap();
        let order: Vec<NodeId> = hits.iter().map(|h| h.object).collect();
        assert_eq!(order, vec![closest, first, second]);
    }

    #[test]
    fn test_from_config() {
        let config = RaycasterConfig {
            near: 1.0,
            far: 50.0,
            line_threshold: 0.2,
            points_threshold: 0.3,
            layers: 0b10,
        };
        let raycaster = Raycaster::from_config(&config);
        assert_eq!(raycaster.far, 50.0);
        assert_eq!(raycaster.params.points_threshold, 0.3);
        assert!(raycaster.layers.is_enabled(1));
        assert!(!raycaster.layers.is_enabled(0));
    }

    #[test]
    fn test_stale_handle_is_an_error() {
        let mut scene = Scene::new();
        let node = scene.create(NodeKind::Group);
        scene.despawn(node).unwrap();
        assert!(matches!(
            down_z(1.0).intersect_object(&scene, node, true),
            Err(SceneError::NodeNotFound(_))
        ));
    }
}
