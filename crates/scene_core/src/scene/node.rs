//! Scene-graph node
//!
//! A [`Node`] carries a local TRS transform, the cached local and world
//! matrices, hierarchy handles and a [`NodeKind`] payload. The quaternion is
//! the only stored rotation; Euler angles are derived from it on demand and
//! converted into it when set, so the two can never disagree.
//!
//! Hierarchy edits and world-matrix propagation need access to other nodes
//! and therefore live on [`Scene`](super::Scene).

use std::fmt;
use std::rc::Rc;

use super::camera::{OrthographicCamera, PerspectiveCamera};
use super::events::EventDispatcher;
use super::layers::Layers;
use super::objects::{Light, LineObject, MeshObject, PointsObject};
use super::NodeId;
use crate::config::SceneConfig;
use crate::foundation::math::{Euler, EulerOrder, Matrix4, Quaternion, Vector3};
use crate::geometry::SharedGeometry;
use crate::spatial::Raycast;

/// What a node represents
#[derive(Clone, Default)]
pub enum NodeKind {
    /// Pure transform, no payload
    #[default]
    Group,
    /// Triangle mesh
    Mesh(MeshObject),
    /// Polyline
    Line(LineObject),
    /// Point cloud
    Points(PointsObject),
    /// Perspective camera
    PerspectiveCamera(PerspectiveCamera),
    /// Orthographic camera
    OrthographicCamera(OrthographicCamera),
    /// Light source
    Light(Light),
    /// Client-defined hit test
    Custom(Rc<dyn Raycast>),
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mesh(mesh) => f.debug_tuple("Mesh").field(&mesh.side).finish(),
            Self::Line(line) => f.debug_tuple("Line").field(&line.kind).finish(),
            Self::PerspectiveCamera(camera) => f.debug_tuple("PerspectiveCamera").field(&camera.fov).finish(),
            Self::Light(light) => f.debug_tuple("Light").field(&light.intensity).finish(),
            other => f.write_str(other.type_name()),
        }
    }
}

impl NodeKind {
    /// Variant name, used in logs and errors
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Group => "Group",
            Self::Mesh(_) => "Mesh",
            Self::Line(_) => "Line",
            Self::Points(_) => "Points",
            Self::PerspectiveCamera(_) => "PerspectiveCamera",
            Self::OrthographicCamera(_) => "OrthographicCamera",
            Self::Light(_) => "Light",
            Self::Custom(_) => "Custom",
        }
    }

    /// Hit-test capability, if this kind can be picked
    #[must_use]
    pub fn as_raycast(&self) -> Option<&dyn Raycast> {
        match self {
            Self::Mesh(mesh) => Some(mesh as &dyn Raycast),
            Self::Line(line) => Some(line as &dyn Raycast),
            Self::Points(points) => Some(points as &dyn Raycast),
            Self::Custom(custom) => Some(custom.as_ref()),
            _ => None,
        }
    }

    /// Geometry referenced by a mesh, line or point cloud
    #[must_use]
    pub const fn geometry(&self) -> Option<&SharedGeometry> {
        match self {
            Self::Mesh(MeshObject { geometry, .. })
            | Self::Line(LineObject { geometry, .. })
            | Self::Points(PointsObject { geometry }) => Some(geometry),
            _ => None,
        }
    }

    /// Whether this is a camera of either projection
    #[must_use]
    pub const fn is_camera(&self) -> bool {
        matches!(self, Self::PerspectiveCamera(_) | Self::OrthographicCamera(_))
    }

    /// Whether this is a light
    #[must_use]
    pub const fn is_light(&self) -> bool {
        matches!(self, Self::Light(_))
    }

    fn view_matrix_mut(&mut self) -> Option<&mut Matrix4> {
        match self {
            Self::PerspectiveCamera(camera) => Some(&mut camera.matrix_world_inverse),
            Self::OrthographicCamera(camera) => Some(&mut camera.matrix_world_inverse),
            _ => None,
        }
    }
}

/// Transformable scene-graph node
#[derive(Debug)]
pub struct Node {
    /// Free-form label, searchable through `Scene::find_by_name`
    pub name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,

    position: Vector3,
    quaternion: Quaternion,
    rotation_order: EulerOrder,
    scale: Vector3,
    local_dirty: bool,

    /// Up direction used by `Scene::look_at`
    pub up: Vector3,
    /// Local matrix, rebuilt from TRS while `matrix_auto_update` is set
    pub matrix: Matrix4,
    /// Local-to-world matrix, valid after the last world update
    pub matrix_world: Matrix4,
    /// Rebuild `matrix` from TRS during world updates
    pub matrix_auto_update: bool,
    /// Recompute `matrix_world` on the next world update
    pub matrix_world_needs_update: bool,
    /// Hidden nodes and their subtrees are skipped by visible traversal and raycasts
    pub visible: bool,
    /// Channel membership
    pub layers: Layers,
    /// Hint for renderers performing frustum culling
    pub frustum_culled: bool,
    /// Hint for renderers sorting draw calls
    pub render_order: i32,
    /// Payload
    pub kind: NodeKind,

    pub(crate) events: EventDispatcher,
    world_version: u64,
}

impl Default for Node {
    fn default() -> Self {
        Self::new(NodeKind::Group)
    }
}

impl Node {
    /// Detached node with identity transform
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self::with_config(kind, &SceneConfig::default())
    }

    /// Detached node using the defaults of `config`
    #[must_use]
    pub fn with_config(kind: NodeKind, config: &SceneConfig) -> Self {
        Self {
            name: String::new(),
            parent: None,
            children: Vec::new(),
            position: Vector3::ZERO,
            quaternion: Quaternion::IDENTITY,
            rotation_order: config.default_euler_order,
            scale: Vector3::ONE,
            local_dirty: false,
            up: config.default_up,
            matrix: Matrix4::IDENTITY,
            matrix_world: Matrix4::IDENTITY,
            matrix_auto_update: config.default_matrix_auto_update,
            matrix_world_needs_update: false,
            visible: true,
            layers: Layers::default(),
            frustum_culled: true,
            render_order: 0,
            kind,
            events: EventDispatcher::new(),
            world_version: 0,
        }
    }

    /// Set the name (builder style)
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Detached copy: same transform, flags and payload (geometry is
    /// shared), no hierarchy and no listeners
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            name: self.name.clone(),
            parent: None,
            children: Vec::new(),
            position: self.position,
            quaternion: self.quaternion,
            rotation_order: self.rotation_order,
            scale: self.scale,
            local_dirty: self.local_dirty,
            up: self.up,
            matrix: self.matrix,
            matrix_world: self.matrix_world,
            matrix_auto_update: self.matrix_auto_update,
            matrix_world_needs_update: self.matrix_world_needs_update,
            visible: self.visible,
            layers: self.layers,
            frustum_culled: self.frustum_culled,
            render_order: self.render_order,
            kind: self.kind.clone(),
            events: EventDispatcher::new(),
            world_version: 0,
        }
    }

    /// Parent handle, `None` for a root
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Incremented every time `matrix_world` is recomputed
    #[must_use]
    pub const fn world_version(&self) -> u64 {
        self.world_version
    }

    /// Whether the payload is a camera
    #[must_use]
    pub const fn is_camera(&self) -> bool {
        self.kind.is_camera()
    }

    /// Whether the payload is a light
    #[must_use]
    pub const fn is_light(&self) -> bool {
        self.kind.is_light()
    }

    // TRS

    /// Local translation
    #[must_use]
    pub const fn position(&self) -> Vector3 {
        self.position
    }

    /// Set the local translation
    pub fn set_position(&mut self, position: Vector3) -> &mut Self {
        self.position = position;
        self.local_dirty = true;
        self
    }

    /// Mutable local translation; marks the local matrix dirty
    pub fn position_mut(&mut self) -> &mut Vector3 {
        self.local_dirty = true;
        &mut self.position
    }

    /// Local rotation
    #[must_use]
    pub const fn quaternion(&self) -> Quaternion {
        self.quaternion
    }

    /// Set the local rotation
    pub fn set_quaternion(&mut self, quaternion: Quaternion) -> &mut Self {
        self.quaternion = quaternion;
        self.local_dirty = true;
        self
    }

    /// Mutable local rotation; marks the local matrix dirty
    pub fn quaternion_mut(&mut self) -> &mut Quaternion {
        self.local_dirty = true;
        &mut self.quaternion
    }

    /// Local scale
    #[must_use]
    pub const fn scale(&self) -> Vector3 {
        self.scale
    }

    /// Set the local scale
    pub fn set_scale(&mut self, scale: Vector3) -> &mut Self {
        self.scale = scale;
        self.local_dirty = true;
        self
    }

    /// Mutable local scale; marks the local matrix dirty
    pub fn scale_mut(&mut self) -> &mut Vector3 {
        self.local_dirty = true;
        &mut self.scale
    }

    /// Local rotation as Euler angles in the node's rotation order
    #[must_use]
    pub fn rotation(&self) -> Euler {
        Euler::from_quaternion(self.quaternion, self.rotation_order)
    }

    /// Set the local rotation from Euler angles; their order becomes the
    /// node's rotation order
    pub fn set_rotation(&mut self, euler: Euler) -> &mut Self {
        self.rotation_order = euler.order;
        self.set_quaternion(Quaternion::from_euler(euler))
    }

    /// Order used when reporting `rotation`
    #[must_use]
    pub const fn rotation_order(&self) -> EulerOrder {
        self.rotation_order
    }

    /// Change the reporting order; the rotation itself is unchanged
    pub fn set_rotation_order(&mut self, order: EulerOrder) -> &mut Self {
        self.rotation_order = order;
        self
    }

    /// Rotation of `angle` radians about a normalized `axis`
    pub fn set_rotation_from_axis_angle(&mut self, axis: Vector3, angle: f32) -> &mut Self {
        self.set_quaternion(Quaternion::from_axis_angle(axis, angle))
    }

    /// Same as `set_rotation`
    pub fn set_rotation_from_euler(&mut self, euler: Euler) -> &mut Self {
        self.set_rotation(euler)
    }

    /// Rotation taken from the unscaled upper 3x3 of `m`
    pub fn set_rotation_from_matrix(&mut self, m: &Matrix4) -> &mut Self {
        self.set_quaternion(Quaternion::from_rotation_matrix(m))
    }

    /// Same as `set_quaternion`
    pub fn set_rotation_from_quaternion(&mut self, quaternion: Quaternion) -> &mut Self {
        self.set_quaternion(quaternion)
    }

    /// Rotate about a normalized axis in local space
    pub fn rotate_on_axis(&mut self, axis: Vector3, angle: f32) -> &mut Self {
        self.quaternion.multiply(Quaternion::from_axis_angle(axis, angle));
        self.local_dirty = true;
        self
    }

    /// Rotate about a normalized axis in world space; assumes no rotated
    /// ancestors
    pub fn rotate_on_world_axis(&mut self, axis: Vector3, angle: f32) -> &mut Self {
        self.quaternion.premultiply(Quaternion::from_axis_angle(axis, angle));
        self.local_dirty = true;
        self
    }

    /// Rotate about local X
    pub fn rotate_x(&mut self, angle: f32) -> &mut Self {
        self.rotate_on_axis(Vector3::X, angle)
    }

    /// Rotate about local Y
    pub fn rotate_y(&mut self, angle: f32) -> &mut Self {
        self.rotate_on_axis(Vector3::Y, angle)
    }

    /// Rotate about local Z
    pub fn rotate_z(&mut self, angle: f32) -> &mut Self {
        self.rotate_on_axis(Vector3::Z, angle)
    }

    /// Move `distance` along a normalized axis expressed in local space
    pub fn translate_on_axis(&mut self, axis: Vector3, distance: f32) -> &mut Self {
        let mut offset = axis;
        offset.apply_quaternion(self.quaternion);
        self.position.add_scaled_vector(offset, distance);
        self.local_dirty = true;
        self
    }

    /// Move along local X
    pub fn translate_x(&mut self, distance: f32) -> &mut Self {
        self.translate_on_axis(Vector3::X, distance)
    }

    /// Move along local Y
    pub fn translate_y(&mut self, distance: f32) -> &mut Self {
        self.translate_on_axis(Vector3::Y, distance)
    }

    /// Move along local Z
    pub fn translate_z(&mut self, distance: f32) -> &mut Self {
        self.translate_on_axis(Vector3::Z, distance)
    }

    /// Premultiply the local transform by `m` and split the result back into TRS
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        if self.matrix_auto_update {
            self.update_matrix();
        }
        self.matrix.premultiply(m);
        let (position, quaternion, scale) = self.matrix.decompose();
        self.position = position;
        self.quaternion = quaternion;
        self.scale = scale;
        self.local_dirty = true;
        self.matrix_world_needs_update = true;
        self
    }

    /// Rotate by `q` in the parent's frame
    pub fn apply_quaternion(&mut self, q: Quaternion) -> &mut Self {
        self.quaternion.premultiply(q);
        self.local_dirty = true;
        self
    }

    /// Rebuild `matrix` from TRS and flag the world matrix for recomputation
    pub fn update_matrix(&mut self) {
        self.matrix = Matrix4::compose(self.position, self.quaternion, self.scale);
        self.local_dirty = false;
        self.matrix_world_needs_update = true;
    }

    /// Rebuild the local matrix if TRS changed since the last rebuild
    pub(crate) fn update_matrix_if_dirty(&mut self) {
        if self.matrix_auto_update && self.local_dirty {
            self.update_matrix();
        }
    }

    /// Recompute `matrix_world` from the parent's world matrix
    pub(crate) fn refresh_world(&mut self, parent_world: Option<&Matrix4>) {
        self.matrix_world = match parent_world {
            Some(parent) => *parent * self.matrix,
            None => self.matrix,
        };
        self.matrix_world_needs_update = false;
        self.world_version += 1;

        let matrix_world = self.matrix_world;
        if let Some(view) = self.kind.view_matrix_mut() {
            *view = matrix_world.inverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives::box_geometry;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_rotation_derived_from_quaternion() {
        let mut node = Node::default();
        node.set_rotation(Euler::new(0.3, -0.2, 0.1, EulerOrder::YXZ));
        assert_eq!(node.rotation_order(), EulerOrder::YXZ);
        assert_relative_eq!(node.rotation(), Euler::new(0.3, -0.2, 0.1, EulerOrder::YXZ), epsilon = EPSILON);

        node.set_quaternion(Quaternion::from_axis_angle(Vector3::Z, 0.5));
        let rotation = node.rotation();
        assert_relative_eq!(rotation.z, 0.5, epsilon = EPSILON);
        assert_relative_eq!(rotation.x, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_local_and_world_axis_rotation_differ() {
        let mut local = Node::default();
        local.rotate_x(FRAC_PI_2).rotate_on_axis(Vector3::Y, FRAC_PI_2);
        let mut world = Node::default();
        world.rotate_x(FRAC_PI_2).rotate_on_world_axis(Vector3::Y, FRAC_PI_2);

        let mut a = Vector3::Z;
        a.apply_quaternion(local.quaternion());
        let mut b = Vector3::Z;
        b.apply_quaternion(world.quaternion());
        assert!(a.distance_to(b) > 0.5);
    }

    #[test]
    fn test_translate_follows_rotation() {
        let mut node = Node::default();
        node.rotate_y(FRAC_PI_2).translate_z(2.0);
        assert_relative_eq!(node.position(), Vector3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_update_matrix_composes_and_flags_world() {
        let mut node = Node::default();
        node.set_position(Vector3::new(1.0, 2.0, 3.0))
            .set_scale(Vector3::new(2.0, 2.0, 2.0));
        node.update_matrix();
        assert!(node.matrix_world_needs_update);

        let mut p = Vector3::ONE;
        p.apply_matrix4(&node.matrix);
        assert_relative_eq!(p, Vector3::new(3.0, 4.0, 5.0), epsilon = EPSILON);
    }

    #[test]
    fn test_apply_matrix4_decomposes_into_trs() {
        let mut node = Node::default();
        node.set_position(Vector3::new(1.0, 0.0, 0.0));
        node.apply_matrix4(&Matrix4::compose(
            Vector3::new(0.0, 5.0, 0.0),
            Quaternion::from_axis_angle(Vector3::Z, FRAC_PI_2),
            Vector3::new(3.0, 3.0, 3.0),
        ));

        assert_relative_eq!(node.position(), Vector3::new(0.0, 8.0, 0.0), epsilon = 1e-4);
        assert_relative_eq!(node.scale(), Vector3::new(3.0, 3.0, 3.0), epsilon = 1e-4);
        assert_relative_eq!(node.rotation().z, FRAC_PI_2, epsilon = 1e-4);
    }

    #[test]
    fn test_duplicate_shares_geometry_but_not_hierarchy() {
        let geometry = box_geometry(1.0, 1.0, 1.0).into_shared();
        let mut node = Node::new(NodeKind::Mesh(MeshObject::new(Rc::clone(&geometry)))).with_name("crate");
        node.set_position(Vector3::X);

        let copy = node.duplicate();
        assert_eq!(copy.name, "crate");
        assert_eq!(copy.position(), Vector3::X);
        assert!(copy.parent().is_none());
        assert!(Rc::ptr_eq(copy.kind.geometry().unwrap(), &geometry));
    }

    #[test]
    fn test_kind_queries() {
        assert_eq!(NodeKind::Group.type_name(), "Group");
        assert!(NodeKind::Group.as_raycast().is_none());
        assert!(NodeKind::PerspectiveCamera(PerspectiveCamera::default()).is_camera());
        assert!(NodeKind::Light(Light::default()).is_light());
        assert_eq!(format!("{:?}", NodeKind::Points(PointsObject::new(box_geometry(1.0, 1.0, 1.0).into_shared()))), "Points");
    }

    #[test]
    fn test_camera_view_matrix_tracks_world() {
        let mut node = Node::new(NodeKind::OrthographicCamera(OrthographicCamera::default()));
        node.set_position(Vector3::new(0.0, 0.0, 4.0));
        node.update_matrix();
        node.refresh_world(None);

        let NodeKind::OrthographicCamera(camera) = &node.kind else {
            unreachable!();
        };
        let mut origin = Vector3::new(0.0, 0.0, 4.0);
        origin.apply_matrix4(&camera.matrix_world_inverse);
        assert_relative_eq!(origin, Vector3::ZERO, epsilon = EPSILON);
        assert_eq!(node.world_version(), 1);
    }
}
