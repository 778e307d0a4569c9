//! Scene arena
//!
//! Every node lives in a [`SlotMap`] owned by the [`Scene`]. A node's
//! `children` list is its ownership edge; `parent` is only a handle back up
//! the tree. Removing a child detaches it into a root of its own; it stays
//! in the arena until [`Scene::despawn`] drops it together with its subtree.
//!
//! ## World matrices
//!
//! [`Scene::update_matrix_world`] is the propagation pass. A node whose TRS
//! changed rebuilds its local matrix, and once any node recomputes its world
//! matrix every descendant is recomputed as well, whatever its own flag says.

use slotmap::SlotMap;

use super::events::{Listener, ListenerId, NodeEvent, NodeEventKind};
use super::node::{Node, NodeKind};
use super::NodeId;
use crate::config::SceneConfig;
use crate::error::{SceneError, SceneResult};
use crate::foundation::math::{Box3, Matrix4, Quaternion, Vector3};

/// Node arena and hierarchy operations
#[derive(Debug, Default)]
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    config: SceneConfig,
}

impl Scene {
    /// Empty scene with default node settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty scene whose `create` applies `config`
    #[must_use]
    pub fn with_config(config: SceneConfig) -> Self {
        Self { nodes: SlotMap::with_key(), config }
    }

    /// Defaults applied by `create`
    #[must_use]
    pub const fn config(&self) -> &SceneConfig {
        &self.config
    }

    // Arena

    /// Insert a detached node built with the scene defaults
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let node = Node::with_config(kind, &self.config);
        self.spawn(node)
    }

    /// Insert a detached node
    pub fn spawn(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        let id = self.nodes.insert(node);
        log::trace!("Spawned {:?} ({})", id, self.nodes[id].kind.type_name());
        id
    }

    /// Node behind `id`, if live
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable node behind `id`, if live
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Node behind `id`
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn get(&self, id: NodeId) -> SceneResult<&Node> {
        self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Mutable node behind `id`
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn get_mut(&mut self, id: NodeId) -> SceneResult<&mut Node> {
        self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Whether `id` refers to a live node
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All live nodes in arena order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Nodes without a parent
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Detach `id` and drop it with its whole subtree
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn despawn(&mut self, id: NodeId) -> SceneResult<()> {
        let doomed = self.subtree(id)?;
        self.remove_from_parent(id);
        for node in &doomed {
            self.nodes.remove(*node);
        }
        log::debug!("Despawned {:?} and {} descendant(s)", id, doomed.len() - 1);
        Ok(())
    }

    // Hierarchy

    /// Make `child` the last child of `parent`, detaching it from its
    /// previous parent first
    ///
    /// Fires `Removed` on the child when it had a parent, then `Added`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for stale handles and
    /// [`SceneError::CyclicHierarchy`] when `child` is `parent` or one of its
    /// ancestors.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.check_reparent(parent, child)?;
        self.remove_from_parent(child);

        self.nodes[parent].children.push(child);
        let node = &mut self.nodes[child];
        node.parent = Some(parent);
        node.matrix_world_needs_update = true;
        node.events.dispatch(&NodeEvent { kind: NodeEventKind::Added, target: child, parent });

        log::debug!("Added {child:?} to {parent:?}");
        Ok(())
    }

    /// Detach `child` from `parent`; returns false when it is not a child
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(node) = self.nodes.get(parent) else {
            return false;
        };
        let Some(position) = node.children.iter().position(|&c| c == child) else {
            return false;
        };

        self.nodes[parent].children.remove(position);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
            node.matrix_world_needs_update = true;
            node.events.dispatch(&NodeEvent { kind: NodeEventKind::Removed, target: child, parent });
        }
        log::debug!("Removed {child:?} from {parent:?}");
        true
    }

    /// Detach `child` from whatever parent it has
    pub fn remove_from_parent(&mut self, child: NodeId) -> bool {
        match self.nodes.get(child).and_then(|node| node.parent) {
            Some(parent) => self.remove(parent, child),
            None => false,
        }
    }

    /// Detach every child of `parent`
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn clear(&mut self, parent: NodeId) -> SceneResult<()> {
        let children = self.get(parent)?.children.clone();
        for child in children {
            self.remove(parent, child);
        }
        Ok(())
    }

    /// Reparent `child` under `parent` keeping its world transform
    ///
    /// # Errors
    ///
    /// Same as [`Scene::add`].
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.check_reparent(parent, child)?;

        self.update_world_matrix(parent, true, false)?;
        let mut to_local = self.nodes[parent].matrix_world.inverse();
        if let Some(old_parent) = self.nodes[child].parent {
            self.update_world_matrix(old_parent, true, false)?;
            to_local.multiply(&self.nodes[old_parent].matrix_world);
        }
        self.nodes[child].apply_matrix4(&to_local);

        self.add(parent, child)?;
        self.update_world_matrix(child, false, true)
    }

    fn check_reparent(&self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.get(parent)?;
        self.get(child)?;
        if parent == child || self.ancestors(parent).contains(&child) {
            log::error!("Refusing to add {child:?} to {parent:?}: cycle");
            return Err(SceneError::CyclicHierarchy { parent, child });
        }
        Ok(())
    }

    fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.nodes.get(id).and_then(|node| node.parent);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.nodes.get(parent).and_then(|node| node.parent);
        }
        chain
    }

    // World matrices

    /// Resolve world matrices of `id` and its subtree
    ///
    /// With `force`, every node in the subtree is recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn update_matrix_world(&mut self, id: NodeId, force: bool) -> SceneResult<()> {
        self.get(id)?;
        self.propagate(id, force);
        Ok(())
    }

    /// Resolve world matrices of every root and its subtree
    pub fn update_all(&mut self, force: bool) {
        for root in self.roots() {
            self.propagate(root, force);
        }
    }

    fn propagate(&mut self, id: NodeId, force: bool) {
        let parent_world = self.parent_world(id);
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };

        node.update_matrix_if_dirty();
        let force = if node.matrix_world_needs_update || force {
            node.refresh_world(parent_world.as_ref());
            true
        } else {
            false
        };

        let children = node.children.clone();
        for child in children {
            self.propagate(child, force);
        }
    }

    /// Recompute the world matrix of `id` unconditionally, optionally
    /// refreshing its ancestors first and its descendants afterwards
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn update_world_matrix(&mut self, id: NodeId, update_parents: bool, update_children: bool) -> SceneResult<()> {
        self.get(id)?;
        if update_parents {
            for ancestor in self.ancestors(id).into_iter().rev() {
                self.refresh(ancestor);
            }
        }
        self.refresh(id);
        if update_children {
            for child in self.nodes[id].children.clone() {
                self.update_world_matrix(child, false, true)?;
            }
        }
        Ok(())
    }

    fn refresh(&mut self, id: NodeId) {
        let parent_world = self.parent_world(id);
        if let Some(node) = self.nodes.get_mut(id) {
            node.update_matrix_if_dirty();
            node.refresh_world(parent_world.as_ref());
        }
    }

    fn parent_world(&self, id: NodeId) -> Option<Matrix4> {
        self.nodes
            .get(id)
            .and_then(|node| node.parent)
            .and_then(|parent| self.nodes.get(parent))
            .map(|parent| parent.matrix_world)
    }

    // Orientation queries

    /// Rotate `id` so it faces `target` (world space)
    ///
    /// Cameras and lights point their -Z axis at the target, other nodes
    /// their +Z axis.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn look_at(&mut self, id: NodeId, target: Vector3) -> SceneResult<()> {
        self.update_world_matrix(id, true, false)?;
        let node = &self.nodes[id];

        let mut position = Vector3::ZERO;
        position.set_from_matrix_position(&node.matrix_world);

        let mut rotation = Matrix4::IDENTITY;
        if node.is_camera() || node.is_light() {
            rotation.look_at(position, target, node.up);
        } else {
            rotation.look_at(target, position, node.up);
        }
        let mut quaternion = Quaternion::from_rotation_matrix(&rotation);

        if let Some(parent) = node.parent {
            let mut parent_rotation = Matrix4::IDENTITY;
            parent_rotation.extract_rotation(&self.nodes[parent].matrix_world);
            quaternion.premultiply(Quaternion::from_rotation_matrix(&parent_rotation).inverse());
        }

        self.nodes[id].set_quaternion(quaternion);
        Ok(())
    }

    /// World-space position of `id`
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn world_position(&mut self, id: NodeId) -> SceneResult<Vector3> {
        self.update_world_matrix(id, true, false)?;
        let mut position = Vector3::ZERO;
        position.set_from_matrix_position(&self.nodes[id].matrix_world);
        Ok(position)
    }

    /// World-space rotation of `id`
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn world_quaternion(&mut self, id: NodeId) -> SceneResult<Quaternion> {
        self.update_world_matrix(id, true, false)?;
        Ok(self.nodes[id].matrix_world.decompose().1)
    }

    /// World-space scale of `id`
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn world_scale(&mut self, id: NodeId) -> SceneResult<Vector3> {
        self.update_world_matrix(id, true, false)?;
        Ok(self.nodes[id].matrix_world.decompose().2)
    }

    /// Direction `id` is facing in world space: +Z for ordinary nodes, -Z
    /// for cameras
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn world_direction(&mut self, id: NodeId) -> SceneResult<Vector3> {
        self.update_world_matrix(id, true, false)?;
        let node = &self.nodes[id];
        let mut direction = Vector3::ZERO;
        direction.set_from_matrix_column(&node.matrix_world, 2).normalize();
        if node.is_camera() {
            direction.negate();
        }
        Ok(direction)
    }

    /// Convert a point from the local space of `id` to world space
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn local_to_world(&mut self, id: NodeId, mut point: Vector3) -> SceneResult<Vector3> {
        self.update_world_matrix(id, true, false)?;
        point.apply_matrix4(&self.nodes[id].matrix_world);
        Ok(point)
    }

    /// Convert a world-space point into the local space of `id`
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn world_to_local(&mut self, id: NodeId, mut point: Vector3) -> SceneResult<Vector3> {
        self.update_world_matrix(id, true, false)?;
        point.apply_matrix4(&self.nodes[id].matrix_world.inverse());
        Ok(point)
    }

    // Traversal

    /// Visit `root` and its descendants depth-first, parents before children
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn traverse<F: FnMut(NodeId, &Node)>(&self, root: NodeId, mut visit: F) -> SceneResult<()> {
        self.get(root)?;
        self.walk(root, false, &mut visit);
        Ok(())
    }

    /// Like [`Scene::traverse`] but skips hidden nodes and everything below them
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn traverse_visible<F: FnMut(NodeId, &Node)>(&self, root: NodeId, mut visit: F) -> SceneResult<()> {
        self.get(root)?;
        self.walk(root, true, &mut visit);
        Ok(())
    }

    fn walk<F: FnMut(NodeId, &Node)>(&self, id: NodeId, visible_only: bool, visit: &mut F) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if visible_only && !node.visible {
            return;
        }
        visit(id, node);
        for &child in &node.children {
            self.walk(child, visible_only, visit);
        }
    }

    /// Mutable pre-order traversal; the hierarchy must not be edited meanwhile
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn traverse_mut<F: FnMut(NodeId, &mut Node)>(&mut self, root: NodeId, mut visit: F) -> SceneResult<()> {
        for id in self.subtree(root)? {
            visit(id, &mut self.nodes[id]);
        }
        Ok(())
    }

    /// Visit the parent of `id`, then its parent, up to the root
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn traverse_ancestors<F: FnMut(NodeId, &Node)>(&self, id: NodeId, mut visit: F) -> SceneResult<()> {
        self.get(id)?;
        for ancestor in self.ancestors(id) {
            visit(ancestor, &self.nodes[ancestor]);
        }
        Ok(())
    }

    /// Every node below `root` in pre-order, `root` excluded
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn descendants(&self, root: NodeId) -> SceneResult<Vec<NodeId>> {
        let mut subtree = self.subtree(root)?;
        subtree.remove(0);
        Ok(subtree)
    }

    fn subtree(&self, root: NodeId) -> SceneResult<Vec<NodeId>> {
        let mut ids = Vec::new();
        self.traverse(root, |id, _| ids.push(id))?;
        Ok(ids)
    }

    /// First node in the subtree of `root` (itself included) named `name`
    #[must_use]
    pub fn find_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.find(root, |node| node.name == name)
    }

    /// First node in the subtree of `root` (itself included) matching `predicate`
    pub fn find<P: Fn(&Node) -> bool>(&self, root: NodeId, predicate: P) -> Option<NodeId> {
        let mut found = None;
        let mut visit = |id: NodeId, node: &Node| {
            if found.is_none() && predicate(node) {
                found = Some(id);
            }
        };
        self.walk(root, false, &mut visit);
        found
    }

    /// Every node in the subtree of `root` matching `predicate`, pre-order
    pub fn find_all<P: Fn(&Node) -> bool>(&self, root: NodeId, predicate: P) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut visit = |id: NodeId, node: &Node| {
            if predicate(node) {
                found.push(id);
            }
        };
        self.walk(root, false, &mut visit);
        found
    }

    // Derived data

    /// Detached copy of `id`, with copies of its descendants when `recursive`
    ///
    /// Geometry is shared with the source nodes.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn clone_subtree(&mut self, id: NodeId, recursive: bool) -> SceneResult<NodeId> {
        let copy = self.get(id)?.duplicate();
        let copy = self.spawn(copy);
        if recursive {
            for child in self.nodes[id].children.clone() {
                let child_copy = self.clone_subtree(child, true)?;
                self.add(copy, child_copy)?;
            }
        }
        Ok(copy)
    }

    /// World-space box around the geometry of `root` and its descendants
    ///
    /// World matrices of the subtree are refreshed first. Missing local
    /// bounding boxes are computed and cached on the geometry.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn world_bounding_box(&mut self, root: NodeId) -> SceneResult<Box3> {
        self.update_world_matrix(root, true, true)?;

        let mut bounds = Box3::EMPTY;
        for id in self.subtree(root)? {
            let node = &self.nodes[id];
            let Some(geometry) = node.kind.geometry() else {
                continue;
            };
            let mut local = geometry.borrow_mut().ensure_bounding_box();
            if local.is_empty() {
                continue;
            }
            local.apply_matrix4(&node.matrix_world);
            bounds.union(&local);
        }
        Ok(bounds)
    }

    // Events

    /// Register `listener` on `id` for `kind`
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for a stale handle.
    pub fn add_event_listener(&mut self, id: NodeId, kind: NodeEventKind, listener: Listener) -> SceneResult<ListenerId> {
        Ok(self.get_mut(id)?.events.add_listener(kind, listener))
    }

    /// Whether `listener` is registered on `id` for `kind`
    #[must_use]
    pub fn has_event_listener(&self, id: NodeId, kind: NodeEventKind, listener: ListenerId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|node| node.events.has_listener(kind, listener))
    }

    /// Unregister `listener`; returns whether it was registered
    pub fn remove_event_listener(&mut self, id: NodeId, kind: NodeEventKind, listener: ListenerId) -> bool {
        self.nodes
            .get_mut(id)
            .is_some_and(|node| node.events.remove_listener(kind, listener))
    }
}
