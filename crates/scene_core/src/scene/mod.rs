//! Scene graph
//!
//! Nodes live in a [`Scene`] arena and refer to each other through
//! [`NodeId`] handles. A node's payload ([`NodeKind`]) decides whether it is
//! a plain group, a renderable with geometry, a camera or a light.

mod camera;
mod events;
mod layers;
mod node;
mod objects;
mod scene_graph;

slotmap::new_key_type! {
    /// Handle to a node in a [`Scene`]
    pub struct NodeId;
}

pub use camera::{OrthographicCamera, PerspectiveCamera, ViewOffset};
pub use events::{EventDispatcher, Listener, ListenerId, NodeEvent, NodeEventKind};
pub use layers::Layers;
pub use node::{Node, NodeKind};
pub use objects::{Light, LineKind, LineObject, MeshObject, PointsObject, Side};
pub use scene_graph::Scene;
