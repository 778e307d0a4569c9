//! Error types for the scene kernel
//!
//! Most failure modes in the kernel are recoverable and are reported through
//! the `log` facade while a safe default is substituted (identity for a
//! singular inverse, an empty box for empty geometry). `SceneError` covers the
//! cases that are returned to the caller instead.

use thiserror::Error;

use crate::config::ConfigError;
use crate::scene::NodeId;

/// Errors returned by scene, geometry and raycasting operations
#[derive(Error, Debug)]
pub enum SceneError {
    /// A node handle does not refer to a live node
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Reparenting would make a node its own ancestor
    #[error("Cannot add {child:?} to {parent:?}: the result would contain a cycle")]
    CyclicHierarchy {
        /// Intended parent
        parent: NodeId,
        /// Node being reparented
        child: NodeId,
    },

    /// The node passed as a camera is not a camera
    #[error("Unsupported camera type: {0}")]
    UnsupportedCamera(String),

    /// An Euler order name could not be parsed
    #[error("Unsupported Euler order: {0}")]
    UnsupportedEulerOrder(String),

    /// An attribute's vertex count differs from the rest of the geometry
    #[error("Attribute '{name}' has {found} items, expected {expected}")]
    AttributeCountMismatch {
        /// Attribute name
        name: String,
        /// Vertex count of the geometry
        expected: usize,
        /// Vertex count of the offending attribute
        found: usize,
    },

    /// Two geometries do not carry the same attribute set
    #[error("Attribute mismatch: {0}")]
    AttributeMismatch(String),

    /// A required attribute is absent
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    /// Configuration could not be loaded or saved
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
