//! Vertex data containers
//!
//! [`BufferGeometry`] holds named [`BufferAttribute`]s and an optional index
//! buffer. Geometry is shared between scene nodes through
//! [`SharedGeometry`], so editing it through one mesh affects every mesh
//! that references it.

mod attribute;
mod buffer_geometry;
pub mod primitives;

pub use attribute::{AttributeArray, BufferAttribute, UpdateRange, Usage};
pub use buffer_geometry::{names, BufferGeometry, DrawRange, GeometryGroup, SharedGeometry};
