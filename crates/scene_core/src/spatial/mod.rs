//! Spatial queries

mod raycaster;

pub use raycaster::{Face, Intersection, Raycast, RaycastParams, Raycaster};
