//! # Scene Core
//!
//! A retained-mode 3D scene kernel: transform math, a scene graph with
//! cached world matrices, typed vertex buffers and ray picking.
//!
//! ## Features
//!
//! - **Math kernel**: vectors, quaternions, Euler angles, matrices and
//!   bounding volumes as chainable `Copy` value types
//! - **Scene graph**: arena-backed hierarchy with dirty-flag world matrix
//!   propagation, `look_at`, `attach` and hierarchy events
//! - **Geometry**: attribute buffers, bounds, vertex normals, primitives
//! - **Raycasting**: mesh, line and point hit tests behind a [`spatial::Raycast`] trait
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_core::prelude::*;
//!
//! let mut scene = Scene::new();
//! let cube = scene.create(NodeKind::Mesh(MeshObject::new(box_geometry(1.0, 1.0, 1.0).into_shared())));
//! scene.update_all(false);
//!
//! let raycaster = Raycaster::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0), 0.0, f32::INFINITY);
//! let hits = raycaster.intersect_object(&scene, cube, true)?;
//! assert_eq!(hits.len(), 1);
//! # Ok::<(), SceneError>(())
//! ```

pub mod config;
pub mod error;
pub mod foundation;
pub mod geometry;
pub mod scene;
pub mod spatial;

pub use error::{SceneError, SceneResult};

/// Common imports
pub mod prelude {
    pub use crate::{
        config::{Config, RaycasterConfig, SceneConfig},
        foundation::math::{Box3, Euler, EulerOrder, Matrix3, Matrix4, Quaternion, Ray, Sphere, Vector2, Vector3},
        geometry::{
            names,
            primitives::{box_geometry, icosahedron_geometry, plane_geometry, sphere_geometry},
            BufferAttribute, BufferGeometry, SharedGeometry,
        },
        scene::{
            Layers, Light, LineKind, LineObject, MeshObject, Node, NodeId, NodeKind, OrthographicCamera,
            PerspectiveCamera, PointsObject, Scene, Side,
        },
        spatial::{Intersection, Raycast, Raycaster},
        SceneError, SceneResult,
    };
}
