//! Raycast picking demo
//!
//! Builds a small scene of scattered boxes, a ring and a point cloud, spins
//! it for a few frames and picks through a perspective camera on a grid of
//! screen positions, logging every hit.
//!
//! Usage: `raycast_demo [raycaster.toml|raycaster.ron]`

use std::f32::consts::TAU;
use std::path::PathBuf;
use std::rc::Rc;

use rand::Rng;
use scene_core::foundation::logging;
use scene_core::prelude::*;
use thiserror::Error;

const BOX_COUNT: usize = 12;
const FRAMES: u32 = 4;
const PICK_GRID: i32 = 3;

/// Demo failures
#[derive(Error, Debug)]
enum DemoError {
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Failed to load raycaster config {path:?}: {source}")]
    Config {
        path: PathBuf,
        source: scene_core::config::ConfigError,
    },
}

struct PickingDemo {
    scene: Scene,
    world: NodeId,
    camera: NodeId,
    raycaster: Raycaster,
}

impl PickingDemo {
    fn new(config: &RaycasterConfig) -> Result<Self, DemoError> {
        let mut scene = Scene::new();
        let world = scene.spawn(Node::new(NodeKind::Group).with_name("world"));

        let mut rng = rand::thread_rng();
        let crate_geometry = box_geometry(1.0, 1.0, 1.0).into_shared();
        for i in 0..BOX_COUNT {
            let node = Node::new(NodeKind::Mesh(MeshObject::new(Rc::clone(&crate_geometry)))).with_name(format!("box_{i}"));
            let id = scene.spawn(node);
            {
                let node = scene.get_mut(id)?;
                node.set_position(Vector3::new(
                    rng.gen_range(-4.0..4.0),
                    rng.gen_range(-2.0..2.0),
                    rng.gen_range(-4.0..4.0),
                ));
                node.set_rotation(Euler::new(rng.gen_range(0.0..TAU), rng.gen_range(0.0..TAU), 0.0, EulerOrder::XYZ));
                node.set_scale(Vector3::ONE * rng.gen_range(0.5_f32..1.5));
            }
            scene.add(world, id)?;
        }

        let ball = scene.spawn(
            Node::new(NodeKind::Mesh(MeshObject::new(icosahedron_geometry(1.2).into_shared()))).with_name("ball"),
        );
        scene.add(world, ball)?;

        let ring = scene.spawn(Node::new(NodeKind::Line(LineObject::new(ring_geometry(5.0, 32), LineKind::Loop))).with_name("ring"));
        scene.add(world, ring)?;

        let stars = scene.spawn(Node::new(NodeKind::Points(PointsObject::new(star_geometry(&mut rng, 200)))).with_name("stars"));
        scene.add(world, stars)?;

        let camera = scene.spawn(
            Node::new(NodeKind::PerspectiveCamera(PerspectiveCamera::new(50.0, 16.0 / 9.0, 0.1, 100.0))).with_name("camera"),
        );
        scene.get_mut(camera)?.set_position(Vector3::new(0.0, 3.0, 15.0));
        scene.look_at(camera, Vector3::ZERO)?;

        log::info!("Scene ready: {} nodes", scene.len());
        Ok(Self { scene, world, camera, raycaster: Raycaster::from_config(config) })
    }

    fn run(&mut self) -> Result<(), DemoError> {
        for frame in 0..FRAMES {
            self.scene.get_mut(self.world)?.rotate_y(TAU / 16.0);
            self.scene.update_all(false);

            let bounds = self.scene.world_bounding_box(self.world)?;
            log::info!("Frame {frame}: world bounds {:?} .. {:?}", bounds.min, bounds.max);

            for (x, y) in pick_coords() {
                self.pick(Vector2::new(x, y))?;
            }
        }
        Ok(())
    }

    fn pick(&mut self, coords: Vector2) -> Result<(), DemoError> {
        self.raycaster.set_from_camera(coords, &self.scene, self.camera)?;
        let hits = self.raycaster.intersect_object(&self.scene, self.world, true)?;

        match hits.first() {
            Some(hit) => {
                let name = &self.scene.get(hit.object)?.name;
                log::info!(
                    "  ({:+.2}, {:+.2}) -> {name} at distance {:.3}, point ({:.2}, {:.2}, {:.2}), {} hit(s) total",
                    coords.x,
                    coords.y,
                    hit.distance,
                    hit.point.x,
                    hit.point.y,
                    hit.point.z,
                    hits.len()
                );
                if let Some(face) = hit.face {
                    log::debug!("    face {:?} normal {:?} uv {:?}", (face.a, face.b, face.c), face.normal, hit.uv);
                }
            }
            None => log::info!("  ({:+.2}, {:+.2}) -> nothing", coords.x, coords.y),
        }
        Ok(())
    }
}

/// Evenly spaced screen positions in normalized device coordinates
#[allow(clippy::cast_precision_loss)]
fn pick_coords() -> Vec<(f32, f32)> {
    let step = 2.0 / (PICK_GRID + 1) as f32;
    let axis: Vec<f32> = (1..=PICK_GRID).map(|i| (i as f32).mul_add(step, -1.0)).collect();
    axis.iter().flat_map(|&y| axis.iter().map(move |&x| (x, y))).collect()
}

/// Flat circle of `segments` vertices in the XZ plane
#[allow(clippy::cast_precision_loss)]
fn ring_geometry(radius: f32, segments: u32) -> SharedGeometry {
    let points: Vec<Vector3> = (0..segments)
        .map(|i| {
            let (sin, cos) = (TAU * i as f32 / segments as f32).sin_cos();
            Vector3::new(radius * cos, 0.0, radius * sin)
        })
        .collect();
    let mut geometry = BufferGeometry::new();
    geometry.set_from_points(&points);
    geometry.compute_line_distances();
    geometry.into_shared()
}

/// Points scattered on a shell around the origin
fn star_geometry(rng: &mut impl Rng, count: usize) -> SharedGeometry {
    let points: Vec<Vector3> = (0..count)
        .map(|_| {
            let mut direction = Vector3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            direction.normalize();
            direction * rng.gen_range(20.0_f32..30.0)
        })
        .collect();
    let mut geometry = BufferGeometry::new();
    geometry.set_from_points(&points);
    geometry.into_shared()
}

fn load_config() -> Result<RaycasterConfig, DemoError> {
    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        log::info!("No config given, using raycaster defaults");
        return Ok(RaycasterConfig::default());
    };
    log::info!("Loading raycaster config from {}", path.display());
    RaycasterConfig::load_from_file(&path).map_err(|source| DemoError::Config { path, source })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_level(log::LevelFilter::Info);
    log::info!("Starting raycast demo");

    let config = load_config()?;
    let mut demo = PickingDemo::new(&config)?;
    demo.run()?;

    log::info!("Raycast demo finished");
    Ok(())
}
