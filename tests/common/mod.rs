#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;
use voxel_stream::{
    physics::{BodyKind, ColliderShape, Physics},
    render::{MeshView, Renderer},
    Coord3, FlatTerrain, StreamingConfig, TerrainGenerator, World,
};

/// Renderer double that tracks live uploads by face count.
#[derive(Default)]
pub struct CountingRenderer {
    next: u32,
    pub live: HashMap<u32, (Coord3, usize)>,
    pub uploads: usize,
}

impl Renderer for CountingRenderer {
    type Handle = u32;

    fn upload(&mut self, coord: Coord3, _origin: Vec3, mesh: &MeshView<'_>) -> u32 {
        self.next += 1;
        self.uploads += 1;
        self.live.insert(self.next, (coord, mesh.face_count()));
        self.next
    }

    fn release(&mut self, handle: u32) {
        assert!(self.live.remove(&handle).is_some(), "released unknown renderable");
    }
}

/// Physics double that keeps every live shape with its translation.
#[derive(Default)]
pub struct CountingPhysics {
    next: u32,
    pub live: HashMap<u32, (ColliderShape, BodyKind, Vec3)>,
}

impl Physics for CountingPhysics {
    type Handle = u32;

    fn insert(&mut self, shape: &ColliderShape, body: BodyKind, translation: Vec3) -> u32 {
        self.next += 1;
        self.live.insert(self.next, (shape.clone(), body, translation));
        self.next
    }

    fn remove(&mut self, handle: u32) {
        assert!(self.live.remove(&handle).is_some(), "removed unknown collider");
    }
}

pub type TestWorld = World<CountingRenderer, CountingPhysics>;

pub fn test_config(load_radius: i32) -> StreamingConfig {
    StreamingConfig {
        load_radius,
        worker_count: 2,
        refreshes_per_frame: 64,
        refresh_budget_ms: 60_000,
        ..StreamingConfig::default()
    }
}

pub fn world_with(config: StreamingConfig, generator: Arc<dyn TerrainGenerator>) -> TestWorld {
    World::new(
        config,
        generator,
        CountingRenderer::default(),
        CountingPhysics::default(),
    )
    .unwrap()
}

/// Solid below y = 0, empty above.
pub fn flat_terrain() -> Arc<dyn TerrainGenerator> {
    Arc::new(FlatTerrain {
        ground_height: 0,
        material: 1,
    })
}

pub fn test_world(load_radius: i32) -> TestWorld {
    world_with(test_config(load_radius), flat_terrain())
}

/// Runs frames until nothing is outstanding.
pub fn run_until_idle(world: &mut TestWorld, observer: Vec3) -> usize {
    for frame in 0..1000 {
        world.update(observer);
        world.jobs().wait_idle();

        if world.is_idle() {
            return frame + 1;
        }
    }

    panic!("world never went idle: {:?}", world.stats());
}
