//! Streaming voxel world: chunk storage, face-culled meshing, background
//! collider builds, and the per-frame controller that keeps a cube of chunks
//! loaded around an observer.

pub mod collections;
pub mod concurrency;
pub mod config;
pub mod logger;
pub mod memory;
pub mod physics;
pub mod render;
pub mod time;
pub mod world;

#[macro_use]
extern crate log;

pub use config::{ConfigError, StreamingConfig};
pub use physics::{BodyKind, ColliderShape, Physics};
pub use render::{MeshView, Renderer, Vertex};
pub use world::{
    block::Cell,
    chunk::{Chunk, CHUNK_SIZE},
    coord::Coord3,
    generation::{FlatTerrain, TerrainGenerator},
    FrameReport, World, WorldStats,
};
