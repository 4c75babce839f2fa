use glam::Vec3;

use super::{BoxPrimitive, ColliderShape};
use crate::world::chunk::{
    Chunk, ChunkNeighborhood, NeighborhoodSnapshot, CHUNK_SIZE,
};

const UNIT_HALF_EXTENTS: Vec3 = Vec3::splat(0.5);

/// Everything a worker needs to build one chunk's collider, captured on the
/// simulation thread.
#[derive(Clone)]
pub enum ChunkColliderRequest {
    /// Every voxel is active; one box covers the whole chunk.
    FullChunk,
    /// One box per exposed voxel, read from an immutable snapshot.
    PerVoxel(NeighborhoodSnapshot),
}

impl ChunkColliderRequest {
    /// Picks the build path from the chunk's current fill state. Returns
    /// `None` for a chunk with no active voxels, which gets no collider.
    pub fn capture(center: &Chunk, neighbors: [Option<&Chunk>; 6]) -> Option<Self> {
        if !center.is_any_active() {
            None
        } else if !center.is_any_inactive() {
            Some(Self::FullChunk)
        } else {
            Some(Self::PerVoxel(NeighborhoodSnapshot::capture(
                center, neighbors,
            )))
        }
    }

    pub fn is_full_chunk(&self) -> bool {
        matches!(self, Self::FullChunk)
    }
}

/// Builds the collider for a chunk, in chunk-local space.
pub fn build_chunk_collider(request: &ChunkColliderRequest) -> Option<ColliderShape> {
    match request {
        ChunkColliderRequest::FullChunk => {
            let half = Vec3::splat(CHUNK_SIZE as f32 / 2.0);

            Some(ColliderShape::Cuboid(BoxPrimitive {
                offset: half,
                half_extents: half,
            }))
        }

        ChunkColliderRequest::PerVoxel(snapshot) => {
            let boxes = build_voxel_boxes(&snapshot.view());

            if boxes.is_empty() {
                None
            } else {
                Some(ColliderShape::Compound(boxes))
            }
        }
    }
}

/// One unit box for each active voxel with at least one exposed face. Uses
/// the same exposure rule as the mesher, so colliders and geometry agree.
pub fn build_voxel_boxes(neighborhood: &ChunkNeighborhood<'_>) -> Vec<BoxPrimitive> {
    let mut boxes = Vec::new();

    if !neighborhood.is_any_active() {
        return boxes;
    }

    for z in 0..CHUNK_SIZE {
        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                if neighborhood.exposed_faces(x, y, z).is_empty() {
                    continue;
                }

                boxes.push(BoxPrimitive {
                    offset: Vec3::new(x as f32, y as f32, z as f32) + UNIT_HALF_EXTENTS,
                    half_extents: UNIT_HALF_EXTENTS,
                });
            }
        }
    }

    boxes
}

/// The kinds of collider a component can ask for. Everything but `Chunk` is
/// cheap enough to build on the spot.
pub enum ColliderSource {
    Cuboid { half_extents: Vec3 },
    Capsule { half_height: f32, radius: f32 },
    Compound(Vec<BoxPrimitive>),
    TriMesh { vertices: Vec<Vec3>, triangles: Vec<[u32; 3]> },
    Chunk(ChunkColliderRequest),
}

impl ColliderSource {
    pub fn runs_in_background(&self) -> bool {
        matches!(self, Self::Chunk(_))
    }

    pub fn build(self) -> Option<ColliderShape> {
        match self {
            Self::Cuboid { half_extents } => Some(ColliderShape::Cuboid(BoxPrimitive {
                offset: Vec3::ZERO,
                half_extents,
            })),
            Self::Capsule {
                half_height,
                radius,
            } => Some(ColliderShape::Capsule {
                half_height,
                radius,
            }),
            Self::Compound(boxes) if boxes.is_empty() => None,
            Self::Compound(boxes) => Some(ColliderShape::Compound(boxes)),
            Self::TriMesh {
                vertices,
                triangles,
            } if !triangles.is_empty() => Some(ColliderShape::TriMesh {
                vertices,
                triangles,
            }),
            Self::TriMesh { .. } => None,
            Self::Chunk(request) => build_chunk_collider(&request),
        }
    }
}
