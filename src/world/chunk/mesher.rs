use super::{ChunkNeighborhood, CHUNK_SIZE};
use crate::{
    collections::ScratchBuffer,
    render::{MeshView, Vertex},
    world::direction::Face,
};

const CORNERS_BY_NORMAL_INDEX: [[[f32; 3]; 4]; 6] = [
    // East
    [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
    // Up
    [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
    // North
    [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
    // West
    [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
    // Down
    [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
    // South
    [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
];

// Two triangles fanned from the first corner; counter-clockwise seen from
// outside the face.
const QUAD_INDEXES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Face-culling mesh generator. Holds its output buffers between calls so
/// steady-state meshing doesn't allocate.
pub struct Mesher {
    vertexes: ScratchBuffer<Vertex>,
    indexes: ScratchBuffer<u32>,
}

impl Mesher {
    const INITIAL_QUADS: usize = 1024;

    pub fn new() -> Self {
        Self {
            vertexes: ScratchBuffer::with_capacity(Self::INITIAL_QUADS * 4),
            indexes: ScratchBuffer::with_capacity(Self::INITIAL_QUADS * 6),
        }
    }

    /// Emits one quad for every face of an active cell that borders inactive
    /// space or an absent neighbor chunk. Returns `None` when nothing was
    /// emitted, in which case any previous geometry for the chunk is stale.
    pub fn generate(&mut self, neighborhood: &ChunkNeighborhood<'_>) -> Option<MeshView<'_>> {
        self.vertexes.reset();
        self.indexes.reset();

        if !neighborhood.is_any_active() {
            return None;
        }

        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let cell = neighborhood.cell(x, y, z);

                    if !cell.is_active() {
                        continue;
                    }

                    for face in neighborhood.exposed_faces(x, y, z).faces() {
                        self.push_quad(x, y, z, face, cell.material());
                    }
                }
            }
        }

        if self.indexes.is_empty() {
            None
        } else {
            Some(MeshView {
                vertices: self.vertexes.as_slice(),
                indices: self.indexes.as_slice(),
            })
        }
    }

    /// Capacity of the vertex buffer, i.e. its high-water mark.
    pub fn vertex_capacity(&self) -> usize {
        self.vertexes.capacity()
    }

    fn push_quad(&mut self, x: i32, y: i32, z: i32, face: Face, material: u8) {
        let indexes_start = self.vertexes.len() as u32;
        let normal = face.normal().to_array();

        for corner in CORNERS_BY_NORMAL_INDEX[face.index()] {
            self.vertexes.push(Vertex {
                position: [
                    x as f32 + corner[0],
                    y as f32 + corner[1],
                    z as f32 + corner[2],
                ],
                normal,
                material: material as u32,
            });
        }

        for index in QUAD_INDEXES {
            self.indexes.push(indexes_start + index);
        }
    }
}

impl Default for Mesher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        memory::ChunkPool,
        world::{block::Cell, chunk::Chunk, coord::Coord3},
    };
    use glam::Vec3;

    fn solid_neighbors(pool: &std::sync::Arc<ChunkPool>) -> Vec<Chunk> {
        Coord3::ZERO
            .neighbors()
            .map(|coord| {
                let mut chunk = Chunk::new(coord, pool);
                chunk.fill(Cell::solid(1));
                chunk
            })
            .collect()
    }

    fn neighbor_refs(neighbors: &[Chunk]) -> [Option<&Chunk>; 6] {
        std::array::from_fn(|index| neighbors.get(index))
    }

    #[test]
    fn isolated_cell_emits_six_faces() {
        let pool = ChunkPool::new(1);
        let mut chunk = Chunk::new(Coord3::ZERO, &pool);
        chunk.set_cell_active(8, 8, 8, true);
        chunk.set_cell_type(8, 8, 8, 4);

        let mut mesher = Mesher::new();
        let mesh = mesher.generate(&ChunkNeighborhood::isolated(&chunk)).unwrap();

        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        assert!(mesh.vertices.iter().all(|vertex| vertex.material == 4));
        assert_eq!(mesh.vertex_bytes().len(), 24 * std::mem::size_of::<Vertex>());
    }

    #[test]
    fn enclosed_solid_chunk_emits_nothing() {
        let pool = ChunkPool::new(7);
        let mut chunk = Chunk::new(Coord3::ZERO, &pool);
        chunk.fill(Cell::solid(1));
        let neighbors = solid_neighbors(&pool);

        let mut mesher = Mesher::new();
        let neighborhood = ChunkNeighborhood::from_chunk(&chunk, neighbor_refs(&neighbors));
        assert!(mesher.generate(&neighborhood).is_none());
    }

    #[test]
    fn solid_chunk_without_neighbors_emits_its_shell() {
        let pool = ChunkPool::new(1);
        let mut chunk = Chunk::new(Coord3::ZERO, &pool);
        chunk.fill(Cell::solid(1));

        let mut mesher = Mesher::new();
        let mesh = mesher.generate(&ChunkNeighborhood::isolated(&chunk)).unwrap();

        assert_eq!(mesh.face_count(), 6 * (CHUNK_SIZE * CHUNK_SIZE) as usize);
    }

    #[test]
    fn empty_chunk_emits_nothing() {
        let pool = ChunkPool::new(1);
        let chunk = Chunk::new(Coord3::ZERO, &pool);

        assert!(Mesher::new()
            .generate(&ChunkNeighborhood::isolated(&chunk))
            .is_none());
    }

    #[test]
    fn present_neighbor_culls_boundary_face() {
        let pool = ChunkPool::new(2);
        let mut chunk = Chunk::new(Coord3::ZERO, &pool);
        let mut up = Chunk::new(Coord3::new(0, 1, 0), &pool);
        chunk.set_cell_active(3, 15, 3, true);
        up.set_cell_active(3, 0, 3, true);

        let mut neighbors = [None; 6];
        neighbors[Face::Up.index()] = Some(&up);

        let mut mesher = Mesher::new();
        let mesh = mesher
            .generate(&ChunkNeighborhood::from_chunk(&chunk, neighbors))
            .unwrap();

        assert_eq!(mesh.face_count(), 5);
        assert!(mesh
            .vertices
            .iter()
            .all(|vertex| vertex.normal != [0.0, 1.0, 0.0]));
    }

    #[test]
    fn quads_wind_counter_clockwise_around_their_normal() {
        let pool = ChunkPool::new(1);
        let mut chunk = Chunk::new(Coord3::ZERO, &pool);
        chunk.set_cell_active(0, 0, 0, true);

        let mut mesher = Mesher::new();
        let mesh = mesher.generate(&ChunkNeighborhood::isolated(&chunk)).unwrap();

        for triangle in mesh.indices.chunks(3) {
            let [a, b, c] = [0usize, 1, 2]
                .map(|corner| Vec3::from(mesh.vertices[triangle[corner] as usize].position));
            let normal = Vec3::from(mesh.vertices[triangle[0] as usize].normal);

            assert!((b - a).cross(c - a).dot(normal) > 0.0);
        }
    }

    #[test]
    fn meshing_is_idempotent() {
        let pool = ChunkPool::new(2);
        let mut chunk = Chunk::new(Coord3::ZERO, &pool);
        let mut east = Chunk::new(Coord3::new(1, 0, 0), &pool);
        for index in 0..CHUNK_SIZE {
            chunk.set_cell_active(index, index / 2, 15 - index, true);
            east.set_cell_active(0, index, index, true);
        }

        let mut neighbors = [None; 6];
        neighbors[Face::East.index()] = Some(&east);
        let neighborhood = ChunkNeighborhood::from_chunk(&chunk, neighbors);

        let mut mesher = Mesher::new();
        let first = {
            let mesh = mesher.generate(&neighborhood).unwrap();
            (mesh.vertices.to_vec(), mesh.indices.to_vec())
        };
        let mesh = mesher.generate(&neighborhood).unwrap();

        assert_eq!(first.0, mesh.vertices);
        assert_eq!(first.1, mesh.indices);
    }

    #[test]
    fn buffers_keep_high_water_mark() {
        let pool = ChunkPool::new(2);
        let mut noisy = Chunk::new(Coord3::ZERO, &pool);
        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    noisy.set_cell_active(x, y, z, (x + y + z) % 2 == 0);
                }
            }
        }
        let mut single = Chunk::new(Coord3::ONE, &pool);
        single.set_cell_active(1, 1, 1, true);

        let mut mesher = Mesher::new();
        mesher.generate(&ChunkNeighborhood::isolated(&noisy));
        let high_water = mesher.vertex_capacity();
        assert!(high_water > Mesher::INITIAL_QUADS * 4);

        let mesh = mesher.generate(&ChunkNeighborhood::isolated(&single)).unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesher.vertex_capacity(), high_water);
    }
}
