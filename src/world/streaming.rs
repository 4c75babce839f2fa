use crossbeam_channel::{Receiver, Sender};
use glam::Vec3;
use std::{
    collections::{HashMap, HashSet, VecDeque},
    panic::AssertUnwindSafe,
    sync::Arc,
};

use super::{
    chunk::{Chunk, ChunkNeighborhood, Mesher},
    coord::Coord3,
    generation::TerrainGenerator,
    world_to_chunk,
};
use crate::{
    collections::WorkScheduler,
    concurrency::JobQueue,
    config::{ConfigError, StreamingConfig},
    memory::ChunkPool,
    physics::{ChunkColliderRequest, ColliderRegistry, ColliderSource, ComponentId, Physics},
    render::Renderer,
    time::{FrameBudget, Stopwatch},
};

/// A chunk in the world map, with whatever the renderer and physics engine
/// currently hold for it.
pub struct LoadedChunk<H> {
    pub(super) chunk: Chunk,
    renderable: Option<H>,
    component: ComponentId,
}

impl<H> LoadedChunk<H> {
    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    pub fn renderable(&self) -> Option<&H> {
        self.renderable.as_ref()
    }

    /// Collider registration of this chunk.
    pub fn component(&self) -> ComponentId {
        self.component
    }
}

/// Outcome of one terrain job. `chunk` is `None` when the generator panicked.
struct GeneratedChunk {
    coord: Coord3,
    chunk: Option<Chunk>,
}

/// Work done by one `World::update` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub removed: usize,
    pub dispatched: usize,
    pub inserted: usize,
    pub colliders_applied: usize,
    pub refreshed: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorldStats {
    pub loaded: usize,
    pub generation_queued: usize,
    pub generation_in_flight: usize,
    pub refresh_queued: usize,
    pub pending_removal: usize,
    pub pending_colliders: usize,
    pub pool_rented: usize,
}

/// Streaming controller. Owns the chunk map and every piece of per-chunk
/// derived state, and is driven once per frame from the simulation thread.
pub struct World<R: Renderer, P: Physics> {
    config: StreamingConfig,
    pub(super) chunks: HashMap<Coord3, LoadedChunk<R::Handle>>,
    observer_chunk: Option<Coord3>,

    generation: WorkScheduler,
    generation_in_flight: HashSet<Coord3>,
    generated: (Sender<GeneratedChunk>, Receiver<GeneratedChunk>),
    refresh: WorkScheduler,
    pending_removal: VecDeque<Coord3>,
    pending_removal_set: HashSet<Coord3>,

    mesher: Mesher,
    colliders: ColliderRegistry<P>,
    renderer: R,
    physics: P,

    generator: Arc<dyn TerrainGenerator>,
    pool: Arc<ChunkPool>,
    jobs: JobQueue,
}

impl<R: Renderer, P: Physics> World<R, P> {
    pub fn new(
        config: StreamingConfig,
        generator: Arc<dyn TerrainGenerator>,
        renderer: R,
        physics: P,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let pool = ChunkPool::new(config.effective_pool_capacity());
        let jobs = JobQueue::new(config.worker_count);
        debug!(
            "World created: load radius {}, {} workers, {} pooled chunk buffers.",
            config.load_radius,
            jobs.worker_count(),
            pool.capacity()
        );

        Ok(Self {
            config,
            chunks: HashMap::new(),
            observer_chunk: None,
            generation: WorkScheduler::new(),
            generation_in_flight: HashSet::new(),
            generated: crossbeam_channel::unbounded(),
            refresh: WorkScheduler::new(),
            pending_removal: VecDeque::new(),
            pending_removal_set: HashSet::new(),
            mesher: Mesher::new(),
            colliders: ColliderRegistry::new(),
            renderer,
            physics,
            generator,
            pool,
            jobs,
        })
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<ChunkPool> {
        &self.pool
    }

    pub fn jobs(&self) -> &JobQueue {
        &self.jobs
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn colliders(&self) -> &ColliderRegistry<P> {
        &self.colliders
    }

    pub fn observer_chunk(&self) -> Option<Coord3> {
        self.observer_chunk
    }

    /// Runs one frame of streaming work for an observer at `observer`.
    pub fn update(&mut self, observer: Vec3) -> FrameReport {
        let stopwatch = Stopwatch::start_new();
        let mut report = FrameReport::default();

        self.set_observer(observer);
        report.removed = self.process_removals();
        report.dispatched = self.dispatch_generation();

        if self.config.wait_for_generation_batch && report.dispatched > 0 {
            self.jobs.wait_idle();
        }

        report.inserted = self.drain_generated();
        report.colliders_applied = self.colliders.drain(&mut self.physics);
        report.refreshed = self.process_refreshes();

        if report != FrameReport::default() {
            trace!("Streaming frame took {}ms: {:?}", stopwatch.elapsed_ms(), report);
        }

        report
    }

    /// Moves the observer. When that crosses into a new chunk, queues every
    /// missing chunk in the load cube for generation and marks loaded chunks
    /// beyond `load_radius + 1` for removal. Returns whether a rescan ran.
    pub fn set_observer(&mut self, observer: Vec3) -> bool {
        let center = world_to_chunk(observer);

        if self.observer_chunk == Some(center) {
            return false;
        }

        self.observer_chunk = Some(center);
        let radius = self.config.load_radius;
        let mut queued = 0;

        for dz in -radius..=radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    let coord = center + Coord3::new(dx, dy, dz);

                    if self.chunks.contains_key(&coord)
                        || self.generation_in_flight.contains(&coord)
                    {
                        continue;
                    }

                    if self.generation.enqueue(coord, coord.distance_squared(center)) {
                        queued += 1;
                    }
                }
            }
        }

        let mut marked = 0;
        for coord in self.chunks.keys() {
            if coord.chebyshev_distance(center) > radius + 1
                && self.pending_removal_set.insert(*coord)
            {
                self.pending_removal.push_back(*coord);
                marked += 1;
            }
        }

        debug!(
            "Observer entered chunk {}: {} queued for generation, {} marked for removal.",
            center, queued, marked
        );

        true
    }

    fn is_within_unload_margin(&self, coord: Coord3) -> bool {
        self.observer_chunk.map_or(true, |center| {
            coord.chebyshev_distance(center) <= self.config.load_radius + 1
        })
    }

    fn process_removals(&mut self) -> usize {
        let mut removed = 0;

        while removed < self.config.removals_per_frame {
            let Some(coord) = self.pending_removal.pop_front() else {
                break;
            };
            self.pending_removal_set.remove(&coord);

            // The observer may have walked back toward it since it was marked.
            if !self.is_within_unload_margin(coord) && self.remove_chunk(coord) {
                removed += 1;
            }
        }

        removed
    }

    fn dispatch_generation(&mut self) -> usize {
        let mut dispatched = 0;

        while dispatched < self.config.generations_per_frame && !self.generation.is_empty() {
            // Every in-flight job will rent one buffer; leave room for all of them.
            if self.pool.remaining_buffers() <= self.generation_in_flight.len() {
                trace!("Generation paused: chunk pool has no spare buffers.");
                break;
            }

            let Some(coord) = self.generation.dequeue() else {
                break;
            };

            let in_range = self.observer_chunk.map_or(true, |center| {
                coord.chebyshev_distance(center) <= self.config.load_radius
            });

            if !in_range || self.chunks.contains_key(&coord) {
                continue;
            }

            let generator = Arc::clone(&self.generator);
            let pool = Arc::clone(&self.pool);
            let sender = self.generated.0.clone();

            let queued = self.jobs.queue(move || {
                let chunk = std::panic::catch_unwind(AssertUnwindSafe(|| {
                    generator.generate(coord, &pool)
                }))
                .ok();

                // The world holds the receiver for as long as workers exist.
                let _ = sender.send(GeneratedChunk { coord, chunk });
            });

            match queued {
                Ok(_) => {
                    self.generation_in_flight.insert(coord);
                    dispatched += 1;
                }

                Err(err) => {
                    warn!("Generation of chunk {} was not queued: {}", coord, err);
                    break;
                }
            }
        }

        dispatched
    }

    /// Inserts finished terrain. A generator panic is fatal here, on the
    /// simulation thread, after its coordinate has left the in-flight set.
    fn drain_generated(&mut self) -> usize {
        let generated: Vec<GeneratedChunk> = self.generated.1.try_iter().collect();
        let mut inserted = 0;

        for GeneratedChunk { coord, chunk } in generated {
            self.generation_in_flight.remove(&coord);

            let Some(chunk) = chunk else {
                error!("Terrain generator panicked on chunk {}.", coord);
                panic!("Terrain generation failed for chunk {}", coord);
            };

            if !self.is_within_unload_margin(coord) {
                trace!("Dropped generated chunk {}: observer moved away.", coord);
                continue;
            }

            if self.insert_chunk(chunk) {
                inserted += 1;
            }
        }

        inserted
    }

    /// Adds a chunk to the world map and queues it and its loaded face
    /// neighbors for refresh. A chunk whose coordinate is already loaded is
    /// dropped and false is returned.
    pub fn insert_chunk(&mut self, chunk: Chunk) -> bool {
        let coord = chunk.coord();

        if self.chunks.contains_key(&coord) {
            trace!("Dropped duplicate chunk {}.", coord);
            return false;
        }

        let component = self.colliders.allocate_component();
        self.chunks.insert(
            coord,
            LoadedChunk {
                chunk,
                renderable: None,
                component,
            },
        );

        self.enqueue_refresh(coord);
        self.enqueue_neighbor_refresh(coord);

        true
    }

    /// Unloads a chunk: releases its renderable and collider, returns its
    /// storage to the pool, and queues its loaded face neighbors for refresh.
    pub fn remove_chunk(&mut self, coord: Coord3) -> bool {
        let Some(record) = self.chunks.remove(&coord) else {
            return false;
        };

        if let Some(renderable) = record.renderable {
            self.renderer.release(renderable);
        }

        self.colliders.deregister(record.component, &mut self.physics);
        drop(record.chunk);

        self.enqueue_neighbor_refresh(coord);

        true
    }

    /// Unloads every chunk and forgets all queued work.
    pub fn unload_all(&mut self) {
        let coords: Vec<Coord3> = self.chunks.keys().copied().collect();

        for coord in coords {
            self.remove_chunk(coord);
        }

        self.generation.clear();
        self.refresh.clear();
        self.pending_removal.clear();
        self.pending_removal_set.clear();
    }

    /// Queues a loaded chunk for mesh and collider rebuild.
    pub fn enqueue_refresh(&mut self, coord: Coord3) -> bool {
        if !self.chunks.contains_key(&coord) {
            return false;
        }

        let priority = self
            .observer_chunk
            .map_or(0, |center| coord.distance_squared(center));

        self.refresh.enqueue(coord, priority)
    }

    fn enqueue_neighbor_refresh(&mut self, coord: Coord3) {
        for neighbor in coord.neighbors() {
            self.enqueue_refresh(neighbor);
        }
    }

    fn process_refreshes(&mut self) -> usize {
        let budget = FrameBudget::start(self.config.refresh_budget());
        let mut refreshed = 0;

        // At least one refresh per frame, however slow, so the queue always drains.
        while refreshed < self.config.refreshes_per_frame
            && (refreshed == 0 || budget.has_remaining())
        {
            let Some(coord) = self.refresh.dequeue() else {
                break;
            };

            if self.rebuild(coord) {
                refreshed += 1;
            }
        }

        refreshed
    }

    /// Rebuilds the renderable synchronously and submits the collider build
    /// to the job queue. A chunk without active voxels ends up with neither.
    fn rebuild(&mut self, coord: Coord3) -> bool {
        let Some(record) = self.chunks.get(&coord) else {
            return false;
        };

        let component = record.component;
        let origin = record.chunk.world_position();

        let (renderable, collider_request) = if record.chunk.is_any_active() {
            let neighbors: [Option<&Chunk>; 6] = std::array::from_fn(|index| {
                self.chunks
                    .get(&(coord + Coord3::FACE_OFFSETS[index]))
                    .map(LoadedChunk::chunk)
            });
            let neighborhood = ChunkNeighborhood::from_chunk(&record.chunk, neighbors);

            let renderable = self
                .mesher
                .generate(&neighborhood)
                .map(|mesh| self.renderer.upload(coord, origin, &mesh));

            (
                renderable,
                ChunkColliderRequest::capture(&record.chunk, neighbors),
            )
        } else {
            (None, None)
        };

        if let Some(record) = self.chunks.get_mut(&coord) {
            if let Some(old) = record.renderable.take() {
                self.renderer.release(old);
            }

            record.renderable = renderable;
        }

        match collider_request {
            Some(request) => {
                let registered = self.colliders.register(
                    component,
                    ColliderSource::Chunk(request),
                    self.config.collider_body,
                    origin,
                    &self.jobs,
                    &mut self.physics,
                );

                if let Err(err) = registered {
                    warn!("Collider for chunk {} not rebuilt: {}", coord, err);
                }
            }

            None => {
                self.colliders.deregister(component, &mut self.physics);
            }
        }

        true
    }

    pub fn contains(&self, coord: Coord3) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn loaded(&self, coord: Coord3) -> Option<&LoadedChunk<R::Handle>> {
        self.chunks.get(&coord)
    }

    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn loaded_coords(&self) -> impl Iterator<Item = Coord3> + '_ {
        self.chunks.keys().copied()
    }

    pub fn collider(&self, coord: Coord3) -> Option<&P::Handle> {
        self.chunks
            .get(&coord)
            .and_then(|record| self.colliders.collider(record.component))
    }

    /// Queued for generation or currently being generated.
    pub fn is_generation_pending(&self, coord: Coord3) -> bool {
        self.generation.contains(coord) || self.generation_in_flight.contains(&coord)
    }

    pub fn is_pending_removal(&self, coord: Coord3) -> bool {
        self.pending_removal_set.contains(&coord)
    }

    pub fn is_refresh_queued(&self, coord: Coord3) -> bool {
        self.refresh.contains(coord)
    }

    /// No streaming, refresh, or collider work is outstanding.
    pub fn is_idle(&self) -> bool {
        self.generation.is_empty()
            && self.generation_in_flight.is_empty()
            && self.refresh.is_empty()
            && self.pending_removal.is_empty()
            && self.colliders.pending_count() == 0
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            loaded: self.chunks.len(),
            generation_queued: self.generation.len(),
            generation_in_flight: self.generation_in_flight.len(),
            refresh_queued: self.refresh.len(),
            pending_removal: self.pending_removal.len(),
            pending_colliders: self.colliders.pending_count(),
            pool_rented: self.pool.rented_buffers(),
        }
    }
}
