use crossbeam_channel::{Receiver, Sender};
use glam::Vec3;
use std::collections::HashMap;

use super::{build_chunk_collider, BodyKind, ColliderShape, ColliderSource, Physics};
use crate::concurrency::{JobQueue, JobQueueError};

/// Identity of something that owns a collider, e.g. one loaded chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u64);

/// Result of a background build, sent back to the simulation thread.
struct BuiltCollider {
    component: ComponentId,
    ticket: u64,
    shape: Option<ColliderShape>,
}

#[derive(Clone, Copy)]
struct PendingBuild {
    ticket: u64,
    body: BodyKind,
    translation: Vec3,
}

struct Registration<H> {
    pending: Option<PendingBuild>,
    collider: Option<H>,
}

/// Tracks which components want colliders, builds expensive shapes on the
/// job queue, and installs finished shapes on the simulation thread.
///
/// Every background build carries a ticket. A result is applied only if its
/// component is still registered and still waiting on that exact ticket, so
/// deregistering or resubmitting a component discards whatever is in flight.
pub struct ColliderRegistry<P: Physics> {
    registered: HashMap<ComponentId, Registration<P::Handle>>,
    next_ticket: u64,
    next_component: u64,
    results: (Sender<BuiltCollider>, Receiver<BuiltCollider>),
}

impl<P: Physics> ColliderRegistry<P> {
    pub fn new() -> Self {
        Self {
            registered: HashMap::new(),
            next_ticket: 0,
            next_component: 0,
            results: crossbeam_channel::unbounded(),
        }
    }

    /// Hands out an id that has never been registered before.
    pub fn allocate_component(&mut self) -> ComponentId {
        let component = ComponentId(self.next_component);
        self.next_component += 1;

        component
    }

    /// Requests a collider for `component`, replacing any earlier request.
    ///
    /// Cheap shapes are built and installed immediately. Chunk shapes are
    /// built on `jobs` and installed by a later `drain`; until then the
    /// previous collider, if any, stays in place.
    pub fn register(
        &mut self,
        component: ComponentId,
        source: ColliderSource,
        body: BodyKind,
        translation: Vec3,
        jobs: &JobQueue,
        physics: &mut P,
    ) -> Result<(), JobQueueError> {
        let registration = self
            .registered
            .entry(component)
            .or_insert_with(|| Registration {
                pending: None,
                collider: None,
            });

        if !source.runs_in_background() {
            registration.pending = None;

            if let Some(old) = registration.collider.take() {
                physics.remove(old);
            }

            registration.collider = source
                .build()
                .map(|shape| physics.insert(&shape, body, translation));

            return Ok(());
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let sender = self.results.0.clone();
        let queued = jobs.queue(move || {
            let shape = match source {
                ColliderSource::Chunk(request) => build_chunk_collider(&request),
                source => source.build(),
            };

            // The receiver only goes away with the registry itself.
            let _ = sender.send(BuiltCollider {
                component,
                ticket,
                shape,
            });
        });

        match queued {
            Ok(_) => {
                registration.pending = Some(PendingBuild {
                    ticket,
                    body,
                    translation,
                });
                Ok(())
            }

            Err(err) => {
                warn!("Collider build for {:?} was not queued: {}", component, err);
                registration.pending = None;
                Err(err)
            }
        }
    }

    /// Forgets `component`, removing its collider and invalidating any build
    /// still in flight. Returns whether it was registered.
    pub fn deregister(&mut self, component: ComponentId, physics: &mut P) -> bool {
        match self.registered.remove(&component) {
            Some(registration) => {
                if let Some(collider) = registration.collider {
                    physics.remove(collider);
                }

                true
            }

            None => false,
        }
    }

    /// Installs finished background builds. Must run on the simulation
    /// thread. Returns the number of results applied.
    pub fn drain(&mut self, physics: &mut P) -> usize {
        let mut applied = 0;

        for built in self.results.1.try_iter() {
            let Some(registration) = self.registered.get_mut(&built.component) else {
                trace!("Discarded collider for deregistered {:?}.", built.component);
                continue;
            };

            let pending = match registration.pending.take() {
                Some(pending) if pending.ticket == built.ticket => pending,
                other => {
                    registration.pending = other;
                    trace!(
                        "Discarded stale collider build #{} for {:?}.",
                        built.ticket,
                        built.component
                    );
                    continue;
                }
            };

            if let Some(old) = registration.collider.take() {
                physics.remove(old);
            }

            registration.collider = built
                .shape
                .map(|shape| physics.insert(&shape, pending.body, pending.translation));
            applied += 1;
        }

        applied
    }

    pub fn is_registered(&self, component: ComponentId) -> bool {
        self.registered.contains_key(&component)
    }

    pub fn is_pending(&self, component: ComponentId) -> bool {
        self.registered
            .get(&component)
            .map_or(false, |registration| registration.pending.is_some())
    }

    pub fn collider(&self, component: ComponentId) -> Option<&P::Handle> {
        self.registered
            .get(&component)
            .and_then(|registration| registration.collider.as_ref())
    }

    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    pub fn pending_count(&self) -> usize {
        self.registered
            .values()
            .filter(|registration| registration.pending.is_some())
            .count()
    }
}

impl<P: Physics> Default for ColliderRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}
