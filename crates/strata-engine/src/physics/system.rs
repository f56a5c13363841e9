use std::collections::BTreeMap;

use glam::Vec2;

use crate::components::{Rigidbody, Transform};
use crate::core::config::EngineConfig;
use crate::core::time::FixedTimestep;
use crate::ecs::{Entity, Registry};
use crate::physics::broadphase::{broad_phase, gather_colliders, ColliderRecord};
use crate::physics::events::{CollisionEvent, ContactPhase};
use crate::physics::manifold::{CollisionManifold, PairKey};
use crate::physics::obb::Obb;
use crate::physics::sleep::update_sleep;
use crate::physics::solver::resolve;

/// Fixed-step physics orchestrator.
///
/// Owns the persistent manifold map and the fixed-timestep accumulator.
/// Every tick runs the same sequence — Integrate, BroadPhase, NarrowPhase,
/// Resolve, SleepUpdate, ManifoldExpiry — and a tick is atomic: external
/// readers only ever observe the state between ticks.
pub struct PhysicSystem {
    config: EngineConfig,
    timestep: FixedTimestep,
    /// Contact manifolds keyed by canonical entity pair. A BTreeMap keeps
    /// solver iteration order deterministic across runs.
    manifolds: BTreeMap<PairKey, CollisionManifold>,
    events: Vec<CollisionEvent>,
    tick: u64,
}

impl PhysicSystem {
    pub fn new(config: EngineConfig) -> Self {
        let timestep = FixedTimestep::new(config.fixed_dt, config.max_steps_per_frame);
        Self {
            config,
            timestep,
            manifolds: BTreeMap::new(),
            events: Vec::new(),
            tick: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of fixed ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// The active manifold for an entity pair, in either order.
    pub fn manifold(&self, a: Entity, b: Entity) -> Option<&CollisionManifold> {
        self.manifolds.get(&PairKey::new(a, b))
    }

    /// All active manifolds, in canonical pair order.
    pub fn manifolds(&self) -> impl Iterator<Item = (&PairKey, &CollisionManifold)> {
        self.manifolds.iter()
    }

    /// Collision events gathered by the most recent `update` call.
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    /// Take ownership of the pending events, leaving the queue empty.
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Feed one frame of wall time. Runs zero or more fixed ticks depending
    /// on the accumulator, bounded by `max_steps_per_frame`. Returns the
    /// number of ticks executed; events from those ticks replace the
    /// previous frame's queue.
    pub fn update(&mut self, registry: &mut Registry, frame_dt: f32) -> u32 {
        self.events.clear();
        let steps = self.timestep.accumulate(frame_dt);
        for _ in 0..steps {
            self.step(registry);
        }
        steps
    }

    /// Run exactly one fixed tick.
    pub fn step(&mut self, registry: &mut Registry) {
        let dt = self.config.fixed_dt;
        self.integrate(registry, dt);
        let records = gather_colliders(registry);
        let pairs = broad_phase(&records);
        self.narrow_phase(registry, &records, &pairs);
        resolve(registry, &mut self.manifolds, &self.config);
        update_sleep(registry, &self.config);
        self.expire_manifolds();
        self.tick += 1;
    }

    /// Apply accumulated force and velocity to every awake body's Transform.
    fn integrate(&self, registry: &mut Registry, dt: f32) {
        let gravity = self.config.gravity;
        let scale = self.config.units_per_meter;
        let damping = self.config.damping;

        for entity in registry.entities_with2::<Rigidbody, Transform>() {
            let Ok(Some(body)) = registry.get_mut::<Rigidbody>(entity) else {
                continue;
            };
            if body.is_sleeping() {
                continue;
            }

            if body.kinematic {
                let delta = body.velocity * scale * dt;
                let spin = body.angular_velocity * dt;
                if let Ok(Some(transform)) = registry.get_mut::<Transform>(entity) {
                    transform.position += delta;
                    transform.rotation += spin;
                }
                continue;
            }

            // Massless dynamic bodies coast: immovable by forces, still
            // advanced by whatever velocity gameplay gave them.
            if body.mass > 0.0 {
                let acceleration = body.force / body.mass + gravity * body.gravity_scale;
                body.velocity += acceleration * dt;
            }
            body.force = Vec2::ZERO;

            let delta = body.velocity * scale * dt;
            let spin = body.angular_velocity * dt;
            body.velocity *= damping;
            body.angular_velocity *= damping;

            if let Ok(Some(transform)) = registry.get_mut::<Transform>(entity) {
                transform.position += delta;
                transform.rotation += spin;
            }
        }
    }

    /// Precise OBB tests over the broad-phase candidates; creates or renews
    /// manifolds and wakes sleeping participants.
    fn narrow_phase(
        &mut self,
        registry: &mut Registry,
        records: &[ColliderRecord],
        pairs: &[(PairKey, usize, usize)],
    ) {
        for &(key, i, j) in pairs {
            // Match record order to the canonical key so the SAT normal
            // points from the pair's first entity toward its second.
            let (first, second) = if records[i].entity == key.first() {
                (&records[i], &records[j])
            } else {
                (&records[j], &records[i])
            };

            let Some(hit) = Obb::intersect(&first.obb, &second.obb) else {
                // Existing manifold (if any) ages toward expiry instead of
                // being dropped the moment contact flickers off.
                continue;
            };

            let trigger = first.trigger || second.trigger;
            let phase = match self.manifolds.get_mut(&key) {
                Some(manifold) => {
                    manifold.renew(hit, trigger);
                    manifold.update_contacts(&first.obb, &second.obb);
                    ContactPhase::Stay
                }
                None => {
                    let mut manifold = CollisionManifold::new(hit, trigger);
                    manifold.update_contacts(&first.obb, &second.obb);
                    self.manifolds.insert(key, manifold);
                    ContactPhase::Enter
                }
            };

            match phase {
                // A brand-new contact wakes both sides and restarts their
                // low-speed timers.
                ContactPhase::Enter => {
                    wake(registry, key.first());
                    wake(registry, key.second());
                }
                // Renewal only pulls sleepers back up; it must not keep
                // resetting an awake resting body's timer or it would never
                // fall asleep.
                _ => {
                    wake_if_sleeping(registry, key.first());
                    wake_if_sleeping(registry, key.second());
                }
            }

            self.events.push(CollisionEvent {
                a: key.first(),
                b: key.second(),
                phase,
                trigger,
            });
        }
    }

    /// Age manifolds that saw no renewed overlap this tick; drop the ones
    /// past the expiry threshold and report them as Exit events.
    fn expire_manifolds(&mut self) {
        let expiry = self.config.manifold_expiry_ticks;
        let mut expired: Vec<(PairKey, bool)> = Vec::new();

        for (key, manifold) in self.manifolds.iter_mut() {
            if manifold.touched {
                manifold.touched = false;
                continue;
            }
            manifold.age += 1;
            if manifold.age > expiry {
                expired.push((*key, manifold.trigger));
            }
        }

        for (key, trigger) in expired {
            self.manifolds.remove(&key);
            self.events.push(CollisionEvent {
                a: key.first(),
                b: key.second(),
                phase: ContactPhase::Exit,
                trigger,
            });
        }
    }
}

fn wake(registry: &mut Registry, entity: Entity) {
    if let Ok(Some(body)) = registry.get_mut::<Rigidbody>(entity) {
        body.wake();
    }
}

fn wake_if_sleeping(registry: &mut Registry, entity: Entity) {
    if let Ok(Some(body)) = registry.get_mut::<Rigidbody>(entity) {
        if body.is_sleeping() {
            body.wake();
            log::debug!("entity {:?} woken by contact", entity);
        }
    }
}
