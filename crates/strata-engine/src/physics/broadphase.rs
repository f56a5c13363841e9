use glam::Vec2;

use crate::components::{BoxCollider, Rigidbody, Transform};
use crate::ecs::{Entity, Registry};
use crate::physics::aabb::Aabb;
use crate::physics::manifold::PairKey;
use crate::physics::obb::Obb;

/// Per-tick snapshot of one collider, recomputed from Transform+BoxCollider
/// every fixed step and never persisted across ticks.
#[derive(Debug, Clone, Copy)]
pub struct ColliderRecord {
    pub entity: Entity,
    /// Loose axis-aligned wrap, for the broad phase.
    pub aabb: Aabb,
    /// Exact oriented box, for the narrow phase.
    pub obb: Obb,
    /// Whether the entity carries a Rigidbody at all.
    pub dynamic: bool,
    /// Dynamic, awake and non-kinematic: a body the solver may move.
    pub awake: bool,
    pub kinematic: bool,
    pub trigger: bool,
}

impl ColliderRecord {
    /// Derive the world-space collider from the entity's current components.
    pub fn derive(
        entity: Entity,
        transform: &Transform,
        collider: &BoxCollider,
        body: Option<&Rigidbody>,
    ) -> Self {
        let (sin, cos) = transform.rotation.sin_cos();
        let scaled_offset = collider.offset * transform.scale;
        let rotated_offset = Vec2::new(
            scaled_offset.x * cos - scaled_offset.y * sin,
            scaled_offset.x * sin + scaled_offset.y * cos,
        );
        let obb = Obb::new(
            transform.position + rotated_offset,
            collider.half_extents * transform.scale.abs(),
            transform.rotation,
        );
        Self {
            entity,
            aabb: obb.aabb(),
            obb,
            dynamic: body.is_some(),
            awake: body.is_some_and(|b| !b.is_sleeping() && !b.kinematic),
            kinematic: body.is_some_and(|b| b.kinematic),
            trigger: collider.is_trigger,
        }
    }

    /// Whether this side can originate a collision pair on its own.
    /// Kinematic bodies keep full collision detection (their contacts and
    /// trigger events still fire); only motion and resolution ignore them.
    #[inline]
    fn originates_pairs(&self) -> bool {
        self.awake || self.kinematic
    }
}

/// Snapshot every collidable entity, in dense-storage order (deterministic
/// for identical operation histories).
pub fn gather_colliders(registry: &Registry) -> Vec<ColliderRecord> {
    let mut records = Vec::new();
    for entity in registry.entities_with2::<BoxCollider, Transform>() {
        let (Ok(Some(collider)), Ok(Some(transform))) = (
            registry.get::<BoxCollider>(entity),
            registry.get::<Transform>(entity),
        ) else {
            continue;
        };
        let body = registry.get::<Rigidbody>(entity).ok().flatten();
        records.push(ColliderRecord::derive(entity, transform, collider, body));
    }
    records
}

/// All-pairs AABB pruning: the complete, duplicate-free set of canonical
/// pairs whose AABBs intersect and where at least one side is an awake or
/// kinematic dynamic body. Sleeping and static colliders never originate
/// pairs but remain valid targets, so contact can still wake a sleeper.
pub fn broad_phase(records: &[ColliderRecord]) -> Vec<(PairKey, usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..records.len() {
        for j in (i + 1)..records.len() {
            let (a, b) = (&records[i], &records[j]);
            if !a.originates_pairs() && !b.originates_pairs() {
                continue;
            }
            if a.aabb.overlaps(&b.aabb) {
                pairs.push((PairKey::new(a.entity, b.entity), i, j));
            }
        }
    }
    pairs
}
