use crate::ecs::entity::Entity;

/// Lifecycle phase of a contact, derived from manifold transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    /// A manifold was created this tick.
    Enter,
    /// An existing manifold was renewed this tick.
    Stay,
    /// The manifold expired without renewal and was removed.
    Exit,
}

/// A collision notification for gameplay code, one per manifold transition.
///
/// `a` is always the smaller handle of the canonical pair. Events accumulate
/// during fixed steps and are drained by the caller between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub a: Entity,
    pub b: Entity,
    pub phase: ContactPhase,
    /// True when either collider involved is a trigger.
    pub trigger: bool,
}
