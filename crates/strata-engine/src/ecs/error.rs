use thiserror::Error;

use crate::ecs::entity::Entity;

/// Recoverable failures from Registry operations.
///
/// A missing component is not an error — lookups return `Ok(None)` so call
/// sites can treat absence as data. Everything here fails locally and never
/// corrupts other entities' state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EcsError {
    /// Entity creation was rejected because the registry is at capacity.
    #[error("entity capacity exceeded ({limit} live entities)")]
    CapacityExceeded { limit: usize },

    /// The handle refers to a destroyed or never-created entity.
    #[error("invalid entity handle {0:?} (stale generation or unknown index)")]
    InvalidHandle(Entity),

    /// The entity already holds a component of this type.
    #[error("entity {entity:?} already has a {type_name} component")]
    DuplicateComponent {
        entity: Entity,
        type_name: &'static str,
    },
}
