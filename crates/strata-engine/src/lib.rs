pub mod components;
pub mod core;
pub mod ecs;
pub mod physics;

// Re-export key types at crate root for convenience
pub use components::collider::BoxCollider;
pub use components::rigidbody::{Rigidbody, SleepState};
pub use components::transform::Transform;
pub use core::config::EngineConfig;
pub use core::time::FixedTimestep;
pub use ecs::entity::Entity;
pub use ecs::error::EcsError;
pub use ecs::registry::Registry;
pub use ecs::storage::ComponentStorage;
pub use physics::aabb::Aabb;
pub use physics::broadphase::ColliderRecord;
pub use physics::events::{CollisionEvent, ContactPhase};
pub use physics::manifold::{CollisionManifold, PairKey, MAX_CONTACT_POINTS};
pub use physics::obb::{Obb, SatHit};
pub use physics::system::PhysicSystem;
