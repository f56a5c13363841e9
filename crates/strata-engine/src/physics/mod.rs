//! Fixed-step 2D physics: oriented-box collision with persistent warm-started
//! manifolds, a sequential-impulse solver, and body sleeping.

pub mod aabb;
pub mod broadphase;
pub mod events;
pub mod manifold;
pub mod obb;
pub mod sleep;
pub mod solver;
pub mod system;

pub use aabb::Aabb;
pub use broadphase::ColliderRecord;
pub use events::{CollisionEvent, ContactPhase};
pub use manifold::{CollisionManifold, PairKey, MAX_CONTACT_POINTS};
pub use obb::{Obb, SatHit};
pub use system::PhysicSystem;
