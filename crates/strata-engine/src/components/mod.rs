//! Plain-data components consumed by the physics pipeline. At most one
//! instance of each type per entity; the Registry owns all component memory.

pub mod collider;
pub mod rigidbody;
pub mod transform;

pub use collider::BoxCollider;
pub use rigidbody::{Rigidbody, SleepState};
pub use transform::Transform;
