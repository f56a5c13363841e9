//! Entity-component storage: generational handles, sparse-set storages, and
//! the Registry that owns them.

pub mod entity;
pub mod error;
pub mod registry;
pub mod storage;

pub use entity::Entity;
pub use error::EcsError;
pub use registry::Registry;
pub use storage::ComponentStorage;
