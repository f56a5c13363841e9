//! Engine plumbing shared across subsystems: configuration and fixed-step timing.

pub mod config;
pub mod time;

pub use config::EngineConfig;
pub use time::FixedTimestep;
