use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Engine tunables, provided once at startup.
///
/// Loaded from JSON by the host application; every field has a default so a
/// partial config block is valid. Passing the config explicitly (instead of
/// compile-time constants) keeps deterministic tests free to vary parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of live entities per registry.
    #[serde(default = "default_max_entities")]
    pub max_entities: usize,
    /// Fixed simulation timestep in seconds (default: 1/60).
    #[serde(default = "default_fixed_dt")]
    pub fixed_dt: f32,
    /// Upper bound on fixed steps per rendered frame.
    #[serde(default = "default_max_steps_per_frame")]
    pub max_steps_per_frame: u32,
    /// Global gravity in m/s². Y-up worlds want a negative Y component.
    #[serde(default = "default_gravity")]
    pub gravity: Vec2,
    /// World units per physical meter; scales integrated motion.
    #[serde(default = "default_units_per_meter")]
    pub units_per_meter: f32,
    /// Per-tick velocity retention factor; 1.0 disables ambient damping.
    #[serde(default = "default_damping")]
    pub damping: f32,
    /// Impulse-solver passes per tick.
    #[serde(default = "default_solver_iterations")]
    pub solver_iterations: u32,
    /// Fraction of the remaining penetration corrected per solver pass.
    #[serde(default = "default_position_correction")]
    pub position_correction: f32,
    /// Penetration depth ignored by positional correction, to keep resting
    /// contacts from jittering.
    #[serde(default = "default_penetration_slop")]
    pub penetration_slop: f32,
    /// Linear speed below which a body counts as idle, in units/s.
    #[serde(default = "default_sleep_linear_threshold")]
    pub sleep_linear_threshold: f32,
    /// Angular speed below which a body counts as idle, in rad/s.
    #[serde(default = "default_sleep_angular_threshold")]
    pub sleep_angular_threshold: f32,
    /// Consecutive idle ticks before a body falls asleep.
    #[serde(default = "default_sleep_ticks")]
    pub sleep_ticks: u32,
    /// Ticks a manifold survives without renewed overlap before expiring.
    #[serde(default = "default_manifold_expiry_ticks")]
    pub manifold_expiry_ticks: u32,
}

fn default_max_entities() -> usize {
    5000
}
fn default_fixed_dt() -> f32 {
    1.0 / 60.0
}
fn default_max_steps_per_frame() -> u32 {
    10
}
fn default_gravity() -> Vec2 {
    Vec2::new(0.0, -9.81)
}
fn default_units_per_meter() -> f32 {
    1.0
}
fn default_damping() -> f32 {
    0.99
}
fn default_solver_iterations() -> u32 {
    8
}
fn default_position_correction() -> f32 {
    0.2
}
fn default_penetration_slop() -> f32 {
    0.01
}
fn default_sleep_linear_threshold() -> f32 {
    0.05
}
fn default_sleep_angular_threshold() -> f32 {
    0.05
}
fn default_sleep_ticks() -> u32 {
    60
}
fn default_manifold_expiry_ticks() -> u32 {
    6
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_entities: default_max_entities(),
            fixed_dt: default_fixed_dt(),
            max_steps_per_frame: default_max_steps_per_frame(),
            gravity: default_gravity(),
            units_per_meter: default_units_per_meter(),
            damping: default_damping(),
            solver_iterations: default_solver_iterations(),
            position_correction: default_position_correction(),
            penetration_slop: default_penetration_slop(),
            sleep_linear_threshold: default_sleep_linear_threshold(),
            sleep_angular_threshold: default_sleep_angular_threshold(),
            sleep_ticks: default_sleep_ticks(),
            manifold_expiry_ticks: default_manifold_expiry_ticks(),
        }
    }
}

impl EngineConfig {
    /// Parse a config block from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
