use glam::Vec2;

/// Sleep state of a dynamic body.
///
/// Sleeping bodies are skipped by integration and never originate broad-phase
/// pairs; they remain collidable as targets and wake on contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SleepState {
    #[default]
    Awake,
    Sleeping,
}

/// Dynamic body state: mass, velocities, and accumulated force.
///
/// An entity with a BoxCollider but no Rigidbody is a static collider —
/// infinite mass, never integrated or moved by the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rigidbody {
    /// Mass in kilograms. Values <= 0 are treated as immovable.
    pub mass: f32,
    /// Linear velocity in world units per second.
    pub velocity: Vec2,
    /// Angular velocity in radians per second.
    pub angular_velocity: f32,
    /// Force accumulated since the last tick; cleared on integration.
    pub force: Vec2,
    /// Multiplier on the global gravity vector. 0 disables gravity.
    pub gravity_scale: f32,
    /// Kinematic bodies advance by their velocity but ignore forces and
    /// impulses; the solver treats them as immovable.
    pub kinematic: bool,
    /// Current sleep state.
    pub sleep: SleepState,
    /// Consecutive ticks spent below the sleep speed thresholds.
    pub sleep_timer: u32,
}

impl Rigidbody {
    /// Dynamic body of the given mass, at rest.
    pub fn new(mass: f32) -> Self {
        Self {
            mass,
            ..Self::default()
        }
    }

    /// Velocity-driven kinematic body (moved by gameplay, immovable by contacts).
    pub fn kinematic() -> Self {
        Self {
            kinematic: true,
            gravity_scale: 0.0,
            ..Self::default()
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Accumulate a continuous force, applied at the next integration.
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Apply an instantaneous velocity change scaled by inverse mass.
    pub fn add_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse * self.inverse_mass();
    }

    /// 1/mass, or 0 for immovable bodies (kinematic, sleeping or massless).
    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        if self.kinematic || self.sleep == SleepState::Sleeping || self.mass <= 0.0 {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    #[inline]
    pub fn is_sleeping(&self) -> bool {
        self.sleep == SleepState::Sleeping
    }

    /// Force the body awake and restart its low-speed timer.
    #[inline]
    pub fn wake(&mut self) {
        self.sleep = SleepState::Awake;
        self.sleep_timer = 0;
    }
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            gravity_scale: 1.0,
            kinematic: false,
            sleep: SleepState::Awake,
            sleep_timer: 0,
        }
    }
}
