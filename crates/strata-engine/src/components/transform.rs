use glam::Vec2;

/// Position, rotation and scale of an entity in world space.
///
/// Read every physics tick; written by the contact solver for dynamic bodies
/// and by gameplay code otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world units.
    pub position: Vec2,
    /// Rotation in radians, counter-clockwise.
    pub rotation: f32,
    /// Per-axis scale factor.
    pub scale: Vec2,
}

impl Transform {
    /// Transform at the given position with no rotation and unit scale.
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Move the transform by a world-space delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}
