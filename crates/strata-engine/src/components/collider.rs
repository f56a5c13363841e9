use glam::Vec2;

/// Axis-aligned box shape in the entity's local frame.
///
/// The world-space collider is derived every tick from this plus the
/// entity's Transform (offset rotated, extents scaled). Friction and
/// restitution live here so static geometry can carry surface properties
/// without a Rigidbody.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCollider {
    /// Half-width and half-height before the Transform's scale is applied.
    pub half_extents: Vec2,
    /// Offset of the box center from the entity position, in local space.
    pub offset: Vec2,
    /// Coulomb friction coefficient of the surface.
    pub friction: f32,
    /// Bounciness: 0 kills, 1 preserves the normal approach velocity.
    pub restitution: f32,
    /// Triggers report contacts through events but are never resolved,
    /// so bodies may pass through them.
    pub is_trigger: bool,
}

impl BoxCollider {
    /// Collider covering `size` world units before scaling, centered on the entity.
    pub fn new(size: Vec2) -> Self {
        Self {
            half_extents: size * 0.5,
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

impl Default for BoxCollider {
    fn default() -> Self {
        Self {
            half_extents: Vec2::splat(0.5),
            offset: Vec2::ZERO,
            friction: 0.5,
            restitution: 0.4,
            is_trigger: false,
        }
    }
}
