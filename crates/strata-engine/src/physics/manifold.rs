use glam::Vec2;

use crate::ecs::entity::Entity;
use crate::physics::obb::{Obb, SatHit};

/// Maximum contact points tracked per manifold.
pub const MAX_CONTACT_POINTS: usize = 2;

/// Canonical unordered entity pair: the smaller handle always comes first,
/// so (a, b) and (b, a) map to the same manifold.
///
/// `Ord` is derived so manifold maps can iterate in a deterministic order —
/// solver results must not depend on hash seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    a: Entity,
    b: Entity,
}

impl PairKey {
    pub fn new(x: Entity, y: Entity) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    /// The smaller entity of the pair.
    #[inline]
    pub fn first(&self) -> Entity {
        self.a
    }

    /// The larger entity of the pair.
    #[inline]
    pub fn second(&self) -> Entity {
        self.b
    }

    /// Whether the pair involves the given entity.
    #[inline]
    pub fn involves(&self, entity: Entity) -> bool {
        self.a == entity || self.b == entity
    }
}

/// Persistent record of a contact between two colliding bodies.
///
/// One manifold lives per canonical pair for as long as the contact persists
/// (plus an expiry grace period); its accumulated impulses are retained
/// across ticks to warm-start the solver.
#[derive(Debug, Clone, Copy)]
pub struct CollisionManifold {
    /// Contact normal, unit length, pointing from the pair's first entity
    /// toward its second.
    pub normal: Vec2,
    /// Penetration depth along the normal.
    pub penetration: f32,
    /// World-space contact points, `contact_count` of them valid.
    pub contacts: [Vec2; MAX_CONTACT_POINTS],
    pub contact_count: u8,
    /// Accumulated normal impulse across solver passes (warm start).
    pub accumulated_impulse: f32,
    /// Accumulated tangent (friction) impulse across solver passes.
    pub accumulated_tangent: f32,
    /// Either collider is a trigger: report events, never resolve.
    pub trigger: bool,
    /// Ticks since the overlap was last renewed; 0 while touching.
    pub age: u32,
    /// Set by the narrow phase on renewal, cleared by manifold expiry.
    pub(crate) touched: bool,
}

impl CollisionManifold {
    /// Fresh manifold with zero accumulated impulse.
    pub fn new(hit: SatHit, trigger: bool) -> Self {
        Self {
            normal: hit.normal,
            penetration: hit.penetration,
            contacts: [Vec2::ZERO; MAX_CONTACT_POINTS],
            contact_count: 0,
            accumulated_impulse: 0.0,
            accumulated_tangent: 0.0,
            trigger,
            age: 0,
            touched: true,
        }
    }

    /// Renew the manifold with this tick's overlap, keeping the accumulated
    /// impulses so the solver warm-starts from last tick's solution.
    pub fn renew(&mut self, hit: SatHit, trigger: bool) {
        self.normal = hit.normal;
        self.penetration = hit.penetration;
        self.trigger = trigger;
        self.age = 0;
        self.touched = true;
    }

    /// Valid contact points.
    pub fn contact_points(&self) -> &[Vec2] {
        &self.contacts[..self.contact_count as usize]
    }

    /// Harvest contact points: corners of either box that lie inside the
    /// other. When deep overlap leaves no corner inside (or all four are),
    /// fall back to the midpoint between centers.
    pub fn update_contacts(&mut self, a: &Obb, b: &Obb) {
        self.contact_count = 0;
        for corner in b.corners() {
            if self.contact_count as usize == MAX_CONTACT_POINTS {
                break;
            }
            if a.contains_point(corner) {
                self.contacts[self.contact_count as usize] = corner;
                self.contact_count += 1;
            }
        }
        for corner in a.corners() {
            if self.contact_count as usize == MAX_CONTACT_POINTS {
                break;
            }
            if b.contains_point(corner) {
                self.contacts[self.contact_count as usize] = corner;
                self.contact_count += 1;
            }
        }
        if self.contact_count == 0 {
            self.contacts[0] = (a.center + b.center) * 0.5;
            self.contact_count = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(index: u32) -> Entity {
        Entity::from_bits(index as u64)
    }

    #[test]
    fn pair_key_is_canonical() {
        let a = entity(3);
        let b = entity(7);
        assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
        assert_eq!(PairKey::new(a, b).first(), a);
        assert_eq!(PairKey::new(a, b).second(), b);
    }

    #[test]
    fn renew_keeps_accumulated_impulse() {
        let hit = SatHit {
            normal: Vec2::X,
            penetration: 0.1,
        };
        let mut manifold = CollisionManifold::new(hit, false);
        manifold.accumulated_impulse = 2.5;
        manifold.accumulated_tangent = -0.5;
        manifold.age = 3;

        let renewed = SatHit {
            normal: Vec2::Y,
            penetration: 0.2,
        };
        manifold.renew(renewed, false);
        assert_eq!(manifold.accumulated_impulse, 2.5);
        assert_eq!(manifold.accumulated_tangent, -0.5);
        assert_eq!(manifold.age, 0);
        assert_eq!(manifold.normal, Vec2::Y);
    }

    #[test]
    fn contacts_pick_contained_corners() {
        let a = Obb::new(Vec2::ZERO, Vec2::splat(0.5), 0.0);
        let b = Obb::new(Vec2::new(0.5, 0.0), Vec2::splat(0.5), 0.0);
        let hit = Obb::intersect(&a, &b).unwrap();
        let mut manifold = CollisionManifold::new(hit, false);
        manifold.update_contacts(&a, &b);

        assert_eq!(manifold.contact_count, 2);
        for p in manifold.contact_points() {
            assert!(a.contains_point(*p) && b.contains_point(*p), "point {p:?}");
        }
    }

    #[test]
    fn no_contained_corner_falls_back_to_midpoint() {
        let a = Obb::new(Vec2::ZERO, Vec2::splat(2.0), 0.0);
        let b = Obb::new(Vec2::new(4.1, 0.0), Vec2::splat(2.0), 0.0);
        // No overlap at all: force the fallback path directly.
        let mut manifold = CollisionManifold::new(
            SatHit {
                normal: Vec2::X,
                penetration: 0.0,
            },
            false,
        );
        manifold.update_contacts(&a, &b);
        assert_eq!(manifold.contact_count, 1);
        assert_eq!(manifold.contact_points()[0], Vec2::new(2.05, 0.0));
    }
}
