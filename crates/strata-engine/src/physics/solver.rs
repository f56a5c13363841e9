use std::collections::BTreeMap;

use glam::Vec2;

use crate::components::{BoxCollider, Rigidbody, Transform};
use crate::core::config::EngineConfig;
use crate::ecs::{Entity, Registry};
use crate::physics::manifold::{CollisionManifold, PairKey};

const NORMAL_EPSILON: f32 = 1e-10;
const TANGENT_EPSILON: f32 = 1e-10;

/// Iterative sequential-impulse resolution over this tick's active manifolds.
///
/// Runs `solver_iterations` passes in ascending pair-key order. Trigger
/// manifolds and pairs with no movable side are skipped; a degenerate
/// manifold (bad normal, non-finite velocity) is skipped for the pass
/// without aborting the rest.
pub fn resolve(
    registry: &mut Registry,
    manifolds: &mut BTreeMap<PairKey, CollisionManifold>,
    config: &EngineConfig,
) {
    for _ in 0..config.solver_iterations {
        for (key, manifold) in manifolds.iter_mut() {
            if !manifold.touched || manifold.trigger {
                continue;
            }
            resolve_contact(registry, *key, manifold, config);
        }
    }
}

/// Surface properties of one side of a contact.
fn surface(registry: &Registry, entity: Entity) -> (f32, f32) {
    match registry.get::<BoxCollider>(entity) {
        Ok(Some(c)) => (c.restitution, c.friction),
        _ => (0.0, 0.0),
    }
}

fn resolve_contact(
    registry: &mut Registry,
    key: PairKey,
    manifold: &mut CollisionManifold,
    config: &EngineConfig,
) {
    let (ea, eb) = (key.first(), key.second());

    // Small copies in, writes out at the end: sidesteps double-borrowing the
    // registry while both bodies are being updated.
    let body_a = registry.get::<Rigidbody>(ea).ok().flatten().copied();
    let body_b = registry.get::<Rigidbody>(eb).ok().flatten().copied();
    let inv_a = body_a.as_ref().map_or(0.0, Rigidbody::inverse_mass);
    let inv_b = body_b.as_ref().map_or(0.0, Rigidbody::inverse_mass);
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        // Static-static (or otherwise immovable) pair: nothing to move.
        return;
    }

    let normal = manifold.normal;
    if !normal.is_finite() || normal.length_squared() < NORMAL_EPSILON {
        log::warn!("skipping manifold {:?}/{:?}: degenerate contact normal", ea, eb);
        return;
    }

    let mut va = body_a.map_or(Vec2::ZERO, |b| b.velocity);
    let mut vb = body_b.map_or(Vec2::ZERO, |b| b.velocity);
    if !va.is_finite() || !vb.is_finite() {
        log::warn!("skipping manifold {:?}/{:?}: non-finite velocity", ea, eb);
        return;
    }

    let relative = vb - va;
    let normal_speed = relative.dot(normal);

    // Impulse only for approaching pairs; separating contact still gets
    // positional correction below.
    if normal_speed < 0.0 {
        let (rest_a, friction_a) = surface(registry, ea);
        let (rest_b, friction_b) = surface(registry, eb);
        let restitution = 0.5 * (rest_a + rest_b);

        let impulse_magnitude = -(1.0 + restitution) * normal_speed / inv_sum;

        // Accumulated-impulse clamp: only the delta beyond what previous
        // passes already applied is injected, and the total never goes
        // negative (no pulling bodies together).
        let previous = manifold.accumulated_impulse;
        manifold.accumulated_impulse = (previous + impulse_magnitude).max(0.0);
        let applied = manifold.accumulated_impulse - previous;

        let impulse = normal * applied;
        va -= impulse * inv_a;
        vb += impulse * inv_b;

        // Coulomb friction along the tangent, clamped by μ * normal impulse.
        let relative = vb - va;
        let tangential = relative - normal * relative.dot(normal);
        if tangential.length_squared() > TANGENT_EPSILON {
            let tangent = tangential.normalize();
            let friction = (friction_a * friction_b).sqrt();
            let max_friction = friction * manifold.accumulated_impulse;

            let jt = -relative.dot(tangent) / inv_sum;
            let previous_t = manifold.accumulated_tangent;
            manifold.accumulated_tangent =
                (previous_t + jt).clamp(-max_friction, max_friction);
            let applied_t = manifold.accumulated_tangent - previous_t;

            let friction_impulse = tangent * applied_t;
            va -= friction_impulse * inv_a;
            vb += friction_impulse * inv_b;
        }

        if inv_a > 0.0 {
            if let Ok(Some(body)) = registry.get_mut::<Rigidbody>(ea) {
                body.velocity = va;
            }
        }
        if inv_b > 0.0 {
            if let Ok(Some(body)) = registry.get_mut::<Rigidbody>(eb) {
                body.velocity = vb;
            }
        }
    }

    // Positional correction: push residual overlap apart along the normal,
    // split by inverse-mass ratio, ignoring a small slop so resting contacts
    // don't jitter.
    let depth = (manifold.penetration - config.penetration_slop).max(0.0);
    if depth > 0.0 {
        let corrected = depth * config.position_correction;
        let correction = normal * (corrected / inv_sum);
        if inv_a > 0.0 {
            if let Ok(Some(transform)) = registry.get_mut::<Transform>(ea) {
                transform.position -= correction * inv_a;
            }
        }
        if inv_b > 0.0 {
            if let Ok(Some(transform)) = registry.get_mut::<Transform>(eb) {
                transform.position += correction * inv_b;
            }
        }
        // Later passes see the remaining overlap, not the original one.
        manifold.penetration -= corrected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::obb::SatHit;

    fn manifold(normal: Vec2, penetration: f32) -> CollisionManifold {
        CollisionManifold::new(
            SatHit {
                normal,
                penetration,
            },
            false,
        )
    }

    fn test_config() -> EngineConfig {
        EngineConfig {
            solver_iterations: 4,
            position_correction: 0.2,
            penetration_slop: 0.01,
            ..EngineConfig::default()
        }
    }

    fn setup(
        reg: &mut Registry,
        pos: Vec2,
        body: Option<Rigidbody>,
        collider: BoxCollider,
    ) -> Entity {
        let e = reg.create().unwrap();
        reg.add(e, Transform::from_position(pos)).unwrap();
        reg.add(e, collider).unwrap();
        if let Some(b) = body {
            reg.add(e, b).unwrap();
        }
        e
    }

    #[test]
    fn equal_masses_exchange_velocity_at_full_restitution() {
        let mut reg = Registry::new(4);
        let bouncy = BoxCollider::new(Vec2::ONE).with_restitution(1.0).with_friction(0.0);
        let a = setup(
            &mut reg,
            Vec2::ZERO,
            Some(Rigidbody::new(1.0).with_velocity(Vec2::new(1.0, 0.0))),
            bouncy,
        );
        let b = setup(
            &mut reg,
            Vec2::new(0.9, 0.0),
            Some(Rigidbody::new(1.0).with_velocity(Vec2::new(-1.0, 0.0))),
            bouncy,
        );

        let mut manifolds = BTreeMap::new();
        manifolds.insert(PairKey::new(a, b), manifold(Vec2::X, 0.1));
        resolve(&mut reg, &mut manifolds, &test_config());

        let va = reg.get::<Rigidbody>(a).unwrap().unwrap().velocity;
        let vb = reg.get::<Rigidbody>(b).unwrap().unwrap().velocity;
        assert!((va.x - -1.0).abs() < 1e-5, "va = {va:?}");
        assert!((vb.x - 1.0).abs() < 1e-5, "vb = {vb:?}");
    }

    #[test]
    fn zero_restitution_kills_approach_velocity() {
        let mut reg = Registry::new(4);
        let dead = BoxCollider::new(Vec2::ONE).with_restitution(0.0).with_friction(0.0);
        let a = setup(
            &mut reg,
            Vec2::ZERO,
            Some(Rigidbody::new(1.0).with_velocity(Vec2::new(0.0, -2.0))),
            dead,
        );
        // Static floor below.
        let b = setup(&mut reg, Vec2::new(0.0, -1.0), None, dead);

        let key = PairKey::new(a, b);
        // Normal from the pair's first entity toward its second.
        let n = if key.first() == a { Vec2::NEG_Y } else { Vec2::Y };
        let mut manifolds = BTreeMap::new();
        manifolds.insert(key, manifold(n, 0.05));
        resolve(&mut reg, &mut manifolds, &test_config());

        let va = reg.get::<Rigidbody>(a).unwrap().unwrap().velocity;
        assert!(va.y.abs() < 1e-5, "va = {va:?}");
    }

    #[test]
    fn static_side_is_never_moved() {
        let mut reg = Registry::new(4);
        let plain = BoxCollider::new(Vec2::ONE);
        let a = setup(
            &mut reg,
            Vec2::ZERO,
            Some(Rigidbody::new(1.0).with_velocity(Vec2::new(2.0, 0.0))),
            plain,
        );
        let b = setup(&mut reg, Vec2::new(0.8, 0.0), None, plain);
        let static_pos = reg.get::<Transform>(b).unwrap().unwrap().position;

        let key = PairKey::new(a, b);
        let n = if key.first() == a { Vec2::X } else { Vec2::NEG_X };
        let mut manifolds = BTreeMap::new();
        manifolds.insert(key, manifold(n, 0.2));
        resolve(&mut reg, &mut manifolds, &test_config());

        assert_eq!(
            reg.get::<Transform>(b).unwrap().unwrap().position,
            static_pos
        );
        // The dynamic side took the whole positional correction.
        assert!(reg.get::<Transform>(a).unwrap().unwrap().position.x < 0.0);
    }

    #[test]
    fn separating_pair_gets_no_impulse() {
        let mut reg = Registry::new(4);
        let plain = BoxCollider::new(Vec2::ONE).with_friction(0.0);
        let a = setup(
            &mut reg,
            Vec2::ZERO,
            Some(Rigidbody::new(1.0).with_velocity(Vec2::new(-1.0, 0.0))),
            plain,
        );
        let b = setup(
            &mut reg,
            Vec2::new(0.9, 0.0),
            Some(Rigidbody::new(1.0).with_velocity(Vec2::new(1.0, 0.0))),
            plain,
        );

        let key = PairKey::new(a, b);
        let n = if key.first() == a { Vec2::X } else { Vec2::NEG_X };
        let mut manifolds = BTreeMap::new();
        // Shallow leftover overlap while already separating.
        manifolds.insert(key, manifold(n, 0.005));
        resolve(&mut reg, &mut manifolds, &test_config());

        assert_eq!(
            reg.get::<Rigidbody>(a).unwrap().unwrap().velocity,
            Vec2::new(-1.0, 0.0)
        );
        assert_eq!(
            reg.get::<Rigidbody>(b).unwrap().unwrap().velocity,
            Vec2::new(1.0, 0.0)
        );
    }

    #[test]
    fn friction_is_clamped_by_the_normal_impulse() {
        // A slider pressed into a floor with approach speed 2 accumulates a
        // normal impulse of 2, so the tangent impulse is capped at 2μ.
        let slide_on = |floor_friction: f32| {
            let mut reg = Registry::new(4);
            let slider = BoxCollider::new(Vec2::ONE)
                .with_restitution(0.0)
                .with_friction(1.0);
            let floor = BoxCollider::new(Vec2::ONE)
                .with_restitution(0.0)
                .with_friction(floor_friction);
            let a = setup(
                &mut reg,
                Vec2::ZERO,
                Some(Rigidbody::new(1.0).with_velocity(Vec2::new(20.0, -2.0))),
                slider,
            );
            let b = setup(&mut reg, Vec2::new(0.0, -1.0), None, floor);

            let key = PairKey::new(a, b);
            let n = if key.first() == a { Vec2::NEG_Y } else { Vec2::Y };
            let mut manifolds = BTreeMap::new();
            manifolds.insert(key, manifold(n, 0.05));
            resolve(&mut reg, &mut manifolds, &test_config());

            let tangent = manifolds[&key].accumulated_tangent;
            (reg.get::<Rigidbody>(a).unwrap().unwrap().velocity, tangent)
        };

        // μ = √(1.0 · 1.0) = 1: tangent impulse saturates at the clamp.
        let (grippy, tangent) = slide_on(1.0);
        assert!((grippy.x - 18.0).abs() < 1e-4, "grippy = {grippy:?}");
        assert!(grippy.y.abs() < 1e-5);
        assert!((tangent.abs() - 2.0).abs() < 1e-4, "tangent = {tangent}");

        // μ = √(1.0 · 0.01) = 0.1: the slippery floor barely slows it.
        let (slippery, _) = slide_on(0.01);
        assert!((slippery.x - 19.8).abs() < 1e-4, "slippery = {slippery:?}");
        assert!(slippery.x > grippy.x);
    }

    #[test]
    fn degenerate_manifold_does_not_abort_the_pass() {
        let mut reg = Registry::new(8);
        let plain = BoxCollider::new(Vec2::ONE).with_restitution(0.0).with_friction(0.0);
        let a = setup(
            &mut reg,
            Vec2::ZERO,
            Some(Rigidbody::new(1.0).with_velocity(Vec2::new(0.0, -1.0))),
            plain,
        );
        let b = setup(&mut reg, Vec2::new(0.0, -1.0), None, plain);
        let c = setup(
            &mut reg,
            Vec2::new(5.0, 0.0),
            Some(Rigidbody::new(1.0).with_velocity(Vec2::new(0.0, -1.0))),
            plain,
        );
        let d = setup(&mut reg, Vec2::new(5.0, -1.0), None, plain);

        let mut manifolds = BTreeMap::new();
        // First manifold is degenerate (zero normal), second is fine.
        manifolds.insert(PairKey::new(a, b), manifold(Vec2::ZERO, 0.05));
        let key = PairKey::new(c, d);
        let n = if key.first() == c { Vec2::NEG_Y } else { Vec2::Y };
        manifolds.insert(key, manifold(n, 0.05));
        resolve(&mut reg, &mut manifolds, &test_config());

        // The healthy manifold was still resolved.
        let vc = reg.get::<Rigidbody>(c).unwrap().unwrap().velocity;
        assert!(vc.y.abs() < 1e-5, "vc = {vc:?}");
    }

    #[test]
    fn trigger_manifold_is_not_resolved() {
        let mut reg = Registry::new(4);
        let trigger = BoxCollider::new(Vec2::ONE).trigger();
        let a = setup(
            &mut reg,
            Vec2::ZERO,
            Some(Rigidbody::new(1.0).with_velocity(Vec2::new(1.0, 0.0))),
            trigger,
        );
        let b = setup(&mut reg, Vec2::new(0.5, 0.0), None, trigger);

        let mut manifolds = BTreeMap::new();
        let mut m = manifold(Vec2::X, 0.5);
        m.trigger = true;
        manifolds.insert(PairKey::new(a, b), m);
        resolve(&mut reg, &mut manifolds, &test_config());

        assert_eq!(
            reg.get::<Rigidbody>(a).unwrap().unwrap().velocity,
            Vec2::new(1.0, 0.0)
        );
        assert_eq!(
            reg.get::<Transform>(a).unwrap().unwrap().position,
            Vec2::ZERO
        );
    }
}
