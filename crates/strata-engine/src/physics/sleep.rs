use crate::components::{Rigidbody, SleepState};
use crate::core::config::EngineConfig;
use crate::ecs::Registry;

/// Advance per-body sleep timers and demote sustained-idle bodies.
///
/// A body falls asleep after `sleep_ticks` consecutive ticks with linear and
/// angular speed below the configured thresholds; its velocities are zeroed
/// so it stays put until contact wakes it. Waking happens in the narrow
/// phase, where new or renewed manifolds are discovered.
pub fn update_sleep(registry: &mut Registry, config: &EngineConfig) {
    let linear_sq = config.sleep_linear_threshold * config.sleep_linear_threshold;

    for entity in registry.entities_with::<Rigidbody>() {
        let Ok(Some(body)) = registry.get_mut::<Rigidbody>(entity) else {
            continue;
        };
        if body.kinematic || body.sleep == SleepState::Sleeping {
            continue;
        }

        let idle = body.velocity.length_squared() < linear_sq
            && body.angular_velocity.abs() < config.sleep_angular_threshold;
        if !idle {
            body.sleep_timer = 0;
            continue;
        }

        body.sleep_timer += 1;
        if body.sleep_timer >= config.sleep_ticks {
            body.sleep = SleepState::Sleeping;
            body.velocity = glam::Vec2::ZERO;
            body.angular_velocity = 0.0;
            log::debug!("entity {:?} fell asleep", entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn config(sleep_ticks: u32) -> EngineConfig {
        EngineConfig {
            sleep_ticks,
            sleep_linear_threshold: 0.1,
            sleep_angular_threshold: 0.1,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn idle_body_sleeps_after_the_configured_tick_count() {
        let mut reg = Registry::new(4);
        let e = reg.create().unwrap();
        reg.add(e, Rigidbody::new(1.0).with_velocity(Vec2::new(0.05, 0.0)))
            .unwrap();

        let cfg = config(3);
        for _ in 0..2 {
            update_sleep(&mut reg, &cfg);
            assert!(!reg.get::<Rigidbody>(e).unwrap().unwrap().is_sleeping());
        }
        update_sleep(&mut reg, &cfg);
        let body = reg.get::<Rigidbody>(e).unwrap().unwrap();
        assert!(body.is_sleeping());
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn fast_motion_resets_the_timer() {
        let mut reg = Registry::new(4);
        let e = reg.create().unwrap();
        reg.add(e, Rigidbody::new(1.0).with_velocity(Vec2::new(0.05, 0.0)))
            .unwrap();

        let cfg = config(3);
        update_sleep(&mut reg, &cfg);
        update_sleep(&mut reg, &cfg);

        // Burst of speed: timer restarts from zero.
        reg.get_mut::<Rigidbody>(e).unwrap().unwrap().velocity = Vec2::new(5.0, 0.0);
        update_sleep(&mut reg, &cfg);
        assert_eq!(reg.get::<Rigidbody>(e).unwrap().unwrap().sleep_timer, 0);

        reg.get_mut::<Rigidbody>(e).unwrap().unwrap().velocity = Vec2::ZERO;
        update_sleep(&mut reg, &cfg);
        update_sleep(&mut reg, &cfg);
        assert!(!reg.get::<Rigidbody>(e).unwrap().unwrap().is_sleeping());
        update_sleep(&mut reg, &cfg);
        assert!(reg.get::<Rigidbody>(e).unwrap().unwrap().is_sleeping());
    }

    #[test]
    fn kinematic_bodies_never_sleep() {
        let mut reg = Registry::new(4);
        let e = reg.create().unwrap();
        reg.add(e, Rigidbody::kinematic()).unwrap();

        let cfg = config(1);
        for _ in 0..5 {
            update_sleep(&mut reg, &cfg);
        }
        assert!(!reg.get::<Rigidbody>(e).unwrap().unwrap().is_sleeping());
    }
}
