//! Ground-following player movement
//!
//! Only x/z are simulated. Height is re-derived from the height query after
//! every step, so there is no vertical momentum and the player never falls.

use crate::config::LocomotionConfig;
use crate::game::input::Stick;
use crate::game::systems::collision::{clamp_to_world, resolve_with_triggers};
use crate::game::world::{ColliderTag, World};
use crate::util::vec2::Vec2;
use crate::util::vec3::Vec3;

/// Result of one locomotion step
#[derive(Debug, Clone, PartialEq)]
pub struct LocomotionStep {
    /// Authoritative eye position after collision and height pinning
    pub position: Vec3,
    /// Trigger colliders touched for the first time
    pub triggered: Vec<ColliderTag>,
}

/// Ground-plane forward and right vectors for a camera heading.
///
/// Yaw 0 looks down -z; right is forward x up.
pub fn heading_basis(yaw: f32) -> (Vec2, Vec2) {
    let forward = Vec2::new(-yaw.sin(), -yaw.cos()).normalize_or(Vec2::FORWARD);
    let right = Vec2::new(-forward.z, forward.x);
    (forward, right)
}

/// Unresolved next ground position for a (deadzoned) stick value
pub fn candidate(current: Vec2, stick: Stick, yaw: f32, config: &LocomotionConfig, dt: f32) -> Vec2 {
    let (forward, right) = heading_basis(yaw);
    current + forward * (-stick.y * config.walk_speed * dt) + right * (stick.x * config.strafe_speed * dt)
}

/// Clamp, resolve collisions and pin height for a ground position
fn settle(target: Vec2, world: &mut World, config: &LocomotionConfig, world_radius: f32) -> LocomotionStep {
    let clamped = clamp_to_world(target, world_radius, config.player_radius);
    let (resolved, triggered) =
        resolve_with_triggers(clamped, &mut world.colliders, world_radius, config.player_radius);
    let y = world.height_at(resolved) + config.eye_height;
    LocomotionStep {
        position: Vec3::from_ground(resolved, y),
        triggered,
    }
}

/// Advance the player by one frame of stick input
pub fn step(
    current: Vec3,
    stick: Stick,
    yaw: f32,
    world: &mut World,
    config: &LocomotionConfig,
    world_radius: f32,
    dt: f32,
) -> LocomotionStep {
    if stick.is_idle() {
        // Still re-pin height so a teleport or reset never leaves y stale
        let y = world.height_at(current.ground()) + config.eye_height;
        return LocomotionStep {
            position: Vec3::from_ground(current.ground(), y),
            triggered: Vec::new(),
        };
    }
    let next = candidate(current.ground(), stick, yaw, config, dt);
    settle(next, world, config, world_radius)
}

/// Move the player to a validated teleport target
pub fn teleport_to(target: Vec3, world: &mut World, config: &LocomotionConfig, world_radius: f32) -> LocomotionStep {
    settle(target.ground(), world, config, world_radius)
}

/// Spawn position for a new round: the origin, height-pinned
pub fn spawn_point(world: &World, config: &LocomotionConfig) -> Vec3 {
    Vec3::from_ground(Vec2::ZERO, world.height_at(Vec2::ZERO) + config.eye_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::{ColliderKind, ColliderSet, SlopedGround, StaticCollider};
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-4;
    const WORLD_RADIUS: f32 = 50.0;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_heading_basis_at_zero_yaw() {
        let (forward, right) = heading_basis(0.0);
        assert!(forward.approx_eq(Vec2::new(0.0, -1.0), EPSILON));
        assert!(right.approx_eq(Vec2::new(1.0, 0.0), EPSILON));
    }

    #[test]
    fn test_heading_basis_quarter_turn() {
        let (forward, right) = heading_basis(FRAC_PI_2);
        assert!(forward.approx_eq(Vec2::new(-1.0, 0.0), EPSILON));
        assert!(right.approx_eq(Vec2::new(0.0, -1.0), EPSILON));
        assert!(approx_eq(forward.dot(right), 0.0));
    }

    #[test]
    fn test_forward_stick_walks_forward() {
        let config = LocomotionConfig::default();
        let next = candidate(Vec2::ZERO, Stick::new(0.0, -1.0), 0.0, &config, 0.5);
        assert!(next.approx_eq(Vec2::new(0.0, -config.walk_speed * 0.5), EPSILON));
    }

    #[test]
    fn test_strafe_uses_strafe_speed() {
        let config = LocomotionConfig::default();
        let next = candidate(Vec2::ZERO, Stick::new(1.0, 0.0), 0.0, &config, 1.0);
        assert!(next.approx_eq(Vec2::new(config.strafe_speed, 0.0), EPSILON));
    }

    #[test]
    fn test_height_follows_terrain() {
        let config = LocomotionConfig::default();
        let mut world = World {
            terrain: Box::new(SlopedGround::new(10.0, Vec2::X)),
            colliders: ColliderSet::default(),
        };
        let start = spawn_point(&world, &config);
        let moved = step(start, Stick::new(1.0, 0.0), 0.0, &mut world, &config, WORLD_RADIUS, 0.05);
        let expected = world.height_at(moved.position.ground()) + config.eye_height;
        assert!(approx_eq(moved.position.y, expected));
        assert!(moved.position.y > start.y);
    }

    #[test]
    fn test_step_blocked_by_collider() {
        let config = LocomotionConfig::default();
        let source = vec![StaticCollider::new(Vec2::new(0.0, -1.0), 0.5, ColliderKind::Grave)];
        let mut world = World::new(Box::new(crate::game::world::FlatGround::default()), &source);
        let mut pos = spawn_point(&world, &config);
        for _ in 0..100 {
            pos = step(pos, Stick::new(0.0, -1.0), 0.0, &mut world, &config, WORLD_RADIUS, 0.05).position;
        }
        let dist = pos.ground().distance_to(Vec2::new(0.0, -1.0));
        assert!(dist >= config.player_radius + 0.5 - EPSILON);
    }

    #[test]
    fn test_step_stays_in_world() {
        let config = LocomotionConfig::default();
        let mut world = World::flat();
        let mut pos = Vec3::new(0.0, 0.0, -48.0);
        for _ in 0..200 {
            pos = step(pos, Stick::new(0.0, -1.0), 0.0, &mut world, &config, WORLD_RADIUS, 0.05).position;
        }
        assert!(pos.ground().length() <= WORLD_RADIUS - config.player_radius + EPSILON);
    }

    #[test]
    fn test_teleport_pins_height() {
        let config = LocomotionConfig::default();
        let mut world = World {
            terrain: Box::new(SlopedGround::new(5.0, Vec2::X)),
            colliders: ColliderSet::default(),
        };
        let landed = teleport_to(Vec3::new(10.0, 99.0, 2.0), &mut world, &config, WORLD_RADIUS);
        let expected = world.height_at(Vec2::new(10.0, 2.0)) + config.eye_height;
        assert!(approx_eq(landed.position.y, expected));
    }
}
