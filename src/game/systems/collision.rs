//! Player vs static collider resolution
//!
//! Push-out against every overlapping circle, then a radial clamp into the
//! world boundary. Dense overlaps are not fully resolved in one call; the
//! remaining penetration shrinks over successive frames.

use crate::game::constants::collision::PUSH_EPSILON;
use crate::game::world::{ColliderSet, ColliderTag, StaticCollider};
use crate::util::vec2::Vec2;

/// Separation used when the player sits exactly on a collider center
const DEGENERATE_DIRECTION: Vec2 = Vec2::X;

/// Clamp a ground position into `world_radius - player_radius` of the origin
pub fn clamp_to_world(p: Vec2, world_radius: f32, player_radius: f32) -> Vec2 {
    p.clamp_length((world_radius - player_radius).max(0.0))
}

/// Push `next` out of one collider. Returns the pushed position if they overlapped.
#[inline]
fn push_out(next: Vec2, collider: &StaticCollider, player_radius: f32) -> Option<Vec2> {
    let min_dist = player_radius + collider.radius;
    let delta = next - collider.center;
    let dist_sq = delta.length_sq();
    if dist_sq >= min_dist * min_dist {
        return None;
    }
    let dist = dist_sq.sqrt();
    let direction = delta.normalize_or(DEGENERATE_DIRECTION);
    Some(next + direction * (min_dist - dist + PUSH_EPSILON))
}

/// Resolve a candidate position against colliders and the world boundary
pub fn resolve(next: Vec2, colliders: &[StaticCollider], world_radius: f32, player_radius: f32) -> Vec2 {
    let mut p = next;
    for collider in colliders {
        if let Some(pushed) = push_out(p, collider, player_radius) {
            p = pushed;
        }
    }
    clamp_to_world(p, world_radius, player_radius)
}

/// Same as [`resolve`], also flipping trigger colliders on first touch.
///
/// Returns the resolved position and the tags triggered by this call.
pub fn resolve_with_triggers(
    next: Vec2,
    colliders: &mut ColliderSet,
    world_radius: f32,
    player_radius: f32,
) -> (Vec2, Vec<ColliderTag>) {
    let mut p = next;
    let mut triggered = Vec::new();

    for collider in colliders.as_mut_slice() {
        let Some(pushed) = push_out(p, collider, player_radius) else {
            continue;
        };
        p = pushed;

        if let Some(tag) = collider.tag {
            if !collider.triggered {
                collider.triggered = true;
                triggered.push(tag);
            }
        }
    }

    (clamp_to_world(p, world_radius, player_radius), triggered)
}
