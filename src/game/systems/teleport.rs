//! Teleport arc solver
//!
//! Integrates a ballistic preview arc from the pointing device, finds the
//! first ground crossing and validates the landing spot. Recomputed every
//! frame while aiming; nothing here persists between frames.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::TeleportConfig;
use crate::game::constants::teleport::REFINE_ITERATIONS;
use crate::game::systems::collision::clamp_to_world;
use crate::game::world::HeightQuery;
use crate::util::vec3::Vec3;

/// Inline capacity covers the default step count plus the hit point
pub type ArcPoints = SmallVec<[Vec3; 64]>;

/// Where the arc met the ground
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcHit {
    pub point: Vec3,
    pub normal: Vec3,
    /// Angle between the surface normal and world up
    pub slope_deg: f32,
}

/// One frame of teleport preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeleportArc {
    /// Sampled polyline, ending at the hit point when there is one
    pub points: ArcPoints,
    pub hit: Option<ArcHit>,
    /// Slope and boundary checks both passed
    pub valid: bool,
    /// Hit point clamped into the world with height re-sampled
    pub target: Option<Vec3>,
}

impl TeleportArc {
    /// Target to commit, only when valid
    pub fn commit_target(&self) -> Option<Vec3> {
        if self.valid {
            self.target
        } else {
            None
        }
    }
}

/// Signed height of `p` above the ground
#[inline]
fn clearance(terrain: &dyn HeightQuery, p: Vec3) -> f32 {
    p.y - terrain.height_at(p.x, p.z)
}

/// First crossing from above to on/below ground along a segment
fn intersect_segment(terrain: &dyn HeightQuery, a: Vec3, b: Vec3) -> Option<Vec3> {
    if clearance(terrain, a) <= 0.0 || clearance(terrain, b) > 0.0 {
        return None;
    }
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    for _ in 0..REFINE_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if clearance(terrain, a.lerp(b, mid)) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let p = a.lerp(b, hi);
    Some(Vec3::new(p.x, terrain.height_at(p.x, p.z), p.z))
}

/// Simulate and validate a teleport arc
pub fn solve(
    origin: Vec3,
    aim: Vec3,
    terrain: &dyn HeightQuery,
    config: &TeleportConfig,
    world_radius: f32,
    player_radius: f32,
) -> TeleportArc {
    let direction = aim.normalize_or(Vec3::new(0.0, 0.0, -1.0));
    let gravity = Vec3::new(0.0, -config.gravity, 0.0);
    let h = config.sub_step;

    let mut points = ArcPoints::new();
    let mut p = origin;
    let mut v = direction * config.launch_speed;
    let mut hit_point = None;

    for _ in 0..config.max_steps {
        points.push(p);
        v += gravity * h;
        let next = p + v * h;
        if let Some(point) = intersect_segment(terrain, p, next) {
            hit_point = Some(point);
            break;
        }
        p = next;
    }

    let Some(point) = hit_point else {
        return TeleportArc {
            points,
            hit: None,
            valid: false,
            target: None,
        };
    };
    points.push(point);

    let normal = terrain.normal_at(point.x, point.z);
    let slope_deg = normal.dot(Vec3::UP).clamp(-1.0, 1.0).acos().to_degrees();
    let inside = point.ground().length() <= world_radius;
    let valid = slope_deg <= config.max_slope_deg && inside;

    let landing = clamp_to_world(point.ground(), world_radius, player_radius);
    let target = Vec3::from_ground(landing, terrain.height_at(landing.x, landing.z));

    TeleportArc {
        points,
        hit: Some(ArcHit {
            point,
            normal,
            slope_deg,
        }),
        valid,
        target: Some(target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::{FlatGround, NoiseTerrain, SlopedGround};
    use crate::util::vec2::Vec2;

    const WORLD_RADIUS: f32 = 50.0;
    const PLAYER_RADIUS: f32 = 0.35;

    fn aim_down_forward() -> Vec3 {
        Vec3::new(0.0, -0.5, -1.0)
    }

    #[test]
    fn test_flat_ground_is_valid() {
        let ground = FlatGround::default();
        let arc = solve(
            Vec3::new(0.0, 1.6, 0.0),
            aim_down_forward(),
            &ground,
            &TeleportConfig::default(),
            WORLD_RADIUS,
            PLAYER_RADIUS,
        );
        assert!(arc.valid);
        let target = arc.commit_target().unwrap();
        assert_eq!(target.y, 0.0);
        assert!(target.z < 0.0);
        let hit = arc.hit.unwrap();
        assert!(hit.slope_deg.abs() < 1e-3);
        assert_eq!(*arc.points.last().unwrap(), hit.point);
    }

    #[test]
    fn test_rejects_steep_slope() {
        let ground = SlopedGround::new(50.0, Vec2::X);
        let config = TeleportConfig::default();
        assert_eq!(config.max_slope_deg, 45.0);
        let arc = solve(
            Vec3::new(0.0, 1.5, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            &ground,
            &config,
            WORLD_RADIUS,
            PLAYER_RADIUS,
        );
        let hit = arc.hit.expect("arc should land on the slope");
        assert!((hit.slope_deg - 50.0).abs() < 0.5);
        assert!(!arc.valid);
        assert!(arc.commit_target().is_none());
        assert!(arc.target.is_some());
    }

    #[test]
    fn test_accepts_gentle_slope() {
        let ground = SlopedGround::new(20.0, Vec2::X);
        let arc = solve(
            Vec3::new(0.0, 1.5, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            &ground,
            &TeleportConfig::default(),
            WORLD_RADIUS,
            PLAYER_RADIUS,
        );
        assert!(arc.valid);
    }

    #[test]
    fn test_no_hit_when_aiming_up() {
        let arc = solve(
            Vec3::new(0.0, 1.6, 0.0),
            Vec3::UP,
            &FlatGround::default(),
            &TeleportConfig::default(),
            WORLD_RADIUS,
            PLAYER_RADIUS,
        );
        assert!(arc.hit.is_none());
        assert!(!arc.valid);
        assert!(arc.target.is_none());
        assert_eq!(arc.points.len(), TeleportConfig::default().max_steps);
        // A full-length miss still fits the inline buffer
        assert!(!arc.points.spilled());
        assert!(arc.points.inline_size() > arc.points.len());
    }

    #[test]
    fn test_rejects_landing_outside_world() {
        let world_radius = 5.0;
        let arc = solve(
            Vec3::new(0.0, 1.6, -4.5),
            aim_down_forward(),
            &FlatGround::default(),
            &TeleportConfig::default(),
            world_radius,
            PLAYER_RADIUS,
        );
        let hit = arc.hit.unwrap();
        assert!(hit.point.ground().length() > world_radius);
        assert!(!arc.valid);
        let target = arc.target.unwrap();
        assert!(target.ground().length() <= world_radius - PLAYER_RADIUS + 1e-4);
    }

    #[test]
    fn test_target_height_resampled_on_terrain() {
        let terrain = NoiseTerrain::default();
        let origin = Vec3::new(3.0, terrain.height_at(3.0, 3.0) + 1.6, 3.0);
        let arc = solve(origin, aim_down_forward(), &terrain, &TeleportConfig::default(), WORLD_RADIUS, PLAYER_RADIUS);
        let target = arc.target.unwrap();
        assert!((target.y - terrain.height_at(target.x, target.z)).abs() < 1e-5);
    }

    #[test]
    fn test_polyline_starts_at_origin() {
        let origin = Vec3::new(1.0, 2.0, 1.0);
        let arc = solve(
            origin,
            aim_down_forward(),
            &FlatGround::default(),
            &TeleportConfig::default(),
            WORLD_RADIUS,
            PLAYER_RADIUS,
        );
        assert_eq!(arc.points[0], origin);
        assert!(arc.points.len() <= TeleportConfig::default().max_steps + 1);
    }
}
