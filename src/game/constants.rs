/// Frame timing - CRITICAL: every frame dt is clamped to MAX_DT before simulation
pub mod frame {
    /// Upper bound on a single frame step in seconds (tab hitches, GC pauses)
    pub const MAX_DT: f32 = 0.05;
    /// Target frame rate of the headless driver in Hz
    pub const FRAME_RATE: u32 = 60;
    /// Delta time per frame in seconds at the target rate
    pub const DT: f32 = 1.0 / 60.0;
}

/// World bounds
pub mod world {
    /// Radius of the playable circle around the origin
    pub const RADIUS: f32 = 50.0;
    /// Number of graves scattered by the default layout
    pub const GRAVE_COUNT: usize = 40;
    /// Graves are scattered inside RADIUS - GRAVE_MARGIN
    pub const GRAVE_MARGIN: f32 = 6.0;
    /// Grave footprint radius
    pub const GRAVE_RADIUS: f32 = 0.5;
    /// Trigger pumpkins scattered by the default layout
    pub const PUMPKIN_COUNT: usize = 12;
    /// Pumpkin footprint radius
    pub const PUMPKIN_RADIUS: f32 = 0.45;
    /// Trees scattered by the default layout
    pub const TREE_COUNT: usize = 60;
    /// Tree trunk footprint radius at scale 1
    pub const TREE_RADIUS: f32 = 0.6;
    /// Per-tree scale range (min, max)
    pub const TREE_SCALE: (f32, f32) = (0.8, 2.6);
    /// Statues scattered by the default layout
    pub const STATUE_COUNT: usize = 8;
    /// Statue plinth footprint radius
    pub const STATUE_RADIUS: f32 = 0.7;
}

/// Terrain height field
pub mod terrain {
    /// Seed of the default noise terrain
    pub const SEED: u32 = 2025;
    /// Peak height scale of the noise terrain
    pub const MAX_HEIGHT: f32 = 1.2;
    /// Sample offset for central-difference normals
    pub const NORMAL_EPSILON: f32 = 0.05;
}

/// Player body and locomotion
pub mod player {
    /// Player collision radius on the ground plane
    pub const RADIUS: f32 = 0.35;
    /// Eye height above the ground
    pub const EYE_HEIGHT: f32 = 1.6;
    /// Forward/backward speed in units per second
    pub const WALK_SPEED: f32 = 4.0;
    /// Sideways speed in units per second
    pub const STRAFE_SPEED: f32 = 3.2;
    /// Stick values below this magnitude (per axis) are zeroed
    pub const STICK_DEADZONE: f32 = 0.12;
}

/// Collision resolution
pub mod collision {
    /// Extra push beyond contact so the player does not re-penetrate on float equality
    pub const PUSH_EPSILON: f32 = 1e-3;
}

/// Ghost behaviour
pub mod ghost {
    /// Base chase speed in units per second
    pub const SPEED: f32 = 2.8;
    /// Per-ghost speed multiplier range (min, max)
    pub const SPEED_JITTER: (f32, f32) = (0.7, 1.3);
    /// Opacity gain per second while appearing
    pub const FADE_IN_SPEED: f32 = 1.5;
    /// Opacity loss per second while fleeing
    pub const FADE_OUT_SPEED: f32 = 3.0;
    /// Opacity at which an appearing ghost starts chasing (1.0 = only once fully active)
    pub const CHASE_THRESHOLD: f32 = 0.7;
    /// Distance (ghost to player eye) that ends the round
    pub const CONTACT_DISTANCE: f32 = 1.5;
    /// Base hover height above the world origin plane
    pub const HOVER_HEIGHT: f32 = 1.6;
    /// Hover bob amplitude
    pub const HOVER_AMPLITUDE: f32 = 0.2;
    /// Hover bob angular frequency (radians per second)
    pub const HOVER_FREQUENCY: f32 = 2.0;
}

/// Swarm spawn policy
pub mod spawn {
    /// Maximum ghosts alive at once
    pub const MAX_ACTIVE: usize = 8;
    /// Jittered spawn interval in seconds (min, max)
    pub const INTERVAL: (f32, f32) = (2.0, 4.0);
    /// Minimum spawn distance from the anchor
    pub const MIN_DISTANCE: f32 = 10.0;
    /// Maximum spawn distance from the anchor
    pub const MAX_DISTANCE: f32 = 35.0;
    /// Ghosts spawned in the opening burst of a round
    pub const OPENING_BURST: usize = 3;
    /// Delay before the first opening ghost
    pub const OPENING_DELAY: f32 = 0.5;
    /// Gap between opening ghosts
    pub const OPENING_STAGGER: f32 = 0.5;
}

/// Scare action
pub mod scare {
    /// Ghosts farther than this are never scared
    pub const MAX_RANGE: f32 = 20.0;
    /// Minimum cosine between aim and ghost direction (wider cone = lower)
    pub const MIN_COSINE: f32 = 0.3;
    /// Seconds before the trigger can scare again
    pub const COOLDOWN: f32 = 0.3;
    /// Light beam length for beam mode
    pub const BEAM_LENGTH: f32 = 25.0;
    /// Light beam radius for beam mode
    pub const BEAM_RADIUS: f32 = 2.0;
}

/// Teleport arc
pub mod teleport {
    /// Launch speed along the aim direction
    pub const LAUNCH_SPEED: f32 = 7.5;
    /// Downward acceleration
    pub const GRAVITY: f32 = 9.8;
    /// Integration sub-step in seconds
    pub const SUB_STEP: f32 = 1.0 / 60.0;
    /// Maximum integration steps (also the polyline capacity)
    pub const MAX_STEPS: usize = 40;
    /// Steepest landing slope accepted, in degrees
    pub const MAX_SLOPE_DEG: f32 = 45.0;
    /// Bisection refinements when locating the ground crossing
    pub const REFINE_ITERATIONS: u32 = 8;
}

/// Round constants
pub mod round {
    /// Round duration in seconds
    pub const DURATION: f32 = 60.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clamp_above_frame_time() {
        assert!(frame::MAX_DT > frame::DT);
        assert!((frame::DT - 1.0 / frame::FRAME_RATE as f32).abs() < 1e-6);
    }

    #[test]
    fn test_fade_out_faster_than_fade_in() {
        assert!(ghost::FADE_OUT_SPEED > ghost::FADE_IN_SPEED);
    }

    #[test]
    fn test_spawn_ranges_ordered() {
        assert!(spawn::INTERVAL.0 <= spawn::INTERVAL.1);
        assert!(spawn::MIN_DISTANCE < spawn::MAX_DISTANCE);
        assert!(spawn::MIN_DISTANCE > ghost::CONTACT_DISTANCE);
        assert!(ghost::SPEED_JITTER.0 <= ghost::SPEED_JITTER.1);
    }

    #[test]
    fn test_graves_fit_inside_world() {
        assert!(world::GRAVE_MARGIN < world::RADIUS);
        assert!(player::RADIUS < world::RADIUS);
    }

    #[test]
    fn test_chase_threshold_is_opacity() {
        assert!((0.0..=1.0).contains(&ghost::CHASE_THRESHOLD));
    }
}
