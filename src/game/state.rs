//! Entity state definitions
//!
//! Gameplay state only. Opacity is exposed as data for a presentation layer
//! to read; nothing here touches rendering resources.

use serde::{Deserialize, Serialize};

use crate::config::{GhostConfig, LocomotionConfig};
use crate::util::vec2::Vec2;
use crate::util::vec3::Vec3;

/// Ghost identifier, unique within a swarm's lifetime
pub type GhostId = u64;

/// The player body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Eye position; y is always ground height + eye height
    pub position: Vec3,
    pub radius: f32,
    pub eye_height: f32,
}

impl Player {
    pub fn new(config: &LocomotionConfig) -> Self {
        Self {
            position: Vec3::new(0.0, config.eye_height, 0.0),
            radius: config.player_radius,
            eye_height: config.eye_height,
        }
    }

    #[inline]
    pub fn ground_position(&self) -> Vec2 {
        self.position.ground()
    }
}

/// Ghost lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GhostState {
    /// Fading in after spawn
    Appearing,
    /// Fully visible
    Active,
    /// Scared; fading out
    Fleeing,
    /// Faded out; awaiting compaction
    Removed,
}

/// Signed opacity rate control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeDirection {
    In,
    Out,
    Hold,
}

impl FadeDirection {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            FadeDirection::In => 1.0,
            FadeDirection::Out => -1.0,
            FadeDirection::Hold => 0.0,
        }
    }
}

/// A single ghost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ghost {
    pub id: GhostId,
    pub position: Vec3,
    pub speed: f32,
    pub state: GhostState,
    /// In [0, 1]
    pub opacity: f32,
    pub fade: FadeDirection,
    /// Simulated time (seconds) at spawn
    pub spawn_time: f32,
    /// Hover bob phase offset
    pub hover_phase: f32,
    /// Facing angle on the ground plane
    pub yaw: f32,
}

impl Ghost {
    pub fn new(id: GhostId, position: Vec3, speed: f32, spawn_time: f32, hover_phase: f32) -> Self {
        Self {
            id,
            position,
            speed,
            state: GhostState::Appearing,
            opacity: 0.0,
            fade: FadeDirection::In,
            spawn_time,
            hover_phase,
            yaw: 0.0,
        }
    }

    /// Whether the ghost can chase, touch the player, or be scared
    pub fn is_threat(&self, config: &GhostConfig) -> bool {
        match self.state {
            GhostState::Active => true,
            GhostState::Appearing => self.opacity >= config.chase_threshold,
            GhostState::Fleeing | GhostState::Removed => false,
        }
    }

    pub fn is_fleeing(&self) -> bool {
        self.state == GhostState::Fleeing
    }

    pub fn is_removed(&self) -> bool {
        self.state == GhostState::Removed
    }

    /// Start fading out. Returns false if already fleeing or removed.
    pub fn start_fleeing(&mut self) -> bool {
        match self.state {
            GhostState::Appearing | GhostState::Active => {
                self.state = GhostState::Fleeing;
                self.fade = FadeDirection::Out;
                true
            }
            GhostState::Fleeing | GhostState::Removed => false,
        }
    }

    /// Advance opacity and state by one step. Returns true on the frame the
    /// ghost becomes Removed.
    pub fn advance_fade(&mut self, config: &GhostConfig, dt: f32) -> bool {
        let rate = match self.fade {
            FadeDirection::In => config.fade_in_speed,
            FadeDirection::Out => config.fade_out_speed,
            FadeDirection::Hold => 0.0,
        };
        self.opacity = (self.opacity + self.fade.sign() * rate * dt).clamp(0.0, 1.0);

        match self.state {
            GhostState::Appearing if self.opacity >= 1.0 => {
                self.state = GhostState::Active;
                self.fade = FadeDirection::Hold;
                false
            }
            GhostState::Fleeing if self.opacity <= 0.0 => {
                self.state = GhostState::Removed;
                self.fade = FadeDirection::Hold;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ghost() -> Ghost {
        Ghost::new(1, Vec3::new(0.0, 1.6, 10.0), 2.8, 0.0, 0.0)
    }

    #[test]
    fn test_ghost_spawns_appearing_invisible() {
        let g = ghost();
        assert_eq!(g.state, GhostState::Appearing);
        assert_eq!(g.opacity, 0.0);
        assert_eq!(g.fade, FadeDirection::In);
    }

    #[test]
    fn test_fade_in_reaches_active() {
        let config = GhostConfig::default();
        let mut g = ghost();
        for _ in 0..100 {
            g.advance_fade(&config, 0.05);
        }
        assert_eq!(g.state, GhostState::Active);
        assert_eq!(g.opacity, 1.0);
        assert_eq!(g.fade, FadeDirection::Hold);
    }

    #[test]
    fn test_threat_gate_follows_threshold() {
        let config = GhostConfig::default();
        let mut g = ghost();
        g.opacity = 0.69;
        assert!(!g.is_threat(&config));
        g.opacity = 0.7;
        assert!(g.is_threat(&config));

        let strict = GhostConfig {
            chase_threshold: 1.0,
            ..GhostConfig::default()
        };
        assert!(!g.is_threat(&strict));
    }

    #[test]
    fn test_fleeing_ghost_is_never_a_threat() {
        let config = GhostConfig::default();
        let mut g = ghost();
        g.state = GhostState::Active;
        g.opacity = 1.0;
        assert!(g.start_fleeing());
        assert!(!g.is_threat(&config));
        assert!(!g.start_fleeing());
    }

    #[test]
    fn test_fleeing_reaches_removed_within_bound() {
        let config = GhostConfig::default();
        let mut g = ghost();
        g.state = GhostState::Active;
        g.opacity = 1.0;
        g.start_fleeing();

        let dt = 0.01;
        let mut elapsed = 0.0;
        let mut removed = false;
        while elapsed < 1.0 / config.fade_out_speed + dt {
            elapsed += dt;
            if g.advance_fade(&config, dt) {
                removed = true;
                break;
            }
        }
        assert!(removed);
        assert!(g.is_removed());
        assert_eq!(g.opacity, 0.0);
    }

    #[test]
    fn test_player_starts_at_eye_height() {
        let player = Player::new(&LocomotionConfig::default());
        assert_eq!(player.position.y, 1.6);
        assert_eq!(player.ground_position(), Vec2::ZERO);
    }
}
