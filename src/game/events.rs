//! Events emitted to presentation collaborators (HUD, audio, particles)

use serde::{Deserialize, Serialize};

use crate::game::round::RoundReport;
use crate::game::state::GhostId;
use crate::game::world::ColliderTag;
use crate::util::vec3::Vec3;

/// Ghost lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GhostEvent {
    Spawned { ghost_id: GhostId, position: Vec3 },
    Scared { ghost_id: GhostId, position: Vec3 },
    Removed { ghost_id: GhostId },
}

impl GhostEvent {
    pub fn ghost_id(&self) -> GhostId {
        match self {
            GhostEvent::Spawned { ghost_id, .. }
            | GhostEvent::Scared { ghost_id, .. }
            | GhostEvent::Removed { ghost_id } => *ghost_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GhostEvent::Spawned { .. } => "spawned",
            GhostEvent::Scared { .. } => "scared",
            GhostEvent::Removed { .. } => "removed",
        }
    }
}

/// Round lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundEvent {
    Started { duration: f32 },
    Ended(RoundReport),
}

/// Everything a frame can emit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Round(RoundEvent),
    Ghost(GhostEvent),
    /// First touch of a trigger collider this round
    ColliderTriggered { tag: ColliderTag, position: Vec3 },
    /// Player committed a teleport
    Teleported { position: Vec3 },
    /// A scare action fired (hit = at least one ghost affected)
    ScareFired { hit: bool },
}

impl From<GhostEvent> for GameEvent {
    fn from(event: GhostEvent) -> Self {
        GameEvent::Ghost(event)
    }
}

impl From<RoundEvent> for GameEvent {
    fn from(event: RoundEvent) -> Self {
        GameEvent::Round(event)
    }
}
