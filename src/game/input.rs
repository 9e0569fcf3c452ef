//! Per-frame input from the input and pointing-device collaborators

use serde::{Deserialize, Serialize};

use crate::util::vec3::Vec3;

/// Two-axis stick value in [-1, 1]; `y` is negative when pushed forward
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stick {
    pub x: f32,
    pub y: f32,
}

impl Stick {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_idle(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Zero each axis whose magnitude is below `deadzone`, clamp the rest to [-1, 1]
pub fn apply_deadzone(raw: Stick, deadzone: f32) -> Stick {
    let filter = |v: f32| {
        if v.abs() < deadzone || !v.is_finite() {
            0.0
        } else {
            v.clamp(-1.0, 1.0)
        }
    };
    Stick {
        x: filter(raw.x),
        y: filter(raw.y),
    }
}

/// World-space ray from a pointing device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }
}

/// Trigger button state for this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerEdge {
    #[default]
    Idle,
    Pressed,
    Held,
    Released,
}

/// A pointing device and its trigger
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub ray: Ray,
    pub trigger: TriggerEdge,
}

/// Everything one frame consumes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Raw locomotion stick; deadzone is applied by the game loop
    pub stick: Stick,
    /// Camera heading around the up axis (0 = looking down -z)
    pub heading_yaw: f32,
    /// Scare pointer; fires on `Pressed`
    pub scare: Option<Pointer>,
    /// Teleport pointer; aims while pressed/held, commits on `Released`
    pub teleport: Option<Pointer>,
}
