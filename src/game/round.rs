//! Round controller
//!
//! Countdown timer and win/loss detection. Transitions are idempotent:
//! starting a running round or ending a round that is not running is
//! ignored rather than treated as an error.

use serde::{Deserialize, Serialize};

use crate::game::events::RoundEvent;

/// How a round finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Timer ran out with no ghost contact
    #[serde(rename = "won")]
    Survived,
    /// A ghost reached the player
    #[serde(rename = "lost")]
    Caught,
}

impl Outcome {
    /// HUD-facing label
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Survived => "won",
            Outcome::Caught => "lost",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    Idle,
    Running,
    Ended(Outcome),
}

/// Final statistics handed to the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub outcome: Outcome,
    pub elapsed_seconds: f32,
    pub kill_count: u32,
    pub triggered_count: u32,
}

/// Timer and counters for the current round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    phase: RoundPhase,
    duration: f32,
    remaining: f32,
    elapsed: f32,
    kill_count: u32,
    triggered_count: u32,
}

impl RoundState {
    pub fn new(duration: f32) -> Self {
        Self {
            phase: RoundPhase::Idle,
            duration,
            remaining: duration,
            elapsed: 0.0,
            kill_count: 0,
            triggered_count: 0,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            RoundPhase::Ended(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Seconds left; goes non-positive on the frame the timer expires
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Remaining time floored at zero, for display
    pub fn display_remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn kill_count(&self) -> u32 {
        self.kill_count
    }

    pub fn triggered_count(&self) -> u32 {
        self.triggered_count
    }

    /// Begin a round from Idle or Ended. Ignored while Running.
    pub fn start(&mut self) -> Option<RoundEvent> {
        if self.is_running() {
            tracing::debug!("Round start ignored: already running");
            return None;
        }
        self.phase = RoundPhase::Running;
        self.remaining = self.duration;
        self.elapsed = 0.0;
        self.kill_count = 0;
        self.triggered_count = 0;
        tracing::info!("Round started ({:.0}s)", self.duration);
        Some(RoundEvent::Started {
            duration: self.duration,
        })
    }

    /// Advance the countdown. Returns the end event when the timer expires.
    pub fn tick(&mut self, dt: f32) -> Option<RoundEvent> {
        if !self.is_running() {
            return None;
        }
        self.remaining -= dt;
        self.elapsed += dt;
        if self.remaining <= 0.0 {
            return self.end(Outcome::Survived);
        }
        None
    }

    /// Finish the round. Ignored unless Running.
    pub fn end(&mut self, outcome: Outcome) -> Option<RoundEvent> {
        if !self.is_running() {
            tracing::debug!("Round end ({}) ignored: phase {:?}", outcome, self.phase);
            return None;
        }
        self.phase = RoundPhase::Ended(outcome);
        let report = self.report_for(outcome);
        tracing::info!(
            "Round ended: {} after {:.1}s, {} ghosts scared, {} triggers",
            outcome,
            report.elapsed_seconds,
            report.kill_count,
            report.triggered_count
        );
        Some(RoundEvent::Ended(report))
    }

    /// Count scared ghosts. Only counted while Running.
    pub fn record_kills(&mut self, count: usize) {
        if self.is_running() {
            self.kill_count += count as u32;
        }
    }

    /// Count a trigger collider touch. Only counted while Running.
    pub fn record_trigger(&mut self) {
        if self.is_running() {
            self.triggered_count += 1;
        }
    }

    fn report_for(&self, outcome: Outcome) -> RoundReport {
        RoundReport {
            outcome,
            elapsed_seconds: self.elapsed,
            kill_count: self.kill_count,
            triggered_count: self.triggered_count,
        }
    }

    /// Report for an ended round
    pub fn report(&self) -> Option<RoundReport> {
        self.outcome().map(|outcome| self.report_for(outcome))
    }
}
