//! Simulation metrics
//!
//! Frame timing and gameplay counters for the headless runner. Counters are
//! lock-free atomics; only the rolling frame-time history takes a lock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::game::events::{GameEvent, GhostEvent, RoundEvent};
use crate::game::round::Outcome;

/// Frame-time samples kept for percentile calculation
const FRAME_HISTORY: usize = 1000;

/// Minimum samples before percentiles are published
const MIN_PERCENTILE_SAMPLES: usize = 10;

/// Metrics registry for one simulation
#[derive(Debug)]
pub struct SimMetrics {
    // Frame timing (microseconds)
    pub frame_time_us: AtomicU64,
    pub frame_time_p95_us: AtomicU64,
    pub frame_time_p99_us: AtomicU64,
    pub frame_time_max_us: AtomicU64,
    pub frame_count: AtomicU64,

    // Ghosts
    pub active_ghosts: AtomicU64,
    pub ghosts_spawned: AtomicU64,
    pub ghosts_scared: AtomicU64,
    pub ghosts_removed: AtomicU64,

    // Player actions
    pub scares_fired: AtomicU64,
    pub scares_hit: AtomicU64,
    pub teleports: AtomicU64,
    pub triggers: AtomicU64,

    // Rounds
    pub rounds_started: AtomicU64,
    pub rounds_won: AtomicU64,
    pub rounds_lost: AtomicU64,

    start_time: Instant,
    frame_history: RwLock<VecDeque<u64>>,
}

impl SimMetrics {
    pub fn new() -> Self {
        Self {
            frame_time_us: AtomicU64::new(0),
            frame_time_p95_us: AtomicU64::new(0),
            frame_time_p99_us: AtomicU64::new(0),
            frame_time_max_us: AtomicU64::new(0),
            frame_count: AtomicU64::new(0),
            active_ghosts: AtomicU64::new(0),
            ghosts_spawned: AtomicU64::new(0),
            ghosts_scared: AtomicU64::new(0),
            ghosts_removed: AtomicU64::new(0),
            scares_fired: AtomicU64::new(0),
            scares_hit: AtomicU64::new(0),
            teleports: AtomicU64::new(0),
            triggers: AtomicU64::new(0),
            rounds_started: AtomicU64::new(0),
            rounds_won: AtomicU64::new(0),
            rounds_lost: AtomicU64::new(0),
            start_time: Instant::now(),
            frame_history: RwLock::new(VecDeque::with_capacity(FRAME_HISTORY)),
        }
    }

    /// Record a frame's wall time and update percentiles
    pub fn record_frame_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.frame_time_us.store(us, Ordering::Relaxed);
        self.frame_count.fetch_add(1, Ordering::Relaxed);

        let mut history = self.frame_history.write();
        history.push_back(us);
        while history.len() > FRAME_HISTORY {
            history.pop_front();
        }

        if history.len() >= MIN_PERCENTILE_SAMPLES {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();

            let p95_idx = (sorted.len() as f32 * 0.95) as usize;
            let p99_idx = (sorted.len() as f32 * 0.99) as usize;

            self.frame_time_p95_us.store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.frame_time_p99_us.store(sorted[p99_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.frame_time_max_us.store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    /// Fold a batch of drained events into the counters
    pub fn record_events(&self, events: &[GameEvent]) {
        for event in events {
            let counter = match event {
                GameEvent::Ghost(GhostEvent::Spawned { .. }) => &self.ghosts_spawned,
                GameEvent::Ghost(GhostEvent::Scared { .. }) => &self.ghosts_scared,
                GameEvent::Ghost(GhostEvent::Removed { .. }) => &self.ghosts_removed,
                GameEvent::ColliderTriggered { .. } => &self.triggers,
                GameEvent::Teleported { .. } => &self.teleports,
                GameEvent::ScareFired { hit } => {
                    if *hit {
                        self.scares_hit.fetch_add(1, Ordering::Relaxed);
                    }
                    &self.scares_fired
                }
                GameEvent::Round(RoundEvent::Started { .. }) => &self.rounds_started,
                GameEvent::Round(RoundEvent::Ended(report)) => match report.outcome {
                    Outcome::Survived => &self.rounds_won,
                    Outcome::Caught => &self.rounds_lost,
                },
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn set_active_ghosts(&self, count: usize) {
        self.active_ghosts.store(count as u64, Ordering::Relaxed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Prometheus text exposition format
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("ghostyard_frame_time_microseconds", "Last frame time in microseconds", "gauge",
            self.frame_time_us.load(Ordering::Relaxed));
        metric!("ghostyard_frame_time_p95_microseconds", "95th percentile frame time", "gauge",
            self.frame_time_p95_us.load(Ordering::Relaxed));
        metric!("ghostyard_frame_time_p99_microseconds", "99th percentile frame time", "gauge",
            self.frame_time_p99_us.load(Ordering::Relaxed));
        metric!("ghostyard_frame_time_max_microseconds", "Maximum frame time", "gauge",
            self.frame_time_max_us.load(Ordering::Relaxed));
        metric!("ghostyard_frame_count", "Total frames simulated", "counter",
            self.frame_count.load(Ordering::Relaxed));

        metric!("ghostyard_ghosts_active", "Ghosts currently alive", "gauge",
            self.active_ghosts.load(Ordering::Relaxed));
        metric!("ghostyard_ghosts_spawned_total", "Ghosts spawned", "counter",
            self.ghosts_spawned.load(Ordering::Relaxed));
        metric!("ghostyard_ghosts_scared_total", "Ghosts scared", "counter",
            self.ghosts_scared.load(Ordering::Relaxed));
        metric!("ghostyard_ghosts_removed_total", "Ghosts faded out", "counter",
            self.ghosts_removed.load(Ordering::Relaxed));

        metric!("ghostyard_scares_fired_total", "Scare actions fired", "counter",
            self.scares_fired.load(Ordering::Relaxed));
        metric!("ghostyard_scares_hit_total", "Scare actions that hit a ghost", "counter",
            self.scares_hit.load(Ordering::Relaxed));
        metric!("ghostyard_teleports_total", "Committed teleports", "counter",
            self.teleports.load(Ordering::Relaxed));
        metric!("ghostyard_triggers_total", "Trigger colliders touched", "counter",
            self.triggers.load(Ordering::Relaxed));

        metric!("ghostyard_rounds_started_total", "Rounds started", "counter",
            self.rounds_started.load(Ordering::Relaxed));
        metric!("ghostyard_rounds_won_total", "Rounds survived", "counter",
            self.rounds_won.load(Ordering::Relaxed));
        metric!("ghostyard_rounds_lost_total", "Rounds lost to contact", "counter",
            self.rounds_lost.load(Ordering::Relaxed));
        metric!("ghostyard_uptime_seconds", "Runner uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// JSON summary for logs and the runner's final report
    pub fn to_json(&self) -> serde_json::Value {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        serde_json::json!({
            "performance": {
                "frame_time_us": load(&self.frame_time_us),
                "frame_time_p95_us": load(&self.frame_time_p95_us),
                "frame_time_p99_us": load(&self.frame_time_p99_us),
                "frame_time_max_us": load(&self.frame_time_max_us),
                "frame_count": load(&self.frame_count),
            },
            "ghosts": {
                "active": load(&self.active_ghosts),
                "spawned": load(&self.ghosts_spawned),
                "scared": load(&self.ghosts_scared),
                "removed": load(&self.ghosts_removed),
            },
            "actions": {
                "scares_fired": load(&self.scares_fired),
                "scares_hit": load(&self.scares_hit),
                "teleports": load(&self.teleports),
                "triggers": load(&self.triggers),
            },
            "rounds": {
                "started": load(&self.rounds_started),
                "won": load(&self.rounds_won),
                "lost": load(&self.rounds_lost),
            },
            "uptime_seconds": self.uptime_seconds(),
        })
    }
}

impl Default for SimMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::round::RoundReport;
    use crate::util::vec3::Vec3;

    #[test]
    fn test_metrics_new() {
        let metrics = SimMetrics::new();
        assert_eq!(metrics.frame_count.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.ghosts_spawned.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_frame_time() {
        let metrics = SimMetrics::new();
        for i in 0..100 {
            metrics.record_frame_time(Duration::from_micros(100 + i * 10));
        }
        assert_eq!(metrics.frame_count.load(Ordering::Relaxed), 100);
        assert!(metrics.frame_time_p95_us.load(Ordering::Relaxed) >= 1000);
        assert_eq!(metrics.frame_time_max_us.load(Ordering::Relaxed), 1090);
    }

    #[test]
    fn test_percentiles_wait_for_samples() {
        let metrics = SimMetrics::new();
        metrics.record_frame_time(Duration::from_micros(500));
        assert_eq!(metrics.frame_time_p95_us.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_events() {
        let metrics = SimMetrics::new();
        let events = vec![
            GameEvent::Round(RoundEvent::Started { duration: 60.0 }),
            GameEvent::Ghost(GhostEvent::Spawned {
                ghost_id: 1,
                position: Vec3::ZERO,
            }),
            GameEvent::ScareFired { hit: true },
            GameEvent::ScareFired { hit: false },
            GameEvent::Ghost(GhostEvent::Scared {
                ghost_id: 1,
                position: Vec3::ZERO,
            }),
            GameEvent::Ghost(GhostEvent::Removed { ghost_id: 1 }),
            GameEvent::Round(RoundEvent::Ended(RoundReport {
                outcome: Outcome::Caught,
                elapsed_seconds: 3.0,
                kill_count: 1,
                triggered_count: 0,
            })),
        ];
        metrics.record_events(&events);

        assert_eq!(metrics.rounds_started.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.ghosts_spawned.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.scares_fired.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.scares_hit.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.ghosts_scared.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.ghosts_removed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.rounds_lost.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.rounds_won.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = SimMetrics::new();
        metrics.set_active_ghosts(5);
        let output = metrics.to_prometheus();
        assert!(output.contains("ghostyard_ghosts_active 5"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_json_format() {
        let metrics = SimMetrics::new();
        metrics.teleports.store(3, Ordering::Relaxed);
        let json = metrics.to_json();
        assert_eq!(json["actions"]["teleports"], 3);
        assert!(json["performance"].is_object());
    }
}
