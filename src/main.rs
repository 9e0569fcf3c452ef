use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use ghostyard::config::GameConfig;
use ghostyard::game::game_loop::GameLoop;
use ghostyard::game::input::{FrameInput, Pointer, Ray, Stick, TriggerEdge};
use ghostyard::game::round::RoundReport;
use ghostyard::game::world::{NoiseTerrain, ScatterLayout, World};
use ghostyard::metrics::SimMetrics;
use ghostyard::util::vec3::Vec3;

/// Seconds between autopilot teleports
const TELEPORT_PERIOD: f32 = 5.0;

/// Scripted stand-in for a headset and controllers.
///
/// Wanders in a slow circle, fires the scare at the nearest threatening
/// ghost and teleports forward every few seconds.
struct Autopilot {
    time: f32,
    last_teleport: f32,
    aiming: bool,
    scare_armed: bool,
}

impl Autopilot {
    fn new() -> Self {
        Self {
            time: 0.0,
            last_teleport: 0.0,
            aiming: false,
            scare_armed: true,
        }
    }

    fn input(&mut self, game: &GameLoop, dt: f32) -> FrameInput {
        self.time += dt;
        let eye = game.player().position;
        let heading_yaw = self.time * 0.3;

        let mut input = FrameInput {
            stick: Stick::new(0.2, -0.8),
            heading_yaw,
            ..FrameInput::default()
        };

        let config = game.swarm().config();
        let nearest = game
            .swarm()
            .ghosts()
            .iter()
            .filter(|g| g.is_threat(config))
            .min_by(|a, b| a.position.distance_to(eye).total_cmp(&b.position.distance_to(eye)));

        // Alternate press and release so each shot is a fresh edge
        if let Some(ghost) = nearest {
            if self.scare_armed {
                input.scare = Some(Pointer {
                    ray: Ray::new(eye, ghost.position - eye),
                    trigger: TriggerEdge::Pressed,
                });
            }
            self.scare_armed = !self.scare_armed;
        }

        let forward = Vec3::new(-heading_yaw.sin(), -0.4, -heading_yaw.cos());
        if self.aiming {
            self.aiming = false;
            self.last_teleport = self.time;
            input.teleport = Some(Pointer {
                ray: Ray::new(eye, forward),
                trigger: TriggerEdge::Released,
            });
        } else if self.time - self.last_teleport >= TELEPORT_PERIOD {
            self.aiming = true;
            input.teleport = Some(Pointer {
                ray: Ray::new(eye, forward),
                trigger: TriggerEdge::Pressed,
            });
        }

        input
    }
}

/// Drive frames until the round ends
async fn run_round(game: &mut GameLoop, metrics: &SimMetrics) -> Option<RoundReport> {
    let realtime = game.config().realtime;
    let frame_rate = game.config().frame_rate.max(1);
    let fixed_dt = 1.0 / frame_rate as f32;
    let mut interval = tokio::time::interval(Duration::from_secs_f32(fixed_dt));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut autopilot = Autopilot::new();
    let mut last = Instant::now();
    let mut last_whole_second = game.round().display_remaining().ceil();

    loop {
        let dt = if realtime {
            interval.tick().await;
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32();
            last = now;
            dt
        } else {
            tokio::task::yield_now().await;
            fixed_dt
        };

        let input = autopilot.input(game, dt);
        let started = Instant::now();
        game.frame(dt, &input);
        metrics.record_frame_time(started.elapsed());

        let events = game.drain_events();
        metrics.record_events(&events);
        metrics.set_active_ghosts(game.swarm().len());

        let whole_second = game.round().display_remaining().ceil();
        if whole_second < last_whole_second {
            last_whole_second = whole_second;
            debug!(
                "{:.0}s left, {} ghosts, {} scared",
                whole_second,
                game.swarm().len(),
                game.round().kill_count()
            );
        }

        if let Some(report) = game.last_report() {
            return Some(report);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Ghostyard v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = GameConfig::load_or_default();
    config.validate().context("invalid configuration")?;
    info!(
        "Configuration loaded: round={}s, max_ghosts={}, scare={:?}, seed={}, realtime={}",
        config.round_duration, config.spawn.max_active, config.scare.mode, config.rng_seed, config.realtime
    );

    let layout = ScatterLayout {
        seed: config.rng_seed,
        world_radius: config.world_radius,
        ..ScatterLayout::default()
    };
    let world = World::new(Box::new(NoiseTerrain::default()), &layout);

    let metrics = SimMetrics::new();
    let mut game = GameLoop::new(config);
    game.attach_world(world);
    game.start_round();

    // Shutdown signal handler
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    let report = tokio::select! {
        report = run_round(&mut game, &metrics) => report,
        _ = shutdown => {
            info!("Round interrupted");
            None
        }
    };

    match report {
        Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        None => info!("No round result"),
    }
    info!("Metrics: {}", metrics.to_json());
    debug!("Prometheus exposition:\n{}", metrics.to_prometheus());

    Ok(())
}
