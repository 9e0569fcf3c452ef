//! Per-frame orchestration
//!
//! Frame order is fixed: clamp dt, move the player (stick, then teleport),
//! resolve the scare action, update the swarm against the finalized player
//! position, then tick the round timer. Events produced along the way are
//! queued until the caller drains them.

use crate::config::{GameConfig, ScareMode};
use crate::game::events::GameEvent;
use crate::game::input::{apply_deadzone, FrameInput, TriggerEdge};
use crate::game::round::{Outcome, RoundReport, RoundState};
use crate::game::state::Player;
use crate::game::systems::ghosts::GhostSwarm;
use crate::game::systems::locomotion::{self, LocomotionStep};
use crate::game::systems::teleport::{self, TeleportArc};
use crate::game::world::World;

/// Owns the simulation for a single player
pub struct GameLoop {
    config: GameConfig,
    world: Option<World>,
    player: Player,
    swarm: GhostSwarm,
    round: RoundState,
    /// Seconds until the scare action is available again
    scare_cooldown: f32,
    /// Preview arc while the teleport trigger is held
    aim: Option<TeleportArc>,
    /// Simulated seconds since construction
    clock: f32,
    events: Vec<GameEvent>,
    logged_unready: bool,
}

impl GameLoop {
    pub fn new(config: GameConfig) -> Self {
        let swarm = GhostSwarm::new(
            config.ghosts.clone(),
            config.spawn.clone(),
            config.world_radius,
            config.rng_seed,
        );
        Self {
            player: Player::new(&config.locomotion),
            round: RoundState::new(config.round_duration),
            swarm,
            world: None,
            scare_cooldown: 0.0,
            aim: None,
            clock: 0.0,
            events: Vec::new(),
            logged_unready: false,
            config,
        }
    }

    /// Complete the world-init handshake. Replaces any previous world.
    pub fn attach_world(&mut self, world: World) {
        self.player.position = locomotion::spawn_point(&world, &self.config.locomotion);
        tracing::info!(
            "World attached: {} colliders, {} triggers",
            world.colliders.len(),
            world.colliders.trigger_count()
        );
        self.world = Some(world);
    }

    pub fn is_ready(&self) -> bool {
        self.world.is_some()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn swarm(&self) -> &GhostSwarm {
        &self.swarm
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    /// Current teleport preview, if aiming
    pub fn aim(&self) -> Option<&TeleportArc> {
        self.aim.as_ref()
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Start (or restart) a round. Resets swarm, player, triggers and
    /// counters. Returns false when ignored.
    pub fn start_round(&mut self) -> bool {
        let Some(world) = self.world.as_mut() else {
            tracing::debug!("Round start ignored: world not attached");
            return false;
        };
        let Some(event) = self.round.start() else {
            return false;
        };

        self.swarm.reset();
        world.colliders.reset_triggers();
        self.player.position = locomotion::spawn_point(world, &self.config.locomotion);
        self.scare_cooldown = 0.0;
        self.aim = None;
        self.events.push(event.into());
        true
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the simulation by one frame
    pub fn frame(&mut self, dt: f32, input: &FrameInput) {
        if self.world.is_none() {
            if !self.logged_unready {
                tracing::debug!("Frame skipped: world not attached");
                self.logged_unready = true;
            }
            return;
        }

        let dt = if dt.is_finite() { dt.clamp(0.0, self.config.max_dt) } else { 0.0 };
        self.clock += dt;

        self.move_player(dt, input);
        self.handle_teleport(input);
        self.handle_scare(dt, input);
        self.update_swarm(dt);

        if let Some(event) = self.round.tick(dt) {
            self.events.push(event.into());
        }
    }

    fn move_player(&mut self, dt: f32, input: &FrameInput) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let stick = apply_deadzone(input.stick, self.config.locomotion.stick_deadzone);
        let step = locomotion::step(
            self.player.position,
            stick,
            input.heading_yaw,
            world,
            &self.config.locomotion,
            self.config.world_radius,
            dt,
        );
        self.apply_step(step);
    }

    /// Commit a locomotion result and report first-touch triggers
    fn apply_step(&mut self, step: LocomotionStep) {
        self.player.position = step.position;
        for tag in step.triggered {
            self.round.record_trigger();
            self.events.push(GameEvent::ColliderTriggered {
                tag,
                position: step.position,
            });
        }
    }

    fn handle_teleport(&mut self, input: &FrameInput) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let Some(pointer) = input.teleport else {
            self.aim = None;
            return;
        };

        let arc = teleport::solve(
            pointer.ray.origin,
            pointer.ray.direction,
            world.terrain.as_ref(),
            &self.config.teleport,
            self.config.world_radius,
            self.config.locomotion.player_radius,
        );

        match pointer.trigger {
            TriggerEdge::Pressed | TriggerEdge::Held => self.aim = Some(arc),
            TriggerEdge::Released => {
                self.aim = None;
                let Some(target) = arc.commit_target() else {
                    tracing::debug!("Teleport released on invalid target");
                    return;
                };
                let step =
                    locomotion::teleport_to(target, world, &self.config.locomotion, self.config.world_radius);
                let position = step.position;
                self.apply_step(step);
                self.events.push(GameEvent::Teleported { position });
            }
            TriggerEdge::Idle => self.aim = None,
        }
    }

    fn handle_scare(&mut self, dt: f32, input: &FrameInput) {
        self.scare_cooldown = (self.scare_cooldown - dt).max(0.0);

        let Some(pointer) = input.scare else {
            return;
        };
        if pointer.trigger != TriggerEdge::Pressed || !self.round.is_running() || self.scare_cooldown > 0.0 {
            return;
        }

        let scare = &self.config.scare;
        let outcome = match scare.mode {
            ScareMode::Cone => self.swarm.scare(pointer.ray.origin, pointer.ray.direction, scare.max_range, scare.min_cosine),
            ScareMode::Beam => {
                self.swarm
                    .scare_beam(pointer.ray.origin, pointer.ray.direction, scare.beam_length, scare.beam_radius)
            }
        };
        self.scare_cooldown = scare.cooldown;

        self.round.record_kills(outcome.scared.len());
        self.events.push(GameEvent::ScareFired { hit: outcome.hit });
        self.events.extend(outcome.events.into_iter().map(GameEvent::from));
    }

    fn update_swarm(&mut self, dt: f32) {
        let running = self.round.is_running();
        let update = self.swarm.update(self.player.position, self.clock, dt, running);
        self.events.extend(update.events.into_iter().map(GameEvent::from));

        if let Some(ghost_id) = update.contact {
            if let Some(event) = self.round.end(Outcome::Caught) {
                tracing::info!("Player caught by ghost {}", ghost_id);
                self.events.push(event.into());
            }
        }
    }

    /// Report of the last finished round
    pub fn last_report(&self) -> Option<RoundReport> {
        self.round.report()
    }
}
