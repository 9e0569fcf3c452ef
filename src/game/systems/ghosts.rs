//! Ghost swarm system
//!
//! Owns every live ghost: spawning on a jittered countdown, fade in/out,
//! chasing the player on the ground plane, contact detection and the scare
//! action. The ghost list is only mutated through `GhostSwarm` methods and
//! removed ghosts are compacted at the end of each update.

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{GhostConfig, SpawnAnchor, SpawnConfig};
use crate::game::events::GhostEvent;
use crate::game::state::{Ghost, GhostId};
use crate::util::vec2::Vec2;
use crate::util::vec3::Vec3;

// ============================================================================
// Swarm Constants
// ============================================================================

/// Below this distance a ghost is treated as sitting on the scare origin
const SCARE_POINT_BLANK: f32 = 1e-4;

/// Ground distance under which a chasing ghost stops steering
const CHASE_ARRIVE_EPSILON: f32 = 1e-4;

/// Ring draws tried before falling back to the far side of the origin
const SPAWN_ATTEMPTS: usize = 8;

/// Result of a scare action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScareOutcome {
    /// At least one ghost was scared
    pub hit: bool,
    pub scared: Vec<GhostId>,
    pub events: Vec<GhostEvent>,
}

/// Result of one swarm update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwarmUpdate {
    pub events: Vec<GhostEvent>,
    /// First threatening ghost found within contact distance
    pub contact: Option<GhostId>,
}

/// Draw uniformly from an inclusive range without panicking on a
/// degenerate or inverted one
#[inline]
fn sample(rng: &mut StdRng, (min, max): (f32, f32)) -> f32 {
    min + rng.gen::<f32>() * (max - min)
}

/// Hover bob height at a simulated time for a phase offset
#[inline]
fn hover_y(config: &GhostConfig, sim_time: f32, phase: f32) -> f32 {
    config.hover_height + (sim_time * config.hover_frequency + phase).sin() * config.hover_amplitude
}

/// Ghost store and spawn scheduler
#[derive(Debug)]
pub struct GhostSwarm {
    ghosts: Vec<Ghost>,
    next_id: GhostId,
    /// Seconds until the next regular spawn attempt
    spawn_countdown: f32,
    /// Opening burst ghosts still to spawn this round
    opening_remaining: usize,
    opening_countdown: f32,
    rng: StdRng,
    ghost_config: GhostConfig,
    spawn_config: SpawnConfig,
    world_radius: f32,
}

impl GhostSwarm {
    pub fn new(ghost_config: GhostConfig, spawn_config: SpawnConfig, world_radius: f32, seed: u64) -> Self {
        let mut swarm = Self {
            ghosts: Vec::with_capacity(spawn_config.max_active),
            next_id: 1,
            spawn_countdown: 0.0,
            opening_remaining: 0,
            opening_countdown: 0.0,
            rng: StdRng::seed_from_u64(seed),
            ghost_config,
            spawn_config,
            world_radius,
        };
        swarm.reset();
        swarm
    }

    /// Drop all ghosts and re-arm the spawn schedule for a new round.
    ///
    /// Ids keep counting up so events from different rounds never collide.
    pub fn reset(&mut self) {
        self.clear();
        self.spawn_countdown = sample(&mut self.rng, self.spawn_config.interval);
        self.opening_remaining = self.spawn_config.opening_burst;
        self.opening_countdown = self.spawn_config.opening_delay;
    }

    /// Remove every ghost without touching the schedule
    pub fn clear(&mut self) {
        self.ghosts.clear();
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn get(&self, id: GhostId) -> Option<&Ghost> {
        self.ghosts.iter().find(|g| g.id == id)
    }

    pub fn len(&self) -> usize {
        self.ghosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty()
    }

    pub fn config(&self) -> &GhostConfig {
        &self.ghost_config
    }

    // ------------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------------

    /// Random offset on the spawn ring
    fn ring_offset(&mut self) -> Vec2 {
        let angle = self.rng.gen::<f32>() * TAU;
        let distance = sample(
            &mut self.rng,
            (self.spawn_config.min_distance, self.spawn_config.max_distance),
        );
        Vec2::from_angle(angle) * distance
    }

    /// Random ground point for a new ghost around the configured anchor.
    ///
    /// Origin-anchored points are redrawn while they land within
    /// `min_distance` of the player. If every draw does, the last ring
    /// distance is used on the far side of the origin from the player.
    fn spawn_point(&mut self, player: Vec2) -> Vec2 {
        if self.spawn_config.anchor == SpawnAnchor::Player {
            return player + self.ring_offset();
        }

        let min_sq = self.spawn_config.min_distance * self.spawn_config.min_distance;
        let mut offset = Vec2::ZERO;
        for _ in 0..SPAWN_ATTEMPTS {
            offset = self.ring_offset();
            let point = offset.clamp_length(self.world_radius);
            if point.distance_sq_to(player) >= min_sq {
                return point;
            }
        }

        let away = (-player).normalize_or(Vec2::X);
        (away * offset.length()).clamp_length(self.world_radius)
    }

    /// Spawn one ghost at a random point. Returns None at the cap.
    pub fn spawn(&mut self, player: Vec2, sim_time: f32) -> Option<GhostEvent> {
        if self.ghosts.len() >= self.spawn_config.max_active {
            return None;
        }
        let point = self.spawn_point(player);
        self.spawn_at(point, player, sim_time)
    }

    /// Spawn one ghost at a ground point, facing `facing`. Returns None at the cap.
    pub fn spawn_at(&mut self, point: Vec2, facing: Vec2, sim_time: f32) -> Option<GhostEvent> {
        if self.ghosts.len() >= self.spawn_config.max_active {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;

        let speed = self.ghost_config.speed * sample(&mut self.rng, self.ghost_config.speed_jitter);
        let hover_phase = self.rng.gen::<f32>() * TAU;
        let position = Vec3::from_ground(point, hover_y(&self.ghost_config, sim_time, hover_phase));

        let mut ghost = Ghost::new(id, position, speed, sim_time, hover_phase);
        ghost.yaw = (facing - point).yaw();
        self.ghosts.push(ghost);

        tracing::debug!("Ghost {} spawned at ({:.1}, {:.1}) speed {:.2}", id, point.x, point.z, speed);
        Some(GhostEvent::Spawned { ghost_id: id, position })
    }

    /// Run the opening burst and the regular countdown
    fn tick_spawns(&mut self, player: Vec2, sim_time: f32, dt: f32, events: &mut Vec<GhostEvent>) {
        if self.opening_remaining > 0 {
            self.opening_countdown -= dt;
            while self.opening_remaining > 0 && self.opening_countdown <= 0.0 {
                self.opening_remaining -= 1;
                self.opening_countdown += self.spawn_config.opening_stagger;
                events.extend(self.spawn(player, sim_time));
            }
        }

        self.spawn_countdown -= dt;
        if self.spawn_countdown <= 0.0 {
            events.extend(self.spawn(player, sim_time));
            self.spawn_countdown = sample(&mut self.rng, self.spawn_config.interval);
        }
    }

    // ------------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------------

    /// Advance the swarm by one frame.
    ///
    /// `player` is the finalized eye position for this frame and `sim_time`
    /// the simulated clock. New ghosts are only spawned while `spawning` is
    /// set (round running).
    pub fn update(&mut self, player: Vec3, sim_time: f32, dt: f32, spawning: bool) -> SwarmUpdate {
        let mut update = SwarmUpdate::default();

        if spawning {
            self.tick_spawns(player.ground(), sim_time, dt, &mut update.events);
        }

        let config = &self.ghost_config;
        let target = player.ground();
        for ghost in &mut self.ghosts {
            if ghost.advance_fade(config, dt) {
                tracing::debug!("Ghost {} faded out", ghost.id);
                update.events.push(GhostEvent::Removed { ghost_id: ghost.id });
                continue;
            }
            if ghost.is_removed() {
                continue;
            }

            if ghost.is_threat(config) {
                let (direction, distance) = (target - ghost.position.ground()).normalize_with_length();
                if distance > CHASE_ARRIVE_EPSILON {
                    let step = (ghost.speed * dt).min(distance);
                    let ground = ghost.position.ground() + direction * step;
                    ghost.position.x = ground.x;
                    ghost.position.z = ground.z;
                    ghost.yaw = direction.yaw();
                }
            }

            ghost.position.y = hover_y(config, sim_time, ghost.hover_phase);

            if update.contact.is_none()
                && ghost.is_threat(config)
                && ghost.position.distance_to(player) < config.contact_distance
            {
                update.contact = Some(ghost.id);
            }
        }

        self.compact_removed();
        update
    }

    /// Drop ghosts that finished fading out
    pub fn compact_removed(&mut self) {
        self.ghosts.retain(|g| !g.is_removed());
    }

    // ------------------------------------------------------------------------
    // Scare
    // ------------------------------------------------------------------------

    /// Flip every threatening ghost matching `hit_test` to fleeing
    fn scare_where(&mut self, hit_test: impl Fn(Vec3) -> bool) -> ScareOutcome {
        let mut outcome = ScareOutcome::default();
        let config = &self.ghost_config;
        for ghost in &mut self.ghosts {
            if !ghost.is_threat(config) || !hit_test(ghost.position) {
                continue;
            }
            if ghost.start_fleeing() {
                tracing::debug!("Ghost {} scared", ghost.id);
                outcome.scared.push(ghost.id);
                outcome.events.push(GhostEvent::Scared {
                    ghost_id: ghost.id,
                    position: ghost.position,
                });
            }
        }
        outcome.hit = !outcome.scared.is_empty();
        outcome
    }

    /// Cone scare: ghosts within `max_range` whose direction from `origin`
    /// has cosine above `min_cosine` with `aim`
    pub fn scare(&mut self, origin: Vec3, aim: Vec3, max_range: f32, min_cosine: f32) -> ScareOutcome {
        let Some(dir) = unit(aim) else {
            return ScareOutcome::default();
        };
        self.scare_where(|position| {
            let to = position - origin;
            let distance = to.length();
            if distance > max_range {
                return false;
            }
            distance < SCARE_POINT_BLANK || to.dot(dir) / distance > min_cosine
        })
    }

    /// Beam scare: ghosts whose projection on the aim ray lies in
    /// (0, `length`) and whose distance from the ray is below `radius`
    pub fn scare_beam(&mut self, origin: Vec3, aim: Vec3, length: f32, radius: f32) -> ScareOutcome {
        let Some(dir) = unit(aim) else {
            return ScareOutcome::default();
        };
        self.scare_where(|position| {
            let to = position - origin;
            let along = to.dot(dir);
            if along <= 0.0 || along >= length {
                return false;
            }
            (to - dir * along).length() < radius
        })
    }
}

/// Normalized aim, or None for a zero vector
fn unit(aim: Vec3) -> Option<Vec3> {
    let len = aim.length();
    (len > f32::EPSILON && len.is_finite()).then(|| aim * (1.0 / len))
}
