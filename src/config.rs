use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::constants::{frame, ghost, player, round, scare, spawn, teleport, world};

/// Configuration errors surfaced by [`GameConfig::validate`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be > 0 (got {value})")]
    NotPositive { name: &'static str, value: f32 },
    #[error("{name} range is inverted: min {min} > max {max}")]
    InvertedRange { name: &'static str, min: f32, max: f32 },
    #[error("{name} must be within [0, 1] (got {value})")]
    NotUnit { name: &'static str, value: f32 },
    #[error("player radius {player_radius} does not fit in world radius {world_radius}")]
    PlayerTooLarge { player_radius: f32, world_radius: f32 },
    #[error("max_active must be at least 1")]
    NoGhosts,
}

/// Where new ghosts are placed relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnAnchor {
    /// Ring around the world origin
    Origin,
    /// Ring around the player's current position
    Player,
}

impl FromStr for SpawnAnchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "origin" => Ok(Self::Origin),
            "player" => Ok(Self::Player),
            other => Err(format!("unknown spawn anchor '{}'", other)),
        }
    }
}

/// Shape of the scare hit test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScareMode {
    /// Cone around the aim direction (cosine threshold + range)
    Cone,
    /// Cylinder along the aim ray (beam length + radius)
    Beam,
}

impl FromStr for ScareMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cone" => Ok(Self::Cone),
            "beam" => Ok(Self::Beam),
            other => Err(format!("unknown scare mode '{}'", other)),
        }
    }
}

/// Player locomotion tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocomotionConfig {
    pub walk_speed: f32,
    pub strafe_speed: f32,
    pub player_radius: f32,
    pub eye_height: f32,
    pub stick_deadzone: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: player::WALK_SPEED,
            strafe_speed: player::STRAFE_SPEED,
            player_radius: player::RADIUS,
            eye_height: player::EYE_HEIGHT,
            stick_deadzone: player::STICK_DEADZONE,
        }
    }
}

/// Ghost entity tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhostConfig {
    pub speed: f32,
    pub speed_jitter: (f32, f32),
    pub fade_in_speed: f32,
    pub fade_out_speed: f32,
    /// Opacity at which an appearing ghost becomes a threat
    pub chase_threshold: f32,
    pub contact_distance: f32,
    pub hover_height: f32,
    pub hover_amplitude: f32,
    pub hover_frequency: f32,
}

impl Default for GhostConfig {
    fn default() -> Self {
        Self {
            speed: ghost::SPEED,
            speed_jitter: ghost::SPEED_JITTER,
            fade_in_speed: ghost::FADE_IN_SPEED,
            fade_out_speed: ghost::FADE_OUT_SPEED,
            chase_threshold: ghost::CHASE_THRESHOLD,
            contact_distance: ghost::CONTACT_DISTANCE,
            hover_height: ghost::HOVER_HEIGHT,
            hover_amplitude: ghost::HOVER_AMPLITUDE,
            hover_frequency: ghost::HOVER_FREQUENCY,
        }
    }
}

/// Swarm spawn policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnConfig {
    pub max_active: usize,
    pub interval: (f32, f32),
    pub min_distance: f32,
    pub max_distance: f32,
    pub anchor: SpawnAnchor,
    pub opening_burst: usize,
    pub opening_delay: f32,
    pub opening_stagger: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            max_active: spawn::MAX_ACTIVE,
            interval: spawn::INTERVAL,
            min_distance: spawn::MIN_DISTANCE,
            max_distance: spawn::MAX_DISTANCE,
            anchor: SpawnAnchor::Origin,
            opening_burst: spawn::OPENING_BURST,
            opening_delay: spawn::OPENING_DELAY,
            opening_stagger: spawn::OPENING_STAGGER,
        }
    }
}

/// Scare action tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScareConfig {
    pub mode: ScareMode,
    pub max_range: f32,
    pub min_cosine: f32,
    pub cooldown: f32,
    pub beam_length: f32,
    pub beam_radius: f32,
}

impl Default for ScareConfig {
    fn default() -> Self {
        Self {
            mode: ScareMode::Cone,
            max_range: scare::MAX_RANGE,
            min_cosine: scare::MIN_COSINE,
            cooldown: scare::COOLDOWN,
            beam_length: scare::BEAM_LENGTH,
            beam_radius: scare::BEAM_RADIUS,
        }
    }
}

/// Teleport arc tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeleportConfig {
    pub launch_speed: f32,
    pub gravity: f32,
    pub sub_step: f32,
    pub max_steps: usize,
    pub max_slope_deg: f32,
}

impl Default for TeleportConfig {
    fn default() -> Self {
        Self {
            launch_speed: teleport::LAUNCH_SPEED,
            gravity: teleport::GRAVITY,
            sub_step: teleport::SUB_STEP,
            max_steps: teleport::MAX_STEPS,
            max_slope_deg: teleport::MAX_SLOPE_DEG,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub world_radius: f32,
    pub round_duration: f32,
    /// Upper bound on a single simulated frame
    pub max_dt: f32,
    /// Frame rate of the headless driver
    pub frame_rate: u32,
    /// Pace the headless driver against the wall clock
    pub realtime: bool,
    /// Seed for ghost spawn placement and speed jitter
    pub rng_seed: u64,
    pub locomotion: LocomotionConfig,
    pub ghosts: GhostConfig,
    pub spawn: SpawnConfig,
    pub scare: ScareConfig,
    pub teleport: TeleportConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_radius: world::RADIUS,
            round_duration: round::DURATION,
            max_dt: frame::MAX_DT,
            frame_rate: frame::FRAME_RATE,
            realtime: true,
            rng_seed: 2025,
            locomotion: LocomotionConfig::default(),
            ghosts: GhostConfig::default(),
            spawn: SpawnConfig::default(),
            scare: ScareConfig::default(),
            teleport: TeleportConfig::default(),
        }
    }
}

/// Parse an env var, warning and returning None when it is set but malformed
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", key, raw);
            None
        }
    }
}

/// Accepts 1/0, true/false, yes/no and on/off in any case
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean env var, warning and returning None when it is set but malformed
fn env_flag(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    let flag = parse_flag(&raw);
    if flag.is_none() {
        tracing::warn!("Invalid {} '{}', using default", key, raw);
    }
    flag
}

impl GameConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Some(duration) = env_parse::<f32>("ROUND_DURATION") {
            if duration > 0.0 {
                config.round_duration = duration;
            } else {
                tracing::warn!("ROUND_DURATION must be > 0, using default");
            }
        }

        if let Some(max_ghosts) = env_parse::<usize>("MAX_GHOSTS") {
            if (1..=256).contains(&max_ghosts) {
                config.spawn.max_active = max_ghosts;
            } else {
                tracing::warn!("MAX_GHOSTS must be 1-256, using default");
            }
        }

        if let Some(speed) = env_parse::<f32>("GHOST_SPEED") {
            config.ghosts.speed = speed;
        }

        if let Some(threshold) = env_parse::<f32>("CHASE_THRESHOLD") {
            config.ghosts.chase_threshold = threshold;
        }

        if let Some(range) = env_parse::<f32>("SCARE_RANGE") {
            config.scare.max_range = range;
        }

        if let Some(cosine) = env_parse::<f32>("SCARE_COSINE") {
            config.scare.min_cosine = cosine;
        }

        if let Some(mode) = env_parse::<ScareMode>("SCARE_MODE") {
            config.scare.mode = mode;
        }

        if let Some(anchor) = env_parse::<SpawnAnchor>("SPAWN_ANCHOR") {
            config.spawn.anchor = anchor;
        }

        if let Some(seed) = env_parse::<u64>("RNG_SEED") {
            config.rng_seed = seed;
        }

        if let Some(rate) = env_parse::<u32>("FRAME_RATE") {
            if (1..=240).contains(&rate) {
                config.frame_rate = rate;
            } else {
                tracing::warn!("FRAME_RATE must be 1-240, using default");
            }
        }

        if let Some(realtime) = env_flag("REALTIME") {
            config.realtime = realtime;
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("world_radius", self.world_radius)?;
        positive("round_duration", self.round_duration)?;
        positive("max_dt", self.max_dt)?;
        positive("ghost speed", self.ghosts.speed)?;
        positive("fade_in_speed", self.ghosts.fade_in_speed)?;
        positive("fade_out_speed", self.ghosts.fade_out_speed)?;
        positive("contact_distance", self.ghosts.contact_distance)?;
        positive("scare max_range", self.scare.max_range)?;
        positive("teleport sub_step", self.teleport.sub_step)?;

        if self.locomotion.player_radius >= self.world_radius {
            return Err(ConfigError::PlayerTooLarge {
                player_radius: self.locomotion.player_radius,
                world_radius: self.world_radius,
            });
        }
        if self.spawn.max_active == 0 {
            return Err(ConfigError::NoGhosts);
        }

        ordered("spawn interval", self.spawn.interval)?;
        ordered("spawn distance", (self.spawn.min_distance, self.spawn.max_distance))?;
        ordered("ghost speed jitter", self.ghosts.speed_jitter)?;

        unit("chase_threshold", self.ghosts.chase_threshold)?;
        if !(-1.0..=1.0).contains(&self.scare.min_cosine) {
            return Err(ConfigError::NotUnit {
                name: "scare min_cosine",
                value: self.scare.min_cosine,
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn ordered(name: &'static str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { name, min, max })
    }
}

fn unit(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::NotUnit { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.round_duration, 60.0);
        assert_eq!(config.spawn.max_active, 8);
        assert_eq!(config.scare.mode, ScareMode::Cone);
        assert_eq!(config.spawn.anchor, SpawnAnchor::Origin);
        assert!(config.realtime);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag(" No "), Some(false));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("on"), Some(true));
        assert_eq!(parse_flag("sometimes"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_load_or_default() {
        let config = GameConfig::load_or_default();
        assert!(config.round_duration > 0.0);
    }

    #[test]
    fn test_validate_rejects_inverted_interval() {
        let mut config = GameConfig::default();
        config.spawn.interval = (4.0, 2.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange { name: "spawn interval", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_ghosts() {
        let mut config = GameConfig::default();
        config.spawn.max_active = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoGhosts));
    }

    #[test]
    fn test_validate_rejects_threshold_outside_unit() {
        let mut config = GameConfig::default();
        config.ghosts.chase_threshold = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::NotUnit { .. })));
    }

    #[test]
    fn test_validate_rejects_oversized_player() {
        let mut config = GameConfig::default();
        config.locomotion.player_radius = config.world_radius;
        assert!(matches!(config.validate(), Err(ConfigError::PlayerTooLarge { .. })));
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("Player".parse::<SpawnAnchor>(), Ok(SpawnAnchor::Player));
        assert_eq!("beam".parse::<ScareMode>(), Ok(ScareMode::Beam));
        assert!("sideways".parse::<ScareMode>().is_err());
    }
}
