//! Configuration module - environment variable parsing and simulation tuning

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::util::time::DEFAULT_FRAME_RATE;

/// Runtime configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Frames per second the driver ticks at
    pub frame_rate: u32,
    /// Optional JSON level layout, falls back to the built-in level
    pub level_path: Option<PathBuf>,
    /// Drive the headless session with the built-in autopilot
    pub autopilot: bool,
    /// Simulation tuning
    pub sim: SimConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let frame_rate: u32 = parse_var("FRAME_RATE", DEFAULT_FRAME_RATE)?;
        if frame_rate == 0 {
            return Err(ConfigError::Invalid("FRAME_RATE"));
        }

        Ok(Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            frame_rate,
            level_path: env::var("LEVEL_PATH").ok().map(PathBuf::from),
            autopilot: parse_var("AUTOPILOT", true)?,
            sim: SimConfig::from_env()?,
        })
    }
}

/// Simulation tuning constants.
///
/// Lengths are in world pixels, speeds in pixels per second, times in seconds
/// unless the field name says otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// How long a timed power-up lasts
    pub power_duration_ms: u64,
    /// Total session length
    pub session_duration_secs: f64,
    pub gravity: f32,
    /// Gravity multiplier while the balloon is active
    pub balloon_gravity_scale: f32,
    pub base_move_speed: f32,
    pub base_jump_impulse: f32,
    pub spring_jump_multiplier: f32,
    pub fish_speed_multiplier: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    /// Upward velocity given at the start of a dash
    pub dash_lift: f32,
    /// Dash is only available while the dash power-up is active
    pub dash_requires_power: bool,
    pub world_width: f32,
    pub world_height: f32,
    /// Y coordinate of the ground line (player bottom rests here)
    pub ground_y: f32,
    pub viewport_width: f32,
    /// Fraction of the viewport left of the player when the camera follows
    pub camera_lead: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub spawn_x: f32,
    /// Coins needed before the end zone counts as victory
    pub min_coins_to_win: u32,
    /// Depth of the band below a platform top that still catches the player
    pub platform_tolerance: f32,
    pub end_zone_tolerance: f32,
    pub trigger_tolerance: f32,
    pub coin_size: f32,
    /// Upper bound for a single frame delta
    pub max_frame_delta: f32,
    /// Display time attached to `ShowMessage` events
    pub message_duration_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            power_duration_ms: 5000,
            session_duration_secs: 120.0,
            gravity: 1600.0,
            balloon_gravity_scale: 0.45,
            base_move_speed: 220.0,
            base_jump_impulse: 560.0,
            spring_jump_multiplier: 1.8,
            fish_speed_multiplier: 1.5,
            dash_speed: 900.0,
            dash_duration: 0.16,
            dash_cooldown: 0.8,
            dash_lift: 40.0,
            dash_requires_power: false,
            world_width: 2400.0,
            world_height: 540.0,
            ground_y: 440.0,
            viewport_width: 960.0,
            camera_lead: 0.4,
            player_width: 64.0,
            player_height: 48.0,
            spawn_x: 80.0,
            min_coins_to_win: 0,
            platform_tolerance: 20.0,
            end_zone_tolerance: 10.0,
            trigger_tolerance: 10.0,
            coin_size: 24.0,
            max_frame_delta: 1.0 / 30.0,
            message_duration_ms: 3000,
        }
    }
}

impl SimConfig {
    /// Defaults overridden by any `SIM_*` variables that are set
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        Ok(Self {
            power_duration_ms: parse_var("SIM_POWER_DURATION_MS", d.power_duration_ms)?,
            session_duration_secs: parse_var("SIM_SESSION_DURATION_SECS", d.session_duration_secs)?,
            gravity: parse_var("SIM_GRAVITY", d.gravity)?,
            balloon_gravity_scale: parse_var("SIM_BALLOON_GRAVITY_SCALE", d.balloon_gravity_scale)?,
            base_move_speed: parse_var("SIM_BASE_MOVE_SPEED", d.base_move_speed)?,
            base_jump_impulse: parse_var("SIM_BASE_JUMP_IMPULSE", d.base_jump_impulse)?,
            spring_jump_multiplier: parse_var("SIM_SPRING_JUMP_MULTIPLIER", d.spring_jump_multiplier)?,
            fish_speed_multiplier: parse_var("SIM_FISH_SPEED_MULTIPLIER", d.fish_speed_multiplier)?,
            dash_speed: parse_var("SIM_DASH_SPEED", d.dash_speed)?,
            dash_duration: parse_var("SIM_DASH_DURATION", d.dash_duration)?,
            dash_cooldown: parse_var("SIM_DASH_COOLDOWN", d.dash_cooldown)?,
            dash_lift: parse_var("SIM_DASH_LIFT", d.dash_lift)?,
            dash_requires_power: parse_var("SIM_DASH_REQUIRES_POWER", d.dash_requires_power)?,
            world_width: parse_var("SIM_WORLD_WIDTH", d.world_width)?,
            world_height: parse_var("SIM_WORLD_HEIGHT", d.world_height)?,
            ground_y: parse_var("SIM_GROUND_Y", d.ground_y)?,
            viewport_width: parse_var("SIM_VIEWPORT_WIDTH", d.viewport_width)?,
            camera_lead: parse_var("SIM_CAMERA_LEAD", d.camera_lead)?,
            player_width: parse_var("SIM_PLAYER_WIDTH", d.player_width)?,
            player_height: parse_var("SIM_PLAYER_HEIGHT", d.player_height)?,
            spawn_x: parse_var("SIM_SPAWN_X", d.spawn_x)?,
            min_coins_to_win: parse_var("SIM_MIN_COINS_TO_WIN", d.min_coins_to_win)?,
            platform_tolerance: parse_var("SIM_PLATFORM_TOLERANCE", d.platform_tolerance)?,
            end_zone_tolerance: parse_var("SIM_END_ZONE_TOLERANCE", d.end_zone_tolerance)?,
            trigger_tolerance: parse_var("SIM_TRIGGER_TOLERANCE", d.trigger_tolerance)?,
            coin_size: parse_var("SIM_COIN_SIZE", d.coin_size)?,
            max_frame_delta: parse_var("SIM_MAX_FRAME_DELTA", d.max_frame_delta)?,
            message_duration_ms: parse_var("SIM_MESSAGE_DURATION_MS", d.message_duration_ms)?,
        })
    }

    /// Power-up lifetime in session-clock seconds
    pub fn power_duration_secs(&self) -> f64 {
        self.power_duration_ms as f64 / 1000.0
    }

    /// Player y when resting on the ground line
    pub fn spawn_y(&self) -> f32 {
        self.ground_y - self.player_height
    }
}

/// Read `name` from the environment, using `default` when it is unset
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Failed to read level file {}", .path.display())]
    LevelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid level layout: {0}")]
    Level(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tuning() {
        let sim = SimConfig::default();
        assert_eq!(sim.power_duration_ms, 5000);
        assert_eq!(sim.power_duration_secs(), 5.0);
        assert_eq!(sim.spawn_y(), 392.0);
        assert!(!sim.dash_requires_power);
    }

    #[test]
    fn env_override_and_invalid_value() {
        // Only this test touches these variables
        env::set_var("SIM_DASH_SPEED", "1200");
        env::set_var("SIM_MIN_COINS_TO_WIN", "three");

        assert_eq!(parse_var("SIM_DASH_SPEED", 900.0f32).unwrap(), 1200.0);
        assert!(matches!(
            parse_var("SIM_MIN_COINS_TO_WIN", 0u32),
            Err(ConfigError::Invalid("SIM_MIN_COINS_TO_WIN"))
        ));
        assert_eq!(parse_var("SIM_UNSET_FOR_TEST", 7u32).unwrap(), 7);

        env::remove_var("SIM_DASH_SPEED");
        env::remove_var("SIM_MIN_COINS_TO_WIN");
    }
}
