//! Read-only snapshots handed to the presentation layer

use serde::{Deserialize, Serialize};

use super::entities::{DashState, MotionState, Platform};
use super::power::PowerKind;
use super::session::SessionPhase;

/// Player pose and ability state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub width: f32,
    pub height: f32,
    pub facing: i8,
    pub motion: MotionState,
    pub jumps_remaining: u8,
    pub dash: DashState,
    pub dash_cooldown: f32,
}

/// Active power-up as shown on the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerSnapshot {
    pub kind: PowerKind,
    pub remaining_ms: u64,
}

/// Hazard pose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardSnapshot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub direction: i8,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub frame: u64,
    pub phase: SessionPhase,
    pub player: PlayerSnapshot,
    pub power: Option<PowerSnapshot>,
    pub hazards: Vec<HazardSnapshot>,
    pub platforms: Vec<Platform>,
    pub coins_taken: Vec<bool>,
    pub camera_x: f32,
    /// Whole seconds left on the session timer
    pub remaining_secs: u32,
    pub collected: u32,
    /// Fraction of the level covered, 0..=1
    pub progress: f32,
}
