//! Game simulation modules

pub mod entities;
pub mod events;
pub mod level;
pub mod physics;
pub mod power;
pub mod session;
pub mod snapshot;

pub use entities::{ChoiceOption, Coin, Hazard, MotionState, NarrativeTrigger, Platform, Player};
pub use events::GameEvent;
pub use level::Level;
pub use power::{PowerKind, TimedEffect};
pub use session::{GameSession, SessionPhase};
pub use snapshot::SessionSnapshot;

use serde::{Deserialize, Serialize};

/// Intent snapshot for a single frame, derived from raw input by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    /// Jump key currently down; the engine detects the press edge
    pub jump: bool,
    pub dash: bool,
}

impl InputState {
    /// -1, 0 or 1 with left taking precedence
    pub fn horizontal(&self) -> f32 {
        if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        }
    }
}
