//! Events emitted by a simulation step for the presentation layer

use serde::{Deserialize, Serialize};

use super::entities::ChoiceOption;

/// Side effects of a step, in emission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Transient dialog text
    ShowMessage { text: String, duration_ms: u64 },

    /// Ask the player to pick a power-up
    ShowChoice {
        prompt: String,
        options: Vec<ChoiceOption>,
    },

    /// Session is over (terminal until reset)
    SessionEnded { victory: bool },

    /// Player was sent back to the spawn point
    PlayerReset,
}
