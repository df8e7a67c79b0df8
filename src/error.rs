//! Game error types

use uuid::Uuid;

use crate::game::PowerKind;

/// Errors surfaced by sessions and the driver
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Unknown power-up kind: {0}")]
    UnknownPower(String),

    #[error("Power-up {0:?} was not offered in the current choice")]
    PowerNotOffered(PowerKind),

    #[error("No power-up choice is pending")]
    NoChoicePending,

    #[error("Session {0} has ended")]
    SessionEnded(Uuid),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Session {0} is no longer running")]
    SessionClosed(Uuid),
}
