//! Catwalk - simulation and collision engine for a 2D side-scrolling platformer
//!
//! The engine advances a [`game::GameSession`] one frame at a time from boolean
//! input intents and returns the side effects of each frame as
//! [`game::GameEvent`]s. Rendering, audio and raw input capture live outside
//! this crate; they consume [`game::SessionSnapshot`]s and report power-up
//! choices back through [`game::GameSession::select_power`].

pub mod app;
pub mod config;
pub mod driver;
pub mod error;
pub mod game;
pub mod util;

pub use error::GameError;
