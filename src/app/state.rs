//! Application state shared by the runner

use std::sync::Arc;

use tracing::info;

use crate::config::{Config, ConfigError};
use crate::driver::{SessionDriver, SessionHandle, SessionRegistry};
use crate::game::{GameSession, Level};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub level: Arc<Level>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Build state from config, loading the configured level if any
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let level = match &config.level_path {
            Some(path) => Level::load(path)?,
            None => Level::builtin(),
        };

        Ok(Self {
            config: Arc::new(config),
            level: Arc::new(level),
            sessions: Arc::new(SessionRegistry::new()),
        })
    }

    /// Create a session, start its driver on the runtime and register it
    pub fn start_session(&self) -> (SessionHandle, tokio::task::JoinHandle<GameSession>) {
        let session = GameSession::new(self.config.sim.clone(), (*self.level).clone());
        let (driver, handle) = SessionDriver::new(session, self.config.frame_rate);

        let task = tokio::spawn(driver.run());
        self.sessions.insert(handle.clone());
        info!(session_id = %handle.id, active = self.sessions.active_sessions(), "Session registered");

        (handle, task)
    }
}
