//! Registry of running sessions

use dashmap::DashMap;
use uuid::Uuid;

use crate::error::GameError;

use super::SessionHandle;

/// Registry of all active sessions
pub struct SessionRegistry {
    sessions: DashMap<Uuid, SessionHandle>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn get(&self, id: &Uuid) -> Result<SessionHandle, GameError> {
        self.sessions
            .get(id)
            .map(|s| s.value().clone())
            .ok_or(GameError::SessionNotFound(*id))
    }

    pub fn insert(&self, handle: SessionHandle) {
        self.sessions.insert(handle.id, handle);
    }

    pub fn remove(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.remove(id).map(|(_, h)| h)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Drop handles whose driver has stopped, returning how many were removed
    pub fn prune_closed(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, handle| !handle.is_closed());
        before - self.sessions.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::driver::SessionDriver;
    use crate::game::{GameSession, Level};

    fn spawn_handle() -> (SessionDriver, SessionHandle) {
        SessionDriver::new(GameSession::new(SimConfig::default(), Level::empty()), 60)
    }

    #[test]
    fn insert_get_remove() {
        let registry = SessionRegistry::new();
        let (_driver, handle) = spawn_handle();
        let id = handle.id;

        registry.insert(handle);
        assert_eq!(registry.active_sessions(), 1);
        assert_eq!(registry.get(&id).unwrap().id, id);

        assert!(registry.remove(&id).is_some());
        assert!(matches!(registry.get(&id), Err(GameError::SessionNotFound(missing)) if missing == id));
    }

    #[test]
    fn prune_drops_stopped_sessions() {
        let registry = SessionRegistry::default();
        let (live_driver, live) = spawn_handle();
        let (stopped_driver, stopped) = spawn_handle();
        registry.insert(live);
        registry.insert(stopped);

        drop(stopped_driver);
        assert_eq!(registry.prune_closed(), 1);
        assert_eq!(registry.active_sessions(), 1);
        drop(live_driver);
    }
}
