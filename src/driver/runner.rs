//! Frame driver: runs a session on a fixed-rate tick loop

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::GameError;
use crate::game::{GameEvent, GameSession, InputState, PowerKind, SessionPhase, SessionSnapshot};
use crate::util::time::{frame_duration, Timer};

/// Commands accepted by a running session
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Replace the current intent snapshot
    Input(InputState),
    /// Resolve the pending power-up choice
    SelectPower(PowerKind),
    /// Restart from the initial state
    Reset,
    /// Stop the driver
    Shutdown,
}

/// What the presentation receives after every frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameUpdate {
    pub snapshot: SessionSnapshot,
    pub events: Vec<GameEvent>,
}

impl FrameUpdate {
    /// The session had ended by this frame
    pub fn session_ended(&self) -> bool {
        matches!(self.snapshot.phase, SessionPhase::Ended { .. })
    }
}

/// Handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    command_tx: mpsc::Sender<SessionCommand>,
    update_tx: broadcast::Sender<FrameUpdate>,
}

impl SessionHandle {
    async fn send(&self, command: SessionCommand) -> Result<(), GameError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| GameError::SessionClosed(self.id))
    }

    pub async fn send_input(&self, input: InputState) -> Result<(), GameError> {
        self.send(SessionCommand::Input(input)).await
    }

    pub async fn select_power(&self, kind: PowerKind) -> Result<(), GameError> {
        self.send(SessionCommand::SelectPower(kind)).await
    }

    pub async fn reset(&self) -> Result<(), GameError> {
        self.send(SessionCommand::Reset).await
    }

    pub async fn shutdown(&self) -> Result<(), GameError> {
        self.send(SessionCommand::Shutdown).await
    }

    /// Receive every frame update from now on
    pub fn subscribe(&self) -> broadcast::Receiver<FrameUpdate> {
        self.update_tx.subscribe()
    }

    /// Driver has stopped
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }
}

/// Owns a session and steps it once per frame
pub struct SessionDriver {
    session: GameSession,
    input: InputState,
    frame_rate: u32,
    command_rx: mpsc::Receiver<SessionCommand>,
    update_tx: broadcast::Sender<FrameUpdate>,
}

impl SessionDriver {
    pub fn new(session: GameSession, frame_rate: u32) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(256);
        let (update_tx, _) = broadcast::channel(64);

        let handle = SessionHandle {
            id: session.id(),
            command_tx,
            update_tx: update_tx.clone(),
        };

        let driver = Self {
            session,
            input: InputState::default(),
            frame_rate,
            command_rx,
            update_tx,
        };

        (driver, handle)
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Run the frame loop until shutdown or until every handle is dropped.
    /// Returns the session in its final state.
    pub async fn run(mut self) -> GameSession {
        info!(session_id = %self.session.id(), frame_rate = self.frame_rate, "Session driver started");

        let mut ticker = interval(frame_duration(self.frame_rate));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frame_timer = Timer::new();

        loop {
            ticker.tick().await;

            let Some(mut events) = self.process_commands() else {
                break;
            };

            let dt = frame_timer.lap();
            let was_ended = self.session.is_ended();
            events.extend(self.session.step(dt, self.input));

            // A finished session only publishes when something happened
            if was_ended && events.is_empty() {
                continue;
            }

            let _ = self.update_tx.send(FrameUpdate {
                snapshot: self.session.snapshot(),
                events,
            });
        }

        info!(session_id = %self.session.id(), "Session driver stopped");
        self.session
    }

    /// Drain queued commands, returning the events they produced.
    /// `None` means the driver should stop.
    fn process_commands(&mut self) -> Option<Vec<GameEvent>> {
        let mut events = Vec::new();
        loop {
            match self.command_rx.try_recv() {
                Ok(SessionCommand::Input(input)) => self.input = input,
                Ok(SessionCommand::SelectPower(kind)) => match self.session.select_power(kind) {
                    Ok(applied) => events.extend(applied),
                    Err(err) => {
                        warn!(session_id = %self.session.id(), error = %err, "Power-up selection rejected")
                    }
                },
                Ok(SessionCommand::Reset) => {
                    self.session.reset();
                    self.input = InputState::default();
                    events.push(GameEvent::PlayerReset);
                }
                Ok(SessionCommand::Shutdown) => return None,
                Err(mpsc::error::TryRecvError::Empty) => return Some(events),
                Err(mpsc::error::TryRecvError::Disconnected) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::SimConfig;
    use crate::game::{ChoiceOption, Level, NarrativeTrigger};

    fn driver_with(level: Level) -> (SessionDriver, SessionHandle) {
        SessionDriver::new(GameSession::new(SimConfig::default(), level), 60)
    }

    #[tokio::test]
    async fn commands_apply_between_frames() {
        let mut level = Level::empty();
        level.triggers.push(NarrativeTrigger {
            x: 0.0,
            prompt: "Pick".to_string(),
            options: vec![ChoiceOption {
                label: "Fish".to_string(),
                kind: PowerKind::Fish,
            }],
            used: false,
        });
        let (mut driver, handle) = driver_with(level);

        let right = InputState {
            right: true,
            ..InputState::default()
        };
        tokio_test::assert_ok!(handle.send_input(right).await);
        let events = driver.process_commands().unwrap();
        assert!(events.is_empty());
        assert_eq!(driver.input, right);

        let events = driver.session.step(1.0 / 60.0, driver.input);
        assert!(matches!(events[0], GameEvent::ShowChoice { .. }));

        // Not offered: rejected without touching the power state
        tokio_test::assert_ok!(handle.select_power(PowerKind::Spring).await);
        assert!(driver.process_commands().unwrap().is_empty());
        assert!(driver.session().powers().active().is_none());

        tokio_test::assert_ok!(handle.select_power(PowerKind::Fish).await);
        let events = driver.process_commands().unwrap();
        assert_eq!(events.len(), 1);
        assert!(driver.session().powers().active().is_some());
    }

    #[tokio::test]
    async fn reset_and_shutdown_commands() {
        let (mut driver, handle) = driver_with(Level::empty());
        driver.session.step(1.0 / 60.0, InputState::default());
        assert_eq!(driver.session().phase(), SessionPhase::Running);

        tokio_test::assert_ok!(handle.reset().await);
        assert_eq!(driver.process_commands().unwrap(), vec![GameEvent::PlayerReset]);
        assert_eq!(driver.session().phase(), SessionPhase::Ready);

        tokio_test::assert_ok!(handle.shutdown().await);
        assert!(driver.process_commands().is_none());
    }

    #[tokio::test]
    async fn run_publishes_frames_until_shutdown() {
        let (driver, handle) = driver_with(Level::empty());
        let mut updates = handle.subscribe();
        let task = tokio::spawn(driver.run());

        let right = InputState {
            right: true,
            ..InputState::default()
        };
        tokio_test::assert_ok!(handle.send_input(right).await);

        let mut last_x = 0.0;
        for _ in 0..5 {
            let update = tokio::time::timeout(Duration::from_secs(2), updates.recv())
                .await
                .expect("frame within timeout")
                .expect("channel open");
            last_x = update.snapshot.player.x;
        }

        tokio_test::assert_ok!(handle.shutdown().await);
        let session = task.await.unwrap();
        assert!(last_x >= 80.0);
        assert_eq!(session.id(), handle.id);
        assert!(handle.is_closed());
    }

    #[test]
    fn update_reports_ended_phase_without_event() {
        let config = SimConfig {
            session_duration_secs: 0.05,
            ..SimConfig::default()
        };
        let (mut driver, _handle) = SessionDriver::new(GameSession::new(config, Level::empty()), 60);

        let frame = |driver: &SessionDriver| FrameUpdate {
            snapshot: driver.session().snapshot(),
            events: Vec::new(),
        };
        driver.session.step(1.0 / 60.0, InputState::default());
        assert!(!frame(&driver).session_ended());

        for _ in 0..10 {
            driver.session.step(1.0 / 60.0, InputState::default());
        }
        assert!(frame(&driver).session_ended());
    }

    #[tokio::test]
    async fn dropping_all_handles_stops_driver() {
        let (driver, handle) = driver_with(Level::empty());
        let id = handle.id;
        drop(handle);

        let session = tokio::time::timeout(Duration::from_secs(2), driver.run())
            .await
            .expect("driver stops once handles are gone");
        assert_eq!(session.id(), id);
    }
}
