//! Catwalk headless runner
//!
//! Runs a single platformer session under the frame driver and logs what
//! happens. With `AUTOPILOT` enabled a simple bot plays:
//! - holds right and jumps when a hazard is close ahead
//! - picks the first offered power-up
//! - stops once the session ends

use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catwalk::app::AppState;
use catwalk::config::Config;
use catwalk::driver::{FrameUpdate, SessionHandle};
use catwalk::game::{GameEvent, InputState, MotionState};
use catwalk::util::time::Timer;

/// Horizontal distance at which the autopilot jumps a hazard
const JUMP_LOOKAHEAD: f32 = 90.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting Catwalk");
    info!(
        frame_rate = config.frame_rate,
        session_secs = config.sim.session_duration_secs,
        autopilot = config.autopilot,
        "Configuration loaded"
    );

    let autopilot = config.autopilot;
    let state = AppState::new(config)?;
    let (handle, task) = state.start_session();
    let wall = Timer::new();

    tokio::select! {
        _ = play(handle.clone(), autopilot) => {}
        _ = shutdown_signal() => {
            info!("Received Ctrl+C, stopping session");
        }
    }

    if let Err(err) = handle.shutdown().await {
        warn!(error = %err, "Session already stopped");
    }
    let session = task.await?;
    state.sessions.prune_closed();

    info!(
        phase = ?session.phase(),
        collected = session.collected(),
        wall_secs = wall.elapsed_secs(),
        "Shutdown complete"
    );
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Follow frame updates until the session ends
async fn play(handle: SessionHandle, autopilot: bool) {
    let mut updates = handle.subscribe();
    let mut jump_held = false;

    loop {
        let update = match updates.recv().await {
            Ok(update) => update,
            Err(RecvError::Lagged(n)) => {
                warn!(lagged = n, "Frame receiver lagged");
                continue;
            }
            Err(RecvError::Closed) => return,
        };

        let mut ended = false;
        for event in &update.events {
            match event {
                GameEvent::ShowMessage { text, .. } => info!(%text, "Message"),
                GameEvent::ShowChoice { prompt, options } => {
                    info!(%prompt, options = options.len(), "Choice offered");
                    let pick = options.first().filter(|_| autopilot);
                    if let Some(first) = pick {
                        info!(label = %first.label, "Autopilot picks");
                        if handle.select_power(first.kind).await.is_err() {
                            return;
                        }
                    }
                }
                GameEvent::PlayerReset => info!(frame = update.snapshot.frame, "Player reset"),
                GameEvent::SessionEnded { victory } => {
                    info!(
                        victory,
                        collected = update.snapshot.collected,
                        remaining_secs = update.snapshot.remaining_secs,
                        "Session ended"
                    );
                    ended = true;
                }
            }
        }
        // Also covers an end frame lost to lag
        if ended || update.session_ended() {
            return;
        }

        if autopilot {
            let input = autopilot_input(&update, &mut jump_held);
            if handle.send_input(input).await.is_err() {
                return;
            }
        }
    }
}

/// Run right, tapping jump when a hazard is just ahead
fn autopilot_input(update: &FrameUpdate, jump_held: &mut bool) -> InputState {
    let player = &update.snapshot.player;
    let front = player.x + player.width;
    let hazard_ahead = update
        .snapshot
        .hazards
        .iter()
        .any(|h| h.x >= player.x && h.x - front <= JUMP_LOOKAHEAD);

    // Release between presses so the engine sees a fresh edge
    let jump = hazard_ahead && player.motion == MotionState::Grounded && !*jump_held;
    *jump_held = jump;

    InputState {
        right: true,
        jump,
        ..InputState::default()
    }
}

/// Ctrl+C handler
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
