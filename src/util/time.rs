//! Time utilities for the frame driver

use std::time::{Duration, Instant};

/// Default frame rate when none is configured
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Frame period for a given rate
pub fn frame_duration(frame_rate: u32) -> Duration {
    Duration::from_micros(1_000_000 / frame_rate.max(1) as u64)
}

/// Clamp a raw frame delta to `max_delta`.
///
/// Stalls (tab suspension, debugger pauses) must not turn into a single huge
/// physics step. Non-finite input maps to zero so the caller skips motion.
pub fn clamp_delta(dt: f32, max_delta: f32) -> f32 {
    if dt.is_finite() {
        dt.min(max_delta)
    } else {
        0.0
    }
}

/// A simple timer for measuring wall-clock frame deltas
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Seconds since the last lap (or creation), restarting the timer
    pub fn lap(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.start).as_secs_f32();
        self.start = now;
        dt
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
