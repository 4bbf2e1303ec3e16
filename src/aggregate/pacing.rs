//! Request pacing for remote sources

use std::time::Duration;
use tracing::debug;

/// Pause after this many remote calls
pub const DEFAULT_PACE_EVERY: usize = 25;

/// Length of each pause
pub const DEFAULT_PACE_PAUSE: Duration = Duration::from_secs(1);

/// Inserts a pause after every `every` calls
///
/// `every == 0` disables pacing.
#[derive(Debug, Clone)]
pub struct Pacer {
    every: usize,
    pause: Duration,
    calls: usize,
}

impl Pacer {
    /// Create a pacer
    pub fn new(every: usize, pause: Duration) -> Self {
        Self {
            every,
            pause,
            calls: 0,
        }
    }

    /// A pacer that never pauses
    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Calls recorded so far
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Record a finished call, pausing if a batch is complete
    ///
    /// Returns whether a pause was taken.
    pub async fn tick(&mut self) -> bool {
        self.calls += 1;
        if self.every == 0 || self.pause.is_zero() || self.calls % self.every != 0 {
            return false;
        }

        debug!(calls = self.calls, pause_ms = self.pause.as_millis() as u64, "pacing pause");
        tokio::time::sleep(self.pause).await;
        true
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(DEFAULT_PACE_EVERY, DEFAULT_PACE_PAUSE)
    }
}
