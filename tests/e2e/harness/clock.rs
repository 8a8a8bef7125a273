use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Wednesday 2024-06-05 12:00 UTC.
pub const DEFAULT_START: i64 = 1_717_588_800;

/// Controllable time for week rollover testing.
///
/// This clock can be passed to `Planner` via `with_time_provider()` so the
/// current week is fixed for the whole scenario.
#[derive(Clone)]
pub struct MockClock {
    current: Arc<AtomicI64>,
}

impl MockClock {
    /// Creates a time provider function suitable for passing to `Planner`.
    pub fn as_provider(&self) -> impl Fn() -> i64 + Send + Sync + 'static {
        let current = self.current.clone();
        move || current.load(Ordering::SeqCst)
    }
}

impl MockClock {
    /// Create a new mock clock at [`DEFAULT_START`]
    pub fn new() -> Self {
        Self::at(DEFAULT_START)
    }

    /// Create a new mock clock at a fixed timestamp
    pub fn at(timestamp: i64) -> Self {
        Self {
            current: Arc::new(AtomicI64::new(timestamp)),
        }
    }

    /// Get current timestamp
    pub fn now(&self) -> i64 {
        self.current.load(Ordering::SeqCst)
    }

    /// Advance time by duration
    pub fn advance(&self, duration: Duration) {
        let seconds = duration.as_secs() as i64;
        self.current.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Advance time by days
    pub fn advance_days(&self, days: u64) {
        self.advance(Duration::from_secs(days * 86400));
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}
