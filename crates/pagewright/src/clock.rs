//! Clocks and cooperative cancellation for blocking waits.
//!
//! Every sleep in the crate goes through a [`Clock`], so tests can swap in
//! a [`FakeClock`] whose `sleep` advances virtual time instantly.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Granularity of cancellation checks while sleeping on a real clock
const SLEEP_SLICE: Duration = Duration::from_millis(25);

/// Source of monotonic time and blocking sleep
pub trait Clock: Debug + Send + Sync {
    /// Time elapsed since the clock was created
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`
    fn sleep(&self, duration: Duration);

    /// Sleep unless `cancel` fires first.
    ///
    /// Returns `false` when the sleep was cut short by cancellation.
    fn sleep_cancellable(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }
        let deadline = self.now() + duration;
        loop {
            let now = self.now();
            if now >= deadline {
                return !cancel.is_cancelled();
            }
            self.sleep((deadline - now).min(SLEEP_SLICE));
            if cancel.is_cancelled() {
                return false;
            }
        }
    }
}

/// Wall clock backed by `std::time::Instant`
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock starting now
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual clock for deterministic tests.
///
/// Clones share the same time source, so a driver double and the session
/// under test observe the same "now".
#[derive(Debug, Clone, Default)]
pub struct FakeClock {
    current_ms: Arc<AtomicU64>,
    slept_ms: Arc<AtomicU64>,
}

impl FakeClock {
    /// Create a fake clock at t=0
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }

    /// Move time forward without counting it as a sleep
    pub fn advance(&self, duration: Duration) {
        self.current_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    /// Total virtual time spent inside `sleep`
    #[must_use]
    pub fn total_slept(&self) -> Duration {
        Duration::from_millis(self.slept_ms.load(Ordering::SeqCst))
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms())
    }

    fn sleep(&self, duration: Duration) {
        let ms = duration.as_millis() as u64;
        self.slept_ms.fetch_add(ms, Ordering::SeqCst);
        self.current_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

/// Cooperative cancellation flag shared between a session and its owner
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create an untriggered token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of in-progress sleeps
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Clear a previous cancellation
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod fake_clock_tests {
        use super::*;

        #[test]
        fn test_sleep_advances_time() {
            let clock = FakeClock::new();
            clock.sleep(Duration::from_millis(1500));
            assert_eq!(clock.now(), Duration::from_millis(1500));
            assert_eq!(clock.total_slept(), Duration::from_millis(1500));
        }

        #[test]
        fn test_advance_is_not_counted_as_sleep() {
            let clock = FakeClock::new();
            clock.advance(Duration::from_secs(3));
            assert_eq!(clock.now_ms(), 3000);
            assert_eq!(clock.total_slept(), Duration::ZERO);
        }

        #[test]
        fn test_clones_share_time() {
            let clock = FakeClock::new();
            let other = clock.clone();
            other.sleep(Duration::from_secs(2));
            assert_eq!(clock.now_ms(), 2000);
        }
    }

    mod cancellation_tests {
        use super::*;

        #[test]
        fn test_uncancelled_sleep_completes() {
            let clock = FakeClock::new();
            let token = CancellationToken::new();
            assert!(clock.sleep_cancellable(Duration::from_secs(1), &token));
            assert_eq!(clock.now_ms(), 1000);
        }

        #[test]
        fn test_cancelled_sleep_returns_false_without_sleeping() {
            let clock = FakeClock::new();
            let token = CancellationToken::new();
            token.cancel();
            assert!(!clock.sleep_cancellable(Duration::from_secs(1), &token));
            assert_eq!(clock.now_ms(), 0);
        }

        #[test]
        fn test_reset_clears_cancellation() {
            let token = CancellationToken::new();
            token.cancel();
            assert!(token.is_cancelled());
            token.reset();
            assert!(!token.is_cancelled());
        }

        #[test]
        fn test_system_clock_cancel_from_other_thread() {
            let clock = SystemClock::new();
            let token = CancellationToken::new();
            let remote = token.clone();
            let handle = std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(30));
                remote.cancel();
            });
            let completed = clock.sleep_cancellable(Duration::from_secs(5), &token);
            handle.join().unwrap();
            assert!(!completed);
            assert!(clock.now() < Duration::from_secs(5));
        }
    }
}
