//! Deterministic clock and sleeper for tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use paylock_core::Timestamp;

use crate::traits::{Clock, Sleeper};

/// Manually driven clock.
///
/// Clones share the same time, so a test can advance the clock that a source
/// or sleeper holds.
///
/// # Examples
///
/// ```
/// use paylock_hardware::mock::MockClock;
/// use paylock_hardware::traits::Clock;
/// use std::time::Duration;
///
/// let clock = MockClock::new();
/// clock.advance(Duration::from_millis(60));
/// assert_eq!(clock.now().as_millis(), 60);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    millis: Arc<AtomicU64>,
}

impl MockClock {
    /// Create a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: Duration) {
        let millis = u64::try_from(delta.as_millis()).unwrap_or(u64::MAX);
        self.millis.fetch_add(millis, Ordering::AcqRel);
    }

    /// Set the clock to an absolute time.
    pub fn set(&self, now: Timestamp) {
        self.millis.store(now.as_millis(), Ordering::Release);
    }
}

impl Clock for MockClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::Acquire))
    }
}

type SleepHook = Arc<dyn Fn(usize) + Send + Sync>;

/// Sleeper that returns immediately and records every requested delay.
///
/// Optionally advances a [`MockClock`] by each delay and runs a hook with the
/// zero-based index of the sleep, letting a test inject hardware events while
/// the control task is "asleep".
///
/// # Examples
///
/// ```
/// use paylock_hardware::mock::RecordingSleeper;
/// use paylock_hardware::traits::Sleeper;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let sleeper = RecordingSleeper::new();
/// sleeper.sleep(Duration::from_millis(100)).await;
/// sleeper.sleep(Duration::from_millis(2000)).await;
///
/// assert_eq!(sleeper.sleeps().len(), 2);
/// assert_eq!(sleeper.total_slept(), Duration::from_millis(2100));
/// # }
/// ```
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
    clock: Option<MockClock>,
    hook: Option<SleepHook>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance `clock` by every recorded delay.
    pub fn with_clock(mut self, clock: MockClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Run `hook` on every sleep, after the clock has advanced.
    pub fn with_hook(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Every requested delay, oldest first.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .map(|sleeps| sleeps.clone())
            .unwrap_or_default()
    }

    /// Sum of all requested delays.
    pub fn total_slept(&self) -> Duration {
        self.sleeps().into_iter().sum()
    }
}

impl std::fmt::Debug for RecordingSleeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSleeper")
            .field("sleeps", &self.sleeps())
            .field("clock", &self.clock)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        let index = match self.sleeps.lock() {
            Ok(mut sleeps) => {
                sleeps.push(duration);
                sleeps.len() - 1
            }
            Err(_) => return,
        };

        if let Some(clock) = &self.clock {
            clock.advance(duration);
        }
        if let Some(hook) = &self.hook {
            hook(index);
        }
    }
}
