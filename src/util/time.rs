use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Get the current time in seconds since the UNIX epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn current_time_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Get the current time in seconds since the page was loaded
#[cfg(target_arch = "wasm32")]
pub fn current_time_secs() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| perf.now() / 1000.0)
        .unwrap_or(0.0)
}

/// Get the current time in milliseconds (floating point)
pub fn current_time_millis() -> f64 {
    current_time_secs() * 1000.0
}

/// Monotonic time source for timer-driven state.
///
/// `now` is measured from an arbitrary origin fixed when the clock was built.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Process clock. Natively backed by [`std::time::Instant`]; on the web by
/// `performance.now()`. Neither follows wall-clock adjustments.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    #[cfg(not(target_arch = "wasm32"))]
    origin: std::time::Instant,
    #[cfg(target_arch = "wasm32")]
    origin_secs: f64,
}

impl SystemClock {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        Self {
            origin_secs: current_time_secs(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[cfg(not(target_arch = "wasm32"))]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    #[cfg(target_arch = "wasm32")]
    fn now(&self) -> Duration {
        Duration::from_secs_f64((current_time_secs() - self.origin_secs).max(0.0))
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// copy and hand the other to the component under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
