//! Build-mode gated diagnostics.
//!
//! Verbose output (`log`, `debug`, `warn`, timers) is only emitted in a
//! [`BuildMode::Development`] build. `error` is always emitted. The mode is
//! fixed when a [`DiagnosticsLog`] is constructed.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::util::time;

const PREFIX: &str = "[PaintByNumbers]";
const LOG_TARGET: &str = "paint_by_numbers";

/// Environment variable that forces a development build mode.
pub const DEV_ENV_VAR: &str = "PAINT_BY_NUMBERS_DEV";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Development,
    Release,
}

impl BuildMode {
    /// Detects the build mode of the running process. Call once at start-up
    /// and inject the result.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn detect() -> Self {
        let forced = std::env::var(DEV_ENV_VAR)
            .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        if forced || cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Release
        }
    }

    /// Detects the build mode of the running page: served from the local
    /// machine means development.
    #[cfg(target_arch = "wasm32")]
    pub fn detect() -> Self {
        let hostname = web_sys::window()
            .and_then(|window| window.location().hostname().ok())
            .unwrap_or_default();
        Self::from_hostname(&hostname)
    }

    pub fn from_hostname(hostname: &str) -> Self {
        match hostname {
            "localhost" | "127.0.0.1" => Self::Development,
            _ => Self::Release,
        }
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    /// Default `env_logger` filter for this mode. Development lets this
    /// crate's debug lines through; `RUST_LOG` still overrides either.
    pub fn default_log_filter(self) -> String {
        match self {
            Self::Development => format!("info,{LOG_TARGET}=debug"),
            Self::Release => "info".to_owned(),
        }
    }
}

/// Where formatted diagnostic lines end up.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, level: log::Level, line: &str);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, level: log::Level, line: &str) {
        log::log!(target: LOG_TARGET, level, "{line}");
    }
}

pub struct DiagnosticsLog {
    mode: BuildMode,
    sink: Box<dyn DiagnosticSink>,
    /// Start times in milliseconds, keyed by label.
    timers: Mutex<HashMap<String, f64>>,
}

impl fmt::Debug for DiagnosticsLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticsLog")
            .field("mode", &self.mode)
            .field("timers", &format!("<{} running>", self.timers.lock().len()))
            .finish()
    }
}

impl DiagnosticsLog {
    pub fn new(mode: BuildMode) -> Self {
        Self::with_sink(mode, LogSink)
    }

    pub fn with_sink(mode: BuildMode, sink: impl DiagnosticSink + 'static) -> Self {
        Self {
            mode,
            sink: Box::new(sink),
            timers: Mutex::new(HashMap::new()),
        }
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn log(&self, message: impl fmt::Display) {
        self.gated(log::Level::Info, message);
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.gated(log::Level::Debug, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.gated(log::Level::Warn, message);
    }

    /// Always emitted, whatever the build mode.
    pub fn error(&self, message: impl fmt::Display) {
        self.sink
            .emit(log::Level::Error, &format!("{PREFIX} {message}"));
    }

    /// Like [`error`](Self::error), with the cause appended to the line.
    pub fn error_with_cause(&self, message: impl fmt::Display, cause: &dyn fmt::Display) {
        self.sink
            .emit(log::Level::Error, &format!("{PREFIX} {message}: {cause}"));
    }

    /// Starts a timer. Restarting a running label resets it.
    pub fn time(&self, label: &str) {
        if !self.mode.is_development() {
            return;
        }
        self.timers
            .lock()
            .insert(label.to_owned(), time::current_time_millis());
    }

    /// Stops a timer and reports the elapsed time.
    pub fn time_end(&self, label: &str) {
        if !self.mode.is_development() {
            return;
        }
        let started = self.timers.lock().remove(label);
        match started {
            Some(started) => {
                let elapsed = (time::current_time_millis() - started).max(0.0);
                self.gated(log::Level::Debug, format_args!("{label}: {elapsed:.3}ms"));
            }
            None => self.gated(
                log::Level::Warn,
                format_args!("Timer '{label}' does not exist"),
            ),
        }
    }

    fn gated(&self, level: log::Level, message: impl fmt::Display) {
        if self.mode.is_development() {
            self.sink.emit(level, &format!("{PREFIX} {message}"));
        }
    }
}

static GLOBAL: OnceLock<DiagnosticsLog> = OnceLock::new();

/// Installs the process-wide log. Only the first call (or the first
/// [`get`]) wins; returns `false` if a log was already in place.
pub fn install(log: DiagnosticsLog) -> bool {
    GLOBAL.set(log).is_ok()
}

/// The process-wide log. Before [`install`] this settles on a release-mode
/// log forwarding to the `log` facade.
pub fn get() -> &'static DiagnosticsLog {
    GLOBAL.get_or_init(|| DiagnosticsLog::new(BuildMode::Release))
}
