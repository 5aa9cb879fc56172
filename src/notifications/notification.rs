//! Core notification data structures.

use std::time::Duration;

use crate::id_generator;
use crate::notifications::lifecycle::Phase;

/// Delay between appending a notification and marking it visible, leaving
/// room for an entry transition.
pub const ENTRY_DELAY: Duration = Duration::from_millis(10);

/// Time between the start of the exit transition and removal.
pub const GRACE_WINDOW: Duration = Duration::from_millis(300);

/// Display time when the caller gives none.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);

/// Display time the `error` shorthands use unless overridden.
pub const ERROR_DURATION: Duration = Duration::from_millis(7000);

/// Unique identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(u64);

impl NotificationId {
    pub fn new() -> Self {
        Self(id_generator::generate_id())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl Severity {
    pub fn glyph(self) -> &'static str {
        match self {
            Severity::Success => "✓",
            Severity::Error => "✕",
            Severity::Warning => "⚠",
            Severity::Info => "ℹ",
        }
    }
}

/// Per-notification overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotificationOptions {
    /// Milliseconds before auto-removal; `<= 0` means sticky.
    pub duration_ms: Option<i64>,
    /// Whether a close affordance is offered. Defaults to `true`.
    pub dismissible: Option<bool>,
}

impl NotificationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn duration_ms(mut self, millis: i64) -> Self {
        self.duration_ms = Some(millis);
        self
    }

    /// Sets the duration only if the caller left it unset.
    #[must_use]
    pub fn or_duration(mut self, duration: Duration) -> Self {
        if self.duration_ms.is_none() {
            self.duration_ms = Some(i64::try_from(duration.as_millis()).unwrap_or(i64::MAX));
        }
        self
    }

    #[must_use]
    pub fn sticky(self) -> Self {
        self.duration_ms(0)
    }

    #[must_use]
    pub fn dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = Some(dismissible);
        self
    }

    /// Resolves the display time: `None` for a sticky notification.
    pub fn resolve_duration(&self) -> Option<Duration> {
        match self.duration_ms {
            None => Some(DEFAULT_DURATION),
            Some(millis) if millis <= 0 => None,
            Some(millis) => Some(Duration::from_millis(millis.unsigned_abs())),
        }
    }
}

/// A notification in the active set.
///
/// Duration and dismissibility are fixed when it is created.
#[derive(Debug, Clone)]
pub struct Notification {
    id: NotificationId,
    message: String,
    severity: Severity,
    dismissible: bool,
    duration: Option<Duration>,
    phase: Phase,
    shown_at: Duration,
}

impl Notification {
    pub(crate) fn new(
        message: String,
        severity: Severity,
        options: NotificationOptions,
        shown_at: Duration,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            message,
            severity,
            dismissible: options.dismissible.unwrap_or(true),
            duration: options.resolve_duration(),
            phase: Phase::Pending,
            shown_at,
        }
    }

    pub fn id(&self) -> NotificationId {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn glyph(&self) -> &'static str {
        self.severity.glyph()
    }

    pub fn is_dismissible(&self) -> bool {
        self.dismissible
    }

    /// `None` for a sticky notification.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn is_sticky(&self) -> bool {
        self.duration.is_none()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Clock reading when `show` was called.
    pub fn shown_at(&self) -> Duration {
        self.shown_at
    }
}
