//! Notification queue and timer driving.
//!
//! [`NotificationCenter`] owns the active notifications and the timers that
//! move them through [`transition`]. Time comes from an injected [`Clock`];
//! nothing happens until [`NotificationCenter::poll`] is called, which the
//! toast layer does once per frame.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::Duration;

use crate::diagnostics;
use crate::id_generator;
use crate::notifications::lifecycle::{LifecycleEvent, Phase, transition};
use crate::notifications::notification::{
    ENTRY_DELAY, ERROR_DURATION, GRACE_WINDOW, Notification, NotificationId, NotificationOptions, Severity,
};
use crate::util::time::Clock;

/// The display surface notifications are attached to. Created once per
/// center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationHost {
    id: u64,
}

impl NotificationHost {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug)]
enum Request {
    Show {
        message: String,
        severity: Severity,
        options: NotificationOptions,
    },
}

/// Cloneable fire-and-forget handle for raising notifications from code
/// that does not own the center. Requests are applied on the next
/// [`NotificationCenter::poll`].
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: Sender<Request>,
}

impl Notifier {
    pub fn show(&self, message: impl Into<String>, severity: Severity, options: NotificationOptions) {
        // The center being gone just means nobody is left to see it.
        let _ = self.sender.send(Request::Show {
            message: message.into(),
            severity,
            options,
        });
    }

    pub fn success(&self, message: impl Into<String>, options: NotificationOptions) {
        self.show(message, Severity::Success, options);
    }

    /// Shown for 7 seconds unless `options` says otherwise.
    pub fn error(&self, message: impl Into<String>, options: NotificationOptions) {
        self.show(message, Severity::Error, options.or_duration(ERROR_DURATION));
    }

    pub fn warning(&self, message: impl Into<String>, options: NotificationOptions) {
        self.show(message, Severity::Warning, options);
    }

    pub fn info(&self, message: impl Into<String>, options: NotificationOptions) {
        self.show(message, Severity::Info, options);
    }
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    due: Duration,
    seq: u64,
    id: NotificationId,
    event: LifecycleEvent,
}

pub struct NotificationCenter {
    clock: Box<dyn Clock>,
    host: Option<NotificationHost>,
    /// Active notifications in insertion order.
    active: Vec<Notification>,
    timers: Vec<Timer>,
    next_seq: u64,
    sender: Sender<Request>,
    receiver: Receiver<Request>,
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("host", &self.host)
            .field("active", &self.active)
            .field("timers", &self.timers.len())
            .finish()
    }
}

impl NotificationCenter {
    pub fn new(clock: impl Clock + 'static) -> Self {
        let (sender, receiver) = channel();
        Self {
            clock: Box::new(clock),
            host: None,
            active: Vec::new(),
            timers: Vec::new(),
            next_seq: 0,
            sender,
            receiver,
        }
    }

    pub fn notifier(&self) -> Notifier {
        Notifier {
            sender: self.sender.clone(),
        }
    }

    /// Creates the host surface on first call; later calls return the same
    /// one.
    pub fn init(&mut self) -> NotificationHost {
        *self.host.get_or_insert_with(|| {
            let host = NotificationHost {
                id: id_generator::generate_id(),
            };
            diagnostics::get().debug(format_args!("Notification host {} created", host.id));
            host
        })
    }

    pub fn host(&self) -> Option<NotificationHost> {
        self.host
    }

    pub fn show(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        options: NotificationOptions,
    ) -> NotificationId {
        self.init();

        let now = self.clock.now();
        let notification = Notification::new(message.into(), severity, options, now);
        let id = notification.id();

        self.schedule(now + ENTRY_DELAY, id, LifecycleEvent::EntryDelayElapsed);
        if let Some(duration) = notification.duration() {
            self.schedule(now + duration, id, LifecycleEvent::Expired);
        }
        self.active.push(notification);
        id
    }

    pub fn success(&mut self, message: impl Into<String>, options: NotificationOptions) -> NotificationId {
        self.show(message, Severity::Success, options)
    }

    /// Shown for 7 seconds unless `options` says otherwise.
    pub fn error(&mut self, message: impl Into<String>, options: NotificationOptions) -> NotificationId {
        self.show(message, Severity::Error, options.or_duration(ERROR_DURATION))
    }

    pub fn warning(&mut self, message: impl Into<String>, options: NotificationOptions) -> NotificationId {
        self.show(message, Severity::Warning, options)
    }

    pub fn info(&mut self, message: impl Into<String>, options: NotificationOptions) -> NotificationId {
        self.show(message, Severity::Info, options)
    }

    /// Starts removal of a dismissible notification right away. Returns
    /// `false` if it is unknown or not dismissible.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let Some(notification) = self.get(id) else {
            return false;
        };
        if !notification.is_dismissible() {
            return false;
        }
        let now = self.clock.now();
        self.fire(id, LifecycleEvent::DismissRequested, now);
        true
    }

    /// Applies queued [`Notifier`] requests, then fires every timer that is
    /// due, oldest first.
    pub fn poll(&mut self) {
        while let Ok(request) = self.receiver.try_recv() {
            match request {
                Request::Show {
                    message,
                    severity,
                    options,
                } => {
                    self.show(message, severity, options);
                }
            }
        }

        let now = self.clock.now();
        while let Some(index) = self.next_due(now) {
            let timer = self.timers.swap_remove(index);
            self.fire(timer.id, timer.event, timer.due);
        }
    }

    /// When the earliest pending timer fires, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|timer| timer.due).min()
    }

    /// Time left until [`next_deadline`](Self::next_deadline).
    pub fn time_until_next_deadline(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.next_deadline().map(|due| due.saturating_sub(now))
    }

    pub fn active(&self) -> impl Iterator<Item = &Notification> {
        self.active.iter()
    }

    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.active.iter().find(|n| n.id() == id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn schedule(&mut self, due: Duration, id: NotificationId, event: LifecycleEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer { due, seq, id, event });
    }

    fn next_due(&self, now: Duration) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(_, timer)| (timer.due, timer.seq))
            .map(|(index, _)| index)
    }

    /// Runs one lifecycle event for `id` as if it happened at `at`.
    fn fire(&mut self, id: NotificationId, event: LifecycleEvent, at: Duration) {
        let Some(index) = self.active.iter().position(|n| n.id() == id) else {
            return;
        };
        let old = self.active[index].phase();
        let new = transition(old, event);
        if new == old {
            return;
        }

        match new {
            Phase::Dismissing => {
                self.active[index].set_phase(new);
                // Drop the now pointless expiry or entry timers.
                self.timers.retain(|timer| timer.id != id);
                self.schedule(at + GRACE_WINDOW, id, LifecycleEvent::GraceElapsed);
            }
            Phase::Removed => {
                self.active.remove(index);
                self.timers.retain(|timer| timer.id != id);
            }
            Phase::Pending | Phase::Visible => self.active[index].set_phase(new),
        }
    }
}
