//! Transient on-screen notifications.

mod center;
mod lifecycle;
mod notification;
mod toast;

pub use center::{NotificationCenter, NotificationHost, Notifier};
pub use lifecycle::{LifecycleEvent, Phase, transition};
pub use notification::{
    DEFAULT_DURATION, ENTRY_DELAY, ERROR_DURATION, GRACE_WINDOW, Notification, NotificationId, NotificationOptions, Severity,
};
pub use toast::show_toasts;
