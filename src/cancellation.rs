use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Observed state of a [`CancellationToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationState {
    Active,
    Cancelled,
}

/// One-way cooperative abort flag.
///
/// Clones share the same flag: the job keeps one and polls it at safe
/// checkpoints, the owner keeps another to request cancellation. Once
/// cancelled a token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> CancellationState {
        if self.cancelled.load(Ordering::Acquire) {
            CancellationState::Cancelled
        } else {
            CancellationState::Active
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.snapshot() == CancellationState::Cancelled
    }

    /// Requests cancellation. Returns `true` only for the call that moved the
    /// token from active to cancelled.
    pub fn cancel(&self) -> bool {
        self.cancelled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
