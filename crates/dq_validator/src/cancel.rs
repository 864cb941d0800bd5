//! Cooperative cancellation of blocking work.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Rows processed between two cancellation checks.
pub const CANCEL_CHECK_INTERVAL: usize = 4096;

/// Shared flag telling blocking loaders and validators to stop early.
///
/// Clones share the same flag. Once cancelled, a handle stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Creates a handle that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Checks if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Checks the flag every [`CANCEL_CHECK_INTERVAL`] items.
    pub(crate) fn is_cancelled_at(&self, processed: usize) -> bool {
        processed % CANCEL_CHECK_INTERVAL == 0 && self.is_cancelled()
    }
}
