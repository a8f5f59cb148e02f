//! Cancellation token for the batch scheduling loop.
//!
//! The token is checked between batch items, not mid-item, so a cancelled
//! run always finishes the item it is on and reports partial results.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag for stopping a long-running batch early.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that is never cancelled, for non-interactive runs
    /// and tests.
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
