//! Cooperative cancellation tokens shared between threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::{ErrorInfo, StrataError};

/// Shared flag observed at cooperative checkpoints inside long running work.
///
/// Cloning the token shares the underlying flag. Once cancelled a token stays
/// cancelled; workers that must survive the next request receive a fresh
/// token instead of a reset.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token as cancelled.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true when the token has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Returns an error when the token has been cancelled.
    ///
    /// `stage` names the checkpoint for diagnostics.
    pub fn checkpoint(&self, stage: &str) -> Result<(), StrataError> {
        if self.is_cancelled() {
            return Err(StrataError::Cancelled(
                ErrorInfo::new("cancelled", "work was cancelled at a cooperative checkpoint")
                    .with_context("stage", stage),
            ));
        }
        Ok(())
    }
}
