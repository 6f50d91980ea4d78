use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{MontageError, MontageResult};

/// Cloneable cancellation flag shared between a job and whoever may abort it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Return `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Return [`MontageError::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> MontageResult<()> {
        if self.is_cancelled() {
            Err(MontageError::Cancelled)
        } else {
            Ok(())
        }
    }
}
