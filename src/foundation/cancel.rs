use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{MontageError, MontageResult};

/// Cooperative cancellation flag shared between a caller and a running composition.
///
/// Checked between scenes during extraction and after every encoded frame.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once [`cancel`](Self::cancel) has been called.
    pub fn check(&self) -> MontageResult<()> {
        if self.is_cancelled() {
            return Err(MontageError::Cancelled);
        }
        Ok(())
    }
}
