use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::cli::error::LegacyError;

/// Caller-owned cancellation signal shared by every blocking call of a run.
///
/// Clones observe the same flag; cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(LegacyError::Cancelled)` once the signal fired.
    pub fn check(&self) -> Result<(), LegacyError> {
        if self.is_cancelled() {
            Err(LegacyError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_flag() {
        let token = Cancellation::new();
        let clone = token.clone();
        assert!(clone.check().is_ok());

        token.cancel();
        assert!(clone.is_cancelled());
        assert!(matches!(clone.check(), Err(LegacyError::Cancelled)));
    }
}
