//! Cooperative cancellation for background synthesis work.

use anyhow::{Result, anyhow};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Cloneable flag shared between the UI thread and synthesis workers. A new
/// playback request cancels the token of the one it replaces, so stale
/// workers stop at the next checkpoint instead of racing the fresh request.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn check_cancelled(&self, stage: &'static str) -> Result<()> {
        if self.is_cancelled() {
            return Err(anyhow!("operation cancelled at stage={stage}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_observe_cancellation() {
        let token = CancellationToken::new();
        let seen_by_worker = token.clone();
        assert!(seen_by_worker.check_cancelled("synthesis").is_ok());
        token.cancel();
        assert!(seen_by_worker.is_cancelled());
        assert!(seen_by_worker.check_cancelled("synthesis").is_err());
    }
}
