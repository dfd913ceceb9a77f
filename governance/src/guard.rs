//! Re-entrancy guard.
//!
//! A busy flag taken at the top of every mutating engine operation and
//! released when the returned token drops, on success and error paths alike.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::GovernanceError;

#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    busy: AtomicBool,
}

/// Holds the guard until dropped.
#[must_use = "the guard is released as soon as the token is dropped"]
#[derive(Debug)]
pub struct GuardToken<'a> {
    busy: &'a AtomicBool,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the flag, or fail with [`GovernanceError::Reentrant`] if a
    /// mutating operation is already running.
    pub fn enter(&self) -> Result<GuardToken<'_>, GovernanceError> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| GovernanceError::Reentrant)?;
        Ok(GuardToken { busy: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
