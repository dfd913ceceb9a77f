//! Nullable action executor — records invocations instead of performing them.

use guardian_governance::{Action, ActionExecutor, ActionFailure};
use std::sync::Mutex;

/// Records every action it is asked to invoke. Optionally fails.
#[derive(Default)]
pub struct NullExecutor {
    invocations: Mutex<Vec<Action>>,
    failure: Mutex<Option<String>>,
}

impl NullExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// An executor that reports every invocation as failed with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        let executor = Self::new();
        executor.fail_with(reason);
        executor
    }

    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(reason.into());
    }

    pub fn succeed(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Every action invoked so far, in order (including failed ones).
    pub fn invocations(&self) -> Vec<Action> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }
}

impl ActionExecutor for NullExecutor {
    fn invoke(&self, action: &Action) -> Result<(), ActionFailure> {
        self.invocations.lock().unwrap().push(action.clone());
        match self.failure.lock().unwrap().as_ref() {
            Some(reason) => Err(ActionFailure::new(reason.clone())),
            None => Ok(()),
        }
    }
}
