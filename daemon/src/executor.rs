//! Action executor used by the CLI.
//!
//! Targets are opaque to this system, so the CLI records the invocation in
//! the log for the operator (or a log-following relay) to carry out.

use guardian_governance::{Action, ActionExecutor, ActionFailure};

#[derive(Debug, Default)]
pub struct TracingExecutor;

impl ActionExecutor for TracingExecutor {
    fn invoke(&self, action: &Action) -> Result<(), ActionFailure> {
        tracing::info!(
            target_principal = %action.target,
            value = %action.value,
            payload = %hex::encode(&action.payload),
            plain_transfer = action.is_plain_transfer(),
            "action invoked"
        );
        Ok(())
    }
}
