//! Interfaces to the engine's external collaborators.
//!
//! The engine never decides who holds a role, what time it is, or how an
//! action reaches its target. It asks these traits.

use guardian_types::{Capability, Principal, Timestamp};
use thiserror::Error;

use crate::Action;

/// Supplies the current logical time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Answers capability questions about principals.
pub trait Authorization {
    fn has_capability(&self, principal: &Principal, capability: Capability) -> bool;

    /// Grant or revoke the Delegate capability. Called by the engine after
    /// every committed weight change (weight > 0 grants).
    fn set_delegate(&self, principal: &Principal, granted: bool);
}

/// Why an action could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ActionFailure(pub String);

impl ActionFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Performs the side effect of an executed proposal.
///
/// Supplied per call to `execute`. An implementation may call back into the
/// engine; mutating calls made that way are rejected as re-entrant.
pub trait ActionExecutor {
    fn invoke(&self, action: &Action) -> Result<(), ActionFailure>;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<T: Authorization + ?Sized> Authorization for &T {
    fn has_capability(&self, principal: &Principal, capability: Capability) -> bool {
        (**self).has_capability(principal, capability)
    }

    fn set_delegate(&self, principal: &Principal, granted: bool) {
        (**self).set_delegate(principal, granted)
    }
}
