//! Nullable authorization — an in-memory capability table.

use guardian_governance::Authorization;
use guardian_types::{Capability, Principal};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Capability table controlled by the test.
///
/// The engine keeps the Delegate capability in step with delegate weights
/// through [`Authorization::set_delegate`]; tests grant everything else.
#[derive(Default)]
pub struct NullAuthorization {
    grants: Mutex<HashMap<Principal, HashSet<Capability>>>,
}

impl NullAuthorization {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table where every principal in `guardians` holds Guardian.
    pub fn with_guardians<'a>(guardians: impl IntoIterator<Item = &'a Principal>) -> Self {
        let auth = Self::new();
        for g in guardians {
            auth.grant(g, Capability::Guardian);
        }
        auth
    }

    pub fn grant(&self, principal: &Principal, capability: Capability) {
        self.grants
            .lock()
            .unwrap()
            .entry(principal.clone())
            .or_default()
            .insert(capability);
    }

    pub fn revoke(&self, principal: &Principal, capability: Capability) {
        if let Some(caps) = self.grants.lock().unwrap().get_mut(principal) {
            caps.remove(&capability);
        }
    }

    /// Number of principals currently holding `capability`.
    pub fn holders(&self, capability: Capability) -> usize {
        self.grants
            .lock()
            .unwrap()
            .values()
            .filter(|caps| caps.contains(&capability))
            .count()
    }
}

impl Authorization for NullAuthorization {
    fn has_capability(&self, principal: &Principal, capability: Capability) -> bool {
        self.grants
            .lock()
            .unwrap()
            .get(principal)
            .is_some_and(|caps| caps.contains(&capability))
    }

    fn set_delegate(&self, principal: &Principal, granted: bool) {
        if granted {
            self.grant(principal, Capability::Delegate);
        } else {
            self.revoke(principal, Capability::Delegate);
        }
    }
}
