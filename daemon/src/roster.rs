//! Authorization backed by the configured roster.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use guardian_governance::Authorization;
use guardian_types::{Capability, Principal};

use crate::config::{ConfigError, RosterConfig};

/// Static roles from configuration, plus the Delegate capability the engine
/// keeps in step with delegate weights.
#[derive(Debug, Default)]
pub struct RosterAuthorization {
    roles: HashMap<Principal, HashSet<Capability>>,
    delegates: Mutex<HashSet<Principal>>,
}

impl RosterAuthorization {
    pub fn from_roster(roster: &RosterConfig) -> Result<Self, ConfigError> {
        let mut auth = Self::default();
        for (names, capability) in [
            (roster.guardian_principals()?, Capability::Guardian),
            (roster.admin_principals()?, Capability::Admin),
            (roster.emergency_issuer_principals()?, Capability::EmergencyIssuer),
        ] {
            for principal in names {
                auth.roles.entry(principal).or_default().insert(capability);
            }
        }
        Ok(auth)
    }

    pub fn guardian_count(&self) -> usize {
        self.roles
            .values()
            .filter(|caps| caps.contains(&Capability::Guardian))
            .count()
    }
}

impl Authorization for RosterAuthorization {
    fn has_capability(&self, principal: &Principal, capability: Capability) -> bool {
        if capability == Capability::Delegate {
            return self
                .delegates
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(principal);
        }
        self.roles
            .get(principal)
            .is_some_and(|caps| caps.contains(&capability))
    }

    fn set_delegate(&self, principal: &Principal, granted: bool) {
        let mut delegates = self.delegates.lock().unwrap_or_else(PoisonError::into_inner);
        if granted {
            delegates.insert(principal.clone());
        } else {
            delegates.remove(principal);
        }
    }
}
