//! Governance policy parameters.
//!
//! The defaults are the reference policy. They are fixed for a running engine
//! and only loaded from configuration at start-up.

use serde::{Deserialize, Serialize};

use crate::TypesError;

/// Basis-point denominator (10 000 bps = 100%).
pub const BPS_DENOMINATOR: u32 = 10_000;

const HOUR: u64 = 3600;
const DAY: u64 = 24 * HOUR;

/// All policy constants consulted by the lifecycle controller and the quorum
/// evaluator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceParams {
    /// Length of the voting window, measured from creation.
    pub voting_period_secs: u64,

    /// Delay between a standard proposal passing and its earliest execution.
    pub standard_timelock_secs: u64,

    /// Delay between an emergency proposal passing and its earliest execution.
    pub emergency_timelock_secs: u64,

    /// Hard expiry, measured from creation. Execution after this fails.
    pub expiry_period_secs: u64,

    /// Size of the Guardian roster. Informational; not enforced by the engine.
    pub guardian_roster_size: u32,

    /// Minimum Guardian For votes for the Guardian quorum.
    pub guardian_quorum: u32,

    /// Fraction of total delegate weight (basis points) that must vote For.
    pub delegate_quorum_bps: u32,
}

impl GovernanceParams {
    /// The reference policy: 7-day vote, 48h/24h timelock, 14-day expiry,
    /// 7-of-10 Guardians and 51% of delegate weight.
    pub fn reference() -> Self {
        Self {
            voting_period_secs: 7 * DAY,
            standard_timelock_secs: 48 * HOUR,
            emergency_timelock_secs: 24 * HOUR,
            expiry_period_secs: 14 * DAY,
            guardian_roster_size: 10,
            guardian_quorum: 7,
            delegate_quorum_bps: 5100,
        }
    }

    /// Timelock applied when a proposal is queued.
    pub fn timelock_for(&self, emergency: bool) -> u64 {
        if emergency {
            self.emergency_timelock_secs
        } else {
            self.standard_timelock_secs
        }
    }

    /// Reject parameter sets under which the lifecycle cannot work.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.voting_period_secs == 0 {
            return Err(TypesError::InvalidParams(
                "voting_period_secs must be greater than zero".into(),
            ));
        }
        if self.expiry_period_secs <= self.voting_period_secs {
            return Err(TypesError::InvalidParams(format!(
                "expiry_period_secs ({}) must exceed voting_period_secs ({})",
                self.expiry_period_secs, self.voting_period_secs
            )));
        }
        if self.emergency_timelock_secs > self.standard_timelock_secs {
            return Err(TypesError::InvalidParams(format!(
                "emergency_timelock_secs ({}) must not exceed standard_timelock_secs ({})",
                self.emergency_timelock_secs, self.standard_timelock_secs
            )));
        }
        if self.guardian_quorum == 0 || self.guardian_quorum > self.guardian_roster_size {
            return Err(TypesError::InvalidParams(format!(
                "guardian_quorum ({}) must be within 1..={}",
                self.guardian_quorum, self.guardian_roster_size
            )));
        }
        if self.delegate_quorum_bps > BPS_DENOMINATOR {
            return Err(TypesError::InvalidParams(format!(
                "delegate_quorum_bps ({}) exceeds {}",
                self.delegate_quorum_bps, BPS_DENOMINATOR
            )));
        }
        Ok(())
    }
}

/// Default is the reference policy.
impl Default for GovernanceParams {
    fn default() -> Self {
        Self::reference()
    }
}
