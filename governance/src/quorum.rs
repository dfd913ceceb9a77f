//! Quorum evaluation.
//!
//! A proposal passes only when BOTH rules hold:
//! - Guardian quorum: at least `guardian_quorum` Guardian For votes.
//! - Delegate quorum: delegate For weight of at least
//!   `total × delegate_quorum_bps / 10 000` (truncated). With no delegate
//!   weight assigned at all the rule is met, so an empty pool cannot block.

use guardian_types::params::BPS_DENOMINATOR;
use guardian_types::GovernanceParams;
use serde::{Deserialize, Serialize};

use crate::Tally;

/// Result of evaluating both quorum rules against a tally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumStatus {
    pub guardian_met: bool,
    pub delegate_met: bool,
    pub guardian_for: u32,
    pub guardian_required: u32,
    pub delegate_for: u128,
    pub delegate_required: u128,
    pub total_delegate_weight: u128,
}

impl QuorumStatus {
    pub fn passed(&self) -> bool {
        self.guardian_met && self.delegate_met
    }
}

/// `floor(total × bps / 10 000)` without overflowing for any `u128` total.
///
/// Saturates only for `bps` above 10 000, which validated params never carry.
pub fn required_delegate_weight(total: u128, bps: u32) -> u128 {
    let denom = u128::from(BPS_DENOMINATOR);
    let bps = u128::from(bps);
    (total / denom)
        .saturating_mul(bps)
        .saturating_add((total % denom) * bps / denom)
}

pub fn evaluate(tally: &Tally, total_delegate_weight: u128, params: &GovernanceParams) -> QuorumStatus {
    let delegate_required = required_delegate_weight(total_delegate_weight, params.delegate_quorum_bps);
    QuorumStatus {
        guardian_met: tally.guardian_for >= params.guardian_quorum,
        delegate_met: total_delegate_weight == 0 || tally.delegate_for >= delegate_required,
        guardian_for: tally.guardian_for,
        guardian_required: params.guardian_quorum,
        delegate_for: tally.delegate_for,
        delegate_required,
        total_delegate_weight,
    }
}
