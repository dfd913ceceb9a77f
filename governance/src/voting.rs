//! Vote values and tally recording.

use serde::{Deserialize, Serialize};

use crate::{GovernanceError, Tally};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteValue {
    For,
    Against,
    Abstain,
}

impl VoteValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::For => "for",
            Self::Against => "against",
            Self::Abstain => "abstain",
        }
    }
}

/// Count one Guardian vote. Abstain changes nothing.
pub fn record_guardian(tally: &mut Tally, value: VoteValue) -> Result<(), GovernanceError> {
    let slot = match value {
        VoteValue::For => &mut tally.guardian_for,
        VoteValue::Against => &mut tally.guardian_against,
        VoteValue::Abstain => return Ok(()),
    };
    *slot = slot
        .checked_add(1)
        .ok_or(GovernanceError::Overflow("guardian tally"))?;
    Ok(())
}

/// Add a delegate's weight to the bucket for `value`.
pub fn record_delegate(tally: &mut Tally, value: VoteValue, weight: u128) -> Result<(), GovernanceError> {
    let slot = match value {
        VoteValue::For => &mut tally.delegate_for,
        VoteValue::Against => &mut tally.delegate_against,
        VoteValue::Abstain => &mut tally.delegate_abstain,
    };
    *slot = slot
        .checked_add(weight)
        .ok_or(GovernanceError::Overflow("delegate tally"))?;
    Ok(())
}
