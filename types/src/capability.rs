//! Capabilities answered by the Authorization collaborator, and the two
//! independent voter classes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A capability a principal may currently hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    /// Fixed-roster voter with one unweighted vote per proposal.
    Guardian,
    /// Weighted voter. Held exactly while the delegate's weight is non-zero.
    Delegate,
    /// May submit emergency proposals (shortened timelock).
    EmergencyIssuer,
    /// May assign delegate weights and cancel any proposal.
    Admin,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guardian => "guardian",
            Self::Delegate => "delegate",
            Self::EmergencyIssuer => "emergency_issuer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which vote-marker namespace a vote is recorded in.
///
/// A principal holding both capabilities votes once per class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoterClass {
    Guardian,
    Delegate,
}

impl VoterClass {
    /// Single-byte tag used in storage keys.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Guardian => b'g',
            Self::Delegate => b'd',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guardian => "guardian",
            Self::Delegate => "delegate",
        }
    }
}

impl fmt::Display for VoterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
