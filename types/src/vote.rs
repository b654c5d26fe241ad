//! Vote direction, voting strategy and proposal lifecycle enums.
//!
//! Each enum has a stable `u8` discriminant matching the external interface,
//! so operation logs and read models can carry raw numbers.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which tally bucket a vote goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Support {
    Against = 0,
    For = 1,
    Abstain = 2,
}

impl Support {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Support {
    type Error = TypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Against),
            1 => Ok(Self::For),
            2 => Ok(Self::Abstain),
            other => Err(TypesError::InvalidSupportValue(other)),
        }
    }
}

/// Voting strategy selected when a proposal is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VotingType {
    /// One token, one vote: weight equals snapshot voting power.
    Standard = 0,
    /// Pay-per-vote: `n` votes cost `n²` tokens and add `n` to the tally.
    Quadratic = 1,
}

impl VotingType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for VotingType {
    type Error = TypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Standard),
            1 => Ok(Self::Quadratic),
            other => Err(TypesError::InvalidVotingType(other)),
        }
    }
}

impl fmt::Display for VotingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Quadratic => write!(f, "quadratic"),
        }
    }
}

/// Lifecycle state of a proposal.
///
/// Always derived from stored bookkeeping and the current time, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    Pending = 0,
    Active = 1,
    Canceled = 2,
    Defeated = 3,
    Succeeded = 4,
    Queued = 5,
    Expired = 6,
    Executed = 7,
}

impl ProposalState {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Canceled => "Canceled",
            Self::Defeated => "Defeated",
            Self::Succeeded => "Succeeded",
            Self::Queued => "Queued",
            Self::Expired => "Expired",
            Self::Executed => "Executed",
        }
    }

    /// No further transition is possible from a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Canceled | Self::Defeated | Self::Expired | Self::Executed
        )
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
