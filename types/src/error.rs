//! Errors raised while decoding wire-shaped values into typed ones.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid support value {0}: expected 0 (against), 1 (for) or 2 (abstain)")]
    InvalidSupportValue(u8),

    #[error("invalid voting type {0}: expected 0 (standard) or 1 (quadratic)")]
    InvalidVotingType(u8),

    #[error("invalid proposal id: {0}")]
    InvalidProposalId(String),
}
