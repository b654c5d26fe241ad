use agora_ledger::LedgerError;
use agora_types::{ProposalId, ProposalState, Timestamp, TypesError, VotingType};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GovernanceError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, approved {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    #[error("{account} has no voting power for this vote (power {power}, required {required})")]
    NoVotingPower {
        account: String,
        power: u128,
        required: u128,
    },

    #[error("{0} has already voted on this proposal")]
    AlreadyVoted(String),

    #[error("proposal is not active (state: {0})")]
    ProposalNotActive(ProposalState),

    #[error("proposal {0} already exists")]
    DuplicateProposal(ProposalId),

    #[error("invalid support value {0}: expected 0 (against), 1 (for) or 2 (abstain)")]
    InvalidSupportValue(u8),

    #[error("invalid vote count {0}: at least one vote is required")]
    InvalidVoteCount(u128),

    #[error("invalid voting type {0}: expected 0 (standard) or 1 (quadratic)")]
    InvalidVotingType(u8),

    #[error("proposal uses {expected} voting")]
    VotingTypeMismatch { expected: VotingType },

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("invalid proposal id: {0}")]
    InvalidProposalId(String),

    #[error("invalid proposal length: {targets} targets, {values} values, {calldatas} calldatas")]
    InvalidProposalLength {
        targets: usize,
        values: usize,
        calldatas: usize,
    },

    #[error("proposal has no actions")]
    EmptyProposal,

    #[error("invalid calldata: {0}")]
    InvalidCalldata(String),

    #[error("proposer power {power} is below the proposal threshold {threshold}")]
    BelowProposalThreshold { power: u128, threshold: u128 },

    #[error("only the proposer can cancel (caller: {0})")]
    NotProposer(String),

    #[error("proposal cannot be canceled in state {0}")]
    ProposalNotCancelable(ProposalState),

    #[error("proposal has not succeeded (state: {0})")]
    ProposalNotSuccessful(ProposalState),

    #[error("proposal is not queued (state: {0})")]
    ProposalNotQueued(ProposalState),

    #[error("timelock has not elapsed: executable at {eta}")]
    TimelockNotElapsed { eta: Timestamp },

    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("{0} is not allowed to mint")]
    Unauthorized(String),

    #[error("{0} is reserved for governor custody")]
    ReservedAccount(String),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl From<LedgerError> for GovernanceError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientBalance { needed, available } => {
                Self::InsufficientBalance { needed, available }
            }
            LedgerError::InsufficientAllowance { needed, available } => {
                Self::InsufficientAllowance { needed, available }
            }
            LedgerError::Overflow => Self::Overflow,
            LedgerError::InvalidAddress(a) => Self::InvalidAddress(a),
            other @ (LedgerError::FutureLookup { .. }
            | LedgerError::Serialization(_)
            | LedgerError::CorruptSnapshot(_)) => Self::Snapshot(other.to_string()),
        }
    }
}

impl From<TypesError> for GovernanceError {
    fn from(e: TypesError) -> Self {
        match e {
            TypesError::InvalidSupportValue(v) => Self::InvalidSupportValue(v),
            TypesError::InvalidVotingType(v) => Self::InvalidVotingType(v),
            TypesError::InvalidProposalId(s) => Self::InvalidProposalId(s),
        }
    }
}
