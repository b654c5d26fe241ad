use agora_types::Sequence;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, approved {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    #[error("arithmetic overflow")]
    Overflow,

    #[error("lookup at sequence {requested} is in the future (current {current})")]
    FutureLookup { requested: Sequence, current: Sequence },

    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}
