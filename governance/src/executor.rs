//! The seam between the governor and whatever runs a passed proposal's
//! actions. The governor never interprets targets or calldata.

use crate::proposal::ProposalAction;
use agora_types::ProposalId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ExecutionError(String);

impl ExecutionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

pub trait ProposalExecutor {
    /// Run every action of proposal `id`. An error leaves the proposal
    /// queued.
    fn execute(&mut self, id: &ProposalId, actions: &[ProposalAction])
        -> Result<(), ExecutionError>;
}
