//! Nullable executor — record proposal executions without running them.

use agora_governance::{ExecutionError, ProposalAction, ProposalExecutor};
use agora_types::ProposalId;

/// One recorded execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutedProposal {
    pub id: ProposalId,
    pub actions: Vec<ProposalAction>,
}

/// A test executor that records what it is asked to run.
///
/// Call [`NullExecutor::fail_with`] to make every following execution fail,
/// as a reverting target would.
#[derive(Default)]
pub struct NullExecutor {
    executed: Vec<ExecutedProposal>,
    failure: Option<String>,
}

impl NullExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent executions fail with `reason`.
    pub fn fail_with(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }

    /// Let subsequent executions succeed again.
    pub fn succeed(&mut self) {
        self.failure = None;
    }

    /// Get all executed proposals (for assertions).
    pub fn executed(&self) -> &[ExecutedProposal] {
        &self.executed
    }

    pub fn was_executed(&self, id: &ProposalId) -> bool {
        self.executed.iter().any(|e| &e.id == id)
    }
}

impl ProposalExecutor for NullExecutor {
    fn execute(
        &mut self,
        id: &ProposalId,
        actions: &[ProposalAction],
    ) -> Result<(), ExecutionError> {
        if let Some(reason) = &self.failure {
            return Err(ExecutionError::new(reason.clone()));
        }
        self.executed.push(ExecutedProposal {
            id: *id,
            actions: actions.to_vec(),
        });
        Ok(())
    }
}
