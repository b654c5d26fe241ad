//! Proposal registry: creation, lookup and the externally triggered
//! lifecycle steps (cancel, queue, execute).
//!
//! Proposals are never removed. Iteration follows creation order.

use crate::error::GovernanceError;
use crate::executor::ProposalExecutor;
use crate::params::GovernorParams;
use crate::proposal::{Proposal, ProposalRequest, Tally};
use agora_types::{Address, ProposalId, ProposalState, Sequence, Timestamp};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug, Default)]
pub struct ProposalRegistry {
    proposals: HashMap<ProposalId, Proposal>,
    order: Vec<ProposalId>,
}

impl ProposalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from proposals listed in creation order.
    pub fn from_proposals(proposals: Vec<Proposal>) -> Result<Self, GovernanceError> {
        let mut registry = Self::new();
        for proposal in proposals {
            registry.insert(proposal)?;
        }
        Ok(registry)
    }

    /// Validate `request` and store the proposal it describes.
    ///
    /// `snapshot` and `quorum` come from the ledger at creation time.
    pub fn create(
        &mut self,
        proposer: &Address,
        request: ProposalRequest,
        snapshot: Sequence,
        quorum: u128,
        now: Timestamp,
        params: &GovernorParams,
    ) -> Result<ProposalId, GovernanceError> {
        request.validate()?;
        let id = request.id();
        if self.proposals.contains_key(&id) {
            return Err(GovernanceError::DuplicateProposal(id));
        }

        let vote_start = now.plus(params.voting_delay_secs);
        let proposal = Proposal {
            id,
            proposer: proposer.clone(),
            actions: request.actions(),
            description: request.description,
            voting_type: request.voting_type,
            snapshot,
            created_at: now,
            vote_start,
            vote_end: vote_start.plus(params.voting_period_secs),
            quorum,
            tally: Tally::default(),
            participation: 0,
            receipts: BTreeMap::new(),
            canceled: false,
            eta: None,
            executed: false,
        };
        self.insert(proposal)?;
        Ok(id)
    }

    fn insert(&mut self, proposal: Proposal) -> Result<(), GovernanceError> {
        let id = proposal.id;
        if self.proposals.contains_key(&id) {
            return Err(GovernanceError::DuplicateProposal(id));
        }
        self.proposals.insert(id, proposal);
        self.order.push(id);
        Ok(())
    }

    pub fn get(&self, id: &ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(id)
            .ok_or(GovernanceError::ProposalNotFound(*id))
    }

    pub(crate) fn get_mut(&mut self, id: &ProposalId) -> Result<&mut Proposal, GovernanceError> {
        self.proposals
            .get_mut(id)
            .ok_or(GovernanceError::ProposalNotFound(*id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Proposals in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.order.iter().filter_map(|id| self.proposals.get(id))
    }

    pub fn state(
        &self,
        id: &ProposalId,
        now: Timestamp,
        params: &GovernorParams,
    ) -> Result<ProposalState, GovernanceError> {
        Ok(self.get(id)?.state(now, params))
    }

    /// Proposer-initiated cancellation, allowed while Pending or Active.
    pub fn cancel(
        &mut self,
        id: &ProposalId,
        caller: &Address,
        now: Timestamp,
        params: &GovernorParams,
    ) -> Result<(), GovernanceError> {
        let proposal = self.get_mut(id)?;
        if &proposal.proposer != caller {
            return Err(GovernanceError::NotProposer(caller.as_str().to_string()));
        }
        match proposal.state(now, params) {
            ProposalState::Pending | ProposalState::Active => {
                proposal.canceled = true;
                Ok(())
            }
            other => Err(GovernanceError::ProposalNotCancelable(other)),
        }
    }

    /// Move a Succeeded proposal into the timelock. Returns its eta.
    pub fn queue(
        &mut self,
        id: &ProposalId,
        now: Timestamp,
        params: &GovernorParams,
    ) -> Result<Timestamp, GovernanceError> {
        let proposal = self.get_mut(id)?;
        match proposal.state(now, params) {
            ProposalState::Succeeded => {
                let eta = now.plus(params.timelock_delay_secs);
                proposal.eta = Some(eta);
                Ok(eta)
            }
            other => Err(GovernanceError::ProposalNotSuccessful(other)),
        }
    }

    /// Hand a queued proposal's actions to `executor`. The proposal is only
    /// marked executed if the executor accepts them.
    pub fn execute(
        &mut self,
        id: &ProposalId,
        now: Timestamp,
        params: &GovernorParams,
        executor: &mut dyn ProposalExecutor,
    ) -> Result<(), GovernanceError> {
        let proposal = self.get_mut(id)?;
        let state = proposal.state(now, params);
        let Some(eta) = proposal.eta.filter(|_| state == ProposalState::Queued) else {
            return Err(GovernanceError::ProposalNotQueued(state));
        };
        if now < eta {
            return Err(GovernanceError::TimelockNotElapsed { eta });
        }
        executor
            .execute(id, &proposal.actions)
            .map_err(|e| GovernanceError::ExecutionFailed(e.to_string()))?;
        proposal.executed = true;
        Ok(())
    }
}
