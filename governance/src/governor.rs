//! The governor: one sequential state machine over the token ledger and the
//! proposal registry.
//!
//! Every mutating call is all-or-nothing. Callers supply `now`; the governor
//! never reads the wall clock, so applying the same calls in the same order
//! always reaches the same state.

use crate::error::GovernanceError;
use crate::executor::ProposalExecutor;
use crate::params::GovernorParams;
use crate::proposal::{Proposal, ProposalRequest, VoteReceipt};
use crate::registry::ProposalRegistry;
use crate::summary::ProposalSummary;
use crate::voting::{self, VotingEngine};
use agora_ledger::{GenesisConfig, TokenLedger};
use agora_types::{Address, ProposalId, ProposalState, Sequence, Support, Timestamp, VotingType};

#[derive(Clone, Debug)]
pub struct Governor {
    params: GovernorParams,
    ledger: TokenLedger,
    registry: ProposalRegistry,
    voting: VotingEngine,
}

impl Governor {
    pub fn new(params: GovernorParams, ledger: TokenLedger) -> Result<Self, GovernanceError> {
        Self::from_parts(params, ledger, ProposalRegistry::new())
    }

    pub fn from_genesis(
        params: GovernorParams,
        genesis: &GenesisConfig,
    ) -> Result<Self, GovernanceError> {
        let ledger = genesis.build()?;
        Self::new(params, ledger)
    }

    pub(crate) fn from_parts(
        params: GovernorParams,
        ledger: TokenLedger,
        registry: ProposalRegistry,
    ) -> Result<Self, GovernanceError> {
        params.validate()?;
        Ok(Self {
            params,
            ledger,
            registry,
            voting: VotingEngine::new(),
        })
    }

    pub fn params(&self) -> &GovernorParams {
        &self.params
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &ProposalRegistry {
        &self.registry
    }

    // ── Token surface ───────────────────────────────────────────────────

    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<Sequence, GovernanceError> {
        Ok(self.ledger.mint(to, amount)?)
    }

    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<Sequence, GovernanceError> {
        Ok(self.ledger.transfer(from, to, amount)?)
    }

    pub fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<Sequence, GovernanceError> {
        Ok(self.ledger.approve(owner, spender, amount)?)
    }

    pub fn burn(&mut self, from: &Address, amount: u128) -> Result<Sequence, GovernanceError> {
        Ok(self.ledger.burn(from, amount)?)
    }

    pub fn delegate(&mut self, account: &Address, to: &Address) -> Result<Sequence, GovernanceError> {
        Ok(self.ledger.delegate(account, to)?)
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.ledger.balance_of(account)
    }

    pub fn voting_power_now(&self, account: &Address) -> u128 {
        self.ledger.voting_power_now(account)
    }

    // ── Proposals ───────────────────────────────────────────────────────

    /// Create a proposal snapshotted at the ledger's current sequence.
    pub fn propose(
        &mut self,
        proposer: &Address,
        request: ProposalRequest,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        let power = self.ledger.voting_power_now(proposer);
        let threshold = self.params.proposal_threshold();
        if power < threshold {
            return Err(GovernanceError::BelowProposalThreshold { power, threshold });
        }

        let snapshot = self.ledger.snapshot();
        let quorum = self
            .params
            .quorum_for(self.ledger.total_supply_at(snapshot)?);
        let voting_type = request.voting_type;
        let id = self
            .registry
            .create(proposer, request, snapshot, quorum, now, &self.params)?;

        tracing::info!(
            proposal = %id,
            proposer = %proposer,
            voting_type = %voting_type,
            snapshot,
            quorum,
            "proposal created"
        );
        Ok(id)
    }

    pub fn cast_vote(
        &mut self,
        id: &ProposalId,
        voter: &Address,
        support: Support,
        now: Timestamp,
    ) -> Result<VoteReceipt, GovernanceError> {
        let proposal = self.registry.get_mut(id)?;
        self.voting
            .cast_vote(proposal, &self.ledger, voter, support, now, &self.params)
    }

    pub fn cast_vote_quadratic(
        &mut self,
        id: &ProposalId,
        voter: &Address,
        support: Support,
        num_votes: u128,
        now: Timestamp,
    ) -> Result<VoteReceipt, GovernanceError> {
        let proposal = self.registry.get_mut(id)?;
        self.voting.cast_vote_quadratic(
            proposal,
            &mut self.ledger,
            voter,
            support,
            num_votes,
            now,
            &self.params,
        )
    }

    pub fn cancel(
        &mut self,
        id: &ProposalId,
        caller: &Address,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.registry.cancel(id, caller, now, &self.params)?;
        tracing::info!(proposal = %id, caller = %caller, "proposal canceled");
        Ok(())
    }

    pub fn queue(&mut self, id: &ProposalId, now: Timestamp) -> Result<Timestamp, GovernanceError> {
        let eta = self.registry.queue(id, now, &self.params)?;
        tracing::info!(proposal = %id, eta = eta.as_secs(), "proposal queued");
        Ok(eta)
    }

    pub fn execute(
        &mut self,
        id: &ProposalId,
        now: Timestamp,
        executor: &mut dyn ProposalExecutor,
    ) -> Result<(), GovernanceError> {
        self.registry.execute(id, now, &self.params, executor)?;
        tracing::info!(proposal = %id, "proposal executed");
        Ok(())
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn proposal(&self, id: &ProposalId) -> Result<&Proposal, GovernanceError> {
        self.registry.get(id)
    }

    pub fn state(&self, id: &ProposalId, now: Timestamp) -> Result<ProposalState, GovernanceError> {
        self.registry.state(id, now, &self.params)
    }

    /// `(against, for, abstain)` in the proposal's strategy unit.
    pub fn proposal_votes(&self, id: &ProposalId) -> Result<(u128, u128, u128), GovernanceError> {
        Ok(self.registry.get(id)?.tally.as_tuple())
    }

    pub fn proposal_voting_type(&self, id: &ProposalId) -> Result<VotingType, GovernanceError> {
        Ok(self.registry.get(id)?.voting_type)
    }

    pub fn has_voted(&self, id: &ProposalId, account: &Address) -> Result<bool, GovernanceError> {
        Ok(self.registry.get(id)?.has_voted(account))
    }

    pub fn receipt(
        &self,
        id: &ProposalId,
        account: &Address,
    ) -> Result<Option<VoteReceipt>, GovernanceError> {
        Ok(self.registry.get(id)?.receipt(account).copied())
    }

    /// How many quadratic votes `account` could afford on this proposal,
    /// judged by its power at the snapshot. Zero for the custody account.
    pub fn max_quadratic_votes(
        &self,
        id: &ProposalId,
        account: &Address,
    ) -> Result<u128, GovernanceError> {
        let proposal = self.registry.get(id)?;
        if account == &self.params.custody_account {
            return Ok(0);
        }
        let power = self.ledger.power_at(account, proposal.snapshot)?;
        Ok(voting::max_quadratic_votes(power))
    }

    pub fn proposal_summary(
        &self,
        id: &ProposalId,
        now: Timestamp,
    ) -> Result<ProposalSummary, GovernanceError> {
        let proposal = self.registry.get(id)?;
        Ok(ProposalSummary::project(proposal, now, &self.params))
    }

    /// Every proposal, in creation order.
    pub fn proposals(&self, now: Timestamp) -> Vec<ProposalSummary> {
        self.registry
            .iter()
            .map(|p| ProposalSummary::project(p, now, &self.params))
            .collect()
    }
}
