//! Vote casting for both strategies.
//!
//! The engine owns no state. It reads snapshot power from the ledger,
//! checks every precondition, and only then touches the proposal (and, for
//! quadratic votes, the voter's balance), so a rejected vote has no effect.

use crate::error::GovernanceError;
use crate::params::{GovernorParams, QuadraticCostPolicy};
use crate::proposal::{Proposal, Tally, VoteReceipt};
use agora_ledger::TokenLedger;
use agora_types::{Address, ProposalState, Support, Timestamp, VotingType};

#[derive(Clone, Copy, Debug, Default)]
pub struct VotingEngine;

impl VotingEngine {
    pub fn new() -> Self {
        Self
    }

    /// One-token-one-vote: weight is the voter's power at the snapshot.
    pub fn cast_vote(
        &self,
        proposal: &mut Proposal,
        ledger: &TokenLedger,
        voter: &Address,
        support: Support,
        now: Timestamp,
        params: &GovernorParams,
    ) -> Result<VoteReceipt, GovernanceError> {
        check_open(proposal, voter, VotingType::Standard, now, params)?;

        let weight = ledger.power_at(voter, proposal.snapshot)?;
        if weight == 0 {
            return Err(GovernanceError::NoVotingPower {
                account: voter.as_str().to_string(),
                power: 0,
                required: 1,
            });
        }

        let receipt = VoteReceipt {
            support,
            votes: weight,
            cost: 0,
        };
        record(proposal, voter, receipt, weight)?;
        Ok(receipt)
    }

    /// Pay-per-vote: `num_votes` votes cost `num_votes²` tokens, taken from
    /// the voter through its allowance to the custody account.
    ///
    /// The squared cost may not exceed the voter's power at the snapshot.
    /// The custody account cannot vote this way, since it would pay itself.
    #[allow(clippy::too_many_arguments)]
    pub fn cast_vote_quadratic(
        &self,
        proposal: &mut Proposal,
        ledger: &mut TokenLedger,
        voter: &Address,
        support: Support,
        num_votes: u128,
        now: Timestamp,
        params: &GovernorParams,
    ) -> Result<VoteReceipt, GovernanceError> {
        check_open(proposal, voter, VotingType::Quadratic, now, params)?;
        if voter == &params.custody_account {
            return Err(GovernanceError::ReservedAccount(voter.as_str().to_string()));
        }
        if num_votes == 0 {
            return Err(GovernanceError::InvalidVoteCount(num_votes));
        }

        let power = ledger.power_at(voter, proposal.snapshot)?;
        let cost = match quadratic_cost(num_votes) {
            Some(cost) if cost <= power => cost,
            other => {
                return Err(GovernanceError::NoVotingPower {
                    account: voter.as_str().to_string(),
                    power,
                    required: other.unwrap_or(u128::MAX),
                })
            }
        };

        // Validate the tally before moving any tokens.
        let receipt = VoteReceipt {
            support,
            votes: num_votes,
            cost,
        };
        tally_after(proposal, receipt, cost)?;

        let custody = &params.custody_account;
        match params.quadratic_cost_policy {
            QuadraticCostPolicy::Burn => ledger.burn_from(custody, voter, cost)?,
            QuadraticCostPolicy::Escrow => ledger.transfer_from(custody, voter, custody, cost)?,
        };

        record(proposal, voter, receipt, cost)?;
        Ok(receipt)
    }
}

/// `n²`, or `None` if it does not fit.
pub fn quadratic_cost(num_votes: u128) -> Option<u128> {
    num_votes.checked_mul(num_votes)
}

/// The largest vote count whose cost `power` can back.
pub fn max_quadratic_votes(power: u128) -> u128 {
    power.isqrt()
}

fn check_open(
    proposal: &Proposal,
    voter: &Address,
    strategy: VotingType,
    now: Timestamp,
    params: &GovernorParams,
) -> Result<(), GovernanceError> {
    let state = proposal.state(now, params);
    if state != ProposalState::Active {
        return Err(GovernanceError::ProposalNotActive(state));
    }
    if proposal.has_voted(voter) {
        return Err(GovernanceError::AlreadyVoted(voter.as_str().to_string()));
    }
    if proposal.voting_type != strategy {
        return Err(GovernanceError::VotingTypeMismatch {
            expected: proposal.voting_type,
        });
    }
    Ok(())
}

/// Tally and participation after adding `receipt`.
fn tally_after(
    proposal: &Proposal,
    receipt: VoteReceipt,
    participation: u128,
) -> Result<(Tally, u128), GovernanceError> {
    let tally = proposal.tally.with_added(receipt.support, receipt.votes)?;
    let participation = match receipt.support {
        Support::For | Support::Abstain => proposal
            .participation
            .checked_add(participation)
            .ok_or(GovernanceError::Overflow)?,
        Support::Against => proposal.participation,
    };
    Ok((tally, participation))
}

fn record(
    proposal: &mut Proposal,
    voter: &Address,
    receipt: VoteReceipt,
    participation: u128,
) -> Result<(), GovernanceError> {
    let (tally, participation) = tally_after(proposal, receipt, participation)?;
    proposal.tally = tally;
    proposal.participation = participation;
    proposal.receipts.insert(voter.clone(), receipt);
    tracing::info!(
        proposal = ?proposal.id,
        voter = %voter,
        support = ?receipt.support,
        votes = receipt.votes,
        cost = receipt.cost,
        "vote cast"
    );
    Ok(())
}
