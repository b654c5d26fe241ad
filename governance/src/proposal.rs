//! Proposals and their lifecycle.
//!
//! A proposal's state is never stored. It is derived on demand from the
//! voting window, the tallies, and the cancel / queue / execute markers, so
//! the reported state can never drift from the tallies behind it.

use crate::error::GovernanceError;
use crate::params::{bps_of, GovernorParams};
use agora_types::{Address, ProposalId, ProposalState, Sequence, Support, Timestamp, VotingType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One opaque action forwarded to the executor once the proposal passes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalAction {
    pub target: Address,
    pub value: u128,
    pub calldata: Vec<u8>,
}

/// What a proposer submits. The id is derived from everything except
/// `voting_type`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalRequest {
    pub targets: Vec<Address>,
    pub values: Vec<u128>,
    pub calldatas: Vec<Vec<u8>>,
    pub description: String,
    pub voting_type: VotingType,
}

impl ProposalRequest {
    /// Targets, values and calldatas must be non-empty and line up.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        let (targets, values, calldatas) =
            (self.targets.len(), self.values.len(), self.calldatas.len());
        if targets != values || targets != calldatas {
            return Err(GovernanceError::InvalidProposalLength {
                targets,
                values,
                calldatas,
            });
        }
        if targets == 0 {
            return Err(GovernanceError::EmptyProposal);
        }
        if let Some(bad) = self.targets.iter().find(|t| !t.is_valid()) {
            return Err(GovernanceError::InvalidAddress(bad.as_str().to_string()));
        }
        Ok(())
    }

    pub fn id(&self) -> ProposalId {
        agora_crypto::hash_proposal(&self.targets, &self.values, &self.calldatas, &self.description)
    }

    pub(crate) fn actions(&self) -> Vec<ProposalAction> {
        self.targets
            .iter()
            .zip(&self.values)
            .zip(&self.calldatas)
            .map(|((target, value), calldata)| ProposalAction {
                target: target.clone(),
                value: *value,
                calldata: calldata.clone(),
            })
            .collect()
    }
}

/// Vote totals in the proposal's strategy unit (power for Standard, vote
/// count for Quadratic).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub against: u128,
    pub for_votes: u128,
    pub abstain: u128,
}

impl Tally {
    pub fn get(&self, support: Support) -> u128 {
        match support {
            Support::Against => self.against,
            Support::For => self.for_votes,
            Support::Abstain => self.abstain,
        }
    }

    /// The tally with `amount` added to `support`'s bucket.
    pub fn with_added(&self, support: Support, amount: u128) -> Result<Tally, GovernanceError> {
        let mut next = *self;
        let bucket = match support {
            Support::Against => &mut next.against,
            Support::For => &mut next.for_votes,
            Support::Abstain => &mut next.abstain,
        };
        *bucket = bucket.checked_add(amount).ok_or(GovernanceError::Overflow)?;
        Ok(next)
    }

    /// `(against, for, abstain)`, the external read order.
    pub fn as_tuple(&self) -> (u128, u128, u128) {
        (self.against, self.for_votes, self.abstain)
    }
}

/// What a voter cast and paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub support: Support,
    /// Amount added to the tally.
    pub votes: u128,
    /// Tokens debited from the voter (always zero for Standard votes).
    pub cost: u128,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: Address,
    pub description: String,
    pub voting_type: VotingType,
    pub actions: Vec<ProposalAction>,
    /// Ledger sequence every voting-power lookup for this proposal uses.
    pub snapshot: Sequence,
    pub created_at: Timestamp,
    /// Voting window `[vote_start, vote_end)`.
    pub vote_start: Timestamp,
    pub vote_end: Timestamp,
    /// Participation required, fixed at creation.
    pub quorum: u128,
    pub tally: Tally,
    /// Participation counted toward quorum, in token units.
    pub participation: u128,
    pub receipts: BTreeMap<Address, VoteReceipt>,
    pub canceled: bool,
    pub eta: Option<Timestamp>,
    pub executed: bool,
}

impl Proposal {
    /// Derive the lifecycle state at `now`.
    pub fn state(&self, now: Timestamp, params: &GovernorParams) -> ProposalState {
        if self.executed {
            return ProposalState::Executed;
        }
        if self.canceled {
            return ProposalState::Canceled;
        }
        if now < self.vote_start {
            return ProposalState::Pending;
        }
        if now < self.vote_end {
            return ProposalState::Active;
        }
        if !(self.quorum_reached() && self.vote_succeeded(params)) {
            return ProposalState::Defeated;
        }
        match self.eta {
            None => ProposalState::Succeeded,
            Some(eta) if eta.has_expired(params.grace_period_secs, now) => ProposalState::Expired,
            Some(_) => ProposalState::Queued,
        }
    }

    pub fn quorum_reached(&self) -> bool {
        self.participation >= self.quorum
    }

    /// For beats Against and clears the approval threshold.
    pub fn vote_succeeded(&self, params: &GovernorParams) -> bool {
        let Tally {
            against, for_votes, ..
        } = self.tally;
        if for_votes <= against {
            return false;
        }
        // for + against never exceeds the snapshot supply
        let decisive = for_votes.saturating_add(against);
        for_votes > bps_of(decisive, params.approval_threshold_bps)
    }

    pub fn has_voted(&self, account: &Address) -> bool {
        self.receipts.contains_key(account)
    }

    pub fn receipt(&self, account: &Address) -> Option<&VoteReceipt> {
        self.receipts.get(account)
    }
}
