//! Typed read model of a proposal, published for display collaborators.

use crate::params::GovernorParams;
use crate::proposal::Proposal;
use agora_types::{Address, ProposalId, ProposalState, Sequence, Timestamp, VotingType};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSummary {
    pub id: ProposalId,
    pub proposer: Address,
    pub description: String,
    pub voting_type: VotingType,
    pub state: ProposalState,
    pub against: u128,
    #[serde(rename = "for")]
    pub for_votes: u128,
    pub abstain: u128,
    pub snapshot: Sequence,
    pub vote_start: Timestamp,
    pub vote_end: Timestamp,
    pub quorum: u128,
    pub participation: u128,
    pub voters: usize,
    pub eta: Option<Timestamp>,
}

impl ProposalSummary {
    pub fn project(proposal: &Proposal, now: Timestamp, params: &GovernorParams) -> Self {
        let (against, for_votes, abstain) = proposal.tally.as_tuple();
        Self {
            id: proposal.id,
            proposer: proposal.proposer.clone(),
            description: proposal.description.clone(),
            voting_type: proposal.voting_type,
            state: proposal.state(now, params),
            against,
            for_votes,
            abstain,
            snapshot: proposal.snapshot,
            vote_start: proposal.vote_start,
            vote_end: proposal.vote_end,
            quorum: proposal.quorum,
            participation: proposal.participation,
            voters: proposal.receipts.len(),
            eta: proposal.eta,
        }
    }
}
