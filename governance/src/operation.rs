//! The ordered operation log.
//!
//! An external sequencer hands the governor a totally ordered stream of
//! signed-off operations. Each record is applied atomically; a rejected
//! record changes nothing. Replaying the same log from the same genesis
//! always reproduces the same governor.

use crate::error::GovernanceError;
use crate::executor::ProposalExecutor;
use crate::governor::Governor;
use crate::proposal::{ProposalRequest, VoteReceipt};
use agora_types::{Address, ProposalId, Sequence, Support, Timestamp, VotingType};
use serde::{Deserialize, Serialize};

/// One operation, in wire shape: support and voting type are raw numbers
/// and calldata is hex, exactly as collaborators submit them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Only the custody account may mint.
    Mint { to: Address, amount: u128 },
    Transfer { to: Address, amount: u128 },
    Approve { spender: Address, amount: u128 },
    Burn { amount: u128 },
    Delegate { to: Address },
    Propose {
        targets: Vec<Address>,
        values: Vec<u128>,
        calldatas: Vec<String>,
        description: String,
        #[serde(default)]
        voting_type: u8,
    },
    CastVote { proposal_id: ProposalId, support: u8 },
    CastVoteQuadratic {
        proposal_id: ProposalId,
        support: u8,
        num_votes: u128,
    },
    Cancel { proposal_id: ProposalId },
    Queue { proposal_id: ProposalId },
    Execute { proposal_id: ProposalId },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::Transfer { .. } => "transfer",
            Self::Approve { .. } => "approve",
            Self::Burn { .. } => "burn",
            Self::Delegate { .. } => "delegate",
            Self::Propose { .. } => "propose",
            Self::CastVote { .. } => "cast_vote",
            Self::CastVoteQuadratic { .. } => "cast_vote_quadratic",
            Self::Cancel { .. } => "cancel",
            Self::Queue { .. } => "queue",
            Self::Execute { .. } => "execute",
        }
    }
}

/// An operation as sequenced: who sent it and at what time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub sender: Address,
    pub at: Timestamp,
    pub operation: Operation,
}

impl OperationRecord {
    pub fn new(sender: impl Into<Address>, at: Timestamp, operation: Operation) -> Self {
        Self {
            sender: sender.into(),
            at,
            operation,
        }
    }
}

/// What an applied operation produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A ledger operation committed at this sequence.
    Ledger(Sequence),
    Proposed(ProposalId),
    Voted(VoteReceipt),
    Canceled,
    Queued { eta: Timestamp },
    Executed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOperation {
    /// Position of the record in the replayed log.
    pub index: usize,
    pub operation: &'static str,
    pub error: GovernanceError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub applied: usize,
    pub rejected: Vec<RejectedOperation>,
}

impl ReplayReport {
    pub fn total(&self) -> usize {
        self.applied + self.rejected.len()
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl Governor {
    /// Apply one sequenced operation.
    pub fn apply(
        &mut self,
        record: &OperationRecord,
        executor: &mut dyn ProposalExecutor,
    ) -> Result<Outcome, GovernanceError> {
        self.authorize(record)?;
        let sender = &record.sender;
        let now = record.at;

        match &record.operation {
            Operation::Mint { to, amount } => self.mint(to, *amount).map(Outcome::Ledger),
            Operation::Transfer { to, amount } => {
                self.transfer(sender, to, *amount).map(Outcome::Ledger)
            }
            Operation::Approve { spender, amount } => {
                self.approve(sender, spender, *amount).map(Outcome::Ledger)
            }
            Operation::Burn { amount } => self.burn(sender, *amount).map(Outcome::Ledger),
            Operation::Delegate { to } => self.delegate(sender, to).map(Outcome::Ledger),
            Operation::Propose {
                targets,
                values,
                calldatas,
                description,
                voting_type,
            } => {
                let request = ProposalRequest {
                    targets: targets.clone(),
                    values: values.clone(),
                    calldatas: calldatas
                        .iter()
                        .map(|c| decode_calldata(c))
                        .collect::<Result<_, _>>()?,
                    description: description.clone(),
                    voting_type: VotingType::try_from(*voting_type)?,
                };
                self.propose(sender, request, now).map(Outcome::Proposed)
            }
            Operation::CastVote {
                proposal_id,
                support,
            } => {
                let support = Support::try_from(*support)?;
                self.cast_vote(proposal_id, sender, support, now)
                    .map(Outcome::Voted)
            }
            Operation::CastVoteQuadratic {
                proposal_id,
                support,
                num_votes,
            } => {
                let support = Support::try_from(*support)?;
                self.cast_vote_quadratic(proposal_id, sender, support, *num_votes, now)
                    .map(Outcome::Voted)
            }
            Operation::Cancel { proposal_id } => self
                .cancel(proposal_id, sender, now)
                .map(|()| Outcome::Canceled),
            Operation::Queue { proposal_id } => self
                .queue(proposal_id, now)
                .map(|eta| Outcome::Queued { eta }),
            Operation::Execute { proposal_id } => self
                .execute(proposal_id, now, executor)
                .map(|()| Outcome::Executed),
        }
    }

    /// Minting belongs to the custody account, and the custody account
    /// may do nothing else.
    fn authorize(&self, record: &OperationRecord) -> Result<(), GovernanceError> {
        let is_custody = record.sender == self.params().custody_account;
        let is_mint = matches!(record.operation, Operation::Mint { .. });
        match (is_mint, is_custody) {
            (true, false) => Err(GovernanceError::Unauthorized(
                record.sender.as_str().to_string(),
            )),
            (false, true) => Err(GovernanceError::ReservedAccount(
                record.sender.as_str().to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Apply `records` in order, skipping (and reporting) rejected ones.
    pub fn replay<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a OperationRecord>,
        executor: &mut dyn ProposalExecutor,
    ) -> ReplayReport {
        let mut report = ReplayReport::default();
        for (index, record) in records.into_iter().enumerate() {
            match self.apply(record, executor) {
                Ok(_) => report.applied += 1,
                Err(error) => {
                    tracing::warn!(
                        index,
                        sender = %record.sender,
                        operation = record.operation.name(),
                        error = %error,
                        "operation rejected"
                    );
                    report.rejected.push(RejectedOperation {
                        index,
                        operation: record.operation.name(),
                        error,
                    });
                }
            }
        }
        tracing::info!(
            applied = report.applied,
            rejected = report.rejected.len(),
            "replay finished"
        );
        report
    }
}

fn decode_calldata(text: &str) -> Result<Vec<u8>, GovernanceError> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|e| GovernanceError::InvalidCalldata(format!("{text:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutionError;
    use crate::params::GovernorParams;
    use crate::proposal::ProposalAction;
    use agora_ledger::GenesisConfig;

    struct Accept;

    impl ProposalExecutor for Accept {
        fn execute(&mut self, _: &ProposalId, _: &[ProposalAction]) -> Result<(), ExecutionError> {
            Ok(())
        }
    }

    fn governor() -> Governor {
        Governor::from_genesis(
            GovernorParams::default(),
            &GenesisConfig::dev(Address::new("alice"), 100),
        )
        .unwrap()
    }

    fn propose_op(description: &str, voting_type: u8) -> Operation {
        Operation::Propose {
            targets: vec![Address::new("token")],
            values: vec![0],
            calldatas: vec!["0xa9059cbb".into()],
            description: description.into(),
            voting_type,
        }
    }

    #[test]
    fn records_parse_from_json_lines() {
        let line = r#"{"sender":"alice","at":5,"operation":{"cast_vote":{"proposal_id":"0101010101010101010101010101010101010101010101010101010101010101","support":1}}}"#;
        let record: OperationRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.sender, Address::new("alice"));
        assert_eq!(record.at, Timestamp::new(5));
        assert_eq!(
            record.operation,
            Operation::CastVote {
                proposal_id: ProposalId::new([1; 32]),
                support: 1
            }
        );

        let line = r#"{"sender":"bob","at":0,"operation":{"transfer":{"to":"carol","amount":340282366920938463463374607431768211455}}}"#;
        let record: OperationRecord = serde_json::from_str(line).unwrap();
        assert_eq!(
            record.operation,
            Operation::Transfer {
                to: Address::new("carol"),
                amount: u128::MAX
            }
        );
    }

    #[test]
    fn propose_defaults_to_standard_voting() {
        let line = r#"{"propose":{"targets":["token"],"values":[0],"calldatas":["00"],"description":"d"}}"#;
        let op: Operation = serde_json::from_str(line).unwrap();
        assert!(matches!(op, Operation::Propose { voting_type: 0, .. }));
    }

    #[test]
    fn apply_decodes_wire_values() {
        let mut gov = governor();
        let mut exec = Accept;
        let record = OperationRecord::new("alice", Timestamp::EPOCH, propose_op("p", 7));
        assert_eq!(gov.apply(&record, &mut exec), Err(GovernanceError::InvalidVotingType(7)));

        let record = OperationRecord::new("alice", Timestamp::EPOCH, propose_op("p", 0));
        let Outcome::Proposed(id) = gov.apply(&record, &mut exec).unwrap() else {
            panic!("expected a proposal");
        };

        let at = Timestamp::EPOCH.plus(gov.params().voting_delay_secs);
        let vote = |support| {
            OperationRecord::new("alice", at, Operation::CastVote { proposal_id: id, support })
        };
        assert_eq!(gov.apply(&vote(3), &mut exec), Err(GovernanceError::InvalidSupportValue(3)));
        assert!(matches!(gov.apply(&vote(1), &mut exec), Ok(Outcome::Voted(_))));
        assert_eq!(gov.proposal_votes(&id).unwrap(), (0, 100, 0));
    }

    #[test]
    fn bad_calldata_is_rejected() {
        let mut gov = governor();
        let op = Operation::Propose {
            targets: vec![Address::new("token")],
            values: vec![0],
            calldatas: vec!["0xzz".into()],
            description: "p".into(),
            voting_type: 0,
        };
        let err = gov
            .apply(&OperationRecord::new("alice", Timestamp::EPOCH, op), &mut Accept)
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidCalldata(_)));
        assert!(gov.registry().is_empty());
    }

    #[test]
    fn custody_account_is_reserved() {
        let mut gov = governor();
        let custody = gov.params().custody_account.clone();

        let mint = |sender: &Address| {
            OperationRecord::new(
                sender.clone(),
                Timestamp::EPOCH,
                Operation::Mint { to: Address::new("bob"), amount: 10 },
            )
        };
        let err = gov.apply(&mint(&Address::new("alice")), &mut Accept).unwrap_err();
        assert_eq!(err, GovernanceError::Unauthorized("alice".into()));
        gov.apply(&mint(&custody), &mut Accept).unwrap();
        assert_eq!(gov.balance_of(&Address::new("bob")), 10);

        let drain = OperationRecord::new(
            custody.clone(),
            Timestamp::EPOCH,
            Operation::Transfer { to: Address::new("bob"), amount: 1 },
        );
        let err = gov.apply(&drain, &mut Accept).unwrap_err();
        assert!(matches!(err, GovernanceError::ReservedAccount(_)));
    }

    #[test]
    fn replay_reports_rejections_and_continues() {
        let mut gov = governor();
        let log = vec![
            OperationRecord::new("alice", Timestamp::EPOCH, Operation::Transfer {
                to: Address::new("bob"),
                amount: 30,
            }),
            OperationRecord::new("bob", Timestamp::EPOCH, Operation::Burn { amount: 31 }),
            OperationRecord::new("bob", Timestamp::EPOCH, Operation::Delegate {
                to: Address::new("bob"),
            }),
        ];
        let report = gov.replay(&log, &mut Accept);
        assert_eq!(report.applied, 2);
        assert_eq!(report.total(), 3);
        assert!(!report.is_clean());
        assert_eq!(report.rejected[0].index, 1);
        assert_eq!(report.rejected[0].operation, "burn");
        assert_eq!(
            report.rejected[0].error,
            GovernanceError::InsufficientBalance { needed: 31, available: 30 }
        );
        assert_eq!(gov.voting_power_now(&Address::new("bob")), 30);
    }
}
