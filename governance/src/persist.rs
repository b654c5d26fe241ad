//! Governor snapshots: parameters, ledger tables and proposals, saved with
//! bincode so a node can restart without replaying the whole log.

use crate::error::GovernanceError;
use crate::governor::Governor;
use crate::params::GovernorParams;
use crate::proposal::Proposal;
use crate::registry::ProposalRegistry;
use agora_ledger::LedgerSnapshot;
use serde::{Deserialize, Serialize};

const GOVERNOR_SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorSnapshot {
    pub version: u32,
    pub params: GovernorParams,
    pub ledger: LedgerSnapshot,
    /// Proposals in creation order.
    pub proposals: Vec<Proposal>,
}

impl GovernorSnapshot {
    pub fn create(governor: &Governor) -> Self {
        Self {
            version: GOVERNOR_SNAPSHOT_VERSION,
            params: governor.params().clone(),
            ledger: LedgerSnapshot::create(governor.ledger()),
            proposals: governor.registry().iter().cloned().collect(),
        }
    }

    /// Rebuild the governor. Fails on a foreign version, a ledger that does
    /// not verify, or a proposal snapshotted after the ledger's clock.
    pub fn restore(&self) -> Result<Governor, GovernanceError> {
        if self.version != GOVERNOR_SNAPSHOT_VERSION {
            return Err(GovernanceError::Snapshot(format!(
                "unsupported version {}",
                self.version
            )));
        }
        let ledger = self.ledger.restore()?;
        if let Some(p) = self
            .proposals
            .iter()
            .find(|p| p.snapshot > ledger.snapshot())
        {
            return Err(GovernanceError::Snapshot(format!(
                "proposal {} is snapshotted at {} but the ledger is at {}",
                p.id,
                p.snapshot,
                ledger.snapshot()
            )));
        }
        let registry = ProposalRegistry::from_proposals(self.proposals.clone())?;
        Governor::from_parts(self.params.clone(), ledger, registry)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(self).map_err(|e| GovernanceError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GovernanceError> {
        bincode::deserialize(bytes).map_err(|e| GovernanceError::Snapshot(e.to_string()))
    }
}

impl Governor {
    /// Serialize the full governor state.
    pub fn save_state(&self) -> Result<Vec<u8>, GovernanceError> {
        GovernorSnapshot::create(self).to_bytes()
    }

    /// Restore a governor saved with [`Governor::save_state`].
    pub fn load_state(bytes: &[u8]) -> Result<Self, GovernanceError> {
        GovernorSnapshot::from_bytes(bytes)?.restore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::ProposalRequest;
    use agora_ledger::GenesisConfig;
    use agora_types::{Address, ProposalState, Support, Timestamp, VotingType};

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn busy_governor() -> Governor {
        let mut gov =
            Governor::from_genesis(GovernorParams::default(), &GenesisConfig::dev(addr("alice"), 100))
                .unwrap();
        gov.transfer(&addr("alice"), &addr("bob"), 40).unwrap();
        gov.delegate(&addr("bob"), &addr("alice")).unwrap();
        let custody = gov.params().custody_account.clone();
        gov.approve(&addr("alice"), &custody, 16).unwrap();
        let id = gov
            .propose(
                &addr("alice"),
                ProposalRequest {
                    targets: vec![addr("token")],
                    values: vec![0],
                    calldatas: vec![vec![1]],
                    description: "persisted".into(),
                    voting_type: VotingType::Quadratic,
                },
                Timestamp::EPOCH,
            )
            .unwrap();
        let open = Timestamp::EPOCH.plus(gov.params().voting_delay_secs);
        gov.cast_vote_quadratic(&id, &addr("alice"), Support::For, 4, open)
            .unwrap();
        gov
    }

    #[test]
    fn save_and_load_preserve_everything() {
        let gov = busy_governor();
        let bytes = gov.save_state().unwrap();
        let restored = Governor::load_state(&bytes).unwrap();

        assert_eq!(GovernorSnapshot::create(&restored), GovernorSnapshot::create(&gov));
        assert_eq!(restored.balance_of(&addr("alice")), 44);
        assert_eq!(restored.voting_power_now(&addr("alice")), 84);

        let id = gov.registry().iter().next().unwrap().id;
        assert_eq!(restored.proposal_votes(&id).unwrap(), (0, 4, 0));
        assert!(restored.has_voted(&id, &addr("alice")).unwrap());
        let end = restored.proposal(&id).unwrap().vote_end;
        assert_eq!(restored.state(&id, end).unwrap(), ProposalState::Succeeded);
    }

    #[test]
    fn proposal_ahead_of_ledger_is_rejected() {
        let gov = busy_governor();
        let mut snapshot = GovernorSnapshot::create(&gov);
        snapshot.proposals[0].snapshot = snapshot.ledger.sequence + 1;
        assert!(matches!(snapshot.restore(), Err(GovernanceError::Snapshot(_))));
    }

    #[test]
    fn garbage_bytes_fail_cleanly() {
        assert!(matches!(
            Governor::load_state(&[1, 2, 3]),
            Err(GovernanceError::Snapshot(_))
        ));
    }
}
