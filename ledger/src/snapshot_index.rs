//! Historical voting-power index.
//!
//! Per-account voting-power histories plus a total-supply history, all keyed
//! by the ledger's sequence clock. Proposals read power "as of" their
//! snapshot sequence from here, so balance changes made afterwards (including
//! borrow-vote-return within a voting window) never reach a tally.

use crate::checkpoint::{Checkpoint, CheckpointHistory};
use agora_types::{Address, Sequence};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct SnapshotIndex {
    power: HashMap<Address, CheckpointHistory>,
    supply: CheckpointHistory,
}

impl SnapshotIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        power: HashMap<Address, CheckpointHistory>,
        supply: CheckpointHistory,
    ) -> Self {
        Self { power, supply }
    }

    /// Record the voting power of `account` at `sequence`.
    pub fn record_power(&mut self, account: &Address, sequence: Sequence, power: u128) {
        tracing::debug!(account = %account, sequence, power, "voting power checkpoint");
        self.power
            .entry(account.clone())
            .or_default()
            .push(sequence, power);
    }

    /// Record the total supply at `sequence`.
    pub fn record_supply(&mut self, sequence: Sequence, supply: u128) {
        self.supply.push(sequence, supply);
    }

    /// Latest voting power of `account`, or zero.
    pub fn power_now(&self, account: &Address) -> u128 {
        self.power.get(account).map_or(0, CheckpointHistory::latest)
    }

    /// Voting power of `account` in force at `sequence`.
    pub fn power_at(&self, account: &Address, sequence: Sequence) -> u128 {
        self.power.get(account).map_or(0, |h| h.at(sequence))
    }

    /// Total supply in force at `sequence`.
    pub fn total_supply_at(&self, sequence: Sequence) -> u128 {
        self.supply.at(sequence)
    }

    pub fn checkpoints(&self, account: &Address) -> &[Checkpoint] {
        self.power
            .get(account)
            .map(CheckpointHistory::as_slice)
            .unwrap_or(&[])
    }

    pub fn supply_checkpoints(&self) -> &[Checkpoint] {
        self.supply.as_slice()
    }

    /// Accounts with at least one voting-power checkpoint.
    pub fn accounts(&self) -> impl Iterator<Item = &Address> {
        self.power.keys()
    }
}
