//! Ledger snapshots — capture the full ledger state at a sequence.
//!
//! A snapshot holds the logical tables (accounts, allowances, checkpoints)
//! in address order, so two replicas at the same sequence produce identical
//! bytes and an identical hash. Restoring a snapshot yields a ledger that
//! behaves exactly like the one it was taken from.

use std::collections::{BTreeSet, HashMap};

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};

use crate::account::AccountState;
use crate::checkpoint::{Checkpoint, CheckpointHistory};
use crate::clock::SequenceClock;
use crate::error::LedgerError;
use crate::ledger::TokenLedger;
use crate::snapshot_index::SnapshotIndex;
use agora_types::{Address, Sequence};

const SNAPSHOT_VERSION: u32 = 1;

/// A ledger snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Blake2b-256 over every other field.
    pub hash: [u8; 32],
    /// Sequence clock value at capture time.
    pub sequence: Sequence,
    pub total_supply: u128,
    /// Accounts sorted by address.
    pub accounts: Vec<AccountSnapshot>,
    /// Allowances sorted by `(owner, spender)`.
    pub allowances: Vec<AllowanceSnapshot>,
    pub supply_checkpoints: Vec<Checkpoint>,
    pub version: u32,
}

/// One account row: balance, delegate and voting-power history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub address: Address,
    pub balance: u128,
    pub delegate: Option<Address>,
    pub checkpoints: Vec<Checkpoint>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceSnapshot {
    pub owner: Address,
    pub spender: Address,
    pub amount: u128,
}

impl LedgerSnapshot {
    /// Capture the current state of `ledger`.
    pub fn create(ledger: &TokenLedger) -> Self {
        let addresses: BTreeSet<&Address> = ledger
            .accounts()
            .map(|(address, _)| address)
            .chain(ledger.index().accounts())
            .collect();

        let accounts = addresses
            .into_iter()
            .map(|address| AccountSnapshot {
                address: address.clone(),
                balance: ledger.balance_of(address),
                delegate: ledger.delegates(address).cloned(),
                checkpoints: ledger.checkpoints(address).to_vec(),
            })
            .filter(|a| a.balance != 0 || a.delegate.is_some() || !a.checkpoints.is_empty())
            .collect();

        let mut allowances: Vec<AllowanceSnapshot> = ledger
            .allowances()
            .map(|((owner, spender), amount)| AllowanceSnapshot {
                owner: owner.clone(),
                spender: spender.clone(),
                amount: *amount,
            })
            .collect();
        allowances.sort_by(|a, b| (&a.owner, &a.spender).cmp(&(&b.owner, &b.spender)));

        let mut snap = Self {
            hash: [0u8; 32],
            sequence: ledger.snapshot(),
            total_supply: ledger.total_supply(),
            accounts,
            allowances,
            supply_checkpoints: ledger.index().supply_checkpoints().to_vec(),
            version: SNAPSHOT_VERSION,
        };
        snap.hash = snap.compute_hash();
        snap
    }

    /// Compute the Blake2b-256 hash of this snapshot deterministically.
    fn compute_hash(&self) -> [u8; 32] {
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.sequence.to_le_bytes());
        hasher.update(self.total_supply.to_le_bytes());

        hasher.update((self.accounts.len() as u64).to_le_bytes());
        for account in &self.accounts {
            hash_address(&mut hasher, &account.address);
            hasher.update(account.balance.to_le_bytes());
            match &account.delegate {
                Some(delegate) => {
                    hasher.update([1u8]);
                    hash_address(&mut hasher, delegate);
                }
                None => hasher.update([0u8]),
            }
            hash_checkpoints(&mut hasher, &account.checkpoints);
        }

        hasher.update((self.allowances.len() as u64).to_le_bytes());
        for allowance in &self.allowances {
            hash_address(&mut hasher, &allowance.owner);
            hash_address(&mut hasher, &allowance.spender);
            hasher.update(allowance.amount.to_le_bytes());
        }

        hash_checkpoints(&mut hasher, &self.supply_checkpoints);

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Verify the snapshot hash matches the data.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Serialize the snapshot to bytes (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Deserialize a snapshot from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Number of accounts in this snapshot.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Rebuild the ledger this snapshot was taken from.
    pub fn restore(&self) -> Result<TokenLedger, LedgerError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(LedgerError::CorruptSnapshot(format!(
                "unsupported version {}",
                self.version
            )));
        }
        if !self.verify() {
            return Err(LedgerError::CorruptSnapshot("hash mismatch".into()));
        }

        let mut accounts = HashMap::new();
        let mut power = HashMap::new();
        let mut balance_sum = 0u128;
        for row in &self.accounts {
            if row.checkpoints.last().is_some_and(|c| c.sequence > self.sequence) {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "checkpoint of {} is ahead of the clock",
                    row.address
                )));
            }
            let history = CheckpointHistory::from_checkpoints(row.checkpoints.clone())
                .ok_or_else(|| {
                    LedgerError::CorruptSnapshot(format!("unordered checkpoints for {}", row.address))
                })?;
            if !history.is_empty() {
                power.insert(row.address.clone(), history);
            }
            let state = AccountState {
                balance: row.balance,
                delegate: row.delegate.clone(),
            };
            if !state.is_empty() {
                balance_sum = balance_sum
                    .checked_add(state.balance)
                    .ok_or(LedgerError::Overflow)?;
                accounts.insert(row.address.clone(), state);
            }
        }
        if balance_sum != self.total_supply {
            return Err(LedgerError::CorruptSnapshot(format!(
                "balances sum to {balance_sum}, supply is {}",
                self.total_supply
            )));
        }

        let supply = CheckpointHistory::from_checkpoints(self.supply_checkpoints.clone())
            .ok_or_else(|| LedgerError::CorruptSnapshot("unordered supply checkpoints".into()))?;

        let allowances = self
            .allowances
            .iter()
            .map(|a| ((a.owner.clone(), a.spender.clone()), a.amount))
            .collect();

        Ok(TokenLedger::from_parts(
            accounts,
            allowances,
            self.total_supply,
            SequenceClock::starting_at(self.sequence),
            SnapshotIndex::from_parts(power, supply),
        ))
    }
}

fn hash_address(hasher: &mut Blake2b<U32>, address: &Address) {
    let bytes = address.as_str().as_bytes();
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn hash_checkpoints(hasher: &mut Blake2b<U32>, checkpoints: &[Checkpoint]) {
    hasher.update((checkpoints.len() as u64).to_le_bytes());
    for c in checkpoints {
        hasher.update(c.sequence.to_le_bytes());
        hasher.update(c.value.to_le_bytes());
    }
}
