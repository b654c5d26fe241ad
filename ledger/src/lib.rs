//! Delegatable balance ledger.
//!
//! Holds balances, allowances and delegation edges, and turns them into
//! voting power. Every mutating operation advances a logical sequence clock;
//! voting power is checkpointed against that clock so it can be read back
//! "as of" any earlier sequence.
//!
//! Delegation is one hop: a delegator's balance counts toward its immediate
//! delegate only. An account that never delegated (not even to itself) has no
//! voting power.

pub mod account;
pub mod checkpoint;
pub mod clock;
pub mod error;
pub mod genesis;
pub mod ledger;
pub mod snapshot;
pub mod snapshot_index;

pub use account::AccountState;
pub use checkpoint::{Checkpoint, CheckpointHistory};
pub use clock::SequenceClock;
pub use error::LedgerError;
pub use genesis::{GenesisAllocation, GenesisConfig};
pub use ledger::TokenLedger;
pub use snapshot::{AccountSnapshot, AllowanceSnapshot, LedgerSnapshot};
pub use snapshot_index::SnapshotIndex;
