//! Per-account ledger record.

use agora_types::Address;
use serde::{Deserialize, Serialize};

/// Balance and delegation edge of a single account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Token balance in base units.
    pub balance: u128,
    /// Where this account's balance counts as voting power.
    /// `None` until the account opts in by delegating (possibly to itself).
    pub delegate: Option<Address>,
}

impl AccountState {
    /// An account record carrying no information.
    pub fn is_empty(&self) -> bool {
        self.balance == 0 && self.delegate.is_none()
    }
}
