//! Genesis allocations — the initial token distribution.
//!
//! The ledger starts empty; genesis mints each allocation in order and
//! optionally self-delegates it, so the resulting state (clock included) is
//! fully determined by the configuration.

use crate::error::LedgerError;
use crate::ledger::TokenLedger;
use agora_types::Address;
use serde::{Deserialize, Serialize};

/// One initial allocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAllocation {
    pub account: Address,
    /// Amount in base units.
    pub amount: u64,
    /// Delegate the allocation to the account itself at genesis.
    #[serde(default)]
    pub self_delegate: bool,
}

/// Configuration for building the initial ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    #[serde(default)]
    pub allocations: Vec<GenesisAllocation>,
}

impl GenesisConfig {
    /// Development genesis: a single deployer holding the whole supply,
    /// self-delegated.
    pub fn dev(deployer: Address, supply: u64) -> Self {
        Self {
            allocations: vec![GenesisAllocation {
                account: deployer,
                amount: supply,
                self_delegate: true,
            }],
        }
    }

    /// Sum of all allocations.
    pub fn total_supply(&self) -> Result<u128, LedgerError> {
        self.allocations.iter().try_fold(0u128, |acc, a| {
            acc.checked_add(u128::from(a.amount))
                .ok_or(LedgerError::Overflow)
        })
    }

    /// Build the initial ledger.
    pub fn build(&self) -> Result<TokenLedger, LedgerError> {
        let mut ledger = TokenLedger::new();
        for allocation in &self.allocations {
            ledger.mint(&allocation.account, u128::from(allocation.amount))?;
            if allocation.self_delegate {
                ledger.delegate(&allocation.account, &allocation.account)?;
            }
        }
        tracing::info!(
            allocations = self.allocations.len(),
            supply = ledger.total_supply(),
            "genesis ledger built"
        );
        Ok(ledger)
    }
}
