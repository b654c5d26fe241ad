//! Governor parameters: voting window, thresholds, timelock and the
//! quadratic cost policy.
//!
//! Every field has a serde default so a partial `[governor]` table (or an
//! empty one) yields a usable configuration.

use crate::error::GovernanceError;
use agora_types::Address;
use serde::{Deserialize, Serialize};

/// Basis-point denominator (100% = 10 000 bps).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// What happens to the tokens a quadratic voter pays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuadraticCostPolicy {
    /// Cost leaves the total supply.
    #[default]
    Burn,
    /// Cost moves to the custody account and stays in supply.
    Escrow,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorParams {
    /// Review delay between `propose` and the opening of the voting window.
    #[serde(default = "default_voting_delay")]
    pub voting_delay_secs: u64,

    /// Length of the voting window.
    #[serde(default = "default_voting_period")]
    pub voting_period_secs: u64,

    /// Minimum participation, as a share of total supply at the snapshot.
    #[serde(default = "default_quorum_bps")]
    pub quorum_bps: u32,

    /// Share of decisive (for + against) votes that must be For.
    #[serde(default = "default_approval_threshold_bps")]
    pub approval_threshold_bps: u32,

    /// Current voting power a proposer needs. Kept to `u64` so it fits in TOML.
    #[serde(default)]
    pub proposal_threshold: u64,

    /// Delay between `queue` and the earliest `execute`.
    #[serde(default = "default_timelock_delay")]
    pub timelock_delay_secs: u64,

    /// How long a queued proposal stays executable after its eta.
    #[serde(default = "default_grace_period")]
    pub grace_period_secs: u64,

    #[serde(default)]
    pub quadratic_cost_policy: QuadraticCostPolicy,

    /// The governor's own account: quadratic voters approve it, and escrowed
    /// costs land in it.
    #[serde(default = "default_custody_account")]
    pub custody_account: Address,
}

fn default_voting_delay() -> u64 {
    60 // 1 minute
}

fn default_voting_period() -> u64 {
    3 * 24 * 3600 // 3 days
}

fn default_quorum_bps() -> u32 {
    400 // 4%
}

fn default_approval_threshold_bps() -> u32 {
    5_000 // simple majority
}

fn default_timelock_delay() -> u64 {
    24 * 3600
}

fn default_grace_period() -> u64 {
    14 * 24 * 3600
}

fn default_custody_account() -> Address {
    Address::new("governor")
}

impl GovernorParams {
    /// Reject parameters the state machine cannot work with.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.voting_period_secs == 0 {
            return Err(GovernanceError::Config(
                "voting_period_secs must be greater than zero".into(),
            ));
        }
        if self.quorum_bps > BPS_DENOMINATOR {
            return Err(GovernanceError::Config(format!(
                "quorum_bps {} exceeds {BPS_DENOMINATOR}",
                self.quorum_bps
            )));
        }
        if self.approval_threshold_bps > BPS_DENOMINATOR {
            return Err(GovernanceError::Config(format!(
                "approval_threshold_bps {} exceeds {BPS_DENOMINATOR}",
                self.approval_threshold_bps
            )));
        }
        if !self.custody_account.is_valid() {
            return Err(GovernanceError::Config(format!(
                "custody_account {:?} is not a valid address",
                self.custody_account.as_str()
            )));
        }
        Ok(())
    }

    pub fn proposal_threshold(&self) -> u128 {
        u128::from(self.proposal_threshold)
    }

    /// Quorum for a proposal whose snapshot saw `total_supply`.
    pub fn quorum_for(&self, total_supply: u128) -> u128 {
        bps_of(total_supply, self.quorum_bps)
    }

    /// Parse parameters from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        toml::from_str(s).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    /// Serialize the parameters to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Config(e.to_string()))
    }
}

impl Default for GovernorParams {
    fn default() -> Self {
        Self {
            voting_delay_secs: default_voting_delay(),
            voting_period_secs: default_voting_period(),
            quorum_bps: default_quorum_bps(),
            approval_threshold_bps: default_approval_threshold_bps(),
            proposal_threshold: 0,
            timelock_delay_secs: default_timelock_delay(),
            grace_period_secs: default_grace_period(),
            quadratic_cost_policy: QuadraticCostPolicy::default(),
            custody_account: default_custody_account(),
        }
    }
}

/// `floor(amount * bps / 10 000)` without overflowing for any `u128`.
pub fn bps_of(amount: u128, bps: u32) -> u128 {
    let denom = u128::from(BPS_DENOMINATOR);
    let bps = u128::from(bps.min(BPS_DENOMINATOR));
    (amount / denom) * bps + (amount % denom) * bps / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_round_trip_through_toml() {
        let params = GovernorParams::default();
        let text = params.to_toml_string().unwrap();
        let parsed = GovernorParams::from_toml_str(&text).unwrap();
        assert_eq!(parsed, params);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let params = GovernorParams::from_toml_str("").unwrap();
        assert_eq!(params, GovernorParams::default());
        assert_eq!(params.quadratic_cost_policy, QuadraticCostPolicy::Burn);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            quorum_bps = 1000
            quadratic_cost_policy = "escrow"
            custody_account = "treasury"
        "#;
        let params = GovernorParams::from_toml_str(toml).unwrap();
        assert_eq!(params.quorum_bps, 1000);
        assert_eq!(params.quadratic_cost_policy, QuadraticCostPolicy::Escrow);
        assert_eq!(params.custody_account, Address::new("treasury"));
        assert_eq!(params.voting_period_secs, default_voting_period());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut params = GovernorParams::default();
        assert!(params.validate().is_ok());

        params.quorum_bps = 10_001;
        assert!(matches!(params.validate(), Err(GovernanceError::Config(_))));

        params.quorum_bps = 400;
        params.voting_period_secs = 0;
        assert!(matches!(params.validate(), Err(GovernanceError::Config(_))));

        params.voting_period_secs = 10;
        params.approval_threshold_bps = 20_000;
        assert!(params.validate().is_err());
    }

    #[test]
    fn bps_of_is_exact_floor() {
        assert_eq!(bps_of(100, 400), 4);
        assert_eq!(bps_of(99, 5_000), 49);
        assert_eq!(bps_of(12_345, 10_000), 12_345);
        assert_eq!(bps_of(u128::MAX, 10_000), u128::MAX);
        assert_eq!(bps_of(u128::MAX, 5_000), u128::MAX / 2);
    }
}
