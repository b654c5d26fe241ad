//! Daemon configuration: governor parameters, genesis allocations and
//! logging, loaded from TOML.

use agora_governance::GovernorParams;
use agora_ledger::GenesisConfig;
use agora_types::Address;
use agora_utils::LogFormat;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgoraConfig {
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Filter directive, e.g. `"info"` or `"warn,agora_governance=debug"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub governor: GovernorParams,

    #[serde(default = "default_genesis")]
    pub genesis: GenesisConfig,
}

fn default_log_format() -> LogFormat {
    LogFormat::Human
}

fn default_log_level() -> String {
    "info".into()
}

fn default_genesis() -> GenesisConfig {
    GenesisConfig::dev(Address::new("deployer"), 1_000_000)
}

impl AgoraConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse configuration from a TOML string. The governor parameters are
    /// validated.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.governor.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for AgoraConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            log_level: default_log_level(),
            governor: GovernorParams::default(),
            genesis: default_genesis(),
        }
    }
}
