//! Operation-log replay and snapshot inspection.

use crate::config::AgoraConfig;
use agora_governance::{
    ExecutionError, Governor, OperationRecord, ProposalAction, ProposalExecutor, ProposalSummary,
    ReplayReport,
};
use agora_types::{Address, ProposalId, Timestamp};
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Read a JSON-lines operation log. Blank lines and `#` comments are
/// skipped.
pub fn read_log(path: &Path) -> anyhow::Result<Vec<OperationRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading operation log {}", path.display()))?;
    parse_log(&content).with_context(|| format!("parsing operation log {}", path.display()))
}

pub fn parse_log(content: &str) -> anyhow::Result<Vec<OperationRecord>> {
    content
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| serde_json::from_str(line).with_context(|| format!("line {n}")))
        .collect()
}

/// Executes nothing; logs each action a passed proposal would run.
#[derive(Default)]
pub struct LogExecutor {
    executed: usize,
}

impl ProposalExecutor for LogExecutor {
    fn execute(&mut self, id: &ProposalId, actions: &[ProposalAction]) -> Result<(), ExecutionError> {
        for (i, action) in actions.iter().enumerate() {
            tracing::info!(
                proposal = %id,
                action = i,
                target = %action.target,
                value = action.value,
                calldata = %hex::encode(&action.calldata),
                "proposal action"
            );
        }
        self.executed += 1;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct RejectionView {
    pub index: usize,
    pub operation: &'static str,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct AccountView {
    pub account: Address,
    pub balance: u128,
    pub voting_power: u128,
    pub delegate: Option<Address>,
}

/// What `replay` and `inspect` print.
#[derive(Debug, Serialize)]
pub struct StateReport {
    pub at: Timestamp,
    pub sequence: u64,
    pub total_supply: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectionView>,
    pub proposals: Vec<ProposalSummary>,
    pub accounts: Vec<AccountView>,
}

impl StateReport {
    pub fn capture(governor: &Governor, at: Timestamp) -> Self {
        let ledger = governor.ledger();
        let known: BTreeSet<&Address> = ledger
            .accounts()
            .map(|(a, _)| a)
            .chain(ledger.index().accounts())
            .collect();
        let accounts = known
            .into_iter()
            .map(|account| AccountView {
                account: account.clone(),
                balance: ledger.balance_of(account),
                voting_power: ledger.voting_power_now(account),
                delegate: ledger.delegates(account).cloned(),
            })
            .collect();
        Self {
            at,
            sequence: ledger.snapshot(),
            total_supply: ledger.total_supply(),
            applied: None,
            rejected: Vec::new(),
            proposals: governor.proposals(at),
            accounts,
        }
    }

    pub fn with_replay(mut self, report: &ReplayReport) -> Self {
        self.applied = Some(report.applied);
        self.rejected = report
            .rejected
            .iter()
            .map(|r| RejectionView {
                index: r.index,
                operation: r.operation,
                error: r.error.to_string(),
            })
            .collect();
        self
    }
}

/// Build the governor from genesis and apply `records`. Reads are taken at
/// `at`, or at the last record's time.
pub fn replay(
    config: &AgoraConfig,
    records: &[OperationRecord],
    at: Option<Timestamp>,
) -> anyhow::Result<(Governor, StateReport)> {
    let mut governor = Governor::from_genesis(config.governor.clone(), &config.genesis)
        .context("building governor from genesis")?;
    let mut executor = LogExecutor::default();
    let report = governor.replay(records, &mut executor);
    tracing::info!(executed = executor.executed, "replay executed proposals");

    let at = at
        .or_else(|| records.iter().map(|r| r.at).max())
        .unwrap_or(Timestamp::EPOCH);
    let state = StateReport::capture(&governor, at).with_replay(&report);
    Ok((governor, state))
}

pub fn save_snapshot(governor: &Governor, path: &Path) -> anyhow::Result<()> {
    let bytes = governor.save_state()?;
    std::fs::write(path, bytes).with_context(|| format!("writing snapshot {}", path.display()))?;
    tracing::info!(path = %path.display(), "snapshot saved");
    Ok(())
}

pub fn load_snapshot(path: &Path) -> anyhow::Result<Governor> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading snapshot {}", path.display()))?;
    let governor = Governor::load_state(&bytes)
        .with_context(|| format!("restoring snapshot {}", path.display()))?;
    Ok(governor)
}
