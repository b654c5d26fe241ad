//! Agora — command-line entry point for the governance engine.
//!
//! The engine is a pure state machine; this binary feeds it an ordered
//! operation log, prints the resulting read model, and saves or inspects
//! snapshots.

mod config;
mod replay;

use agora_types::Timestamp;
use agora_utils::{format_duration, LogFormat};
use clap::Parser;
use config::AgoraConfig;
use replay::StateReport;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agora", about = "Agora governance engine")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, global = true, env = "AGORA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "AGORA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "AGORA_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the effective configuration as TOML.
    Config,

    /// Build the governor from genesis and replay an operation log.
    Replay {
        /// JSON-lines file of operation records.
        #[arg(long)]
        log: PathBuf,

        /// Evaluate proposal states at this Unix time (defaults to the last
        /// record's time).
        #[arg(long)]
        at: Option<u64>,

        /// Write a snapshot of the final state here.
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Print the state held in a saved snapshot.
    Inspect {
        #[arg(long)]
        snapshot: PathBuf,

        /// Evaluate proposal states at this Unix time (defaults to now).
        #[arg(long)]
        at: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => AgoraConfig::from_toml_file(path)?,
        None => AgoraConfig::default(),
    };
    let config = AgoraConfig {
        log_format: cli.log_format.unwrap_or(file_config.log_format),
        log_level: cli.log_level.clone().unwrap_or(file_config.log_level.clone()),
        ..file_config
    };

    agora_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }
    tracing::debug!(
        voting_delay = %format_duration(config.governor.voting_delay_secs),
        voting_period = %format_duration(config.governor.voting_period_secs),
        timelock = %format_duration(config.governor.timelock_delay_secs),
        quorum_bps = config.governor.quorum_bps,
        "governor parameters"
    );

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Replay { log, at, save } => {
            let records = replay::read_log(&log)?;
            tracing::info!(records = records.len(), log = %log.display(), "replaying operation log");
            let (governor, state) = replay::replay(&config, &records, at.map(Timestamp::new))?;
            if let Some(path) = save {
                replay::save_snapshot(&governor, &path)?;
            }
            print_report(&state)?;
        }
        Command::Inspect { snapshot, at } => {
            let governor = replay::load_snapshot(&snapshot)?;
            let at = at.map(Timestamp::new).unwrap_or_else(Timestamp::now);
            print_report(&StateReport::capture(&governor, at))?;
        }
    }
    Ok(())
}

fn print_report(report: &StateReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
