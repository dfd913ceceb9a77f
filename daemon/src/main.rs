//! guardian-gov: operator CLI for the Guardian governance engine.

mod cli;
mod commands;
mod config;
mod executor;
mod roster;

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::json;

use guardian_governance::{GovernanceEngine, SystemClock};
use guardian_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment};
use guardian_types::Principal;

use crate::cli::{Cli, Command};
use crate::config::DaemonConfig;
use crate::executor::TracingExecutor;
use crate::roster::RosterAuthorization;

const MAX_DBS: u32 = 8;

fn load_config(cli: &Cli) -> anyhow::Result<DaemonConfig> {
    let mut config = match cli.config {
        Some(ref path) => DaemonConfig::from_toml_file(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(ref dir) = cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    guardian_utils::init_logging(config.log_format, &config.log_level)?;

    if let Some(ref path) = cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    check_data_dir(&config.data_dir).map_err(anyhow::Error::msg)?;
    let env = LmdbEnvironment::open(&config.data_dir, MAX_DBS, config.map_size_bytes())
        .with_context(|| format!("opening database at {}", config.data_dir.display()))?;

    let report = check_integrity(&env)?;
    if let Command::Check = cli.command {
        let output = json!({
            "healthy": report.is_healthy(),
            "databases_checked": report.databases_checked,
            "total_entries": report.total_entries,
            "errors": report.errors,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        if !report.is_healthy() {
            bail!("integrity check found {} problem(s)", report.errors.len());
        }
        return Ok(());
    }
    if !report.is_healthy() {
        for error in &report.errors {
            tracing::error!("{error}");
        }
        bail!("database failed its integrity check; run `guardian-gov check` for details");
    }

    let auth = RosterAuthorization::from_roster(&config.roster)?;
    if !config.roster_size_matches() {
        tracing::warn!(
            configured = auth.guardian_count(),
            policy = config.params.guardian_roster_size,
            "guardian roster size differs from policy"
        );
    }

    let engine = GovernanceEngine::new(env.governance_store(), auth, SystemClock, config.params.clone())?;

    let caller = cli.caller.as_deref().map(Principal::parse).transpose()?;
    let output = commands::run(&engine, &SystemClock, &TracingExecutor, caller.as_ref(), cli.command)?;

    for event in engine.drain_events() {
        tracing::info!(event = ?event, "governance event");
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
