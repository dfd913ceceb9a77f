//! Command-line interface definition.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use guardian_governance::{ProposalKind, VoteValue};
use guardian_types::VoterClass;
use guardian_utils::LogFormat;

#[derive(Parser)]
#[command(name = "guardian-gov", about = "Guardian governance operator CLI")]
pub struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "GUARDIAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the governance database.
    #[arg(long, env = "GUARDIAN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "GUARDIAN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "GUARDIAN_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// The acting principal.
    #[arg(long, env = "GUARDIAN_CALLER")]
    pub caller: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Submit a standard proposal.
    Propose {
        #[arg(long, value_enum, default_value_t = KindArg::TreasurySpend)]
        kind: KindArg,
        #[arg(long, default_value = "")]
        narrative: String,
        #[arg(long)]
        target: String,
        #[arg(long, default_value_t = 0)]
        value: u128,
        /// Hex-encoded payload. Empty means a plain value transfer.
        #[arg(long, default_value = "")]
        payload: String,
    },

    /// Submit an emergency proposal (shortened timelock).
    Emergency {
        #[arg(long, default_value = "")]
        narrative: String,
        #[arg(long)]
        target: String,
        #[arg(long, default_value_t = 0)]
        value: u128,
        #[arg(long, default_value = "")]
        payload: String,
    },

    /// Vote on a proposal.
    Vote {
        id: u64,
        #[arg(value_enum)]
        value: VoteArg,
        #[arg(long, value_enum, default_value_t = ClassArg::Guardian)]
        class: ClassArg,
    },

    /// Close voting and queue or reject.
    Finalize { id: u64 },

    /// Execute a queued proposal.
    Execute { id: u64 },

    /// Cancel an active or queued proposal.
    Cancel { id: u64 },

    /// Assign a delegate's voting weight (Admin).
    SetWeight { delegate: String, weight: u128 },

    /// Record a deposit into the treasury.
    Deposit { amount: u128 },

    /// Show one proposal with its live quorum status.
    Show { id: u64 },

    /// List every proposal.
    List,

    /// Show treasury counters.
    Treasury,

    /// Run the database integrity check and report.
    Check,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    ParameterChange,
    TreasurySpend,
    Emergency,
    GuardianUpdate,
}

impl From<KindArg> for ProposalKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::ParameterChange => ProposalKind::ParameterChange,
            KindArg::TreasurySpend => ProposalKind::TreasurySpend,
            KindArg::Emergency => ProposalKind::Emergency,
            KindArg::GuardianUpdate => ProposalKind::GuardianUpdate,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteArg {
    For,
    Against,
    Abstain,
}

impl From<VoteArg> for VoteValue {
    fn from(v: VoteArg) -> Self {
        match v {
            VoteArg::For => VoteValue::For,
            VoteArg::Against => VoteValue::Against,
            VoteArg::Abstain => VoteValue::Abstain,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassArg {
    Guardian,
    Delegate,
}

impl From<ClassArg> for VoterClass {
    fn from(c: ClassArg) -> Self {
        match c {
            ClassArg::Guardian => VoterClass::Guardian,
            ClassArg::Delegate => VoterClass::Delegate,
        }
    }
}
