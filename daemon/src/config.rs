//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use guardian_types::{GovernanceParams, Principal};
use guardian_utils::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The static role roster. Delegate capability is not listed here: it follows
/// delegate weight.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub guardians: Vec<String>,

    #[serde(default)]
    pub admins: Vec<String>,

    #[serde(default)]
    pub emergency_issuers: Vec<String>,
}

impl RosterConfig {
    fn principals(names: &[String]) -> Result<Vec<Principal>, ConfigError> {
        names
            .iter()
            .map(|n| Principal::parse(n).map_err(|e| ConfigError::Invalid(e.to_string())))
            .collect()
    }

    pub fn guardian_principals(&self) -> Result<Vec<Principal>, ConfigError> {
        Self::principals(&self.guardians)
    }

    pub fn admin_principals(&self) -> Result<Vec<Principal>, ConfigError> {
        Self::principals(&self.admins)
    }

    pub fn emergency_issuer_principals(&self) -> Result<Vec<Principal>, ConfigError> {
        Self::principals(&self.emergency_issuers)
    }
}

/// Configuration for the governance daemon.
///
/// Can be loaded from a TOML file via [`DaemonConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Policy constants. Omitted fields take the reference values.
    #[serde(default)]
    pub params: GovernanceParams,

    #[serde(default)]
    pub roster: RosterConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./guardian_data")
}

fn default_map_size_mb() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// LMDB map size in bytes.
    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }

    /// Check params and roster names before anything is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.roster.guardian_principals()?;
        self.roster.admin_principals()?;
        self.roster.emergency_issuer_principals()?;
        if self.map_size_mb == 0 {
            return Err(ConfigError::Invalid("map_size_mb must be non-zero".into()));
        }
        Ok(())
    }

    /// Whether the configured Guardian list matches the policy roster size.
    /// The engine does not enforce it; the daemon only warns.
    pub fn roster_size_matches(&self) -> bool {
        self.roster.guardians.len() == self.params.guardian_roster_size as usize
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            params: GovernanceParams::default(),
            roster: RosterConfig::default(),
        }
    }
}
