//! Daemon configuration with TOML file support.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use crossgov_chain::ChainConfig;
use crossgov_governance::AbstainPolicy;
use crossgov_relayer::{ActionSpec, ListenerConfig};
use crossgov_utils::LogFormat;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CrossGovConfig {
    /// Directory of the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_map_size")]
    pub lmdb_map_size: usize,

    /// Filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default)]
    pub server: ServerConfig,

    pub chain: ChainConfig,

    #[serde(default)]
    pub relayer: RelayerConfig,

    /// Action payloads the relayer may execute, one per proposal.
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub abstain_policy: AbstainPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            abstain_policy: AbstainPolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RelayerConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    #[serde(default = "default_max_block_range")]
    pub max_block_range: u64,
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    /// Call `commitAction(hash)` before `executeIfAuthorized`.
    #[serde(default)]
    pub commit_before_execute: bool,
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

impl Default for RelayerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            confirmations: default_confirmations(),
            max_block_range: default_max_block_range(),
            max_in_flight: default_max_in_flight(),
            commit_before_execute: false,
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

impl RelayerConfig {
    pub fn listener(&self, start_block: Option<u64>) -> ListenerConfig {
        ListenerConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            confirmations: self.confirmations,
            max_block_range: self.max_block_range,
            max_in_flight: self.max_in_flight,
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
            start_block,
        }
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./crossgov_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_poll_interval() -> u64 {
    5
}

fn default_confirmations() -> u64 {
    2
}

fn default_max_block_range() -> u64 {
    2_000
}

fn default_max_in_flight() -> usize {
    4
}

fn default_shutdown_grace() -> u64 {
    30
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CrossGovConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
