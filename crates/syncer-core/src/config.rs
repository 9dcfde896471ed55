//! Configuration system for syncer nodes.
//!
//! Resolution order: environment variables → config file → defaults.
//! Command-line flags in `syncerd` are applied on top.
//!
//! Config file location:
//!   1. $SYNCER_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/syncer/config.toml
//!   3. ~/.config/syncer/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::node::NodeId;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncerConfig {
    pub node: NodeConfig,
    pub sync: SyncConfig,
    pub discovery: DiscoveryConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Listening port. Also this node's id in every registry.
    pub port: NodeId,
    /// Host that peers are reached on. Peers differ only by port.
    pub peer_host: String,
    /// Address the exchange endpoint binds to.
    pub bind_addr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Anti-entropy tick period.
    pub interval_ms: u64,
    /// Timeout for one outbound exchange.
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Timeout for one startup probe.
    pub probe_timeout_ms: u64,
    /// Maximum probes in flight at once.
    pub max_in_flight: usize,
    /// Where candidate peers come from.
    pub membership: MembershipConfig,
}

/// Candidate set used by startup discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MembershipConfig {
    /// `count` consecutive ports starting at `start`.
    Range { start: NodeId, count: u16 },
    /// An explicit list of peer ports.
    Static { peers: Vec<NodeId> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Inbound sync requests processed concurrently. Excess requests get 503.
    pub max_inbound: usize,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const DEFAULT_PORT: NodeId = 9000;

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            peer_host: "127.0.0.1".to_string(),
            bind_addr: "0.0.0.0".to_string(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            request_timeout_ms: 500,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 500,
            max_in_flight: 10,
            membership: MembershipConfig::default(),
        }
    }
}

impl Default for MembershipConfig {
    fn default() -> Self {
        MembershipConfig::Range {
            start: DEFAULT_PORT,
            count: 100,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { max_inbound: 64 }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl DiscoveryConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("syncer")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl SyncerConfig {
    /// Load config from the default location: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::file_path())
    }

    /// Load config from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))?
        } else {
            SyncerConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("SYNCER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Apply SYNCER_* env var overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(p) = lookup("SYNCER_NODE__PORT").and_then(|v| v.parse().ok()) {
            self.node.port = p;
        }
        if let Some(v) = lookup("SYNCER_NODE__PEER_HOST") {
            self.node.peer_host = v;
        }
        if let Some(ms) = lookup("SYNCER_SYNC__INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.sync.interval_ms = ms;
        }
        if let Some(k) = lookup("SYNCER_DISCOVERY__MAX_IN_FLIGHT").and_then(|v| v.parse().ok()) {
            self.discovery.max_in_flight = k;
        }
    }
}
