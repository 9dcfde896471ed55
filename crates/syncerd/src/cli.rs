//! Command-line flags. Flags win over config file and environment.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use syncer_core::config::SyncerConfig;
use syncer_core::NodeId;

#[derive(Debug, Parser)]
#[command(name = "syncerd", about = "Anti-entropy peer state synchronizer")]
pub struct Cli {
    /// Listening port, also this node's id [default: 9000]
    #[arg(long)]
    pub port: Option<NodeId>,

    /// Config file (overrides $SYNCER_CONFIG)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Load config from `--config` or the default location, then apply flags.
    /// A missing file means defaults; an unreadable or invalid one is an error.
    pub fn resolve(&self) -> Result<SyncerConfig> {
        let mut config = match &self.config {
            Some(path) => SyncerConfig::load_from(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => SyncerConfig::load().context("failed to load config")?,
        };
        if let Some(port) = self.port {
            config.node.port = port;
        }
        Ok(config)
    }
}
