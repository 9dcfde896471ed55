//! syncer-ctl: command-line interface for a syncer node.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;

const DEFAULT_PORT: u16 = 9000;

#[derive(Parser)]
#[command(name = "syncer-ctl", about = "Inspect a running syncer node")]
struct Cli {
    /// Node port to query
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Node host to query
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the node's own record and peer counts
    Status,
    /// List every peer in the node's registry
    Peers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Status) {
        Command::Status => cmd::status::cmd_status(&cli.host, cli.port).await,
        Command::Peers => cmd::status::cmd_peers(&cli.host, cli.port).await,
    }
}
