//! Node status and peer table commands.

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, get_json};

// ── Response types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StatusResponse {
    node_id: u16,
    count: u64,
    updated_at: u64,
    synced_at: u64,
    peers_known: usize,
    peers_reachable: usize,
}

#[derive(Deserialize)]
struct PeersResponse {
    peers: Vec<PeerInfo>,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct PeerInfo {
    id: u16,
    local: bool,
    count: u64,
    created_at: u64,
    updated_at: u64,
    reachable: bool,
    staleness_secs: f64,
}

// ── Subcommand handlers ───────────────────────────────────────────────────────

pub async fn cmd_status(host: &str, port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(host, port))).await?;

    println!("═══════════════════════════════════════");
    println!("  Syncer Node {}", resp.node_id);
    println!("═══════════════════════════════════════");
    println!("  Sync count       : {}", resp.count);
    println!("  Updated at       : {}", resp.updated_at);
    println!("  Synced at        : {}", resp.synced_at);
    println!("  Peers known      : {}", resp.peers_known);
    println!("  Peers reachable  : {}", resp.peers_reachable);

    Ok(())
}

pub async fn cmd_peers(host: &str, port: u16) -> Result<()> {
    let resp: PeersResponse = get_json(&format!("{}/peers", base_url(host, port))).await?;

    let remote: Vec<&PeerInfo> = resp.peers.iter().filter(|p| !p.local).collect();
    if remote.is_empty() {
        println!("No peers known yet.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Known Peers ({})", remote.len());
    println!("═══════════════════════════════════════");

    for p in remote {
        println!("  ┌─ {}", p.id);
        println!("  │  count     : {}", p.count);
        println!("  │  reachable : {}", if p.reachable { "yes" } else { "no" });
        println!("  └─ stale     : {:.3}s", p.staleness_secs);
    }

    Ok(())
}
