//! /api/status and /api/peers: summaries for `syncer-ctl`.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use syncer_core::clock::{elapsed_between, now_nanos};
use syncer_core::NodeId;

use super::ApiState;

// ── /status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub node_id: NodeId,
    pub count: u64,
    pub created_at: u64,
    pub updated_at: u64,
    pub synced_at: u64,
    pub peers_known: usize,
    pub peers_reachable: usize,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let local_id = state.registry.local_id();
    let snapshot = state.registry.snapshot().await;
    let local = snapshot.nodes.get(&local_id).copied().unwrap_or_default();

    let peers = snapshot.nodes.iter().filter(|(id, _)| **id != local_id);
    let (peers_known, peers_reachable) = peers.fold((0, 0), |(known, up), (_, s)| {
        (known + 1, up + usize::from(s.is_reachable()))
    });

    Json(StatusResponse {
        node_id: local_id,
        count: local.count(),
        created_at: local.created_at(),
        updated_at: local.updated_at(),
        synced_at: snapshot.synced_at,
        peers_known,
        peers_reachable,
    })
}

// ── /peers ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct PeersResponse {
    pub peers: Vec<PeerInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeerInfo {
    pub id: NodeId,
    pub local: bool,
    pub count: u64,
    pub created_at: u64,
    pub updated_at: u64,
    pub reachable: bool,
    /// Seconds since the record was last updated, by our clock.
    pub staleness_secs: f64,
}

pub async fn handle_peers(State(state): State<ApiState>) -> Json<PeersResponse> {
    let local_id = state.registry.local_id();
    let now = now_nanos();
    let peers = state
        .registry
        .snapshot()
        .await
        .nodes
        .into_iter()
        .map(|(id, s)| PeerInfo {
            id,
            local: id == local_id,
            count: s.count(),
            created_at: s.created_at(),
            updated_at: s.updated_at(),
            reachable: s.is_reachable(),
            staleness_secs: elapsed_between(s.updated_at(), now).as_secs_f64(),
        })
        .collect();

    Json(PeersResponse { peers })
}
