//! /syncer (POST): inbound half of an anti-entropy exchange.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use bytes::Bytes;

use syncer_core::wire::{parse_origin, ORIGIN_HEADER};
use syncer_core::{NodeId, SyncPayload};

use super::ApiState;

/// Merge a peer's snapshot and answer with ours.
///
/// The body is decoded before anything is touched, so a malformed request
/// leaves the registry as it was. A sender that names itself in the origin
/// header is marked reachable once its snapshot is merged.
pub async fn handle_sync(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SyncPayload>, (StatusCode, String)> {
    let _permit = state.inbound.clone().try_acquire_owned().map_err(|_| {
        tracing::warn!("inbound sync rejected, admission gate full");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Too many concurrent sync requests.\n".to_string(),
        )
    })?;

    let incoming = SyncPayload::from_json(&body).map_err(|e| {
        tracing::warn!(error = %e, "malformed sync payload");
        (StatusCode::BAD_REQUEST, "Bad Request\n".to_string())
    })?;

    let count = state.registry.increment_local().await;
    let report = state.registry.merge(&incoming.nodes).await;
    tracing::debug!(
        count,
        peers = incoming.nodes.len(),
        inserted = report.inserted,
        replaced = report.replaced,
        "inbound sync merged"
    );

    if let Some(sender) = origin(&headers).filter(|&id| id != state.registry.local_id()) {
        if state.registry.set_reachable(sender, true).await == Some(false) {
            tracing::info!(peer = sender, "peer reachable again after inbound sync");
        }
    }

    Ok(Json(state.registry.snapshot().await))
}

fn origin(headers: &HeaderMap) -> Option<NodeId> {
    headers
        .get(ORIGIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_origin)
}
