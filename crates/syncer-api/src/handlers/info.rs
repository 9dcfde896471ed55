//! Fallback handler: echoes the request and dumps the node's view.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Uri};
use axum::Json;
use serde::Serialize;

use syncer_core::{NodeState, SyncPayload};

use super::ApiState;

#[derive(Serialize)]
pub struct RequestInfo {
    pub path: String,
    #[serde(rename = "querystring", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub header: BTreeMap<String, String>,
    #[serde(rename = "clientip")]
    pub client_ip: String,
    #[serde(rename = "targetip")]
    pub target_ip: String,
    pub node: Option<NodeState>,
}

#[derive(Serialize)]
pub struct InfoResponse {
    pub request: RequestInfo,
    pub syncer: SyncPayload,
}

pub async fn handle_info(
    State(state): State<ApiState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    uri: Uri,
    headers: HeaderMap,
) -> Json<InfoResponse> {
    let target_ip = headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let request = RequestInfo {
        path: uri.path().to_string(),
        query: uri.query().filter(|q| !q.is_empty()).map(str::to_string),
        header: combine_values(&headers),
        client_ip: remote.ip().to_string(),
        target_ip,
        node: state.registry.get(state.registry.local_id()).await,
    };

    Json(InfoResponse {
        request,
        syncer: state.registry.snapshot().await,
    })
}

/// Join repeated headers into one comma-separated value per name.
fn combine_values(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match out.get_mut(name.as_str()) {
            Some(joined) => {
                joined.push_str(", ");
                joined.push_str(&value);
            }
            None => {
                out.insert(name.as_str().to_string(), value.into_owned());
            }
        }
    }
    out
}
