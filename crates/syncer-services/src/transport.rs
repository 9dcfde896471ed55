//! Outbound side of a sync exchange.
//!
//! A `PeerTransport` POSTs this node's snapshot to a peer and returns the
//! peer's snapshot. `HttpTransport` is the production implementation; tests
//! substitute in-memory fakes.

use std::time::Duration;

use async_trait::async_trait;

use syncer_core::wire::{ORIGIN_HEADER, SYNC_PATH};
use syncer_core::{NodeId, SyncPayload};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to peer {peer} timed out")]
    Timeout { peer: NodeId },
    #[error("failed to connect to peer {peer}: {reason}")]
    Connect { peer: NodeId, reason: String },
    #[error("request to peer {peer} failed: {reason}")]
    Request { peer: NodeId, reason: String },
    #[error("peer {peer} replied with status {status}")]
    Status { peer: NodeId, status: u16 },
    #[error("malformed payload from peer {peer}: {source}")]
    Decode {
        peer: NodeId,
        #[source]
        source: serde_json::Error,
    },
}

impl TransportError {
    /// Whether the failure is evidence that the peer is down. A peer that
    /// answered at all, even with an error status or garbage, is not.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout { .. }
                | TransportError::Connect { .. }
                | TransportError::Request { .. }
        )
    }
}

#[async_trait]
pub trait PeerTransport: Send + Sync + 'static {
    /// Send `payload` to `peer` and return the peer's reply.
    async fn exchange(
        &self,
        peer: NodeId,
        payload: &SyncPayload,
    ) -> Result<SyncPayload, TransportError>;
}

/// JSON over HTTP to `http://{host}:{peer}/syncer/`, announcing `origin` as
/// the sender.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    host: String,
    origin: NodeId,
}

impl HttpTransport {
    /// Every request made through this transport is bounded by `timeout`.
    pub fn new(
        origin: NodeId,
        host: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            host: host.into(),
            origin,
        })
    }

    pub fn endpoint(&self, peer: NodeId) -> String {
        format!("http://{}:{}{}", self.host, peer, SYNC_PATH)
    }
}

fn classify(peer: NodeId, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout { peer }
    } else if err.is_connect() {
        TransportError::Connect {
            peer,
            reason: err.to_string(),
        }
    } else {
        TransportError::Request {
            peer,
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl PeerTransport for HttpTransport {
    async fn exchange(
        &self,
        peer: NodeId,
        payload: &SyncPayload,
    ) -> Result<SyncPayload, TransportError> {
        let resp = self
            .client
            .post(self.endpoint(peer))
            .header(ORIGIN_HEADER, self.origin.to_string())
            .json(payload)
            .send()
            .await
            .map_err(|e| classify(peer, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                peer,
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|e| classify(peer, e))?;
        SyncPayload::from_json(&body).map_err(|source| TransportError::Decode { peer, source })
    }
}
