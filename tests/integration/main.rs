//! Syncer integration test harness.
//!
//! Every test runs real nodes in-process: each node gets its own registry
//! and an HTTP endpoint on an ephemeral loopback port, and its id is that
//! port, exactly as a `syncerd` process would.

mod convergence;
mod discovery;
mod exchange;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use syncer_api::ApiState;
use syncer_core::NodeId;
use syncer_services::{new_registry, HttpTransport, SharedRegistry};

pub const HOST: &str = "127.0.0.1";
pub const TIMEOUT: Duration = Duration::from_millis(500);

// ── Harness ───────────────────────────────────────────────────────────────────

/// One in-process node. Dropping it stops its endpoint.
pub struct TestNode {
    pub id: NodeId,
    pub registry: SharedRegistry,
    pub shutdown: broadcast::Sender<()>,
}

impl TestNode {
    /// Bind an ephemeral port and serve the sync endpoint on it.
    pub async fn spawn() -> Result<Self> {
        let listener = TcpListener::bind((HOST, 0))
            .await
            .context("failed to bind test listener")?;
        let id = listener.local_addr()?.port();
        let registry = new_registry(id);
        let (shutdown, rx) = broadcast::channel(1);

        tokio::spawn(syncer_api::serve(
            ApiState::new(registry.clone(), 16),
            listener,
            rx,
        ));

        Ok(Self {
            id,
            registry,
            shutdown,
        })
    }

    pub fn transport(&self) -> Result<Arc<HttpTransport>> {
        Ok(Arc::new(HttpTransport::new(self.id, HOST, TIMEOUT)?))
    }

    pub fn scheduler(&self) -> Result<syncer_services::AntiEntropyScheduler<HttpTransport>> {
        Ok(syncer_services::AntiEntropyScheduler::new(
            self.registry.clone(),
            self.transport()?,
            Duration::from_millis(50),
            self.shutdown.subscribe(),
        ))
    }

    pub fn stop(&self) {
        let _ = self.shutdown.send(());
    }
}

impl Drop for TestNode {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A port with nothing listening on it.
pub fn closed_port() -> Result<NodeId> {
    let listener = std::net::TcpListener::bind((HOST, 0))?;
    Ok(listener.local_addr()?.port())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_node_serves_its_own_record() {
    let node = TestNode::spawn().await.expect("spawn node");

    let body: serde_json::Value = reqwest::get(format!("http://{HOST}:{}/api/status", node.id))
        .await
        .expect("status request")
        .json()
        .await
        .expect("status json");

    assert_eq!(body["node_id"], node.id);
    assert_eq!(body["peers_known"], 0);
}
