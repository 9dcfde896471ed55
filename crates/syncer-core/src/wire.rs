//! Sync exchange payload: the JSON body of both the request and the reply
//! on a node's `/syncer/` endpoint.
//!
//! ```json
//! { "synced_at": 1700000000000000000,
//!   "nodes": { "9000": { "count": 3, "created_at": 1, "updated_at": 2, "reachable": true } } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::node::{NodeId, NodeState};

/// Path of the exchange endpoint on every node.
pub const SYNC_PATH: &str = "/syncer/";

/// Request header naming the node that initiated an exchange. The receiver
/// takes a well-formed request as proof the sender is up.
pub const ORIGIN_HEADER: &str = "x-syncer-node";

/// Parse an [`ORIGIN_HEADER`] value.
pub fn parse_origin(value: &str) -> Option<NodeId> {
    value.trim().parse().ok()
}

/// A full registry snapshot as exchanged between nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// When the sender last completed a registry-level exchange.
    #[serde(default, alias = "syncedAt")]
    pub synced_at: u64,

    /// Node id (as a decimal string key) to last-known state.
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, NodeState>,
}

impl SyncPayload {
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
