//! Versioned per-node record.
//!
//! A `NodeState` carries no lock of its own. Mutators take `&mut self`; the
//! peer registry serializes them behind its table lock, so a counter and its
//! timestamp are always written together.

use serde::{Deserialize, Serialize};

/// Node identifier. A node is known by the port it listens on.
pub type NodeId = u16;

/// Last-known state of one node, local or remote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeState {
    /// Number of sync exchanges this node has served. Only the node itself
    /// increments it.
    count: u64,

    /// First observation of the node. Never changes once set.
    #[serde(alias = "createdAt")]
    created_at: u64,

    /// Last local mutation or accepted merge. Sole merge tie-break.
    #[serde(alias = "updatedAt")]
    updated_at: u64,

    /// Whether the last transport attempt to this node succeeded.
    reachable: bool,
}

impl NodeState {
    /// A fresh record observed at `now`: zero count, reachable.
    pub fn new(now: u64) -> Self {
        Self {
            count: 0,
            created_at: now,
            updated_at: now,
            reachable: true,
        }
    }

    /// Build a record from raw field values, as decoded from a peer.
    pub fn from_parts(count: u64, created_at: u64, updated_at: u64, reachable: bool) -> Self {
        Self {
            count,
            created_at,
            updated_at,
            reachable,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn updated_at(&self) -> u64 {
        self.updated_at
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    /// Record one handled sync event.
    pub fn increment_counter(&mut self, now: u64) {
        self.count += 1;
        self.advance(now);
    }

    /// Refresh `updated_at` without changing the counter.
    pub fn touch(&mut self, now: u64) {
        self.advance(now);
    }

    pub fn set_reachable(&mut self, reachable: bool) {
        self.reachable = reachable;
    }

    /// Whether `self` wins over `other` under last-writer-wins. Equal
    /// timestamps do not win.
    pub fn supersedes(&self, other: &NodeState) -> bool {
        self.updated_at > other.updated_at
    }

    // updated_at strictly increases on every local mutation, even if the
    // wall clock stalls or steps back.
    fn advance(&mut self, now: u64) {
        self.updated_at = now.max(self.updated_at.saturating_add(1));
    }
}
