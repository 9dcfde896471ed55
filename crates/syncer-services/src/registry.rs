//! Peer registry: the node's view of every known node.
//!
//! One `RwLock` guards the whole table. Every operation takes it once for
//! its full duration, so readers never see a half-applied merge and a
//! record's counter/timestamp pair is never torn.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use syncer_core::clock::now_nanos;
use syncer_core::{NodeId, NodeState, SyncPayload};

/// Outcome of one merge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Ids not known before the merge.
    pub inserted: usize,
    /// Known ids whose record was replaced by a strictly newer one.
    pub replaced: usize,
    /// Records dropped: not newer than ours, or describing the local node.
    pub ignored: usize,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        self.inserted + self.replaced > 0
    }
}

#[derive(Debug, Default)]
struct Table {
    synced_at: u64,
    nodes: BTreeMap<NodeId, NodeState>,
}

/// Registry of node states keyed on node id.
#[derive(Debug)]
pub struct PeerRegistry {
    local_id: NodeId,
    table: RwLock<Table>,
}

/// The registry as shared between the scheduler and the endpoint handlers.
pub type SharedRegistry = Arc<PeerRegistry>;

/// Create a registry holding only the local node's own record.
pub fn new_registry(local_id: NodeId) -> SharedRegistry {
    Arc::new(PeerRegistry::new(local_id))
}

impl PeerRegistry {
    pub fn new(local_id: NodeId) -> Self {
        let now = now_nanos();
        let mut nodes = BTreeMap::new();
        nodes.insert(local_id, NodeState::new(now));
        Self {
            local_id,
            table: RwLock::new(Table {
                synced_at: now,
                nodes,
            }),
        }
    }

    pub fn local_id(&self) -> NodeId {
        self.local_id
    }

    /// Copy of the stored record, if the id is known.
    pub async fn get(&self, id: NodeId) -> Option<NodeState> {
        self.table.read().await.nodes.get(&id).copied()
    }

    /// Insert a record for an unknown id. Returns false (and changes
    /// nothing) if the id is already present.
    pub async fn put(&self, id: NodeId, state: NodeState) -> bool {
        let mut table = self.table.write().await;
        if table.nodes.contains_key(&id) {
            return false;
        }
        table.nodes.insert(id, state);
        true
    }

    /// Record peers found by discovery. Unknown ids get a fresh record; known
    /// ids keep their record but are marked reachable again. The local id is
    /// skipped. Returns how many were inserted.
    pub async fn seed(&self, ids: impl IntoIterator<Item = NodeId>) -> usize {
        let now = now_nanos();
        let mut table = self.table.write().await;
        let mut inserted = 0;
        for id in ids {
            if id == self.local_id {
                continue;
            }
            match table.nodes.get_mut(&id) {
                Some(known) => known.set_reachable(true),
                None => {
                    table.nodes.insert(id, NodeState::new(now));
                    inserted += 1;
                }
            }
        }
        inserted
    }

    /// Fold a peer's view into ours under last-writer-wins.
    ///
    /// Unknown ids are inserted as reachable. A known id is replaced as a
    /// whole only when the incoming `updated_at` is strictly greater; our
    /// `reachable` flag survives the replacement since only direct transport
    /// outcomes change it. The local node's record is never taken from a peer.
    pub async fn merge(&self, incoming: &BTreeMap<NodeId, NodeState>) -> MergeReport {
        let mut report = MergeReport::default();
        let mut table = self.table.write().await;

        for (&id, state) in incoming {
            if id == self.local_id {
                report.ignored += 1;
                continue;
            }
            match table.nodes.get_mut(&id) {
                None => {
                    let mut state = *state;
                    state.set_reachable(true);
                    table.nodes.insert(id, state);
                    report.inserted += 1;
                }
                Some(current) if state.supersedes(current) => {
                    let reachable = current.is_reachable();
                    *current = *state;
                    current.set_reachable(reachable);
                    report.replaced += 1;
                }
                Some(_) => report.ignored += 1,
            }
        }

        report
    }

    /// The reachable peer whose record is oldest, lowest id first on ties.
    pub async fn select_stalest_reachable(&self) -> Option<NodeId> {
        let table = self.table.read().await;
        table
            .nodes
            .iter()
            .filter(|(id, state)| **id != self.local_id && state.is_reachable())
            .min_by_key(|(id, state)| (state.updated_at(), **id))
            .map(|(id, _)| *id)
    }

    /// Deep copy of the whole table, ready to send to a peer.
    pub async fn snapshot(&self) -> SyncPayload {
        let table = self.table.read().await;
        SyncPayload {
            synced_at: table.synced_at,
            nodes: table.nodes.clone(),
        }
    }

    /// Stamp the start of a registry-level exchange.
    pub async fn mark_synced_now(&self) {
        let now = now_nanos();
        let mut table = self.table.write().await;
        table.synced_at = now;
        if let Some(local) = table.nodes.get_mut(&self.local_id) {
            local.touch(now);
        }
    }

    /// Count one served sync event on the local record.
    pub async fn increment_local(&self) -> u64 {
        let now = now_nanos();
        let mut table = self.table.write().await;
        let local = table
            .nodes
            .entry(self.local_id)
            .or_insert_with(|| NodeState::new(now));
        local.increment_counter(now);
        local.count()
    }

    /// Record a direct contact outcome for one peer: our own exchange with it,
    /// or an exchange it started with us. Unknown ids are ignored. Returns the
    /// previous flag.
    pub async fn set_reachable(&self, id: NodeId, reachable: bool) -> Option<bool> {
        let mut table = self.table.write().await;
        table.nodes.get_mut(&id).map(|state| {
            let was = state.is_reachable();
            state.set_reachable(reachable);
            was
        })
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.nodes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.read().await.nodes.is_empty()
    }
}
