//! Startup peer discovery.
//!
//! Probes every candidate with a sync exchange, never more than
//! `max_in_flight` at once. A probe that fails for any reason just leaves
//! the candidate out.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashSet;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use syncer_core::{NodeId, SyncPayload};

use crate::transport::PeerTransport;

/// Result of one discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Candidates that answered the probe with a well-formed payload.
    pub reachable: BTreeSet<NodeId>,
    /// Number of candidates probed.
    pub probed: usize,
    /// Highest number of probes observed in flight at the same time.
    pub max_observed_in_flight: usize,
}

/// Bounded-concurrency prober.
#[derive(Debug, Clone, Copy)]
pub struct PeerDiscovery {
    max_in_flight: usize,
}

impl PeerDiscovery {
    /// A limit of zero is treated as one.
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Probe `candidates` (minus `local_id`) by sending them `announce`.
    /// Returns once every probe has finished.
    pub async fn discover<T: PeerTransport>(
        &self,
        transport: Arc<T>,
        candidates: impl IntoIterator<Item = NodeId>,
        local_id: NodeId,
        announce: SyncPayload,
    ) -> DiscoveryReport {
        let limiter = Arc::new(Semaphore::new(self.max_in_flight));
        let reachable = Arc::new(DashSet::new());
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let announce = Arc::new(announce);

        let mut probes = JoinSet::new();
        let mut probed = 0usize;

        for peer in candidates {
            if peer == local_id {
                continue;
            }
            probed += 1;

            let limiter = limiter.clone();
            let reachable = reachable.clone();
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            let announce = announce.clone();
            let transport = transport.clone();

            probes.spawn(async move {
                let permit = match limiter.acquire_owned().await {
                    Ok(p) => p,
                    Err(_) => return, // semaphore closed
                };

                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);

                let outcome = transport.exchange(peer, &announce).await;

                in_flight.fetch_sub(1, Ordering::SeqCst);
                drop(permit);

                match outcome {
                    Ok(_) => {
                        reachable.insert(peer);
                    }
                    Err(e) => tracing::trace!(peer, error = %e, "probe failed"),
                }
            });
        }

        while let Some(joined) = probes.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "probe task failed");
            }
        }

        let reachable: BTreeSet<NodeId> = reachable.iter().map(|id| *id).collect();
        tracing::info!(
            probed,
            reachable = reachable.len(),
            limit = self.max_in_flight,
            "peer discovery finished"
        );

        DiscoveryReport {
            reachable,
            probed,
            max_observed_in_flight: peak.load(Ordering::SeqCst),
        }
    }
}
