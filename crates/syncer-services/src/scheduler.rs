//! Anti-entropy scheduler.
//!
//! On every tick, picks the reachable peer whose record is stalest, sends
//! it our snapshot, and merges the reply. A peer that cannot be reached is
//! demoted; it is tried again only after something marks it reachable.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{Instant, MissedTickBehavior};

use syncer_core::clock::{elapsed_between, now_nanos};
use syncer_core::NodeId;

use crate::registry::{MergeReport, SharedRegistry};
use crate::transport::PeerTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next tick.
    Idle,
    /// One exchange in flight.
    Syncing,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No reachable peer other than ourselves.
    NoPeer,
    /// Exchange succeeded and the reply was merged.
    Synced { peer: NodeId, merge: MergeReport },
    /// Peer could not be reached and was marked unreachable.
    Unreachable { peer: NodeId },
    /// Peer answered but the reply was unusable; nothing changed.
    Discarded { peer: NodeId },
}

pub struct AntiEntropyScheduler<T: PeerTransport> {
    registry: SharedRegistry,
    transport: Arc<T>,
    interval: Duration,
    state: SchedulerState,
    shutdown: broadcast::Receiver<()>,
}

impl<T: PeerTransport> AntiEntropyScheduler<T> {
    pub fn new(
        registry: SharedRegistry,
        transport: Arc<T>,
        interval: Duration,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            registry,
            transport,
            interval,
            state: SchedulerState::Idle,
            shutdown,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Tick until shutdown. Shutdown interrupts the wait between ticks, never
    /// an exchange already in flight.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let period = self.interval.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            node = self.registry.local_id(),
            interval_ms = period.as_millis() as u64,
            "anti-entropy scheduler starting"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("anti-entropy scheduler shutting down");
                    return Ok(());
                }

                _ = interval.tick() => {
                    let outcome = self.tick().await;
                    tracing::trace!(?outcome, "tick finished");
                }
            }
        }
    }

    /// Run one Idle → Syncing → Idle cycle.
    pub async fn tick(&mut self) -> TickOutcome {
        self.state = SchedulerState::Syncing;
        let outcome = self.sync_once().await;
        self.state = SchedulerState::Idle;
        outcome
    }

    async fn sync_once(&self) -> TickOutcome {
        self.registry.mark_synced_now().await;

        let Some(peer) = self.registry.select_stalest_reachable().await else {
            return TickOutcome::NoPeer;
        };

        let now = now_nanos();
        let staleness = self
            .registry
            .get(peer)
            .await
            .map(|s| elapsed_between(s.updated_at(), now))
            .unwrap_or_default();
        tracing::debug!(
            peer,
            staleness_secs = staleness.as_secs_f64(),
            "syncing with stalest peer"
        );

        let snapshot = self.registry.snapshot().await;
        match self.transport.exchange(peer, &snapshot).await {
            Ok(reply) => {
                let merge = self.registry.merge(&reply.nodes).await;
                if self.registry.set_reachable(peer, true).await == Some(false) {
                    tracing::info!(peer, "peer reachable again");
                }
                tracing::debug!(
                    peer,
                    inserted = merge.inserted,
                    replaced = merge.replaced,
                    ignored = merge.ignored,
                    "merged peer snapshot"
                );
                TickOutcome::Synced { peer, merge }
            }
            Err(e) if e.is_unreachable() => {
                self.registry.set_reachable(peer, false).await;
                tracing::warn!(peer, error = %e, "peer unreachable");
                TickOutcome::Unreachable { peer }
            }
            Err(e) => {
                tracing::warn!(peer, error = %e, "discarding sync exchange");
                TickOutcome::Discarded { peer }
            }
        }
    }
}
