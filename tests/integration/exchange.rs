use std::time::Duration;

use syncer_core::clock::now_nanos;
use syncer_services::{PeerTransport, TickOutcome};

use crate::*;

#[tokio::test]
async fn test_single_tick_pulls_peer_state() {
    let n1 = TestNode::spawn().await.unwrap();
    let n2 = TestNode::spawn().await.unwrap();
    n1.registry.seed([n2.id]).await;
    n2.registry.seed([n1.id]).await;

    let before = now_nanos();
    let mut scheduler = n1.scheduler().unwrap();
    let outcome = scheduler.tick().await;
    let after = now_nanos();

    let TickOutcome::Synced { peer, merge } = outcome else {
        panic!("expected a successful exchange, got {outcome:?}");
    };
    assert_eq!(peer, n2.id);
    assert_eq!(merge.replaced, 1);

    // N1 holds N2's own view of itself, stamped by N2 while serving the call.
    let seen = n1.registry.get(n2.id).await.unwrap();
    let own = n2.registry.get(n2.id).await.unwrap();
    assert!(seen.is_reachable());
    assert_eq!(seen.count(), 1);
    assert_eq!(seen.updated_at(), own.updated_at());
    assert!(seen.updated_at() >= before && seen.updated_at() <= after);

    // N2 learned N1's record from the request body.
    let learned = n2.registry.get(n1.id).await.unwrap();
    let n1_own = n1.registry.get(n1.id).await.unwrap();
    assert_eq!(learned.updated_at(), n1_own.updated_at());
}

#[tokio::test]
async fn test_dead_peer_is_demoted_and_others_untouched() {
    let n1 = TestNode::spawn().await.unwrap();
    let n2 = TestNode::spawn().await.unwrap();
    let dead = closed_port().unwrap();

    n1.registry.seed([dead]).await;
    tokio::time::sleep(Duration::from_millis(2)).await;
    n1.registry.seed([n2.id]).await;
    let n2_before = n1.registry.get(n2.id).await.unwrap();

    let mut scheduler = n1.scheduler().unwrap();
    assert_eq!(scheduler.tick().await, TickOutcome::Unreachable { peer: dead });

    assert!(!n1.registry.get(dead).await.unwrap().is_reachable());
    assert_eq!(n1.registry.get(n2.id).await.unwrap(), n2_before);

    // Next tick skips the dead peer.
    let outcome = scheduler.tick().await;
    assert!(matches!(outcome, TickOutcome::Synced { peer, .. } if peer == n2.id));
}

#[tokio::test]
async fn test_malformed_reply_is_discarded() {
    // Something answers on the port, but not with a sync payload.
    let listener = tokio::net::TcpListener::bind((HOST, 0)).await.unwrap();
    let bogus = listener.local_addr().unwrap().port();
    let app = axum::Router::new().route("/syncer/", axum::routing::post(|| async { "not json" }));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let n1 = TestNode::spawn().await.unwrap();
    n1.registry.seed([bogus]).await;
    let before = n1.registry.get(bogus).await.unwrap();

    let transport = n1.transport().unwrap();
    let err = transport
        .exchange(bogus, &n1.registry.snapshot().await)
        .await
        .unwrap_err();
    assert!(!err.is_unreachable(), "unexpected error: {err}");

    let mut scheduler = n1.scheduler().unwrap();
    assert_eq!(scheduler.tick().await, TickOutcome::Discarded { peer: bogus });
    assert_eq!(n1.registry.get(bogus).await.unwrap(), before);
}

#[tokio::test]
async fn test_inbound_sync_restores_demoted_peer() {
    let n1 = TestNode::spawn().await.unwrap();
    let n2 = TestNode::spawn().await.unwrap();
    n1.registry.seed([n2.id]).await;
    n2.registry.seed([n1.id]).await;

    // N1 gave up on N2, e.g. while N2 was restarting.
    n1.registry.set_reachable(n2.id, false).await;
    let mut n1_scheduler = n1.scheduler().unwrap();
    assert_eq!(n1_scheduler.tick().await, TickOutcome::NoPeer);

    // N2 comes back and syncs with N1 on its own.
    let mut n2_scheduler = n2.scheduler().unwrap();
    let outcome = n2_scheduler.tick().await;
    assert!(matches!(outcome, TickOutcome::Synced { peer, .. } if peer == n1.id));
    assert!(n1.registry.get(n2.id).await.unwrap().is_reachable());

    // N1 now syncs with N2 again.
    let outcome = n1_scheduler.tick().await;
    assert!(matches!(outcome, TickOutcome::Synced { peer, .. } if peer == n2.id));
}

#[tokio::test]
async fn test_rediscovered_peer_is_synced_again() {
    let n1 = TestNode::spawn().await.unwrap();
    let n2 = TestNode::spawn().await.unwrap();
    n1.registry.seed([n2.id]).await;
    n1.registry.set_reachable(n2.id, false).await;

    n1.registry.seed([n2.id]).await;

    let mut scheduler = n1.scheduler().unwrap();
    let outcome = scheduler.tick().await;
    assert!(matches!(outcome, TickOutcome::Synced { peer, .. } if peer == n2.id));
}
