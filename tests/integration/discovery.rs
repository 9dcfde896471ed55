use std::collections::BTreeSet;

use syncer_services::{MembershipSource, PeerDiscovery, StaticPeers};

use crate::*;

#[tokio::test]
async fn test_discovery_finds_only_listening_nodes() {
    let a = TestNode::spawn().await.unwrap();
    let b = TestNode::spawn().await.unwrap();
    let local = TestNode::spawn().await.unwrap();

    // Ten candidates, two of them live.
    let mut candidates = vec![a.id, b.id];
    while candidates.len() < 10 {
        candidates.push(closed_port().unwrap());
    }
    candidates.rotate_left(3);
    let membership = StaticPeers(candidates);

    let report = PeerDiscovery::new(10)
        .discover(
            local.transport().unwrap(),
            membership.candidates(),
            local.id,
            local.registry.snapshot().await,
        )
        .await;

    assert_eq!(report.reachable, BTreeSet::from([a.id, b.id]));
    assert!(report.max_observed_in_flight <= 10);

    // Probes carry our snapshot, so the live nodes now know about us.
    assert!(a.registry.get(local.id).await.is_some());
    assert!(b.registry.get(local.id).await.is_some());

    let seeded = local.registry.seed(report.reachable.iter().copied()).await;
    assert_eq!(seeded, 2);
    assert!(local.registry.get(a.id).await.unwrap().is_reachable());
}

#[tokio::test]
async fn test_discovery_respects_probe_limit() {
    let local = TestNode::spawn().await.unwrap();
    let mut nodes = Vec::new();
    for _ in 0..6 {
        nodes.push(TestNode::spawn().await.unwrap());
    }
    let candidates: Vec<_> = nodes.iter().map(|n| n.id).collect();

    let report = PeerDiscovery::new(2)
        .discover(
            local.transport().unwrap(),
            candidates.clone(),
            local.id,
            local.registry.snapshot().await,
        )
        .await;

    assert_eq!(report.reachable.len(), 6);
    assert!(report.max_observed_in_flight <= 2);
}
