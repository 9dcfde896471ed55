use std::time::Duration;

use crate::*;

/// Three nodes in a line (1 knows 2, 2 knows 3). With schedulers running,
/// every node ends up knowing every other node.
#[tokio::test]
async fn test_three_nodes_converge() {
    let n1 = TestNode::spawn().await.unwrap();
    let n2 = TestNode::spawn().await.unwrap();
    let n3 = TestNode::spawn().await.unwrap();
    n1.registry.seed([n2.id]).await;
    n2.registry.seed([n3.id]).await;

    for node in [&n1, &n2, &n3] {
        tokio::spawn(node.scheduler().unwrap().run());
    }

    let ids = [n1.id, n2.id, n3.id];
    let converged = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let mut all = true;
            for node in [&n1, &n2, &n3] {
                for id in ids {
                    all &= node.registry.get(id).await.is_some();
                }
            }
            if all {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(converged.is_ok(), "nodes did not converge in time");

    // Every node sees all three records, and none has been demoted.
    for node in [&n1, &n2, &n3] {
        let snapshot = node.registry.snapshot().await;
        assert_eq!(snapshot.nodes.len(), 3);
        assert!(snapshot.nodes.values().all(|s| s.is_reachable()));
    }
}

/// A node that stops answering is demoted by its peers and stays in their
/// registries with its last-known state.
#[tokio::test]
async fn test_stopped_node_is_marked_unreachable() {
    let n1 = TestNode::spawn().await.unwrap();
    let n2 = TestNode::spawn().await.unwrap();
    n1.registry.seed([n2.id]).await;

    let mut scheduler = n1.scheduler().unwrap();
    scheduler.tick().await;
    assert!(n1.registry.get(n2.id).await.unwrap().is_reachable());
    let last_known = n1.registry.get(n2.id).await.unwrap();

    n2.stop();
    // Graceful shutdown lets the listener go; wait for the port to refuse.
    tokio::time::sleep(Duration::from_millis(100)).await;

    scheduler.tick().await;
    let after = n1.registry.get(n2.id).await.unwrap();
    assert!(!after.is_reachable());
    assert_eq!(after.count(), last_known.count());
    assert_eq!(after.updated_at(), last_known.updated_at());
}
