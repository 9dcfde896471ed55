//! Candidate peer sources for startup discovery.

use syncer_core::config::MembershipConfig;
use syncer_core::NodeId;

/// Produces the ordered candidate set probed at startup.
pub trait MembershipSource: Send + Sync {
    fn candidates(&self) -> Vec<NodeId>;
}

/// `count` consecutive ports starting at `start`, clipped at the top of the
/// port space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub start: NodeId,
    pub count: u16,
}

impl MembershipSource for PortRange {
    fn candidates(&self) -> Vec<NodeId> {
        (0..self.count)
            .map_while(|i| self.start.checked_add(i))
            .collect()
    }
}

/// A fixed list of peers, probed in the given order with duplicates removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticPeers(pub Vec<NodeId>);

impl MembershipSource for StaticPeers {
    fn candidates(&self) -> Vec<NodeId> {
        let mut seen = std::collections::HashSet::new();
        self.0.iter().copied().filter(|id| seen.insert(*id)).collect()
    }
}

impl From<&MembershipConfig> for Box<dyn MembershipSource> {
    fn from(config: &MembershipConfig) -> Self {
        match config {
            MembershipConfig::Range { start, count } => Box::new(PortRange {
                start: *start,
                count: *count,
            }),
            MembershipConfig::Static { peers } => Box::new(StaticPeers(peers.clone())),
        }
    }
}
