//! syncer-services: registry, transport, discovery and the anti-entropy
//! scheduler shared by the daemon and the HTTP API.

pub mod discovery;
pub mod membership;
pub mod registry;
pub mod scheduler;
pub mod transport;

pub use discovery::{DiscoveryReport, PeerDiscovery};
pub use membership::{MembershipSource, PortRange, StaticPeers};
pub use registry::{new_registry, MergeReport, PeerRegistry, SharedRegistry};
pub use scheduler::{AntiEntropyScheduler, SchedulerState, TickOutcome};
pub use transport::{HttpTransport, PeerTransport, TransportError};
