//! syncer-core: node state, wire payload, clock and configuration.
//! All other syncer crates depend on this one.

pub mod clock;
pub mod config;
pub mod node;
pub mod wire;

pub use node::{NodeId, NodeState};
pub use wire::SyncPayload;
