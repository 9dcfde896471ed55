//! HTTP handlers: the sync exchange endpoint and read-only node views.

pub mod info;
pub mod status;
pub mod sync;

use std::sync::Arc;

use tokio::sync::Semaphore;

use syncer_services::SharedRegistry;

#[derive(Clone)]
pub struct ApiState {
    pub registry: SharedRegistry,
    /// Admission gate for inbound sync requests.
    pub inbound: Arc<Semaphore>,
}

impl ApiState {
    pub fn new(registry: SharedRegistry, max_inbound: usize) -> Self {
        Self {
            registry,
            inbound: Arc::new(Semaphore::new(max_inbound.max(1))),
        }
    }
}

// Re-export handler functions for use in router setup.
pub use info::handle_info;
pub use status::{handle_peers, handle_status};
pub use sync::handle_sync;
