use std::time::Duration;

use tokio::sync::Mutex;

use crate::api::auth::IdentityProvider;
use crate::notify::NotificationRelay;
use crate::observability::metrics::Metrics;
use crate::store::MemoryStore;

pub struct AppState {
    pub store: MemoryStore,
    pub identities: IdentityProvider,
    pub relay: NotificationRelay,
    /// Serializes every mutation of the pending delivery pool so that two
    /// drivers cannot both win the same request.
    pub pool_lock: Mutex<()>,
    pub metrics: Metrics,
    pub delivered_retention: Duration,
}

impl AppState {
    pub fn new(event_buffer_size: usize, delivered_retention: Duration) -> Self {
        Self {
            store: MemoryStore::new(),
            identities: IdentityProvider::new(),
            relay: NotificationRelay::new(event_buffer_size),
            pool_lock: Mutex::new(()),
            metrics: Metrics::new(),
            delivered_retention,
        }
    }
}
