//! Shared application state.

use std::sync::Arc;

use crate::domain::RoomStore;

use super::broadcast::BroadcastEngine;
use super::registry::RoomRegistry;

/// State shared by every handler.
pub struct AppState {
    /// Live room membership
    pub registry: Arc<RoomRegistry>,
    /// Room fan-out on top of the registry
    pub engine: BroadcastEngine,
    /// Durable room records (abstracted storage layer)
    pub store: Arc<dyn RoomStore>,
}

impl AppState {
    /// Wire up a fresh state around the given store.
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let engine = BroadcastEngine::new(registry.clone());
        Self {
            registry,
            engine,
            store,
        }
    }
}
