//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::discord::WebhookSink;
use crate::domain::ChainCatalog;
use crate::store::SubscriptionStore;
use crate::watcher::WatcherHandle;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Webhook registrations.
    pub store: SubscriptionStore,
    /// Configured chains.
    pub catalog: Arc<ChainCatalog>,
    /// One handle per running chain watcher.
    pub watchers: Arc<[WatcherHandle]>,
    /// Outbound webhook calls (confirmation and deletion).
    pub discord: Arc<dyn WebhookSink>,
}

impl AppState {
    /// Handle of the watcher for `chain`, if one is running.
    #[must_use]
    pub fn watcher(&self, chain: &str) -> Option<&WatcherHandle> {
        self.watchers.iter().find(|handle| handle.chain() == chain)
    }
}
