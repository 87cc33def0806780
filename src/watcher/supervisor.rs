//! Launches one watcher task per configured chain.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{ChainWatcher, ReconnectPolicy, ReferendumHandler, WatcherStatus};
use crate::domain::Chain;
use crate::rpc::RpcConnector;

/// Observer handle for a running chain watcher.
///
/// Dropping the handle does not stop the watcher.
#[derive(Debug)]
pub struct WatcherHandle {
    chain: String,
    status: watch::Receiver<WatcherStatus>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Name of the watched chain.
    #[must_use]
    pub fn chain(&self) -> &str {
        &self.chain
    }

    /// Snapshot of the watcher's latest status.
    #[must_use]
    pub fn status(&self) -> WatcherStatus {
        self.status.borrow().clone()
    }

    /// Returns `true` while the watcher task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the watcher task.
    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Spawns a watcher for every chain and returns immediately.
///
/// Watchers run independently: a chain whose endpoints are all down only
/// delays itself. Must be called from within a Tokio runtime.
pub fn spawn_watchers<R, H>(
    chains: &[Chain],
    connector: Arc<R>,
    handler: Arc<H>,
    policy: ReconnectPolicy,
) -> Vec<WatcherHandle>
where
    R: RpcConnector,
    H: ReferendumHandler,
{
    chains
        .iter()
        .map(|chain| {
            let (watcher, status) = ChainWatcher::new(
                chain.clone(),
                Arc::clone(&connector),
                Arc::clone(&handler),
                policy,
            );
            let task = tokio::spawn(watcher.run());
            tracing::info!(chain = %chain.name, endpoints = chain.endpoints.len(), "watcher started");
            WatcherHandle {
                chain: chain.name.clone(),
                status,
                task,
            }
        })
        .collect()
}
