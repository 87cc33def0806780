//! The per-chain watcher loop.

use std::fmt;
use std::sync::Arc;

use backoff::backoff::Backoff;
use chrono::Utc;
use futures_util::StreamExt;
use tokio::sync::watch;

use super::connector::{Connection, connect};
use super::filter::{count_referendum_started, find_referendum_started};
use super::{ReconnectPolicy, ReferendumHandler, WatcherState, WatcherStatus};
use crate::domain::{Chain, ChainEvent};
use crate::error::RpcError;
use crate::rpc::{RpcConnection, RpcConnector};

/// How a subscription session ended.
struct SessionEnd {
    batches: u64,
    reason: RpcError,
}

/// Watches one chain for started referenda, forever.
///
/// The watcher is the only writer of its status channel; readers get the
/// latest [`WatcherStatus`] from the receiver returned by
/// [`ChainWatcher::new`].
pub struct ChainWatcher<R, H> {
    chain: Chain,
    connector: Arc<R>,
    handler: Arc<H>,
    policy: ReconnectPolicy,
    status: watch::Sender<WatcherStatus>,
}

impl<R, H> fmt::Debug for ChainWatcher<R, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainWatcher")
            .field("chain", &self.chain.name)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<R: RpcConnector, H: ReferendumHandler> ChainWatcher<R, H> {
    /// Creates a watcher and the receiver for its status.
    #[must_use]
    pub fn new(
        chain: Chain,
        connector: Arc<R>,
        handler: Arc<H>,
        policy: ReconnectPolicy,
    ) -> (Self, watch::Receiver<WatcherStatus>) {
        let (status, receiver) = watch::channel(WatcherStatus::default());
        let watcher = Self {
            chain,
            connector,
            handler,
            policy,
            status,
        };
        (watcher, receiver)
    }

    /// Runs the watcher. Never returns; stop it by aborting its task.
    pub async fn run(self) {
        let mut backoff = self.policy.backoff();
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            self.set_state(WatcherState::Connecting { attempt });

            match connect(&self.chain, self.connector.as_ref(), self.policy.probe_timeout).await {
                Ok(connection) => {
                    let session = self.follow(&connection).await;
                    // only a session that delivered events counts as healthy
                    if session.batches > 0 {
                        backoff.reset();
                        attempt = 0;
                    }
                    tracing::warn!(
                        chain = %self.chain.name,
                        endpoint = connection.endpoint(),
                        batches = session.batches,
                        error = %session.reason,
                        "subscription lost, reconnecting"
                    );
                    self.status.send_modify(|status| {
                        status.reconnects = status.reconnects.saturating_add(1);
                    });
                }
                Err(failure) => {
                    tracing::debug!(chain = %self.chain.name, error = %failure, "connect attempt failed");
                }
            }

            self.set_state(WatcherState::Disconnected);
            let delay = backoff.next_backoff().unwrap_or(self.policy.max_delay);
            tracing::info!(chain = %self.chain.name, ?delay, "waiting before reconnect");
            tokio::time::sleep(delay).await;
        }
    }

    /// Follows the event stream of `connection` until it fails.
    async fn follow(&self, connection: &Connection<R::Connection>) -> SessionEnd {
        let mut session = SessionEnd {
            batches: 0,
            reason: RpcError::SubscriptionClosed,
        };
        let mut batches = match connection.rpc().subscribe_events().await {
            Ok(stream) => stream,
            Err(err) => {
                session.reason = err;
                return session;
            }
        };
        let endpoint = connection.endpoint().to_string();
        self.set_state(WatcherState::Subscribed {
            endpoint: endpoint.clone(),
        });
        tracing::info!(chain = %self.chain.name, %endpoint, "subscribed to finalized events");

        loop {
            match batches.next().await {
                Some(Ok(batch)) => {
                    session.batches = session.batches.saturating_add(1);
                    self.handle_batch(&endpoint, &batch).await;
                }
                Some(Err(err)) => {
                    session.reason = err;
                    return session;
                }
                None => return session,
            }
        }
    }

    async fn handle_batch(&self, endpoint: &str, batch: &[ChainEvent]) {
        let Some(referendum) = find_referendum_started(batch) else {
            return;
        };

        let matches = count_referendum_started(batch);
        if matches > 1 {
            tracing::warn!(
                chain = %self.chain.name,
                %referendum,
                matches,
                "several referenda started in one block, only the first is dispatched"
            );
        }
        tracing::info!(chain = %self.chain.name, %referendum, "referendum started");

        self.set_state(WatcherState::Dispatching {
            endpoint: endpoint.to_string(),
            referendum,
        });
        self.handler.referendum_started(&self.chain, referendum).await;
        self.status.send_modify(|status| {
            status.last_referendum = Some(referendum);
        });
        self.set_state(WatcherState::Subscribed {
            endpoint: endpoint.to_string(),
        });
    }

    fn set_state(&self, state: WatcherState) {
        self.status.send_modify(|status| {
            status.state = state;
            status.since = Utc::now();
        });
    }
}
