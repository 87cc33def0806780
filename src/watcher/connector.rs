//! Endpoint selection: first endpoint that connects and passes the
//! liveness probe wins.

use std::fmt;
use std::time::Duration;

use crate::domain::Chain;
use crate::error::{ConnectionFailure, RpcError};
use crate::rpc::{RpcConnection, RpcConnector};

/// A validated connection bound to one chain and one endpoint.
///
/// Owned by a single chain watcher and replaced, never repaired, when it
/// fails.
pub struct Connection<C> {
    chain: String,
    endpoint: String,
    finalized_at_connect: u64,
    inner: C,
}

impl<C> Connection<C> {
    /// Name of the chain this connection belongs to.
    #[must_use]
    pub fn chain(&self) -> &str {
        &self.chain
    }

    /// Endpoint URL that passed the probe.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Finalized block number observed by the liveness probe.
    #[must_use]
    pub const fn finalized_at_connect(&self) -> u64 {
        self.finalized_at_connect
    }

    /// The underlying RPC connection.
    #[must_use]
    pub const fn rpc(&self) -> &C {
        &self.inner
    }
}

impl<C> fmt::Debug for Connection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("chain", &self.chain)
            .field("endpoint", &self.endpoint)
            .field("finalized_at_connect", &self.finalized_at_connect)
            .finish_non_exhaustive()
    }
}

/// Tries `chain`'s endpoints in list order and returns the first one that
/// opens and answers the liveness probe within `probe_timeout`.
///
/// # Errors
///
/// Returns [`ConnectionFailure`] listing every attempted endpoint when none
/// succeeds (including when the chain has no endpoints).
pub async fn connect<R: RpcConnector>(
    chain: &Chain,
    rpc: &R,
    probe_timeout: Duration,
) -> Result<Connection<R::Connection>, ConnectionFailure> {
    let mut failures = Vec::with_capacity(chain.endpoints.len());

    for url in &chain.endpoints {
        tracing::info!(chain = %chain.name, %url, "trying endpoint");

        let attempt = tokio::time::timeout(probe_timeout, open_and_probe(rpc, url)).await;
        match attempt {
            Ok(Ok((inner, finalized))) => {
                tracing::info!(chain = %chain.name, %url, finalized, "endpoint connected");
                return Ok(Connection {
                    chain: chain.name.clone(),
                    endpoint: url.clone(),
                    finalized_at_connect: finalized,
                    inner,
                });
            }
            Ok(Err(err)) => {
                tracing::warn!(chain = %chain.name, %url, error = %err, "endpoint failed");
                failures.push((url.clone(), err));
            }
            Err(_) => {
                tracing::warn!(chain = %chain.name, %url, ?probe_timeout, "endpoint timed out");
                failures.push((url.clone(), RpcError::Timeout(probe_timeout)));
            }
        }
    }

    tracing::error!(
        chain = %chain.name,
        attempted = failures.len(),
        "connecting to chain failed"
    );
    Err(ConnectionFailure {
        chain: chain.name.clone(),
        failures,
    })
}

async fn open_and_probe<R: RpcConnector>(
    rpc: &R,
    url: &str,
) -> Result<(R::Connection, u64), RpcError> {
    let connection = rpc.open(url).await?;
    let finalized = connection.finalized_block_number().await?;
    Ok((connection, finalized))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::testing::{FakeConnector, FakeEndpoint};

    const PROBE: Duration = Duration::from_millis(50);

    fn chain(endpoints: &[&str]) -> Chain {
        Chain::new(
            "Polkadot",
            endpoints.iter().map(ToString::to_string).collect(),
        )
    }

    #[tokio::test]
    async fn first_reachable_endpoint_wins() {
        let rpc = FakeConnector::new()
            .with("wss://down", FakeEndpoint::Unreachable)
            .with("wss://good-1", FakeEndpoint::healthy(100))
            .with("wss://good-2", FakeEndpoint::healthy(200));

        let result = connect(&chain(&["wss://down", "wss://good-1", "wss://good-2"]), &rpc, PROBE).await;
        let Ok(connection) = result else {
            panic!("expected a connection");
        };
        assert_eq!(connection.endpoint(), "wss://good-1");
        assert_eq!(connection.chain(), "Polkadot");
        assert_eq!(connection.finalized_at_connect(), 100);
        assert_eq!(rpc.attempts(), vec!["wss://down", "wss://good-1"]);
    }

    #[tokio::test]
    async fn failing_probe_moves_to_next_endpoint() {
        let rpc = FakeConnector::new()
            .with("wss://bad-probe", FakeEndpoint::BadProbe)
            .with("wss://good", FakeEndpoint::healthy(1));

        let result = connect(&chain(&["wss://bad-probe", "wss://good"]), &rpc, PROBE).await;
        assert_eq!(result.ok().map(|c| c.endpoint().to_string()), Some("wss://good".to_string()));
    }

    #[tokio::test]
    async fn hanging_endpoint_times_out() {
        let rpc = FakeConnector::new()
            .with("wss://hang", FakeEndpoint::Hang)
            .with("wss://good", FakeEndpoint::healthy(1));

        let result = connect(&chain(&["wss://hang", "wss://good"]), &rpc, PROBE).await;
        assert_eq!(result.ok().map(|c| c.endpoint().to_string()), Some("wss://good".to_string()));
    }

    #[tokio::test]
    async fn all_unreachable_reports_every_attempt() {
        let rpc = FakeConnector::new()
            .with("wss://a", FakeEndpoint::Unreachable)
            .with("wss://b", FakeEndpoint::BadProbe)
            .with("wss://c", FakeEndpoint::Hang);

        let result = connect(&chain(&["wss://a", "wss://b", "wss://c"]), &rpc, PROBE).await;
        let Err(failure) = result else {
            panic!("expected failure");
        };
        assert_eq!(failure.chain, "Polkadot");
        let urls: Vec<&str> = failure.failures.iter().map(|(url, _)| url.as_str()).collect();
        assert_eq!(urls, vec!["wss://a", "wss://b", "wss://c"]);
        assert!(matches!(
            failure.failures.last(),
            Some((_, RpcError::Timeout(_)))
        ));
        assert_eq!(rpc.attempts().len(), 3);
    }

    #[tokio::test]
    async fn chain_without_endpoints_fails_cleanly() {
        let rpc = FakeConnector::new();
        let result = connect(&chain(&[]), &rpc, PROBE).await;
        let Err(failure) = result else {
            panic!("expected failure");
        };
        assert!(failure.failures.is_empty());
    }
}
