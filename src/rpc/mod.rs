//! Chain RPC seam.
//!
//! The watcher needs two things from a chain endpoint: a liveness probe
//! (the latest finalized block number) and a live feed of event batches,
//! one batch per finalized block. [`RpcConnector`] opens a connection to a
//! single endpoint; [`RpcConnection`] provides both operations on it.
//!
//! [`substrate::SubstrateConnector`] implements the seam with `subxt`.

pub mod substrate;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::domain::ChainEvent;
use crate::error::RpcError;

pub use substrate::{SubstrateConnection, SubstrateConnector};

/// Server-pushed stream of event batches. An `Err` item or the end of the
/// stream means the subscription is dead.
pub type EventBatchStream = BoxStream<'static, Result<Vec<ChainEvent>, RpcError>>;

/// Opens connections to chain RPC endpoints.
#[async_trait]
pub trait RpcConnector: Send + Sync + 'static {
    /// Connection type produced by this connector.
    type Connection: RpcConnection;

    /// Opens a connection to `url`.
    ///
    /// # Errors
    ///
    /// Returns an [`RpcError`] if the endpoint cannot be reached or rejects
    /// the handshake.
    async fn open(&self, url: &str) -> Result<Self::Connection, RpcError>;
}

/// An open connection to one chain endpoint.
#[async_trait]
pub trait RpcConnection: Send + Sync + 'static {
    /// Fetches the latest finalized block header and returns its number.
    ///
    /// # Errors
    ///
    /// Returns an [`RpcError`] if the request fails or the header cannot be
    /// decoded.
    async fn finalized_block_number(&self) -> Result<u64, RpcError>;

    /// Subscribes to the events of every newly finalized block.
    ///
    /// # Errors
    ///
    /// Returns an [`RpcError`] if the subscription cannot be established.
    async fn subscribe_events(&self) -> Result<EventBatchStream, RpcError>;
}
