//! Chain status DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Per-chain view combining configuration, watcher status and the number
/// of subscribed webhooks.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChainStatusDto {
    /// Chain name.
    pub name: String,
    /// Whether the chain is a relay chain.
    pub is_relay: bool,
    /// Number of configured RPC endpoints.
    pub endpoints: usize,
    /// Watcher state: `disconnected`, `connecting`, `subscribed` or
    /// `dispatching`.
    pub state: String,
    /// Endpoint in use, when connected.
    pub endpoint: Option<String>,
    /// When the watcher entered its current state.
    pub since: DateTime<Utc>,
    /// Most recently dispatched referendum.
    pub last_referendum: Option<u32>,
    /// Sessions lost and re-established since startup.
    pub reconnects: u64,
    /// Webhooks registered for this chain.
    pub subscriptions: u64,
}

/// Response body for `GET /chains`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChainListResponse {
    /// Chains in configuration order.
    pub data: Vec<ChainStatusDto>,
}
