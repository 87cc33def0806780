//! Chain watching: one long-lived task per configured chain.
//!
//! ```text
//!  Disconnected ──► Connecting ──► Subscribed ──► Dispatching
//!        ▲              │              │  ▲            │
//!        └── backoff ◄──┘◄─────────────┘  └────────────┘
//! ```
//!
//! A watcher picks the first healthy endpoint of its chain
//! ([`connector::connect`]), follows the finalized event stream, and hands
//! every detected referendum to a [`ReferendumHandler`]. Connection and
//! subscription failures are never fatal: the watcher waits out an
//! exponential backoff and starts over. Watchers share nothing with each
//! other, so one unreachable chain never delays another.

pub mod chain_watcher;
pub mod connector;
pub mod filter;
pub mod supervisor;

use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};

use crate::domain::{Chain, ReferendumIndex};

pub use chain_watcher::ChainWatcher;
pub use connector::{Connection, connect};
pub use filter::{count_referendum_started, find_referendum_started};
pub use supervisor::{WatcherHandle, spawn_watchers};

/// Receives every referendum a watcher detects.
///
/// Called inline from the watcher loop, so a chain processes at most one
/// batch at a time. Implementations must not fail: whatever goes wrong
/// inside is theirs to log.
#[async_trait]
pub trait ReferendumHandler: Send + Sync + 'static {
    /// A referendum with `index` started on `chain`.
    async fn referendum_started(&self, chain: &Chain, index: ReferendumIndex);
}

/// Reconnect timing for chain watchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnect after a healthy period.
    pub initial_delay: Duration,
    /// Upper bound for the delay between reconnect attempts.
    pub max_delay: Duration,
    /// Time allowed for one endpoint to open and answer the liveness probe.
    pub probe_timeout: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(30),
        }
    }
}

impl ReconnectPolicy {
    /// Backoff schedule that never gives up.
    #[must_use]
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_delay,
            initial_interval: self.initial_delay,
            max_interval: self.max_delay,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// Where a watcher is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatcherState {
    /// No connection; waiting out the reconnect delay.
    Disconnected,
    /// Trying the chain's endpoints in order.
    Connecting {
        /// Consecutive connection attempts since the last healthy session.
        attempt: u32,
    },
    /// Following the finalized event stream of `endpoint`.
    Subscribed {
        /// Endpoint currently in use.
        endpoint: String,
    },
    /// Handing a detected referendum to the handler.
    Dispatching {
        /// Endpoint currently in use.
        endpoint: String,
        /// Referendum being dispatched.
        referendum: ReferendumIndex,
    },
}

impl WatcherState {
    /// Short lowercase name of the state.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting { .. } => "connecting",
            Self::Subscribed { .. } => "subscribed",
            Self::Dispatching { .. } => "dispatching",
        }
    }

    /// Endpoint in use, if connected.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Subscribed { endpoint } | Self::Dispatching { endpoint, .. } => Some(endpoint),
            Self::Disconnected | Self::Connecting { .. } => None,
        }
    }
}

/// Latest published status of one watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherStatus {
    /// Current state.
    pub state: WatcherState,
    /// When the current state was entered.
    pub since: DateTime<Utc>,
    /// Most recent referendum handed to the handler.
    pub last_referendum: Option<ReferendumIndex>,
    /// Sessions that ended and had to be re-established.
    pub reconnects: u64,
}

impl Default for WatcherStatus {
    fn default() -> Self {
        Self {
            state: WatcherState::Disconnected,
            since: Utc::now(),
            last_referendum: None,
            reconnects: 0,
        }
    }
}
