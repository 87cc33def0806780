//! # governance-notify
//!
//! Discord notifications for governance referenda on Polkadot-family
//! chains.
//!
//! One watcher per configured chain follows the chain's finalized event
//! stream. When a block carries a `Democracy::Started` event, the
//! dispatcher posts a notice to every Discord webhook registered for that
//! chain, mentioning the roles each registration asked for. Registrations
//! are managed through a small admin REST API.
//!
//! ## Architecture
//!
//! ```text
//! Chain RPC endpoints (rpc/)
//!     │
//!     ├── ChainWatcher × N (watcher/)
//!     │       connect ─► subscribe ─► filter ─► handler
//!     │
//!     ├── Dispatcher (dispatch/)
//!     │       ├── SubscriptionStore (store/, SQLite)
//!     │       └── DiscordClient (discord/)
//!     │
//!     └── Admin REST API (api/)
//!             └── SubscriptionStore, watcher status
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod discord;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod rpc;
pub mod store;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;
