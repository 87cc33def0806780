//! Subscription store: which webhooks listen to which chain.
//!
//! Backed by SQLite through `sqlx`. The schema lives in `migrations/` and
//! is applied on open.

pub mod models;
pub mod sqlite;

pub use sqlite::SubscriptionStore;
