//! Domain layer: chains, chain events, and webhook registrations.
//!
//! These types are shared by the watcher, the dispatcher, the store and
//! the admin API. None of them perform I/O except [`ChainCatalog::load`].

pub mod chain;
pub mod event;
pub mod ids;
pub mod registration;

pub use chain::{Chain, ChainCatalog};
pub use event::{ChainEvent, ReferendumIndex};
pub use ids::{GuildId, RoleId, WebhookId};
pub use registration::{InvalidWebhookUrl, RoleIds, WebhookRegistration};
