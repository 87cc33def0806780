//! Discord side: webhook delivery and role resolution.
//!
//! The dispatcher and the admin API talk to Discord only through the
//! [`WebhookSink`] and [`RoleResolver`] traits. [`DiscordClient`] implements
//! both over the Discord REST API.

pub mod client;
pub mod payload;

use std::fmt;

use async_trait::async_trait;

use crate::domain::{GuildId, RoleId};
use crate::error::{DeliveryError, RoleLookupError};

pub use client::DiscordClient;
pub use payload::{AllowedMentions, Embed, EmbedImage, WebhookMessage};

/// Delivers messages to webhook URLs.
#[async_trait]
pub trait WebhookSink: Send + Sync + fmt::Debug + 'static {
    /// Executes the webhook at `url` with `message`.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Gone`] when the webhook no longer exists,
    /// or another [`DeliveryError`] for any other failure.
    async fn execute(&self, url: &str, message: &WebhookMessage) -> Result<(), DeliveryError>;

    /// Deletes the webhook at `url` on the platform.
    ///
    /// # Errors
    ///
    /// Same classification as [`WebhookSink::execute`].
    async fn delete(&self, url: &str) -> Result<(), DeliveryError>;
}

/// Looks up guild roles for mentions.
#[async_trait]
pub trait RoleResolver: Send + Sync + fmt::Debug + 'static {
    /// Resolves `role` in `guild`; `Ok(None)` means the role does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RoleLookupError`] if the lookup itself failed.
    async fn resolve(
        &self,
        guild: GuildId,
        role: RoleId,
    ) -> Result<Option<RoleMention>, RoleLookupError>;
}

/// A role that exists and can be mentioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMention {
    /// Role id.
    pub id: RoleId,
    /// Role display name, when known.
    pub name: Option<String>,
}

impl RoleMention {
    /// Mention of a role known only by id.
    #[must_use]
    pub const fn new(id: RoleId) -> Self {
        Self { id, name: None }
    }
}

impl fmt::Display for RoleMention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id.mention())
    }
}
