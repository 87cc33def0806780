//! Webhook registration DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{GuildId, RoleId, WebhookId, WebhookRegistration};

/// Most roles a registration may mention.
pub const MAX_ROLES: usize = 5;

/// Request body for `POST /webhooks`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterWebhookRequest {
    /// Name of the chain to follow (e.g. `"Polkadot"`).
    pub chain: String,
    /// Guild that owns the webhook.
    #[schema(value_type = String)]
    pub guild_id: GuildId,
    /// Webhook execution URL, `https://discord.com/api/webhooks/{id}/{token}`.
    pub webhook_url: String,
    /// Roles to mention in each notification, in mention order.
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub role_ids: Vec<RoleId>,
}

/// A registration as returned by the API. The webhook token is never
/// exposed.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookDto {
    /// Webhook id.
    #[schema(value_type = String)]
    pub id: WebhookId,
    /// Owning guild.
    #[schema(value_type = String)]
    pub guild_id: GuildId,
    /// Followed chain.
    pub chain: String,
    /// Mentioned roles, in mention order.
    #[schema(value_type = Vec<String>)]
    pub role_ids: Vec<RoleId>,
}

impl From<&WebhookRegistration> for WebhookDto {
    fn from(registration: &WebhookRegistration) -> Self {
        Self {
            id: registration.id,
            guild_id: registration.guild_id,
            chain: registration.chain.clone(),
            role_ids: registration
                .role_ids
                .as_ref()
                .map(|roles| roles.iter().collect())
                .unwrap_or_default(),
        }
    }
}

/// Response body for `GET /guilds/{guild_id}/webhooks`.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookListResponse {
    /// Registrations of the guild, ordered by id.
    pub data: Vec<WebhookDto>,
}
