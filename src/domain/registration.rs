//! Webhook registrations: which Discord webhook wants which chain.

use std::fmt;

use reqwest::Url;

use super::{GuildId, RoleId, WebhookId};

/// Ordered list of roles to mention, persisted as a comma-joined column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleIds(Vec<RoleId>);

impl RoleIds {
    /// Wraps an ordered role list.
    #[must_use]
    pub fn new(roles: Vec<RoleId>) -> Self {
        Self(roles)
    }

    /// Parses a comma-joined column. Blank entries are ignored and entries
    /// that are not integers are dropped with a warning. Returns `None` if
    /// nothing usable remains.
    #[must_use]
    pub fn parse_column(column: &str) -> Option<Self> {
        let roles: Vec<RoleId> = column
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(|part| match part.parse() {
                Ok(role) => Some(role),
                Err(_) => {
                    tracing::warn!(entry = part, "ignoring malformed role id");
                    None
                }
            })
            .collect();
        (!roles.is_empty()).then_some(Self(roles))
    }

    /// Comma-joined column form.
    #[must_use]
    pub fn to_column(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Roles in mention order.
    pub fn iter(&self) -> impl Iterator<Item = RoleId> + '_ {
        self.0.iter().copied()
    }

    /// Number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no roles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A webhook URL that is not of the form `.../webhooks/{id}/{token}`.
#[derive(Debug, thiserror::Error)]
#[error("invalid webhook url: {0}")]
pub struct InvalidWebhookUrl(pub String);

/// A Discord webhook subscribed to one chain's referendum notifications.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookRegistration {
    /// Webhook id; unique across the store.
    pub id: WebhookId,
    /// Guild that owns the webhook (used for role lookups).
    pub guild_id: GuildId,
    /// Name of the chain this webhook listens to.
    pub chain: String,
    /// Webhook token.
    pub token: String,
    /// Full execution URL (contains the token).
    pub url: String,
    /// Roles to mention in each notification.
    pub role_ids: Option<RoleIds>,
}

impl WebhookRegistration {
    /// Builds a registration from a webhook execution URL, taking the id and
    /// token from its path.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidWebhookUrl`] if the URL does not parse, is not
    /// http(s), or lacks the `webhooks/{id}/{token}` segments.
    pub fn from_webhook_url(
        chain: impl Into<String>,
        guild_id: GuildId,
        url: &str,
        role_ids: Option<RoleIds>,
    ) -> Result<Self, InvalidWebhookUrl> {
        let invalid = |reason: &str| InvalidWebhookUrl(reason.to_string());

        let parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.collect())
            .unwrap_or_default();
        let mut tail = segments
            .iter()
            .skip_while(|segment| **segment != "webhooks")
            .skip(1);
        let id = tail
            .next()
            .and_then(|raw| raw.parse::<WebhookId>().ok())
            .ok_or_else(|| invalid("missing webhook id"))?;
        let token = tail
            .next()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| invalid("missing webhook token"))?;

        Ok(Self {
            id,
            guild_id,
            chain: chain.into(),
            token: (*token).to_string(),
            url: url.to_string(),
            role_ids: role_ids.filter(|roles| !roles.is_empty()),
        })
    }
}

impl fmt::Debug for WebhookRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookRegistration")
            .field("id", &self.id)
            .field("guild_id", &self.guild_id)
            .field("chain", &self.chain)
            .field("token", &"<redacted>")
            .field("role_ids", &self.role_ids)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const URL: &str = "https://discord.com/api/webhooks/1122334455/tok-en_123";

    #[test]
    fn role_column_round_trip_keeps_order() {
        let Some(roles) = RoleIds::parse_column("20,10") else {
            panic!("roles expected");
        };
        assert_eq!(roles.iter().collect::<Vec<_>>(), vec![RoleId::new(20), RoleId::new(10)]);
        assert_eq!(roles.to_column(), "20,10");
    }

    #[test]
    fn empty_role_column_is_none() {
        assert_eq!(RoleIds::parse_column(""), None);
        assert_eq!(RoleIds::parse_column(" , "), None);
    }

    #[test]
    fn malformed_role_entries_are_dropped() {
        let Some(roles) = RoleIds::parse_column("10,abc,20") else {
            panic!("roles expected");
        };
        assert_eq!(roles.len(), 2);
    }

    #[test]
    fn registration_from_url() {
        let Ok(reg) = WebhookRegistration::from_webhook_url("Polkadot", GuildId::new(9), URL, None)
        else {
            panic!("valid url rejected");
        };
        assert_eq!(reg.id, WebhookId::new(1_122_334_455));
        assert_eq!(reg.token, "tok-en_123");
        assert_eq!(reg.chain, "Polkadot");
        assert_eq!(reg.url, URL);
    }

    #[test]
    fn versioned_api_path_is_accepted() {
        let url = "https://discord.com/api/v10/webhooks/77/abc";
        let reg = WebhookRegistration::from_webhook_url("Kusama", GuildId::new(1), url, None).ok();
        assert_eq!(reg.map(|r| r.id), Some(WebhookId::new(77)));
    }

    #[test]
    fn url_without_token_rejected() {
        let url = "https://discord.com/api/webhooks/77";
        assert!(WebhookRegistration::from_webhook_url("Kusama", GuildId::new(1), url, None).is_err());
    }

    #[test]
    fn non_http_scheme_rejected() {
        let url = "ftp://discord.com/api/webhooks/77/abc";
        assert!(WebhookRegistration::from_webhook_url("Kusama", GuildId::new(1), url, None).is_err());
    }

    #[test]
    fn empty_role_list_is_dropped() {
        let reg = WebhookRegistration::from_webhook_url(
            "Polkadot",
            GuildId::new(9),
            URL,
            Some(RoleIds::new(vec![])),
        )
        .ok();
        assert_eq!(reg.and_then(|r| r.role_ids), None);
    }

    #[test]
    fn debug_redacts_token() {
        let Ok(reg) = WebhookRegistration::from_webhook_url("Polkadot", GuildId::new(9), URL, None)
        else {
            panic!("valid url rejected");
        };
        let rendered = format!("{reg:?}");
        assert!(!rendered.contains("tok-en_123"));
    }
}
