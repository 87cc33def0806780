//! Webhook execution payloads.
//!
//! Field names follow the Discord "Execute Webhook" JSON body; `None`
//! fields are omitted.

use serde::Serialize;

/// Discord's named "purple" colour.
pub const PURPLE: u32 = 0x009B_59B6;

/// Discord's named "orange" colour.
pub const ORANGE: u32 = 0x00E6_7E22;

/// Body of a webhook execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WebhookMessage {
    /// Message text.
    pub content: String,
    /// Display name override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Avatar override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Rich embeds, at most 10.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    /// Which mentions in `content` may ping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
}

impl WebhookMessage {
    /// Plain-text message with no mentions allowed.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            allowed_mentions: Some(AllowedMentions::none()),
            ..Self::default()
        }
    }
}

/// A link embed with an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    /// Embed title.
    pub title: String,
    /// Link target of the title.
    pub url: String,
    /// Embed body text.
    pub description: String,
    /// Sidebar colour as `0xRRGGBB`.
    pub color: u32,
    /// Large image shown below the body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
}

/// Image attachment of an [`Embed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedImage {
    /// Image source.
    pub url: String,
}

/// Mention whitelist: only the listed roles are pinged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllowedMentions {
    /// Mention types parsed from content; always empty here so that only
    /// the explicit `roles` list applies.
    pub parse: Vec<String>,
    /// Role ids that may be pinged, as strings.
    pub roles: Vec<String>,
}

impl AllowedMentions {
    /// Allows no mentions at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Allows exactly these roles.
    #[must_use]
    pub fn roles(roles: impl IntoIterator<Item = String>) -> Self {
        Self {
            parse: Vec::new(),
            roles: roles.into_iter().collect(),
        }
    }
}
