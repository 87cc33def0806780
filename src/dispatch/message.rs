//! Notification message composition.

use crate::discord::payload::{ORANGE, PURPLE};
use crate::discord::{AllowedMentions, Embed, EmbedImage, RoleMention, WebhookMessage};
use crate::domain::{Chain, ReferendumIndex};

const SUBSCAN_IMAGE: &str = "https://miro.medium.com/max/1400/1*y-ihVke24XjJ4-sWS-5uyQ.png";
const POLKADOT_JS_URL: &str = "https://polkadot.js.org/apps/#/explorer";
const POLKADOT_JS_IMAGE: &str = "https://polkadot.js.org/extension/logo.jpg";

/// Subscan page of a referendum.
#[must_use]
pub fn subscan_url(chain: &Chain, index: ReferendumIndex) -> String {
    format!("https://{}.subscan.io/referenda/{index}", chain.subscan_slug())
}

/// Space-separated mentions, in the order given.
#[must_use]
pub fn mention_prefix(mentions: &[RoleMention]) -> String {
    mentions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The referendum notice sent to every subscribed webhook.
///
/// Only the roles in `mentions` may ping.
#[must_use]
pub fn referendum_notice(
    chain: &Chain,
    index: ReferendumIndex,
    mentions: &[RoleMention],
) -> WebhookMessage {
    let mut content = mention_prefix(mentions);
    if !content.is_empty() {
        content.push('\n');
    }
    content.push_str(&format!(
        "A new referendum is up for vote on {}.\n\
         For more information visit Subscan. Vote on Polkadot.js.",
        chain.name
    ));

    let subscan = Embed {
        title: "Subscan Referendum Info".to_string(),
        url: subscan_url(chain, index),
        description: "Click here to get more info on the voting on Subscan.".to_string(),
        color: PURPLE,
        image: Some(EmbedImage {
            url: SUBSCAN_IMAGE.to_string(),
        }),
    };
    let polkadot_js = Embed {
        title: "Polkadot.JS".to_string(),
        url: POLKADOT_JS_URL.to_string(),
        description: "Click here to access Polkadot.js for voting. Navigate to the desired \
                      chain, then go to the governance tab."
            .to_string(),
        color: ORANGE,
        image: Some(EmbedImage {
            url: POLKADOT_JS_IMAGE.to_string(),
        }),
    };

    WebhookMessage {
        content,
        username: Some(chain.webhook_username()),
        avatar_url: chain.logo_url.clone(),
        embeds: vec![subscan, polkadot_js],
        allowed_mentions: Some(AllowedMentions::roles(
            mentions.iter().map(|mention| mention.id.to_string()),
        )),
    }
}

/// Test message sent when a webhook is registered.
#[must_use]
pub fn registration_notice(chain: &Chain) -> WebhookMessage {
    WebhookMessage {
        username: Some(chain.webhook_username()),
        avatar_url: chain.logo_url.clone(),
        ..WebhookMessage::text(format!(
            "This channel will now be notified of new {} referenda.",
            chain.name
        ))
    }
}
