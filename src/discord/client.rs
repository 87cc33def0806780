//! Discord REST client built on `reqwest`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;

use super::{RoleMention, RoleResolver, WebhookMessage, WebhookSink};
use crate::domain::{GuildId, RoleId};
use crate::error::{ConfigError, DeliveryError, RoleLookupError};

/// Discord JSON error code for "Unknown Webhook".
pub const UNKNOWN_WEBHOOK: u64 = 10_015;

/// Error body Discord attaches to failed requests.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RoleBody {
    name: String,
}

/// Discord REST client for webhook delivery and role lookups.
///
/// Webhook calls are authenticated by the token embedded in the webhook
/// URL. Role lookups need a bot token; without one every role is reported
/// as unknown.
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: Option<String>,
}

impl fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordClient")
            .field("api_base", &self.api_base)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl DiscordClient {
    /// Creates a client for the API rooted at `api_base`
    /// (e.g. `https://discord.com/api/v10`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be built.
    pub fn new(
        api_base: impl Into<String>,
        bot_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.filter(|token| !token.trim().is_empty()),
        })
    }

    /// Returns `true` when role lookups are possible.
    #[must_use]
    pub const fn has_bot_token(&self) -> bool {
        self.bot_token.is_some()
    }
}

#[async_trait]
impl WebhookSink for DiscordClient {
    async fn execute(&self, url: &str, message: &WebhookMessage) -> Result<(), DeliveryError> {
        let mut target =
            Url::parse(url).map_err(|e| DeliveryError::Transport(format!("invalid url: {e}")))?;
        // wait=true makes Discord validate the message before answering
        target.query_pairs_mut().append_pair("wait", "true");

        let response = self
            .http
            .post(target)
            .json(message)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        classify(response).await
    }

    async fn delete(&self, url: &str) -> Result<(), DeliveryError> {
        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        classify(response).await
    }
}

#[async_trait]
impl RoleResolver for DiscordClient {
    async fn resolve(
        &self,
        guild: GuildId,
        role: RoleId,
    ) -> Result<Option<RoleMention>, RoleLookupError> {
        let Some(token) = &self.bot_token else {
            tracing::debug!(%guild, %role, "no bot token, role treated as unknown");
            return Ok(None);
        };

        let url = format!("{}/guilds/{guild}/roles/{role}", self.api_base);
        let response = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, format!("Bot {token}"))
            .send()
            .await
            .map_err(|e| RoleLookupError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: RoleBody = response
                    .json()
                    .await
                    .map_err(|e| RoleLookupError::Transport(e.to_string()))?;
                Ok(Some(RoleMention {
                    id: role,
                    name: Some(body.name),
                }))
            }
            status => Err(RoleLookupError::Rejected(status.as_u16())),
        }
    }
}

/// Maps a Discord response onto the delivery outcome.
async fn classify(response: Response) -> Result<(), DeliveryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    if status == StatusCode::NOT_FOUND || body.code == Some(UNKNOWN_WEBHOOK) {
        return Err(DeliveryError::Gone);
    }
    Err(DeliveryError::Rejected {
        status: status.as_u16(),
        code: body.code,
        message: body.message.unwrap_or(text),
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::net::SocketAddr;

    use axum::Json;
    use axum::Router;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::{get, post};
    use serde_json::{Value, json};

    use super::*;

    async fn fake_discord() -> SocketAddr {
        let app = Router::new()
            .route(
                "/api/webhooks/{id}/{token}",
                post(
                    |Path((id, _token)): Path<(u64, String)>,
                     Query(query): Query<std::collections::HashMap<String, String>>| async move {
                        match (id, query.get("wait").map(String::as_str)) {
                            (1, Some("true")) => (AxumStatus::OK, Json(json!({"id": "1"}))),
                            (2, _) => (
                                AxumStatus::NOT_FOUND,
                                Json(json!({"code": 10015, "message": "Unknown Webhook"})),
                            ),
                            (3, _) => (
                                AxumStatus::BAD_REQUEST,
                                Json(json!({"code": 50006, "message": "Cannot send an empty message"})),
                            ),
                            _ => (AxumStatus::INTERNAL_SERVER_ERROR, Json(Value::Null)),
                        }
                    },
                )
                .delete(|| async { AxumStatus::NO_CONTENT }),
            )
            .route(
                "/api/v10/guilds/{guild}/roles/{role}",
                get(
                    |Path((_guild, role)): Path<(u64, u64)>, headers: HeaderMap| async move {
                        let authorized = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            == Some("Bot secret");
                        match (authorized, role) {
                            (false, _) => (AxumStatus::UNAUTHORIZED, Json(Value::Null)),
                            (true, 10) => (AxumStatus::OK, Json(json!({"id": "10", "name": "voters"}))),
                            (true, _) => (AxumStatus::NOT_FOUND, Json(json!({"code": 10011}))),
                        }
                    },
                ),
            );
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        addr
    }

    fn client(addr: SocketAddr, token: Option<&str>) -> DiscordClient {
        let Ok(client) = DiscordClient::new(
            format!("http://{addr}/api/v10/"),
            token.map(ToString::to_string),
            Duration::from_secs(5),
        ) else {
            panic!("client build failed");
        };
        client
    }

    #[tokio::test]
    async fn execute_success_sends_wait_flag() {
        let addr = fake_discord().await;
        let url = format!("http://{addr}/api/webhooks/1/tok");
        let result = client(addr, None).execute(&url, &WebhookMessage::text("hi")).await;
        assert!(result.is_ok(), "{result:?}");
    }

    #[tokio::test]
    async fn unknown_webhook_is_gone() {
        let addr = fake_discord().await;
        let url = format!("http://{addr}/api/webhooks/2/tok");
        let result = client(addr, None).execute(&url, &WebhookMessage::text("hi")).await;
        assert!(matches!(result, Err(DeliveryError::Gone)));
    }

    #[tokio::test]
    async fn other_rejections_keep_status_and_code() {
        let addr = fake_discord().await;
        let url = format!("http://{addr}/api/webhooks/3/tok");
        let result = client(addr, None).execute(&url, &WebhookMessage::text("")).await;
        let Err(DeliveryError::Rejected { status, code, message }) = result else {
            panic!("expected rejection, got {result:?}");
        };
        assert_eq!(status, 400);
        assert_eq!(code, Some(50006));
        assert_eq!(message, "Cannot send an empty message");
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let Ok(client) = DiscordClient::new("http://127.0.0.1:9", None, Duration::from_millis(500))
        else {
            panic!("client build failed");
        };
        let result = client
            .execute("http://127.0.0.1:9/api/webhooks/1/tok", &WebhookMessage::text("hi"))
            .await;
        assert!(matches!(result, Err(DeliveryError::Transport(_))));
    }

    #[tokio::test]
    async fn delete_succeeds_on_no_content() {
        let addr = fake_discord().await;
        let url = format!("http://{addr}/api/webhooks/1/tok");
        assert!(client(addr, None).delete(&url).await.is_ok());
    }

    #[tokio::test]
    async fn role_lookup_uses_bot_token() {
        let addr = fake_discord().await;
        let discord = client(addr, Some("secret"));
        let known = discord.resolve(GuildId::new(1), RoleId::new(10)).await;
        let Ok(Some(mention)) = known else {
            panic!("expected role, got {known:?}");
        };
        assert_eq!(mention.name.as_deref(), Some("voters"));
        assert_eq!(mention.to_string(), "<@&10>");

        let unknown = discord.resolve(GuildId::new(1), RoleId::new(99)).await;
        assert!(matches!(unknown, Ok(None)));
    }

    #[tokio::test]
    async fn role_lookup_errors_are_distinct_from_unknown() {
        let addr = fake_discord().await;
        let result = client(addr, Some("wrong")).resolve(GuildId::new(1), RoleId::new(10)).await;
        assert!(matches!(result, Err(RoleLookupError::Rejected(401))));
    }

    #[tokio::test]
    async fn no_bot_token_means_unknown_role() {
        let addr = fake_discord().await;
        let discord = client(addr, Some("  "));
        assert!(!discord.has_bot_token());
        let result = discord.resolve(GuildId::new(1), RoleId::new(10)).await;
        assert!(matches!(result, Ok(None)));
    }
}
