//! Error types for every layer of the notifier.
//!
//! Failures inside the watcher and dispatch core never reach a caller: each
//! kind below is either recovered locally (next endpoint, reconnect, skip
//! destination) or logged. Only [`NotifierError`] crosses a process
//! boundary, as the JSON body of an admin API response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::WebhookId;

/// Failure talking to a chain RPC endpoint.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The Substrate client reported an error.
    #[error(transparent)]
    Client(#[from] subxt::Error),

    /// The endpoint did not answer within the probe timeout.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The event subscription ended on the server side.
    #[error("subscription closed by the endpoint")]
    SubscriptionClosed,
}

/// Every endpoint of a chain failed to connect or to pass the liveness probe.
#[derive(Debug, thiserror::Error)]
#[error("no reachable endpoint for chain {chain} ({} attempted)", .failures.len())]
pub struct ConnectionFailure {
    /// Name of the chain that could not be reached.
    pub chain: String,
    /// Each attempted endpoint, in list order, with the reason it failed.
    pub failures: Vec<(String, RpcError)>,
}

/// Subscription store failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database driver error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed at startup.
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A registration with this id already exists.
    #[error("webhook {0} is already registered")]
    Duplicate(WebhookId),

    /// A stored value does not fit the domain model.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Failure delivering to (or deleting) a webhook destination.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The webhook no longer exists on the chat platform.
    #[error("webhook no longer exists")]
    Gone,

    /// The platform refused the request for another reason.
    #[error("rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Platform error code, when the body carried one.
        code: Option<u64>,
        /// Human-readable reason.
        message: String,
    },

    /// The request never completed (DNS, TLS, timeout, reset).
    #[error("transport error: {0}")]
    Transport(String),
}

impl DeliveryError {
    /// Returns `true` when the destination was deleted outside the bot.
    #[must_use]
    pub const fn is_gone(&self) -> bool {
        matches!(self, Self::Gone)
    }
}

/// Failure looking up a guild role.
#[derive(Debug, thiserror::Error)]
pub enum RoleLookupError {
    /// The request never completed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The platform refused the lookup.
    #[error("lookup rejected with status {0}")]
    Rejected(u16),
}

/// Invalid startup configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable holds an unusable value.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },

    /// The chains file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path of the chains file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The chains file is not valid JSON for the chain model.
    #[error("invalid chains file: {0}")]
    Json(#[from] serde_json::Error),

    /// The chain list violates a catalog invariant.
    #[error("invalid chain catalog: {0}")]
    InvalidChains(String),

    /// The HTTP client could not be built.
    #[error("http client: {0}")]
    HttpClient(String),
}

/// Structured JSON error response body.
///
/// ```json
/// { "error": { "code": 2001, "message": "chain not found: Westend" } }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Admin API error with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 / 422                    |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The webhook URL was rejected by the platform as nonexistent.
    #[error("webhook does not exist")]
    WebhookGone,

    /// No configured chain has this name.
    #[error("chain not found: {0}")]
    ChainNotFound(String),

    /// No registration has this id.
    #[error("webhook not found: {0}")]
    WebhookNotFound(WebhookId),

    /// The webhook is already registered.
    #[error("webhook {0} is already registered")]
    AlreadyRegistered(WebhookId),

    /// Subscription store failure.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for NotifierError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(id) => Self::AlreadyRegistered(id),
            other => Self::Store(other),
        }
    }
}

impl NotifierError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::WebhookGone => 1002,
            Self::ChainNotFound(_) => 2001,
            Self::WebhookNotFound(_) => 2002,
            Self::AlreadyRegistered(_) => 2003,
            Self::Store(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::WebhookGone => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ChainNotFound(_) | Self::WebhookNotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyRegistered(_) => StatusCode::CONFLICT,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for NotifierError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        (status, axum::Json(body)).into_response()
    }
}
