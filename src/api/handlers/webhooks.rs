//! Webhook registration handlers: register, list, delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::dto::{MAX_ROLES, RegisterWebhookRequest, WebhookDto, WebhookListResponse};
use crate::app_state::AppState;
use crate::dispatch::message::registration_notice;
use crate::domain::{GuildId, RoleIds, WebhookId, WebhookRegistration};
use crate::error::{ErrorResponse, NotifierError};

/// `POST /webhooks`: Subscribe a webhook to a chain.
///
/// A confirmation message is sent through the webhook first. A webhook
/// that no longer exists is rejected; any other delivery failure is only
/// logged.
///
/// # Errors
///
/// Returns [`NotifierError`] on validation failure, an unknown chain, a
/// nonexistent or already registered webhook, or a store failure.
#[utoipa::path(
    post,
    path = "/api/v1/webhooks",
    tag = "Webhooks",
    summary = "Register a webhook",
    description = "Subscribes a Discord webhook to the referendum notifications of one chain, optionally mentioning up to five roles.",
    request_body = RegisterWebhookRequest,
    responses(
        (status = 201, description = "Webhook registered", body = WebhookDto),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Chain not found", body = ErrorResponse),
        (status = 409, description = "Webhook already registered", body = ErrorResponse),
        (status = 422, description = "Webhook does not exist", body = ErrorResponse),
    )
)]
pub async fn register_webhook(
    State(state): State<AppState>,
    Json(req): Json<RegisterWebhookRequest>,
) -> Result<impl IntoResponse, NotifierError> {
    let chain = state
        .catalog
        .get(&req.chain)
        .ok_or_else(|| NotifierError::ChainNotFound(req.chain.clone()))?;

    if req.role_ids.len() > MAX_ROLES {
        return Err(NotifierError::InvalidRequest(format!(
            "at most {MAX_ROLES} roles can be mentioned"
        )));
    }

    let registration = WebhookRegistration::from_webhook_url(
        &chain.name,
        req.guild_id,
        &req.webhook_url,
        Some(RoleIds::new(req.role_ids)),
    )
    .map_err(|e| NotifierError::InvalidRequest(e.to_string()))?;

    if state.store.get(registration.id).await?.is_some() {
        return Err(NotifierError::AlreadyRegistered(registration.id));
    }

    match state
        .discord
        .execute(&registration.url, &registration_notice(chain))
        .await
    {
        Ok(()) => {}
        Err(e) if e.is_gone() => return Err(NotifierError::WebhookGone),
        Err(e) => {
            tracing::warn!(webhook = %registration.id, error = %e, "confirmation message failed");
        }
    }

    state.store.insert(&registration).await?;
    Ok((StatusCode::CREATED, Json(WebhookDto::from(&registration))))
}

/// `GET /guilds/{guild_id}/webhooks`: Registrations of a guild.
///
/// # Errors
///
/// Returns [`NotifierError::Store`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/guilds/{guild_id}/webhooks",
    tag = "Webhooks",
    summary = "List a guild's webhooks",
    description = "Returns every registration owned by the guild, ordered by webhook id.",
    params(
        ("guild_id" = String, Path, description = "Guild snowflake"),
    ),
    responses(
        (status = 200, description = "Registrations", body = WebhookListResponse),
        (status = 400, description = "Invalid guild id", body = ErrorResponse),
    )
)]
pub async fn list_guild_webhooks(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
) -> Result<Json<WebhookListResponse>, NotifierError> {
    let guild: GuildId = guild_id
        .parse()
        .map_err(|_| NotifierError::InvalidRequest(format!("invalid guild id: {guild_id}")))?;
    let registrations = state.store.for_guild(guild).await?;
    Ok(Json(WebhookListResponse {
        data: registrations.iter().map(WebhookDto::from).collect(),
    }))
}

/// `DELETE /webhooks/{id}`: Unsubscribe a webhook.
///
/// The registration is removed, then the webhook itself is deleted on
/// Discord on a best-effort basis.
///
/// # Errors
///
/// Returns [`NotifierError::WebhookNotFound`] if no registration has `id`.
#[utoipa::path(
    delete,
    path = "/api/v1/webhooks/{id}",
    tag = "Webhooks",
    summary = "Delete a webhook",
    description = "Removes the registration and deletes the Discord webhook.",
    params(
        ("id" = String, Path, description = "Webhook snowflake"),
    ),
    responses(
        (status = 204, description = "Webhook deleted"),
        (status = 400, description = "Invalid webhook id", body = ErrorResponse),
        (status = 404, description = "Webhook not found", body = ErrorResponse),
    )
)]
pub async fn delete_webhook(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, NotifierError> {
    let id: WebhookId = id
        .parse()
        .map_err(|_| NotifierError::InvalidRequest(format!("invalid webhook id: {id}")))?;
    let registration = state
        .store
        .get(id)
        .await?
        .ok_or(NotifierError::WebhookNotFound(id))?;

    if !state.store.delete(id).await? {
        return Err(NotifierError::WebhookNotFound(id));
    }

    match state.discord.delete(&registration.url).await {
        Ok(()) => tracing::info!(webhook = %id, "webhook deleted on discord"),
        Err(e) if e.is_gone() => tracing::debug!(webhook = %id, "webhook was already gone"),
        Err(e) => tracing::warn!(webhook = %id, error = %e, "webhook could not be deleted on discord"),
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Webhook routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/webhooks", post(register_webhook))
        .route("/webhooks/{id}", delete(delete_webhook))
        .route("/guilds/{guild_id}/webhooks", get(list_guild_webhooks))
}
