//! Admin REST API: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; `/health` sits at the
//! root. The OpenAPI document is served at `/api-docs/openapi.json`, with
//! Swagger UI at `/swagger-ui` when the `swagger-ui` feature is enabled.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of the admin API.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "governance-notify admin API"),
    paths(
        handlers::system::health_handler,
        handlers::chains::list_chains,
        handlers::webhooks::register_webhook,
        handlers::webhooks::list_guild_webhooks,
        handlers::webhooks::delete_webhook,
    ),
    components(schemas(
        handlers::system::HealthResponse,
        dto::ChainStatusDto,
        dto::ChainListResponse,
        dto::RegisterWebhookRequest,
        dto::WebhookDto,
        dto::WebhookListResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "System", description = "Service health"),
        (name = "Chains", description = "Watched chains and watcher status"),
        (name = "Webhooks", description = "Webhook subscriptions"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());
    with_docs(router)
}

#[cfg(feature = "swagger-ui")]
fn with_docs(router: Router<AppState>) -> Router<AppState> {
    router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn with_docs(router: Router<AppState>) -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    router.route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
