//! Chain status handler.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ChainListResponse, ChainStatusDto};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, NotifierError};
use crate::watcher::WatcherStatus;

/// `GET /chains`: Configured chains with their watcher status.
///
/// # Errors
///
/// Returns [`NotifierError::Store`] if subscription counts cannot be read.
#[utoipa::path(
    get,
    path = "/api/v1/chains",
    tag = "Chains",
    summary = "List chains",
    description = "Returns every configured chain with its watcher state, the endpoint in use and the number of subscribed webhooks.",
    responses(
        (status = 200, description = "Chain list", body = ChainListResponse),
        (status = 500, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn list_chains(
    State(state): State<AppState>,
) -> Result<Json<ChainListResponse>, NotifierError> {
    let mut data = Vec::with_capacity(state.catalog.len());
    for chain in state.catalog.chains() {
        let status = state
            .watcher(&chain.name)
            .map(|handle| handle.status())
            .unwrap_or_default();
        let subscriptions = state.store.count_for_chain(&chain.name).await?;
        let WatcherStatus {
            state: watcher_state,
            since,
            last_referendum,
            reconnects,
        } = status;

        data.push(ChainStatusDto {
            name: chain.name.clone(),
            is_relay: chain.is_relay,
            endpoints: chain.endpoints.len(),
            state: watcher_state.name().to_string(),
            endpoint: watcher_state.endpoint().map(ToString::to_string),
            since,
            last_referendum: last_referendum.map(|index| index.get()),
            reconnects,
            subscriptions,
        });
    }
    Ok(Json(ChainListResponse { data }))
}

/// Chain routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/chains", get(list_chains))
}
