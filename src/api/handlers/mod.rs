//! REST endpoint handlers organized by resource.

pub mod chains;
pub mod system;
pub mod webhooks;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(chains::routes())
        .merge(webhooks::routes())
}
