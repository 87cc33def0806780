//! governance-notify entry point.
//!
//! Starts one watcher per configured chain and the admin HTTP API.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use governance_notify::api;
use governance_notify::app_state::AppState;
use governance_notify::config::{LogFormat, NotifierConfig};
use governance_notify::discord::{DiscordClient, RoleResolver, WebhookSink};
use governance_notify::dispatch::Dispatcher;
use governance_notify::domain::ChainCatalog;
use governance_notify::rpc::SubstrateConnector;
use governance_notify::store::SubscriptionStore;
use governance_notify::watcher::spawn_watchers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = NotifierConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting governance-notify");

    // Chains and subscriptions
    let catalog = Arc::new(
        ChainCatalog::load(config.chains_file.as_deref()).context("loading chain catalog")?,
    );
    let store = SubscriptionStore::connect(&config.database_url, config.database_max_connections)
        .await
        .with_context(|| format!("opening database {}", config.database_url))?;

    // Discord
    let discord = Arc::new(
        DiscordClient::new(
            config.discord_api_base.clone(),
            config.discord_token.clone(),
            config.discord_timeout,
        )
        .context("building discord client")?,
    );
    if !discord.has_bot_token() {
        tracing::warn!("DISCORD_TOKEN not set, role mentions are disabled");
    }

    // Watchers
    let dispatcher = Arc::new(Dispatcher::new(
        store.clone(),
        Arc::clone(&discord) as Arc<dyn WebhookSink>,
        Arc::clone(&discord) as Arc<dyn RoleResolver>,
    ));
    let watchers = spawn_watchers(
        catalog.chains(),
        Arc::new(SubstrateConnector::new()),
        dispatcher,
        config.reconnect,
    );
    tracing::info!(chains = catalog.len(), "chain watchers started");

    // Build application state
    let app_state = AppState {
        store,
        catalog,
        watchers: watchers.into(),
        discord,
    };
    let shutdown_state = app_state.clone();

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving admin api")?;

    for handle in shutdown_state.watchers.iter() {
        handle.abort();
    }
    shutdown_state.store.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
