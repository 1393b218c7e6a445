// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use makula_auth::{AuthFlow, SessionManager};
use makula_core::{IdentityLinkStore, MakulaError, MediaStore, RecordStore};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{api_key_middleware, ApiKeyConfig};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Auth flow operations (login, register, password change, setup).
    pub auth: Arc<AuthFlow>,
    /// Web session store.
    pub sessions: Arc<SessionManager>,
    /// Telegram identity link store.
    pub links: Arc<dyn IdentityLinkStore>,
    /// Submission record store.
    pub records: Arc<dyn RecordStore>,
    /// Photo hosting; `None` disables web photo uploads.
    pub media: Option<Arc<dyn MediaStore>>,
}

/// Gateway server configuration (mirrors ServerConfig from makula-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// API key for the bot-facing routes (None = API disabled).
    pub api_key: Option<String>,
}

/// Builds the gateway router.
///
/// - `/health` is public;
/// - `/auth/*` and `/waste/*` authenticate via the session cookie inside the
///   handlers;
/// - `/api/*` requires the `x-api-key` header.
pub fn build_router(config: &ServerConfig, state: GatewayState) -> Router {
    let api_key = ApiKeyConfig {
        api_key: config.api_key.clone(),
    };

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let web_routes = Router::new()
        .route("/auth/session", get(handlers::auth::get_session))
        .route("/auth/login", post(handlers::auth::post_login))
        .route("/auth/logout", get(handlers::auth::get_logout))
        .route("/auth/register", post(handlers::auth::post_register))
        .route("/auth/password", post(handlers::auth::post_password))
        .route("/auth/setup", post(handlers::auth::post_setup))
        .route("/waste/add", post(handlers::waste::post_add))
        .route("/waste/history", get(handlers::waste::get_history))
        .route("/waste/stats", get(handlers::waste::get_stats))
        .route("/waste/types", get(handlers::waste::get_types))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/api/paper-types", get(handlers::api::get_paper_types))
        .route("/api/surrender", post(handlers::api::post_surrender))
        .route("/api/link-telegram", post(handlers::api::post_link_telegram))
        .route("/api/resolve/{login}", get(handlers::api::get_resolve))
        .route("/api/stats/{telegram_id}", get(handlers::api::get_stats))
        .route("/api/history/{telegram_id}", get(handlers::api::get_history))
        .route_layer(axum_middleware::from_fn_with_state(
            api_key,
            api_key_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(web_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Starts the gateway HTTP server and serves until the process shuts down.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), MakulaError> {
    let app = build_router(config, state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MakulaError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| MakulaError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
