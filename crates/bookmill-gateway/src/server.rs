// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use bookmill_core::BookmillError;
use bookmill_processing::BookService;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;
use crate::sse;

/// Room for multipart boundaries and the metadata fields on top of the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Process start time for the health endpoint.
#[derive(Clone)]
pub struct HealthState {
    pub start_time: Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub service: Arc<BookService>,
    pub auth: AuthConfig,
    pub health: HealthState,
}

impl GatewayState {
    pub fn new(service: Arc<BookService>, bearer_token: Option<String>) -> Self {
        Self {
            service,
            auth: AuthConfig { bearer_token },
            health: HealthState {
                start_time: Instant::now(),
            },
        }
    }
}

/// Where the gateway listens (mirrors the `[server]` config section).
#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    /// 0 picks an ephemeral port.
    pub port: u16,
    pub bearer_token: Option<String>,
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[redacted]"))
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

/// Builds the full router:
/// - GET /health (no auth)
/// - everything under /v1 (bearer auth when a token is configured)
pub fn build_router(state: GatewayState, max_upload_bytes: usize) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let upload = post(handlers::upload_book)
        .layer::<_, std::convert::Infallible>(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
        ));

    let api_routes = Router::new()
        .route("/v1/scan", post(handlers::post_scan))
        .route("/v1/books", get(handlers::list_books).merge(upload))
        .route("/v1/books/{id}", get(handlers::get_book))
        .route("/v1/books/{id}/start", post(handlers::start_book))
        .route("/v1/books/{id}/pause", post(handlers::pause_book))
        .route("/v1/books/{id}/cancel", post(handlers::cancel_book))
        .route(
            "/v1/books/{id}/progress",
            get(handlers::check_progress).post(handlers::check_progress),
        )
        .route("/v1/books/{id}/export", get(handlers::export_questions))
        .route("/v1/books/{id}/export.csv", get(handlers::download_csv))
        .route("/v1/books/{id}/events", get(sse::book_events))
        .route("/v1/stats", get(handlers::get_stats))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server and serve until `shutdown` resolves.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), BookmillError> {
    let app = build_router(state, config.max_upload_bytes);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BookmillError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;
    let local = listener.local_addr().map_err(BookmillError::from)?;

    tracing::info!(addr = %local, auth = config.bearer_token.is_some(), "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| BookmillError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
