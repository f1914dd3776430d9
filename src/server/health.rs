//! Health check, metrics, and plugin endpoints
//!
//! - `/healthz` - Liveness: Is the process alive?
//! - `/readyz` - Readiness: Is the router connected and ready for calls?
//! - `/metrics` - Prometheus metrics in text format
//! - `/v1/*` - Traffic router plugin operations

use crate::server::metrics::SharedMetrics;
use crate::server::plugin_api::{self, SharedPlugin};
use axum::{
    extract::{FromRef, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use super::shutdown::ShutdownSignal;

/// Shared state for readiness tracking
///
/// Set to ready once the Kubernetes client is connected.
#[derive(Debug, Clone)]
pub struct ReadinessState {
    ready: Arc<std::sync::atomic::AtomicBool>,
}

impl ReadinessState {
    /// Create a new readiness state (initially not ready)
    pub fn new() -> Self {
        Self {
            ready: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    pub fn set_ready(&self) {
        self.ready.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// Mark as not ready (e.g., during shutdown)
    ///
    /// The readiness probe then returns 503.
    pub fn set_not_ready(&self) {
        self.ready.store(false, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Default for ReadinessState {
    fn default() -> Self {
        Self::new()
    }
}

/// Combined server state for all endpoints
#[derive(Clone)]
pub struct ServerState {
    readiness: ReadinessState,
    metrics: SharedMetrics,
    plugin: SharedPlugin,
}

impl ServerState {
    pub fn new(readiness: ReadinessState, metrics: SharedMetrics, plugin: SharedPlugin) -> Self {
        Self {
            readiness,
            metrics,
            plugin,
        }
    }
}

impl FromRef<ServerState> for SharedPlugin {
    fn from_ref(state: &ServerState) -> Self {
        state.plugin.clone()
    }
}

/// Liveness probe handler
async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe handler
///
/// Returns 200 OK if ready, 503 Service Unavailable if not.
async fn readyz(State(state): State<ServerState>) -> StatusCode {
    if state.readiness.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Prometheus metrics handler
async fn metrics(State(state): State<ServerState>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {}", e),
        )
            .into_response(),
    }
}

/// Build the router for health, metrics, and plugin endpoints
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(self::metrics))
        .route("/v1/type", post(plugin_api::handle_type))
        .route("/v1/set-weight", post(plugin_api::handle_set_weight))
        .route("/v1/update-hash", post(plugin_api::handle_update_hash))
        .route(
            "/v1/set-header-route",
            post(plugin_api::handle_set_header_route),
        )
        .route(
            "/v1/set-mirror-route",
            post(plugin_api::handle_set_mirror_route),
        )
        .route("/v1/verify-weight", post(plugin_api::handle_verify_weight))
        .route(
            "/v1/remove-managed-routes",
            post(plugin_api::handle_remove_managed_routes),
        )
        .with_state(state)
}

/// Run the server on the specified port until `shutdown` fires
///
/// Plugin calls in flight when shutdown is signaled are allowed to finish.
pub async fn run_server(
    port: u16,
    state: ServerState,
    mut shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    // Log after successful bind - server is actually listening
    info!(port = %port, "Health, metrics, and plugin server listening (HTTP)");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
        .map_err(std::io::Error::other)
}
