//! HTTP server for health, metrics, and plugin endpoints
//!
//! Provides Kubernetes health probes:
//! - `/healthz` - Liveness probe (process is running)
//! - `/readyz` - Readiness probe (router is connected to the cluster)
//!
//! Serves the traffic router plugin operations under `/v1/` and handles
//! graceful shutdown on SIGTERM/SIGINT.

mod health;
pub mod metrics;
pub mod plugin_api;
pub mod shutdown;

pub use health::{build_router, run_server, ReadinessState, ServerState};
pub use metrics::{create_metrics, RouteOutcome, RouterMetrics, SharedMetrics};
pub use plugin_api::SharedPlugin;
pub use shutdown::{shutdown_channel, wait_for_signal, ShutdownController, ShutdownSignal};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "health_test.rs"]
mod health_tests;

#[cfg(test)]
#[path = "metrics_test.rs"]
mod metrics_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;
