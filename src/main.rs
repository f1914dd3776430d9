use kulta_openshift::controller::{KubeRouteStore, OpenshiftRouterPlugin};
use kulta_openshift::server::{
    create_metrics, run_server, shutdown_channel, wait_for_signal, ReadinessState, ServerState,
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Default port for health, metrics, and plugin endpoints
const DEFAULT_PORT: u16 = 8080;

/// Get the server port from env (default: 8080)
///
/// Unparseable values fall back to the default.
fn get_server_port() -> u16 {
    parse_port(std::env::var("KULTA_OPENSHIFT_PORT").ok().as_deref())
}

fn parse_port(value: Option<&str>) -> u16 {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting KULTA OpenShift traffic router");

    let (shutdown_controller, shutdown_signal) = shutdown_channel();
    let readiness = ReadinessState::new();
    let metrics = create_metrics()?;

    let store = match KubeRouteStore::try_default().await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Failed to create Kubernetes client");
            return Err(e.into());
        }
    };
    info!("Connected to Kubernetes cluster");

    let plugin = OpenshiftRouterPlugin::new(store).with_metrics(metrics.clone());
    let state = ServerState::new(readiness.clone(), metrics, Arc::new(plugin));

    let port = get_server_port();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = run_server(port, state, shutdown_signal).await {
            warn!(error = %e, "Server failed");
        }
    });

    readiness.set_ready();
    info!(port, "Router ready");

    match wait_for_signal().await {
        Ok(signal) => info!(signal, "Initiating graceful shutdown"),
        Err(e) => error!(error = %e, "Failed to listen for termination signals"),
    }

    // Stop advertising readiness before draining in-flight calls
    readiness.set_not_ready();
    shutdown_controller.shutdown();

    if let Err(e) = server_handle.await {
        warn!(error = %e, "Server task ended abnormally");
    }

    info!("KULTA OpenShift traffic router shut down gracefully");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
