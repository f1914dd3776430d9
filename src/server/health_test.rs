//! Tests for health, metrics, and plugin endpoints over HTTP

use super::*;
use crate::controller::fixtures::{mock_store, ROUTE_NAME};
use crate::controller::OpenshiftRouterPlugin;
use std::sync::Arc;
use std::time::Duration;

fn test_state(readiness: ReadinessState) -> ServerState {
    let metrics = create_metrics().expect("should create metrics");
    let plugin = OpenshiftRouterPlugin::new(mock_store()).with_metrics(metrics.clone());
    ServerState::new(readiness, metrics, Arc::new(plugin))
}

/// Start the server in the background and wait until it answers
async fn start_server(
    port: u16,
    state: ServerState,
) -> (reqwest::Client, ShutdownController, tokio::task::JoinHandle<()>) {
    let (controller, signal) = shutdown_channel();
    let handle = tokio::spawn(async move {
        let _ = run_server(port, state, signal).await;
    });

    let client = reqwest::Client::new();
    let mut delay = Duration::from_millis(10);
    for attempt in 1..=10 {
        match client
            .get(format!("http://127.0.0.1:{}/healthz", port))
            .timeout(Duration::from_millis(100))
            .send()
            .await
        {
            Ok(_) => break,
            Err(_) if attempt < 10 => {
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, Duration::from_millis(200));
            }
            Err(e) => panic!("Server not ready after {} attempts: {}", attempt, e),
        }
    }
    (client, controller, handle)
}

#[tokio::test]
async fn test_healthz_returns_200() {
    let port = 18180;
    let (client, controller, handle) = start_server(port, test_state(ReadinessState::new())).await;

    let response = client
        .get(format!("http://127.0.0.1:{}/healthz", port))
        .send()
        .await
        .expect("Failed to connect to server");

    assert_eq!(response.status(), 200);

    controller.shutdown();
    let _ = handle.await;
}

#[tokio::test]
async fn test_readyz_follows_readiness_state() {
    let port = 18181;
    let readiness = ReadinessState::new();
    let (client, controller, handle) = start_server(port, test_state(readiness.clone())).await;
    let url = format!("http://127.0.0.1:{}/readyz", port);

    let response = client.get(&url).send().await.expect("request failed");
    assert_eq!(response.status(), 503, "Not ready before the client connects");

    readiness.set_ready();
    let response = client.get(&url).send().await.expect("request failed");
    assert_eq!(response.status(), 200);

    readiness.set_not_ready();
    let response = client.get(&url).send().await.expect("request failed");
    assert_eq!(response.status(), 503, "Not ready during shutdown");

    controller.shutdown();
    let _ = handle.await;
}

#[tokio::test]
async fn test_set_weight_over_http_updates_metrics() {
    let port = 18182;
    let (client, controller, handle) = start_server(port, test_state(ReadinessState::new())).await;

    let body = serde_json::json!({
        "rollout": {
            "apiVersion": "argoproj.io/v1alpha1",
            "kind": "Rollout",
            "metadata": { "name": "rollout", "namespace": "default" },
            "spec": {
                "strategy": {
                    "canary": {
                        "stableService": "argo-rollouts-stable",
                        "canaryService": "argo-rollouts-canary",
                        "trafficRouting": {
                            "plugins": { "argoproj-labs/openshift": { "routes": [ROUTE_NAME] } }
                        }
                    }
                }
            }
        },
        "desiredWeight": 30
    });

    let reply: serde_json::Value = client
        .post(format!("http://127.0.0.1:{}/v1/set-weight", port))
        .json(&body)
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("reply should be JSON");
    assert_eq!(reply["error"], "");

    let metrics = client
        .get(format!("http://127.0.0.1:{}/metrics", port))
        .send()
        .await
        .expect("request failed")
        .text()
        .await
        .expect("metrics body");
    assert!(metrics.contains("kulta_openshift_route_updates_total{result=\"updated\"} 1"));

    controller.shutdown();
    let _ = handle.await;
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    let port = 18183;
    let (_client, controller, handle) = start_server(port, test_state(ReadinessState::new())).await;

    controller.shutdown();

    let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(result.is_ok(), "Server should stop after shutdown is signaled");
}
