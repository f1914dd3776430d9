//! Shared test fixtures: Routes pre-split 20/80 and a canary Rollout that
//! points the plugin at them

use std::collections::BTreeMap;

use super::store::MockRouteStore;
use crate::crd::rollout::{
    CanaryStrategy, Rollout, RolloutSpec, RolloutStrategy, RolloutTrafficRouting, PLUGIN_NAME,
};
use crate::crd::route::{Route, RouteSpec, RouteStatus, RouteTargetReference};

pub const NAMESPACE: &str = "default";
pub const STABLE_SERVICE_NAME: &str = "argo-rollouts-stable";
pub const CANARY_SERVICE_NAME: &str = "argo-rollouts-canary";

pub const ROUTE_NAME: &str = "argo-rollouts";
pub const VALID_ROUTE_NAME: &str = "argo-rollouts-valid";
pub const OUTDATED_ROUTE_NAME: &str = "argo-rollouts-outdated";

/// Primary weight every fixture Route starts with
pub const ROUTE_STABLE_WEIGHT: i32 = 20;

pub fn new_route(namespace: &str, name: &str, stable_weight: i32) -> Route {
    let mut route = Route::new(
        name,
        RouteSpec {
            host: Some("route.example.com".to_string()),
            to: RouteTargetReference::service(STABLE_SERVICE_NAME, stable_weight),
            alternate_backends: Some(vec![RouteTargetReference::service(
                CANARY_SERVICE_NAME,
                100 - stable_weight,
            )]),
            ..Default::default()
        },
    );
    route.metadata.namespace = Some(namespace.to_string());
    route.metadata.generation = Some(1);
    route.status = Some(RouteStatus::default());
    route
}

/// Store seeded with the standard fixture Routes in `default`
pub fn mock_store() -> MockRouteStore {
    MockRouteStore::with_routes([
        new_route(NAMESPACE, ROUTE_NAME, ROUTE_STABLE_WEIGHT),
        new_route(NAMESPACE, VALID_ROUTE_NAME, ROUTE_STABLE_WEIGHT),
        new_route(NAMESPACE, OUTDATED_ROUTE_NAME, ROUTE_STABLE_WEIGHT),
    ])
}

pub fn new_rollout(stable_service: &str, canary_service: &str, routes: &[&str]) -> Rollout {
    let config = serde_json::json!({ "routes": routes });

    let mut rollout = Rollout::new(
        "rollout",
        RolloutSpec {
            strategy: RolloutStrategy {
                canary: Some(CanaryStrategy {
                    stable_service: stable_service.to_string(),
                    canary_service: canary_service.to_string(),
                    traffic_routing: Some(RolloutTrafficRouting {
                        plugins: BTreeMap::from([(PLUGIN_NAME.to_string(), config)]),
                    }),
                }),
            },
        },
    );
    rollout.metadata.namespace = Some(NAMESPACE.to_string());
    rollout
}
