#![allow(clippy::unwrap_used)] // Tests can use unwrap for brevity
#![allow(clippy::expect_used)] // Tests can use expect for better error messages

use super::*;
use serde_json::json;

fn rollout_with_plugins(plugins: BTreeMap<String, serde_json::Value>) -> Rollout {
    let mut rollout = Rollout::new(
        "rollout",
        RolloutSpec {
            strategy: RolloutStrategy {
                canary: Some(CanaryStrategy {
                    stable_service: "argo-rollouts-stable".to_string(),
                    canary_service: "argo-rollouts-canary".to_string(),
                    traffic_routing: Some(RolloutTrafficRouting { plugins }),
                }),
            },
        },
    );
    rollout.metadata.namespace = Some("default".to_string());
    rollout
}

#[test]
fn test_rollout_deserialize_from_yaml() {
    let yaml = r#"
apiVersion: argoproj.io/v1alpha1
kind: Rollout
metadata:
  name: rollouts-demo
  namespace: rollouts-e2e
spec:
  replicas: 5
  strategy:
    canary:
      stableService: rollouts-demo-stable
      canaryService: rollouts-demo-canary
      steps:
      - setWeight: 20
      - pause: {}
      trafficRouting:
        plugins:
          argoproj-labs/openshift:
            routes:
            - rollouts-demo
            - other-ns/rollouts-demo-b
"#;

    let rollout: Rollout = serde_yaml::from_str(yaml).expect("Failed to deserialize Rollout");

    assert_eq!(rollout.metadata.name.as_deref(), Some("rollouts-demo"));
    validate_rollout_parameters(&rollout).unwrap();

    let routing = openshift_routing(&rollout).unwrap();
    assert_eq!(
        routing.routes,
        vec!["rollouts-demo".to_string(), "other-ns/rollouts-demo-b".to_string()]
    );
}

#[test]
fn test_validate_rejects_missing_canary_strategy() {
    let mut rollout = rollout_with_plugins(BTreeMap::new());
    rollout.spec.strategy.canary = None;

    let err = validate_rollout_parameters(&rollout).unwrap_err();

    assert_eq!(err.to_string(), "illegal parameter(s)");
    assert!(matches!(err, TrafficRouterError::Validation(_)));
}

#[test]
fn test_validate_rejects_empty_service_names() {
    let mut rollout = rollout_with_plugins(BTreeMap::new());
    rollout.spec.strategy.canary.as_mut().unwrap().canary_service = String::new();
    assert!(validate_rollout_parameters(&rollout).is_err());

    let mut rollout = rollout_with_plugins(BTreeMap::new());
    rollout.spec.strategy.canary.as_mut().unwrap().stable_service = String::new();
    assert!(validate_rollout_parameters(&rollout).is_err());
}

#[test]
fn test_openshift_routing_missing_plugin_entry() {
    let rollout = rollout_with_plugins(BTreeMap::new());

    let err = openshift_routing(&rollout).unwrap_err();

    assert!(matches!(err, TrafficRouterError::Config(_)));
    assert_eq!(err.to_string(), "unexpected end of JSON input");
}

#[test]
fn test_openshift_routing_null_entry_counts_as_missing() {
    let rollout = rollout_with_plugins(BTreeMap::from([(PLUGIN_NAME.to_string(), json!(null))]));

    let err = openshift_routing(&rollout).unwrap_err();

    assert_eq!(err.to_string(), MISSING_CONFIG_MESSAGE);
}

#[test]
fn test_openshift_routing_malformed_entry() {
    let rollout = rollout_with_plugins(BTreeMap::from([(
        PLUGIN_NAME.to_string(),
        json!({ "routes": "not-a-list" }),
    )]));

    let err = openshift_routing(&rollout).unwrap_err();

    assert!(matches!(err, TrafficRouterError::Config(_)));
    assert!(err.to_string().contains("invalid type"));
}

#[test]
fn test_openshift_routing_ignores_other_plugins() {
    let rollout = rollout_with_plugins(BTreeMap::from([
        ("argoproj-labs/contour".to_string(), json!({ "httpProxies": ["p"] })),
        (PLUGIN_NAME.to_string(), json!({ "routes": ["route-a"] })),
    ]));

    let routing = openshift_routing(&rollout).unwrap();

    assert_eq!(routing.routes, vec!["route-a".to_string()]);
}

#[test]
fn test_openshift_routing_without_routes_field() {
    let rollout = rollout_with_plugins(BTreeMap::from([(PLUGIN_NAME.to_string(), json!({}))]));

    let routing = openshift_routing(&rollout).unwrap();

    assert!(routing.routes.is_empty());
}
