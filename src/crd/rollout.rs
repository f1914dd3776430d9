use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::controller::error::TrafficRouterError;

/// Key under which this plugin's configuration lives in
/// `spec.strategy.canary.trafficRouting.plugins`
pub const PLUGIN_NAME: &str = "argoproj-labs/openshift";

/// Message returned when the plugin configuration is absent.
///
/// Hosts match on this exact text.
pub const MISSING_CONFIG_MESSAGE: &str = "unexpected end of JSON input";

/// Message returned when the rollout lacks a canary strategy or services.
pub const ILLEGAL_PARAMETERS_MESSAGE: &str = "illegal parameter(s)";

/// Rollout as seen by the traffic router plugin
///
/// Only the fields the plugin consumes are modeled. Everything else the host
/// sends is ignored during deserialization.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, JsonSchema)]
#[kube(
    group = "argoproj.io",
    version = "v1alpha1",
    kind = "Rollout",
    namespaced
)]
pub struct RolloutSpec {
    /// Deployment strategy
    #[serde(default)]
    pub strategy: RolloutStrategy,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema)]
pub struct RolloutStrategy {
    /// Canary deployment strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canary: Option<CanaryStrategy>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema)]
pub struct CanaryStrategy {
    /// Name of the service that selects stable pods
    #[serde(rename = "stableService", default)]
    pub stable_service: String,

    /// Name of the service that selects canary pods
    #[serde(rename = "canaryService", default)]
    pub canary_service: String,

    /// Traffic routing configuration
    #[serde(rename = "trafficRouting", skip_serializing_if = "Option::is_none")]
    pub traffic_routing: Option<RolloutTrafficRouting>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema)]
pub struct RolloutTrafficRouting {
    /// Opaque per-plugin configuration blobs keyed by plugin identifier
    #[serde(default)]
    pub plugins: BTreeMap<String, serde_json::Value>,
}

/// Plugin configuration: the Routes whose weights follow the rollout
///
/// Each entry is either `name` (resolved in the rollout's namespace) or
/// `namespace/name`. A blob without `routes` manages no Routes.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct OpenshiftTrafficRouting {
    #[serde(default)]
    pub routes: Vec<String>,
}

/// Additional weighted destination supplied by the host (experiments)
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct WeightDestination {
    #[serde(rename = "serviceName", default)]
    pub service_name: String,

    #[serde(rename = "podTemplateHash", default)]
    pub pod_template_hash: String,

    #[serde(default)]
    pub weight: i32,
}

/// Header-based routing request from the host
#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema)]
pub struct SetHeaderRoute {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "match", default)]
    pub matches: Vec<serde_json::Value>,
}

/// Mirror routing request from the host
#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema)]
pub struct SetMirrorRoute {
    #[serde(default)]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<i32>,

    #[serde(rename = "match", default)]
    pub matches: Vec<serde_json::Value>,
}

/// Check that the rollout carries the canary settings the plugin relies on
///
/// Both service names must be non-empty. The reconciler never looks at them,
/// but a rollout without them is not one this plugin should act on.
pub fn validate_rollout_parameters(rollout: &Rollout) -> Result<(), TrafficRouterError> {
    match &rollout.spec.strategy.canary {
        Some(canary) if !canary.stable_service.is_empty() && !canary.canary_service.is_empty() => {
            Ok(())
        }
        _ => Err(TrafficRouterError::Validation(
            ILLEGAL_PARAMETERS_MESSAGE.to_string(),
        )),
    }
}

/// Decode this plugin's configuration from the rollout
///
/// A missing strategy, traffic routing block, or plugin entry is reported the
/// same way as an empty blob. A blob of the wrong shape carries the decoder's
/// message.
pub fn openshift_routing(rollout: &Rollout) -> Result<OpenshiftTrafficRouting, TrafficRouterError> {
    let raw = rollout
        .spec
        .strategy
        .canary
        .as_ref()
        .and_then(|canary| canary.traffic_routing.as_ref())
        .and_then(|routing| routing.plugins.get(PLUGIN_NAME))
        .filter(|value| !value.is_null())
        .ok_or_else(|| TrafficRouterError::Config(MISSING_CONFIG_MESSAGE.to_string()))?;

    serde_json::from_value(raw.clone()).map_err(|e| TrafficRouterError::Config(e.to_string()))
}

#[cfg(test)]
#[path = "rollout_test.rs"]
mod tests;
