use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Weight OpenShift assumes when a target reference has none
pub const DEFAULT_ROUTE_WEIGHT: i32 = 100;

/// The only target kind Routes accept
pub const SERVICE_KIND: &str = "Service";

fn default_kind() -> String {
    SERVICE_KIND.to_string()
}

/// OpenShift Route
///
/// Splits traffic between a primary backend (`to`) and optional alternate
/// backends by integer weight. The API server owns this object; the plugin
/// only reads it and submits whole-object updates.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "route.openshift.io",
    version = "v1",
    kind = "Route",
    namespaced,
    status = "RouteStatus",
    derive = "PartialEq"
)]
pub struct RouteSpec {
    /// Alias/DNS that points to the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Path the router watches for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Primary backend
    pub to: RouteTargetReference,

    /// Additional weighted backends
    #[serde(rename = "alternateBackends", skip_serializing_if = "Option::is_none")]
    pub alternate_backends: Option<Vec<RouteTargetReference>>,

    /// Port used by the router
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<RoutePort>,
}

/// A backend the Route sends traffic to, with its relative weight
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct RouteTargetReference {
    /// Kind of target, always `Service`
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Name of the target service
    #[serde(default)]
    pub name: String,

    /// Relative weight (0-256, API default 100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
}

impl Default for RouteTargetReference {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            name: String::new(),
            weight: None,
        }
    }
}

impl RouteTargetReference {
    /// Service target with an explicit weight
    pub fn service(name: impl Into<String>, weight: i32) -> Self {
        Self {
            kind: default_kind(),
            name: name.into(),
            weight: Some(weight),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct RoutePort {
    /// Target port on the service, by number or name
    #[serde(rename = "targetPort")]
    pub target_port: serde_json::Value,
}

/// Route status as reported by the routers that admitted it
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct RouteStatus {
    #[serde(default)]
    pub ingress: Vec<serde_json::Value>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteShapeError {
    #[error("route has {0} alternate backends, at most one is supported")]
    TooManyAlternateBackends(usize),
}

/// Stable/canary weight pair as currently stored on a Route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteWeightState {
    /// Weight of the primary backend
    pub stable_weight: i32,

    /// Weight of the single alternate backend, if one is configured
    pub canary_weight: Option<i32>,
}

impl RouteWeightState {
    /// Read the weight pair from a Route
    ///
    /// Missing weights take the API default. Routes with more than one
    /// alternate backend are rejected.
    pub fn from_route(route: &Route) -> Result<Self, RouteShapeError> {
        let alternates = route.spec.alternate_backends.as_deref().unwrap_or_default();
        if alternates.len() > 1 {
            return Err(RouteShapeError::TooManyAlternateBackends(alternates.len()));
        }

        Ok(Self {
            stable_weight: route.spec.to.weight.unwrap_or(DEFAULT_ROUTE_WEIGHT),
            canary_weight: alternates
                .first()
                .map(|alt| alt.weight.unwrap_or(DEFAULT_ROUTE_WEIGHT)),
        })
    }

    /// True when the stable weight matches and, if an alternate exists, its
    /// weight matches too
    pub fn has_weights(&self, stable_weight: i32, canary_weight: i32) -> bool {
        self.stable_weight == stable_weight
            && self.canary_weight.is_none_or(|weight| weight == canary_weight)
    }
}

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;
