//! JSON-over-HTTP adapter for the traffic router plugin
//!
//! The host rollout controller calls these endpoints instead of loading the
//! plugin in-process. Every reply carries an `error` string that is empty on
//! success.
//!
//! ## Endpoints
//! - POST /v1/type
//! - POST /v1/set-weight
//! - POST /v1/update-hash
//! - POST /v1/set-header-route
//! - POST /v1/set-mirror-route
//! - POST /v1/verify-weight
//! - POST /v1/remove-managed-routes

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::controller::{RpcError, TrafficRouterPlugin, Verified};
use crate::crd::rollout::{Rollout, SetHeaderRoute, SetMirrorRoute, WeightDestination};

/// Plugin handle shared by the handlers
pub type SharedPlugin = Arc<dyn TrafficRouterPlugin>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetWeightRequest {
    pub rollout: Rollout,
    pub desired_weight: i32,
    #[serde(default)]
    pub additional_destinations: Vec<WeightDestination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHashRequest {
    pub rollout: Rollout,
    #[serde(default)]
    pub canary_hash: String,
    #[serde(default)]
    pub stable_hash: String,
    #[serde(default)]
    pub additional_destinations: Vec<WeightDestination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetHeaderRouteRequest {
    pub rollout: Rollout,
    #[serde(default)]
    pub header_route: SetHeaderRoute,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMirrorRouteRequest {
    pub rollout: Rollout,
    #[serde(default)]
    pub mirror_route: SetMirrorRoute,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloutRequest {
    pub rollout: Rollout,
}

/// Reply for operations that only report success or failure
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PluginResponse {
    pub error: String,
}

impl From<Result<(), RpcError>> for PluginResponse {
    fn from(result: Result<(), RpcError>) -> Self {
        PluginResponse {
            error: result.err().map(|e| e.error_string).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyWeightResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<Verified>,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeResponse {
    #[serde(rename = "type")]
    pub type_name: String,
}

pub async fn handle_type(State(plugin): State<SharedPlugin>) -> Json<TypeResponse> {
    Json(TypeResponse {
        type_name: plugin.type_name().to_string(),
    })
}

pub async fn handle_set_weight(
    State(plugin): State<SharedPlugin>,
    Json(request): Json<SetWeightRequest>,
) -> Json<PluginResponse> {
    debug!(
        rollout = %request.rollout.metadata.name.as_deref().unwrap_or_default(),
        desired_weight = request.desired_weight,
        "Processing set-weight request"
    );

    let result = plugin
        .set_weight(
            &request.rollout,
            request.desired_weight,
            &request.additional_destinations,
        )
        .await;

    if let Err(e) = &result {
        warn!(error = %e, "set-weight failed");
    }
    Json(result.into())
}

pub async fn handle_update_hash(
    State(plugin): State<SharedPlugin>,
    Json(request): Json<UpdateHashRequest>,
) -> Json<PluginResponse> {
    let result = plugin
        .update_hash(
            &request.rollout,
            &request.canary_hash,
            &request.stable_hash,
            &request.additional_destinations,
        )
        .await;
    Json(result.into())
}

pub async fn handle_set_header_route(
    State(plugin): State<SharedPlugin>,
    Json(request): Json<SetHeaderRouteRequest>,
) -> Json<PluginResponse> {
    let result = plugin
        .set_header_route(&request.rollout, &request.header_route)
        .await;
    Json(result.into())
}

pub async fn handle_set_mirror_route(
    State(plugin): State<SharedPlugin>,
    Json(request): Json<SetMirrorRouteRequest>,
) -> Json<PluginResponse> {
    let result = plugin
        .set_mirror_route(&request.rollout, &request.mirror_route)
        .await;
    Json(result.into())
}

pub async fn handle_verify_weight(
    State(plugin): State<SharedPlugin>,
    Json(request): Json<SetWeightRequest>,
) -> Json<VerifyWeightResponse> {
    let response = match plugin
        .verify_weight(
            &request.rollout,
            request.desired_weight,
            &request.additional_destinations,
        )
        .await
    {
        Ok(verified) => VerifyWeightResponse {
            verified: Some(verified),
            error: String::new(),
        },
        Err(e) => VerifyWeightResponse {
            verified: None,
            error: e.error_string,
        },
    };
    Json(response)
}

pub async fn handle_remove_managed_routes(
    State(plugin): State<SharedPlugin>,
    Json(request): Json<RolloutRequest>,
) -> Json<PluginResponse> {
    let result = plugin.remove_managed_routes(&request.rollout).await;
    Json(result.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[path = "plugin_api_test.rs"]
mod tests;
