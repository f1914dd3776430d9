//! Traffic router plugin surface
//!
//! The host rollout controller drives traffic through this trait. Only
//! weighted splitting is implemented; header routing, mirroring, weight
//! verification, and managed-route cleanup are accepted and do nothing.

use async_trait::async_trait;
use kube::ResourceExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, Instrument, Span};

use super::error::TrafficRouterError;
use super::reconciler::{desired_weights, reconcile_route};
use super::resolver::resolve_route_refs;
use super::store::{KubeRouteStore, RouteStore};
use crate::crd::rollout::{
    openshift_routing, validate_rollout_parameters, Rollout, SetHeaderRoute, SetMirrorRoute,
    WeightDestination,
};
use crate::server::{RouteOutcome, SharedMetrics};

/// Name this router reports to the host
pub const CONTROLLER_TYPE: &str = "Openshift";

/// Namespace used when the rollout carries none
const FALLBACK_NAMESPACE: &str = "default";

/// Error returned across the plugin boundary
///
/// Only the message crosses; hosts distinguish failures by its text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{error_string}")]
pub struct RpcError {
    #[serde(rename = "errorString")]
    pub error_string: String,
}

impl RpcError {
    pub fn has_error(&self) -> bool {
        !self.error_string.is_empty()
    }
}

impl From<TrafficRouterError> for RpcError {
    fn from(err: TrafficRouterError) -> Self {
        RpcError {
            error_string: err.to_string(),
        }
    }
}

/// Answer to a weight verification request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verified {
    Verified,
    NotVerified,
    NotImplemented,
}

/// Operations a traffic router exposes to the host controller
#[async_trait]
pub trait TrafficRouterPlugin: Send + Sync {
    /// Router type identifier
    fn type_name(&self) -> &'static str;

    /// New canary/stable pod hashes are available
    async fn update_hash(
        &self,
        rollout: &Rollout,
        canary_hash: &str,
        stable_hash: &str,
        additional_destinations: &[WeightDestination],
    ) -> Result<(), RpcError>;

    /// Shift traffic so the canary receives `desired_weight` percent
    async fn set_weight(
        &self,
        rollout: &Rollout,
        desired_weight: i32,
        additional_destinations: &[WeightDestination],
    ) -> Result<(), RpcError>;

    async fn set_header_route(
        &self,
        rollout: &Rollout,
        header_route: &SetHeaderRoute,
    ) -> Result<(), RpcError>;

    async fn set_mirror_route(
        &self,
        rollout: &Rollout,
        mirror_route: &SetMirrorRoute,
    ) -> Result<(), RpcError>;

    /// Check whether the routed weights match `desired_weight`
    async fn verify_weight(
        &self,
        rollout: &Rollout,
        desired_weight: i32,
        additional_destinations: &[WeightDestination],
    ) -> Result<Verified, RpcError>;

    async fn remove_managed_routes(&self, rollout: &Rollout) -> Result<(), RpcError>;
}

/// Traffic router for OpenShift Routes
///
/// Every operation runs inside the injected span, so log context is carried
/// by the caller's subscriber rather than by process-wide logger state.
pub struct OpenshiftRouterPlugin<S> {
    store: S,
    span: Span,
    metrics: Option<SharedMetrics>,
}

impl OpenshiftRouterPlugin<KubeRouteStore> {
    /// Connect to the cluster using kubeconfig or in-cluster credentials
    pub async fn try_default() -> Result<Self, TrafficRouterError> {
        let store = KubeRouteStore::try_default()
            .await
            .map_err(|e| TrafficRouterError::Backend(e.to_string()))?;
        Ok(Self::new(store))
    }
}

impl<S: RouteStore> OpenshiftRouterPlugin<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            span: tracing::info_span!("trafficrouter", plugin = "trafficrouter", vendor = "openshift"),
            metrics: None,
        }
    }

    /// Replace the span operations are recorded under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_metrics(mut self, metrics: SharedMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reconcile every referenced Route onto `desired_canary_weight`
    ///
    /// Routes are handled one at a time in list order. The first failure is
    /// returned immediately and the remaining Routes are left for the next
    /// call. A weight outside 0-100 is rejected before any Route is read.
    pub async fn apply_desired_weight<R: AsRef<str>>(
        &self,
        rollout_namespace: &str,
        raw_references: &[R],
        desired_canary_weight: i32,
    ) -> Result<(), TrafficRouterError> {
        desired_weights(desired_canary_weight)?;

        self.apply_routes(rollout_namespace, raw_references, desired_canary_weight)
            .instrument(self.span.clone())
            .await
    }

    async fn apply_routes<R: AsRef<str>>(
        &self,
        rollout_namespace: &str,
        raw_references: &[R],
        desired_canary_weight: i32,
    ) -> Result<(), TrafficRouterError> {
        for reference in resolve_route_refs(raw_references, rollout_namespace) {
            info!(route = %reference, "Updating route");

            match reconcile_route(&self.store, &reference, desired_canary_weight).await {
                Ok(updated) => {
                    self.record_route(if updated {
                        RouteOutcome::Updated
                    } else {
                        RouteOutcome::Unchanged
                    });
                    info!(route = %reference, updated, "Successfully updated route");
                }
                Err(e) => {
                    self.record_route(RouteOutcome::Error);
                    error!(route = %reference, error = %e, "Failed to update route");
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    async fn set_weight_inner(&self, rollout: &Rollout, desired_weight: i32) -> Result<(), TrafficRouterError> {
        validate_rollout_parameters(rollout)?;
        desired_weights(desired_weight)?;
        let routing = openshift_routing(rollout)?;

        let namespace = rollout
            .namespace()
            .unwrap_or_else(|| FALLBACK_NAMESPACE.to_string());

        if let Some(metrics) = &self.metrics {
            metrics.set_desired_weight(&namespace, &rollout.name_any(), desired_weight.into());
        }

        self.apply_routes(&namespace, &routing.routes, desired_weight)
            .await
    }

    fn record_route(&self, outcome: RouteOutcome) {
        if let Some(metrics) = &self.metrics {
            metrics.record_route(outcome);
        }
    }
}

#[async_trait]
impl<S: RouteStore> TrafficRouterPlugin for OpenshiftRouterPlugin<S> {
    fn type_name(&self) -> &'static str {
        CONTROLLER_TYPE
    }

    async fn update_hash(
        &self,
        _rollout: &Rollout,
        _canary_hash: &str,
        _stable_hash: &str,
        _additional_destinations: &[WeightDestination],
    ) -> Result<(), RpcError> {
        Ok(())
    }

    async fn set_weight(
        &self,
        rollout: &Rollout,
        desired_weight: i32,
        _additional_destinations: &[WeightDestination],
    ) -> Result<(), RpcError> {
        let result = self
            .set_weight_inner(rollout, desired_weight)
            .instrument(self.span.clone())
            .await;

        if let Some(metrics) = &self.metrics {
            metrics.record_set_weight(result.is_ok());
        }
        result.map_err(RpcError::from)
    }

    async fn set_header_route(
        &self,
        _rollout: &Rollout,
        _header_route: &SetHeaderRoute,
    ) -> Result<(), RpcError> {
        Ok(())
    }

    async fn set_mirror_route(
        &self,
        _rollout: &Rollout,
        _mirror_route: &SetMirrorRoute,
    ) -> Result<(), RpcError> {
        Ok(())
    }

    async fn verify_weight(
        &self,
        _rollout: &Rollout,
        _desired_weight: i32,
        _additional_destinations: &[WeightDestination],
    ) -> Result<Verified, RpcError> {
        Ok(Verified::NotImplemented)
    }

    async fn remove_managed_routes(&self, _rollout: &Rollout) -> Result<(), RpcError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Tests can use unwrap/expect for brevity
#[path = "plugin_test.rs"]
mod tests;
