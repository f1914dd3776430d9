//! Per-Route weight reconciliation
//!
//! Converges one Route onto a desired stable/canary split:
//! - Read the Route fresh from the store
//! - Skip the write when the primary weight already matches
//! - Otherwise rewrite the primary weight and the alternate backend list
//!
//! A canary weight of 0 removes the alternate backend list entirely rather
//! than leaving an alternate at weight 0.

use tracing::{debug, error, info};

use super::error::TrafficRouterError;
use super::resolver::RouteReference;
use super::store::RouteStore;
use crate::crd::route::{RouteTargetReference, DEFAULT_ROUTE_WEIGHT};

/// Split a desired canary weight into (stable_weight, canary_weight)
///
/// Rejects weights outside 0-100.
pub fn desired_weights(desired_canary_weight: i32) -> Result<(i32, i32), TrafficRouterError> {
    if !(0..=100).contains(&desired_canary_weight) {
        return Err(TrafficRouterError::Validation(format!(
            "desired weight must be 0-100, got {}",
            desired_canary_weight
        )));
    }
    Ok((100 - desired_canary_weight, desired_canary_weight))
}

/// Reconcile one Route onto `desired_canary_weight`
///
/// # Returns
/// * `Ok(true)` - Route was rewritten
/// * `Ok(false)` - Primary weight already matched, nothing written
/// * `Err(TrafficRouterError)` - Invalid weight, Route missing, or store failure
///
/// Only the primary weight gates the write. A Route whose primary weight
/// already matches is left alone even if its alternate backend differs from
/// what a write would produce.
pub async fn reconcile_route<S: RouteStore + ?Sized>(
    store: &S,
    reference: &RouteReference,
    desired_canary_weight: i32,
) -> Result<bool, TrafficRouterError> {
    let (stable_weight, canary_weight) = desired_weights(desired_canary_weight)?;

    let mut route = match store.get(&reference.namespace, &reference.name).await {
        Ok(route) => route,
        Err(e) => {
            if e.is_not_found() {
                error!(route = %reference, "OpenshiftRouteNotFound: Route {:?} not found", reference.name);
            }
            return Err(e);
        }
    };

    let current_stable_weight = route.spec.to.weight.unwrap_or(DEFAULT_ROUTE_WEIGHT);
    if current_stable_weight == stable_weight {
        debug!(
            route = %reference,
            stable_weight,
            "Route already at desired weight, skipping update"
        );
        return Ok(false);
    }

    info!(
        route = %reference,
        from = current_stable_weight,
        to = stable_weight,
        "Updating default backend weight"
    );
    route.spec.to.weight = Some(stable_weight);

    if canary_weight == 0 {
        info!(route = %reference, "Deleting alternate backends");
        route.spec.alternate_backends = None;
    } else {
        info!(
            route = %reference,
            weight = canary_weight,
            "Updating alternate backend weight"
        );
        route.spec.alternate_backends = Some(vec![RouteTargetReference::service(
            reference.name.clone(),
            canary_weight,
        )]);
    }

    store.update(&reference.namespace, &route).await?;
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Tests can use unwrap/expect for brevity
#[path = "reconciler_test.rs"]
mod tests;
