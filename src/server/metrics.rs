//! Prometheus metrics for the OpenShift traffic router
//!
//! - Per-Route reconciliation outcomes
//! - set-weight calls by result
//! - Last desired canary weight per rollout

use prometheus::{self, Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Outcome of reconciling a single Route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Updated,
    Unchanged,
    Error,
}

impl RouteOutcome {
    fn as_label(self) -> &'static str {
        match self {
            RouteOutcome::Updated => "updated",
            RouteOutcome::Unchanged => "unchanged",
            RouteOutcome::Error => "error",
        }
    }
}

/// Router metrics registry
///
/// Clone is cheap (Arc internally).
#[derive(Clone)]
pub struct RouterMetrics {
    registry: Registry,
    /// Route reconciliations by outcome (updated, unchanged, error)
    pub route_updates_total: IntCounterVec,
    /// set-weight calls by result (success, error)
    pub set_weight_total: IntCounterVec,
    /// Last desired canary weight per rollout (0-100)
    pub desired_weight: IntGaugeVec,
}

impl RouterMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let route_updates_total = IntCounterVec::new(
            Opts::new(
                "kulta_openshift_route_updates_total",
                "Total number of Route reconciliations by outcome",
            ),
            &["result"],
        )?;
        registry.register(Box::new(route_updates_total.clone()))?;

        let set_weight_total = IntCounterVec::new(
            Opts::new(
                "kulta_openshift_set_weight_total",
                "Total number of set-weight calls by result",
            ),
            &["result"],
        )?;
        registry.register(Box::new(set_weight_total.clone()))?;

        let desired_weight = IntGaugeVec::new(
            Opts::new(
                "kulta_openshift_desired_weight",
                "Last desired canary weight percentage",
            ),
            &["namespace", "rollout"],
        )?;
        registry.register(Box::new(desired_weight.clone()))?;

        Ok(Self {
            registry,
            route_updates_total,
            set_weight_total,
            desired_weight,
        })
    }

    pub fn record_route(&self, outcome: RouteOutcome) {
        self.route_updates_total
            .with_label_values(&[outcome.as_label()])
            .inc();
    }

    pub fn record_set_weight(&self, success: bool) {
        let result = if success { "success" } else { "error" };
        self.set_weight_total.with_label_values(&[result]).inc();
    }

    pub fn set_desired_weight(&self, namespace: &str, rollout: &str, weight: i64) {
        self.desired_weight
            .with_label_values(&[namespace, rollout])
            .set(weight);
    }

    /// Encode all metrics to Prometheus text format
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| {
            prometheus::Error::Msg(format!("Failed to encode metrics as UTF-8: {}", e))
        })
    }
}

/// Shared metrics handle
pub type SharedMetrics = Arc<RouterMetrics>;

pub fn create_metrics() -> Result<SharedMetrics, prometheus::Error> {
    Ok(Arc::new(RouterMetrics::new()?))
}
