//! Errors surfaced by the traffic router
//!
//! Messages are the only thing that crosses the plugin boundary, so each
//! variant renders exactly the text hosts have always seen.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrafficRouterError {
    /// Plugin configuration missing or undecodable
    #[error("{0}")]
    Config(String),

    /// Rollout or desired weight unusable
    #[error("{0}")]
    Validation(String),

    /// Referenced Route does not exist
    #[error("routes.route.openshift.io \"{name}\" not found")]
    NotFound { namespace: String, name: String },

    /// Any other failure reading or writing a Route
    #[error("{0}")]
    Backend(String),
}

impl TrafficRouterError {
    /// Classify a Kubernetes client error for the Route `namespace/name`
    pub fn from_kube(error: kube::Error, namespace: &str, name: &str) -> Self {
        match error {
            kube::Error::Api(err) if err.code == 404 => TrafficRouterError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
            other => TrafficRouterError::Backend(other.to_string()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TrafficRouterError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_route() {
        let err = TrafficRouterError::NotFound {
            namespace: "default".to_string(),
            name: "test-route".to_string(),
        };

        assert_eq!(
            err.to_string(),
            r#"routes.route.openshift.io "test-route" not found"#
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_backend_message_is_verbatim() {
        let err = TrafficRouterError::Backend("failed to update route".to_string());

        assert_eq!(err.to_string(), "failed to update route");
        assert!(!err.is_not_found());
    }
}
