//! Route storage abstraction
//!
//! Production code uses `KubeRouteStore` which talks to the API server.
//! Tests use `MockRouteStore` which keeps Routes in memory and records every
//! call so write counts can be asserted.

use async_trait::async_trait;
use kube::api::{Api, PostParams};
use kube::ResourceExt;

use super::error::TrafficRouterError;
use crate::crd::route::Route;

/// Typed access to Route objects
///
/// The plugin never creates or deletes Routes, it only reads them and
/// submits whole-object updates.
#[async_trait]
pub trait RouteStore: Send + Sync {
    /// Fetch the Route `namespace/name`
    async fn get(&self, namespace: &str, name: &str) -> Result<Route, TrafficRouterError>;

    /// Replace an existing Route in `namespace`
    async fn update(&self, namespace: &str, route: &Route) -> Result<Route, TrafficRouterError>;
}

/// Route store backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeRouteStore {
    client: kube::Client,
}

impl KubeRouteStore {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    /// Connect using kubeconfig or in-cluster credentials
    pub async fn try_default() -> Result<Self, kube::Error> {
        Ok(Self::new(kube::Client::try_default().await?))
    }
}

#[async_trait]
impl RouteStore for KubeRouteStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Route, TrafficRouterError> {
        let routes: Api<Route> = Api::namespaced(self.client.clone(), namespace);
        routes
            .get(name)
            .await
            .map_err(|e| TrafficRouterError::from_kube(e, namespace, name))
    }

    async fn update(&self, namespace: &str, route: &Route) -> Result<Route, TrafficRouterError> {
        let name = route.name_any();
        let routes: Api<Route> = Api::namespaced(self.client.clone(), namespace);
        routes
            .replace(&name, &PostParams::default(), route)
            .await
            .map_err(|e| TrafficRouterError::from_kube(e, namespace, &name))
    }
}

/// Verb recorded by `MockRouteStore`
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Update,
}

/// One call made against `MockRouteStore`
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub verb: Verb,
    pub namespace: String,
    pub name: String,
}

#[cfg(test)]
#[derive(Default)]
struct MockState {
    routes: std::collections::BTreeMap<(String, String), Route>,
    actions: Vec<Action>,
    get_failures: std::collections::BTreeMap<(String, String), String>,
    update_failure: Option<String>,
}

/// In-memory route store for tests
#[cfg(test)]
#[derive(Default)]
pub struct MockRouteStore {
    state: std::sync::Mutex<MockState>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
impl MockRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with Routes keyed by their own namespace and name
    pub fn with_routes(routes: impl IntoIterator<Item = Route>) -> Self {
        let store = Self::new();
        for route in routes {
            store.insert(route);
        }
        store
    }

    pub fn insert(&self, route: Route) {
        let key = (route.namespace().unwrap_or_default(), route.name_any());
        self.state.lock().unwrap().routes.insert(key, route);
    }

    /// Current stored copy, without recording an action
    pub fn route(&self, namespace: &str, name: &str) -> Option<Route> {
        self.state
            .lock()
            .unwrap()
            .routes
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Make every get of `namespace/name` fail with `message`
    pub fn fail_get(&self, namespace: &str, name: &str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .get_failures
            .insert((namespace.to_string(), name.to_string()), message.to_string());
    }

    /// Make every update fail with `message`
    pub fn fail_updates(&self, message: &str) {
        self.state.lock().unwrap().update_failure = Some(message.to_string());
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.get_failures.clear();
        state.update_failure = None;
    }

    pub fn actions(&self) -> Vec<Action> {
        self.state.lock().unwrap().actions.clone()
    }

    pub fn update_count(&self) -> usize {
        self.actions()
            .iter()
            .filter(|action| action.verb == Verb::Update)
            .count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[async_trait]
impl RouteStore for MockRouteStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Route, TrafficRouterError> {
        let mut state = self.state.lock().unwrap();
        let key = (namespace.to_string(), name.to_string());
        state.actions.push(Action {
            verb: Verb::Get,
            namespace: key.0.clone(),
            name: key.1.clone(),
        });

        if let Some(message) = state.get_failures.get(&key) {
            return Err(TrafficRouterError::Backend(message.clone()));
        }

        state
            .routes
            .get(&key)
            .cloned()
            .ok_or_else(|| TrafficRouterError::NotFound {
                namespace: key.0,
                name: key.1,
            })
    }

    async fn update(&self, namespace: &str, route: &Route) -> Result<Route, TrafficRouterError> {
        let mut state = self.state.lock().unwrap();
        let key = (namespace.to_string(), route.name_any());
        state.actions.push(Action {
            verb: Verb::Update,
            namespace: key.0.clone(),
            name: key.1.clone(),
        });

        if let Some(message) = &state.update_failure {
            return Err(TrafficRouterError::Backend(message.clone()));
        }
        if !state.routes.contains_key(&key) {
            return Err(TrafficRouterError::NotFound {
                namespace: key.0,
                name: key.1,
            });
        }

        state.routes.insert(key, route.clone());
        Ok(route.clone())
    }
}
