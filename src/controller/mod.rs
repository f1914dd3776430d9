pub mod error;
pub mod plugin;
pub mod reconciler;
pub mod resolver;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::TrafficRouterError;
pub use plugin::{OpenshiftRouterPlugin, RpcError, TrafficRouterPlugin, Verified, CONTROLLER_TYPE};
pub use reconciler::{desired_weights, reconcile_route};
pub use resolver::{resolve_route_refs, RouteReference};
pub use store::{KubeRouteStore, RouteStore};
