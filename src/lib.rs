pub mod controller;
pub mod crd;
pub mod server;

pub use crate::controller::{OpenshiftRouterPlugin, TrafficRouterError, TrafficRouterPlugin};
