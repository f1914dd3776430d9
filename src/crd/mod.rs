pub mod rollout;
pub mod route;
