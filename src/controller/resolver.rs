//! Route reference parsing
//!
//! Plugin configuration lists Routes as `name` or `namespace/name`. Nothing
//! here validates names; a malformed entry simply resolves to something the
//! API server reports as not found.

use std::fmt;

/// A Route identified by namespace and name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteReference {
    pub namespace: String,
    pub name: String,
}

impl RouteReference {
    /// Parse one configured entry, splitting on the first `/`
    ///
    /// Entries without a `/` live in `default_namespace`.
    pub fn parse(raw: &str, default_namespace: &str) -> Self {
        match raw.split_once('/') {
            Some((namespace, name)) => RouteReference {
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
            None => RouteReference {
                namespace: default_namespace.to_string(),
                name: raw.to_string(),
            },
        }
    }
}

impl fmt::Display for RouteReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Resolve every configured entry, preserving order
pub fn resolve_route_refs<S: AsRef<str>>(
    raw_references: &[S],
    default_namespace: &str,
) -> Vec<RouteReference> {
    raw_references
        .iter()
        .map(|raw| RouteReference::parse(raw.as_ref(), default_namespace))
        .collect()
}
