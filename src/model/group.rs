//! Route groups, mappings and clusters
//!
//! A route group is one match clause shared by one or more upstream mappings.
//! Groups are read-only inputs to the compiler.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named upstream target. Only its identity is consumed by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
}

impl Cluster {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into() }
    }
}

/// One candidate upstream under a route group.
///
/// The weight only matters when a group carries several mappings, where it
/// becomes the cluster's share in the weighted-cluster list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub cluster: Cluster,
    pub weight: u32,
}

impl Mapping {
    pub fn new<S: Into<String>>(cluster: S, weight: u32) -> Self {
        Self { cluster: Cluster::new(cluster), weight }
    }
}

/// Header predicate attached to a route match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMatch {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<bool>,
}

/// Header appended to upstream requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderValue {
    pub key: String,
    pub value: String,
}

/// Host redirect target; the service identity becomes the redirect host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTarget {
    pub service: String,
}

/// A routing rule grouping the mappings that share one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGroup {
    /// Evaluation order weight; higher weights are evaluated first
    #[serde(default)]
    pub group_weight: i64,

    /// Match literal: a path prefix, or a regex when `prefix_regex` is set.
    /// Empty when the match is supplied through `envoy_override`.
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub prefix_regex: Option<bool>,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub case_sensitive: Option<bool>,
    #[serde(default)]
    pub headers: Vec<HeaderMatch>,

    #[serde(default)]
    pub cors: Option<Value>,
    #[serde(default)]
    pub cors_default: Option<Value>,
    #[serde(default)]
    pub rate_limits: Option<Vec<Value>>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub use_websocket: Option<bool>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub host_redirect: Option<RedirectTarget>,
    #[serde(default)]
    pub path_redirect: Option<String>,

    #[serde(default)]
    pub rewrite: Option<String>,
    #[serde(default)]
    pub host_rewrite: Option<String>,
    #[serde(default)]
    pub auto_host_rewrite: Option<bool>,
    #[serde(default)]
    pub request_headers_to_add: Option<Vec<HeaderValue>>,

    #[serde(default)]
    pub mappings: Vec<Mapping>,
    #[serde(default)]
    pub shadows: Vec<Cluster>,

    /// Raw route fields written over the rendered record
    #[serde(default)]
    pub envoy_override: Option<Map<String, Value>>,
}

impl RouteGroup {
    /// A prefix group with no optional fields set
    pub fn new<S: Into<String>>(prefix: S, group_weight: i64) -> Self {
        Self {
            group_weight,
            prefix: prefix.into(),
            prefix_regex: None,
            regex: None,
            case_sensitive: None,
            headers: Vec::new(),
            cors: None,
            cors_default: None,
            rate_limits: None,
            priority: None,
            use_websocket: None,
            timeout_ms: None,
            host_redirect: None,
            path_redirect: None,
            rewrite: None,
            host_rewrite: None,
            auto_host_rewrite: None,
            request_headers_to_add: None,
            mappings: Vec::new(),
            shadows: Vec::new(),
            envoy_override: None,
        }
    }

    pub fn with_mapping<S: Into<String>>(mut self, cluster: S, weight: u32) -> Self {
        self.mappings.push(Mapping::new(cluster, weight));
        self
    }

    /// True when the match literal is a regex rather than a path prefix
    pub fn is_regex(&self) -> bool {
        self.prefix_regex.unwrap_or(false)
    }

    /// Short human-readable identity used in logs and errors
    pub fn describe(&self) -> String {
        format!("route group '{}' (weight {})", self.prefix, self.group_weight)
    }
}
