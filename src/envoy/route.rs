//! Route records
//!
//! Renders one [`RouteGroup`] into one Envoy v1 route record. Derivation is
//! a pure function of the group: timeout and match first, then copy-through
//! fields, then either a redirect or an upstream action, and finally the
//! group's raw overrides on top of everything.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::{Error, Result};
use crate::model::{HeaderMatch, HeaderValue, RouteGroup};

/// Timeout applied when a group does not carry one
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// A rendered route after overrides, ready for serialization
pub type RenderedRoute = Map<String, Value>;

/// Path match kinds understood by the data plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Prefix,
    Path,
    Regex,
}

impl MatchKind {
    /// Output key carrying the match literal
    pub fn key(self) -> &'static str {
        match self {
            MatchKind::Prefix => "prefix",
            MatchKind::Path => "path",
            MatchKind::Regex => "regex",
        }
    }

    /// Groups match by prefix unless flagged as regex
    pub fn for_group(group: &RouteGroup) -> Self {
        if group.is_regex() {
            MatchKind::Regex
        } else {
            MatchKind::Prefix
        }
    }
}

/// The match clause, serialized as a single `{<kind>: <literal>}` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpecifier {
    pub kind: MatchKind,
    pub value: String,
}

impl Serialize for PathSpecifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.kind.key(), &self.value)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightedCluster {
    pub name: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightedClusters {
    pub clusters: Vec<WeightedCluster>,
}

/// Upstream target: one cluster, or a weighted split across several
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterSpecifier {
    Cluster(String),
    WeightedClusters(WeightedClusters),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shadow {
    pub cluster: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectAction {
    pub host_redirect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_redirect: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_rewrite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_rewrite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_host_rewrite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_headers_to_add: Option<Vec<HeaderValue>>,
    #[serde(flatten)]
    pub target: ClusterSpecifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
}

/// Redirects and upstream routing never appear on the same record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RouteAction {
    Redirect(RedirectAction),
    Upstream(UpstreamAction),
}

/// A route record before overrides are applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRecord {
    pub timeout_ms: u64,
    #[serde(flatten)]
    pub path: PathSpecifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limits: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_websocket: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<HeaderMatch>>,
    #[serde(flatten)]
    pub action: RouteAction,
}

impl RouteRecord {
    /// Derive the record for a single group.
    ///
    /// Fails only when a websocket group has no mapping to take its cluster
    /// from.
    pub fn from_group(group: &RouteGroup) -> Result<Self> {
        let kind = MatchKind::for_group(group);

        // The explicit regex shares the `regex` key with regex-kind matches and
        // takes its place there.
        let (path, regex) = match (kind, &group.regex) {
            (MatchKind::Regex, Some(explicit)) => {
                (PathSpecifier { kind, value: explicit.clone() }, None)
            }
            (_, explicit) => (PathSpecifier { kind, value: group.prefix.clone() }, explicit.clone()),
        };

        let action = if let Some(target) = &group.host_redirect {
            RouteAction::Redirect(RedirectAction {
                host_redirect: target.service.clone(),
                path_redirect: group.path_redirect.as_ref().filter(|p| !p.is_empty()).cloned(),
            })
        } else {
            RouteAction::Upstream(upstream_action(group)?)
        };

        Ok(Self {
            timeout_ms: group.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
            path,
            regex,
            case_sensitive: group.case_sensitive,
            cors: group.cors.clone().or_else(|| group.cors_default.clone()),
            rate_limits: group.rate_limits.clone(),
            priority: group.priority.clone(),
            use_websocket: group.use_websocket,
            headers: (!group.headers.is_empty()).then(|| group.headers.clone()),
            action,
        })
    }

    /// Lower the record to a generic map and write `overrides` over it
    pub fn render(&self, overrides: Option<&Map<String, Value>>) -> Result<RenderedRoute> {
        let mut route = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            other => {
                return Err(Error::internal(format!("route record serialized to non-object: {}", other)))
            }
        };

        if let Some(overrides) = overrides {
            apply_overrides(&mut route, overrides);
        }

        Ok(route)
    }
}

fn upstream_action(group: &RouteGroup) -> Result<UpstreamAction> {
    // Websocket routes cannot split traffic; presence of the flag selects the
    // first mapping's cluster.
    let target = if group.use_websocket.is_some() {
        let first = group
            .mappings
            .first()
            .ok_or_else(|| Error::missing_field(group.describe(), "mappings"))?;
        ClusterSpecifier::Cluster(first.cluster.name.clone())
    } else {
        ClusterSpecifier::WeightedClusters(WeightedClusters {
            clusters: group
                .mappings
                .iter()
                .map(|m| WeightedCluster { name: m.cluster.name.clone(), weight: m.weight })
                .collect(),
        })
    };

    Ok(UpstreamAction {
        prefix_rewrite: group.rewrite.clone(),
        host_rewrite: group.host_rewrite.clone(),
        auto_host_rewrite: group.auto_host_rewrite,
        request_headers_to_add: group.request_headers_to_add.clone(),
        target,
        // Only one shadow is representable downstream.
        shadow: group.shadows.first().map(|c| Shadow { cluster: c.name.clone() }),
    })
}

/// Overwrite route fields with raw override values
pub fn apply_overrides(route: &mut RenderedRoute, overrides: &Map<String, Value>) {
    for (key, value) in overrides {
        route.insert(key.clone(), value.clone());
    }
}

/// Build and render the route record for one group, overrides included
pub fn render_route(group: &RouteGroup) -> Result<RenderedRoute> {
    RouteRecord::from_group(group)?.render(group.envoy_override.as_ref())
}
