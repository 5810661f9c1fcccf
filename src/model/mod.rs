//! # Routing Model
//!
//! The normalized, in-memory routing model consumed by the compiler. It is
//! built upstream and treated as an immutable snapshot for a compile pass; all
//! types are `Send + Sync` so a snapshot can be shared across tasks behind an
//! `Arc`.
//!
//! Models can be constructed directly or loaded from JSON/YAML:
//!
//! ```rust
//! use routeplane::model::RoutingModel;
//!
//! let model = RoutingModel::from_yaml_str(
//!     r#"
//! listeners:
//!   - service_port: 8080
//! groups:
//!   - prefix: /api/
//!     group_weight: 10
//!     mappings:
//!       - cluster: { name: api }
//!         weight: 100
//! "#,
//! )?;
//! assert_eq!(model.listeners.len(), 1);
//! # Ok::<(), routeplane::Error>(())
//! ```

pub mod filter;
pub mod group;
pub mod listener;

pub use filter::Filter;
pub use group::{Cluster, HeaderMatch, HeaderValue, Mapping, RedirectTarget, RouteGroup};
pub use listener::{Listener, TlsContext};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{Error, Result};

/// Global module settings shared by every listener
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalModule {
    #[serde(default)]
    pub use_remote_address: Option<bool>,
}

impl GlobalModule {
    pub fn trusts_remote_address(&self) -> bool {
        self.use_remote_address.unwrap_or(false)
    }
}

/// Snapshot of everything the compiler reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingModel {
    #[serde(default)]
    pub listeners: Vec<Listener>,
    #[serde(default)]
    pub groups: Vec<RouteGroup>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub ambassador: GlobalModule,
}

impl RoutingModel {
    /// Parse a model from a JSON document
    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|source| Error::Serialization {
            source,
            context: "failed to parse routing model JSON".to_string(),
        })
    }

    /// Parse a model from a YAML document
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        serde_yaml::from_str(input).map_err(|source| Error::Yaml {
            source,
            context: "failed to parse routing model YAML".to_string(),
        })
    }

    /// Load a model file, choosing the parser by extension.
    ///
    /// `.json` files are parsed as JSON; everything else as YAML, which also
    /// accepts JSON documents.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io_at(e, path))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let model = if is_json { Self::from_json_str(&contents)? } else { Self::from_yaml_str(&contents)? };

        tracing::debug!(
            path = %path.display(),
            listeners = model.listeners.len(),
            groups = model.groups.len(),
            filters = model.filters.len(),
            "Loaded routing model"
        );

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_yields_empty_model() {
        let model = RoutingModel::from_json_str("{}").expect("parse");
        assert_eq!(model, RoutingModel::default());
        assert!(!model.ambassador.trusts_remote_address());
    }

    #[test]
    fn test_from_path_json_and_yaml() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().expect("tempfile");
        write!(json, r#"{{"listeners": [{{"service_port": 80}}], "ambassador": {{"use_remote_address": true}}}}"#)
            .expect("write");
        let model = RoutingModel::from_path(json.path()).expect("json model");
        assert_eq!(model.listeners[0].service_port, Some(80));
        assert!(model.ambassador.trusts_remote_address());

        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().expect("tempfile");
        writeln!(yaml, "filters:\n  - name: auth\n    type: decoder\n    config: {{ timeout: 5 }}")
            .expect("write");
        let model = RoutingModel::from_path(yaml.path()).expect("yaml model");
        assert_eq!(model.filters[0].name, "auth");
        assert_eq!(model.filters[0].filter_type.as_deref(), Some("decoder"));
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = RoutingModel::from_path(Path::new("/nonexistent/routeplane/model.yaml"))
            .expect_err("missing file");
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_invalid_json_reports_serialization_error() {
        let err = RoutingModel::from_json_str("{ not json").expect_err("invalid");
        assert!(matches!(err, Error::Serialization { .. }));
    }
}
