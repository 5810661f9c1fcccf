use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An HTTP filter reference whose configuration was produced by the filter's
/// own compiler. The config blob is embedded verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default, rename = "type")]
    pub filter_type: Option<String>,
}

impl Filter {
    pub fn new<S: Into<String>>(name: S, config: Value) -> Self {
        Self { name: name.into(), config, filter_type: None }
    }

    pub fn with_type<S: Into<String>>(mut self, filter_type: S) -> Self {
        self.filter_type = Some(filter_type.into());
        self
    }
}
