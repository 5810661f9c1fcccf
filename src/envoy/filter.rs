//! HTTP filter records embedded in the connection manager's filter chain

use serde::Serialize;
use serde_json::Value;

use crate::model::Filter;

/// Serializable filter entry: `{name, config, type?}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterRecord {
    pub name: String,
    pub config: Value,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,
}

impl From<&Filter> for FilterRecord {
    fn from(filter: &Filter) -> Self {
        Self {
            name: filter.name.clone(),
            config: filter.config.clone(),
            filter_type: filter.filter_type.as_ref().filter(|t| !t.is_empty()).cloned(),
        }
    }
}

/// Render every filter of the model, preserving order
pub fn build_filter_records(filters: &[Filter]) -> Vec<FilterRecord> {
    filters.iter().map(FilterRecord::from).collect()
}
