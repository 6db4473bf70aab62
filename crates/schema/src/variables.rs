//! Template variable specs whose shape is identical in both structured
//! generations. Query and ad-hoc variables embed generation-specific query
//! types and live with their generation instead.

use crate::common::{VariableHide, VariableOption, VariableRefresh};
use serde::{Deserialize, Serialize};

pub(crate) fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomVariableSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hide: VariableHide,
    #[serde(rename = "skipUrlSync", default)]
    pub skip_url_sync: bool,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub current: VariableOption,
    #[serde(default)]
    pub options: Vec<VariableOption>,
    #[serde(default)]
    pub multi: bool,
    #[serde(rename = "includeAll", default)]
    pub include_all: bool,
    #[serde(rename = "allValue", default, skip_serializing_if = "Option::is_none")]
    pub all_value: Option<String>,
    #[serde(rename = "allowCustomValue", default = "default_true")]
    pub allow_custom_value: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantVariableSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hide: VariableHide,
    #[serde(rename = "skipUrlSync", default)]
    pub skip_url_sync: bool,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub current: VariableOption,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalVariableSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hide: VariableHide,
    #[serde(rename = "skipUrlSync", default)]
    pub skip_url_sync: bool,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub current: VariableOption,
    #[serde(default)]
    pub options: Vec<VariableOption>,
    #[serde(default)]
    pub auto: bool,
    #[serde(rename = "autoMin", default)]
    pub auto_min: String,
    #[serde(rename = "autoCount", default)]
    pub auto_count: i64,
    #[serde(default)]
    pub refresh: VariableRefresh,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextVariableSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hide: VariableHide,
    #[serde(rename = "skipUrlSync", default)]
    pub skip_url_sync: bool,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub current: VariableOption,
}

/// Picks a datasource instance of a given plugin type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceVariableSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hide: VariableHide,
    #[serde(rename = "skipUrlSync", default)]
    pub skip_url_sync: bool,
    #[serde(rename = "pluginId", default)]
    pub plugin_id: String,
    #[serde(default)]
    pub regex: String,
    #[serde(default)]
    pub current: VariableOption,
    #[serde(default)]
    pub options: Vec<VariableOption>,
    #[serde(default)]
    pub multi: bool,
    #[serde(rename = "includeAll", default)]
    pub include_all: bool,
    #[serde(rename = "allValue", default, skip_serializing_if = "Option::is_none")]
    pub all_value: Option<String>,
    #[serde(default)]
    pub refresh: VariableRefresh,
    #[serde(rename = "allowCustomValue", default = "default_true")]
    pub allow_custom_value: bool,
}
