//! Second structured generation.
//!
//! Differs from the previous one in how plugins are referenced: queries and
//! viz configs carry an API-style `group`/`version` pair, and the datasource
//! instance is named inside the query instead of a spec-level ref.

use crate::common::{
    AdhocFilter, AnnotationPanelFilter, CursorSync, DashboardLink, DataLink, QueryOptions,
    TimeSettings, Transformation, VariableHide, VariableOption, VariableRefresh, VariableSort,
};
use crate::layout::Layout;
use crate::unstructured::UnstructuredSpec;
use crate::variables::{
    ConstantVariableSpec, CustomVariableSpec, DatasourceVariableSpec, IntervalVariableSpec,
    TextVariableSpec, default_true,
};
use crate::LibraryPanelRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Datasource instance reference by name only; the plugin type lives in the
/// enclosing query's `group`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceName {
    #[serde(default)]
    pub name: String,
}

/// A datasource query. `group` is the datasource plugin type and `version`
/// the query schema version (currently always `v0`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuery {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<DatasourceName>,
    #[serde(default)]
    pub spec: UnstructuredSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelQuery {
    #[serde(rename = "refId", default)]
    pub ref_id: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub query: DataQuery,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryGroup {
    #[serde(default)]
    pub queries: Vec<PanelQuery>,
    #[serde(default)]
    pub transformations: Vec<Transformation>,
    #[serde(rename = "queryOptions", default)]
    pub query_options: QueryOptions,
}

/// Visualization plugin configuration; `group` is the plugin id and
/// `version` the plugin version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VizConfig {
    #[serde(default)]
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub spec: VizConfigSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VizConfigSpec {
    #[serde(default)]
    pub options: Value,
    #[serde(rename = "fieldConfig", default)]
    pub field_config: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparent: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<DataLink>,
    #[serde(default)]
    pub data: QueryGroup,
    #[serde(rename = "vizConfig", default)]
    pub viz_config: VizConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryPanelSpec {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "libraryPanel", default)]
    pub library_panel: LibraryPanelRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "spec")]
pub enum Element {
    Panel(PanelSpec),
    LibraryPanel(LibraryPanelSpec),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationQuerySpec {
    pub name: String,
    #[serde(default = "default_true")]
    pub enable: bool,
    #[serde(default)]
    pub hide: bool,
    #[serde(rename = "iconColor", default)]
    pub icon_color: String,
    #[serde(rename = "builtIn", default, skip_serializing_if = "Option::is_none")]
    pub built_in: Option<bool>,
    #[serde(default)]
    pub query: DataQuery,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<AnnotationPanelFilter>,
    #[serde(
        rename = "legacyOptions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub legacy_options: Option<UnstructuredSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryVariableSpec {
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
    #[serde(default)]
    pub sort: VariableSort,
    #[serde(default)]
    pub regex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(rename = "allowCustomValue", default = "default_true")]
    pub allow_custom_value: bool,
    #[serde(default)]
    pub query: DataQuery,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdhocVariableSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hide: VariableHide,
    #[serde(rename = "skipUrlSync", default)]
    pub skip_url_sync: bool,
    #[serde(rename = "allowCustomValue", default = "default_true")]
    pub allow_custom_value: bool,
    #[serde(default)]
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<DatasourceName>,
    #[serde(default)]
    pub filters: Vec<AdhocFilter>,
    #[serde(rename = "baseFilters", default)]
    pub base_filters: Vec<AdhocFilter>,
    #[serde(
        rename = "defaultKeys",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_keys: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "spec")]
pub enum Variable {
    QueryVariable(QueryVariableSpec),
    DatasourceVariable(DatasourceVariableSpec),
    CustomVariable(CustomVariableSpec),
    ConstantVariable(ConstantVariableSpec),
    IntervalVariable(IntervalVariableSpec),
    TextVariable(TextVariableSpec),
    AdhocVariable(AdhocVariableSpec),
}

/// Complete typed spec of this generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSpec {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(rename = "cursorSync", default)]
    pub cursor_sync: CursorSync,
    #[serde(default)]
    pub preload: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(rename = "liveNow", default, skip_serializing_if = "Option::is_none")]
    pub live_now: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
    #[serde(rename = "timeSettings", default)]
    pub time_settings: TimeSettings,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<DashboardLink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationQuerySpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub elements: BTreeMap<String, Element>,
    #[serde(default)]
    pub layout: Layout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_wire_shape() {
        let query = DataQuery {
            group: "prometheus".into(),
            version: "v0".into(),
            datasource: Some(DatasourceName {
                name: "uid-abc".into(),
            }),
            spec: json!({"expr": "up"}).as_object().unwrap().clone(),
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["group"], "prometheus");
        assert_eq!(json["version"], "v0");
        assert_eq!(json["datasource"]["name"], "uid-abc");
    }

    #[test]
    fn test_viz_config_version_is_plugin_version() {
        let viz: VizConfig = serde_json::from_value(json!({
            "group": "timeseries",
            "version": "11.0.0",
            "spec": {"options": {}, "fieldConfig": {"defaults": {}, "overrides": []}}
        }))
        .unwrap();
        assert_eq!(viz.group, "timeseries");
        assert_eq!(viz.version.as_deref(), Some("11.0.0"));
    }
}
