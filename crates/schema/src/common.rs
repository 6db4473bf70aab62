//! Structured types shared by both typed dashboard generations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to a datasource by type and/or uid. Either half may be absent;
/// resolution rules live in the conversion crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceRef {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ds_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl DatasourceRef {
    pub fn new(ds_type: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            ds_type: Some(ds_type.into()),
            uid: Some(uid.into()),
        }
    }

    /// True when neither half carries a usable value.
    pub fn is_blank(&self) -> bool {
        self.ds_type.as_deref().unwrap_or("").is_empty()
            && self.uid.as_deref().unwrap_or("").is_empty()
    }
}

/// Dashboard-level navigation link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardLink {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", default)]
    pub link_type: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub tooltip: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "asDropdown", default)]
    pub as_dropdown: bool,
    #[serde(rename = "targetBlank", default)]
    pub target_blank: bool,
    #[serde(rename = "includeVars", default)]
    pub include_vars: bool,
    #[serde(rename = "keepTime", default)]
    pub keep_time: bool,
}

/// Panel-level data link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataLink {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "targetBlank", default, skip_serializing_if = "Option::is_none")]
    pub target_blank: Option<bool>,
}

/// One entry of the time picker's quick-range list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangeOption {
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// Time range, refresh, and time-picker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSettings {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(rename = "autoRefresh", default)]
    pub auto_refresh: String,
    #[serde(rename = "autoRefreshIntervals", default)]
    pub auto_refresh_intervals: Vec<String>,
    #[serde(rename = "hideTimepicker", default)]
    pub hide_timepicker: bool,
    #[serde(rename = "weekStart", default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<String>,
    #[serde(
        rename = "fiscalYearStartMonth",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fiscal_year_start_month: Option<i64>,
    #[serde(rename = "nowDelay", default, skip_serializing_if = "Option::is_none")]
    pub now_delay: Option<String>,
    #[serde(rename = "quickRanges", default, skip_serializing_if = "Vec::is_empty")]
    pub quick_ranges: Vec<TimeRangeOption>,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            from: "now-6h".to_string(),
            to: "now".to_string(),
            timezone: "browser".to_string(),
            auto_refresh: String::new(),
            auto_refresh_intervals: [
                "5s", "10s", "30s", "1m", "5m", "15m", "30m", "1h", "2h", "1d",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            hide_timepicker: false,
            week_start: None,
            fiscal_year_start_month: None,
            now_delay: None,
            quick_ranges: Vec::new(),
        }
    }
}

/// Variable values are either a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrArrayOfString {
    String(String),
    Array(Vec<String>),
}

impl Default for StringOrArrayOfString {
    fn default() -> Self {
        Self::String(String::new())
    }
}

impl From<&str> for StringOrArrayOfString {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// A selectable variable value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableOption {
    #[serde(default)]
    pub text: StringOrArrayOfString,
    #[serde(default)]
    pub value: StringOrArrayOfString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

/// Variable visibility, stored as 0/1/2 in the unstructured generations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableHide {
    #[default]
    #[serde(rename = "dontHide")]
    DontHide,
    #[serde(rename = "hideLabel")]
    HideLabel,
    #[serde(rename = "hideVariable")]
    HideVariable,
}

impl VariableHide {
    pub fn from_legacy(value: i64) -> Self {
        match value {
            1 => Self::HideLabel,
            2 => Self::HideVariable,
            _ => Self::DontHide,
        }
    }

    pub fn to_legacy(self) -> i64 {
        match self {
            Self::DontHide => 0,
            Self::HideLabel => 1,
            Self::HideVariable => 2,
        }
    }
}

/// When a query variable re-runs its lookup; 0/1/2 in the legacy payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableRefresh {
    #[default]
    #[serde(rename = "never")]
    Never,
    #[serde(rename = "onDashboardLoad")]
    OnDashboardLoad,
    #[serde(rename = "onTimeRangeChanged")]
    OnTimeRangeChanged,
}

impl VariableRefresh {
    pub fn from_legacy(value: i64) -> Self {
        match value {
            1 => Self::OnDashboardLoad,
            2 => Self::OnTimeRangeChanged,
            _ => Self::Never,
        }
    }

    pub fn to_legacy(self) -> i64 {
        match self {
            Self::Never => 0,
            Self::OnDashboardLoad => 1,
            Self::OnTimeRangeChanged => 2,
        }
    }
}

/// Query variable option ordering; 0..=8 in the legacy payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableSort {
    #[default]
    #[serde(rename = "disabled")]
    Disabled,
    #[serde(rename = "alphabeticalAsc")]
    AlphabeticalAsc,
    #[serde(rename = "alphabeticalDesc")]
    AlphabeticalDesc,
    #[serde(rename = "numericalAsc")]
    NumericalAsc,
    #[serde(rename = "numericalDesc")]
    NumericalDesc,
    #[serde(rename = "alphabeticalCaseInsensitiveAsc")]
    AlphabeticalCaseInsensitiveAsc,
    #[serde(rename = "alphabeticalCaseInsensitiveDesc")]
    AlphabeticalCaseInsensitiveDesc,
    #[serde(rename = "naturalAsc")]
    NaturalAsc,
    #[serde(rename = "naturalDesc")]
    NaturalDesc,
}

impl VariableSort {
    pub fn from_legacy(value: i64) -> Self {
        match value {
            1 => Self::AlphabeticalAsc,
            2 => Self::AlphabeticalDesc,
            3 => Self::NumericalAsc,
            4 => Self::NumericalDesc,
            5 => Self::AlphabeticalCaseInsensitiveAsc,
            6 => Self::AlphabeticalCaseInsensitiveDesc,
            7 => Self::NaturalAsc,
            8 => Self::NaturalDesc,
            _ => Self::Disabled,
        }
    }

    pub fn to_legacy(self) -> i64 {
        match self {
            Self::Disabled => 0,
            Self::AlphabeticalAsc => 1,
            Self::AlphabeticalDesc => 2,
            Self::NumericalAsc => 3,
            Self::NumericalDesc => 4,
            Self::AlphabeticalCaseInsensitiveAsc => 5,
            Self::AlphabeticalCaseInsensitiveDesc => 6,
            Self::NaturalAsc => 7,
            Self::NaturalDesc => 8,
        }
    }
}

/// Shared-crosshair mode, stored as the `graphTooltip` integer in legacy
/// payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorSync {
    #[default]
    Off,
    Crosshair,
    Tooltip,
}

impl CursorSync {
    pub fn from_graph_tooltip(value: i64) -> Self {
        match value {
            1 => Self::Crosshair,
            2 => Self::Tooltip,
            _ => Self::Off,
        }
    }

    pub fn to_graph_tooltip(self) -> i64 {
        match self {
            Self::Off => 0,
            Self::Crosshair => 1,
            Self::Tooltip => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatDirection {
    #[serde(rename = "h")]
    Horizontal,
    #[serde(rename = "v")]
    Vertical,
}

/// Repeat configuration for grid items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatOptions {
    pub mode: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<RepeatDirection>,
    #[serde(rename = "maxPerRow", default, skip_serializing_if = "Option::is_none")]
    pub max_per_row: Option<i64>,
}

impl RepeatOptions {
    pub fn for_variable(value: impl Into<String>) -> Self {
        Self {
            mode: "variable".to_string(),
            value: value.into(),
            direction: None,
            max_per_row: None,
        }
    }
}

/// Repeat configuration for rows, tabs, and auto-grid items (value only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRepeatOptions {
    pub mode: String,
    pub value: String,
}

impl RowRepeatOptions {
    pub fn for_variable(value: impl Into<String>) -> Self {
        Self {
            mode: "variable".to_string(),
            value: value.into(),
        }
    }
}

/// Reference from a dashboard element to a shared library panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryPanelRef {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
}

/// One filter of an ad-hoc filter variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdhocFilter {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Restricts an annotation to a subset of panels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationPanelFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<bool>,
    #[serde(default)]
    pub ids: Vec<i64>,
}

/// Field matcher used by transformation filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// One step of a panel's transformation pipeline. Options stay opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<MatcherConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default)]
    pub options: Value,
}

/// Query execution options shared by every query in a panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(rename = "timeFrom", default, skip_serializing_if = "Option::is_none")]
    pub time_from: Option<String>,
    #[serde(rename = "timeShift", default, skip_serializing_if = "Option::is_none")]
    pub time_shift: Option<String>,
    #[serde(rename = "cacheTimeout", default, skip_serializing_if = "Option::is_none")]
    pub cache_timeout: Option<String>,
    #[serde(
        rename = "maxDataPoints",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_data_points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(
        rename = "hideTimeOverride",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hide_time_override: Option<bool>,
    #[serde(
        rename = "queryCachingTTL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub query_caching_ttl: Option<i64>,
}
