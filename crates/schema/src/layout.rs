//! Layout tree of the structured generations.
//!
//! A layout is exactly one of four kinds by construction; the wire shape is
//! the usual `{"kind": ..., "spec": ...}` pair via adjacent tagging.

use crate::common::{RepeatOptions, RowRepeatOptions};
use serde::{Deserialize, Serialize};

/// Name-only reference from a layout item to an entry of the element map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    pub name: String,
}

impl ElementRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "spec")]
pub enum Layout {
    #[serde(rename = "GridLayout")]
    Grid(GridLayout),
    #[serde(rename = "RowsLayout")]
    Rows(RowsLayout),
    #[serde(rename = "AutoGridLayout")]
    AutoGrid(AutoGridLayout),
    #[serde(rename = "TabsLayout")]
    Tabs(TabsLayout),
}

impl Default for Layout {
    fn default() -> Self {
        Self::Grid(GridLayout::default())
    }
}

/// Explicit 24-column grid; coordinates carry over from the legacy `gridPos`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    #[serde(default)]
    pub items: Vec<GridItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridItem {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
    pub element: ElementRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowsLayout {
    #[serde(default)]
    pub rows: Vec<LayoutRow>,
}

/// One row of a [`RowsLayout`]. Rows own a nested layout of any kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub collapse: bool,
    #[serde(rename = "hideHeader", default)]
    pub hide_header: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RowRepeatOptions>,
    #[serde(default)]
    pub layout: Layout,
}

/// Row height presets for [`AutoGridLayout`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoGridRowHeight {
    #[serde(rename = "short")]
    Short,
    #[default]
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "tall")]
    Tall,
    #[serde(rename = "custom")]
    Custom,
}

/// Items flow left to right and wrap; the renderer picks exact positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoGridLayout {
    #[serde(
        rename = "maxColumnCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_column_count: Option<i64>,
    #[serde(rename = "rowHeightMode", default)]
    pub row_height_mode: AutoGridRowHeight,
    #[serde(rename = "rowHeight", default, skip_serializing_if = "Option::is_none")]
    pub row_height: Option<f64>,
    #[serde(default)]
    pub items: Vec<AutoGridItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoGridItem {
    pub element: ElementRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RowRepeatOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabsLayout {
    #[serde(default)]
    pub tabs: Vec<LayoutTab>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutTab {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RowRepeatOptions>,
    #[serde(default)]
    pub layout: Layout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layout_adjacent_tagging() {
        let layout = Layout::Grid(GridLayout {
            items: vec![GridItem {
                x: 0,
                y: 0,
                width: 12,
                height: 8,
                element: ElementRef::new("panel-1"),
                repeat: None,
            }],
        });
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["kind"], "GridLayout");
        assert_eq!(json["spec"]["items"][0]["element"]["name"], "panel-1");
    }

    #[test]
    fn test_nested_rows_deserialize() {
        let layout: Layout = serde_json::from_value(json!({
            "kind": "RowsLayout",
            "spec": {
                "rows": [{
                    "title": "Overview",
                    "collapse": true,
                    "layout": {"kind": "GridLayout", "spec": {"items": []}}
                }]
            }
        }))
        .unwrap();
        let Layout::Rows(rows) = layout else {
            panic!("expected rows layout");
        };
        assert_eq!(rows.rows[0].title.as_deref(), Some("Overview"));
        assert!(rows.rows[0].collapse);
        assert!(!rows.rows[0].hide_header);
    }

    #[test]
    fn test_auto_grid_defaults() {
        let layout: Layout = serde_json::from_value(json!({
            "kind": "AutoGridLayout",
            "spec": {"items": [{"element": {"name": "panel-2"}}]}
        }))
        .unwrap();
        let Layout::AutoGrid(auto) = layout else {
            panic!("expected auto grid");
        };
        assert_eq!(auto.row_height_mode, AutoGridRowHeight::Standard);
        assert!(auto.max_column_count.is_none());
    }
}
