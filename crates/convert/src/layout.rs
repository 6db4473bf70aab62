//! Layout transformation between the flat legacy panel list and the
//! structured element-map-plus-layout-tree shape.
//!
//! The conversion of individual panels is behind the [`ElementSink`] and
//! [`PanelWriter`] traits; this module only moves geometry. Row markers
//! occupy one grid unit of vertical space and are not items of their own
//! row's coordinate space.

use dashgrade_schema::layout::{
    AutoGridLayout, AutoGridRowHeight, ElementRef, GridItem, GridLayout, Layout, LayoutRow,
    LayoutTab, RowsLayout, TabsLayout,
};
use dashgrade_schema::unstructured::{UnstructuredSpec, get_array, get_i64, get_map, get_str};
use dashgrade_schema::{RepeatDirection, RepeatOptions, RowRepeatOptions};
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::error::{ConversionError, Result};

pub const GRID_TOTAL_COLUMNS: i64 = 24;
/// Height of a row marker in grid units.
pub const GRID_ROW_HEIGHT: i64 = 1;
pub const DEFAULT_PANEL_WIDTH: i64 = 6;
pub const DEFAULT_PANEL_HEIGHT: i64 = 3;

const GRID_CELL_HEIGHT_PX: f64 = 30.0;
const GRID_CELL_VMARGIN_PX: f64 = 8.0;
const DEFAULT_AUTO_GRID_COLUMNS: i64 = 3;

/// Result of registering one legacy panel as an element.
#[derive(Debug, Clone)]
pub struct ElementHandle {
    pub name: String,
    pub repeat: Option<RepeatOptions>,
}

/// Turns one legacy panel into an element-map entry.
pub trait ElementSink {
    fn add_panel(&mut self, panel: &UnstructuredSpec) -> Result<ElementHandle>;
}

/// Final position of an element in the flat legacy grid.
#[derive(Debug, Clone, Default)]
pub struct GridPlacement {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub repeat: Option<RepeatOptions>,
}

/// Renders a named element as a flat legacy panel at a given placement.
pub trait PanelWriter {
    fn write_panel(&mut self, name: &str, placement: &GridPlacement) -> Result<Value>;
}

fn grid_pos(panel: &UnstructuredSpec) -> (i64, i64, i64, i64) {
    match get_map(panel, "gridPos") {
        Some(pos) => (
            get_i64(pos, "x", 0),
            get_i64(pos, "y", 0),
            get_i64(pos, "w", DEFAULT_PANEL_WIDTH),
            get_i64(pos, "h", DEFAULT_PANEL_HEIGHT),
        ),
        None => (0, 0, DEFAULT_PANEL_WIDTH, DEFAULT_PANEL_HEIGHT),
    }
}

fn is_row_marker(panel: &UnstructuredSpec) -> bool {
    get_str(panel, "type") == Some("row")
}

/// Y coordinate of a panel inside its row's coordinate space. The marker
/// itself sits at `row_y` and takes [`GRID_ROW_HEIGHT`] units.
fn y_offset_in_row(panel_y: i64, row_y: i64) -> i64 {
    panel_y - row_y - GRID_ROW_HEIGHT
}

/// Builds the structured layout for a flat legacy panel list. Without row
/// markers the result is a plain grid with coordinates carried over; with
/// markers each row becomes a [`LayoutRow`], and panels before the first
/// marker form an implicit hidden-header row.
pub fn build_layout(panels: &[Value], sink: &mut dyn ElementSink) -> Result<Layout> {
    let objects: Vec<&UnstructuredSpec> = panels
        .iter()
        .filter_map(|p| {
            let obj = p.as_object();
            if obj.is_none() {
                warn!("skipping non-object entry in legacy panel list");
            }
            obj
        })
        .collect();

    if !objects.iter().any(|p| is_row_marker(p)) {
        let mut items = Vec::with_capacity(objects.len());
        for panel in &objects {
            // No marker means no row coordinate space; coordinates carry
            // over verbatim.
            items.push(build_grid_item(panel, -GRID_ROW_HEIGHT, sink)?);
        }
        return Ok(Layout::Grid(GridLayout { items }));
    }

    let mut rows: Vec<LayoutRow> = Vec::new();
    let mut current: Option<(LayoutRow, i64, Vec<GridItem>)> = None;

    let finish = |rows: &mut Vec<LayoutRow>, taken: Option<(LayoutRow, i64, Vec<GridItem>)>| {
        if let Some((mut row, _, items)) = taken {
            row.layout = Layout::Grid(GridLayout { items });
            rows.push(row);
        }
    };

    for panel in &objects {
        if is_row_marker(panel) {
            finish(&mut rows, current.take());
            let (_, row_y, _, _) = grid_pos(panel);
            let row = LayoutRow {
                title: get_str(panel, "title").map(str::to_string),
                collapse: dashgrade_schema::unstructured::get_bool(panel, "collapsed", false),
                hide_header: false,
                repeat: get_str(panel, "repeat")
                    .filter(|v| !v.is_empty())
                    .map(RowRepeatOptions::for_variable),
                layout: Layout::default(),
            };
            let mut items = Vec::new();
            // Collapsed markers keep their children inline.
            if let Some(children) = get_array(panel, "panels") {
                for child in children.iter().filter_map(Value::as_object) {
                    items.push(build_grid_item(child, row_y, sink)?);
                }
            }
            current = Some((row, row_y, items));
        } else {
            let (_, row_y, items) = current.get_or_insert_with(|| {
                // Panels before the first marker keep their coordinates.
                (
                    LayoutRow {
                        hide_header: true,
                        ..Default::default()
                    },
                    -GRID_ROW_HEIGHT,
                    Vec::new(),
                )
            });
            items.push(build_grid_item(panel, *row_y, sink)?);
        }
    }
    finish(&mut rows, current.take());

    Ok(Layout::Rows(RowsLayout { rows }))
}

fn build_grid_item(
    panel: &UnstructuredSpec,
    row_y: i64,
    sink: &mut dyn ElementSink,
) -> Result<GridItem> {
    let (x, y, w, h) = grid_pos(panel);
    let handle = sink.add_panel(panel)?;
    Ok(GridItem {
        x,
        y: y_offset_in_row(y, row_y),
        width: w,
        height: h,
        element: ElementRef::new(handle.name),
        repeat: handle.repeat,
    })
}

pub(crate) fn missing_element(name: &str) -> ConversionError {
    ConversionError::StructuralConversion(format!(
        "layout references element {name} which is not present in the dashboard elements"
    ))
}

/// Flattens a structured layout back into the legacy panel list. Row marker
/// ids start after `max_element_id`.
pub fn flatten_layout(
    layout: &Layout,
    max_element_id: i64,
    writer: &mut dyn PanelWriter,
) -> Result<Vec<Value>> {
    let mut next_row_id = max_element_id + 1;
    match layout {
        Layout::Grid(grid) => {
            let mut panels = Vec::with_capacity(grid.items.len());
            for item in &grid.items {
                panels.push(write_grid_item(item, 0, writer)?);
            }
            Ok(panels)
        }
        Layout::Rows(rows) => flatten_nested(Some(rows), None, 0, &mut next_row_id, writer),
        Layout::Tabs(tabs) => flatten_nested(None, Some(tabs), 0, &mut next_row_id, writer),
        Layout::AutoGrid(auto) => auto_grid_panels(auto, 0, writer),
    }
}

fn write_grid_item(item: &GridItem, y_offset: i64, writer: &mut dyn PanelWriter) -> Result<Value> {
    writer.write_panel(
        &item.element.name,
        &GridPlacement {
            x: item.x,
            y: item.y + y_offset,
            width: item.width,
            height: item.height,
            repeat: item.repeat.clone(),
        },
    )
}

fn flatten_nested(
    rows: Option<&RowsLayout>,
    tabs: Option<&TabsLayout>,
    y_offset: i64,
    next_row_id: &mut i64,
    writer: &mut dyn PanelWriter,
) -> Result<Vec<Value>> {
    let mut panels = Vec::new();
    let mut current_y = y_offset;

    if let Some(rows) = rows {
        for row in &rows.rows {
            let (row_panels, new_y) = process_row(row, current_y, next_row_id, writer)?;
            panels.extend(row_panels);
            current_y = new_y;
        }
    }
    if let Some(tabs) = tabs {
        for tab in &tabs.tabs {
            let (tab_panels, new_y) = process_tab(tab, current_y, next_row_id, writer)?;
            panels.extend(tab_panels);
            current_y = new_y;
        }
    }

    Ok(panels)
}

fn row_marker(id: i64, title: Option<&str>, current_y: i64) -> Map<String, Value> {
    let mut marker = Map::new();
    marker.insert("type".into(), json!("row"));
    marker.insert("id".into(), json!(id));
    if let Some(title) = title {
        marker.insert("title".into(), json!(title));
    }
    marker.insert(
        "gridPos".into(),
        json!({"x": 0, "y": current_y, "w": GRID_TOTAL_COLUMNS, "h": GRID_ROW_HEIGHT}),
    );
    marker
}

fn process_row(
    row: &LayoutRow,
    start_y: i64,
    next_row_id: &mut i64,
    writer: &mut dyn PanelWriter,
) -> Result<(Vec<Value>, i64)> {
    let mut panels = Vec::new();
    let mut current_y = start_y;

    // Nested rows or tabs: keep the parent marker, then flatten the nested
    // structure after it.
    let nested = match &row.layout {
        Layout::Rows(nested) => Some((Some(nested), None)),
        Layout::Tabs(nested) => Some((None, Some(nested))),
        _ => None,
    };
    if let Some((nested_rows, nested_tabs)) = nested {
        if !row.hide_header {
            let mut marker = row_marker(*next_row_id, row.title.as_deref(), current_y);
            *next_row_id += 1;
            marker.insert("collapsed".into(), json!(false));
            marker.insert("panels".into(), json!([]));
            panels.push(Value::Object(marker));
            current_y += GRID_ROW_HEIGHT;
        }
        let nested_panels =
            flatten_nested(nested_rows, nested_tabs, current_y, next_row_id, writer)?;
        current_y = max_y_from_panels(&nested_panels, current_y);
        panels.extend(nested_panels);
        return Ok((panels, current_y));
    }

    if !row.hide_header {
        let mut marker = Map::new();
        marker.insert("type".into(), json!("row"));
        marker.insert("id".into(), json!(*next_row_id));
        *next_row_id += 1;
        if let Some(title) = &row.title {
            marker.insert("title".into(), json!(title));
        }
        marker.insert("collapsed".into(), json!(row.collapse));
        if let Some(repeat) = &row.repeat
            && !repeat.value.is_empty()
        {
            marker.insert("repeat".into(), json!(repeat.value));
        }

        let has_content = match &row.layout {
            Layout::Grid(grid) => !grid.items.is_empty(),
            Layout::AutoGrid(_) => true,
            _ => false,
        };
        if has_content || row.collapse {
            marker.insert(
                "gridPos".into(),
                json!({"x": 0, "y": current_y, "w": GRID_TOTAL_COLUMNS, "h": GRID_ROW_HEIGHT}),
            );
        }

        if row.collapse {
            let collapsed =
                extract_collapsed(&row.layout, current_y + GRID_ROW_HEIGHT, writer)?;
            if !collapsed.is_empty() {
                marker.insert("panels".into(), Value::Array(collapsed));
            }
        }

        panels.push(Value::Object(marker));
        current_y += GRID_ROW_HEIGHT;
    }

    if !row.collapse || row.hide_header {
        let (row_panels, new_y) =
            extract_expanded(&row.layout, current_y, row.hide_header, start_y, writer)?;
        panels.extend(row_panels);
        current_y = new_y;
    }

    Ok((panels, current_y))
}

fn process_tab(
    tab: &LayoutTab,
    start_y: i64,
    next_row_id: &mut i64,
    writer: &mut dyn PanelWriter,
) -> Result<(Vec<Value>, i64)> {
    let mut panels = Vec::new();
    let mut current_y = start_y;

    // A tab becomes an expanded row marker with its content after it.
    let mut marker = row_marker(*next_row_id, tab.title.as_deref(), current_y);
    *next_row_id += 1;
    marker.insert("collapsed".into(), json!(false));
    marker.insert("panels".into(), json!([]));
    if let Some(repeat) = &tab.repeat
        && !repeat.value.is_empty()
    {
        // The legacy shape has no repeat mode; only the value survives.
        marker.insert("repeat".into(), json!(repeat.value));
    }
    panels.push(Value::Object(marker));
    current_y += GRID_ROW_HEIGHT;

    match &tab.layout {
        Layout::Rows(rows) => {
            let nested = flatten_nested(Some(rows), None, current_y, next_row_id, writer)?;
            current_y = max_y_from_panels(&nested, current_y);
            panels.extend(nested);
        }
        Layout::Tabs(tabs) => {
            let nested = flatten_nested(None, Some(tabs), current_y, next_row_id, writer)?;
            current_y = max_y_from_panels(&nested, current_y);
            panels.extend(nested);
        }
        Layout::Grid(grid) => {
            let base_y = current_y;
            let mut max_y = current_y;
            for item in &grid.items {
                let panel = write_grid_item(item, base_y, writer)?;
                max_y = max_y.max(item.y + base_y + item.height);
                panels.push(panel);
            }
            current_y = max_y;
        }
        Layout::AutoGrid(auto) => {
            let auto_panels = auto_grid_panels(auto, current_y, writer)?;
            current_y = max_y_from_panels(&auto_panels, current_y);
            panels.extend(auto_panels);
        }
    }

    Ok((panels, current_y))
}

/// Panels of a collapsed row, positioned as if the row were expanded at
/// `base_y`. The legacy shape stores them nested inside the marker.
fn extract_collapsed(
    layout: &Layout,
    base_y: i64,
    writer: &mut dyn PanelWriter,
) -> Result<Vec<Value>> {
    let mut panels = Vec::new();
    match layout {
        Layout::Grid(grid) => {
            for item in &grid.items {
                panels.push(write_grid_item(item, base_y, writer)?);
            }
        }
        Layout::AutoGrid(auto) => {
            panels.extend(auto_grid_panels(auto, base_y, writer)?);
        }
        Layout::Rows(rows) => {
            let mut current_y = base_y;
            for row in &rows.rows {
                panels.extend(extract_collapsed(&row.layout, current_y, writer)?);
                current_y += layout_height(&row.layout);
            }
        }
        Layout::Tabs(tabs) => {
            let mut current_y = base_y;
            for tab in &tabs.tabs {
                panels.extend(extract_collapsed(&tab.layout, current_y, writer)?);
                current_y += layout_height(&tab.layout);
            }
        }
    }
    Ok(panels)
}

fn extract_expanded(
    layout: &Layout,
    current_y: i64,
    hidden_header: bool,
    start_y: i64,
    writer: &mut dyn PanelWriter,
) -> Result<(Vec<Value>, i64)> {
    let mut panels = Vec::new();
    let mut max_y = start_y;

    match layout {
        Layout::Grid(grid) => {
            let mut local_max_y = 0;
            for item in &grid.items {
                // Hidden-header rows keep the item coordinates as-is; explicit
                // rows start one marker height below the marker, which is
                // where `current_y` already points.
                let y_offset = if hidden_header { 0 } else { current_y };
                let panel = write_grid_item(item, y_offset, writer)?;
                local_max_y = local_max_y.max(item.y + y_offset + item.height);
                panels.push(panel);
            }
            max_y = local_max_y;
        }
        Layout::AutoGrid(auto) => {
            let y_offset = if hidden_header { start_y } else { current_y };
            let auto_panels = auto_grid_panels(auto, y_offset, writer)?;
            max_y = max_y_from_panels(&auto_panels, y_offset);
            panels.extend(auto_panels);
        }
        // Nested rows/tabs are handled before this point.
        _ => {}
    }

    Ok((panels, max_y))
}

fn pixels_to_grid_units(pixels: f64) -> i64 {
    let unit = GRID_CELL_HEIGHT_PX + GRID_CELL_VMARGIN_PX;
    ((pixels + unit - 1.0) / unit) as i64
}

fn auto_grid_panel_height(auto: &AutoGridLayout) -> i64 {
    match auto.row_height_mode {
        AutoGridRowHeight::Short => 5,
        AutoGridRowHeight::Standard => 9,
        AutoGridRowHeight::Tall => 14,
        AutoGridRowHeight::Custom => match auto.row_height {
            Some(px) if px > 0.0 => pixels_to_grid_units(px),
            _ => 9,
        },
    }
}

/// Approximates an auto grid as a fixed grid: items flow left to right at a
/// uniform size and wrap at the column limit.
fn auto_grid_panels(
    auto: &AutoGridLayout,
    y_offset: i64,
    writer: &mut dyn PanelWriter,
) -> Result<Vec<Value>> {
    let max_columns = match auto.max_column_count {
        Some(c) if c > 0 => c,
        _ => DEFAULT_AUTO_GRID_COLUMNS,
    };
    let panel_width = GRID_TOTAL_COLUMNS / max_columns;
    let panel_height = auto_grid_panel_height(auto);

    let mut panels = Vec::with_capacity(auto.items.len());
    let mut current_x = 0;
    let mut current_y = y_offset;

    for item in &auto.items {
        // Auto-grid repeat has no direction; it flows horizontally and wraps
        // at the column limit.
        let repeat = item.repeat.as_ref().map(|r| RepeatOptions {
            mode: r.mode.clone(),
            value: r.value.clone(),
            direction: Some(RepeatDirection::Horizontal),
            max_per_row: Some(max_columns),
        });
        let panel = writer.write_panel(
            &item.element.name,
            &GridPlacement {
                x: current_x,
                y: current_y,
                width: panel_width,
                height: panel_height,
                repeat,
            },
        )?;
        panels.push(panel);

        current_x += panel_width;
        if current_x >= GRID_TOTAL_COLUMNS {
            current_x = 0;
            current_y += panel_height;
        }
    }

    Ok(panels)
}

/// Vertical extent of a layout's own content; used to advance the cursor
/// when flattening nested collapsed content.
fn layout_height(layout: &Layout) -> i64 {
    match layout {
        Layout::Grid(grid) => grid
            .items
            .iter()
            .map(|item| item.y + item.height)
            .max()
            .unwrap_or(0),
        Layout::AutoGrid(auto) => {
            let max_columns = match auto.max_column_count {
                Some(c) if c > 0 => c,
                _ => DEFAULT_AUTO_GRID_COLUMNS,
            } as usize;
            let row_count = auto.items.len().div_ceil(max_columns);
            row_count as i64 * auto_grid_panel_height(auto)
        }
        _ => 0,
    }
}

fn max_y_from_panels(panels: &[Value], current_y: i64) -> i64 {
    let mut max_y = current_y;
    for panel in panels {
        if let Some(pos) = panel.get("gridPos").and_then(Value::as_object) {
            let y = get_i64(pos, "y", 0);
            let h = get_i64(pos, "h", 0);
            max_y = max_y.max(y + h);
        }
    }
    max_y
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Registers elements named after the legacy panel id and records repeat
    /// values from the panel itself.
    struct RecordingSink {
        seen: Vec<String>,
    }

    impl ElementSink for RecordingSink {
        fn add_panel(&mut self, panel: &UnstructuredSpec) -> Result<ElementHandle> {
            let name = format!("panel-{}", get_i64(panel, "id", 0));
            self.seen.push(name.clone());
            Ok(ElementHandle {
                name,
                repeat: get_str(panel, "repeat")
                    .filter(|v| !v.is_empty())
                    .map(RepeatOptions::for_variable),
            })
        }
    }

    /// Emits minimal legacy panels; fails for names absent from `known`.
    struct MapWriter {
        known: BTreeMap<String, i64>,
    }

    impl MapWriter {
        fn with(names: &[(&str, i64)]) -> Self {
            Self {
                known: names
                    .iter()
                    .map(|(n, id)| (n.to_string(), *id))
                    .collect(),
            }
        }
    }

    impl PanelWriter for MapWriter {
        fn write_panel(&mut self, name: &str, placement: &GridPlacement) -> Result<Value> {
            let id = self
                .known
                .get(name)
                .copied()
                .ok_or_else(|| missing_element(name))?;
            Ok(json!({
                "id": id,
                "type": "timeseries",
                "gridPos": {
                    "x": placement.x,
                    "y": placement.y,
                    "w": placement.width,
                    "h": placement.height
                }
            }))
        }
    }

    #[test]
    fn test_no_rows_builds_grid_verbatim() {
        let panels = vec![
            json!({
                "id": 1, "type": "timeseries",
                "gridPos": {"x": 0, "y": 0, "w": 12, "h": 8}
            }),
            json!({
                "id": 2, "type": "stat",
                "gridPos": {"x": 12, "y": 8, "w": 6, "h": 3}
            }),
        ];
        let mut sink = RecordingSink { seen: vec![] };
        let layout = build_layout(&panels, &mut sink).unwrap();
        let Layout::Grid(grid) = layout else {
            panic!("expected grid layout");
        };
        assert_eq!(grid.items.len(), 2);
        let item = &grid.items[0];
        assert_eq!((item.x, item.y, item.width, item.height), (0, 0, 12, 8));
        assert_eq!(item.element.name, "panel-1");
        let item = &grid.items[1];
        assert_eq!((item.x, item.y, item.width, item.height), (12, 8, 6, 3));
    }

    #[test]
    fn test_row_children_offset_into_row_space() {
        let panels = vec![
            json!({"id": 10, "type": "row", "title": "Servers",
                   "gridPos": {"x": 0, "y": 5, "w": 24, "h": 1}}),
            json!({"id": 2, "type": "timeseries",
                   "gridPos": {"x": 0, "y": 6, "w": 12, "h": 8}}),
        ];
        let mut sink = RecordingSink { seen: vec![] };
        let layout = build_layout(&panels, &mut sink).unwrap();
        let Layout::Rows(rows) = layout else {
            panic!("expected rows layout");
        };
        assert_eq!(rows.rows.len(), 1);
        let row = &rows.rows[0];
        assert_eq!(row.title.as_deref(), Some("Servers"));
        let Layout::Grid(grid) = &row.layout else {
            panic!("expected grid inside row");
        };
        assert_eq!(grid.items[0].y, 0);
    }

    #[test]
    fn test_leading_panels_form_hidden_header_row() {
        let panels = vec![
            json!({"id": 1, "type": "stat", "gridPos": {"x": 0, "y": 0, "w": 6, "h": 3}}),
            json!({"id": 20, "type": "row", "gridPos": {"x": 0, "y": 3, "w": 24, "h": 1}}),
            json!({"id": 2, "type": "stat", "gridPos": {"x": 0, "y": 4, "w": 6, "h": 3}}),
        ];
        let mut sink = RecordingSink { seen: vec![] };
        let Layout::Rows(rows) = build_layout(&panels, &mut sink).unwrap() else {
            panic!("expected rows layout");
        };
        assert_eq!(rows.rows.len(), 2);
        assert!(rows.rows[0].hide_header);
        let Layout::Grid(first) = &rows.rows[0].layout else {
            panic!("expected grid");
        };
        // Implicit row: children keep their coordinates.
        assert_eq!(first.items[0].y, 0);
    }

    #[test]
    fn test_collapsed_marker_children_stay_in_row() {
        let panels = vec![json!({
            "id": 5, "type": "row", "collapsed": true,
            "gridPos": {"x": 0, "y": 0, "w": 24, "h": 1},
            "panels": [
                {"id": 6, "type": "stat", "gridPos": {"x": 0, "y": 1, "w": 6, "h": 3}}
            ]
        })];
        let mut sink = RecordingSink { seen: vec![] };
        let Layout::Rows(rows) = build_layout(&panels, &mut sink).unwrap() else {
            panic!("expected rows layout");
        };
        assert!(rows.rows[0].collapse);
        let Layout::Grid(grid) = &rows.rows[0].layout else {
            panic!("expected grid");
        };
        assert_eq!(grid.items[0].element.name, "panel-6");
        assert_eq!(grid.items[0].y, 0);
    }

    #[test]
    fn test_flatten_grid_is_one_to_one() {
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
        let mut writer = MapWriter::with(&[("panel-1", 1)]);
        let panels = flatten_layout(&layout, 1, &mut writer).unwrap();
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0]["gridPos"]["y"], 0);
    }

    #[test]
    fn test_flatten_missing_element_is_hard_error() {
        let layout = Layout::Grid(GridLayout {
            items: vec![GridItem {
                element: ElementRef::new("panel-404"),
                ..Default::default()
            }],
        });
        let mut writer = MapWriter::with(&[]);
        let err = flatten_layout(&layout, 0, &mut writer).unwrap_err();
        assert!(matches!(err, ConversionError::StructuralConversion(_)));
    }

    #[test]
    fn test_flatten_rows_offsets_and_row_ids() {
        let layout = Layout::Rows(RowsLayout {
            rows: vec![
                LayoutRow {
                    title: Some("A".into()),
                    layout: Layout::Grid(GridLayout {
                        items: vec![GridItem {
                            x: 0,
                            y: 0,
                            width: 24,
                            height: 8,
                            element: ElementRef::new("panel-1"),
                            repeat: None,
                        }],
                    }),
                    ..Default::default()
                },
                LayoutRow {
                    title: Some("B".into()),
                    layout: Layout::Grid(GridLayout {
                        items: vec![GridItem {
                            x: 0,
                            y: 0,
                            width: 24,
                            height: 4,
                            element: ElementRef::new("panel-2"),
                            repeat: None,
                        }],
                    }),
                    ..Default::default()
                },
            ],
        });
        let mut writer = MapWriter::with(&[("panel-1", 1), ("panel-2", 2)]);
        let panels = flatten_layout(&layout, 2, &mut writer).unwrap();
        assert_eq!(panels.len(), 4);
        // Row ids continue after the max element id.
        assert_eq!(panels[0]["id"], 3);
        assert_eq!(panels[0]["gridPos"]["y"], 0);
        assert_eq!(panels[1]["gridPos"]["y"], 1);
        assert_eq!(panels[2]["id"], 4);
        assert_eq!(panels[2]["gridPos"]["y"], 9);
        assert_eq!(panels[3]["gridPos"]["y"], 10);
    }

    #[test]
    fn test_flatten_collapsed_row_nests_children_with_absolute_y() {
        let layout = Layout::Rows(RowsLayout {
            rows: vec![LayoutRow {
                title: Some("Hidden".into()),
                collapse: true,
                layout: Layout::Grid(GridLayout {
                    items: vec![GridItem {
                        x: 0,
                        y: 0,
                        width: 6,
                        height: 3,
                        element: ElementRef::new("panel-1"),
                        repeat: None,
                    }],
                }),
                ..Default::default()
            }],
        });
        let mut writer = MapWriter::with(&[("panel-1", 1)]);
        let panels = flatten_layout(&layout, 1, &mut writer).unwrap();
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0]["collapsed"], true);
        let nested = panels[0]["panels"].as_array().unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0]["gridPos"]["y"], 1);
    }

    #[test]
    fn test_auto_grid_approximation() {
        let layout = Layout::AutoGrid(AutoGridLayout {
            max_column_count: None,
            row_height_mode: AutoGridRowHeight::Standard,
            row_height: None,
            items: (1..=4)
                .map(|i| dashgrade_schema::layout::AutoGridItem {
                    element: ElementRef::new(format!("panel-{i}")),
                    repeat: None,
                })
                .collect(),
        });
        let mut writer = MapWriter::with(&[
            ("panel-1", 1),
            ("panel-2", 2),
            ("panel-3", 3),
            ("panel-4", 4),
        ]);
        let panels = flatten_layout(&layout, 4, &mut writer).unwrap();
        // Default 3 columns of width 8; the fourth item wraps.
        assert_eq!(panels[0]["gridPos"]["x"], 0);
        assert_eq!(panels[1]["gridPos"]["x"], 8);
        assert_eq!(panels[2]["gridPos"]["x"], 16);
        assert_eq!(panels[3]["gridPos"]["x"], 0);
        assert_eq!(panels[3]["gridPos"]["y"], 9);
        for panel in &panels {
            assert_eq!(panel["gridPos"]["w"], 8);
            assert_eq!(panel["gridPos"]["h"], 9);
        }
    }

    #[test]
    fn test_custom_row_height_in_pixels() {
        let auto = AutoGridLayout {
            row_height_mode: AutoGridRowHeight::Custom,
            row_height: Some(300.0),
            ..Default::default()
        };
        // ceil(300 / 38) = 8
        assert_eq!(auto_grid_panel_height(&auto), 8);
    }

    #[test]
    fn test_tabs_become_expanded_rows() {
        let layout = Layout::Tabs(TabsLayout {
            tabs: vec![LayoutTab {
                title: Some("Tab 1".into()),
                repeat: None,
                layout: Layout::Grid(GridLayout {
                    items: vec![GridItem {
                        x: 0,
                        y: 0,
                        width: 12,
                        height: 8,
                        element: ElementRef::new("panel-1"),
                        repeat: None,
                    }],
                }),
            }],
        });
        let mut writer = MapWriter::with(&[("panel-1", 1)]);
        let panels = flatten_layout(&layout, 1, &mut writer).unwrap();
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0]["type"], "row");
        assert_eq!(panels[0]["collapsed"], false);
        assert_eq!(panels[0]["title"], "Tab 1");
        assert_eq!(panels[1]["gridPos"]["y"], 1);
    }
}
