//! Reverse conversion from the first structured generation back to the
//! latest unstructured shape.

use std::collections::BTreeMap;

use dashgrade_schema::v2alpha::{
    AdhocVariableSpec, AnnotationQuerySpec, DashboardSpec, Element, PanelQuery, PanelSpec,
    QueryVariableSpec, Variable,
};
use dashgrade_schema::variables::{
    ConstantVariableSpec, CustomVariableSpec, DatasourceVariableSpec, IntervalVariableSpec,
    TextVariableSpec,
};
use dashgrade_schema::{
    DashboardV1, DashboardV2Alpha, DatasourceRef, LATEST_SCHEMA_VERSION, RepeatDirection,
    UnstructuredSpec, VariableHide,
};
use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::layout::{self, GridPlacement, PanelWriter};
use crate::resolve::{DASHBOARD_DATASOURCE_UID, MIXED_DATASOURCE_TYPE, MIXED_DATASOURCE_UID};
use crate::v1_to_v2alpha::LEGACY_STRING_VALUE_KEY;

/// Converts a structured dashboard back into the latest unstructured shape.
pub fn convert_v2alpha_to_v1(dashboard: &DashboardV2Alpha) -> Result<DashboardV1> {
    let source = &dashboard.spec;
    let mut spec = Map::new();

    spec.insert("schemaVersion".into(), json!(LATEST_SCHEMA_VERSION));
    spec.insert("title".into(), json!(source.title));
    if let Some(description) = &source.description {
        spec.insert("description".into(), json!(description));
    }
    if !source.tags.is_empty() {
        spec.insert("tags".into(), json!(source.tags));
    }
    spec.insert(
        "graphTooltip".into(),
        json!(source.cursor_sync.to_graph_tooltip()),
    );
    if source.preload {
        spec.insert("preload".into(), json!(true));
    }
    if let Some(editable) = source.editable {
        spec.insert("editable".into(), json!(editable));
    }
    if let Some(live_now) = source.live_now {
        spec.insert("liveNow".into(), json!(live_now));
    }
    if let Some(revision) = source.revision {
        spec.insert("revision".into(), json!(revision));
    }

    write_time_settings(source, &mut spec);

    if !source.links.is_empty() {
        spec.insert(
            "links".into(),
            source
                .links
                .iter()
                .map(|link| {
                    json!({
                        "title": link.title,
                        "url": link.url,
                        "type": link.link_type,
                        "icon": link.icon,
                        "tooltip": link.tooltip,
                        "tags": link.tags,
                        "asDropdown": link.as_dropdown,
                        "targetBlank": link.target_blank,
                        "includeVars": link.include_vars,
                        "keepTime": link.keep_time,
                    })
                })
                .collect(),
        );
    }

    if !source.annotations.is_empty() {
        let list: Vec<Value> = source.annotations.iter().map(write_annotation).collect();
        spec.insert("annotations".into(), json!({"list": list}));
    }

    if !source.variables.is_empty() {
        let list: Vec<Value> = source.variables.iter().map(write_variable).collect();
        spec.insert("templating".into(), json!({"list": list}));
    }

    let mut renderer = ElementRenderer {
        elements: &source.elements,
    };
    let max_id = max_element_id(&source.elements);
    let panels = layout::flatten_layout(&source.layout, max_id, &mut renderer)?;
    spec.insert("panels".into(), Value::Array(panels));

    Ok(DashboardV1 {
        metadata: dashboard.metadata.clone(),
        spec,
        status: None,
    })
}

fn max_element_id(elements: &BTreeMap<String, Element>) -> i64 {
    elements
        .values()
        .map(|element| match element {
            Element::Panel(panel) => panel.id,
            Element::LibraryPanel(lib) => lib.id,
        })
        .max()
        .unwrap_or(0)
}

struct ElementRenderer<'a> {
    elements: &'a BTreeMap<String, Element>,
}

impl PanelWriter for ElementRenderer<'_> {
    fn write_panel(&mut self, name: &str, placement: &GridPlacement) -> Result<Value> {
        let element = self
            .elements
            .get(name)
            .ok_or_else(|| layout::missing_element(name))?;
        Ok(match element {
            Element::Panel(panel) => write_panel(panel, placement),
            Element::LibraryPanel(lib) => json!({
                "id": lib.id,
                "title": lib.title,
                "libraryPanel": {"uid": lib.library_panel.uid, "name": lib.library_panel.name},
                "gridPos": grid_pos_json(placement),
            }),
        })
    }
}

fn grid_pos_json(placement: &GridPlacement) -> Value {
    json!({
        "x": placement.x,
        "y": placement.y,
        "w": placement.width,
        "h": placement.height,
    })
}

fn write_panel(panel: &PanelSpec, placement: &GridPlacement) -> Value {
    let mut out = Map::new();
    out.insert("id".into(), json!(panel.id));
    out.insert("type".into(), json!(panel.viz_config.kind));
    out.insert("title".into(), json!(panel.title));
    if !panel.description.is_empty() {
        out.insert("description".into(), json!(panel.description));
    }
    if panel.transparent == Some(true) {
        out.insert("transparent".into(), json!(true));
    }
    out.insert("gridPos".into(), grid_pos_json(placement));

    if let Some(repeat) = &placement.repeat {
        out.insert("repeat".into(), json!(repeat.value));
        if let Some(direction) = repeat.direction {
            let dir = match direction {
                RepeatDirection::Horizontal => "h",
                RepeatDirection::Vertical => "v",
            };
            out.insert("repeatDirection".into(), json!(dir));
        }
        if let Some(max_per_row) = repeat.max_per_row {
            out.insert("maxPerRow".into(), json!(max_per_row));
        }
    }

    if let Some(version) = &panel.viz_config.spec.plugin_version {
        out.insert("pluginVersion".into(), json!(version));
    }
    if !panel.viz_config.spec.options.is_null() {
        out.insert("options".into(), panel.viz_config.spec.options.clone());
    }
    if !panel.viz_config.spec.field_config.is_null() {
        out.insert(
            "fieldConfig".into(),
            panel.viz_config.spec.field_config.clone(),
        );
    }

    if !panel.links.is_empty() {
        out.insert(
            "links".into(),
            panel
                .links
                .iter()
                .map(|link| {
                    let mut obj = Map::new();
                    obj.insert("title".into(), json!(link.title));
                    obj.insert("url".into(), json!(link.url));
                    if let Some(target_blank) = link.target_blank {
                        obj.insert("targetBlank".into(), json!(target_blank));
                    }
                    Value::Object(obj)
                })
                .collect(),
        );
    }

    if let Some(ds) = panel_datasource(&panel.data.queries) {
        out.insert("datasource".into(), datasource_json(&ds));
    }
    out.insert(
        "targets".into(),
        panel.data.queries.iter().map(write_query).collect(),
    );

    if !panel.data.transformations.is_empty() {
        if let Ok(value) = serde_json::to_value(&panel.data.transformations) {
            out.insert("transformations".into(), value);
        }
    }

    let opts = &panel.data.query_options;
    if let Some(time_from) = &opts.time_from {
        out.insert("timeFrom".into(), json!(time_from));
    }
    if let Some(time_shift) = &opts.time_shift {
        out.insert("timeShift".into(), json!(time_shift));
    }
    if let Some(cache_timeout) = &opts.cache_timeout {
        out.insert("cacheTimeout".into(), json!(cache_timeout));
    }
    if let Some(max_data_points) = opts.max_data_points {
        out.insert("maxDataPoints".into(), json!(max_data_points));
    }
    if let Some(interval) = &opts.interval {
        out.insert("interval".into(), json!(interval));
    }
    if let Some(hide_time_override) = opts.hide_time_override {
        out.insert("hideTimeOverride".into(), json!(hide_time_override));
    }
    if let Some(ttl) = opts.query_caching_ttl {
        out.insert("queryCachingTTL".into(), json!(ttl));
    }

    Value::Object(out)
}

/// Panel-level datasource synthesized from the queries: the shared ref when
/// they agree, the mixed sentinel when they disagree or more than one query
/// reuses another panel's results.
fn panel_datasource(queries: &[PanelQuery]) -> Option<DatasourceRef> {
    let refs: Vec<&DatasourceRef> = queries.iter().filter_map(|q| q.datasource.as_ref()).collect();
    let first = refs.first()?;

    let dashboard_queries = refs
        .iter()
        .filter(|r| r.uid.as_deref() == Some(DASHBOARD_DATASOURCE_UID))
        .count();
    let disagree = refs.iter().any(|r| r.uid != first.uid);

    if disagree || dashboard_queries > 1 {
        return Some(DatasourceRef::new(MIXED_DATASOURCE_TYPE, MIXED_DATASOURCE_UID));
    }
    Some((*first).clone())
}

fn datasource_json(ds: &DatasourceRef) -> Value {
    let mut obj = Map::new();
    if let Some(ds_type) = &ds.ds_type {
        obj.insert("type".into(), json!(ds_type));
    }
    if let Some(uid) = &ds.uid {
        obj.insert("uid".into(), json!(uid));
    }
    Value::Object(obj)
}

fn write_query(query: &PanelQuery) -> Value {
    let mut target = restore_legacy_spec(&query.query.spec);
    target.insert("refId".into(), json!(query.ref_id));
    if query.hidden {
        target.insert("hide".into(), json!(true));
    }
    if let Some(ds) = &query.datasource {
        target.insert("datasource".into(), datasource_json(ds));
    }
    Value::Object(target)
}

/// Unwraps the legacy-string sentinel back into a `query` field.
fn restore_legacy_spec(spec: &UnstructuredSpec) -> UnstructuredSpec {
    let mut out = spec.clone();
    if let Some(value) = out.remove(LEGACY_STRING_VALUE_KEY) {
        out.insert("query".into(), value);
    }
    out
}

fn write_time_settings(source: &DashboardSpec, spec: &mut UnstructuredSpec) {
    let settings = &source.time_settings;
    spec.insert(
        "time".into(),
        json!({"from": settings.from, "to": settings.to}),
    );
    spec.insert("timezone".into(), json!(settings.timezone));
    spec.insert("refresh".into(), json!(settings.auto_refresh));

    let mut picker = Map::new();
    if settings.hide_timepicker {
        picker.insert("hidden".into(), json!(true));
    }
    picker.insert(
        "refresh_intervals".into(),
        json!(settings.auto_refresh_intervals),
    );
    if let Some(now_delay) = &settings.now_delay {
        picker.insert("nowDelay".into(), json!(now_delay));
    }
    if !settings.quick_ranges.is_empty() {
        if let Ok(value) = serde_json::to_value(&settings.quick_ranges) {
            picker.insert("quick_ranges".into(), value);
        }
    }
    spec.insert("timepicker".into(), Value::Object(picker));

    if let Some(week_start) = &settings.week_start {
        spec.insert("weekStart".into(), json!(week_start));
    }
    if let Some(month) = settings.fiscal_year_start_month {
        spec.insert("fiscalYearStartMonth".into(), json!(month));
    }
}

fn write_annotation(annotation: &AnnotationQuerySpec) -> Value {
    let mut out = Map::new();
    out.insert("name".into(), json!(annotation.name));
    out.insert("enable".into(), json!(annotation.enable));
    out.insert("hide".into(), json!(annotation.hide));
    out.insert("iconColor".into(), json!(annotation.icon_color));
    if annotation.built_in == Some(true) {
        out.insert("builtIn".into(), json!(1));
        out.insert("type".into(), json!("dashboard"));
    }
    if let Some(ds) = &annotation.datasource {
        out.insert("datasource".into(), datasource_json(ds));
    }
    if let Some(query) = &annotation.query {
        out.insert("target".into(), Value::Object(query.spec.clone()));
    }
    if let Some(filter) = &annotation.filter {
        if let Ok(value) = serde_json::to_value(filter) {
            out.insert("filter".into(), value);
        }
    }
    if let Some(legacy) = &annotation.legacy_options {
        for (key, value) in legacy {
            out.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
    Value::Object(out)
}

/// Legacy variable query field: the original string when the sentinel is
/// present, the object spec otherwise.
fn legacy_variable_query(spec: &UnstructuredSpec) -> Value {
    match spec.get(LEGACY_STRING_VALUE_KEY) {
        Some(value) => value.clone(),
        None => Value::Object(spec.clone()),
    }
}

fn variable_common(
    out: &mut UnstructuredSpec,
    name: &str,
    kind: &str,
    label: Option<&String>,
    description: Option<&String>,
    hide: VariableHide,
    skip_url_sync: bool,
) {
    out.insert("type".into(), json!(kind));
    out.insert("name".into(), json!(name));
    if let Some(label) = label {
        out.insert("label".into(), json!(label));
    }
    if let Some(description) = description {
        out.insert("description".into(), json!(description));
    }
    out.insert("hide".into(), json!(hide.to_legacy()));
    if skip_url_sync {
        out.insert("skipUrlSync".into(), json!(true));
    }
}

fn write_variable(variable: &Variable) -> Value {
    match variable {
        Variable::QueryVariable(spec) => write_query_variable(spec),
        Variable::DatasourceVariable(spec) => write_datasource_variable(spec),
        Variable::CustomVariable(spec) => write_custom_variable(spec),
        Variable::ConstantVariable(spec) => write_constant_variable(spec),
        Variable::IntervalVariable(spec) => write_interval_variable(spec),
        Variable::TextVariable(spec) => write_text_variable(spec),
        Variable::AdhocVariable(spec) => write_adhoc_variable(spec),
    }
}

fn write_query_variable(spec: &QueryVariableSpec) -> Value {
    let mut out = Map::new();
    variable_common(
        &mut out,
        &spec.name,
        "query",
        spec.label.as_ref(),
        spec.description.as_ref(),
        spec.hide,
        spec.skip_url_sync,
    );
    out.insert("query".into(), legacy_variable_query(&spec.query.spec));
    if let Some(ds) = &spec.datasource {
        out.insert("datasource".into(), datasource_json(ds));
    }
    if let Ok(current) = serde_json::to_value(&spec.current) {
        out.insert("current".into(), current);
    }
    if let Ok(options) = serde_json::to_value(&spec.options) {
        out.insert("options".into(), options);
    }
    out.insert("multi".into(), json!(spec.multi));
    out.insert("includeAll".into(), json!(spec.include_all));
    if let Some(all_value) = &spec.all_value {
        out.insert("allValue".into(), json!(all_value));
    }
    out.insert("refresh".into(), json!(spec.refresh.to_legacy()));
    out.insert("sort".into(), json!(spec.sort.to_legacy()));
    out.insert("regex".into(), json!(spec.regex));
    if let Some(definition) = &spec.definition {
        out.insert("definition".into(), json!(definition));
    }
    out.insert("allowCustomValue".into(), json!(spec.allow_custom_value));
    Value::Object(out)
}

fn write_datasource_variable(spec: &DatasourceVariableSpec) -> Value {
    let mut out = Map::new();
    variable_common(
        &mut out,
        &spec.name,
        "datasource",
        spec.label.as_ref(),
        spec.description.as_ref(),
        spec.hide,
        spec.skip_url_sync,
    );
    out.insert("query".into(), json!(spec.plugin_id));
    out.insert("regex".into(), json!(spec.regex));
    if let Ok(current) = serde_json::to_value(&spec.current) {
        out.insert("current".into(), current);
    }
    if let Ok(options) = serde_json::to_value(&spec.options) {
        out.insert("options".into(), options);
    }
    out.insert("multi".into(), json!(spec.multi));
    out.insert("includeAll".into(), json!(spec.include_all));
    if let Some(all_value) = &spec.all_value {
        out.insert("allValue".into(), json!(all_value));
    }
    out.insert("refresh".into(), json!(spec.refresh.to_legacy()));
    out.insert("allowCustomValue".into(), json!(spec.allow_custom_value));
    Value::Object(out)
}

fn write_custom_variable(spec: &CustomVariableSpec) -> Value {
    let mut out = Map::new();
    variable_common(
        &mut out,
        &spec.name,
        "custom",
        spec.label.as_ref(),
        spec.description.as_ref(),
        spec.hide,
        spec.skip_url_sync,
    );
    out.insert("query".into(), json!(spec.query));
    if let Ok(current) = serde_json::to_value(&spec.current) {
        out.insert("current".into(), current);
    }
    if let Ok(options) = serde_json::to_value(&spec.options) {
        out.insert("options".into(), options);
    }
    out.insert("multi".into(), json!(spec.multi));
    out.insert("includeAll".into(), json!(spec.include_all));
    if let Some(all_value) = &spec.all_value {
        out.insert("allValue".into(), json!(all_value));
    }
    out.insert("allowCustomValue".into(), json!(spec.allow_custom_value));
    Value::Object(out)
}

fn write_constant_variable(spec: &ConstantVariableSpec) -> Value {
    let mut out = Map::new();
    // Constants are never shown in the legacy shape.
    variable_common(
        &mut out,
        &spec.name,
        "constant",
        spec.label.as_ref(),
        spec.description.as_ref(),
        VariableHide::HideVariable,
        spec.skip_url_sync,
    );
    out.insert("query".into(), json!(spec.query));
    if let Ok(current) = serde_json::to_value(&spec.current) {
        out.insert("current".into(), current);
    }
    Value::Object(out)
}

fn write_interval_variable(spec: &IntervalVariableSpec) -> Value {
    let mut out = Map::new();
    variable_common(
        &mut out,
        &spec.name,
        "interval",
        spec.label.as_ref(),
        spec.description.as_ref(),
        spec.hide,
        spec.skip_url_sync,
    );
    out.insert("query".into(), json!(spec.query));
    if let Ok(current) = serde_json::to_value(&spec.current) {
        out.insert("current".into(), current);
    }
    if let Ok(options) = serde_json::to_value(&spec.options) {
        out.insert("options".into(), options);
    }
    out.insert("auto".into(), json!(spec.auto));
    out.insert("auto_min".into(), json!(spec.auto_min));
    out.insert("auto_count".into(), json!(spec.auto_count));
    out.insert("refresh".into(), json!(spec.refresh.to_legacy()));
    Value::Object(out)
}

fn write_text_variable(spec: &TextVariableSpec) -> Value {
    let mut out = Map::new();
    variable_common(
        &mut out,
        &spec.name,
        "textbox",
        spec.label.as_ref(),
        spec.description.as_ref(),
        spec.hide,
        spec.skip_url_sync,
    );
    out.insert("query".into(), json!(spec.query));
    if let Ok(current) = serde_json::to_value(&spec.current) {
        out.insert("current".into(), current);
    }
    Value::Object(out)
}

fn write_adhoc_variable(spec: &AdhocVariableSpec) -> Value {
    let mut out = Map::new();
    variable_common(
        &mut out,
        &spec.name,
        "adhoc",
        spec.label.as_ref(),
        spec.description.as_ref(),
        spec.hide,
        spec.skip_url_sync,
    );
    if let Some(ds) = &spec.datasource {
        out.insert("datasource".into(), datasource_json(ds));
    }
    if let Ok(filters) = serde_json::to_value(&spec.filters) {
        out.insert("filters".into(), filters);
    }
    if let Ok(base_filters) = serde_json::to_value(&spec.base_filters) {
        out.insert("baseFilters".into(), base_filters);
    }
    if let Some(default_keys) = &spec.default_keys {
        out.insert("defaultKeys".into(), default_keys.clone());
    }
    out.insert("allowCustomValue".into(), json!(spec.allow_custom_value));
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashgrade_schema::layout::{ElementRef, GridItem, GridLayout};
    use dashgrade_schema::v2alpha::{DataQuery, QueryGroup, VizConfig, VizConfigSpec};
    use dashgrade_schema::{Layout, ObjectMeta};

    fn panel_with_queries(id: i64, queries: Vec<PanelQuery>) -> PanelSpec {
        PanelSpec {
            id,
            title: format!("Panel {id}"),
            data: QueryGroup {
                queries,
                ..Default::default()
            },
            viz_config: VizConfig {
                kind: "timeseries".into(),
                spec: VizConfigSpec::default(),
            },
            ..Default::default()
        }
    }

    fn query(ref_id: &str, ds_type: &str, uid: &str) -> PanelQuery {
        PanelQuery {
            ref_id: ref_id.into(),
            hidden: false,
            datasource: Some(DatasourceRef::new(ds_type, uid)),
            query: DataQuery {
                kind: ds_type.into(),
                spec: Map::new(),
            },
        }
    }

    fn dashboard_with_elements(
        elements: Vec<(String, Element)>,
        layout: Layout,
    ) -> DashboardV2Alpha {
        DashboardV2Alpha {
            metadata: ObjectMeta::default(),
            spec: DashboardSpec {
                title: "t".into(),
                elements: elements.into_iter().collect(),
                layout,
                ..Default::default()
            },
            status: None,
        }
    }

    fn single_panel_layout(name: &str) -> Layout {
        Layout::Grid(GridLayout {
            items: vec![GridItem {
                x: 0,
                y: 0,
                width: 12,
                height: 8,
                element: ElementRef::new(name),
                repeat: None,
            }],
        })
    }

    #[test]
    fn test_schema_version_stamped() {
        let dash = dashboard_with_elements(vec![], Layout::default());
        let result = convert_v2alpha_to_v1(&dash).unwrap();
        assert_eq!(result.spec["schemaVersion"], json!(LATEST_SCHEMA_VERSION));
    }

    #[test]
    fn test_agreeing_queries_share_panel_datasource() {
        let panel = panel_with_queries(
            1,
            vec![query("A", "prometheus", "p1"), query("B", "prometheus", "p1")],
        );
        let dash = dashboard_with_elements(
            vec![("panel-1".into(), Element::Panel(panel))],
            single_panel_layout("panel-1"),
        );
        let result = convert_v2alpha_to_v1(&dash).unwrap();
        let panels = result.spec["panels"].as_array().unwrap();
        assert_eq!(panels[0]["datasource"]["uid"], "p1");
    }

    #[test]
    fn test_disagreeing_queries_get_mixed_datasource() {
        let panel = panel_with_queries(
            1,
            vec![query("A", "prometheus", "p1"), query("B", "loki", "l1")],
        );
        let dash = dashboard_with_elements(
            vec![("panel-1".into(), Element::Panel(panel))],
            single_panel_layout("panel-1"),
        );
        let result = convert_v2alpha_to_v1(&dash).unwrap();
        let panels = result.spec["panels"].as_array().unwrap();
        assert_eq!(panels[0]["datasource"]["uid"], MIXED_DATASOURCE_UID);
        assert_eq!(panels[0]["datasource"]["type"], MIXED_DATASOURCE_TYPE);
    }

    #[test]
    fn test_two_dashboard_queries_get_mixed_datasource() {
        let panel = panel_with_queries(
            1,
            vec![
                query("A", "datasource", DASHBOARD_DATASOURCE_UID),
                query("B", "datasource", DASHBOARD_DATASOURCE_UID),
            ],
        );
        let dash = dashboard_with_elements(
            vec![("panel-1".into(), Element::Panel(panel))],
            single_panel_layout("panel-1"),
        );
        let result = convert_v2alpha_to_v1(&dash).unwrap();
        let panels = result.spec["panels"].as_array().unwrap();
        assert_eq!(panels[0]["datasource"]["uid"], MIXED_DATASOURCE_UID);
    }

    #[test]
    fn test_hide_written_only_when_true() {
        let mut hidden = query("A", "prometheus", "p1");
        hidden.hidden = true;
        let visible = query("B", "prometheus", "p1");
        let panel = panel_with_queries(1, vec![hidden, visible]);
        let dash = dashboard_with_elements(
            vec![("panel-1".into(), Element::Panel(panel))],
            single_panel_layout("panel-1"),
        );
        let result = convert_v2alpha_to_v1(&dash).unwrap();
        let targets = result.spec["panels"][0]["targets"].as_array().unwrap();
        assert_eq!(targets[0]["hide"], true);
        assert!(targets[1].get("hide").is_none());
    }

    #[test]
    fn test_legacy_string_query_restored() {
        let mut q = query("A", "prometheus", "p1");
        q.query.spec.insert(LEGACY_STRING_VALUE_KEY.into(), json!("up"));
        let panel = panel_with_queries(1, vec![q]);
        let dash = dashboard_with_elements(
            vec![("panel-1".into(), Element::Panel(panel))],
            single_panel_layout("panel-1"),
        );
        let result = convert_v2alpha_to_v1(&dash).unwrap();
        let target = &result.spec["panels"][0]["targets"][0];
        assert_eq!(target["query"], "up");
        assert!(target.get(LEGACY_STRING_VALUE_KEY).is_none());
    }

    #[test]
    fn test_constant_variable_forced_hidden() {
        let dash = DashboardV2Alpha {
            metadata: ObjectMeta::default(),
            spec: DashboardSpec {
                variables: vec![Variable::ConstantVariable(ConstantVariableSpec {
                    name: "env".into(),
                    query: "prod".into(),
                    hide: VariableHide::DontHide,
                    ..Default::default()
                })],
                ..Default::default()
            },
            status: None,
        };
        let result = convert_v2alpha_to_v1(&dash).unwrap();
        let list = result.spec["templating"]["list"].as_array().unwrap();
        assert_eq!(list[0]["hide"], 2);
    }

    #[test]
    fn test_builtin_annotation_round_trip_fields() {
        let dash = DashboardV2Alpha {
            metadata: ObjectMeta::default(),
            spec: DashboardSpec {
                annotations: vec![AnnotationQuerySpec {
                    name: "Annotations & Alerts".into(),
                    enable: true,
                    built_in: Some(true),
                    icon_color: "red".into(),
                    ..Default::default()
                }],
                ..Default::default()
            },
            status: None,
        };
        let result = convert_v2alpha_to_v1(&dash).unwrap();
        let item = &result.spec["annotations"]["list"][0];
        assert_eq!(item["builtIn"], 1);
        assert_eq!(item["type"], "dashboard");
    }
}
