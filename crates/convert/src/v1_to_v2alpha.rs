//! Forward conversion from the latest unstructured shape to the first
//! structured generation.

use std::collections::{BTreeMap, HashSet};

use dashgrade_schema::unstructured::{
    self, UnstructuredSpec, get_array, get_bool, get_i64, get_map, get_str, strip_bom,
};
use dashgrade_schema::v2alpha::{
    AdhocVariableSpec, AnnotationQuerySpec, DashboardSpec, DataQuery, Element, LibraryPanelSpec,
    PanelQuery, PanelSpec, QueryGroup, QueryVariableSpec, Variable, VizConfig, VizConfigSpec,
};
use dashgrade_schema::variables::{
    ConstantVariableSpec, CustomVariableSpec, DatasourceVariableSpec, IntervalVariableSpec,
    TextVariableSpec,
};
use dashgrade_schema::{
    CursorSync, DashboardLink, DashboardV1, DashboardV2Alpha, DataLink, DatasourceRef,
    LibraryPanelRef, QueryOptions, RepeatDirection, RepeatOptions, TimeRangeOption, TimeSettings,
    Transformation, VariableHide, VariableOption, VariableRefresh, VariableSort,
};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::context::ConversionContext;
use crate::error::Result;
use crate::layout::{self, ElementHandle, ElementSink};
use crate::provider::{
    DatasourceIndex, DatasourceIndexProvider, LibraryElementIndex, LibraryElementProvider,
};
use crate::resolve::{BUILTIN_DATASOURCE_TYPE, resolve_datasource_ref};

/// Key under which a plain-string legacy query survives inside the opaque
/// query spec.
pub const LEGACY_STRING_VALUE_KEY: &str = "__legacyStringValue";

/// Converts a dashboard at the latest numbered schema into the first
/// structured generation.
pub fn convert_v1_to_v2alpha(
    dashboard: &DashboardV1,
    ds_provider: &dyn DatasourceIndexProvider,
    library_provider: &dyn LibraryElementProvider,
) -> Result<DashboardV2Alpha> {
    let ctx = ConversionContext::service(dashboard.metadata.namespace.clone());
    let ds_index = ds_provider.index(&ctx).unwrap_or_else(|err| {
        warn!(error = %err, "datasource catalog unavailable, resolving against empty index");
        DatasourceIndex::default()
    });
    let library_index = library_provider.library_elements(&ctx).unwrap_or_else(|err| {
        warn!(error = %err, "library panel catalog unavailable");
        LibraryElementIndex::default()
    });

    let source = &dashboard.spec;
    debug!(dashboard = %dashboard.metadata.name, "converting unstructured dashboard to structured form");

    let mut spec = DashboardSpec {
        title: unstructured::get_string_or(source, "title", ""),
        description: get_str(source, "description").map(str::to_string),
        tags: get_array(source, "tags")
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        cursor_sync: CursorSync::from_graph_tooltip(get_i64(source, "graphTooltip", 0)),
        preload: get_bool(source, "preload", false),
        editable: source.get("editable").and_then(Value::as_bool),
        live_now: source.get("liveNow").and_then(Value::as_bool),
        revision: source.get("revision").and_then(Value::as_u64),
        time_settings: transform_time_settings(source),
        links: transform_links(source),
        annotations: transform_annotations(source, &ds_index),
        variables: transform_variables(source, &ds_index),
        ..Default::default()
    };

    let panels = ensure_unique_panel_ids(get_array(source, "panels").cloned().unwrap_or_default());
    let mut collector = ElementCollector {
        elements: BTreeMap::new(),
        used_names: HashSet::new(),
        ds_index: &ds_index,
        library_index: &library_index,
    };
    spec.layout = layout::build_layout(&panels, &mut collector)?;
    spec.elements = collector.elements;

    Ok(DashboardV2Alpha {
        metadata: dashboard.metadata.clone(),
        spec,
        status: None,
    })
}

/// Assigns fresh ids to panels with missing or duplicate ids so element
/// names derived from them are unique. Nested panels of collapsed rows are
/// included.
fn ensure_unique_panel_ids(panels: Vec<Value>) -> Vec<Value> {
    fn collect_max(panels: &[Value], max: &mut i64) {
        for panel in panels.iter().filter_map(Value::as_object) {
            *max = (*max).max(get_i64(panel, "id", 0));
            if let Some(children) = get_array(panel, "panels") {
                collect_max(children, max);
            }
        }
    }

    fn reassign(panels: &mut [Value], seen: &mut HashSet<i64>, next: &mut i64) {
        for panel in panels.iter_mut() {
            let Some(obj) = panel.as_object_mut() else {
                continue;
            };
            let id = get_i64(obj, "id", 0);
            if id <= 0 || !seen.insert(id) {
                obj.insert("id".into(), json!(*next));
                seen.insert(*next);
                *next += 1;
            }
            if let Some(children) = obj.get_mut("panels").and_then(Value::as_array_mut) {
                reassign(children, seen, next);
            }
        }
    }

    let mut panels = panels;
    let mut max = 0;
    collect_max(&panels, &mut max);
    let mut next = max + 1;
    let mut seen = HashSet::new();
    reassign(&mut panels, &mut seen, &mut next);
    panels
}

struct ElementCollector<'a> {
    elements: BTreeMap<String, Element>,
    used_names: HashSet<String>,
    ds_index: &'a DatasourceIndex,
    library_index: &'a LibraryElementIndex,
}

impl ElementCollector<'_> {
    fn unique_name(&mut self, id: i64) -> String {
        let base = format!("panel-{id}");
        let mut name = base.clone();
        let mut n = 1;
        while !self.used_names.insert(name.clone()) {
            name = format!("{base}-{n}");
            n += 1;
        }
        name
    }
}

impl ElementSink for ElementCollector<'_> {
    fn add_panel(&mut self, panel: &UnstructuredSpec) -> Result<ElementHandle> {
        let id = get_i64(panel, "id", 0);
        let name = self.unique_name(id);

        if let Some(library_ref) = get_map(panel, "libraryPanel") {
            let uid = unstructured::get_string_or(library_ref, "uid", "");
            let element = LibraryPanelSpec {
                id,
                title: unstructured::get_string_or(panel, "title", ""),
                library_panel: LibraryPanelRef {
                    uid: uid.clone(),
                    name: unstructured::get_string_or(library_ref, "name", ""),
                },
            };
            // Repeat lives on the library element model, not the panel.
            let repeat = self
                .library_index
                .by_uid(&uid)
                .and_then(|info| info.repeat_variable())
                .filter(|v| !v.is_empty())
                .map(RepeatOptions::for_variable);
            self.elements
                .insert(name.clone(), Element::LibraryPanel(element));
            return Ok(ElementHandle { name, repeat });
        }

        let element = convert_panel(panel, self.ds_index);
        let repeat = panel_repeat_options(panel);
        self.elements.insert(name.clone(), Element::Panel(element));
        Ok(ElementHandle { name, repeat })
    }
}

fn panel_repeat_options(panel: &UnstructuredSpec) -> Option<RepeatOptions> {
    let value = get_str(panel, "repeat").filter(|v| !v.is_empty())?;
    let direction = match get_str(panel, "repeatDirection") {
        Some("v") => Some(RepeatDirection::Vertical),
        Some("h") => Some(RepeatDirection::Horizontal),
        _ => None,
    };
    Some(RepeatOptions {
        mode: "variable".to_string(),
        value: value.to_string(),
        direction,
        max_per_row: panel.get("maxPerRow").and_then(Value::as_i64),
    })
}

fn convert_panel(panel: &UnstructuredSpec, ds_index: &DatasourceIndex) -> PanelSpec {
    PanelSpec {
        id: get_i64(panel, "id", 0),
        title: unstructured::get_string_or(panel, "title", ""),
        description: unstructured::get_string_or(panel, "description", ""),
        transparent: get_bool(panel, "transparent", false).then_some(true),
        links: transform_data_links(panel),
        data: QueryGroup {
            queries: transform_panel_queries(panel, ds_index),
            transformations: transform_transformations(panel),
            query_options: build_query_options(panel),
        },
        viz_config: VizConfig {
            kind: unstructured::get_string_or(panel, "type", ""),
            spec: VizConfigSpec {
                plugin_version: get_str(panel, "pluginVersion").map(str::to_string),
                options: panel.get("options").cloned().unwrap_or(Value::Null),
                field_config: panel.get("fieldConfig").cloned().unwrap_or(Value::Null),
            },
        },
    }
}

/// Reads a legacy datasource field: full object, bare string uid, or absent.
fn parse_datasource_value(value: Option<&Value>) -> Option<DatasourceRef> {
    match value? {
        Value::String(uid) => Some(DatasourceRef {
            ds_type: None,
            uid: Some(uid.clone()),
        }),
        Value::Object(_) => serde_json::from_value(value?.clone()).ok(),
        _ => None,
    }
}

fn transform_panel_queries(panel: &UnstructuredSpec, ds_index: &DatasourceIndex) -> Vec<PanelQuery> {
    let panel_ds = parse_datasource_value(panel.get("datasource"));
    let targets = match get_array(panel, "targets") {
        Some(targets) => targets,
        None => return Vec::new(),
    };

    let mut queries: Vec<PanelQuery> = targets
        .iter()
        .filter_map(|target| transform_single_query(target, panel_ds.as_ref(), ds_index))
        .collect();

    // Fill missing ref ids without touching existing ones.
    let mut used: HashSet<String> = queries
        .iter()
        .filter(|q| !q.ref_id.is_empty())
        .map(|q| q.ref_id.clone())
        .collect();
    for query in queries.iter_mut().filter(|q| q.ref_id.is_empty()) {
        let ref_id = crate::resolve::next_available_ref_id(&used);
        used.insert(ref_id.clone());
        query.ref_id = ref_id;
    }

    queries
}

fn transform_single_query(
    target: &Value,
    panel_ds: Option<&DatasourceRef>,
    ds_index: &DatasourceIndex,
) -> Option<PanelQuery> {
    let mut spec: UnstructuredSpec = match target {
        Value::Object(obj) => obj.clone(),
        Value::String(s) => {
            let mut map = Map::new();
            map.insert(LEGACY_STRING_VALUE_KEY.into(), json!(s));
            map
        }
        _ => {
            warn!("skipping non-object query target");
            return None;
        }
    };

    let item_ds = parse_datasource_value(spec.get("datasource"));
    let resolved = resolve_datasource_ref(item_ds.as_ref(), panel_ds, ds_index);
    let ref_id = unstructured::get_string_or(&spec, "refId", "");
    let hidden = get_bool(&spec, "hide", false);
    spec.remove("datasource");
    spec.remove("refId");
    spec.remove("hide");

    let kind = resolved
        .ds_type
        .clone()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| BUILTIN_DATASOURCE_TYPE.to_string());

    Some(PanelQuery {
        ref_id,
        hidden,
        datasource: Some(resolved),
        query: DataQuery { kind, spec },
    })
}

fn transform_transformations(panel: &UnstructuredSpec) -> Vec<Transformation> {
    get_array(panel, "transformations")
        .map(|list| {
            list.iter()
                .filter_map(|t| serde_json::from_value(t.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn build_query_options(panel: &UnstructuredSpec) -> QueryOptions {
    QueryOptions {
        time_from: get_str(panel, "timeFrom").map(str::to_string),
        time_shift: get_str(panel, "timeShift").map(str::to_string),
        cache_timeout: get_str(panel, "cacheTimeout").map(str::to_string),
        max_data_points: panel.get("maxDataPoints").and_then(Value::as_i64),
        interval: get_str(panel, "interval").map(str::to_string),
        hide_time_override: panel.get("hideTimeOverride").and_then(Value::as_bool),
        query_caching_ttl: panel.get("queryCachingTTL").and_then(Value::as_i64),
    }
}

fn transform_data_links(panel: &UnstructuredSpec) -> Vec<DataLink> {
    get_array(panel, "links")
        .map(|links| {
            links
                .iter()
                .filter_map(Value::as_object)
                .map(|link| DataLink {
                    title: unstructured::get_string_or(link, "title", ""),
                    url: strip_bom(get_str(link, "url").unwrap_or("")).to_string(),
                    target_blank: link.get("targetBlank").and_then(Value::as_bool),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn transform_links(source: &UnstructuredSpec) -> Vec<DashboardLink> {
    get_array(source, "links")
        .map(|links| {
            links
                .iter()
                .filter_map(Value::as_object)
                .map(|link| DashboardLink {
                    title: unstructured::get_string_or(link, "title", ""),
                    url: get_str(link, "url").map(|u| strip_bom(u).to_string()),
                    link_type: unstructured::get_string_or(link, "type", "link"),
                    icon: unstructured::get_string_or(link, "icon", ""),
                    tooltip: unstructured::get_string_or(link, "tooltip", ""),
                    tags: get_array(link, "tags")
                        .map(|tags| {
                            tags.iter()
                                .filter_map(Value::as_str)
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default(),
                    as_dropdown: get_bool(link, "asDropdown", false),
                    target_blank: get_bool(link, "targetBlank", false),
                    include_vars: get_bool(link, "includeVars", false),
                    keep_time: get_bool(link, "keepTime", false),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn transform_time_settings(source: &UnstructuredSpec) -> TimeSettings {
    let mut settings = TimeSettings::default();
    if let Some(time) = get_map(source, "time") {
        settings.from = unstructured::get_string_or(time, "from", &settings.from);
        settings.to = unstructured::get_string_or(time, "to", &settings.to);
    }
    settings.timezone = unstructured::get_string_or(source, "timezone", &settings.timezone);
    // `refresh` is either an interval string or `false`.
    if let Some(refresh) = get_str(source, "refresh") {
        settings.auto_refresh = refresh.to_string();
    }
    settings.week_start = get_str(source, "weekStart")
        .filter(|w| !w.is_empty())
        .map(str::to_string);
    settings.fiscal_year_start_month = source
        .get("fiscalYearStartMonth")
        .and_then(Value::as_i64);

    if let Some(picker) = get_map(source, "timepicker") {
        settings.hide_timepicker = get_bool(picker, "hidden", false);
        if let Some(intervals) = get_array(picker, "refresh_intervals") {
            settings.auto_refresh_intervals = intervals
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
        }
        settings.now_delay = get_str(picker, "nowDelay")
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        if let Some(ranges) = get_array(picker, "quick_ranges") {
            settings.quick_ranges = ranges
                .iter()
                .filter_map(|r| serde_json::from_value::<TimeRangeOption>(r.clone()).ok())
                .collect();
        }
    }
    settings
}

fn transform_annotations(
    source: &UnstructuredSpec,
    ds_index: &DatasourceIndex,
) -> Vec<AnnotationQuerySpec> {
    let list = match get_map(source, "annotations").and_then(|a| get_array(a, "list")) {
        Some(list) => list,
        None => return Vec::new(),
    };

    list.iter()
        .filter_map(Value::as_object)
        .map(|item| {
            let item_ds = parse_datasource_value(item.get("datasource"));
            let resolved = resolve_datasource_ref(item_ds.as_ref(), None, ds_index);
            let built_in = get_i64(item, "builtIn", 0) == 1;
            let query = item.get("target").and_then(Value::as_object).map(|target| {
                DataQuery {
                    kind: resolved
                        .ds_type
                        .clone()
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| BUILTIN_DATASOURCE_TYPE.to_string()),
                    spec: target.clone(),
                }
            });

            const KNOWN_KEYS: [&str; 8] = [
                "name", "enable", "hide", "iconColor", "builtIn", "datasource", "target", "filter",
            ];
            let legacy: UnstructuredSpec = item
                .iter()
                .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();

            AnnotationQuerySpec {
                name: unstructured::get_string_or(item, "name", ""),
                enable: get_bool(item, "enable", true),
                hide: get_bool(item, "hide", false),
                icon_color: unstructured::get_string_or(item, "iconColor", ""),
                built_in: built_in.then_some(true),
                datasource: Some(resolved),
                query,
                filter: item
                    .get("filter")
                    .and_then(|f| serde_json::from_value(f.clone()).ok()),
                legacy_options: (!legacy.is_empty()).then_some(legacy),
            }
        })
        .collect()
}

fn variable_option(value: Option<&Value>) -> VariableOption {
    value
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

fn variable_options(item: &UnstructuredSpec) -> Vec<VariableOption> {
    get_array(item, "options")
        .map(|options| {
            options
                .iter()
                .filter_map(|o| serde_json::from_value(o.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Wraps a legacy variable query (string or object) into an opaque query
/// spec.
fn variable_query_spec(query: Option<&Value>) -> UnstructuredSpec {
    match query {
        Some(Value::Object(obj)) => obj.clone(),
        Some(Value::String(s)) => {
            let mut map = Map::new();
            map.insert(LEGACY_STRING_VALUE_KEY.into(), json!(s));
            map
        }
        _ => Map::new(),
    }
}

fn transform_variables(source: &UnstructuredSpec, ds_index: &DatasourceIndex) -> Vec<Variable> {
    let list = match get_map(source, "templating").and_then(|t| get_array(t, "list")) {
        Some(list) => list,
        None => return Vec::new(),
    };

    list.iter()
        .filter_map(Value::as_object)
        .filter_map(|item| transform_variable(item, ds_index))
        .collect()
}

fn transform_variable(item: &UnstructuredSpec, ds_index: &DatasourceIndex) -> Option<Variable> {
    let name = unstructured::get_string_or(item, "name", "");
    let label = get_str(item, "label")
        .filter(|l| !l.is_empty())
        .map(str::to_string);
    let description = get_str(item, "description")
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    let hide = VariableHide::from_legacy(get_i64(item, "hide", 0));
    let skip_url_sync = get_bool(item, "skipUrlSync", false);

    match get_str(item, "type") {
        Some("query") => {
            let item_ds = parse_datasource_value(item.get("datasource"));
            let resolved = resolve_datasource_ref(item_ds.as_ref(), None, ds_index);
            let kind = resolved
                .ds_type
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| BUILTIN_DATASOURCE_TYPE.to_string());
            Some(Variable::QueryVariable(QueryVariableSpec {
                name,
                label,
                description,
                hide,
                skip_url_sync,
                current: variable_option(item.get("current")),
                options: variable_options(item),
                multi: get_bool(item, "multi", false),
                include_all: get_bool(item, "includeAll", false),
                all_value: get_str(item, "allValue").map(str::to_string),
                refresh: VariableRefresh::from_legacy(get_i64(item, "refresh", 0)),
                sort: VariableSort::from_legacy(get_i64(item, "sort", 0)),
                regex: unstructured::get_string_or(item, "regex", ""),
                definition: get_str(item, "definition").map(str::to_string),
                allow_custom_value: get_bool(item, "allowCustomValue", true),
                datasource: Some(resolved),
                query: DataQuery {
                    kind,
                    spec: variable_query_spec(item.get("query")),
                },
            }))
        }
        Some("datasource") => Some(Variable::DatasourceVariable(DatasourceVariableSpec {
            name,
            label,
            description,
            hide,
            skip_url_sync,
            plugin_id: unstructured::get_string_or(item, "query", ""),
            regex: unstructured::get_string_or(item, "regex", ""),
            current: variable_option(item.get("current")),
            options: variable_options(item),
            multi: get_bool(item, "multi", false),
            include_all: get_bool(item, "includeAll", false),
            all_value: get_str(item, "allValue").map(str::to_string),
            refresh: VariableRefresh::from_legacy(get_i64(item, "refresh", 0)),
            allow_custom_value: get_bool(item, "allowCustomValue", true),
        })),
        Some("custom") => Some(Variable::CustomVariable(CustomVariableSpec {
            name,
            label,
            description,
            hide,
            skip_url_sync,
            query: unstructured::get_string_or(item, "query", ""),
            current: variable_option(item.get("current")),
            options: variable_options(item),
            multi: get_bool(item, "multi", false),
            include_all: get_bool(item, "includeAll", false),
            all_value: get_str(item, "allValue").map(str::to_string),
            allow_custom_value: get_bool(item, "allowCustomValue", true),
        })),
        Some("constant") => Some(Variable::ConstantVariable(ConstantVariableSpec {
            name,
            label,
            description,
            hide,
            skip_url_sync,
            query: unstructured::get_string_or(item, "query", ""),
            current: variable_option(item.get("current")),
        })),
        Some("interval") => {
            let auto = get_map(item, "auto").is_some() || get_bool(item, "auto", false);
            Some(Variable::IntervalVariable(IntervalVariableSpec {
                name,
                label,
                description,
                hide,
                skip_url_sync,
                query: unstructured::get_string_or(item, "query", ""),
                current: variable_option(item.get("current")),
                options: variable_options(item),
                auto,
                auto_min: unstructured::get_string_or(item, "auto_min", ""),
                auto_count: get_i64(item, "auto_count", 0),
                refresh: VariableRefresh::from_legacy(get_i64(item, "refresh", 0)),
            }))
        }
        Some("textbox") => Some(Variable::TextVariable(TextVariableSpec {
            name,
            label,
            description,
            hide,
            skip_url_sync,
            query: unstructured::get_string_or(item, "query", ""),
            current: variable_option(item.get("current")),
        })),
        Some("adhoc") => {
            let item_ds = parse_datasource_value(item.get("datasource"));
            let resolved = resolve_datasource_ref(item_ds.as_ref(), None, ds_index);
            Some(Variable::AdhocVariable(AdhocVariableSpec {
                name,
                label,
                description,
                hide,
                skip_url_sync,
                allow_custom_value: get_bool(item, "allowCustomValue", true),
                datasource: Some(resolved),
                filters: get_array(item, "filters")
                    .map(|filters| {
                        filters
                            .iter()
                            .filter_map(|f| serde_json::from_value(f.clone()).ok())
                            .collect()
                    })
                    .unwrap_or_default(),
                base_filters: get_array(item, "baseFilters")
                    .map(|filters| {
                        filters
                            .iter()
                            .filter_map(|f| serde_json::from_value(f.clone()).ok())
                            .collect()
                    })
                    .unwrap_or_default(),
                default_keys: item.get("defaultKeys").cloned(),
            }))
        }
        other => {
            warn!(variable = %name, kind = ?other, "skipping unsupported variable type");
            None
        }
    }
}
