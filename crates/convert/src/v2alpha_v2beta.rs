//! Conversion between the two structured generations.
//!
//! The generations agree on everything except plugin references: the older
//! one keeps a `kind` on queries and viz configs plus a spec-level
//! datasource ref, the newer one an API-style `group`/`version` pair with
//! the datasource instance named inside the query.

use dashgrade_schema::{DashboardV2Alpha, DashboardV2Beta, DatasourceRef, v2alpha, v2beta};

use crate::error::Result;

/// Query schema version stamped on every upgraded query.
const QUERY_SPEC_VERSION: &str = "v0";

pub fn convert_v2alpha_to_v2beta(dashboard: &DashboardV2Alpha) -> Result<DashboardV2Beta> {
    let source = &dashboard.spec;
    let spec = v2beta::DashboardSpec {
        title: source.title.clone(),
        description: source.description.clone(),
        tags: source.tags.clone(),
        cursor_sync: source.cursor_sync,
        preload: source.preload,
        editable: source.editable,
        live_now: source.live_now,
        revision: source.revision,
        time_settings: source.time_settings.clone(),
        links: source.links.clone(),
        annotations: source
            .annotations
            .iter()
            .map(upgrade_annotation)
            .collect(),
        variables: source.variables.iter().map(upgrade_variable).collect(),
        elements: source
            .elements
            .iter()
            .map(|(name, element)| (name.clone(), upgrade_element(element)))
            .collect(),
        layout: source.layout.clone(),
    };
    Ok(DashboardV2Beta {
        metadata: dashboard.metadata.clone(),
        spec,
        status: None,
    })
}

pub fn convert_v2beta_to_v2alpha(dashboard: &DashboardV2Beta) -> Result<DashboardV2Alpha> {
    let source = &dashboard.spec;
    let spec = v2alpha::DashboardSpec {
        title: source.title.clone(),
        description: source.description.clone(),
        tags: source.tags.clone(),
        cursor_sync: source.cursor_sync,
        preload: source.preload,
        editable: source.editable,
        live_now: source.live_now,
        revision: source.revision,
        time_settings: source.time_settings.clone(),
        links: source.links.clone(),
        annotations: source
            .annotations
            .iter()
            .map(downgrade_annotation)
            .collect(),
        variables: source.variables.iter().map(downgrade_variable).collect(),
        elements: source
            .elements
            .iter()
            .map(|(name, element)| (name.clone(), downgrade_element(element)))
            .collect(),
        layout: source.layout.clone(),
    };
    Ok(DashboardV2Alpha {
        metadata: dashboard.metadata.clone(),
        spec,
        status: None,
    })
}

fn upgrade_query(
    query: &v2alpha::DataQuery,
    datasource: Option<&DatasourceRef>,
) -> v2beta::DataQuery {
    let group = if query.kind.is_empty() {
        datasource
            .and_then(|ds| ds.ds_type.clone())
            .unwrap_or_default()
    } else {
        query.kind.clone()
    };
    v2beta::DataQuery {
        group,
        version: QUERY_SPEC_VERSION.to_string(),
        datasource: datasource
            .and_then(|ds| ds.uid.clone())
            .map(|name| v2beta::DatasourceName { name }),
        spec: query.spec.clone(),
    }
}

/// Rebuilds the spec-level ref from the query's group and instance name.
fn downgrade_query_datasource(query: &v2beta::DataQuery) -> Option<DatasourceRef> {
    let name = query.datasource.as_ref()?;
    Some(DatasourceRef {
        ds_type: (!query.group.is_empty()).then(|| query.group.clone()),
        uid: Some(name.name.clone()),
    })
}

fn downgrade_query(query: &v2beta::DataQuery) -> v2alpha::DataQuery {
    v2alpha::DataQuery {
        kind: query.group.clone(),
        spec: query.spec.clone(),
    }
}

fn upgrade_element(element: &v2alpha::Element) -> v2beta::Element {
    match element {
        v2alpha::Element::Panel(panel) => v2beta::Element::Panel(v2beta::PanelSpec {
            id: panel.id,
            title: panel.title.clone(),
            description: panel.description.clone(),
            transparent: panel.transparent,
            links: panel.links.clone(),
            data: v2beta::QueryGroup {
                queries: panel
                    .data
                    .queries
                    .iter()
                    .map(|q| v2beta::PanelQuery {
                        ref_id: q.ref_id.clone(),
                        hidden: q.hidden,
                        query: upgrade_query(&q.query, q.datasource.as_ref()),
                    })
                    .collect(),
                transformations: panel.data.transformations.clone(),
                query_options: panel.data.query_options.clone(),
            },
            viz_config: v2beta::VizConfig {
                group: panel.viz_config.kind.clone(),
                version: panel.viz_config.spec.plugin_version.clone(),
                spec: v2beta::VizConfigSpec {
                    options: panel.viz_config.spec.options.clone(),
                    field_config: panel.viz_config.spec.field_config.clone(),
                },
            },
        }),
        v2alpha::Element::LibraryPanel(lib) => {
            v2beta::Element::LibraryPanel(v2beta::LibraryPanelSpec {
                id: lib.id,
                title: lib.title.clone(),
                library_panel: lib.library_panel.clone(),
            })
        }
    }
}

fn downgrade_element(element: &v2beta::Element) -> v2alpha::Element {
    match element {
        v2beta::Element::Panel(panel) => v2alpha::Element::Panel(v2alpha::PanelSpec {
            id: panel.id,
            title: panel.title.clone(),
            description: panel.description.clone(),
            transparent: panel.transparent,
            links: panel.links.clone(),
            data: v2alpha::QueryGroup {
                queries: panel
                    .data
                    .queries
                    .iter()
                    .map(|q| v2alpha::PanelQuery {
                        ref_id: q.ref_id.clone(),
                        hidden: q.hidden,
                        datasource: downgrade_query_datasource(&q.query),
                        query: downgrade_query(&q.query),
                    })
                    .collect(),
                transformations: panel.data.transformations.clone(),
                query_options: panel.data.query_options.clone(),
            },
            viz_config: v2alpha::VizConfig {
                kind: panel.viz_config.group.clone(),
                spec: v2alpha::VizConfigSpec {
                    plugin_version: panel.viz_config.version.clone(),
                    options: panel.viz_config.spec.options.clone(),
                    field_config: panel.viz_config.spec.field_config.clone(),
                },
            },
        }),
        v2beta::Element::LibraryPanel(lib) => {
            v2alpha::Element::LibraryPanel(v2alpha::LibraryPanelSpec {
                id: lib.id,
                title: lib.title.clone(),
                library_panel: lib.library_panel.clone(),
            })
        }
    }
}

fn upgrade_annotation(annotation: &v2alpha::AnnotationQuerySpec) -> v2beta::AnnotationQuerySpec {
    let query = match &annotation.query {
        Some(query) => upgrade_query(query, annotation.datasource.as_ref()),
        None => upgrade_query(&v2alpha::DataQuery::default(), annotation.datasource.as_ref()),
    };
    v2beta::AnnotationQuerySpec {
        name: annotation.name.clone(),
        enable: annotation.enable,
        hide: annotation.hide,
        icon_color: annotation.icon_color.clone(),
        built_in: annotation.built_in,
        query,
        filter: annotation.filter.clone(),
        legacy_options: annotation.legacy_options.clone(),
    }
}

fn downgrade_annotation(annotation: &v2beta::AnnotationQuerySpec) -> v2alpha::AnnotationQuerySpec {
    // The newer shape makes the query mandatory, so a datasource-only
    // annotation arrives as an empty-spec query whose group repeats the
    // ref's type. Once the ref is recovered, such a query carries nothing
    // and is dropped.
    let query = &annotation.query;
    let datasource = downgrade_query_datasource(query);
    let group_redundant = query.group.is_empty()
        || datasource.as_ref().and_then(|ds| ds.ds_type.as_deref()) == Some(query.group.as_str());
    let is_empty = query.spec.is_empty() && group_redundant;
    v2alpha::AnnotationQuerySpec {
        name: annotation.name.clone(),
        enable: annotation.enable,
        hide: annotation.hide,
        icon_color: annotation.icon_color.clone(),
        built_in: annotation.built_in,
        datasource,
        query: (!is_empty).then(|| downgrade_query(query)),
        filter: annotation.filter.clone(),
        legacy_options: annotation.legacy_options.clone(),
    }
}

fn upgrade_variable(variable: &v2alpha::Variable) -> v2beta::Variable {
    match variable {
        v2alpha::Variable::QueryVariable(spec) => {
            v2beta::Variable::QueryVariable(v2beta::QueryVariableSpec {
                name: spec.name.clone(),
                label: spec.label.clone(),
                description: spec.description.clone(),
                hide: spec.hide,
                skip_url_sync: spec.skip_url_sync,
                current: spec.current.clone(),
                options: spec.options.clone(),
                multi: spec.multi,
                include_all: spec.include_all,
                all_value: spec.all_value.clone(),
                refresh: spec.refresh,
                sort: spec.sort,
                regex: spec.regex.clone(),
                definition: spec.definition.clone(),
                allow_custom_value: spec.allow_custom_value,
                query: upgrade_query(&spec.query, spec.datasource.as_ref()),
            })
        }
        v2alpha::Variable::AdhocVariable(spec) => {
            v2beta::Variable::AdhocVariable(v2beta::AdhocVariableSpec {
                name: spec.name.clone(),
                label: spec.label.clone(),
                description: spec.description.clone(),
                hide: spec.hide,
                skip_url_sync: spec.skip_url_sync,
                allow_custom_value: spec.allow_custom_value,
                group: spec
                    .datasource
                    .as_ref()
                    .and_then(|ds| ds.ds_type.clone())
                    .unwrap_or_default(),
                datasource: spec
                    .datasource
                    .as_ref()
                    .and_then(|ds| ds.uid.clone())
                    .map(|name| v2beta::DatasourceName { name }),
                filters: spec.filters.clone(),
                base_filters: spec.base_filters.clone(),
                default_keys: spec.default_keys.clone(),
            })
        }
        v2alpha::Variable::DatasourceVariable(spec) => {
            v2beta::Variable::DatasourceVariable(spec.clone())
        }
        v2alpha::Variable::CustomVariable(spec) => v2beta::Variable::CustomVariable(spec.clone()),
        v2alpha::Variable::ConstantVariable(spec) => {
            v2beta::Variable::ConstantVariable(spec.clone())
        }
        v2alpha::Variable::IntervalVariable(spec) => {
            v2beta::Variable::IntervalVariable(spec.clone())
        }
        v2alpha::Variable::TextVariable(spec) => v2beta::Variable::TextVariable(spec.clone()),
    }
}

fn downgrade_variable(variable: &v2beta::Variable) -> v2alpha::Variable {
    match variable {
        v2beta::Variable::QueryVariable(spec) => {
            v2alpha::Variable::QueryVariable(v2alpha::QueryVariableSpec {
                name: spec.name.clone(),
                label: spec.label.clone(),
                description: spec.description.clone(),
                hide: spec.hide,
                skip_url_sync: spec.skip_url_sync,
                current: spec.current.clone(),
                options: spec.options.clone(),
                multi: spec.multi,
                include_all: spec.include_all,
                all_value: spec.all_value.clone(),
                refresh: spec.refresh,
                sort: spec.sort,
                regex: spec.regex.clone(),
                definition: spec.definition.clone(),
                allow_custom_value: spec.allow_custom_value,
                datasource: downgrade_query_datasource(&spec.query),
                query: downgrade_query(&spec.query),
            })
        }
        v2beta::Variable::AdhocVariable(spec) => {
            v2alpha::Variable::AdhocVariable(v2alpha::AdhocVariableSpec {
                name: spec.name.clone(),
                label: spec.label.clone(),
                description: spec.description.clone(),
                hide: spec.hide,
                skip_url_sync: spec.skip_url_sync,
                allow_custom_value: spec.allow_custom_value,
                datasource: spec.datasource.as_ref().map(|ds| DatasourceRef {
                    ds_type: (!spec.group.is_empty()).then(|| spec.group.clone()),
                    uid: Some(ds.name.clone()),
                }),
                filters: spec.filters.clone(),
                base_filters: spec.base_filters.clone(),
                default_keys: spec.default_keys.clone(),
            })
        }
        v2beta::Variable::DatasourceVariable(spec) => {
            v2alpha::Variable::DatasourceVariable(spec.clone())
        }
        v2beta::Variable::CustomVariable(spec) => v2alpha::Variable::CustomVariable(spec.clone()),
        v2beta::Variable::ConstantVariable(spec) => {
            v2alpha::Variable::ConstantVariable(spec.clone())
        }
        v2beta::Variable::IntervalVariable(spec) => {
            v2alpha::Variable::IntervalVariable(spec.clone())
        }
        v2beta::Variable::TextVariable(spec) => v2alpha::Variable::TextVariable(spec.clone()),
    }
}
