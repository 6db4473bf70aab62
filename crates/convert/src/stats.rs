//! Countable-content statistics and the data-loss gate.
//!
//! Every conversion hop snapshots these counters before and after the field
//! conversion; a strict decrease in any counter fails the hop. Rows are
//! containers, never panels; panels inside collapsed rows always count.

use dashgrade_schema::unstructured::{UnstructuredSpec, get_array, get_map, get_str};
use dashgrade_schema::{v2alpha, v2beta};
use serde_json::Value;

use crate::error::{ConversionError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub panels: u64,
    pub queries: u64,
    pub annotations: u64,
    pub links: u64,
    pub variables: u64,
}

impl DashboardStats {
    fn fields(&self) -> [(&'static str, u64); 5] {
        [
            ("panels", self.panels),
            ("queries", self.queries),
            ("annotations", self.annotations),
            ("links", self.links),
            ("variables", self.variables),
        ]
    }
}

fn count_unstructured_panel(panel: &UnstructuredSpec, stats: &mut DashboardStats) {
    if get_str(panel, "type") == Some("row") {
        // Collapsed rows keep their children nested in the marker.
        if let Some(children) = get_array(panel, "panels") {
            for child in children.iter().filter_map(Value::as_object) {
                count_unstructured_panel(child, stats);
            }
        }
        return;
    }
    stats.panels += 1;
    stats.queries += get_array(panel, "targets").map_or(0, |t| t.len() as u64);
}

/// Stats for a legacy free-form payload (both unstructured generations).
pub fn collect_stats_unstructured(spec: &UnstructuredSpec) -> DashboardStats {
    let mut stats = DashboardStats::default();
    if let Some(panels) = get_array(spec, "panels") {
        for panel in panels.iter().filter_map(Value::as_object) {
            count_unstructured_panel(panel, &mut stats);
        }
    }
    stats.links = get_array(spec, "links").map_or(0, |l| l.len() as u64);
    stats.annotations = get_map(spec, "annotations")
        .and_then(|a| get_array(a, "list"))
        .map_or(0, |l| l.len() as u64);
    stats.variables = get_map(spec, "templating")
        .and_then(|t| get_array(t, "list"))
        .map_or(0, |l| l.len() as u64);
    stats
}

pub fn collect_stats_v2alpha(spec: &v2alpha::DashboardSpec) -> DashboardStats {
    let mut stats = DashboardStats {
        panels: spec.elements.len() as u64,
        annotations: spec.annotations.len() as u64,
        links: spec.links.len() as u64,
        variables: spec.variables.len() as u64,
        ..Default::default()
    };
    for element in spec.elements.values() {
        if let v2alpha::Element::Panel(panel) = element {
            stats.queries += panel.data.queries.len() as u64;
        }
    }
    stats
}

pub fn collect_stats_v2beta(spec: &v2beta::DashboardSpec) -> DashboardStats {
    let mut stats = DashboardStats {
        panels: spec.elements.len() as u64,
        annotations: spec.annotations.len() as u64,
        links: spec.links.len() as u64,
        variables: spec.variables.len() as u64,
        ..Default::default()
    };
    for element in spec.elements.values() {
        if let v2beta::Element::Panel(panel) = element {
            stats.queries += panel.data.queries.len() as u64;
        }
    }
    stats
}

/// Fails iff any counter strictly decreased, listing every decreased field
/// with its magnitude. Increases are fine (conversion may synthesize
/// defaults). The version identifiers name the failing hop in the error.
pub fn detect_data_loss(
    before: &DashboardStats,
    after: &DashboardStats,
    source_version: &str,
    target_version: &str,
) -> Result<()> {
    let mut details = Vec::new();
    for ((name, before_count), (_, after_count)) in
        before.fields().into_iter().zip(after.fields())
    {
        if after_count < before_count {
            details.push(format!(
                "loss of {} {} (before: {}, after: {})",
                before_count - after_count,
                name,
                before_count,
                after_count
            ));
        }
    }

    if details.is_empty() {
        return Ok(());
    }
    Err(ConversionError::DataLoss {
        conversion: format!("{source_version}_to_{target_version}"),
        source_version: source_version.to_string(),
        target_version: target_version.to_string(),
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: Value) -> UnstructuredSpec {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn test_rows_are_not_panels() {
        let spec = payload(json!({
            "panels": [
                {"id": 1, "type": "timeseries", "targets": [{"refId": "A"}, {"refId": "B"}]},
                {"id": 2, "type": "row", "collapsed": true, "panels": [
                    {"id": 3, "type": "stat", "targets": [{"refId": "A"}]}
                ]},
                {"id": 4, "type": "row"}
            ],
            "links": [{"title": "docs"}],
            "annotations": {"list": [{"name": "deploys"}]},
            "templating": {"list": [{"name": "env"}, {"name": "host"}]}
        }));
        let stats = collect_stats_unstructured(&spec);
        assert_eq!(stats.panels, 2);
        assert_eq!(stats.queries, 3);
        assert_eq!(stats.links, 1);
        assert_eq!(stats.annotations, 1);
        assert_eq!(stats.variables, 2);
    }

    #[test]
    fn test_loss_gate_reports_every_decrease() {
        let before = DashboardStats {
            panels: 3,
            queries: 4,
            annotations: 1,
            links: 0,
            variables: 2,
        };
        let after = DashboardStats {
            panels: 2,
            queries: 4,
            annotations: 0,
            links: 0,
            variables: 2,
        };
        let err = detect_data_loss(&before, &after, "v1", "v2alpha").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("loss of 1 panels"));
        assert!(msg.contains("loss of 1 annotations"));
        assert!(!msg.contains("queries"));
        assert!(msg.contains("v1_to_v2alpha"));
        assert!(msg.contains("(v1 -> v2alpha)"));
    }

    #[test]
    fn test_loss_error_names_both_versions() {
        let before = DashboardStats {
            panels: 1,
            ..Default::default()
        };
        let err = detect_data_loss(&before, &DashboardStats::default(), "v2alpha", "v1")
            .unwrap_err();
        let ConversionError::DataLoss {
            conversion,
            source_version,
            target_version,
            ..
        } = err
        else {
            panic!("expected data loss error");
        };
        assert_eq!(conversion, "v2alpha_to_v1");
        assert_eq!(source_version, "v2alpha");
        assert_eq!(target_version, "v1");
    }

    #[test]
    fn test_increase_is_not_loss() {
        let before = DashboardStats::default();
        let after = DashboardStats {
            panels: 5,
            ..Default::default()
        };
        assert!(detect_data_loss(&before, &after, "v0", "v1").is_ok());
    }
}
