//! Datasource reference resolution and ref-id assignment.
//!
//! Legacy payloads reference datasources loosely: a query may carry a full
//! ref, a type-only ref, nothing at all, or a template variable. This module
//! turns any of those into a concrete ref against a catalog snapshot.

use std::collections::HashSet;

use dashgrade_schema::DatasourceRef;
use dashgrade_schema::unstructured::is_template_variable;

use crate::provider::DatasourceIndex;

/// Built-in datasource every installation has.
pub const BUILTIN_DATASOURCE_UID: &str = "grafana";
pub const BUILTIN_DATASOURCE_TYPE: &str = "grafana";

/// Server-side expression pseudo-datasource. Kept verbatim wherever it
/// appears; never resolved against the catalog.
pub const EXPRESSION_DATASOURCE_UID: &str = "__expr__";

/// Sentinel a panel carries when its queries target different datasources.
pub const MIXED_DATASOURCE_UID: &str = "-- Mixed --";
pub const MIXED_DATASOURCE_TYPE: &str = "mixed";

/// Sentinel for queries reusing results from another panel.
pub const DASHBOARD_DATASOURCE_UID: &str = "-- Dashboard --";

/// Catalog default entry, or the built-in datasource when the catalog has
/// none.
pub fn default_datasource_ref(index: &DatasourceIndex) -> DatasourceRef {
    match index.default_entry() {
        Some(entry) => DatasourceRef::new(entry.ds_type.clone(), entry.uid.clone()),
        None => DatasourceRef::new(BUILTIN_DATASOURCE_TYPE, BUILTIN_DATASOURCE_UID),
    }
}

/// Plugin type for a uid: catalog lookup, with template variables treated as
/// a generic datasource and unknown uids left untyped.
pub fn datasource_type_by_uid(index: &DatasourceIndex, uid: &str) -> Option<String> {
    if is_template_variable(uid) {
        return Some("datasource".to_string());
    }
    index.by_uid(uid).map(|entry| entry.ds_type.clone())
}

/// Resolves the effective datasource for one item (query, annotation, or
/// variable) given its own ref, its container's ref, and the catalog.
///
/// Precedence:
/// 1. an item uid is authoritative (`__expr__` and template variables are
///    kept verbatim, everything else gets its type filled from the catalog);
/// 2. a blank item inherits the container ref, unless the container is the
///    mixed sentinel;
/// 3. a type without a uid keeps the type and takes the fallback uid;
/// 4. otherwise the catalog default, falling back to the built-in
///    datasource.
pub fn resolve_datasource_ref(
    item: Option<&DatasourceRef>,
    container: Option<&DatasourceRef>,
    index: &DatasourceIndex,
) -> DatasourceRef {
    if let Some(item_ref) = item {
        let uid = item_ref.uid.as_deref().unwrap_or("");
        if uid == EXPRESSION_DATASOURCE_UID {
            return item_ref.clone();
        }
        if !uid.is_empty() {
            let mut resolved = item_ref.clone();
            if resolved.ds_type.as_deref().unwrap_or("").is_empty() {
                resolved.ds_type = datasource_type_by_uid(index, uid);
            }
            return resolved;
        }
        let ds_type = item_ref.ds_type.as_deref().unwrap_or("");
        if !ds_type.is_empty() {
            return resolve_type_only(ds_type, container, index);
        }
    }

    if let Some(container_ref) = container
        && !container_ref.is_blank()
        && container_ref.uid.as_deref() != Some(MIXED_DATASOURCE_UID)
    {
        return resolve_datasource_ref(Some(container_ref), None, index);
    }

    default_datasource_ref(index)
}

fn resolve_type_only(
    ds_type: &str,
    container: Option<&DatasourceRef>,
    index: &DatasourceIndex,
) -> DatasourceRef {
    // A container ref of the same type supplies the uid directly.
    if let Some(container_ref) = container
        && container_ref.ds_type.as_deref() == Some(ds_type)
        && !container_ref.uid.as_deref().unwrap_or("").is_empty()
        && container_ref.uid.as_deref() != Some(MIXED_DATASOURCE_UID)
    {
        return container_ref.clone();
    }

    let fallback = default_datasource_ref(index);
    DatasourceRef {
        ds_type: Some(ds_type.to_string()),
        uid: fallback.uid,
    }
}

/// Bijective base-26 ref id for a zero-based index: `A`..`Z`, `AA`, `AB`, ...
fn ref_id_for_index(index: usize) -> String {
    let mut n = index + 1;
    let mut id = String::new();
    while n > 0 {
        n -= 1;
        id.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    id
}

/// Smallest unused ref id in the `A`, `B`, ... sequence. Ids already in
/// `used` are skipped; existing ids are never reassigned.
pub fn next_available_ref_id(used: &HashSet<String>) -> String {
    let mut index = 0;
    loop {
        let candidate = ref_id_for_index(index);
        if !used.contains(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DatasourceInfo;

    fn catalog() -> DatasourceIndex {
        DatasourceIndex::new(vec![
            DatasourceInfo {
                uid: "prom-default".into(),
                ds_type: "prometheus".into(),
                name: "Prometheus".into(),
                is_default: true,
            },
            DatasourceInfo {
                uid: "influx-1".into(),
                ds_type: "influxdb".into(),
                name: "Influx".into(),
                is_default: false,
            },
        ])
    }

    #[test]
    fn test_item_uid_is_authoritative() {
        let item = DatasourceRef {
            ds_type: None,
            uid: Some("influx-1".into()),
        };
        let container = DatasourceRef::new("prometheus", "prom-default");
        let resolved = resolve_datasource_ref(Some(&item), Some(&container), &catalog());
        assert_eq!(resolved, DatasourceRef::new("influxdb", "influx-1"));
    }

    #[test]
    fn test_blank_item_inherits_container() {
        let resolved = resolve_datasource_ref(
            Some(&DatasourceRef::default()),
            Some(&DatasourceRef::new("influxdb", "influx-1")),
            &catalog(),
        );
        assert_eq!(resolved, DatasourceRef::new("influxdb", "influx-1"));
    }

    #[test]
    fn test_expression_ref_kept_verbatim() {
        let item = DatasourceRef {
            ds_type: None,
            uid: Some(EXPRESSION_DATASOURCE_UID.into()),
        };
        let resolved = resolve_datasource_ref(
            Some(&item),
            Some(&DatasourceRef::new("influxdb", "influx-1")),
            &catalog(),
        );
        assert_eq!(resolved, item);
    }

    #[test]
    fn test_mixed_container_never_inherited() {
        let container = DatasourceRef::new(MIXED_DATASOURCE_TYPE, MIXED_DATASOURCE_UID);
        let resolved = resolve_datasource_ref(
            Some(&DatasourceRef::default()),
            Some(&container),
            &catalog(),
        );
        assert_eq!(resolved, DatasourceRef::new("prometheus", "prom-default"));
    }

    #[test]
    fn test_no_refs_fall_back_to_catalog_default() {
        let resolved = resolve_datasource_ref(None, None, &catalog());
        assert_eq!(resolved, DatasourceRef::new("prometheus", "prom-default"));
    }

    #[test]
    fn test_no_refs_no_catalog_fall_back_to_builtin() {
        let resolved = resolve_datasource_ref(None, None, &DatasourceIndex::default());
        assert_eq!(
            resolved,
            DatasourceRef::new(BUILTIN_DATASOURCE_TYPE, BUILTIN_DATASOURCE_UID)
        );
    }

    #[test]
    fn test_type_only_keeps_type_takes_fallback_uid() {
        let item = DatasourceRef {
            ds_type: Some("datasource".into()),
            uid: None,
        };
        let resolved = resolve_datasource_ref(Some(&item), None, &catalog());
        assert_eq!(resolved.ds_type.as_deref(), Some("datasource"));
        assert_eq!(resolved.uid.as_deref(), Some("prom-default"));
    }

    #[test]
    fn test_template_variable_uid_is_opaque() {
        let item = DatasourceRef {
            ds_type: None,
            uid: Some("${ds}".into()),
        };
        let resolved = resolve_datasource_ref(Some(&item), None, &catalog());
        assert_eq!(resolved.uid.as_deref(), Some("${ds}"));
        assert_eq!(resolved.ds_type.as_deref(), Some("datasource"));
    }

    #[test]
    fn test_ref_id_sequence() {
        assert_eq!(ref_id_for_index(0), "A");
        assert_eq!(ref_id_for_index(25), "Z");
        assert_eq!(ref_id_for_index(26), "AA");
        assert_eq!(ref_id_for_index(27), "AB");
        assert_eq!(ref_id_for_index(51), "AZ");
        assert_eq!(ref_id_for_index(52), "BA");
    }

    #[test]
    fn test_next_available_skips_existing() {
        let mut used: HashSet<String> = ["A".to_string()].into_iter().collect();
        assert_eq!(next_available_ref_id(&used), "B");
        used.insert("B".into());
        assert_eq!(next_available_ref_id(&used), "C");
    }
}
