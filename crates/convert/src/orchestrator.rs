//! Version-conversion orchestrator.
//!
//! Routes a dashboard from its current generation to a requested one through
//! a fixed set of single-generation hops, audits every hop for data loss,
//! and stamps the conversion status on the produced document.

use dashgrade_schema::{
    ConversionStatus, DashboardV0, DashboardV1, DashboardVersion, LATEST_SCHEMA_VERSION,
    VersionedDashboard,
};
use serde_json::Map;
use tracing::{debug, warn};

use crate::context::ConversionContext;
use crate::error::{ConversionError, Result};
use crate::migrate::SchemaMigrator;
use crate::provider::{DatasourceIndexProvider, LibraryElementProvider};
use crate::stats::{
    DashboardStats, collect_stats_unstructured, collect_stats_v2alpha, collect_stats_v2beta,
    detect_data_loss,
};
use crate::v1_to_v2alpha::convert_v1_to_v2alpha;
use crate::v2alpha_to_v1::convert_v2alpha_to_v1;
use crate::v2alpha_v2beta::{convert_v2alpha_to_v2beta, convert_v2beta_to_v2alpha};

/// Status message stamped on targets whose downgrade path does not exist
/// yet.
pub const NOT_IMPLEMENTED_MESSAGE: &str = "backend conversion not yet implemented";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hop {
    V0ToV1,
    V1ToV0,
    V1ToV2Alpha,
    V2AlphaToV1,
    V2AlphaToV2Beta,
    V2BetaToV2Alpha,
}

/// Hops from one generation to another, or `None` for pairs whose downgrade
/// is not implemented.
fn conversion_path(from: DashboardVersion, to: DashboardVersion) -> Option<Vec<Hop>> {
    use DashboardVersion::*;
    let hops = match (from, to) {
        (V0, V1) => vec![Hop::V0ToV1],
        (V1, V0) => vec![Hop::V1ToV0],
        (V1, V2Alpha) => vec![Hop::V1ToV2Alpha],
        (V2Alpha, V1) => vec![Hop::V2AlphaToV1],
        (V2Alpha, V2Beta) => vec![Hop::V2AlphaToV2Beta],
        (V2Beta, V2Alpha) => vec![Hop::V2BetaToV2Alpha],
        (V0, V2Alpha) => vec![Hop::V0ToV1, Hop::V1ToV2Alpha],
        (V0, V2Beta) => vec![Hop::V0ToV1, Hop::V1ToV2Alpha, Hop::V2AlphaToV2Beta],
        (V1, V2Beta) => vec![Hop::V1ToV2Alpha, Hop::V2AlphaToV2Beta],
        _ => return None,
    };
    Some(hops)
}

fn stats_of(dashboard: &VersionedDashboard) -> DashboardStats {
    match dashboard {
        VersionedDashboard::V0(d) => collect_stats_unstructured(&d.spec),
        VersionedDashboard::V1(d) => collect_stats_unstructured(&d.spec),
        VersionedDashboard::V2Alpha(d) => collect_stats_v2alpha(&d.spec),
        VersionedDashboard::V2Beta(d) => collect_stats_v2beta(&d.spec),
    }
}

fn hop_mismatch(hop: Hop, found: DashboardVersion) -> ConversionError {
    ConversionError::StructuralConversion(format!(
        "conversion step {hop:?} received a {found} document"
    ))
}

/// The conversion engine. Catalog providers and the numbered-schema migrator
/// are injected; the orchestrator owns no state of its own.
pub struct Converter {
    ds_provider: Box<dyn DatasourceIndexProvider>,
    library_provider: Box<dyn LibraryElementProvider>,
    migrator: Box<dyn SchemaMigrator>,
}

impl Converter {
    pub fn new(
        ds_provider: Box<dyn DatasourceIndexProvider>,
        library_provider: Box<dyn LibraryElementProvider>,
        migrator: Box<dyn SchemaMigrator>,
    ) -> Self {
        Self {
            ds_provider,
            library_provider,
            migrator,
        }
    }

    /// Converts a dashboard to the target generation.
    ///
    /// Hops run strictly in sequence and the first failure aborts the chain.
    /// Every produced document carries a `ConversionStatus` whose
    /// `stored_version` is the generation the document was originally stored
    /// at, even across multi-hop chains. Same-version requests return the
    /// input untouched.
    pub fn convert(
        &self,
        source: VersionedDashboard,
        target: DashboardVersion,
    ) -> Result<VersionedDashboard> {
        let origin = source.version();
        if origin == target {
            return Ok(source);
        }
        debug!(%origin, %target, dashboard = %source.metadata().name, "converting dashboard");

        let Some(hops) = conversion_path(origin, target) else {
            return Ok(self.not_implemented(source, origin, target));
        };

        let mut current = source;
        for hop in hops {
            let before = stats_of(&current);
            let from = current.version();
            let mut next = self.apply_hop(hop, &current)?;
            detect_data_loss(
                &before,
                &stats_of(&next),
                from.as_str(),
                next.version().as_str(),
            )?;
            next.set_status(ConversionStatus::success(origin.as_str()));
            current = next;
        }
        Ok(current)
    }

    fn apply_hop(&self, hop: Hop, current: &VersionedDashboard) -> Result<VersionedDashboard> {
        match (hop, current) {
            (Hop::V0ToV1, VersionedDashboard::V0(d)) => {
                let ctx = ConversionContext::service(d.metadata.namespace.clone());
                let mut spec = d.spec.clone();
                self.migrator
                    .migrate(&ctx, &mut spec, LATEST_SCHEMA_VERSION)?;
                Ok(VersionedDashboard::V1(DashboardV1 {
                    metadata: d.metadata.clone(),
                    spec,
                    status: None,
                }))
            }
            // The older unstructured generation accepts any numbered schema,
            // so the payload is carried over verbatim.
            (Hop::V1ToV0, VersionedDashboard::V1(d)) => {
                Ok(VersionedDashboard::V0(DashboardV0 {
                    metadata: d.metadata.clone(),
                    spec: d.spec.clone(),
                    status: None,
                }))
            }
            (Hop::V1ToV2Alpha, VersionedDashboard::V1(d)) => Ok(VersionedDashboard::V2Alpha(
                convert_v1_to_v2alpha(d, self.ds_provider.as_ref(), self.library_provider.as_ref())?,
            )),
            (Hop::V2AlphaToV1, VersionedDashboard::V2Alpha(d)) => {
                Ok(VersionedDashboard::V1(convert_v2alpha_to_v1(d)?))
            }
            (Hop::V2AlphaToV2Beta, VersionedDashboard::V2Alpha(d)) => {
                Ok(VersionedDashboard::V2Beta(convert_v2alpha_to_v2beta(d)?))
            }
            (Hop::V2BetaToV2Alpha, VersionedDashboard::V2Beta(d)) => {
                Ok(VersionedDashboard::V2Alpha(convert_v2beta_to_v2alpha(d)?))
            }
            (hop, other) => Err(hop_mismatch(hop, other.version())),
        }
    }

    /// Downgrade paths without an implementation produce an empty target
    /// document whose status records the failure, rather than an error.
    fn not_implemented(
        &self,
        source: VersionedDashboard,
        origin: DashboardVersion,
        target: DashboardVersion,
    ) -> VersionedDashboard {
        warn!(%origin, %target, "conversion path not implemented");
        let metadata = source.metadata().clone();
        let status = ConversionStatus::failure(origin.as_str(), NOT_IMPLEMENTED_MESSAGE);
        match target {
            DashboardVersion::V0 => VersionedDashboard::V0(DashboardV0 {
                metadata,
                spec: Map::new(),
                status: Some(status),
            }),
            DashboardVersion::V1 => VersionedDashboard::V1(DashboardV1 {
                metadata,
                spec: Map::new(),
                status: Some(status),
            }),
            DashboardVersion::V2Alpha => {
                VersionedDashboard::V2Alpha(dashgrade_schema::DashboardV2Alpha {
                    metadata,
                    status: Some(status),
                    ..Default::default()
                })
            }
            DashboardVersion::V2Beta => {
                VersionedDashboard::V2Beta(dashgrade_schema::DashboardV2Beta {
                    metadata,
                    status: Some(status),
                    ..Default::default()
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::PassthroughMigrator;
    use crate::provider::{
        DatasourceIndex, DatasourceInfo, StaticDatasourceProvider, StaticLibraryElementProvider,
    };
    use dashgrade_schema::ObjectMeta;
    use serde_json::json;

    fn converter() -> Converter {
        let index = DatasourceIndex::new(vec![DatasourceInfo {
            uid: "prom-1".into(),
            ds_type: "prometheus".into(),
            name: "Prometheus".into(),
            is_default: true,
        }]);
        Converter::new(
            Box::new(StaticDatasourceProvider::new(index)),
            Box::new(StaticLibraryElementProvider::default()),
            Box::new(PassthroughMigrator),
        )
    }

    fn v0_dashboard() -> VersionedDashboard {
        VersionedDashboard::V0(DashboardV0 {
            metadata: ObjectMeta {
                name: "dash".into(),
                namespace: "default".into(),
                ..Default::default()
            },
            spec: json!({
                "schemaVersion": 36,
                "title": "Fleet",
                "panels": [
                    {"id": 1, "type": "timeseries", "title": "CPU",
                     "gridPos": {"x": 0, "y": 0, "w": 12, "h": 8},
                     "targets": [{"refId": "A", "expr": "up"}]}
                ]
            })
            .as_object()
            .unwrap()
            .clone(),
            status: None,
        })
    }

    #[test]
    fn test_same_version_is_identity() {
        let source = v0_dashboard();
        let result = converter()
            .convert(source.clone(), DashboardVersion::V0)
            .unwrap();
        assert_eq!(result, source);
        assert!(result.status().is_none());
    }

    #[test]
    fn test_v0_to_v1_migrates_schema_number() {
        let result = converter()
            .convert(v0_dashboard(), DashboardVersion::V1)
            .unwrap();
        let VersionedDashboard::V1(dash) = &result else {
            panic!("expected v1 document");
        };
        assert_eq!(dash.schema_version(), LATEST_SCHEMA_VERSION);
        let status = dash.status.as_ref().unwrap();
        assert_eq!(status.stored_version, "v0");
        assert!(!status.failed);
    }

    #[test]
    fn test_multi_hop_keeps_origin_in_status() {
        let result = converter()
            .convert(v0_dashboard(), DashboardVersion::V2Beta)
            .unwrap();
        let VersionedDashboard::V2Beta(dash) = &result else {
            panic!("expected v2beta document");
        };
        assert_eq!(dash.status.as_ref().unwrap().stored_version, "v0");
        assert_eq!(dash.spec.elements.len(), 1);
    }

    #[test]
    fn test_not_implemented_path_reports_failure_status() {
        let source = converter()
            .convert(v0_dashboard(), DashboardVersion::V2Alpha)
            .unwrap();
        let result = converter().convert(source, DashboardVersion::V0).unwrap();
        let status = result.status().unwrap();
        assert!(status.failed);
        assert_eq!(status.error.as_deref(), Some(NOT_IMPLEMENTED_MESSAGE));
        assert_eq!(status.stored_version, "v2alpha");
        assert_eq!(result.metadata().name, "dash");
    }

    #[test]
    fn test_migration_failure_aborts_chain() {
        let mut dash = v0_dashboard();
        let VersionedDashboard::V0(inner) = &mut dash else {
            unreachable!();
        };
        inner.spec.insert("schemaVersion".into(), json!(7));
        let err = converter()
            .convert(dash, DashboardVersion::V2Beta)
            .unwrap_err();
        assert!(err.is_user_correctable());
    }
}
