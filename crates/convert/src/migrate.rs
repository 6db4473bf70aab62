//! Interface to the numbered-schema migration engine.
//!
//! Legacy payloads carry an integer `schemaVersion`; upgrading one to the
//! latest number is the job of an external engine behind [`SchemaMigrator`].
//! The conversion pipeline only needs the seam and the version bounds.

use dashgrade_schema::{MINIMUM_SCHEMA_VERSION, UnstructuredSpec};
#[cfg(test)]
use mockall::automock;
use serde_json::json;

use crate::context::ConversionContext;
use crate::error::ConversionError;

/// A migration failure, carrying enough context to point at the offending
/// step.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("dashboard schema version {found} is below the supported minimum")]
    BelowMinimum { found: u32 },

    #[error("migration step {step} ({from} -> {to}) failed: {message}")]
    Step {
        from: u32,
        to: u32,
        step: String,
        message: String,
    },
}

impl From<MigrationError> for ConversionError {
    fn from(err: MigrationError) -> Self {
        match err {
            MigrationError::BelowMinimum { found } => Self::MinimumVersion { found },
            MigrationError::Step {
                from,
                to,
                step,
                message,
            } => Self::SchemaMigration {
                from,
                to,
                step,
                message,
            },
        }
    }
}

/// Upgrades a legacy payload's numbered schema in place.
#[cfg_attr(test, automock)]
pub trait SchemaMigrator: Send + Sync {
    fn migrate(
        &self,
        ctx: &ConversionContext,
        spec: &mut UnstructuredSpec,
        target: u32,
    ) -> Result<(), MigrationError>;
}

/// Migrator for payloads that are already structurally current: enforces the
/// minimum bound and stamps the target number without rewriting fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughMigrator;

impl SchemaMigrator for PassthroughMigrator {
    fn migrate(
        &self,
        _ctx: &ConversionContext,
        spec: &mut UnstructuredSpec,
        target: u32,
    ) -> Result<(), MigrationError> {
        let found = dashgrade_schema::unstructured::schema_version(spec);
        if found < MINIMUM_SCHEMA_VERSION {
            return Err(MigrationError::BelowMinimum { found });
        }
        spec.insert("schemaVersion".into(), json!(target));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashgrade_schema::LATEST_SCHEMA_VERSION;
    use serde_json::Map;

    #[test]
    fn test_passthrough_stamps_target() {
        let mut spec: UnstructuredSpec = Map::new();
        spec.insert("schemaVersion".into(), json!(30));
        let ctx = ConversionContext::service("default");
        PassthroughMigrator
            .migrate(&ctx, &mut spec, LATEST_SCHEMA_VERSION)
            .unwrap();
        assert_eq!(spec["schemaVersion"], json!(LATEST_SCHEMA_VERSION));
    }

    #[test]
    fn test_pre_minimum_payload_rejected() {
        let mut spec: UnstructuredSpec = Map::new();
        spec.insert("schemaVersion".into(), json!(7));
        let ctx = ConversionContext::service("default");
        let err = PassthroughMigrator
            .migrate(&ctx, &mut spec, LATEST_SCHEMA_VERSION)
            .unwrap_err();
        assert!(matches!(err, MigrationError::BelowMinimum { found: 7 }));
        let conversion: ConversionError = err.into();
        assert!(conversion.is_user_correctable());
    }

    #[test]
    fn test_step_failure_maps_to_schema_migration() {
        let err = MigrationError::Step {
            from: 30,
            to: 31,
            step: "table-panel".into(),
            message: "unknown column type".into(),
        };
        let conversion: ConversionError = err.into();
        assert!(matches!(
            conversion,
            ConversionError::SchemaMigration { from: 30, to: 31, .. }
        ));
    }
}
