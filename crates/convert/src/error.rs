//! Conversion error types.

use dashgrade_schema::MINIMUM_SCHEMA_VERSION;

/// Errors produced while converting a dashboard between schema generations.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The numbered-schema migration engine failed while upgrading a legacy
    /// payload.
    #[error("schema migration from version {from} to {to} failed at {step}: {message}")]
    SchemaMigration {
        from: u32,
        to: u32,
        step: String,
        message: String,
    },

    /// The payload predates the oldest supported numbered schema. The owner
    /// must re-save the dashboard from a newer editor.
    #[error(
        "dashboard schema version {found} is below the supported minimum {MINIMUM_SCHEMA_VERSION}; re-save the dashboard to upgrade it"
    )]
    MinimumVersion { found: u32 },

    /// The document shape is internally inconsistent, e.g. a layout item
    /// referencing an element that does not exist.
    #[error("structural conversion failure: {0}")]
    StructuralConversion(String),

    /// The converted document lost countable content relative to its source.
    /// Carries both version identifiers and the conversion function name so
    /// log lines attribute the loss to a specific hop.
    #[error(
        "data loss detected in {conversion} ({source_version} -> {target_version}): {}",
        details.join("; ")
    )]
    DataLoss {
        conversion: String,
        source_version: String,
        target_version: String,
        details: Vec<String>,
    },
}

impl ConversionError {
    /// Whether the caller can fix the input themselves (as opposed to a bug
    /// or an unsupported document).
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::MinimumVersion { .. })
    }

    pub fn is_data_loss(&self) -> bool {
        matches!(self, Self::DataLoss { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_version_is_user_correctable() {
        let err = ConversionError::MinimumVersion { found: 7 };
        assert!(err.is_user_correctable());
        assert!(err.to_string().contains("7"));
    }

    #[test]
    fn test_data_loss_lists_all_fields() {
        let err = ConversionError::DataLoss {
            conversion: "v1_to_v2alpha".into(),
            source_version: "v1".into(),
            target_version: "v2alpha".into(),
            details: vec!["loss of 1 panels".into(), "loss of 2 queries".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("loss of 1 panels"));
        assert!(msg.contains("loss of 2 queries"));
        assert!(msg.contains("v1_to_v2alpha"));
        assert!(msg.contains("(v1 -> v2alpha)"));
        assert!(err.is_data_loss());
        assert!(!err.is_user_correctable());
    }
}
