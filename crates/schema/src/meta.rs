//! Envelope metadata shared by every dashboard generation.

use serde::{Deserialize, Serialize};

/// Object identity carried alongside the spec payload. Owned by the storage
/// layer; conversion copies it verbatim and never rewrites it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(rename = "resourceVersion", default)]
    pub resource_version: String,
}

/// Outcome record stamped on every conversion target, success or failure.
///
/// `stored_version` always names the version the document was originally
/// stored as, even on intermediate hops of a chained conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStatus {
    #[serde(rename = "storedVersion", default)]
    pub stored_version: String,
    #[serde(default)]
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionStatus {
    pub fn success(stored_version: &str) -> Self {
        Self {
            stored_version: stored_version.to_string(),
            failed: false,
            error: None,
        }
    }

    pub fn failure(stored_version: &str, error: impl Into<String>) -> Self {
        Self {
            stored_version: stored_version.to_string(),
            failed: true,
            error: Some(error.into()),
        }
    }
}
