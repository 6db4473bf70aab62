//! Dashboard schema generations and the numbered legacy schema constants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest numbered schema a legacy payload can be migrated to. A payload at
/// this number is what the latest-numbered generation stores.
pub const LATEST_SCHEMA_VERSION: u32 = 41;

/// Oldest numbered schema the migration engine still accepts. Payloads below
/// this must be re-saved from a newer editor before conversion.
pub const MINIMUM_SCHEMA_VERSION: u32 = 13;

/// The four dashboard schema generations, oldest to newest.
///
/// `V0` and `V1` are unstructured (free-form JSON payload, distinguished by
/// the embedded numbered `schemaVersion`); `V2Alpha` and `V2Beta` are fully
/// structured. Ordering follows generation age, so `V0 < V2Beta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DashboardVersion {
    #[serde(rename = "v0")]
    V0,
    #[serde(rename = "v1")]
    V1,
    #[serde(rename = "v2alpha")]
    V2Alpha,
    #[serde(rename = "v2beta")]
    V2Beta,
}

impl DashboardVersion {
    /// Wire name, also used as the `stored_version` status value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V0 => "v0",
            Self::V1 => "v1",
            Self::V2Alpha => "v2alpha",
            Self::V2Beta => "v2beta",
        }
    }

    /// Whether the payload for this generation is a free-form JSON mapping.
    pub fn is_unstructured(&self) -> bool {
        matches!(self, Self::V0 | Self::V1)
    }

    pub const ALL: [DashboardVersion; 4] = [Self::V0, Self::V1, Self::V2Alpha, Self::V2Beta];
}

impl fmt::Display for DashboardVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized version names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dashboard version: {0}")]
pub struct UnknownVersion(pub String);

impl FromStr for DashboardVersion {
    type Err = UnknownVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v0" => Ok(Self::V0),
            "v1" => Ok(Self::V1),
            "v2alpha" => Ok(Self::V2Alpha),
            "v2beta" => Ok(Self::V2Beta),
            other => Err(UnknownVersion(other.to_string())),
        }
    }
}
