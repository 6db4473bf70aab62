//! Versioned dashboard envelopes and the routing enum over them.

use crate::meta::{ConversionStatus, ObjectMeta};
use crate::unstructured::{self, UnstructuredSpec};
use crate::version::DashboardVersion;
use crate::{v2alpha, v2beta};
use serde::{Deserialize, Serialize};

/// Oldest generation: free-form payload at any numbered schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardV0 {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: UnstructuredSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ConversionStatus>,
}

/// Free-form payload migrated to the latest numbered schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardV1 {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: UnstructuredSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ConversionStatus>,
}

impl DashboardV0 {
    pub fn schema_version(&self) -> u32 {
        unstructured::schema_version(&self.spec)
    }
}

impl DashboardV1 {
    pub fn schema_version(&self) -> u32 {
        unstructured::schema_version(&self.spec)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardV2Alpha {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: v2alpha::DashboardSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ConversionStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardV2Beta {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: v2beta::DashboardSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ConversionStatus>,
}

/// A dashboard at any generation, tagged on the wire by `apiVersion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "apiVersion")]
pub enum VersionedDashboard {
    #[serde(rename = "v0")]
    V0(DashboardV0),
    #[serde(rename = "v1")]
    V1(DashboardV1),
    #[serde(rename = "v2alpha")]
    V2Alpha(DashboardV2Alpha),
    #[serde(rename = "v2beta")]
    V2Beta(DashboardV2Beta),
}

impl VersionedDashboard {
    pub fn version(&self) -> DashboardVersion {
        match self {
            Self::V0(_) => DashboardVersion::V0,
            Self::V1(_) => DashboardVersion::V1,
            Self::V2Alpha(_) => DashboardVersion::V2Alpha,
            Self::V2Beta(_) => DashboardVersion::V2Beta,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::V0(d) => &d.metadata,
            Self::V1(d) => &d.metadata,
            Self::V2Alpha(d) => &d.metadata,
            Self::V2Beta(d) => &d.metadata,
        }
    }

    pub fn status(&self) -> Option<&ConversionStatus> {
        match self {
            Self::V0(d) => d.status.as_ref(),
            Self::V1(d) => d.status.as_ref(),
            Self::V2Alpha(d) => d.status.as_ref(),
            Self::V2Beta(d) => d.status.as_ref(),
        }
    }

    pub fn set_status(&mut self, status: ConversionStatus) {
        let slot = match self {
            Self::V0(d) => &mut d.status,
            Self::V1(d) => &mut d.status,
            Self::V2Alpha(d) => &mut d.status,
            Self::V2Beta(d) => &mut d.status,
        };
        *slot = Some(status);
    }
}
