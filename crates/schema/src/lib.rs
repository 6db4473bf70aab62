//! Versioned dashboard data model.
//!
//! This crate defines the four dashboard schema generations and the types
//! they share: two unstructured generations carried as ordered JSON mappings
//! and two fully typed ones. Conversion between generations lives in the
//! companion `dashgrade-convert` crate.

pub mod common;
pub mod envelope;
pub mod layout;
pub mod meta;
pub mod unstructured;
pub mod v2alpha;
pub mod v2beta;
pub mod variables;
mod version;

pub use common::{
    AdhocFilter, AnnotationPanelFilter, CursorSync, DashboardLink, DataLink, DatasourceRef,
    LibraryPanelRef, MatcherConfig, QueryOptions, RepeatDirection, RepeatOptions, RowRepeatOptions,
    StringOrArrayOfString, TimeRangeOption, TimeSettings, Transformation, VariableHide,
    VariableOption, VariableRefresh, VariableSort,
};
pub use envelope::{
    DashboardV0, DashboardV1, DashboardV2Alpha, DashboardV2Beta, VersionedDashboard,
};
pub use layout::{
    AutoGridItem, AutoGridLayout, AutoGridRowHeight, ElementRef, GridItem, GridLayout, Layout,
    LayoutRow, LayoutTab, RowsLayout, TabsLayout,
};
pub use meta::{ConversionStatus, ObjectMeta};
pub use unstructured::UnstructuredSpec;
pub use version::{
    DashboardVersion, LATEST_SCHEMA_VERSION, MINIMUM_SCHEMA_VERSION, UnknownVersion,
};
