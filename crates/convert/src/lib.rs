//! Dashboard schema-version conversion engine.
//!
//! Converts dashboards between four generations: two unstructured ones
//! (free-form JSON payloads distinguished by a numbered `schemaVersion`) and
//! two structured ones (typed element map plus layout tree). The
//! [`Converter`] routes between them through single-generation hops, audits
//! each hop for data loss, and records the outcome in the document's
//! conversion status.

pub mod cache;
pub mod context;
pub mod error;
pub mod layout;
pub mod migrate;
pub mod orchestrator;
pub mod provider;
pub mod resolve;
pub mod stats;
pub mod v1_to_v2alpha;
pub mod v2alpha_to_v1;
pub mod v2alpha_v2beta;

pub use cache::{CachedDatasourceProvider, CachedLibraryElementProvider};
pub use context::{ConversionContext, ExecutionIdentity};
pub use error::{ConversionError, Result};
pub use migrate::{MigrationError, PassthroughMigrator, SchemaMigrator};
pub use orchestrator::{Converter, NOT_IMPLEMENTED_MESSAGE};
pub use provider::{
    DatasourceIndex, DatasourceIndexProvider, DatasourceInfo, LibraryElementIndex,
    LibraryElementInfo, LibraryElementProvider, StaticDatasourceProvider,
    StaticLibraryElementProvider,
};
pub use stats::{
    DashboardStats, collect_stats_unstructured, collect_stats_v2alpha, collect_stats_v2beta,
    detect_data_loss,
};
pub use v1_to_v2alpha::convert_v1_to_v2alpha;
pub use v2alpha_to_v1::convert_v2alpha_to_v1;
pub use v2alpha_v2beta::{convert_v2alpha_to_v2beta, convert_v2beta_to_v2alpha};
