//! Catalog provider interfaces.
//!
//! Conversion needs two read-only catalogs: the datasource instances of a
//! namespace and its shared library panels. Both sit behind traits so the
//! engine can be driven from any backing store (and mocked in tests).

use crate::context::ConversionContext;
use crate::error::Result;
use dashgrade_schema::unstructured::{self, UnstructuredSpec};
#[cfg(test)]
use mockall::automock;

/// One datasource instance of a namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasourceInfo {
    pub uid: String,
    pub ds_type: String,
    pub name: String,
    pub is_default: bool,
}

/// Snapshot of the datasource catalog for one namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasourceIndex {
    pub entries: Vec<DatasourceInfo>,
}

impl DatasourceIndex {
    pub fn new(entries: Vec<DatasourceInfo>) -> Self {
        Self { entries }
    }

    pub fn by_uid(&self, uid: &str) -> Option<&DatasourceInfo> {
        self.entries.iter().find(|e| e.uid == uid)
    }

    /// The namespace's default datasource, if one is marked.
    pub fn default_entry(&self) -> Option<&DatasourceInfo> {
        self.entries.iter().find(|e| e.is_default)
    }
}

/// One shared library panel. `model` is the stored panel JSON; conversion
/// only reads presentation hints out of it (currently the repeat variable).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryElementInfo {
    pub uid: String,
    pub name: String,
    pub model: UnstructuredSpec,
}

impl LibraryElementInfo {
    pub fn repeat_variable(&self) -> Option<&str> {
        unstructured::get_str(&self.model, "repeat")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryElementIndex {
    pub elements: Vec<LibraryElementInfo>,
}

impl LibraryElementIndex {
    pub fn new(elements: Vec<LibraryElementInfo>) -> Self {
        Self { elements }
    }

    pub fn by_uid(&self, uid: &str) -> Option<&LibraryElementInfo> {
        self.elements.iter().find(|e| e.uid == uid)
    }
}

#[cfg_attr(test, automock)]
pub trait DatasourceIndexProvider: Send + Sync {
    fn index(&self, ctx: &ConversionContext) -> Result<DatasourceIndex>;
}

#[cfg_attr(test, automock)]
pub trait LibraryElementProvider: Send + Sync {
    fn library_elements(&self, ctx: &ConversionContext) -> Result<LibraryElementIndex>;
}

/// Fixed in-memory datasource catalog, independent of namespace.
#[derive(Debug, Clone, Default)]
pub struct StaticDatasourceProvider {
    index: DatasourceIndex,
}

impl StaticDatasourceProvider {
    pub fn new(index: DatasourceIndex) -> Self {
        Self { index }
    }
}

impl DatasourceIndexProvider for StaticDatasourceProvider {
    fn index(&self, _ctx: &ConversionContext) -> Result<DatasourceIndex> {
        Ok(self.index.clone())
    }
}

/// Fixed in-memory library panel catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticLibraryElementProvider {
    index: LibraryElementIndex,
}

impl StaticLibraryElementProvider {
    pub fn new(index: LibraryElementIndex) -> Self {
        Self { index }
    }
}

impl LibraryElementProvider for StaticLibraryElementProvider {
    fn library_elements(&self, _ctx: &ConversionContext) -> Result<LibraryElementIndex> {
        Ok(self.index.clone())
    }
}
