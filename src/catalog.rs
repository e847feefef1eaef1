//! Read-only view over the engine's asset catalog
//!
//! The live asset registry belongs to the engine. The core only ever talks to
//! it through [`AssetCatalog`], which keeps the resolver testable against an
//! in-memory catalog. [`InMemoryCatalog`] is also what the CLI uses, loaded
//! from an asset registry export:
//!
//! ```json
//! {
//!   "ready": true,
//!   "assets": [
//!     { "path": "/Game/Mods/Sunfall/WBP_Banner", "type": "Widget" }
//!   ]
//! }
//! ```

use crate::manifest::AssetCategory;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// What the catalog knows about an asset's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogType {
    Known(AssetCategory),
    /// The asset exists but its class maps to no supported category.
    Unknown,
}

/// Narrow query interface over the live asset catalog.
pub trait AssetCatalog {
    /// False while the catalog is still loading; results are meaningless until then.
    fn is_ready(&self) -> bool;

    fn exists(&self, path: &str) -> bool;

    /// Type of the asset at `path`, or `None` when it does not exist.
    fn type_of(&self, path: &str) -> Option<CatalogType>;
}

impl<T: AssetCatalog + ?Sized> AssetCatalog for std::sync::Arc<T> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }

    fn type_of(&self, path: &str) -> Option<CatalogType> {
        (**self).type_of(path)
    }
}

/// One row of an asset registry export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub path: String,

    /// Category name; names outside [`AssetCategory`] load as unknown types.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Asset registry export file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default = "default_ready")]
    pub ready: bool,

    #[serde(default)]
    pub assets: Vec<CatalogEntry>,
}

fn default_ready() -> bool {
    true
}

/// Asset catalog held entirely in memory.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    ready: bool,
    assets: HashMap<String, CatalogType>,
}

impl InMemoryCatalog {
    /// Create an empty, ready catalog
    pub fn new() -> Self {
        Self {
            ready: true,
            assets: HashMap::new(),
        }
    }

    /// Create a catalog that reports itself as still loading
    pub fn loading() -> Self {
        Self {
            ready: false,
            assets: HashMap::new(),
        }
    }

    /// Load an asset registry export
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&content)?;
        Ok(Self::from_file(file))
    }

    pub fn from_file(file: CatalogFile) -> Self {
        let mut catalog = Self::new();
        catalog.ready = file.ready;
        for entry in file.assets {
            let kind = AssetCategory::from_name(&entry.type_name)
                .map(CatalogType::Known)
                .unwrap_or(CatalogType::Unknown);
            catalog.assets.insert(entry.path, kind);
        }
        catalog
    }

    pub fn insert(&mut self, path: impl Into<String>, category: AssetCategory) {
        self.assets.insert(path.into(), CatalogType::Known(category));
    }

    pub fn insert_unknown(&mut self, path: impl Into<String>) {
        self.assets.insert(path.into(), CatalogType::Unknown);
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.assets.remove(path).is_some()
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetCatalog for InMemoryCatalog {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn exists(&self, path: &str) -> bool {
        self.assets.contains_key(path)
    }

    fn type_of(&self, path: &str) -> Option<CatalogType> {
        self.assets.get(path).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_queries() {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert("/Game/A", AssetCategory::Widget);
        catalog.insert_unknown("/Game/B");

        assert!(catalog.is_ready());
        assert!(catalog.exists("/Game/A"));
        assert_eq!(
            catalog.type_of("/Game/A"),
            Some(CatalogType::Known(AssetCategory::Widget))
        );
        assert_eq!(catalog.type_of("/Game/B"), Some(CatalogType::Unknown));
        assert_eq!(catalog.type_of("/Game/C"), None);

        assert!(catalog.remove("/Game/A"));
        assert!(!catalog.exists("/Game/A"));
    }

    #[test]
    fn test_from_export_file() {
        let file: CatalogFile = serde_json::from_str(
            r#"{"assets":[
                {"path":"/Game/W","type":"Widget"},
                {"path":"/Game/N","type":"NiagaraSystem"}
            ]}"#,
        )
        .unwrap();

        let catalog = InMemoryCatalog::from_file(file);
        assert!(catalog.is_ready());
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.type_of("/Game/N"), Some(CatalogType::Unknown));
    }

    #[test]
    fn test_loading_catalog_not_ready() {
        let file: CatalogFile = serde_json::from_str(r#"{"ready":false}"#).unwrap();
        assert!(!InMemoryCatalog::from_file(file).is_ready());
        assert!(!InMemoryCatalog::loading().is_ready());
    }
}
