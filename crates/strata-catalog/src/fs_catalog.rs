use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::catalog::ResourceCatalog;
use crate::error::CatalogError;
use crate::query::{ResourceQuery, ResourceRecord};

/// Filesystem-based resource catalog.
///
/// Records are stored as JSON files directly under the root directory. A
/// file holds either a single record or an array of records:
/// ```text
/// {root}/
/// ├── h1.json            { "resource_type": "server", "name": "h1", ... }
/// └── keys.json          [ { "resource_type": "ssh_key_pair", ... } ]
/// ```
/// Files without a `.json` extension are ignored. A missing root directory is
/// an empty catalog.
pub struct FsCatalog {
  root: PathBuf,
}

impl FsCatalog {
  /// Create a new filesystem catalog at the given root path.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Get the root directory of the catalog.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Read every record stored in one catalog file.
  async fn read_records(&self, path: &Path) -> Result<Vec<ResourceRecord>, CatalogError> {
    let content = fs::read_to_string(path).await?;
    let value: serde_json::Value =
      serde_json::from_str(&content).map_err(|source| CatalogError::InvalidRecord {
        path: path.to_path_buf(),
        source,
      })?;

    let records = if value.is_array() {
      serde_json::from_value::<Vec<ResourceRecord>>(value)
    } else {
      serde_json::from_value::<ResourceRecord>(value).map(|record| vec![record])
    };

    records.map_err(|source| CatalogError::InvalidRecord {
      path: path.to_path_buf(),
      source,
    })
  }
}

#[async_trait]
impl ResourceCatalog for FsCatalog {
  async fn search(&self, query: &ResourceQuery) -> Result<Vec<ResourceRecord>, CatalogError> {
    let mut matching = Vec::new();

    if !self.root.exists() {
      return Ok(matching);
    }

    let mut entries = fs::read_dir(&self.root).await?;
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
        continue;
      }

      for record in self.read_records(&path).await? {
        if record.matches(query) {
          matching.push(record);
        }
      }
    }

    Ok(matching)
  }
}
