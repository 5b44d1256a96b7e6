use async_trait::async_trait;

use crate::error::CatalogError;
use crate::query::{ResourceQuery, ResourceRecord};

/// Read-only inventory of provisioned resources.
///
/// Implementations return every record matching the query's kind, label
/// selector and (when set) name. Cardinality checks are not the backend's
/// job; see [`crate::ResourceResolver`].
#[async_trait]
pub trait ResourceCatalog: Send + Sync {
  async fn search(&self, query: &ResourceQuery) -> Result<Vec<ResourceRecord>, CatalogError>;
}
