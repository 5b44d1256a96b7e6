use async_trait::async_trait;

use crate::catalog::ResourceCatalog;
use crate::error::CatalogError;
use crate::query::{ResourceQuery, ResourceRecord};

/// A catalog backed by a fixed list of records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
  records: Vec<ResourceRecord>,
}

impl InMemoryCatalog {
  pub fn new(records: Vec<ResourceRecord>) -> Self {
    Self { records }
  }

  pub fn with_record(mut self, record: ResourceRecord) -> Self {
    self.records.push(record);
    self
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}

#[async_trait]
impl ResourceCatalog for InMemoryCatalog {
  async fn search(&self, query: &ResourceQuery) -> Result<Vec<ResourceRecord>, CatalogError> {
    Ok(
      self
        .records
        .iter()
        .filter(|record| record.matches(query))
        .cloned()
        .collect(),
    )
  }
}
