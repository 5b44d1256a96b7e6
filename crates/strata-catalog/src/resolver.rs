use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::catalog::ResourceCatalog;
use crate::error::ResolutionError;
use crate::query::{ResourceQuery, ResourceRecord};

/// Executes queries against a catalog and enforces cardinality.
///
/// Results are ordered by resource name so identical queries against an
/// unchanged catalog always return identical sequences, whatever order the
/// backend produced them in.
#[derive(Clone)]
pub struct ResourceResolver {
  catalog: Arc<dyn ResourceCatalog>,
}

impl ResourceResolver {
  /// Create a resolver over the given catalog.
  pub fn new(catalog: Arc<dyn ResourceCatalog>) -> Self {
    Self { catalog }
  }

  /// Run a query.
  ///
  /// When `must_be_one` is set, anything other than exactly one match is an
  /// error.
  #[instrument(name = "resource_query", skip(self, query), fields(query = %query))]
  pub async fn query(&self, query: &ResourceQuery) -> Result<Vec<ResourceRecord>, ResolutionError> {
    let mut records = self.catalog.search(query).await?;
    records.sort_by(|a, b| a.name.cmp(&b.name));

    debug!(matches = records.len(), "resource query finished");

    if query.must_be_one && records.len() != 1 {
      warn!(matches = records.len(), "resource query expected exactly one match");
      return Err(match records.len() {
        0 => ResolutionError::NotFound {
          query: query.to_string(),
        },
        count => ResolutionError::Ambiguous {
          count,
          query: query.to_string(),
        },
      });
    }

    Ok(records)
  }

  /// Run a query that must match exactly one record and return it.
  pub async fn query_one(&self, query: &ResourceQuery) -> Result<ResourceRecord, ResolutionError> {
    let query = query.clone().must_be_one();
    let mut records = self.query(&query).await?;
    // query() guarantees exactly one record here
    Ok(records.remove(0))
  }

  /// Look up a single attribute of the one record matching `query`.
  pub async fn lookup_attribute(
    &self,
    query: &ResourceQuery,
    attribute: &str,
  ) -> Result<serde_json::Value, ResolutionError> {
    let record = self.query_one(query).await?;
    record
      .attribute(attribute)
      .cloned()
      .ok_or_else(|| ResolutionError::MissingAttribute {
        name: record.name.clone(),
        attribute: attribute.to_string(),
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{InMemoryCatalog, LabelSelector, ResourceKind};

  fn server(name: &str, ip: &str) -> ResourceRecord {
    ResourceRecord::new(ResourceKind::Server, name)
      .with_label(LabelSelector::project_default())
      .with_attribute("public_ip", ip)
  }

  fn resolver(records: Vec<ResourceRecord>) -> ResourceResolver {
    ResourceResolver::new(Arc::new(InMemoryCatalog::new(records)))
  }

  fn server_query() -> ResourceQuery {
    ResourceQuery::new(ResourceKind::Server, LabelSelector::project_default())
  }

  #[tokio::test]
  async fn test_must_be_one_single_match() {
    let resolver = resolver(vec![server("h1", "1.2.3.4"), server("h2", "5.6.7.8")]);
    let query = server_query().named("h1").must_be_one();

    let records = resolver.query(&query).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].attribute("public_ip").unwrap(), "1.2.3.4");
  }

  #[tokio::test]
  async fn test_must_be_one_zero_matches() {
    let resolver = resolver(vec![server("h2", "5.6.7.8")]);
    let query = server_query().named("h1").must_be_one();

    let err = resolver.query(&query).await.unwrap_err();
    assert!(matches!(err, ResolutionError::NotFound { .. }));
    assert_eq!(err.match_count(), Some(0));
    assert!(err.to_string().contains("name: h1"));
  }

  #[tokio::test]
  async fn test_must_be_one_ambiguous() {
    let resolver = resolver(vec![server("h1", "1.2.3.4"), server("h1", "9.9.9.9")]);
    let query = server_query().named("h1").must_be_one();

    let err = resolver.query(&query).await.unwrap_err();
    assert!(matches!(err, ResolutionError::Ambiguous { count: 2, .. }));
  }

  #[tokio::test]
  async fn test_many_matches_without_must_be_one() {
    let resolver = resolver(vec![server("h2", "5.6.7.8"), server("h1", "1.2.3.4")]);

    let records = resolver.query(&server_query()).await.unwrap();
    let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["h1", "h2"]);
  }

  #[tokio::test]
  async fn test_query_is_idempotent() {
    let resolver = resolver(vec![server("h2", "5.6.7.8"), server("h1", "1.2.3.4")]);

    let first = resolver.query(&server_query()).await.unwrap();
    let second = resolver.query(&server_query()).await.unwrap();
    assert_eq!(first, second);
  }

  #[tokio::test]
  async fn test_lookup_attribute() {
    let resolver = resolver(vec![server("h1", "1.2.3.4")]);

    let ip = resolver
      .lookup_attribute(&server_query().named("h1"), "public_ip")
      .await
      .unwrap();
    assert_eq!(ip, "1.2.3.4");

    let err = resolver
      .lookup_attribute(&server_query().named("h1"), "private_ip")
      .await
      .unwrap_err();
    assert!(matches!(err, ResolutionError::MissingAttribute { .. }));
  }
}
