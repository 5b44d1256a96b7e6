use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by catalog backends and by query construction.
#[derive(Debug, Error)]
pub enum CatalogError {
  /// Resource type is not one of the known kinds.
  #[error("unsupported resource type: {kind}")]
  UnsupportedResourceKind { kind: String },

  /// Label selectors must not be blank.
  #[error("label selector must not be empty")]
  EmptyLabelSelector,

  /// IO error while reading catalog files.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// A catalog file did not contain valid records.
  #[error("invalid resource record in {}: {source}", path.display())]
  InvalidRecord {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Errors raised while resolving a query to concrete resources.
#[derive(Debug, Error)]
pub enum ResolutionError {
  /// A `must_be_one` query matched nothing.
  #[error("no resource matched {query} (expected exactly one, found 0)")]
  NotFound { query: String },

  /// A `must_be_one` query matched more than one record.
  #[error("ambiguous resource query {query} (expected exactly one, found {count})")]
  Ambiguous { count: usize, query: String },

  /// The matched record lacks the requested attribute.
  #[error("resource '{name}' has no attribute '{attribute}'")]
  MissingAttribute { name: String, attribute: String },

  /// The catalog itself failed.
  #[error("catalog error: {0}")]
  Catalog(#[from] CatalogError),
}

impl ResolutionError {
  /// Number of matches that triggered a cardinality failure, if any.
  pub fn match_count(&self) -> Option<usize> {
    match self {
      ResolutionError::NotFound { .. } => Some(0),
      ResolutionError::Ambiguous { count, .. } => Some(*count),
      _ => None,
    }
  }
}
