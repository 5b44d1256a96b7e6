use strata_config::ChildKind;
use thiserror::Error;

/// Errors that can occur when working with the template registry.
#[derive(Debug, Error)]
pub enum RegistryError {
  /// Reference is not of the form `owner:::name` or `owner:::repo::name`.
  #[error("invalid child reference '{reference}': {message}")]
  InvalidReference { reference: String, message: String },

  /// Template not found in the registry.
  #[error("template not found: {reference}")]
  NotFound { reference: String },

  /// Template exists but is not of the expected kind.
  #[error("template {reference} is a {actual}, expected a {expected}")]
  KindMismatch {
    reference: String,
    expected: ChildKind,
    actual: ChildKind,
  },

  /// IO error when reading/writing manifest files.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// Failed to parse manifest JSON.
  #[error("invalid manifest: {0}")]
  InvalidManifest(#[from] serde_json::Error),

  /// Template already exists in the registry.
  #[error("template already exists: {reference}")]
  AlreadyExists { reference: String },
}
