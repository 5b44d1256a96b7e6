use strata_catalog::{CatalogError, ResolutionError};
use strata_config::TypeHint;
use thiserror::Error;

/// Errors raised while declaring or resolving stack variables.
///
/// All of these are fatal for the stack: they surface before any child is
/// submitted.
#[derive(Debug, Error)]
pub enum SchemaError {
  /// The same variable name was declared twice.
  #[error("variable '{name}' is already declared")]
  DuplicateVariable { name: String },

  /// A fallback was attached to an undeclared variable.
  #[error("variable '{name}' is not declared")]
  UnknownVariable { name: String },

  /// A required variable has no supplied value, default or fallback result.
  #[error("required variable '{name}' has no value")]
  MissingRequiredVariable { name: String },

  /// A value does not satisfy the declaration's type hint.
  #[error("variable '{name}' expected {expected}, got {actual}")]
  InvalidVariableType {
    name: String,
    expected: TypeHint,
    actual: String,
  },

  /// Catalog lookup for a fallback failed.
  #[error("resource lookup for variable '{name}' failed: {source}")]
  ResourceResolution {
    name: String,
    #[source]
    source: ResolutionError,
  },

  /// A lookup template produced an invalid query.
  #[error("invalid lookup for variable '{name}': {source}")]
  InvalidLookup {
    name: String,
    #[source]
    source: CatalogError,
  },

  /// A computed fallback failed.
  #[error("computing variable '{name}' failed: {message}")]
  Computed { name: String, message: String },

  /// A template failed to render.
  #[error("template for '{name}' failed to render: {source}")]
  Template {
    name: String,
    #[source]
    source: minijinja::Error,
  },

  /// A resolved variable may not be replaced.
  #[error("variable '{name}' is already resolved and cannot be changed")]
  VariableAlreadyResolved { name: String },

  /// Invocation inputs must be a flat map of scalars.
  #[error("invalid input '{key}': {message}")]
  InvalidInput { key: String, message: String },
}
