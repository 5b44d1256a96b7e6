use strata_catalog::ResolutionError;
use strata_config::ChildKind;
use strata_executor::SubmissionError;
use strata_registry::RegistryError;
use strata_schema::SchemaError;
use thiserror::Error;

use crate::phase::Phase;

/// Errors that can occur while composing or running a stack.
#[derive(Debug, Error)]
pub enum StackError {
  #[error(transparent)]
  Schema(#[from] SchemaError),

  #[error(transparent)]
  Resolution(#[from] ResolutionError),

  #[error(transparent)]
  Submission(#[from] SubmissionError),

  #[error(transparent)]
  Registry(#[from] RegistryError),

  /// An operation was called in the wrong lifecycle phase.
  #[error("{operation} requires phase {expected}, stack is {actual}")]
  PhaseOrder {
    operation: &'static str,
    expected: Phase,
    actual: Phase,
  },

  /// Two children share the same alias.
  #[error("child '{alias}' is already registered")]
  DuplicateChild { alias: String },

  /// A child reference could not be parsed.
  #[error("invalid child reference '{reference}': {message}")]
  InvalidReference { reference: String, message: String },

  /// A child reference is not known to the template registry.
  #[error("child template not found: {reference}")]
  ChildNotFound { reference: String },

  /// A child reference resolves to the other kind of child.
  #[error("child {reference} is a {actual}, registered as {expected}")]
  ChildKind {
    reference: String,
    expected: ChildKind,
    actual: ChildKind,
  },

  /// No child with this alias was registered.
  #[error("no child registered as '{alias}'")]
  UnknownChild { alias: String },

  /// A child registered before the last submitted one was inserted.
  #[error("child '{alias}' cannot be submitted after '{last}'")]
  OutOfOrder { alias: String, last: String },

  /// An earlier submission failed; the stack accepts no further children.
  #[error("stack aborted after failed submission of '{alias}'")]
  Aborted { alias: String },

  /// `set_variable` on a variable that already has a value.
  #[error("variable '{name}' is already resolved and cannot be changed")]
  VariableAlreadyResolved { name: String },

  /// An argument, env var or output template failed to render.
  #[error("template for '{name}' failed to render: {source}")]
  Template {
    name: String,
    #[source]
    source: minijinja::Error,
  },

  /// A stack definition is inconsistent.
  #[error("invalid stack definition: {message}")]
  InvalidDefinition { message: String },
}

impl StackError {
  /// Map registry failures onto the composition errors callers match on.
  pub(crate) fn from_registry(error: RegistryError) -> Self {
    match error {
      RegistryError::InvalidReference { reference, message } => {
        StackError::InvalidReference { reference, message }
      }
      RegistryError::NotFound { reference } => StackError::ChildNotFound { reference },
      RegistryError::KindMismatch {
        reference,
        expected,
        actual,
      } => StackError::ChildKind {
        reference,
        expected,
        actual,
      },
      other => StackError::Registry(other),
    }
  }

  pub(crate) fn from_schema(error: SchemaError) -> Self {
    match error {
      SchemaError::VariableAlreadyResolved { name } => StackError::VariableAlreadyResolved { name },
      other => StackError::Schema(other),
    }
  }
}
