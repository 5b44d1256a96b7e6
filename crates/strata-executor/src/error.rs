//! Task submission errors.

/// Errors that can occur while submitting a child.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
  /// The executor refused the submission.
  #[error("submission of '{alias}' rejected: {reason}")]
  Rejected { alias: String, reason: String },

  /// A stateful ID was issued twice within one run.
  #[error("stateful id '{stateful_id}' already in use")]
  DuplicateStatefulId { stateful_id: String },

  /// A supplied stateful ID is empty, too long or outside `[a-z0-9]`.
  #[error("invalid stateful id '{stateful_id}': expected 1 to {max} lowercase letters or digits")]
  InvalidStatefulId { stateful_id: String, max: usize },

  /// An argument or env var value is not a flat scalar.
  #[error("invalid argument '{key}': {message}")]
  InvalidArgument { key: String, message: String },

  /// Requested stateful ID size is out of range.
  #[error("invalid stateful id size {size}, expected 1..={max}")]
  InvalidSize { size: usize, max: usize },

  /// No unused ID of the requested size could be drawn.
  #[error("could not draw an unused stateful id of size {size}")]
  IdSpaceExhausted { size: usize },

  /// IO error when writing to a spool.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// Failed to serialize or parse a spooled submission.
  #[error("serialization error: {0}")]
  Serialize(#[from] serde_json::Error),
}
