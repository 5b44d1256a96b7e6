use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Acknowledgement returned by an executor for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
  pub stateful_id: String,
  pub alias: String,
  pub accepted_at: DateTime<Utc>,
  /// True when the executor had already accepted this exact submission.
  #[serde(default)]
  pub resubmission: bool,
  /// Outputs reported back by the child, if the executor knows them.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub outputs: Option<BTreeMap<String, serde_json::Value>>,
}

impl SubmissionReceipt {
  pub fn accepted(stateful_id: impl Into<String>, alias: impl Into<String>) -> Self {
    Self {
      stateful_id: stateful_id.into(),
      alias: alias.into(),
      accepted_at: Utc::now(),
      resubmission: false,
      outputs: None,
    }
  }
}
