use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_config::ChildKind;
use strata_executor::SubmissionReceipt;

/// One accepted child submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
  pub alias: String,
  pub reference: String,
  pub kind: ChildKind,
  pub receipt: SubmissionReceipt,
}

/// What a stack run hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackResult {
  pub stack: String,
  pub run_id: String,
  pub outputs: BTreeMap<String, Value>,
  pub submissions: Vec<SubmissionRecord>,
}

impl StackResult {
  /// Aliases of submitted children, in submission order.
  pub fn submitted_aliases(&self) -> Vec<&str> {
    self.submissions.iter().map(|s| s.alias.as_str()).collect()
  }
}
