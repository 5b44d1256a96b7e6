use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::error::SubmissionError;
use crate::executor::TaskExecutor;
use crate::receipt::SubmissionReceipt;
use crate::submission::TaskSubmission;

#[derive(Debug, Default)]
struct Log {
  submissions: Vec<TaskSubmission>,
  receipts: HashMap<String, SubmissionReceipt>,
}

/// An executor that accepts everything and remembers it.
///
/// Canned outputs and rejections can be configured per alias, which makes it
/// a convenient spy in tests and the backend for dry runs.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
  log: Mutex<Log>,
  outputs: HashMap<String, BTreeMap<String, Value>>,
  rejections: HashMap<String, String>,
}

impl RecordingExecutor {
  pub fn new() -> Self {
    Self::default()
  }

  /// Report these outputs in the receipt of every submission for `alias`.
  pub fn with_outputs(mut self, alias: impl Into<String>, outputs: BTreeMap<String, Value>) -> Self {
    self.outputs.insert(alias.into(), outputs);
    self
  }

  /// Reject every submission for `alias`.
  pub fn rejecting(mut self, alias: impl Into<String>, reason: impl Into<String>) -> Self {
    self.rejections.insert(alias.into(), reason.into());
    self
  }

  /// All accepted submissions, in the order they arrived.
  pub fn submissions(&self) -> Vec<TaskSubmission> {
    self
      .log
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .submissions
      .clone()
  }

  /// Aliases of accepted submissions, in the order they arrived.
  pub fn aliases(&self) -> Vec<String> {
    self
      .submissions()
      .iter()
      .map(|s| s.alias().to_string())
      .collect()
  }
}

#[async_trait]
impl TaskExecutor for RecordingExecutor {
  #[instrument(
    name = "task_submit",
    skip(self, submission),
    fields(
      stateful_id = %submission.stateful_id(),
      alias = %submission.alias(),
    )
  )]
  async fn submit(&self, submission: &TaskSubmission) -> Result<SubmissionReceipt, SubmissionError> {
    if let Some(reason) = self.rejections.get(submission.alias()) {
      warn!(reason = %reason, "submission rejected");
      return Err(SubmissionError::Rejected {
        alias: submission.alias().to_string(),
        reason: reason.clone(),
      });
    }

    let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(previous) = log.receipts.get(submission.stateful_id()) {
      let same = log
        .submissions
        .iter()
        .any(|s| s.stateful_id() == submission.stateful_id() && s == submission);
      if !same {
        return Err(SubmissionError::Rejected {
          alias: submission.alias().to_string(),
          reason: format!(
            "stateful id '{}' was already used for a different submission",
            submission.stateful_id()
          ),
        });
      }

      let mut receipt = previous.clone();
      receipt.resubmission = true;
      info!("resubmission recorded");
      return Ok(receipt);
    }

    let mut receipt = SubmissionReceipt::accepted(submission.stateful_id(), submission.alias());
    receipt.outputs = self.outputs.get(submission.alias()).cloned();

    log.submissions.push(submission.clone());
    log
      .receipts
      .insert(submission.stateful_id().to_string(), receipt.clone());

    info!(arguments = ?submission.argument_keys(), "submission recorded");
    Ok(receipt)
  }
}
