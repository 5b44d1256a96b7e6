use async_trait::async_trait;

use crate::error::SubmissionError;
use crate::receipt::SubmissionReceipt;
use crate::submission::TaskSubmission;

/// Accepts task submissions on behalf of a remote runner.
///
/// Submission is fire-and-record: implementations acknowledge the request
/// and never wait for the remote work to complete.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
  async fn submit(&self, submission: &TaskSubmission) -> Result<SubmissionReceipt, SubmissionError>;
}
