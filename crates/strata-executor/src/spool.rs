use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::error::SubmissionError;
use crate::executor::TaskExecutor;
use crate::ids::validate_stateful_id;
use crate::receipt::SubmissionReceipt;
use crate::submission::TaskSubmission;

/// On-disk form of a spooled submission.
#[derive(Debug, Serialize, Deserialize)]
struct SpoolEntry {
  accepted_at: DateTime<Utc>,
  submission: Value,
}

/// Hands submissions to an external runner through a spool directory.
///
/// ```text
/// {root}/
/// ├── k3v9q0xw2a.json
/// └── 7hd02mzq1c.json
/// ```
///
/// Each file holds the submission and the time it was accepted. Submitting
/// the same stateful ID again with identical content is reported as a
/// resubmission; different content under the same ID is rejected.
pub struct SpoolExecutor {
  root: PathBuf,
}

impl SpoolExecutor {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn entry_path(&self, stateful_id: &str) -> Result<PathBuf, SubmissionError> {
    validate_stateful_id(stateful_id)?;
    Ok(self.root.join(format!("{stateful_id}.json")))
  }
}

#[async_trait]
impl TaskExecutor for SpoolExecutor {
  #[instrument(
    name = "task_submit",
    skip(self, submission),
    fields(
      stateful_id = %submission.stateful_id(),
      alias = %submission.alias(),
    )
  )]
  async fn submit(&self, submission: &TaskSubmission) -> Result<SubmissionReceipt, SubmissionError> {
    let path = self.entry_path(submission.stateful_id())?;
    let payload = serde_json::to_value(submission)?;

    if fs::try_exists(&path).await? {
      let existing: SpoolEntry = serde_json::from_str(&fs::read_to_string(&path).await?)?;
      if existing.submission != payload {
        warn!(path = %path.display(), "conflicting spool entry");
        return Err(SubmissionError::Rejected {
          alias: submission.alias().to_string(),
          reason: format!("spool entry {} holds a different submission", path.display()),
        });
      }

      info!(path = %path.display(), "resubmission already spooled");
      return Ok(SubmissionReceipt {
        stateful_id: submission.stateful_id().to_string(),
        alias: submission.alias().to_string(),
        accepted_at: existing.accepted_at,
        resubmission: true,
        outputs: None,
      });
    }

    fs::create_dir_all(&self.root).await?;

    let receipt = SubmissionReceipt::accepted(submission.stateful_id(), submission.alias());
    let entry = SpoolEntry {
      accepted_at: receipt.accepted_at,
      submission: payload,
    };
    fs::write(&path, serde_json::to_string_pretty(&entry)?).await?;

    info!(
      path = %path.display(),
      arguments = ?submission.argument_keys(),
      "submission spooled"
    );
    Ok(receipt)
  }
}
