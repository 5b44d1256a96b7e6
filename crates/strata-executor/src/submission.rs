use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use strata_registry::{ChildKind, ChildRef, LockedChild};

use crate::error::SubmissionError;

const DEFAULT_PHASE: &str = "infrastructure";

/// A fully resolved request to run one child.
///
/// Argument and env var values are flat scalars. Nested values are rejected
/// when the submission is built; callers serialize them to JSON strings
/// first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSubmission {
  stateful_id: String,
  reference: ChildRef,
  alias: String,
  kind: ChildKind,
  arguments: BTreeMap<String, Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  env_vars: Option<BTreeMap<String, Value>>,
  automation_phase: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  human_description: Option<String>,
  display: bool,
}

fn check_flat(map: &BTreeMap<String, Value>) -> Result<(), SubmissionError> {
  for (key, value) in map {
    if value.is_object() || value.is_array() {
      return Err(SubmissionError::InvalidArgument {
        key: key.clone(),
        message: "nested values must be serialized to a string".to_string(),
      });
    }
  }
  Ok(())
}

impl TaskSubmission {
  pub fn new(
    stateful_id: impl Into<String>,
    child: &LockedChild,
    arguments: BTreeMap<String, Value>,
  ) -> Result<Self, SubmissionError> {
    check_flat(&arguments)?;
    Ok(Self {
      stateful_id: stateful_id.into(),
      reference: child.reference.clone(),
      alias: child.alias.clone(),
      kind: child.kind,
      arguments,
      env_vars: None,
      automation_phase: DEFAULT_PHASE.to_string(),
      human_description: None,
      display: true,
    })
  }

  pub fn with_env_vars(mut self, env_vars: BTreeMap<String, Value>) -> Result<Self, SubmissionError> {
    check_flat(&env_vars)?;
    self.env_vars = Some(env_vars);
    Ok(self)
  }

  pub fn with_automation_phase(mut self, phase: impl Into<String>) -> Self {
    self.automation_phase = phase.into();
    self
  }

  pub fn with_human_description(mut self, description: impl Into<String>) -> Self {
    self.human_description = Some(description.into());
    self
  }

  pub fn with_display(mut self, display: bool) -> Self {
    self.display = display;
    self
  }

  pub fn stateful_id(&self) -> &str {
    &self.stateful_id
  }

  pub fn reference(&self) -> &ChildRef {
    &self.reference
  }

  pub fn alias(&self) -> &str {
    &self.alias
  }

  pub fn kind(&self) -> ChildKind {
    self.kind
  }

  pub fn arguments(&self) -> &BTreeMap<String, Value> {
    &self.arguments
  }

  pub fn env_vars(&self) -> Option<&BTreeMap<String, Value>> {
    self.env_vars.as_ref()
  }

  pub fn automation_phase(&self) -> &str {
    &self.automation_phase
  }

  pub fn human_description(&self) -> Option<&str> {
    self.human_description.as_deref()
  }

  pub fn display(&self) -> bool {
    self.display
  }

  /// Argument keys, for logging without exposing values.
  pub fn argument_keys(&self) -> Vec<&str> {
    self.arguments.keys().map(String::as_str).collect()
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn child() -> LockedChild {
    LockedChild {
      reference: "config0-publish:::config0_core::get_contents_host_file"
        .parse()
        .unwrap(),
      alias: "get_contents_host_file".to_string(),
      kind: ChildKind::Substack,
      version: None,
    }
  }

  fn args(value: Value) -> BTreeMap<String, Value> {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn test_new_submission_defaults() {
    let submission = TaskSubmission::new(
      "abc123",
      &child(),
      args(json!({"remote_file": "/var/lib/jenkins/secrets/initialAdminPassword"})),
    )
    .unwrap();

    assert_eq!(submission.alias(), "get_contents_host_file");
    assert_eq!(submission.kind(), ChildKind::Substack);
    assert_eq!(submission.automation_phase(), "infrastructure");
    assert!(submission.display());
    assert!(submission.env_vars().is_none());
  }

  #[test]
  fn test_nested_argument_rejected() {
    let err = TaskSubmission::new("abc123", &child(), args(json!({"hosts": {"all": ["1.2.3.4"]}})))
      .unwrap_err();
    assert!(matches!(err, SubmissionError::InvalidArgument { ref key, .. } if key == "hosts"));
  }

  #[test]
  fn test_nested_env_var_rejected() {
    let err = TaskSubmission::new("abc123", &child(), BTreeMap::new())
      .unwrap()
      .with_env_vars(args(json!({"ANS_VAR_hosts": ["1.2.3.4"]})))
      .unwrap_err();
    assert!(matches!(err, SubmissionError::InvalidArgument { ref key, .. } if key == "ANS_VAR_hosts"));
  }

  #[test]
  fn test_serialized_shape() {
    let submission = TaskSubmission::new("abc123", &child(), args(json!({"key": "jenkins_password"})))
      .unwrap()
      .with_human_description("Publish jenkins admin init password");

    let value = serde_json::to_value(&submission).unwrap();
    assert_eq!(value["reference"], "config0-publish:::config0_core::get_contents_host_file");
    assert_eq!(value["kind"], "substack");
    assert_eq!(value["arguments"]["key"], "jenkins_password");
    assert!(value.get("env_vars").is_none());
  }
}
