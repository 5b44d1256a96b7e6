use std::collections::BTreeMap;

use serde_json::Value;
use strata_config::ChildKind;
use strata_registry::{ChildRef, LockedChild};

/// Everything needed to submit one child.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildInsert {
  pub display: bool,
  pub arguments: BTreeMap<String, Value>,
  pub automation_phase: String,
  pub human_description: Option<String>,
  /// Generated when absent.
  pub stateful_id: Option<String>,
  pub env_vars: Option<BTreeMap<String, Value>>,
}

impl Default for ChildInsert {
  fn default() -> Self {
    Self {
      display: true,
      arguments: BTreeMap::new(),
      automation_phase: "infrastructure".to_string(),
      human_description: None,
      stateful_id: None,
      env_vars: None,
    }
  }
}

impl ChildInsert {
  pub fn new(arguments: BTreeMap<String, Value>) -> Self {
    Self {
      arguments,
      ..Self::default()
    }
  }

  pub fn with_human_description(mut self, description: impl Into<String>) -> Self {
    self.human_description = Some(description.into());
    self
  }

  pub fn with_automation_phase(mut self, phase: impl Into<String>) -> Self {
    self.automation_phase = phase.into();
    self
  }

  pub fn with_stateful_id(mut self, stateful_id: impl Into<String>) -> Self {
    self.stateful_id = Some(stateful_id.into());
    self
  }

  pub fn with_env_vars(mut self, env_vars: BTreeMap<String, Value>) -> Self {
    self.env_vars = Some(env_vars);
    self
  }

  pub fn with_display(mut self, display: bool) -> Self {
    self.display = display;
    self
  }
}

/// A registered child and, once its phase ran, its locked template.
#[derive(Debug, Clone)]
pub(crate) struct ChildSlot {
  pub reference: ChildRef,
  pub kind: ChildKind,
  pub locked: Option<LockedChild>,
}

impl ChildSlot {
  pub fn alias(&self) -> &str {
    self.reference.alias()
  }
}
