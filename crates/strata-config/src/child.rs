use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::ChildKind;
use crate::value::ArgValue;

/// A child of a stack together with the submission it produces.
///
/// Children are submitted in the order they appear in the definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildDef {
  pub kind: ChildKind,

  /// Registry reference, e.g. "williaumwu:::demo1-jenkins::jenkins_with_docker".
  #[serde(rename = "ref")]
  pub reference: String,

  pub human_description: String,

  #[serde(default = "default_automation_phase")]
  pub automation_phase: String,

  #[serde(default = "default_display")]
  pub display: bool,

  #[serde(default)]
  pub arguments: BTreeMap<String, ArgValue>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub env_vars: Option<BTreeMap<String, ArgValue>>,
}

/// Child output keys copied into the parent's outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReexportDef {
  /// Child alias (last segment of its reference).
  pub child: String,
  pub keys: Vec<String>,
}

fn default_automation_phase() -> String {
  "infrastructure".to_string()
}

fn default_display() -> bool {
  true
}
