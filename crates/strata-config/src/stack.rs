use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::child::{ChildDef, ReexportDef};
use crate::value::ArgValue;
use crate::variable::VariableDef;

/// A declarative stack definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackDef {
  pub name: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,

  #[serde(default)]
  pub variables: Vec<VariableDef>,

  #[serde(default)]
  pub children: Vec<ChildDef>,

  /// Published after every child has been submitted.
  #[serde(default)]
  pub outputs: BTreeMap<String, ArgValue>,

  #[serde(default)]
  pub reexports: Vec<ReexportDef>,
}
