use std::fmt;

use serde::{Deserialize, Serialize};

/// Advisory type constraint attached to a variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeHint {
  #[serde(alias = "string")]
  Str,
  #[serde(alias = "boolean")]
  Bool,
  #[serde(alias = "integer")]
  Int,
  #[serde(alias = "array")]
  List,
  #[serde(alias = "object")]
  Dict,
}

impl fmt::Display for TypeHint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      TypeHint::Str => "str",
      TypeHint::Bool => "bool",
      TypeHint::Int => "int",
      TypeHint::List => "list",
      TypeHint::Dict => "dict",
    };
    f.write_str(name)
  }
}

/// Whether a child is a leaf task template or a nested stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildKind {
  Execgroup,
  Substack,
}

impl fmt::Display for ChildKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ChildKind::Execgroup => f.write_str("execgroup"),
      ChildKind::Substack => f.write_str("substack"),
    }
  }
}
