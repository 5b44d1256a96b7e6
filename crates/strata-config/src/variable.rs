use serde::{Deserialize, Serialize};

use crate::enums::TypeHint;

/// A variable declaration in a stack definition.
///
/// At most one of `lookup` and `template` may be set; they are the two
/// declarative fallback strategies applied when neither the caller nor the
/// default provides a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDef {
  pub name: String,

  #[serde(default)]
  pub required: bool,

  /// `null` is the same as no default.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default: Option<serde_json::Value>,

  #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
  pub type_hint: Option<TypeHint>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lookup: Option<LookupDef>,

  /// Minijinja template rendered against the variables resolved so far.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub template: Option<String>,
}

/// A resource catalog lookup used as a variable fallback.
///
/// `resource_type` and `name` are templates, so they can follow other
/// variables (e.g. `"{{ resource_type_hostname }}"`, `"{{ hostname }}"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupDef {
  pub resource_type: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,

  /// Opaque label selector, e.g. "project:::self::default".
  pub labels: String,

  /// Attribute of the matched record that becomes the variable value.
  pub attribute: String,

  #[serde(default = "default_must_be_one")]
  pub must_be_one: bool,
}

fn default_must_be_one() -> bool {
  true
}
