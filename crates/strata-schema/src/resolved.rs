use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::SchemaError;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
  Supplied,
  /// Supplied by the caller without a matching declaration.
  PassedThrough,
  Default,
  Lookup,
  Computed,
  /// Set by the stack after resolution via `set_variable`.
  Injected,
  /// Optional variable left without a value.
  Unset,
}

/// A declaration's final value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedVariable {
  pub value: Value,
  pub source: ValueSource,
}

/// Snapshot of a stack's variables after resolution.
///
/// Declared values that are set (non-null) can never be replaced. The only
/// mutation is [`ResolvedVariables::inject`], which fills a variable that is
/// absent, null or only passed through from undeclared inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedVariables {
  values: BTreeMap<String, ResolvedVariable>,
}

impl ResolvedVariables {
  /// The value of a variable, if it is set to something other than null.
  pub fn get(&self, name: &str) -> Option<&Value> {
    self.values.get(name).map(|v| &v.value).filter(|v| !v.is_null())
  }

  /// The value of a variable as a string slice.
  pub fn get_str(&self, name: &str) -> Option<&str> {
    self.get(name).and_then(Value::as_str)
  }

  /// The full resolution record, including null values.
  pub fn variable(&self, name: &str) -> Option<&ResolvedVariable> {
    self.values.get(name)
  }

  pub fn is_set(&self, name: &str) -> bool {
    self.get(name).is_some()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &ResolvedVariable)> {
    self.values.iter()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Fill a variable that is absent or null.
  ///
  /// Undeclared inputs never block a value the stack computes itself.
  pub fn inject(&mut self, name: impl Into<String>, value: Value) -> Result<(), SchemaError> {
    let name = name.into();
    let passed_through = self
      .variable(&name)
      .is_some_and(|v| v.source == ValueSource::PassedThrough);
    if self.is_set(&name) && !passed_through {
      return Err(SchemaError::VariableAlreadyResolved { name });
    }
    self.insert(name, value, ValueSource::Injected);
    Ok(())
  }

  /// Template context: every variable by name, nulls included.
  pub fn to_context(&self) -> Value {
    Value::Object(
      self
        .values
        .iter()
        .map(|(name, var)| (name.clone(), var.value.clone()))
        .collect(),
    )
  }

  pub(crate) fn insert(&mut self, name: impl Into<String>, value: Value, source: ValueSource) {
    self
      .values
      .insert(name.into(), ResolvedVariable { value, source });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_null_is_not_set() {
    let mut vars = ResolvedVariables::default();
    vars.insert("public_ip", Value::Null, ValueSource::Unset);

    assert!(!vars.is_set("public_ip"));
    assert_eq!(vars.get("public_ip"), None);
    assert_eq!(vars.variable("public_ip").unwrap().source, ValueSource::Unset);
    assert_eq!(vars.to_context(), json!({ "public_ip": null }));
  }

  #[test]
  fn test_inject_fills_null_once() {
    let mut vars = ResolvedVariables::default();
    vars.insert("public_ip", Value::Null, ValueSource::Unset);

    vars.inject("public_ip", json!("1.2.3.4")).unwrap();
    assert_eq!(vars.get_str("public_ip"), Some("1.2.3.4"));
    assert_eq!(vars.variable("public_ip").unwrap().source, ValueSource::Injected);

    let err = vars.inject("public_ip", json!("5.6.7.8")).unwrap_err();
    assert!(matches!(err, SchemaError::VariableAlreadyResolved { .. }));
    assert_eq!(vars.get_str("public_ip"), Some("1.2.3.4"));
  }

  #[test]
  fn test_inject_replaces_passed_through_input() {
    let mut vars = ResolvedVariables::default();
    vars.insert("private_key_base64", json!("c3RhbGU="), ValueSource::PassedThrough);
    vars.insert("hostname", json!("h1"), ValueSource::Supplied);

    vars.inject("private_key_base64", json!("a2V5")).unwrap();
    assert_eq!(vars.get_str("private_key_base64"), Some("a2V5"));
    assert_eq!(
      vars.variable("private_key_base64").unwrap().source,
      ValueSource::Injected
    );

    assert!(vars.inject("hostname", json!("h2")).is_err());
  }

  #[test]
  fn test_inject_undeclared() {
    let mut vars = ResolvedVariables::default();
    vars.inject("private_key_base64", json!("a2V5")).unwrap();
    assert!(vars.is_set("private_key_base64"));
  }
}
