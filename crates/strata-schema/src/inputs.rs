use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::SchemaError;

/// Raw invocation arguments for a stack.
///
/// A flat map of string keys to scalar values (string, bool, number or null).
/// Nested arrays and objects are rejected; callers pass structured data as
/// serialized JSON strings and let a `list`/`dict` type hint parse it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Inputs(BTreeMap<String, Value>);

impl Inputs {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build inputs from key/value pairs.
  pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self, SchemaError>
  where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
  {
    let mut inputs = Self::new();
    for (key, value) in pairs {
      inputs.insert(key, value)?;
    }
    Ok(inputs)
  }

  /// Build inputs from a JSON object.
  pub fn from_json(value: Value) -> Result<Self, SchemaError> {
    match value {
      Value::Object(map) => Self::from_pairs(map),
      Value::Null => Ok(Self::new()),
      other => Err(SchemaError::InvalidInput {
        key: String::new(),
        message: format!("expected a JSON object, got {}", crate::value_kind(&other)),
      }),
    }
  }

  /// Parse a `key=value` assignment.
  ///
  /// `null`, `true` and `false` become JSON null and booleans; anything else
  /// stays a string.
  pub fn parse_assignment(&mut self, assignment: &str) -> Result<(), SchemaError> {
    let (key, raw) = assignment
      .split_once('=')
      .ok_or_else(|| SchemaError::InvalidInput {
        key: assignment.to_string(),
        message: "expected key=value".to_string(),
      })?;

    let value = match raw {
      "null" => Value::Null,
      "true" => Value::Bool(true),
      "false" => Value::Bool(false),
      other => Value::String(other.to_string()),
    };
    self.insert(key.trim(), value)
  }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), SchemaError> {
    let key = key.into();
    let value = value.into();

    if key.is_empty() {
      return Err(SchemaError::InvalidInput {
        key,
        message: "key must not be empty".to_string(),
      });
    }
    if value.is_array() || value.is_object() {
      return Err(SchemaError::InvalidInput {
        message: format!("expected a scalar value, got {}", crate::value_kind(&value)),
        key,
      });
    }

    self.0.insert(key, value);
    Ok(())
  }

  /// Merge another set of inputs; keys in `other` win.
  pub fn extend(&mut self, other: Inputs) {
    self.0.extend(other.0);
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.0.get(key)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
    self.0.iter()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}
