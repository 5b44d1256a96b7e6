//! Type hint coercion.
//!
//! Hints are advisory: a value already of the hinted type passes through, a
//! string that parses as the hinted type is converted, and scalars are
//! stringified for `str`. Anything else is rejected with
//! [`SchemaError::InvalidVariableType`].

use serde_json::Value;
use strata_config::TypeHint;

use crate::error::SchemaError;

/// Short name of a JSON value's type, used in error messages.
pub fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

/// Coerce a value according to an optional type hint.
///
/// `null` is never coerced; whether a null is acceptable is decided by the
/// required/optional rules, not by the hint.
pub fn coerce_value(name: &str, hint: Option<TypeHint>, value: Value) -> Result<Value, SchemaError> {
  let Some(hint) = hint else {
    return Ok(value);
  };
  if value.is_null() {
    return Ok(value);
  }

  let invalid = |value: &Value| SchemaError::InvalidVariableType {
    name: name.to_string(),
    expected: hint,
    actual: value_kind(value).to_string(),
  };

  match hint {
    TypeHint::Str => match value {
      Value::String(_) => Ok(value),
      Value::Bool(b) => Ok(Value::String(b.to_string())),
      Value::Number(n) => Ok(Value::String(n.to_string())),
      other => Err(invalid(&other)),
    },

    TypeHint::Bool => match &value {
      Value::Bool(_) => Ok(value),
      Value::String(s) => match s.to_lowercase().as_str() {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Err(invalid(&value)),
      },
      _ => Err(invalid(&value)),
    },

    TypeHint::Int => match &value {
      Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value),
      Value::String(s) => s
        .trim()
        .parse::<i64>()
        .map(|n| Value::Number(n.into()))
        .map_err(|_| invalid(&value)),
      _ => Err(invalid(&value)),
    },

    TypeHint::List => match &value {
      Value::Array(_) => Ok(value),
      Value::String(s) => match serde_json::from_str::<Value>(s) {
        Ok(parsed @ Value::Array(_)) => Ok(parsed),
        _ => Err(invalid(&value)),
      },
      _ => Err(invalid(&value)),
    },

    TypeHint::Dict => match &value {
      Value::Object(_) => Ok(value),
      Value::String(s) => match serde_json::from_str::<Value>(s) {
        Ok(parsed @ Value::Object(_)) => Ok(parsed),
        _ => Err(invalid(&value)),
      },
      _ => Err(invalid(&value)),
    },
  }
}
