//! Argument value types for child submissions and stack outputs.
//!
//! A value is one of:
//! - a variable reference, copied verbatim from the resolved snapshot
//! - a boolean or number literal
//! - a template string rendered by minijinja against the resolved snapshot
//!
//! # Examples
//!
//! ```json
//! {
//!   "ipaddress": { "var": "public_ip" },
//!   "public_ip": { "var": "public_ip", "optional": true },
//!   "display": true,
//!   "jenkins_url": "https://{{ public_ip }}",
//!   "ANS_VAR_hosts": "{{ {'all': [public_ip]} | to_json | b64encode }}"
//! }
//! ```
//!
//! Variable references are the only way to forward a value without passing it
//! through the template engine, so they are preferred for opaque payloads such
//! as base64 key material.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
  /// Copy a resolved variable. With `optional`, a null variable drops the key.
  Var {
    var: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    optional: bool,
  },
  Bool(bool),
  Number(serde_json::Number),
  /// A minijinja template; plain strings without tags render to themselves.
  Template(String),
}

impl ArgValue {
  /// Shorthand for a required variable reference.
  pub fn var(name: impl Into<String>) -> Self {
    ArgValue::Var {
      var: name.into(),
      optional: false,
    }
  }
}
