//! Template rendering shared by lookups, computed variables and child
//! argument bundles.
//!
//! Templates are rendered by minijinja against a JSON object context (usually
//! the resolved variable snapshot). Undefined names are errors rather than
//! empty strings, so a misspelt variable cannot silently produce a blank
//! argument.
//!
//! Two filters are added to the builtins:
//! - `to_json`: serialize any value as compact JSON
//! - `b64encode`: standard base64 of the string value
//!
//! ```text
//! {{ {"all": [public_ip]} | to_json | b64encode }}
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use minijinja::{Environment, Error, ErrorKind, UndefinedBehavior, Value};

/// Build the template environment used across strata.
pub fn template_environment() -> Environment<'static> {
  let mut env = Environment::new();
  env.set_undefined_behavior(UndefinedBehavior::Strict);
  env.add_filter("to_json", to_json);
  env.add_filter("b64encode", b64encode);
  env
}

/// Render a template string against a JSON context.
pub fn render_template(template: &str, context: &serde_json::Value) -> Result<String, Error> {
  let env = template_environment();
  env.render_str(template, Value::from_serialize(context))
}

fn to_json(value: Value) -> Result<String, Error> {
  serde_json::to_string(&value)
    .map_err(|e| Error::new(ErrorKind::InvalidOperation, format!("to_json failed: {}", e)))
}

fn b64encode(value: String) -> String {
  b64_encode(&value)
}

/// Standard base64 of a string, as produced by the `b64encode` filter.
pub fn b64_encode(value: &str) -> String {
  STANDARD.encode(value.as_bytes())
}

#[cfg(test)]
mod tests {
  use super::*;
  use base64::Engine as _;
  use serde_json::json;

  #[test]
  fn test_render_plain_and_template() {
    let ctx = json!({ "public_ip": "1.2.3.4" });
    assert_eq!(render_template("admin", &ctx).unwrap(), "admin");
    assert_eq!(
      render_template("https://{{ public_ip }}", &ctx).unwrap(),
      "https://1.2.3.4"
    );
  }

  #[test]
  fn test_undefined_is_an_error() {
    let ctx = json!({ "public_ip": "1.2.3.4" });
    assert!(render_template("{{ pubic_ip }}", &ctx).is_err());
  }

  #[test]
  fn test_to_json_and_b64encode() {
    let ctx = json!({ "public_ip": "1.2.3.4" });

    let hosts = render_template("{{ {'all': [public_ip]} | to_json }}", &ctx).unwrap();
    assert_eq!(hosts, r#"{"all":["1.2.3.4"]}"#);

    let encoded = render_template("{{ {'all': [public_ip]} | to_json | b64encode }}", &ctx).unwrap();
    assert_eq!(encoded, STANDARD.encode(r#"{"all":["1.2.3.4"]}"#));
  }
}
