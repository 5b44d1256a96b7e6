use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use strata_catalog::{LabelSelector, ResourceKind, ResourceQuery};
use strata_config::TypeHint;

use crate::error::SchemaError;
use crate::render::render_template;
use crate::resolved::ResolvedVariables;

/// Function computing a variable from the variables resolved before it.
pub type ComputeFn = Arc<dyn Fn(&ResolvedVariables) -> Result<Value, String> + Send + Sync>;

/// How to obtain a value when neither the caller nor the default supplies one.
#[derive(Clone)]
pub enum Fallback {
  /// Query the resource catalog and take one attribute of the match.
  Lookup(LookupTemplate),
  /// Derive the value from already-resolved variables.
  Computed(ComputeFn),
}

impl Fallback {
  pub fn computed<F>(f: F) -> Self
  where
    F: Fn(&ResolvedVariables) -> Result<Value, String> + Send + Sync + 'static,
  {
    Fallback::Computed(Arc::new(f))
  }

  /// A computed fallback rendering a template against the resolved variables.
  pub fn template(template: impl Into<String>) -> Self {
    let template = template.into();
    Fallback::computed(move |vars| {
      render_template(&template, &vars.to_context())
        .map(Value::String)
        .map_err(|e| e.to_string())
    })
  }
}

impl fmt::Debug for Fallback {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Fallback::Lookup(lookup) => f.debug_tuple("Lookup").field(lookup).finish(),
      Fallback::Computed(_) => f.write_str("Computed(..)"),
    }
  }
}

/// A catalog query whose type and name are templates over other variables.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTemplate {
  /// Resource kind, literal ("server") or template ("{{ resource_type_hostname }}").
  pub resource_type: String,
  pub name: Option<String>,
  pub labels: LabelSelector,
  pub attribute: String,
  pub must_be_one: bool,
}

impl LookupTemplate {
  pub fn new(
    resource_type: impl Into<String>,
    labels: LabelSelector,
    attribute: impl Into<String>,
  ) -> Self {
    Self {
      resource_type: resource_type.into(),
      name: None,
      labels,
      attribute: attribute.into(),
      must_be_one: true,
    }
  }

  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn allow_many(mut self) -> Self {
    self.must_be_one = false;
    self
  }

  /// Render the templates into a concrete query.
  pub fn render(&self, variable: &str, vars: &ResolvedVariables) -> Result<ResourceQuery, SchemaError> {
    let context = vars.to_context();
    let render = |template: &str| {
      render_template(template, &context).map_err(|source| SchemaError::Template {
        name: variable.to_string(),
        source,
      })
    };

    let kind = render(&self.resource_type)?
      .parse::<ResourceKind>()
      .map_err(|source| SchemaError::InvalidLookup {
        name: variable.to_string(),
        source,
      })?;

    let mut query = ResourceQuery::new(kind, self.labels.clone());
    if let Some(name) = &self.name {
      query = query.named(render(name)?);
    }
    if self.must_be_one {
      query = query.must_be_one();
    }
    Ok(query)
  }
}

/// A declared stack input.
#[derive(Debug, Clone)]
pub struct VariableDeclaration {
  pub name: String,
  pub required: bool,
  pub default: Option<Value>,
  pub type_hint: Option<TypeHint>,
  pub fallback: Option<Fallback>,
}

impl VariableDeclaration {
  pub fn required(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      required: true,
      default: None,
      type_hint: None,
      fallback: None,
    }
  }

  pub fn optional(name: impl Into<String>) -> Self {
    Self {
      required: false,
      ..Self::required(name)
    }
  }

  pub fn with_default(mut self, default: impl Into<Value>) -> Self {
    self.default = Some(default.into());
    self
  }

  pub fn with_type(mut self, type_hint: TypeHint) -> Self {
    self.type_hint = Some(type_hint);
    self
  }

  pub fn with_fallback(mut self, fallback: Fallback) -> Self {
    self.fallback = Some(fallback);
    self
  }

  /// The default, unless it is `null`.
  pub(crate) fn effective_default(&self) -> Option<&Value> {
    self.default.as_ref().filter(|v| !v.is_null())
  }
}
