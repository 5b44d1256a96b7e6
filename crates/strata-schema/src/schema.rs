use serde_json::Value;
use strata_catalog::ResourceResolver;
use strata_config::TypeHint;
use tracing::{debug, instrument};

use crate::coerce::coerce_value;
use crate::declaration::{Fallback, LookupTemplate, VariableDeclaration};
use crate::error::SchemaError;
use crate::inputs::Inputs;
use crate::resolved::{ResolvedVariables, ValueSource};

/// The ordered set of variables a stack declares.
#[derive(Debug, Clone, Default)]
pub struct VariableSchema {
  declarations: Vec<VariableDeclaration>,
}

impl VariableSchema {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a declaration. Names must be unique.
  pub fn declare(&mut self, declaration: VariableDeclaration) -> Result<(), SchemaError> {
    if self.get(&declaration.name).is_some() {
      return Err(SchemaError::DuplicateVariable {
        name: declaration.name,
      });
    }
    self.declarations.push(declaration);
    Ok(())
  }

  /// Register a required variable.
  pub fn add_required(
    &mut self,
    name: impl Into<String>,
    default: Option<Value>,
    type_hint: Option<TypeHint>,
  ) -> Result<(), SchemaError> {
    self.declare(VariableDeclaration {
      default,
      type_hint,
      ..VariableDeclaration::required(name)
    })
  }

  /// Register an optional variable.
  pub fn add_optional(
    &mut self,
    name: impl Into<String>,
    default: Option<Value>,
    type_hint: Option<TypeHint>,
  ) -> Result<(), SchemaError> {
    self.declare(VariableDeclaration {
      default,
      type_hint,
      ..VariableDeclaration::optional(name)
    })
  }

  /// Attach a fallback strategy to an existing declaration.
  pub fn set_fallback(&mut self, name: &str, fallback: Fallback) -> Result<(), SchemaError> {
    let declaration = self
      .declarations
      .iter_mut()
      .find(|d| d.name == name)
      .ok_or_else(|| SchemaError::UnknownVariable {
        name: name.to_string(),
      })?;
    declaration.fallback = Some(fallback);
    Ok(())
  }

  pub fn get(&self, name: &str) -> Option<&VariableDeclaration> {
    self.declarations.iter().find(|d| d.name == name)
  }

  pub fn declarations(&self) -> &[VariableDeclaration] {
    &self.declarations
  }

  pub fn len(&self) -> usize {
    self.declarations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.declarations.is_empty()
  }

  /// Resolve every declaration against the supplied inputs.
  ///
  /// Supplied values and defaults are applied first for all declarations;
  /// fallbacks then run in declaration order and see everything resolved
  /// before them. A required variable with nothing to fall back on fails
  /// before any catalog query is made.
  #[instrument(name = "resolve_variables", skip_all, fields(declared = self.declarations.len()))]
  pub async fn resolve(
    &self,
    supplied: &Inputs,
    resolver: &ResourceResolver,
  ) -> Result<ResolvedVariables, SchemaError> {
    let mut resolved = ResolvedVariables::default();

    for (key, value) in supplied.iter() {
      if self.get(key).is_none() && !value.is_null() {
        debug!(variable = %key, "passing through undeclared input");
        resolved.insert(key.clone(), value.clone(), ValueSource::PassedThrough);
      }
    }

    let mut pending = Vec::new();
    for decl in &self.declarations {
      let supplied_value = supplied.get(&decl.name).filter(|v| !v.is_null());

      if let Some(value) = supplied_value {
        let value = coerce_value(&decl.name, decl.type_hint, value.clone())?;
        resolved.insert(decl.name.clone(), value, ValueSource::Supplied);
      } else if let Some(default) = decl.effective_default() {
        let value = coerce_value(&decl.name, decl.type_hint, default.clone())?;
        resolved.insert(decl.name.clone(), value, ValueSource::Default);
      } else if decl.fallback.is_some() {
        pending.push(decl);
      } else if decl.required {
        return Err(SchemaError::MissingRequiredVariable {
          name: decl.name.clone(),
        });
      } else {
        resolved.insert(decl.name.clone(), Value::Null, ValueSource::Unset);
      }
    }

    for decl in pending {
      let (value, source) = match &decl.fallback {
        Some(Fallback::Lookup(lookup)) => (
          self.run_lookup(&decl.name, lookup, &resolved, resolver).await?,
          ValueSource::Lookup,
        ),
        Some(Fallback::Computed(compute)) => (
          compute(&resolved).map_err(|message| SchemaError::Computed {
            name: decl.name.clone(),
            message,
          })?,
          ValueSource::Computed,
        ),
        None => (Value::Null, ValueSource::Unset),
      };

      if value.is_null() {
        if decl.required {
          return Err(SchemaError::MissingRequiredVariable {
            name: decl.name.clone(),
          });
        }
        resolved.insert(decl.name.clone(), Value::Null, ValueSource::Unset);
        continue;
      }

      debug!(variable = %decl.name, source = ?source, "variable resolved by fallback");
      let value = coerce_value(&decl.name, decl.type_hint, value)?;
      resolved.insert(decl.name.clone(), value, source);
    }

    Ok(resolved)
  }

  async fn run_lookup(
    &self,
    name: &str,
    lookup: &LookupTemplate,
    resolved: &ResolvedVariables,
    resolver: &ResourceResolver,
  ) -> Result<Value, SchemaError> {
    let query = lookup.render(name, resolved)?;
    let to_error = |source| SchemaError::ResourceResolution {
      name: name.to_string(),
      source,
    };

    if query.must_be_one {
      return resolver
        .lookup_attribute(&query, &lookup.attribute)
        .await
        .map_err(to_error);
    }

    let records = resolver.query(&query).await.map_err(to_error)?;
    Ok(
      records
        .first()
        .and_then(|record| record.attribute(&lookup.attribute))
        .cloned()
        .unwrap_or(Value::Null),
    )
  }
}
