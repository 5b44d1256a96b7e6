//! Running stacks described by a [`StackDef`].
//!
//! A definition is compiled into a [`Stack`] (variables declared, children
//! registered, re-exports checked) and then driven through the usual
//! lifecycle. Every child gets a fresh stateful ID, which templates can use
//! as `{{ stateful_id }}`.

use std::collections::BTreeMap;

use serde_json::Value;
use strata_catalog::LabelSelector;
use strata_config::{ArgValue, ChildDef, ChildKind, LookupDef, StackDef, VariableDef};
use strata_executor::DEFAULT_ID_SIZE;
use strata_registry::ChildRef;
use strata_schema::{
  Fallback, Inputs, LookupTemplate, ResolvedVariables, SchemaError, VariableDeclaration,
  render_template,
};
use tracing::{info, instrument};

use crate::child::ChildInsert;
use crate::error::StackError;
use crate::result::StackResult;
use crate::services::StackServices;
use crate::stack::Stack;

fn lookup_fallback(variable: &str, lookup: &LookupDef) -> Result<Fallback, StackError> {
  let labels = LabelSelector::new(lookup.labels.clone()).map_err(|source| SchemaError::InvalidLookup {
    name: variable.to_string(),
    source,
  })?;

  let mut template = LookupTemplate::new(&lookup.resource_type, labels, &lookup.attribute);
  if let Some(name) = &lookup.name {
    template = template.named(name);
  }
  if !lookup.must_be_one {
    template = template.allow_many();
  }
  Ok(Fallback::Lookup(template))
}

fn declaration(def: &VariableDef) -> Result<VariableDeclaration, StackError> {
  let mut declaration = if def.required {
    VariableDeclaration::required(&def.name)
  } else {
    VariableDeclaration::optional(&def.name)
  };
  if let Some(default) = &def.default {
    declaration = declaration.with_default(default.clone());
  }
  if let Some(type_hint) = def.type_hint {
    declaration = declaration.with_type(type_hint);
  }

  match (&def.lookup, &def.template) {
    (Some(_), Some(_)) => {
      return Err(StackError::InvalidDefinition {
        message: format!("variable '{}' has both a lookup and a template", def.name),
      });
    }
    (Some(lookup), None) => {
      declaration = declaration.with_fallback(lookup_fallback(&def.name, lookup)?);
    }
    (None, Some(template)) => {
      declaration = declaration.with_fallback(Fallback::template(template));
    }
    (None, None) => {}
  }

  Ok(declaration)
}

/// Build a stack from a definition without resolving anything.
pub fn compile(def: &StackDef, services: StackServices) -> Result<Stack, StackError> {
  let mut stack = Stack::new(&def.name, services);

  for variable in &def.variables {
    stack.declare(declaration(variable)?)?;
  }

  for child in &def.children {
    match child.kind {
      ChildKind::Execgroup => stack.add_execgroup(&child.reference)?,
      ChildKind::Substack => stack.add_substack(&child.reference)?,
    }
  }

  for reexport in &def.reexports {
    stack.reexport(&reexport.child, reexport.keys.iter().cloned())?;
  }

  Ok(stack)
}

/// Evaluate a map of argument values.
///
/// Variable references copy the resolved value untouched. A reference to a
/// variable without a value drops the key when marked optional and fails
/// otherwise. Templates are rendered against `context`.
fn render_values(
  values: &BTreeMap<String, ArgValue>,
  variables: &ResolvedVariables,
  context: &Value,
) -> Result<BTreeMap<String, Value>, StackError> {
  let mut rendered = BTreeMap::new();

  for (key, value) in values {
    let value = match value {
      ArgValue::Var { var, optional } => match variables.variable(var) {
        Some(resolved) if !resolved.value.is_null() => resolved.value.clone(),
        Some(_) if *optional => continue,
        Some(_) => {
          return Err(SchemaError::MissingRequiredVariable { name: var.clone() }.into());
        }
        None if *optional => continue,
        None => {
          return Err(SchemaError::UnknownVariable { name: var.clone() }.into());
        }
      },
      ArgValue::Bool(b) => Value::Bool(*b),
      ArgValue::Number(n) => Value::Number(n.clone()),
      ArgValue::Template(template) => {
        let text = render_template(template, context).map_err(|source| StackError::Template {
          name: key.clone(),
          source,
        })?;
        Value::String(text)
      }
    };
    rendered.insert(key.clone(), value);
  }

  Ok(rendered)
}

fn child_insert(
  child: &ChildDef,
  variables: &ResolvedVariables,
  stateful_id: &str,
) -> Result<ChildInsert, StackError> {
  let mut context = variables.to_context();
  if let Value::Object(map) = &mut context {
    map.insert("stateful_id".to_string(), Value::String(stateful_id.to_string()));
  }

  let mut insert = ChildInsert::new(render_values(&child.arguments, variables, &context)?)
    .with_human_description(&child.human_description)
    .with_automation_phase(&child.automation_phase)
    .with_display(child.display)
    .with_stateful_id(stateful_id);

  if let Some(env_vars) = &child.env_vars {
    insert = insert.with_env_vars(render_values(env_vars, variables, &context)?);
  }

  Ok(insert)
}

/// Compile and run a definition to completion.
#[instrument(name = "stack_run", skip_all, fields(stack = %def.name))]
pub async fn run_definition(
  def: &StackDef,
  services: StackServices,
  inputs: &Inputs,
) -> Result<StackResult, StackError> {
  let mut stack = compile(def, services)?;
  info!(run_id = %stack.run_id(), children = def.children.len(), "stack_started");

  stack.init_variables(inputs).await?;
  if def.children.iter().any(|c| c.kind == ChildKind::Execgroup) {
    stack.init_execgroups().await?;
  }
  stack.init_substacks().await?;

  for child in &def.children {
    let reference: ChildRef = child.reference.parse().map_err(StackError::from_registry)?;
    let stateful_id = stack.random_id(DEFAULT_ID_SIZE)?;
    let insert = child_insert(child, stack.variables(), &stateful_id)?;
    stack.insert(reference.alias(), insert).await?;
  }

  if !def.outputs.is_empty() {
    let variables = stack.variables().clone();
    let outputs = render_values(&def.outputs, &variables, &variables.to_context())?;
    stack.output_to_ui(outputs);
  }

  let result = stack.get_results();
  info!(
    run_id = %result.run_id,
    submitted = result.submissions.len(),
    "stack_completed"
  );
  Ok(result)
}
