use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use strata_catalog::{ResourceQuery, ResourceRecord};
use strata_config::ChildKind;
use strata_executor::{
  StatefulIdGenerator, SubmissionError, SubmissionReceipt, TaskSubmission, validate_stateful_id,
};
use strata_registry::{ChildRef, lock_child};
use strata_schema::{
  Fallback, Inputs, ResolvedVariables, TypeHint, VariableDeclaration, VariableSchema,
};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::child::{ChildInsert, ChildSlot};
use crate::error::StackError;
use crate::events::StackEvent;
use crate::phase::Phase;
use crate::result::{StackResult, SubmissionRecord};
use crate::services::StackServices;

/// One run of an automation composition.
pub struct Stack {
  name: String,
  run_id: String,
  services: StackServices,
  schema: VariableSchema,
  children: Vec<ChildSlot>,
  phase: Phase,
  variables: ResolvedVariables,
  ids: StatefulIdGenerator,
  used_ids: HashSet<String>,
  last_submitted: Option<usize>,
  aborted: Option<String>,
  outputs: BTreeMap<String, Value>,
  reexports: Vec<(String, Vec<String>)>,
  submissions: Vec<SubmissionRecord>,
  completed: bool,
}

impl Stack {
  pub fn new(name: impl Into<String>, services: StackServices) -> Self {
    Self {
      name: name.into(),
      run_id: Uuid::new_v4().to_string(),
      services,
      schema: VariableSchema::new(),
      children: Vec::new(),
      phase: Phase::Declaring,
      variables: ResolvedVariables::default(),
      ids: StatefulIdGenerator::new(),
      used_ids: HashSet::new(),
      last_submitted: None,
      aborted: None,
      outputs: BTreeMap::new(),
      reexports: Vec::new(),
      submissions: Vec::new(),
      completed: false,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn run_id(&self) -> &str {
    &self.run_id
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  fn expect_phase(&self, operation: &'static str, expected: Phase) -> Result<(), StackError> {
    if self.phase != expected {
      return Err(StackError::PhaseOrder {
        operation,
        expected,
        actual: self.phase,
      });
    }
    Ok(())
  }

  fn expect_resolved(&self, operation: &'static str) -> Result<(), StackError> {
    if self.phase < Phase::VariablesResolved {
      return Err(StackError::PhaseOrder {
        operation,
        expected: Phase::VariablesResolved,
        actual: self.phase,
      });
    }
    Ok(())
  }

  fn notify(&self, event: StackEvent) {
    self.services.notifier.notify(event);
  }

  // Declaration

  pub fn declare(&mut self, declaration: VariableDeclaration) -> Result<(), StackError> {
    self.expect_phase("declare", Phase::Declaring)?;
    self.schema.declare(declaration)?;
    Ok(())
  }

  pub fn add_required(
    &mut self,
    name: impl Into<String>,
    default: Option<Value>,
    type_hint: Option<TypeHint>,
  ) -> Result<(), StackError> {
    self.expect_phase("add_required", Phase::Declaring)?;
    self.schema.add_required(name, default, type_hint)?;
    Ok(())
  }

  pub fn add_optional(
    &mut self,
    name: impl Into<String>,
    default: Option<Value>,
    type_hint: Option<TypeHint>,
  ) -> Result<(), StackError> {
    self.expect_phase("add_optional", Phase::Declaring)?;
    self.schema.add_optional(name, default, type_hint)?;
    Ok(())
  }

  pub fn set_fallback(&mut self, name: &str, fallback: Fallback) -> Result<(), StackError> {
    self.expect_phase("set_fallback", Phase::Declaring)?;
    self.schema.set_fallback(name, fallback)?;
    Ok(())
  }

  pub fn add_execgroup(&mut self, reference: &str) -> Result<(), StackError> {
    self.add_child(reference, ChildKind::Execgroup)
  }

  pub fn add_substack(&mut self, reference: &str) -> Result<(), StackError> {
    self.add_child(reference, ChildKind::Substack)
  }

  fn add_child(&mut self, reference: &str, kind: ChildKind) -> Result<(), StackError> {
    self.expect_phase("add_child", Phase::Declaring)?;

    let reference: ChildRef = reference.parse().map_err(StackError::from_registry)?;
    if self.child_index(reference.alias()).is_some() {
      return Err(StackError::DuplicateChild {
        alias: reference.alias().to_string(),
      });
    }

    debug!(stack = %self.name, child = %reference, %kind, "child registered");
    self.children.push(ChildSlot {
      reference,
      kind,
      locked: None,
    });
    Ok(())
  }

  fn child_index(&self, alias: &str) -> Option<usize> {
    self.children.iter().position(|c| c.alias() == alias)
  }

  /// Registered child aliases, in registration order.
  pub fn child_aliases(&self) -> Vec<&str> {
    self.children.iter().map(ChildSlot::alias).collect()
  }

  // Initialization

  /// Resolve every declared variable. No child can be submitted before this.
  #[instrument(name = "init_variables", skip_all, fields(stack = %self.name, run_id = %self.run_id))]
  pub async fn init_variables(&mut self, inputs: &Inputs) -> Result<(), StackError> {
    self.expect_phase("init_variables", Phase::Declaring)?;
    self.notify(StackEvent::StackStarted {
      run_id: self.run_id.clone(),
      stack: self.name.clone(),
    });

    self.variables = self
      .schema
      .resolve(inputs, &self.services.resolver)
      .await
      .inspect_err(|e| error!(error = %e, "variable resolution failed"))?;
    self.phase = Phase::VariablesResolved;

    let names: Vec<String> = self.variables.iter().map(|(name, _)| name.clone()).collect();
    info!(variables = ?names, "variables resolved");
    self.notify(StackEvent::VariablesResolved {
      run_id: self.run_id.clone(),
      stack: self.name.clone(),
      variables: names,
    });
    Ok(())
  }

  /// Lock every registered execgroup against the template registry.
  pub async fn init_execgroups(&mut self) -> Result<(), StackError> {
    self.expect_phase("init_execgroups", Phase::VariablesResolved)?;
    self.lock_children(ChildKind::Execgroup).await?;
    self.phase = Phase::ExecgroupsLocked;
    Ok(())
  }

  /// Lock every registered substack against the template registry.
  ///
  /// Must follow `init_execgroups` unless the stack has no execgroups.
  pub async fn init_substacks(&mut self) -> Result<(), StackError> {
    let has_execgroups = self.children.iter().any(|c| c.kind == ChildKind::Execgroup);
    let expected = if has_execgroups {
      Phase::ExecgroupsLocked
    } else {
      Phase::VariablesResolved
    };
    let ready = self.phase == expected
      || (!has_execgroups && self.phase == Phase::ExecgroupsLocked);
    if !ready {
      return Err(StackError::PhaseOrder {
        operation: "init_substacks",
        expected,
        actual: self.phase,
      });
    }

    self.lock_children(ChildKind::Substack).await?;
    self.phase = Phase::SubstacksLocked;
    Ok(())
  }

  async fn lock_children(&mut self, kind: ChildKind) -> Result<(), StackError> {
    let registry = self.services.registry.clone();
    for slot in self.children.iter_mut().filter(|c| c.kind == kind) {
      let locked = lock_child(registry.as_ref(), &slot.reference, kind)
        .await
        .map_err(StackError::from_registry)?;
      debug!(child = %slot.reference, %kind, "child locked");
      slot.locked = Some(locked);
    }
    Ok(())
  }

  // Variables

  /// Resolved value of a variable; `None` when unset or before resolution.
  pub fn get(&self, name: &str) -> Option<&Value> {
    self.variables.get(name)
  }

  pub fn get_str(&self, name: &str) -> Option<&str> {
    self.variables.get_str(name)
  }

  pub fn variables(&self) -> &ResolvedVariables {
    &self.variables
  }

  /// Fill in a variable computed after resolution.
  ///
  /// Only absent or null variables can be set.
  pub fn set_variable(&mut self, name: &str, value: Value) -> Result<(), StackError> {
    self.expect_resolved("set_variable")?;
    if self.phase == Phase::Submitting {
      return Err(StackError::PhaseOrder {
        operation: "set_variable",
        expected: Phase::SubstacksLocked,
        actual: self.phase,
      });
    }
    self
      .variables
      .inject(name, value)
      .map_err(StackError::from_schema)?;
    debug!(variable = %name, "variable injected");
    Ok(())
  }

  /// Query the resource catalog directly.
  pub async fn get_resource(&self, query: &ResourceQuery) -> Result<Vec<ResourceRecord>, StackError> {
    Ok(self.services.resolver.query(query).await?)
  }

  /// Single attribute of the one record matching `query`.
  pub async fn lookup_attribute(
    &self,
    query: &ResourceQuery,
    attribute: &str,
  ) -> Result<Value, StackError> {
    Ok(
      self
        .services
        .resolver
        .lookup_attribute(query, attribute)
        .await?,
    )
  }

  /// Draw a stateful ID for a later `insert`.
  pub fn random_id(&mut self, size: usize) -> Result<String, StackError> {
    Ok(self.ids.random_id(size)?)
  }

  // Submission

  /// Pick the ID for a submission without claiming it.
  fn next_stateful_id(&mut self, supplied: Option<String>) -> Result<String, StackError> {
    match supplied {
      Some(id) if self.used_ids.contains(&id) => {
        Err(SubmissionError::DuplicateStatefulId { stateful_id: id }.into())
      }
      Some(id) => {
        validate_stateful_id(&id)?;
        Ok(id)
      }
      None => Ok(self.ids.random_id(strata_executor::DEFAULT_ID_SIZE)?),
    }
  }

  fn claim_stateful_id(&mut self, id: &str) -> Result<(), StackError> {
    if !self.ids.is_issued(id) {
      self.ids.register(id)?;
    }
    self.used_ids.insert(id.to_string());
    Ok(())
  }

  /// Submit a registered child.
  ///
  /// Children go out in registration order; skipping is allowed, going back
  /// is not. A failed submission aborts the stack.
  #[instrument(name = "child_insert", skip(self, insert), fields(stack = %self.name, run_id = %self.run_id))]
  pub async fn insert(
    &mut self,
    alias: &str,
    insert: ChildInsert,
  ) -> Result<SubmissionReceipt, StackError> {
    if let Some(failed) = &self.aborted {
      return Err(StackError::Aborted {
        alias: failed.clone(),
      });
    }

    let index = self.child_index(alias).ok_or_else(|| StackError::UnknownChild {
      alias: alias.to_string(),
    })?;
    let slot = &self.children[index];

    let Some(locked) = slot.locked.clone() else {
      let expected = match slot.kind {
        ChildKind::Execgroup => Phase::ExecgroupsLocked,
        ChildKind::Substack => Phase::SubstacksLocked,
      };
      return Err(StackError::PhaseOrder {
        operation: "insert",
        expected,
        actual: self.phase,
      });
    };

    if let Some(last) = self.last_submitted
      && index < last
    {
      return Err(StackError::OutOfOrder {
        alias: alias.to_string(),
        last: self.children[last].alias().to_string(),
      });
    }

    let stateful_id = self.next_stateful_id(insert.stateful_id)?;
    let mut submission = TaskSubmission::new(&stateful_id, &locked, insert.arguments)?
      .with_automation_phase(insert.automation_phase)
      .with_display(insert.display);
    if let Some(env_vars) = insert.env_vars {
      submission = submission.with_env_vars(env_vars)?;
    }
    if let Some(description) = insert.human_description {
      submission = submission.with_human_description(description);
    }

    self.claim_stateful_id(&stateful_id)?;
    self.phase = Phase::Submitting;

    let receipt = match self.services.executor.submit(&submission).await {
      Ok(receipt) => receipt,
      Err(e) => {
        error!(%alias, %stateful_id, error = %e, "submission failed");
        self.aborted = Some(alias.to_string());
        self.notify(StackEvent::SubmissionFailed {
          run_id: self.run_id.clone(),
          stack: self.name.clone(),
          alias: alias.to_string(),
          error: e.to_string(),
        });
        return Err(e.into());
      }
    };

    info!(
      %alias,
      %stateful_id,
      arguments = ?submission.argument_keys(),
      resubmission = receipt.resubmission,
      "child submitted"
    );
    self.notify(StackEvent::ChildSubmitted {
      run_id: self.run_id.clone(),
      stack: self.name.clone(),
      alias: alias.to_string(),
      stateful_id: stateful_id.clone(),
      resubmission: receipt.resubmission,
    });

    self.last_submitted = Some(index);
    self.submissions.push(SubmissionRecord {
      alias: alias.to_string(),
      reference: locked.reference.to_string(),
      kind: locked.kind,
      receipt: receipt.clone(),
    });
    Ok(receipt)
  }

  // Outputs

  /// Publish values to the caller. Later keys overwrite earlier ones.
  pub fn output_to_ui<I, K>(&mut self, outputs: I)
  where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
  {
    let outputs: BTreeMap<String, Value> = outputs.into_iter().map(|(k, v)| (k.into(), v)).collect();
    self.outputs.extend(outputs.clone());
    self.notify(StackEvent::OutputEmitted {
      run_id: self.run_id.clone(),
      stack: self.name.clone(),
      outputs,
    });
  }

  /// Copy `keys` of a child's reported outputs into this stack's results.
  ///
  /// Keys set explicitly with `output_to_ui` take precedence.
  pub fn reexport<I, K>(&mut self, alias: &str, keys: I) -> Result<(), StackError>
  where
    I: IntoIterator<Item = K>,
    K: Into<String>,
  {
    if self.child_index(alias).is_none() {
      return Err(StackError::UnknownChild {
        alias: alias.to_string(),
      });
    }
    self
      .reexports
      .push((alias.to_string(), keys.into_iter().map(Into::into).collect()));
    Ok(())
  }

  pub fn outputs(&self) -> &BTreeMap<String, Value> {
    &self.outputs
  }

  /// Collect outputs and submission records.
  ///
  /// The first call marks the stack completed.
  pub fn get_results(&mut self) -> StackResult {
    let mut outputs = BTreeMap::new();

    for (alias, keys) in &self.reexports {
      let child_outputs = self
        .submissions
        .iter()
        .rev()
        .find(|s| &s.alias == alias)
        .and_then(|s| s.receipt.outputs.as_ref());
      let Some(child_outputs) = child_outputs else {
        debug!(%alias, "no outputs reported for re-exported child");
        continue;
      };
      for key in keys {
        if let Some(value) = child_outputs.get(key) {
          outputs.insert(key.clone(), value.clone());
        }
      }
    }
    outputs.extend(self.outputs.clone());

    if !self.completed {
      self.completed = true;
      self.notify(StackEvent::StackCompleted {
        run_id: self.run_id.clone(),
        stack: self.name.clone(),
      });
    }

    StackResult {
      stack: self.name.clone(),
      run_id: self.run_id.clone(),
      outputs,
      submissions: self.submissions.clone(),
    }
  }
}
