use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a stack is in its lifecycle. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Declaring,
  VariablesResolved,
  ExecgroupsLocked,
  SubstacksLocked,
  /// At least one child was handed to the executor.
  Submitting,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Phase::Declaring => "declaring",
      Phase::VariablesResolved => "variables_resolved",
      Phase::ExecgroupsLocked => "execgroups_locked",
      Phase::SubstacksLocked => "substacks_locked",
      Phase::Submitting => "submitting",
    };
    f.write_str(name)
  }
}
