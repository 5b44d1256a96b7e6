use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strata_registry::{ChildKind, InMemoryRegistry, RegistryError};
use strata_schema::Inputs;
use strata_stack::{StackError, StackResult, StackServices};

use crate::refs::{
  AWS_EC2_SERVER, AWS_KEY_GEN_AND_UPLOAD, GET_CONTENTS_HOST_FILE, JENKINS_ON_DOCKER,
  JENKINS_WITH_DOCKER,
};
use crate::{jenkins_on_docker, jenkins_on_ec2};

/// A stack composition shipped with strata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Builtin {
  JenkinsOnDocker,
  JenkinsOnEc2,
}

const ALL: &[Builtin] = &[Builtin::JenkinsOnDocker, Builtin::JenkinsOnEc2];

impl Builtin {
  pub fn name(&self) -> &'static str {
    match self {
      Builtin::JenkinsOnDocker => jenkins_on_docker::NAME,
      Builtin::JenkinsOnEc2 => jenkins_on_ec2::NAME,
    }
  }

  pub fn description(&self) -> &'static str {
    match self {
      Builtin::JenkinsOnDocker => "Install Jenkins with Docker on an existing server",
      Builtin::JenkinsOnEc2 => "Create an EC2 server and install Jenkins on it",
    }
  }

  pub async fn run(&self, services: StackServices, inputs: &Inputs) -> Result<StackResult, StackError> {
    match self {
      Builtin::JenkinsOnDocker => jenkins_on_docker::run(services, inputs).await,
      Builtin::JenkinsOnEc2 => jenkins_on_ec2::run(services, inputs).await,
    }
  }
}

impl fmt::Display for Builtin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Builtin {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    builtin(s).ok_or_else(|| {
      let known: Vec<&str> = ALL.iter().map(Builtin::name).collect();
      format!("unknown builtin '{}', expected one of: {}", s, known.join(", "))
    })
  }
}

/// Look a built-in up by name.
pub fn builtin(name: &str) -> Option<Builtin> {
  ALL.iter().copied().find(|b| b.name() == name)
}

/// All built-ins.
pub fn builtins() -> &'static [Builtin] {
  ALL
}

/// Registry holding every template the built-ins reference.
pub fn builtin_registry() -> Result<InMemoryRegistry, RegistryError> {
  InMemoryRegistry::default()
    .with_reference(JENKINS_WITH_DOCKER, ChildKind::Execgroup)?
    .with_reference(GET_CONTENTS_HOST_FILE, ChildKind::Substack)?
    .with_reference(AWS_KEY_GEN_AND_UPLOAD, ChildKind::Substack)?
    .with_reference(AWS_EC2_SERVER, ChildKind::Substack)?
    .with_reference(JENKINS_ON_DOCKER, ChildKind::Substack)
}
