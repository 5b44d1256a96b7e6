use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

const OWNER_SEP: &str = ":::";
const REPO_SEP: &str = "::";

/// A parsed child reference.
///
/// ```text
/// williaumwu:::aws_ec2_server                          owner, name
/// williaumwu:::demo1-jenkins::jenkins_with_docker      owner, repo, name
/// ```
///
/// The final `name` segment is the child's alias within its parent stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChildRef {
  owner: String,
  repo: Option<String>,
  name: String,
}

impl ChildRef {
  pub fn owner(&self) -> &str {
    &self.owner
  }

  pub fn repo(&self) -> Option<&str> {
    self.repo.as_deref()
  }

  /// Alias used to address the child inside its parent.
  pub fn alias(&self) -> &str {
    &self.name
  }

  /// Directory-safe form: separators replaced by double dashes.
  ///
  /// Example: "williaumwu:::demo1-jenkins::jenkins_with_docker"
  /// becomes "williaumwu--demo1-jenkins--jenkins_with_docker"
  pub fn dir_name(&self) -> String {
    match &self.repo {
      Some(repo) => format!("{}--{}--{}", self.owner, repo, self.name),
      None => format!("{}--{}", self.owner, self.name),
    }
  }
}

fn valid_segment(segment: &str) -> bool {
  !segment.is_empty()
    && segment
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

impl FromStr for ChildRef {
  type Err = RegistryError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = |message: &str| RegistryError::InvalidReference {
      reference: s.to_string(),
      message: message.to_string(),
    };

    let (owner, rest) = s
      .split_once(OWNER_SEP)
      .ok_or_else(|| invalid("missing ':::' owner separator"))?;

    let (repo, name) = match rest.split_once(REPO_SEP) {
      Some((repo, name)) => (Some(repo), name),
      None => (None, rest),
    };

    if !valid_segment(owner) {
      return Err(invalid("owner segment is empty or malformed"));
    }
    if let Some(repo) = repo
      && !valid_segment(repo)
    {
      return Err(invalid("repository segment is empty or malformed"));
    }
    if !valid_segment(name) {
      return Err(invalid("name segment is empty or malformed"));
    }

    Ok(Self {
      owner: owner.to_string(),
      repo: repo.map(str::to_string),
      name: name.to_string(),
    })
  }
}

impl TryFrom<String> for ChildRef {
  type Error = RegistryError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<ChildRef> for String {
  fn from(value: ChildRef) -> Self {
    value.to_string()
  }
}

impl fmt::Display for ChildRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.repo {
      Some(repo) => write!(f, "{}{}{}{}{}", self.owner, OWNER_SEP, repo, REPO_SEP, self.name),
      None => write!(f, "{}{}{}", self.owner, OWNER_SEP, self.name),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_owner_and_name() {
    let r: ChildRef = "williaumwu:::aws_ec2_server".parse().unwrap();
    assert_eq!(r.owner(), "williaumwu");
    assert_eq!(r.repo(), None);
    assert_eq!(r.alias(), "aws_ec2_server");
    assert_eq!(r.to_string(), "williaumwu:::aws_ec2_server");
  }

  #[test]
  fn test_parse_with_repo() {
    let r: ChildRef = "config0-publish:::config0_core::get_contents_host_file"
      .parse()
      .unwrap();
    assert_eq!(r.owner(), "config0-publish");
    assert_eq!(r.repo(), Some("config0_core"));
    assert_eq!(r.alias(), "get_contents_host_file");
    assert_eq!(
      r.to_string(),
      "config0-publish:::config0_core::get_contents_host_file"
    );
  }

  #[test]
  fn test_dir_name() {
    let r: ChildRef = "williaumwu:::demo1-jenkins::jenkins_with_docker"
      .parse()
      .unwrap();
    assert_eq!(r.dir_name(), "williaumwu--demo1-jenkins--jenkins_with_docker");
  }

  #[test]
  fn test_parse_invalid() {
    assert!("aws_ec2_server".parse::<ChildRef>().is_err());
    assert!(":::aws_ec2_server".parse::<ChildRef>().is_err());
    assert!("williaumwu:::".parse::<ChildRef>().is_err());
    assert!("williaumwu:::repo::".parse::<ChildRef>().is_err());
    assert!("williaumwu:::a b".parse::<ChildRef>().is_err());
  }
}
