use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Kinds of resources the catalog can be queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
  Server,
  SshKeyPair,
}

impl ResourceKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ResourceKind::Server => "server",
      ResourceKind::SshKeyPair => "ssh_key_pair",
    }
  }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ResourceKind {
  type Err = CatalogError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "server" => Ok(ResourceKind::Server),
      "ssh_key_pair" => Ok(ResourceKind::SshKeyPair),
      other => Err(CatalogError::UnsupportedResourceKind {
        kind: other.to_string(),
      }),
    }
  }
}

/// An opaque, scoped label predicate such as "project:::self::default".
///
/// The engine never interprets the syntax. Catalog backends compare it for
/// equality against the labels carried by each record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LabelSelector(String);

impl LabelSelector {
  /// The selector used by stacks for resources of their own project.
  pub const PROJECT_DEFAULT: &'static str = "project:::self::default";

  pub fn new(selector: impl Into<String>) -> Result<Self, CatalogError> {
    let selector = selector.into();
    if selector.trim().is_empty() {
      return Err(CatalogError::EmptyLabelSelector);
    }
    Ok(Self(selector))
  }

  pub fn project_default() -> Self {
    Self(Self::PROJECT_DEFAULT.to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl TryFrom<String> for LabelSelector {
  type Error = CatalogError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<LabelSelector> for String {
  fn from(value: LabelSelector) -> Self {
    value.0
  }
}

impl fmt::Display for LabelSelector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A filter executed against the resource catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuery {
  pub resource_type: ResourceKind,
  pub label_selector: LabelSelector,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default)]
  pub must_be_one: bool,
}

impl ResourceQuery {
  pub fn new(resource_type: ResourceKind, label_selector: LabelSelector) -> Self {
    Self {
      resource_type,
      label_selector,
      name: None,
      must_be_one: false,
    }
  }

  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn must_be_one(mut self) -> Self {
    self.must_be_one = true;
    self
  }
}

impl fmt::Display for ResourceQuery {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{{resource_type: {}", self.resource_type)?;
    if let Some(name) = &self.name {
      write!(f, ", name: {}", name)?;
    }
    write!(f, ", labels: {}}}", self.label_selector)
  }
}

/// A resource as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
  pub resource_type: ResourceKind,
  pub name: String,
  #[serde(default)]
  pub labels: Vec<LabelSelector>,
  #[serde(default)]
  pub attributes: BTreeMap<String, serde_json::Value>,
}

impl ResourceRecord {
  pub fn new(resource_type: ResourceKind, name: impl Into<String>) -> Self {
    Self {
      resource_type,
      name: name.into(),
      labels: Vec::new(),
      attributes: BTreeMap::new(),
    }
  }

  pub fn with_label(mut self, label: LabelSelector) -> Self {
    self.labels.push(label);
    self
  }

  pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
    self.attributes.insert(key.into(), value.into());
    self
  }

  pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
    self.attributes.get(key)
  }

  /// Whether this record satisfies the query's filter.
  pub fn matches(&self, query: &ResourceQuery) -> bool {
    self.resource_type == query.resource_type
      && self.labels.contains(&query.label_selector)
      && query.name.as_ref().is_none_or(|name| &self.name == name)
  }
}
