use serde::{Deserialize, Serialize};
use strata_config::ChildKind;

use crate::reference::ChildRef;

/// Metadata describing a registered task template or stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateManifest {
  pub reference: ChildRef,

  pub kind: ChildKind,

  #[serde(default)]
  pub description: String,

  /// Template version, e.g. "1.0.0".
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
}

impl TemplateManifest {
  pub fn new(reference: ChildRef, kind: ChildKind) -> Self {
    Self {
      reference,
      kind,
      description: String::new(),
      version: None,
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }
}

/// A child whose reference has been checked against the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockedChild {
  pub reference: ChildRef,
  pub alias: String,
  pub kind: ChildKind,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
}

impl From<TemplateManifest> for LockedChild {
  fn from(manifest: TemplateManifest) -> Self {
    Self {
      alias: manifest.reference.alias().to_string(),
      reference: manifest.reference,
      kind: manifest.kind,
      version: manifest.version,
    }
  }
}
