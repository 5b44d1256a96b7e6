use async_trait::async_trait;
use strata_config::ChildKind;

use crate::error::RegistryError;
use crate::manifest::{LockedChild, TemplateManifest};
use crate::reference::ChildRef;

/// Registry of task templates and stacks that can be used as children.
#[async_trait]
pub trait TemplateRegistry: Send + Sync {
  /// Get a template by reference.
  async fn get(&self, reference: &ChildRef) -> Result<Option<TemplateManifest>, RegistryError>;

  /// List all registered templates.
  async fn list(&self) -> Result<Vec<TemplateManifest>, RegistryError>;
}

/// Resolve a reference and check it is of the expected kind.
pub async fn lock_child(
  registry: &dyn TemplateRegistry,
  reference: &ChildRef,
  kind: ChildKind,
) -> Result<LockedChild, RegistryError> {
  let manifest = registry
    .get(reference)
    .await?
    .ok_or_else(|| RegistryError::NotFound {
      reference: reference.to_string(),
    })?;

  if manifest.kind != kind {
    return Err(RegistryError::KindMismatch {
      reference: reference.to_string(),
      expected: kind,
      actual: manifest.kind,
    });
  }

  Ok(manifest.into())
}

/// A registry backed by a fixed list of manifests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
  manifests: Vec<TemplateManifest>,
}

impl InMemoryRegistry {
  pub fn new(manifests: Vec<TemplateManifest>) -> Self {
    Self { manifests }
  }

  pub fn with_template(mut self, manifest: TemplateManifest) -> Self {
    self.manifests.push(manifest);
    self
  }

  /// Register a reference string of the given kind.
  pub fn with_reference(self, reference: &str, kind: ChildKind) -> Result<Self, RegistryError> {
    let reference: ChildRef = reference.parse()?;
    Ok(self.with_template(TemplateManifest::new(reference, kind)))
  }
}

#[async_trait]
impl TemplateRegistry for InMemoryRegistry {
  async fn get(&self, reference: &ChildRef) -> Result<Option<TemplateManifest>, RegistryError> {
    Ok(
      self
        .manifests
        .iter()
        .find(|m| &m.reference == reference)
        .cloned(),
    )
  }

  async fn list(&self) -> Result<Vec<TemplateManifest>, RegistryError> {
    Ok(self.manifests.clone())
  }
}
