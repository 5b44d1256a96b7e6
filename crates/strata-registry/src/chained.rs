use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RegistryError;
use crate::manifest::TemplateManifest;
use crate::reference::ChildRef;
use crate::registry::TemplateRegistry;

/// Looks a reference up in several registries; the first hit wins.
#[derive(Clone, Default)]
pub struct ChainedRegistry {
  registries: Vec<Arc<dyn TemplateRegistry>>,
}

impl ChainedRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, registry: Arc<dyn TemplateRegistry>) -> Self {
    self.registries.push(registry);
    self
  }
}

#[async_trait]
impl TemplateRegistry for ChainedRegistry {
  async fn get(&self, reference: &ChildRef) -> Result<Option<TemplateManifest>, RegistryError> {
    for registry in &self.registries {
      if let Some(manifest) = registry.get(reference).await? {
        return Ok(Some(manifest));
      }
    }
    Ok(None)
  }

  async fn list(&self) -> Result<Vec<TemplateManifest>, RegistryError> {
    let mut manifests: Vec<TemplateManifest> = Vec::new();
    for registry in &self.registries {
      for manifest in registry.list().await? {
        if !manifests.iter().any(|m| m.reference == manifest.reference) {
          manifests.push(manifest);
        }
      }
    }
    Ok(manifests)
  }
}
