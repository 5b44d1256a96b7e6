use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::RegistryError;
use crate::manifest::TemplateManifest;
use crate::reference::ChildRef;
use crate::registry::TemplateRegistry;

const MANIFEST_FILE: &str = "manifest.json";

/// Filesystem-based template registry.
///
/// Templates are stored one directory per reference:
/// ```text
/// {root}/
/// ├── williaumwu--aws_ec2_server/
/// │   └── manifest.json
/// └── williaumwu--demo1-jenkins--jenkins_with_docker/
///     └── manifest.json
/// ```
pub struct FsTemplateRegistry {
  root: PathBuf,
}

impl FsTemplateRegistry {
  /// Create a new filesystem registry at the given root path.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Get the root directory of the registry.
  pub fn root(&self) -> &Path {
    &self.root
  }

  async fn read_manifest(&self, template_dir: &Path) -> Result<TemplateManifest, RegistryError> {
    let content = fs::read_to_string(template_dir.join(MANIFEST_FILE)).await?;
    let manifest: TemplateManifest = serde_json::from_str(&content)?;
    Ok(manifest)
  }

  /// Write a manifest into the registry.
  pub async fn install(&self, manifest: &TemplateManifest) -> Result<PathBuf, RegistryError> {
    let target_dir = self.root.join(manifest.reference.dir_name());

    if fs::try_exists(&target_dir).await? {
      return Err(RegistryError::AlreadyExists {
        reference: manifest.reference.to_string(),
      });
    }

    fs::create_dir_all(&target_dir).await?;
    let content = serde_json::to_string_pretty(manifest)?;
    fs::write(target_dir.join(MANIFEST_FILE), content).await?;

    Ok(target_dir)
  }

  /// Remove a template from the registry.
  pub async fn remove(&self, reference: &ChildRef) -> Result<(), RegistryError> {
    let target_dir = self.root.join(reference.dir_name());

    if !fs::try_exists(&target_dir).await? {
      return Err(RegistryError::NotFound {
        reference: reference.to_string(),
      });
    }

    fs::remove_dir_all(&target_dir).await?;
    Ok(())
  }
}

#[async_trait]
impl TemplateRegistry for FsTemplateRegistry {
  async fn get(&self, reference: &ChildRef) -> Result<Option<TemplateManifest>, RegistryError> {
    let template_dir = self.root.join(reference.dir_name());
    if !fs::try_exists(template_dir.join(MANIFEST_FILE)).await? {
      return Ok(None);
    }
    Ok(Some(self.read_manifest(&template_dir).await?))
  }

  async fn list(&self) -> Result<Vec<TemplateManifest>, RegistryError> {
    if !fs::try_exists(&self.root).await? {
      return Ok(Vec::new());
    }

    let mut entries = fs::read_dir(&self.root).await?;
    let mut manifests = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if !path.is_dir() {
        continue;
      }

      // Skip directories without manifest
      if !path.join(MANIFEST_FILE).exists() {
        continue;
      }

      manifests.push(self.read_manifest(&path).await?);
    }

    manifests.sort_by_key(|m| m.reference.to_string());
    Ok(manifests)
  }
}
