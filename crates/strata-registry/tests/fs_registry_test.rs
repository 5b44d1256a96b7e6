use std::sync::Arc;

use strata_registry::{
  ChainedRegistry, ChildKind, ChildRef, FsTemplateRegistry, InMemoryRegistry, RegistryError,
  TemplateManifest, TemplateRegistry, lock_child,
};
use tempfile::TempDir;

fn manifest(reference: &str, kind: ChildKind) -> TemplateManifest {
  TemplateManifest::new(reference.parse().unwrap(), kind).with_description("test template")
}

#[tokio::test]
async fn test_install_and_get() {
  let dir = TempDir::new().unwrap();
  let registry = FsTemplateRegistry::new(dir.path());

  let m = manifest("williaumwu:::demo1-jenkins::jenkins_with_docker", ChildKind::Execgroup);
  let installed_at = registry.install(&m).await.unwrap();
  assert!(installed_at.ends_with("williaumwu--demo1-jenkins--jenkins_with_docker"));

  let found = registry.get(&m.reference).await.unwrap().unwrap();
  assert_eq!(found, m);
}

#[tokio::test]
async fn test_get_missing_returns_none() {
  let dir = TempDir::new().unwrap();
  let registry = FsTemplateRegistry::new(dir.path());

  let reference: ChildRef = "williaumwu:::aws_ec2_server".parse().unwrap();
  assert!(registry.get(&reference).await.unwrap().is_none());
}

#[tokio::test]
async fn test_install_twice_fails() {
  let dir = TempDir::new().unwrap();
  let registry = FsTemplateRegistry::new(dir.path());

  let m = manifest("williaumwu:::aws_ec2_server", ChildKind::Substack);
  registry.install(&m).await.unwrap();

  let err = registry.install(&m).await.unwrap_err();
  assert!(matches!(err, RegistryError::AlreadyExists { .. }));
}

#[tokio::test]
async fn test_list_and_remove() {
  let dir = TempDir::new().unwrap();
  let registry = FsTemplateRegistry::new(dir.path());

  registry
    .install(&manifest("williaumwu:::jenkins_on_docker", ChildKind::Substack))
    .await
    .unwrap();
  registry
    .install(&manifest("williaumwu:::aws_ec2_server", ChildKind::Substack))
    .await
    .unwrap();

  let listed = registry.list().await.unwrap();
  let names: Vec<&str> = listed.iter().map(|m| m.reference.alias()).collect();
  assert_eq!(names, vec!["aws_ec2_server", "jenkins_on_docker"]);

  let reference: ChildRef = "williaumwu:::aws_ec2_server".parse().unwrap();
  registry.remove(&reference).await.unwrap();
  assert_eq!(registry.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_missing_root_is_empty() {
  let dir = TempDir::new().unwrap();
  let registry = FsTemplateRegistry::new(dir.path().join("templates"));
  assert!(registry.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_chained_registry_falls_through() {
  let dir = TempDir::new().unwrap();
  let fs_registry = FsTemplateRegistry::new(dir.path());
  fs_registry
    .install(&manifest("williaumwu:::aws_ec2_server", ChildKind::Substack))
    .await
    .unwrap();

  let builtin = InMemoryRegistry::default()
    .with_reference("williaumwu:::aws_key_gen_and_upload", ChildKind::Substack)
    .unwrap();

  let chained = ChainedRegistry::new()
    .with(Arc::new(fs_registry))
    .with(Arc::new(builtin));

  for reference in ["williaumwu:::aws_ec2_server", "williaumwu:::aws_key_gen_and_upload"] {
    let reference: ChildRef = reference.parse().unwrap();
    let locked = lock_child(&chained, &reference, ChildKind::Substack)
      .await
      .unwrap();
    assert_eq!(locked.alias, reference.alias());
  }

  assert_eq!(chained.list().await.unwrap().len(), 2);
}
