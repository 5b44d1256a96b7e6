use std::sync::Arc;

use strata_catalog::{ResourceCatalog, ResourceResolver};
use strata_executor::TaskExecutor;
use strata_registry::TemplateRegistry;

use crate::events::{NoopNotifier, StackNotifier};

/// External collaborators a stack talks to.
///
/// Cloning is cheap; nested stacks share the same services.
#[derive(Clone)]
pub struct StackServices {
  pub resolver: ResourceResolver,
  pub executor: Arc<dyn TaskExecutor>,
  pub registry: Arc<dyn TemplateRegistry>,
  pub notifier: Arc<dyn StackNotifier>,
}

impl StackServices {
  pub fn new(
    catalog: Arc<dyn ResourceCatalog>,
    executor: Arc<dyn TaskExecutor>,
    registry: Arc<dyn TemplateRegistry>,
  ) -> Self {
    Self {
      resolver: ResourceResolver::new(catalog),
      executor,
      registry,
      notifier: Arc::new(NoopNotifier),
    }
  }

  pub fn with_notifier(mut self, notifier: Arc<dyn StackNotifier>) -> Self {
    self.notifier = notifier;
    self
  }
}
