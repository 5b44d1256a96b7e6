//! Strata Registry
//!
//! Stacks address their children by opaque references such as
//! `williaumwu:::demo1-jenkins::jenkins_with_docker`. The registry maps a
//! reference to a [`TemplateManifest`] describing the task template or
//! nested stack behind it; locking a child checks that the reference exists
//! and is of the kind the stack registered it as.

mod chained;
mod error;
mod fs_registry;
mod manifest;
mod reference;
mod registry;

pub use chained::ChainedRegistry;
pub use error::RegistryError;
pub use fs_registry::FsTemplateRegistry;
pub use manifest::{LockedChild, TemplateManifest};
pub use reference::ChildRef;
pub use registry::{InMemoryRegistry, TemplateRegistry, lock_child};
pub use strata_config::ChildKind;
