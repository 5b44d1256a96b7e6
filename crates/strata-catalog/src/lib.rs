//! Strata Catalog
//!
//! Read-only access to the inventory of previously provisioned resources.
//!
//! The [`ResourceCatalog`] trait is the seam to the external inventory
//! service. [`ResourceResolver`] sits on top of it and enforces the
//! cardinality rules stacks rely on: a `must_be_one` query either yields
//! exactly one record or fails, it never silently picks one.
//!
//! Two local catalogs are provided: [`InMemoryCatalog`] for tests and
//! embedding, and [`FsCatalog`] which reads records from a directory of JSON
//! files.

mod catalog;
mod error;
mod fs_catalog;
mod memory;
mod query;
mod resolver;

pub use catalog::ResourceCatalog;
pub use error::{CatalogError, ResolutionError};
pub use fs_catalog::FsCatalog;
pub use memory::InMemoryCatalog;
pub use query::{LabelSelector, ResourceKind, ResourceQuery, ResourceRecord};
pub use resolver::ResourceResolver;
