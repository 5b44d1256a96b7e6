//! Strata Schema
//!
//! Variable declarations for a stack and the single-pass resolver that turns
//! caller inputs into an immutable [`ResolvedVariables`] snapshot.
//!
//! # Resolution order
//!
//! For every declaration, in declaration order:
//! 1. the caller-supplied value, when present and not null
//! 2. the declared default, when not null
//! 3. the declared [`Fallback`]: a resource catalog lookup or a computed value,
//!    evaluated against the variables resolved so far
//! 4. otherwise unresolved: an error for required variables, `null` for
//!    optional ones
//!
//! Every value passes through the declaration's [`TypeHint`] before it is
//! stored.

mod coerce;
mod declaration;
mod error;
mod inputs;
mod render;
mod resolved;
mod schema;

pub use coerce::{coerce_value, value_kind};
pub use declaration::{ComputeFn, Fallback, LookupTemplate, VariableDeclaration};
pub use error::SchemaError;
pub use inputs::Inputs;
pub use render::{b64_encode, render_template, template_environment};
pub use resolved::{ResolvedVariable, ResolvedVariables, ValueSource};
pub use schema::VariableSchema;
pub use strata_config::TypeHint;
