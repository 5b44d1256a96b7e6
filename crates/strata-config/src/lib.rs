//! Strata Config
//!
//! This crate contains the serializable stack definition types for strata.
//! These types describe a stack before it is compiled into a runnable
//! `strata_stack::Stack`: its variable schema, its ordered children and the
//! outputs it publishes.
//!
//! Definitions are loaded from JSON files (via the CLI with
//! `strata run file stack.json`). Compiling a definition validates it against
//! the schema rules and the template registry; nothing here performs I/O.

mod child;
mod enums;
mod stack;
mod value;
mod variable;

pub use child::{ChildDef, ReexportDef};
pub use enums::{ChildKind, TypeHint};
pub use stack::StackDef;
pub use value::ArgValue;
pub use variable::{LookupDef, VariableDef};
