//! Strata Stack Engine
//!
//! A [`Stack`] is one run of an automation composition. It declares the
//! variables it needs, registers its children, resolves everything up front
//! and then submits children one at a time, in registration order.
//!
//! # Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ declare       add_required / add_optional / set_fallback    │
//! │               add_execgroup / add_substack                  │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ init_variables(inputs)                                      │
//! │  - supplied → default → fallback (catalog lookup/computed)  │
//! │  - immutable snapshot; set_variable only fills nulls        │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ init_execgroups → init_substacks                            │
//! │  - lock each reference against the template registry        │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ insert(alias, ChildInsert) ... output_to_ui ... get_results │
//! │  - sequential, fail-fast, one stateful id per submission    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stacks can be written in Rust against this API or loaded from a
//! [`strata_config::StackDef`] with [`compile`] and [`run_definition`].

mod child;
mod declarative;
mod error;
mod events;
mod phase;
mod result;
mod services;
mod stack;

pub use child::ChildInsert;
pub use declarative::{compile, run_definition};
pub use error::StackError;
pub use events::{ChannelNotifier, NoopNotifier, StackEvent, StackNotifier, TracingNotifier};
pub use phase::Phase;
pub use result::{StackResult, SubmissionRecord};
pub use services::StackServices;
pub use stack::Stack;
