//! Task submission for strata stacks.
//!
//! A stack never runs its children itself. It hands each one to a
//! [`TaskExecutor`] as a [`TaskSubmission`] and records the
//! [`SubmissionReceipt`] it gets back. Two local adapters are provided:
//!
//! - [`RecordingExecutor`]: keeps every submission in memory, for tests and
//!   dry runs.
//! - [`SpoolExecutor`]: writes one JSON file per stateful ID into a spool
//!   directory for an external runner to pick up.

mod error;
mod executor;
mod ids;
mod receipt;
mod recording;
mod spool;
mod submission;

pub use error::SubmissionError;
pub use executor::TaskExecutor;
pub use ids::{DEFAULT_ID_SIZE, MAX_ID_SIZE, StatefulIdGenerator, validate_stateful_id};
pub use receipt::SubmissionReceipt;
pub use recording::RecordingExecutor;
pub use spool::SpoolExecutor;
pub use submission::TaskSubmission;
