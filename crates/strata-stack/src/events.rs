//! Stack events and notifiers.
//!
//! Everything a stack publishes with `output_to_ui`, plus lifecycle
//! milestones, is forwarded to a [`StackNotifier`]. Delivery is best effort
//! and never fails the stack.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Events emitted while a stack runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StackEvent {
  /// Variable resolution has started.
  StackStarted { run_id: String, stack: String },

  /// All declared variables are resolved. Only names are reported.
  VariablesResolved {
    run_id: String,
    stack: String,
    variables: Vec<String>,
  },

  /// A child was accepted by the executor.
  ChildSubmitted {
    run_id: String,
    stack: String,
    alias: String,
    stateful_id: String,
    resubmission: bool,
  },

  /// A child submission failed; the stack is aborted.
  SubmissionFailed {
    run_id: String,
    stack: String,
    alias: String,
    error: String,
  },

  /// Payload passed to `output_to_ui`.
  OutputEmitted {
    run_id: String,
    stack: String,
    outputs: BTreeMap<String, serde_json::Value>,
  },

  /// Results were collected.
  StackCompleted { run_id: String, stack: String },
}

/// Receives stack events.
pub trait StackNotifier: Send + Sync {
  fn notify(&self, event: StackEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl StackNotifier for NoopNotifier {
  fn notify(&self, _event: StackEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<StackEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<StackEvent>) -> Self {
    Self { sender }
  }
}

impl StackNotifier for ChannelNotifier {
  fn notify(&self, event: StackEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}

/// A notifier that logs events through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl StackNotifier for TracingNotifier {
  fn notify(&self, event: StackEvent) {
    match event {
      StackEvent::StackStarted { run_id, stack } => {
        info!(%run_id, %stack, "stack_started");
      }
      StackEvent::VariablesResolved {
        run_id,
        stack,
        variables,
      } => {
        info!(%run_id, %stack, ?variables, "variables_resolved");
      }
      StackEvent::ChildSubmitted {
        run_id,
        stack,
        alias,
        stateful_id,
        resubmission,
      } => {
        info!(%run_id, %stack, %alias, %stateful_id, resubmission, "child_submitted");
      }
      StackEvent::SubmissionFailed {
        run_id,
        stack,
        alias,
        error,
      } => {
        error!(%run_id, %stack, %alias, %error, "submission_failed");
      }
      StackEvent::OutputEmitted {
        run_id,
        stack,
        outputs,
      } => {
        let keys: Vec<&String> = outputs.keys().collect();
        info!(%run_id, %stack, ?keys, "output_emitted");
      }
      StackEvent::StackCompleted { run_id, stack } => {
        info!(%run_id, %stack, "stack_completed");
      }
    }
  }
}
