//! Execution events and notifiers for observability.
//!
//! The runtime emits an event at each scheduling step so that hosts can
//! stream progress to an editor, persist run history, or ignore it.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExecutionEvent {
  /// The run has started.
  RunStarted {
    execution_id: String,
    workflow_id: String,
  },

  /// A node had an unready dependency and was put back on the queue.
  NodeRequeued {
    execution_id: String,
    node_id: String,
  },

  /// A node's inputs are resolved and its processor is about to run.
  NodeStarted {
    execution_id: String,
    node_id: String,
    inputs: serde_json::Value,
  },

  /// A node has completed and its outputs are recorded.
  NodeCompleted {
    execution_id: String,
    node_id: String,
    outputs: serde_json::Value,
  },

  /// A node failed, ending the run.
  NodeFailed {
    execution_id: String,
    node_id: String,
    error: String,
  },

  /// The run has ended.
  RunCompleted {
    execution_id: String,
    success: bool,
    starved: Vec<String>,
  },
}

/// Receives execution events.
///
/// The runtime calls `notify` inline, so implementations should not block.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// Forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // Unbounded so a slow consumer never stalls the scheduler.
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Receiver may have been dropped.
    let _ = self.sender.send(event);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_event_serialization() {
    let event = ExecutionEvent::NodeRequeued {
      execution_id: "e".to_string(),
      node_id: "n".to_string(),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "node_requeued");
    assert_eq!(json["node_id"], "n");
  }

  #[tokio::test]
  async fn test_channel_notifier_delivers() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let notifier = ChannelNotifier::new(tx);

    notifier.notify(ExecutionEvent::RunStarted {
      execution_id: "e".to_string(),
      workflow_id: "w".to_string(),
    });

    assert!(matches!(
      rx.recv().await,
      Some(ExecutionEvent::RunStarted { execution_id, .. }) if execution_id == "e"
    ));
  }

  #[test]
  fn test_channel_notifier_ignores_closed_receiver() {
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    ChannelNotifier::new(tx).notify(ExecutionEvent::RunCompleted {
      execution_id: "e".to_string(),
      success: true,
      starved: vec![],
    });
  }
}
