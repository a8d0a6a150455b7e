//! Run-scoped execution state.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::Span;

/// Handle name -> value.
pub type HandleMap = serde_json::Map<String, Value>;

/// State owned by a single run.
///
/// The scheduler mutates `outputs` and `inputs` between node invocations;
/// processors only see a shared reference. `globals` is the one place a
/// processor may write run-scoped state.
#[derive(Debug)]
pub struct ExecutionContext {
  pub execution_id: String,
  pub workflow_id: String,
  /// node_id -> handles produced (or seeded) for that node.
  pub outputs: HashMap<String, HandleMap>,
  /// node_id -> handles the node was invoked with.
  pub inputs: HashMap<String, HandleMap>,
  globals: RwLock<HandleMap>,
  cancel: CancellationToken,
  span: Span,
}

impl ExecutionContext {
  pub fn new(workflow_id: impl Into<String>, cancel: CancellationToken) -> Self {
    let execution_id = uuid::Uuid::new_v4().to_string();
    let workflow_id = workflow_id.into();
    let span = tracing::info_span!(
      "execution",
      execution_id = %execution_id,
      workflow_id = %workflow_id,
    );

    Self {
      execution_id,
      workflow_id,
      outputs: HashMap::new(),
      inputs: HashMap::new(),
      globals: RwLock::new(HandleMap::new()),
      cancel,
      span,
    }
  }

  /// Write a value into a node's outputs and inputs.
  pub fn seed(&mut self, node_id: &str, handle: &str, value: Value) {
    self
      .outputs
      .entry(node_id.to_string())
      .or_default()
      .insert(handle.to_string(), value.clone());
    self
      .inputs
      .entry(node_id.to_string())
      .or_default()
      .insert(handle.to_string(), value);
  }

  pub fn output(&self, node_id: &str, handle: &str) -> Option<&Value> {
    self.outputs.get(node_id)?.get(handle)
  }

  pub fn cancellation(&self) -> &CancellationToken {
    &self.cancel
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancel.is_cancelled()
  }

  /// Span tagged with this run's ids, for processors that log.
  pub fn span(&self) -> &Span {
    &self.span
  }

  pub fn global(&self, key: &str) -> Option<Value> {
    self
      .globals
      .read()
      .unwrap_or_else(|e| e.into_inner())
      .get(key)
      .cloned()
  }

  pub fn set_global(&self, key: impl Into<String>, value: Value) {
    self
      .globals
      .write()
      .unwrap_or_else(|e| e.into_inner())
      .insert(key.into(), value);
  }
}
