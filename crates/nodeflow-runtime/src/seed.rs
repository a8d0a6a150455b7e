//! Externally supplied data injected before scheduling.

use nodeflow_config::Graph;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One seeded `(node, handle) -> value` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedValue {
  pub node_id: String,
  pub handle: String,
  pub value: Value,
}

/// Values written into trigger nodes' outputs and inputs before the first
/// node runs. Later entries for the same `(node, handle)` win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed {
  values: Vec<SeedValue>,
}

impl Seed {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, node_id: impl Into<String>, handle: impl Into<String>, value: Value) -> Self {
    self.insert(node_id, handle, value);
    self
  }

  pub fn insert(&mut self, node_id: impl Into<String>, handle: impl Into<String>, value: Value) {
    self.values.push(SeedValue {
      node_id: node_id.into(),
      handle: handle.into(),
      value,
    });
  }

  /// Seed a raw payload into the graph's first trigger node.
  ///
  /// The trigger receives `request = { body, method: "EXECUTE", path:
  /// "/api/execute" }` and `context = payload`. A graph without a trigger
  /// yields an empty seed.
  pub fn from_payload(graph: &Graph, payload: Value) -> Self {
    let Some(trigger) = graph.first_trigger() else {
      return Self::default();
    };

    let request = json!({
      "body": payload.clone(),
      "method": "EXECUTE",
      "path": "/api/execute",
    });

    Self::new()
      .with(&trigger.id, "request", request)
      .with(&trigger.id, "context", payload)
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &SeedValue> {
    self.values.iter()
  }
}

impl IntoIterator for Seed {
  type Item = SeedValue;
  type IntoIter = std::vec::IntoIter<SeedValue>;

  fn into_iter(self) -> Self::IntoIter {
    self.values.into_iter()
  }
}
