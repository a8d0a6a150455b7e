use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::HandleMap;

/// Outcome of one run.
///
/// `outputs` and `inputs` hold everything recorded up to the point the run
/// ended, including seeded trigger values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
  pub execution_id: String,
  /// At least one node executed and no node failed.
  pub success: bool,
  pub outputs: HashMap<String, HandleMap>,
  pub inputs: HashMap<String, HandleMap>,
  /// Nodes that never became ready, in declaration order.
  pub starved: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub failure: Option<NodeFailure>,
}

/// The node that ended a run, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFailure {
  pub node_id: String,
  pub node_type: String,
  pub message: String,
}

impl ExecutionResult {
  pub fn output(&self, node_id: &str, handle: &str) -> Option<&Value> {
    self.outputs.get(node_id)?.get(handle)
  }

  pub fn input(&self, node_id: &str, handle: &str) -> Option<&Value> {
    self.inputs.get(node_id)?.get(handle)
  }
}
