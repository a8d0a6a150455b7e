use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::error::ConfigError;
use crate::node::Node;
use crate::snapshot;

/// A complete flow graph.
///
/// Node order is significant: the scheduler enqueues nodes in declaration
/// order, and edges into the same target handle are applied in declaration
/// order with later edges winning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
  #[serde(default, alias = "pipelineId")]
  pub id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default = "default_version")]
  pub version: u32,
  #[serde(default)]
  pub nodes: Vec<Node>,
  #[serde(default)]
  pub edges: Vec<Edge>,
}

fn default_version() -> u32 {
  1
}

impl Graph {
  pub fn new(id: impl Into<String>, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
    Self {
      id: id.into(),
      title: None,
      version: default_version(),
      nodes,
      edges,
    }
  }

  /// Parse a graph from either the engine shape or an editor export.
  pub fn from_json(json: &str) -> Result<Self, ConfigError> {
    let root: serde_json::Value = serde_json::from_str(json)?;
    snapshot::normalize(root)
  }

  pub fn get_node(&self, node_id: &str) -> Option<&Node> {
    self.nodes.iter().find(|n| n.id == node_id)
  }

  /// The first node, in declaration order, that accepts external payloads.
  pub fn first_trigger(&self) -> Option<&Node> {
    self.nodes.iter().find(|n| n.is_trigger())
  }
}
