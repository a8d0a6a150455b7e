use std::collections::HashMap;

use nodeflow_config::{Edge, Graph};

/// Edge indexes for traversal and scheduling.
///
/// Edge lists keep the graph's declaration order, which decides which edge
/// wins when several feed the same target handle.
#[derive(Debug, Clone, Default)]
pub struct Topology {
  /// target node_id -> inbound edges.
  in_edges: HashMap<String, Vec<Edge>>,
  /// source node_id -> outbound edges.
  out_edges: HashMap<String, Vec<Edge>>,
}

impl Topology {
  /// Build the indexes. Edge references are not checked here; see
  /// [`crate::Workflow::new`].
  pub fn new(graph: &Graph) -> Self {
    let mut in_edges: HashMap<String, Vec<Edge>> = HashMap::new();
    let mut out_edges: HashMap<String, Vec<Edge>> = HashMap::new();

    for edge in &graph.edges {
      in_edges
        .entry(edge.target.clone())
        .or_default()
        .push(edge.clone());
      out_edges
        .entry(edge.source.clone())
        .or_default()
        .push(edge.clone());
    }

    Self {
      in_edges,
      out_edges,
    }
  }

  pub fn in_edges(&self, node_id: &str) -> &[Edge] {
    self
      .in_edges
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  pub fn out_edges(&self, node_id: &str) -> &[Edge] {
    self
      .out_edges
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }
}
