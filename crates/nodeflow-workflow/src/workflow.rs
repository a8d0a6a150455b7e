use std::collections::HashSet;

use nodeflow_config::{Graph, Node};

use crate::error::WorkflowError;
use crate::topology::Topology;

/// A structurally valid flow graph ready for scheduling.
#[derive(Debug, Clone)]
pub struct Workflow<'g> {
  graph: &'g Graph,
  topology: Topology,
}

impl<'g> Workflow<'g> {
  /// Validate `graph` and index its edges.
  ///
  /// Cycles are not rejected here; the scheduler bounds its attempts
  /// instead.
  pub fn new(graph: &'g Graph) -> Result<Self, WorkflowError> {
    let mut seen = HashSet::new();
    for node in &graph.nodes {
      if !seen.insert(node.id.as_str()) {
        return Err(WorkflowError::DuplicateNode(node.id.clone()));
      }
    }

    for edge in &graph.edges {
      if !seen.contains(edge.source.as_str()) || !seen.contains(edge.target.as_str()) {
        return Err(WorkflowError::InvalidEdge {
          edge_id: edge.id.clone(),
          source_id: edge.source.clone(),
          target_id: edge.target.clone(),
        });
      }
    }

    Ok(Self {
      graph,
      topology: Topology::new(graph),
    })
  }

  pub fn graph(&self) -> &'g Graph {
    self.graph
  }

  pub fn topology(&self) -> &Topology {
    &self.topology
  }

  /// Nodes in declaration order.
  pub fn nodes(&self) -> &'g [Node] {
    &self.graph.nodes
  }

  pub fn get_node(&self, node_id: &str) -> Result<&'g Node, WorkflowError> {
    self
      .graph
      .get_node(node_id)
      .ok_or_else(|| WorkflowError::NodeNotFound(node_id.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use nodeflow_config::Edge;

  #[test]
  fn test_valid_graph() {
    let graph = Graph::new(
      "g",
      vec![Node::new("a", "t"), Node::new("b", "t")],
      vec![Edge::new("a", "b")],
    );
    let wf = Workflow::new(&graph).unwrap();
    assert_eq!(wf.nodes().len(), 2);
    assert_eq!(wf.topology().out_edges("a")[0].target, "b");
    assert!(wf.get_node("b").is_ok());
    assert!(matches!(
      wf.get_node("x"),
      Err(WorkflowError::NodeNotFound(id)) if id == "x"
    ));
  }

  #[test]
  fn test_edge_to_unknown_node() {
    let graph = Graph::new("g", vec![Node::new("a", "t")], vec![Edge::new("a", "ghost")]);
    let err = Workflow::new(&graph).unwrap_err();
    assert!(matches!(
      err,
      WorkflowError::InvalidEdge { target_id, .. } if target_id == "ghost"
    ));
  }

  #[test]
  fn test_duplicate_node() {
    let graph = Graph::new("g", vec![Node::new("a", "t"), Node::new("a", "u")], vec![]);
    assert!(matches!(
      Workflow::new(&graph),
      Err(WorkflowError::DuplicateNode(id)) if id == "a"
    ));
  }

  #[test]
  fn test_cycle_is_accepted() {
    let graph = Graph::new(
      "g",
      vec![Node::new("a", "t"), Node::new("b", "t")],
      vec![Edge::new("a", "b"), Edge::new("b", "a")],
    );
    assert!(Workflow::new(&graph).is_ok());
  }
}
