use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("node not found: {0}")]
  NodeNotFound(String),

  #[error("duplicate node id: {0}")]
  DuplicateNode(String),

  #[error("edge '{edge_id}' references unknown node: source={source_id}, target={target_id}")]
  InvalidEdge {
    edge_id: String,
    source_id: String,
    target_id: String,
  },
}
