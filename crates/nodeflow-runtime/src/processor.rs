//! Node processor and registry contracts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use nodeflow_config::Node;

use crate::context::{ExecutionContext, HandleMap};
use crate::error::ProcessorError;

/// Everything a processor receives for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct NodeExecutionArgs<'a> {
  pub node: &'a Node,
  pub context: &'a ExecutionContext,
  /// Resolved inputs keyed by target handle.
  pub inputs: &'a HandleMap,
}

/// Executes one node type.
///
/// A processor returns the node's output handles. Returning an error aborts
/// the whole run. Processors doing I/O should watch
/// [`ExecutionContext::cancellation`].
#[async_trait]
pub trait NodeProcessor: Send + Sync {
  /// The `node.type` this processor handles.
  fn node_type(&self) -> &str;

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError>;
}

/// Looks up the processor for a node type.
pub trait ProcessorRegistry: Send + Sync {
  fn resolve(&self, node_type: &str) -> Option<Arc<dyn NodeProcessor>>;

  /// Registered node types, sorted.
  fn node_types(&self) -> Vec<String>;
}

/// Map-backed registry. Type lookup ignores ASCII case.
#[derive(Default, Clone)]
pub struct Registry {
  processors: HashMap<String, Arc<dyn NodeProcessor>>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a processor, replacing any previous one for the same type.
  pub fn register<P: NodeProcessor + 'static>(mut self, processor: P) -> Self {
    self.insert(Arc::new(processor));
    self
  }

  pub fn insert(&mut self, processor: Arc<dyn NodeProcessor>) {
    self
      .processors
      .insert(processor.node_type().to_ascii_lowercase(), processor);
  }

  pub fn len(&self) -> usize {
    self.processors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.processors.is_empty()
  }
}

impl ProcessorRegistry for Registry {
  fn resolve(&self, node_type: &str) -> Option<Arc<dyn NodeProcessor>> {
    self
      .processors
      .get(&node_type.to_ascii_lowercase())
      .cloned()
  }

  fn node_types(&self) -> Vec<String> {
    let mut types: Vec<String> = self
      .processors
      .values()
      .map(|p| p.node_type().to_string())
      .collect();
    types.sort();
    types
  }
}

impl std::fmt::Debug for Registry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Registry")
      .field("node_types", &self.node_types())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use tokio_util::sync::CancellationToken;

  struct Echo;

  #[async_trait]
  impl NodeProcessor for Echo {
    fn node_type(&self) -> &str {
      "echoNode"
    }

    async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
      Ok(args.inputs.clone())
    }
  }

  #[test]
  fn test_resolve_ignores_case() {
    let registry = Registry::new().register(Echo);
    assert!(registry.resolve("echoNode").is_some());
    assert!(registry.resolve("ECHONODE").is_some());
    assert!(registry.resolve("other").is_none());
    assert_eq!(registry.node_types(), vec!["echoNode".to_string()]);
  }

  #[tokio::test]
  async fn test_execute_through_registry() {
    let registry = Registry::new().register(Echo);
    let node = Node::new("n", "echoNode");
    let ctx = ExecutionContext::new("wf", CancellationToken::new());
    let mut inputs = HandleMap::new();
    inputs.insert("x".to_string(), json!(1));

    let processor = registry.resolve(&node.node_type).unwrap();
    let out = processor
      .execute(NodeExecutionArgs {
        node: &node,
        context: &ctx,
        inputs: &inputs,
      })
      .await
      .unwrap();
    assert_eq!(out["x"], json!(1));
  }
}
