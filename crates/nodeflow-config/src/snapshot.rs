//! Editor export normalization.
//!
//! The visual editor saves nodes as `{ id, type: "flowNode", position, data }`
//! where `data` carries `nodeType`, `label`, `settings`, `io` and `mappings`.
//! Nodes already in the engine shape pass through untouched, so a document
//! may mix both.

use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::graph::Graph;
use crate::node::{Node, PortSet};

const EDITOR_NODE_TYPE: &str = "flowNode";

pub(crate) fn normalize(mut root: Value) -> Result<Graph, ConfigError> {
  if let Some(nodes) = root.get_mut("nodes").and_then(Value::as_array_mut) {
    for node in nodes.iter_mut() {
      if is_editor_node(node) {
        let flat = flatten_editor_node(node)?;
        *node = serde_json::to_value(flat)?;
      }
    }
  }

  Ok(serde_json::from_value(root)?)
}

fn is_editor_node(node: &Value) -> bool {
  node
    .get("type")
    .and_then(Value::as_str)
    .is_some_and(|t| t.eq_ignore_ascii_case(EDITOR_NODE_TYPE))
    && node.get("data").is_some_and(Value::is_object)
}

fn flatten_editor_node(node: &Value) -> Result<Node, ConfigError> {
  let id = node
    .get("id")
    .and_then(Value::as_str)
    .unwrap_or_default()
    .to_string();
  let data = &node["data"];

  let node_type = data
    .get("nodeType")
    .and_then(Value::as_str)
    .ok_or_else(|| ConfigError::InvalidSnapshot {
      node_id: id.clone(),
      message: "missing data.nodeType".to_string(),
    })?
    .to_string();

  let label = data
    .get("label")
    .and_then(Value::as_str)
    .unwrap_or_default()
    .to_string();

  let settings = match data.get("settings") {
    Some(Value::Object(map)) => map.clone(),
    _ => Map::new(),
  };

  let io: PortSet = match data.get("io") {
    Some(io) if !io.is_null() => serde_json::from_value(io.clone())?,
    _ => PortSet::default(),
  };

  let mappings = match data.get("mappings") {
    Some(m) if !m.is_null() => serde_json::from_value(m.clone())?,
    _ => Vec::new(),
  };

  Ok(Node {
    id,
    node_type,
    label,
    settings,
    io,
    mappings,
  })
}
