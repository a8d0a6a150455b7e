use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mapping::MappingRule;

/// A single step in a flow graph.
///
/// `node_type` selects the processor that runs the node. Declared ports in
/// `io` are advisory: the engine only consults them to infer handle names
/// for edges that leave them unspecified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
  pub id: String,
  #[serde(rename = "type")]
  pub node_type: String,
  #[serde(default)]
  pub label: String,
  #[serde(default)]
  pub settings: Map<String, Value>,
  #[serde(default)]
  pub io: PortSet,
  #[serde(default)]
  pub mappings: Vec<MappingRule>,
}

/// Declared input and output ports of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortSet {
  #[serde(default)]
  pub inputs: Vec<Port>,
  #[serde(default)]
  pub outputs: Vec<Port>,
}

/// A named slot on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
  pub name: String,
  /// One of `string`, `number`, `boolean`, `object`, `array`, `any`.
  #[serde(rename = "type", default = "default_port_type")]
  pub port_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub required: Option<bool>,
}

fn default_port_type() -> String {
  "any".to_string()
}

impl Port {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      port_type: default_port_type(),
      required: None,
    }
  }
}

impl Node {
  /// Create a node with no ports, settings or mappings.
  pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      node_type: node_type.into(),
      label: String::new(),
      settings: Map::new(),
      io: PortSet::default(),
      mappings: Vec::new(),
    }
  }

  pub fn with_inputs<I, S>(mut self, names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.io.inputs = names.into_iter().map(Port::new).collect();
    self
  }

  pub fn with_outputs<I, S>(mut self, names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.io.outputs = names.into_iter().map(Port::new).collect();
    self
  }

  pub fn with_setting(mut self, key: impl Into<String>, value: Value) -> Self {
    self.settings.insert(key.into(), value);
    self
  }

  pub fn with_mapping(mut self, rule: MappingRule) -> Self {
    self.mappings.push(rule);
    self
  }

  pub fn setting(&self, key: &str) -> Option<&Value> {
    self.settings.get(key)
  }

  /// Setting rendered as a string. Non-string scalars are stringified.
  pub fn setting_str(&self, key: &str) -> Option<String> {
    match self.settings.get(key)? {
      Value::Null => None,
      Value::String(s) => Some(s.clone()),
      other => Some(other.to_string()),
    }
  }

  pub fn first_input(&self) -> Option<&str> {
    self.io.inputs.first().map(|p| p.name.as_str())
  }

  pub fn first_output(&self) -> Option<&str> {
    self.io.outputs.first().map(|p| p.name.as_str())
  }

  pub fn has_input(&self, name: &str) -> bool {
    self.io.inputs.iter().any(|p| p.name == name)
  }

  /// Whether this node starts a flow and may receive the external payload.
  pub fn is_trigger(&self) -> bool {
    let t = self.node_type.to_ascii_lowercase();
    t == "httplisten" || t == "manualtrigger" || t.ends_with("trigger")
  }
}
