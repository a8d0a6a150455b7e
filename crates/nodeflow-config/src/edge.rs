use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mapping::MappingRule;

/// A directed data link from one node's output handle to another node's
/// input handle.
///
/// Either handle may be omitted; the engine infers it from what the source
/// produced and what the target declares. Blank handles count as omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
  #[serde(default)]
  pub id: String,
  pub source: String,
  pub target: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_handle: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_handle: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mapping: Option<EdgeMapping>,
}

/// Reshapes the value travelling along an edge.
///
/// The result starts as a copy of `target_template` (or `{}`) and each rule
/// writes one derived field into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeMapping {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_template: Option<Value>,
  #[serde(default)]
  pub rules: Vec<MappingRule>,
}

impl Edge {
  pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
    let source = source.into();
    let target = target.into();
    Self {
      id: format!("{}->{}", source, target),
      source,
      target,
      source_handle: None,
      target_handle: None,
      label: None,
      mapping: None,
    }
  }

  pub fn with_handles(
    mut self,
    source_handle: impl Into<String>,
    target_handle: impl Into<String>,
  ) -> Self {
    self.source_handle = Some(source_handle.into());
    self.target_handle = Some(target_handle.into());
    self
  }

  pub fn with_mapping(mut self, mapping: EdgeMapping) -> Self {
    self.mapping = Some(mapping);
    self
  }

  /// Explicit source handle, ignoring blank strings.
  pub fn source_handle(&self) -> Option<&str> {
    non_blank(self.source_handle.as_deref())
  }

  /// Explicit target handle, ignoring blank strings.
  pub fn target_handle(&self) -> Option<&str> {
    non_blank(self.target_handle.as_deref())
  }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
  s.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_blank_handles_are_absent() {
    let edge: Edge = serde_json::from_value(json!({
      "id": "e1",
      "source": "a",
      "target": "b",
      "sourceHandle": "  ",
      "targetHandle": "input"
    }))
    .unwrap();

    assert_eq!(edge.source_handle(), None);
    assert_eq!(edge.target_handle(), Some("input"));
  }

  #[test]
  fn test_edge_mapping_shape() {
    let edge: Edge = serde_json::from_value(json!({
      "source": "a",
      "target": "b",
      "mapping": {
        "targetTemplate": {"kind": "user"},
        "rules": [{"targetPath": "name", "expression": "body.name"}]
      }
    }))
    .unwrap();

    let mapping = edge.mapping.unwrap();
    assert_eq!(mapping.target_template, Some(json!({"kind": "user"})));
    assert_eq!(mapping.rules[0].target_path, "name");
  }
}
