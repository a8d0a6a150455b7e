use nodeflow_config::{EdgeMapping, MappingLanguage, MappingRule};
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::evaluator::evaluate;
use crate::path;

/// Apply a node's mapping rules to the handle map its processor returned.
///
/// Each rule is evaluated against `{ inputs, outputs }` where `outputs`
/// reflects the writes of earlier rules. The value is written into the
/// `response` handle when present, else into `result` (created as `{}` when
/// missing). A rule whose target path runs through a non-object is skipped.
pub fn apply_node_mappings(
  rules: &[MappingRule],
  inputs: &Map<String, Value>,
  mut outputs: Map<String, Value>,
) -> Map<String, Value> {
  for rule in rules {
    let view = json!({ "inputs": inputs, "outputs": &outputs });
    let value = evaluate(
      rule.language_or(MappingLanguage::Template),
      &view,
      &rule.expression,
    )
    .unwrap_or(Value::Null);

    let key = if outputs.contains_key("response") {
      "response"
    } else {
      "result"
    };
    let root = outputs
      .get(key)
      .cloned()
      .unwrap_or_else(|| Value::Object(Map::new()));

    match path::set(root, &rule.target_path, value) {
      Ok(updated) => {
        outputs.insert(key.to_string(), updated);
      }
      Err(e) => {
        warn!(
          target_path = %rule.target_path,
          handle = %key,
          error = %e,
          "mapping_rule_skipped"
        );
      }
    }
  }

  outputs
}

/// Reshape a value forwarded along an edge.
///
/// Rules default to JSON queries evaluated against `source`.
pub fn apply_edge_mapping(mapping: &EdgeMapping, source: &Value) -> Value {
  let mut target = mapping
    .target_template
    .clone()
    .unwrap_or_else(|| Value::Object(Map::new()));

  for rule in &mapping.rules {
    let value = evaluate(
      rule.language_or(MappingLanguage::JsonQuery),
      source,
      &rule.expression,
    )
    .unwrap_or(Value::Null);

    target = match path::set(target.clone(), &rule.target_path, value) {
      Ok(updated) => updated,
      Err(e) => {
        warn!(target_path = %rule.target_path, error = %e, "edge_mapping_rule_skipped");
        target
      }
    };
  }

  target
}
