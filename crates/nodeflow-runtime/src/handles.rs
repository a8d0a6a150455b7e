//! Handle name inference for edges that leave handles unspecified.
//!
//! Source handle, first match wins:
//!
//! ```text
//!   edge.sourceHandle
//!   the only handle the source has recorded so far
//!   "context" when the source is an httpListen node
//!   the source's first declared output
//!   "result"
//! ```
//!
//! Target handle, first match wins:
//!
//! ```text
//!   edge.targetHandle
//!   "context" when the target declares an input with that name
//!   the target's first declared input
//!   "context"
//! ```
//!
//! Handle names are compared case-sensitively.

use nodeflow_config::{Edge, Node};

use crate::context::HandleMap;

pub const DEFAULT_SOURCE_HANDLE: &str = "result";
pub const DEFAULT_TARGET_HANDLE: &str = "context";

const LISTENER_TYPE: &str = "httpListen";

/// Resolve which output handle of `source` feeds `edge`.
///
/// `recorded` is what the source node has produced (or been seeded with)
/// so far in this run.
pub fn resolve_source_handle(edge: &Edge, source: Option<&Node>, recorded: Option<&HandleMap>) -> String {
  if let Some(handle) = edge.source_handle() {
    return handle.to_string();
  }

  if let Some(recorded) = recorded.filter(|r| r.len() == 1) {
    if let Some(only) = recorded.keys().next() {
      return only.clone();
    }
  }

  let Some(source) = source else {
    return DEFAULT_SOURCE_HANDLE.to_string();
  };

  if source.node_type.eq_ignore_ascii_case(LISTENER_TYPE) {
    return DEFAULT_TARGET_HANDLE.to_string();
  }

  source
    .io
    .outputs
    .iter()
    .map(|p| p.name.as_str())
    .find(|name| !name.trim().is_empty())
    .unwrap_or(DEFAULT_SOURCE_HANDLE)
    .to_string()
}

/// Resolve which input handle of `target` receives `edge`.
pub fn resolve_target_handle(edge: &Edge, target: Option<&Node>) -> String {
  if let Some(handle) = edge.target_handle() {
    return handle.to_string();
  }

  let Some(target) = target else {
    return DEFAULT_TARGET_HANDLE.to_string();
  };

  if target.has_input(DEFAULT_TARGET_HANDLE) {
    return DEFAULT_TARGET_HANDLE.to_string();
  }

  target
    .io
    .inputs
    .iter()
    .map(|p| p.name.as_str())
    .find(|name| !name.trim().is_empty())
    .unwrap_or(DEFAULT_TARGET_HANDLE)
    .to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn recorded(keys: &[&str]) -> HandleMap {
    keys.iter().map(|k| (k.to_string(), json!(1))).collect()
  }

  #[test]
  fn test_explicit_source_handle_wins() {
    let edge = Edge::new("a", "b").with_handles("out", "in");
    let src = Node::new("a", "t").with_outputs(["result"]);
    let rec = recorded(&["other"]);
    assert_eq!(resolve_source_handle(&edge, Some(&src), Some(&rec)), "out");
  }

  #[test]
  fn test_single_recorded_handle() {
    let edge = Edge::new("a", "b");
    let src = Node::new("a", "t").with_outputs(["result"]);
    let rec = recorded(&["text"]);
    assert_eq!(resolve_source_handle(&edge, Some(&src), Some(&rec)), "text");
  }

  #[test]
  fn test_listener_defaults_to_context() {
    let edge = Edge::new("a", "b");
    let src = Node::new("a", "httpListen").with_outputs(["request", "context"]);
    let rec = recorded(&["request", "context"]);
    assert_eq!(resolve_source_handle(&edge, Some(&src), Some(&rec)), "context");
  }

  #[test]
  fn test_first_declared_output() {
    let edge = Edge::new("a", "b");
    let src = Node::new("a", "t").with_outputs(["", "value", "found"]);
    assert_eq!(resolve_source_handle(&edge, Some(&src), None), "value");
  }

  #[test]
  fn test_source_falls_back_to_result() {
    let edge = Edge::new("a", "b");
    let src = Node::new("a", "t");
    let rec = recorded(&["x", "y"]);
    assert_eq!(resolve_source_handle(&edge, Some(&src), Some(&rec)), "result");
    assert_eq!(resolve_source_handle(&edge, None, None), "result");
  }

  #[test]
  fn test_explicit_target_handle_wins() {
    let edge = Edge::new("a", "b").with_handles("out", "left");
    let tgt = Node::new("b", "t").with_inputs(["context"]);
    assert_eq!(resolve_target_handle(&edge, Some(&tgt)), "left");
  }

  #[test]
  fn test_target_prefers_declared_context() {
    let edge = Edge::new("a", "b");
    let tgt = Node::new("b", "t").with_inputs(["input", "context"]);
    assert_eq!(resolve_target_handle(&edge, Some(&tgt)), "context");
  }

  #[test]
  fn test_target_first_declared_input() {
    let edge = Edge::new("a", "b");
    let tgt = Node::new("b", "t").with_inputs(["array", "mapper"]);
    assert_eq!(resolve_target_handle(&edge, Some(&tgt)), "array");
  }

  #[test]
  fn test_target_default() {
    let edge = Edge::new("a", "b");
    assert_eq!(resolve_target_handle(&edge, Some(&Node::new("b", "t"))), "context");
  }

  #[test]
  fn test_handles_are_case_sensitive() {
    let edge = Edge::new("a", "b");
    let tgt = Node::new("b", "t").with_inputs(["Context", "input"]);
    assert_eq!(resolve_target_handle(&edge, Some(&tgt)), "Context");
  }
}
