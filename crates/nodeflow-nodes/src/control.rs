//! Routing and timing processors.

use std::time::Duration;

use async_trait::async_trait;
use nodeflow_expr::JsonQuery;
use nodeflow_runtime::{HandleMap, NodeExecutionArgs, NodeProcessor, ProcessorError};
use serde_json::{Value, json};
use tracing::debug;

use crate::args::{handles, input, input_or_all, setting_i64, text};

/// Two-way branch. Routes `input` (or all inputs) to the `true` or `false`
/// handle depending on the `condition` query evaluated over `{ inputs }`.
/// A missing condition counts as true.
#[derive(Debug, Clone, Copy)]
pub struct If;

impl If {
  fn holds(condition: Option<&str>, inputs: &HandleMap) -> bool {
    let Some(condition) = condition else {
      return true;
    };

    let scope = json!({ "inputs": inputs });
    match JsonQuery.search(&scope, condition) {
      Some(Value::Bool(b)) => b,
      Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
      Some(_) => true,
      None => false,
    }
  }
}

#[async_trait]
impl NodeProcessor for If {
  fn node_type(&self) -> &str {
    "if"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let condition = args.node.setting_str("condition");
    let branch = if Self::holds(condition.as_deref(), args.inputs) {
      "true"
    } else {
      "false"
    };

    debug!(node_id = %args.node.id, branch, "branch_selected");
    Ok(handles([(branch, input_or_all(args.inputs, "input"))]))
  }
}

/// Multi-way branch on the text of `value`. `cases` is a list of handle
/// names, compared case-insensitively; no match routes to `default`.
#[derive(Debug, Clone, Copy)]
pub struct Switch;

#[async_trait]
impl NodeProcessor for Switch {
  fn node_type(&self) -> &str {
    "switch"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let value = input(args.inputs, "value");
    let needle = text(&value);

    let matched = args
      .node
      .setting("cases")
      .and_then(Value::as_array)
      .into_iter()
      .flatten()
      .filter_map(Value::as_str)
      .find(|case| case.eq_ignore_ascii_case(&needle))
      .unwrap_or("default");

    Ok(handles([(matched, value)]))
  }
}

/// Upper bound on `loop` iterations.
pub const MAX_LOOP_ITERATIONS: i64 = 10_000;

/// Emits `iterations` copies of `input` on `each`, then `done: true`.
/// More than [`MAX_LOOP_ITERATIONS`] is rejected.
#[derive(Debug, Clone, Copy)]
pub struct Loop;

#[async_trait]
impl NodeProcessor for Loop {
  fn node_type(&self) -> &str {
    "loop"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let iterations = setting_i64(args.node, "iterations", 1).max(0);
    if iterations > MAX_LOOP_ITERATIONS {
      return Err(ProcessorError::invalid_input(format!(
        "iterations {} exceeds the limit of {}",
        iterations, MAX_LOOP_ITERATIONS
      )));
    }
    let iterations = iterations as usize;
    let item = input(args.inputs, "input");

    Ok(handles([
      ("each", Value::Array(vec![item; iterations])),
      ("done", json!(true)),
    ]))
  }
}

/// Waits `ms` milliseconds (default 1000) then forwards `input` on `output`.
#[derive(Debug, Clone, Copy)]
pub struct Delay;

#[async_trait]
impl NodeProcessor for Delay {
  fn node_type(&self) -> &str {
    "delay"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let ms = setting_i64(args.node, "ms", 1000).max(0) as u64;

    tokio::select! {
      _ = tokio::time::sleep(Duration::from_millis(ms)) => {}
      _ = args.context.cancellation().cancelled() => {
        return Err(ProcessorError::Cancelled);
      }
    }

    Ok(handles([("output", input(args.inputs, "input"))]))
  }
}

/// Forwards `input` on `try`. Errors are not caught; a failing node still
/// aborts the run.
#[derive(Debug, Clone, Copy)]
pub struct TryCatch;

#[async_trait]
impl NodeProcessor for TryCatch {
  fn node_type(&self) -> &str {
    "tryCatch"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    Ok(handles([("try", input(args.inputs, "input"))]))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use nodeflow_config::Node;
  use nodeflow_runtime::ExecutionContext;
  use tokio_util::sync::CancellationToken;

  async fn run(
    processor: &dyn NodeProcessor,
    node: &Node,
    inputs: HandleMap,
  ) -> Result<HandleMap, ProcessorError> {
    let ctx = ExecutionContext::new("wf", CancellationToken::new());
    processor
      .execute(NodeExecutionArgs {
        node,
        context: &ctx,
        inputs: &inputs,
      })
      .await
  }

  #[tokio::test]
  async fn test_if_routes_on_condition() {
    let node = Node::new("i", "if").with_setting("condition", json!("inputs.input.n > `3`"));

    let out = run(&If, &node, handles([("input", json!({"n": 5}))])).await.unwrap();
    assert_eq!(out["true"], json!({"n": 5}));
    assert!(!out.contains_key("false"));

    let out = run(&If, &node, handles([("input", json!({"n": 1}))])).await.unwrap();
    assert_eq!(out["false"], json!({"n": 1}));
  }

  #[tokio::test]
  async fn test_if_without_condition_is_true() {
    let node = Node::new("i", "if");
    let out = run(&If, &node, handles([("a", json!(1))])).await.unwrap();
    assert_eq!(out["true"], json!({"a": 1}));
  }

  #[test]
  fn test_if_truthiness() {
    let inputs = handles([("flag", json!("TRUE")), ("obj", json!({})), ("no", json!("nope"))]);
    assert!(If::holds(Some("inputs.flag"), &inputs));
    assert!(If::holds(Some("inputs.obj"), &inputs));
    assert!(!If::holds(Some("inputs.no"), &inputs));
    assert!(!If::holds(Some("inputs.missing"), &inputs));
  }

  #[tokio::test]
  async fn test_switch_matches_case_insensitively() {
    let node = Node::new("s", "switch").with_setting("cases", json!(["red", "Green"]));

    let out = run(&Switch, &node, handles([("value", json!("green"))])).await.unwrap();
    assert_eq!(out["Green"], json!("green"));

    let out = run(&Switch, &node, handles([("value", json!("blue"))])).await.unwrap();
    assert_eq!(out["default"], json!("blue"));
  }

  #[tokio::test]
  async fn test_loop_repeats_input() {
    let node = Node::new("l", "loop").with_setting("iterations", json!(3));
    let out = run(&Loop, &node, handles([("input", json!("x"))])).await.unwrap();
    assert_eq!(out["each"], json!(["x", "x", "x"]));
    assert_eq!(out["done"], json!(true));
  }

  #[tokio::test]
  async fn test_loop_rejects_excessive_iterations() {
    let node = Node::new("l", "loop").with_setting("iterations", json!(i64::MAX));
    let err = run(&Loop, &node, handles([("input", json!("x"))])).await.unwrap_err();
    assert!(matches!(err, ProcessorError::InvalidInput { .. }));

    let node = Node::new("l", "loop").with_setting("iterations", json!(MAX_LOOP_ITERATIONS));
    let out = run(&Loop, &node, handles([("input", json!(1))])).await.unwrap();
    assert_eq!(out["each"].as_array().map(Vec::len), Some(MAX_LOOP_ITERATIONS as usize));
  }

  #[tokio::test]
  async fn test_delay_forwards_input() {
    let node = Node::new("d", "delay").with_setting("ms", json!(1));
    let out = run(&Delay, &node, handles([("input", json!(42))])).await.unwrap();
    assert_eq!(out["output"], json!(42));
  }

  #[tokio::test]
  async fn test_delay_observes_cancellation() {
    let node = Node::new("d", "delay").with_setting("ms", json!(60_000));
    let cancel = CancellationToken::new();
    let ctx = ExecutionContext::new("wf", cancel.clone());
    cancel.cancel();

    let inputs = HandleMap::new();
    let err = Delay
      .execute(NodeExecutionArgs {
        node: &node,
        context: &ctx,
        inputs: &inputs,
      })
      .await
      .unwrap_err();
    assert!(matches!(err, ProcessorError::Cancelled));
  }
}
