//! Pure JSON and text transforms.
//!
//! None of these touch the outside world. Query failures are logged by the
//! evaluator and surface here as fallbacks, never as errors; the only
//! processor that can fail is [`RegexExtract`] on a bad pattern.

use async_trait::async_trait;
use nodeflow_expr::{JsonQuery, TemplateRenderer, looks_like_json};
use nodeflow_runtime::{HandleMap, NodeExecutionArgs, NodeProcessor, ProcessorError};
use regex::Regex;
use serde_json::{Map, Value};

use crate::args::{handles, input, input_or_all, number, setting_str, text, to_f64};

/// Blank settings count as absent.
fn expression(args: &NodeExecutionArgs<'_>, key: &str) -> Option<String> {
  args
    .node
    .setting_str(key)
    .filter(|s| !s.trim().is_empty())
}

/// Runs the `expression` query over `input` (or all inputs) → `result`.
#[derive(Debug, Clone, Copy)]
pub struct JsonTransform;

#[async_trait]
impl NodeProcessor for JsonTransform {
  fn node_type(&self) -> &str {
    "jsonTransform"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let source = input_or_all(args.inputs, "input");
    let result = match expression(&args, "expression") {
      Some(expr) => JsonQuery.search(&source, &expr).unwrap_or(Value::Null),
      None => source,
    };
    Ok(handles([("result", result)]))
  }
}

/// Runs `mapper` over `array` → `result`; the array itself when the query
/// yields nothing.
#[derive(Debug, Clone, Copy)]
pub struct ArrayMap;

#[async_trait]
impl NodeProcessor for ArrayMap {
  fn node_type(&self) -> &str {
    "arrayMap"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let array = input(args.inputs, "array");
    let result = expression(&args, "mapper")
      .and_then(|expr| JsonQuery.search(&array, &expr))
      .unwrap_or(array);
    Ok(handles([("result", result)]))
  }
}

/// Keeps the elements of `array` matching `predicate` → `result`.
#[derive(Debug, Clone, Copy)]
pub struct ArrayFilter;

#[async_trait]
impl NodeProcessor for ArrayFilter {
  fn node_type(&self) -> &str {
    "arrayFilter"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let array = input(args.inputs, "array");
    let result = expression(&args, "predicate")
      .and_then(|pred| JsonQuery.search(&array, &format!("[?{}]", pred)))
      .unwrap_or(array);
    Ok(handles([("result", result)]))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MathOperator {
  Add,
  Subtract,
  Multiply,
  Divide,
}

impl MathOperator {
  /// Picks the operator named in an expression like `a * b`.
  fn from_expression(expr: &str) -> Self {
    if expr.contains('*') {
      MathOperator::Multiply
    } else if expr.contains('/') {
      MathOperator::Divide
    } else if expr.contains('-') {
      MathOperator::Subtract
    } else {
      MathOperator::Add
    }
  }

  fn apply(self, a: f64, b: f64) -> f64 {
    match self {
      MathOperator::Add => a + b,
      MathOperator::Subtract => a - b,
      MathOperator::Multiply => a * b,
      MathOperator::Divide if b == 0.0 => f64::NAN,
      MathOperator::Divide => a / b,
    }
  }
}

/// Binary arithmetic on inputs `a` and `b` → `result`. Division by zero
/// yields null.
#[derive(Debug, Clone, Copy)]
pub struct MathOp;

#[async_trait]
impl NodeProcessor for MathOp {
  fn node_type(&self) -> &str {
    "mathOp"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let op = MathOperator::from_expression(&setting_str(args.node, "expression", "a + b"));
    let a = to_f64(&input(args.inputs, "a"));
    let b = to_f64(&input(args.inputs, "b"));
    Ok(handles([("result", number(op.apply(a, b)))]))
  }
}

/// Joins `left` and `right` with `separator` (default a space) → `text`.
#[derive(Debug, Clone, Copy)]
pub struct StringConcat;

#[async_trait]
impl NodeProcessor for StringConcat {
  fn node_type(&self) -> &str {
    "stringConcat"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let separator = setting_str(args.node, "separator", " ");
    let left = text(&input(args.inputs, "left"));
    let right = text(&input(args.inputs, "right"));
    Ok(handles([("text", Value::String(format!("{}{}{}", left, separator, right)))]))
  }
}

/// Renders `template` → `text`.
///
/// The model is the `context` input, else the only input, else all inputs.
/// A string model holding JSON is parsed first.
#[derive(Debug, Clone, Copy)]
pub struct StringTemplate;

impl StringTemplate {
  fn model(inputs: &HandleMap) -> Value {
    let model = match inputs.get("context") {
      Some(context) => context.clone(),
      None if inputs.len() == 1 => inputs.values().next().cloned().unwrap_or(Value::Null),
      None => Value::Object(inputs.clone()),
    };

    match model {
      Value::String(s) if looks_like_json(&s) => serde_json::from_str(&s).unwrap_or(Value::String(s)),
      other => other,
    }
  }
}

#[async_trait]
impl NodeProcessor for StringTemplate {
  fn node_type(&self) -> &str {
    "stringTemplate"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let template = setting_str(args.node, "template", "");
    let rendered = TemplateRenderer.render(&template, &Self::model(args.inputs));
    Ok(handles([("text", Value::String(rendered))]))
  }
}

/// All matches of `pattern` in `text` → `matches`.
#[derive(Debug, Clone, Copy)]
pub struct RegexExtract;

#[async_trait]
impl NodeProcessor for RegexExtract {
  fn node_type(&self) -> &str {
    "regexExtract"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let pattern = setting_str(args.node, "pattern", "");
    let regex = Regex::new(&pattern)
      .map_err(|e| ProcessorError::invalid_input(format!("bad pattern '{}': {}", pattern, e)))?;

    let haystack = text(&input(args.inputs, "text"));
    let matches = regex
      .find_iter(&haystack)
      .map(|m| Value::String(m.as_str().to_string()))
      .collect();

    Ok(handles([("matches", Value::Array(matches))]))
  }
}

/// Merges objects `left` and `right` → `result`. Right wins on conflicts;
/// `strategy: deep` recurses into nested objects. Non-objects merge as `{}`.
#[derive(Debug, Clone, Copy)]
pub struct JsonMerge;

impl JsonMerge {
  fn as_object(value: Value) -> Map<String, Value> {
    match value {
      Value::Object(map) => map,
      _ => Map::new(),
    }
  }

  fn shallow(mut left: Map<String, Value>, right: Map<String, Value>) -> Map<String, Value> {
    left.extend(right);
    left
  }

  fn deep(mut left: Map<String, Value>, right: Map<String, Value>) -> Map<String, Value> {
    for (key, incoming) in right {
      let merged = match (left.remove(&key), incoming) {
        (Some(Value::Object(a)), Value::Object(b)) => Value::Object(Self::deep(a, b)),
        (Some(existing), Value::Null) => existing,
        (_, incoming) => incoming,
      };
      left.insert(key, merged);
    }
    left
  }
}

#[async_trait]
impl NodeProcessor for JsonMerge {
  fn node_type(&self) -> &str {
    "jsonMerge"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let left = Self::as_object(input(args.inputs, "left"));
    let right = Self::as_object(input(args.inputs, "right"));

    let merged = if setting_str(args.node, "strategy", "shallow").eq_ignore_ascii_case("deep") {
      Self::deep(left, right)
    } else {
      Self::shallow(left, right)
    };

    Ok(handles([("result", Value::Object(merged))]))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use nodeflow_config::Node;
  use nodeflow_runtime::ExecutionContext;
  use serde_json::json;
  use tokio_util::sync::CancellationToken;

  async fn run(
    processor: &dyn NodeProcessor,
    node: Node,
    inputs: HandleMap,
  ) -> Result<HandleMap, ProcessorError> {
    let ctx = ExecutionContext::new("wf", CancellationToken::new());
    processor
      .execute(NodeExecutionArgs {
        node: &node,
        context: &ctx,
        inputs: &inputs,
      })
      .await
  }

  #[tokio::test]
  async fn test_json_transform() {
    let node = Node::new("t", "jsonTransform").with_setting("expression", json!("user.name"));
    let out = run(&JsonTransform, node, handles([("input", json!({"user": {"name": "ada"}}))]))
      .await
      .unwrap();
    assert_eq!(out["result"], json!("ada"));
  }

  #[tokio::test]
  async fn test_json_transform_blank_expression_passes_input() {
    let node = Node::new("t", "jsonTransform").with_setting("expression", json!("  "));
    let out = run(&JsonTransform, node, handles([("a", json!(1))])).await.unwrap();
    assert_eq!(out["result"], json!({"a": 1}));
  }

  #[tokio::test]
  async fn test_array_map_and_filter() {
    let items = json!([{"n": 1}, {"n": 4}, {"n": 7}]);

    let node = Node::new("m", "arrayMap").with_setting("mapper", json!("[*].n"));
    let out = run(&ArrayMap, node, handles([("array", items.clone())])).await.unwrap();
    assert_eq!(out["result"], json!([1, 4, 7]));

    let node = Node::new("f", "arrayFilter").with_setting("predicate", json!("n > `3`"));
    let out = run(&ArrayFilter, node, handles([("array", items.clone())])).await.unwrap();
    assert_eq!(out["result"], json!([{"n": 4}, {"n": 7}]));

    let node = Node::new("f", "arrayFilter");
    let out = run(&ArrayFilter, node, handles([("array", items.clone())])).await.unwrap();
    assert_eq!(out["result"], items);
  }

  #[test]
  fn test_math_operator_selection() {
    assert_eq!(MathOperator::from_expression("a * b"), MathOperator::Multiply);
    assert_eq!(MathOperator::from_expression("a / b"), MathOperator::Divide);
    assert_eq!(MathOperator::from_expression("a - b"), MathOperator::Subtract);
    assert_eq!(MathOperator::from_expression("sum"), MathOperator::Add);
  }

  #[tokio::test]
  async fn test_math_op() {
    let node = Node::new("m", "mathOp").with_setting("expression", json!("a * b"));
    let out = run(&MathOp, node, handles([("a", json!("3")), ("b", json!(2.5))])).await.unwrap();
    assert_eq!(out["result"], json!(7.5));

    let node = Node::new("m", "mathOp").with_setting("expression", json!("a / b"));
    let out = run(&MathOp, node, handles([("a", json!(3)), ("b", json!(0))])).await.unwrap();
    assert_eq!(out["result"], Value::Null);

    let node = Node::new("m", "mathOp");
    let out = run(&MathOp, node, handles([("a", json!(2))])).await.unwrap();
    assert_eq!(out["result"], json!(2));
  }

  #[tokio::test]
  async fn test_string_concat() {
    let node = Node::new("c", "stringConcat").with_setting("separator", json!(", "));
    let out = run(&StringConcat, node, handles([("left", json!("a")), ("right", json!(1))]))
      .await
      .unwrap();
    assert_eq!(out["text"], json!("a, 1"));
  }

  #[tokio::test]
  async fn test_string_template_model_selection() {
    let node = || Node::new("s", "stringTemplate").with_setting("template", json!("hi {{ name }}"));

    let out = run(&StringTemplate, node(), handles([("context", json!({"name": "ctx"})), ("x", json!(1))]))
      .await
      .unwrap();
    assert_eq!(out["text"], json!("hi ctx"));

    let out = run(&StringTemplate, node(), handles([("only", json!(r#"{"name": "parsed"}"#))]))
      .await
      .unwrap();
    assert_eq!(out["text"], json!("hi parsed"));

    let out = run(&StringTemplate, node(), handles([("name", json!("all")), ("y", json!(2))]))
      .await
      .unwrap();
    assert_eq!(out["text"], json!("hi all"));
  }

  #[tokio::test]
  async fn test_regex_extract() {
    let node = Node::new("r", "regexExtract").with_setting("pattern", json!(r"\d+"));
    let out = run(&RegexExtract, node, handles([("text", json!("a1 b22 c333"))])).await.unwrap();
    assert_eq!(out["matches"], json!(["1", "22", "333"]));
  }

  #[tokio::test]
  async fn test_regex_extract_rejects_bad_pattern() {
    let node = Node::new("r", "regexExtract").with_setting("pattern", json!("(unclosed"));
    let err = run(&RegexExtract, node, HandleMap::new()).await.unwrap_err();
    assert!(matches!(err, ProcessorError::InvalidInput { .. }));
  }

  #[tokio::test]
  async fn test_json_merge_strategies() {
    let inputs = || {
      handles([
        ("left", json!({"a": {"x": 1, "y": 2}, "keep": true})),
        ("right", json!({"a": {"y": 3}, "new": 1})),
      ])
    };

    let out = run(&JsonMerge, Node::new("j", "jsonMerge"), inputs()).await.unwrap();
    assert_eq!(out["result"], json!({"a": {"y": 3}, "keep": true, "new": 1}));

    let node = Node::new("j", "jsonMerge").with_setting("strategy", json!("deep"));
    let out = run(&JsonMerge, node, inputs()).await.unwrap();
    assert_eq!(out["result"], json!({"a": {"x": 1, "y": 3}, "keep": true, "new": 1}));
  }

  #[tokio::test]
  async fn test_json_merge_ignores_non_objects() {
    let out = run(
      &JsonMerge,
      Node::new("j", "jsonMerge"),
      handles([("left", json!([1, 2])), ("right", json!({"b": 1}))]),
    )
    .await
    .unwrap();
    assert_eq!(out["result"], json!({"b": 1}));
  }
}
