//! Accessors for loosely-typed settings and inputs.

use nodeflow_config::Node;
use nodeflow_runtime::HandleMap;
use serde_json::{Number, Value};

/// The named input, or null.
pub(crate) fn input(inputs: &HandleMap, key: &str) -> Value {
  inputs.get(key).cloned().unwrap_or(Value::Null)
}

/// The named input, or every input as one object.
pub(crate) fn input_or_all(inputs: &HandleMap, key: &str) -> Value {
  inputs
    .get(key)
    .cloned()
    .unwrap_or_else(|| Value::Object(inputs.clone()))
}

/// Text form of a value: strings unquoted, null empty, everything else as
/// JSON.
pub(crate) fn text(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// A string setting, or `default` when absent or null.
pub(crate) fn setting_str(node: &Node, key: &str, default: &str) -> String {
  node.setting_str(key).unwrap_or_else(|| default.to_string())
}

/// An integer setting given as a number or numeric string.
pub(crate) fn setting_i64(node: &Node, key: &str, default: i64) -> i64 {
  match node.setting(key) {
    Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
    Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
    _ => default,
  }
}

pub(crate) fn setting_bool(node: &Node, key: &str) -> bool {
  match node.setting(key) {
    Some(Value::Bool(b)) => *b,
    Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
    _ => false,
  }
}

/// Numeric coercion: numbers, numeric strings, otherwise 0.
pub(crate) fn to_f64(value: &Value) -> f64 {
  match value {
    Value::Number(n) => n.as_f64().unwrap_or(0.0),
    Value::String(s) => s.trim().parse().unwrap_or(0.0),
    _ => 0.0,
  }
}

/// JSON number for `n`: integral values become integers, non-finite values
/// become null.
pub(crate) fn number(n: f64) -> Value {
  if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
    return Value::Number(Number::from(n as i64));
  }
  Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

/// Build a handle map from `(name, value)` pairs.
pub(crate) fn handles<const N: usize>(pairs: [(&str, Value); N]) -> HandleMap {
  pairs
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

pub(crate) fn now() -> String {
  chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_text() {
    assert_eq!(text(&json!("a")), "a");
    assert_eq!(text(&Value::Null), "");
    assert_eq!(text(&json!(3)), "3");
    assert_eq!(text(&json!({"a": 1})), r#"{"a":1}"#);
  }

  #[test]
  fn test_number() {
    assert_eq!(number(5.0), json!(5));
    assert_eq!(number(2.5), json!(2.5));
    assert_eq!(number(f64::NAN), Value::Null);
    assert_eq!(number(f64::INFINITY), Value::Null);
  }

  #[test]
  fn test_settings() {
    let node = Node::new("n", "t")
      .with_setting("ms", json!("250"))
      .with_setting("once", json!(true))
      .with_setting("bad", json!("x"));
    assert_eq!(setting_i64(&node, "ms", 1), 250);
    assert_eq!(setting_i64(&node, "bad", 1), 1);
    assert_eq!(setting_i64(&node, "missing", 7), 7);
    assert!(setting_bool(&node, "once"));
    assert!(!setting_bool(&node, "missing"));
  }

  #[test]
  fn test_input_or_all() {
    let inputs = handles([("a", json!(1)), ("b", json!(2))]);
    assert_eq!(input_or_all(&inputs, "a"), json!(1));
    assert_eq!(input_or_all(&inputs, "input"), json!({"a": 1, "b": 2}));
    assert_eq!(input(&inputs, "zzz"), Value::Null);
  }
}
