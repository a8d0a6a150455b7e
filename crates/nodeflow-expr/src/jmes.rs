use serde_json::Value;
use tracing::warn;

use crate::evaluator::Evaluator;

/// JMESPath query evaluator.
///
/// A null result (no match, missing field) is reported as `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonQuery;

impl JsonQuery {
  /// Run `expression` against `source`, returning `None` on any failure.
  pub fn search(&self, source: &Value, expression: &str) -> Option<Value> {
    let compiled = match jmespath::compile(expression) {
      Ok(expr) => expr,
      Err(e) => {
        warn!(expression = %expression, error = %e, "json_query_compile_failed");
        return None;
      }
    };

    let result = match compiled.search(source) {
      Ok(result) => result,
      Err(e) => {
        warn!(expression = %expression, error = %e, "json_query_search_failed");
        return None;
      }
    };

    if result.is_null() {
      return None;
    }

    match serde_json::to_value(&*result) {
      Ok(value) => Some(value),
      Err(e) => {
        warn!(expression = %expression, error = %e, "json_query_result_invalid");
        None
      }
    }
  }
}

impl Evaluator for JsonQuery {
  fn evaluate(&self, source: &Value, expression: &str) -> Option<Value> {
    self.search(source, expression)
  }
}
