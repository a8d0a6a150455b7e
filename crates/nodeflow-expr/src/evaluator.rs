use nodeflow_config::MappingLanguage;
use serde_json::Value;

use crate::jmes::JsonQuery;
use crate::template::TemplateRenderer;

/// Evaluates an expression against a JSON source document.
///
/// Implementations must not fail: errors are logged and reported as an
/// absent or empty result.
pub trait Evaluator: Send + Sync {
  fn evaluate(&self, source: &Value, expression: &str) -> Option<Value>;
}

static JSON_QUERY: JsonQuery = JsonQuery;
static TEMPLATE: TemplateRenderer = TemplateRenderer;

/// The evaluator for a mapping language.
pub fn evaluator_for(language: MappingLanguage) -> &'static dyn Evaluator {
  match language {
    MappingLanguage::JsonQuery => &JSON_QUERY,
    MappingLanguage::Template => &TEMPLATE,
  }
}

/// Shorthand for `evaluator_for(language).evaluate(source, expression)`.
pub fn evaluate(language: MappingLanguage, source: &Value, expression: &str) -> Option<Value> {
  evaluator_for(language).evaluate(source, expression)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_dispatch_by_language() {
    let src = json!({"user": {"name": "ada"}});
    assert_eq!(
      evaluate(MappingLanguage::JsonQuery, &src, "user.name"),
      Some(json!("ada"))
    );
    assert_eq!(
      evaluate(MappingLanguage::Template, &src, "hi {{ user.name }}"),
      Some(json!("hi ada"))
    );
  }

  #[test]
  fn test_template_output_reparsed_as_json() {
    let src = json!({"n": 2});
    assert_eq!(
      evaluate(MappingLanguage::Template, &src, r#"{"n": {{ n }}}"#),
      Some(json!({"n": 2}))
    );
  }
}
