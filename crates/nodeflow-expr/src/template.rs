use minijinja::Environment;
use serde_json::Value;
use tracing::warn;

use crate::evaluator::Evaluator;

/// Text template evaluator backed by minijinja.
///
/// Field references use `{{ a.b }}`. Undefined fields render as empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
  /// Render `template` against `model`. Failures render as `""`.
  pub fn render(&self, template: &str, model: &Value) -> String {
    let env = Environment::new();
    match env.render_str(template, minijinja::Value::from_serialize(model)) {
      Ok(rendered) => rendered,
      Err(e) => {
        warn!(template = %template, error = %e, "template_render_failed");
        String::new()
      }
    }
  }
}

impl Evaluator for TemplateRenderer {
  /// Rendered text that looks like JSON is parsed back into a value.
  fn evaluate(&self, source: &Value, expression: &str) -> Option<Value> {
    let rendered = self.render(expression, source);
    if looks_like_json(&rendered) {
      if let Ok(parsed) = serde_json::from_str(rendered.trim()) {
        return Some(parsed);
      }
    }
    Some(Value::String(rendered))
  }
}

/// Whether the trimmed text starts like a JSON object or array.
pub fn looks_like_json(s: &str) -> bool {
  let s = s.trim_start();
  s.starts_with('{') || s.starts_with('[')
}
