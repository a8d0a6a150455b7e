use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Expression language of a mapping rule.
///
/// Names are matched case-insensitively; see [`MappingLanguage::from_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MappingLanguage {
  /// JMESPath query evaluated against the source document.
  JsonQuery,
  /// Text template rendered against the source document.
  Template,
}

impl MappingLanguage {
  const NAMES: &'static [&'static str] = &["jsonQuery", "template"];

  /// Resolve a language name, ignoring case. Accepts the canonical names
  /// plus `jmespath`, `json-query`, `jq`, `handlebars`, `jinja` and
  /// `minijinja`.
  pub fn from_name(name: &str) -> Option<Self> {
    match name.trim().to_ascii_lowercase().as_str() {
      "jsonquery" | "jmespath" | "json-query" | "jq" => Some(Self::JsonQuery),
      "template" | "handlebars" | "jinja" | "minijinja" => Some(Self::Template),
      _ => None,
    }
  }
}

impl<'de> Deserialize<'de> for MappingLanguage {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let name = String::deserialize(deserializer)?;
    Self::from_name(&name).ok_or_else(|| serde::de::Error::unknown_variant(&name, Self::NAMES))
  }
}

/// Unknown or non-string languages read as unset, so the attachment default
/// applies.
fn lenient_language<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<Option<MappingLanguage>, D::Error> {
  let raw = Option::<Value>::deserialize(deserializer)?;
  Ok(raw.as_ref().and_then(Value::as_str).and_then(MappingLanguage::from_name))
}

/// Derives a value with an expression and writes it at a dotted path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRule {
  pub target_path: String,
  pub expression: String,
  /// Unset means the default of wherever the rule is attached: node
  /// mappings render templates, edge mappings run queries.
  #[serde(
    default,
    deserialize_with = "lenient_language",
    skip_serializing_if = "Option::is_none"
  )]
  pub language: Option<MappingLanguage>,
}

impl MappingRule {
  pub fn language_or(&self, default: MappingLanguage) -> MappingLanguage {
    self.language.unwrap_or(default)
  }
}
