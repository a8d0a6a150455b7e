/// Errors raised while loading a flow graph definition.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The document is not valid JSON or does not match the graph shape.
  #[error("failed to parse graph: {source}")]
  Parse {
    #[source]
    source: serde_json::Error,
  },

  /// An editor export node is missing a required field.
  #[error("invalid snapshot node '{node_id}': {message}")]
  InvalidSnapshot { node_id: String, message: String },
}

impl From<serde_json::Error> for ConfigError {
  fn from(source: serde_json::Error) -> Self {
    ConfigError::Parse { source }
  }
}
