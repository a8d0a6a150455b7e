//! Runtime error types.

use nodeflow_workflow::WorkflowError;

/// Errors that escape [`crate::Runtime::execute_once`].
///
/// Only structural problems with the graph surface here. Processor failures
/// and unknown node types end the run with `success == false` instead.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
  /// Invalid workflow graph structure.
  #[error("invalid graph: {message}")]
  InvalidGraph { message: String },
}

impl From<WorkflowError> for RuntimeError {
  fn from(e: WorkflowError) -> Self {
    RuntimeError::InvalidGraph {
      message: e.to_string(),
    }
  }
}

/// Errors returned by a node processor.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
  /// A required setting is absent or blank.
  #[error("missing setting '{key}'")]
  MissingSetting { key: String },

  /// An input or setting has an unusable shape.
  #[error("invalid input: {message}")]
  InvalidInput { message: String },

  /// Filesystem access failed.
  #[error("io error: {source}")]
  Io {
    #[from]
    source: std::io::Error,
  },

  /// An outbound HTTP call failed.
  #[error("http request failed: {message}")]
  Http { message: String },

  /// The run was cancelled while the node was executing.
  #[error("execution cancelled")]
  Cancelled,

  /// Any other failure.
  #[error("{message}")]
  Failed { message: String },
}

impl ProcessorError {
  pub fn invalid_input(message: impl Into<String>) -> Self {
    ProcessorError::InvalidInput {
      message: message.into(),
    }
  }

  pub fn missing_setting(key: impl Into<String>) -> Self {
    ProcessorError::MissingSetting { key: key.into() }
  }
}
