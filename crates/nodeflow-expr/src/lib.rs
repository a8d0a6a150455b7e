//! Nodeflow Expr
//!
//! Everything that navigates or derives values inside loosely-typed JSON
//! payloads:
//!
//! - [`path`]: get/set a value at a dotted path (`a.b[2].c`)
//! - [`JsonQuery`]: JMESPath queries
//! - [`TemplateRenderer`]: minijinja text templates
//! - [`apply_node_mappings`] / [`apply_edge_mapping`]: mapping rules
//!
//! Evaluation never fails outward. A broken query yields `None`, a broken
//! template renders as an empty string, and both are logged.

mod evaluator;
mod jmes;
mod mapping;
pub mod path;
mod template;

pub use evaluator::{Evaluator, evaluate, evaluator_for};
pub use jmes::JsonQuery;
pub use mapping::{apply_edge_mapping, apply_node_mappings};
pub use path::PathError;
pub use template::{TemplateRenderer, looks_like_json};
