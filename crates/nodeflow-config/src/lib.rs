//! Nodeflow Config
//!
//! Serializable flow graph definitions: nodes with declared ports, settings
//! and mapping rules, and edges connecting named output handles to named
//! input handles.
//!
//! Graphs come in two JSON shapes. The engine shape is deserialized directly
//! into [`Graph`]. The editor export shape wraps each node in a `flowNode`
//! envelope with the real fields under `data`; [`Graph::from_json`] accepts
//! either.

mod edge;
mod error;
mod graph;
mod mapping;
mod node;
mod snapshot;

pub use edge::{Edge, EdgeMapping};
pub use error::ConfigError;
pub use graph::Graph;
pub use mapping::{MappingLanguage, MappingRule};
pub use node::{Node, Port, PortSet};
