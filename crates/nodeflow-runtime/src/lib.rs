//! Nodeflow Runtime
//!
//! Executes a flow graph once: seeds trigger nodes, schedules nodes as their
//! inbound handles become available, invokes processors resolved from a
//! [`ProcessorRegistry`], applies mapping rules, and records every node's
//! inputs and outputs.
//!
//! Node behaviors live outside this crate. Anything implementing
//! [`NodeProcessor`] can be registered.

mod context;
mod error;
mod events;
pub mod handles;
mod output_store;
mod processor;
mod result;
mod runtime;
mod seed;

pub use context::{ExecutionContext, HandleMap};
pub use error::{ProcessorError, RuntimeError};
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use output_store::OutputStore;
pub use processor::{NodeExecutionArgs, NodeProcessor, ProcessorRegistry, Registry};
pub use result::{ExecutionResult, NodeFailure};
pub use runtime::{DEFAULT_MAX_ATTEMPTS, Runtime, RuntimeConfig};
pub use seed::{Seed, SeedValue};

pub use async_trait::async_trait;
