//! Nodeflow Workflow
//!
//! A [`Workflow`] is a flow graph that has been checked for structural
//! problems (duplicate node ids, edges to unknown nodes) and indexed for
//! scheduling. The [`Topology`] groups edges by target and by source while
//! preserving declaration order.

mod error;
mod topology;
mod workflow;

pub use error::WorkflowError;
pub use topology::Topology;
pub use workflow::Workflow;
