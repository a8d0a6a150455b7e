//! Flow runtime.
//!
//! [`Runtime::execute_once`] turns a graph and a seed into an
//! [`ExecutionResult`]. Nodes run one at a time off a FIFO queue:
//!
//! ```text
//!   seed ──► outputs/inputs of trigger nodes
//!
//!   queue = all nodes, declaration order
//!   loop (bounded by max_attempts dequeues)
//!     pop node ── executed? ──► skip
//!        │
//!        ▼
//!     every inbound source handle recorded? ── no ──► push back
//!        │ yes
//!        ▼
//!     record inputs ─► processor ─► node mappings ─► record outputs
//!        │                │
//!        │                └─ error / unknown type ──► run fails
//!        ▼
//!     push every outbound target
//! ```
//!
//! There is no topological sort. A node whose dependency never produces the
//! expected handle is never executed and is reported in
//! [`ExecutionResult::starved`]. The attempt bound is the only protection
//! against cycles.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use nodeflow_config::{Graph, Node};
use nodeflow_expr::{apply_edge_mapping, apply_node_mappings};
use nodeflow_workflow::Workflow;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, instrument, warn};

use crate::context::{ExecutionContext, HandleMap};
use crate::error::RuntimeError;
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::handles::{resolve_source_handle, resolve_target_handle};
use crate::output_store::OutputStore;
use crate::processor::{NodeExecutionArgs, ProcessorRegistry};
use crate::result::{ExecutionResult, NodeFailure};
use crate::seed::Seed;

/// Default bound on queue pops per run.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Configuration for the runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
  /// Maximum number of dequeues in one run, skipped and requeued nodes
  /// included.
  pub max_attempts: usize,
}

impl Default for RuntimeConfig {
  fn default() -> Self {
    Self {
      max_attempts: DEFAULT_MAX_ATTEMPTS,
    }
  }
}

/// The flow runtime.
///
/// Holds no per-run state and can be shared across concurrent runs.
pub struct Runtime {
  registry: Arc<dyn ProcessorRegistry>,
  output_store: Arc<OutputStore>,
  notifier: Arc<dyn ExecutionNotifier>,
  config: RuntimeConfig,
}

/// How the scheduling loop ended.
struct LoopOutcome {
  executed: usize,
  starved: Vec<String>,
  failure: Option<NodeFailure>,
}

impl Runtime {
  pub fn new(
    registry: Arc<dyn ProcessorRegistry>,
    output_store: Arc<OutputStore>,
    config: RuntimeConfig,
  ) -> Self {
    Self {
      registry,
      output_store,
      notifier: Arc::new(NoopNotifier),
      config,
    }
  }

  pub fn with_notifier(mut self, notifier: Arc<dyn ExecutionNotifier>) -> Self {
    self.notifier = notifier;
    self
  }

  pub fn registry(&self) -> &Arc<dyn ProcessorRegistry> {
    &self.registry
  }

  pub fn output_store(&self) -> &Arc<OutputStore> {
    &self.output_store
  }

  pub fn config(&self) -> &RuntimeConfig {
    &self.config
  }

  /// Run `graph` once with a raw payload delivered to its first trigger.
  pub async fn execute_payload(
    &self,
    graph: &Graph,
    payload: Value,
    cancel: CancellationToken,
  ) -> Result<ExecutionResult, RuntimeError> {
    let seed = Seed::from_payload(graph, payload);
    self.execute_once(graph, seed, cancel).await
  }

  /// Run `graph` once.
  ///
  /// The output store is cleared once the graph validates, so it only ever
  /// holds the latest run.
  ///
  /// Only a structurally invalid graph returns `Err`. A failing processor
  /// or an unregistered node type produces `success == false` with
  /// everything recorded before the failure.
  #[instrument(
    name = "runtime_execute_once",
    skip(self, graph, seed, cancel),
    fields(workflow_id = %graph.id)
  )]
  pub async fn execute_once(
    &self,
    graph: &Graph,
    seed: Seed,
    cancel: CancellationToken,
  ) -> Result<ExecutionResult, RuntimeError> {
    let workflow = Workflow::new(graph)?;
    self.output_store.clear();
    let mut ctx = ExecutionContext::new(&graph.id, cancel);
    let execution_id = ctx.execution_id.clone();

    info!(
      execution_id = %execution_id,
      workflow_id = %graph.id,
      nodes = graph.nodes.len(),
      edges = graph.edges.len(),
      "workflow_started"
    );
    self.notifier.notify(ExecutionEvent::RunStarted {
      execution_id: execution_id.clone(),
      workflow_id: graph.id.clone(),
    });

    for value in seed {
      ctx.seed(&value.node_id, &value.handle, value.value);
    }

    let span = ctx.span().clone();
    let outcome = self
      .run_execution_loop(&workflow, &mut ctx)
      .instrument(span)
      .await;

    let success = outcome.failure.is_none() && outcome.executed > 0;
    match &outcome.failure {
      None => {
        info!(
          execution_id = %execution_id,
          executed = outcome.executed,
          starved = outcome.starved.len(),
          success,
          "workflow_completed"
        );
      }
      Some(failure) => {
        error!(
          execution_id = %execution_id,
          node_id = %failure.node_id,
          error = %failure.message,
          "workflow_failed"
        );
      }
    }
    self.notifier.notify(ExecutionEvent::RunCompleted {
      execution_id: execution_id.clone(),
      success,
      starved: outcome.starved.clone(),
    });

    Ok(ExecutionResult {
      execution_id,
      success,
      outputs: ctx.outputs,
      inputs: ctx.inputs,
      starved: outcome.starved,
      failure: outcome.failure,
    })
  }

  /// Run the requeue-until-ready loop.
  async fn run_execution_loop(
    &self,
    workflow: &Workflow<'_>,
    ctx: &mut ExecutionContext,
  ) -> LoopOutcome {
    let topology = workflow.topology();
    let mut queue: VecDeque<&Node> = workflow.nodes().iter().collect();
    let mut executed: HashSet<&str> = HashSet::new();
    let mut attempts = 0usize;

    while attempts < self.config.max_attempts {
      let Some(node) = queue.pop_front() else {
        break;
      };
      attempts += 1;

      if executed.contains(node.id.as_str()) {
        continue;
      }

      let Some(inputs) = gather_inputs(workflow, ctx, node) else {
        debug!(node_id = %node.id, "task_requeued");
        self.notifier.notify(ExecutionEvent::NodeRequeued {
          execution_id: ctx.execution_id.clone(),
          node_id: node.id.clone(),
        });
        queue.push_back(node);
        continue;
      };

      ctx.inputs.insert(node.id.clone(), inputs.clone());

      let outputs = match self.execute_node(node, ctx, &inputs).await {
        Ok(outputs) => outputs,
        Err(failure) => {
          return LoopOutcome {
            executed: executed.len(),
            starved: Vec::new(),
            failure: Some(failure),
          };
        }
      };

      self.output_store.set(node.id.clone(), outputs.clone());
      ctx.outputs.insert(node.id.clone(), outputs);
      executed.insert(node.id.as_str());

      for edge in topology.out_edges(&node.id) {
        if let Ok(target) = workflow.get_node(&edge.target) {
          queue.push_back(target);
        }
      }
    }

    if !queue.is_empty() && attempts >= self.config.max_attempts {
      warn!(
        max_attempts = self.config.max_attempts,
        pending = queue.len(),
        "attempt_limit_reached"
      );
    }

    let starved: Vec<String> = workflow
      .nodes()
      .iter()
      .filter(|n| !executed.contains(n.id.as_str()))
      .map(|n| n.id.clone())
      .collect();
    if !starved.is_empty() {
      warn!(starved = ?starved, "nodes_starved");
    }

    LoopOutcome {
      executed: executed.len(),
      starved,
      failure: None,
    }
  }

  /// Resolve and invoke the processor for `node`, then apply its mappings.
  async fn execute_node(
    &self,
    node: &Node,
    ctx: &ExecutionContext,
    inputs: &HandleMap,
  ) -> Result<HandleMap, NodeFailure> {
    let fail = |message: String| NodeFailure {
      node_id: node.id.clone(),
      node_type: node.node_type.clone(),
      message,
    };

    let Some(processor) = self.registry.resolve(&node.node_type) else {
      let failure = fail(format!(
        "no processor registered for node type '{}'",
        node.node_type
      ));
      error!(node_id = %node.id, node_type = %node.node_type, error = %failure.message, "task_failed");
      self.notify_failed(ctx, &failure);
      return Err(failure);
    };

    info!(node_id = %node.id, node_type = %node.node_type, label = %node.label, "task_started");
    self.notifier.notify(ExecutionEvent::NodeStarted {
      execution_id: ctx.execution_id.clone(),
      node_id: node.id.clone(),
      inputs: Value::Object(inputs.clone()),
    });

    let outputs = processor
      .execute(NodeExecutionArgs {
        node,
        context: ctx,
        inputs,
      })
      .await
      .map_err(|e| {
        error!(node_id = %node.id, node_type = %node.node_type, error = %e, "task_failed");
        fail(e.to_string())
      });

    let outputs = match outputs {
      Ok(outputs) => outputs,
      Err(failure) => {
        self.notify_failed(ctx, &failure);
        return Err(failure);
      }
    };

    let outputs = if node.mappings.is_empty() {
      outputs
    } else {
      apply_node_mappings(&node.mappings, inputs, outputs)
    };

    info!(node_id = %node.id, handles = outputs.len(), "task_completed");
    self.notifier.notify(ExecutionEvent::NodeCompleted {
      execution_id: ctx.execution_id.clone(),
      node_id: node.id.clone(),
      outputs: Value::Object(outputs.clone()),
    });

    Ok(outputs)
  }

  fn notify_failed(&self, ctx: &ExecutionContext, failure: &NodeFailure) {
    self.notifier.notify(ExecutionEvent::NodeFailed {
      execution_id: ctx.execution_id.clone(),
      node_id: failure.node_id.clone(),
      error: failure.message.clone(),
    });
  }
}

/// Collect a node's inputs from its inbound edges.
///
/// Returns `None` when any inbound edge's source handle has not been
/// recorded yet. A node with no edge-supplied inputs falls back to its own
/// seeded outputs.
fn gather_inputs(
  workflow: &Workflow<'_>,
  ctx: &ExecutionContext,
  node: &Node,
) -> Option<HandleMap> {
  let mut inputs = HandleMap::new();

  for edge in workflow.topology().in_edges(&node.id) {
    let source = workflow.graph().get_node(&edge.source);
    let recorded = ctx.outputs.get(&edge.source);
    let source_handle = resolve_source_handle(edge, source, recorded);
    let target_handle = resolve_target_handle(edge, Some(node));

    let value = recorded?.get(&source_handle)?;
    let value = match &edge.mapping {
      Some(mapping) => apply_edge_mapping(mapping, value),
      None => value.clone(),
    };
    inputs.insert(target_handle, value);
  }

  if inputs.is_empty() {
    if let Some(seeded) = ctx.outputs.get(&node.id) {
      inputs = seeded.clone();
    }
  }

  Some(inputs)
}
