use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use nodeflow_cache::TtlCache;
use nodeflow_config::Graph;
use nodeflow_nodes::{NodesConfig, default_registry};
use nodeflow_runtime::{
  DEFAULT_MAX_ATTEMPTS, ExecutionResult, HandleMap, OutputStore, ProcessorRegistry, Runtime,
  RuntimeConfig, Seed,
};

/// Nodeflow - run node-based flow graphs
#[derive(Parser)]
#[command(name = "nodeflow")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.nodeflow)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a flow graph once. The payload is read from stdin.
  Run {
    /// Path to the flow file (engine graph or editor export)
    flow_file: PathBuf,

    /// JSON file of `[{nodeId, handle, value}]` seeds, used instead of the
    /// stdin payload
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Upper bound on scheduler dequeues
    #[arg(long, env = "NODEFLOW_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: usize,
  },

  /// List the registered node types
  NodeTypes,
}

/// Per-node view printed after a run.
#[derive(Serialize)]
struct NodeReport<'a> {
  id: &'a str,
  label: &'a str,
  inputs: Option<&'a HandleMap>,
  outputs: Option<&'a HandleMap>,
}

#[derive(Serialize)]
struct RunReport<'a> {
  ok: bool,
  execution_id: &'a str,
  outputs: &'a std::collections::HashMap<String, HandleMap>,
  nodes: Vec<NodeReport<'a>>,
  starved: &'a [String],
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<String>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(io::stderr)
    .with_target(false)
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".nodeflow"),
  };

  match cli.command {
    Some(Commands::Run {
      flow_file,
      seed,
      max_attempts,
    }) => {
      run_flow(flow_file, seed, max_attempts, data_dir)?;
    }
    Some(Commands::NodeTypes) => {
      let registry = build_registry(&data_dir);
      for node_type in registry.node_types() {
        println!("{}", node_type);
      }
    }
    None => {
      println!("nodeflow - use --help to see available commands");
    }
  }

  Ok(())
}

fn build_registry(data_dir: &std::path::Path) -> nodeflow_runtime::Registry {
  let config = NodesConfig {
    base_dir: data_dir.join("files"),
  };
  default_registry(&config, Arc::new(TtlCache::new()))
}

fn run_flow(flow_file: PathBuf, seed: Option<PathBuf>, max_attempts: usize, data_dir: PathBuf) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_flow_async(flow_file, seed, max_attempts, data_dir).await })
}

async fn run_flow_async(
  flow_file: PathBuf,
  seed_file: Option<PathBuf>,
  max_attempts: usize,
  data_dir: PathBuf,
) -> Result<()> {
  let content = tokio::fs::read_to_string(&flow_file)
    .await
    .with_context(|| format!("failed to read flow file: {}", flow_file.display()))?;

  let graph = Graph::from_json(&content)
    .with_context(|| format!("failed to parse flow file: {}", flow_file.display()))?;

  eprintln!(
    "Loaded flow '{}' ({} nodes, {} edges)",
    graph.id,
    graph.nodes.len(),
    graph.edges.len()
  );

  let seed = match seed_file {
    Some(path) => {
      let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read seed file: {}", path.display()))?;
      serde_json::from_str::<Seed>(&raw)
        .with_context(|| format!("failed to parse seed file: {}", path.display()))?
    }
    None => Seed::from_payload(&graph, read_payload_from_stdin()?),
  };

  let runtime = Runtime::new(
    Arc::new(build_registry(&data_dir)),
    Arc::new(OutputStore::new()),
    RuntimeConfig { max_attempts },
  );

  let cancel = CancellationToken::new();
  let interrupt = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      interrupt.cancel();
    }
  });

  let result = runtime
    .execute_once(&graph, seed, cancel)
    .await
    .context("flow execution failed")?;

  eprintln!("Execution completed: {}", result.execution_id);
  println!("{}", serde_json::to_string_pretty(&report(&graph, &result))?);

  Ok(())
}

fn report<'a>(graph: &'a Graph, result: &'a ExecutionResult) -> RunReport<'a> {
  let nodes = graph
    .nodes
    .iter()
    .map(|n| NodeReport {
      id: &n.id,
      label: &n.label,
      inputs: result.inputs.get(&n.id),
      outputs: result.outputs.get(&n.id),
    })
    .collect();

  RunReport {
    ok: result.success,
    execution_id: &result.execution_id,
    outputs: &result.outputs,
    nodes,
    starved: &result.starved,
    error: result
      .failure
      .as_ref()
      .map(|f| format!("{} ({}): {}", f.node_id, f.node_type, f.message)),
  }
}

fn read_payload_from_stdin() -> Result<Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    // No stdin pipe, use empty object
    Ok(serde_json::json!({}))
  } else {
    let mut input = String::new();
    io::stdin()
      .read_to_string(&mut input)
      .context("failed to read payload from stdin")?;

    if input.trim().is_empty() {
      Ok(serde_json::json!({}))
    } else {
      serde_json::from_str(&input).context("failed to parse payload JSON from stdin")
    }
  }
}
