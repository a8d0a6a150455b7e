//! Nodeflow Nodes
//!
//! Built-in [`NodeProcessor`](nodeflow_runtime::NodeProcessor)s, grouped by
//! what they touch:
//!
//! - [`triggers`]: surface externally seeded data (`httpListen`,
//!   `manualTrigger`, `cron`, ...)
//! - [`control`]: routing and timing (`if`, `switch`, `loop`, `delay`,
//!   `tryCatch`)
//! - [`data`]: pure JSON and text transforms
//! - [`storage`]: files and the shared TTL cache
//! - [`http`]: outbound HTTP calls
//!
//! Processors read their configuration from `node.settings` and their data
//! from named inputs. Use [`default_registry`] to get all of them.

mod args;
pub mod control;
pub mod data;
pub mod http;
pub mod storage;
pub mod triggers;

use std::path::PathBuf;
use std::sync::Arc;

use nodeflow_cache::TtlCache;
use nodeflow_runtime::Registry;

/// Host-provided configuration for the built-in processors.
#[derive(Debug, Clone)]
pub struct NodesConfig {
  /// Relative file paths in `readFile` / `writeFile` resolve against this.
  pub base_dir: PathBuf,
}

impl Default for NodesConfig {
  fn default() -> Self {
    Self {
      base_dir: PathBuf::from("."),
    }
  }
}

/// Registry with every built-in processor.
pub fn default_registry(config: &NodesConfig, cache: Arc<TtlCache>) -> Registry {
  register_builtins(Registry::new(), config, cache)
}

/// Add every built-in processor to `registry`.
pub fn register_builtins(registry: Registry, config: &NodesConfig, cache: Arc<TtlCache>) -> Registry {
  let client = reqwest::Client::new();

  let mut registry = registry
    // Triggers
    .register(triggers::HttpListen)
    .register(triggers::ManualTrigger)
    .register(triggers::WebhookIn)
    .register(triggers::Tick::new("cron"))
    .register(triggers::Tick::new("intervalTimer"))
    .register(triggers::OnStart)
    // Control
    .register(control::If)
    .register(control::Switch)
    .register(control::Loop)
    .register(control::Delay)
    .register(control::TryCatch)
    // Data
    .register(data::JsonTransform)
    .register(data::ArrayMap)
    .register(data::ArrayFilter)
    .register(data::MathOp)
    .register(data::StringConcat)
    .register(data::StringTemplate)
    .register(data::RegexExtract)
    .register(data::JsonMerge)
    // Storage
    .register(storage::ReadFile::new(config.base_dir.clone()))
    .register(storage::WriteFile::new(config.base_dir.clone()))
    .register(storage::CacheSet::new(cache.clone()))
    .register(storage::CacheGet::new(cache))
    // Network
    .register(http::HttpRequest::new(client.clone()))
    .register(http::HttpPoller::new(client));

  for trigger in triggers::event_triggers() {
    registry.insert(Arc::new(trigger));
  }

  registry
}
