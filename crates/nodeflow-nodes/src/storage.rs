//! File and cache processors.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nodeflow_cache::{DEFAULT_TTL, TtlCache};
use nodeflow_runtime::{HandleMap, NodeExecutionArgs, NodeProcessor, ProcessorError};
use serde_json::{Value, json};
use tracing::debug;

use crate::args::{handles, input, setting_i64, text};

fn required(args: &NodeExecutionArgs<'_>, key: &str) -> Result<String, ProcessorError> {
  args
    .node
    .setting_str(key)
    .filter(|s| !s.trim().is_empty())
    .ok_or_else(|| ProcessorError::missing_setting(key))
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
  let path = Path::new(path);
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    base_dir.join(path)
  }
}

/// Reads the file at setting `path` → `content`. A missing file reads as
/// `""`.
#[derive(Debug, Clone)]
pub struct ReadFile {
  base_dir: PathBuf,
}

impl ReadFile {
  pub fn new(base_dir: PathBuf) -> Self {
    Self { base_dir }
  }
}

#[async_trait]
impl NodeProcessor for ReadFile {
  fn node_type(&self) -> &str {
    "readFile"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let path = resolve(&self.base_dir, &required(&args, "path")?);

    let content = match tokio::fs::read_to_string(&path).await {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "file_not_found");
        String::new()
      }
      Err(e) => return Err(e.into()),
    };

    Ok(handles([("content", Value::String(content))]))
  }
}

/// Writes input `content` to setting `path`, creating parent directories.
/// Emits `success` and the written `file` path.
#[derive(Debug, Clone)]
pub struct WriteFile {
  base_dir: PathBuf,
}

impl WriteFile {
  pub fn new(base_dir: PathBuf) -> Self {
    Self { base_dir }
  }
}

#[async_trait]
impl NodeProcessor for WriteFile {
  fn node_type(&self) -> &str {
    "writeFile"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let path = resolve(&self.base_dir, &required(&args, "path")?);
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }

    let content = text(&input(args.inputs, "content"));
    tokio::fs::write(&path, content.as_bytes()).await?;

    debug!(path = %path.display(), bytes = content.len(), "file_written");
    Ok(handles([
      ("success", json!(true)),
      ("file", Value::String(path.display().to_string())),
    ]))
  }
}

/// Stores input `value` under setting `key` for `ttlSec` seconds.
#[derive(Debug, Clone)]
pub struct CacheSet {
  cache: Arc<TtlCache>,
}

impl CacheSet {
  pub fn new(cache: Arc<TtlCache>) -> Self {
    Self { cache }
  }
}

#[async_trait]
impl NodeProcessor for CacheSet {
  fn node_type(&self) -> &str {
    "cacheSet"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let key = required(&args, "key")?;
    let ttl = match setting_i64(args.node, "ttlSec", DEFAULT_TTL.as_secs() as i64) {
      secs if secs <= 0 => Duration::ZERO,
      secs => Duration::from_secs(secs as u64),
    };

    self.cache.set(key, input(args.inputs, "value"), ttl);
    Ok(handles([("success", json!(true))]))
  }
}

/// Looks up setting `key` → `value` (null when absent) and `found`.
#[derive(Debug, Clone)]
pub struct CacheGet {
  cache: Arc<TtlCache>,
}

impl CacheGet {
  pub fn new(cache: Arc<TtlCache>) -> Self {
    Self { cache }
  }
}

#[async_trait]
impl NodeProcessor for CacheGet {
  fn node_type(&self) -> &str {
    "cacheGet"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let key = required(&args, "key")?;
    let hit = self.cache.get(&key);
    let found = hit.is_some();

    Ok(handles([
      ("value", hit.unwrap_or(Value::Null)),
      ("found", json!(found)),
    ]))
  }
}
