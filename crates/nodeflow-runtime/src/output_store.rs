//! Process-wide record of the latest outputs per node.
//!
//! The store is created once by the host and shared with every runtime via
//! `Arc`. The runtime clears it at the start of every run and each
//! completed node then writes its entry, so it reflects the latest run only.
//! Concurrent runs sharing a store race on it. There is no run history.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::context::HandleMap;

#[derive(Debug, Default)]
pub struct OutputStore {
  entries: RwLock<HashMap<String, HandleMap>>,
}

impl OutputStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replace the recorded outputs of `node_id`.
  pub fn set(&self, node_id: impl Into<String>, outputs: HandleMap) {
    self
      .entries
      .write()
      .unwrap_or_else(|e| e.into_inner())
      .insert(node_id.into(), outputs);
  }

  pub fn get(&self, node_id: &str) -> Option<HandleMap> {
    self
      .entries
      .read()
      .unwrap_or_else(|e| e.into_inner())
      .get(node_id)
      .cloned()
  }

  pub fn get_handle(&self, node_id: &str, handle: &str) -> Option<Value> {
    self
      .entries
      .read()
      .unwrap_or_else(|e| e.into_inner())
      .get(node_id)?
      .get(handle)
      .cloned()
  }

  /// Copy of every recorded node.
  pub fn snapshot(&self) -> HashMap<String, HandleMap> {
    self
      .entries
      .read()
      .unwrap_or_else(|e| e.into_inner())
      .clone()
  }

  pub fn clear(&self) {
    self
      .entries
      .write()
      .unwrap_or_else(|e| e.into_inner())
      .clear();
  }
}
