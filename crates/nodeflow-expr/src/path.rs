//! Dotted path navigation over JSON values.
//!
//! Paths are `.`-separated keys. Bracketed numeric segments are rewritten to
//! plain segments first, so `a.b[2].c` and `a.b.2.c` are the same path. On
//! read, a numeric segment indexes arrays and is an ordinary key on objects.
//! Writes only ever traverse objects.

use serde_json::{Map, Value};

/// Errors from [`set`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
  /// An intermediate segment exists but holds a non-object value.
  #[error("path segment '{segment}' is not an object")]
  NotAnObject { segment: String },

  /// The value that should receive the final segment is not an object.
  #[error("cannot set '{segment}': container is not an object")]
  TargetNotObject { segment: String },
}

/// Split a path into segments, converting `[n]` into `.n`.
pub fn segments(path: &str) -> Vec<String> {
  path
    .replace('[', ".")
    .replace(']', "")
    .split('.')
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .collect()
}

/// Read the value at `path`.
///
/// Returns `None` when a segment is missing or an intermediate is a scalar.
/// A string intermediate that starts with `{` is parsed as JSON and
/// traversed. A blank path returns `None`.
pub fn get(root: &Value, path: &str) -> Option<Value> {
  let parts = segments(path);
  if parts.is_empty() {
    return None;
  }

  let mut current = root.clone();
  for part in &parts {
    current = match current {
      Value::Object(mut map) => map.remove(part)?,
      Value::Array(mut items) => {
        let index: usize = part.parse().ok()?;
        if index >= items.len() {
          return None;
        }
        items.swap_remove(index)
      }
      Value::String(s) if s.starts_with('{') => {
        let mut parsed: Map<String, Value> = serde_json::from_str(&s).ok()?;
        parsed.remove(part)?
      }
      _ => return None,
    };
  }

  Some(current)
}

/// Write `value` at `path`, returning the updated root.
///
/// A null root becomes `{}`. Missing or null intermediates are created as
/// objects. An empty path replaces the root with `value`.
pub fn set(root: Value, path: &str, value: Value) -> Result<Value, PathError> {
  let parts = segments(path);
  let Some((last, parents)) = parts.split_last() else {
    return Ok(value);
  };

  let mut root = match root {
    Value::Null => Value::Object(Map::new()),
    other => other,
  };

  let mut current = &mut root;
  for part in parents {
    let map = current
      .as_object_mut()
      .ok_or_else(|| PathError::NotAnObject {
        segment: part.clone(),
      })?;
    let slot = map
      .entry(part.clone())
      .or_insert_with(|| Value::Object(Map::new()));
    if slot.is_null() {
      *slot = Value::Object(Map::new());
    }
    if !slot.is_object() {
      return Err(PathError::NotAnObject {
        segment: part.clone(),
      });
    }
    current = slot;
  }

  let map = current
    .as_object_mut()
    .ok_or_else(|| PathError::TargetNotObject {
      segment: last.clone(),
    })?;
  map.insert(last.clone(), value);

  Ok(root)
}
