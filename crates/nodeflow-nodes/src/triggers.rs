//! Trigger processors.
//!
//! Listening happens in the host; by the time a trigger node runs, the event
//! has already been seeded into its outputs and inputs. These processors
//! surface that data under their documented handles.

use async_trait::async_trait;
use nodeflow_runtime::{HandleMap, NodeExecutionArgs, NodeProcessor, ProcessorError};
use serde_json::json;

use crate::args::{handles, input, now, setting_bool};

/// Inbound HTTP request. Emits `request` and `context`, taken from inputs,
/// then from the node's seeded outputs, then `{}`.
#[derive(Debug, Clone, Copy)]
pub struct HttpListen;

#[async_trait]
impl NodeProcessor for HttpListen {
  fn node_type(&self) -> &str {
    "httpListen"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let seeded = args.context.outputs.get(&args.node.id);
    let pick = |key: &str| {
      args
        .inputs
        .get(key)
        .or_else(|| seeded.and_then(|s| s.get(key)))
        .filter(|v| !v.is_null())
        .cloned()
        .unwrap_or_else(|| json!({}))
    };

    Ok(handles([("request", pick("request")), ("context", pick("context"))]))
  }
}

/// Manual run. Emits `fired` (seeded, or `{at}`) and passes through a
/// seeded `request` / `context` so payload-driven runs reach downstream
/// nodes.
#[derive(Debug, Clone, Copy)]
pub struct ManualTrigger;

#[async_trait]
impl NodeProcessor for ManualTrigger {
  fn node_type(&self) -> &str {
    "manualTrigger"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let fired = args
      .inputs
      .get("fired")
      .cloned()
      .unwrap_or_else(|| json!({ "at": now() }));

    let mut out = handles([("fired", fired)]);
    for key in ["request", "context"] {
      if let Some(v) = args.inputs.get(key) {
        out.insert(key.to_string(), v.clone());
      }
    }
    Ok(out)
  }
}

/// Inbound webhook. Emits `event` and `raw`, defaulting to `{}`.
#[derive(Debug, Clone, Copy)]
pub struct WebhookIn;

#[async_trait]
impl NodeProcessor for WebhookIn {
  fn node_type(&self) -> &str {
    "webhookIn"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let or_empty = |key: &str| args.inputs.get(key).cloned().unwrap_or_else(|| json!({}));
    Ok(handles([("event", or_empty("event")), ("raw", or_empty("raw"))]))
  }
}

/// Timer tick for `cron` and `intervalTimer`. Emits `tick: { now }`.
#[derive(Debug, Clone)]
pub struct Tick {
  node_type: &'static str,
}

impl Tick {
  pub fn new(node_type: &'static str) -> Self {
    Self { node_type }
  }
}

#[async_trait]
impl NodeProcessor for Tick {
  fn node_type(&self) -> &str {
    self.node_type
  }

  async fn execute(&self, _args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    Ok(handles([("tick", json!({ "now": now() }))]))
  }
}

/// Host startup. Emits `boot: { at, once }`.
#[derive(Debug, Clone, Copy)]
pub struct OnStart;

#[async_trait]
impl NodeProcessor for OnStart {
  fn node_type(&self) -> &str {
    "onStart"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let once = setting_bool(args.node, "once");
    Ok(handles([("boot", json!({ "at": now(), "once": once }))]))
  }
}

/// An event trigger that copies fixed handles from its inputs, null when
/// absent.
#[derive(Debug, Clone)]
pub struct EventTrigger {
  node_type: &'static str,
  handles: &'static [&'static str],
}

impl EventTrigger {
  pub const fn new(node_type: &'static str, handles: &'static [&'static str]) -> Self {
    Self { node_type, handles }
  }
}

#[async_trait]
impl NodeProcessor for EventTrigger {
  fn node_type(&self) -> &str {
    self.node_type
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    Ok(
      self
        .handles
        .iter()
        .map(|h| (h.to_string(), input(args.inputs, h)))
        .collect(),
    )
  }
}

const EVENT_TRIGGERS: &[EventTrigger] = &[
  EventTrigger::new("websocketIn", &["message", "meta"]),
  EventTrigger::new("sseSubscribe", &["event", "data"]),
  EventTrigger::new("fileWatch", &["change"]),
  EventTrigger::new("directoryWatch", &["file"]),
  EventTrigger::new("mqttSubscribe", &["message", "topic"]),
  EventTrigger::new("queueConsume", &["message", "meta"]),
  EventTrigger::new("smtpInbound", &["email"]),
  EventTrigger::new("keyboardShortcut", &["pressed"]),
  EventTrigger::new("bluetoothNotify", &["data"]),
  EventTrigger::new("geoFence", &["location"]),
  EventTrigger::new("batteryLevel", &["status"]),
  EventTrigger::new("clipboardChange", &["text"]),
];

/// All passthrough event triggers.
pub fn event_triggers() -> impl Iterator<Item = EventTrigger> {
  EVENT_TRIGGERS.iter().cloned()
}
