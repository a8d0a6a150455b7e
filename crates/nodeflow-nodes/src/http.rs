//! Outbound HTTP processors.

use std::time::Duration;

use async_trait::async_trait;
use nodeflow_config::Node;
use nodeflow_runtime::{HandleMap, NodeExecutionArgs, NodeProcessor, ProcessorError};
use reqwest::{Client, Method};
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::args::{handles, setting_i64, setting_str};

const DEFAULT_TIMEOUT_SECS: i64 = 60;

fn parse_method(method: &str) -> Result<Method, ProcessorError> {
  match method.to_uppercase().as_str() {
    "GET" => Ok(Method::GET),
    "POST" => Ok(Method::POST),
    "PUT" => Ok(Method::PUT),
    "DELETE" => Ok(Method::DELETE),
    "PATCH" => Ok(Method::PATCH),
    "HEAD" => Ok(Method::HEAD),
    "OPTIONS" => Ok(Method::OPTIONS),
    _ => Err(ProcessorError::invalid_input(format!(
      "unsupported HTTP method: {}",
      method
    ))),
  }
}

fn http_error(e: reqwest::Error) -> ProcessorError {
  ProcessorError::Http {
    message: e.to_string(),
  }
}

/// Everything needed to issue one request, read from node settings.
#[derive(Debug)]
struct RequestSpec {
  method: Method,
  url: String,
  headers: Vec<(String, String)>,
  body: Option<Value>,
  parse_json: bool,
  timeout: Duration,
}

impl RequestSpec {
  fn from_node(node: &Node, body: Option<Value>) -> Result<Self, ProcessorError> {
    let url = node
      .setting_str("url")
      .filter(|u| !u.trim().is_empty())
      .ok_or_else(|| ProcessorError::missing_setting("url"))?;

    let headers = node
      .setting("headers")
      .and_then(Value::as_object)
      .map(|h| {
        h.iter()
          .map(|(k, v)| {
            let v = match v {
              Value::String(s) => s.clone(),
              other => other.to_string(),
            };
            (k.clone(), v)
          })
          .collect()
      })
      .unwrap_or_default();

    let timeout_secs = setting_i64(node, "timeoutSec", DEFAULT_TIMEOUT_SECS).max(1) as u64;

    Ok(Self {
      method: parse_method(&setting_str(node, "method", "GET"))?,
      url,
      headers,
      body: body.filter(|b| !b.is_null()),
      parse_json: setting_str(node, "parse", "json").eq_ignore_ascii_case("json"),
      timeout: Duration::from_secs(timeout_secs),
    })
  }
}

/// What came back.
#[derive(Debug)]
struct Reply {
  status: u16,
  headers: Map<String, Value>,
  text: String,
  parsed: Value,
}

#[instrument(skip(client, spec, cancel), fields(method = %spec.method, url = %spec.url))]
async fn send(client: &Client, spec: RequestSpec, cancel: &CancellationToken) -> Result<Reply, ProcessorError> {
  let mut request = client
    .request(spec.method.clone(), &spec.url)
    .timeout(spec.timeout);

  for (key, value) in &spec.headers {
    request = request.header(key, value);
  }

  // Bodies are only sent on non-GET requests. String bodies go out verbatim.
  if spec.method != Method::GET {
    match spec.body {
      Some(Value::String(raw)) => {
        request = request
          .header(reqwest::header::CONTENT_TYPE, "application/json")
          .body(raw);
      }
      Some(body) => request = request.json(&body),
      None => {}
    }
  }

  let exchange = async {
    let response = request.send().await.map_err(http_error)?;
    let status = response.status().as_u16();
    let headers = response
      .headers()
      .iter()
      .filter_map(|(k, v)| {
        v.to_str()
          .ok()
          .map(|val| (k.as_str().to_string(), Value::String(val.to_string())))
      })
      .collect();
    let text = response.text().await.map_err(http_error)?;
    Ok::<_, ProcessorError>((status, headers, text))
  };

  let (status, headers, text) = tokio::select! {
    result = exchange => result?,
    _ = cancel.cancelled() => return Err(ProcessorError::Cancelled),
  };

  let parsed = if spec.parse_json {
    serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone()))
  } else {
    Value::String(text.clone())
  };

  debug!(status, bytes = text.len(), "http_response");
  Ok(Reply {
    status,
    headers,
    text,
    parsed,
  })
}

/// Issues a request → `response` (parsed per `parse`), `status`, `text`,
/// `headers`. The body comes from the `body` setting, else the `body` input.
#[derive(Debug, Clone)]
pub struct HttpRequest {
  client: Client,
}

impl HttpRequest {
  pub fn new(client: Client) -> Self {
    Self { client }
  }
}

#[async_trait]
impl NodeProcessor for HttpRequest {
  fn node_type(&self) -> &str {
    "httpRequest"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let body = args
      .node
      .setting("body")
      .or_else(|| args.inputs.get("body"))
      .cloned();
    let spec = RequestSpec::from_node(args.node, body)?;
    let reply = send(&self.client, spec, args.context.cancellation()).await?;

    Ok(handles([
      ("response", reply.parsed),
      ("status", json!(reply.status)),
      ("text", Value::String(reply.text)),
      ("headers", Value::Object(reply.headers)),
    ]))
  }
}

/// One poll of `url` → `data`, `status`. Scheduling repeated polls is the
/// host's job.
#[derive(Debug, Clone)]
pub struct HttpPoller {
  client: Client,
}

impl HttpPoller {
  pub fn new(client: Client) -> Self {
    Self { client }
  }
}

#[async_trait]
impl NodeProcessor for HttpPoller {
  fn node_type(&self) -> &str {
    "httpPoller"
  }

  async fn execute(&self, args: NodeExecutionArgs<'_>) -> Result<HandleMap, ProcessorError> {
    let spec = RequestSpec::from_node(args.node, None)?;
    let reply = send(&self.client, spec, args.context.cancellation()).await?;

    Ok(handles([
      ("data", reply.parsed),
      ("status", json!(reply.status)),
    ]))
  }
}
