//! MCP JSON-RPC server over newline-delimited stdio.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::panic::AssertUnwindSafe;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use super::error::ToolError;
use super::registry::ToolRegistry;
use super::tools::FlowTools;

/// Protocol revisions this server speaks; the first is the fallback
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2024-11-05", "2025-03-26", "2025-06-18"];

const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl JsonRpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

pub struct FlowLensServer {
    tools: FlowTools,
    registry: ToolRegistry,
}

impl FlowLensServer {
    pub fn new(tools: FlowTools) -> Self {
        Self {
            tools,
            registry: ToolRegistry::new(),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one inbound frame. Returns the serialized response, or `None`
    /// for notifications.
    pub async fn handle(&self, raw_request: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(raw_request) {
            Ok(value) => self.handle_value(value).await?,
            Err(e) => JsonRpcResponse::failure(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {}", e),
            ),
        };

        match serde_json::to_string(&response) {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!(error = %e, "failed to encode response");
                let fallback = JsonRpcResponse::failure(
                    response.id,
                    INTERNAL_ERROR,
                    "Internal error: response could not be encoded",
                );
                serde_json::to_string(&fallback).ok()
            }
        }
    }

    async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        if !value.is_object() {
            return Some(JsonRpcResponse::failure(
                Value::Null,
                INVALID_REQUEST,
                "Invalid request: expected a JSON object",
            ));
        }

        // A request without an "id" member is a notification: never answered
        let id = value.get("id").cloned();

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return id.map(|id| {
                    JsonRpcResponse::failure(
                        id,
                        INVALID_REQUEST,
                        format!("Invalid request: {}", e),
                    )
                });
            }
        };

        let Some(id) = id else {
            debug!(method = %request.method, "notification");
            return None;
        };

        debug!(method = %request.method, "request");
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, self.registry.to_json()),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            _ => JsonRpcResponse::failure(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let requested = params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let version = requested
            .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|s| **s == v))
            .copied()
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);
        info!(requested = ?requested, negotiated = version, "client initialized session");

        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": version,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "flowlens-mcp",
                    "version": env!("CARGO_PKG_VERSION")
                },
                "instructions": "FlowLens MCP Server - recorded browser flows (network requests, console logs, DOM actions) for debugging web apps. Use list_flows to find a flow, get_flow for its summary and timeline, get_flow_events to narrow down by kind or time window, and get_network_event_detail for the headers and full bodies of one request."
            }),
        )
    }

    async fn handle_call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::failure(id, INVALID_PARAMS, "Missing params");
        };
        let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::failure(id, INVALID_PARAMS, "Missing tool name");
        };
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        let outcome = match self.registry.get(tool_name) {
            None => Err(ToolError::unknown_tool(tool_name)),
            Some(spec) => match spec.validate(&arguments) {
                Ok(arguments) => self.call_guarded(tool_name, arguments).await,
                Err(e) => Err(e),
            },
        };

        match outcome {
            Ok(payload) => {
                debug!(tool = tool_name, "tool call succeeded");
                JsonRpcResponse::success(id, tool_result(payload, false))
            }
            Err(err) => {
                warn!(tool = tool_name, kind = err.kind.as_str(), "{}", err.message);
                let payload = serde_json::to_value(&err).unwrap_or_else(|_| {
                    json!({"kind": err.kind.as_str(), "message": err.message, "retryable": err.retryable})
                });
                JsonRpcResponse::success(id, tool_result(payload, true))
            }
        }
    }

    /// A panicking handler fails its own call, not the session.
    async fn call_guarded(&self, tool_name: &str, arguments: Value) -> Result<Value, ToolError> {
        match AssertUnwindSafe(self.tools.call(tool_name, arguments))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(tool = tool_name, panic = %detail, "tool handler panicked");
                Err(ToolError::internal(format!(
                    "tool '{}' failed unexpectedly",
                    tool_name
                )))
            }
        }
    }
}

fn tool_result(payload: Value, is_error: bool) -> Value {
    json!({
        "content": [
            {
                "type": "text",
                "text": payload.to_string()
            }
        ],
        "structuredContent": payload,
        "isError": is_error
    })
}

/// Serve frames from `reader` until EOF, one at a time in arrival order.
pub async fn serve<R, W>(server: &FlowLensServer, reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut frames = 0usize;

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        frames += 1;

        if let Some(response) = server.handle(trimmed).await {
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }

    info!(frames, "stdin closed, ending session");
    Ok(())
}

/// Run the MCP server over the process's stdin/stdout.
pub async fn run_server(server: FlowLensServer) -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "flowlens-mcp session started");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve(&server, stdin, tokio::io::stdout()).await
}
