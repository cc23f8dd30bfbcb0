//! Assertions over JSON-RPC responses produced by the MCP server.

use anyhow::{Context, Result};
use serde_json::Value;

/// Parse one response frame.
pub fn parse_frame(frame: &str) -> Result<Value> {
    serde_json::from_str(frame).with_context(|| format!("response is not JSON: {}", frame))
}

/// Structured payload of a successful `tools/call` result.
pub fn tool_payload(response: &Value) -> Result<&Value> {
    let result = response
        .get("result")
        .with_context(|| format!("expected 'result' in {}", response))?;
    if result["isError"].as_bool() == Some(true) {
        anyhow::bail!("tool call failed: {}", result["structuredContent"]);
    }
    result
        .get("structuredContent")
        .context("expected 'result.structuredContent'")
}

/// Assert that a `tools/call` result is a tool error of `kind`, returning
/// the error object.
pub fn assert_tool_error<'a>(response: &'a Value, kind: &str) -> Result<&'a Value> {
    let result = response
        .get("result")
        .with_context(|| format!("expected 'result' in {}", response))?;
    if result["isError"].as_bool() != Some(true) {
        anyhow::bail!("expected tool error '{}', got success: {}", kind, result);
    }

    let error = result
        .get("structuredContent")
        .context("expected 'result.structuredContent'")?;
    let actual = error["kind"].as_str().context("error without 'kind'")?;
    if actual != kind {
        anyhow::bail!("expected error kind '{}', got '{}': {}", kind, actual, error);
    }
    Ok(error)
}

/// Assert a JSON-RPC level error with `code`.
pub fn assert_rpc_error(response: &Value, code: i64) -> Result<()> {
    let actual = response["error"]["code"]
        .as_i64()
        .with_context(|| format!("expected 'error.code' in {}", response))?;
    if actual != code {
        anyhow::bail!("expected JSON-RPC error {}, got {}", code, actual);
    }
    Ok(())
}
