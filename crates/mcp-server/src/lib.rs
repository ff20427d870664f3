//! # dotcontext MCP server
//!
//! Exposes the context operations as tools over the Model Context Protocol's stdio transport:
//! JSON-RPC 2.0 messages, one per line, read from any async reader and answered on any async
//! writer.
//!
//! Tool failures (a missing metadata document, bad arguments, an unknown tool) are returned as
//! tool output flagged `isError`. Only protocol violations become JSON-RPC errors.

pub mod format;
pub mod protocol;
pub mod tools;

use dotcontext_core::ContextService;
use protocol::{
    JsonRpcRequest, JsonRpcResponse, ToolCallParams, ToolCallResult, INVALID_PARAMS,
    INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND, PARSE_ERROR,
};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "dotcontext";

/// Protocol revision offered when the client does not ask for one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// The transport could not be read or written.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// A response could not be encoded.
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Serves context tools to a single client.
#[derive(Clone, Debug)]
pub struct McpServer {
    service: ContextService,
}

impl McpServer {
    pub fn new(service: ContextService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &ContextService {
        &self.service
    }

    /// Answer requests from `reader` on `writer` until the input ends.
    ///
    /// Requests are handled one at a time in arrival order. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns `McpServerError` if the transport fails. Malformed messages are answered, not
    /// treated as transport failures.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<(), McpServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(
            "-- Serving dotcontext tools from {}",
            self.service.config().base_dir().display()
        );

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_message(&line).await {
                let mut payload = serde_json::to_vec(&response)?;
                payload.push(b'\n');
                writer.write_all(&payload).await?;
                writer.flush().await?;
            }
        }

        tracing::info!("input closed, stopping server");
        Ok(())
    }

    /// Handle one raw message. Returns `None` for notifications.
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("unreadable message: {}", e);
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    PARSE_ERROR,
                    format!("parse error: {}", e),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    id,
                    INVALID_REQUEST,
                    format!("invalid request: {}", e),
                ));
            }
        };

        self.handle_request(request).await
    }

    /// Dispatch a decoded request. Returns `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                request.id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "invalid json-rpc version",
            ));
        }

        tracing::debug!("received {}", request.method);
        let Some(id) = request.id else {
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, initialize_result(request.params)),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => {
                JsonRpcResponse::success(id, json!({ "tools": tools::tool_definitions() }))
            }
            "tools/call" => self.call_tool(id, request.params).await,
            _ => JsonRpcResponse::failure(id, METHOD_NOT_FOUND, "method not found"),
        };
        Some(response)
    }

    async fn call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params = params.unwrap_or(Value::Null);
        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(_) => return JsonRpcResponse::failure(id, INVALID_PARAMS, "invalid tool params"),
        };

        let result = match tools::call_tool(&self.service, &call.name, call.arguments).await {
            Ok(text) => ToolCallResult::text(text),
            Err(e) => {
                tracing::warn!("tool {} failed: {}", call.name, e);
                ToolCallResult::error(e)
            }
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::failure(
                id,
                INVALID_REQUEST,
                format!("failed to encode tool result: {}", e),
            ),
        }
    }
}

fn initialize_result(params: Option<Value>) -> Value {
    let protocol_version = params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION)
        .to_string();

    json!({
        "protocolVersion": protocol_version,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}
