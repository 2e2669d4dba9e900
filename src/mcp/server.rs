//! JSON-RPC 2.0 over newline-delimited stdio.
//!
//! Implements `initialize`, `initialized`, `ping`, `tools/list` and
//! `tools/call`. Stdout carries protocol messages only; logs go to stderr.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use super::tools;
use crate::config::Config;
use crate::db::Database;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

pub struct McpServer {
    db: Database,
    config: Config,
}

impl McpServer {
    pub fn new(db: Database, config: Config) -> Self {
        Self { db, config }
    }

    pub async fn run_stdio(&self) -> std::io::Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve(reader, writer).await
    }

    /// Reads requests line by line until EOF, answering each on `writer`.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("hanzi-tutor MCP server running");
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(line).await {
                write_response(&mut writer, &response).await?;
            }
        }
        info!("stdin closed, MCP server shutting down");
        Ok(())
    }

    /// Handles one raw message. Notifications produce no response.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(err) => {
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Invalid JSON: {err}"),
                ))
            }
        };

        if request.jsonrpc != "2.0" {
            return request
                .id
                .map(|id| JsonRpcResponse::error(id, INVALID_REQUEST, "Invalid JSON-RPC version"));
        }

        let response = self.handle_request(&request).await;
        // Notifications never get a response.
        if request.id.is_none() {
            return None;
        }
        response
    }

    async fn handle_request(&self, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone().unwrap_or(Value::Null);

        match request.method.as_str() {
            "initialize" => Some(handle_initialize(id)),
            "initialized" | "notifications/initialized" => {
                debug!("client initialized");
                None
            }
            "notifications/cancelled" => {
                debug!(params = %request.params, "request cancelled");
                None
            }
            "ping" => Some(JsonRpcResponse::success(id, json!({}))),
            "tools/list" => Some(handle_tools_list(id)),
            "tools/call" => Some(self.handle_tools_call(id, &request.params).await),
            other => Some(JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Unknown method: {other}"),
            )),
        }
    }

    async fn handle_tools_call(&self, id: Value, params: &Value) -> JsonRpcResponse {
        let name = params.get("name").and_then(Value::as_str).unwrap_or("");
        if name.is_empty() {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing tool name in params");
        }
        let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        let result = tools::call_tool(&self.db, &self.config, name, &args).await;
        match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(err) => {
                error!(error = %err, tool = name, "failed to serialize tool result");
                JsonRpcResponse::error(id, INTERNAL_ERROR, err.to_string())
            }
        }
    }
}

fn handle_initialize(id: Value) -> JsonRpcResponse {
    JsonRpcResponse::success(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            }
        }),
    )
}

fn handle_tools_list(id: Value) -> JsonRpcResponse {
    let tools: Vec<Value> = tools::tool_definitions()
        .into_iter()
        .map(|t| {
            json!({
                "name": t.name,
                "description": t.description,
                "inputSchema": t.input_schema,
            })
        })
        .collect();

    JsonRpcResponse::success(id, json!({ "tools": tools }))
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> std::io::Result<()> {
    let json = match serde_json::to_string(response) {
        Ok(json) => json,
        Err(err) => {
            error!(error = %err, "failed to serialize response");
            return Ok(());
        }
    };
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
