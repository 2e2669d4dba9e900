//! Model Context Protocol server exposing the tutor as tools over stdio.
//!
//! - `server` -- JSON-RPC 2.0 framing and method dispatch
//! - `tools`  -- tool definitions, argument parsing and routing
//! - `format` -- plain-text rendering of tool results

pub mod format;
pub mod server;
pub mod tools;

use serde::{Deserialize, Serialize};

pub use server::McpServer;

/// Tool result in the MCP wire format:
/// `{"content": [{"type": "text", "text": "..."}], "isError": false}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolResult {
    pub content: Vec<McpContent>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum McpContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl McpToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![McpContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![McpContent::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// Text of the first content item.
    pub fn first_text(&self) -> &str {
        match self.content.first() {
            Some(McpContent::Text { text }) => text,
            None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_result_serializes_to_wire_shape() {
        let value = serde_json::to_value(McpToolResult::error("boom")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"content": [{"type": "text", "text": "boom"}], "isError": true})
        );
    }
}
