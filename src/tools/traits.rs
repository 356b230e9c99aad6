//! Core tool trait and result types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::{FunctionDefinition, ToolDefinition};
use crate::error::Result;

/// A tool that can be called by the LLM
///
/// `execute` returns `Err` only for faults that should abort the turn; an
/// upstream answer the model can reason about belongs in a `ToolResult`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name
    fn name(&self) -> &str;

    /// Get the tool description
    fn description(&self) -> &str;

    /// Get the JSON Schema for tool parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with given arguments
    async fn execute(&self, args: Value) -> Result<ToolResult>;

    /// Convert to an OpenAI tool definition
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: self.name().to_string(),
                description: self.description().to_string(),
                parameters: self.parameters_schema(),
            },
        }
    }
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the execution was successful
    pub success: bool,
    /// Result content (for successful execution)
    pub content: Option<String>,
    /// Error message (for failed execution)
    pub error: Option<String>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(content: impl Into<String>) -> Self {
        ToolResult {
            success: true,
            content: Some(content.into()),
            error: None,
        }
    }

    /// Create a successful result holding serialized JSON
    pub fn json(value: &Value) -> Self {
        Self::success(value.to_string())
    }

    /// Create a failed result
    pub fn failure(error: impl Into<String>) -> Self {
        ToolResult {
            success: false,
            content: None,
            error: Some(error.into()),
        }
    }

    /// Text handed back to the LLM
    pub fn llm_text(&self) -> String {
        if self.success {
            self.content.clone().unwrap_or_default()
        } else {
            format!("Error: {}", self.error.clone().unwrap_or_default())
        }
    }
}

/// A tool call request from the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool call ID
    pub id: String,
    /// Tool name
    pub name: String,
    /// Tool arguments as JSON
    pub arguments: Value,
}

/// Deserialize raw tool arguments into a typed struct
pub fn parse_arguments<T: for<'de> Deserialize<'de>>(args: Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| crate::Error::InvalidInput(format!("Invalid tool arguments: {}", e)))
}
