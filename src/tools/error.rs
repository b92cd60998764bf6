//! Error types for tool registration and invocation.

use std::fmt;

use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, Content};

use crate::tools::ArgViolation;

/// Errors raised by the [`ToolRegistry`](crate::tools::ToolRegistry).
#[derive(Debug)]
pub enum ToolError {
    /// No tool is registered under this name.
    UnknownTool(String),

    /// A tool with this name is already registered.
    DuplicateTool(String),

    /// The arguments did not match the tool's schema. The handler was not run.
    InvalidArguments {
        tool: String,
        violations: Vec<ArgViolation>,
    },

    /// The handler ran and failed.
    ToolExecutionFailed {
        tool: String,
        source: anyhow::Error,
    },
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTool(name) => write!(f, "Tool {} not found", name),
            Self::DuplicateTool(name) => write!(f, "Tool {} is already registered", name),
            Self::InvalidArguments { tool, violations } => {
                write!(f, "Invalid arguments for tool {}: ", tool)?;
                for (i, violation) in violations.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{}", violation)?;
                }
                Ok(())
            }
            Self::ToolExecutionFailed { tool, source } => {
                write!(f, "Tool {} failed: {:#}", tool, source)
            }
        }
    }
}

impl std::error::Error for ToolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ToolExecutionFailed { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

impl ToolError {
    /// Map this error onto an MCP `tools/call` outcome.
    ///
    /// Requests the server could not act on become JSON-RPC errors. A handler
    /// failure is a completed call, so it is reported as a tool result with
    /// `isError` set.
    pub fn into_call_result(self) -> Result<CallToolResult, McpError> {
        match self {
            Self::UnknownTool(_) | Self::DuplicateTool(_) => {
                Err(McpError::invalid_params(self.to_string(), None))
            }
            Self::InvalidArguments { ref violations, .. } => {
                let data = serde_json::json!({ "violations": violations });
                Err(McpError::invalid_params(self.to_string(), Some(data)))
            }
            Self::ToolExecutionFailed { .. } => {
                Ok(CallToolResult::error(vec![Content::text(self.to_string())]))
            }
        }
    }
}
