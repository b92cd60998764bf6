//! Tool registry for managing MCP tool handlers.
//!
//! Provides a `ToolHandler` trait for implementing tools, a `TypedTool`
//! convenience trait for tools with a typed argument struct, and a
//! `ToolRegistry` for registering and invoking them by name.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Context as _;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool as McpTool};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::tools::{ArgSchema, ToolError};

/// Trait for handling MCP tool invocations.
///
/// Each tool implements this trait to define its schema and execution logic.
pub trait ToolHandler: Send + Sync {
    /// Returns the tool's name (e.g., "calculate-bmi").
    fn name(&self) -> &str;

    /// Returns the tool's description.
    fn description(&self) -> &str;

    /// Returns the declared argument schema.
    fn arg_schema(&self) -> ArgSchema;

    /// Executes the tool with arguments that already passed schema validation.
    fn execute(
        &self,
        args: JsonObject,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<CallToolResult>> + Send + '_>>;

    /// Converts this handler to an `McpTool` for use in `list_tools`.
    fn to_mcp_tool(&self) -> McpTool {
        McpTool::new(
            self.name().to_string(),
            self.description().to_string(),
            Arc::new(self.arg_schema().to_json_schema()),
        )
    }
}

/// A tool with a typed argument struct and a single text result.
///
/// Implementors get [`ToolHandler`] for free: arguments are decoded into
/// `Args` and the returned text becomes one `text` content item.
pub trait TypedTool: Send + Sync {
    type Args: DeserializeOwned + Send + 'static;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn arg_schema(&self) -> ArgSchema;

    fn run(&self, args: Self::Args) -> impl Future<Output = anyhow::Result<String>> + Send;
}

impl<T: TypedTool> ToolHandler for T {
    fn name(&self) -> &str {
        TypedTool::name(self)
    }

    fn description(&self) -> &str {
        TypedTool::description(self)
    }

    fn arg_schema(&self) -> ArgSchema {
        TypedTool::arg_schema(self)
    }

    fn execute(
        &self,
        args: JsonObject,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<CallToolResult>> + Send + '_>> {
        Box::pin(async move {
            let typed: T::Args = serde_json::from_value(serde_json::Value::Object(args))
                .context("decode tool arguments")?;
            let text = self.run(typed).await?;
            Ok(CallToolResult::success(vec![Content::text(text)]))
        })
    }
}

/// Registry for managing tool handlers.
///
/// Tools are registered once at startup and listed in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    handlers: Vec<Arc<dyn ToolHandler>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool handler. Fails if the name is already taken.
    pub fn register<T: ToolHandler + 'static>(&mut self, handler: T) -> Result<(), ToolError> {
        self.register_arc(Arc::new(handler))
    }

    /// Register a shared tool handler. Fails if the name is already taken.
    pub fn register_arc(&mut self, handler: Arc<dyn ToolHandler>) -> Result<(), ToolError> {
        let name = handler.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(ToolError::DuplicateTool(name));
        }
        self.by_name.insert(name, self.handlers.len());
        self.handlers.push(handler);
        Ok(())
    }

    /// Get a tool handler by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.by_name
            .get(name)
            .map(|&index| self.handlers[index].clone())
    }

    /// List all registered tool names.
    pub fn list_names(&self) -> Vec<String> {
        self.handlers.iter().map(|h| h.name().to_string()).collect()
    }

    /// Get all registered tools as `McpTool` instances for `list_tools`.
    pub fn list_tools(&self) -> Vec<McpTool> {
        self.handlers.iter().map(|h| h.to_mcp_tool()).collect()
    }

    /// Invoke a tool by name.
    ///
    /// Arguments are validated against the tool's schema first; the handler
    /// only runs when they conform.
    pub async fn invoke(&self, name: &str, args: JsonObject) -> Result<CallToolResult, ToolError> {
        let handler = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        if let Err(violations) = handler.arg_schema().validate(&args) {
            debug!(tool = name, ?violations, "rejected tool arguments");
            return Err(ToolError::InvalidArguments {
                tool: name.to_string(),
                violations,
            });
        }

        handler
            .execute(args)
            .await
            .map_err(|source| ToolError::ToolExecutionFailed {
                tool: name.to_string(),
                source,
            })
    }

    /// Check if a tool with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Return the number of registered tools.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Return `true` if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
