pub mod api;
pub mod auth;
pub mod config;
pub mod server;
pub mod session;
pub mod tools;
pub mod transport;

// Re-export key types and functions
pub use auth::{AccessGuard, AuthError};
pub use config::{ServeArgs, ServerConfig, ServerMode};
pub use server::{McpServer, create_router, create_tool_registry, start_sse_server};
pub use session::{InMemorySessionStore, SessionError, SessionId, SessionStore};
pub use tools::{ToolError, ToolHandler, ToolRegistry, TypedTool};
