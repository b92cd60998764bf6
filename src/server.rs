//! MCP server implementation using rmcp.
//!
//! `McpServer` answers protocol requests by delegating to the tool registry.
//! `create_router` assembles the HTTP surface and `start_sse_server` binds it.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use axum::Router;
use axum::routing::{get, post};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::*,
    service::{RequestContext, RoleServer},
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::auth::{AccessGuard, require_api_key};
use crate::config::{ServerConfig, ServerMode};
use crate::session::{InMemorySessionStore, SessionStore};
use crate::tools::{FetchWeatherTool, ToolRegistry};
use crate::transport::{MESSAGE_PATH, SSE_PATH, TransportState, open_sse, post_message};

/// Name advertised in the MCP initialize handshake.
pub const SERVER_NAME: &str = "sample-sseservers";
/// Version advertised in the MCP initialize handshake.
pub const SERVER_VERSION: &str = "1.0.0";

/// MCP server that handles protocol requests and delegates to tool handlers.
///
/// Cheap to clone; one clone is bound to each SSE session.
#[derive(Clone)]
pub struct McpServer {
    tool_registry: Arc<ToolRegistry>,
}

impl McpServer {
    pub fn new(tool_registry: Arc<ToolRegistry>) -> Self {
        Self { tool_registry }
    }
}

impl ServerHandler for McpServer {
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let result = ListToolsResult {
            tools: self.tool_registry.list_tools(),
            ..Default::default()
        };
        std::future::ready(Ok(result))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tool_name = request.name.to_string();
        let args = request.arguments.unwrap_or_default();
        let registry = self.tool_registry.clone();

        async move {
            match registry.invoke(&tool_name, args).await {
                Ok(result) => Ok(result),
                Err(e) => {
                    warn!(tool = %tool_name, error = %e, "tool call failed");
                    e.into_call_result()
                }
            }
        }
    }

    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = SERVER_NAME.to_string();
        server_info.version = SERVER_VERSION.to_string();

        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info,
            instructions: Some(
                "Demonstration server exposing add, echo, calculate-bmi and fetch-weather tools."
                    .to_string(),
            ),
        }
    }
}

/// Build the HTTP application.
///
/// The open variant serves `/health` and no guard; the guarded variant puts
/// the API-key check in front of both transport routes.
pub fn create_router(
    server: McpServer,
    sessions: Arc<dyn SessionStore>,
    mode: &ServerMode,
) -> Router {
    let state = TransportState::new(server, sessions);

    let transport = Router::new()
        .route(SSE_PATH, get(open_sse))
        .route(MESSAGE_PATH, post(post_message))
        .with_state(state);

    let app = match mode {
        ServerMode::Open => transport.merge(crate::api::create_health_router()),
        ServerMode::Guarded { api_key } => {
            let guard = Arc::new(AccessGuard::new(api_key.clone()));
            transport.layer(axum::middleware::from_fn_with_state(guard, require_api_key))
        }
    };

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

/// Build the default tool registry for a configuration.
pub fn create_tool_registry(config: &ServerConfig) -> Result<ToolRegistry> {
    let http = reqwest::Client::builder()
        .build()
        .context("build weather HTTP client")?;
    let weather = FetchWeatherTool::new(http, &config.weather_base_url);
    Ok(ToolRegistry::builtin(weather)?)
}

/// Start the SSE server and serve until the listener fails.
pub async fn start_sse_server(config: ServerConfig) -> Result<()> {
    let registry = create_tool_registry(&config)?;
    let server = McpServer::new(Arc::new(registry));
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    if let ServerMode::Guarded { api_key } = &config.mode {
        if !AccessGuard::new(api_key.clone()).has_secret() {
            warn!("API key gating enabled but no API_KEY configured - all requests will be rejected");
        }
    }

    let router = create_router(server, sessions, &config.mode);
    let bind = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("bind {}", bind))?;

    match config.mode {
        ServerMode::Open => info!("Server running on port {}", config.port),
        ServerMode::Guarded { .. } => {
            info!("Server running on port {} (API key required)", config.port)
        }
    }

    axum::serve(listener, router).await?;

    Ok(())
}
