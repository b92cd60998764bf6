//! Plain HTTP endpoints that sit beside the MCP transport.

use axum::{Router, http::StatusCode, routing::get};

pub const HEALTH_PATH: &str = "/health";

pub fn create_health_router() -> Router {
    Router::new().route(HEALTH_PATH, get(health_check))
}

async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
