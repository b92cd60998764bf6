//! Shared-secret gate for inbound HTTP requests.

use std::fmt;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

/// Header carrying the client's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reasons a request is turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No secret is configured, so nothing can match.
    SecretNotConfigured,
    /// The request carried no credential.
    MissingCredential,
    /// The credential did not equal the configured secret.
    Mismatch,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SecretNotConfigured => write!(f, "No API key configured on the server"),
            Self::MissingCredential => write!(f, "Request carries no API key"),
            Self::Mismatch => write!(f, "API key does not match"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // The reason is logged, never echoed to the client.
        (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
    }
}

/// Compares a request header against a secret loaded once at startup.
///
/// Comparison is exact string equality.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    secret: Option<String>,
}

impl AccessGuard {
    /// Guard on the `x-api-key` header. An empty secret counts as
    /// unconfigured.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    pub fn check(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let secret = self.secret.as_deref().ok_or(AuthError::SecretNotConfigured)?;
        let presented = headers
            .get(API_KEY_HEADER)
            .ok_or(AuthError::MissingCredential)?;

        match presented.to_str() {
            Ok(value) if value == secret => Ok(()),
            _ => Err(AuthError::Mismatch),
        }
    }
}

/// Axum middleware rejecting requests that fail [`AccessGuard::check`].
pub async fn require_api_key(
    State(guard): State<Arc<AccessGuard>>,
    request: Request,
    next: Next,
) -> Response {
    match guard.check(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(reason) => {
            warn!(
                method = %request.method(),
                path = %request.uri().path(),
                %reason,
                "rejected unauthorized request"
            );
            reason.into_response()
        }
    }
}
