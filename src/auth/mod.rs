//! API-key gating for the guarded server variant.
//!
//! Requests must carry the configured shared secret in the `X-API-Key`
//! header. The guard is a plain axum middleware, applied to the transport
//! routes only when the server runs in guarded mode.

mod guard;

pub use guard::{API_KEY_HEADER, AccessGuard, AuthError, require_api_key};
