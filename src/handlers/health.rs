//! Health check endpoint
//!
//! Provides a simple health check for monitoring and load balancers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::handlers::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Whether an LLM API credential is available
    pub credential_configured: bool,
    /// Request log sink: "mongodb" or "disabled"
    pub request_log: String,
}

/// Health check handler
///
/// Always 200 OK while the process serves requests. A missing credential is
/// reported, not treated as unhealthy.
pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK".to_string(),
            credential_configured: state.gateway().has_credential(),
            request_log: state.request_log().sink_name().to_string(),
        }),
    )
}
