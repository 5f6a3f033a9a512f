//! Health check endpoint
//!
//! `GET /health` — simple "healthy" + version (for load balancers).

use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::server::AppState;

/// Simple health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
}

/// Simple health check (for load balancers)
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Create health routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
