//! Statistics endpoint
//!
//! `GET /statistics` — the aggregator's current counters.

use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;

use pixelboard_canvas::Statistics;

use crate::server::AppState;

/// Snapshot of the current counters.
async fn get_statistics(State(state): State<AppState>) -> Json<Statistics> {
    Json(state.statistics.read().clone())
}

/// Create statistics routes.
pub fn statistics_routes() -> Router<AppState> {
    Router::new().route("/statistics", get(get_statistics))
}
