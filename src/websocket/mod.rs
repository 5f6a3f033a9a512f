//! WebSocket module for Pixelboard
//!
//! Provides the real-time duplex endpoint:
//! - /ws/images/{id} - commands in, events out, per-image topic

pub mod image;

pub use image::image_ws_handler;

use axum::{routing::get, Router};

use crate::server::AppState;

/// Create the WebSocket router
pub fn websocket_router() -> Router<AppState> {
    Router::new().route("/ws/images/:image_id", get(image_ws_handler))
}
