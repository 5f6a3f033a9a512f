//! REST API module for Pixelboard
//!
//! Provides the HTTP endpoints:
//! - Image CRUD, PNG rendering and raw pixel data
//! - Aggregate statistics
//! - Health check

pub mod health;
pub mod images;
pub mod statistics;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::Router;

use crate::server::AppState;

pub use health::health_routes;
pub use images::images_routes;
pub use statistics::statistics_routes;

/// Create the API router with all endpoints.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .merge(images_routes())
        .merge(statistics_routes())
}

/// Canvas error carried to an HTTP response.
#[derive(Debug)]
pub(crate) struct ApiError(pixelboard_canvas::Error);

impl From<pixelboard_canvas::Error> for ApiError {
    fn from(err: pixelboard_canvas::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use pixelboard_canvas::Error;

        let status = match &self.0 {
            Error::ImageNotFound(_) => StatusCode::NOT_FOUND,
            Error::ImageIdAlreadyExists(_) => StatusCode::CONFLICT,
            Error::InvalidImageId(_) => StatusCode::BAD_REQUEST,
            Error::IdGenerationExhausted { .. } | Error::Encoding(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({
            "code": self.0.code(),
            "detail": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
