//! Image CRUD endpoints
//!
//! - `GET    /images` — list of image summaries
//! - `POST   /images` — create with a generated ID
//! - `POST   /images/{id}` — create with an explicit ID
//! - `GET    /images/{id}` — image summary
//! - `GET    /images/{id}.png` — rendered PNG
//! - `GET    /images/{id}/data` — raw pixel grid
//! - `PUT    /images/{id}` — apply a command and broadcast the update
//! - `DELETE /images/{id}` — remove the image

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;

use pixelboard_canvas::{EventMessage, Image, UpdateImageRequest};

use super::ApiError;
use crate::server::AppState;

/// List all images as summaries (no pixel payload).
async fn list_images(State(state): State<AppState>) -> Json<Vec<Image>> {
    Json(state.collection.list())
}

/// Create an image with a generated ID.
async fn create_image(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Image>), ApiError> {
    let image = state.collection.create(None)?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// Create an image, providing an ID.
async fn create_image_with_id(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<(StatusCode, Json<Image>), ApiError> {
    let image = state.collection.create(Some(&image_id))?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// Image summary, or the rendered PNG for a trailing `.png`.
///
/// The router cannot match a suffix inside one path segment, so the PNG
/// route shares this handler and is dispatched on the parameter itself.
async fn get_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Response, ApiError> {
    if let Some(stem) = image_id.strip_suffix(".png") {
        let image = state.collection.get(stem)?;
        let png = image.to_png()?;
        return Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response());
    }
    let image = state.collection.get(&image_id)?;
    Ok(Json(image).into_response())
}

/// Raw pixel grid: `height × width` rows of `[r, g, b]`.
async fn get_image_data(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Json<Vec<Vec<[u8; 3]>>>, ApiError> {
    let image = state.collection.get(&image_id)?;
    Ok(Json(image.data_rows()))
}

/// Apply a command to an image and broadcast the update on its topic.
async fn update_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
    Json(request): Json<UpdateImageRequest>,
) -> Result<StatusCode, ApiError> {
    state.collection.update(&image_id, &request.command)?;
    state.pubsub.broadcast(
        &image_id,
        EventMessage::image_updated(image_id.clone(), request.command),
    );
    Ok(StatusCode::OK)
}

/// Delete an image.
async fn delete_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.collection.delete(&image_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create image routes.
pub fn images_routes() -> Router<AppState> {
    Router::new()
        .route("/images", get(list_images).post(create_image))
        .route(
            "/images/:image_id",
            get(get_image)
                .post(create_image_with_id)
                .put(update_image)
                .delete(delete_image),
        )
        .route("/images/:image_id/data", get(get_image_data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::server::build_state;
    use pixelboard_canvas::Command;

    fn test_state() -> AppState {
        build_state(&AppConfig::default()).0
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let state = test_state();
        let (status, Json(image)) =
            create_image_with_id(State(state.clone()), Path("img1".into()))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(image.image_id, "img1");

        let Json(images) = list_images(State(state)).await;
        assert_eq!(images.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let state = test_state();
        create_image_with_id(State(state.clone()), Path("img1".into()))
            .await
            .unwrap();

        let err = create_image_with_id(State(state), Path("img1".into()))
            .await
            .err()
            .expect("duplicate must fail");
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_update_broadcasts_on_topic() {
        let state = test_state();
        create_image_with_id(State(state.clone()), Path("img1".into()))
            .await
            .unwrap();
        let mut sub = state.pubsub.subscribe("img1");

        update_image(
            State(state),
            Path("img1".into()),
            Json(UpdateImageRequest {
                command: Command::ClearCanvas,
            }),
        )
        .await
        .unwrap();

        let message = sub.recv().await.unwrap();
        assert_eq!(message.event.event_type(), "image_updated");
        assert_eq!(message.event.image_id(), Some("img1"));
    }

    #[tokio::test]
    async fn test_png_suffix_dispatch() {
        let state = test_state();
        create_image_with_id(State(state.clone()), Path("img1".into()))
            .await
            .unwrap();

        let response = get_image(State(state), Path("img1.png".into()))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
    }

    #[tokio::test]
    async fn test_missing_image_is_not_found() {
        let state = test_state();
        let err = get_image(State(state.clone()), Path("missing".into()))
            .await
            .err()
            .expect("missing image must fail");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let err = delete_image(State(state), Path("missing".into()))
            .await
            .err()
            .expect("missing image must fail");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
