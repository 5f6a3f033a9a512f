//! Per-image WebSocket handler.
//!
//! One task per live connection. The streaming loop races the inbound
//! socket against the connection's topic subscription and reacts to
//! whichever is ready first; both sources are queues, so anything not
//! handled this cycle is still there on the next one.
//!
//! A malformed frame is logged and dropped — it never closes a shared
//! session. Every exit path drops the subscription (the one and only
//! unsubscribe) and announces the disconnect.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use tracing::{info, warn};

use pixelboard_canvas::{validate_image_id, Error, EventMessage, UpdateImageRequest};

use crate::api::ApiError;
use crate::server::AppState;

/// WebSocket upgrade handler.
pub async fn image_ws_handler(
    ws: WebSocketUpgrade,
    Path(image_id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    if let Err(e) = validate_image_id(&image_id) {
        return ApiError::from(e).into_response();
    }
    ws.on_upgrade(move |socket| handle_socket(socket, image_id, state))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, image_id: String, state: AppState) {
    info!(image_id = %image_id, "WebSocket connected");

    // Viewers are not required to create the image first.
    if !state.collection.contains(&image_id) {
        match state.collection.create(Some(&image_id)) {
            // A concurrent viewer may have created it in the meantime.
            Ok(_) | Err(Error::ImageIdAlreadyExists(_)) => {}
            Err(e) => {
                warn!(image_id = %image_id, error = %e, "Failed to auto-create image");
                return;
            }
        }
    }

    state.announcer.broadcast(EventMessage::user_connected());
    let mut subscription = state.pubsub.subscribe(image_id.clone());

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    handle_socket_input(&text, &image_id, &state);
                }
                Some(Ok(Message::Close(_))) | None => break,
                // Pings are answered by axum; binary frames are ignored.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(image_id = %image_id, error = %e, "WebSocket error");
                    break;
                }
            },
            Some(message) = subscription.recv() => {
                match serde_json::to_string(&message) {
                    Ok(json) => {
                        if sender.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "Failed to serialize event"),
                }
            }
        }
    }

    // Dropping the subscription unsubscribes exactly once, error paths too.
    drop(subscription);
    state.announcer.broadcast(EventMessage::user_disconnected());
    info!(image_id = %image_id, "WebSocket disconnected");
}

/// Apply one inbound frame.
///
/// Valid commands mutate the image and are broadcast back onto the same
/// topic, so the sender sees the authoritative result along with every
/// other viewer.
fn handle_socket_input(text: &str, image_id: &str, state: &AppState) {
    let request: UpdateImageRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => {
            warn!(image_id, error = %e, "Malformed frame dropped");
            return;
        }
    };

    // The image can vanish mid-session if a REST client deletes it.
    if let Err(e) = state.collection.update(image_id, &request.command) {
        warn!(image_id, error = %e, "Update failed");
        return;
    }
    state.pubsub.broadcast(
        image_id,
        EventMessage::image_updated(image_id.to_string(), request.command),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::server::build_state;

    fn test_state() -> AppState {
        build_state(&AppConfig::default()).0
    }

    #[tokio::test]
    async fn test_valid_input_mutates_and_broadcasts() {
        let state = test_state();
        state.collection.create(Some("img1")).unwrap();
        let mut sub = state.pubsub.subscribe("img1");

        handle_socket_input(
            r#"{"command":{"command_type":"draw","values":[[1,2,9,8,7]]}}"#,
            "img1",
            &state,
        );

        assert_eq!(
            state.collection.get("img1").unwrap().pixel(1, 2),
            Some([9, 8, 7])
        );
        let message = sub.recv().await.unwrap();
        assert!(matches!(
            message.event,
            pixelboard_canvas::Event::ImageUpdated { .. }
        ));
    }

    #[tokio::test]
    async fn test_malformed_input_is_dropped() {
        let state = test_state();
        state.collection.create(Some("img1")).unwrap();
        let mut sub = state.pubsub.subscribe("img1");

        handle_socket_input("not json", "img1", &state);
        handle_socket_input(r#"{"command":{"command_type":"sparkle"}}"#, "img1", &state);

        // Nothing was broadcast and the canvas is untouched.
        assert!(sub.try_recv().is_none());
        assert_eq!(
            state.collection.get("img1").unwrap().pixel(0, 0),
            Some([255, 255, 255])
        );
    }

    #[tokio::test]
    async fn test_input_for_deleted_image_is_dropped() {
        let state = test_state();
        state.collection.create(Some("img1")).unwrap();
        state.collection.delete("img1").unwrap();
        let mut sub = state.pubsub.subscribe("img1");

        handle_socket_input(
            r#"{"command":{"command_type":"clear_canvas"}}"#,
            "img1",
            &state,
        );
        assert!(sub.try_recv().is_none());
    }
}
