//! Server-Sent-Events module for Pixelboard
//!
//! Provides the read-only announce stream:
//! - /sse/announce - every collection-wide and presence event
//!
//! Same subscribe/stream/unsubscribe discipline as the WebSocket path, but
//! one-directional and against the announcer. Each frame carries the
//! event's tag in the `event:` field and a per-connection counter starting
//! at 1 in the `id:` field, so clients can resume. Keepalive comments at a
//! configurable interval stand in for a per-send timeout; a dead peer is
//! detected through them and TCP.

use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures_util::{Stream, StreamExt};
use tracing::info;

use crate::server::AppState;

/// Stream every announcer event to the client.
async fn sse_announce(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, axum::Error>>> {
    info!("SSE subscriber connected");
    let subscription = state.announcer.subscribe();

    // Dropping the stream on disconnect drops the subscription with it.
    let stream = subscription.enumerate().map(|(index, message)| {
        SseEvent::default()
            .event(message.event.event_type())
            .id((index + 1).to_string())
            .json_data(&message)
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new().interval(Duration::from_secs(state.config.sse.keep_alive_secs)),
    )
}

/// Create the SSE router
pub fn sse_router() -> Router<AppState> {
    Router::new().route("/sse/announce", get(sse_announce))
}
