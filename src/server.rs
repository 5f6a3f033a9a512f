//! Server assembly and runtime.
//!
//! Builds the shared state, mounts the REST, WebSocket and SSE routers,
//! spawns the statistics aggregator and runs the axum server until a
//! shutdown signal arrives. Every shared component is constructed here and
//! handed out explicitly — nothing is process-global, so tests can stand up
//! a fully wired application of their own.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use pixelboard_canvas::{
    EventMessage, ImageCollection, SharedStatistics, StatisticsAggregator,
};
use pixelboard_core::{Announcer, PubSub, ShutdownController};

use crate::config::AppConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration.
    pub config: Arc<AppConfig>,
    /// The image store.
    pub collection: Arc<ImageCollection>,
    /// Per-image topic broker.
    pub pubsub: Arc<PubSub<EventMessage>>,
    /// Collection-wide announcer.
    pub announcer: Arc<Announcer<EventMessage>>,
    /// Counters maintained by the aggregator.
    pub statistics: SharedStatistics,
}

/// Construct the shared state and the (not yet running) aggregator.
#[must_use]
pub fn build_state(config: &AppConfig) -> (AppState, StatisticsAggregator) {
    let announcer = Arc::new(Announcer::new());
    let pubsub = Arc::new(PubSub::new());
    let collection = Arc::new(
        ImageCollection::new(announcer.clone())
            .with_id_generation_attempts(config.canvas.id_generation_attempts),
    );
    let aggregator = StatisticsAggregator::new(pubsub.clone(), announcer.clone());
    let statistics = aggregator.statistics();

    let state = AppState {
        config: Arc::new(config.clone()),
        collection,
        pubsub,
        announcer,
        statistics,
    };
    (state, aggregator)
}

/// Build the full application router over `state`.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    // CORS layer for browser frontends
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(crate::api::api_router())
        .merge(crate::websocket::websocket_router())
        .merge(crate::sse::sse_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Spawn the statistics aggregator on the runtime.
pub fn spawn_aggregator(
    aggregator: StatisticsAggregator,
    shutdown: &ShutdownController,
) -> JoinHandle<()> {
    tokio::spawn(aggregator.run(shutdown.token()))
}

/// Run the server until shutdown.
pub async fn run(config: AppConfig) -> Result<()> {
    let (state, aggregator) = build_state(&config);
    let shutdown = ShutdownController::new();
    let aggregator_handle = spawn_aggregator(aggregator, &shutdown);

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .context("HTTP server error")?;

    // The signal handler has fired the controller; let the aggregator drain.
    aggregator_handle
        .await
        .context("Statistics aggregator panicked")?;
    info!("Server stopped");
    Ok(())
}

/// Resolve when a shutdown signal arrives, firing the controller.
async fn shutdown_signal(shutdown: Arc<ShutdownController>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
    shutdown.shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_state_wires_shared_components() {
        let config = AppConfig::default();
        let (state, _aggregator) = build_state(&config);

        // The collection announces on the same announcer the state exposes.
        let mut sub = state.announcer.subscribe();
        state.collection.create(Some("img1")).unwrap();
        let message = sub.recv().await.unwrap();
        assert_eq!(message.event.event_type(), "image_created");
    }

    #[tokio::test]
    async fn test_aggregator_sees_collection_events() {
        let config = AppConfig::default();
        let (state, aggregator) = build_state(&config);
        let shutdown = ShutdownController::new();
        let handle = spawn_aggregator(aggregator, &shutdown);

        state.collection.create(Some("img1")).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(1), async {
            loop {
                if state.statistics.read().images_created == 1 {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("aggregator did not observe the create");

        shutdown.shutdown();
        handle.await.unwrap();
    }
}
