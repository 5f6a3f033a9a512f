//! Graceful shutdown coordination.
//!
//! One controller per process. Long-lived tasks (the statistics aggregator,
//! the HTTP server's graceful-shutdown future) each take a child token and
//! exit when it fires.
//!
//! ```ignore
//! let shutdown = ShutdownController::new();
//! let token = shutdown.token();
//! tokio::spawn(async move { aggregator.run(token).await });
//!
//! shutdown.shutdown();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Coordinates cancellation of every long-lived task in the process.
pub struct ShutdownController {
    cancel_token: CancellationToken,
    initiated: AtomicBool,
}

impl ShutdownController {
    /// Create a new controller.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            cancel_token: CancellationToken::new(),
            initiated: AtomicBool::new(false),
        })
    }

    /// Get a cancellation token for a component.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    /// Whether shutdown has been initiated.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.initiated.load(Ordering::SeqCst)
    }

    /// Initiate shutdown. Idempotent; every child token fires.
    pub fn shutdown(&self) {
        if self.initiated.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Shutdown initiated");
        self.cancel_token.cancel();
    }

    /// Wait until shutdown is initiated.
    pub async fn cancelled(&self) {
        self.cancel_token.cancelled().await;
    }
}
