//! Aggregate statistics over the event streams.
//!
//! The aggregator is purely reactive: it subscribes once to the announcer
//! and, as images come and go, to each image's own topic, and maintains
//! running counters. It is the only writer of [`Statistics`]; HTTP handlers
//! only read.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tokio_stream::{StreamExt, StreamMap};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::events::{Event, EventMessage};
use crate::image_id::ImageId;
use pixelboard_core::{Announcer, PubSub, Subscription};

/// Running counters served by `GET /statistics`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    /// Images created since startup.
    pub images_created: u64,
    /// Images deleted since startup.
    pub images_deleted: u64,
    /// Currently connected live users.
    pub user_count: i64,
    /// Update count per image, keyed by image ID.
    pub image_updates: HashMap<ImageId, u64>,
}

/// Shared handle to the counters: one writer (the aggregator), many readers.
pub type SharedStatistics = Arc<RwLock<Statistics>>;

/// The long-lived statistics consumer task.
pub struct StatisticsAggregator {
    statistics: SharedStatistics,
    pubsub: Arc<PubSub<EventMessage>>,
    announcer: Arc<Announcer<EventMessage>>,
}

impl StatisticsAggregator {
    /// Create an aggregator reading from `pubsub` and `announcer`.
    #[must_use]
    pub fn new(
        pubsub: Arc<PubSub<EventMessage>>,
        announcer: Arc<Announcer<EventMessage>>,
    ) -> Self {
        Self {
            statistics: Arc::new(RwLock::new(Statistics::default())),
            pubsub,
            announcer,
        }
    }

    /// Get the shared counter handle for HTTP readers.
    #[must_use]
    pub fn statistics(&self) -> SharedStatistics {
        Arc::clone(&self.statistics)
    }

    /// Run until `shutdown` fires.
    ///
    /// Each cycle waits on the announcer queue and on every tracked
    /// per-image queue at once; whichever is ready first is processed and
    /// the rest stay queued for the next cycle — queues are not one-shot,
    /// so nothing ready is ever lost between cycles.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut announcements = self.announcer.subscribe();
        let mut topics: StreamMap<ImageId, Subscription<EventMessage>> = StreamMap::new();

        info!("statistics aggregator started");
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                Some(message) = announcements.recv() => {
                    self.handle_announcement(message, &mut topics);
                }
                Some((_, message)) = topics.next(), if !topics.is_empty() => {
                    self.handle_topic_message(message);
                }
                else => break,
            }
        }
        info!("statistics aggregator stopped");
    }

    /// React to a collection-wide or presence event.
    fn handle_announcement(
        &self,
        message: EventMessage,
        topics: &mut StreamMap<ImageId, Subscription<EventMessage>>,
    ) {
        match message.event {
            Event::ImageCreated { image_id } => {
                topics.insert(image_id.clone(), self.pubsub.subscribe(image_id.clone()));
                self.statistics.write().images_created += 1;
                debug!(image_id = %image_id, "tracking image topic");
            }
            Event::ImageDeleted { image_id } => {
                // Dropping the subscription unsubscribes from the topic.
                topics.remove(&image_id);
                self.statistics.write().images_deleted += 1;
                debug!(image_id = %image_id, "stopped tracking image topic");
            }
            Event::UserConnected => self.adjust_user_count(1),
            Event::UserDisconnected => self.adjust_user_count(-1),
            // Our own re-publication must not feed back into the counters,
            // and image updates are only counted on their topic queue.
            Event::UserCountUpdated { .. } | Event::ImageUpdated { .. } => {}
        }
    }

    /// React to a per-image topic event.
    fn handle_topic_message(&self, message: EventMessage) {
        if let Event::ImageUpdated { image_id, .. } = message.event {
            let mut statistics = self.statistics.write();
            *statistics.image_updates.entry(image_id).or_insert(0) += 1;
        }
    }

    /// Apply a presence delta and re-announce the new count.
    ///
    /// Publishes only when the count actually changed.
    fn adjust_user_count(&self, delta: i64) {
        let count = {
            let mut statistics = self.statistics.write();
            let previous = statistics.user_count;
            statistics.user_count += delta;
            if statistics.user_count == previous {
                return;
            }
            statistics.user_count
        };
        self.announcer
            .broadcast(EventMessage::user_count_updated(count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Command;
    use std::time::Duration;

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    struct Harness {
        pubsub: Arc<PubSub<EventMessage>>,
        announcer: Arc<Announcer<EventMessage>>,
        statistics: SharedStatistics,
        shutdown: CancellationToken,
        handle: tokio::task::JoinHandle<()>,
    }

    fn spawn_aggregator() -> Harness {
        let pubsub = Arc::new(PubSub::new());
        let announcer = Arc::new(Announcer::new());
        let aggregator = StatisticsAggregator::new(pubsub.clone(), announcer.clone());
        let statistics = aggregator.statistics();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(aggregator.run(shutdown.clone()));
        Harness {
            pubsub,
            announcer,
            statistics,
            shutdown,
            handle,
        }
    }

    #[tokio::test]
    async fn test_counts_image_lifecycle_and_updates() {
        let h = spawn_aggregator();

        h.announcer.broadcast(EventMessage::image_created("a"));
        wait_until(|| h.statistics.read().images_created == 1).await;
        // Tracking implies a live topic subscription.
        assert_eq!(h.pubsub.subscriber_count("a"), 1);

        h.pubsub
            .broadcast("a", EventMessage::image_updated("a", Command::ClearCanvas));
        wait_until(|| h.statistics.read().image_updates.get("a") == Some(&1)).await;

        h.announcer.broadcast(EventMessage::image_deleted("a"));
        wait_until(|| h.statistics.read().images_deleted == 1).await;
        assert_eq!(h.pubsub.subscriber_count("a"), 0);

        // Updates after deletion are no longer observed.
        h.pubsub
            .broadcast("a", EventMessage::image_updated("a", Command::ClearCanvas));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(h.statistics.read().image_updates.get("a"), Some(&1));

        h.shutdown.cancel();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_user_count_republished_on_change() {
        let h = spawn_aggregator();
        let mut observer = h.announcer.subscribe();

        h.announcer.broadcast(EventMessage::user_connected());
        wait_until(|| h.statistics.read().user_count == 1).await;

        // The observer sees the original presence event, then the
        // aggregator's re-publication, and nothing further (no feedback
        // loop on user_count_updated).
        assert_eq!(
            observer.recv().await,
            Some(EventMessage::user_connected())
        );
        assert_eq!(
            observer.recv().await,
            Some(EventMessage::user_count_updated(1))
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(observer.try_recv().is_none());

        h.announcer.broadcast(EventMessage::user_disconnected());
        wait_until(|| h.statistics.read().user_count == 0).await;
        assert_eq!(
            observer.recv().await,
            Some(EventMessage::user_disconnected())
        );
        assert_eq!(
            observer.recv().await,
            Some(EventMessage::user_count_updated(0))
        );

        h.shutdown.cancel();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_updates_on_unknown_topics_are_not_counted() {
        let h = spawn_aggregator();

        // No image_created announcement — the aggregator never subscribed.
        h.pubsub
            .broadcast("ghost", EventMessage::image_updated("ghost", Command::ClearCanvas));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(h.statistics.read().image_updates.is_empty());

        h.shutdown.cancel();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_task() {
        let h = spawn_aggregator();
        h.shutdown.cancel();
        h.handle.await.unwrap();
    }
}
