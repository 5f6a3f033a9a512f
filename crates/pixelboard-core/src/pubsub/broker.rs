use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::trace;

/// Internal topic used by [`Announcer`] so it can reuse the topic registry.
const ANNOUNCE_TOPIC: &str = "__announce";

/// Subscriber registry: topic → subscriber id → queue sender.
///
/// The lock is a synchronous one and is never held across an await point:
/// subscribe, unsubscribe and broadcast are all plain enqueue/registry
/// operations. This keeps `broadcast` synchronous, so within one topic the
/// delivery order seen by every subscriber equals the order the
/// `broadcast` calls were issued.
struct Registry<T> {
    topics: RwLock<HashMap<String, HashMap<u64, mpsc::UnboundedSender<T>>>>,
    next_subscriber_id: AtomicU64,
}

impl<T> Registry<T> {
    fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    fn remove_subscriber(&self, topic: &str, id: u64) {
        let mut topics = self.topics.write();
        if let Some(subscribers) = topics.get_mut(topic) {
            subscribers.remove(&id);
            if subscribers.is_empty() {
                topics.remove(topic);
            }
        }
    }
}

/// Per-topic multi-subscriber fan-out.
///
/// Every subscriber owns an unbounded FIFO queue; a broadcast enqueues a
/// clone of the message onto each queue currently registered under the
/// topic. Messages broadcast while a topic has no subscribers are dropped —
/// there is no buffering for latecomers.
pub struct PubSub<T> {
    inner: Arc<Registry<T>>,
}

impl<T> Clone for PubSub<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for PubSub<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PubSub<T> {
    /// Create an empty broker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Registry::new()),
        }
    }

    /// Register a new subscriber under `topic`.
    ///
    /// The returned handle is bound to this topic for its whole lifetime
    /// and unsubscribes itself exactly once when dropped.
    #[must_use]
    pub fn subscribe(&self, topic: impl Into<String>) -> Subscription<T> {
        let topic = topic.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .topics
            .write()
            .entry(topic.clone())
            .or_default()
            .insert(id, tx);
        trace!(topic = %topic, subscriber_id = id, "subscribed");
        Subscription {
            topic,
            id,
            rx,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Number of live subscribers for `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .topics
            .read()
            .get(topic)
            .map_or(0, HashMap::len)
    }

    /// Number of topics with at least one subscriber.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.inner.topics.read().len()
    }
}

impl<T: Clone> PubSub<T> {
    /// Enqueue `message` onto every queue currently subscribed to `topic`.
    ///
    /// Returns the number of queues the message reached. Broadcasting to a
    /// topic nobody listens to is a no-op. Subscribers whose receiving half
    /// is already gone are pruned from the registry on the way.
    pub fn broadcast(&self, topic: &str, message: T) -> usize {
        let mut delivered = 0;
        let mut stale = Vec::new();
        {
            let topics = self.inner.topics.read();
            let Some(subscribers) = topics.get(topic) else {
                return 0;
            };
            for (id, tx) in subscribers {
                if tx.send(message.clone()).is_ok() {
                    delivered += 1;
                } else {
                    stale.push(*id);
                }
            }
        }
        for id in stale {
            self.inner.remove_subscriber(topic, id);
        }
        delivered
    }
}

/// Broadcast-to-all variant of [`PubSub`]: same queues, no topic dimension.
///
/// Used for collection-wide lifecycle and presence events that every
/// listener should see regardless of which image it is watching.
pub struct Announcer<T> {
    inner: PubSub<T>,
}

impl<T> Clone for Announcer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for Announcer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Announcer<T> {
    /// Create an announcer with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: PubSub::new(),
        }
    }

    /// Register a new subscriber.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<T> {
        self.inner.subscribe(ANNOUNCE_TOPIC)
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count(ANNOUNCE_TOPIC)
    }
}

impl<T: Clone> Announcer<T> {
    /// Enqueue `message` for every live subscriber.
    pub fn broadcast(&self, message: T) -> usize {
        self.inner.broadcast(ANNOUNCE_TOPIC, message)
    }
}

/// An owned subscriber queue.
///
/// Receives, in FIFO order, every message broadcast to its topic after the
/// moment of subscription. Dropping the handle removes the queue from the
/// broker registry; that is the only way to unsubscribe, which makes the
/// cleanup run exactly once on every exit path, cancellation included.
pub struct Subscription<T> {
    topic: String,
    id: u64,
    rx: mpsc::UnboundedReceiver<T>,
    registry: Weak<Registry<T>>,
}

impl<T> Subscription<T> {
    /// Wait for the next message.
    ///
    /// Cancel-safe: a message is only consumed when this future completes.
    /// Returns `None` once the broker itself has been dropped.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Take the next message without waiting.
    ///
    /// Returns `None` when the queue is currently empty.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// The topic this subscription is bound to.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove_subscriber(&self.topic, self.id);
            trace!(topic = %self.topic, subscriber_id = self.id, "unsubscribed");
        }
    }
}
