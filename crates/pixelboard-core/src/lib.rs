//! Pixelboard Core - Broker Primitives
//!
//! This crate provides the infrastructure pieces shared by the Pixelboard
//! server:
//! - PubSub: per-topic multi-subscriber queue fan-out
//! - Announcer: topic-less broadcast to every live subscriber
//! - Subscription: an owned queue handle that unsubscribes on drop
//! - ShutdownController: coordinated cancellation for long-lived tasks
//!
//! The broker types are deliberately generic over the message type so the
//! domain crates decide what flows through them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod pubsub;
pub mod shutdown;

pub use pubsub::{Announcer, PubSub, Subscription};
pub use shutdown::ShutdownController;
