//! Publish/subscribe fan-out.
//!
//! Two flavors share one implementation: [`PubSub`] fans a message out to
//! every subscriber of a named topic, and [`Announcer`] fans a message out
//! to every subscriber full stop. Both hand out [`Subscription`] handles
//! backed by per-subscriber unbounded FIFO queues.

mod broker;

#[cfg(test)]
mod tests;

pub use broker::{Announcer, PubSub, Subscription};
