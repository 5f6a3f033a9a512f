//! Pixelboard Canvas - Shared Drawing Domain
//!
//! This crate provides the canvas domain for Pixelboard:
//! - Image: fixed 64×64 RGB grid with draw/clear mutation and PNG encoding
//! - ImageCollection: identity-keyed store with lifecycle announcements
//! - Protocol: command wire envelopes shared by HTTP and WebSocket
//! - Events: event wire envelopes fanned out through the broker
//! - Statistics: running counters maintained by the aggregator task
//! - Error: error types for canvas operations
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use pixelboard_canvas::{Command, EventMessage, ImageCollection};
//! use pixelboard_core::{Announcer, PubSub};
//!
//! let announcer = Arc::new(Announcer::new());
//! let pubsub: PubSub<EventMessage> = PubSub::new();
//!
//! let collection = ImageCollection::new(announcer);
//! let image = collection.create(Some("img1")).unwrap();
//!
//! collection.update(&image.image_id, &Command::ClearCanvas).unwrap();
//! pubsub.broadcast(
//!     &image.image_id,
//!     EventMessage::image_updated(image.image_id.clone(), Command::ClearCanvas),
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod collection;
pub mod error;
pub mod events;
pub mod image;
pub mod image_id;
pub mod protocol;
pub mod statistics;

// Re-export main types
pub use collection::{ImageCollection, DEFAULT_ID_GENERATION_ATTEMPTS};
pub use error::{Error, Result};
pub use events::{Event, EventMessage};
pub use image::{Image, IMAGE_HEIGHT, IMAGE_WIDTH};
pub use image_id::{generate_image_id, validate_image_id, ImageId};
pub use protocol::{Command, PixelValue, UpdateImageRequest};
pub use statistics::{SharedStatistics, Statistics, StatisticsAggregator};
