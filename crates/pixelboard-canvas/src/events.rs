//! Event types broadcast through the broker.
//!
//! Image-scoped events (`image_updated`) travel on the image's own topic;
//! collection-wide and presence events travel on the announcer. Everything
//! leaves the process wrapped in an [`EventMessage`] envelope:
//!
//! ```json
//! {"event": {"event_type": "image_updated", "image_id": "img1", "command": {...}}}
//! ```

use serde::{Deserialize, Serialize};

use crate::image_id::ImageId;
use crate::protocol::Command;

/// Something that happened to the collection or one of its images.
///
/// Immutable value objects; consumers match exhaustively and never mutate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum Event {
    /// A new image entered the collection.
    ImageCreated {
        /// The new image's ID.
        image_id: ImageId,
    },
    /// An image was mutated by a command.
    ImageUpdated {
        /// The mutated image's ID.
        image_id: ImageId,
        /// The command that produced the new canvas state.
        command: Command,
    },
    /// An image was removed from the collection.
    ImageDeleted {
        /// The removed image's ID.
        image_id: ImageId,
    },
    /// A live connection was opened.
    UserConnected,
    /// A live connection was closed.
    UserDisconnected,
    /// The live user count changed.
    UserCountUpdated {
        /// The new user count.
        count: i64,
    },
}

impl Event {
    /// Get the wire tag, also used as the SSE `event:` field.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ImageCreated { .. } => "image_created",
            Self::ImageUpdated { .. } => "image_updated",
            Self::ImageDeleted { .. } => "image_deleted",
            Self::UserConnected => "user_connected",
            Self::UserDisconnected => "user_disconnected",
            Self::UserCountUpdated { .. } => "user_count_updated",
        }
    }

    /// The originating image ID, for image-scoped events.
    #[must_use]
    pub fn image_id(&self) -> Option<&str> {
        match self {
            Self::ImageCreated { image_id }
            | Self::ImageUpdated { image_id, .. }
            | Self::ImageDeleted { image_id } => Some(image_id),
            Self::UserConnected | Self::UserDisconnected | Self::UserCountUpdated { .. } => None,
        }
    }
}

/// The outbound envelope carrying an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMessage {
    /// The event being announced.
    pub event: Event,
}

impl EventMessage {
    /// An `image_created` message.
    #[must_use]
    pub fn image_created(image_id: impl Into<ImageId>) -> Self {
        Self {
            event: Event::ImageCreated {
                image_id: image_id.into(),
            },
        }
    }

    /// An `image_updated` message.
    #[must_use]
    pub fn image_updated(image_id: impl Into<ImageId>, command: Command) -> Self {
        Self {
            event: Event::ImageUpdated {
                image_id: image_id.into(),
                command,
            },
        }
    }

    /// An `image_deleted` message.
    #[must_use]
    pub fn image_deleted(image_id: impl Into<ImageId>) -> Self {
        Self {
            event: Event::ImageDeleted {
                image_id: image_id.into(),
            },
        }
    }

    /// A `user_connected` message.
    #[must_use]
    pub fn user_connected() -> Self {
        Self {
            event: Event::UserConnected,
        }
    }

    /// A `user_disconnected` message.
    #[must_use]
    pub fn user_disconnected() -> Self {
        Self {
            event: Event::UserDisconnected,
        }
    }

    /// A `user_count_updated` message.
    #[must_use]
    pub fn user_count_updated(count: i64) -> Self {
        Self {
            event: Event::UserCountUpdated { count },
        }
    }
}
