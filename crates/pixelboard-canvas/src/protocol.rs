//! Wire protocol for canvas mutations.
//!
//! Inbound wire shape, shared by `PUT /images/{id}` and the WebSocket:
//!
//! ```json
//! {"command": {"command_type": "draw", "values": [[3, 4, 255, 0, 0]]}}
//! {"command": {"command_type": "clear_canvas"}}
//! ```
//!
//! Unknown `command_type` tags fail deserialization and are treated as
//! malformed input by the transports, never silently accepted.

use serde::{Deserialize, Serialize};

/// One pixel write: `(x, y, r, g, b)`. Serialized as a 5-element array.
pub type PixelValue = (u16, u16, u8, u8, u8);

/// A mutation applied to exactly one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command_type", rename_all = "snake_case")]
pub enum Command {
    /// Write individual pixels. Out-of-bounds coordinates are skipped.
    Draw {
        /// Pixel writes, applied in order.
        values: Vec<PixelValue>,
    },
    /// Reset every pixel to the background color.
    ClearCanvas,
}

impl Command {
    /// Get the wire tag.
    #[must_use]
    pub fn command_type(&self) -> &'static str {
        match self {
            Self::Draw { .. } => "draw",
            Self::ClearCanvas => "clear_canvas",
        }
    }
}

/// The inbound envelope carrying a [`Command`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateImageRequest {
    /// The command to apply.
    pub command: Command,
}
