//! Image identifiers.
//!
//! IDs are short URL-safe strings. Generated IDs draw 22 characters from
//! the alphanumeric alphabet; caller-supplied IDs additionally allow `-`
//! and are capped at 30 characters.

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::{Error, Result};

/// An image identifier. Unique within a collection, immutable once created.
pub type ImageId = String;

/// Length of generated IDs.
pub const GENERATED_ID_LENGTH: usize = 22;

/// Maximum accepted length for caller-supplied IDs.
pub const MAX_ID_LENGTH: usize = 30;

/// Generate a fresh random image ID.
#[must_use]
pub fn generate_image_id() -> ImageId {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Validate a caller-supplied image ID.
///
/// Accepts 1..=30 characters from `[A-Za-z0-9-]`.
pub fn validate_image_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > MAX_ID_LENGTH {
        return Err(Error::InvalidImageId(id.to_string()));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(Error::InvalidImageId(id.to_string()));
    }
    Ok(())
}
