//! Error types for the canvas domain.

use thiserror::Error;

/// Canvas error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No image is registered under this ID.
    #[error("image not found: {0}")]
    ImageNotFound(String),

    /// An explicit create collided with an existing ID.
    #[error("image ID already exists: {0}")]
    ImageIdAlreadyExists(String),

    /// A caller-supplied ID failed validation.
    #[error("invalid image ID: {0}")]
    InvalidImageId(String),

    /// The bounded ID-generation retry loop ran out of attempts.
    #[error("image ID generation exhausted after {attempts} attempts")]
    IdGenerationExhausted {
        /// How many generation attempts were made.
        attempts: u32,
    },

    /// Raster encoding failed.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl Error {
    /// Get a stable error code for wire responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ImageNotFound(_) => "image_not_found",
            Self::ImageIdAlreadyExists(_) => "image_id_already_exists",
            Self::InvalidImageId(_) => "invalid_image_id",
            Self::IdGenerationExhausted { .. } => "id_generation_exhausted",
            Self::Encoding(_) => "encoding_error",
        }
    }
}

/// Result type alias for canvas operations.
pub type Result<T> = std::result::Result<T, Error>;
