//! Canvas image type.
//!
//! A fixed 64×64 RGB grid with an identity. Mutation is pure: applying a
//! command changes pixels and nothing else — broadcasting the resulting
//! event is the caller's job, which keeps this type decoupled from the
//! broker.

use std::io::Cursor;

use chrono::{DateTime, Utc};
use image::{ImageFormat, Rgb, RgbImage};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::image_id::{generate_image_id, ImageId};
use crate::protocol::{Command, PixelValue};

/// Canvas width in pixels.
pub const IMAGE_WIDTH: u32 = 64;

/// Canvas height in pixels.
pub const IMAGE_HEIGHT: u32 = 64;

/// Background color: white.
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// A fixed-size canvas image.
///
/// The serialized form is the summary (`image_id` only); pixel data is
/// served through the dedicated PNG and raw-data endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct Image {
    /// Unique identifier, immutable after creation.
    pub image_id: ImageId,

    #[serde(skip)]
    data: RgbImage,

    /// When the image was created. Drives the collection's display order.
    #[serde(skip)]
    created_at: DateTime<Utc>,
}

impl Image {
    /// Create a blank (all-background) image with the given ID.
    #[must_use]
    pub fn new(image_id: impl Into<ImageId>) -> Self {
        Self {
            image_id: image_id.into(),
            data: RgbImage::from_pixel(IMAGE_WIDTH, IMAGE_HEIGHT, BACKGROUND),
            created_at: Utc::now(),
        }
    }

    /// Create a blank image with a generated ID.
    #[must_use]
    pub fn with_generated_id() -> Self {
        Self::new(generate_image_id())
    }

    /// When the image was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Apply a command to the grid.
    pub fn update(&mut self, command: &Command) {
        match command {
            Command::Draw { values } => self.draw_values(values),
            Command::ClearCanvas => self.clear(),
        }
    }

    /// Write individual pixels, skipping out-of-bounds coordinates.
    pub fn draw_values(&mut self, values: &[PixelValue]) {
        for &(x, y, r, g, b) in values {
            let (x, y) = (u32::from(x), u32::from(y));
            if x < IMAGE_WIDTH && y < IMAGE_HEIGHT {
                self.data.put_pixel(x, y, Rgb([r, g, b]));
            }
        }
    }

    /// Reset every pixel to the background color.
    pub fn clear(&mut self) {
        for pixel in self.data.pixels_mut() {
            *pixel = BACKGROUND;
        }
    }

    /// Read one pixel as `[r, g, b]`. `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x < IMAGE_WIDTH && y < IMAGE_HEIGHT {
            Some(self.data.get_pixel(x, y).0)
        } else {
            None
        }
    }

    /// Encode the grid as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.data
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| Error::Encoding(e.to_string()))?;
        Ok(buffer.into_inner())
    }

    /// The raw grid as `height × width` rows of `[r, g, b]` triplets.
    #[must_use]
    pub fn data_rows(&self) -> Vec<Vec<[u8; 3]>> {
        (0..IMAGE_HEIGHT)
            .map(|y| (0..IMAGE_WIDTH).map(|x| self.data.get_pixel(x, y).0).collect())
            .collect()
    }
}
