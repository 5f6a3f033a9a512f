//! Identity-keyed image store.
//!
//! The collection owns creation (validation, generation with bounded
//! retries) and deletion, and announces both on the injected announcer so
//! every connected listener sees collection-wide lifecycle changes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::events::EventMessage;
use crate::image::Image;
use crate::image_id::{generate_image_id, validate_image_id, ImageId};
use crate::protocol::Command;
use pixelboard_core::Announcer;

/// Default bound for the ID-generation retry loop.
pub const DEFAULT_ID_GENERATION_ATTEMPTS: u32 = 10;

/// Identity-keyed store of [`Image`]s.
///
/// The lock is synchronous and never held across an await point; handlers
/// running on the multi-threaded runtime may hit it concurrently.
pub struct ImageCollection {
    images: RwLock<HashMap<ImageId, Image>>,
    announcer: Arc<Announcer<EventMessage>>,
    id_generation_attempts: u32,
}

impl ImageCollection {
    /// Create an empty collection announcing on `announcer`.
    #[must_use]
    pub fn new(announcer: Arc<Announcer<EventMessage>>) -> Self {
        Self {
            images: RwLock::new(HashMap::new()),
            announcer,
            id_generation_attempts: DEFAULT_ID_GENERATION_ATTEMPTS,
        }
    }

    /// Configure the ID-generation retry bound.
    #[must_use]
    pub fn with_id_generation_attempts(mut self, attempts: u32) -> Self {
        self.id_generation_attempts = attempts.max(1);
        self
    }

    /// Create an image.
    ///
    /// With an explicit ID the call validates it and fails on collision
    /// without touching the store. Without one, a random ID is generated,
    /// retrying on collision up to the configured bound.
    ///
    /// On success the image is inserted, `image_created` is announced, and
    /// a snapshot of the new image is returned.
    pub fn create(&self, image_id: Option<&str>) -> Result<Image> {
        let image = {
            let mut images = self.images.write();
            let id = match image_id {
                Some(id) => {
                    validate_image_id(id)?;
                    if images.contains_key(id) {
                        return Err(Error::ImageIdAlreadyExists(id.to_string()));
                    }
                    id.to_string()
                }
                None => self.generate_free_id(&images)?,
            };
            let image = Image::new(id);
            images.insert(image.image_id.clone(), image.clone());
            image
        };

        info!(image_id = %image.image_id, "image created");
        self.announcer
            .broadcast(EventMessage::image_created(image.image_id.clone()));
        Ok(image)
    }

    /// Generate an ID not present in `images`, within the retry bound.
    fn generate_free_id(&self, images: &HashMap<ImageId, Image>) -> Result<ImageId> {
        for _ in 0..self.id_generation_attempts {
            let id = generate_image_id();
            if !images.contains_key(&id) {
                return Ok(id);
            }
        }
        Err(Error::IdGenerationExhausted {
            attempts: self.id_generation_attempts,
        })
    }

    /// Get a snapshot of an image.
    pub fn get(&self, image_id: &str) -> Result<Image> {
        self.images
            .read()
            .get(image_id)
            .cloned()
            .ok_or_else(|| Error::ImageNotFound(image_id.to_string()))
    }

    /// Apply a command to an image in place.
    ///
    /// Mutation only — the caller broadcasts the resulting `image_updated`
    /// event on the image's topic.
    pub fn update(&self, image_id: &str, command: &Command) -> Result<()> {
        let mut images = self.images.write();
        let image = images
            .get_mut(image_id)
            .ok_or_else(|| Error::ImageNotFound(image_id.to_string()))?;
        image.update(command);
        Ok(())
    }

    /// Delete an image.
    ///
    /// `image_deleted` is announced before the entry is removed, so a
    /// consumer reacting to the event can still look the image up.
    pub fn delete(&self, image_id: &str) -> Result<()> {
        let mut images = self.images.write();
        if !images.contains_key(image_id) {
            return Err(Error::ImageNotFound(image_id.to_string()));
        }
        self.announcer
            .broadcast(EventMessage::image_deleted(image_id.to_string()));
        images.remove(image_id);
        debug!(image_id, "image deleted");
        Ok(())
    }

    /// Whether an image exists.
    #[must_use]
    pub fn contains(&self, image_id: &str) -> bool {
        self.images.read().contains_key(image_id)
    }

    /// Snapshot of all images, in creation order.
    ///
    /// The ordering is stable for display; callers must not build
    /// correctness on it.
    #[must_use]
    pub fn list(&self) -> Vec<Image> {
        let mut images: Vec<Image> = self.images.read().values().cloned().collect();
        images.sort_by_key(Image::created_at);
        images
    }

    /// Number of images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.read().len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.read().is_empty()
    }
}
