//! Asynchronous decoding of background images.

use crate::imaging;
use crate::tasks::{no_repaint, RepaintRequest, TaskSpawner};
use floorkit_core::model::BackgroundImage;
use floorkit_core::{PlanModel, Rect};
use image::RgbaImage;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Slot {
    Loading,
    Ready(Arc<RgbaImage>),
}

/// Decodes background images off the render thread.
///
/// [`BackgroundLoader::image`] returns `None` until the decode finished.
/// Undecodable images become a 1x1 placeholder.
pub struct BackgroundLoader {
    spawner: Arc<dyn TaskSpawner>,
    repaint: RepaintRequest,
    images: Arc<Mutex<HashMap<String, Slot>>>,
}

impl fmt::Debug for BackgroundLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundLoader")
            .field("spawner", &self.spawner)
            .field("images", &self.images.lock().len())
            .finish()
    }
}

impl BackgroundLoader {
    pub fn new(spawner: Arc<dyn TaskSpawner>) -> Self {
        Self {
            spawner,
            repaint: no_repaint(),
            images: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_repaint(mut self, repaint: RepaintRequest) -> Self {
        self.repaint = repaint;
        self
    }

    /// Decoded image of `background`, starting its decode on first request.
    pub fn image(&self, background: &BackgroundImage) -> Option<Arc<RgbaImage>> {
        let key = &background.image.key;
        {
            let mut images = self.images.lock();
            match images.get(key) {
                Some(Slot::Ready(image)) => return Some(image.clone()),
                Some(Slot::Loading) => return None,
                None => {
                    images.insert(key.clone(), Slot::Loading);
                }
            }
        }

        tracing::debug!("Decoding background image {}", key);
        let content = background.image.clone();
        let images = self.images.clone();
        let repaint = self.repaint.clone();
        self.spawner.spawn(Box::new(move || {
            let image = Arc::new(imaging::decode_or_placeholder(&content));
            images.lock().insert(content.key, Slot::Ready(image));
            repaint();
        }));

        match self.images.lock().get(key) {
            Some(Slot::Ready(image)) => Some(image.clone()),
            _ => None,
        }
    }

    /// Decoded image if available, without starting a decode.
    pub fn loaded(&self, background: &BackgroundImage) -> Option<Arc<RgbaImage>> {
        match self.images.lock().get(&background.image.key) {
            Some(Slot::Ready(image)) => Some(image.clone()),
            _ => None,
        }
    }

    /// Model bounds of every decoded background image of `model`.
    pub fn loaded_bounds(&self, model: &PlanModel) -> Vec<Rect> {
        background_images(model)
            .into_iter()
            .filter_map(|bg| {
                self.loaded(bg)
                    .map(|image| bg.bounds(image.width(), image.height()))
            })
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.images
            .lock()
            .values()
            .any(|slot| matches!(slot, Slot::Loading))
    }

    pub fn clear(&self) {
        self.images.lock().clear();
    }
}

/// Visible background images of the home and of its levels.
pub fn background_images(model: &PlanModel) -> Vec<&BackgroundImage> {
    model
        .background_image
        .iter()
        .chain(model.levels.iter().filter_map(|l| l.background_image.as_ref()))
        .filter(|bg| bg.visible)
        .collect()
}
