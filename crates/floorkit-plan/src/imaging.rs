//! Decoded image content shared by the painter and the icon provider.

use floorkit_core::model::ContentRef;
use image::RgbaImage;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Decodes encoded image bytes.
pub fn decode(content: &ContentRef) -> Result<RgbaImage, image::ImageError> {
    Ok(image::load_from_memory(&content.data)?.to_rgba8())
}

/// Transparent 1x1 image standing in for undecodable content.
pub fn placeholder() -> RgbaImage {
    RgbaImage::new(1, 1)
}

/// Decodes `content`, falling back to [`placeholder`] on failure.
pub fn decode_or_placeholder(content: &ContentRef) -> RgbaImage {
    decode(content).unwrap_or_else(|e| {
        tracing::warn!("Failed to decode image {}: {}", content.key, e);
        placeholder()
    })
}

/// Images decoded once per content key.
#[derive(Debug, Default)]
pub struct ImageCache {
    images: Mutex<HashMap<String, Arc<RgbaImage>>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded image of `content`, decoding it on first use.
    pub fn get(&self, content: &ContentRef) -> Arc<RgbaImage> {
        if let Some(image) = self.images.lock().get(&content.key) {
            return image.clone();
        }
        let image = Arc::new(decode_or_placeholder(content));
        self.images
            .lock()
            .insert(content.key.clone(), image.clone());
        image
    }

    pub fn clear(&self) {
        self.images.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.images.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.lock().is_empty()
    }
}

#[cfg(test)]
pub(crate) fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
