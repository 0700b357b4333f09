//! Top-view icons of furniture pieces.
//!
//! A piece with a flat plan icon gets that icon, recolored or textured to
//! match the piece. Any other piece is baked from its 3D model by an
//! [`IconRenderer`] on a [`TaskSpawner`]: the model is rendered twice, once
//! on white and once on black, and the two renders are merged into one image
//! whose background is transparent.
//!
//! Icons are cached per piece. A bake in progress reports
//! [`IconState::Pending`] and the host repaint callback fires once the
//! result lands in the cache.

use crate::imaging::ImageCache;
use crate::tasks::{no_repaint, RepaintRequest, TaskSpawner};
use floorkit_core::model::{Furniture, HomeTexture, ModelRef};
use floorkit_core::{Color, IconError, ItemId};
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default edge length of baked icons, in pixels.
pub const DEFAULT_ICON_SIZE: u32 = 128;

const BORDER: Rgba<u8> = Rgba([128, 128, 128, 255]);
const ERROR_MARK: Rgba<u8> = Rgba([200, 0, 0, 255]);
const WAIT_MARK: Rgba<u8> = Rgba([170, 170, 170, 255]);

/// What a renderer needs to bake the top view of one piece.
#[derive(Debug, Clone, PartialEq)]
pub struct FurnitureModelRef {
    pub model: ModelRef,
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub color: Option<Color>,
    pub texture: Option<HomeTexture>,
    pub mirrored: bool,
}

impl FurnitureModelRef {
    /// Bake input of `piece`, `None` when it has no 3D model.
    pub fn of(piece: &Furniture) -> Option<Self> {
        Some(Self {
            model: piece.model.clone()?,
            width: piece.width,
            depth: piece.depth,
            height: piece.height,
            color: piece.color,
            texture: piece.texture.clone(),
            mirrored: piece.model_mirrored,
        })
    }
}

/// Offscreen 3D renderer producing orthographic views from above.
pub trait IconRenderer: Send + Sync + fmt::Debug {
    /// Whether 3D rendering is possible at all on this host.
    fn is_available(&self) -> bool;

    /// Renders `model` from above into a `size` x `size` image cleared to
    /// `background`.
    fn render_top_view(
        &self,
        model: &FurnitureModelRef,
        size: u32,
        background: Rgba<u8>,
    ) -> Result<RgbaImage, IconError>;
}

/// Renderer of hosts without 3D support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRenderer;

impl IconRenderer for NoRenderer {
    fn is_available(&self) -> bool {
        false
    }

    fn render_top_view(
        &self,
        _model: &FurnitureModelRef,
        _size: u32,
        _background: Rgba<u8>,
    ) -> Result<RgbaImage, IconError> {
        Err(IconError::RendererUnavailable)
    }
}

#[derive(Debug, Clone)]
pub enum IconState {
    Ready(Arc<RgbaImage>),
    /// A bake is running; draw [`wait_icon`] meanwhile.
    Pending,
}

impl IconState {
    pub fn image(&self) -> Option<&Arc<RgbaImage>> {
        match self {
            IconState::Ready(image) => Some(image),
            IconState::Pending => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, IconState::Pending)
    }
}

/// Properties an icon depends on. A cached icon whose signature no longer
/// matches its piece is rebuilt.
#[derive(Debug, Clone, PartialEq)]
struct IconSignature {
    size: (f32, f32, f32),
    color: Option<Color>,
    texture: Option<String>,
    plan_icon: Option<String>,
    model: Option<String>,
    mirrored: bool,
}

impl IconSignature {
    fn of(piece: &Furniture) -> Self {
        Self {
            size: (piece.width, piece.depth, piece.height),
            color: piece.color,
            texture: piece.texture.as_ref().map(|t| t.image.key.clone()),
            plan_icon: piece.plan_icon.as_ref().map(|c| c.key.clone()),
            model: piece.model.as_ref().map(|m| m.content.key.clone()),
            mirrored: piece.model_mirrored,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    signature: IconSignature,
    state: IconState,
}

type IconMap = Arc<Mutex<HashMap<ItemId, CacheEntry>>>;

/// Supplies cached top-view icons of furniture pieces.
pub struct TopViewIconProvider {
    renderer: Arc<dyn IconRenderer>,
    spawner: Arc<dyn TaskSpawner>,
    images: Arc<ImageCache>,
    repaint: RepaintRequest,
    size: u32,
    icons: IconMap,
}

impl fmt::Debug for TopViewIconProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopViewIconProvider")
            .field("renderer", &self.renderer)
            .field("spawner", &self.spawner)
            .field("size", &self.size)
            .field("cached", &self.icons.lock().len())
            .finish()
    }
}

impl TopViewIconProvider {
    pub fn new(
        renderer: Arc<dyn IconRenderer>,
        spawner: Arc<dyn TaskSpawner>,
        images: Arc<ImageCache>,
        size: u32,
    ) -> Self {
        Self {
            renderer,
            spawner,
            images,
            repaint: no_repaint(),
            size: size.max(1),
            icons: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Callback invoked after a bake publishes its icon.
    pub fn with_repaint(mut self, repaint: RepaintRequest) -> Self {
        self.repaint = repaint;
        self
    }

    pub fn icon_size(&self) -> u32 {
        self.size
    }

    pub fn is_renderer_available(&self) -> bool {
        self.renderer.is_available()
    }

    /// Spawner used for bakes.
    pub fn spawner(&self) -> &Arc<dyn TaskSpawner> {
        &self.spawner
    }

    /// Top-view icon of `piece`, starting a bake when needed.
    pub fn icon_for(&self, piece: &Furniture) -> IconState {
        let signature = IconSignature::of(piece);
        if let Some(entry) = self.icons.lock().get(&piece.id) {
            if entry.signature == signature {
                return entry.state.clone();
            }
        }

        if let Some(plan_icon) = &piece.plan_icon {
            let icon = self.images.get(plan_icon);
            let icon = if let Some(color) = piece.color {
                Arc::new(recolor(&icon, color))
            } else if let Some(texture) = &piece.texture {
                Arc::new(texture_icon(&icon, &self.images.get(&texture.image)))
            } else {
                icon
            };
            return self.publish(piece.id, signature, icon);
        }

        let model = match FurnitureModelRef::of(piece) {
            Some(model) if self.renderer.is_available() => model,
            _ => return self.publish(piece.id, signature, Arc::new(blank_icon(self.size))),
        };

        self.icons.lock().insert(
            piece.id,
            CacheEntry {
                signature: signature.clone(),
                state: IconState::Pending,
            },
        );
        debug!("Baking top view of {} ({})", piece.name, piece.id);
        self.spawn_bake(piece.id, signature.clone(), model);

        // Inline spawners have already published the result
        match self.icons.lock().get(&piece.id) {
            Some(entry) if entry.signature == signature => entry.state.clone(),
            _ => IconState::Pending,
        }
    }

    fn publish(&self, id: ItemId, signature: IconSignature, icon: Arc<RgbaImage>) -> IconState {
        let state = IconState::Ready(icon);
        self.icons.lock().insert(
            id,
            CacheEntry {
                signature,
                state: state.clone(),
            },
        );
        state
    }

    fn spawn_bake(&self, id: ItemId, signature: IconSignature, model: FurnitureModelRef) {
        let renderer = self.renderer.clone();
        let icons = self.icons.clone();
        let repaint = self.repaint.clone();
        let size = self.size;
        self.spawner.spawn(Box::new(move || {
            let icon = match bake(renderer.as_ref(), &model, size) {
                Ok(icon) => icon,
                Err(e) => {
                    warn!("Top view of {} failed: {}", model.model.name, e);
                    error_icon(size)
                }
            };
            let mut icons = icons.lock();
            match icons.get_mut(&id) {
                // Invalidated or rebuilt while baking
                Some(entry) if entry.signature == signature && entry.state.is_pending() => {
                    entry.state = IconState::Ready(Arc::new(icon));
                }
                _ => return,
            }
            drop(icons);
            repaint();
        }));
    }

    /// Drops the cached icon of one piece.
    pub fn invalidate(&self, id: ItemId) {
        self.icons.lock().remove(&id);
    }

    /// Drops every cached icon.
    pub fn clear(&self) {
        let mut icons = self.icons.lock();
        if !icons.is_empty() {
            debug!("Clearing {} top view icons", icons.len());
        }
        icons.clear();
    }

    pub fn len(&self) -> usize {
        self.icons.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.lock().is_empty()
    }
}

/// Renders `model` on white and on black and merges both renders.
pub fn bake(
    renderer: &dyn IconRenderer,
    model: &FurnitureModelRef,
    size: u32,
) -> Result<RgbaImage, IconError> {
    let on_white = renderer.render_top_view(model, size, Rgba([255, 255, 255, 255]))?;
    let on_black = renderer.render_top_view(model, size, Rgba([0, 0, 0, 255]))?;
    extract_alpha(&on_white, &on_black)
}

/// Merges two renders of the same scene into one transparent image.
///
/// A pixel that is pure white on the white render and pure black on the black
/// one belongs to the background and becomes transparent. Every other pixel
/// keeps the white render's colour, opaque.
pub fn extract_alpha(on_white: &RgbaImage, on_black: &RgbaImage) -> Result<RgbaImage, IconError> {
    if on_white.dimensions() != on_black.dimensions() {
        return Err(IconError::BakeFailed {
            reason: format!(
                "renders differ in size: {:?} and {:?}",
                on_white.dimensions(),
                on_black.dimensions()
            ),
        });
    }
    let mut merged = RgbaImage::new(on_white.width(), on_white.height());
    for ((x, y, white), black) in on_white.enumerate_pixels().zip(on_black.pixels()) {
        let [r, g, b, _] = white.0;
        let background = (r, g, b) == (255, 255, 255) && black.0[..3] == [0, 0, 0];
        let pixel = if background {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([r, g, b, 255])
        };
        merged.put_pixel(x, y, pixel);
    }
    Ok(merged)
}

/// Gray level of a pixel, `(3R + 4G + B) / 8`.
pub fn brightness(pixel: &Rgba<u8>) -> u8 {
    let [r, g, b, _] = pixel.0;
    ((3 * r as u32 + 4 * g as u32 + b as u32) >> 3) as u8
}

/// Tints `icon` with `color`, keeping its shading and alpha.
pub fn recolor(icon: &RgbaImage, color: Color) -> RgbaImage {
    let mut out = icon.clone();
    for pixel in out.pixels_mut() {
        let level = brightness(pixel) as u32;
        let tint = |c: u8| (c as u32 * level / 255) as u8;
        *pixel = Rgba([tint(color.r), tint(color.g), tint(color.b), pixel.0[3]]);
    }
    out
}

/// Repeats `texture` across the opaque part of `icon`.
pub fn texture_icon(icon: &RgbaImage, texture: &RgbaImage) -> RgbaImage {
    let (tw, th) = texture.dimensions();
    let mut out = RgbaImage::new(icon.width(), icon.height());
    if tw == 0 || th == 0 {
        return out;
    }
    for (x, y, pixel) in icon.enumerate_pixels() {
        let t = texture.get_pixel(x % tw, y % th);
        let alpha = (t.0[3] as u32 * pixel.0[3] as u32 / 255) as u8;
        out.put_pixel(x, y, Rgba([t.0[0], t.0[1], t.0[2], alpha]));
    }
    out
}

/// White square with a gray border.
pub fn blank_icon(size: u32) -> RgbaImage {
    let size = size.max(2);
    let last = size - 1;
    RgbaImage::from_fn(size, size, |x, y| {
        if x == 0 || y == 0 || x == last || y == last {
            BORDER
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

/// Blank icon crossed in red.
pub fn error_icon(size: u32) -> RgbaImage {
    let mut icon = blank_icon(size);
    let size = icon.width();
    let inset = size / 4;
    for i in inset..size - inset {
        icon.put_pixel(i, i, ERROR_MARK);
        icon.put_pixel(size - 1 - i, i, ERROR_MARK);
    }
    icon
}

/// Blank icon with a gray centre square, shown while a bake runs.
pub fn wait_icon(size: u32) -> RgbaImage {
    let mut icon = blank_icon(size);
    let size = icon.width();
    let (from, to) = (size * 3 / 8, size - size * 3 / 8);
    for y in from..to {
        for x in from..to {
            icon.put_pixel(x, y, WAIT_MARK);
        }
    }
    icon
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::encode_png;
    use crate::tasks::InlineSpawner;
    use floorkit_core::model::ContentRef;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Renders a red square in the middle of the background.
    #[derive(Debug, Default)]
    struct SquareRenderer {
        calls: AtomicUsize,
        fail: bool,
    }

    impl IconRenderer for SquareRenderer {
        fn is_available(&self) -> bool {
            true
        }

        fn render_top_view(
            &self,
            _model: &FurnitureModelRef,
            size: u32,
            background: Rgba<u8>,
        ) -> Result<RgbaImage, IconError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(IconError::BakeFailed {
                    reason: "no GPU".into(),
                });
            }
            Ok(RgbaImage::from_fn(size, size, |x, y| {
                if (size / 4..size * 3 / 4).contains(&x) && (size / 4..size * 3 / 4).contains(&y) {
                    Rgba([255, 0, 0, 255])
                } else {
                    background
                }
            }))
        }
    }

    /// Spawner that keeps tasks until told to run them.
    #[derive(Default)]
    struct DeferredSpawner {
        tasks: Mutex<Vec<Box<dyn FnOnce() + Send + 'static>>>,
    }

    impl fmt::Debug for DeferredSpawner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "DeferredSpawner({} tasks)", self.tasks.lock().len())
        }
    }

    impl DeferredSpawner {
        fn run_all(&self) {
            let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
            for task in tasks {
                task();
            }
        }
    }

    impl TaskSpawner for DeferredSpawner {
        fn spawn(&self, task: Box<dyn FnOnce() + Send + 'static>) {
            self.tasks.lock().push(task);
        }
    }

    fn modelled_piece() -> Furniture {
        let mut piece = Furniture::new("Chair", 50.0, 50.0, 40.0, 40.0, 90.0);
        piece.model = Some(ModelRef {
            name: "chair.obj".into(),
            content: ContentRef::new("chair.obj", vec![0; 8]),
        });
        piece
    }

    fn provider(renderer: Arc<dyn IconRenderer>, spawner: Arc<dyn TaskSpawner>) -> TopViewIconProvider {
        TopViewIconProvider::new(renderer, spawner, Arc::new(ImageCache::new()), 16)
    }

    #[test]
    fn test_recolor_uses_weighted_brightness() {
        let icon = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 40, 77]));
        // (600 + 400 + 40) >> 3 = 130
        assert_eq!(brightness(icon.get_pixel(0, 0)), 130);
        let tinted = recolor(&icon, Color::rgb(255, 100, 0));
        assert_eq!(tinted.get_pixel(0, 0), &Rgba([130, 50, 0, 77]));
    }

    #[test]
    fn test_extract_alpha_clears_background() {
        let renderer = SquareRenderer::default();
        let model = FurnitureModelRef::of(&modelled_piece()).unwrap();
        let icon = bake(&renderer, &model, 8).unwrap();
        assert_eq!(icon.get_pixel(0, 0).0[3], 0);
        assert_eq!(icon.get_pixel(4, 4), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_extract_alpha_keeps_white_content() {
        // White on both renders is part of the model
        let white = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        let merged = extract_alpha(&white, &white).unwrap();
        assert_eq!(merged.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert!(extract_alpha(&white, &RgbaImage::new(2, 2)).is_err());
    }

    #[test]
    fn test_texture_icon_masks_through_alpha() {
        let mut icon = RgbaImage::new(4, 1);
        icon.put_pixel(1, 0, Rgba([0, 0, 0, 255]));
        icon.put_pixel(3, 0, Rgba([0, 0, 0, 128]));
        let texture = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([10, 10, 10, 255])
            } else {
                Rgba([90, 90, 90, 255])
            }
        });
        let out = texture_icon(&icon, &texture);
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
        assert_eq!(out.get_pixel(1, 0), &Rgba([90, 90, 90, 255]));
        assert_eq!(out.get_pixel(3, 0), &Rgba([90, 90, 90, 128]));
    }

    #[test]
    fn test_unavailable_renderer_gives_blank_icon() {
        let provider = provider(Arc::new(NoRenderer), Arc::new(InlineSpawner));
        let state = provider.icon_for(&modelled_piece());
        let icon = state.image().unwrap();
        assert_eq!(**icon, blank_icon(16));
        assert_eq!(icon.get_pixel(0, 0), &BORDER);
        assert_eq!(icon.get_pixel(8, 8), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_failed_bake_gives_error_icon() {
        let renderer = Arc::new(SquareRenderer {
            fail: true,
            ..Default::default()
        });
        let provider = provider(renderer.clone(), Arc::new(InlineSpawner));
        let piece = modelled_piece();
        assert_eq!(**provider.icon_for(&piece).image().unwrap(), error_icon(16));
        // Cached, not retried
        provider.icon_for(&piece);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pending_until_bake_completes() {
        let spawner = Arc::new(DeferredSpawner::default());
        let repaints = Arc::new(AtomicUsize::new(0));
        let counter = repaints.clone();
        let provider = provider(Arc::new(SquareRenderer::default()), spawner.clone())
            .with_repaint(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        let piece = modelled_piece();

        assert!(provider.icon_for(&piece).is_pending());
        assert!(provider.icon_for(&piece).is_pending());
        spawner.run_all();
        assert_eq!(repaints.load(Ordering::SeqCst), 1);
        assert!(provider.icon_for(&piece).image().is_some());
    }

    #[test]
    fn test_stale_bake_is_discarded() {
        let spawner = Arc::new(DeferredSpawner::default());
        let provider = provider(Arc::new(SquareRenderer::default()), spawner.clone());
        let piece = modelled_piece();
        provider.icon_for(&piece);
        provider.invalidate(piece.id);
        spawner.run_all();
        assert!(provider.is_empty());
    }

    #[test]
    fn test_resize_rebuilds_icon() {
        let renderer = Arc::new(SquareRenderer::default());
        let provider = provider(renderer.clone(), Arc::new(InlineSpawner));
        let mut piece = modelled_piece();
        provider.icon_for(&piece);
        piece.width = 80.0;
        provider.icon_for(&piece);
        // Two renders per bake
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 4);
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn test_plan_icon_is_recolored() {
        let provider = provider(Arc::new(NoRenderer), Arc::new(InlineSpawner));
        let mut piece = Furniture::new("Table", 0.0, 0.0, 80.0, 80.0, 70.0);
        let icon = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        piece.plan_icon = Some(ContentRef::new("table.png", encode_png(&icon)));
        piece.color = Some(Color::rgb(0, 200, 0));
        let state = provider.icon_for(&piece);
        assert_eq!(state.image().unwrap().get_pixel(1, 1), &Rgba([0, 200, 0, 255]));
    }

    #[test]
    fn test_clear() {
        let provider = provider(Arc::new(NoRenderer), Arc::new(InlineSpawner));
        provider.icon_for(&modelled_piece());
        assert_eq!(provider.len(), 1);
        provider.clear();
        assert!(provider.is_empty());
    }

    #[test]
    fn test_marker_icons() {
        let wait = wait_icon(16);
        assert_eq!(wait.get_pixel(8, 8), &WAIT_MARK);
        let error = error_icon(16);
        assert_eq!(error.get_pixel(4, 4), &ERROR_MARK);
        assert_eq!(error.get_pixel(11, 4), &ERROR_MARK);
    }
}
