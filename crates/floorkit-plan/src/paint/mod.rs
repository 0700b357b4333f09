//! Paint pipeline
//!
//! [`paint_plan`] draws one frame of the plan onto a [`PlanSurface`], layer
//! by layer, in the order of [`Layer`]:
//!
//! - background fill and background image
//! - the level below the selected one, faded
//! - grid
//! - rooms, walls, furniture and dimension lines
//! - room texts, furniture names and labels
//! - compass and observer camera
//! - selection outlines and indicators, dragged items and feedback
//!
//! What gets drawn depends on the [`PaintMode`]. Export mode polls a
//! [`CancellationToken`] before each phase and stops with
//! [`ExportError::Interrupted`].

mod items;
mod overlays;

pub use items::{
    paint_camera, paint_compass, paint_dimension_line, paint_piece, paint_room, paint_wall_area,
    DimensionLineStyle,
};
pub use overlays::{indicator_anchors, paint_grid};

use crate::background::BackgroundLoader;
use crate::cache::{CacheInputs, GeometryCache};
use crate::icons::TopViewIconProvider;
use crate::imaging::ImageCache;
use crate::snapping::FeedbackState;
use crate::surface::{Layer, PlanSurface};
use crate::tasks::CancellationToken;
use crate::text::TextMetrics;
use floorkit_core::{Color, ExportError, ItemId, PlanModel, Rect};
use floorkit_settings::PlanPreferences;

/// Width of wall and room outlines, in pixels.
pub const WALL_STROKE_WIDTH: f32 = 1.5;
/// Width of furniture and marker outlines, in pixels.
pub const BORDER_STROKE_WIDTH: f32 = 1.0;
/// Wall pattern repeat, in pixels.
pub const WALL_PATTERN_PIXELS: f32 = 10.0;

const PRINT_PATTERN_RESOLUTION: f32 = 150.0 / 72.0;

/// Where a frame is going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaintMode {
    /// On screen, with grid, selection and feedback.
    Interactive,
    Print,
    /// Selected items only, on white.
    Clipboard,
    /// Vector output; cancellable.
    Export,
}

impl PaintMode {
    pub fn is_interactive(self) -> bool {
        self == PaintMode::Interactive
    }

    /// Whether the frame only holds the selected items.
    pub fn is_selection_only(self) -> bool {
        self == PaintMode::Clipboard
    }

    /// Whether the observer camera shows in the frame.
    pub fn paints_camera(self) -> bool {
        matches!(self, PaintMode::Interactive | PaintMode::Print)
    }
}

/// Colours a frame is painted with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintColors {
    pub background: Color,
    pub foreground: Color,
    pub selection: Color,
    /// Default fill of rooms without floor colour.
    pub room: Color,
}

impl PaintColors {
    /// Preference colours on screen, black on white elsewhere.
    pub fn for_mode(mode: PaintMode, preferences: &PlanPreferences) -> Self {
        let colors = &preferences.colors;
        match mode {
            PaintMode::Interactive => Self {
                background: colors.background,
                foreground: colors.foreground,
                selection: colors.selection,
                room: Color::GRAY,
            },
            PaintMode::Print => Self {
                background: Color::WHITE,
                foreground: Color::BLACK,
                selection: colors.selection,
                room: Color::WHITE,
            },
            PaintMode::Clipboard | PaintMode::Export => Self {
                background: Color::WHITE,
                foreground: Color::BLACK,
                selection: colors.selection,
                room: Color::GRAY,
            },
        }
    }
}

/// Everything one frame reads. Built by the view for each frame.
pub struct PaintContext<'a> {
    pub model: &'a PlanModel,
    pub cache: &'a GeometryCache,
    pub preferences: &'a PlanPreferences,
    pub text: &'a TextMetrics,
    pub images: &'a ImageCache,
    pub icons: Option<&'a TopViewIconProvider>,
    pub backgrounds: Option<&'a BackgroundLoader>,
    pub feedback: Option<&'a FeedbackState>,
    /// Items following the pointer during a drag and drop.
    pub dragged: Option<&'a PlanModel>,
    pub mode: PaintMode,
    /// Only selected items are painted.
    pub selection_only: bool,
    /// Output units per model unit.
    pub scale: f32,
    /// Model area covered by the output.
    pub area: Rect,
    /// Minimum minor and major grid spacing, in pixels.
    pub grid_minimums: (f32, f32),
    pub resize_indicator_visible: bool,
    pub colors: PaintColors,
}

impl<'a> PaintContext<'a> {
    pub fn new(
        model: &'a PlanModel,
        cache: &'a GeometryCache,
        preferences: &'a PlanPreferences,
        text: &'a TextMetrics,
        images: &'a ImageCache,
        mode: PaintMode,
        scale: f32,
    ) -> Self {
        Self {
            model,
            cache,
            preferences,
            text,
            images,
            icons: None,
            backgrounds: None,
            feedback: None,
            dragged: None,
            mode,
            selection_only: mode.is_selection_only(),
            scale,
            area: cache.plan_bounds(),
            grid_minimums: (10.0, 50.0),
            resize_indicator_visible: true,
            colors: PaintColors::for_mode(mode, preferences),
        }
    }

    pub fn with_icons(mut self, icons: &'a TopViewIconProvider) -> Self {
        self.icons = Some(icons);
        self
    }

    pub fn with_backgrounds(mut self, backgrounds: &'a BackgroundLoader) -> Self {
        self.backgrounds = Some(backgrounds);
        self
    }

    pub fn with_feedback(mut self, feedback: &'a FeedbackState) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn with_dragged(mut self, dragged: Option<&'a PlanModel>) -> Self {
        self.dragged = dragged;
        self
    }

    pub fn with_area(mut self, area: Rect) -> Self {
        self.area = area;
        self
    }

    pub fn with_grid_minimums(mut self, minor: f32, major: f32) -> Self {
        self.grid_minimums = (minor, major);
        self
    }

    pub fn with_selection_only(mut self, selection_only: bool) -> Self {
        self.selection_only = selection_only;
        self
    }

    pub fn with_resize_indicator(mut self, visible: bool) -> Self {
        self.resize_indicator_visible = visible;
        self
    }

    /// Model length of `pixels` output units.
    pub fn pixels(&self, pixels: f32) -> f32 {
        pixels / self.scale
    }

    /// Model width of one wall pattern repeat.
    pub fn pattern_tile(&self) -> f32 {
        match self.mode {
            PaintMode::Print => self.pixels(WALL_PATTERN_PIXELS) * PRINT_PATTERN_RESOLUTION,
            _ => self.pixels(WALL_PATTERN_PIXELS),
        }
    }

    /// Whether the item `id` belongs in this frame.
    pub fn includes(&self, id: ItemId) -> bool {
        !self.selection_only || self.model.is_selected(id)
    }

    pub fn cache_inputs(&self) -> CacheInputs<'_> {
        CacheInputs {
            wall_pattern: self.preferences.wall_pattern,
            unit: self.preferences.unit,
            text_styles: &self.preferences.text_styles,
            text: self.text,
            background_bounds: &[],
        }
    }
}

fn checkpoint(cancel: Option<&CancellationToken>) -> Result<(), ExportError> {
    cancel.map_or(Ok(()), CancellationToken::check)
}

/// Paints one frame of the plan.
///
/// Interrupted exports leave the surface partially drawn; callers discard it.
pub fn paint_plan(
    surface: &mut dyn PlanSurface,
    ctx: &PaintContext<'_>,
    cancel: Option<&CancellationToken>,
) -> Result<(), ExportError> {
    let interactive = ctx.mode.is_interactive();

    checkpoint(cancel)?;
    surface.begin_layer(Layer::Background);
    overlays::paint_background(surface, ctx);
    if matches!(ctx.mode, PaintMode::Interactive | PaintMode::Print) {
        surface.begin_layer(Layer::BackgroundImage);
        overlays::paint_background_image(surface, ctx);
        surface.begin_layer(Layer::OtherLevel);
        overlays::paint_other_level(surface, ctx);
    }
    if interactive && ctx.preferences.grid_visible {
        surface.begin_layer(Layer::Grid);
        paint_grid(surface, ctx);
    }

    checkpoint(cancel)?;
    surface.begin_layer(Layer::Rooms);
    items::paint_rooms(surface, ctx);

    checkpoint(cancel)?;
    surface.begin_layer(Layer::Walls);
    items::paint_walls(surface, ctx);

    checkpoint(cancel)?;
    surface.begin_layer(Layer::Furniture);
    items::paint_furniture(surface, ctx);

    checkpoint(cancel)?;
    surface.begin_layer(Layer::DimensionLines);
    items::paint_dimension_lines(surface, ctx);

    checkpoint(cancel)?;
    surface.begin_layer(Layer::RoomTexts);
    items::paint_room_texts(surface, ctx);
    surface.begin_layer(Layer::FurnitureNames);
    items::paint_furniture_names(surface, ctx);
    surface.begin_layer(Layer::Labels);
    items::paint_labels(surface, ctx);

    checkpoint(cancel)?;
    surface.begin_layer(Layer::Compass);
    if let Some(compass) = ctx.model.compass.as_ref() {
        if compass.visible && ctx.includes(compass.id) {
            paint_compass(surface, ctx, compass);
        }
    }
    if ctx.mode.paints_camera() {
        if let Some(camera) = ctx.model.observer_camera.as_ref().filter(|c| ctx.includes(c.id)) {
            surface.begin_layer(Layer::Camera);
            paint_camera(surface, ctx, camera);
        }
    }

    if interactive {
        surface.begin_layer(Layer::Selection);
        overlays::paint_selection(surface, ctx);
        if let Some(dragged) = ctx.dragged {
            surface.begin_layer(Layer::DraggedItems);
            overlays::paint_dragged(surface, ctx, dragged);
        }
        if let Some(feedback) = ctx.feedback.filter(|f| !f.is_empty()) {
            surface.begin_layer(Layer::Feedback);
            overlays::paint_feedback(surface, ctx, feedback);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn test_print_paints_black_on_white() {
        let mut preferences = PlanPreferences::default();
        preferences.colors.background = Color::rgb(30, 30, 30);
        let colors = PaintColors::for_mode(PaintMode::Print, &preferences);
        assert_eq!(colors.background, Color::WHITE);
        assert_eq!(colors.foreground, Color::BLACK);
        assert_eq!(colors.room, Color::WHITE);
        let colors = PaintColors::for_mode(PaintMode::Interactive, &preferences);
        assert_eq!(colors.background, Color::rgb(30, 30, 30));
        assert_eq!(colors.room, Color::GRAY);
    }

    #[test]
    fn test_pattern_tile_follows_scale() {
        let model = PlanModel::new();
        let cache = GeometryCache::new();
        let preferences = PlanPreferences::default();
        let text = TextMetrics::approximate();
        let images = ImageCache::new();
        let ctx = PaintContext::new(
            &model,
            &cache,
            &preferences,
            &text,
            &images,
            PaintMode::Interactive,
            0.5,
        );
        assert_eq!(ctx.pattern_tile(), 20.0);
        assert_eq!(ctx.pixels(WALL_STROKE_WIDTH), 3.0);
    }

    #[test]
    fn test_cancelled_export_draws_nothing() {
        let model = PlanModel::new();
        let cache = GeometryCache::new();
        let preferences = PlanPreferences::default();
        let text = TextMetrics::approximate();
        let images = ImageCache::new();
        let ctx = PaintContext::new(
            &model,
            &cache,
            &preferences,
            &text,
            &images,
            PaintMode::Export,
            1.0,
        );
        let token = CancellationToken::new();
        token.cancel();
        let mut surface = RecordingSurface::new();
        let result = paint_plan(&mut surface, &ctx, Some(&token));
        assert!(matches!(result, Err(ExportError::Interrupted)));
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_selection_only_follows_context() {
        let mut model = PlanModel::new();
        let selected = ItemId::new();
        model.selection.insert(selected);
        let cache = GeometryCache::new();
        let preferences = PlanPreferences::default();
        let text = TextMetrics::approximate();
        let images = ImageCache::new();
        let context = |mode| PaintContext::new(&model, &cache, &preferences, &text, &images, mode, 1.0);

        assert!(context(PaintMode::Print).includes(ItemId::new()));
        let print = context(PaintMode::Print).with_selection_only(true);
        assert!(print.includes(selected));
        assert!(!print.includes(ItemId::new()));
        assert!(!context(PaintMode::Clipboard).includes(ItemId::new()));
    }

    #[test]
    fn test_modes() {
        assert!(PaintMode::Clipboard.is_selection_only());
        assert!(!PaintMode::Export.paints_camera());
        assert!(!PaintMode::Clipboard.paints_camera());
        assert!(PaintMode::Print.paints_camera());
    }
}
