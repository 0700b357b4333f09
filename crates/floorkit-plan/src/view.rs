//! Plan view facade
//!
//! [`PlanView`] ties the plan components together for a host: it holds the
//! current model snapshot, the coordinate transform, the geometry cache, the
//! icon and background loaders and the interaction feedback. It paints
//! through [`Paintable`], prints through [`Printable`] and exports through
//! [`Exportable`], and forwards pointer input to a host [`PlanController`]
//! in model coordinates.
//!
//! Model changes reach the view through [`PlanView::attach`]. The bus
//! handler only records what must be recomputed; the next frame drains the
//! record and recomputes each dirty cache tier once.

use floorkit_core::event_bus::{EventFilter, PlanEventBus, Subscription};
use floorkit_core::model::DimensionLine;
use floorkit_core::{
    ExportError, GeometryError, ItemId, ItemKind, PlanEvent, PlanModel, Point, PreferenceChange,
    Rect, Result,
};
use floorkit_settings::{Config, PlanPreferences, PrintSettings, RenderSettings};
use image::RgbaImage;
use parking_lot::Mutex;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::background::{background_images, BackgroundLoader};
use crate::cache::{CacheInputs, DirtyTiers, GeometryCache, PendingInvalidations};
use crate::export::{self, ExportScope, PageFormat};
use crate::icons::{IconRenderer, NoRenderer, TopViewIconProvider};
use crate::imaging::ImageCache;
use crate::paint::{paint_plan, PaintContext, PaintMode};
use crate::snapping::{AlignmentFeedback, AngleFeedback, FeedbackState};
use crate::surface::PlanSurface;
use crate::tasks::{no_repaint, CancellationToken, InlineSpawner, RepaintRequest, TaskSpawner};
use crate::text::TextMetrics;
use crate::transform::{CoordinateTransform, MARGIN, ZOOM_STEP};

/// Pixels scrolled by one wheel notch.
pub const WHEEL_SCROLL_PIXELS: f32 = 40.0;

/// Something that paints itself onto a [`PlanSurface`].
pub trait Paintable {
    fn paint(&mut self, surface: &mut dyn PlanSurface, mode: PaintMode) -> Result<()>;
}

/// Something that prints itself on paged output.
pub trait Printable {
    /// Number of pages `request` needs.
    fn page_count(&mut self, request: &PrintRequest) -> usize;

    /// Paints page `index` onto a surface measured in points.
    fn print_page(
        &mut self,
        surface: &mut dyn PlanSurface,
        request: &PrintRequest,
        index: usize,
    ) -> Result<()>;
}

/// Something that exports itself as an image or a vector document.
pub trait Exportable {
    /// Raster of the selected items at scale 1 on opaque white.
    fn export_clipboard_image(&mut self) -> Result<RgbaImage>;

    /// PNG encoded clipboard image.
    fn export_clipboard_png(&mut self, out: &mut dyn Write) -> Result<()>;

    /// SVG document of the selected level.
    fn export_vector(&mut self, out: &mut dyn Write, cancel: &CancellationToken) -> Result<()>;
}

/// Numeric property a user may type in while drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableProperty {
    Angle,
    Length,
    ArcExtent,
    X,
    Y,
    Offset,
    Thickness,
}

/// Modifier keys held during pointer input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    /// Platform duplication key (alt or option).
    pub duplication: bool,
    /// Platform zoom key (control or command).
    pub zoom: bool,
}

/// Receives the interactions of a plan view, in model coordinates.
///
/// Implemented by the host; the view never edits the model itself.
pub trait PlanController: Send + Sync {
    fn pressed(&self, x: f32, y: f32, click_count: u32, shift_down: bool, alt_down: bool);

    fn moved(&self, x: f32, y: f32);

    fn released(&self, x: f32, y: f32);

    /// The view scale was multiplied by `factor`.
    fn zoomed(&self, factor: f32);

    /// The view scrolled by a delta in model units.
    fn panned(&self, dx: f32, dy: f32);

    fn duplication_toggled(&self, active: bool);

    fn escaped(&self);

    /// A value typed in the tooltip of the item being drawn.
    fn update_editable_property(&self, property: EditableProperty, value: f32);
}

/// Controller ignoring every interaction.
pub struct NoOpPlanController;

impl PlanController for NoOpPlanController {
    fn pressed(&self, _x: f32, _y: f32, _click_count: u32, _shift_down: bool, _alt_down: bool) {}
    fn moved(&self, _x: f32, _y: f32) {}
    fn released(&self, _x: f32, _y: f32) {}
    fn zoomed(&self, _factor: f32) {}
    fn panned(&self, _dx: f32, _dy: f32) {}
    fn duplication_toggled(&self, _active: bool) {}
    fn escaped(&self) {}
    fn update_editable_property(&self, _property: EditableProperty, _value: f32) {}
}

/// Paper, scale and scope of a print job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintRequest {
    pub format: PageFormat,
    /// Fixed plan scale, auto-fit to one page when unset.
    pub scale: Option<f32>,
    pub selection_only: bool,
}

impl PrintRequest {
    pub fn from_settings(settings: &PrintSettings) -> Self {
        Self {
            format: PageFormat::from_settings(settings),
            scale: settings.scale,
            selection_only: false,
        }
    }
}

/// Host services a view runs with.
#[derive(Clone)]
pub struct ViewServices {
    /// Runs background decodes and icon bakes of the interactive view.
    pub spawner: Arc<dyn TaskSpawner>,
    pub renderer: Arc<dyn IconRenderer>,
    /// Called from any thread when a new frame is needed.
    pub repaint: RepaintRequest,
}

impl Default for ViewServices {
    fn default() -> Self {
        Self {
            spawner: Arc::new(InlineSpawner),
            renderer: Arc::new(NoRenderer),
            repaint: no_repaint(),
        }
    }
}

/// Renderer of one plan, independent of any UI toolkit.
pub struct PlanView {
    model: Arc<PlanModel>,
    preferences: PlanPreferences,
    render: RenderSettings,
    print: PrintSettings,
    transform: CoordinateTransform,
    cache: GeometryCache,
    text: TextMetrics,
    icons: TopViewIconProvider,
    backgrounds: BackgroundLoader,
    /// Synchronous loaders so printed and exported frames never miss images.
    export_icons: TopViewIconProvider,
    export_backgrounds: BackgroundLoader,
    images: Arc<ImageCache>,
    background_bounds: Vec<Rect>,
    feedback: FeedbackState,
    dragged: Option<PlanModel>,
    resize_indicator_visible: bool,
    pending: Arc<Mutex<PendingInvalidations>>,
    repaint: RepaintRequest,
    controller: Arc<dyn PlanController>,
    duplication: bool,
}

impl std::fmt::Debug for PlanView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanView")
            .field("scale", &self.transform.scale())
            .field("cache", &self.cache)
            .field("icons", &self.icons)
            .field("feedback", &self.feedback)
            .finish()
    }
}

impl PlanView {
    pub fn new(model: Arc<PlanModel>, config: &Config, services: ViewServices) -> Self {
        let images = Arc::new(ImageCache::new());
        let icon_size = config.render.icon_size;
        let icons = TopViewIconProvider::new(
            services.renderer.clone(),
            services.spawner.clone(),
            images.clone(),
            icon_size,
        )
        .with_repaint(services.repaint.clone());
        let export_icons = TopViewIconProvider::new(
            services.renderer,
            Arc::new(InlineSpawner),
            images.clone(),
            icon_size,
        );
        let backgrounds =
            BackgroundLoader::new(services.spawner).with_repaint(services.repaint.clone());

        Self {
            model,
            preferences: config.plan.clone(),
            render: config.render.clone(),
            print: config.print.clone(),
            transform: CoordinateTransform::new(),
            cache: GeometryCache::new(),
            text: TextMetrics::new(config.render.font_family.clone()),
            icons,
            backgrounds,
            export_icons,
            export_backgrounds: BackgroundLoader::new(Arc::new(InlineSpawner)),
            images,
            background_bounds: Vec::new(),
            feedback: FeedbackState::default(),
            dragged: None,
            resize_indicator_visible: true,
            pending: Arc::new(Mutex::new(PendingInvalidations::default())),
            repaint: services.repaint,
            controller: Arc::new(NoOpPlanController),
            duplication: false,
        }
    }

    /// Replaces the text metrics, e.g. with [`TextMetrics::approximate`]
    /// where no system font may be loaded.
    pub fn with_text_metrics(mut self, text: TextMetrics) -> Self {
        self.text = text;
        self.cache.invalidate_all();
        self
    }

    pub fn with_controller(mut self, controller: Arc<dyn PlanController>) -> Self {
        self.controller = controller;
        self
    }

    pub fn model(&self) -> &Arc<PlanModel> {
        &self.model
    }

    /// Takes a new model snapshot. What changed arrives through the bus.
    pub fn set_model(&mut self, model: Arc<PlanModel>) {
        self.model = model;
        self.request_repaint();
    }

    pub fn preferences(&self) -> &PlanPreferences {
        &self.preferences
    }

    /// Replaces the preferences and invalidates what their changes affect.
    pub fn set_preferences(&mut self, preferences: PlanPreferences) {
        let old = std::mem::replace(&mut self.preferences, preferences);
        let new = &self.preferences;
        let changes = [
            (old.unit != new.unit, PreferenceChange::Unit),
            (old.grid_visible != new.grid_visible, PreferenceChange::GridVisible),
            (old.text_styles != new.text_styles, PreferenceChange::TextStyles),
            (old.colors != new.colors, PreferenceChange::Colors),
            (old.wall_pattern != new.wall_pattern, PreferenceChange::WallPattern),
            (
                old.furniture_viewed_from_top != new.furniture_viewed_from_top,
                PreferenceChange::FurnitureViewedFromTop,
            ),
            (
                old.room_floor_colored_or_textured != new.room_floor_colored_or_textured,
                PreferenceChange::RoomFloorColoredOrTextured,
            ),
            (old.magnetism_enabled != new.magnetism_enabled, PreferenceChange::Magnetism),
        ];
        let mut pending = self.pending.lock();
        for (_, change) in changes.iter().filter(|(changed, _)| *changed) {
            pending.record(&PlanEvent::Preferences(*change));
        }
        drop(pending);
        self.request_repaint();
    }

    pub fn render_settings(&self) -> &RenderSettings {
        &self.render
    }

    pub fn print_settings(&self) -> &PrintSettings {
        &self.print
    }

    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut CoordinateTransform {
        &mut self.transform
    }

    pub fn scale(&self) -> f32 {
        self.transform.scale()
    }

    pub fn set_scale(&mut self, scale: f32) -> std::result::Result<(), GeometryError> {
        self.transform.set_scale(scale)?;
        self.request_repaint();
        Ok(())
    }

    pub fn zoom_in(&mut self) {
        self.transform.zoom_in();
        self.request_repaint();
    }

    pub fn zoom_out(&mut self) {
        self.transform.zoom_out();
        self.request_repaint();
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    pub fn icons(&self) -> &TopViewIconProvider {
        &self.icons
    }

    pub fn feedback(&self) -> &FeedbackState {
        &self.feedback
    }

    /// Subscribes the view to `bus`. Events are recorded for the next frame
    /// and request a repaint when they change what is displayed.
    pub fn attach(&self, bus: &PlanEventBus) -> Subscription {
        let pending = self.pending.clone();
        let repaint = self.repaint.clone();
        debug!("Plan view attached to event bus");
        bus.subscribe_scoped(EventFilter::All, move |event| {
            let invalidation = pending.lock().record(event);
            if invalidation > crate::cache::Invalidation::None {
                repaint();
            }
        })
    }

    /// Whether change events wait for the next frame.
    pub fn has_pending_changes(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    /// Applies recorded change events and recomputes dirty cache tiers.
    /// Returns the recomputed tiers.
    pub fn prepare(&mut self) -> DirtyTiers {
        let pending = self.pending.lock().take();
        if pending.events > 0 {
            debug!("Applying {} coalesced change events", pending.events);
        }
        self.cache.mark_dirty(pending.tiers);
        for id in &pending.icon_items {
            self.icons.invalidate(*id);
            self.export_icons.invalidate(*id);
        }
        if pending.clear_icons {
            self.icons.clear();
            self.export_icons.clear();
        }
        if pending.tiers.background {
            self.backgrounds.clear();
            self.export_backgrounds.clear();
        }

        for background in background_images(&self.model) {
            let _ = self.backgrounds.image(background);
        }
        let background_bounds = self.backgrounds.loaded_bounds(&self.model);
        if background_bounds != self.background_bounds {
            self.background_bounds = background_bounds;
            self.cache.mark_dirty(DirtyTiers {
                bounds: true,
                ..DirtyTiers::default()
            });
        }

        let inputs = CacheInputs {
            wall_pattern: self.preferences.wall_pattern,
            unit: self.preferences.unit,
            text_styles: &self.preferences.text_styles,
            text: &self.text,
            background_bounds: &self.background_bounds,
        };
        let recomputed = self.cache.prepare(&self.model, &inputs);
        if recomputed.bounds || recomputed.background {
            self.transform.set_plan_bounds(self.cache.plan_bounds());
        }
        recomputed
    }

    /// Sets the items following the pointer during a drag and drop.
    pub fn set_dragged_items(&mut self, items: Option<PlanModel>) {
        self.dragged = items;
        self.request_repaint();
    }

    pub fn set_resize_indicator_visible(&mut self, visible: bool) {
        self.resize_indicator_visible = visible;
        self.request_repaint();
    }

    pub fn set_alignment_feedback(
        &mut self,
        kind: ItemKind,
        item: Option<ItemId>,
        point: Point,
        show_point: bool,
    ) {
        self.feedback.alignment = Some(AlignmentFeedback {
            kind,
            item,
            point,
            show_point,
        });
        self.request_repaint();
    }

    /// Shows a rubber band rectangle between two model points.
    pub fn set_rectangle_feedback(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) {
        self.feedback.rectangle = Some(Rect::from_ltrb(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)));
        self.request_repaint();
    }

    pub fn set_dimension_lines_feedback(&mut self, lines: Vec<DimensionLine>) {
        self.feedback.dimension_lines = lines;
        self.request_repaint();
    }

    pub fn set_angle_feedback(&mut self, center: Point, point1: Point, point2: Point) {
        self.feedback.angle = Some(AngleFeedback::new(center, point1, point2));
        self.request_repaint();
    }

    pub fn delete_feedback(&mut self) {
        self.feedback.clear();
        self.request_repaint();
    }

    pub fn on_pointer_pressed(&mut self, screen: Point, click_count: u32, modifiers: Modifiers) {
        let p = self.transform.screen_to_model(&screen);
        self.controller
            .pressed(p.x, p.y, click_count, modifiers.shift, modifiers.alt);
    }

    pub fn on_pointer_moved(&mut self, screen: Point) {
        let p = self.transform.screen_to_model(&screen);
        self.controller.moved(p.x, p.y);
    }

    pub fn on_pointer_released(&mut self, screen: Point) {
        let p = self.transform.screen_to_model(&screen);
        self.controller.released(p.x, p.y);
    }

    /// Zooms around the pointer with the zoom modifier, scrolls otherwise.
    /// Negative `rotation` turns the wheel away from the user.
    pub fn on_wheel(&mut self, screen: Point, rotation: f32, modifiers: Modifiers) {
        if rotation == 0.0 || !rotation.is_finite() {
            return;
        }
        if modifiers.zoom {
            let anchor = self.transform.screen_to_model(&screen);
            let before = self.transform.scale();
            let factor = ZOOM_STEP.powf(-rotation);
            self.transform.zoom_at(&anchor, factor);
            let applied = self.transform.scale() / before;
            if applied != 1.0 {
                self.controller.zoomed(applied);
            }
        } else {
            let before = self.transform.scroll();
            let (dx, dy) = if modifiers.shift {
                (rotation * WHEEL_SCROLL_PIXELS, 0.0)
            } else {
                (0.0, rotation * WHEEL_SCROLL_PIXELS)
            };
            self.transform.scroll_by(dx, dy);
            let after = self.transform.scroll();
            let length = self.transform.pixel_length();
            if after != before {
                self.controller
                    .panned((after.0 - before.0) * length, (after.1 - before.1) * length);
            }
        }
        self.request_repaint();
    }

    pub fn on_key_escape(&mut self) {
        self.controller.escaped();
    }

    /// Forwards duplication key changes.
    pub fn on_modifier_changed(&mut self, modifiers: Modifiers) {
        if modifiers.duplication != self.duplication {
            self.duplication = modifiers.duplication;
            self.controller.duplication_toggled(self.duplication);
        }
    }

    pub fn on_property_edited(&mut self, property: EditableProperty, value: f32) {
        if value.is_finite() {
            self.controller.update_editable_property(property, value);
        }
    }

    fn request_repaint(&self) {
        (self.repaint)();
    }

    fn cache_inputs(&self) -> CacheInputs<'_> {
        CacheInputs {
            wall_pattern: self.preferences.wall_pattern,
            unit: self.preferences.unit,
            text_styles: &self.preferences.text_styles,
            text: &self.text,
            background_bounds: &self.background_bounds,
        }
    }

    fn export_context(&self, mode: PaintMode) -> PaintContext<'_> {
        PaintContext::new(
            &self.model,
            &self.cache,
            &self.preferences,
            &self.text,
            &self.images,
            mode,
            1.0,
        )
        .with_icons(&self.export_icons)
        .with_backgrounds(&self.export_backgrounds)
        .with_grid_minimums(self.render.min_grid_spacing, self.render.min_major_grid_spacing)
    }

    fn interactive_context(&self) -> PaintContext<'_> {
        let (width, height) = self.transform.viewport_size();
        let area = if width > 0.0 && height > 0.0 {
            self.transform.visible_model_rect()
        } else {
            self.cache.plan_bounds().expanded(MARGIN)
        };
        PaintContext::new(
            &self.model,
            &self.cache,
            &self.preferences,
            &self.text,
            &self.images,
            PaintMode::Interactive,
            self.transform.scale(),
        )
        .with_icons(&self.icons)
        .with_backgrounds(&self.backgrounds)
        .with_feedback(&self.feedback)
        .with_dragged(self.dragged.as_ref())
        .with_area(area)
        .with_grid_minimums(self.render.min_grid_spacing, self.render.min_major_grid_spacing)
        .with_resize_indicator(self.resize_indicator_visible)
    }

    fn print_bounds(&self, selection_only: bool) -> Option<Rect> {
        let scope = ExportScope {
            selection_only,
            ..ExportScope::PRINT
        };
        export::export_bounds(&self.model, &self.cache_inputs(), scope)
    }
}

impl Paintable for PlanView {
    /// Interactive frames are drawn in viewport pixels; other modes draw the
    /// whole plan at scale 1.
    fn paint(&mut self, surface: &mut dyn PlanSurface, mode: PaintMode) -> Result<()> {
        self.prepare();
        surface.save();
        let result = if mode.is_interactive() {
            let insets = self.transform.insets();
            let (scroll_x, scroll_y) = self.transform.scroll();
            let scale = self.transform.scale();
            let bounds = self.transform.plan_bounds();
            surface.translate(insets.left - scroll_x, insets.top - scroll_y);
            surface.scale(scale, scale);
            surface.translate(MARGIN - bounds.min_x, MARGIN - bounds.min_y);
            paint_plan(surface, &self.interactive_context(), None)
        } else {
            let bounds = self.cache.plan_bounds();
            surface.translate(MARGIN - bounds.min_x, MARGIN - bounds.min_y);
            let ctx = self.export_context(mode).with_area(bounds.expanded(MARGIN));
            paint_plan(surface, &ctx, None)
        };
        surface.restore();
        Ok(result?)
    }
}

impl Printable for PlanView {
    /// One page at auto-fit scale; tiles otherwise. Nothing to print still
    /// counts as one empty page.
    fn page_count(&mut self, request: &PrintRequest) -> usize {
        self.prepare();
        match self.print_bounds(request.selection_only) {
            Some(bounds) => export::print_layout(bounds, &request.format, request.scale).page_count(),
            None => 1,
        }
    }

    fn print_page(
        &mut self,
        surface: &mut dyn PlanSurface,
        request: &PrintRequest,
        index: usize,
    ) -> Result<()> {
        self.prepare();
        let bounds = self
            .print_bounds(request.selection_only)
            .unwrap_or_else(|| self.cache.plan_bounds());
        let layout = export::print_layout(bounds, &request.format, request.scale);
        if index == 0 {
            info!(
                "Printing {} page(s) at scale 1:{:.0}",
                layout.page_count(),
                1.0 / layout.scale
            );
        }
        let ctx = self
            .export_context(PaintMode::Print)
            .with_selection_only(request.selection_only);
        export::print_page(surface, ctx, &layout, &request.format, index)?;
        Ok(())
    }
}

impl Exportable for PlanView {
    fn export_clipboard_image(&mut self) -> Result<RgbaImage> {
        self.prepare();
        let bounds = export::export_bounds(&self.model, &self.cache_inputs(), ExportScope::CLIPBOARD)
            .ok_or(ExportError::EmptySelection)?;
        let ctx = self.export_context(PaintMode::Clipboard);
        Ok(export::render_clipboard(ctx, bounds, self.render.anti_alias)?)
    }

    fn export_clipboard_png(&mut self, out: &mut dyn Write) -> Result<()> {
        let image = self.export_clipboard_image()?;
        export::write_png(&image, out)?;
        Ok(())
    }

    fn export_vector(&mut self, out: &mut dyn Write, cancel: &CancellationToken) -> Result<()> {
        self.prepare();
        let bounds = export::export_bounds(&self.model, &self.cache_inputs(), ExportScope::VECTOR)
            .unwrap_or_else(|| self.cache.plan_bounds());
        let ctx = self.export_context(PaintMode::Export);
        export::write_svg(out, ctx, bounds, cancel)?;
        Ok(())
    }
}

impl PlanView {
    /// Exports the SVG document to `path`, leaving no file behind when the
    /// export fails or is interrupted.
    pub fn export_vector_to_file(&mut self, path: &Path, cancel: &CancellationToken) -> Result<()> {
        self.prepare();
        let bounds = export::export_bounds(&self.model, &self.cache_inputs(), ExportScope::VECTOR)
            .unwrap_or_else(|| self.cache.plan_bounds());
        let ctx = self.export_context(PaintMode::Export);
        export::write_svg_file(path, ctx, bounds, cancel)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Layer, RecordingSurface};
    use floorkit_core::event_bus::WallProperty;
    use floorkit_core::model::{Room, Wall, WallPattern};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingController {
        calls: Mutex<Vec<String>>,
    }

    impl PlanController for RecordingController {
        fn pressed(&self, x: f32, y: f32, click_count: u32, shift_down: bool, _alt_down: bool) {
            self.calls
                .lock()
                .push(format!("pressed {x} {y} {click_count} {shift_down}"));
        }
        fn moved(&self, x: f32, y: f32) {
            self.calls.lock().push(format!("moved {x} {y}"));
        }
        fn released(&self, x: f32, y: f32) {
            self.calls.lock().push(format!("released {x} {y}"));
        }
        fn zoomed(&self, factor: f32) {
            self.calls.lock().push(format!("zoomed {factor}"));
        }
        fn panned(&self, dx: f32, dy: f32) {
            self.calls.lock().push(format!("panned {dx} {dy}"));
        }
        fn duplication_toggled(&self, active: bool) {
            self.calls.lock().push(format!("duplication {active}"));
        }
        fn escaped(&self) {
            self.calls.lock().push("escaped".to_string());
        }
        fn update_editable_property(&self, property: EditableProperty, value: f32) {
            self.calls.lock().push(format!("{property:?} {value}"));
        }
    }

    fn sample_model() -> PlanModel {
        let mut model = PlanModel::new();
        model.walls.push(Wall::new(0.0, 0.0, 400.0, 0.0, 10.0));
        model.rooms.push(Room::new(vec![
            Point::new(0.0, 0.0),
            Point::new(400.0, 0.0),
            Point::new(400.0, 300.0),
            Point::new(0.0, 300.0),
        ]));
        model
    }

    fn view(model: PlanModel) -> PlanView {
        PlanView::new(Arc::new(model), &Config::default(), ViewServices::default())
            .with_text_metrics(TextMetrics::approximate())
    }

    #[test]
    fn test_pointer_input_reaches_controller_in_model_units() {
        let controller = Arc::new(RecordingController::default());
        let mut view = view(PlanModel::new()).with_controller(controller.clone());
        // Default bounds start at the origin, scale 0.5
        view.on_pointer_pressed(Point::new(70.0, 120.0), 2, Modifiers { shift: true, ..Default::default() });
        view.on_pointer_moved(Point::new(20.0, 20.0));
        view.on_key_escape();
        view.on_property_edited(EditableProperty::Length, 120.0);
        view.on_property_edited(EditableProperty::Angle, f32::NAN);
        let calls = controller.calls.lock().clone();
        assert_eq!(
            calls,
            vec![
                "pressed 100 200 2 true".to_string(),
                "moved 0 0".to_string(),
                "escaped".to_string(),
                "Length 120".to_string(),
            ]
        );
    }

    #[test]
    fn test_duplication_forwarded_on_change_only() {
        let controller = Arc::new(RecordingController::default());
        let mut view = view(PlanModel::new()).with_controller(controller.clone());
        let held = Modifiers {
            duplication: true,
            ..Default::default()
        };
        view.on_modifier_changed(held);
        view.on_modifier_changed(held);
        view.on_modifier_changed(Modifiers::default());
        assert_eq!(
            controller.calls.lock().clone(),
            vec!["duplication true".to_string(), "duplication false".to_string()]
        );
    }

    #[test]
    fn test_wheel_with_zoom_key_zooms() {
        let controller = Arc::new(RecordingController::default());
        let mut view = view(PlanModel::new()).with_controller(controller.clone());
        let zoom = Modifiers {
            zoom: true,
            ..Default::default()
        };
        view.on_wheel(Point::new(50.0, 50.0), -1.0, zoom);
        assert!((view.scale() - 0.75).abs() < 1e-6);
        assert!(controller.calls.lock()[0].starts_with("zoomed"));
    }

    #[test]
    fn test_events_coalesce_until_next_frame() {
        let repaints = Arc::new(AtomicUsize::new(0));
        let counter = repaints.clone();
        let services = ViewServices {
            repaint: Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            ..Default::default()
        };
        let model = sample_model();
        let wall = model.walls[0].id;
        let mut view = PlanView::new(Arc::new(model), &Config::default(), services)
            .with_text_metrics(TextMetrics::approximate());
        view.prepare();
        let before = view.cache().stats().wall_areas;

        let bus = PlanEventBus::new();
        let subscription = view.attach(&bus);
        for _ in 0..5 {
            bus.publish(PlanEvent::Wall {
                id: wall,
                property: WallProperty::Thickness,
            })
            .unwrap();
        }
        assert!(view.has_pending_changes());
        assert_eq!(repaints.load(Ordering::SeqCst), 5);

        let mut surface = RecordingSurface::new();
        view.paint(&mut surface, PaintMode::Interactive).unwrap();
        assert_eq!(view.cache().stats().wall_areas, before + 1);
        assert!(!view.has_pending_changes());

        drop(subscription);
        let _ = bus.publish(PlanEvent::Selection);
        assert!(!view.has_pending_changes());
    }

    #[test]
    fn test_preference_change_marks_walls_dirty() {
        let mut view = view(sample_model());
        view.prepare();
        let before = view.cache().stats().wall_areas;
        let mut preferences = view.preferences().clone();
        preferences.wall_pattern = WallPattern::Solid;
        view.set_preferences(preferences);
        assert!(view.prepare().wall_areas);
        assert_eq!(view.cache().stats().wall_areas, before + 1);
    }

    #[test]
    fn test_feedback_painted_after_selection() {
        let mut view = view(sample_model());
        view.set_rectangle_feedback(10.0, 10.0, 0.0, 0.0);
        assert_eq!(view.feedback().rectangle, Some(Rect::from_ltrb(0.0, 0.0, 10.0, 10.0)));
        let mut surface = RecordingSurface::new();
        view.paint(&mut surface, PaintMode::Interactive).unwrap();
        assert_eq!(surface.layers().last(), Some(&Layer::Feedback));

        view.delete_feedback();
        let mut surface = RecordingSurface::new();
        view.paint(&mut surface, PaintMode::Interactive).unwrap();
        assert!(!surface.layers().contains(&Layer::Feedback));
    }

    #[test]
    fn test_export_modes_hide_grid() {
        let mut view = view(sample_model());
        let mut surface = RecordingSurface::new();
        view.paint(&mut surface, PaintMode::Export).unwrap();
        assert!(!surface.layers().contains(&Layer::Grid));
        assert!(surface.layers().contains(&Layer::Walls));
    }

    #[test]
    fn test_single_page_at_auto_fit() {
        let mut view = view(sample_model());
        let request = PrintRequest::from_settings(&PrintSettings::default());
        assert_eq!(view.page_count(&request), 1);
        let mut surface = RecordingSurface::new();
        view.print_page(&mut surface, &request, 0).unwrap();
        let err = view.print_page(&mut surface, &request, 1).unwrap_err();
        assert!(matches!(
            err,
            floorkit_core::Error::Export(ExportError::InvalidPage { index: 1, count: 1 })
        ));
    }

    #[test]
    fn test_clipboard_needs_selection() {
        let mut view = view(sample_model());
        let err = view.export_clipboard_image().unwrap_err();
        assert!(matches!(err, floorkit_core::Error::Export(ExportError::EmptySelection)));
    }
}
