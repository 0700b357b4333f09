//! Coordinate transformation for plan rendering.
//!
//! Maps between three spaces:
//! - model space: plan coordinates in centimetres, y axis pointing down
//! - pixel space: the full, unscrolled plan component at the current scale
//! - screen space: the host window, offset by the scroll position and the
//!   window origin
//!
//! The plan bounds are padded by [`MARGIN`] on every side so that items on
//! the edge of the plan are never painted against the component border.

use floorkit_core::{GeometryError, Point, Rect};
use serde::{Deserialize, Serialize};

/// Margin around the plan bounds, in model units at scale 1.
pub const MARGIN: f32 = 40.0;

/// Scale used by a freshly created view.
pub const DEFAULT_SCALE: f32 = 0.5;

/// Smallest scale reachable through zooming.
pub const MIN_SCALE: f32 = 0.01;

/// Largest scale reachable through zooming.
pub const MAX_SCALE: f32 = 10.0;

/// Factor applied by one zoom in / zoom out step.
pub const ZOOM_STEP: f32 = 1.5;

/// Component insets (border) in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

/// Opaque scale and scroll state, persisted by the host between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollState {
    scale: f32,
    scroll_x: f32,
    scroll_y: f32,
}

/// Converts between model, pixel and screen coordinates.
#[derive(Debug, Clone)]
pub struct CoordinateTransform {
    scale: f32,
    bounds: Rect,
    insets: Insets,
    window_origin: Point,
    scroll_x: f32,
    scroll_y: f32,
    viewport_width: f32,
    viewport_height: f32,
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateTransform {
    /// Creates a transform at the default scale over the default plan extent.
    pub fn new() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            bounds: default_plan_bounds(),
            insets: Insets::default(),
            window_origin: Point::default(),
            scroll_x: 0.0,
            scroll_y: 0.0,
            viewport_width: 0.0,
            viewport_height: 0.0,
        }
    }

    /// Gets the current scale (pixels per model unit).
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Sets the scale, keeping the model point at the viewport centre in place.
    ///
    /// Rejects zero, negative and non finite scales.
    pub fn set_scale(&mut self, scale: f32) -> Result<(), GeometryError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(GeometryError::InvalidScale { scale });
        }
        self.rescale(scale);
        Ok(())
    }

    /// Multiplies the scale by [`ZOOM_STEP`].
    pub fn zoom_in(&mut self) {
        self.rescale((self.scale * ZOOM_STEP).clamp(MIN_SCALE, MAX_SCALE));
    }

    /// Divides the scale by [`ZOOM_STEP`].
    pub fn zoom_out(&mut self) {
        self.rescale((self.scale / ZOOM_STEP).clamp(MIN_SCALE, MAX_SCALE));
    }

    /// `scale` must be finite and positive.
    fn rescale(&mut self, scale: f32) {
        if scale != self.scale {
            let center = self.viewport_center();
            self.scale = scale;
            self.center_on(&center);
        }
    }

    /// Zooms by `factor` keeping `model_point` at the same place on screen.
    pub fn zoom_at(&mut self, model_point: &Point, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let before_x = self.unrounded_pixel_x(model_point.x) - self.scroll_x;
        let before_y = self.unrounded_pixel_y(model_point.y) - self.scroll_y;
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.scroll_x = self.unrounded_pixel_x(model_point.x) - before_x;
        self.scroll_y = self.unrounded_pixel_y(model_point.y) - before_y;
        self.clamp_scroll();
    }

    /// Gets the plan bounds, without margin.
    pub fn plan_bounds(&self) -> Rect {
        self.bounds
    }

    /// Replaces the plan bounds, keeping the viewport centre in place.
    pub fn set_plan_bounds(&mut self, bounds: Rect) {
        if bounds == self.bounds {
            return;
        }
        let center = self.viewport_center();
        self.bounds = bounds;
        self.center_on(&center);
    }

    pub fn insets(&self) -> Insets {
        self.insets
    }

    pub fn set_insets(&mut self, insets: Insets) {
        self.insets = insets;
    }

    /// Sets the screen position of the component's top left corner.
    pub fn set_window_origin(&mut self, origin: Point) {
        self.window_origin = origin;
    }

    /// Sets the visible part of the component, in pixels.
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.viewport_width = width.max(0.0);
        self.viewport_height = height.max(0.0);
        self.clamp_scroll();
    }

    pub fn viewport_size(&self) -> (f32, f32) {
        (self.viewport_width, self.viewport_height)
    }

    /// Gets the scroll offset in pixels.
    pub fn scroll(&self) -> (f32, f32) {
        (self.scroll_x, self.scroll_y)
    }

    /// Pans by a delta in pixels, clamped to the scrollable range.
    pub fn scroll_by(&mut self, dx: f32, dy: f32) {
        self.scroll_x += dx;
        self.scroll_y += dy;
        self.clamp_scroll();
    }

    /// Converts a model x coordinate to a component pixel column.
    ///
    /// ```text
    /// px = round((x - bounds.min_x + MARGIN) * scale) + inset_left
    /// ```
    pub fn model_to_pixel_x(&self, x: f32) -> f32 {
        ((x - self.bounds.min_x + MARGIN) * self.scale).round() + self.insets.left
    }

    /// Converts a model y coordinate to a component pixel row.
    pub fn model_to_pixel_y(&self, y: f32) -> f32 {
        ((y - self.bounds.min_y + MARGIN) * self.scale).round() + self.insets.top
    }

    /// Converts a model point to component pixels.
    pub fn model_to_pixel(&self, p: &Point) -> Point {
        Point::new(self.model_to_pixel_x(p.x), self.model_to_pixel_y(p.y))
    }

    /// Converts a component pixel column to a model x coordinate.
    ///
    /// ```text
    /// x = (px - inset_left) / scale - MARGIN + bounds.min_x
    /// ```
    pub fn pixel_to_model_x(&self, px: f32) -> f32 {
        (px - self.insets.left) / self.scale - MARGIN + self.bounds.min_x
    }

    /// Converts a component pixel row to a model y coordinate.
    pub fn pixel_to_model_y(&self, py: f32) -> f32 {
        (py - self.insets.top) / self.scale - MARGIN + self.bounds.min_y
    }

    /// Converts component pixels to a model point.
    pub fn pixel_to_model(&self, p: &Point) -> Point {
        Point::new(self.pixel_to_model_x(p.x), self.pixel_to_model_y(p.y))
    }

    /// Length in model units of one pixel.
    pub fn pixel_length(&self) -> f32 {
        1.0 / self.scale
    }

    /// Converts a host window position to component pixels.
    pub fn screen_to_pixel(&self, p: &Point) -> Point {
        Point::new(
            p.x - self.window_origin.x + self.scroll_x,
            p.y - self.window_origin.y + self.scroll_y,
        )
    }

    /// Converts component pixels to a host window position.
    pub fn pixel_to_screen(&self, p: &Point) -> Point {
        Point::new(
            p.x - self.scroll_x + self.window_origin.x,
            p.y - self.scroll_y + self.window_origin.y,
        )
    }

    /// Converts a host window position straight to model coordinates.
    pub fn screen_to_model(&self, p: &Point) -> Point {
        self.pixel_to_model(&self.screen_to_pixel(p))
    }

    /// Size the component needs to show the whole plan.
    pub fn preferred_size(&self) -> (f32, f32) {
        (
            (self.bounds.width() + 2.0 * MARGIN) * self.scale + self.insets.left + self.insets.right,
            (self.bounds.height() + 2.0 * MARGIN) * self.scale + self.insets.top + self.insets.bottom,
        )
    }

    /// Drawing transform from model space to viewport pixels.
    pub fn view_transform(&self) -> tiny_skia::Transform {
        tiny_skia::Transform::from_translate(
            self.insets.left - self.scroll_x,
            self.insets.top - self.scroll_y,
        )
        .pre_scale(self.scale, self.scale)
        .pre_translate(MARGIN - self.bounds.min_x, MARGIN - self.bounds.min_y)
    }

    /// Model rectangle currently visible in the viewport.
    pub fn visible_model_rect(&self) -> Rect {
        Rect::from_ltrb(
            self.pixel_to_model_x(self.scroll_x),
            self.pixel_to_model_y(self.scroll_y),
            self.pixel_to_model_x(self.scroll_x + self.viewport_width),
            self.pixel_to_model_y(self.scroll_y + self.viewport_height),
        )
    }

    /// Captures scale and scroll offset.
    pub fn snapshot(&self) -> ScrollState {
        ScrollState {
            scale: self.scale,
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
        }
    }

    /// Restores a state captured by [`snapshot`](Self::snapshot).
    pub fn restore(&mut self, state: &ScrollState) {
        if state.scale.is_finite() && state.scale > 0.0 {
            self.scale = state.scale;
        }
        self.scroll_x = state.scroll_x;
        self.scroll_y = state.scroll_y;
        self.clamp_scroll();
    }

    fn unrounded_pixel_x(&self, x: f32) -> f32 {
        (x - self.bounds.min_x + MARGIN) * self.scale + self.insets.left
    }

    fn unrounded_pixel_y(&self, y: f32) -> f32 {
        (y - self.bounds.min_y + MARGIN) * self.scale + self.insets.top
    }

    fn viewport_center(&self) -> Point {
        Point::new(
            self.pixel_to_model_x(self.scroll_x + self.viewport_width / 2.0),
            self.pixel_to_model_y(self.scroll_y + self.viewport_height / 2.0),
        )
    }

    fn center_on(&mut self, center: &Point) {
        self.scroll_x = self.unrounded_pixel_x(center.x) - self.viewport_width / 2.0;
        self.scroll_y = self.unrounded_pixel_y(center.y) - self.viewport_height / 2.0;
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let (width, height) = self.preferred_size();
        self.scroll_x = self.scroll_x.clamp(0.0, (width - self.viewport_width).max(0.0));
        self.scroll_y = self.scroll_y.clamp(0.0, (height - self.viewport_height).max(0.0));
    }
}

/// Minimum extent a plan covers, even when empty.
pub fn default_plan_bounds() -> Rect {
    Rect::from_ltrb(0.0, 0.0, 1000.0, 1000.0)
}
