use super::{PaintContext, BORDER_STROKE_WIDTH, WALL_STROKE_WIDTH};
use crate::cache::{build_wall_areas, room_texts, WallArea};
use crate::icons::{wait_icon, IconState};
use crate::shapes;
use crate::surface::{line_path, polygon_path, polyline, LineJoin, Paint, PlanSurface, StrokeStyle};
use floorkit_core::model::{Camera, Compass, DimensionLine, Furniture, Room, TextStyle};
use floorkit_core::{Color, ItemId, Point, Rect};
use image::RgbaImage;
use lyon::path::Path;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

const ROOM_FILL_ALPHA: f32 = 0.75;
const FRONT_EDGE_FACTOR: f32 = 4.0;
const DIMENSION_MARK_PIXELS: f32 = 5.0;
const FEEDBACK_DASH_PIXELS: [f32; 4] = [20.0, 5.0, 5.0, 5.0];
const HALO_ALPHA: f32 = 0.7;
const HALO_STROKE_PIXELS: f32 = 3.0;
const WAIT_ICON_PIXELS: u32 = 32;

fn shared_wait_icon() -> &'static Arc<RgbaImage> {
    static ICON: OnceLock<Arc<RgbaImage>> = OnceLock::new();
    ICON.get_or_init(|| Arc::new(wait_icon(WAIT_ICON_PIXELS)))
}

fn wall_stroke(ctx: &PaintContext<'_>) -> StrokeStyle {
    StrokeStyle::new(ctx.pixels(WALL_STROKE_WIDTH)).with_join(LineJoin::Miter)
}

fn border_stroke(ctx: &PaintContext<'_>) -> StrokeStyle {
    StrokeStyle::new(ctx.pixels(BORDER_STROKE_WIDTH))
}

/// Floor paint of `room`.
fn room_paint(ctx: &PaintContext<'_>, room: &Room) -> Paint {
    if ctx.preferences.room_floor_colored_or_textured {
        if let Some(color) = room.floor_color {
            return Paint::Solid(color);
        }
        if let Some(texture) = &room.floor_texture {
            return Paint::Texture {
                image: ctx.images.get(&texture.image),
                width: texture.width,
                height: texture.height,
            };
        }
    }
    Paint::Solid(ctx.colors.room)
}

/// Fills and outlines one room.
pub fn paint_room(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>, room: &Room) {
    if room.points.len() < 3 {
        return;
    }
    surface.begin_item(room.id);
    let path = polygon_path(&room.points);
    surface.save();
    surface.set_alpha(ROOM_FILL_ALPHA);
    surface.fill_path(&path, &room_paint(ctx, room));
    surface.restore();
    surface.stroke_path(&path, ctx.colors.foreground, &wall_stroke(ctx));
}

pub(super) fn paint_rooms(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>) {
    let model = ctx.model;
    let rooms: HashMap<ItemId, &Room> = model.rooms.iter().map(|r| (r.id, r)).collect();
    for id in ctx.cache.room_order() {
        let Some(room) = rooms.get(id) else {
            continue;
        };
        if model.is_at_level(room.level, model.selected_level) && ctx.includes(room.id) {
            paint_room(surface, ctx, room);
        }
    }
}

/// Fills one wall area with its pattern and outlines it.
pub fn paint_wall_area(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>, area: &WallArea) {
    let path = area.area.to_path();
    surface.fill_path(
        &path,
        &Paint::Pattern {
            pattern: area.pattern,
            foreground: ctx.colors.foreground,
            background: ctx.colors.background,
            tile: ctx.pattern_tile(),
        },
    );
    surface.stroke_path(&path, ctx.colors.foreground, &wall_stroke(ctx));
}

pub(super) fn paint_walls(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>) {
    let model = ctx.model;
    let areas: Cow<'_, [WallArea]> = if ctx.selection_only {
        Cow::Owned(build_wall_areas(model, ctx.preferences.wall_pattern, |w| {
            model.is_selected(w.id)
        }))
    } else {
        Cow::Borrowed(ctx.cache.wall_areas())
    };
    for wall in &model.walls {
        if model.is_at_level(wall.level, model.selected_level) && ctx.includes(wall.id) {
            surface.begin_item(wall.id);
        }
    }
    for area in areas.iter() {
        paint_wall_area(surface, ctx, area);
    }
}

/// Paints a piece, or the members of a group.
pub fn paint_piece(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>, piece: &Furniture) {
    if piece.is_group() {
        for child in piece.children.iter().filter(|c| c.visible) {
            paint_piece(surface, ctx, child);
        }
        return;
    }
    surface.begin_item(piece.id);
    let outline = polygon_path(&piece.points());
    let foreground = ctx.colors.foreground;
    let border = border_stroke(ctx);

    if let Some(door_or_window) = &piece.door_or_window {
        let wall_part = shapes::wall_intersection_outline(piece, door_or_window);
        let wall_path = polygon_path(&wall_part);
        surface.fill_path(&wall_path, &Paint::Solid(ctx.colors.background));
        surface.stroke_path(&wall_path, foreground, &border);
        for sash in &door_or_window.sashes {
            let sash_path = polygon_path(&shapes::sash_outline(piece, sash));
            surface.stroke_path(&sash_path, foreground, &border);
        }
    }

    surface.fill_path(&outline, &Paint::Solid(ctx.colors.background));
    paint_piece_icon(surface, ctx, piece, &outline);
    surface.stroke_path(&outline, foreground, &border);

    let points = piece.points();
    let front = line_path(points[2].x, points[2].y, points[3].x, points[3].y);
    let front_stroke = StrokeStyle::new(border.width * FRONT_EDGE_FACTOR);
    surface.stroke_path(&front, foreground, &front_stroke);
}

fn paint_piece_icon(
    surface: &mut dyn PlanSurface,
    ctx: &PaintContext<'_>,
    piece: &Furniture,
    outline: &Path,
) {
    let top_view = ctx.preferences.furniture_viewed_from_top;
    if let (true, Some(icons)) = (top_view, ctx.icons) {
        let image = match icons.icon_for(piece) {
            IconState::Ready(image) => image,
            IconState::Pending => shared_wait_icon().clone(),
        };
        surface.save();
        surface.translate(piece.x, piece.y);
        surface.rotate(piece.angle);
        surface.draw_image(
            &image,
            Rect::new(-piece.width / 2.0, -piece.depth / 2.0, piece.width, piece.depth),
        );
        surface.restore();
        return;
    }

    let Some(plan_icon) = &piece.plan_icon else {
        return;
    };
    let image = ctx.images.get(plan_icon);
    if image.width() == 0 || image.height() == 0 {
        return;
    }
    let icon_scale = ctx
        .pixels(1.0)
        .min(piece.width.min(piece.depth) / image.height() as f32);
    let (w, h) = (
        image.width() as f32 * icon_scale,
        image.height() as f32 * icon_scale,
    );
    surface.save();
    surface.clip_path(outline);
    surface.translate(piece.x, piece.y);
    surface.rotate(piece.angle);
    if piece.model_mirrored {
        surface.scale(-1.0, 1.0);
    }
    surface.draw_image(&image, Rect::new(-w / 2.0, -h / 2.0, w, h));
    surface.restore();
}

pub(super) fn paint_furniture(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>) {
    let pieces: HashMap<ItemId, &Furniture> =
        ctx.model.furniture.iter().map(|p| (p.id, p)).collect();
    for id in ctx.cache.furniture_order() {
        if let Some(piece) = pieces.get(id).filter(|p| ctx.includes(p.id)) {
            paint_piece(surface, ctx, piece);
        }
    }
}

/// How a dimension line is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionLineStyle {
    pub color: Color,
    /// Dashed, over a translucent halo.
    pub feedback: bool,
    /// Length shown instead of the measured one.
    pub displayed_length: Option<f32>,
}

/// Draws the measure line, its end marks, extension lines and length text.
pub fn paint_dimension_line(
    surface: &mut dyn PlanSurface,
    ctx: &PaintContext<'_>,
    line: &DimensionLine,
    style: DimensionLineStyle,
) {
    surface.begin_item(line.id);
    let length = line.length();
    let mark = ctx.pixels(DIMENSION_MARK_PIXELS);
    let extension_end = if line.offset < 0.0 { -mark } else { mark };

    let mut builder = Path::builder();
    let mut segment = |x1: f32, y1: f32, x2: f32, y2: f32| {
        builder.begin(lyon::math::point(x1, y1));
        builder.line_to(lyon::math::point(x2, y2));
        builder.end(false);
    };
    segment(0.0, 0.0, length, 0.0);
    for x in [0.0, length] {
        segment(x - mark, mark, x + mark, -mark);
        segment(x, mark, x, -mark);
        segment(x, -line.offset, x, extension_end);
    }
    let path = builder.build();

    surface.save();
    surface.translate(line.x_start, line.y_start);
    surface.rotate(line.angle());
    surface.translate(0.0, line.offset);

    let mut stroke = border_stroke(ctx);
    if style.feedback {
        surface.save();
        surface.set_alpha(HALO_ALPHA);
        let halo = StrokeStyle::round(ctx.pixels(HALO_STROKE_PIXELS));
        surface.stroke_path(&path, ctx.colors.background, &halo);
        surface.restore();
        stroke = stroke.with_dash(FEEDBACK_DASH_PIXELS.iter().map(|d| ctx.pixels(*d)).collect());
    }
    surface.stroke_path(&path, style.color, &stroke);

    let text = ctx
        .preferences
        .unit
        .format_length(style.displayed_length.unwrap_or(length));
    let text_style = line
        .length_style
        .unwrap_or(ctx.preferences.text_styles.dimension_line);
    let metrics = ctx.text.measure(&text, &text_style);
    let baseline = if line.offset <= 0.0 {
        -metrics.descent - 1.0
    } else {
        metrics.ascent + 1.0
    };
    surface.draw_text(&text, length / 2.0, baseline, &text_style, style.color);
    surface.restore();
}

pub(super) fn paint_dimension_lines(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>) {
    let model = ctx.model;
    let style = DimensionLineStyle {
        color: ctx.colors.foreground,
        feedback: false,
        displayed_length: None,
    };
    for line in &model.dimension_lines {
        if model.is_at_level(line.level, model.selected_level) && ctx.includes(line.id) {
            paint_dimension_line(surface, ctx, line, style);
        }
    }
}

fn draw_text(
    surface: &mut dyn PlanSurface,
    ctx: &PaintContext<'_>,
    text: &str,
    style: &TextStyle,
    at: Point,
) {
    surface.draw_text(text, at.x, at.y, style, ctx.colors.foreground);
}

pub(super) fn paint_room_texts(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>) {
    let model = ctx.model;
    let inputs = ctx.cache_inputs();
    let rooms: HashMap<ItemId, &Room> = model.rooms.iter().map(|r| (r.id, r)).collect();
    for id in ctx.cache.room_order() {
        let Some(room) = rooms.get(id) else {
            continue;
        };
        if !model.is_at_level(room.level, model.selected_level) || !ctx.includes(room.id) {
            continue;
        }
        let texts = room_texts(room, &inputs);
        if texts.is_empty() {
            continue;
        }
        surface.begin_item(room.id);
        for (text, style, at) in texts {
            draw_text(surface, ctx, &text, &style, at);
        }
    }
}

pub(super) fn paint_furniture_names(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>) {
    let pieces: HashMap<ItemId, &Furniture> =
        ctx.model.furniture.iter().map(|p| (p.id, p)).collect();
    for id in ctx.cache.furniture_order() {
        let Some(piece) = pieces.get(id).filter(|p| ctx.includes(p.id)) else {
            continue;
        };
        for piece in piece.flatten().into_iter().filter(|p| p.visible) {
            let name = piece.name.trim();
            if !piece.name_visible || name.is_empty() {
                continue;
            }
            let style = piece
                .name_style
                .unwrap_or(ctx.preferences.text_styles.furniture_name);
            surface.begin_item(piece.id);
            draw_text(surface, ctx, name, &style, piece.name_location());
        }
    }
}

pub(super) fn paint_labels(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>) {
    let model = ctx.model;
    for label in &model.labels {
        if !model.is_at_level(label.level, model.selected_level) || !ctx.includes(label.id) {
            continue;
        }
        let style = label.style.unwrap_or(ctx.preferences.text_styles.label);
        surface.begin_item(label.id);
        draw_text(surface, ctx, &label.text, &style, Point::new(label.x, label.y));
    }
}

/// Compass circle, ticks and north arrow.
pub fn paint_compass(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>, compass: &Compass) {
    surface.begin_item(compass.id);
    let rose = shapes::compass_rose(compass);
    let foreground = ctx.colors.foreground;
    let border = border_stroke(ctx);

    surface.save();
    surface.translate(compass.x, compass.y);
    surface.rotate(compass.north_direction);
    surface.stroke_path(&polyline(&rose.circle, true), foreground, &border);
    for (from, to) in &rose.ticks {
        surface.stroke_path(&line_path(from.x, from.y, to.x, to.y), foreground, &border);
    }
    let arrow = polygon_path(&rose.north_arrow);
    surface.fill_path(&arrow, &Paint::Solid(foreground));
    surface.stroke_path(&arrow, foreground, &border);
    surface.restore();
}

/// Observer silhouette and its field of view.
pub fn paint_camera(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>, camera: &Camera) {
    surface.begin_item(camera.id);
    let (body, head) = shapes::camera_silhouette(camera);
    let foreground = ctx.colors.foreground;
    let border = border_stroke(ctx);

    surface.save();
    surface.translate(camera.x, camera.y);
    surface.rotate(camera.yaw);
    let body = body.to_path();
    surface.fill_path(&body, &Paint::Solid(ctx.colors.background));
    surface.stroke_path(&body, foreground, &border);
    let head = head.to_path();
    surface.fill_path(&head, &Paint::Solid(foreground));
    for (near, far) in shapes::camera_field_of_view(camera) {
        surface.stroke_path(&line_path(near.x, near.y, far.x, far.y), foreground, &border);
    }
    surface.restore();
}

/// Paints the items of `model` with the item painters, outside any cache.
pub(super) fn paint_loose_items(
    surface: &mut dyn PlanSurface,
    ctx: &PaintContext<'_>,
    model: &floorkit_core::PlanModel,
) {
    for room in &model.rooms {
        paint_room(surface, ctx, room);
    }
    for area in build_wall_areas(model, ctx.preferences.wall_pattern, |_| true) {
        paint_wall_area(surface, ctx, &area);
    }
    for piece in model.furniture.iter().filter(|p| p.visible) {
        paint_piece(surface, ctx, piece);
    }
    let style = DimensionLineStyle {
        color: ctx.colors.foreground,
        feedback: false,
        displayed_length: None,
    };
    for line in &model.dimension_lines {
        paint_dimension_line(surface, ctx, line, style);
    }
    for label in &model.labels {
        let style = label.style.unwrap_or(ctx.preferences.text_styles.label);
        surface.begin_item(label.id);
        draw_text(surface, ctx, &label.text, &style, Point::new(label.x, label.y));
    }
}
