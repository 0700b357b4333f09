use super::items::{self, paint_camera, paint_compass, paint_dimension_line, DimensionLineStyle};
use super::{PaintContext, BORDER_STROKE_WIDTH, WALL_STROKE_WIDTH};
use crate::grid::{grid_lines, grid_spacing};
use crate::shapes::{ellipse_points, indicator_path, Indicator};
use crate::snapping::{alignment_guides, feedback_length, FeedbackState, POINT_FEEDBACK_RADIUS_PIXELS};
use crate::surface::{line_path, polygon_path, polyline, Paint, PlanSurface, StrokeStyle};
use floorkit_core::model::ItemRef;
use floorkit_core::{Point, PlanModel};
use lyon::math::point;
use lyon::path::Path;
use std::f32::consts::PI;

const BACKGROUND_IMAGE_ALPHA: f32 = 0.7;
const GHOST_WALL_ALPHA: f32 = 0.2;
const GHOST_ROOM_ALPHA: f32 = 0.1;
const GRID_MINOR_PIXELS: f32 = 0.5;
const GRID_MAJOR_PIXELS: f32 = 1.5;
const SELECTION_ALPHA: u8 = 128;
const SELECTION_STROKE_PIXELS: f32 = 6.0;
const DIMENSION_SELECTION_STROKE_PIXELS: f32 = 4.0;
const INDICATOR_STROKE_PIXELS: f32 = 1.0;
const DRAGGED_ALPHA: f32 = 0.5;
const MARQUEE_ALPHA: u8 = 32;

pub(super) fn paint_background(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>) {
    let area = polygon_path(&ctx.area.corners());
    surface.fill_path(&area, &Paint::Solid(ctx.colors.background));
}

pub(super) fn paint_background_image(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>) {
    let (Some(loader), Some(background)) = (ctx.backgrounds, ctx.model.viewable_background_image())
    else {
        return;
    };
    // Still decoding; the loader repaints once done
    let Some(image) = loader.image(background) else {
        return;
    };
    surface.save();
    surface.set_alpha(BACKGROUND_IMAGE_ALPHA);
    surface.draw_image(&image, background.bounds(image.width(), image.height()));
    surface.restore();
}

/// Faded walls then rooms of the level under the selected one.
pub(super) fn paint_other_level(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>) {
    let Some(ghost) = ctx.cache.ghost() else {
        return;
    };
    let paint = Paint::Solid(ctx.colors.foreground);
    surface.save();
    surface.set_alpha(GHOST_WALL_ALPHA);
    surface.fill_path(&ghost.walls.to_path(), &paint);
    surface.set_alpha(GHOST_ROOM_ALPHA);
    surface.fill_path(&ghost.rooms.to_path(), &paint);
    surface.restore();
}

fn is_on_line(position: f32, size: f32) -> bool {
    ((position / size).round() * size - position).abs() < size * 1e-3
}

/// Minor and major grid lines over the painted area.
pub fn paint_grid(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>) {
    let (min_minor, min_major) = ctx.grid_minimums;
    let spacing = grid_spacing(ctx.preferences.unit, ctx.scale, min_minor, min_major);
    let area = ctx.area;
    let mut minor = Path::builder();
    let mut major = Path::builder();
    let mut add = |major_line: bool, x1: f32, y1: f32, x2: f32, y2: f32| {
        let builder = if major_line { &mut major } else { &mut minor };
        builder.begin(point(x1, y1));
        builder.line_to(point(x2, y2));
        builder.end(false);
    };
    for x in grid_lines(area.min_x, area.max_x, spacing.minor) {
        add(is_on_line(x, spacing.major), x, area.min_y, x, area.max_y);
    }
    for y in grid_lines(area.min_y, area.max_y, spacing.minor) {
        add(is_on_line(y, spacing.major), area.min_x, y, area.max_x, y);
    }

    let colors = ctx.colors;
    surface.stroke_path(
        &minor.build(),
        colors.foreground.blend(colors.background, 0.8),
        &StrokeStyle::new(ctx.pixels(GRID_MINOR_PIXELS)),
    );
    surface.stroke_path(
        &major.build(),
        colors.foreground.blend(colors.background, 0.6),
        &StrokeStyle::new(ctx.pixels(GRID_MAJOR_PIXELS)),
    );
}

/// Thick outline drawn under a selected item.
fn selection_outline(ctx: &PaintContext<'_>, item: &ItemRef<'_>) -> Path {
    match item {
        ItemRef::Wall(wall) => polygon_path(&ctx.model.joined_wall_points(wall)),
        ItemRef::DimensionLine(line) => polyline(&line.points(), false),
        ItemRef::Label(label) => {
            let style = label.style.unwrap_or(ctx.preferences.text_styles.label);
            let bounds = ctx
                .text
                .bounds_at(&label.text, &style, Point::new(label.x, label.y));
            polygon_path(&bounds.corners())
        }
        ItemRef::Compass(compass) => polyline(
            &ellipse_points(
                Point::new(compass.x, compass.y),
                compass.diameter / 2.0,
                compass.diameter / 2.0,
            ),
            true,
        ),
        other => polygon_path(&other.points()),
    }
}

/// Draws `item` again over its selection outline.
fn restroke(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>, item: &ItemRef<'_>) {
    let foreground = ctx.colors.foreground;
    match item {
        ItemRef::Wall(wall) => surface.stroke_path(
            &polygon_path(&ctx.model.joined_wall_points(wall)),
            foreground,
            &StrokeStyle::new(ctx.pixels(WALL_STROKE_WIDTH)),
        ),
        ItemRef::Room(room) => surface.stroke_path(
            &polygon_path(&room.points),
            foreground,
            &StrokeStyle::new(ctx.pixels(WALL_STROKE_WIDTH)),
        ),
        ItemRef::Furniture(piece) => surface.stroke_path(
            &polygon_path(&piece.points()),
            foreground,
            &StrokeStyle::new(ctx.pixels(BORDER_STROKE_WIDTH)),
        ),
        ItemRef::DimensionLine(line) => paint_dimension_line(
            surface,
            ctx,
            line,
            DimensionLineStyle {
                color: foreground,
                feedback: false,
                displayed_length: None,
            },
        ),
        ItemRef::Label(label) => {
            let style = label.style.unwrap_or(ctx.preferences.text_styles.label);
            surface.draw_text(&label.text, label.x, label.y, &style, foreground);
        }
        ItemRef::Compass(compass) => paint_compass(surface, ctx, compass),
        ItemRef::Camera(camera) => paint_camera(surface, ctx, camera),
    }
}

/// Indicator glyphs of a selected item, with their anchor and rotation.
pub fn indicator_anchors(item: &ItemRef<'_>) -> Vec<(Indicator, Point, f32)> {
    match item {
        ItemRef::Furniture(piece) => {
            let p = piece.points();
            let angle = piece.angle;
            let corner = if piece.is_light() {
                Indicator::Power
            } else {
                Indicator::Height
            };
            vec![
                (Indicator::Rotation, p[0], angle),
                (Indicator::Elevation, p[1], angle),
                (Indicator::Resize, p[2], angle),
                (corner, p[3], angle),
            ]
        }
        ItemRef::Wall(wall) => {
            let angle = (wall.y_end - wall.y_start).atan2(wall.x_end - wall.x_start);
            vec![
                (Indicator::WallOrientation, wall.start(), angle + PI),
                (Indicator::WallOrientation, wall.end(), angle),
            ]
        }
        ItemRef::Room(room) => room
            .points
            .iter()
            .map(|p| (Indicator::Resize, *p, 0.0))
            .collect(),
        ItemRef::DimensionLine(line) => {
            let p = line.points();
            let angle = line.angle();
            let middle = Point::new((p[1].x + p[2].x) / 2.0, (p[1].y + p[2].y) / 2.0);
            vec![
                (Indicator::DimensionLineEnd, p[1], angle + PI),
                (Indicator::DimensionLineEnd, p[2], angle),
                (Indicator::LineResize, middle, angle),
            ]
        }
        ItemRef::Label(label) => vec![(Indicator::TextLocation, Point::new(label.x, label.y), 0.0)],
        ItemRef::Compass(compass) => {
            let p = compass.points();
            vec![
                (Indicator::Rotation, p[0], compass.north_direction),
                (Indicator::Resize, p[2], compass.north_direction),
            ]
        }
        ItemRef::Camera(camera) => {
            let p = camera.points();
            vec![
                (Indicator::CameraYaw, p[0], camera.yaw),
                (Indicator::CameraPitch, p[1], camera.yaw),
                (Indicator::CameraElevation, p[3], camera.yaw),
            ]
        }
    }
}

fn paint_indicators(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>, item: &ItemRef<'_>) {
    let stroke = StrokeStyle::round(INDICATOR_STROKE_PIXELS);
    for (indicator, at, angle) in indicator_anchors(item) {
        surface.save();
        surface.translate(at.x, at.y);
        surface.rotate(angle);
        surface.scale(ctx.pixels(1.0), ctx.pixels(1.0));
        surface.stroke_path(&indicator_path(indicator), ctx.colors.foreground, &stroke);
        surface.restore();
    }
}

/// Selection outlines under re-stroked items, and the indicators of a
/// single selected item.
pub(super) fn paint_selection(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>) {
    let model = ctx.model;
    let selected: Vec<ItemRef<'_>> = model
        .selected_items()
        .into_iter()
        .filter(|item| model.is_at_selected_level(item))
        .filter(|item| !matches!(item, ItemRef::Camera(_)) || ctx.mode.paints_camera())
        .collect();
    if selected.is_empty() {
        return;
    }

    let color = ctx.colors.selection.with_alpha(SELECTION_ALPHA);
    for item in &selected {
        let width = match item {
            ItemRef::DimensionLine(_) => DIMENSION_SELECTION_STROKE_PIXELS,
            _ => SELECTION_STROKE_PIXELS,
        };
        surface.begin_item(item.id());
        surface.stroke_path(
            &selection_outline(ctx, item),
            color,
            &StrokeStyle::round(ctx.pixels(width)),
        );
    }
    for item in &selected {
        restroke(surface, ctx, item);
    }
    if let [item] = selected.as_slice() {
        if ctx.resize_indicator_visible {
            paint_indicators(surface, ctx, item);
        }
    }
}

/// Items of a drag and drop, half transparent.
pub(super) fn paint_dragged(surface: &mut dyn PlanSurface, ctx: &PaintContext<'_>, dragged: &PlanModel) {
    surface.save();
    surface.set_alpha(DRAGGED_ALPHA);
    items::paint_loose_items(surface, ctx, dragged);
    surface.restore();
}

pub(super) fn paint_feedback(
    surface: &mut dyn PlanSurface,
    ctx: &PaintContext<'_>,
    feedback: &FeedbackState,
) {
    let selection = ctx.colors.selection;
    let foreground = ctx.colors.foreground;
    let thin = StrokeStyle::new(ctx.pixels(BORDER_STROKE_WIDTH));

    if let Some(rectangle) = feedback.rectangle {
        let path = polygon_path(&rectangle.corners());
        surface.fill_path(&path, &Paint::Solid(selection.with_alpha(MARQUEE_ALPHA)));
        surface.stroke_path(&path, selection, &thin);
    }

    if let Some(alignment) = &feedback.alignment {
        for guide in alignment_guides(ctx.model, alignment, ctx.scale).guides() {
            let path = line_path(guide.start.x, guide.start.y, guide.end.x, guide.end.y);
            surface.stroke_path(&path, selection, &thin);
        }
        if alignment.show_point {
            let p = alignment.point;
            let r = ctx.pixels(POINT_FEEDBACK_RADIUS_PIXELS);
            surface.stroke_path(&polyline(&ellipse_points(p, r, r), true), selection, &thin);
            let cross = 2.0 * r;
            surface.stroke_path(&line_path(p.x - cross, p.y, p.x + cross, p.y), selection, &thin);
            surface.stroke_path(&line_path(p.x, p.y - cross, p.x, p.y + cross), selection, &thin);
        }
    }

    for line in &feedback.dimension_lines {
        let displayed = feedback_length(
            line,
            ctx.preferences.unit,
            ctx.preferences.magnetism_enabled,
            ctx.scale,
        );
        paint_dimension_line(
            surface,
            ctx,
            line,
            DimensionLineStyle {
                color: foreground,
                feedback: true,
                displayed_length: Some(displayed),
            },
        );
    }

    if let Some(angle) = &feedback.angle {
        surface.stroke_path(&polyline(&angle.arc(ctx.scale), false), foreground, &thin);
        for (from, to) in angle.radials(ctx.scale) {
            surface.stroke_path(&line_path(from.x, from.y, to.x, to.y), foreground, &thin);
        }
    }
}
