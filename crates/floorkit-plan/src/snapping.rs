//! Live feedback while items are drawn, moved or resized.
//!
//! Alignment guides show when the moved point shares an abscissa or an
//! ordinate with a vertex of another item. Distances are in model units and
//! tolerances scale with the view so they stay constant on screen.

use floorkit_core::model::{DimensionLine, ItemRef};
use floorkit_core::{ItemId, ItemKind, LengthUnit, PlanModel, Point, Rect};
use std::f32::consts::TAU;

use crate::shapes::arc_points;

/// Tolerance of alignment matches, in pixels.
pub const ALIGNMENT_PIXEL_MARGIN: f32 = 0.5;
/// Length added to both ends of a guide, in pixels.
pub const GUIDE_EXTENSION_PIXELS: f32 = 25.0;
pub const POINT_FEEDBACK_RADIUS_PIXELS: f32 = 5.0;
pub const ANGLE_ARC_RADIUS_PIXELS: f32 = 20.0;
pub const ANGLE_RADIAL_PIXELS: f32 = 25.0;
/// Largest correction magnetism applies to a displayed length, in pixels.
pub const MAGNETISM_PIXEL_MARGIN: f32 = 4.0;

/// Point being aligned and the item it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentFeedback {
    pub kind: ItemKind,
    /// Item being moved or drawn, `None` while it doesn't exist yet.
    pub item: Option<ItemId>,
    pub point: Point,
    /// Also mark the point itself with a circle and a crosshair.
    pub show_point: bool,
}

/// Straight guide segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guide {
    pub start: Point,
    pub end: Point,
}

/// Guides found for one aligned point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Alignment {
    /// Guide along the moved point's ordinate.
    pub horizontal: Option<Guide>,
    /// Guide along the moved point's abscissa.
    pub vertical: Option<Guide>,
}

impl Alignment {
    pub fn is_empty(&self) -> bool {
        self.horizontal.is_none() && self.vertical.is_none()
    }

    pub fn guides(&self) -> impl Iterator<Item = &Guide> {
        self.horizontal.iter().chain(self.vertical.iter())
    }
}

fn wall_vertices(model: &PlanModel, item: &ItemRef<'_>) -> Vec<Point> {
    match item {
        ItemRef::Wall(wall) => {
            let mut points = vec![wall.start(), wall.end()];
            points.extend(model.joined_wall_points(wall));
            points
        }
        other => other.points(),
    }
}

/// Vertices an item of `kind` aligns with, the aligned item's own points
/// excluded.
pub fn alignment_candidates(model: &PlanModel, kind: ItemKind, aligned: Option<ItemId>) -> Vec<Point> {
    let targets: &[ItemKind] = match kind {
        ItemKind::Wall => &[ItemKind::Wall],
        ItemKind::Room => &[ItemKind::Room, ItemKind::Wall],
        ItemKind::DimensionLine => &[
            ItemKind::Room,
            ItemKind::DimensionLine,
            ItemKind::Wall,
            ItemKind::Furniture,
        ],
        ItemKind::Furniture => &[ItemKind::Furniture, ItemKind::Wall],
        ItemKind::Label | ItemKind::Compass | ItemKind::Camera => return Vec::new(),
    };

    let own: Vec<Point> = aligned
        .and_then(|id| model.item(id))
        .map(|item| wall_vertices(model, &item))
        .unwrap_or_default();

    model
        .items_at_level(model.selected_level)
        .iter()
        .filter(|item| targets.contains(&item.kind()) && Some(item.id()) != aligned)
        .flat_map(|item| wall_vertices(model, item))
        .filter(|p| !own.contains(p))
        .collect()
}

/// Guides from `point` to the closest candidate sharing its ordinate and to
/// the closest one sharing its abscissa.
pub fn align(point: Point, candidates: &[Point], scale: f32) -> Alignment {
    let margin = ALIGNMENT_PIXEL_MARGIN / scale;
    let extension = GUIDE_EXTENSION_PIXELS / scale;
    let mut dx: Option<f32> = None;
    let mut dy: Option<f32> = None;
    for c in candidates {
        if (point.y - c.y).abs() < margin && dx.is_none_or(|d| d.abs() > (point.x - c.x).abs()) {
            dx = Some(point.x - c.x);
        }
        if (point.x - c.x).abs() < margin && dy.is_none_or(|d| d.abs() > (point.y - c.y).abs()) {
            dy = Some(point.y - c.y);
        }
    }

    let guide_along = |delta: f32, along: f32| -> (f32, f32) {
        if delta > 0.0 {
            (along + extension, along - delta - extension)
        } else {
            (along - extension, along - delta + extension)
        }
    };
    Alignment {
        horizontal: dx.map(|d| {
            let (x1, x2) = guide_along(d, point.x);
            Guide {
                start: Point::new(x1, point.y),
                end: Point::new(x2, point.y),
            }
        }),
        vertical: dy.map(|d| {
            let (y1, y2) = guide_along(d, point.y);
            Guide {
                start: Point::new(point.x, y1),
                end: Point::new(point.x, y2),
            }
        }),
    }
}

/// Guides for `feedback` among the other items of `model`.
pub fn alignment_guides(model: &PlanModel, feedback: &AlignmentFeedback, scale: f32) -> Alignment {
    let candidates = alignment_candidates(model, feedback.kind, feedback.item);
    align(feedback.point, &candidates, scale)
}

/// Arc showing the angle between two points seen from a centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleFeedback {
    pub center: Point,
    pub point1: Point,
    pub point2: Point,
}

impl AngleFeedback {
    pub fn new(center: Point, point1: Point, point2: Point) -> Self {
        Self {
            center,
            point1,
            point2,
        }
    }

    fn angle_of(&self, p: &Point) -> f32 {
        (p.y - self.center.y).atan2(p.x - self.center.x)
    }

    pub fn start_angle(&self) -> f32 {
        self.angle_of(&self.point1)
    }

    /// Angle swept from the first point to the second one in increasing
    /// angle direction, in `[0, 2π)`.
    pub fn sweep(&self) -> f32 {
        let sweep = (self.angle_of(&self.point2) - self.start_angle()).rem_euclid(TAU);
        // rem_euclid may round up to TAU for tiny negative differences
        if sweep >= TAU {
            0.0
        } else {
            sweep
        }
    }

    /// Arc points at the feedback radius for `scale`.
    pub fn arc(&self, scale: f32) -> Vec<Point> {
        let radius = ANGLE_ARC_RADIUS_PIXELS / scale;
        arc_points(self.center, radius, radius, self.start_angle(), self.sweep())
    }

    /// Radial strokes toward both points.
    pub fn radials(&self, scale: f32) -> [(Point, Point); 2] {
        let length = ANGLE_RADIAL_PIXELS / scale;
        let radial = |angle: f32| {
            let (sin, cos) = angle.sin_cos();
            (
                self.center,
                Point::new(self.center.x + length * cos, self.center.y + length * sin),
            )
        };
        [
            radial(self.start_angle()),
            radial(self.angle_of(&self.point2)),
        ]
    }
}

/// Length displayed by a feedback dimension line.
pub fn feedback_length(line: &DimensionLine, unit: LengthUnit, magnetism: bool, scale: f32) -> f32 {
    let length = line.length();
    if magnetism {
        unit.magnetized_length(length, MAGNETISM_PIXEL_MARGIN / scale)
    } else {
        length
    }
}

/// Feedback shown by the plan view during an interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackState {
    pub alignment: Option<AlignmentFeedback>,
    /// Rubber band selection rectangle.
    pub rectangle: Option<Rect>,
    pub dimension_lines: Vec<DimensionLine>,
    pub angle: Option<AngleFeedback>,
}

impl FeedbackState {
    pub fn is_empty(&self) -> bool {
        self.alignment.is_none()
            && self.rectangle.is_none()
            && self.dimension_lines.is_empty()
            && self.angle.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
