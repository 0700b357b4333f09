//! Outlines of derived plan shapes.
//!
//! Door and window sashes, the camera silhouette, the compass rose and the
//! selection indicator glyphs. Item outlines are in model coordinates;
//! glyphs are in pixels and scaled by the painter.

use floorkit_core::model::{Camera, Compass, DoorOrWindow, Furniture, Sash};
use floorkit_core::{Point, Rect};
use lyon::math::point;
use lyon::path::Path;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use crate::area::PlanArea;

const SEGMENTS_PER_TURN: f32 = 48.0;

/// Points of an elliptic arc. Angles are radians in model space, so a
/// positive `extent` turns clockwise on screen.
pub fn arc_points(center: Point, rx: f32, ry: f32, start: f32, extent: f32) -> Vec<Point> {
    let steps = ((extent.abs() / TAU) * SEGMENTS_PER_TURN).ceil().max(2.0) as usize;
    (0..=steps)
        .map(|i| {
            let a = start + extent * i as f32 / steps as f32;
            Point::new(center.x + rx * a.cos(), center.y + ry * a.sin())
        })
        .collect()
}

/// Polygon approximating an ellipse centred on `center`.
pub fn ellipse_points(center: Point, rx: f32, ry: f32) -> Vec<Point> {
    let mut points = arc_points(center, rx, ry, 0.0, TAU);
    points.pop();
    points
}

fn transform_points(points: &mut [Point], dx: f32, dy: f32, angle: f32) {
    let (sin, cos) = angle.sin_cos();
    for p in points.iter_mut() {
        *p = Point::new(p.x * cos - p.y * sin + dx, p.x * sin + p.y * cos + dy);
    }
}

/// Rectangle of a door or window where it crosses its wall.
pub fn wall_intersection_outline(piece: &Furniture, door_or_window: &DoorOrWindow) -> [Point; 4] {
    let thickness = piece.depth * door_or_window.wall_thickness;
    let distance = piece.depth * door_or_window.wall_distance;
    let rect = Rect::new(
        piece.x - piece.width / 2.0,
        piece.y - piece.depth / 2.0 + distance,
        piece.width,
        thickness,
    );
    let center = Point::new(piece.x, piece.y);
    rect.corners().map(|p| p.rotated_about(&center, piece.angle))
}

/// Closed pie outline swept by a sash.
///
/// Sash angles are measured counter-clockwise on screen from the piece's
/// local x axis; a mirrored model flips the sash about the piece's depth axis.
pub fn sash_outline(piece: &Furniture, sash: &Sash) -> Vec<Point> {
    let sign = if piece.model_mirrored { -1.0 } else { 1.0 };
    let center = Point::new(sign * sash.x_axis * piece.width, sash.y_axis * piece.depth);
    let radius = sash.width * piece.width;
    let mut start = sash.start_angle;
    if piece.model_mirrored {
        start = PI - start;
    }
    let extent = sign * (sash.end_angle - sash.start_angle);

    // Screen counter-clockwise angles are negative model angles.
    let mut points = vec![center];
    points.extend(arc_points(center, radius, radius, -start, -extent));
    for p in points.iter_mut() {
        p.x -= sign * piece.width / 2.0;
        p.y -= piece.depth / 2.0;
    }
    transform_points(&mut points, piece.x, piece.y, piece.angle);
    points
}

/// Bounds of every sash of a door or window.
pub fn sashes_bounds(piece: &Furniture) -> Option<Rect> {
    let door_or_window = piece.door_or_window.as_ref()?;
    door_or_window
        .sashes
        .iter()
        .filter_map(|sash| Rect::from_points(&sash_outline(piece, sash)))
        .reduce(|a, b| a.union(&b))
}

/// Camera silhouette in the camera's local frame, scaled to its size.
///
/// Returns the body and the head. The local frame has the camera at the
/// origin looking toward positive y; callers rotate it by the yaw.
pub fn camera_silhouette(camera: &Camera) -> (PlanArea, PlanArea) {
    let (sx, sy) = (camera.width(), camera.depth());
    let scaled = |points: Vec<Point>| -> Vec<Point> {
        points.into_iter().map(|p| Point::new(p.x * sx, p.y * sy)).collect()
    };
    let body = [
        scaled(ellipse_points(Point::new(0.0, 0.0), 0.5, 0.425)),
        scaled(ellipse_points(Point::new(-0.38, 0.0), 0.12, 0.3)),
        scaled(ellipse_points(Point::new(0.38, 0.0), 0.12, 0.3)),
    ];
    let head = [
        scaled(ellipse_points(Point::new(0.0, 0.05), 0.18, 0.5)),
        scaled(vec![
            Point::new(-0.04, 0.55),
            Point::new(0.0, 0.65),
            Point::new(0.04, 0.55),
        ]),
    ];
    (
        PlanArea::union_of(body.iter().map(Vec::as_slice)),
        PlanArea::union_of(head.iter().map(Vec::as_slice)),
    )
}

/// Field of view edges in the camera's local frame.
pub fn camera_field_of_view(camera: &Camera) -> [(Point, Point); 2] {
    let depth = camera.depth();
    let (sin, cos) = (camera.field_of_view / 2.0).sin_cos();
    let near = Point::new(0.9 * depth * sin, 0.9 * depth * cos);
    let far = Point::new(2.2 * depth * sin, 2.2 * depth * cos);
    [
        (near, far),
        (Point::new(-near.x, near.y), Point::new(-far.x, far.y)),
    ]
}

/// Compass rose parts in the compass's local frame, north up before rotation.
pub struct CompassRose {
    pub circle: Vec<Point>,
    pub ticks: Vec<(Point, Point)>,
    pub north_arrow: [Point; 3],
}

pub fn compass_rose(compass: &Compass) -> CompassRose {
    let radius = compass.diameter / 2.0;
    let ticks = (0..8)
        .map(|i| {
            let angle = i as f32 * FRAC_PI_4;
            let inner = if i % 2 == 0 { 0.6 } else { 0.8 };
            let (sin, cos) = angle.sin_cos();
            (
                Point::new(radius * inner * cos, radius * inner * sin),
                Point::new(radius * cos, radius * sin),
            )
        })
        .collect();
    CompassRose {
        circle: ellipse_points(Point::new(0.0, 0.0), radius, radius),
        ticks,
        north_arrow: [
            Point::new(0.0, -radius),
            Point::new(radius * 0.2, -radius * 0.2),
            Point::new(-radius * 0.2, -radius * 0.2),
        ],
    }
}

/// Selection indicator glyphs, drawn in pixel units around their anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Rotation,
    Elevation,
    Height,
    Resize,
    Power,
    WallOrientation,
    LineResize,
    DimensionLineEnd,
    TextLocation,
    CameraYaw,
    CameraPitch,
    CameraElevation,
}

struct GlyphBuilder {
    builder: lyon::path::path::Builder,
}

impl GlyphBuilder {
    fn new() -> Self {
        Self {
            builder: Path::builder(),
        }
    }

    fn polyline(&mut self, points: &[(f32, f32)]) -> &mut Self {
        if let Some((first, rest)) = points.split_first() {
            self.builder.begin(point(first.0, first.1));
            for p in rest {
                self.builder.line_to(point(p.0, p.1));
            }
            self.builder.end(false);
        }
        self
    }

    fn closed(&mut self, points: &[Point]) -> &mut Self {
        if let Some((first, rest)) = points.split_first() {
            self.builder.begin(point(first.x, first.y));
            for p in rest {
                self.builder.line_to(point(p.x, p.y));
            }
            self.builder.end(true);
        }
        self
    }

    fn open(&mut self, points: &[Point]) -> &mut Self {
        let pairs: Vec<(f32, f32)> = points.iter().map(|p| (p.x, p.y)).collect();
        self.polyline(&pairs)
    }

    fn square(&mut self, half: f32) -> &mut Self {
        self.closed(&Rect::new(-half, -half, half * 2.0, half * 2.0).corners())
    }

    fn build(self) -> Path {
        self.builder.build()
    }
}

fn origin() -> Point {
    Point::new(0.0, 0.0)
}

/// Path of `indicator` in pixel units.
pub fn indicator_path(indicator: Indicator) -> Path {
    let mut g = GlyphBuilder::new();
    match indicator {
        Indicator::Rotation => {
            g.closed(&ellipse_points(origin(), 1.5, 1.5))
                .open(&arc_points(origin(), 8.0, 8.0, -FRAC_PI_4, -PI))
                .polyline(&[(2.66, -5.66), (5.66, -5.66), (4.0, -8.3)]);
        }
        Indicator::Elevation => {
            g.square(1.5)
                .polyline(&[(0.0, -5.0), (0.0, 5.0)])
                .polyline(&[(-2.5, 5.0), (2.5, 5.0)])
                .polyline(&[(-1.2, 1.5), (0.0, 4.5), (1.2, 1.5)]);
        }
        Indicator::Height => {
            g.square(1.5)
                .polyline(&[(0.0, -6.0), (0.0, 6.0)])
                .polyline(&[(-2.5, -6.0), (2.5, -6.0)])
                .polyline(&[(-2.5, 6.0), (2.5, 6.0)])
                .polyline(&[(-1.2, -2.5), (0.0, -5.5), (1.2, -2.5)])
                .polyline(&[(-1.2, 2.5), (0.0, 5.5), (1.2, 2.5)]);
        }
        Indicator::Resize => {
            g.square(1.5)
                .polyline(&[(5.0, -4.0), (7.0, -4.0), (7.0, 7.0), (-4.0, 7.0), (-4.0, 5.0)])
                .polyline(&[(3.5, 3.5), (9.0, 9.0)])
                .polyline(&[(7.0, 9.5), (10.0, 10.0), (9.5, 7.0)]);
        }
        Indicator::Power => {
            g.open(&arc_points(origin(), 5.0, 5.0, -FRAC_PI_2 + 0.6, TAU - 1.2))
                .polyline(&[(0.0, -7.0), (0.0, -1.0)]);
        }
        Indicator::WallOrientation => {
            g.polyline(&[(-4.0, -4.0), (4.0, 0.0), (-4.0, 4.0)]);
        }
        Indicator::LineResize => {
            g.polyline(&[(5.0, -2.0), (5.0, 2.0)])
                .polyline(&[(6.0, 0.0), (11.0, 0.0)])
                .polyline(&[(8.7, -1.8), (12.0, 0.0), (8.7, 1.8)]);
        }
        Indicator::DimensionLineEnd => {
            g.polyline(&[(-5.0, 5.0), (5.0, -5.0)])
                .polyline(&[(0.0, 5.0), (0.0, -5.0)]);
        }
        Indicator::TextLocation => {
            g.open(&arc_points(Point::new(0.0, 2.0), 2.0, 2.0, PI * 0.05, PI * 0.9))
                .polyline(&[(0.0, 4.0), (0.0, 12.0)])
                .polyline(&[(-1.2, 8.5), (0.0, 11.5), (1.2, 8.5)])
                .polyline(&[(2.0, 3.0), (9.0, 6.0)])
                .polyline(&[(6.0, 6.5), (10.0, 7.0), (7.5, 3.5)])
                .polyline(&[(-2.0, 3.0), (-9.0, 6.0)])
                .polyline(&[(-6.0, 6.5), (-10.0, 7.0), (-7.5, 3.5)]);
        }
        Indicator::CameraYaw => {
            // Rotation glyph turned 45 degrees counter-clockwise.
            let mut arc = arc_points(origin(), 8.0, 8.0, -FRAC_PI_4, -PI);
            let mut arrow = vec![
                Point::new(2.66, -5.66),
                Point::new(5.66, -5.66),
                Point::new(4.0, -8.3),
            ];
            transform_points(&mut arc, 0.0, 0.0, -FRAC_PI_4);
            transform_points(&mut arrow, 0.0, 0.0, -FRAC_PI_4);
            g.closed(&ellipse_points(origin(), 1.5, 1.5))
                .open(&arc)
                .open(&arrow);
        }
        Indicator::CameraPitch => {
            g.closed(&ellipse_points(origin(), 1.5, 1.5))
                .polyline(&[(4.5, 0.0), (5.2, 0.0)])
                .polyline(&[(9.0, 0.0), (10.0, 0.0)])
                .open(&arc_points(Point::new(9.5, 0.0), 2.5, 8.0, -0.35, -5.6))
                .polyline(&[(10.0, 4.5), (12.3, 2.0), (12.8, 5.8)]);
        }
        Indicator::CameraElevation => {
            g.closed(&ellipse_points(origin(), 1.5, 1.5))
                .polyline(&[(0.0, -6.0), (0.0, 6.0)])
                .polyline(&[(-1.2, -2.5), (0.0, -5.5), (1.2, -2.5)])
                .polyline(&[(-1.2, 2.5), (0.0, 5.5), (1.2, 2.5)]);
        }
    }
    g.build()
}
