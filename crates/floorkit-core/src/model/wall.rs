use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use super::ItemId;
use crate::color::Color;
use crate::geometry::{line_intersection, Point};

/// Pattern used to fill wall areas in plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallPattern {
    /// Diagonal lines
    Hatch,
    /// Crossed diagonal lines
    CrossHatch,
    /// Regular dots
    Dots,
    /// Plain foreground fill
    Solid,
    /// Background fill only
    Empty,
}

impl Default for WallPattern {
    fn default() -> Self {
        Self::Hatch
    }
}

/// A straight or arc wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: ItemId,
    pub x_start: f32,
    pub y_start: f32,
    pub x_end: f32,
    pub y_end: f32,
    pub thickness: f32,
    /// Signed arc extent in radians, `None` for a straight wall.
    #[serde(default)]
    pub arc_extent: Option<f32>,
    /// Pattern override; the preferred wall pattern applies when unset.
    #[serde(default)]
    pub pattern: Option<WallPattern>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub wall_at_start: Option<ItemId>,
    #[serde(default)]
    pub wall_at_end: Option<ItemId>,
    #[serde(default)]
    pub level: Option<ItemId>,
}

impl Wall {
    pub fn new(x_start: f32, y_start: f32, x_end: f32, y_end: f32, thickness: f32) -> Self {
        Self {
            id: ItemId::new(),
            x_start,
            y_start,
            x_end,
            y_end,
            thickness,
            arc_extent: None,
            pattern: None,
            height: None,
            color: None,
            wall_at_start: None,
            wall_at_end: None,
            level: None,
        }
    }

    pub fn with_pattern(mut self, pattern: WallPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn with_arc_extent(mut self, arc_extent: f32) -> Self {
        self.arc_extent = Some(arc_extent);
        self
    }

    pub fn at_level(mut self, level: ItemId) -> Self {
        self.level = Some(level);
        self
    }

    pub fn start(&self) -> Point {
        Point::new(self.x_start, self.y_start)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x_end, self.y_end)
    }

    pub fn length(&self) -> f32 {
        self.start().distance(&self.end())
    }

    /// Pattern actually used to fill this wall.
    pub fn effective_pattern(&self, preferred: WallPattern) -> WallPattern {
        self.pattern.unwrap_or(preferred)
    }

    /// True for walls with a non negligible arc extent.
    pub fn is_arc(&self) -> bool {
        self.arc_extent
            .is_some_and(|extent| extent.abs() > 1e-3 && self.length() > 0.0)
    }

    /// Thickened outline ignoring joined walls.
    pub fn unjoined_points(&self) -> Vec<Point> {
        if self.is_arc() {
            self.arc_points()
        } else {
            self.rectangle().to_vec()
        }
    }

    /// Thickened outline mitred against the walls joined at its ends.
    ///
    /// `at_start` and `at_end` must be the walls referenced by
    /// `wall_at_start` / `wall_at_end`. Arc walls keep square ends.
    pub fn points_with_joins(&self, at_start: Option<&Wall>, at_end: Option<&Wall>) -> Vec<Point> {
        if self.is_arc() {
            return self.arc_points();
        }
        let mut points = self.rectangle();
        let limit = 2.0 * self.thickness;

        if let Some(other) = at_start.filter(|w| !w.is_arc()) {
            let o = other.rectangle();
            if other.wall_at_end == Some(self.id) {
                points[0] = mitre(points[0], points[1], o[1], o[0], limit);
                points[3] = mitre(points[3], points[2], o[2], o[3], limit);
            } else if other.wall_at_start == Some(self.id) {
                points[0] = mitre(points[0], points[1], o[2], o[3], limit);
                points[3] = mitre(points[3], points[2], o[0], o[1], limit);
            }
        }

        if let Some(other) = at_end.filter(|w| !w.is_arc()) {
            let o = other.rectangle();
            if other.wall_at_start == Some(self.id) {
                points[1] = mitre(points[1], points[0], o[0], o[1], limit);
                points[2] = mitre(points[2], points[3], o[3], o[2], limit);
            } else if other.wall_at_end == Some(self.id) {
                points[1] = mitre(points[1], points[0], o[3], o[2], limit);
                points[2] = mitre(points[2], points[3], o[0], o[1], limit);
            }
        }
        points.to_vec()
    }

    fn rectangle(&self) -> [Point; 4] {
        let angle = (self.y_end - self.y_start).atan2(self.x_end - self.x_start);
        let dx = angle.sin() * self.thickness / 2.0;
        let dy = angle.cos() * self.thickness / 2.0;
        [
            Point::new(self.x_start + dx, self.y_start - dy),
            Point::new(self.x_end + dx, self.y_end - dy),
            Point::new(self.x_end - dx, self.y_end + dy),
            Point::new(self.x_start - dx, self.y_start + dy),
        ]
    }

    /// Circle centre and radius of an arc wall's centre line.
    pub fn arc_circle(&self) -> Option<(Point, f32)> {
        let extent = self.arc_extent?;
        if !self.is_arc() {
            return None;
        }
        let chord = self.length();
        let radius = (chord / 2.0 / (extent / 2.0).sin()).abs();
        let mid = Point::new(
            (self.x_start + self.x_end) / 2.0,
            (self.y_start + self.y_end) / 2.0,
        );
        let angle = (self.y_end - self.y_start).atan2(self.x_end - self.x_start);
        // Centre sits on the chord's perpendicular bisector, on the side that
        // makes a sweep of `extent` from the start point land on the end point
        let offset = chord / 2.0 / (extent / 2.0).tan();
        let center = Point::new(
            mid.x - angle.sin() * offset,
            mid.y + angle.cos() * offset,
        );
        Some((center, radius))
    }

    fn arc_points(&self) -> Vec<Point> {
        let Some((center, radius)) = self.arc_circle() else {
            return self.rectangle().to_vec();
        };
        let extent = self.arc_extent.unwrap_or(0.0);
        let start_angle = (self.y_start - center.y).atan2(self.x_start - center.x);
        let steps = ((extent.abs() / (PI / 36.0)).ceil() as usize).max(2);
        let half = self.thickness / 2.0;
        let sample = |r: f32, i: usize| {
            let a = start_angle + extent * i as f32 / steps as f32;
            Point::new(center.x + r * a.cos(), center.y + r * a.sin())
        };
        let mut points = Vec::with_capacity(2 * (steps + 1));
        for i in 0..=steps {
            points.push(sample(radius + half, i));
        }
        for i in (0..=steps).rev() {
            points.push(sample((radius - half).max(0.0), i));
        }
        points
    }
}

/// Moves `p1` to the intersection of lines (p1,p2) and (p3,p4) when that
/// intersection is closer than `limit`.
fn mitre(p1: Point, p2: Point, p3: Point, p4: Point, limit: f32) -> Point {
    match line_intersection(&p1, &p2, &p3, &p4) {
        Some(i) if i.distance_sq(&p1) < limit * limit => i,
        _ => p1,
    }
}
