use serde::{Deserialize, Serialize};

use super::{ItemId, TextStyle};
use crate::geometry::Point;

/// A measured segment drawn with its length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionLine {
    pub id: ItemId,
    pub x_start: f32,
    pub y_start: f32,
    pub x_end: f32,
    pub y_end: f32,
    /// Distance between the measured points and the drawn line.
    #[serde(default)]
    pub offset: f32,
    #[serde(default)]
    pub length_style: Option<TextStyle>,
    #[serde(default)]
    pub level: Option<ItemId>,
}

impl DimensionLine {
    pub fn new(x_start: f32, y_start: f32, x_end: f32, y_end: f32, offset: f32) -> Self {
        Self {
            id: ItemId::new(),
            x_start,
            y_start,
            x_end,
            y_end,
            offset,
            length_style: None,
            level: None,
        }
    }

    pub fn at_level(mut self, level: ItemId) -> Self {
        self.level = Some(level);
        self
    }

    pub fn length(&self) -> f32 {
        (self.x_end - self.x_start).hypot(self.y_end - self.y_start)
    }

    /// Angle of the measured segment.
    pub fn angle(&self) -> f32 {
        (self.y_end - self.y_start).atan2(self.x_end - self.x_start)
    }

    /// Start, start + offset, end + offset, end.
    pub fn points(&self) -> [Point; 4] {
        let angle = self.angle();
        let dx = -angle.sin() * self.offset;
        let dy = angle.cos() * self.offset;
        [
            Point::new(self.x_start, self.y_start),
            Point::new(self.x_start + dx, self.y_start + dy),
            Point::new(self.x_end + dx, self.y_end + dy),
            Point::new(self.x_end, self.y_end),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_points() {
        let line = DimensionLine::new(0.0, 0.0, 100.0, 0.0, 20.0);
        let pts = line.points();
        assert_eq!(line.length(), 100.0);
        assert!((pts[1].y - 20.0).abs() < 1e-5);
        assert!((pts[2].x - 100.0).abs() < 1e-4);
        assert!((pts[2].y - 20.0).abs() < 1e-5);
    }
}
