use serde::{Deserialize, Serialize};

use super::{HomeTexture, ItemId, TextStyle};
use crate::color::Color;
use crate::geometry::{polygon_contains_with_margin, polygon_signed_area, Point, Rect};

/// A room polygon with its floor/ceiling appearance and texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: ItemId,
    pub points: Vec<Point>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_x_offset: f32,
    #[serde(default = "default_name_y_offset")]
    pub name_y_offset: f32,
    #[serde(default)]
    pub name_style: Option<TextStyle>,
    #[serde(default = "default_true")]
    pub area_visible: bool,
    #[serde(default)]
    pub area_x_offset: f32,
    #[serde(default = "default_area_y_offset")]
    pub area_y_offset: f32,
    #[serde(default)]
    pub area_style: Option<TextStyle>,
    #[serde(default = "default_true")]
    pub floor_visible: bool,
    #[serde(default = "default_true")]
    pub ceiling_visible: bool,
    #[serde(default)]
    pub floor_color: Option<Color>,
    #[serde(default)]
    pub floor_texture: Option<HomeTexture>,
    #[serde(default)]
    pub level: Option<ItemId>,
}

fn default_true() -> bool {
    true
}

fn default_name_y_offset() -> f32 {
    -40.0
}

fn default_area_y_offset() -> f32 {
    0.0
}

impl Room {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            id: ItemId::new(),
            points,
            name: None,
            name_x_offset: 0.0,
            name_y_offset: default_name_y_offset(),
            name_style: None,
            area_visible: true,
            area_x_offset: 0.0,
            area_y_offset: default_area_y_offset(),
            area_style: None,
            floor_visible: true,
            ceiling_visible: true,
            floor_color: None,
            floor_texture: None,
            level: None,
        }
    }

    /// Axis aligned rectangle room, handy for fixtures.
    pub fn rectangle(x: f32, y: f32, width: f32, depth: f32) -> Self {
        Self::new(Rect::new(x, y, width, depth).corners().to_vec())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_floor_color(mut self, color: Color) -> Self {
        self.floor_color = Some(color);
        self
    }

    pub fn with_visibility(mut self, floor_visible: bool, ceiling_visible: bool) -> Self {
        self.floor_visible = floor_visible;
        self.ceiling_visible = ceiling_visible;
        self
    }

    pub fn at_level(mut self, level: ItemId) -> Self {
        self.level = Some(level);
        self
    }

    pub fn bounds(&self) -> Option<Rect> {
        Rect::from_points(&self.points)
    }

    /// Centre of the bounding box, anchor of the name and area texts.
    pub fn center(&self) -> Point {
        self.bounds().map(|b| b.center()).unwrap_or_default()
    }

    /// Surface of the room polygon.
    pub fn area(&self) -> f32 {
        polygon_signed_area(&self.points).abs()
    }

    pub fn is_clockwise(&self) -> bool {
        polygon_signed_area(&self.points) < 0.0
    }

    pub fn contains_point(&self, p: &Point, margin: f32) -> bool {
        polygon_contains_with_margin(&self.points, p, margin)
    }

    pub fn name_location(&self) -> Point {
        let c = self.center();
        Point::new(c.x + self.name_x_offset, c.y + self.name_y_offset)
    }

    pub fn area_location(&self) -> Point {
        let c = self.center();
        Point::new(c.x + self.area_x_offset, c.y + self.area_y_offset)
    }
}
