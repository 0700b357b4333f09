use serde::{Deserialize, Serialize};

use super::{ContentRef, HomeTexture, ItemId, TextStyle};
use crate::color::Color;
use crate::geometry::{polygon_contains_with_margin, rotated_rectangle, Point, Rect};

/// Reference to the 3D model of a piece, resolved by the icon renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRef {
    pub name: String,
    pub content: ContentRef,
}

/// Opening part of a door or window.
///
/// `x_axis` and `width` are ratios of the piece width, `y_axis` a ratio of
/// its depth. Angles are in radians, counter-clockwise as seen on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sash {
    pub x_axis: f32,
    pub y_axis: f32,
    pub width: f32,
    pub start_angle: f32,
    pub end_angle: f32,
}

/// Door or window attributes of a piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorOrWindow {
    /// Wall thickness as a ratio of the piece depth.
    pub wall_thickness: f32,
    /// Distance from the piece back to the wall, as a ratio of the piece depth.
    pub wall_distance: f32,
    #[serde(default)]
    pub sashes: Vec<Sash>,
}

impl Default for DoorOrWindow {
    fn default() -> Self {
        Self {
            wall_thickness: 1.0,
            wall_distance: 0.0,
            sashes: Vec::new(),
        }
    }
}

/// A piece of furniture, a door/window, a light or a group of pieces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Furniture {
    pub id: ItemId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub elevation: f32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub name_visible: bool,
    #[serde(default)]
    pub name_x_offset: f32,
    #[serde(default)]
    pub name_y_offset: f32,
    #[serde(default)]
    pub name_style: Option<TextStyle>,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub texture: Option<HomeTexture>,
    /// Flat icon viewed from top.
    #[serde(default)]
    pub plan_icon: Option<ContentRef>,
    #[serde(default)]
    pub model: Option<ModelRef>,
    #[serde(default)]
    pub model_mirrored: bool,
    #[serde(default = "default_true")]
    pub movable: bool,
    #[serde(default = "default_true")]
    pub resizable: bool,
    #[serde(default)]
    pub door_or_window: Option<DoorOrWindow>,
    /// Light power in `[0, 1]` for light sources.
    #[serde(default)]
    pub light_power: Option<f32>,
    /// Members of a furniture group.
    #[serde(default)]
    pub children: Vec<Furniture>,
    #[serde(default)]
    pub level: Option<ItemId>,
}

fn default_true() -> bool {
    true
}

impl Furniture {
    pub fn new(name: impl Into<String>, x: f32, y: f32, width: f32, depth: f32, height: f32) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            x,
            y,
            width,
            depth,
            height,
            angle: 0.0,
            elevation: 0.0,
            visible: true,
            name_visible: false,
            name_x_offset: 0.0,
            name_y_offset: 0.0,
            name_style: None,
            color: None,
            texture: None,
            plan_icon: None,
            model: None,
            model_mirrored: false,
            movable: true,
            resizable: true,
            door_or_window: None,
            light_power: None,
            children: Vec::new(),
            level: None,
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_elevation(mut self, elevation: f32) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_door_or_window(mut self, door_or_window: DoorOrWindow) -> Self {
        self.door_or_window = Some(door_or_window);
        self
    }

    pub fn at_level(mut self, level: ItemId) -> Self {
        self.level = Some(level);
        self
    }

    pub fn is_door_or_window(&self) -> bool {
        self.door_or_window.is_some()
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_light(&self) -> bool {
        self.light_power.is_some()
    }

    /// Elevation of the piece top above its level.
    pub fn top(&self) -> f32 {
        self.elevation + self.height
    }

    /// Rotated width x depth rectangle; the front edge runs from 2 to 3.
    pub fn points(&self) -> [Point; 4] {
        rotated_rectangle(self.x, self.y, self.width, self.depth, self.angle)
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_points(&self.points())
            .unwrap_or_else(|| Rect::new(self.x, self.y, 0.0, 0.0))
    }

    pub fn contains_point(&self, p: &Point, margin: f32) -> bool {
        polygon_contains_with_margin(&self.points(), p, margin)
    }

    pub fn name_location(&self) -> Point {
        Point::new(self.x + self.name_x_offset, self.y + self.name_y_offset)
    }

    /// This piece followed by all its group members, depth first.
    pub fn flatten(&self) -> Vec<&Furniture> {
        let mut all = vec![self];
        for child in &self.children {
            all.extend(child.flatten());
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_follow_angle() {
        let piece = Furniture::new("bed", 100.0, 100.0, 200.0, 100.0, 50.0);
        let pts = piece.points();
        assert_eq!(pts[0], Point::new(0.0, 50.0));
        assert_eq!(pts[2], Point::new(200.0, 150.0));
        assert_eq!(piece.bounds(), Rect::from_ltrb(0.0, 50.0, 200.0, 150.0));
        assert!(piece.contains_point(&Point::new(100.0, 100.0), 0.0));
    }

    #[test]
    fn test_flatten_group() {
        let mut group = Furniture::new("group", 0.0, 0.0, 10.0, 10.0, 10.0);
        let child = Furniture::new("chair", 0.0, 0.0, 5.0, 5.0, 5.0);
        let mut nested = Furniture::new("set", 0.0, 0.0, 5.0, 5.0, 5.0);
        nested.children.push(Furniture::new("cup", 0.0, 0.0, 1.0, 1.0, 1.0));
        group.children.push(child);
        group.children.push(nested);
        let names: Vec<_> = group.flatten().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["group", "chair", "set", "cup"]);
        assert!(group.is_group());
    }
}
