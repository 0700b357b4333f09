use serde::{Deserialize, Serialize};

use super::ItemId;
use crate::geometry::{rotated_rectangle, Point};

/// Compass rose shown on every level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compass {
    pub id: ItemId,
    pub x: f32,
    pub y: f32,
    pub diameter: f32,
    /// Angle of north, in radians, clockwise from the top of the plan.
    #[serde(default)]
    pub north_direction: f32,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Compass {
    pub fn new(x: f32, y: f32, diameter: f32) -> Self {
        Self {
            id: ItemId::new(),
            x,
            y,
            diameter,
            north_direction: 0.0,
            visible: true,
        }
    }

    pub fn points(&self) -> [Point; 4] {
        rotated_rectangle(self.x, self.y, self.diameter, self.diameter, self.north_direction)
    }
}
