use serde::{Deserialize, Serialize};

use super::ItemId;
use crate::geometry::{rotated_rectangle, Point};

const FIXED_WIDTH: f32 = 46.6;
const FIXED_DEPTH: f32 = 18.6;

/// Observer camera drawn as a small person looking along `yaw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: ItemId,
    pub x: f32,
    pub y: f32,
    /// Eye elevation.
    pub z: f32,
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
    pub field_of_view: f32,
    /// Keeps a constant marker size whatever the eye elevation.
    #[serde(default)]
    pub fixed_size: bool,
}

impl Camera {
    pub fn new(x: f32, y: f32, z: f32, yaw: f32) -> Self {
        Self {
            id: ItemId::new(),
            x,
            y,
            z,
            yaw,
            pitch: 0.0,
            field_of_view: 63f32.to_radians(),
            fixed_size: false,
        }
    }

    pub fn width(&self) -> f32 {
        if self.fixed_size {
            FIXED_WIDTH
        } else {
            (self.z * 4.0 / 14.0).clamp(20.0, 62.5)
        }
    }

    pub fn depth(&self) -> f32 {
        if self.fixed_size {
            FIXED_DEPTH
        } else {
            (self.z * 8.0 / 70.0).clamp(8.0, 25.0)
        }
    }

    pub fn points(&self) -> [Point; 4] {
        rotated_rectangle(self.x, self.y, self.width(), self.depth(), self.yaw)
    }
}
