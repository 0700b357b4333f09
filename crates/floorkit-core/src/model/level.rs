use serde::{Deserialize, Serialize};

use super::{ContentRef, ItemId};
use crate::geometry::Rect;

/// Image drawn under the plan, scaled from a known distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub image: ContentRef,
    /// Model length of the reference segment.
    pub scale_distance: f32,
    /// Reference segment, in image pixels.
    pub scale_distance_x_start: f32,
    pub scale_distance_y_start: f32,
    pub scale_distance_x_end: f32,
    pub scale_distance_y_end: f32,
    /// Image pixel placed at the model origin.
    #[serde(default)]
    pub x_origin: f32,
    #[serde(default)]
    pub y_origin: f32,
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

impl BackgroundImage {
    /// Model units per image pixel.
    pub fn scale(&self) -> f32 {
        let pixels = (self.scale_distance_x_end - self.scale_distance_x_start)
            .hypot(self.scale_distance_y_end - self.scale_distance_y_start);
        if pixels > 0.0 {
            self.scale_distance / pixels
        } else {
            1.0
        }
    }

    /// Model rectangle covered by a `width` x `height` pixel image.
    pub fn bounds(&self, width: u32, height: u32) -> Rect {
        let scale = self.scale();
        Rect::from_ltrb(
            -self.x_origin,
            -self.y_origin,
            width as f32 * scale - self.x_origin,
            height as f32 * scale - self.y_origin,
        )
    }
}

/// A building storey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: ItemId,
    pub name: String,
    pub elevation: f32,
    pub floor_thickness: f32,
    pub height: f32,
    /// Tie-break between levels at the same elevation.
    #[serde(default)]
    pub elevation_index: i32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub background_image: Option<BackgroundImage>,
}

impl Level {
    pub fn new(name: impl Into<String>, elevation: f32, floor_thickness: f32, height: f32) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            elevation,
            floor_thickness,
            height,
            elevation_index: 0,
            visible: true,
            background_image: None,
        }
    }

    pub fn with_elevation_index(mut self, elevation_index: i32) -> Self {
        self.elevation_index = elevation_index;
        self
    }

    /// Sort key of levels from bottom to top.
    pub fn order_key(&self) -> (f32, i32) {
        (self.elevation, self.elevation_index)
    }

    /// True when this level sorts strictly below `other`.
    pub fn is_below(&self, other: &Level) -> bool {
        self.elevation < other.elevation
            || (self.elevation == other.elevation && self.elevation_index < other.elevation_index)
    }
}
