use serde::{Deserialize, Serialize};

use super::ItemId;
use crate::geometry::Point;

/// Font attributes of a plan text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size: f32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl TextStyle {
    pub const fn new(font_size: f32) -> Self {
        Self {
            font_size,
            bold: false,
            italic: false,
        }
    }

    pub const fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub const fn italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }

    /// Same style at another size.
    pub fn derive_font_size(&self, font_size: f32) -> Self {
        Self { font_size, ..*self }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(18.0)
    }
}

/// Free text placed in the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: ItemId,
    pub text: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub style: Option<TextStyle>,
    #[serde(default)]
    pub level: Option<ItemId>,
}

impl Label {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            id: ItemId::new(),
            text: text.into(),
            x,
            y,
            style: None,
            level: None,
        }
    }

    pub fn at_level(mut self, level: ItemId) -> Self {
        self.level = Some(level);
        self
    }

    /// A label is located by its text anchor only.
    pub fn points(&self) -> [Point; 1] {
        [Point::new(self.x, self.y)]
    }
}
