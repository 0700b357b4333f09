//! Plan model snapshot types
//!
//! Items are owned by the host application. The renderer only reads them
//! through an immutable [`PlanModel`] snapshot and is told about changes
//! through [`crate::event_bus::PlanEvent`]s.

mod camera;
mod compass;
mod dimension;
mod furniture;
mod label;
mod level;
mod plan;
mod room;
mod selection;
mod wall;

pub use camera::Camera;
pub use compass::Compass;
pub use dimension::DimensionLine;
pub use furniture::{DoorOrWindow, Furniture, ModelRef, Sash};
pub use label::{Label, TextStyle};
pub use level::{BackgroundImage, Level};
pub use plan::PlanModel;
pub use room::Room;
pub use selection::Selection;
pub use wall::{Wall, WallPattern};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::geometry::Point;

/// Stable identity of a plan item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Create a new unique item ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Item({})", &self.0.to_string()[..8])
    }
}

/// Opaque binary content supplied by the host (encoded images).
///
/// `key` identifies the content for caching; two refs with the same key are
/// assumed to hold the same bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRef {
    pub key: String,
    pub data: Arc<Vec<u8>>,
}

impl ContentRef {
    pub fn new(key: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            data: Arc::new(data),
        }
    }
}

impl PartialEq for ContentRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

/// Repeating texture with its size in model units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeTexture {
    pub name: String,
    pub image: ContentRef,
    pub width: f32,
    pub height: f32,
}

/// Kind of a plan item, used for event categories and alignment rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Wall,
    Room,
    Furniture,
    DimensionLine,
    Label,
    Compass,
    Camera,
}

/// Borrowed view of any plan item.
#[derive(Debug, Clone, Copy)]
pub enum ItemRef<'a> {
    Wall(&'a Wall),
    Room(&'a Room),
    Furniture(&'a Furniture),
    DimensionLine(&'a DimensionLine),
    Label(&'a Label),
    Compass(&'a Compass),
    Camera(&'a Camera),
}

impl<'a> ItemRef<'a> {
    pub fn id(&self) -> ItemId {
        match self {
            ItemRef::Wall(w) => w.id,
            ItemRef::Room(r) => r.id,
            ItemRef::Furniture(f) => f.id,
            ItemRef::DimensionLine(d) => d.id,
            ItemRef::Label(l) => l.id,
            ItemRef::Compass(c) => c.id,
            ItemRef::Camera(c) => c.id,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            ItemRef::Wall(_) => ItemKind::Wall,
            ItemRef::Room(_) => ItemKind::Room,
            ItemRef::Furniture(_) => ItemKind::Furniture,
            ItemRef::DimensionLine(_) => ItemKind::DimensionLine,
            ItemRef::Label(_) => ItemKind::Label,
            ItemRef::Compass(_) => ItemKind::Compass,
            ItemRef::Camera(_) => ItemKind::Camera,
        }
    }

    /// Level the item belongs to; `None` for items shown on every level.
    pub fn level(&self) -> Option<ItemId> {
        match self {
            ItemRef::Wall(w) => w.level,
            ItemRef::Room(r) => r.level,
            ItemRef::Furniture(f) => f.level,
            ItemRef::DimensionLine(d) => d.level,
            ItemRef::Label(l) => l.level,
            ItemRef::Compass(_) | ItemRef::Camera(_) => None,
        }
    }

    /// Outline points without wall joins. Use [`PlanModel::item_points`]
    /// for walls joined to their neighbours.
    pub fn points(&self) -> Vec<Point> {
        match self {
            ItemRef::Wall(w) => w.unjoined_points(),
            ItemRef::Room(r) => r.points.clone(),
            ItemRef::Furniture(f) => f.points().to_vec(),
            ItemRef::DimensionLine(d) => d.points().to_vec(),
            ItemRef::Label(l) => l.points().to_vec(),
            ItemRef::Compass(c) => c.points().to_vec(),
            ItemRef::Camera(c) => c.points().to_vec(),
        }
    }
}
