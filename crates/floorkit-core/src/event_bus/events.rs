//! Change notifications for the plan model.
//!
//! One variant per observed entity kind, each carrying a typed property so
//! consumers decide what to invalidate with an exhaustive `match`.

use serde::{Deserialize, Serialize};

use crate::model::{ItemId, ItemKind};

/// Root event enum for all plan model changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanEvent {
    /// A wall property changed
    Wall { id: ItemId, property: WallProperty },
    /// A room property changed
    Room { id: ItemId, property: RoomProperty },
    /// A furniture property changed
    Furniture {
        id: ItemId,
        property: FurnitureProperty,
    },
    /// A dimension line property changed
    DimensionLine {
        id: ItemId,
        property: DimensionLineProperty,
    },
    /// A label property changed
    Label { id: ItemId, property: LabelProperty },
    /// The compass changed
    Compass { property: CompassProperty },
    /// The observer camera moved or changed
    Camera { property: CameraProperty },
    /// A level property changed
    Level { id: ItemId, property: LevelProperty },
    /// The home wide background image changed
    HomeBackgroundImage,
    /// An item was added to or removed from its collection
    Collection {
        kind: ItemKind,
        id: ItemId,
        change: CollectionChange,
    },
    /// The selected items changed
    Selection,
    /// Another level was selected
    SelectedLevel,
    /// A user preference changed
    Preferences(PreferenceChange),
}

impl PlanEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            PlanEvent::Wall { .. }
            | PlanEvent::Room { .. }
            | PlanEvent::Furniture { .. }
            | PlanEvent::DimensionLine { .. }
            | PlanEvent::Label { .. }
            | PlanEvent::Compass { .. }
            | PlanEvent::Camera { .. } => EventCategory::Item,
            PlanEvent::Level { .. } | PlanEvent::HomeBackgroundImage | PlanEvent::SelectedLevel => {
                EventCategory::Level
            }
            PlanEvent::Collection { .. } => EventCategory::Collection,
            PlanEvent::Selection => EventCategory::Selection,
            PlanEvent::Preferences(_) => EventCategory::Preferences,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            PlanEvent::Wall { id, property } => format!("Wall {} {:?} changed", id, property),
            PlanEvent::Room { id, property } => format!("Room {} {:?} changed", id, property),
            PlanEvent::Furniture { id, property } => {
                format!("Furniture {} {:?} changed", id, property)
            }
            PlanEvent::DimensionLine { id, property } => {
                format!("Dimension line {} {:?} changed", id, property)
            }
            PlanEvent::Label { id, property } => format!("Label {} {:?} changed", id, property),
            PlanEvent::Compass { property } => format!("Compass {:?} changed", property),
            PlanEvent::Camera { property } => format!("Camera {:?} changed", property),
            PlanEvent::Level { id, property } => format!("Level {} {:?} changed", id, property),
            PlanEvent::HomeBackgroundImage => "Background image changed".to_string(),
            PlanEvent::Collection { kind, id, change } => {
                format!("{:?} {} {:?}", kind, id, change)
            }
            PlanEvent::Selection => "Selection changed".to_string(),
            PlanEvent::SelectedLevel => "Selected level changed".to_string(),
            PlanEvent::Preferences(change) => format!("Preference {:?} changed", change),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Property changes of plan items.
    Item,
    /// Level changes, including level selection.
    Level,
    /// Items added or removed.
    Collection,
    /// Selection changes.
    Selection,
    /// User preference changes.
    Preferences,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Item => write!(f, "Item"),
            EventCategory::Level => write!(f, "Level"),
            EventCategory::Collection => write!(f, "Collection"),
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::Preferences => write!(f, "Preferences"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionChange {
    Added,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallProperty {
    XStart,
    YStart,
    XEnd,
    YEnd,
    WallAtStart,
    WallAtEnd,
    Thickness,
    ArcExtent,
    Pattern,
    Level,
    Height,
    Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomProperty {
    Points,
    Level,
    Name,
    NameOffset,
    NameStyle,
    AreaVisible,
    AreaOffset,
    AreaStyle,
    FloorVisible,
    CeilingVisible,
    FloorColor,
    FloorTexture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FurnitureProperty {
    X,
    Y,
    Angle,
    Width,
    Depth,
    Height,
    Elevation,
    Level,
    Visible,
    Name,
    NameVisible,
    NameOffset,
    NameStyle,
    Color,
    Texture,
    ModelMirrored,
    PlanIcon,
    Model,
    LightPower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimensionLineProperty {
    XStart,
    YStart,
    XEnd,
    YEnd,
    Offset,
    LengthStyle,
    Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelProperty {
    Text,
    X,
    Y,
    Style,
    Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassProperty {
    X,
    Y,
    Diameter,
    NorthDirection,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraProperty {
    X,
    Y,
    Z,
    Yaw,
    Pitch,
    FieldOfView,
    FixedSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelProperty {
    Name,
    Elevation,
    ElevationIndex,
    FloorThickness,
    Height,
    Visible,
    BackgroundImage,
}

/// User preferences that affect the plan display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreferenceChange {
    /// Length unit used for texts, grid and magnetism.
    Unit,
    /// Grid shown or hidden.
    GridVisible,
    /// Default text styles.
    TextStyles,
    /// Background, foreground or selection colour.
    Colors,
    /// Default wall pattern.
    WallPattern,
    /// Furniture drawn with top view icons instead of flat icons.
    FurnitureViewedFromTop,
    /// Room floors painted with their colour or texture.
    RoomFloorColoredOrTextured,
    /// Magnetism toggled.
    Magnetism,
}
