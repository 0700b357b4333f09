use serde::{Deserialize, Serialize};

use super::{
    BackgroundImage, Camera, Compass, DimensionLine, Furniture, ItemId, ItemRef, Label, Level,
    Room, Selection, Wall,
};
use crate::geometry::Point;

/// Immutable snapshot of everything the plan displays.
///
/// The host builds a new snapshot after each edit and hands it to the view
/// as an `Arc<PlanModel>`. Nothing in this crate mutates a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanModel {
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub selected_level: Option<ItemId>,
    #[serde(default)]
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub furniture: Vec<Furniture>,
    #[serde(default)]
    pub dimension_lines: Vec<DimensionLine>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub compass: Option<Compass>,
    #[serde(default)]
    pub observer_camera: Option<Camera>,
    /// Home wide background image, used when the selected level has none.
    #[serde(default)]
    pub background_image: Option<BackgroundImage>,
    #[serde(default)]
    pub selection: Selection,
}

impl PlanModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a snapshot from its JSON form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn level(&self, id: ItemId) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn selected_level(&self) -> Option<&Level> {
        self.selected_level.and_then(|id| self.level(id))
    }

    /// Levels from bottom to top.
    pub fn sorted_levels(&self) -> Vec<&Level> {
        let mut levels: Vec<&Level> = self.levels.iter().collect();
        levels.sort_by(|a, b| {
            a.order_key()
                .partial_cmp(&b.order_key())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        levels
    }

    /// Visible level just below the selected one, source of the ghost overlay.
    pub fn other_level(&self) -> Option<&Level> {
        let selected = self.selected_level()?;
        self.sorted_levels()
            .into_iter()
            .filter(|l| l.visible && l.id != selected.id && l.is_below(selected))
            .last()
    }

    /// True when an item stored at `item_level` shows on level `level`.
    ///
    /// Items without level show everywhere. Items of a level sharing the
    /// target's elevation with a smaller elevation index show too.
    pub fn is_at_level(&self, item_level: Option<ItemId>, level: Option<ItemId>) -> bool {
        match (item_level, level) {
            (None, _) | (_, None) => true,
            (Some(a), Some(b)) if a == b => true,
            (Some(a), Some(b)) => match (self.level(a), self.level(b)) {
                (Some(a), Some(b)) => {
                    a.elevation == b.elevation && a.elevation_index < b.elevation_index
                }
                _ => false,
            },
        }
    }

    /// Level membership of a piece, which also shows on upper levels it crosses.
    pub fn is_furniture_at_level(&self, piece: &Furniture, level: Option<ItemId>) -> bool {
        if self.is_at_level(piece.level, level) {
            return true;
        }
        match (piece.level.and_then(|id| self.level(id)), level.and_then(|id| self.level(id))) {
            (Some(own), Some(target)) => {
                own.elevation < target.elevation && own.elevation + piece.top() > target.elevation
            }
            _ => false,
        }
    }

    pub fn is_at_selected_level(&self, item: &ItemRef<'_>) -> bool {
        match item {
            ItemRef::Furniture(f) => f.visible && self.is_furniture_at_level(f, self.selected_level),
            ItemRef::Compass(c) => c.visible,
            other => self.is_at_level(other.level(), self.selected_level),
        }
    }

    /// Every item of the plan, furniture groups flattened.
    pub fn items(&self) -> Vec<ItemRef<'_>> {
        let mut items = Vec::new();
        items.extend(self.walls.iter().map(ItemRef::Wall));
        items.extend(self.rooms.iter().map(ItemRef::Room));
        for piece in &self.furniture {
            items.extend(piece.flatten().into_iter().map(ItemRef::Furniture));
        }
        items.extend(self.dimension_lines.iter().map(ItemRef::DimensionLine));
        items.extend(self.labels.iter().map(ItemRef::Label));
        items.extend(self.compass.iter().map(ItemRef::Compass));
        items.extend(self.observer_camera.iter().map(ItemRef::Camera));
        items
    }

    /// Items displayed at `level`.
    pub fn items_at_level(&self, level: Option<ItemId>) -> Vec<ItemRef<'_>> {
        self.items()
            .into_iter()
            .filter(|item| match item {
                ItemRef::Furniture(f) => f.visible && self.is_furniture_at_level(f, level),
                ItemRef::Compass(c) => c.visible,
                other => self.is_at_level(other.level(), level),
            })
            .collect()
    }

    pub fn item(&self, id: ItemId) -> Option<ItemRef<'_>> {
        self.items().into_iter().find(|item| item.id() == id)
    }

    pub fn wall(&self, id: ItemId) -> Option<&Wall> {
        self.walls.iter().find(|w| w.id == id)
    }

    /// Wall outline mitred against the walls joined at its ends.
    pub fn wall_points(&self, id: ItemId) -> Option<Vec<Point>> {
        let wall = self.wall(id)?;
        Some(self.joined_wall_points(wall))
    }

    pub fn joined_wall_points(&self, wall: &Wall) -> Vec<Point> {
        let at_start = wall.wall_at_start.and_then(|id| self.wall(id));
        let at_end = wall.wall_at_end.and_then(|id| self.wall(id));
        wall.points_with_joins(at_start, at_end)
    }

    /// Outline of a displayed item, `None` when unknown or not shown at the
    /// selected level.
    pub fn item_points(&self, id: ItemId) -> Option<Vec<Point>> {
        let item = self.item(id)?;
        if !self.is_at_selected_level(&item) {
            return None;
        }
        Some(match item {
            ItemRef::Wall(w) => self.joined_wall_points(w),
            other => other.points(),
        })
    }

    /// Selected items in selection order.
    pub fn selected_items(&self) -> Vec<ItemRef<'_>> {
        self.selection.iter().filter_map(|id| self.item(*id)).collect()
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selection.contains(&id)
    }

    /// Background image shown under the selected level, if any is visible.
    pub fn viewable_background_image(&self) -> Option<&BackgroundImage> {
        let image = match self.selected_level() {
            Some(level) if level.background_image.is_some() => level.background_image.as_ref(),
            _ => self.background_image.as_ref(),
        };
        image.filter(|i| i.visible)
    }
}
