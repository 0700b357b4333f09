//! Derived plan geometry
//!
//! [`GeometryCache`] keeps everything the painter derives from a model
//! snapshot: one unioned area per (level, wall pattern) bucket, the ghost
//! overlay of the level below, the plan bounds and the furniture and room
//! paint orders.
//!
//! Change events only mark tiers dirty through [`GeometryCache::apply`];
//! [`GeometryCache::prepare`] recomputes each dirty tier once before the
//! next frame, however many events arrived in between.

use floorkit_core::event_bus::{
    CameraProperty, CompassProperty, DimensionLineProperty, FurnitureProperty, LabelProperty,
    LevelProperty, RoomProperty, WallProperty,
};
use floorkit_core::model::{ItemRef, Room, Wall, WallPattern};
use floorkit_core::{ItemId, ItemKind, PlanEvent, PlanModel, PreferenceChange, Rect};
use floorkit_settings::TextStyles;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::area::PlanArea;
use crate::shapes;
use crate::text::TextMetrics;
use crate::transform::default_plan_bounds;

/// What a change event requires before the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Invalidation {
    /// Nothing visible changed.
    None,
    /// Only a repaint is needed.
    Repaint,
    /// Derived geometry must be recomputed, then repainted.
    Geometry,
}

/// Cache tiers waiting for recomputation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyTiers {
    pub wall_areas: bool,
    pub ghost: bool,
    pub bounds: bool,
    pub furniture_order: bool,
    pub room_order: bool,
    /// The decoded background image must be reloaded.
    pub background: bool,
}

impl DirtyTiers {
    pub fn all() -> Self {
        Self {
            wall_areas: true,
            ghost: true,
            bounds: true,
            furniture_order: true,
            room_order: true,
            background: true,
        }
    }

    pub fn any(&self) -> bool {
        self.wall_areas
            || self.ghost
            || self.bounds
            || self.furniture_order
            || self.room_order
            || self.background
    }

    pub fn merge(&mut self, other: DirtyTiers) {
        self.wall_areas |= other.wall_areas;
        self.ghost |= other.ghost;
        self.bounds |= other.bounds;
        self.furniture_order |= other.furniture_order;
        self.room_order |= other.room_order;
        self.background |= other.background;
    }
}

/// Everything one event invalidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventEffect {
    pub tiers: DirtyTiers,
    pub repaint: bool,
    /// Drop every cached top view icon.
    pub clear_icons: bool,
    /// Drop the cached top view icon of one piece.
    pub icon_item: Option<ItemId>,
}

impl EventEffect {
    fn none() -> Self {
        Self::default()
    }

    fn repaint() -> Self {
        Self {
            repaint: true,
            ..Self::default()
        }
    }

    fn tiers(tiers: DirtyTiers) -> Self {
        Self {
            tiers,
            repaint: true,
            ..Self::default()
        }
    }

    fn bounds() -> Self {
        Self::tiers(DirtyTiers {
            bounds: true,
            ..DirtyTiers::default()
        })
    }

    pub fn invalidation(&self) -> Invalidation {
        if self.tiers.any() {
            Invalidation::Geometry
        } else if self.repaint || self.clear_icons || self.icon_item.is_some() {
            Invalidation::Repaint
        } else {
            Invalidation::None
        }
    }
}

/// Maps a change event to the cache tiers it invalidates.
pub fn invalidation_for(event: &PlanEvent) -> EventEffect {
    let walls = DirtyTiers {
        wall_areas: true,
        ghost: true,
        bounds: true,
        ..DirtyTiers::default()
    };
    match event {
        PlanEvent::Wall { property, .. } => match property {
            WallProperty::XStart
            | WallProperty::YStart
            | WallProperty::XEnd
            | WallProperty::YEnd
            | WallProperty::WallAtStart
            | WallProperty::WallAtEnd
            | WallProperty::Thickness
            | WallProperty::ArcExtent
            | WallProperty::Pattern
            | WallProperty::Level => EventEffect::tiers(walls),
            WallProperty::Height | WallProperty::Color => EventEffect::repaint(),
        },
        PlanEvent::Room { property, .. } => match property {
            RoomProperty::Points | RoomProperty::Level => EventEffect::tiers(DirtyTiers {
                room_order: true,
                ghost: true,
                bounds: true,
                ..DirtyTiers::default()
            }),
            RoomProperty::Name
            | RoomProperty::NameOffset
            | RoomProperty::NameStyle
            | RoomProperty::AreaVisible
            | RoomProperty::AreaOffset
            | RoomProperty::AreaStyle => EventEffect::bounds(),
            RoomProperty::FloorVisible | RoomProperty::CeilingVisible => {
                EventEffect::tiers(DirtyTiers {
                    room_order: true,
                    ..DirtyTiers::default()
                })
            }
            RoomProperty::FloorColor | RoomProperty::FloorTexture => EventEffect::repaint(),
        },
        PlanEvent::Furniture { id, property } => match property {
            FurnitureProperty::Elevation => EventEffect::tiers(DirtyTiers {
                furniture_order: true,
                ..DirtyTiers::default()
            }),
            FurnitureProperty::Width | FurnitureProperty::Depth => EventEffect {
                icon_item: Some(*id),
                ..EventEffect::bounds()
            },
            FurnitureProperty::X
            | FurnitureProperty::Y
            | FurnitureProperty::Angle
            | FurnitureProperty::Level
            | FurnitureProperty::Visible => EventEffect::bounds(),
            FurnitureProperty::Height => EventEffect::none(),
            FurnitureProperty::Color
            | FurnitureProperty::Texture
            | FurnitureProperty::ModelMirrored
            | FurnitureProperty::PlanIcon
            | FurnitureProperty::Model => EventEffect {
                icon_item: Some(*id),
                ..EventEffect::repaint()
            },
            FurnitureProperty::Name
            | FurnitureProperty::NameVisible
            | FurnitureProperty::NameOffset
            | FurnitureProperty::NameStyle
            | FurnitureProperty::LightPower => EventEffect::repaint(),
        },
        PlanEvent::DimensionLine { property, .. } => match property {
            DimensionLineProperty::LengthStyle => EventEffect::repaint(),
            DimensionLineProperty::XStart
            | DimensionLineProperty::YStart
            | DimensionLineProperty::XEnd
            | DimensionLineProperty::YEnd
            | DimensionLineProperty::Offset
            | DimensionLineProperty::Level => EventEffect::bounds(),
        },
        PlanEvent::Label { property, .. } => match property {
            LabelProperty::Style => EventEffect::repaint(),
            LabelProperty::Text | LabelProperty::X | LabelProperty::Y | LabelProperty::Level => {
                EventEffect::bounds()
            }
        },
        PlanEvent::Compass { property } => match property {
            CompassProperty::Visible => EventEffect::repaint(),
            CompassProperty::X
            | CompassProperty::Y
            | CompassProperty::Diameter
            | CompassProperty::NorthDirection => EventEffect::bounds(),
        },
        PlanEvent::Camera { property } => match property {
            CameraProperty::Pitch => EventEffect::repaint(),
            CameraProperty::X
            | CameraProperty::Y
            | CameraProperty::Z
            | CameraProperty::Yaw
            | CameraProperty::FieldOfView
            | CameraProperty::FixedSize => EventEffect::bounds(),
        },
        PlanEvent::Level { property, .. } => match property {
            LevelProperty::Elevation | LevelProperty::Visible | LevelProperty::ElevationIndex => {
                EventEffect::tiers(DirtyTiers {
                    wall_areas: true,
                    ghost: true,
                    furniture_order: true,
                    ..DirtyTiers::default()
                })
            }
            LevelProperty::BackgroundImage => EventEffect::tiers(DirtyTiers {
                background: true,
                bounds: true,
                ..DirtyTiers::default()
            }),
            LevelProperty::Name | LevelProperty::Height | LevelProperty::FloorThickness => {
                EventEffect::repaint()
            }
        },
        PlanEvent::HomeBackgroundImage => EventEffect::tiers(DirtyTiers {
            background: true,
            bounds: true,
            ..DirtyTiers::default()
        }),
        PlanEvent::Collection { kind, id, .. } => {
            let tiers = match kind {
                ItemKind::Wall => walls,
                ItemKind::Room => DirtyTiers {
                    room_order: true,
                    ghost: true,
                    bounds: true,
                    ..DirtyTiers::default()
                },
                ItemKind::Furniture => DirtyTiers {
                    furniture_order: true,
                    bounds: true,
                    ..DirtyTiers::default()
                },
                ItemKind::DimensionLine
                | ItemKind::Label
                | ItemKind::Compass
                | ItemKind::Camera => DirtyTiers {
                    bounds: true,
                    ..DirtyTiers::default()
                },
            };
            EventEffect {
                icon_item: (*kind == ItemKind::Furniture).then_some(*id),
                ..EventEffect::tiers(tiers)
            }
        }
        PlanEvent::Selection => EventEffect::repaint(),
        PlanEvent::SelectedLevel => EventEffect::tiers(DirtyTiers::all()),
        PlanEvent::Preferences(change) => match change {
            PreferenceChange::Unit
            | PreferenceChange::GridVisible
            | PreferenceChange::TextStyles
            | PreferenceChange::Colors
            | PreferenceChange::RoomFloorColoredOrTextured
            | PreferenceChange::Magnetism => EventEffect::repaint(),
            PreferenceChange::WallPattern => EventEffect::tiers(DirtyTiers {
                wall_areas: true,
                ..DirtyTiers::default()
            }),
            PreferenceChange::FurnitureViewedFromTop => EventEffect {
                clear_icons: true,
                ..EventEffect::repaint()
            },
        },
    }
}

/// Invalidations recorded by event handlers, drained by the render thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingInvalidations {
    pub tiers: DirtyTiers,
    pub repaint: bool,
    pub clear_icons: bool,
    pub icon_items: BTreeSet<ItemId>,
    /// Number of events folded in since the last drain.
    pub events: usize,
}

impl PendingInvalidations {
    /// Folds `event` in and returns what it required on its own.
    pub fn record(&mut self, event: &PlanEvent) -> Invalidation {
        let effect = invalidation_for(event);
        self.tiers.merge(effect.tiers);
        self.repaint |= effect.repaint;
        self.clear_icons |= effect.clear_icons;
        if let Some(id) = effect.icon_item {
            self.icon_items.insert(id);
        }
        self.events += 1;
        effect.invalidation()
    }

    pub fn is_empty(&self) -> bool {
        !self.tiers.any() && !self.repaint && !self.clear_icons && self.icon_items.is_empty()
    }

    pub fn take(&mut self) -> PendingInvalidations {
        std::mem::take(self)
    }
}

/// One unioned wall area.
#[derive(Debug, Clone)]
pub struct WallArea {
    pub level: Option<ItemId>,
    pub pattern: WallPattern,
    pub area: PlanArea,
}

/// Walls and rooms of the level below the selected one.
#[derive(Debug, Clone)]
pub struct Ghost {
    pub level: ItemId,
    pub walls: PlanArea,
    pub rooms: PlanArea,
}

/// Number of recomputations per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub wall_areas: usize,
    pub ghost: usize,
    pub bounds: usize,
    pub furniture_order: usize,
    pub room_order: usize,
    pub prepares: usize,
}

impl CacheStats {
    /// Recomputations of any tier.
    pub fn recomputes(&self) -> usize {
        self.wall_areas + self.ghost + self.bounds + self.furniture_order + self.room_order
    }
}

/// Preferences and measurements the cache reads while recomputing.
#[derive(Debug, Clone, Copy)]
pub struct CacheInputs<'a> {
    pub wall_pattern: WallPattern,
    pub unit: floorkit_core::LengthUnit,
    pub text_styles: &'a TextStyles,
    pub text: &'a TextMetrics,
    /// Model extents of the decoded background images.
    pub background_bounds: &'a [Rect],
}

/// Derived geometry of one plan view.
#[derive(Debug)]
pub struct GeometryCache {
    dirty: DirtyTiers,
    wall_areas: Vec<WallArea>,
    ghost: Option<Ghost>,
    bounds: Rect,
    furniture_order: Vec<ItemId>,
    room_order: Vec<ItemId>,
    stats: CacheStats,
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryCache {
    /// Creates an empty cache with every tier dirty.
    pub fn new() -> Self {
        Self {
            dirty: DirtyTiers::all(),
            wall_areas: Vec::new(),
            ghost: None,
            bounds: default_plan_bounds(),
            furniture_order: Vec::new(),
            room_order: Vec::new(),
            stats: CacheStats::default(),
        }
    }

    /// Marks the tiers `event` invalidates. The recompute waits for
    /// [`GeometryCache::prepare`].
    pub fn apply(&mut self, event: &PlanEvent) -> Invalidation {
        let effect = invalidation_for(event);
        self.dirty.merge(effect.tiers);
        effect.invalidation()
    }

    pub fn mark_dirty(&mut self, tiers: DirtyTiers) {
        self.dirty.merge(tiers);
    }

    pub fn invalidate_all(&mut self) {
        self.dirty = DirtyTiers::all();
    }

    pub fn dirty(&self) -> DirtyTiers {
        self.dirty
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.any()
    }

    /// Recomputes every dirty tier from `model`. Returns the tiers that were
    /// recomputed.
    pub fn prepare(&mut self, model: &PlanModel, inputs: &CacheInputs<'_>) -> DirtyTiers {
        let dirty = std::mem::take(&mut self.dirty);
        self.stats.prepares += 1;
        if dirty.wall_areas {
            self.wall_areas = build_wall_areas(model, inputs.wall_pattern, |_| true);
            self.stats.wall_areas += 1;
            debug!("Rebuilt {} wall areas", self.wall_areas.len());
        }
        if dirty.ghost {
            self.ghost = build_ghost(model);
            self.stats.ghost += 1;
            debug!("Rebuilt ghost overlay: {}", self.ghost.is_some());
        }
        if dirty.bounds || dirty.background {
            self.bounds = compute_plan_bounds(model, inputs);
            self.stats.bounds += 1;
            debug!("Plan bounds now {:?}", self.bounds);
        }
        if dirty.furniture_order {
            self.furniture_order = furniture_paint_order(model);
            self.stats.furniture_order += 1;
        }
        if dirty.room_order {
            self.room_order = room_paint_order(model);
            self.stats.room_order += 1;
        }
        dirty
    }

    /// Wall areas of the selected level.
    pub fn wall_areas(&self) -> &[WallArea] {
        &self.wall_areas
    }

    pub fn ghost(&self) -> Option<&Ghost> {
        self.ghost.as_ref()
    }

    pub fn plan_bounds(&self) -> Rect {
        self.bounds
    }

    /// Top level pieces of the selected level, lowest first.
    pub fn furniture_order(&self) -> &[ItemId] {
        &self.furniture_order
    }

    /// Rooms of every level, floors first and ceilings last.
    pub fn room_order(&self) -> &[ItemId] {
        &self.room_order
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

/// Unions the walls shown at the selected level, one area per
/// (level, pattern) bucket. `keep` filters walls, e.g. to the selection.
pub fn build_wall_areas(
    model: &PlanModel,
    preferred: WallPattern,
    keep: impl Fn(&Wall) -> bool,
) -> Vec<WallArea> {
    let mut buckets: BTreeMap<(Option<ItemId>, WallPattern), Vec<Vec<floorkit_core::Point>>> =
        BTreeMap::new();
    for wall in &model.walls {
        if !model.is_at_level(wall.level, model.selected_level) || !keep(wall) {
            continue;
        }
        buckets
            .entry((wall.level, wall.effective_pattern(preferred)))
            .or_default()
            .push(model.joined_wall_points(wall));
    }
    buckets
        .into_iter()
        .map(|((level, pattern), polygons)| WallArea {
            level,
            pattern,
            area: PlanArea::union_of(polygons.iter().map(Vec::as_slice)),
        })
        .collect()
}

fn build_ghost(model: &PlanModel) -> Option<Ghost> {
    let other = model.other_level()?;
    let walls: Vec<_> = model
        .walls
        .iter()
        .filter(|w| w.level == Some(other.id))
        .map(|w| model.joined_wall_points(w))
        .collect();
    let rooms: Vec<&[floorkit_core::Point]> = model
        .rooms
        .iter()
        .filter(|r| r.level == Some(other.id) && r.floor_visible)
        .map(|r| r.points.as_slice())
        .collect();
    Some(Ghost {
        level: other.id,
        walls: PlanArea::union_of(walls.iter().map(Vec::as_slice)),
        rooms: PlanArea::union_of(rooms),
    })
}

fn include(bounds: &mut Rect, rect: Option<Rect>) {
    if let Some(rect) = rect {
        *bounds = bounds.union(&rect);
    }
}

/// Bounds of `item` including the texts painted with it.
pub fn item_bounds(model: &PlanModel, item: &ItemRef<'_>, inputs: &CacheInputs<'_>) -> Option<Rect> {
    let points = match item {
        ItemRef::Wall(w) => model.joined_wall_points(w),
        other => other.points(),
    };
    let mut bounds = Rect::from_points(&points)?;
    match item {
        ItemRef::Room(room) => {
            for (text, style, location) in room_texts(room, inputs) {
                include(&mut bounds, Some(inputs.text.bounds_at(&text, &style, location)));
            }
        }
        ItemRef::Furniture(piece) => {
            include(&mut bounds, shapes::sashes_bounds(piece));
            let name = piece.name.trim();
            if piece.name_visible && !name.is_empty() {
                let style = piece.name_style.unwrap_or(inputs.text_styles.furniture_name);
                include(
                    &mut bounds,
                    Some(inputs.text.bounds_at(name, &style, piece.name_location())),
                );
            }
        }
        ItemRef::Label(label) => {
            let style = label.style.unwrap_or(inputs.text_styles.label);
            let anchor = floorkit_core::Point::new(label.x, label.y);
            include(&mut bounds, Some(inputs.text.bounds_at(&label.text, &style, anchor)));
        }
        ItemRef::DimensionLine(line) => {
            let style = line.length_style.unwrap_or(inputs.text_styles.dimension_line);
            let text = inputs.unit.format_length(line.length());
            let metrics = inputs.text.measure(&text, &style);
            let (sin, cos) = line.angle().sin_cos();
            let baseline = if line.offset <= 0.0 {
                line.offset - metrics.descent - 1.0
            } else {
                line.offset + metrics.ascent + 1.0
            };
            let half = metrics.width / 2.0;
            let mid = line.length() / 2.0;
            let corners = [
                (mid - half, baseline - metrics.ascent),
                (mid + half, baseline - metrics.ascent),
                (mid + half, baseline + metrics.descent),
                (mid - half, baseline + metrics.descent),
            ]
            .map(|(x, y)| {
                floorkit_core::Point::new(
                    line.x_start + x * cos - y * sin,
                    line.y_start + x * sin + y * cos,
                )
            });
            include(&mut bounds, Rect::from_points(&corners));
        }
        ItemRef::Wall(_) | ItemRef::Compass(_) | ItemRef::Camera(_) => {}
    }
    Some(bounds)
}

/// Name and area texts of `room` with their styles and anchors.
pub fn room_texts(
    room: &Room,
    inputs: &CacheInputs<'_>,
) -> Vec<(String, floorkit_core::model::TextStyle, floorkit_core::Point)> {
    let mut texts = Vec::new();
    if let Some(name) = room.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        let style = room.name_style.unwrap_or(inputs.text_styles.room_name);
        texts.push((name.to_string(), style, room.name_location()));
    }
    let area = room.area();
    if room.area_visible && area > 0.01 {
        let style = room.area_style.unwrap_or(inputs.text_styles.room_area);
        texts.push((inputs.unit.format_area(area), style, room.area_location()));
    }
    texts
}

/// Smallest rectangle holding the default extent, every item of every level
/// with its texts, the background images and the observer camera.
pub fn compute_plan_bounds(model: &PlanModel, inputs: &CacheInputs<'_>) -> Rect {
    let mut bounds = default_plan_bounds();
    for item in model.items() {
        match item {
            ItemRef::Furniture(piece) if !piece.visible => continue,
            ItemRef::Compass(compass) if !compass.visible => continue,
            _ => {}
        }
        include(&mut bounds, item_bounds(model, &item, inputs));
    }
    for rect in inputs.background_bounds {
        include(&mut bounds, Some(*rect));
    }
    bounds
}

/// Visible top level pieces at the selected level, sorted by ground
/// elevation. The sort is stable.
pub fn furniture_paint_order(model: &PlanModel) -> Vec<ItemId> {
    let level_elevation = |level: Option<ItemId>| {
        level
            .and_then(|id| model.level(id))
            .map(|l| l.elevation)
            .unwrap_or(0.0)
    };
    let mut pieces: Vec<_> = model
        .furniture
        .iter()
        .filter(|p| p.visible && model.is_furniture_at_level(p, model.selected_level))
        .map(|p| (level_elevation(p.level) + p.elevation, p.id))
        .collect();
    pieces.sort_by(|a, b| a.0.total_cmp(&b.0));
    pieces.into_iter().map(|(_, id)| id).collect()
}

fn room_rank(room: &Room) -> u8 {
    match (room.floor_visible, room.ceiling_visible) {
        (true, false) => 0,
        (true, true) | (false, false) => 1,
        (false, true) => 2,
    }
}

/// Rooms with only their floor visible first, then rooms showing both,
/// then ceiling only rooms. The sort is stable.
pub fn room_paint_order(model: &PlanModel) -> Vec<ItemId> {
    let mut rooms: Vec<&Room> = model.rooms.iter().collect();
    rooms.sort_by_key(|r| room_rank(r));
    rooms.into_iter().map(|r| r.id).collect()
}
