//! Shared plan preferences with change notification.

use floorkit_core::event_bus::{PlanEvent, PlanEventBus, PreferenceChange};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::PlanPreferences;

/// Holds the current plan preferences and publishes a
/// [`PlanEvent::Preferences`] for every preference an update changes.
#[derive(Debug, Default)]
pub struct PreferencesStore {
    preferences: RwLock<PlanPreferences>,
    bus: Option<Arc<PlanEventBus>>,
}

impl PreferencesStore {
    pub fn new(preferences: PlanPreferences) -> Self {
        Self {
            preferences: RwLock::new(preferences),
            bus: None,
        }
    }

    /// Store publishing its changes on `bus`.
    pub fn with_bus(preferences: PlanPreferences, bus: Arc<PlanEventBus>) -> Self {
        Self {
            preferences: RwLock::new(preferences),
            bus: Some(bus),
        }
    }

    /// Copy of the current preferences.
    pub fn get(&self) -> PlanPreferences {
        self.preferences.read().clone()
    }

    /// Applies `edit` and returns the preferences it changed.
    ///
    /// Events are published after the lock is released, so handlers may read
    /// the store.
    pub fn update<F>(&self, edit: F) -> Vec<PreferenceChange>
    where
        F: FnOnce(&mut PlanPreferences),
    {
        let changes = {
            let mut preferences = self.preferences.write();
            let before = preferences.clone();
            edit(&mut preferences);
            diff(&before, &preferences)
        };

        if let Some(bus) = &self.bus {
            for change in &changes {
                tracing::debug!("Preference {:?} changed", change);
                // nobody listening is fine
                let _ = bus.publish(PlanEvent::Preferences(*change));
            }
        }
        changes
    }
}

fn diff(before: &PlanPreferences, after: &PlanPreferences) -> Vec<PreferenceChange> {
    let mut changes = Vec::new();
    if before.unit != after.unit {
        changes.push(PreferenceChange::Unit);
    }
    if before.grid_visible != after.grid_visible {
        changes.push(PreferenceChange::GridVisible);
    }
    if before.magnetism_enabled != after.magnetism_enabled {
        changes.push(PreferenceChange::Magnetism);
    }
    if before.wall_pattern != after.wall_pattern {
        changes.push(PreferenceChange::WallPattern);
    }
    if before.furniture_viewed_from_top != after.furniture_viewed_from_top {
        changes.push(PreferenceChange::FurnitureViewedFromTop);
    }
    if before.room_floor_colored_or_textured != after.room_floor_colored_or_textured {
        changes.push(PreferenceChange::RoomFloorColoredOrTextured);
    }
    if before.colors != after.colors {
        changes.push(PreferenceChange::Colors);
    }
    if before.text_styles != after.text_styles {
        changes.push(PreferenceChange::TextStyles);
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorkit_core::event_bus::EventFilter;
    use floorkit_core::model::WallPattern;
    use floorkit_core::LengthUnit;
    use parking_lot::Mutex;

    #[test]
    fn test_update_reports_changed_preferences() {
        let store = PreferencesStore::default();
        let changes = store.update(|p| {
            p.unit = LengthUnit::Inch;
            p.wall_pattern = WallPattern::Dots;
        });
        assert_eq!(
            changes,
            vec![PreferenceChange::Unit, PreferenceChange::WallPattern]
        );
        assert!(store.update(|p| p.unit = LengthUnit::Inch).is_empty());
        assert_eq!(store.get().unit, LengthUnit::Inch);
    }

    #[test]
    fn test_update_publishes_events() {
        let bus = Arc::new(PlanEventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _subscription = bus.subscribe_scoped(EventFilter::All, move |event| {
            sink.lock().push(event.clone());
        });
        let store = PreferencesStore::with_bus(PlanPreferences::default(), bus);
        store.update(|p| p.furniture_viewed_from_top = true);
        assert_eq!(
            *seen.lock(),
            vec![PlanEvent::Preferences(PreferenceChange::FurnitureViewedFromTop)]
        );
    }
}
