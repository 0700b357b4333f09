//! floorkit settings crate
//!
//! Handles plan preferences, print and render configuration, and their
//! persistence.

pub mod config;
pub mod error;
pub mod store;

pub use config::{
    Config, Orientation, PaperSize, PlanColors, PlanPreferences, PrintSettings, RenderSettings,
    TextStyles,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
pub use store::PreferencesStore;
