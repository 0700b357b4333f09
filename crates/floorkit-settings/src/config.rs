//! Configuration and settings management for floorkit
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats stored in the platform configuration directory.
//!
//! Configuration is organized into logical sections:
//! - Plan preferences (unit, grid, patterns, colours, text styles)
//! - Print settings (paper, orientation, fixed scale)
//! - Render settings (icon size, grid spacing, fonts)

use floorkit_core::model::{TextStyle, WallPattern};
use floorkit_core::{Color, LengthUnit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Colours used to paint the plan on screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanColors {
    pub background: Color,
    pub foreground: Color,
    pub selection: Color,
}

impl Default for PlanColors {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            foreground: Color::BLACK,
            selection: Color::from_rgb_u32(0x0078d7),
        }
    }
}

/// Default text styles, used for items without their own style
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyles {
    pub default_style: TextStyle,
    pub room_name: TextStyle,
    pub room_area: TextStyle,
    pub furniture_name: TextStyle,
    pub dimension_line: TextStyle,
    pub label: TextStyle,
}

impl Default for TextStyles {
    fn default() -> Self {
        Self {
            default_style: TextStyle::new(18.0),
            room_name: TextStyle::new(24.0),
            room_area: TextStyle::new(24.0),
            furniture_name: TextStyle::new(18.0),
            dimension_line: TextStyle::new(18.0),
            label: TextStyle::new(18.0),
        }
    }
}

/// Preferences that change how the plan is displayed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPreferences {
    /// Unit of displayed lengths, grid and magnetism
    #[serde(default)]
    pub unit: LengthUnit,
    #[serde(default = "default_true")]
    pub grid_visible: bool,
    #[serde(default = "default_true")]
    pub magnetism_enabled: bool,
    /// Pattern of walls without their own pattern
    #[serde(default)]
    pub wall_pattern: WallPattern,
    /// Draw furniture with icons rendered from above
    #[serde(default)]
    pub furniture_viewed_from_top: bool,
    /// Paint room floors with their colour or texture
    #[serde(default = "default_true")]
    pub room_floor_colored_or_textured: bool,
    #[serde(default)]
    pub colors: PlanColors,
    #[serde(default)]
    pub text_styles: TextStyles,
}

fn default_true() -> bool {
    true
}

impl Default for PlanPreferences {
    fn default() -> Self {
        Self {
            unit: LengthUnit::default(),
            grid_visible: true,
            magnetism_enabled: true,
            wall_pattern: WallPattern::default(),
            furniture_viewed_from_top: false,
            room_floor_colored_or_textured: true,
            colors: PlanColors::default(),
            text_styles: TextStyles::default(),
        }
    }
}

/// Paper size selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    /// ISO A4, 210 x 297 mm
    A4,
    /// US Letter, 8.5 x 11 in
    Letter,
}

impl Default for PaperSize {
    fn default() -> Self {
        Self::A4
    }
}

impl std::fmt::Display for PaperSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A4 => write!(f, "A4"),
            Self::Letter => write!(f, "Letter"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::Portrait
    }
}

/// Print settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintSettings {
    #[serde(default)]
    pub paper: PaperSize,
    #[serde(default)]
    pub orientation: Orientation,
    /// Fixed plan scale, auto-fit to one page when unset
    #[serde(default)]
    pub scale: Option<f32>,
    /// Page margin in inches
    #[serde(default = "default_margin")]
    pub margin_inches: f32,
}

fn default_margin() -> f32 {
    0.5
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            paper: PaperSize::default(),
            orientation: Orientation::default(),
            scale: None,
            margin_inches: default_margin(),
        }
    }
}

/// Render settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Side of baked top view icons, in pixels
    pub icon_size: u32,
    /// Minimum on-screen spacing of minor grid lines, in pixels
    pub min_grid_spacing: f32,
    /// Minimum on-screen spacing of major grid lines, in pixels
    pub min_major_grid_spacing: f32,
    pub anti_alias: bool,
    /// Preferred font family, the system sans-serif font when unset
    #[serde(default)]
    pub font_family: Option<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            icon_size: 128,
            min_grid_spacing: 10.0,
            min_major_grid_spacing: 50.0,
            anti_alias: true,
            font_family: None,
        }
    }
}

/// Complete floorkit configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub plan: PlanPreferences,
    #[serde(default)]
    pub print: PrintSettings,
    #[serde(default)]
    pub render: RenderSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat {
            extension: other.unwrap_or("").to_string(),
        }
        .into()),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location, `<config dir>/floorkit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("floorkit").join("config.toml"))
            .ok_or_else(|| ConfigError::NoConfigDirectory(std::env::consts::OS).into())
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the config at `path`, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let styles = &self.plan.text_styles;
        for (key, style) in [
            ("plan.text_styles.default_style", styles.default_style),
            ("plan.text_styles.room_name", styles.room_name),
            ("plan.text_styles.room_area", styles.room_area),
            ("plan.text_styles.furniture_name", styles.furniture_name),
            ("plan.text_styles.dimension_line", styles.dimension_line),
            ("plan.text_styles.label", styles.label),
        ] {
            if !style.font_size.is_finite() || style.font_size <= 0.0 {
                return Err(SettingsError::invalid(key, "font size must be > 0"));
            }
        }

        if let Some(scale) = self.print.scale {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(ConfigError::ValueOutOfRange {
                    key: "print.scale",
                    value: scale,
                    min: f32::MIN_POSITIVE,
                    max: f32::MAX,
                }
                .into());
            }
        }

        if !(0.0..=2.0).contains(&self.print.margin_inches) {
            return Err(ConfigError::ValueOutOfRange {
                key: "print.margin_inches",
                value: self.print.margin_inches,
                min: 0.0,
                max: 2.0,
            }
            .into());
        }

        if self.render.icon_size == 0 || self.render.icon_size > 1024 {
            return Err(SettingsError::invalid(
                "render.icon_size",
                "must be between 1 and 1024",
            ));
        }

        if !self.render.min_grid_spacing.is_finite() || self.render.min_grid_spacing <= 0.0 {
            return Err(SettingsError::invalid(
                "render.min_grid_spacing",
                "must be > 0",
            ));
        }

        if self.render.min_major_grid_spacing < self.render.min_grid_spacing {
            return Err(SettingsError::invalid(
                "render.min_major_grid_spacing",
                "must not be smaller than the minor grid spacing",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_scale() {
        let mut config = Config::default();
        config.print.scale = Some(0.0);
        assert!(matches!(
            config.validate(),
            Err(SettingsError::Config(ConfigError::ValueOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let err = Config::default()
            .save_to_file(Path::new("config.yaml"))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Config(ConfigError::UnsupportedFormat { ref extension }) if extension == "yaml"
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[plan]\nunit = \"inch\"\ngrid_visible = false\n").unwrap();
        assert_eq!(config.plan.unit, LengthUnit::Inch);
        assert!(!config.plan.grid_visible);
        assert_eq!(config.render, RenderSettings::default());
    }
}
