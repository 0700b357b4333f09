//! Errors raised while reading, writing and checking configuration files.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// The file exists but could not be read.
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file or its parent directory could not be written.
    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A value parsed but makes no sense for the plan.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: &'static str, reason: &'static str },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl SettingsError {
    pub(crate) fn invalid(key: &'static str, reason: &'static str) -> Self {
        SettingsError::InvalidSetting { key, reason }
    }
}

/// Problems with the shape of a configuration rather than its file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Only `.json` and `.toml` files are understood.
    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("'{key}' is {value}, expected {min} to {max}")]
    ValueOutOfRange {
        key: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// The platform has no per-user configuration directory.
    #[error("No configuration directory on {0}")]
    NoConfigDirectory(&'static str),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_names_file() {
        let err = SettingsError::Read {
            path: PathBuf::from("/etc/floorkit.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Cannot read /etc/floorkit.toml: denied");
    }

    #[test]
    fn test_range_error_display() {
        let err = ConfigError::ValueOutOfRange {
            key: "print.margin_inches",
            value: 3.0,
            min: 0.0,
            max: 2.0,
        };
        assert_eq!(err.to_string(), "'print.margin_inches' is 3, expected 0 to 2");
    }

    #[test]
    fn test_config_error_converts() {
        let err: SettingsError = ConfigError::NoConfigDirectory("wasm").into();
        assert!(matches!(err, SettingsError::Config(ConfigError::NoConfigDirectory(_))));
        assert_eq!(err.to_string(), "Config error: No configuration directory on wasm");
    }
}
