use floorkit_core::model::WallPattern;
use floorkit_core::LengthUnit;
use floorkit_settings::{Config, PaperSize, SettingsError};
use tempfile::tempdir;

#[test]
fn test_toml_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("floorkit").join("config.toml");

    let mut config = Config::default();
    config.plan.unit = LengthUnit::Inch;
    config.plan.wall_pattern = WallPattern::CrossHatch;
    config.print.paper = PaperSize::Letter;
    config.print.scale = Some(0.02);
    config.render.icon_size = 256;
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut config = Config::default();
    config.plan.furniture_viewed_from_top = true;
    config.save_to_file(&path).unwrap();
    assert_eq!(Config::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[render]\nicon_size = 0\nmin_grid_spacing = 10.0\nmin_major_grid_spacing = 50.0\nanti_alias = true\n").unwrap();
    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidSetting { .. }));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}
