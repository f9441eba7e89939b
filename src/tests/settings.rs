use pretty_assertions::assert_eq;
use std::{fs, path::PathBuf, time::Duration};

use super::super::{live_loop::RecompilePolicy, settings::*};

#[test]
fn test_empty_file_gives_defaults() {
    let settings = Settings::from_toml_str("").unwrap();
    assert_eq!(settings, Settings::default());

    assert_eq!(settings.window_width, 1600);
    assert_eq!(settings.window_height, 1200);
    assert!(!settings.fullscreen);
    assert!(!settings.vsync);
    assert_eq!(settings.recompile, RecompilePolicy::Always);
    assert_eq!(settings.stats_interval, Duration::from_secs(1));
    assert!(settings.start_playing);
    assert!(settings.show_ui);
    assert_eq!(settings.editor_font_size, 14);
    assert_eq!(settings.editor_opacity, 0.75);
    assert!(settings.shader_dir.ends_with("shaders"));
}

#[test]
fn test_parse_all_fields() {
    let settings = Settings::from_toml_str(
        r#"
        window_width = 800
        window_height = 600
        fullscreen = true
        vsync = true
        shader_dir = "/tmp/my-shaders"
        recompile = "on_change"
        stats_interval = "250ms"
        start_playing = false
        show_ui = false
        editor_font_size = 18
        editor_opacity = 0.5
        "#,
    )
    .unwrap();

    assert_eq!(
        settings,
        Settings {
            window_width: 800,
            window_height: 600,
            fullscreen: true,
            vsync: true,
            shader_dir: PathBuf::from("/tmp/my-shaders"),
            recompile: RecompilePolicy::OnChange,
            stats_interval: Duration::from_millis(250),
            start_playing: false,
            show_ui: false,
            editor_font_size: 18,
            editor_opacity: 0.5,
        }
    );
}

#[test]
fn test_values_are_clamped() {
    let settings = Settings::from_toml_str(
        r#"
        window_width = -5
        window_height = 0
        stats_interval = "1ms"
        editor_font_size = 200
        editor_opacity = 3.0
        "#,
    )
    .unwrap();

    assert_eq!(settings.window_width, 1);
    assert_eq!(settings.window_height, 1);
    assert_eq!(settings.stats_interval, Duration::from_millis(100));
    assert_eq!(settings.editor_font_size, 72);
    assert_eq!(settings.editor_opacity, 1.0);

    let settings = Settings::from_toml_str("editor_font_size = 1\neditor_opacity = -1.0").unwrap();
    assert_eq!(settings.editor_font_size, 6);
    assert_eq!(settings.editor_opacity, 0.0);

    let settings = Settings::from_toml_str("editor_opacity = nan").unwrap();
    assert_eq!(settings.editor_opacity, 0.75);
}

#[test]
fn test_invalid_values_are_errors() {
    assert!(matches!(
        Settings::from_toml_str("recompile = \"sometimes\""),
        Err(SettingsError::TomlParse(_))
    ));
    assert!(matches!(
        Settings::from_toml_str("stats_interval = \"soon\""),
        Err(SettingsError::TomlParse(_))
    ));
    assert!(matches!(
        Settings::from_toml_str("window_width = "),
        Err(SettingsError::TomlParse(_))
    ));
}

#[test]
fn test_serialize_round_trip() {
    let mut settings = Settings::default();
    settings.stats_interval = Duration::from_millis(1500);
    settings.recompile = RecompilePolicy::OnChange;

    let text = toml::to_string(&settings).unwrap();
    assert!(text.contains("recompile = \"on_change\""));
    assert_eq!(Settings::from_toml_str(&text).unwrap(), settings);
}

#[test]
fn test_load_missing_and_invalid_files() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.toml");
    assert_eq!(Settings::load(Some(&missing)), Settings::default());

    let invalid = dir.path().join("invalid.toml");
    fs::write(&invalid, "window_width = \"wide\"").unwrap();
    assert_eq!(Settings::load(Some(&invalid)), Settings::default());

    let valid = dir.path().join("valid.toml");
    fs::write(&valid, "vsync = true").unwrap();
    assert!(Settings::load(Some(&valid)).vsync);
}

#[test]
fn test_from_toml_file_reports_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Settings::from_toml_file(&dir.path().join("nope.toml")),
        Err(SettingsError::Io(_))
    ));
}
