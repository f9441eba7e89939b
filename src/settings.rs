// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! User settings read from `config.toml`.

use serde::*;
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

use crate::{live_loop::RecompilePolicy, *};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Settings {
    #[serde(
        default = "defaults::window_width",
        deserialize_with = "validators::at_least_one"
    )]
    pub window_width: i32,

    #[serde(
        default = "defaults::window_height",
        deserialize_with = "validators::at_least_one"
    )]
    pub window_height: i32,

    #[serde(default)]
    pub fullscreen: bool,

    /// Sync presentation to the display refresh rate.
    #[serde(default)]
    pub vsync: bool,

    /// Root of the default, latest and saved shaders.
    #[serde(default = "defaults::shader_dir")]
    pub shader_dir: PathBuf,

    #[serde(default)]
    pub recompile: RecompilePolicy,

    /// How often frame-rate statistics are logged and shown in the title.
    #[serde(
        default = "defaults::stats_interval",
        serialize_with = "humantime_serde::serialize",
        deserialize_with = "validators::clamp_stats_interval"
    )]
    pub stats_interval: Duration,

    #[serde(default = "defaults::yes")]
    pub start_playing: bool,

    #[serde(default = "defaults::yes")]
    pub show_ui: bool,

    #[serde(
        default = "defaults::editor_font_size",
        deserialize_with = "validators::clamp_font_size"
    )]
    pub editor_font_size: u32,

    #[serde(
        default = "defaults::editor_opacity",
        deserialize_with = "validators::clamp_opacity"
    )]
    pub editor_opacity: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: defaults::window_width(),
            window_height: defaults::window_height(),
            fullscreen: false,
            vsync: false,
            shader_dir: defaults::shader_dir(),
            recompile: RecompilePolicy::default(),
            stats_interval: defaults::stats_interval(),
            start_playing: true,
            show_ui: true,
            editor_font_size: defaults::editor_font_size(),
            editor_opacity: defaults::editor_opacity(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reads `path`, or the per-user config file when `None`.
    ///
    /// A missing file yields the defaults. An unreadable or invalid one is
    /// reported and also yields the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(config_path) {
            Some(path) => path,
            None => return Self::default(),
        };

        if !path.exists() {
            log::debug!("No settings file at {}", path.display());
            return Self::default();
        }

        match Self::from_toml_file(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Ignoring {}: {err}", path.display());
                Self::default()
            }
        }
    }
}

/// `<config dir>/glsl-live/config.toml`, if the platform has a config dir.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
}

pub mod defaults {
    use super::*;

    pub fn window_width() -> i32 {
        1600
    }

    pub fn window_height() -> i32 {
        1200
    }

    pub fn shader_dir() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|err| {
                log::warn!("Could not read the current directory: {err}");
                PathBuf::from(".")
            })
            .join("shaders")
    }

    pub fn stats_interval() -> Duration {
        Duration::from_secs(1)
    }

    pub fn yes() -> bool {
        true
    }

    pub fn editor_font_size() -> u32 {
        14
    }

    pub fn editor_opacity() -> f64 {
        0.75
    }
}

mod validators {
    use super::*;
    use crate::frame_controller::MIN_STATS_INTERVAL;

    pub fn at_least_one<'de, D>(deserializer: D) -> Result<i32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = i32::deserialize(deserializer)?;
        Ok(value.max(1))
    }

    pub fn clamp_stats_interval<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Duration = humantime_serde::deserialize(deserializer)?;
        Ok(value.max(MIN_STATS_INTERVAL))
    }

    pub fn clamp_font_size<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        Ok(value.clamp(6, 72))
    }

    pub fn clamp_opacity<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        if value.is_nan() {
            return Ok(defaults::editor_opacity());
        }
        Ok(value.clamp(0.0, 1.0))
    }
}
