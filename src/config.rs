// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration. A config file is picked up from the path in the
//! `LABELISATOR_CONFIG` environment variable.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "LABELISATOR_CONFIG";

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Geometry of the drawing surface and gesture thresholds, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Inset margin subtracted from each edge of the surface.
    pub offset: f64,
    pub min_label_width: f64,
    pub min_label_height: f64,
    pub hit_tolerance: f64,
    pub handle_size: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            offset: 20.0,
            min_label_width: 16.0,
            min_label_height: 16.0,
            hit_tolerance: 5.0,
            handle_size: 8.0,
        }
    }
}

/// Styling of the draw command output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub stroke_width: f32,
    pub dash_length: f32,
    pub handle_radius: f32,
    /// Alpha of the fill behind committed labels.
    pub fill_alpha: u8,
    /// Alpha of the fill behind hovered and previewed labels.
    pub highlight_alpha: u8,
    pub min_font_size: f32,
    pub max_font_size: f32,
    /// Horizontal room a tag needs per character of the category name.
    pub tag_char_width: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            stroke_width: 2.0,
            dash_length: 5.0,
            handle_radius: 4.0,
            fill_alpha: 0x05,
            highlight_alpha: 0x25,
            min_font_size: 16.0,
            max_font_size: 24.0,
            tag_char_width: 8.0,
        }
    }
}

/// Complete editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub log_level: LogLevel,
    /// Switch between draw and move tools based on what the idle pointer hovers.
    pub auto_switch: bool,
    pub canvas: CanvasConfig,
    pub render: RenderConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            auto_switch: true,
            canvas: CanvasConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Load a configuration file; the format is chosen from the extension.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Ok(serde_json::from_str(&text)?),
            _ => Ok(serde_yaml::from_str(&text)?),
        }
    }

    /// Load the file named by [`CONFIG_ENV_VAR`], or defaults when unset.
    pub fn from_env() -> Result<Self, StoreError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "log_level: debug\ncanvas:\n  offset: 40").unwrap();

        let config = EditorConfig::load(file.path()).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.canvas.offset, 40.0);
        assert_eq!(config.canvas.min_label_width, 16.0);
        assert!(config.auto_switch);
    }

    #[test]
    fn test_json_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"auto_switch": false, "render": {{"handle_radius": 6.0}}}}"#).unwrap();

        let config = EditorConfig::load(file.path()).unwrap();
        assert!(!config.auto_switch);
        assert_eq!(config.render.handle_radius, 6.0);
        assert_eq!(config.render.stroke_width, 2.0);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(EditorConfig::load(Path::new("/nonexistent/labelisator.yaml")).is_err());
    }
}
