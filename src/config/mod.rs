//! Configuration file support for boxmark.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/boxmark/config.toml`. Settings include the canvas size,
//! labeling behavior, the box color palette, history depth, storage location,
//! and keybindings.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod keybindings;
pub mod types;

pub use enums::ColorSpec;
pub use keybindings::{Action, KeyBinding, KeybindingsConfig};
pub use types::{
    CanvasConfig, HistoryConfig, LabelConfig, PaletteConfig, StorageConfig, SuggestConfig,
};

use crate::annotation::Palette;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const MIN_CANVAS_SIDE: u32 = 16;
const MAX_CANVAS_SIDE: u32 = 8192;

/// Main configuration structure containing all user settings.
///
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [canvas]
/// width = 800
/// height = 600
///
/// [labels]
/// prompt_for_label = true
/// default_label = "object"
///
/// [palette]
/// colors = ["#22c55e", "orange", [168, 85, 247]]
///
/// [history]
/// max_snapshots = 0
///
/// [keybindings]
/// undo = ["Ctrl+Z"]
/// redo = ["Ctrl+Shift+Z", "Ctrl+Y"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub canvas: CanvasConfig,

    #[serde(default)]
    pub labels: LabelConfig,

    #[serde(default)]
    pub palette: PaletteConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub suggest: SuggestConfig,

    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `canvas.width`, `canvas.height`: 16 - 8192
    /// - `suggest.min_confidence`: 0.0 - 1.0
    /// - `labels.default_label`: non-blank
    /// - `palette.colors`: unknown entries are dropped
    pub fn validate_and_clamp(&mut self) {
        if !(MIN_CANVAS_SIDE..=MAX_CANVAS_SIDE).contains(&self.canvas.width) {
            warn!(
                "Invalid canvas width {}, clamping to {}-{} range",
                self.canvas.width, MIN_CANVAS_SIDE, MAX_CANVAS_SIDE
            );
            self.canvas.width = self.canvas.width.clamp(MIN_CANVAS_SIDE, MAX_CANVAS_SIDE);
        }

        if !(MIN_CANVAS_SIDE..=MAX_CANVAS_SIDE).contains(&self.canvas.height) {
            warn!(
                "Invalid canvas height {}, clamping to {}-{} range",
                self.canvas.height, MIN_CANVAS_SIDE, MAX_CANVAS_SIDE
            );
            self.canvas.height = self.canvas.height.clamp(MIN_CANVAS_SIDE, MAX_CANVAS_SIDE);
        }

        if !(0.0..=1.0).contains(&self.suggest.min_confidence) {
            warn!(
                "Invalid suggest min_confidence {:.2}, clamping to 0.0-1.0 range",
                self.suggest.min_confidence
            );
            self.suggest.min_confidence = self.suggest.min_confidence.clamp(0.0, 1.0);
        }

        if self.labels.default_label.trim().is_empty() {
            warn!("Blank default_label, falling back to 'object'");
            self.labels.default_label = "object".to_string();
        }

        self.palette.colors.retain(|spec| {
            let valid = spec.to_color().is_some();
            if !valid {
                warn!("Ignoring unknown palette color {:?}", spec);
            }
            valid
        });
    }

    /// Builds the runtime palette; an empty list yields the default palette.
    pub fn build_palette(&self) -> Palette {
        Palette::new(
            self.palette
                .colors
                .iter()
                .filter_map(ColorSpec::to_color)
                .collect(),
        )
    }

    /// Returns the path to the configuration file (`~/.config/boxmark/config.toml`).
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("boxmark");

        Ok(config_dir.join("config.toml"))
    }

    /// Resolves the store directory: the configured one, or `<data_dir>/boxmark`.
    pub fn store_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.base_dir {
            return Ok(dir.clone());
        }
        Ok(dirs::data_dir()
            .context("Could not find data directory")?
            .join("boxmark"))
    }

    /// Loads configuration from the default path, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `config_path`, or returns defaults if the file
    /// does not exist. All loaded values are validated and clamped.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Serializes the config to TOML and writes it to `config_path`, creating
    /// the parent directory if needed.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Saves the current configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    /// JSON schema describing the config file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&temp.path().join("nope.toml")).unwrap();
        assert_eq!(config.canvas.width, 800);
        assert_eq!(config.canvas.height, 600);
        assert!(config.labels.prompt_for_label);
        assert_eq!(config.build_palette().colors().len(), 8);
    }

    #[test]
    fn load_clamps_and_filters_values() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r##"
[canvas]
width = 2
height = 100000

[labels]
default_label = "  "

[palette]
colors = ["red", "mauve", "#0000ff", [0, 255, 0]]

[suggest]
min_confidence = 3.0
"##,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.canvas.width, MIN_CANVAS_SIDE);
        assert_eq!(config.canvas.height, MAX_CANVAS_SIDE);
        assert_eq!(config.labels.default_label, "object");
        assert_eq!(config.palette.colors.len(), 3);
        assert_eq!(config.suggest.min_confidence, 1.0);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[canvas\nwidth = ").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.labels.prompt_for_label = false;
        config.keybindings.undo = vec!["Ctrl+U".into()];
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(!loaded.labels.prompt_for_label);
        assert_eq!(loaded.keybindings.undo, vec!["Ctrl+U".to_string()]);
    }

    #[test]
    fn schema_lists_top_level_sections() {
        let schema = serde_json::to_value(Config::json_schema()).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        assert!(properties.contains_key("canvas"));
        assert!(properties.contains_key("keybindings"));
    }
}
