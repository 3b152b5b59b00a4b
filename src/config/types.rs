//! Configuration type definitions.

use super::enums::ColorSpec;
use crate::annotation::color::DEFAULT_PALETTE_HEX;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Canvas settings.
///
/// Box coordinates are canvas pixels; the exported document reports these
/// dimensions as the image size.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CanvasConfig {
    /// Canvas width in pixels (valid range: 16 - 8192)
    #[serde(default = "default_canvas_width")]
    pub width: u32,

    /// Canvas height in pixels (valid range: 16 - 8192)
    #[serde(default = "default_canvas_height")]
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
        }
    }
}

/// Labeling behavior after a box is drawn.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LabelConfig {
    /// Ask for a label before committing a drawn box.
    /// When false, boxes commit on release with `default_label`.
    #[serde(default = "default_prompt_for_label")]
    pub prompt_for_label: bool,

    /// Label used when prompting is off or the entered label is blank
    #[serde(default = "default_label")]
    pub default_label: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            prompt_for_label: default_prompt_for_label(),
            default_label: default_label(),
        }
    }
}

/// Outline colors handed out to new boxes, in rotation order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PaletteConfig {
    #[serde(default = "default_palette_colors")]
    pub colors: Vec<ColorSpec>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            colors: default_palette_colors(),
        }
    }
}

/// Undo history settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HistoryConfig {
    /// Maximum snapshots kept per image (0 = unlimited)
    #[serde(default)]
    pub max_snapshots: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_snapshots: 0 }
    }
}

/// Where the local annotation store lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StorageConfig {
    /// Store directory; defaults to `<data_dir>/boxmark`
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
}

/// Auto-annotation suggestion filtering.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SuggestConfig {
    /// Detections below this confidence are dropped (0.0 - 1.0)
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_canvas_width() -> u32 {
    800
}

fn default_canvas_height() -> u32 {
    600
}

fn default_prompt_for_label() -> bool {
    true
}

fn default_label() -> String {
    "object".to_string()
}

fn default_palette_colors() -> Vec<ColorSpec> {
    DEFAULT_PALETTE_HEX
        .iter()
        .map(|hex| ColorSpec::Name((*hex).to_string()))
        .collect()
}

fn default_min_confidence() -> f64 {
    0.5
}
