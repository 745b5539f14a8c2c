//! Text rendering configuration

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// # Text Configuration
///
/// Where fonts are loaded from and how queued text is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Folder holding `<font>.png` / `<font>.json` atlas pairs
    pub font_directory: String,
    /// Pixel size used by strings that don't set one
    pub default_pixel_size: f32,
    /// Strings larger than this (in pixels) use the large-text technique
    pub large_text_threshold: f32,
    /// Flip the Y axis of the view matrix so text layout can grow downwards
    pub flip_y: bool,
}

impl TextConfig {
    /// Create a configuration reading fonts from `font_directory`
    pub fn new(font_directory: impl Into<String>) -> Self {
        Self {
            font_directory: font_directory.into(),
            ..Self::default()
        }
    }

    /// Set the default pixel size
    pub fn with_default_pixel_size(mut self, pixel_size: f32) -> Self {
        self.default_pixel_size = pixel_size;
        self
    }

    /// Set the large/small technique threshold
    pub fn with_large_text_threshold(mut self, threshold: f32) -> Self {
        self.large_text_threshold = threshold;
        self
    }

    /// Enable or disable the view Y flip
    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.font_directory.is_empty() {
            return Err(ConfigError::Invalid {
                field: "font_directory",
                reason: "cannot be empty".to_string(),
            });
        }

        if !(self.default_pixel_size.is_finite() && self.default_pixel_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "default_pixel_size",
                reason: format!("must be positive, got {}", self.default_pixel_size),
            });
        }

        if !(self.large_text_threshold.is_finite() && self.large_text_threshold >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "large_text_threshold",
                reason: format!("must be non-negative, got {}", self.large_text_threshold),
            });
        }

        Ok(())
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_directory: "Fonts/".to_string(),
            default_pixel_size: 64.0,
            large_text_threshold: 32.0,
            flip_y: true,
        }
    }
}

impl Config for TextConfig {}
