//! Render-wide settings.
//!
//! Loaded from YAML or built in code; every field has a default so partial
//! files are fine.

use crate::color::Rgba;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings shared by every plot renderer in a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Bars thinner or shorter than this are widened to it, in device units.
    #[serde(default = "default_min_bar_size")]
    pub min_bar_size: f64,

    /// Error-bar cap width used when a bar does not set its own.
    #[serde(default = "default_error_bar_width")]
    pub error_bar_width: f64,

    /// Data label font size.
    #[serde(default = "default_label_font_size")]
    pub label_font_size: f64,

    /// Digits after the decimal point in data labels.
    #[serde(default = "default_label_precision")]
    pub label_precision: usize,

    /// Maximum distance between a curve and its flattened polyline.
    #[serde(default = "default_flatten_tolerance")]
    pub flatten_tolerance: f64,

    /// Background painted behind the chart, `None` for transparent.
    #[serde(default = "default_background")]
    pub background: Option<Rgba>,
}

fn default_min_bar_size() -> f64 {
    1.0
}
fn default_error_bar_width() -> f64 {
    5.0
}
fn default_label_font_size() -> f64 {
    10.0
}
fn default_label_precision() -> usize {
    2
}
fn default_flatten_tolerance() -> f64 {
    0.25
}
fn default_background() -> Option<Rgba> {
    Some(Rgba::WHITE)
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            min_bar_size: default_min_bar_size(),
            error_bar_width: default_error_bar_width(),
            label_font_size: default_label_font_size(),
            label_precision: default_label_precision(),
            flatten_tolerance: default_flatten_tolerance(),
            background: default_background(),
        }
    }
}

impl RenderConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the YAML does not describe a
    /// configuration.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Loads configuration with fallback to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// Format a data label value.
    #[must_use]
    pub fn format_label(&self, value: f64) -> String {
        format!("{value:.prec$}", prec = self.label_precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::new();
        assert_eq!(config.min_bar_size, 1.0);
        assert_eq!(config.error_bar_width, 5.0);
        assert_eq!(config.background, Some(Rgba::WHITE));
    }

    #[test]
    fn test_parse_partial() {
        let config = RenderConfig::from_yaml_str("min_bar_size: 2.5\nlabel_precision: 0\n").unwrap();
        assert_eq!(config.min_bar_size, 2.5);
        assert_eq!(config.label_precision, 0);
        assert_eq!(config.flatten_tolerance, 0.25);
        assert_eq!(config.format_label(3.7), "4");
    }

    #[test]
    fn test_parse_empty_is_default() {
        assert_eq!(RenderConfig::from_yaml_str("  \n").unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_transparent_background() {
        let config = RenderConfig::from_yaml_str("background: null\n").unwrap();
        assert_eq!(config.background, None);
    }

    #[test]
    fn test_parse_error() {
        let err = RenderConfig::from_yaml_str("min_bar_size: [1, 2]\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_file_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.yaml");
        std::fs::write(&path, "error_bar_width: 8\n").unwrap();
        assert_eq!(RenderConfig::from_file(&path).unwrap().error_bar_width, 8.0);

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(RenderConfig::from_file(&missing), Err(Error::Io(_))));
        assert_eq!(RenderConfig::load_or_default(&missing), RenderConfig::default());
    }
}
