//! Drawing style pushed onto a renderer.

use crate::color::Rgba;
use serde::{Deserialize, Serialize};

/// Marker shape drawn at data points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    /// No marker.
    #[default]
    None,
    /// Filled circle.
    Circle,
    /// Axis-aligned square.
    Square,
    /// Square rotated by 45 degrees.
    Diamond,
    /// Upward triangle.
    Triangle,
    /// Diagonal cross.
    Cross,
}

/// Marker settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Marker {
    /// Shape.
    pub shape: MarkerShape,
    /// Size in device units (diameter or side).
    pub size: f64,
    /// Fill color.
    pub fill: Rgba,
    /// Outline color.
    pub outline: Rgba,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            shape: MarkerShape::None,
            size: 6.0,
            fill: Rgba::BLACK,
            outline: Rgba::BLACK,
        }
    }
}

impl Marker {
    /// Marker of `shape` and `size` in black.
    #[must_use]
    pub fn new(shape: MarkerShape, size: f64) -> Self {
        Self {
            shape,
            size,
            ..Self::default()
        }
    }

    /// Whether the marker draws anything.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.shape != MarkerShape::None && self.size > 0.0
    }
}

/// Outline (stroke) settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Stroke color.
    pub color: Rgba,
    /// Stroke width in device units; 0 draws a hairline.
    pub width: f64,
}

/// Fill, outline and marker for one visual element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Fill color, `None` for no fill.
    #[serde(default)]
    pub fill: Option<Rgba>,
    /// Outline, `None` for no stroke.
    #[serde(default)]
    pub outline: Option<Outline>,
    /// Marker drawn by `draw_marker`.
    #[serde(default)]
    pub marker: Marker,
    /// Text color for labels.
    #[serde(default = "default_text_color")]
    pub text_color: Rgba,
}

fn default_text_color() -> Rgba {
    Rgba::BLACK
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            outline: Some(Outline {
                color: Rgba::BLACK,
                width: 1.0,
            }),
            marker: Marker::default(),
            text_color: Rgba::BLACK,
        }
    }
}

impl Style {
    /// Filled style with a thin black outline.
    #[must_use]
    pub fn filled(color: Rgba) -> Self {
        Self {
            fill: Some(color),
            ..Self::default()
        }
    }

    /// Stroke-only style.
    #[must_use]
    pub fn stroked(color: Rgba, width: f64) -> Self {
        Self {
            fill: None,
            outline: Some(Outline { color, width }),
            ..Self::default()
        }
    }

    /// Replace the fill.
    #[must_use]
    pub fn with_fill(mut self, fill: Option<Rgba>) -> Self {
        self.fill = fill;
        self
    }

    /// Replace the outline.
    #[must_use]
    pub fn with_outline(mut self, color: Rgba, width: f64) -> Self {
        self.outline = Some(Outline { color, width });
        self
    }

    /// Remove the outline.
    #[must_use]
    pub fn without_outline(mut self) -> Self {
        self.outline = None;
        self
    }

    /// Replace the marker.
    #[must_use]
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }

    /// Stroke width, 0 when there is no outline.
    #[must_use]
    pub fn line_width(&self) -> f64 {
        self.outline.map_or(0.0, |o| o.width)
    }

    /// Whether filling draws anything.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.fill.is_some_and(|c| !c.is_transparent())
    }

    /// Whether stroking draws anything.
    #[must_use]
    pub fn is_outlined(&self) -> bool {
        self.outline.is_some_and(|o| !o.color.is_transparent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_strokes_only() {
        let style = Style::default();
        assert!(!style.is_filled());
        assert!(style.is_outlined());
        assert_eq!(style.line_width(), 1.0);
    }

    #[test]
    fn test_builders() {
        let style = Style::filled(Rgba::RED)
            .without_outline()
            .with_marker(Marker::new(MarkerShape::Square, 4.0));
        assert!(style.is_filled());
        assert!(!style.is_outlined());
        assert_eq!(style.line_width(), 0.0);
        assert!(style.marker.is_visible());
    }

    #[test]
    fn test_transparent_fill_is_not_filled() {
        assert!(!Style::filled(Rgba::TRANSPARENT).is_filled());
    }

    #[test]
    fn test_style_from_yaml() {
        let style: Style = serde_yaml_ng::from_str(
            "fill: { r: 10, g: 20, b: 30, a: 255 }\noutline: { color: { r: 0, g: 0, b: 0, a: 255 }, width: 2.5 }\n",
        )
        .unwrap();
        assert_eq!(style.fill, Some(Rgba::rgb(10, 20, 30)));
        assert_eq!(style.line_width(), 2.5);
        assert_eq!(style.marker.shape, MarkerShape::None);
    }
}
