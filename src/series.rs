//! Series data handed to the plot renderers.
//!
//! A series is a set of parallel value columns drawn as one visual unit. The
//! columns a plot needs depend on its family: bar, pie and radar plots read
//! `values` (with optional `x` positions or angles), histograms read `limits`
//! and `values`. Columns are read-only during a render pass.

use crate::chart_map::{Interpolation, SeriesFillType};
use crate::error::{Error, Result};
use crate::error_bar::ErrorBar;
use crate::style::Style;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-element settings overriding the series defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementOverride {
    /// Wedge separation as a fraction of the radius (pie and ring plots).
    #[serde(default)]
    pub separation: Option<f64>,
    /// Style for this element only.
    #[serde(default)]
    pub style: Option<Style>,
}

/// One series of a plot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Main values (Y, radius, wedge size, bin count).
    #[serde(default)]
    values: Vec<f64>,
    /// Positions (X, angle); absent means the 1-based index.
    #[serde(default)]
    x: Option<Vec<f64>>,
    /// Bin limits of a histogram, one more than `values`.
    #[serde(default)]
    limits: Option<Vec<f64>>,
    /// Second value column (mirrored half of a double histogram).
    #[serde(default)]
    second_values: Option<Vec<f64>>,
    #[serde(default)]
    style: Style,
    #[serde(default)]
    interpolation: Interpolation,
    #[serde(default)]
    fill_type: SeriesFillType,
    /// Errors on the positions.
    #[serde(default)]
    x_errors: Option<ErrorBar>,
    /// Errors on the values.
    #[serde(default)]
    y_errors: Option<ErrorBar>,
    #[serde(default)]
    overrides: BTreeMap<usize, ElementOverride>,
}

impl Series {
    /// Series over `values` with default style.
    #[must_use]
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            ..Self::default()
        }
    }

    /// Set the name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set explicit positions.
    #[must_use]
    pub fn with_x(mut self, x: impl Into<Vec<f64>>) -> Self {
        self.x = Some(x.into());
        self
    }

    /// Set histogram bin limits.
    #[must_use]
    pub fn with_limits(mut self, limits: impl Into<Vec<f64>>) -> Self {
        self.limits = Some(limits.into());
        self
    }

    /// Set the second value column.
    #[must_use]
    pub fn with_second_values(mut self, values: impl Into<Vec<f64>>) -> Self {
        self.second_values = Some(values.into());
        self
    }

    /// Set the series style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set the interpolation between points.
    #[must_use]
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Set the area fill policy.
    #[must_use]
    pub fn with_fill(mut self, fill_type: SeriesFillType) -> Self {
        self.fill_type = fill_type;
        self
    }

    /// Attach error bars on the positions.
    #[must_use]
    pub fn with_x_errors(mut self, errors: ErrorBar) -> Self {
        self.x_errors = Some(errors);
        self
    }

    /// Attach error bars on the values.
    #[must_use]
    pub fn with_y_errors(mut self, errors: ErrorBar) -> Self {
        self.y_errors = Some(errors);
        self
    }

    /// Override the style of element `index`.
    #[must_use]
    pub fn with_element_style(mut self, index: usize, style: Style) -> Self {
        self.overrides.entry(index).or_default().style = Some(style);
        self
    }

    /// Override the separation of element `index`.
    #[must_use]
    pub fn with_separation(mut self, index: usize, separation: f64) -> Self {
        self.overrides.entry(index).or_default().separation = Some(separation);
        self
    }

    /// Check that explicit positions match the values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyData`] without values and
    /// [`Error::DataLengthMismatch`] when `x` is shorter than the values.
    pub fn validate(&self) -> Result<()> {
        if self.values.is_empty() {
            return Err(Error::EmptyData);
        }
        if let Some(x) = &self.x {
            if x.len() < self.values.len() {
                return Err(Error::DataLengthMismatch {
                    x_len: x.len(),
                    y_len: self.values.len(),
                });
            }
        }
        Ok(())
    }

    /// Values are bound and non-empty.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.values.is_empty()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// No elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Main values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Explicit positions, if any.
    #[must_use]
    pub fn x(&self) -> Option<&[f64]> {
        self.x.as_deref()
    }

    /// Histogram limits, if any.
    #[must_use]
    pub fn limits(&self) -> Option<&[f64]> {
        self.limits.as_deref()
    }

    /// Second value column, if any.
    #[must_use]
    pub fn second_values(&self) -> Option<&[f64]> {
        self.second_values.as_deref()
    }

    /// Series style.
    #[must_use]
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Style of element `index`, the override when there is one.
    #[must_use]
    pub fn style_at(&self, index: usize) -> &Style {
        self.overrides
            .get(&index)
            .and_then(|o| o.style.as_ref())
            .unwrap_or(&self.style)
    }

    /// Separation override of element `index`.
    #[must_use]
    pub fn separation_at(&self, index: usize) -> Option<f64> {
        self.overrides.get(&index).and_then(|o| o.separation)
    }

    /// Interpolation between points.
    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Area fill policy.
    #[must_use]
    pub fn fill_type(&self) -> SeriesFillType {
        self.fill_type
    }

    /// Errors on the positions.
    #[must_use]
    pub fn x_errors(&self) -> Option<&ErrorBar> {
        self.x_errors.as_ref()
    }

    /// Errors on the values.
    #[must_use]
    pub fn y_errors(&self) -> Option<&ErrorBar> {
        self.y_errors.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    #[test]
    fn test_validity() {
        assert!(!Series::default().is_valid());
        assert!(matches!(Series::default().validate(), Err(Error::EmptyData)));

        let series = Series::new(vec![1.0, 2.0, 3.0]).with_x(vec![1.0]);
        assert!(series.is_valid());
        assert!(matches!(
            series.validate(),
            Err(Error::DataLengthMismatch { x_len: 1, y_len: 3 })
        ));
        assert!(Series::new(vec![1.0]).validate().is_ok());
    }

    #[test]
    fn test_element_overrides() {
        let red = Style::filled(Rgba::RED);
        let series = Series::new(vec![1.0, 2.0])
            .with_element_style(1, red.clone())
            .with_separation(1, 0.2);
        assert_eq!(series.style_at(0), &Style::default());
        assert_eq!(series.style_at(1), &red);
        assert_eq!(series.separation_at(0), None);
        assert_eq!(series.separation_at(1), Some(0.2));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = "
name: sales
values: [1, 2, 3]
interpolation: spline
fill_type: y_origin
overrides:
  2:
    separation: 0.5
";
        let series: Series = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(series.name, "sales");
        assert_eq!(series.len(), 3);
        assert_eq!(series.interpolation(), Interpolation::Spline);
        assert_eq!(series.fill_type(), SeriesFillType::YOrigin);
        assert_eq!(series.separation_at(2), Some(0.5));
        assert!(series.x().is_none());
    }
}
