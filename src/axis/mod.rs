//! Axis model consumed by the mapping layer.
//!
//! An [`Axis`] owns the bound descriptor that [`AxisMap`] reads: minimum,
//! maximum, discreteness, inversion and scale kind. Circular axes also carry
//! a rotation and the visible perimeter used by polar layouts.
//!
//! Bounds are either fixed by the caller or derived from what the plots
//! attached to the axis report ([`Axis::auto_bound`]).

mod map;

pub use map::AxisMap;

use serde::{Deserialize, Serialize};

/// Scale applied by an axis before the linear device mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    /// Identity scale.
    #[default]
    Linear,
    /// Natural-log scale; only positive values are representable.
    Log,
}

/// Role of an axis inside a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    /// Horizontal axis of a cartesian chart.
    X,
    /// Vertical axis of a cartesian chart.
    Y,
    /// Angular axis of a polar/radar chart.
    Circular,
    /// Radial axis of a polar/radar chart.
    Radial,
    /// Color axis (value to color map).
    Color,
    /// Bubble-size pseudo axis.
    Bubble,
}

/// Read-only bound descriptor handed to [`AxisMap::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    /// Lower bound in data units.
    pub minimum: f64,
    /// Upper bound in data units.
    pub maximum: f64,
    /// Values are integral category indices.
    #[serde(default)]
    pub is_discrete: bool,
    /// The axis runs from maximum to minimum in device space.
    #[serde(default)]
    pub is_inverted: bool,
    /// Scale kind.
    #[serde(default)]
    pub scale: ScaleKind,
}

impl AxisBounds {
    /// Linear, non-inverted, continuous bounds.
    #[must_use]
    pub const fn linear(minimum: f64, maximum: f64) -> Self {
        Self {
            minimum,
            maximum,
            is_discrete: false,
            is_inverted: false,
            scale: ScaleKind::Linear,
        }
    }

    /// Logarithmic bounds.
    #[must_use]
    pub const fn log(minimum: f64, maximum: f64) -> Self {
        Self {
            scale: ScaleKind::Log,
            ..Self::linear(minimum, maximum)
        }
    }

    /// Discrete (category index) bounds.
    #[must_use]
    pub const fn discrete(minimum: f64, maximum: f64) -> Self {
        Self {
            is_discrete: true,
            ..Self::linear(minimum, maximum)
        }
    }

    /// Same bounds, inverted.
    #[must_use]
    pub const fn inverted(mut self) -> Self {
        self.is_inverted = true;
        self
    }
}

/// Value range a plot reports for one of its axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotBounds {
    /// Smallest value the plot needs visible.
    pub minimum: f64,
    /// Largest value the plot needs visible.
    pub maximum: f64,
    /// The plot addresses this axis by category index.
    pub is_discrete: bool,
}

impl PlotBounds {
    /// Continuous range.
    #[must_use]
    pub const fn new(minimum: f64, maximum: f64) -> Self {
        Self {
            minimum,
            maximum,
            is_discrete: false,
        }
    }

    /// Category-index range.
    #[must_use]
    pub const fn discrete(minimum: f64, maximum: f64) -> Self {
        Self {
            minimum,
            maximum,
            is_discrete: true,
        }
    }

    /// Range covering both.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            minimum: self.minimum.min(other.minimum),
            maximum: self.maximum.max(other.maximum),
            is_discrete: self.is_discrete && other.is_discrete,
        }
    }

    /// Smallest finite range covering every finite value, `None` if there is none.
    #[must_use]
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<Self> {
        values
            .into_iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Self>, v| {
                Some(match acc {
                    Some(b) => Self::new(b.minimum.min(v), b.maximum.max(v)),
                    None => Self::new(v, v),
                })
            })
    }
}

/// An axis of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    kind: AxisKind,
    #[serde(default)]
    scale: ScaleKind,
    #[serde(default)]
    inverted: bool,
    #[serde(default)]
    discrete: bool,
    #[serde(default)]
    minimum: f64,
    #[serde(default = "default_maximum")]
    maximum: f64,
    #[serde(default)]
    fixed_minimum: Option<f64>,
    #[serde(default)]
    fixed_maximum: Option<f64>,
    /// Degrees, clockwise, circular axes only.
    #[serde(default)]
    rotation: f64,
    /// Visible arc in degrees, circular axes only.
    #[serde(default = "default_perimeter")]
    perimeter: (f64, f64),
}

fn default_maximum() -> f64 {
    1.0
}

fn default_perimeter() -> (f64, f64) {
    (0.0, 360.0)
}

impl Axis {
    /// Create an axis with bounds `[0, 1]`.
    #[must_use]
    pub fn new(kind: AxisKind) -> Self {
        Self {
            kind,
            scale: ScaleKind::Linear,
            inverted: false,
            discrete: false,
            minimum: 0.0,
            maximum: default_maximum(),
            fixed_minimum: None,
            fixed_maximum: None,
            rotation: 0.0,
            perimeter: default_perimeter(),
        }
    }

    /// Set the scale kind.
    #[must_use]
    pub fn scale(mut self, scale: ScaleKind) -> Self {
        self.scale = scale;
        self
    }

    /// Invert the axis.
    #[must_use]
    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    /// Mark the axis as a category axis.
    #[must_use]
    pub fn discrete(mut self, discrete: bool) -> Self {
        self.discrete = discrete;
        self
    }

    /// Pin both bounds; [`Axis::auto_bound`] keeps them.
    #[must_use]
    pub fn with_bounds(mut self, minimum: f64, maximum: f64) -> Self {
        self.fixed_minimum = Some(minimum);
        self.fixed_maximum = Some(maximum);
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    /// Pin only the lower bound.
    #[must_use]
    pub fn fixed_minimum(mut self, minimum: f64) -> Self {
        self.fixed_minimum = Some(minimum);
        self.minimum = minimum;
        self
    }

    /// Pin only the upper bound.
    #[must_use]
    pub fn fixed_maximum(mut self, maximum: f64) -> Self {
        self.fixed_maximum = Some(maximum);
        self.maximum = maximum;
        self
    }

    /// Rotation of a circular axis in degrees.
    #[must_use]
    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Visible arc of a circular axis, in degrees from the rotated origin.
    #[must_use]
    pub fn perimeter(mut self, start: f64, stop: f64) -> Self {
        self.perimeter = (start, stop);
        self
    }

    /// Role of this axis.
    #[must_use]
    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    /// Current bound descriptor.
    #[must_use]
    pub fn bounds(&self) -> AxisBounds {
        AxisBounds {
            minimum: self.minimum,
            maximum: self.maximum,
            is_discrete: self.discrete,
            is_inverted: self.inverted,
            scale: self.scale,
        }
    }

    /// Category axis.
    #[must_use]
    pub fn is_discrete(&self) -> bool {
        self.discrete
    }

    /// Inverted axis.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Scale kind.
    #[must_use]
    pub fn scale_kind(&self) -> ScaleKind {
        self.scale
    }

    /// Rotation in radians.
    #[must_use]
    pub fn circular_rotation(&self) -> f64 {
        self.rotation.to_radians()
    }

    /// Visible arc `(start, stop)` in radians.
    #[must_use]
    pub fn polar_perimeter(&self) -> (f64, f64) {
        (self.perimeter.0.to_radians(), self.perimeter.1.to_radians())
    }

    /// Recompute the bounds from the ranges reported by the attached plots.
    ///
    /// Pinned bounds win. Discrete axes take the reported index range as is.
    /// Continuous circular axes take their perimeter in degrees, so one turn
    /// stays 360 units. Other continuous axes are widened to round steps; log
    /// axes to powers of ten, ignoring non-positive values.
    pub fn auto_bound(&mut self, reported: &[PlotBounds]) {
        let Some(mut range) = reported.iter().copied().reduce(PlotBounds::union) else {
            return;
        };
        if reported.iter().any(|b| b.is_discrete) {
            self.discrete = true;
        }

        if self.discrete {
            range.minimum = range.minimum.floor();
            range.maximum = range.maximum.ceil();
        } else if self.kind == AxisKind::Circular {
            // Angles in degrees: the visible arc covers exactly its own span.
            range.minimum = self.perimeter.0;
            range.maximum = self.perimeter.1;
        } else {
            match self.scale {
                ScaleKind::Linear => {
                    if range.maximum <= range.minimum {
                        range.minimum -= 1.0;
                        range.maximum += 1.0;
                    }
                    let step = nice_step(range.maximum - range.minimum);
                    range.minimum = (range.minimum / step).floor() * step;
                    range.maximum = (range.maximum / step).ceil() * step;
                }
                ScaleKind::Log => {
                    if range.minimum <= 0.0 {
                        range.minimum = range.maximum.min(1.0) / 10.0;
                    }
                    if range.maximum <= 0.0 {
                        range.maximum = 1.0;
                    }
                    range.minimum = 10f64.powf(range.minimum.log10().floor());
                    range.maximum = 10f64.powf(range.maximum.log10().ceil());
                    if range.maximum <= range.minimum {
                        range.maximum = range.minimum * 10.0;
                    }
                }
            }
        }

        self.minimum = self.fixed_minimum.unwrap_or(range.minimum);
        self.maximum = self.fixed_maximum.unwrap_or(range.maximum);
        tracing::trace!(kind = ?self.kind, self.minimum, self.maximum, "axis bounds");
    }
}

/// Round step giving five to ten intervals over `span`.
fn nice_step(span: f64) -> f64 {
    if !span.is_finite() || span <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(span.log10().floor());
    let ratio = span / magnitude;
    if ratio <= 2.0 {
        magnitude / 5.0
    } else if ratio <= 5.0 {
        magnitude / 2.0
    } else {
        magnitude
    }
}
