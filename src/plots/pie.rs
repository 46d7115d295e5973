//! Pie and ring plots.
//!
//! A pie draws the first valid series as wedges around one center. A ring
//! draws every valid series as a concentric band, the first series
//! innermost. Wedge sweeps are proportional to the values; the whole plot
//! covers `span` percent of a turn starting at `initial_angle` degrees
//! clockwise from twelve o'clock.

use super::{DataPoint, Plot};
use crate::axis::{Axis, AxisKind, PlotBounds};
use crate::chart_map::layout;
use crate::chart_map::AxisSet;
use crate::color::Rgba;
use crate::config::RenderConfig;
use crate::geometry::Rect;
use crate::path::Path;
use crate::render::Renderer;
use crate::series::Series;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};
use tracing::trace;

pub(super) const PIE_FAMILY: &str = "pie";
pub(super) const RING_FAMILY: &str = "ring";

/// Wedges whose sweep is below this many radians are not drawn.
const MIN_WEDGE: f64 = 1e-3;

/// What to do with negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowNegatives {
    /// Draw the magnitude like any other value.
    #[default]
    Absolute,
    /// Leave the value out of the total.
    Skip,
    /// Draw the magnitude with a white fill.
    White,
}

/// One laid-out wedge in device space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wedge {
    /// Series index.
    pub series: usize,
    /// Element index.
    pub index: usize,
    /// Center x, after separation.
    pub cx: f64,
    /// Center y, after separation.
    pub cy: f64,
    /// Outer radii.
    pub outer: (f64, f64),
    /// Inner radii, zero for a full pie wedge.
    pub inner: (f64, f64),
    /// Start angle in radians.
    pub start: f64,
    /// End angle in radians.
    pub end: f64,
    /// The source value was negative.
    pub negative: bool,
}

impl Wedge {
    /// Outline of the wedge.
    #[must_use]
    pub fn path(&self) -> Path {
        let mut path = Path::new();
        path.ring_wedge(
            self.cx,
            self.cy,
            self.outer.0,
            self.outer.1,
            self.inner.0,
            self.inner.1,
            self.start,
            self.end,
        );
        path
    }

    /// Whether device point `(x, y)` lies inside the wedge.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (rx, ry) = self.outer;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let (u, v) = ((x - self.cx) / rx, (y - self.cy) / ry);
        if u.hypot(v) > 1.0 {
            return false;
        }
        let (ix, iy) = self.inner;
        if ix > 0.0 && iy > 0.0 && ((x - self.cx) / ix).hypot((y - self.cy) / iy) < 1.0 {
            return false;
        }
        let theta = v.atan2(u);
        (theta - self.start).rem_euclid(TAU) <= self.end - self.start
    }
}

/// Pie or ring plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiePlot {
    #[serde(default)]
    series: Vec<Series>,
    #[serde(default)]
    ring: bool,
    /// Degrees clockwise from twelve o'clock.
    #[serde(default)]
    initial_angle: f64,
    /// Percent of a full turn the plot covers.
    #[serde(default = "default_span")]
    span: f64,
    /// Radius fraction left empty in the middle; unset uses
    /// [`RING_HOLE`] for rings and 0 for pies.
    #[serde(default)]
    center_size: Option<f64>,
    /// Separation of wedges without an override, as a radius fraction.
    #[serde(default)]
    default_separation: f64,
    #[serde(default)]
    show_negatives: ShowNegatives,
}

/// Default hole of a ring, as a radius fraction.
pub const RING_HOLE: f64 = 0.5;

fn default_span() -> f64 {
    100.0
}

impl Default for PiePlot {
    fn default() -> Self {
        Self::pie()
    }
}

impl PiePlot {
    /// Pie drawing the first valid series.
    #[must_use]
    pub fn pie() -> Self {
        Self {
            series: Vec::new(),
            ring: false,
            initial_angle: 0.0,
            span: default_span(),
            center_size: None,
            default_separation: 0.0,
            show_negatives: ShowNegatives::Absolute,
        }
    }

    /// Ring drawing every valid series as a band, half the radius hollow.
    #[must_use]
    pub fn ring() -> Self {
        Self {
            ring: true,
            ..Self::pie()
        }
    }

    /// Add a series.
    #[must_use]
    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    /// Start angle in degrees, clockwise from twelve o'clock.
    #[must_use]
    pub fn initial_angle(mut self, degrees: f64) -> Self {
        self.initial_angle = degrees;
        self
    }

    /// Percent of a full turn covered, clamped to `[0, 100]`.
    #[must_use]
    pub fn span(mut self, percent: f64) -> Self {
        self.span = percent.clamp(0.0, 100.0);
        self
    }

    /// Hollow center as a radius fraction, clamped to `[0, 0.95]`.
    #[must_use]
    pub fn center_size(mut self, fraction: f64) -> Self {
        self.center_size = Some(fraction.clamp(0.0, 0.95));
        self
    }

    /// Separation of every wedge without an override.
    #[must_use]
    pub fn separation(mut self, fraction: f64) -> Self {
        self.default_separation = fraction.max(0.0);
        self
    }

    /// Negative value policy.
    #[must_use]
    pub fn show_negatives(mut self, policy: ShowNegatives) -> Self {
        self.show_negatives = policy;
        self
    }

    /// Whether this is a ring plot.
    #[must_use]
    pub fn is_ring(&self) -> bool {
        self.ring
    }

    /// Radius fraction left empty in the middle.
    #[must_use]
    pub fn hole(&self) -> f64 {
        let default = if self.ring { RING_HOLE } else { 0.0 };
        self.center_size.unwrap_or(default).clamp(0.0, 0.95)
    }

    fn drawn_series(&self) -> Vec<(usize, &Series)> {
        let valid = self.series.iter().enumerate().filter(|(_, s)| s.is_valid());
        if self.ring {
            valid.collect()
        } else {
            valid.take(1).collect()
        }
    }

    fn magnitude(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        match self.show_negatives {
            ShowNegatives::Skip if value < 0.0 => 0.0,
            _ => value.abs(),
        }
    }

    fn separation_of(&self, series: &Series, index: usize) -> f64 {
        let sep = series.separation_at(index).unwrap_or(self.default_separation);
        if sep.is_finite() {
            sep.max(0.0)
        } else {
            0.0
        }
    }

    /// Wedges laid out in `area`, in draw order.
    #[must_use]
    pub fn wedges(&self, area: &Rect) -> Vec<Wedge> {
        let drawn = self.drawn_series();
        let sweep = TAU * self.span.clamp(0.0, 100.0) / 100.0;
        if drawn.is_empty() || sweep <= 0.0 || !area.is_drawable() {
            return Vec::new();
        }

        let th0 = self.initial_angle.to_radians() - FRAC_PI_2;
        let fit = layout::circle_parameters(area, th0, th0 + sweep, false);
        let max_sep = drawn
            .iter()
            .flat_map(|(_, s)| (0..s.len()).map(|i| self.separation_of(s, i)))
            .fold(0.0, f64::max);
        let (rx, ry) = (fit.rx / (1.0 + max_sep), fit.ry / (1.0 + max_sep));

        let hole = self.hole();
        let bands = drawn.len() as f64;
        let mut wedges = Vec::new();
        for (band, (si, series)) in drawn.iter().enumerate() {
            let total: f64 = series.values().iter().map(|&v| self.magnitude(v)).sum();
            if total <= 0.0 {
                trace!(series = si, "nothing to draw in pie series");
                continue;
            }
            let scale = sweep / total;
            let inner = hole + (1.0 - hole) * band as f64 / bands;
            let outer = hole + (1.0 - hole) * (band + 1) as f64 / bands;

            let mut angle = th0;
            for (i, &v) in series.values().iter().enumerate() {
                let len = self.magnitude(v) * scale;
                let start = angle;
                angle += len;
                if len < MIN_WEDGE {
                    continue;
                }
                let sep = self.separation_of(series, i);
                let bisector = start + len / 2.0;
                wedges.push(Wedge {
                    series: *si,
                    index: i,
                    cx: fit.cx + sep * rx * bisector.cos(),
                    cy: fit.cy + sep * ry * bisector.sin(),
                    outer: (outer * rx, outer * ry),
                    inner: (inner * rx, inner * ry),
                    start,
                    end: angle,
                    negative: v < 0.0,
                });
            }
        }
        wedges
    }
}

impl Plot for PiePlot {
    fn family(&self) -> &'static str {
        if self.ring {
            RING_FAMILY
        } else {
            PIE_FAMILY
        }
    }

    fn axis_set(&self) -> AxisSet {
        AxisSet::None
    }

    fn axis_bounds(&self, _kind: AxisKind) -> Option<PlotBounds> {
        None
    }

    fn render(&self, renderer: &mut dyn Renderer, area: &Rect, _axes: &[Axis], _config: &RenderConfig) {
        for wedge in self.wedges(area) {
            let style = self.series[wedge.series].style_at(wedge.index);
            let whitened;
            let style = if wedge.negative && self.show_negatives == ShowNegatives::White {
                whitened = style.clone().with_fill(Some(Rgba::WHITE));
                &whitened
            } else {
                style
            };
            renderer.push_style(style);
            renderer.draw_shape(&wedge.path());
            renderer.pop_style();
        }
    }

    fn data_at_point(&self, area: &Rect, _axes: &[Axis], x: f64, y: f64) -> Option<DataPoint> {
        self.wedges(area)
            .iter()
            .rev()
            .find(|w| w.contains(x, y))
            .map(|w| DataPoint {
                series: w.series,
                index: w.index,
            })
    }
}
