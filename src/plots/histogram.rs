//! Histograms over explicit bin limits.
//!
//! A histogram series carries `limits` (bin edges, one more than the values)
//! and `values` (bin counts). Bins may be irregular; each is drawn at height
//! `value / width`, so the value axis shows densities rather than counts.
//! A double histogram mirrors the series' second value column below the
//! axis.
//!
//! Raw samples can be binned with [`bin_samples`] using one of the usual
//! bin-count rules.

use super::{DataPoint, Plot};
use crate::axis::{Axis, AxisKind, PlotBounds, ScaleKind};
use crate::chart_map::{AxisSet, ChartMap};
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::path::Path;
use crate::render::Renderer;
use crate::series::Series;
use crate::style::Style;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub(super) const FAMILY: &str = "histogram";
pub(super) const DOUBLE_FAMILY: &str = "double_histogram";

/// Binning strategy for [`bin_samples`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinStrategy {
    /// Sturges' rule: ceil(log2(n) + 1)
    #[default]
    Sturges,
    /// Scott's rule: 3.5 * std / n^(1/3)
    Scott,
    /// Freedman-Diaconis rule: 2 * IQR / n^(1/3)
    FreedmanDiaconis,
    /// Fixed number of bins
    Fixed(usize),
}

/// Upper limit on the number of bins [`bin_samples`] produces.
pub const MAX_BINS: usize = 10_000;

impl BinStrategy {
    /// Number of bins for `samples` (finite, non-empty), at most [`MAX_BINS`].
    ///
    /// Width-based rules fall back to Sturges when the width is zero or would
    /// need more than [`MAX_BINS`] bins.
    fn bin_count(self, samples: &[f64]) -> usize {
        let n = samples.len() as f64;
        let sturges = (n.log2().ceil() + 1.0) as usize;
        let range = range_of(samples);
        let by_width = |width: f64| {
            let bins = range / width;
            if width > 0.0 && bins.is_finite() && bins <= MAX_BINS as f64 {
                bins.ceil() as usize
            } else {
                sturges
            }
        };
        match self {
            Self::Sturges => sturges,
            Self::Scott => by_width(3.5 * std_dev(samples) / n.cbrt()),
            Self::FreedmanDiaconis => by_width(2.0 * iqr(samples) / n.cbrt()),
            Self::Fixed(bins) => bins,
        }
        .clamp(1, MAX_BINS)
    }
}

fn range_of(samples: &[f64]) -> f64 {
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    max - min
}

fn std_dev(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (samples.len() - 1) as f64;
    variance.sqrt()
}

fn iqr(samples: &[f64]) -> f64 {
    if samples.len() < 4 {
        return range_of(samples);
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted[3 * sorted.len() / 4] - sorted[sorted.len() / 4]
}

/// Bin raw samples into a histogram series with regular limits.
///
/// Non-finite samples are ignored. When every sample is equal a single bin
/// of width 1 is centered on them.
///
/// # Errors
///
/// Returns [`Error::EmptyData`] if there is no finite sample.
pub fn bin_samples(samples: &[f64], strategy: BinStrategy) -> Result<Series> {
    let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(Error::EmptyData);
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let range = range_of(&finite);
    if range <= 0.0 {
        return Ok(Series::new(vec![finite.len() as f64]).with_limits(vec![min - 0.5, min + 0.5]));
    }

    let bins = strategy.bin_count(&finite);
    let width = range / bins as f64;
    let mut counts = vec![0.0; bins];
    for &value in &finite {
        let bin = (((value - min) / width).floor() as usize).min(bins - 1);
        counts[bin] += 1.0;
    }
    let limits: Vec<f64> = (0..=bins).map(|i| min + width * i as f64).collect();
    Ok(Series::new(counts).with_limits(limits))
}

/// One bin in data space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    /// Lower limit.
    pub lo: f64,
    /// Upper limit.
    pub hi: f64,
    /// Midpoint.
    pub mid: f64,
    /// Drawn height: `value / (hi - lo)`, or the running total when cumulative.
    pub density: f64,
    /// Height of the mirrored half (double histograms).
    pub density2: Option<f64>,
}

impl HistogramBin {
    fn is_drawable(&self) -> bool {
        self.lo.is_finite() && self.hi.is_finite() && self.hi != self.lo
    }
}

/// Histogram or double histogram plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramPlot {
    #[serde(default)]
    series: Vec<Series>,
    #[serde(default = "default_vertical")]
    vertical: bool,
    #[serde(default)]
    cumulative: bool,
    #[serde(default)]
    double: bool,
    /// Style of the mirrored half; the series style when absent.
    #[serde(default)]
    second_style: Option<Style>,
}

fn default_vertical() -> bool {
    true
}

impl Default for HistogramPlot {
    fn default() -> Self {
        Self::new()
    }
}

impl HistogramPlot {
    /// Vertical histogram.
    #[must_use]
    pub fn new() -> Self {
        Self {
            series: Vec::new(),
            vertical: true,
            cumulative: false,
            double: false,
            second_style: None,
        }
    }

    /// Double histogram mirroring each series' second values.
    #[must_use]
    pub fn double() -> Self {
        Self {
            double: true,
            ..Self::new()
        }
    }

    /// Add a series.
    #[must_use]
    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    /// Bars grow along Y (`true`) or along X.
    #[must_use]
    pub fn vertical(mut self, vertical: bool) -> Self {
        self.vertical = vertical;
        self
    }

    /// Draw running totals instead of densities.
    #[must_use]
    pub fn cumulative(mut self, cumulative: bool) -> Self {
        self.cumulative = cumulative;
        self
    }

    /// Style of the mirrored half.
    #[must_use]
    pub fn second_style(mut self, style: Style) -> Self {
        self.second_style = Some(style);
        self
    }

    fn is_usable(series: &Series) -> bool {
        series.is_valid() && series.limits().is_some_and(|l| l.len() >= 2)
    }

    /// Bins of series `index`; empty when it has no limits.
    #[must_use]
    pub fn bins(&self, index: usize) -> Vec<HistogramBin> {
        self.series.get(index).map_or_else(Vec::new, |s| self.bins_of(s))
    }

    fn bins_of(&self, series: &Series) -> Vec<HistogramBin> {
        let Some(limits) = series.limits().filter(|_| Self::is_usable(series)) else {
            return Vec::new();
        };
        let values = series.values();
        let second = series.second_values().filter(|_| self.double);
        let n = values.len().min(limits.len() - 1);

        let (mut total, mut total2) = (0.0, 0.0);
        let height = |value: f64, width: f64, total: &mut f64| -> f64 {
            if !value.is_finite() || !width.is_finite() || width <= 0.0 {
                return f64::NAN;
            }
            if self.cumulative {
                *total += value;
                *total
            } else {
                value / width
            }
        };

        (0..n)
            .map(|i| {
                let (lo, hi) = (limits[i], limits[i + 1]);
                let width = hi - lo;
                let density = height(values[i], width, &mut total);
                let density2 = second.map(|s| height(s.get(i).copied().unwrap_or(f64::NAN), width, &mut total2));
                HistogramBin {
                    lo,
                    hi,
                    mid: (lo + hi) / 2.0,
                    density,
                    density2,
                }
            })
            .collect()
    }

    fn bin_kind(&self) -> AxisKind {
        if self.vertical {
            AxisKind::X
        } else {
            AxisKind::Y
        }
    }

    fn value_kind(&self) -> AxisKind {
        if self.vertical {
            AxisKind::Y
        } else {
            AxisKind::X
        }
    }

    fn value_index(&self) -> usize {
        usize::from(!self.vertical)
    }

    fn chart_map(area: &Rect, axes: &[Axis]) -> ChartMap {
        ChartMap::new(AxisSet::XY, area, axes.first(), axes.get(1), None, false)
    }

    /// Device point at bin position `at` and height `value`.
    fn point(&self, map: &ChartMap, at: f64, value: f64) -> Option<Point> {
        if self.vertical {
            map.to_point(at, value)
        } else {
            map.to_point(value, at)
        }
    }

    /// Data value the bars grow from: 0 clamped into the value axis, or its
    /// minimum on a log axis.
    fn base_value(&self, map: &ChartMap) -> Option<f64> {
        let value_map = map.axis_map(self.value_index())?;
        let (lo, hi) = value_map.get_bounds();
        Some(match value_map.scale() {
            ScaleKind::Log => lo,
            ScaleKind::Linear => 0f64.clamp(lo.min(hi), hi.max(lo)),
        })
    }

    /// Outline of every run of consecutive drawable bins.
    fn outline(&self, map: &ChartMap, bins: &[HistogramBin], height: impl Fn(&HistogramBin) -> Option<f64>) -> Path {
        let mut path = Path::new();
        let Some(base) = self.base_value(map) else {
            return path;
        };
        let mut open: Option<Point> = None;
        for bin in bins {
            let corners = height(bin).filter(|h| h.is_finite() && bin.is_drawable()).and_then(|h| {
                Some((
                    self.point(map, bin.lo, base)?,
                    self.point(map, bin.lo, h)?,
                    self.point(map, bin.hi, h)?,
                    self.point(map, bin.hi, base)?,
                ))
            });
            match corners {
                Some((foot, top_lo, top_hi, end)) => {
                    if open.is_none() {
                        path.move_to(foot.x, foot.y);
                    }
                    path.line_to(top_lo.x, top_lo.y).line_to(top_hi.x, top_hi.y);
                    open = Some(end);
                }
                None => {
                    if let Some(end) = open.take() {
                        path.line_to(end.x, end.y).close();
                    }
                }
            }
        }
        if let Some(end) = open {
            path.line_to(end.x, end.y).close();
        }
        path
    }
}

impl Plot for HistogramPlot {
    fn family(&self) -> &'static str {
        if self.double {
            DOUBLE_FAMILY
        } else {
            FAMILY
        }
    }

    fn axis_set(&self) -> AxisSet {
        AxisSet::XY
    }

    fn axis_bounds(&self, kind: AxisKind) -> Option<PlotBounds> {
        let usable: Vec<&Series> = self.series.iter().filter(|s| Self::is_usable(s)).collect();
        if usable.is_empty() {
            return None;
        }
        if kind == self.bin_kind() {
            return usable
                .iter()
                .filter_map(|s| PlotBounds::from_values(s.limits()?))
                .reduce(PlotBounds::union);
        }
        if kind != self.value_kind() {
            return None;
        }
        let heights: Vec<f64> = usable
            .iter()
            .flat_map(|s| self.bins_of(s))
            .flat_map(|b| [Some(b.density), b.density2.map(|d| -d)])
            .flatten()
            .collect();
        let zero = PlotBounds::new(0.0, 0.0);
        Some(PlotBounds::from_values(&heights).map_or(zero, |b| b.union(zero)))
    }

    fn render(&self, renderer: &mut dyn Renderer, area: &Rect, axes: &[Axis], _config: &RenderConfig) {
        if !self.series.iter().any(Self::is_usable) {
            return;
        }
        let map = Self::chart_map(area, axes);
        if !map.is_valid() {
            debug!(plot = self.family(), "invalid chart map, pass aborted");
            return;
        }

        let mut clip = Path::new();
        clip.rectangle(area);
        renderer.push_clip(&clip);
        for series in self.series.iter().filter(|s| Self::is_usable(s)) {
            let bins = self.bins_of(series);

            let upper = self.outline(&map, &bins, |b| Some(b.density));
            if !upper.is_empty() {
                renderer.push_style(series.style());
                renderer.draw_shape(&upper);
                renderer.pop_style();
            }

            if self.double {
                let lower = self.outline(&map, &bins, |b| b.density2.map(|d| -d));
                if !lower.is_empty() {
                    renderer.push_style(self.second_style.as_ref().unwrap_or(series.style()));
                    renderer.draw_shape(&lower);
                    renderer.pop_style();
                }
            }
        }
        renderer.pop_clip();
    }

    fn data_at_point(&self, area: &Rect, axes: &[Axis], x: f64, y: f64) -> Option<DataPoint> {
        let map = Self::chart_map(area, axes);
        if !map.is_valid() {
            return None;
        }
        let base = self.base_value(&map)?;
        let (dx, dy) = (map.axis_map(0)?.from_view(x), map.axis_map(1)?.from_view(y));
        let (at, value) = if self.vertical { (dx, dy) } else { (dy, dx) };
        let between = |v: f64, a: f64, b: f64| v >= a.min(b) && v <= a.max(b);

        self.series.iter().enumerate().rev().filter(|(_, s)| Self::is_usable(s)).find_map(|(si, series)| {
            self.bins_of(series).iter().enumerate().find_map(|(index, bin)| {
                if !bin.is_drawable() || !between(at, bin.lo, bin.hi) {
                    return None;
                }
                let upper = between(value, base, bin.density);
                let lower = bin.density2.is_some_and(|d| d.is_finite() && between(value, base, -d));
                (upper || lower).then_some(DataPoint { series: si, index })
            })
        })
    }
}
