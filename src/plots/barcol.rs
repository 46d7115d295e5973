//! Bar and column plots.
//!
//! Bars are laid out in data space first: category `i` (0-based) owns the
//! index interval `[i + 1, i + 2]`, split between series according to the
//! gap and overlap percentages (side by side) or shared by the whole stack.
//! The layout is then mapped through the pass's chart map.
//!
//! Draw passes: bars, error bars, series lines, labels. In normal mode the
//! series are drawn last to first so that earlier series sit on top where
//! bars overlap; hit testing walks the same order backwards.

use super::{rect_path, DataPoint, Plot};
use crate::axis::{Axis, AxisKind, AxisMap, PlotBounds};
use crate::chart_map::{AxisSet, ChartMap};
use crate::config::RenderConfig;
use crate::error_bar::ErrorBarDirection;
use crate::geometry::{Point, Rect};
use crate::path::Path;
use crate::render::{Renderer, TextAnchor};
use crate::series::Series;
use crate::series_lines::{connector_path, high_low_path, SeriesLines, SeriesLinesKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub(super) const FAMILY: &str = "barcol";

/// Bar layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarColType {
    /// Series side by side.
    #[default]
    Normal,
    /// Series stacked; positive and negative values stack separately.
    Stacked,
    /// Stacked and rescaled so each category's magnitudes sum to 1.
    Percentage,
}

/// One bar in data space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    /// Series index.
    pub series: usize,
    /// Category index (0-based).
    pub index: usize,
    /// Start on the index axis.
    pub start: f64,
    /// Extent on the index axis.
    pub width: f64,
    /// Value-axis position the bar grows from.
    pub base: f64,
    /// Value-axis position of the bar end.
    pub top: f64,
    /// Unscaled data value.
    pub value: f64,
    /// Factor applied to the value (percentage mode).
    pub scale: f64,
}

/// Device rectangle of a bar with its top edge.
#[derive(Debug, Clone, Copy)]
struct DeviceBar {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    leading: Point,
    trailing: Point,
    label_at: Point,
}

impl DeviceBar {
    fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0.min(self.x1) && x <= self.x0.max(self.x1) && y >= self.y0.min(self.y1) && y <= self.y0.max(self.y1)
    }
}

/// Bar/column plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarColPlot {
    #[serde(default)]
    series: Vec<Series>,
    #[serde(default)]
    kind: BarColType,
    #[serde(default = "default_gap")]
    gap_percentage: f64,
    #[serde(default)]
    overlap_percentage: f64,
    #[serde(default)]
    horizontal: bool,
    #[serde(default)]
    before_grid: bool,
    #[serde(default)]
    series_lines: Option<SeriesLines>,
    #[serde(default)]
    show_labels: bool,
}

fn default_gap() -> f64 {
    150.0
}

impl Default for BarColPlot {
    fn default() -> Self {
        Self::new()
    }
}

impl BarColPlot {
    /// Empty vertical column plot, gap 150%, no overlap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            series: Vec::new(),
            kind: BarColType::Normal,
            gap_percentage: default_gap(),
            overlap_percentage: 0.0,
            horizontal: false,
            before_grid: false,
            series_lines: None,
            show_labels: false,
        }
    }

    /// Add a series.
    #[must_use]
    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    /// Set the layout mode.
    #[must_use]
    pub fn kind(mut self, kind: BarColType) -> Self {
        self.kind = kind;
        self
    }

    /// Space between category groups, in percent of a bar width.
    #[must_use]
    pub fn gap(mut self, percentage: f64) -> Self {
        self.gap_percentage = percentage.max(0.0);
        self
    }

    /// Overlap of neighbouring bars, in percent (negative spreads them).
    #[must_use]
    pub fn overlap(mut self, percentage: f64) -> Self {
        self.overlap_percentage = percentage.clamp(-100.0, 100.0);
        self
    }

    /// Draw horizontal bars (categories on the Y axis).
    #[must_use]
    pub fn horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }

    /// Draw this plot before the chart's other plots.
    #[must_use]
    pub fn fill_before_grid(mut self, before: bool) -> Self {
        self.before_grid = before;
        self
    }

    /// Join consecutive bar tops of each series.
    #[must_use]
    pub fn series_lines(mut self, lines: SeriesLines) -> Self {
        self.series_lines = Some(lines);
        self
    }

    /// Label every bar with its value.
    #[must_use]
    pub fn show_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }

    /// Series of the plot.
    #[must_use]
    pub fn series_list(&self) -> &[Series] {
        &self.series
    }

    /// Number of categories (longest valid series).
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.series.iter().filter(|s| s.is_valid()).map(Series::len).max().unwrap_or(0)
    }

    /// Bars in data space, in draw order.
    #[must_use]
    pub fn layout(&self) -> Vec<BarRect> {
        let valid: Vec<(usize, &Series)> = self.series.iter().enumerate().filter(|(_, s)| s.is_valid()).collect();
        let n = self.category_count();
        let mut bars = Vec::new();
        if valid.is_empty() || n == 0 {
            return bars;
        }
        let gap = self.gap_percentage.max(0.0) / 100.0;

        match self.kind {
            BarColType::Normal => {
                let step = 1.0 - self.overlap_percentage / 100.0;
                let dx = 1.0 / (1.0 + (valid.len() - 1) as f64 * step + gap);
                for (j, (si, series)) in valid.iter().enumerate().rev() {
                    for (i, &v) in series.values().iter().enumerate() {
                        if !v.is_finite() {
                            continue;
                        }
                        bars.push(BarRect {
                            series: *si,
                            index: i,
                            start: (i + 1) as f64 + gap * dx / 2.0 + j as f64 * step * dx,
                            width: dx,
                            base: 0.0,
                            top: v,
                            value: v,
                            scale: 1.0,
                        });
                    }
                }
            }
            BarColType::Stacked | BarColType::Percentage => {
                let dx = 1.0 / (1.0 + gap);
                for i in 0..n {
                    let finite = || {
                        valid
                            .iter()
                            .filter_map(move |(si, s)| s.values().get(i).map(|&v| (*si, v)))
                            .filter(|(_, v)| v.is_finite())
                    };
                    let scale = if self.kind == BarColType::Percentage {
                        let sum: f64 = finite().map(|(_, v)| v.abs()).sum();
                        if sum <= 0.0 {
                            continue;
                        }
                        1.0 / sum
                    } else {
                        1.0
                    };

                    let (mut positive, mut negative) = (0.0, 0.0);
                    for (si, v) in finite() {
                        let scaled = v * scale;
                        let base = if scaled >= 0.0 { &mut positive } else { &mut negative };
                        let from = *base;
                        *base += scaled;
                        bars.push(BarRect {
                            series: si,
                            index: i,
                            start: (i + 1) as f64 + gap * dx / 2.0,
                            width: dx,
                            base: from,
                            top: from + scaled,
                            value: v,
                            scale,
                        });
                    }
                }
            }
        }
        bars
    }

    fn value_kind(&self) -> AxisKind {
        if self.horizontal {
            AxisKind::X
        } else {
            AxisKind::Y
        }
    }

    fn index_kind(&self) -> AxisKind {
        if self.horizontal {
            AxisKind::Y
        } else {
            AxisKind::X
        }
    }

    fn chart_map(area: &Rect, axes: &[Axis]) -> ChartMap {
        ChartMap::new(AxisSet::XY, area, axes.first(), axes.get(1), None, false)
    }

    fn maps<'a>(&self, map: &'a ChartMap) -> Option<(&'a AxisMap, &'a AxisMap)> {
        let (index, value) = if self.horizontal { (1, 0) } else { (0, 1) };
        Some((map.axis_map(index)?, map.axis_map(value)?))
    }

    /// One segment per category between the lowest and highest bar end, at
    /// the category center.
    fn high_low_path(&self, map: &ChartMap, bars: &[BarRect]) -> Path {
        let n = self.category_count();
        let mut low = vec![f64::NAN; n];
        let mut high = vec![f64::NAN; n];
        for bar in bars {
            low[bar.index] = low[bar.index].min(bar.top);
            high[bar.index] = high[bar.index].max(bar.top);
        }
        let centers: Vec<f64> = (0..n).map(|i| i as f64 + 1.5).collect();
        high_low_path(map, Some(&centers), &low, &high, self.horizontal)
    }

    fn device_bar(&self, map: &ChartMap, bar: &BarRect, min_size: f64) -> Option<DeviceBar> {
        let (index_map, value_map) = self.maps(map)?;
        let mut i0 = index_map.to_view(bar.start)?;
        let mut i1 = index_map.to_view(bar.start + bar.width)?;
        let v0 = if bar.base == 0.0 {
            Some(value_map.get_baseline()).filter(|v| v.is_finite() && v.abs() != f64::MAX)?
        } else {
            value_map.to_view(bar.base)?
        };
        let v1 = value_map.to_view(bar.top)?;

        if (i1 - i0).abs() < min_size {
            let center = (i0 + i1) / 2.0;
            let half = min_size / 2.0 * if i1 >= i0 { 1.0 } else { -1.0 };
            i0 = center - half;
            i1 = center + half;
        }
        let mid = (i0 + i1) / 2.0;

        Some(if self.horizontal {
            DeviceBar {
                x0: v0,
                y0: i0,
                x1: v1,
                y1: i1,
                leading: Point::new(v1, i0),
                trailing: Point::new(v1, i1),
                label_at: Point::new(v1, mid),
            }
        } else {
            DeviceBar {
                x0: i0,
                y0: v0,
                x1: i1,
                y1: v1,
                leading: Point::new(i0, v1),
                trailing: Point::new(i1, v1),
                label_at: Point::new(mid, v1),
            }
        })
    }
}

impl Plot for BarColPlot {
    fn family(&self) -> &'static str {
        FAMILY
    }

    fn axis_set(&self) -> AxisSet {
        AxisSet::XY
    }

    fn axis_bounds(&self, kind: AxisKind) -> Option<PlotBounds> {
        let n = self.category_count();
        if n == 0 {
            return None;
        }
        if kind == self.index_kind() {
            return Some(PlotBounds::discrete(1.0, (n + 1) as f64));
        }
        if kind != self.value_kind() {
            return None;
        }

        let mut bounds = PlotBounds::new(0.0, 0.0);
        for bar in self.layout() {
            bounds = bounds.union(PlotBounds::new(bar.base.min(bar.top), bar.base.max(bar.top)));
            let errors = self.series[bar.series].y_errors().and_then(|e| e.values_at(bar.index, bar.value));
            if let Some((plus, minus)) = errors {
                bounds = bounds.union(PlotBounds::new(
                    bar.top - minus * bar.scale,
                    bar.top + plus * bar.scale,
                ));
            }
        }
        Some(bounds)
    }

    fn render(&self, renderer: &mut dyn Renderer, area: &Rect, axes: &[Axis], config: &RenderConfig) {
        let bars = self.layout();
        if bars.is_empty() {
            return;
        }
        let map = Self::chart_map(area, axes);
        if !map.is_valid() {
            debug!(plot = FAMILY, "invalid chart map, pass aborted");
            return;
        }

        let n = self.category_count();
        let mut tops = vec![vec![None; n]; self.series.len()];
        let mut errors = Vec::new();
        let mut labels = Vec::new();

        let mut clip = Path::new();
        clip.rectangle(area);
        renderer.push_clip(&clip);

        for bar in &bars {
            let Some(device) = self.device_bar(&map, bar, config.min_bar_size) else {
                continue;
            };
            let series = &self.series[bar.series];
            renderer.push_style(series.style_at(bar.index));
            renderer.draw_polygon(&rect_path(device.x0, device.y0, device.x1, device.y1), true);
            renderer.pop_style();

            tops[bar.series][bar.index] = Some((device.leading, device.trailing));
            if let Some(bar_errors) = series.y_errors() {
                if let Some((plus, minus)) = bar_errors.values_at(bar.index, bar.value) {
                    errors.push((bar_errors, *bar, plus * bar.scale, minus * bar.scale));
                }
            }
            if self.show_labels {
                labels.push((bar.series, bar.index, device.label_at, config.format_label(bar.value)));
            }
        }

        let direction = if self.horizontal {
            ErrorBarDirection::Horizontal
        } else {
            ErrorBarDirection::Vertical
        };
        for (bar_errors, bar, plus, minus) in errors {
            let center = bar.start + bar.width / 2.0;
            let at = if self.horizontal { (bar.top, center) } else { (center, bar.top) };
            bar_errors.render(renderer, &map, at, (plus, minus), direction, config.error_bar_width);
        }

        if let Some(lines) = &self.series_lines {
            match lines.kind {
                SeriesLinesKind::Connector => {
                    for series_tops in &tops {
                        lines.render(renderer, &connector_path(series_tops));
                    }
                }
                SeriesLinesKind::HighLow => lines.render(renderer, &self.high_low_path(&map, &bars)),
                SeriesLinesKind::Drop => debug!(plot = FAMILY, "bars already reach the baseline, drop lines skipped"),
            }
        }
        renderer.pop_clip();

        for (si, index, at, text) in labels {
            renderer.push_style(self.series[si].style_at(index));
            renderer.draw_text(at.x, at.y, &text, TextAnchor::Middle);
            renderer.pop_style();
        }
    }

    fn data_at_point(&self, area: &Rect, axes: &[Axis], x: f64, y: f64) -> Option<DataPoint> {
        let map = Self::chart_map(area, axes);
        if !map.is_valid() {
            return None;
        }
        self.layout().iter().rev().find_map(|bar| {
            let device = self.device_bar(&map, bar, 0.0)?;
            device.contains(x, y).then_some(DataPoint {
                series: bar.series,
                index: bar.index,
            })
        })
    }

    fn before_grid(&self) -> bool {
        self.before_grid
    }
}
