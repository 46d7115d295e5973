//! Radar and polar plots.
//!
//! A radar plot places the values of each series on the vertices of a
//! regular polygon, one vertex per category. A polar plot places them at
//! explicit angles read from the series' `x` column on a continuous
//! circular axis.
//!
//! Passes: area fills, drop or high-low lines, series lines, markers, error
//! bars.

use super::{DataPoint, Plot};
use crate::axis::{Axis, AxisKind, PlotBounds};
use crate::chart_map::{AxisSet, ChartMap, Interpolation, SeriesFillType};
use crate::config::RenderConfig;
use crate::error_bar::ErrorBarDirection;
use crate::geometry::{Point, Rect};
use crate::path::{Path, PathOp};
use crate::render::Renderer;
use crate::series::Series;
use crate::series_lines::{drop_path, high_low_path, value_extremes, SeriesLines, SeriesLinesKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub(super) const RADAR_FAMILY: &str = "radar";
pub(super) const POLAR_FAMILY: &str = "polar";

/// Hit radius around a data point, in device units.
const HIT_RADIUS: f64 = 5.0;

/// Radar or polar plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarPlot {
    #[serde(default)]
    series: Vec<Series>,
    #[serde(default)]
    polar: bool,
    #[serde(default)]
    fill_area: bool,
    #[serde(default)]
    series_lines: Option<SeriesLines>,
}

impl Default for RadarPlot {
    fn default() -> Self {
        Self::radar()
    }
}

impl RadarPlot {
    /// Radar plot over discrete categories.
    #[must_use]
    pub fn radar() -> Self {
        Self {
            series: Vec::new(),
            polar: false,
            fill_area: false,
            series_lines: None,
        }
    }

    /// Polar plot over a continuous circular axis.
    #[must_use]
    pub fn polar() -> Self {
        Self {
            polar: true,
            ..Self::radar()
        }
    }

    /// Add a series.
    #[must_use]
    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    /// Stretch the layout to the whole area instead of keeping it round.
    #[must_use]
    pub fn fill_area(mut self, fill: bool) -> Self {
        self.fill_area = fill;
        self
    }

    /// Draw drop lines from every point to the center, or high-low lines
    /// between the lowest and highest value at each position.
    #[must_use]
    pub fn series_lines(mut self, lines: SeriesLines) -> Self {
        self.series_lines = Some(lines);
        self
    }

    /// Whether this is a polar plot.
    #[must_use]
    pub fn is_polar(&self) -> bool {
        self.polar
    }

    fn valid_series(&self) -> Vec<&Series> {
        self.series.iter().filter(|s| s.is_valid()).collect()
    }

    fn chart_map(&self, area: &Rect, axes: &[Axis]) -> ChartMap {
        ChartMap::new(AxisSet::Radar, area, axes.first(), axes.get(1), None, self.fill_area)
    }

    /// Device path of one series. Radar lines without gaps close back to
    /// their first vertex.
    fn series_path(&self, map: &ChartMap, series: &Series) -> Path {
        let interpolation = series.interpolation();
        let mut path = map.make_path(series.x(), Some(series.values()), interpolation, false);
        if !self.polar
            && series.len() > 2
            && interpolation != Interpolation::ClosedSpline
            && path.sub_path_count() == 1
            && path.vertex_count() == series.len()
        {
            path.close();
        }
        path
    }

    fn position(series: &Series, index: usize) -> f64 {
        series.x().and_then(|x| x.get(index).copied()).unwrap_or((index + 1) as f64)
    }

    fn render_errors(series: &Series, renderer: &mut dyn Renderer, map: &ChartMap, config: &RenderConfig) {
        for (i, &value) in series.values().iter().enumerate() {
            if !value.is_finite() {
                continue;
            }
            let position = Self::position(series, i);
            if let Some(errors) = series.y_errors() {
                if let Some(error) = errors.values_at(i, value) {
                    errors.render(
                        renderer,
                        map,
                        (position, value),
                        error,
                        ErrorBarDirection::Radial,
                        config.error_bar_width,
                    );
                }
            }
            if let Some(errors) = series.x_errors() {
                if let Some(error) = errors.values_at(i, position) {
                    errors.render(
                        renderer,
                        map,
                        (position, value),
                        error,
                        ErrorBarDirection::Angular,
                        config.error_bar_width,
                    );
                }
            }
        }
    }
}

impl Plot for RadarPlot {
    fn family(&self) -> &'static str {
        if self.polar {
            POLAR_FAMILY
        } else {
            RADAR_FAMILY
        }
    }

    fn axis_set(&self) -> AxisSet {
        AxisSet::Radar
    }

    fn axis_bounds(&self, kind: AxisKind) -> Option<PlotBounds> {
        let valid = self.valid_series();
        if valid.is_empty() {
            return None;
        }
        match kind {
            AxisKind::Circular if !self.polar => {
                let n = valid.iter().map(|s| s.len()).max().unwrap_or(0);
                Some(PlotBounds::discrete(1.0, n as f64))
            }
            AxisKind::Circular => valid
                .iter()
                .filter_map(|s| {
                    let positions: Vec<f64> = (0..s.len()).map(|i| Self::position(s, i)).collect();
                    let bounds = PlotBounds::from_values(&positions)?;
                    let errors = s.x_errors().and_then(|e| e.get_minmax(&positions));
                    Some(errors.map_or(bounds, |(lo, hi)| bounds.union(PlotBounds::new(lo, hi))))
                })
                .reduce(PlotBounds::union),
            AxisKind::Radial => {
                let bounds = valid.iter().fold(PlotBounds::new(0.0, 0.0), |acc, s| {
                    let acc = PlotBounds::from_values(s.values()).map_or(acc, |b| acc.union(b));
                    match s.y_errors().and_then(|e| e.get_minmax(s.values())) {
                        Some((lo, hi)) => acc.union(PlotBounds::new(lo, hi)),
                        None => acc,
                    }
                });
                Some(bounds)
            }
            _ => None,
        }
    }

    fn render(&self, renderer: &mut dyn Renderer, area: &Rect, axes: &[Axis], config: &RenderConfig) {
        let valid = self.valid_series();
        if valid.is_empty() {
            return;
        }
        let map = self.chart_map(area, axes);
        if !map.is_valid() {
            debug!(plot = self.family(), "invalid chart map, pass aborted");
            return;
        }

        let paths: Vec<Path> = valid.iter().map(|s| self.series_path(&map, s)).collect();

        for (k, series) in valid.iter().enumerate() {
            let path = &paths[k];
            if path.is_empty() {
                continue;
            }
            let close = match series.fill_type() {
                SeriesFillType::None => continue,
                SeriesFillType::Self_ => None,
                SeriesFillType::Next => {
                    let Some(next) = paths.get(k + 1).filter(|p| !p.is_empty()) else {
                        continue;
                    };
                    let mut close = next.reversed();
                    if close.ops().last() != Some(&PathOp::Close) {
                        close.close();
                    }
                    Some(close)
                }
                fill_type => match map.make_close_path(series.x(), Some(series.values()), fill_type) {
                    Some(close) => Some(close),
                    None => continue,
                },
            };
            renderer.push_style(series.style());
            renderer.fill_series(path, close.as_ref());
            renderer.pop_style();
        }

        if let Some(lines) = &self.series_lines {
            match lines.kind {
                SeriesLinesKind::Drop => {
                    for series in &valid {
                        lines.render(renderer, &drop_path(&map, series.x(), Some(series.values()), false));
                    }
                }
                SeriesLinesKind::HighLow => {
                    let (low, high) = value_extremes(valid.iter().map(|s| s.values()));
                    lines.render(renderer, &high_low_path(&map, valid[0].x(), &low, &high, false));
                }
                SeriesLinesKind::Connector => {
                    debug!(plot = self.family(), "series already join their points, connector lines skipped");
                }
            }
        }

        for (series, path) in valid.iter().zip(&paths) {
            if path.is_empty() {
                continue;
            }
            renderer.push_style(series.style());
            renderer.draw_path(path);
            renderer.pop_style();
        }

        for series in &valid {
            if !series.style().marker.is_visible() {
                continue;
            }
            renderer.push_style(series.style());
            for point in map.view_points(series.x(), Some(series.values())).into_iter().flatten() {
                renderer.draw_marker(point.x, point.y);
            }
            renderer.pop_style();
        }

        for series in &valid {
            Self::render_errors(series, renderer, &map, config);
        }
    }

    fn data_at_point(&self, area: &Rect, axes: &[Axis], x: f64, y: f64) -> Option<DataPoint> {
        let map = self.chart_map(area, axes);
        if !map.is_valid() {
            return None;
        }
        let target = Point::new(x, y);
        let mut best: Option<(f64, DataPoint)> = None;
        for (si, series) in self.series.iter().enumerate().filter(|(_, s)| s.is_valid()) {
            let reach = HIT_RADIUS.max(series.style().marker.size / 2.0);
            for (index, point) in map.view_points(series.x(), Some(series.values())).into_iter().enumerate() {
                let Some(point) = point else { continue };
                let d = point.distance(target);
                if d <= reach && best.map_or(true, |(bd, _)| d < bd) {
                    best = Some((d, DataPoint { series: si, index }));
                }
            }
        }
        best.map(|(_, hit)| hit)
    }
}
