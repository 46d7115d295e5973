//! Lines drawn between or below series elements.
//!
//! Connector lines join the tops of consecutive bars of a series, drop
//! lines run from each point down to the baseline (or in to the center of a
//! polar map), and high-low lines join a low and a high value at the same
//! position. They are stroked with their own style, after the elements they
//! decorate.

use crate::chart_map::ChartMap;
use crate::geometry::Point;
use crate::path::Path;
use crate::render::Renderer;
use crate::style::Style;
use serde::{Deserialize, Serialize};

/// Which lines to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesLinesKind {
    /// Between consecutive bar tops.
    Connector,
    /// From each point to the baseline.
    Drop,
    /// Between low and high values.
    HighLow,
}

/// Series lines with their stroke style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesLines {
    /// Line kind.
    pub kind: SeriesLinesKind,
    /// Stroke style.
    #[serde(default)]
    pub style: Style,
}

impl SeriesLines {
    /// Lines of `kind` with the default style.
    #[must_use]
    pub fn new(kind: SeriesLinesKind) -> Self {
        Self {
            kind,
            style: Style::default(),
        }
    }

    /// Set the stroke style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Stroke `path` with this style. Empty paths draw nothing.
    pub fn render(&self, renderer: &mut dyn Renderer, path: &Path) {
        if path.is_empty() {
            return;
        }
        renderer.push_style(&self.style);
        renderer.draw_path(path);
        renderer.pop_style();
    }
}

/// Segments from the trailing top corner of each bar to the leading top
/// corner of the next one. Missing bars break the chain.
#[must_use]
pub fn connector_path(tops: &[Option<(Point, Point)>]) -> Path {
    let mut path = Path::new();
    for pair in tops.windows(2) {
        if let (Some((_, trailing)), Some((leading, _))) = (pair[0], pair[1]) {
            path.move_to(trailing.x, trailing.y).line_to(leading.x, leading.y);
        }
    }
    path
}

/// Segments from every mappable point to the baseline.
///
/// Cartesian maps drop vertically to the Y baseline, or horizontally to the
/// X baseline when `horizontal` is set. Polar maps drop to the center.
#[must_use]
pub fn drop_path(map: &ChartMap, x: Option<&[f64]>, y: Option<&[f64]>, horizontal: bool) -> Path {
    let mut path = Path::new();
    if !map.is_valid() {
        return path;
    }
    let center = map.polar_parameters().map(|p| Point::new(p.cx, p.cy));
    let baseline = if horizontal { map.x_baseline() } else { map.y_baseline() };

    for point in map.view_points(x, y).into_iter().flatten() {
        let foot = match (center, baseline) {
            (Some(c), _) => c,
            (None, Some(base)) if horizontal => Point::new(base, point.y),
            (None, Some(base)) => Point::new(point.x, base),
            (None, None) => continue,
        };
        path.move_to(point.x, point.y).line_to(foot.x, foot.y);
    }
    path
}

/// Segments joining `(x[i], low[i])` and `(x[i], high[i])`.
///
/// With `horizontal` the low and high columns are X values and `x` gives the
/// Y positions. A missing `x` column uses the 1-based index.
#[must_use]
pub fn high_low_path(map: &ChartMap, x: Option<&[f64]>, low: &[f64], high: &[f64], horizontal: bool) -> Path {
    let mut path = Path::new();
    if !map.is_valid() {
        return path;
    }
    let index: Vec<f64>;
    let position = match x {
        Some(x) => x,
        None => {
            index = (1..=low.len()).map(|i| i as f64).collect();
            &index
        }
    };
    let (lows, highs) = if horizontal {
        (map.view_points(Some(low), Some(position)), map.view_points(Some(high), Some(position)))
    } else {
        (map.view_points(Some(position), Some(low)), map.view_points(Some(position), Some(high)))
    };
    for (lo, hi) in lows.into_iter().zip(highs) {
        if let (Some(lo), Some(hi)) = (lo, hi) {
            path.move_to(lo.x, lo.y).line_to(hi.x, hi.y);
        }
    }
    path
}

/// Per-position minimum and maximum of the finite values of `columns`.
///
/// Positions with no finite value are NaN in both results.
#[must_use]
pub fn value_extremes<'a>(columns: impl IntoIterator<Item = &'a [f64]>) -> (Vec<f64>, Vec<f64>) {
    let mut low: Vec<f64> = Vec::new();
    let mut high: Vec<f64> = Vec::new();
    for column in columns {
        if column.len() > low.len() {
            low.resize(column.len(), f64::NAN);
            high.resize(column.len(), f64::NAN);
        }
        for (i, &v) in column.iter().enumerate().filter(|(_, v)| v.is_finite()) {
            low[i] = low[i].min(v);
            high[i] = high[i].max(v);
        }
    }
    (low, high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{Axis, AxisKind};
    use crate::chart_map::AxisSet;
    use crate::geometry::Rect;
    use crate::path::PathOp;
    use crate::render::RecordingRenderer;

    fn xy_map() -> ChartMap {
        let x = Axis::new(AxisKind::X).with_bounds(0.0, 10.0);
        let y = Axis::new(AxisKind::Y).with_bounds(-5.0, 5.0);
        ChartMap::new(AxisSet::XY, &Rect::new(0.0, 0.0, 100.0, 100.0), Some(&x), Some(&y), None, false)
    }

    #[test]
    fn test_connectors_skip_gaps() {
        let bar = |x: f64| Some((Point::new(x, 10.0), Point::new(x + 5.0, 10.0)));
        let path = connector_path(&[bar(0.0), bar(10.0), None, bar(30.0), bar(40.0)]);
        assert_eq!(path.sub_path_count(), 2);
        assert_eq!(path.ops()[0], PathOp::MoveTo(Point::new(5.0, 10.0)));
        assert_eq!(path.ops()[1], PathOp::LineTo(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_drop_lines_to_baseline() {
        let map = xy_map();
        let path = drop_path(&map, Some(&[2.0, 4.0]), Some(&[3.0, f64::NAN]), false);
        assert_eq!(path.sub_path_count(), 1);
        assert_eq!(path.ops()[0], PathOp::MoveTo(Point::new(20.0, 20.0)));
        assert_eq!(path.ops()[1], PathOp::LineTo(Point::new(20.0, 50.0)));

        let side = drop_path(&map, Some(&[2.0]), Some(&[3.0]), true);
        assert_eq!(side.ops()[1], PathOp::LineTo(Point::new(0.0, 20.0)));
    }

    #[test]
    fn test_drop_lines_polar_center() {
        let circular = Axis::new(AxisKind::Circular).discrete(true).with_bounds(1.0, 4.0);
        let radial = Axis::new(AxisKind::Radial).with_bounds(0.0, 1.0);
        let map = ChartMap::new(
            AxisSet::Radar,
            &Rect::new(0.0, 0.0, 100.0, 100.0),
            Some(&circular),
            Some(&radial),
            None,
            false,
        );
        let path = drop_path(&map, None, Some(&[1.0, 1.0, 1.0, 1.0]), false);
        assert_eq!(path.sub_path_count(), 4);
        let params = map.polar_parameters().unwrap();
        assert_eq!(path.ops()[1], PathOp::LineTo(Point::new(params.cx, params.cy)));
    }

    #[test]
    fn test_high_low_and_render() {
        let map = xy_map();
        let path = high_low_path(&map, None, &[-1.0, -2.0], &[1.0, 2.0], false);
        assert_eq!(path.sub_path_count(), 2);
        assert_eq!(path.ops()[0], PathOp::MoveTo(Point::new(10.0, 60.0)));
        assert_eq!(path.ops()[1], PathOp::LineTo(Point::new(10.0, 40.0)));

        let mut rec = RecordingRenderer::new();
        let lines = SeriesLines::new(SeriesLinesKind::HighLow);
        lines.render(&mut rec, &path);
        lines.render(&mut rec, &Path::new());
        assert_eq!(rec.strokes().len(), 1);
        assert_eq!(rec.style_depth(), 0);
    }

    #[test]
    fn test_high_low_horizontal() {
        let map = xy_map();
        let path = high_low_path(&map, Some(&[2.0]), &[1.0], &[3.0], true);
        // Low and high run along X at the Y position of 2.
        assert_eq!(path.ops()[0], PathOp::MoveTo(Point::new(10.0, 30.0)));
        assert_eq!(path.ops()[1], PathOp::LineTo(Point::new(30.0, 30.0)));
    }

    #[test]
    fn test_value_extremes() {
        let a = [1.0, f64::NAN, 5.0];
        let b = [3.0, f64::NAN];
        let (low, high) = value_extremes([&a[..], &b[..]]);
        assert_eq!(low[0], 1.0);
        assert_eq!(high[0], 3.0);
        assert!(low[1].is_nan() && high[1].is_nan());
        assert_eq!((low[2], high[2]), (5.0, 5.0));
    }
}
