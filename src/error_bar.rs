//! Error bars.
//!
//! An [`ErrorBar`] turns per-element plus/minus columns into error
//! magnitudes and draws them around a data point. Linear directions draw a
//! straight bar with perpendicular caps; radial bars are clipped to the
//! radial axis and capped with short arcs; angular bars follow an arc around
//! the center with straight caps. A bar end that leaves its axis is clipped
//! to the axis bound and loses its cap.

use crate::chart_map::ChartMap;
use crate::path::Path;
use crate::render::Renderer;
use crate::style::Style;
use serde::{Deserialize, Serialize};

/// How the plus/minus columns relate to the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorBarKind {
    /// Magnitudes in data units.
    #[default]
    Absolute,
    /// Fractions of the value's magnitude.
    Relative,
    /// Percentages of the value's magnitude.
    Percent,
}

/// Which sides of the interval are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorBarDisplay {
    /// Plus side only.
    Positive,
    /// Minus side only.
    Negative,
    /// Both sides.
    #[default]
    Both,
}

/// Direction the error runs in device space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorBarDirection {
    /// Along X.
    Horizontal,
    /// Along Y.
    Vertical,
    /// Along the radius of a polar map.
    Radial,
    /// Around the center of a polar map.
    Angular,
}

/// Error bars of one series dimension.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorBar {
    /// Interpretation of `plus` and `minus`.
    #[serde(default)]
    pub kind: ErrorBarKind,
    /// Shown sides.
    #[serde(default)]
    pub display: ErrorBarDisplay,
    /// Cap width in device units; `None` uses the render default.
    #[serde(default)]
    pub width: Option<f64>,
    /// Stroke style.
    #[serde(default)]
    pub style: Style,
    /// Plus magnitudes per element.
    #[serde(default)]
    pub plus: Vec<f64>,
    /// Minus magnitudes per element; empty reuses `plus`.
    #[serde(default)]
    pub minus: Vec<f64>,
}

impl ErrorBar {
    /// Symmetric bars of `kind` with the same magnitude on both sides.
    #[must_use]
    pub fn symmetric(kind: ErrorBarKind, magnitudes: impl Into<Vec<f64>>) -> Self {
        Self {
            kind,
            plus: magnitudes.into(),
            ..Self::default()
        }
    }

    /// Bars with distinct plus and minus magnitudes.
    #[must_use]
    pub fn asymmetric(kind: ErrorBarKind, plus: impl Into<Vec<f64>>, minus: impl Into<Vec<f64>>) -> Self {
        Self {
            kind,
            plus: plus.into(),
            minus: minus.into(),
            ..Self::default()
        }
    }

    /// Show only some sides.
    #[must_use]
    pub fn display(mut self, display: ErrorBarDisplay) -> Self {
        self.display = display;
        self
    }

    /// Set the cap width.
    #[must_use]
    pub fn cap_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the stroke style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Plus and minus magnitudes of element `index` whose value is `value`.
    ///
    /// A hidden or unusable side is 0. `None` when neither side has a
    /// positive finite magnitude.
    #[must_use]
    pub fn values_at(&self, index: usize, value: f64) -> Option<(f64, f64)> {
        let raw_plus = self.plus.get(index).copied();
        let raw_minus = if self.minus.is_empty() {
            raw_plus
        } else {
            self.minus.get(index).copied()
        };

        let scale = |e: Option<f64>| -> f64 {
            let Some(e) = e else { return 0.0 };
            let magnitude = match self.kind {
                ErrorBarKind::Absolute => e,
                ErrorBarKind::Relative => value.abs() * e,
                ErrorBarKind::Percent => value.abs() * e / 100.0,
            };
            if magnitude.is_finite() && magnitude > 0.0 {
                magnitude
            } else {
                0.0
            }
        };

        let plus = match self.display {
            ErrorBarDisplay::Negative => 0.0,
            _ => scale(raw_plus),
        };
        let minus = match self.display {
            ErrorBarDisplay::Positive => 0.0,
            _ => scale(raw_minus),
        };
        (plus > 0.0 || minus > 0.0).then_some((plus, minus))
    }

    /// Range covered by `values` widened by their errors, for axis bounds.
    #[must_use]
    pub fn get_minmax(&self, values: &[f64]) -> Option<(f64, f64)> {
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .filter_map(|(i, &v)| {
                let (plus, minus) = self.values_at(i, v)?;
                Some((v - minus, v + plus))
            })
            .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)))
    }

    /// Draw the error interval `(plus, minus)` around data point `at`.
    ///
    /// Nothing is drawn when the point does not map, when both magnitudes
    /// are non-positive, or when the direction does not fit the map
    /// (radial and angular bars need a polar map).
    pub fn render(
        &self,
        renderer: &mut dyn Renderer,
        map: &ChartMap,
        at: (f64, f64),
        error: (f64, f64),
        direction: ErrorBarDirection,
        default_width: f64,
    ) {
        let (x, y) = at;
        let (plus, minus) = error;
        let plus = if plus.is_finite() { plus } else { 0.0 };
        let minus = if minus.is_finite() { minus } else { 0.0 };
        if plus <= 0.0 && minus <= 0.0 {
            return;
        }
        if map.to_view(x, y).is_none() {
            return;
        }
        let cap = self.width.filter(|w| w.is_finite() && *w >= 0.0).unwrap_or(default_width);

        let path = match direction {
            ErrorBarDirection::Horizontal | ErrorBarDirection::Vertical => {
                linear_bar(map, (x, y), (plus, minus), direction, cap)
            }
            ErrorBarDirection::Radial => radial_bar(map, (x, y), (plus, minus), cap),
            ErrorBarDirection::Angular => angular_bar(map, (x, y), (plus, minus), cap),
        };
        let Some(path) = path.filter(|p| !p.is_empty()) else {
            return;
        };

        renderer.push_style(&self.style);
        renderer.draw_path(&path);
        renderer.pop_style();
    }
}

/// Data bounds of axis `index`, unbounded when the map has no such axis.
fn data_bounds(map: &ChartMap, index: usize) -> (f64, f64) {
    map.axis_map(index)
        .map_or((f64::NEG_INFINITY, f64::INFINITY), |m| m.get_bounds())
}

/// Clip `value +/- delta` into `bounds`; the flag tells whether it fit.
fn clip_end(value: f64, delta: f64, upward: bool, bounds: (f64, f64)) -> (f64, bool) {
    let end = if upward { value + delta } else { value - delta };
    let (lo, hi) = (bounds.0.min(bounds.1), bounds.0.max(bounds.1));
    if end > hi {
        (hi, false)
    } else if end < lo {
        (lo, false)
    } else {
        (end, true)
    }
}

fn linear_bar(
    map: &ChartMap,
    (x, y): (f64, f64),
    (plus, minus): (f64, f64),
    direction: ErrorBarDirection,
    cap: f64,
) -> Option<Path> {
    let horizontal = direction == ErrorBarDirection::Horizontal;
    let (value, bounds) = if horizontal {
        (x, data_bounds(map, 0))
    } else {
        (y, data_bounds(map, 1))
    };
    let at = |v: f64| {
        if horizontal {
            map.to_view(v, y)
        } else {
            map.to_view(x, v)
        }
    };

    let mut path = Path::new();
    let half = cap / 2.0;
    let mut ends = Vec::with_capacity(2);
    for (delta, upward) in [(plus, true), (minus, false)] {
        if delta <= 0.0 {
            ends.push((at(value)?, false));
            continue;
        }
        let (end, capped) = clip_end(value, delta, upward, bounds);
        ends.push((at(end)?, capped));
    }

    let ((u0, v0), _) = ends[0];
    let ((u1, v1), _) = ends[1];
    path.move_to(u0, v0).line_to(u1, v1);
    for &((u, v), capped) in &ends {
        if !capped || half <= 0.0 {
            continue;
        }
        if horizontal {
            path.move_to(u, v - half).line_to(u, v + half);
        } else {
            path.move_to(u - half, v).line_to(u + half, v);
        }
    }
    Some(path)
}

fn radial_bar(map: &ChartMap, (x, y): (f64, f64), (plus, minus): (f64, f64), cap: f64) -> Option<Path> {
    let params = *map.polar_parameters()?;
    let theta = map.angle(x)?;
    let bounds = data_bounds(map, 1);

    let mut ends = Vec::with_capacity(2);
    for (delta, upward) in [(plus, true), (minus, false)] {
        if delta <= 0.0 {
            ends.push((map.radius(y)?, false));
            continue;
        }
        let (end, capped) = clip_end(y, delta, upward, bounds);
        ends.push((map.radius(end)?, capped));
    }

    let mut path = Path::new();
    let a = params.point(ends[0].0, theta);
    let b = params.point(ends[1].0, theta);
    path.move_to(a.x, a.y).line_to(b.x, b.y);

    let mean_radius = (params.rx.abs() + params.ry.abs()) / 2.0;
    for &(r, capped) in &ends {
        let device_r = r * mean_radius;
        if !capped || cap <= 0.0 || device_r <= 0.0 {
            continue;
        }
        let half_angle = cap / 2.0 / device_r;
        let start = params.point(r, theta - half_angle);
        path.move_to(start.x, start.y).arc(
            params.cx,
            params.cy,
            r * params.rx,
            r * params.ry,
            theta - half_angle,
            theta + half_angle,
        );
    }
    Some(path)
}

fn angular_bar(map: &ChartMap, (x, y): (f64, f64), (plus, minus): (f64, f64), cap: f64) -> Option<Path> {
    let params = *map.polar_parameters()?;
    let r = map.radius(y)?;
    let bounds = data_bounds(map, 0);

    let mut ends = Vec::with_capacity(2);
    for (delta, upward) in [(plus, true), (minus, false)] {
        if delta <= 0.0 {
            ends.push((map.angle(x)?, false));
            continue;
        }
        let (end, capped) = clip_end(x, delta, upward, bounds);
        ends.push((map.angle(end)?, capped));
    }

    let (th_plus, th_minus) = (ends[0].0, ends[1].0);
    let mut path = Path::new();
    let start = params.point(r, th_minus);
    path.move_to(start.x, start.y)
        .arc(params.cx, params.cy, r * params.rx, r * params.ry, th_minus, th_plus);

    let mean_radius = (params.rx.abs() + params.ry.abs()) / 2.0;
    if mean_radius > 0.0 && cap > 0.0 {
        let dr = cap / 2.0 / mean_radius;
        for &(theta, capped) in &ends {
            if !capped {
                continue;
            }
            let inner = params.point((r - dr).max(0.0), theta);
            let outer = params.point(r + dr, theta);
            path.move_to(inner.x, inner.y).line_to(outer.x, outer.y);
        }
    }
    Some(path)
}
