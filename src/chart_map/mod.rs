//! Composed data to view transforms.
//!
//! A [`ChartMap`] is built once per plot render pass from the chart's axes and
//! the plot-area allocation. It owns up to three [`AxisMap`]s and dispatches
//! on the chart's axis set:
//!
//! - [`AxisSet::X`]: one value axis, Y is an affine map of the area height
//! - [`AxisSet::XY`]: two independent cartesian axes, Y running upwards
//! - [`AxisSet::Radar`]: a circular axis (polygon or swept arc) and a radial axis
//!
//! The map never errors. Degenerate axes make it invalid and renderers skip
//! the whole pass; individual points that cannot be mapped come back as
//! `None`.

mod close;
pub mod layout;
mod path;

pub use close::SeriesFillType;
pub use path::Interpolation;

use crate::axis::{Axis, AxisBounds, AxisMap};
use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};
use tracing::warn;

/// Axis configuration of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSet {
    /// No axes: the plot lays itself out in the area (pie, ring).
    None,
    /// Single value axis.
    X,
    /// Cartesian X and Y.
    XY,
    /// Circular and radial axes.
    Radar,
}

/// Layout of a polar chart map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarParameters {
    /// Center x in device units.
    pub cx: f64,
    /// Center y in device units.
    pub cy: f64,
    /// Horizontal radius of the unit circle.
    pub rx: f64,
    /// Vertical radius of the unit circle.
    pub ry: f64,
    /// Lower bound of the circular axis (first category for polygons).
    pub th0: f64,
    /// Upper bound of the circular axis (last category for polygons).
    pub th1: f64,
    /// Categories laid out as polygon vertices.
    pub is_polygon: bool,
}

impl PolarParameters {
    /// Device point at data radius fraction `r` and device angle `theta`.
    #[must_use]
    pub fn point(&self, r: f64, theta: f64) -> Point {
        Point::new(
            self.cx + r * self.rx * theta.cos(),
            self.cy + r * self.ry * theta.sin(),
        )
    }

    /// Number of polygon vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        if self.is_polygon {
            (self.th1 - self.th0 + 1.0).max(0.0) as usize
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Transform {
    /// Structural mismatch: maps nothing.
    Invalid,
    X { a: f64, b: f64, y_bounds: (f64, f64) },
    XY,
    Polar(PolarParameters),
}

/// Data to view transform for one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartMap {
    axis_set: AxisSet,
    area: Rect,
    maps: [Option<AxisMap>; 3],
    transform: Transform,
    valid: bool,
}

impl ChartMap {
    /// Build the map for `axis_set` over `area`.
    ///
    /// `axis0` is the X (or circular) axis, `axis1` the Y (or radial) axis and
    /// `axis2` an optional auxiliary axis (color, bubble) mapped onto `[0, 1]`.
    /// In X mode `axis1` is optional; without it data Y spans `[0, 1]`.
    /// `fill_area` lets polar layouts stretch their radii independently.
    #[must_use]
    pub fn new(
        axis_set: AxisSet,
        area: &Rect,
        axis0: Option<&Axis>,
        axis1: Option<&Axis>,
        axis2: Option<&Axis>,
        fill_area: bool,
    ) -> Self {
        let mut map = Self {
            axis_set,
            area: *area,
            maps: [None, None, None],
            transform: Transform::Invalid,
            valid: false,
        };
        map.maps[2] = axis2.map(|axis| AxisMap::new(&axis.bounds(), 0.0, 1.0));

        match (axis_set, axis0, axis1) {
            (AxisSet::X, Some(x_axis), _) => {
                map.maps[0] = Some(AxisMap::new(&x_axis.bounds(), area.x, area.width));
                let y_bounds = axis1
                    .map(|axis| axis.bounds())
                    .filter(|b| b.minimum.is_finite() && b.maximum.is_finite() && b.maximum > b.minimum)
                    .map_or((0.0, 1.0), |b| (b.minimum, b.maximum));
                let a = -area.height / (y_bounds.1 - y_bounds.0);
                let b = area.y + area.height - a * y_bounds.0;
                map.transform = Transform::X { a, b, y_bounds };
            }
            (AxisSet::XY, Some(x_axis), Some(y_axis)) => {
                map.maps[0] = Some(AxisMap::new(&x_axis.bounds(), area.x, area.width));
                map.maps[1] = Some(AxisMap::new(
                    &y_axis.bounds(),
                    area.y + area.height,
                    -area.height,
                ));
                map.transform = Transform::XY;
            }
            (AxisSet::Radar, Some(circular), Some(radial)) => {
                map.build_polar(circular, radial, fill_area);
            }
            _ => {
                warn!(?axis_set, "chart map built without the axes its axis set needs");
            }
        }

        map.valid = !matches!(map.transform, Transform::Invalid)
            && map.maps.iter().flatten().all(AxisMap::is_valid)
            && area.width.is_finite()
            && area.height.is_finite();
        map
    }

    fn build_polar(&mut self, circular: &Axis, radial: &Axis, fill_area: bool) {
        let area = self.area;
        let bounds = circular.bounds();
        let rotation = circular.circular_rotation();
        let start = -FRAC_PI_2 + rotation;

        let (angular, params) = if circular.is_discrete() {
            let th0 = bounds.minimum.round();
            let th1 = bounds.maximum.round();
            let n = (th1 - th0 + 1.0).max(1.0);
            let is_polygon = n <= layout::MAX_POLYGON_VERTICES as f64;
            let fit = if is_polygon {
                layout::polygon_parameters(&area, n as usize, start, fill_area)
            } else {
                layout::circle_parameters(&area, start, start + TAU, fill_area)
            };
            let discrete = AxisBounds {
                minimum: th0,
                maximum: th1,
                ..bounds
            };
            let angular = AxisMap::new(&discrete, start, TAU * (n - 1.0) / n);
            let params = PolarParameters {
                cx: fit.cx,
                cy: fit.cy,
                rx: fit.rx,
                ry: fit.ry,
                th0,
                th1,
                is_polygon,
            };
            (angular, params)
        } else {
            let (perimeter_start, perimeter_stop) = circular.polar_perimeter();
            let a0 = start + perimeter_start;
            let a1 = start + perimeter_stop;
            let fit = layout::circle_parameters(&area, a0, a1, fill_area);
            let angular = AxisMap::new(&bounds, a0, a1 - a0);
            let params = PolarParameters {
                cx: fit.cx,
                cy: fit.cy,
                rx: fit.rx,
                ry: fit.ry,
                th0: bounds.minimum,
                th1: bounds.maximum,
                is_polygon: false,
            };
            (angular, params)
        };

        self.maps[0] = Some(angular);
        self.maps[1] = Some(AxisMap::new(&radial.bounds(), 0.0, 1.0));
        self.transform = Transform::Polar(params);
    }

    /// Axis configuration this map was built for.
    #[must_use]
    pub fn axis_set(&self) -> AxisSet {
        self.axis_set
    }

    /// Plot area the map spans.
    #[must_use]
    pub fn area(&self) -> &Rect {
        &self.area
    }

    /// Whether every constituent axis map is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Axis map for fundamental axis `index` (0, 1 or 2).
    ///
    /// In polar mode index 0 maps to device angles and index 1 to the unit
    /// radius.
    #[must_use]
    pub fn axis_map(&self, index: usize) -> Option<&AxisMap> {
        self.maps.get(index)?.as_ref()
    }

    /// Polar layout, `None` outside radar mode.
    #[must_use]
    pub fn polar_parameters(&self) -> Option<&PolarParameters> {
        match &self.transform {
            Transform::Polar(params) => Some(params),
            _ => None,
        }
    }

    /// Whether this is a polar map.
    #[must_use]
    pub fn is_polar(&self) -> bool {
        matches!(self.transform, Transform::Polar(_))
    }

    /// Map a data point to device space.
    #[must_use]
    pub fn to_view(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !self.valid {
            return None;
        }
        match &self.transform {
            Transform::Invalid => None,
            Transform::X { a, b, .. } => {
                let u = self.maps[0].as_ref()?.to_view(x)?;
                let v = a * y + b;
                v.is_finite().then_some((u, v))
            }
            Transform::XY => {
                let u = self.maps[0].as_ref()?.to_view(x)?;
                let v = self.maps[1].as_ref()?.to_view(y)?;
                Some((u, v))
            }
            Transform::Polar(params) => {
                let theta = self.maps[0].as_ref()?.to_view(x)?;
                let r = self.maps[1].as_ref()?.to_view(y)?;
                let p = params.point(r, theta);
                p.is_finite().then_some((p.x, p.y))
            }
        }
    }

    /// Map a data point to a device [`Point`].
    #[must_use]
    pub fn to_point(&self, x: f64, y: f64) -> Option<Point> {
        self.to_view(x, y).map(Point::from)
    }

    /// Device angle of circular data value `x` (polar maps only).
    #[must_use]
    pub fn angle(&self, x: f64) -> Option<f64> {
        if !self.is_polar() {
            return None;
        }
        self.maps[0].as_ref()?.to_view(x)
    }

    /// Unit radius of radial data value `y` (polar maps only).
    #[must_use]
    pub fn radius(&self, y: f64) -> Option<f64> {
        if !self.is_polar() {
            return None;
        }
        self.maps[1].as_ref()?.to_view(y)
    }

    /// Whether `(x, y)` lies inside the bounds of the constituent axes.
    #[must_use]
    pub fn is_inside(&self, x: f64, y: f64) -> bool {
        if !self.valid {
            return false;
        }
        match &self.transform {
            Transform::Invalid => false,
            Transform::X { y_bounds, .. } => {
                self.maps[0].as_ref().is_some_and(|m| m.is_finite(x))
                    && y.is_finite()
                    && y >= y_bounds.0.min(y_bounds.1)
                    && y <= y_bounds.0.max(y_bounds.1)
            }
            Transform::XY | Transform::Polar(_) => {
                self.maps[0].as_ref().is_some_and(|m| m.is_finite(x))
                    && self.maps[1].as_ref().is_some_and(|m| m.is_finite(y))
            }
        }
    }

    /// Device position of the Y data value 0 (clamped into bounds).
    ///
    /// For polar maps this is the unit radius of the radial baseline.
    #[must_use]
    pub fn y_baseline(&self) -> Option<f64> {
        match &self.transform {
            Transform::Invalid => None,
            Transform::X { a, b, y_bounds } => {
                let (lo, hi) = (y_bounds.0.min(y_bounds.1), y_bounds.0.max(y_bounds.1));
                Some(a * 0f64.clamp(lo, hi) + b)
            }
            Transform::XY | Transform::Polar(_) => {
                let v = self.maps[1].as_ref()?.get_baseline();
                (v.is_finite() && v.abs() != f64::MAX).then_some(v)
            }
        }
    }

    /// Device position of the X data value 0 (clamped into bounds).
    #[must_use]
    pub fn x_baseline(&self) -> Option<f64> {
        if matches!(self.transform, Transform::Invalid) {
            return None;
        }
        let u = self.maps[0].as_ref()?.get_baseline();
        (u.is_finite() && u.abs() != f64::MAX).then_some(u)
    }

    /// Map every point of parallel `x`/`y` columns; missing columns use the
    /// 1-based index.
    pub(crate) fn view_points(&self, x: Option<&[f64]>, y: Option<&[f64]>) -> Vec<Option<Point>> {
        let n = match (x, y) {
            (Some(x), Some(y)) => x.len().min(y.len()),
            (Some(x), None) => x.len(),
            (None, Some(y)) => y.len(),
            (None, None) => 0,
        };
        (0..n)
            .map(|i| {
                let index = (i + 1) as f64;
                let xv = x.map_or(index, |x| x[i]);
                let yv = y.map_or(index, |y| y[i]);
                self.to_point(xv, yv)
            })
            .collect()
    }
}

/// Data value at position `i` of an optional column (1-based index when absent).
pub(crate) fn value_or_index(column: Option<&[f64]>, i: usize) -> f64 {
    column.map_or((i + 1) as f64, |c| c.get(i).copied().unwrap_or(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisKind;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn area() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 50.0)
    }

    #[test]
    fn test_x_only_affine_y() {
        let x = Axis::new(AxisKind::X).with_bounds(1.0, 6.0);
        let y = Axis::new(AxisKind::Y).with_bounds(0.0, 10.0);
        let map = ChartMap::new(AxisSet::X, &area(), Some(&x), Some(&y), None, false);
        assert!(map.is_valid());
        let (u, v) = map.to_view(2.0, 10.0).unwrap();
        assert_relative_eq!(u, 20.0);
        assert_relative_eq!(v, 0.0);
        let (_, v0) = map.to_view(2.0, 0.0).unwrap();
        assert_relative_eq!(v0, 50.0);
    }

    #[test]
    fn test_x_only_default_unit_span() {
        let x = Axis::new(AxisKind::X).with_bounds(0.0, 1.0);
        let map = ChartMap::new(AxisSet::X, &area(), Some(&x), None, None, false);
        assert_relative_eq!(map.to_view(0.5, 0.5).unwrap().1, 25.0);
        assert_eq!(map.y_baseline(), Some(50.0));
    }

    #[test]
    fn test_xy_inverts_y() {
        let x = Axis::new(AxisKind::X).with_bounds(0.0, 10.0);
        let y = Axis::new(AxisKind::Y).with_bounds(0.0, 5.0);
        let map = ChartMap::new(AxisSet::XY, &area(), Some(&x), Some(&y), None, false);
        assert_eq!(map.to_view(0.0, 0.0), Some((0.0, 50.0)));
        assert_eq!(map.to_view(10.0, 5.0), Some((100.0, 0.0)));
        assert!(map.is_inside(5.0, 2.0));
        assert!(!map.is_inside(5.0, 20.0));
    }

    #[test]
    fn test_degenerate_axis_invalidates() {
        let x = Axis::new(AxisKind::X).with_bounds(3.0, 3.0);
        let y = Axis::new(AxisKind::Y).with_bounds(0.0, 5.0);
        let map = ChartMap::new(AxisSet::XY, &area(), Some(&x), Some(&y), None, false);
        assert!(!map.is_valid());
        assert_eq!(map.to_view(3.0, 1.0), None);
    }

    #[test]
    fn test_missing_axis_gives_invalid_map() {
        let x = Axis::new(AxisKind::X);
        let map = ChartMap::new(AxisSet::XY, &area(), Some(&x), None, None, false);
        assert!(!map.is_valid());
        assert!(map.axis_map(1).is_none());
    }

    #[test]
    fn test_auxiliary_axis_participates_in_validity() {
        let x = Axis::new(AxisKind::X);
        let y = Axis::new(AxisKind::Y);
        let color = Axis::new(AxisKind::Color).with_bounds(1.0, 1.0);
        let map = ChartMap::new(AxisSet::XY, &area(), Some(&x), Some(&y), Some(&color), false);
        assert!(!map.is_valid());
    }

    #[test]
    fn test_radar_square_layout() {
        let circular = Axis::new(AxisKind::Circular).discrete(true).with_bounds(1.0, 4.0);
        let radial = Axis::new(AxisKind::Radial).with_bounds(0.0, 1.0);
        let map = ChartMap::new(
            AxisSet::Radar,
            &Rect::new(0.0, 0.0, 200.0, 100.0),
            Some(&circular),
            Some(&radial),
            None,
            false,
        );
        assert!(map.is_valid());
        let params = *map.polar_parameters().unwrap();
        assert_eq!(params.vertex_count(), 4);
        assert_relative_eq!(params.rx, params.ry);
        for k in 0..4 {
            let theta = map.angle(f64::from(k + 1)).unwrap();
            assert_relative_eq!(theta, -PI / 2.0 + f64::from(k) * PI / 2.0, epsilon = 1e-12);
        }
        let (u, v) = map.to_view(1.0, 1.0).unwrap();
        assert_relative_eq!(u, 100.0, epsilon = 1e-9);
        assert_relative_eq!(v, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_polar_continuous_half_circle() {
        let circular = Axis::new(AxisKind::Circular)
            .with_bounds(0.0, 180.0)
            .rotation(-90.0)
            .perimeter(0.0, 180.0);
        let radial = Axis::new(AxisKind::Radial).with_bounds(0.0, 10.0);
        let map = ChartMap::new(
            AxisSet::Radar,
            &Rect::new(0.0, 0.0, 200.0, 100.0),
            Some(&circular),
            Some(&radial),
            None,
            false,
        );
        assert!(map.is_valid());
        let params = map.polar_parameters().unwrap();
        assert!(!params.is_polygon);
        assert_relative_eq!(params.rx, 100.0, epsilon = 1e-9);
        assert_relative_eq!(params.cy, 100.0, epsilon = 1e-9);
        // Angle 90 points straight up.
        let (u, v) = map.to_view(90.0, 10.0).unwrap();
        assert_relative_eq!(u, 100.0, epsilon = 1e-9);
        assert_relative_eq!(v, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_many_categories_lay_out_as_circle() {
        let circular = Axis::new(AxisKind::Circular).discrete(true).with_bounds(1.0, 1e12);
        let radial = Axis::new(AxisKind::Radial).with_bounds(0.0, 1.0);
        let map = ChartMap::new(AxisSet::Radar, &area(), Some(&circular), Some(&radial), None, false);
        assert!(map.is_valid());
        let params = map.polar_parameters().unwrap();
        assert!(!params.is_polygon);
        assert_eq!(params.vertex_count(), 0);
        assert_relative_eq!(params.rx, params.ry);
    }

    #[test]
    fn test_polar_rejects_non_finite() {
        let circular = Axis::new(AxisKind::Circular).discrete(true).with_bounds(1.0, 5.0);
        let radial = Axis::new(AxisKind::Radial).with_bounds(0.0, 1.0);
        let map = ChartMap::new(AxisSet::Radar, &area(), Some(&circular), Some(&radial), None, true);
        assert!(map.to_view(2.0, f64::NAN).is_none());
        assert!(map.to_view(f64::INFINITY, 0.5).is_none());
    }

    #[test]
    fn test_value_or_index() {
        assert_eq!(value_or_index(None, 0), 1.0);
        assert_eq!(value_or_index(Some(&[4.0]), 0), 4.0);
        assert!(value_or_index(Some(&[4.0]), 3).is_nan());
    }
}
