//! Closing an open data path for area fills.

use super::{value_or_index, ChartMap, PolarParameters};
use crate::geometry::Point;
use crate::path::Path;
use serde::{Deserialize, Serialize};

/// What an area fill closes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesFillType {
    /// The data path closes on itself.
    #[serde(rename = "self")]
    Self_,
    /// Horizontal line through Y = 0.
    YOrigin,
    /// Vertical line through X = 0.
    XOrigin,
    /// Bottom edge of the plot area.
    Bottom,
    /// Top edge of the plot area.
    Top,
    /// Left edge of the plot area.
    Left,
    /// Right edge of the plot area.
    Right,
    /// Polar center.
    Center,
    /// Polar arc (or polygon) at the radial origin.
    Origin,
    /// Polar arc (or polygon) at the outer edge.
    Edge,
    /// The next series' path.
    Next,
    /// No fill.
    #[default]
    None,
}

impl SeriesFillType {
    /// Whether this fill type only applies to polar charts.
    #[must_use]
    pub fn is_polar(self) -> bool {
        matches!(self, Self::Center | Self::Origin | Self::Edge)
    }
}

impl ChartMap {
    /// Path closing the data path through `(x[i], y[i])` against `fill_type`.
    ///
    /// The returned path starts at the last valid data point, runs along the
    /// closing boundary and ends on the first valid data point, then closes.
    /// It is meant to be appended to the data path as a continuation.
    /// `None` for self-closing fills, fill-to-next, no fill, fill types that
    /// do not apply to this map, or when no valid point exists.
    #[must_use]
    pub fn make_close_path(
        &self,
        x: Option<&[f64]>,
        y: Option<&[f64]>,
        fill_type: SeriesFillType,
    ) -> Option<Path> {
        if !self.is_valid()
            || matches!(
                fill_type,
                SeriesFillType::Self_ | SeriesFillType::Next | SeriesFillType::None
            )
        {
            return None;
        }
        let n = match (x, y) {
            (Some(x), Some(y)) => x.len().min(y.len()),
            (Some(c), None) | (None, Some(c)) => c.len(),
            (None, None) => 0,
        };
        let data = |i: usize| (value_or_index(x, i), value_or_index(y, i));
        let valid = |i: &usize| {
            let (xv, yv) = data(*i);
            self.to_view(xv, yv).is_some()
        };
        let first = (0..n).find(valid)?;
        let last = (0..n).rev().find(valid)?;
        let (x0, y0) = data(first);
        let (x1, y1) = data(last);

        match self.polar_parameters().copied() {
            Some(params) => self.close_polar(&params, (x0, y0), (x1, y1), fill_type),
            None => self.close_cartesian((x0, y0), (x1, y1), fill_type),
        }
    }

    fn close_cartesian(
        &self,
        first: (f64, f64),
        last: (f64, f64),
        fill_type: SeriesFillType,
    ) -> Option<Path> {
        let p0 = self.to_point(first.0, first.1)?;
        let p1 = self.to_point(last.0, last.1)?;
        let area = *self.area();

        let (e1, e0) = match fill_type {
            SeriesFillType::YOrigin => {
                let v = self.y_baseline()?;
                (Point::new(p1.x, v), Point::new(p0.x, v))
            }
            SeriesFillType::XOrigin => {
                let u = self.x_baseline()?;
                (Point::new(u, p1.y), Point::new(u, p0.y))
            }
            SeriesFillType::Bottom => (
                Point::new(p1.x, area.bottom()),
                Point::new(p0.x, area.bottom()),
            ),
            SeriesFillType::Top => (Point::new(p1.x, area.y), Point::new(p0.x, area.y)),
            SeriesFillType::Left => (Point::new(area.x, p1.y), Point::new(area.x, p0.y)),
            SeriesFillType::Right => (
                Point::new(area.right(), p1.y),
                Point::new(area.right(), p0.y),
            ),
            _ => return None,
        };

        let mut path = Path::new();
        path.move_to(p1.x, p1.y)
            .line_to(e1.x, e1.y)
            .line_to(e0.x, e0.y)
            .line_to(p0.x, p0.y)
            .close();
        Some(path)
    }

    fn close_polar(
        &self,
        params: &PolarParameters,
        first: (f64, f64),
        last: (f64, f64),
        fill_type: SeriesFillType,
    ) -> Option<Path> {
        let p0 = self.to_point(first.0, first.1)?;
        let p1 = self.to_point(last.0, last.1)?;
        let mut path = Path::new();
        path.move_to(p1.x, p1.y);

        match fill_type {
            SeriesFillType::Center => {
                path.line_to(params.cx, params.cy);
            }
            SeriesFillType::Origin | SeriesFillType::Edge => {
                let r = if fill_type == SeriesFillType::Edge {
                    1.0
                } else {
                    self.y_baseline()?
                };
                let theta1 = self.angle(last.0)?;
                let theta0 = self.angle(first.0)?;
                if params.is_polygon {
                    // Walk back along polygon edges through the category vertices.
                    let start = self.polygon_point(params, r, last.0)?;
                    path.line_to(start.x, start.y);
                    let lo = first.0;
                    let mut k = last.0.ceil() - 1.0;
                    while k > lo {
                        let vertex = self.polygon_point(params, r, k)?;
                        path.line_to(vertex.x, vertex.y);
                        k -= 1.0;
                    }
                    let end = self.polygon_point(params, r, first.0)?;
                    path.line_to(end.x, end.y);
                } else if r > 0.0 {
                    let start = params.point(r, theta1);
                    path.line_to(start.x, start.y);
                    path.arc(params.cx, params.cy, r * params.rx, r * params.ry, theta1, theta0);
                } else {
                    path.line_to(params.cx, params.cy);
                }
            }
            _ => return None,
        }

        path.line_to(p0.x, p0.y).close();
        Some(path)
    }

    /// Point at unit radius `r` on the polygon edge through circular value
    /// `x`, interpolated between the neighbouring category vertices.
    fn polygon_point(&self, params: &PolarParameters, r: f64, x: f64) -> Option<Point> {
        let k = x.floor();
        let a = params.point(r, self.angle(k)?);
        let t = x - k;
        if t == 0.0 {
            return Some(a);
        }
        let b = params.point(r, self.angle(k + 1.0)?);
        Some(Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{Axis, AxisKind};
    use crate::chart_map::AxisSet;
    use crate::geometry::Rect;
    use crate::path::PathOp;
    use approx::assert_relative_eq;

    fn xy_map() -> ChartMap {
        let x = Axis::new(AxisKind::X).with_bounds(0.0, 10.0);
        let y = Axis::new(AxisKind::Y).with_bounds(-5.0, 5.0);
        ChartMap::new(
            AxisSet::XY,
            &Rect::new(0.0, 0.0, 100.0, 100.0),
            Some(&x),
            Some(&y),
            None,
            false,
        )
    }

    fn radar_map() -> ChartMap {
        let circular = Axis::new(AxisKind::Circular).discrete(true).with_bounds(1.0, 4.0);
        let radial = Axis::new(AxisKind::Radial).with_bounds(0.0, 10.0);
        ChartMap::new(
            AxisSet::Radar,
            &Rect::new(0.0, 0.0, 100.0, 100.0),
            Some(&circular),
            Some(&radial),
            None,
            false,
        )
    }

    #[test]
    fn test_y_origin_close() {
        let x = [1.0, 2.0, 3.0];
        let y = [1.0, 4.0, 2.0];
        let path = xy_map()
            .make_close_path(Some(&x), Some(&y), SeriesFillType::YOrigin)
            .unwrap();
        assert_eq!(
            path.ops(),
            &[
                PathOp::MoveTo(Point::new(30.0, 30.0)),
                PathOp::LineTo(Point::new(30.0, 50.0)),
                PathOp::LineTo(Point::new(10.0, 50.0)),
                PathOp::LineTo(Point::new(10.0, 40.0)),
                PathOp::Close,
            ]
        );
    }

    #[test]
    fn test_scans_for_first_and_last_valid() {
        let y = [f64::NAN, 1.0, 2.0, f64::NAN];
        let path = xy_map()
            .make_close_path(None, Some(&y), SeriesFillType::Bottom)
            .unwrap();
        assert_eq!(path.ops()[0], PathOp::MoveTo(Point::new(30.0, 30.0)));
        assert_eq!(path.ops()[1], PathOp::LineTo(Point::new(30.0, 100.0)));
        assert_eq!(path.ops()[2], PathOp::LineTo(Point::new(20.0, 100.0)));
    }

    #[test]
    fn test_edges() {
        let y = [1.0, 2.0];
        let map = xy_map();
        let top = map.make_close_path(None, Some(&y), SeriesFillType::Top).unwrap();
        assert_eq!(top.ops()[1], PathOp::LineTo(Point::new(20.0, 0.0)));
        let left = map.make_close_path(None, Some(&y), SeriesFillType::Left).unwrap();
        assert_eq!(left.ops()[1], PathOp::LineTo(Point::new(0.0, 30.0)));
        let right = map.make_close_path(None, Some(&y), SeriesFillType::Right).unwrap();
        assert_eq!(right.ops()[2], PathOp::LineTo(Point::new(100.0, 40.0)));
        let x_origin = map.make_close_path(None, Some(&y), SeriesFillType::XOrigin).unwrap();
        assert_eq!(x_origin.ops()[1], PathOp::LineTo(Point::new(0.0, 30.0)));
    }

    #[test]
    fn test_self_closing_and_missing_points() {
        let map = xy_map();
        let y = [1.0, 2.0];
        for fill in [SeriesFillType::Self_, SeriesFillType::Next, SeriesFillType::None] {
            assert!(map.make_close_path(None, Some(&y), fill).is_none());
        }
        assert!(map
            .make_close_path(None, Some(&[f64::NAN, f64::NAN]), SeriesFillType::Bottom)
            .is_none());
        assert!(map.make_close_path(None, Some(&y), SeriesFillType::Center).is_none());
    }

    #[test]
    fn test_polar_center() {
        let y = [5.0, 10.0, 5.0];
        let map = radar_map();
        let path = map.make_close_path(None, Some(&y), SeriesFillType::Center).unwrap();
        let params = map.polar_parameters().unwrap();
        assert_eq!(path.ops()[1], PathOp::LineTo(Point::new(params.cx, params.cy)));
        assert_eq!(path.ops().last(), Some(&PathOp::Close));
    }

    #[test]
    fn test_radar_edge_walks_polygon() {
        let y = [5.0, 5.0, 5.0, 5.0];
        let map = radar_map();
        let path = map.make_close_path(None, Some(&y), SeriesFillType::Edge).unwrap();
        // move, edge start (cat 4), vertices 3 and 2, edge end (cat 1), first point, close
        assert_eq!(path.ops().len(), 7);
        let PathOp::LineTo(v3) = path.ops()[2] else {
            panic!("expected a polygon vertex");
        };
        let expected = map.to_point(3.0, 10.0).unwrap();
        assert_relative_eq!(v3.x, expected.x, epsilon = 1e-9);
        assert_relative_eq!(v3.y, expected.y, epsilon = 1e-9);
    }

    #[test]
    fn test_radar_edge_between_categories_stays_on_polygon() {
        let x = [1.5, 3.0];
        let y = [5.0, 5.0];
        let map = radar_map();
        let path = map.make_close_path(Some(&x), Some(&y), SeriesFillType::Edge).unwrap();
        // move, edge start (cat 3), vertex 2, edge end halfway along edge 1-2, first point, close
        assert_eq!(path.ops().len(), 6);
        let PathOp::LineTo(end) = path.ops()[3] else {
            panic!("expected the edge end point");
        };
        assert_relative_eq!(end.x, 75.0, epsilon = 1e-9);
        assert_relative_eq!(end.y, 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_polar_origin_arc() {
        let circular = Axis::new(AxisKind::Circular).with_bounds(0.0, 360.0);
        let radial = Axis::new(AxisKind::Radial).with_bounds(2.0, 10.0);
        let map = ChartMap::new(
            AxisSet::Radar,
            &Rect::new(0.0, 0.0, 100.0, 100.0),
            Some(&circular),
            Some(&radial),
            None,
            false,
        );
        let x = [0.0, 90.0, 180.0];
        let y = [4.0, 6.0, 8.0];
        let path = map.make_close_path(Some(&x), Some(&y), SeriesFillType::Origin).unwrap();
        // Baseline clamps to the radial minimum: unit radius 0, so the
        // boundary collapses to the center.
        assert!(path.ops().iter().all(|op| !matches!(op, PathOp::Arc { .. })));

        let edge = map.make_close_path(Some(&x), Some(&y), SeriesFillType::Edge).unwrap();
        assert!(matches!(edge.ops()[2], PathOp::Arc { rx, .. } if (rx - 50.0).abs() < 1e-9));
    }
}
