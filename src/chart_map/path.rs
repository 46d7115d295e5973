//! Open data paths through a chart map.

use super::{value_or_index, ChartMap, PolarParameters};
use crate::geometry::Point;
use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// How consecutive data points are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Straight segments.
    #[default]
    Linear,
    /// Smooth cubic Bézier curve through the points.
    Spline,
    /// Smooth curve joining the last point back to the first.
    ClosedSpline,
    /// Jump at the start of each interval.
    StepStart,
    /// Jump at the end of each interval.
    StepEnd,
    /// Jump halfway along X.
    StepCenterX,
    /// Jump halfway along Y.
    StepCenterY,
}

impl Interpolation {
    /// Step variants.
    #[must_use]
    pub fn is_step(self) -> bool {
        matches!(
            self,
            Self::StepStart | Self::StepEnd | Self::StepCenterX | Self::StepCenterY
        )
    }
}

impl ChartMap {
    /// Build the device path through the points `(x[i], y[i])`.
    ///
    /// Missing columns use the 1-based index. A point that cannot be mapped
    /// ends the current sub-path and the next valid point opens a new one,
    /// unless `skip_invalid` is set, in which case the point is dropped and
    /// its neighbours are joined directly. An invalid map gives an empty path.
    #[must_use]
    pub fn make_path(
        &self,
        x: Option<&[f64]>,
        y: Option<&[f64]>,
        interpolation: Interpolation,
        skip_invalid: bool,
    ) -> Path {
        let mut path = Path::new();
        if !self.is_valid() {
            return path;
        }
        if interpolation.is_step() {
            if let Some(params) = self.polar_parameters().copied() {
                self.polar_steps(&mut path, x, y, interpolation, skip_invalid, &params);
                return path;
            }
        }

        let points = self.view_points(x, y);
        for run in runs(&points, skip_invalid) {
            match interpolation {
                Interpolation::Linear => linear(&mut path, &run),
                Interpolation::Spline => spline(&mut path, &run, false),
                Interpolation::ClosedSpline => spline(&mut path, &run, true),
                Interpolation::StepStart
                | Interpolation::StepEnd
                | Interpolation::StepCenterX
                | Interpolation::StepCenterY => steps(&mut path, &run, interpolation),
            }
        }
        path
    }

    #[allow(clippy::too_many_arguments)]
    fn polar_steps(
        &self,
        path: &mut Path,
        x: Option<&[f64]>,
        y: Option<&[f64]>,
        interpolation: Interpolation,
        skip_invalid: bool,
        params: &PolarParameters,
    ) {
        let n = match (x, y) {
            (Some(x), Some(y)) => x.len().min(y.len()),
            (Some(c), None) | (None, Some(c)) => c.len(),
            (None, None) => 0,
        };
        // (theta, r) pairs in device angle and unit radius.
        let polar: Vec<Option<(f64, f64)>> = (0..n)
            .map(|i| {
                let theta = self.angle(value_or_index(x, i))?;
                let r = self.radius(value_or_index(y, i))?;
                Some((theta, r))
            })
            .collect();

        for run in runs(&polar, skip_invalid) {
            let Some(&(theta0, r0)) = run.first() else {
                continue;
            };
            let start = params.point(r0, theta0);
            path.move_to(start.x, start.y);
            for pair in run.windows(2) {
                let ((t0, r0), (t1, r1)) = (pair[0], pair[1]);
                match interpolation {
                    Interpolation::StepStart => {
                        radial_to(path, params, t0, r1);
                        arc_to(path, params, r1, t0, t1);
                    }
                    Interpolation::StepEnd => {
                        arc_to(path, params, r0, t0, t1);
                        radial_to(path, params, t1, r1);
                    }
                    Interpolation::StepCenterX => {
                        let tm = (t0 + t1) / 2.0;
                        arc_to(path, params, r0, t0, tm);
                        radial_to(path, params, tm, r1);
                        arc_to(path, params, r1, tm, t1);
                    }
                    _ => {
                        let rm = (r0 + r1) / 2.0;
                        radial_to(path, params, t0, rm);
                        arc_to(path, params, rm, t0, t1);
                        radial_to(path, params, t1, r1);
                    }
                }
            }
        }
    }
}

fn radial_to(path: &mut Path, params: &PolarParameters, theta: f64, r: f64) {
    let p = params.point(r, theta);
    path.line_to(p.x, p.y);
}

fn arc_to(path: &mut Path, params: &PolarParameters, r: f64, from: f64, to: f64) {
    if r == 0.0 {
        path.line_to(params.cx, params.cy);
        return;
    }
    // A negative radius flips the arc through the center.
    let (from, to) = if r < 0.0 { (from + PI, to + PI) } else { (from, to) };
    let r = r.abs();
    path.arc(params.cx, params.cy, r * params.rx, r * params.ry, from, to);
}

/// Split mapped points into runs of consecutive valid points.
fn runs<T: Copy>(points: &[Option<T>], skip_invalid: bool) -> Vec<Vec<T>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for point in points {
        match point {
            Some(p) => current.push(*p),
            None if skip_invalid => {}
            None => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn linear(path: &mut Path, run: &[Point]) {
    let Some((first, rest)) = run.split_first() else {
        return;
    };
    path.move_to(first.x, first.y);
    for p in rest {
        path.line_to(p.x, p.y);
    }
}

fn steps(path: &mut Path, run: &[Point], interpolation: Interpolation) {
    let Some(first) = run.first() else {
        return;
    };
    path.move_to(first.x, first.y);
    for pair in run.windows(2) {
        let (p0, p1) = (pair[0], pair[1]);
        match interpolation {
            Interpolation::StepStart => {
                path.line_to(p0.x, p1.y);
            }
            Interpolation::StepEnd => {
                path.line_to(p1.x, p0.y);
            }
            Interpolation::StepCenterX => {
                let um = (p0.x + p1.x) / 2.0;
                path.line_to(um, p0.y).line_to(um, p1.y);
            }
            _ => {
                let vm = (p0.y + p1.y) / 2.0;
                path.line_to(p0.x, vm).line_to(p1.x, vm);
            }
        }
        path.line_to(p1.x, p1.y);
    }
}

/// Direction and length of the segment `a -> b`.
fn segment(a: Point, b: Point) -> (f64, f64) {
    ((b.y - a.y).atan2(b.x - a.x), a.distance(b))
}

/// Tangent direction at a point joining an incoming segment of direction
/// `alpha` and length `la` to an outgoing one of direction `beta` and length
/// `lb`: the angle average weighted by the opposite segment lengths.
fn tangent(alpha: f64, la: f64, beta: f64, lb: f64) -> f64 {
    if la + lb <= 0.0 {
        return alpha;
    }
    let mut beta = beta;
    if beta - alpha > PI {
        beta -= TAU;
    } else if alpha - beta > PI {
        beta += TAU;
    }
    (alpha * lb + beta * la) / (la + lb)
}

fn spline(path: &mut Path, run: &[Point], closed: bool) {
    let n = run.len();
    if n < 3 {
        linear(path, run);
        if closed && n > 1 {
            path.close();
        }
        return;
    }
    // Drop repeated points: they carry no direction.
    let mut pts: Vec<Point> = Vec::with_capacity(n);
    for p in run {
        if pts.last().map_or(true, |q: &Point| q.distance(*p) > 0.0) {
            pts.push(*p);
        }
    }
    if closed && pts.len() > 1 && pts[0].distance(pts[pts.len() - 1]) == 0.0 {
        pts.pop();
    }
    let n = pts.len();
    if n < 3 {
        linear(path, &pts);
        if closed && n > 1 {
            path.close();
        }
        return;
    }

    let seg_count = if closed { n } else { n - 1 };
    let segs: Vec<(f64, f64)> = (0..seg_count)
        .map(|i| segment(pts[i], pts[(i + 1) % n]))
        .collect();

    let mut tangents = vec![0.0; n];
    for i in 0..n {
        let (incoming, outgoing) = if closed {
            (Some(segs[(i + n - 1) % n]), Some(segs[i]))
        } else {
            (i.checked_sub(1).map(|k| segs[k]), segs.get(i).copied())
        };
        tangents[i] = match (incoming, outgoing) {
            (Some((alpha, la)), Some((beta, lb))) => tangent(alpha, la, beta, lb),
            _ => 0.0,
        };
    }
    if !closed {
        // Reflect the neighbouring tangent about the end segments.
        tangents[0] = 2.0 * segs[0].0 - tangents[1];
        tangents[n - 1] = 2.0 * segs[n - 2].0 - tangents[n - 2];
    }

    path.move_to(pts[0].x, pts[0].y);
    for (i, &(_, len)) in segs.iter().enumerate() {
        let j = (i + 1) % n;
        let (p0, p1) = (pts[i], pts[j]);
        let d = len / 3.0;
        let c1 = Point::new(p0.x + d * tangents[i].cos(), p0.y + d * tangents[i].sin());
        let c2 = Point::new(p1.x - d * tangents[j].cos(), p1.y - d * tangents[j].sin());
        path.curve_to(c1, c2, p1);
    }
    if closed {
        path.close();
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
        let y = Axis::new(AxisKind::Y).with_bounds(0.0, 10.0);
        ChartMap::new(
            AxisSet::XY,
            &Rect::new(0.0, 0.0, 100.0, 100.0),
            Some(&x),
            Some(&y),
            None,
            false,
        )
    }

    fn polar_map() -> ChartMap {
        let circular = Axis::new(AxisKind::Circular).discrete(true).with_bounds(1.0, 4.0);
        let radial = Axis::new(AxisKind::Radial).with_bounds(0.0, 1.0);
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
    fn test_linear_single_subpath() {
        let path = xy_map().make_path(None, Some(&[1.0, 2.0, 3.0, 4.0]), Interpolation::Linear, false);
        assert_eq!(path.sub_path_count(), 1);
        assert_eq!(path.vertex_count(), 4);
        assert_eq!(path.ops()[0], PathOp::MoveTo(Point::new(10.0, 90.0)));
    }

    #[test]
    fn test_gap_splits_subpaths() {
        let y = [1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0];
        let path = xy_map().make_path(None, Some(&y), Interpolation::Linear, false);
        let groups = path.sub_paths();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 3);
    }

    #[test]
    fn test_leading_gap_has_no_empty_subpath() {
        let y = [f64::NAN, 2.0, 3.0];
        let path = xy_map().make_path(None, Some(&y), Interpolation::Linear, false);
        assert_eq!(path.sub_path_count(), 1);
        assert_eq!(path.vertex_count(), 2);
    }

    #[test]
    fn test_skip_invalid_joins_neighbours() {
        let y = [1.0, f64::NAN, 3.0];
        let path = xy_map().make_path(None, Some(&y), Interpolation::Linear, true);
        assert_eq!(path.sub_path_count(), 1);
        assert_eq!(path.vertex_count(), 2);
    }

    #[test]
    fn test_invalid_map_gives_empty_path() {
        let x = Axis::new(AxisKind::X).with_bounds(1.0, 1.0);
        let y = Axis::new(AxisKind::Y);
        let map = ChartMap::new(AxisSet::XY, &Rect::new(0.0, 0.0, 10.0, 10.0), Some(&x), Some(&y), None, false);
        assert!(map.make_path(None, Some(&[0.5]), Interpolation::Linear, false).is_empty());
    }

    #[test]
    fn test_spline_passes_through_points() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 3.0, 2.0, 5.0];
        let path = xy_map().make_path(Some(&x), Some(&y), Interpolation::Spline, false);
        assert_eq!(path.sub_path_count(), 1);
        let ends: Vec<Point> = path
            .ops()
            .iter()
            .filter_map(|op| match op {
                PathOp::CurveTo(_, _, p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(ends.len(), 3);
        assert_relative_eq!(ends[2].x, 40.0);
        assert_relative_eq!(ends[2].y, 50.0);
    }

    #[test]
    fn test_spline_collinear_points_stay_straight() {
        let y = [1.0, 2.0, 3.0];
        let path = xy_map().make_path(None, Some(&y), Interpolation::Spline, false);
        for op in path.ops() {
            if let PathOp::CurveTo(c1, c2, p) = op {
                // On the line v = 100 - 10u.
                for q in [c1, c2, p] {
                    assert_relative_eq!(q.y, 100.0 - q.x, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_closed_spline_closes() {
        let x = [1.0, 5.0, 9.0];
        let y = [1.0, 9.0, 1.0];
        let path = xy_map().make_path(Some(&x), Some(&y), Interpolation::ClosedSpline, false);
        assert_eq!(path.ops().last(), Some(&PathOp::Close));
        let curves = path.ops().iter().filter(|op| matches!(op, PathOp::CurveTo(..))).count();
        assert_eq!(curves, 3);
    }

    #[test]
    fn test_step_start_is_vertical_first() {
        let x = [1.0, 2.0];
        let y = [1.0, 3.0];
        let path = xy_map().make_path(Some(&x), Some(&y), Interpolation::StepStart, false);
        assert_eq!(
            path.ops(),
            &[
                PathOp::MoveTo(Point::new(10.0, 90.0)),
                PathOp::LineTo(Point::new(10.0, 70.0)),
                PathOp::LineTo(Point::new(20.0, 70.0)),
            ]
        );
    }

    #[test]
    fn test_step_end_and_centers() {
        let x = [1.0, 3.0];
        let y = [1.0, 3.0];
        let map = xy_map();
        let end = map.make_path(Some(&x), Some(&y), Interpolation::StepEnd, false);
        assert_eq!(end.ops()[1], PathOp::LineTo(Point::new(30.0, 90.0)));
        let cx = map.make_path(Some(&x), Some(&y), Interpolation::StepCenterX, false);
        assert_eq!(cx.ops()[1], PathOp::LineTo(Point::new(20.0, 90.0)));
        assert_eq!(cx.ops()[2], PathOp::LineTo(Point::new(20.0, 70.0)));
        let cy = map.make_path(Some(&x), Some(&y), Interpolation::StepCenterY, false);
        assert_eq!(cy.ops()[1], PathOp::LineTo(Point::new(10.0, 80.0)));
    }

    #[test]
    fn test_polar_steps_use_arcs() {
        let y = [0.5, 1.0, 0.5];
        let path = polar_map().make_path(None, Some(&y), Interpolation::StepEnd, false);
        let arcs = path.ops().iter().filter(|op| matches!(op, PathOp::Arc { .. })).count();
        assert_eq!(arcs, 2);
        // Path ends on the last data point.
        let end = path.current_point().unwrap();
        let expected = polar_map().to_point(3.0, 0.5).unwrap();
        assert_relative_eq!(end.x, expected.x, epsilon = 1e-9);
        assert_relative_eq!(end.y, expected.y, epsilon = 1e-9);
    }

    #[test]
    fn test_polar_linear_is_straight() {
        let y = [1.0, 1.0, 1.0, 1.0];
        let path = polar_map().make_path(None, Some(&y), Interpolation::Linear, false);
        assert_eq!(path.vertex_count(), 4);
        assert!(path.ops().iter().all(|op| !matches!(op, PathOp::Arc { .. })));
    }

    #[test]
    fn test_tangent_wraps() {
        // Directions just either side of ±π average to π, not 0.
        let t = tangent(PI - 0.1, 1.0, -PI + 0.1, 1.0);
        assert_relative_eq!(t.cos(), -1.0, epsilon = 1e-9);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::axis::{Axis, AxisKind};
    use crate::chart_map::AxisSet;
    use crate::geometry::Rect;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// One gap at `k` splits a finite series into runs of `k` and `n - k - 1`.
        #[test]
        fn prop_single_gap_split(n in 2usize..40, k_seed in 0usize..1000) {
            let k = k_seed % n;
            let mut y: Vec<f64> = (0..n).map(|i| (i % 7) as f64).collect();
            y[k] = f64::NAN;
            let x_axis = Axis::new(AxisKind::X).with_bounds(0.0, 50.0);
            let y_axis = Axis::new(AxisKind::Y).with_bounds(0.0, 10.0);
            let map = ChartMap::new(AxisSet::XY, &Rect::new(0.0, 0.0, 500.0, 100.0), Some(&x_axis), Some(&y_axis), None, false);
            let path = map.make_path(None, Some(&y), Interpolation::Linear, false);
            let lengths: Vec<usize> = path.sub_paths().iter().map(|g| g.len()).collect();
            let expected: Vec<usize> = [k, n - k - 1].into_iter().filter(|&l| l > 0).collect();
            prop_assert_eq!(lengths, expected);
        }
    }
}
