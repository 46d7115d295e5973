//! Fitting polar layouts into a rectangle.
//!
//! Both layouts work on the unit circle first: they compute the bounding box
//! of what will actually be drawn (polygon vertices or the swept arc plus its
//! center), then scale that box into the plot area.

use crate::geometry::Rect;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Smallest unit-box side considered non-degenerate.
const MIN_EXTENT: f64 = 1e-9;

/// Bounding box on the unit circle: `(x_min, x_max, y_min, y_max)`.
pub type UnitBox = (f64, f64, f64, f64);

/// Center and radii of a fitted polar layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    /// Center x.
    pub cx: f64,
    /// Center y.
    pub cy: f64,
    /// Horizontal radius.
    pub rx: f64,
    /// Vertical radius.
    pub ry: f64,
}

/// Most categories laid out as polygon vertices; larger counts are drawn as
/// a circle.
pub const MAX_POLYGON_VERTICES: usize = 1000;

/// Bounding box of the vertices of a regular `n`-gon whose first vertex sits
/// at angle `start`.
///
/// Above [`MAX_POLYGON_VERTICES`] the polygon is treated as its circumcircle.
#[must_use]
pub fn polygon_extents(n: usize, start: f64) -> UnitBox {
    if n > MAX_POLYGON_VERTICES {
        return (-1.0, 1.0, -1.0, 1.0);
    }
    let n = n.max(1);
    let mut bbox = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for k in 0..n {
        let theta = start + TAU * k as f64 / n as f64;
        include(&mut bbox, theta.cos(), theta.sin());
    }
    bbox
}

/// Bounding box of the sector swept from `th0` to `th1`, center included.
///
/// Sweeps of a full turn or more give the whole unit box. Negative sweeps are
/// handled by swapping the ends.
#[must_use]
pub fn arc_extents(th0: f64, th1: f64) -> UnitBox {
    let (lo, hi) = if th0 <= th1 { (th0, th1) } else { (th1, th0) };
    if hi - lo >= TAU - 1e-12 {
        return (-1.0, 1.0, -1.0, 1.0);
    }
    let mut bbox = (0.0, 0.0, 0.0, 0.0);
    include(&mut bbox, lo.cos(), lo.sin());
    include(&mut bbox, hi.cos(), hi.sin());

    // Compass extrema reached inside the sweep.
    let mut k = (lo / FRAC_PI_2).ceil();
    while k * FRAC_PI_2 <= hi {
        let quadrant = (k as i64).rem_euclid(4);
        let (x, y) = match quadrant {
            0 => (1.0, 0.0),
            1 => (0.0, 1.0),
            2 => (-1.0, 0.0),
            _ => (0.0, -1.0),
        };
        include(&mut bbox, x, y);
        k += 1.0;
    }
    bbox
}

fn include(bbox: &mut UnitBox, x: f64, y: f64) {
    bbox.0 = bbox.0.min(x);
    bbox.1 = bbox.1.max(x);
    bbox.2 = bbox.2.min(y);
    bbox.3 = bbox.3.max(y);
}

/// Scale a unit-circle bounding box into `area`.
///
/// With `fill_area` the radii stretch independently; otherwise they are
/// locked to the smaller of the two so circles stay round.
#[must_use]
pub fn fit(area: &Rect, bbox: UnitBox, fill_area: bool) -> Fit {
    let (x0, x1, y0, y1) = bbox;
    let width = x1 - x0;
    let height = y1 - y0;

    let mut rx = (width > MIN_EXTENT).then(|| area.width / width);
    let mut ry = (height > MIN_EXTENT).then(|| area.height / height);
    match (rx, ry) {
        (None, Some(r)) => rx = Some(r),
        (Some(r), None) => ry = Some(r),
        (None, None) => {
            let r = area.width.min(area.height) / 2.0;
            rx = Some(r);
            ry = Some(r);
        }
        (Some(_), Some(_)) => {}
    }
    let (mut rx, mut ry) = (rx.unwrap_or(0.0), ry.unwrap_or(0.0));
    if !fill_area {
        let r = rx.min(ry);
        rx = r;
        ry = r;
    }

    let center = area.center();
    Fit {
        cx: center.x - rx * (x0 + x1) / 2.0,
        cy: center.y - ry * (y0 + y1) / 2.0,
        rx,
        ry,
    }
}

/// Polygon layout for `n` categories, first vertex at `start`.
#[must_use]
pub fn polygon_parameters(area: &Rect, n: usize, start: f64, fill_area: bool) -> Fit {
    fit(area, polygon_extents(n, start), fill_area)
}

/// Circle layout for the sweep `[th0, th1]`.
#[must_use]
pub fn circle_parameters(area: &Rect, th0: f64, th1: f64, fill_area: bool) -> Fit {
    fit(area, arc_extents(th0, th1), fill_area)
}

/// Normalize an angle into `(-π, π]`.
#[must_use]
pub fn normalize_angle(theta: f64) -> f64 {
    let t = (theta + PI).rem_euclid(TAU) - PI;
    if t <= -PI {
        t + TAU
    } else {
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_square_polygon_extents() {
        let (x0, x1, y0, y1) = polygon_extents(4, -FRAC_PI_2);
        assert_relative_eq!(x0, -1.0, epsilon = 1e-12);
        assert_relative_eq!(x1, 1.0, epsilon = 1e-12);
        assert_relative_eq!(y0, -1.0, epsilon = 1e-12);
        assert_relative_eq!(y1, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_huge_polygon_is_a_circle() {
        assert_eq!(polygon_extents(usize::MAX, 0.3), (-1.0, 1.0, -1.0, 1.0));
        let fit = polygon_parameters(&Rect::new(0.0, 0.0, 100.0, 100.0), MAX_POLYGON_VERTICES + 1, 0.0, false);
        assert_eq!((fit.cx, fit.cy, fit.rx, fit.ry), (50.0, 50.0, 50.0, 50.0));
    }

    #[test]
    fn test_triangle_polygon_is_off_center() {
        let (_, _, y0, y1) = polygon_extents(3, -FRAC_PI_2);
        assert_relative_eq!(y0, -1.0, epsilon = 1e-12);
        assert_relative_eq!(y1, 0.5, epsilon = 1e-12);

        let area = Rect::new(0.0, 0.0, 100.0, 100.0);
        let fit = polygon_parameters(&area, 3, -FRAC_PI_2, true);
        assert_relative_eq!(fit.ry, 100.0 / 1.5, epsilon = 1e-9);
        // Top vertex touches the top edge, bottom edge touches the bottom.
        assert_relative_eq!(fit.cy - fit.ry, 0.0, epsilon = 1e-9);
        assert_relative_eq!(fit.cy + 0.5 * fit.ry, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_locked_radii() {
        let area = Rect::new(0.0, 0.0, 200.0, 100.0);
        let locked = polygon_parameters(&area, 4, -FRAC_PI_2, false);
        assert_relative_eq!(locked.rx, 50.0, epsilon = 1e-9);
        assert_relative_eq!(locked.ry, 50.0, epsilon = 1e-9);
        assert_relative_eq!(locked.cx, 100.0, epsilon = 1e-9);

        let stretched = polygon_parameters(&area, 4, -FRAC_PI_2, true);
        assert_relative_eq!(stretched.rx, 100.0, epsilon = 1e-9);
        assert_relative_eq!(stretched.ry, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_arc_extents_half_disc() {
        // Upper half on screen: from -π to 0 passes through -π/2 (top).
        let (x0, x1, y0, y1) = arc_extents(-PI, 0.0);
        assert_relative_eq!(x0, -1.0, epsilon = 1e-12);
        assert_relative_eq!(x1, 1.0, epsilon = 1e-12);
        assert_relative_eq!(y0, -1.0, epsilon = 1e-12);
        assert_relative_eq!(y1, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_arc_extents_quarter_without_extrema() {
        let (x0, x1, y0, y1) = arc_extents(0.1, 0.2);
        assert_eq!(x0, 0.0);
        assert_relative_eq!(x1, 0.1f64.cos(), epsilon = 1e-12);
        assert_eq!(y0, 0.0);
        assert_relative_eq!(y1, 0.2f64.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_arc_extents_negative_and_full_sweeps() {
        assert_eq!(arc_extents(FRAC_PI_2, -FRAC_PI_2), arc_extents(-FRAC_PI_2, FRAC_PI_2));
        assert_eq!(arc_extents(0.0, 3.0 * PI), (-1.0, 1.0, -1.0, 1.0));
    }

    #[test]
    fn test_half_disc_fills_wide_area() {
        let area = Rect::new(0.0, 0.0, 200.0, 100.0);
        let fit = circle_parameters(&area, -PI, 0.0, false);
        assert_relative_eq!(fit.rx, 100.0, epsilon = 1e-9);
        assert_relative_eq!(fit.cy, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(normalize_angle(2.5 * PI), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(-FRAC_PI_2), -FRAC_PI_2, epsilon = 1e-12);
    }
}
