//! Rasterization primitives.
//!
//! Polygons are filled by an anti-aliased scanline pass that samples each
//! pixel row on several sub-rows and integrates horizontal coverage exactly.
//! Wide strokes are converted to polygons and filled the same way; hairlines
//! use Wu's line algorithm.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::Point;
use crate::path::Polyline;
use std::f64::consts::PI;

/// Sub-rows sampled per pixel row.
const SUBSAMPLES: usize = 4;

/// Strokes at most this wide are drawn as Wu hairlines.
const HAIRLINE_WIDTH: f64 = 1.0;

/// Interior test for overlapping or self-intersecting polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// Inside when the winding number is not zero.
    #[default]
    NonZero,
    /// Inside when an odd number of edges is crossed.
    EvenOdd,
}

impl FillRule {
    fn is_inside(self, winding: i32) -> bool {
        match self {
            Self::NonZero => winding != 0,
            Self::EvenOdd => winding % 2 != 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    dir: i32,
}

fn collect_edges(polygons: &[Vec<Point>]) -> Vec<Edge> {
    let mut edges = Vec::new();
    for poly in polygons {
        let n = poly.len();
        if n < 3 {
            continue;
        }
        for i in 0..n {
            let a = poly[i];
            let b = poly[(i + 1) % n];
            if !a.is_finite() || !b.is_finite() || a.y == b.y {
                continue;
            }
            edges.push(if a.y < b.y {
                Edge {
                    x0: a.x,
                    y0: a.y,
                    x1: b.x,
                    y1: b.y,
                    dir: 1,
                }
            } else {
                Edge {
                    x0: b.x,
                    y0: b.y,
                    x1: a.x,
                    y1: a.y,
                    dir: -1,
                }
            });
        }
    }
    edges
}

/// Add `weight` times the covered length of `[xa, xb)` to each cell.
fn add_span(coverage: &mut [f32], xa: f64, xb: f64, weight: f32) {
    if xb <= xa {
        return;
    }
    let ia = xa.floor() as usize;
    let ib = xb.floor() as usize;
    if ia == ib {
        coverage[ia] += (xb - xa) as f32 * weight;
        return;
    }
    coverage[ia] += ((ia + 1) as f64 - xa) as f32 * weight;
    for cell in &mut coverage[ia + 1..ib] {
        *cell += weight;
    }
    if ib < coverage.len() {
        coverage[ib] += (xb - ib as f64) as f32 * weight;
    }
}

/// Fill the union of `polygons` (each implicitly closed) with `color`.
pub fn fill_polygons(fb: &mut Framebuffer, polygons: &[Vec<Point>], color: Rgba, rule: FillRule) {
    if color.is_transparent() {
        return;
    }
    let edges = collect_edges(polygons);
    if edges.is_empty() {
        return;
    }

    let (cx0, cy0, cx1, cy1) = fb.clip_bounds();
    let ymin = edges.iter().map(|e| e.y0).fold(f64::INFINITY, f64::min);
    let ymax = edges.iter().map(|e| e.y1).fold(f64::NEG_INFINITY, f64::max);
    let row_start = (ymin.floor().max(f64::from(cy0))) as u32;
    let row_end = (ymax.ceil().min(f64::from(cy1))).max(0.0) as u32;
    let (left, right) = (f64::from(cx0), f64::from(cx1));

    let mut coverage = vec![0.0f32; cx1 as usize + 1];
    let mut crossings: Vec<(f64, i32)> = Vec::new();
    let weight = 1.0 / SUBSAMPLES as f32;

    for py in row_start..row_end {
        coverage.iter_mut().for_each(|c| *c = 0.0);
        let mut touched = false;

        for s in 0..SUBSAMPLES {
            let sy = f64::from(py) + (s as f64 + 0.5) / SUBSAMPLES as f64;
            crossings.clear();
            crossings.extend(edges.iter().filter(|e| e.y0 <= sy && sy < e.y1).map(|e| {
                let t = (sy - e.y0) / (e.y1 - e.y0);
                (e.x0 + t * (e.x1 - e.x0), e.dir)
            }));
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if rule.is_inside(winding) {
                    let xa = pair[0].0.clamp(left, right);
                    let xb = pair[1].0.clamp(left, right);
                    add_span(&mut coverage, xa, xb, weight);
                    touched |= xb > xa;
                }
            }
        }

        if !touched {
            continue;
        }
        for px in cx0..cx1 {
            let c = coverage[px as usize];
            if c > 0.0 {
                fb.blend_coverage(px, py, color, c.min(1.0));
            }
        }
    }
}

fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.0
}

/// Same winding for every stroke piece so that overlaps never cancel.
fn oriented(mut points: Vec<Point>) -> Vec<Point> {
    if signed_area(&points) > 0.0 {
        points.reverse();
    }
    points
}

fn round_join(center: Point, radius: f64) -> Vec<Point> {
    let steps = ((radius * 2.0).ceil() as usize).clamp(8, 64);
    (0..steps)
        .map(|i| {
            let theta = 2.0 * PI * i as f64 / steps as f64;
            Point::new(center.x + radius * theta.cos(), center.y + radius * theta.sin())
        })
        .collect()
}

/// Outline polygons of a stroke of `width` along `line`.
fn stroke_outline(line: &Polyline, width: f64, out: &mut Vec<Vec<Point>>) {
    let hw = width / 2.0;
    let mut points: Vec<Point> = line.points.iter().copied().filter(|p| p.is_finite()).collect();
    points.dedup();
    if line.closed && points.len() > 2 {
        if let Some(&first) = points.first() {
            points.push(first);
        }
    }
    if points.len() < 2 {
        return;
    }

    for seg in points.windows(2) {
        let (a, b) = (seg[0], seg[1]);
        let len = a.distance(b);
        if len == 0.0 {
            continue;
        }
        let nx = -(b.y - a.y) / len * hw;
        let ny = (b.x - a.x) / len * hw;
        out.push(oriented(vec![
            Point::new(a.x + nx, a.y + ny),
            Point::new(b.x + nx, b.y + ny),
            Point::new(b.x - nx, b.y - ny),
            Point::new(a.x - nx, a.y - ny),
        ]));
    }

    let last = points.len() - 1;
    let joints = if line.closed { &points[..last] } else { &points[1..last] };
    for &p in joints {
        out.push(oriented(round_join(p, hw)));
    }
}

/// Stroke every polyline with a line of `width` device units.
pub fn stroke_polylines(fb: &mut Framebuffer, lines: &[Polyline], width: f64, color: Rgba) {
    if color.is_transparent() {
        return;
    }
    if width <= HAIRLINE_WIDTH {
        let faded = color.with_alpha((f64::from(color.a) * width.clamp(0.0, 1.0)).round() as u8);
        for line in lines {
            let mut segments: Vec<(Point, Point)> =
                line.points.windows(2).map(|s| (s[0], s[1])).collect();
            if line.closed && line.points.len() > 2 {
                if let (Some(&last), Some(&first)) = (line.points.last(), line.points.first()) {
                    segments.push((last, first));
                }
            }
            for (a, b) in segments {
                if a.is_finite() && b.is_finite() {
                    draw_line_aa(fb, a.x, a.y, b.x, b.y, faded);
                }
            }
        }
        return;
    }

    let mut polygons = Vec::new();
    for line in lines {
        stroke_outline(line, width, &mut polygons);
    }
    fill_polygons(fb, &polygons, color, FillRule::NonZero);
}

/// Draw an anti-aliased line using Wu's algorithm.
///
/// Two pixels are plotted at each step along the major axis, with
/// intensities given by the fractional distance from the ideal line.
///
/// # References
///
/// Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
pub fn draw_line_aa(fb: &mut Framebuffer, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba) {
    // Pixel centers sit at half-integer device coordinates.
    let (x0, y0, x1, y1) = (x0 - 0.5, y0 - 0.5, x1 - 0.5, y1 - 0.5);
    let steep = (y1 - y0).abs() > (x1 - x0).abs();

    let (x0, y0, x1, y1) = if steep { (y0, x0, y1, x1) } else { (x0, y0, x1, y1) };
    let (x0, y0, x1, y1) = if x0 > x1 { (x1, y1, x0, y0) } else { (x0, y0, x1, y1) };

    let dx = x1 - x0;
    let dy = y1 - y0;
    let gradient = if dx.abs() < f64::EPSILON { 1.0 } else { dy / dx };

    let mut plot_pair = |major: i64, minor: f64, gap: f64| {
        let base = minor.floor() as i64;
        let (near, far) = (rfpart(minor) * gap, fpart(minor) * gap);
        if steep {
            plot(fb, base, major, color, near);
            plot(fb, base + 1, major, color, far);
        } else {
            plot(fb, major, base, color, near);
            plot(fb, major, base + 1, color, far);
        }
    };

    let xend = x0.round();
    let yend = y0 + gradient * (xend - x0);
    let xpxl1 = xend as i64;
    plot_pair(xpxl1, yend, rfpart(x0 + 0.5));
    let mut intery = yend + gradient;

    let xend = x1.round();
    let yend = y1 + gradient * (xend - x1);
    let xpxl2 = xend as i64;
    if xpxl2 != xpxl1 {
        plot_pair(xpxl2, yend, fpart(x1 + 0.5));
    }

    for x in (xpxl1 + 1)..xpxl2 {
        plot_pair(x, intery, 1.0);
        intery += gradient;
    }
}

#[inline]
fn plot(fb: &mut Framebuffer, x: i64, y: i64, color: Rgba, intensity: f64) {
    if x >= 0 && y >= 0 && x < i64::from(fb.width()) && y < i64::from(fb.height()) {
        fb.blend_coverage(x as u32, y as u32, color, intensity as f32);
    }
}

#[inline]
fn fpart(x: f64) -> f64 {
    x - x.floor()
}

#[inline]
fn rfpart(x: f64) -> f64 {
    1.0 - fpart(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn canvas() -> Framebuffer {
        Framebuffer::new(20, 20).unwrap()
    }

    fn square(x: f64, y: f64, size: f64) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ]
    }

    #[test]
    fn test_fill_pixel_aligned_square() {
        let mut fb = canvas();
        fill_polygons(&mut fb, &[square(2.0, 2.0, 4.0)], Rgba::RED, FillRule::NonZero);
        assert_eq!(fb.get_pixel(2, 2), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(6, 6), Some(Rgba::TRANSPARENT));
        assert_eq!(fb.get_pixel(1, 3), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_fill_partial_coverage() {
        let mut fb = canvas();
        fill_polygons(&mut fb, &[square(2.5, 2.0, 4.0)], Rgba::BLACK, FillRule::NonZero);
        let edge = fb.get_pixel(2, 3).unwrap();
        assert!(edge.a > 100 && edge.a < 155, "half covered: {}", edge.a);
        assert_eq!(fb.get_pixel(3, 3).unwrap().a, 255);
    }

    #[test]
    fn test_even_odd_hole() {
        let outer = square(0.0, 0.0, 10.0);
        let inner = square(3.0, 3.0, 4.0);

        let mut fb = canvas();
        fill_polygons(&mut fb, &[outer.clone(), inner.clone()], Rgba::BLUE, FillRule::EvenOdd);
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::TRANSPARENT));
        assert_eq!(fb.get_pixel(1, 1), Some(Rgba::BLUE));

        let mut fb = canvas();
        fill_polygons(&mut fb, &[outer, inner], Rgba::BLUE, FillRule::NonZero);
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::BLUE));
    }

    #[test]
    fn test_fill_respects_clip() {
        let mut fb = canvas();
        fb.set_clip(Some(&Rect::new(0.0, 0.0, 4.0, 20.0)));
        fill_polygons(&mut fb, &[square(0.0, 0.0, 10.0)], Rgba::GREEN, FillRule::NonZero);
        assert_eq!(fb.get_pixel(3, 3), Some(Rgba::GREEN));
        assert_eq!(fb.get_pixel(4, 3), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_degenerate_polygons_ignored() {
        let mut fb = canvas();
        let line = vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        let flat = vec![Point::new(0.0, 5.0), Point::new(5.0, 5.0), Point::new(10.0, 5.0)];
        fill_polygons(&mut fb, &[line, flat], Rgba::RED, FillRule::NonZero);
        assert!(fb.to_compact_pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_wide_stroke_covers_band() {
        let mut fb = canvas();
        let line = Polyline {
            points: vec![Point::new(2.0, 10.0), Point::new(18.0, 10.0)],
            closed: false,
        };
        stroke_polylines(&mut fb, &[line], 4.0, Rgba::BLACK);
        assert_eq!(fb.get_pixel(10, 8).unwrap().a, 255);
        assert_eq!(fb.get_pixel(10, 11).unwrap().a, 255);
        assert_eq!(fb.get_pixel(10, 13), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_wide_stroke_joint_does_not_cancel() {
        let mut fb = canvas();
        let line = Polyline {
            points: vec![
                Point::new(2.0, 2.0),
                Point::new(15.0, 2.0),
                Point::new(15.0, 15.0),
            ],
            closed: false,
        };
        stroke_polylines(&mut fb, &[line], 3.0, Rgba::RED);
        assert_eq!(fb.get_pixel(15, 2).unwrap().a, 255);
    }

    #[test]
    fn test_hairline_touches_path() {
        let mut fb = canvas();
        let line = Polyline {
            points: vec![Point::new(0.5, 5.5), Point::new(19.5, 5.5)],
            closed: false,
        };
        stroke_polylines(&mut fb, &[line], 1.0, Rgba::BLACK);
        assert_eq!(fb.get_pixel(10, 5).unwrap().a, 255);
        assert_eq!(fb.get_pixel(10, 7), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_draw_line_aa_diagonal() {
        let mut fb = canvas();
        draw_line_aa(&mut fb, 0.5, 0.5, 10.5, 10.5, Rgba::BLACK);
        assert!(fb.get_pixel(5, 5).unwrap().a > 200);
        assert_eq!(fb.get_pixel(5, 15), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_signed_area_orientation() {
        let sq = square(0.0, 0.0, 2.0);
        assert!(signed_area(&sq) > 0.0);
        assert!(signed_area(&oriented(sq)) < 0.0);
    }
}
