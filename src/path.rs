//! Renderer-agnostic paths.
//!
//! A [`Path`] is a flat list of drawing operations. Chart maps build them in
//! device space and renderers consume them; nothing here knows about data
//! space. Elliptic arcs are kept as arcs so vector backends can emit them
//! exactly; raster backends flatten them with [`Path::flatten`].

use crate::geometry::{Point, Rect};
use std::f64::consts::PI;

/// One path operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    /// Start a new sub-path.
    MoveTo(Point),
    /// Straight segment from the current point.
    LineTo(Point),
    /// Cubic Bézier from the current point.
    CurveTo(Point, Point, Point),
    /// Elliptic arc about `center`. Angles are radians in device orientation
    /// (increasing angles turn clockwise on screen). A current point, if any,
    /// is joined to the arc start with a straight segment; otherwise the arc
    /// start opens the sub-path.
    Arc {
        /// Arc center.
        center: Point,
        /// Horizontal radius.
        rx: f64,
        /// Vertical radius.
        ry: f64,
        /// Start angle.
        start: f64,
        /// End angle; smaller than `start` for counter-clockwise sweeps.
        end: f64,
    },
    /// Close the current sub-path.
    Close,
}

/// Point on an ellipse at angle `theta`.
#[must_use]
pub fn ellipse_point(center: Point, rx: f64, ry: f64, theta: f64) -> Point {
    Point::new(center.x + rx * theta.cos(), center.y + ry * theta.sin())
}

/// A flattened sub-path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    /// Vertices in drawing order.
    pub points: Vec<Point>,
    /// The sub-path ends with a close operation.
    pub closed: bool,
}

/// An ordered sequence of sub-paths.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    ops: Vec<PathOp>,
}

impl Path {
    /// Create an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations in order.
    #[must_use]
    pub fn ops(&self) -> &[PathOp] {
        &self.ops
    }

    /// No operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Remove every operation.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Start a new sub-path at `(x, y)`.
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.ops.push(PathOp::MoveTo(Point::new(x, y)));
        self
    }

    /// Straight segment to `(x, y)`.
    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.ops.push(PathOp::LineTo(Point::new(x, y)));
        self
    }

    /// Cubic Bézier segment.
    pub fn curve_to(&mut self, c1: Point, c2: Point, to: Point) -> &mut Self {
        self.ops.push(PathOp::CurveTo(c1, c2, to));
        self
    }

    /// Elliptic arc about `(cx, cy)` from `start` to `end`.
    pub fn arc(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start: f64, end: f64) -> &mut Self {
        self.ops.push(PathOp::Arc {
            center: Point::new(cx, cy),
            rx,
            ry,
            start,
            end,
        });
        self
    }

    /// Close the current sub-path.
    pub fn close(&mut self) -> &mut Self {
        self.ops.push(PathOp::Close);
        self
    }

    /// Axis-aligned rectangle as a closed sub-path.
    pub fn rectangle(&mut self, rect: &Rect) -> &mut Self {
        self.move_to(rect.x, rect.y)
            .line_to(rect.right(), rect.y)
            .line_to(rect.right(), rect.bottom())
            .line_to(rect.x, rect.bottom())
            .close()
    }

    /// Pie wedge: center, arc, back to center.
    pub fn pie_wedge(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start: f64, end: f64) -> &mut Self {
        self.move_to(cx, cy).arc(cx, cy, rx, ry, start, end).close()
    }

    /// Ring wedge between an outer and an inner ellipse.
    #[allow(clippy::too_many_arguments)]
    pub fn ring_wedge(
        &mut self,
        cx: f64,
        cy: f64,
        rx_out: f64,
        ry_out: f64,
        rx_in: f64,
        ry_in: f64,
        start: f64,
        end: f64,
    ) -> &mut Self {
        if rx_in <= 0.0 || ry_in <= 0.0 {
            return self.pie_wedge(cx, cy, rx_out, ry_out, start, end);
        }
        let first = ellipse_point(Point::new(cx, cy), rx_out, ry_out, start);
        self.move_to(first.x, first.y)
            .arc(cx, cy, rx_out, ry_out, start, end)
            .arc(cx, cy, rx_in, ry_in, end, start)
            .close()
    }

    /// Append every operation of `other`.
    pub fn append(&mut self, other: &Path) -> &mut Self {
        self.ops.extend_from_slice(&other.ops);
        self
    }

    /// Append `other` as a continuation of the current sub-path: its first
    /// move becomes a straight segment.
    pub fn append_continuation(&mut self, other: &Path) -> &mut Self {
        let mut ops = other.ops.iter();
        if let Some(first) = ops.next() {
            self.ops.push(match *first {
                PathOp::MoveTo(p) => PathOp::LineTo(p),
                op => op,
            });
        }
        self.ops.extend(ops.copied());
        self
    }

    /// Operations grouped by sub-path. Each group opens with a move or an arc.
    #[must_use]
    pub fn sub_paths(&self) -> Vec<&[PathOp]> {
        let mut groups = Vec::new();
        let mut start = 0;
        for (i, op) in self.ops.iter().enumerate() {
            if i > start && matches!(op, PathOp::MoveTo(_)) {
                groups.push(&self.ops[start..i]);
                start = i;
            }
        }
        if start < self.ops.len() {
            groups.push(&self.ops[start..]);
        }
        groups
    }

    /// Number of sub-paths.
    #[must_use]
    pub fn sub_path_count(&self) -> usize {
        self.sub_paths().len()
    }

    /// Number of explicit vertices (moves, lines and curve end points).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, PathOp::MoveTo(_) | PathOp::LineTo(_) | PathOp::CurveTo(..)))
            .count()
    }

    /// End point of the last operation, if any.
    #[must_use]
    pub fn current_point(&self) -> Option<Point> {
        let mut current = None;
        let mut sub_start = None;
        for op in &self.ops {
            match *op {
                PathOp::MoveTo(p) => {
                    current = Some(p);
                    sub_start = Some(p);
                }
                PathOp::LineTo(p) | PathOp::CurveTo(_, _, p) => current = Some(p),
                PathOp::Arc {
                    center,
                    rx,
                    ry,
                    start,
                    end,
                } => {
                    if current.is_none() {
                        sub_start = Some(ellipse_point(center, rx, ry, start));
                    }
                    current = Some(ellipse_point(center, rx, ry, end));
                }
                PathOp::Close => current = sub_start,
            }
        }
        current
    }

    /// The same outline traversed backwards.
    ///
    /// Sub-paths come out in reverse order, each starting with a move to its
    /// former end point. Closed sub-paths stay closed.
    #[must_use]
    pub fn reversed(&self) -> Path {
        let mut out = Path::new();
        for group in self.sub_paths().into_iter().rev() {
            let mut segments: Vec<(Point, PathOp)> = Vec::new();
            let mut current: Option<Point> = None;
            let mut closed = false;
            for op in group {
                match *op {
                    PathOp::MoveTo(p) => current = Some(p),
                    PathOp::LineTo(p) => {
                        if let Some(from) = current {
                            segments.push((from, PathOp::LineTo(from)));
                        }
                        current = Some(p);
                    }
                    PathOp::CurveTo(c1, c2, p) => {
                        if let Some(from) = current {
                            segments.push((from, PathOp::CurveTo(c2, c1, from)));
                        }
                        current = Some(p);
                    }
                    PathOp::Arc {
                        center,
                        rx,
                        ry,
                        start,
                        end,
                    } => {
                        let arc_start = ellipse_point(center, rx, ry, start);
                        if let Some(from) = current {
                            segments.push((from, PathOp::LineTo(from)));
                        }
                        segments.push((
                            arc_start,
                            PathOp::Arc {
                                center,
                                rx,
                                ry,
                                start: end,
                                end: start,
                            },
                        ));
                        current = Some(ellipse_point(center, rx, ry, end));
                    }
                    PathOp::Close => closed = true,
                }
            }
            let Some(last) = current else { continue };
            out.ops.push(PathOp::MoveTo(last));
            for (_, op) in segments.into_iter().rev() {
                out.ops.push(op);
            }
            if closed {
                out.ops.push(PathOp::Close);
            }
        }
        out
    }

    /// Approximate every sub-path with straight segments.
    ///
    /// `tolerance` is the maximum distance, in device units, between the true
    /// curve and its approximation.
    #[must_use]
    pub fn flatten(&self, tolerance: f64) -> Vec<Polyline> {
        let tolerance = if tolerance.is_finite() && tolerance > 0.0 {
            tolerance
        } else {
            0.25
        };
        let mut lines = Vec::new();
        let mut line = Polyline::default();

        for op in &self.ops {
            match *op {
                PathOp::MoveTo(p) => {
                    if line.points.len() > 1 || (line.closed && !line.points.is_empty()) {
                        lines.push(std::mem::take(&mut line));
                    }
                    line = Polyline {
                        points: vec![p],
                        closed: false,
                    };
                }
                PathOp::LineTo(p) => line.points.push(p),
                PathOp::CurveTo(c1, c2, p) => {
                    let Some(&p0) = line.points.last() else {
                        line.points.push(p);
                        continue;
                    };
                    let rough = p0.distance(c1) + c1.distance(c2) + c2.distance(p);
                    let steps = ((rough / tolerance).sqrt().ceil() as usize).clamp(1, 256);
                    for i in 1..=steps {
                        let t = i as f64 / steps as f64;
                        line.points.push(bezier_point(p0, c1, c2, p, t));
                    }
                }
                PathOp::Arc {
                    center,
                    rx,
                    ry,
                    start,
                    end,
                } => {
                    let radius = rx.abs().max(ry.abs());
                    let sweep = end - start;
                    let step = if radius > tolerance {
                        2.0 * (1.0 - tolerance / radius).acos()
                    } else {
                        PI / 2.0
                    };
                    let steps = ((sweep.abs() / step).ceil() as usize).clamp(1, 1024);
                    for i in 0..=steps {
                        let theta = start + sweep * i as f64 / steps as f64;
                        line.points.push(ellipse_point(center, rx, ry, theta));
                    }
                }
                PathOp::Close => {
                    line.closed = true;
                    let restart = line.points.first().copied();
                    lines.push(std::mem::take(&mut line));
                    if let Some(p) = restart {
                        line.points.push(p);
                    }
                }
            }
        }
        if line.points.len() > 1 {
            lines.push(line);
        }
        lines
    }

    /// Bounding box of the flattened path.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self.flatten(0.25).into_iter().flat_map(|l| l.points);
        let first = points.next()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in points {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }
}

fn bezier_point(p0: Point, c1: Point, c2: Point, p1: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * c1.x + c * c2.x + d * p1.x,
        a * p0.y + b * c1.y + c * c2.y + d * p1.y,
    )
}
