//! Renderer abstraction and its backends.
//!
//! Plot views never read anything back from a renderer: they push styles and
//! clips, emit device-space [`Path`]s and markers, and pop what they pushed.
//! Three sinks implement [`Renderer`]:
//!
//! - [`RecordingRenderer`]: keeps every call as a [`DrawCommand`]
//! - [`RasterRenderer`]: scanline rasterizer over a [`Framebuffer`](crate::framebuffer::Framebuffer)
//! - [`SvgRenderer`](crate::output::SvgRenderer): vector output

mod primitives;
mod raster;
mod recording;

pub use primitives::{draw_line_aa, fill_polygons, stroke_polylines, FillRule};
pub use raster::RasterRenderer;
pub use recording::{DrawCommand, RecordingRenderer};

use crate::path::Path;
use crate::style::{MarkerShape, Style};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Horizontal alignment of text relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    /// Text starts at the anchor.
    #[default]
    Start,
    /// Text is centered on the anchor.
    Middle,
    /// Text ends at the anchor.
    End,
}

/// Write-only drawing sink.
pub trait Renderer {
    /// Make `style` current until the matching [`Renderer::pop_style`].
    fn push_style(&mut self, style: &Style);

    /// Restore the previous style.
    fn pop_style(&mut self);

    /// Restrict drawing to the area enclosed by `clip`.
    fn push_clip(&mut self, clip: &Path);

    /// Remove the innermost clip.
    fn pop_clip(&mut self);

    /// Stroke an open path with the current outline.
    fn draw_path(&mut self, path: &Path);

    /// Fill the interior of `path` with the current fill.
    fn fill_shape(&mut self, path: &Path);

    /// Stroke the outline of a closed shape.
    fn stroke_shape(&mut self, path: &Path);

    /// Draw the current marker centered on `(x, y)`.
    fn draw_marker(&mut self, x: f64, y: f64);

    /// Draw a text label.
    fn draw_text(&mut self, x: f64, y: f64, text: &str, anchor: TextAnchor);

    /// Fill then stroke a closed shape.
    fn draw_shape(&mut self, path: &Path) {
        self.fill_shape(path);
        self.stroke_shape(path);
    }

    /// Fill and outline a polygon. `sharp` asks for pixel-aligned edges.
    fn draw_polygon(&mut self, path: &Path, sharp: bool) {
        let _ = sharp;
        self.draw_shape(path);
    }

    /// Fill a series area: the data path continued by `close`, or the data
    /// path closed on itself when there is no close path.
    fn fill_series(&mut self, path: &Path, close: Option<&Path>) {
        self.fill_shape(&series_area(path, close));
    }

    /// Device width of a line of `width` units; hairlines get one unit.
    fn line_size(&self, width: f64) -> f64 {
        if width.is_finite() && width > 0.0 {
            width
        } else {
            1.0
        }
    }
}

/// Closed area of a series fill: `path` continued by `close`, or `path`
/// closed on itself.
#[must_use]
pub fn series_area(path: &Path, close: Option<&Path>) -> Path {
    let mut area = path.clone();
    match close {
        Some(close) => {
            area.append_continuation(close);
        }
        None => {
            area.close();
        }
    }
    area
}

/// Outline of a marker centered on `(x, y)`.
///
/// Crosses are open strokes; every other shape is a closed sub-path.
#[must_use]
pub fn marker_path(shape: MarkerShape, x: f64, y: f64, size: f64) -> Path {
    let h = size / 2.0;
    let mut path = Path::new();
    match shape {
        MarkerShape::None => {}
        MarkerShape::Circle => {
            path.arc(x, y, h, h, 0.0, 2.0 * PI).close();
        }
        MarkerShape::Square => {
            path.move_to(x - h, y - h)
                .line_to(x + h, y - h)
                .line_to(x + h, y + h)
                .line_to(x - h, y + h)
                .close();
        }
        MarkerShape::Diamond => {
            path.move_to(x, y - h)
                .line_to(x + h, y)
                .line_to(x, y + h)
                .line_to(x - h, y)
                .close();
        }
        MarkerShape::Triangle => {
            path.move_to(x, y - h)
                .line_to(x + h, y + h)
                .line_to(x - h, y + h)
                .close();
        }
        MarkerShape::Cross => {
            path.move_to(x - h, y - h)
                .line_to(x + h, y + h)
                .move_to(x - h, y + h)
                .line_to(x + h, y - h);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::path::PathOp;

    #[test]
    fn test_fill_series_continues_close_path() {
        let mut data = Path::new();
        data.move_to(0.0, 0.0).line_to(10.0, 0.0);
        let mut close = Path::new();
        close.move_to(10.0, 0.0).line_to(10.0, 5.0).line_to(0.0, 5.0).close();

        let mut rec = RecordingRenderer::new();
        rec.fill_series(&data, Some(&close));
        let DrawCommand::FillSeries { area } = &rec.commands()[0] else {
            panic!("expected a series fill");
        };
        assert_eq!(area.sub_path_count(), 1);
        assert_eq!(area.ops()[2], PathOp::LineTo(Point::new(10.0, 0.0)));
        assert_eq!(area.ops().last(), Some(&PathOp::Close));
    }

    #[test]
    fn test_line_size() {
        let rec = RecordingRenderer::new();
        assert_eq!(rec.line_size(0.0), 1.0);
        assert_eq!(rec.line_size(2.5), 2.5);
        assert_eq!(rec.line_size(f64::NAN), 1.0);
    }

    #[test]
    fn test_marker_paths() {
        assert!(marker_path(MarkerShape::None, 0.0, 0.0, 4.0).is_empty());
        let square = marker_path(MarkerShape::Square, 10.0, 10.0, 4.0);
        let b = square.bounds().unwrap();
        assert_eq!((b.x, b.y, b.width, b.height), (8.0, 8.0, 4.0, 4.0));
        assert_eq!(marker_path(MarkerShape::Cross, 0.0, 0.0, 2.0).sub_path_count(), 2);
    }
}
