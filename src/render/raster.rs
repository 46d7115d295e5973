//! Raster backend.
//!
//! Drawing goes to a transparent layer; the background is composited under
//! it when the image is taken out, so the background can change between
//! passes without redrawing.

use super::primitives::{fill_polygons, stroke_polylines, FillRule};
use super::{marker_path, Renderer, TextAnchor};
use crate::color::Rgba;
use crate::config::RenderConfig;
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Point, Rect};
use crate::output::PngEncoder;
use crate::path::{Path, Polyline};
use crate::style::{MarkerShape, Style};
use batuta_common::display::WithDimensions;
use std::path::Path as FsPath;
use tracing::{trace, warn};

/// Renderer rasterizing into a [`Framebuffer`].
#[derive(Debug, Clone)]
pub struct RasterRenderer {
    layer: Framebuffer,
    background: Option<Rgba>,
    styles: Vec<Style>,
    clips: Vec<Rect>,
    tolerance: f64,
}

impl RasterRenderer {
    /// Renderer with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_config(width, height, &RenderConfig::default())
    }

    /// Renderer taking its background and curve tolerance from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    pub fn with_config(width: u32, height: u32, config: &RenderConfig) -> Result<Self> {
        Ok(Self {
            layer: Framebuffer::new(width, height)?,
            background: config.background,
            styles: Vec::new(),
            clips: Vec::new(),
            tolerance: config.flatten_tolerance,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.layer.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.layer.height()
    }

    /// Change the background composited under the drawing.
    pub fn set_background(&mut self, background: Option<Rgba>) {
        self.background = background;
    }

    /// Erase everything drawn so far.
    pub fn clear(&mut self) {
        self.layer.clear(Rgba::TRANSPARENT);
    }

    /// The drawing alone, without background.
    #[must_use]
    pub fn layer(&self) -> &Framebuffer {
        &self.layer
    }

    /// Final image: the drawing over the background.
    ///
    /// # Errors
    ///
    /// Returns an error if compositing fails.
    pub fn to_framebuffer(&self) -> Result<Framebuffer> {
        let mut image = Framebuffer::new(self.layer.width(), self.layer.height())?;
        if let Some(bg) = self.background {
            image.clear(bg);
        }
        image.composite_over(&self.layer)?;
        Ok(image)
    }

    /// Final image encoded as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if compositing or encoding fails.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        PngEncoder::to_bytes(&self.to_framebuffer()?)
    }

    /// Write the final image to a PNG file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_png(&self, path: impl AsRef<FsPath>) -> Result<()> {
        PngEncoder::write_to_file(&self.to_framebuffer()?, path)
    }

    fn style(&self) -> Style {
        self.styles.last().cloned().unwrap_or_default()
    }

    fn polygons(&self, path: &Path) -> Vec<Vec<Point>> {
        path.flatten(self.tolerance)
            .into_iter()
            .filter(|l| l.points.len() > 2)
            .map(|l| l.points)
            .collect()
    }

    fn fill_with(&mut self, polygons: &[Vec<Point>], color: Option<Rgba>) {
        if let Some(color) = color {
            fill_polygons(&mut self.layer, polygons, color, FillRule::NonZero);
        }
    }

    fn stroke_with(&mut self, lines: &[Polyline], style: &Style) {
        if let Some(outline) = style.outline {
            let width = self.line_size(outline.width);
            stroke_polylines(&mut self.layer, lines, width, outline.color);
        }
    }
}

/// Snap vertices to pixel corners.
fn snapped(line: &Polyline) -> Polyline {
    Polyline {
        points: line
            .points
            .iter()
            .map(|p| Point::new(p.x.round(), p.y.round()))
            .collect(),
        closed: line.closed,
    }
}

impl Renderer for RasterRenderer {
    fn push_style(&mut self, style: &Style) {
        self.styles.push(style.clone());
    }

    fn pop_style(&mut self) {
        if self.styles.pop().is_none() {
            warn!("pop_style without matching push_style");
        }
    }

    fn push_clip(&mut self, clip: &Path) {
        let bounds = clip.bounds().unwrap_or_else(|| Rect::new(0.0, 0.0, 0.0, 0.0));
        let rect = match self.clips.last() {
            Some(outer) => outer
                .intersect(&bounds)
                .unwrap_or_else(|| Rect::new(bounds.x, bounds.y, 0.0, 0.0)),
            None => bounds,
        };
        self.layer.set_clip(Some(&rect));
        self.clips.push(rect);
    }

    fn pop_clip(&mut self) {
        if self.clips.pop().is_none() {
            warn!("pop_clip without matching push_clip");
        }
        self.layer.set_clip(self.clips.last());
    }

    fn draw_path(&mut self, path: &Path) {
        let style = self.style();
        let lines = path.flatten(self.tolerance);
        self.stroke_with(&lines, &style);
    }

    fn fill_shape(&mut self, path: &Path) {
        let style = self.style();
        let polygons = self.polygons(path);
        self.fill_with(&polygons, style.fill);
    }

    fn stroke_shape(&mut self, path: &Path) {
        let style = self.style();
        let lines = path.flatten(self.tolerance);
        self.stroke_with(&lines, &style);
    }

    fn draw_polygon(&mut self, path: &Path, sharp: bool) {
        if !sharp {
            self.draw_shape(path);
            return;
        }
        let style = self.style();
        let lines: Vec<Polyline> = path.flatten(self.tolerance).iter().map(snapped).collect();
        let polygons: Vec<Vec<Point>> = lines
            .iter()
            .filter(|l| l.points.len() > 2)
            .map(|l| l.points.clone())
            .collect();
        self.fill_with(&polygons, style.fill);
        self.stroke_with(&lines, &style);
    }

    fn draw_marker(&mut self, x: f64, y: f64) {
        let marker = self.style().marker;
        if !marker.is_visible() {
            return;
        }
        let path = marker_path(marker.shape, x, y, marker.size);
        let lines = path.flatten(self.tolerance);
        if marker.shape == MarkerShape::Cross {
            stroke_polylines(&mut self.layer, &lines, 1.0, marker.outline);
            return;
        }
        let polygons: Vec<Vec<Point>> = lines.iter().map(|l| l.points.clone()).collect();
        fill_polygons(&mut self.layer, &polygons, marker.fill, FillRule::NonZero);
        stroke_polylines(&mut self.layer, &lines, 1.0, marker.outline);
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, anchor: TextAnchor) {
        trace!(x, y, text, ?anchor, "raster backend has no font engine; label skipped");
    }
}

impl WithDimensions for RasterRenderer {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        match Framebuffer::new(width, height) {
            Ok(layer) => {
                self.layer = layer;
                self.clips.clear();
            }
            Err(err) => warn!(%err, "keeping previous raster size"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Marker;

    fn rect_path(x: f64, y: f64, w: f64, h: f64) -> Path {
        let mut path = Path::new();
        path.rectangle(&Rect::new(x, y, w, h));
        path
    }

    #[test]
    fn test_fill_and_background() {
        let mut r = RasterRenderer::new(20, 20).unwrap();
        r.push_style(&Style::filled(Rgba::RED).without_outline());
        r.fill_shape(&rect_path(5.0, 5.0, 10.0, 10.0));
        r.pop_style();

        let image = r.to_framebuffer().unwrap();
        assert_eq!(image.get_pixel(10, 10), Some(Rgba::RED));
        assert_eq!(image.get_pixel(1, 1), Some(Rgba::WHITE));
        assert_eq!(r.layer().get_pixel(1, 1), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_transparent_background() {
        let mut r = RasterRenderer::new(4, 4).unwrap();
        r.set_background(None);
        let image = r.to_framebuffer().unwrap();
        assert_eq!(image.get_pixel(0, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_clip_stack() {
        let mut r = RasterRenderer::new(20, 20).unwrap();
        r.push_style(&Style::filled(Rgba::BLUE).without_outline());
        r.push_clip(&rect_path(0.0, 0.0, 10.0, 10.0));
        r.push_clip(&rect_path(5.0, 5.0, 10.0, 10.0));
        r.fill_shape(&rect_path(0.0, 0.0, 20.0, 20.0));
        r.pop_clip();
        r.pop_clip();
        r.pop_style();

        let layer = r.layer();
        assert_eq!(layer.get_pixel(7, 7), Some(Rgba::BLUE));
        assert_eq!(layer.get_pixel(3, 3), Some(Rgba::TRANSPARENT));
        assert_eq!(layer.get_pixel(12, 12), Some(Rgba::TRANSPARENT));
        assert_eq!(layer.clip_bounds(), (0, 0, 20, 20));
    }

    #[test]
    fn test_default_style_strokes() {
        let mut r = RasterRenderer::new(20, 20).unwrap();
        let mut line = Path::new();
        line.move_to(0.5, 10.5).line_to(19.5, 10.5);
        r.draw_path(&line);
        assert_eq!(r.layer().get_pixel(10, 10).unwrap().a, 255);
    }

    #[test]
    fn test_marker() {
        let mut r = RasterRenderer::new(20, 20).unwrap();
        let style = Style::default().with_marker(Marker {
            shape: MarkerShape::Square,
            size: 6.0,
            fill: Rgba::GREEN,
            outline: Rgba::GREEN,
        });
        r.push_style(&style);
        r.draw_marker(10.0, 10.0);
        r.pop_style();
        assert_eq!(r.layer().get_pixel(10, 10), Some(Rgba::GREEN));
        assert_eq!(r.layer().get_pixel(2, 2), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_sharp_polygon_snaps() {
        let mut r = RasterRenderer::new(20, 20).unwrap();
        r.push_style(&Style::filled(Rgba::BLACK).without_outline());
        r.draw_polygon(&rect_path(2.4, 2.4, 5.2, 5.2), true);
        r.pop_style();
        assert_eq!(r.layer().get_pixel(2, 2), Some(Rgba::BLACK));
        assert_eq!(r.layer().get_pixel(7, 7), Some(Rgba::BLACK));
        assert_eq!(r.layer().get_pixel(8, 8), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_png_output() {
        let r = RasterRenderer::new(8, 8).unwrap();
        let bytes = r.to_png().unwrap();
        assert_eq!(&bytes[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("chart.png");
        r.write_png(&file).unwrap();
        assert!(file.exists());
    }

    #[test]
    fn test_set_dimensions() {
        let mut r = RasterRenderer::new(8, 8).unwrap();
        r.set_dimensions(32, 16);
        assert_eq!((r.width(), r.height()), (32, 16));
        r.set_dimensions(0, 16);
        assert_eq!((r.width(), r.height()), (32, 16));
    }
}
