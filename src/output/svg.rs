//! SVG backend.
//!
//! Every renderer call becomes one SVG element. Clips become `<clipPath>`
//! definitions chained through their own `clip-path` attribute, so nested
//! clips intersect the way the raster backend's do.

use crate::color::Rgba;
use crate::config::RenderConfig;
use crate::error::Result;
use crate::path::{Path, PathOp};
use crate::render::{marker_path, Renderer, TextAnchor};
use crate::style::{MarkerShape, Style};
use batuta_common::display::WithDimensions;
use std::f64::consts::PI;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path as FsPath;
use tracing::warn;

/// One emitted SVG element.
///
/// Field names match the SVG attributes they produce.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum SvgElement {
    /// `<path>`
    Path {
        d: String,
        fill: Option<Rgba>,
        stroke: Option<Rgba>,
        stroke_width: f64,
        crisp: bool,
        clip: Option<usize>,
    },
    /// `<text>`
    Text {
        x: f64,
        y: f64,
        text: String,
        font_size: f64,
        fill: Rgba,
        anchor: TextAnchor,
        clip: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct ClipDef {
    d: String,
    parent: Option<usize>,
}

/// Renderer producing an SVG document.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    width: u32,
    height: u32,
    background: Option<Rgba>,
    font_size: f64,
    clip_defs: Vec<ClipDef>,
    elements: Vec<SvgElement>,
    styles: Vec<Style>,
    clips: Vec<usize>,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl SvgRenderer {
    /// Create an empty document with given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(width, height, &RenderConfig::default())
    }

    /// Create an empty document taking background and font size from `config`.
    #[must_use]
    pub fn with_config(width: u32, height: u32, config: &RenderConfig) -> Self {
        Self {
            width,
            height,
            background: config.background,
            font_size: config.label_font_size,
            clip_defs: Vec::new(),
            elements: Vec::new(),
            styles: Vec::new(),
            clips: Vec::new(),
        }
    }

    /// Set background color (None for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Elements emitted so far.
    #[must_use]
    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    fn style(&self) -> Style {
        self.styles.last().cloned().unwrap_or_default()
    }

    fn push_path(&mut self, path: &Path, fill: Option<Rgba>, stroke: Option<(Rgba, f64)>, crisp: bool) {
        let fill = fill.filter(|c| !c.is_transparent());
        let stroke = stroke.filter(|(c, _)| !c.is_transparent());
        if path.is_empty() || (fill.is_none() && stroke.is_none()) {
            return;
        }
        self.elements.push(SvgElement::Path {
            d: path_data(path),
            fill,
            stroke: stroke.map(|(c, _)| c),
            stroke_width: stroke.map_or(0.0, |(_, w)| w),
            crisp,
            clip: self.clips.last().copied(),
        });
    }

    fn outline(&self, style: &Style) -> Option<(Rgba, f64)> {
        style.outline.map(|o| (o.color, self.line_size(o.width)))
    }

    /// Render to SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096);

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        );

        if !self.clip_defs.is_empty() {
            svg.push_str("  <defs>\n");
            for (i, def) in self.clip_defs.iter().enumerate() {
                let _ = writeln!(
                    svg,
                    r#"    <clipPath id="clip{i}"{}><path d="{}"/></clipPath>"#,
                    clip_attr(def.parent),
                    def.d
                );
            }
            svg.push_str("  </defs>\n");
        }

        if let Some(bg) = self.background {
            let _ = writeln!(
                svg,
                r#"  <rect width="100%" height="100%" fill="{}"/>"#,
                bg.to_css()
            );
        }

        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<FsPath>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

impl Renderer for SvgRenderer {
    fn push_style(&mut self, style: &Style) {
        self.styles.push(style.clone());
    }

    fn pop_style(&mut self) {
        if self.styles.pop().is_none() {
            warn!("pop_style without matching push_style");
        }
    }

    fn push_clip(&mut self, clip: &Path) {
        self.clip_defs.push(ClipDef {
            d: path_data(clip),
            parent: self.clips.last().copied(),
        });
        self.clips.push(self.clip_defs.len() - 1);
    }

    fn pop_clip(&mut self) {
        if self.clips.pop().is_none() {
            warn!("pop_clip without matching push_clip");
        }
    }

    fn draw_path(&mut self, path: &Path) {
        let style = self.style();
        let stroke = self.outline(&style);
        self.push_path(path, None, stroke, false);
    }

    fn fill_shape(&mut self, path: &Path) {
        let style = self.style();
        self.push_path(path, style.fill, None, false);
    }

    fn stroke_shape(&mut self, path: &Path) {
        let style = self.style();
        let stroke = self.outline(&style);
        self.push_path(path, None, stroke, false);
    }

    fn draw_shape(&mut self, path: &Path) {
        let style = self.style();
        let stroke = self.outline(&style);
        self.push_path(path, style.fill, stroke, false);
    }

    fn draw_polygon(&mut self, path: &Path, sharp: bool) {
        let style = self.style();
        let stroke = self.outline(&style);
        self.push_path(path, style.fill, stroke, sharp);
    }

    fn draw_marker(&mut self, x: f64, y: f64) {
        let marker = self.style().marker;
        if !marker.is_visible() {
            return;
        }
        let path = marker_path(marker.shape, x, y, marker.size);
        let fill = (marker.shape != MarkerShape::Cross).then_some(marker.fill);
        self.push_path(&path, fill, Some((marker.outline, 1.0)), false);
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, anchor: TextAnchor) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        let fill = self.style().text_color;
        self.elements.push(SvgElement::Text {
            x,
            y,
            text: text.to_string(),
            font_size: self.font_size,
            fill,
            anchor,
            clip: self.clips.last().copied(),
        });
    }
}

impl WithDimensions for SvgRenderer {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

/// Coordinates rounded to 1/1000 of a unit, without trailing zeros.
fn num(v: f64) -> String {
    let r = (v * 1000.0).round() / 1000.0;
    if r == 0.0 {
        "0".to_string()
    } else {
        format!("{r}")
    }
}

/// SVG path data for `path`.
///
/// Arcs are split into pieces of at most half a turn so that the
/// large-arc flag is never needed, and full ellipses stay drawable.
pub fn path_data(path: &Path) -> String {
    let mut d = String::new();
    let mut has_current = false;
    for op in path.ops() {
        match *op {
            PathOp::MoveTo(p) => {
                let _ = write!(d, "M{} {} ", num(p.x), num(p.y));
                has_current = true;
            }
            PathOp::LineTo(p) => {
                let _ = write!(d, "L{} {} ", num(p.x), num(p.y));
                has_current = true;
            }
            PathOp::CurveTo(c1, c2, p) => {
                let _ = write!(
                    d,
                    "C{} {} {} {} {} {} ",
                    num(c1.x),
                    num(c1.y),
                    num(c2.x),
                    num(c2.y),
                    num(p.x),
                    num(p.y)
                );
                has_current = true;
            }
            PathOp::Arc {
                center,
                rx,
                ry,
                start,
                end,
            } => {
                let at = |theta: f64| (center.x + rx * theta.cos(), center.y + ry * theta.sin());
                let (sx, sy) = at(start);
                let cmd = if has_current { 'L' } else { 'M' };
                let _ = write!(d, "{cmd}{} {} ", num(sx), num(sy));
                has_current = true;

                let sweep = end - start;
                if sweep == 0.0 || rx == 0.0 || ry == 0.0 {
                    continue;
                }
                let pieces = (sweep.abs() / PI).ceil().max(1.0) as usize;
                let flag = u8::from(sweep > 0.0);
                for i in 1..=pieces {
                    let (x, y) = at(start + sweep * i as f64 / pieces as f64);
                    let _ = write!(
                        d,
                        "A{} {} 0 0 {flag} {} {} ",
                        num(rx.abs()),
                        num(ry.abs()),
                        num(x),
                        num(y)
                    );
                }
            }
            PathOp::Close => {
                d.push_str("Z ");
            }
        }
    }
    d.trim_end().to_string()
}

fn clip_attr(clip: Option<usize>) -> String {
    clip.map(|i| format!(r#" clip-path="url(#clip{i})""#))
        .unwrap_or_default()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Path {
            d,
            fill,
            stroke,
            stroke_width,
            crisp,
            clip,
        } => {
            let fill_attr = fill.map_or_else(|| "none".to_string(), Rgba::to_css);
            let stroke_attr = stroke
                .map(|s| {
                    format!(
                        r#" stroke="{}" stroke-width="{}""#,
                        s.to_css(),
                        num(*stroke_width)
                    )
                })
                .unwrap_or_default();
            let crisp_attr = if *crisp {
                r#" shape-rendering="crispEdges""#
            } else {
                ""
            };
            format!(
                r#"<path d="{d}" fill="{fill_attr}"{stroke_attr}{crisp_attr}{}/>"#,
                clip_attr(*clip)
            )
        }
        SvgElement::Text {
            x,
            y,
            text,
            font_size,
            fill,
            anchor,
            clip,
        } => {
            let anchor_str = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            format!(
                r#"<text x="{}" y="{}" font-size="{}" fill="{}" text-anchor="{anchor_str}" font-family="sans-serif"{}>{}</text>"#,
                num(*x),
                num(*y),
                num(*font_size),
                fill.to_css(),
                clip_attr(*clip),
                escape(text)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::style::Marker;

    fn square() -> Path {
        let mut path = Path::new();
        path.rectangle(&Rect::new(10.0, 20.0, 30.0, 40.0));
        path
    }

    #[test]
    fn test_empty_document() {
        let svg = SvgRenderer::new(800, 600).render();
        assert!(svg.contains("width=\"800\""));
        assert!(svg.contains("height=\"600\""));
        assert!(svg.contains(r#"fill="rgb(255,255,255)""#));
        assert!(svg.ends_with("</svg>\n"));
        assert!(!svg.contains("<defs>"));
    }

    #[test]
    fn test_path_data() {
        assert_eq!(path_data(&square()), "M10 20 L40 20 L40 60 L10 60 Z");

        let mut circle = Path::new();
        circle.arc(0.0, 0.0, 5.0, 5.0, 0.0, 2.0 * PI);
        let d = path_data(&circle);
        assert!(d.starts_with("M5 0 "));
        assert_eq!(d.matches('A').count(), 2);
        assert!(d.ends_with("A5 5 0 0 1 5 0"));
    }

    #[test]
    fn test_arc_joins_current_point() {
        let mut wedge = Path::new();
        wedge.pie_wedge(0.0, 0.0, 10.0, 10.0, 0.0, PI / 2.0);
        let d = path_data(&wedge);
        assert!(d.starts_with("M0 0 L10 0 A10 10 0 0 1 0 10"));
    }

    #[test]
    fn test_shape_uses_style() {
        let mut r = SvgRenderer::new(100, 100);
        r.push_style(&Style::filled(Rgba::RED).with_outline(Rgba::BLUE, 2.0));
        r.draw_shape(&square());
        r.pop_style();

        let svg = r.render();
        assert!(svg.contains(r#"fill="rgb(255,0,0)" stroke="rgb(0,0,255)" stroke-width="2""#));
    }

    #[test]
    fn test_invisible_elements_skipped() {
        let mut r = SvgRenderer::new(100, 100);
        r.push_style(&Style::default().without_outline());
        r.draw_path(&square());
        r.fill_shape(&square());
        r.pop_style();
        assert!(r.elements().is_empty());
    }

    #[test]
    fn test_nested_clips() {
        let mut r = SvgRenderer::new(100, 100);
        r.push_clip(&square());
        r.push_clip(&square());
        r.draw_path(&square());
        r.pop_clip();
        r.pop_clip();
        r.draw_path(&square());

        let svg = r.render();
        assert!(svg.contains(r#"<clipPath id="clip0"><path"#));
        assert!(svg.contains(r#"<clipPath id="clip1" clip-path="url(#clip0)">"#));
        assert!(matches!(r.elements()[0], SvgElement::Path { clip: Some(1), .. }));
        assert!(matches!(r.elements()[1], SvgElement::Path { clip: None, .. }));
    }

    #[test]
    fn test_sharp_polygon_and_marker() {
        let mut r = SvgRenderer::new(100, 100);
        let style = Style::filled(Rgba::GREEN).with_marker(Marker::new(MarkerShape::Cross, 4.0));
        r.push_style(&style);
        r.draw_polygon(&square(), true);
        r.draw_marker(50.0, 50.0);
        r.pop_style();

        let svg = r.render();
        assert!(svg.contains(r#"shape-rendering="crispEdges""#));
        let SvgElement::Path { fill, stroke, .. } = &r.elements()[1] else {
            panic!("expected a path");
        };
        assert_eq!(*fill, None);
        assert_eq!(*stroke, Some(Rgba::BLACK));
    }

    #[test]
    fn test_text_escaped() {
        let mut r = SvgRenderer::new(100, 100);
        r.draw_text(5.0, 6.0, "a < b & c", TextAnchor::Middle);
        r.draw_text(f64::NAN, 6.0, "lost", TextAnchor::Start);
        let svg = r.render();
        assert!(svg.contains("a &lt; b &amp; c"));
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(!svg.contains("lost"));
    }

    #[test]
    fn test_write_to_file_and_resize() {
        let mut r = SvgRenderer::new(10, 10).background(None);
        r.set_dimensions(40, 30);
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("chart.svg");
        r.write_to_file(&file).unwrap();
        let content = std::fs::read_to_string(&file).unwrap();
        assert!(content.contains("viewBox=\"0 0 40 30\""));
        assert!(!content.contains("100%"));
    }
}
