//! Renderer that records calls instead of drawing.

use super::{series_area, Renderer, TextAnchor};
use crate::path::Path;
use crate::style::Style;

/// One recorded renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// `push_style`.
    PushStyle(Style),
    /// `pop_style`.
    PopStyle,
    /// `push_clip`.
    PushClip(Path),
    /// `pop_clip`.
    PopClip,
    /// `draw_path`.
    DrawPath(Path),
    /// `draw_polygon`.
    DrawPolygon {
        /// Polygon outline.
        path: Path,
        /// Pixel-aligned edges requested.
        sharp: bool,
    },
    /// `fill_shape`.
    FillShape(Path),
    /// `stroke_shape`.
    StrokeShape(Path),
    /// `draw_shape`.
    DrawShape(Path),
    /// `fill_series`, with the data and close paths already joined.
    FillSeries {
        /// Closed area.
        area: Path,
    },
    /// `draw_marker`.
    Marker {
        /// Center x.
        x: f64,
        /// Center y.
        y: f64,
    },
    /// `draw_text`.
    Text {
        /// Anchor x.
        x: f64,
        /// Anchor y.
        y: f64,
        /// Label.
        text: String,
        /// Alignment.
        anchor: TextAnchor,
    },
}

impl DrawCommand {
    /// Geometry carried by the command, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::PushClip(p)
            | Self::DrawPath(p)
            | Self::FillShape(p)
            | Self::StrokeShape(p)
            | Self::DrawShape(p)
            | Self::DrawPolygon { path: p, .. }
            | Self::FillSeries { area: p } => Some(p),
            _ => None,
        }
    }

    /// Whether the command puts pixels on the surface.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        !matches!(
            self,
            Self::PushStyle(_) | Self::PopStyle | Self::PushClip(_) | Self::PopClip
        )
    }
}

/// Renderer keeping every call, for tests and inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
    styles: Vec<Style>,
}

impl RecordingRenderer {
    /// Empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls in order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop the recording.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.styles.clear();
    }

    /// Style stack depth; zero once every push was popped.
    #[must_use]
    pub fn style_depth(&self) -> usize {
        self.styles.len()
    }

    /// Number of commands that draw something.
    #[must_use]
    pub fn drawing_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_drawing()).count()
    }

    /// Paths passed to `draw_polygon`, in order.
    #[must_use]
    pub fn polygons(&self) -> Vec<&Path> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::DrawPolygon { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    /// Paths passed to `draw_shape` or `fill_shape`, in order.
    #[must_use]
    pub fn shapes(&self) -> Vec<&Path> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::DrawShape(p) | DrawCommand::FillShape(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Paths passed to `draw_path`, in order.
    #[must_use]
    pub fn strokes(&self) -> Vec<&Path> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::DrawPath(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Marker centers, in order.
    #[must_use]
    pub fn markers(&self) -> Vec<(f64, f64)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Marker { x, y } => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }

    /// Text labels, in order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn push_style(&mut self, style: &Style) {
        self.styles.push(style.clone());
        self.commands.push(DrawCommand::PushStyle(style.clone()));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
        self.commands.push(DrawCommand::PopStyle);
    }

    fn push_clip(&mut self, clip: &Path) {
        self.commands.push(DrawCommand::PushClip(clip.clone()));
    }

    fn pop_clip(&mut self) {
        self.commands.push(DrawCommand::PopClip);
    }

    fn draw_path(&mut self, path: &Path) {
        self.commands.push(DrawCommand::DrawPath(path.clone()));
    }

    fn fill_shape(&mut self, path: &Path) {
        self.commands.push(DrawCommand::FillShape(path.clone()));
    }

    fn stroke_shape(&mut self, path: &Path) {
        self.commands.push(DrawCommand::StrokeShape(path.clone()));
    }

    fn draw_marker(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::Marker { x, y });
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, anchor: TextAnchor) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            anchor,
        });
    }

    fn draw_shape(&mut self, path: &Path) {
        self.commands.push(DrawCommand::DrawShape(path.clone()));
    }

    fn draw_polygon(&mut self, path: &Path, sharp: bool) {
        self.commands.push(DrawCommand::DrawPolygon {
            path: path.clone(),
            sharp,
        });
    }

    fn fill_series(&mut self, path: &Path, close: Option<&Path>) {
        self.commands.push(DrawCommand::FillSeries {
            area: series_area(path, close),
        });
    }
}
