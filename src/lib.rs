//! # gog-render
//!
//! Coordinate mapping and plot rendering core for charts.
//!
//! A render pass turns series data into device-space drawing calls:
//!
//! 1. plots report the value ranges their axes must cover and each
//!    [`Axis`](axis::Axis) auto-bounds itself;
//! 2. a [`ChartMap`](chart_map::ChartMap) is built for the pass from the axes
//!    and the plot area (X-only, XY or polar/radar);
//! 3. every plot converts its elements through the map and emits
//!    [`Path`](path::Path)s, shapes and markers to a
//!    [`Renderer`](render::Renderer).
//!
//! ## Features
//!
//! - **Axis maps**: linear and logarithmic, inverted, discrete; `None`
//!   instead of out-of-range sentinels
//! - **Chart maps**: Cartesian and polar transforms, spline and step paths
//!   with gap semantics, close paths for area fills
//! - **Plots**: bar/column (normal, stacked, percentage), pie and ring,
//!   radar and polar, histogram and double histogram
//! - **Backends**: call recording, SVG documents, anti-aliased raster with
//!   PNG output
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gog_render::prelude::*;
//!
//! let registry = PlotFamilyRegistry::with_builtins();
//! let mut chart = Chart::new(AxisSet::XY);
//! chart.add_plot(
//!     &registry,
//!     BarColPlot::new()
//!         .kind(BarColType::Stacked)
//!         .series(Series::new(vec![3.0, 5.0]))
//!         .series(Series::new(vec![-2.0, -1.0])),
//! )?;
//! chart.update_bounds();
//!
//! let mut renderer = RasterRenderer::new(400, 300)?;
//! chart.render(&mut renderer, &Rect::new(20.0, 20.0, 360.0, 260.0));
//! renderer.write_png("bars.png")?;
//! ```
//!
//! ## Academic References
//!
//! - Wilkinson, L. (2005). *The Grammar of Graphics*. Springer.
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color type.
pub mod color;

/// Scalar to color maps and their registry.
pub mod color_map;

/// Geometric primitives (points, rectangles).
pub mod geometry;

/// Renderer-agnostic paths.
pub mod path;

/// Drawing styles and markers.
pub mod style;

/// Render-wide settings.
pub mod config;

// ============================================================================
// Mapping Modules
// ============================================================================

/// Axes, bound descriptors and one-dimensional axis maps.
pub mod axis;

/// Data to device transforms for whole charts.
pub mod chart_map;

// ============================================================================
// Plot Modules
// ============================================================================

/// Series data.
pub mod series;

/// Error bars.
pub mod error_bar;

/// Connector, drop and high-low lines.
pub mod series_lines;

/// Plot renderers and the plot family registry.
pub mod plots;

/// Charts tying axes and plots together.
pub mod chart;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Pixel buffer for the raster backend.
pub mod framebuffer;

/// Renderer abstraction and backends.
pub mod render;

/// Output encoders (PNG, SVG).
pub mod output;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for gog-render operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust,ignore
/// use gog_render::prelude::*;
/// ```
pub mod prelude {
    pub use crate::axis::{Axis, AxisKind, AxisMap, PlotBounds, ScaleKind};
    pub use crate::chart::Chart;
    pub use crate::chart_map::{AxisSet, ChartMap, Interpolation, SeriesFillType};
    pub use crate::color::Rgba;
    pub use crate::color_map::{ColorMap, ColorMapRegistry};
    pub use crate::config::RenderConfig;
    pub use crate::error::{Error, Result};
    pub use crate::error_bar::{ErrorBar, ErrorBarDirection, ErrorBarDisplay, ErrorBarKind};
    pub use crate::geometry::{Point, Rect};
    pub use crate::output::{PngEncoder, SvgRenderer};
    pub use crate::path::Path;
    pub use crate::plots::{
        BarColPlot, BarColType, HistogramPlot, PiePlot, Plot, PlotFamilyRegistry, RadarPlot, ShowNegatives,
    };
    pub use crate::render::{RasterRenderer, RecordingRenderer, Renderer, TextAnchor};
    pub use crate::series::Series;
    pub use crate::series_lines::{SeriesLines, SeriesLinesKind};
    pub use crate::style::{Marker, MarkerShape, Style};
    pub use batuta_common::display::WithDimensions;
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
