//! Output encoders: PNG files from the raster backend and SVG documents.

mod png_encoder;
mod svg;

pub use png_encoder::PngEncoder;
pub use svg::{path_data, SvgElement, SvgRenderer};
