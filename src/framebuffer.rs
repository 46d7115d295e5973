//! RGBA pixel buffer behind the raster renderer.
//!
//! Rows are padded to a 64-byte stride so that whole-row operations
//! (clearing, layer compositing) run on aligned chunks. Compositing uses
//! trueno vectors, which dispatch to the best SIMD backend available.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use trueno::{Backend, Vector};

/// Alignment for SIMD operations (64 bytes for AVX-512).
const SIMD_ALIGNMENT: usize = 64;

/// Pixel-aligned clip window `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Clip {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

/// SIMD-aligned framebuffer with an optional clip window.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    /// RGBA pixels in row-major order, `stride` bytes per row.
    pixels: Vec<u8>,
    stride: usize,
    clip: Clip,
}

impl Framebuffer {
    /// Create a transparent framebuffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if width or height is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        let row_bytes = (width as usize) * 4;
        let stride = (row_bytes + SIMD_ALIGNMENT - 1) & !(SIMD_ALIGNMENT - 1);
        let size = stride * (height as usize);

        Ok(Self {
            width,
            height,
            pixels: vec![0; size],
            stride,
            clip: Clip {
                x0: 0,
                y0: 0,
                x1: width,
                y1: height,
            },
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row width in bytes, padding included.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Restrict writes to `rect` (rounded outwards), or lift the restriction.
    pub fn set_clip(&mut self, rect: Option<&Rect>) {
        self.clip = match rect {
            None => Clip {
                x0: 0,
                y0: 0,
                x1: self.width,
                y1: self.height,
            },
            Some(r) => {
                let clamp_x = |v: f64| v.clamp(0.0, f64::from(self.width)) as u32;
                let clamp_y = |v: f64| v.clamp(0.0, f64::from(self.height)) as u32;
                let x0 = clamp_x(r.x.floor());
                let y0 = clamp_y(r.y.floor());
                Clip {
                    x0,
                    y0,
                    x1: clamp_x(r.right().ceil()).max(x0),
                    y1: clamp_y(r.bottom().ceil()).max(y0),
                }
            }
        };
    }

    /// Current clip window as `(x0, y0, x1, y1)` pixel bounds.
    #[must_use]
    pub fn clip_bounds(&self) -> (u32, u32, u32, u32) {
        (self.clip.x0, self.clip.y0, self.clip.x1, self.clip.y1)
    }

    fn in_clip(&self, x: u32, y: u32) -> bool {
        x >= self.clip.x0 && x < self.clip.x1 && y >= self.clip.y0 && y < self.clip.y1
    }

    /// Fill the whole buffer with `color`, ignoring the clip.
    pub fn clear(&mut self, color: Rgba) {
        let [r, g, b, a] = color.to_array();

        // 16 pixels per 64-byte chunk.
        let pattern: [u8; 64] = {
            let mut p = [0u8; 64];
            for px in p.chunks_exact_mut(4) {
                px.copy_from_slice(&[r, g, b, a]);
            }
            p
        };

        let row_bytes = (self.width as usize) * 4;
        for row in self.pixels.chunks_exact_mut(self.stride) {
            let row = &mut row[..row_bytes];
            let mut chunks = row.chunks_exact_mut(64);
            for chunk in &mut chunks {
                chunk.copy_from_slice(&pattern);
            }
            for px in chunks.into_remainder().chunks_exact_mut(4) {
                px.copy_from_slice(&[r, g, b, a]);
            }
        }
    }

    /// Color at `(x, y)`, `None` outside the buffer.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.pixel_index(x, y);
        Some(Rgba::new(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ))
    }

    /// Overwrite the pixel at `(x, y)` if it is inside the clip.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height || !self.in_clip(x, y) {
            return;
        }
        let idx = self.pixel_index(x, y);
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_array());
    }

    /// Composite `color` over the pixel at `(x, y)` ("over" operator).
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        self.blend_coverage(x, y, color, 1.0);
    }

    /// Composite `color` scaled by `coverage` (0 to 1) over `(x, y)`.
    pub fn blend_coverage(&mut self, x: u32, y: u32, color: Rgba, coverage: f32) {
        if x >= self.width || y >= self.height || !self.in_clip(x, y) {
            return;
        }
        let src_a = f32::from(color.a) / 255.0 * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let idx = self.pixel_index(x, y);
        let dst_a = f32::from(self.pixels[idx + 3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        let blend = |src: u8, dst: u8| -> u8 {
            let out = (f32::from(src) * src_a + f32::from(dst) * dst_a * (1.0 - src_a)) / out_a;
            out.round().clamp(0.0, 255.0) as u8
        };
        self.pixels[idx] = blend(color.r, self.pixels[idx]);
        self.pixels[idx + 1] = blend(color.g, self.pixels[idx + 1]);
        self.pixels[idx + 2] = blend(color.b, self.pixels[idx + 2]);
        self.pixels[idx + 3] = (out_a * 255.0).round() as u8;
    }

    /// Composite `layer` over this buffer with per-pixel alpha.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffers have different dimensions.
    pub fn composite_over(&mut self, layer: &Framebuffer) -> Result<()> {
        if self.width != layer.width || self.height != layer.height {
            return Err(Error::InvalidDimensions {
                width: layer.width,
                height: layer.height,
            });
        }

        let row_bytes = (self.width as usize) * 4;
        for y in 0..self.height as usize {
            let start = y * self.stride;
            let src = &layer.pixels[start..start + row_bytes];
            let dst = &self.pixels[start..start + row_bytes];

            // Per-channel weights: src alpha and dst alpha * (1 - src alpha).
            let mut w_src = Vec::with_capacity(row_bytes);
            let mut w_dst = Vec::with_capacity(row_bytes);
            for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact(4)) {
                let sa = f32::from(s[3]) / 255.0;
                let da = f32::from(d[3]) / 255.0 * (1.0 - sa);
                w_src.extend_from_slice(&[sa; 4]);
                w_dst.extend_from_slice(&[da; 4]);
            }
            let weights: Vec<f32> = w_src.iter().zip(&w_dst).map(|(a, b)| a + b).collect();

            let src_vec = Vector::from_vec(src.iter().map(|&b| f32::from(b)).collect());
            let dst_vec = Vector::from_vec(dst.iter().map(|&b| f32::from(b)).collect());
            let (Ok(src_part), Ok(dst_part)) = (
                src_vec.mul(&Vector::from_vec(w_src)),
                dst_vec.mul(&Vector::from_vec(w_dst)),
            ) else {
                continue;
            };
            let Ok(sum) = src_part.add(&dst_part) else {
                continue;
            };

            let row = &mut self.pixels[start..start + row_bytes];
            for ((px, acc), w) in row
                .chunks_exact_mut(4)
                .zip(sum.as_slice().chunks_exact(4))
                .zip(weights.chunks_exact(4))
            {
                let out_a = w[0];
                if out_a <= 0.0 {
                    px.copy_from_slice(&[0, 0, 0, 0]);
                    continue;
                }
                for c in 0..3 {
                    px[c] = (acc[c] / out_a).round().clamp(0.0, 255.0) as u8;
                }
                px[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
        Ok(())
    }

    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * self.stride + (x as usize) * 4
    }

    /// Pixel data without stride padding, as PNG expects.
    #[must_use]
    pub fn to_compact_pixels(&self) -> Vec<u8> {
        let row_bytes = (self.width as usize) * 4;
        if self.stride == row_bytes {
            return self.pixels.clone();
        }
        let mut compact = Vec::with_capacity(row_bytes * (self.height as usize));
        for row in self.pixels.chunks_exact(self.stride) {
            compact.extend_from_slice(&row[..row_bytes]);
        }
        compact
    }

    /// SIMD backend trueno selected for this machine.
    #[must_use]
    pub fn backend() -> Backend {
        Backend::select_best()
    }
}
