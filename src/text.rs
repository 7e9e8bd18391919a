//! Text rasterization into particle coordinates.
//!
//! A string is drawn onto an offscreen grayscale canvas with the built-in
//! 8x8 bitmap font, scaled to the configured font height and centered. The
//! canvas is then scanned in raster order and every lit pixel becomes one
//! particle at `z = 0`, centered on the canvas and scaled down.
//!
//! The particle budget rarely matches the number of lit pixels:
//!
//! - Fewer pixels than particles: the remaining slots get coordinates inside
//!   a fixed cube around the origin, which shows up as a faint halo around
//!   the text.
//! - More pixels than particles: by default only the first pixels in scan
//!   order are used ([`Truncation::ScanOrder`]), so the top of the glyphs
//!   is solid and the bottom thins out. [`Truncation::Uniform`] instead
//!   takes an even stride through all lit pixels.
//!
//! When no canvas can be created the whole buffer is filled from the cube;
//! rasterization never fails.

use crate::config::{TextConfig, Truncation};
use crate::random::RandomField;
use font8x8::legacy::BASIC_LEGACY;
use image::{GrayImage, Luma};
use tracing::{debug, warn};

/// Glyph cell size of the bitmap font, in font pixels.
const GLYPH_SIZE: u32 = 8;
/// Largest canvas side accepted. Larger requests are treated as unavailable.
const MAX_CANVAS_SIDE: u32 = 8192;

/// Rasterizes strings into particle coordinates.
#[derive(Debug, Clone, Default)]
pub struct TextRasterizer {
    config: TextConfig,
}

impl TextRasterizer {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TextConfig {
        &self.config
    }

    /// Rasterize `text` into exactly `3 * count` floats.
    ///
    /// Slots not covered by lit pixels are filled deterministically from
    /// `field`, inside a cube of side `fill_extent`.
    pub fn rasterize(&self, text: &str, count: usize, field: &RandomField) -> Vec<f32> {
        let mut positions = vec![0.0; count * 3];

        let placed = match self.render(text) {
            Some(canvas) => self.sample_pixels(&canvas, &mut positions),
            None => {
                warn!(
                    width = self.config.canvas_width,
                    height = self.config.canvas_height,
                    "text canvas unavailable, using random layout"
                );
                0
            }
        };

        let extent = self.config.fill_extent;
        for (slot, p) in positions.chunks_exact_mut(3).enumerate().skip(placed) {
            p[0] = field.centered(slot, 0) * extent;
            p[1] = field.centered(slot, 1) * extent;
            p[2] = field.centered(slot, 2) * extent;
        }

        debug!(text, count, placed, "rasterized text");
        positions
    }

    /// Draw `text` centered on a fresh canvas.
    ///
    /// Returns `None` when the configured canvas cannot be created.
    pub fn render(&self, text: &str) -> Option<GrayImage> {
        let (width, height) = (self.config.canvas_width, self.config.canvas_height);
        if width == 0 || height == 0 || width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
            return None;
        }
        let mut canvas = GrayImage::new(width, height);

        let scale = (self.config.font_px / GLYPH_SIZE).max(1);
        let cell = i64::from(GLYPH_SIZE * scale);
        let glyph_count = text.chars().count() as i64;
        let origin_x = (i64::from(width) - glyph_count * cell) / 2;
        let origin_y = (i64::from(height) - cell) / 2;

        for (n, ch) in text.chars().enumerate() {
            let glyph = glyph_for_char(ch);
            let left = origin_x + n as i64 * cell;
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..GLYPH_SIZE {
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    let x0 = left + i64::from(col * scale);
                    let y0 = origin_y + row as i64 * i64::from(scale);
                    fill_block(&mut canvas, x0, y0, scale);
                }
            }
        }

        Some(canvas)
    }

    /// Write lit pixels into `positions`, returning how many particles were placed.
    fn sample_pixels(&self, canvas: &GrayImage, positions: &mut [f32]) -> usize {
        let count = positions.len() / 3;
        let half_w = (canvas.width() / 2) as f32;
        let half_h = (canvas.height() / 2) as f32;
        let scale = self.config.pixel_scale;

        let lit = canvas
            .enumerate_pixels()
            .filter(|(_, _, px)| px.0[0] > 0)
            .map(|(x, y, _)| [(x as f32 - half_w) * scale, -(y as f32 - half_h) * scale, 0.0]);

        let mut placed = 0;
        match self.config.truncation {
            Truncation::ScanOrder => {
                for (slot, point) in positions.chunks_exact_mut(3).zip(lit) {
                    slot.copy_from_slice(&point);
                    placed += 1;
                }
            }
            Truncation::Uniform => {
                let lit: Vec<[f32; 3]> = lit.collect();
                if lit.len() <= count {
                    for (slot, point) in positions.chunks_exact_mut(3).zip(&lit) {
                        slot.copy_from_slice(point);
                        placed += 1;
                    }
                } else {
                    for (k, slot) in positions.chunks_exact_mut(3).enumerate() {
                        slot.copy_from_slice(&lit[k * lit.len() / count]);
                        placed += 1;
                    }
                }
            }
        }
        placed
    }
}

fn glyph_for_char(ch: char) -> [u8; 8] {
    let index = ch as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

/// Fill a `size x size` block at `(x0, y0)`, clipped to the canvas.
fn fill_block(canvas: &mut GrayImage, x0: i64, y0: i64, size: u32) {
    let (w, h) = (i64::from(canvas.width()), i64::from(canvas.height()));
    for y in y0.max(0)..(y0 + i64::from(size)).min(h) {
        for x in x0.max(0)..(x0 + i64::from(size)).min(w) {
            canvas.put_pixel(x as u32, y as u32, Luma([255]));
        }
    }
}
