// materials/raster.rs - Float pixel buffers and the drawing primitives synthesis uses
//
// All drawing wraps at the edges so synthesized maps tile seamlessly.

use image::{GrayImage, Luma, Rgb, RgbImage};
use rayon::prelude::*;

use crate::error_handling::{GalleryError, Result};

/// Pixel storage usable in a [`Raster`]
pub trait Pixel: bytemuck::Pod + Send + Sync {
    /// Linear blend towards `other` by `t` in [0, 1]
    fn mix(self, other: Self, t: f32) -> Self;
    fn scale(self, factor: f32) -> Self;
}

impl Pixel for f32 {
    #[inline]
    fn mix(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }

    #[inline]
    fn scale(self, factor: f32) -> Self {
        self * factor
    }
}

impl Pixel for [f32; 3] {
    #[inline]
    fn mix(self, other: Self, t: f32) -> Self {
        [
            self[0] + (other[0] - self[0]) * t,
            self[1] + (other[1] - self[1]) * t,
            self[2] + (other[2] - self[2]) * t,
        ]
    }

    #[inline]
    fn scale(self, factor: f32) -> Self {
        [self[0] * factor, self[1] * factor, self[2] * factor]
    }
}

/// Row-major raster of `width * height` pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<P> {
    width: u32,
    height: u32,
    pixels: Vec<P>,
}

/// Single channel, values in [0, 1]
pub type GrayRaster = Raster<f32>;
/// Three channels, values in [0, 1]
pub type RgbRaster = Raster<[f32; 3]>;

impl<P: Pixel> Raster<P> {
    pub fn filled(width: u32, height: u32, value: P) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; width as usize * height as usize],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<P>) -> Result<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(GalleryError::InvalidRaster {
                reason: format!(
                    "{} pixels do not fill a {}x{} raster",
                    pixels.len(),
                    width,
                    height
                ),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from a per-pixel function, rows evaluated in parallel
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> P + Sync,
    {
        let mut pixels = vec![P::zeroed(); width as usize * height as usize];
        if width > 0 {
            pixels
                .par_chunks_mut(width as usize)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, px) in row.iter_mut().enumerate() {
                        *px = f(x as u32, y as u32);
                    }
                });
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn pixels(&self) -> &[P] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [P] {
        &mut self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> P {
        self.pixels[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: P) {
        let i = self.index(x, y);
        self.pixels[i] = value;
    }

    /// Read with toroidal wrap-around on both axes
    #[inline]
    pub fn get_wrapped(&self, x: i64, y: i64) -> P {
        let wx = x.rem_euclid(self.width as i64) as u32;
        let wy = y.rem_euclid(self.height as i64) as u32;
        self.get(wx, wy)
    }

    /// Raw bytes for upload by the renderer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Alpha-blend `value` onto one pixel, wrapping coordinates
    #[inline]
    pub fn blend_wrapped(&mut self, x: i64, y: i64, value: P, alpha: f32) {
        if self.pixels.is_empty() {
            return;
        }
        let wx = x.rem_euclid(self.width as i64) as u32;
        let wy = y.rem_euclid(self.height as i64) as u32;
        let i = self.index(wx, wy);
        self.pixels[i] = self.pixels[i].mix(value, alpha.clamp(0.0, 1.0));
    }

    /// Gradient from `edge` (top and bottom rows) to `centre` (middle row).
    /// Mirrored so the map still tiles vertically.
    pub fn fill_mirrored_gradient(&mut self, edge: P, centre: P) {
        let h = self.height.max(2) as f32 - 1.0;
        let w = self.width as usize;
        if w == 0 {
            return;
        }
        for (y, row) in self.pixels.chunks_mut(w).enumerate() {
            let t = 1.0 - ((2.0 * y as f32 / h) - 1.0).abs();
            let value = edge.mix(centre, t);
            row.fill(value);
        }
    }

    pub fn blend_rect(&mut self, x: i64, y: i64, w: u32, h: u32, value: P, alpha: f32) {
        for dy in 0..h as i64 {
            for dx in 0..w as i64 {
                self.blend_wrapped(x + dx, y + dy, value, alpha);
            }
        }
    }

    /// One-pixel horizontal stroke
    pub fn blend_hline(&mut self, x: i64, y: i64, len: u32, value: P, alpha: f32) {
        for dx in 0..len as i64 {
            self.blend_wrapped(x + dx, y, value, alpha);
        }
    }

    /// One-pixel vertical stroke
    pub fn blend_vline(&mut self, x: i64, y: i64, len: u32, value: P, alpha: f32) {
        for dy in 0..len as i64 {
            self.blend_wrapped(x, y + dy, value, alpha);
        }
    }

    /// Outline of a rectangle, `thickness` pixels wide
    pub fn blend_frame(&mut self, x: i64, y: i64, w: u32, h: u32, thickness: u32, value: P, alpha: f32) {
        let t = thickness.min(w / 2).min(h / 2).max(1);
        self.blend_rect(x, y, w, t, value, alpha);
        self.blend_rect(x, y + h as i64 - t as i64, w, t, value, alpha);
        self.blend_rect(x, y + t as i64, t, h - 2 * t, value, alpha);
        self.blend_rect(x + w as i64 - t as i64, y + t as i64, t, h - 2 * t, value, alpha);
    }
}

impl GrayRaster {
    /// 3x3 box blur with toroidal sampling
    pub fn box_blur_wrapped(&self) -> GrayRaster {
        GrayRaster::from_fn(self.width, self.height, |x, y| {
            let mut sum = 0.0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    sum += self.get_wrapped(x as i64 + dx, y as i64 + dy);
                }
            }
            sum / 9.0
        })
    }

    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| Luma([to_u8(self.get(x, y))]))
    }

    pub fn mean(&self) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        self.pixels.iter().sum::<f32>() / self.pixels.len() as f32
    }
}

impl RgbRaster {
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let [r, g, b] = self.get(x, y);
            Rgb([to_u8(r), to_u8(g), to_u8(b)])
        })
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
