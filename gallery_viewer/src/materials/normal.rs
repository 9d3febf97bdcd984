// materials/normal.rs - Tangent-space normal maps from height fields

use rayon::prelude::*;

use super::raster::{GrayRaster, RgbRaster};
use crate::types::Vec3;

/// Converts a height raster into an encoded tangent-space normal raster.
///
/// Neighbours are sampled toroidally, so a tileable height field gives a
/// normal map with no seam when repeated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightToNormalConverter {
    pub strength: f32,
}

impl HeightToNormalConverter {
    pub fn new(strength: f32) -> Self {
        Self { strength }
    }

    pub fn convert(&self, height: &GrayRaster) -> RgbRaster {
        let (width, rows) = height.dimensions();
        let mut out = RgbRaster::filled(width, rows, [0.5, 0.5, 1.0]);
        if width == 0 || rows == 0 {
            return out;
        }

        let strength = self.strength;
        out.pixels_mut()
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let y = y as i64;
                for (x, px) in row.iter_mut().enumerate() {
                    let x = x as i64;
                    let left = height.get_wrapped(x - 1, y);
                    let right = height.get_wrapped(x + 1, y);
                    let up = height.get_wrapped(x, y - 1);
                    let down = height.get_wrapped(x, y + 1);
                    *px = encode_normal(left, right, up, down, strength);
                }
            });

        out
    }
}

impl Default for HeightToNormalConverter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[inline]
fn encode_normal(left: f32, right: f32, up: f32, down: f32, strength: f32) -> [f32; 3] {
    let dx = (right - left) * strength;
    let dy = (down - up) * strength;
    let n = Vec3::new(-dx, -dy, 1.0).normalize();
    [n.x * 0.5 + 0.5, n.y * 0.5 + 0.5, n.z * 0.5 + 0.5]
}

/// Undo the [0, 1] encoding of one normal-map pixel
#[inline]
pub fn decode_normal(encoded: [f32; 3]) -> Vec3 {
    Vec3::new(
        encoded[0] * 2.0 - 1.0,
        encoded[1] * 2.0 - 1.0,
        encoded[2] * 2.0 - 1.0,
    )
}
