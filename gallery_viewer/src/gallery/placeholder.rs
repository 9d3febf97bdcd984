// gallery/placeholder.rs - Stand-in raster for photos that failed to load

use std::path::Path;

use font8x8::legacy::BASIC_LEGACY;

use crate::materials::RgbRaster;
use crate::types::hex_rgb;

pub const PLACEHOLDER_WIDTH: u32 = 1024;
pub const PLACEHOLDER_HEIGHT: u32 = 683;
pub const PLACEHOLDER_BACKGROUND: u32 = 0xd9d9d9;
pub const PLACEHOLDER_INK: u32 = 0x8a8a8a;

const GLYPH_WIDTH: u32 = 8;
const GLYPH_HEIGHT: u32 = 8;
/// font8x8 cells carry their own spacing
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH;
const MAX_GLYPH_SCALE: u32 = 8;

static_assertions::const_assert!(PLACEHOLDER_WIDTH > PLACEHOLDER_HEIGHT);

/// Aspect ratio the frame is refitted to when the placeholder is shown
pub fn placeholder_aspect() -> f32 {
    PLACEHOLDER_WIDTH as f32 / PLACEHOLDER_HEIGHT as f32
}

/// `NO PHOTO: {file name}` for the given source path
pub fn placeholder_label(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string());
    format!("NO PHOTO: {}", name)
}

/// Flat grey card with `label` centred in darker grey
pub fn render_placeholder(label: &str) -> RgbRaster {
    let mut raster = RgbRaster::filled(
        PLACEHOLDER_WIDTH,
        PLACEHOLDER_HEIGHT,
        hex_rgb(PLACEHOLDER_BACKGROUND),
    );
    draw_text_centered(&mut raster, label, hex_rgb(PLACEHOLDER_INK));
    raster
}

/// Largest integer glyph scale that fits 90% of the raster width
fn glyph_scale(chars: u32, width: u32) -> u32 {
    if chars == 0 {
        return 1;
    }
    let text_units = chars * GLYPH_ADVANCE;
    ((width * 9 / 10) / text_units).clamp(1, MAX_GLYPH_SCALE)
}

fn draw_text_centered(raster: &mut RgbRaster, text: &str, ink: [f32; 3]) {
    let chars: Vec<char> = text.chars().collect();
    let (w, h) = raster.dimensions();
    let scale = glyph_scale(chars.len() as u32, w);

    let text_w = chars.len() as u32 * GLYPH_ADVANCE * scale;
    let text_h = GLYPH_HEIGHT * scale;
    let x0 = w.saturating_sub(text_w) / 2;
    let y0 = h.saturating_sub(text_h) / 2;

    for (i, c) in chars.iter().enumerate() {
        let rows = glyph(*c);
        let gx = x0 + i as u32 * GLYPH_ADVANCE * scale;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (bits >> col) & 0x01 == 0 {
                    continue;
                }
                let px = gx + col * scale;
                let py = y0 + row as u32 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        let (x, y) = (px + dx, py + dy);
                        if x < w && y < h {
                            raster.set(x, y, ink);
                        }
                    }
                }
            }
        }
    }
}

/// 8x8 bitmap, one byte per row, bit 0 is the leftmost column
fn glyph(c: char) -> [u8; 8] {
    let index = c as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}
