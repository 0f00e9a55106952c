//! Generated label textures, e.g. the room numbers painted on campus buildings.

use std::sync::Arc;

use image::{GrayImage, Luma, Rgba, RgbaImage};

use crate::{
    data_structures::material::TextureMap,
    resources::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH},
};

pub const LABEL_SIZE: u32 = 256;
pub const LABEL_BACKGROUND: Rgba<u8> = Rgba([0xf5, 0xf3, 0xf2, 0xff]);
const SHADOW_OFFSET: u32 = 2;
const SHADOW_BLUR: f32 = 10.0;
// 7 rows of 12px give glyphs roughly the height of 120px bold digits
const MAX_CELL: u32 = 12;
const MARGIN: u32 = 8;

/// Renders `text` into a fresh label texture.
pub fn label_texture(text: &str) -> Arc<TextureMap> {
    TextureMap::from_image(format!("label:{text}"), render_label(text))
}

/// Light background, black centred text with a soft drop shadow.
///
/// Characters the built-in font lacks are left blank.
pub fn render_label(text: &str) -> RgbaImage {
    let mask = text_mask(text);

    let mut shadow = GrayImage::new(LABEL_SIZE, LABEL_SIZE);
    for (x, y, pixel) in mask.enumerate_pixels() {
        let (sx, sy) = (x + SHADOW_OFFSET, y + SHADOW_OFFSET);
        if pixel[0] > 0 && sx < LABEL_SIZE && sy < LABEL_SIZE {
            shadow.put_pixel(sx, sy, Luma([255]));
        }
    }
    // canvas shadow blur is twice the gaussian sigma
    let shadow = image::imageops::blur(&shadow, SHADOW_BLUR / 2.0);

    let mut label = RgbaImage::from_pixel(LABEL_SIZE, LABEL_SIZE, LABEL_BACKGROUND);
    for (x, y, pixel) in label.enumerate_pixels_mut() {
        let shade = shadow.get_pixel(x, y)[0] as f32 / 255.0;
        let ink = mask.get_pixel(x, y)[0] as f32 / 255.0;
        let keep = (1.0 - shade) * (1.0 - ink);
        for c in 0..3 {
            pixel[c] = (LABEL_BACKGROUND[c] as f32 * keep).round() as u8;
        }
    }
    label
}

fn text_mask(text: &str) -> GrayImage {
    let mut mask = GrayImage::new(LABEL_SIZE, LABEL_SIZE);
    let glyphs: Vec<Option<[u8; 7]>> = text.chars().map(font::glyph).collect();
    if glyphs.is_empty() {
        return mask;
    }
    let count = glyphs.len() as u32;
    // one empty column between glyphs
    let columns = count * GLYPH_WIDTH + (count - 1);
    let cell = ((LABEL_SIZE - 2 * MARGIN) / columns).clamp(1, MAX_CELL);
    let width = columns * cell;
    let height = GLYPH_HEIGHT * cell;
    let x0 = LABEL_SIZE.saturating_sub(width) / 2;
    let y0 = LABEL_SIZE.saturating_sub(height) / 2;

    for (i, rows) in glyphs.iter().enumerate() {
        let Some(rows) = rows else {
            continue;
        };
        let gx = x0 + i as u32 * (GLYPH_WIDTH + 1) * cell;
        for row in 0..GLYPH_HEIGHT {
            for column in 0..GLYPH_WIDTH {
                if !font::is_set(rows, column, row) {
                    continue;
                }
                for dy in 0..cell {
                    for dx in 0..cell {
                        let (x, y) = (gx + column * cell + dx, y0 + row * cell + dy);
                        if x < LABEL_SIZE && y < LABEL_SIZE {
                            mask.put_pixel(x, y, Luma([255]));
                        }
                    }
                }
            }
        }
    }
    mask
}
