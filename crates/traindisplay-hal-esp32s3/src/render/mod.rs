pub mod font;

use oled_ssd1306::FrameBuffer;

/// Lays one glyph cell per character at 6·size px pitch; `on` picks the ink.
pub fn draw_text(frame: &mut FrameBuffer, x: i32, y: i32, text: &str, size: u8, on: bool) {
    let scale = size.max(1) as i32;
    let mut cursor = x;
    for c in text.chars() {
        let glyph = font::glyph_5x7(font::normalize_glyph_char(c));
        draw_glyph(frame, cursor, y, &glyph, scale, on);
        cursor += font::CELL_WIDTH * scale;
    }
}

fn draw_glyph(frame: &mut FrameBuffer, x: i32, y: i32, glyph: &[u8; 5], scale: i32, on: bool) {
    for (col, bits) in glyph.iter().enumerate() {
        for row in 0..font::GLYPH_HEIGHT {
            if (bits & (1 << row)) == 0 {
                continue;
            }
            let base_x = x + col as i32 * scale;
            let base_y = y + row as i32 * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    set_pixel_signed(frame, base_x + dx, base_y + dy, on);
                }
            }
        }
    }
}

pub fn set_pixel_signed(frame: &mut FrameBuffer, x: i32, y: i32, on: bool) {
    if x < 0 || y < 0 {
        return;
    }
    let _ = frame.set_pixel(x as usize, y as usize, on);
}
