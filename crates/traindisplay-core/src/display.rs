//! Drawing surface consumed by widgets and screens.
//!
//! Coordinates are pixels on the 128x64 panel, origin top-left. Text uses a
//! 5x7 glyph inside a 6x8 cell scaled by an integer `size`. Drawing only
//! composes the frame; nothing reaches the glass before `show`.

use crate::config::{BLUE_ZONE_HEIGHT, BLUE_ZONE_Y, SCREEN_WIDTH, YELLOW_ZONE_HEIGHT, YELLOW_ZONE_Y};

pub const CHAR_WIDTH: i32 = 6;
pub const CHAR_HEIGHT: i32 = 8;
/// Gap kept between right-aligned text and the panel edge.
pub const RIGHT_MARGIN: i32 = 2;

/// Rendered width of `text` at `size`.
pub fn text_width(text: &str, size: u8) -> i32 {
    text.chars().count() as i32 * CHAR_WIDTH * size.max(1) as i32
}

/// Characters that fit in `width_px` at `size`.
pub fn chars_fitting(width_px: i32, size: u8) -> usize {
    (width_px / (CHAR_WIDTH * size.max(1) as i32)).max(0) as usize
}

pub fn centered_x(text: &str, size: u8) -> i32 {
    (SCREEN_WIDTH - text_width(text, size)) / 2
}

pub fn right_aligned_x(text: &str, size: u8) -> i32 {
    SCREEN_WIDTH - text_width(text, size) - RIGHT_MARGIN
}

/// Monochrome canvas. `inverted` text is drawn with unlit pixels, so it reads
/// on top of a filled area.
pub trait Canvas {
    fn clear(&mut self);

    fn draw_text(&mut self, x: i32, y: i32, text: &str, size: u8, inverted: bool);

    /// Outline, 1 px.
    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32);

    /// Filled rectangle, lit when `on`.
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, on: bool);

    fn draw_circle(&mut self, cx: i32, cy: i32, r: i32, on: bool);

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, on: bool);

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, on: bool);

    /// Pushes the composed frame to the panel.
    fn show(&mut self);

    fn draw_hline(&mut self, x: i32, y: i32, w: i32) {
        self.draw_line(x, y, x + w - 1, y, true);
    }

    fn clear_yellow_zone(&mut self) {
        self.fill_rect(0, YELLOW_ZONE_Y, SCREEN_WIDTH, YELLOW_ZONE_HEIGHT, false);
    }

    fn clear_blue_zone(&mut self) {
        self.fill_rect(0, BLUE_ZONE_Y, SCREEN_WIDTH, BLUE_ZONE_HEIGHT, false);
    }

    fn draw_centered_text(&mut self, text: &str, y: i32, size: u8, inverted: bool) {
        let x = centered_x(text, size);
        self.draw_text(x, y, text, size, inverted);
    }

    fn draw_right_aligned_text(&mut self, text: &str, y: i32, size: u8, inverted: bool) {
        let x = right_aligned_x(text, size);
        self.draw_text(x, y, text, size, inverted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_metrics_scale_with_size() {
        assert_eq!(text_width("12:34", 1), 30);
        assert_eq!(text_width("12:34", 3), 90);
        assert_eq!(centered_x("12:34", 3), 19);
        assert_eq!(right_aligned_x("12:34", 1), 96);
        assert_eq!(chars_fitting(120, 1), 20);
    }
}
