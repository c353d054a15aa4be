//! In-memory framebuffer in SSD1306 page layout.

use core::convert::TryFrom;

use crate::protocol::{BUFFER_SIZE, HEIGHT, PAGES, WIDTH};

/// 1bpp framebuffer for the panel.
///
/// Bytes are grouped in 8-row pages: byte `page * WIDTH + x` holds rows
/// `page * 8 ..= page * 8 + 7` of column `x`, bit 0 being the top row.
#[derive(Clone)]
pub struct FrameBuffer {
    bytes: [u8; BUFFER_SIZE],
    dirty_pages: u8,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Creates a new dark framebuffer with every page marked dirty.
    pub const fn new() -> Self {
        Self {
            bytes: [0u8; BUFFER_SIZE],
            dirty_pages: u8::MAX,
        }
    }

    /// Returns the underlying framebuffer bytes.
    pub fn bytes(&self) -> &[u8; BUFFER_SIZE] {
        &self.bytes
    }

    /// Clears every pixel to off (`on = false`) or lit (`on = true`).
    pub fn clear(&mut self, on: bool) {
        self.bytes.fill(if on { 0xFF } else { 0x00 });
        self.dirty_pages = u8::MAX;
    }

    /// Sets a pixel state.
    ///
    /// Returns `true` when pixel is in bounds, `false` otherwise.
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }

        let page = y / 8;
        let byte_index = page * WIDTH + x;
        let bit_mask = 1u8 << (y % 8);
        let before = self.bytes[byte_index];

        if on {
            self.bytes[byte_index] |= bit_mask;
        } else {
            self.bytes[byte_index] &= !bit_mask;
        }

        if self.bytes[byte_index] != before {
            self.dirty_pages |= 1 << page;
        }

        true
    }

    /// Fills the rectangle clipped to the panel, one page byte per column.
    pub fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, on: bool) {
        let x_end = x.saturating_add(width).min(WIDTH);
        let y_end = y.saturating_add(height).min(HEIGHT);
        if x >= x_end || y >= y_end {
            return;
        }

        for page in y / 8..=(y_end - 1) / 8 {
            let page_top = page * 8;
            let first = y.max(page_top) - page_top;
            let last = y_end.min(page_top + 8) - page_top;
            let mask = (0xFFu8 << first) & (0xFFu8 >> (8 - last));

            let start = page * WIDTH;
            let mut changed = false;
            for byte in &mut self.bytes[start + x..start + x_end] {
                let next = if on { *byte | mask } else { *byte & !mask };
                changed |= next != *byte;
                *byte = next;
            }
            if changed {
                self.dirty_pages |= 1 << page;
            }
        }
    }

    /// Reads a pixel state.
    pub fn pixel(&self, x: usize, y: usize) -> Option<bool> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }

        let byte_index = (y / 8) * WIDTH + x;
        Some((self.bytes[byte_index] & (1u8 << (y % 8))) != 0)
    }

    /// Returns the payload of page 0..=7.
    pub fn page(&self, page: usize) -> Option<&[u8; WIDTH]> {
        if page >= PAGES {
            return None;
        }

        let start = page * WIDTH;
        <&[u8; WIDTH]>::try_from(&self.bytes[start..start + WIDTH]).ok()
    }

    /// Whether `page` changed since the last [`FrameBuffer::mark_clean`].
    pub fn is_page_dirty(&self, page: usize) -> bool {
        page < PAGES && (self.dirty_pages & (1 << page)) != 0
    }

    /// Whether any page changed since the last flush.
    pub fn is_dirty(&self) -> bool {
        self.dirty_pages != 0
    }

    /// Marks every page as flushed.
    pub fn mark_clean(&mut self) {
        self.dirty_pages = 0;
    }

    /// Forces the next flush to resend every page.
    pub fn mark_all_dirty(&mut self) {
        self.dirty_pages = u8::MAX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_bit_mapping_is_lsb_top_within_page() {
        let mut fb = FrameBuffer::new();

        assert!(fb.set_pixel(0, 0, true));
        assert!(fb.set_pixel(0, 7, true));
        assert!(fb.set_pixel(1, 8, true));

        assert_eq!(fb.page(0).unwrap()[0], 0b1000_0001);
        assert_eq!(fb.page(1).unwrap()[1], 0b0000_0001);
    }

    #[test]
    fn out_of_bounds_pixel_is_ignored() {
        let mut fb = FrameBuffer::new();

        assert!(!fb.set_pixel(WIDTH, 0, true));
        assert!(!fb.set_pixel(0, HEIGHT, true));
        assert!(fb.bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn only_touched_pages_become_dirty() {
        let mut fb = FrameBuffer::new();
        fb.mark_clean();

        fb.set_pixel(10, 20, true);
        assert!(fb.is_page_dirty(2));
        assert!(!fb.is_page_dirty(0));

        fb.mark_clean();
        fb.set_pixel(10, 20, true);
        assert!(!fb.is_dirty());
    }

    #[test]
    fn fill_rect_masks_partial_pages() {
        let mut fb = FrameBuffer::new();
        fb.mark_clean();

        // Rows 5..=17 span the bottom of page 0, all of page 1, top of page 2.
        fb.fill_rect(3, 5, 2, 13, true);
        assert_eq!(fb.page(0).unwrap()[3], 0b1110_0000);
        assert_eq!(fb.page(1).unwrap()[4], 0xFF);
        assert_eq!(fb.page(2).unwrap()[3], 0b0000_0011);
        assert_eq!(fb.page(0).unwrap()[5], 0);
        assert!(fb.is_page_dirty(2));
        assert!(!fb.is_page_dirty(3));

        fb.mark_clean();
        fb.fill_rect(3, 8, 1, 8, false);
        assert_eq!(fb.page(1).unwrap()[3], 0);
        assert_eq!(fb.page(1).unwrap()[4], 0xFF);
        assert!(fb.is_page_dirty(1));
        assert!(!fb.is_page_dirty(0));
    }

    #[test]
    fn fill_rect_ignores_area_past_the_edge() {
        let mut fb = FrameBuffer::new();
        fb.mark_clean();

        fb.fill_rect(WIDTH, 0, 4, 4, true);
        fb.fill_rect(0, 10, 4, 0, true);
        assert!(!fb.is_dirty());

        fb.fill_rect(WIDTH - 2, HEIGHT - 1, 10, 10, true);
        assert_eq!(fb.pixel(WIDTH - 1, HEIGHT - 1), Some(true));
        assert_eq!(fb.pixel(WIDTH - 3, HEIGHT - 1), Some(false));
    }

    #[test]
    fn set_and_read_last_pixel() {
        let mut fb = FrameBuffer::new();

        assert!(fb.set_pixel(WIDTH - 1, HEIGHT - 1, true));
        assert_eq!(fb.pixel(WIDTH - 1, HEIGHT - 1), Some(true));
        assert_eq!(fb.pixel(WIDTH, HEIGHT), None);
    }
}
