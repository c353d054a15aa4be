//! `embedded-graphics` target over the page framebuffer.
//!
//! Solid fills go through [`FrameBuffer::fill_rect`] so a styled rectangle
//! touches each page byte once instead of once per pixel.

use core::convert::Infallible;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Size},
    pixelcolor::BinaryColor,
    primitives::Rectangle,
};

use crate::{FrameBuffer, protocol};

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                self.set_pixel(x, y, color.is_on());
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let visible = area.intersection(&self.bounding_box());
        if visible.size.width == 0 || visible.size.height == 0 {
            return Ok(());
        }

        self.fill_rect(
            visible.top_left.x as usize,
            visible.top_left.y as usize,
            visible.size.width as usize,
            visible.size.height as usize,
            color.is_on(),
        );
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        FrameBuffer::clear(self, color.is_on());
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(protocol::WIDTH as u32, protocol::HEIGHT as u32)
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics_core::geometry::Point;

    use super::*;

    #[test]
    fn solid_fill_is_clipped_to_the_panel() {
        let mut fb = FrameBuffer::new();
        fb.mark_clean();

        let area = Rectangle::new(Point::new(-4, 60), Size::new(10, 20));
        fb.fill_solid(&area, BinaryColor::On).unwrap();

        assert_eq!(fb.pixel(0, 60), Some(true));
        assert_eq!(fb.pixel(5, 63), Some(true));
        assert_eq!(fb.pixel(6, 63), Some(false));
        assert_eq!(fb.pixel(0, 59), Some(false));
        assert!(fb.is_page_dirty(7));
        assert!(!fb.is_page_dirty(6));
    }

    #[test]
    fn fill_entirely_off_panel_is_a_no_op() {
        let mut fb = FrameBuffer::new();
        fb.mark_clean();

        let area = Rectangle::new(Point::new(200, 10), Size::new(8, 8));
        fb.fill_solid(&area, BinaryColor::On).unwrap();
        assert!(!fb.is_dirty());
    }
}
