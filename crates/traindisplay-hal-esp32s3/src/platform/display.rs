use embedded_graphics::{
    Drawable,
    pixelcolor::BinaryColor,
    prelude::{Point, Primitive, Size},
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
};
use embedded_hal::i2c::I2c;
use log::info;
use oled_ssd1306::{Config, Error as DriverError, FrameBuffer, Ssd1306};
use traindisplay_core::display::Canvas;

use crate::render;

pub type DisplayConfig = Config;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DisplayError<I2cErr> {
    I2c(I2cErr),
    Protocol,
}

impl<E> From<DriverError<E>> for DisplayError<E> {
    fn from(err: DriverError<E>) -> Self {
        match err {
            DriverError::I2c(err) => Self::I2c(err),
            DriverError::InvalidInput => Self::Protocol,
        }
    }
}

/// SSD1306 panel behind the [`Canvas`] the screens draw on.
///
/// Primitives land in a RAM frame; `show` pushes the touched pages.
pub struct OledCanvas<I2C> {
    driver: Ssd1306<I2C>,
    frame: FrameBuffer,
    fault_logged: bool,
}

impl<I2C> OledCanvas<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C, config: DisplayConfig) -> Self {
        Self {
            driver: Ssd1306::new(i2c, config),
            frame: FrameBuffer::new(),
            fault_logged: false,
        }
    }

    /// Runs the controller power-up sequence and blanks the panel.
    pub fn initialize(&mut self) -> Result<(), DisplayError<I2C::Error>> {
        self.driver.initialize()?;
        self.frame.clear(false);
        self.frame.mark_all_dirty();
        self.driver.flush(&mut self.frame)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), DisplayError<I2C::Error>> {
        self.driver.flush(&mut self.frame)?;
        Ok(())
    }

    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), DisplayError<I2C::Error>> {
        self.driver.set_contrast(contrast)?;
        Ok(())
    }

    fn stroke(on: bool) -> PrimitiveStyle<BinaryColor> {
        PrimitiveStyle::with_stroke(color(on), 1)
    }

    fn fill(on: bool) -> PrimitiveStyle<BinaryColor> {
        PrimitiveStyle::with_fill(color(on))
    }
}

fn color(on: bool) -> BinaryColor {
    if on { BinaryColor::On } else { BinaryColor::Off }
}

fn rect(x: i32, y: i32, w: i32, h: i32) -> Option<Rectangle> {
    if w <= 0 || h <= 0 {
        return None;
    }
    Some(Rectangle::new(Point::new(x, y), Size::new(w as u32, h as u32)))
}

fn circle(cx: i32, cy: i32, r: i32) -> Circle {
    let r = r.max(0);
    Circle::with_center(Point::new(cx, cy), (2 * r + 1) as u32)
}

impl<I2C> Canvas for OledCanvas<I2C>
where
    I2C: I2c,
{
    fn clear(&mut self) {
        self.frame.clear(false);
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, size: u8, inverted: bool) {
        render::draw_text(&mut self.frame, x, y, text, size, !inverted);
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if let Some(rect) = rect(x, y, w, h) {
            let _ = rect.into_styled(Self::stroke(true)).draw(&mut self.frame);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, on: bool) {
        if let Some(rect) = rect(x, y, w, h) {
            let _ = rect.into_styled(Self::fill(on)).draw(&mut self.frame);
        }
    }

    fn draw_circle(&mut self, cx: i32, cy: i32, r: i32, on: bool) {
        let _ = circle(cx, cy, r)
            .into_styled(Self::stroke(on))
            .draw(&mut self.frame);
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, on: bool) {
        let _ = circle(cx, cy, r)
            .into_styled(Self::fill(on))
            .draw(&mut self.frame);
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, on: bool) {
        let _ = Line::new(Point::new(x0, y0), Point::new(x1, y1))
            .into_styled(Self::stroke(on))
            .draw(&mut self.frame);
    }

    fn show(&mut self) {
        match self.driver.flush(&mut self.frame) {
            Ok(()) => self.fault_logged = false,
            Err(err) => {
                if !self.fault_logged {
                    info!("display flush failed: {:?}", err);
                    self.fault_logged = true;
                }
            }
        }
    }
}
