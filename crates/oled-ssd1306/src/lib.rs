#![cfg_attr(not(test), no_std)]

//! SSD1306 (128x64 monochrome OLED, I2C) driver primitives.

mod framebuffer;
pub mod protocol;

#[cfg(feature = "embedded-graphics")]
mod graphics;

pub use framebuffer::FrameBuffer;

use embedded_hal::i2c::I2c;

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// 7-bit I2C address of the controller.
    pub address: u8,
    /// Contrast written during init (0x00..=0xFF).
    pub contrast: u8,
    /// Flush only pages touched since the previous flush.
    pub partial_flush: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: protocol::DEFAULT_ADDRESS,
            contrast: 0xCF,
            partial_flush: true,
        }
    }
}

impl Config {
    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub const fn with_contrast(mut self, contrast: u8) -> Self {
        self.contrast = contrast;
        self
    }

    pub const fn with_partial_flush(mut self, partial_flush: bool) -> Self {
        self.partial_flush = partial_flush;
        self
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<I2cErr> {
    /// I2C transaction failed.
    I2c(I2cErr),
    /// Input parameters are outside supported bounds.
    InvalidInput,
}

pub type DriverResult<I2cErr> = Result<(), Error<I2cErr>>;

/// SSD1306 driver.
#[derive(Debug)]
pub struct Ssd1306<I2C> {
    i2c: I2C,
    config: Config,
}

impl<I2C> Ssd1306<I2C>
where
    I2C: I2c,
{
    /// Creates a new driver instance.
    pub fn new(i2c: I2C, config: Config) -> Self {
        Self { i2c, config }
    }

    /// Returns current configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Releases the owned bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Sends the power-up sequence and switches the panel on.
    pub fn initialize(&mut self) -> DriverResult<I2C::Error> {
        let sequence = protocol::build_init_sequence(self.config.contrast);
        self.send_commands(&sequence)
    }

    /// Switches the panel on or off without touching GDDRAM.
    pub fn set_display_on(&mut self, on: bool) -> DriverResult<I2C::Error> {
        let command = if on {
            protocol::CMD_DISPLAY_ON
        } else {
            protocol::CMD_DISPLAY_OFF
        };
        self.send_commands(&[command])
    }

    pub fn set_contrast(&mut self, contrast: u8) -> DriverResult<I2C::Error> {
        self.config.contrast = contrast;
        self.send_commands(&[protocol::CMD_SET_CONTRAST, contrast])
    }

    pub fn set_inverted(&mut self, inverted: bool) -> DriverResult<I2C::Error> {
        let command = if inverted {
            protocol::CMD_INVERT_DISPLAY
        } else {
            protocol::CMD_NORMAL_DISPLAY
        };
        self.send_commands(&[command])
    }

    /// Writes one page (0..=7) of GDDRAM.
    pub fn write_page(
        &mut self,
        page: u8,
        data: &[u8; protocol::WIDTH],
    ) -> DriverResult<I2C::Error> {
        let window = protocol::build_page_window(page).ok_or(Error::InvalidInput)?;
        self.send_commands(&window)?;

        let packet = protocol::build_page_packet(data);
        self.i2c
            .write(self.config.address, &packet)
            .map_err(Error::I2c)
    }

    /// Flushes the framebuffer, skipping clean pages when partial flush is enabled.
    pub fn flush(&mut self, frame: &mut FrameBuffer) -> DriverResult<I2C::Error> {
        for page in 0..protocol::PAGES {
            if self.config.partial_flush && !frame.is_page_dirty(page) {
                continue;
            }

            let data = frame.page(page).ok_or(Error::InvalidInput)?;
            self.write_page(page as u8, data)?;
        }

        frame.mark_clean();
        Ok(())
    }

    fn send_commands(&mut self, commands: &[u8]) -> DriverResult<I2C::Error> {
        let mut packet = [0u8; protocol::INIT_SEQUENCE_LEN + 1];
        if commands.len() > protocol::INIT_SEQUENCE_LEN {
            return Err(Error::InvalidInput);
        }

        packet[0] = protocol::CONTROL_COMMAND;
        packet[1..=commands.len()].copy_from_slice(commands);
        self.i2c
            .write(self.config.address, &packet[..=commands.len()])
            .map_err(Error::I2c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, Operation};

    #[derive(Default)]
    struct RecordingBus {
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl ErrorType for RecordingBus {
        type Error = core::convert::Infallible;
    }

    impl I2c for RecordingBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn initialize_sends_one_command_stream() {
        let mut driver = Ssd1306::new(RecordingBus::default(), Config::default());
        driver.initialize().unwrap();

        let bus = driver.release();
        assert_eq!(bus.writes.len(), 1);
        let (address, bytes) = &bus.writes[0];
        assert_eq!(*address, 0x3C);
        assert_eq!(bytes[0], protocol::CONTROL_COMMAND);
        assert_eq!(bytes.len(), protocol::INIT_SEQUENCE_LEN + 1);
    }

    #[test]
    fn partial_flush_skips_clean_pages() {
        let mut driver = Ssd1306::new(RecordingBus::default(), Config::default());
        let mut frame = FrameBuffer::new();
        frame.mark_clean();
        frame.set_pixel(5, 40, true);

        driver.flush(&mut frame).unwrap();
        assert!(!frame.is_dirty());

        let bus = driver.release();
        // One window command plus one data packet for page 5.
        assert_eq!(bus.writes.len(), 2);
        assert_eq!(bus.writes[0].1, vec![0x00, 0x21, 0, 127, 0x22, 5, 5]);
        assert_eq!(bus.writes[1].1[0], protocol::CONTROL_DATA);
        assert_eq!(bus.writes[1].1[1 + 5], 0b0000_0001);
    }

    #[test]
    fn full_flush_sends_every_page() {
        let config = Config::default().with_partial_flush(false);
        let mut driver = Ssd1306::new(RecordingBus::default(), config);
        let mut frame = FrameBuffer::new();
        frame.mark_clean();

        driver.flush(&mut frame).unwrap();
        assert_eq!(driver.release().writes.len(), protocol::PAGES * 2);
    }
}
