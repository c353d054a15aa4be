//! Command-level protocol helpers for the SSD1306 controller over I2C.

/// Panel width in pixels.
pub const WIDTH: usize = 128;
/// Panel height in pixels.
pub const HEIGHT: usize = 64;
/// Number of 8-row pages.
pub const PAGES: usize = HEIGHT / 8;
/// Total framebuffer size in bytes.
pub const BUFFER_SIZE: usize = WIDTH * PAGES;

/// Default 7-bit I2C address (SA0 low).
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Control byte announcing a stream of command bytes.
pub const CONTROL_COMMAND: u8 = 0x00;
/// Control byte announcing a stream of GDDRAM data bytes.
pub const CONTROL_DATA: u8 = 0x40;

pub const CMD_DISPLAY_OFF: u8 = 0xAE;
pub const CMD_DISPLAY_ON: u8 = 0xAF;
pub const CMD_SET_CONTRAST: u8 = 0x81;
pub const CMD_ENTIRE_DISPLAY_RESUME: u8 = 0xA4;
pub const CMD_NORMAL_DISPLAY: u8 = 0xA6;
pub const CMD_INVERT_DISPLAY: u8 = 0xA7;
pub const CMD_SET_CLOCK_DIV: u8 = 0xD5;
pub const CMD_SET_MULTIPLEX: u8 = 0xA8;
pub const CMD_SET_DISPLAY_OFFSET: u8 = 0xD3;
pub const CMD_SET_START_LINE: u8 = 0x40;
pub const CMD_CHARGE_PUMP: u8 = 0x8D;
pub const CMD_MEMORY_MODE: u8 = 0x20;
pub const CMD_SEG_REMAP: u8 = 0xA1;
pub const CMD_COM_SCAN_DEC: u8 = 0xC8;
pub const CMD_SET_COM_PINS: u8 = 0xDA;
pub const CMD_SET_PRECHARGE: u8 = 0xD9;
pub const CMD_SET_VCOM_DETECT: u8 = 0xDB;
pub const CMD_DEACTIVATE_SCROLL: u8 = 0x2E;
pub const CMD_COLUMN_ADDR: u8 = 0x21;
pub const CMD_PAGE_ADDR: u8 = 0x22;

/// Length of the power-up command sequence.
pub const INIT_SEQUENCE_LEN: usize = 26;

/// Builds the power-up sequence for a 128x64 panel with the internal charge pump.
pub const fn build_init_sequence(contrast: u8) -> [u8; INIT_SEQUENCE_LEN] {
    [
        CMD_DISPLAY_OFF,
        CMD_SET_CLOCK_DIV,
        0x80,
        CMD_SET_MULTIPLEX,
        (HEIGHT - 1) as u8,
        CMD_SET_DISPLAY_OFFSET,
        0x00,
        CMD_SET_START_LINE,
        CMD_CHARGE_PUMP,
        0x14,
        CMD_MEMORY_MODE,
        0x00,
        CMD_SEG_REMAP,
        CMD_COM_SCAN_DEC,
        CMD_SET_COM_PINS,
        0x12,
        CMD_SET_CONTRAST,
        contrast,
        CMD_SET_PRECHARGE,
        0xF1,
        CMD_SET_VCOM_DETECT,
        0x40,
        CMD_ENTIRE_DISPLAY_RESUME,
        CMD_NORMAL_DISPLAY,
        CMD_DEACTIVATE_SCROLL,
        CMD_DISPLAY_ON,
    ]
}

/// Builds the addressing window for one page, full width.
///
/// Returns `None` when `page` is out of range.
#[inline]
pub fn build_page_window(page: u8) -> Option<[u8; 6]> {
    if page as usize >= PAGES {
        return None;
    }

    Some([
        CMD_COLUMN_ADDR,
        0,
        (WIDTH - 1) as u8,
        CMD_PAGE_ADDR,
        page,
        page,
    ])
}

/// Prefixes a page payload with the data control byte.
#[inline]
pub fn build_page_packet(data: &[u8; WIDTH]) -> [u8; WIDTH + 1] {
    let mut packet = [0u8; WIDTH + 1];
    packet[0] = CONTROL_DATA;
    packet[1..].copy_from_slice(data);
    packet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_sequence_configures_full_height_multiplex() {
        let seq = build_init_sequence(0xCF);
        assert_eq!(seq[0], CMD_DISPLAY_OFF);
        assert_eq!(seq[3], CMD_SET_MULTIPLEX);
        assert_eq!(seq[4], 63);
        assert_eq!(seq[17], 0xCF);
        assert_eq!(seq[INIT_SEQUENCE_LEN - 1], CMD_DISPLAY_ON);
    }

    #[test]
    fn page_window_spans_all_columns() {
        assert_eq!(build_page_window(3), Some([0x21, 0, 127, 0x22, 3, 3]));
        assert_eq!(build_page_window(PAGES as u8), None);
    }

    #[test]
    fn page_packet_starts_with_data_control_byte() {
        let mut data = [0u8; WIDTH];
        data[0] = 0xAA;
        data[WIDTH - 1] = 0x55;

        let packet = build_page_packet(&data);
        assert_eq!(packet[0], CONTROL_DATA);
        assert_eq!(packet[1], 0xAA);
        assert_eq!(packet[WIDTH], 0x55);
    }
}
