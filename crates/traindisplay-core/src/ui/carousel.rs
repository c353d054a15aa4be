//! Five-cell character picker for text entry.

use crate::{
    config::{KEYBOARD_CHARS, STATION_CHARS},
    display::Canvas,
};

const CELL_X: [i32; 5] = [10, 35, 60, 85, 110];

/// Alphabet offered by the picker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Charset {
    Keyboard,
    Station,
}

impl Charset {
    pub const fn chars(self) -> &'static str {
        match self {
            Self::Keyboard => KEYBOARD_CHARS,
            Self::Station => STATION_CHARS,
        }
    }

    pub const fn len(self) -> usize {
        self.chars().len()
    }

    /// Character at `index`, wrapping in both directions.
    pub fn at(self, index: i32) -> char {
        let bytes = self.chars().as_bytes();
        bytes[index.rem_euclid(bytes.len() as i32) as usize] as char
    }
}

/// Draws the neighbourhood of `index`, centre cell highlighted.
pub fn draw_carousel<C: Canvas + ?Sized>(canvas: &mut C, charset: Charset, index: usize, y: i32) {
    let mut glyph = [0u8; 4];
    for (slot, x) in CELL_X.iter().enumerate() {
        let offset = slot as i32 - 2;
        let ch = charset.at(index as i32 + offset);
        let text = ch.encode_utf8(&mut glyph);
        if offset == 0 {
            canvas.fill_rect(x - 8, y, 20, 18, true);
            canvas.draw_text(x - 4, y + 2, text, 2, true);
        } else {
            canvas.draw_text(x - 4, y + 2, text, 2, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_wraps_both_ways() {
        assert_eq!(Charset::Station.at(0), 'a');
        assert_eq!(Charset::Station.at(-1), ' ');
        assert_eq!(Charset::Station.at(27), 'a');
        assert_eq!(Charset::Keyboard.at(0), 'a');
    }
}
