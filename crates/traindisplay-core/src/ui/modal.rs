//! Full-screen dialog with a row of buttons.

use crate::{
    config::{SCREEN_HEIGHT, SCREEN_WIDTH},
    display::Canvas,
};

use super::wrap_index;

const CONTENT_Y: i32 = 16;
const LINE_HEIGHT: i32 = 10;
const SEPARATOR_Y: i32 = SCREEN_HEIGHT - 18;
const BUTTON_Y: i32 = SCREEN_HEIGHT - 12;
const BUTTON_AREA: i32 = SCREEN_WIDTH - 10;

/// Button cursor; the labels are supplied at draw time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ModalDialog {
    selected: usize,
}

impl ModalDialog {
    pub const fn new() -> Self {
        Self { selected: 0 }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn reset(&mut self) {
        self.selected = 0;
    }

    pub fn move_by(&mut self, delta: i32, button_count: usize) {
        self.selected = wrap_index(self.selected, delta, button_count);
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, title: &str, lines: &[&str], buttons: &[&str]) {
        canvas.clear();
        canvas.draw_rect(1, 1, SCREEN_WIDTH - 2, SCREEN_HEIGHT - 2);
        canvas.draw_text(4, 5, title, 1, false);
        for (row, line) in lines.iter().take(3).enumerate() {
            canvas.draw_text(4, CONTENT_Y + row as i32 * LINE_HEIGHT, line, 1, false);
        }
        canvas.draw_line(3, SEPARATOR_Y, SCREEN_WIDTH - 3, SEPARATOR_Y, true);
        draw_buttons(canvas, buttons, self.selected);
    }
}

/// Left edge and width of each button for `count` buttons.
pub fn button_layout(count: usize, index: usize) -> (i32, i32) {
    let count = count.max(1) as i32;
    let width = if count <= 2 { 40 } else { 24 };
    let spacing = ((BUTTON_AREA - count * width) / (count + 1)).max(2);
    (5 + spacing + index as i32 * (width + spacing), width)
}

/// Bottom button row shared by every dialog.
pub fn draw_buttons<C: Canvas + ?Sized>(canvas: &mut C, buttons: &[&str], selected: usize) {
    for (index, label) in buttons.iter().enumerate() {
        let (x, width) = button_layout(buttons.len(), index);
        let inverted = index == selected;
        if inverted {
            canvas.fill_rect(x, BUTTON_Y - 2, width, 10, true);
        }
        canvas.draw_text(x + 2, BUTTON_Y, label, 1, inverted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_buttons_are_wide() {
        assert_eq!(button_layout(2, 0), (5 + 12, 40));
        assert_eq!(button_layout(2, 1), (5 + 12 + 52, 40));
    }

    #[test]
    fn four_buttons_are_narrow() {
        // (118 - 96) / 5 = 4
        assert_eq!(button_layout(4, 0), (9, 24));
        assert_eq!(button_layout(4, 3), (9 + 3 * 28, 24));
    }

    #[test]
    fn selection_wraps() {
        let mut modal = ModalDialog::new();
        modal.move_by(-1, 3);
        assert_eq!(modal.selected(), 2);
        modal.move_by(1, 3);
        assert_eq!(modal.selected(), 0);
    }
}
