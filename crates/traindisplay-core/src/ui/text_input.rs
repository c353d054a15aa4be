use crate::{display::Canvas, display::CHAR_WIDTH, text::tail_chars};

/// `label` followed by the tail of `text` and an underscore cursor.
pub fn draw_text_input<C: Canvas + ?Sized>(
    canvas: &mut C,
    label: &str,
    text: &str,
    y: i32,
    max_chars: usize,
) {
    let x = 2;
    canvas.draw_text(x, y, label, 1, false);

    let mut cursor_x = x + (label.chars().count() as i32 + 1) * CHAR_WIDTH;
    let shown = tail_chars(text, max_chars);
    canvas.draw_text(cursor_x, y, shown, 1, false);
    cursor_x += shown.chars().count() as i32 * CHAR_WIDTH;
    canvas.draw_text(cursor_x, y, "_", 1, false);
}
