//! Small line-art status icons centred on `(x, y)`.

use crate::display::Canvas;

/// Diagonal cross.
pub fn draw_error<C: Canvas + ?Sized>(canvas: &mut C, x: i32, y: i32, on: bool) {
    canvas.draw_line(x - 3, y - 3, x + 3, y + 3, on);
    canvas.draw_line(x + 3, y - 3, x - 3, y + 3, on);
}

pub fn draw_warning<C: Canvas + ?Sized>(canvas: &mut C, x: i32, y: i32, on: bool) {
    canvas.draw_line(x, y - 4, x - 4, y + 4, on);
    canvas.draw_line(x, y - 4, x + 4, y + 4, on);
    canvas.draw_line(x - 4, y + 4, x + 4, y + 4, on);
    canvas.draw_line(x, y - 2, x, y, on);
}

pub fn draw_check<C: Canvas + ?Sized>(canvas: &mut C, x: i32, y: i32, on: bool) {
    canvas.draw_line(x - 3, y, x - 1, y + 2, on);
    canvas.draw_line(x - 1, y + 2, x + 3, y - 2, on);
}
