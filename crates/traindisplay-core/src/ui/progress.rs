use crate::display::Canvas;

/// Outlined bar filled in proportion to `progress / total`.
pub fn draw_progress_bar<C: Canvas + ?Sized>(
    canvas: &mut C,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    progress: u32,
    total: u32,
) {
    canvas.draw_rect(x, y, width, height);
    let fill = fill_width(width, progress, total);
    if fill > 0 {
        canvas.fill_rect(x + 1, y + 1, fill, height - 2, true);
    }
}

fn fill_width(width: i32, progress: u32, total: u32) -> i32 {
    if total == 0 {
        return 0;
    }
    let inner = (width - 2).max(0) as u32;
    (progress.min(total) * inner / total) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_is_proportional_and_clamped() {
        assert_eq!(fill_width(102, 50, 100), 50);
        assert_eq!(fill_width(102, 300, 100), 100);
        assert_eq!(fill_width(102, 1, 0), 0);
    }
}
