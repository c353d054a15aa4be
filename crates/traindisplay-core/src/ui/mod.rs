//! Reusable widgets drawn on a [`Canvas`](crate::display::Canvas).

pub mod boot;
pub mod carousel;
pub mod icons;
pub mod menu_list;
pub mod modal;
pub mod progress;
pub mod text_input;
pub mod title_bar;

pub use boot::BootNotice;
pub use carousel::{draw_carousel, Charset};
pub use menu_list::MenuList;
pub use modal::ModalDialog;
pub use progress::draw_progress_bar;
pub use text_input::draw_text_input;
pub use title_bar::{draw_title_bar, TitleBarExtra};

/// Wraps `index + delta` into `0..len`.
pub fn wrap_index(index: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as i64 + delta as i64).rem_euclid(len as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_index_handles_both_directions() {
        assert_eq!(wrap_index(0, -1, 4), 3);
        assert_eq!(wrap_index(3, 1, 4), 0);
        assert_eq!(wrap_index(1, 9, 4), 2);
        assert_eq!(wrap_index(0, 5, 0), 0);
    }
}
