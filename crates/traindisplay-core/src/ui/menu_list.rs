//! Scrolling single-column list with a highlighted row.

use crate::{
    config::{MAX_VISIBLE_MENU_ITEMS, MENU_ITEM_HEIGHT, SCREEN_WIDTH},
    display::Canvas,
};

const SCROLL_BAR_X: i32 = 126;
const SCROLL_BAR_WIDTH: i32 = 2;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MenuList {
    selected: usize,
    scroll_offset: usize,
}

impl MenuList {
    pub const fn new() -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn set_selected(&mut self, index: usize) {
        self.selected = index;
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Moves the window so the selected row stays visible.
    pub fn update_scroll(&mut self, item_count: usize) {
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        }
        if self.selected >= self.scroll_offset + MAX_VISIBLE_MENU_ITEMS {
            self.scroll_offset = self.selected + 1 - MAX_VISIBLE_MENU_ITEMS;
        }
        let max_offset = item_count.saturating_sub(MAX_VISIBLE_MENU_ITEMS);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    pub fn draw<C, L>(&mut self, canvas: &mut C, items: &[L], y_start: i32)
    where
        C: Canvas + ?Sized,
        L: AsRef<str>,
    {
        self.update_scroll(items.len());

        let visible = items
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(MAX_VISIBLE_MENU_ITEMS);
        for (row, (index, item)) in visible.enumerate() {
            let y = y_start + row as i32 * MENU_ITEM_HEIGHT;
            if index == self.selected {
                canvas.fill_rect(0, y, SCREEN_WIDTH, MENU_ITEM_HEIGHT, true);
                canvas.draw_text(4, y + 1, ">", 1, true);
                canvas.draw_text(12, y + 1, item.as_ref(), 1, true);
            } else {
                canvas.draw_text(8, y + 1, item.as_ref(), 1, false);
            }
        }

        let count = items.len();
        if count > MAX_VISIBLE_MENU_ITEMS {
            let window = MAX_VISIBLE_MENU_ITEMS as i32 * MENU_ITEM_HEIGHT;
            let bar_height = window * MAX_VISIBLE_MENU_ITEMS as i32 / count as i32;
            let bar_y =
                y_start + self.selected as i32 * (window - bar_height) / (count as i32 - 1);
            canvas.fill_rect(SCROLL_BAR_X, bar_y, SCROLL_BAR_WIDTH, bar_height, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_follows_selection() {
        let mut list = MenuList::new();
        list.set_selected(6);
        list.update_scroll(8);
        assert_eq!(list.scroll_offset(), 2);

        list.set_selected(0);
        list.update_scroll(8);
        assert_eq!(list.scroll_offset(), 0);
    }

    #[test]
    fn short_lists_never_scroll() {
        let mut list = MenuList::new();
        list.set_selected(3);
        list.update_scroll(4);
        assert_eq!(list.scroll_offset(), 0);
    }
}
