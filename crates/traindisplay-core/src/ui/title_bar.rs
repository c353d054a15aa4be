use crate::{
    clock::LocalTime,
    config::{SCREEN_WIDTH, TITLE_BAR_PADDING, YELLOW_ZONE_HEIGHT, YELLOW_ZONE_Y},
    display::Canvas,
};

const WIFI_DOT_X: i32 = 120;
const WIFI_DOT_Y: i32 = 8;
const WIFI_DOT_R: i32 = 3;

/// What the right end of the bar shows.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TitleBarExtra {
    None,
    /// Connectivity dot: filled when connected.
    Wifi { connected: bool },
    /// `HH:MM`, skipped while the clock is unsynced.
    Clock(Option<LocalTime>),
}

/// Lit yellow zone with the title in dark pixels.
pub fn draw_title_bar<C: Canvas + ?Sized>(canvas: &mut C, title: &str, extra: TitleBarExtra) {
    canvas.fill_rect(0, YELLOW_ZONE_Y, SCREEN_WIDTH, YELLOW_ZONE_HEIGHT, true);
    canvas.draw_text(TITLE_BAR_PADDING, TITLE_BAR_PADDING, title, 1, true);

    match extra {
        TitleBarExtra::None | TitleBarExtra::Clock(None) => {}
        TitleBarExtra::Wifi { connected: true } => {
            canvas.fill_circle(WIFI_DOT_X, WIFI_DOT_Y, WIFI_DOT_R, false);
        }
        TitleBarExtra::Wifi { connected: false } => {
            canvas.draw_circle(WIFI_DOT_X, WIFI_DOT_Y, WIFI_DOT_R, false);
        }
        TitleBarExtra::Clock(Some(time)) => {
            canvas.draw_right_aligned_text(&time.hhmm(), TITLE_BAR_PADDING, 1, true);
        }
    }
}
