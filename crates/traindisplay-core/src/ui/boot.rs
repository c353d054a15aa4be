//! Full-screen notices shown before the state machine starts.

use super::{draw_progress_bar, icons};
use crate::{
    config::{FIRMWARE_VERSION, SPLASH_MS},
    display::Canvas,
};

const CONNECTED_HOLD_MS: u64 = 1_500;
const FAILED_HOLD_MS: u64 = 2_000;
const SPLASH_BAR: (i32, i32, i32, i32) = (24, 59, 80, 5);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BootNotice {
    Splash,
    Connecting,
    Connected,
    ConnectFailed,
}

impl BootNotice {
    /// How long the notice stays up before boot continues.
    pub const fn hold_ms(self) -> u64 {
        match self {
            Self::Splash => SPLASH_MS,
            Self::Connecting => 0,
            Self::Connected => CONNECTED_HOLD_MS,
            Self::ConnectFailed => FAILED_HOLD_MS,
        }
    }

    /// Clears the panel, draws the notice and shows it.
    pub fn draw<C: Canvas + ?Sized>(self, canvas: &mut C) {
        canvas.clear();
        match self {
            Self::Splash => {
                canvas.draw_centered_text("Swiss", 15, 2, false);
                canvas.draw_centered_text("Train Display", 35, 1, false);
                canvas.draw_centered_text(FIRMWARE_VERSION, 50, 1, false);
            }
            Self::Connecting => canvas.draw_centered_text("Connecting WiFi...", 28, 1, false),
            Self::Connected => {
                icons::draw_check(canvas, 64, 18, true);
                canvas.draw_centered_text("WiFi Connected!", 28, 1, false);
            }
            Self::ConnectFailed => {
                icons::draw_warning(canvas, 64, 8, true);
                canvas.draw_centered_text("WiFi Failed", 20, 1, false);
                canvas.draw_centered_text("Check settings", 35, 1, false);
            }
        }
        canvas.show();
    }

    /// Redraws the bar under the splash text; `done` of `total` steps.
    pub fn draw_splash_progress<C: Canvas + ?Sized>(canvas: &mut C, done: u32, total: u32) {
        let (x, y, w, h) = SPLASH_BAR;
        canvas.fill_rect(x, y, w, h, false);
        draw_progress_bar(canvas, x, y, w, h, done, total);
        canvas.show();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct TextLog {
        texts: Vec<(i32, String)>,
        shows: u32,
    }

    impl Canvas for TextLog {
        fn clear(&mut self) {
            self.texts.clear();
        }
        fn draw_text(&mut self, _x: i32, y: i32, text: &str, _size: u8, _inverted: bool) {
            self.texts.push((y, text.into()));
        }
        fn draw_rect(&mut self, _x: i32, _y: i32, _w: i32, _h: i32) {}
        fn fill_rect(&mut self, _x: i32, _y: i32, _w: i32, _h: i32, _on: bool) {}
        fn draw_circle(&mut self, _cx: i32, _cy: i32, _r: i32, _on: bool) {}
        fn fill_circle(&mut self, _cx: i32, _cy: i32, _r: i32, _on: bool) {}
        fn draw_line(&mut self, _x0: i32, _y0: i32, _x1: i32, _y1: i32, _on: bool) {}
        fn show(&mut self) {
            self.shows += 1;
        }
    }

    #[test]
    fn splash_lists_name_and_version() {
        let mut log = TextLog::default();
        BootNotice::Splash.draw(&mut log);

        let lines: Vec<&str> = log.texts.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(lines, ["Swiss", "Train Display", "v2.0"]);
        assert_eq!(log.shows, 1);
        assert_eq!(BootNotice::Splash.hold_ms(), 2_000);
    }

    #[test]
    fn failed_connect_points_at_settings() {
        let mut log = TextLog::default();
        BootNotice::Connecting.draw(&mut log);
        BootNotice::ConnectFailed.draw(&mut log);

        assert_eq!(
            log.texts,
            [(20, "WiFi Failed".to_string()), (35, "Check settings".to_string())]
        );
        assert_eq!(BootNotice::ConnectFailed.hold_ms(), 2_000);
    }
}
