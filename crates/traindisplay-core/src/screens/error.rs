//! Modal error report with auto-dismiss.

use log::warn;

use crate::{
    config::ERROR_DISPLAY_MS,
    display::Canvas,
    error::ErrorInfo,
    text::head_chars,
    ui::{TitleBarExtra, draw_title_bar, icons},
};

use super::{AppState, Ctx, Screen, Signals};

const DETAIL_CHARS: usize = 20;

#[derive(Default)]
pub struct ErrorScreen {
    signals: Signals,
    info: ErrorInfo,
    shown_at_ms: u64,
}

impl Screen for ErrorScreen {
    fn enter(&mut self, ctx: &mut Ctx<'_>) {
        self.info = core::mem::take(&mut ctx.handoff.last_error);
        self.shown_at_ms = ctx.now_ms;
        warn!(
            "error: {:?} {} ({})",
            self.info.kind, self.info.message, self.info.detail
        );
    }

    fn tick(&mut self, ctx: &mut Ctx<'_>) {
        if ctx.now_ms.saturating_sub(self.shown_at_ms) >= ERROR_DISPLAY_MS {
            self.signals.request_state(AppState::Main);
        }
    }

    fn on_encoder(&mut self, _delta: i32, _ctx: &mut Ctx<'_>) {}

    fn on_short(&mut self, _ctx: &mut Ctx<'_>) {
        self.signals.request_state(AppState::Main);
    }

    fn on_long(&mut self, _ctx: &mut Ctx<'_>) {
        self.signals.request_state(AppState::Main);
    }

    fn draw(&mut self, _ctx: &Ctx<'_>, canvas: &mut dyn Canvas) {
        canvas.clear();
        draw_title_bar(canvas, self.info.kind.title(), TitleBarExtra::None);
        icons::draw_error(canvas, 115, 8, false);

        canvas.draw_text(4, 20, &self.info.message, 1, false);
        if !self.info.detail.is_empty() {
            canvas.draw_text(4, 32, head_chars(&self.info.detail, DETAIL_CHARS), 1, false);
        }
        canvas.draw_text(4, 50, "Press any button", 1, false);
    }

    fn signals(&mut self) -> &mut Signals {
        &mut self.signals
    }
}
