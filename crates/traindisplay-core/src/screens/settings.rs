use crate::{
    config::BLUE_ZONE_Y,
    display::Canvas,
    ui::{MenuList, TitleBarExtra, draw_title_bar, wrap_index},
};

use super::{AppState, Ctx, Screen, Signals};

const ITEMS: [&str; 2] = ["WiFi Setup", "< Back"];

#[derive(Default)]
pub struct SettingsScreen {
    signals: Signals,
    list: MenuList,
}

impl Screen for SettingsScreen {
    fn enter(&mut self, _ctx: &mut Ctx<'_>) {
        self.list.set_selected(0);
    }

    fn on_encoder(&mut self, delta: i32, _ctx: &mut Ctx<'_>) {
        let next = wrap_index(self.list.selected(), delta, ITEMS.len());
        self.list.set_selected(next);
    }

    fn on_short(&mut self, _ctx: &mut Ctx<'_>) {
        let next = if self.list.selected() == 0 {
            AppState::WifiScan
        } else {
            AppState::Menu
        };
        self.signals.request_state(next);
    }

    fn on_long(&mut self, _ctx: &mut Ctx<'_>) {
        self.signals.request_state(AppState::Menu);
    }

    fn draw(&mut self, ctx: &Ctx<'_>, canvas: &mut dyn Canvas) {
        canvas.clear();
        draw_title_bar(canvas, "SETTINGS", TitleBarExtra::Clock(ctx.local_time));
        self.list.draw(canvas, &ITEMS, BLUE_ZONE_Y + 2);
    }

    fn signals(&mut self) -> &mut Signals {
        &mut self.signals
    }
}
