use log::info;

use crate::{
    display::Canvas,
    config::BLUE_ZONE_Y,
    ui::{MenuList, TitleBarExtra, draw_title_bar, wrap_index},
};

use super::{AppState, Ctx, Screen, Signals};

const ITEMS: [&str; 4] = ["Settings", "Presets", "Refresh", "< Back"];

#[derive(Default)]
pub struct MenuScreen {
    signals: Signals,
    list: MenuList,
}

impl Screen for MenuScreen {
    fn enter(&mut self, _ctx: &mut Ctx<'_>) {
        self.list.set_selected(0);
    }

    fn on_encoder(&mut self, delta: i32, _ctx: &mut Ctx<'_>) {
        let next = wrap_index(self.list.selected(), delta, ITEMS.len());
        self.list.set_selected(next);
    }

    fn on_short(&mut self, ctx: &mut Ctx<'_>) {
        match self.list.selected() {
            0 => self.signals.request_state(AppState::Settings),
            1 => self.signals.request_state(AppState::PresetSelect),
            2 => {
                if ctx.refresh_current() {
                    info!("menu: refresh requested");
                }
                self.signals.request_state(AppState::Main);
            }
            _ => self.signals.request_state(AppState::Main),
        }
    }

    fn on_long(&mut self, _ctx: &mut Ctx<'_>) {
        self.signals.request_state(AppState::Main);
    }

    fn draw(&mut self, ctx: &Ctx<'_>, canvas: &mut dyn Canvas) {
        canvas.clear();
        draw_title_bar(canvas, "MAIN MENU", TitleBarExtra::Clock(ctx.local_time));
        self.list.draw(canvas, &ITEMS, BLUE_ZONE_Y + 2);
    }

    fn signals(&mut self) -> &mut Signals {
        &mut self.signals
    }
}
