//! Password entry for the network picked on the scan screen.

use core::fmt::Write as _;

use heapless::String;
use log::{info, warn};

use crate::{
    config::{BLUE_ZONE_Y, PASSWORD_CHARS, SSID_CHARS, TEXT_INPUT_VISIBLE_CHARS},
    display::Canvas,
    settings,
    text::{head_chars, tail_chars},
    ui::{
        Charset, ModalDialog, TitleBarExtra, draw_carousel, draw_text_input, draw_title_bar,
        modal::draw_buttons,
    },
    wifi::Credentials,
};

use super::{AppState, Ctx, IoRequest, RequestStatus, Screen, Signals};

const BUTTONS: [&str; 4] = ["Del", "Save", "Edit", "Exit"];
const BUTTON_DEL: usize = 0;
const BUTTON_SAVE: usize = 1;
const BUTTON_EDIT: usize = 2;
const SSID_TITLE_CHARS: usize = 15;

#[derive(Default)]
pub struct WifiPasswordScreen {
    signals: Signals,
    ssid: String<SSID_CHARS>,
    password: String<PASSWORD_CHARS>,
    char_index: usize,
    modal_open: bool,
    modal: ModalDialog,
    connecting: bool,
}

impl WifiPasswordScreen {
    fn execute_modal(&mut self, ctx: &mut Ctx<'_>) {
        match self.modal.selected() {
            BUTTON_DEL => {
                self.password.pop();
            }
            BUTTON_SAVE => {
                info!("wifi-password: connecting to {}", self.ssid);
                self.connecting = true;
                ctx.post(IoRequest::Connect(Credentials {
                    ssid: self.ssid.clone(),
                    password: self.password.clone(),
                }));
            }
            BUTTON_EDIT => self.modal_open = false,
            _ => self.signals.request_state(AppState::WifiScan),
        }
    }

    fn finish_connect(&mut self, connected: bool, ctx: &mut Ctx<'_>) {
        self.connecting = false;
        if !connected {
            self.signals.request_state(AppState::Error);
            return;
        }

        let credentials = Credentials {
            ssid: self.ssid.clone(),
            password: self.password.clone(),
        };
        if let Err(err) = settings::save_wifi_credentials(&mut *ctx.store, &credentials) {
            warn!("wifi-password: saving credentials failed: {:?}", err);
        }
        self.signals.request_state(AppState::Main);
    }
}

impl Screen for WifiPasswordScreen {
    fn enter(&mut self, ctx: &mut Ctx<'_>) {
        self.ssid = ctx.handoff.selected_ssid.clone().unwrap_or_default();
        self.password.clear();
        self.char_index = 0;
        self.modal_open = false;
        self.modal.reset();
        self.connecting = false;
    }

    fn exit(&mut self, ctx: &mut Ctx<'_>) {
        ctx.handoff.selected_ssid = None;
    }

    fn tick(&mut self, ctx: &mut Ctx<'_>) {
        if !self.connecting {
            return;
        }
        if let Some(connected) = ctx.net.connect.take_finished() {
            self.finish_connect(connected, ctx);
        }
    }

    fn on_encoder(&mut self, delta: i32, _ctx: &mut Ctx<'_>) {
        if self.connecting {
            return;
        }
        if self.modal_open {
            self.modal.move_by(delta, BUTTONS.len());
        } else {
            self.char_index = crate::ui::wrap_index(self.char_index, delta, Charset::Keyboard.len());
        }
    }

    fn on_short(&mut self, ctx: &mut Ctx<'_>) {
        if self.connecting {
            return;
        }
        if self.modal_open {
            self.execute_modal(ctx);
        } else {
            let _ = self.password.push(Charset::Keyboard.at(self.char_index as i32));
        }
    }

    fn on_long(&mut self, _ctx: &mut Ctx<'_>) {
        if self.connecting {
            return;
        }
        self.modal_open = !self.modal_open;
        if self.modal_open {
            self.modal.reset();
        }
    }

    fn draw(&mut self, ctx: &Ctx<'_>, canvas: &mut dyn Canvas) {
        canvas.clear();

        if self.connecting || ctx.net.connect == RequestStatus::Pending {
            draw_title_bar(canvas, "Connect to", TitleBarExtra::None);
            canvas.draw_text(4, BLUE_ZONE_Y + 2, head_chars(&self.ssid, SSID_TITLE_CHARS), 1, false);
            canvas.draw_centered_text("Connecting...", 36, 1, false);
            return;
        }

        if self.modal_open {
            draw_title_bar(canvas, "Connect to", TitleBarExtra::None);
            canvas.draw_text(4, BLUE_ZONE_Y + 2, head_chars(&self.ssid, SSID_TITLE_CHARS), 1, false);

            let mut line: String<32> = String::new();
            let _ = write!(line, "Pass: {}", tail_chars(&self.password, 14));
            canvas.draw_text(4, BLUE_ZONE_Y + 12, &line, 1, false);

            let separator_y = 46;
            canvas.draw_line(3, separator_y, 125, separator_y, true);
            draw_buttons(canvas, &BUTTONS, self.modal.selected());
            return;
        }

        draw_title_bar(canvas, head_chars(&self.ssid, SSID_TITLE_CHARS), TitleBarExtra::None);
        draw_text_input(canvas, "Pass:", &self.password, 20, TEXT_INPUT_VISIBLE_CHARS);
        canvas.draw_text(2, 32, "Select character:", 1, false);
        draw_carousel(canvas, Charset::Keyboard, self.char_index, 42);
    }

    fn signals(&mut self) -> &mut Signals {
        &mut self.signals
    }
}
