//! Network picker. Entering starts a scan; the list ends with Refresh and
//! Back rows.

use heapless::{String, Vec};
use log::info;

use crate::{
    config::{BLUE_ZONE_Y, SSID_CHARS, WIFI_SCAN_MAX_NETWORKS},
    display::Canvas,
    ui::{MenuList, TitleBarExtra, draw_title_bar, wrap_index},
};

use super::{AppState, Ctx, IoRequest, RequestStatus, Screen, Signals};

const REFRESH_LABEL: &str = "Refresh";
const BACK_LABEL: &str = "< Back";

#[derive(Default)]
pub struct WifiScanScreen {
    signals: Signals,
    list: MenuList,
}

impl WifiScanScreen {
    fn start_scan(&mut self, ctx: &mut Ctx<'_>) {
        info!("wifi-scan: scanning");
        self.list.set_selected(0);
        ctx.net.networks.clear();
        ctx.post(IoRequest::Scan);
    }

    fn row_count(ctx: &Ctx<'_>) -> usize {
        ctx.net.networks.len() + 2
    }
}

impl Screen for WifiScanScreen {
    fn enter(&mut self, ctx: &mut Ctx<'_>) {
        self.start_scan(ctx);
    }

    fn tick(&mut self, ctx: &mut Ctx<'_>) {
        match ctx.net.scan.take_finished() {
            Some(true) => {
                info!("wifi-scan: {} networks", ctx.net.networks.len());
                self.signals.request_redraw();
            }
            Some(false) => self.signals.request_state(AppState::Error),
            None => {}
        }
    }

    fn on_encoder(&mut self, delta: i32, ctx: &mut Ctx<'_>) {
        if ctx.net.scan == RequestStatus::Pending {
            return;
        }
        let next = wrap_index(self.list.selected(), delta, Self::row_count(ctx));
        self.list.set_selected(next);
    }

    fn on_short(&mut self, ctx: &mut Ctx<'_>) {
        if ctx.net.scan == RequestStatus::Pending {
            return;
        }

        let selected = self.list.selected();
        let networks = ctx.net.networks.len();
        if let Some(network) = ctx.net.networks.get(selected) {
            info!("wifi-scan: picked {}", network.ssid);
            ctx.handoff.selected_ssid = Some(network.ssid.clone());
            self.signals.request_state(AppState::WifiPassword);
        } else if selected == networks {
            self.start_scan(ctx);
        } else {
            self.signals.request_state(AppState::Settings);
        }
    }

    fn on_long(&mut self, _ctx: &mut Ctx<'_>) {
        self.signals.request_state(AppState::Settings);
    }

    fn draw(&mut self, ctx: &Ctx<'_>, canvas: &mut dyn Canvas) {
        canvas.clear();
        draw_title_bar(
            canvas,
            "WiFi Networks",
            TitleBarExtra::Wifi {
                connected: ctx.is_connected(),
            },
        );

        if ctx.net.scan == RequestStatus::Pending {
            canvas.draw_centered_text("Scanning...", 30, 1, false);
            return;
        }

        let mut rows: Vec<String<SSID_CHARS>, { WIFI_SCAN_MAX_NETWORKS + 2 }> = Vec::new();
        for network in &ctx.net.networks {
            let _ = rows.push(network.ssid.clone());
        }
        let _ = rows.push(crate::text::bounded(REFRESH_LABEL));
        let _ = rows.push(crate::text::bounded(BACK_LABEL));
        self.list.draw(canvas, &rows, BLUE_ZONE_Y + 2);

        if ctx.net.networks.is_empty() {
            canvas.draw_centered_text("No networks found", 44, 1, false);
        }
    }

    fn signals(&mut self) -> &mut Signals {
        &mut self.signals
    }
}
