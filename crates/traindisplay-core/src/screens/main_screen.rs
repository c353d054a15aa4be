//! Home screen: departures for the current route, the clock, or a
//! placeholder for types without a renderer yet.

use core::fmt::Write as _;

use heapless::String;
use log::debug;

use crate::{
    config::BLUE_ZONE_Y,
    display::Canvas,
    error::ErrorKind,
    preset::{Preset, PresetType},
    text::ellipsize,
    transit::{Connection, format_duration},
    ui::{TitleBarExtra, draw_title_bar},
};

use super::{AppState, Ctx, EditTarget, Screen, Signals};

const CLOCK_REDRAW_MS: u64 = 1_000;
const ROUTE_TITLE_CHARS: usize = 18;

#[derive(Default)]
pub struct MainScreen {
    signals: Signals,
    last_clock_draw_ms: Option<u64>,
    drawn_connected: bool,
    drawn_fetch_ms: u64,
}

impl Screen for MainScreen {
    fn enter(&mut self, ctx: &mut Ctx<'_>) {
        debug!("main: enter preset={}", ctx.presets.current_index());
        self.last_clock_draw_ms = None;
    }

    fn tick(&mut self, ctx: &mut Ctx<'_>) {
        // Outcome of a refresh posted from the menu or at boot.
        match ctx.net.fetch.take_finished() {
            Some(true) => self.signals.request_redraw(),
            Some(false) => {
                self.signals.request_state(AppState::Error);
                return;
            }
            None => {}
        }

        if ctx.is_connected() != self.drawn_connected
            || ctx.transit.fetched_at_ms() != self.drawn_fetch_ms
        {
            self.signals.request_redraw();
        }

        let is_clock = ctx
            .presets
            .current()
            .is_some_and(|preset| preset.kind == PresetType::Clock);
        if is_clock {
            let due = match self.last_clock_draw_ms {
                Some(last) => ctx.now_ms.saturating_sub(last) >= CLOCK_REDRAW_MS,
                None => true,
            };
            if due {
                self.signals.request_redraw();
            }
        }
    }

    fn on_encoder(&mut self, delta: i32, ctx: &mut Ctx<'_>) {
        for _ in 0..delta.unsigned_abs() {
            if delta > 0 {
                ctx.presets.next_enabled();
            } else {
                ctx.presets.prev_enabled();
            }
        }
        debug!("main: preset -> {}", ctx.presets.current_index());
    }

    fn on_short(&mut self, ctx: &mut Ctx<'_>) {
        let editable = ctx
            .presets
            .current()
            .is_some_and(|preset| preset.kind != PresetType::Clock);
        if editable {
            ctx.handoff.edit = Some(EditTarget::Existing {
                index: ctx.presets.current_index(),
                return_to: AppState::Main,
            });
            self.signals.request_state(AppState::PresetEdit);
        }
    }

    fn on_long(&mut self, _ctx: &mut Ctx<'_>) {
        self.signals.request_state(AppState::Menu);
    }

    fn draw(&mut self, ctx: &Ctx<'_>, canvas: &mut dyn Canvas) {
        canvas.clear();
        self.drawn_connected = ctx.is_connected();
        self.drawn_fetch_ms = ctx.transit.fetched_at_ms();

        let Some(preset) = ctx.presets.current() else {
            canvas.draw_centered_text("No presets", 28, 1, false);
            return;
        };

        let wifi = TitleBarExtra::Wifi {
            connected: ctx.is_connected(),
        };
        match preset.kind {
            PresetType::Train => {
                let title: String<24> = ellipsize(&preset.title(), ROUTE_TITLE_CHARS);
                draw_title_bar(canvas, &title, wifi);
                draw_departures(ctx, preset, canvas);
            }
            PresetType::Clock => {
                draw_title_bar(canvas, &preset.name, wifi);
                let text = match ctx.local_time {
                    Some(time) => time.hhmm(),
                    None => {
                        let mut placeholder = String::new();
                        let _ = placeholder.push_str("--:--");
                        placeholder
                    }
                };
                canvas.draw_centered_text(&text, 28, 3, false);
                self.last_clock_draw_ms = Some(ctx.now_ms);
            }
            PresetType::Weather => {
                draw_title_bar(canvas, &preset.name, wifi);
                canvas.draw_centered_text("Weather Mode", 28, 1, false);
                canvas.draw_centered_text("(Coming soon)", 40, 1, false);
            }
            PresetType::Calendar => {
                draw_title_bar(canvas, &preset.name, wifi);
                canvas.draw_centered_text("Calendar Mode", 28, 1, false);
                canvas.draw_centered_text("(Coming soon)", 40, 1, false);
            }
        }
    }

    fn signals(&mut self) -> &mut Signals {
        &mut self.signals
    }
}

fn draw_departures(ctx: &Ctx<'_>, preset: &Preset, canvas: &mut dyn Canvas) {
    let rows = ctx
        .transit
        .connections_for(&preset.from, &preset.to)
        .filter(|rows| !rows.is_empty());

    let Some(rows) = rows else {
        let no_connections = ctx
            .transit
            .error_for(&preset.from, &preset.to)
            .is_some_and(|error| error.kind == ErrorKind::NoConnections);
        if no_connections {
            canvas.draw_centered_text("No connections", 35, 1, false);
        } else if !ctx.is_connected() {
            canvas.draw_centered_text("No WiFi", 30, 1, false);
            canvas.draw_centered_text("Long press for menu", 42, 1, false);
        } else {
            canvas.draw_centered_text("Loading...", 35, 1, false);
        }
        return;
    };

    let shown = (preset.trains_to_display as usize).min(rows.len());
    match shown {
        1 => draw_single(&rows[0], canvas),
        2 => draw_two(&rows[..2], canvas),
        3 => draw_three(&rows[..3], canvas),
        _ => draw_grid(&rows[..shown.min(4)], canvas),
    }
}

fn delay_label(connection: &Connection, suffix: &str) -> Option<String<8>> {
    if connection.delay_min == 0 {
        return None;
    }
    let mut out = String::new();
    let _ = write!(out, "+{}{}", connection.delay_min, suffix);
    Some(out)
}

fn draw_single(connection: &Connection, canvas: &mut dyn Canvas) {
    if connection.cancelled {
        canvas.draw_centered_text("CANCELLED", 32, 2, false);
        return;
    }

    canvas.draw_text(2, 20, &connection.departure, 2, false);
    if let Some(delay) = delay_label(connection, "'") {
        canvas.draw_text(85, 24, &delay, 1, false);
    }

    let mut platform: String<16> = String::new();
    let _ = write!(platform, "Pl {}", connection.platform);
    canvas.draw_text(2, 45, &platform, 1, false);

    let mut duration: String<24> = String::new();
    let _ = write!(
        duration,
        "Duration: {}",
        format_duration(&connection.departure, &connection.arrival)
    );
    canvas.draw_text(2, 55, &duration, 1, false);
}

fn draw_two(rows: &[Connection], canvas: &mut dyn Canvas) {
    for (index, connection) in rows.iter().enumerate() {
        let y = BLUE_ZONE_Y + 2 + index as i32 * 22;
        if connection.cancelled {
            canvas.draw_text(2, y, "CANCELLED", 1, false);
            continue;
        }

        canvas.draw_text(2, y, &connection.departure, 1, false);
        if let Some(delay) = delay_label(connection, "") {
            canvas.draw_text(40, y, &delay, 1, false);
        }
        let duration = format_duration(&connection.departure, &connection.arrival);
        canvas.draw_text(60, y, &duration, 1, false);

        let mut platform: String<16> = String::new();
        let _ = write!(platform, "Pl {}", connection.platform);
        canvas.draw_text(2, y + 10, &platform, 1, false);
    }
}

fn draw_three(rows: &[Connection], canvas: &mut dyn Canvas) {
    for (index, connection) in rows.iter().enumerate() {
        let y = BLUE_ZONE_Y + 2 + index as i32 * 15;
        if connection.cancelled {
            canvas.draw_text(2, y, "CANCELLED", 1, false);
            continue;
        }

        canvas.draw_text(2, y, &connection.departure, 1, false);
        if let Some(delay) = delay_label(connection, "") {
            canvas.draw_text(40, y, &delay, 1, false);
        }
        let mut platform: String<12> = String::new();
        let _ = write!(platform, "Pl{}", connection.platform);
        canvas.draw_text(55, y, &platform, 1, false);
        let duration = format_duration(&connection.departure, &connection.arrival);
        canvas.draw_text(80, y, &duration, 1, false);
    }
}

fn draw_grid(rows: &[Connection], canvas: &mut dyn Canvas) {
    for (index, connection) in rows.iter().enumerate() {
        let x = (index % 2) as i32 * 64;
        let y = BLUE_ZONE_Y + 2 + (index / 2) as i32 * 22;
        if connection.cancelled {
            canvas.draw_text(x + 2, y, "CANC", 1, false);
            continue;
        }

        canvas.draw_text(x + 2, y, &connection.departure, 1, false);
        if let Some(delay) = delay_label(connection, "") {
            canvas.draw_text(x + 40, y, &delay, 1, false);
        }
        let mut platform: String<12> = String::new();
        let _ = write!(platform, "Pl{}", connection.platform);
        canvas.draw_text(x + 2, y + 10, &platform, 1, false);
    }
}
