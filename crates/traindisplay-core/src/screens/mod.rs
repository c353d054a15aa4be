//! The eight screens and the contract the state machine drives them through.

mod context;
mod edit;
mod error;
mod main_screen;
mod menu;
mod password;
mod select;
mod settings;
mod wifi_scan;

pub use context::{
    Ctx, EditTarget, Handoff, IoOutcome, IoRequest, NetModel, RequestStatus,
};
pub use edit::PresetEditScreen;
pub use error::ErrorScreen;
pub use main_screen::MainScreen;
pub use menu::MenuScreen;
pub use password::WifiPasswordScreen;
pub use select::PresetSelectScreen;
pub use settings::SettingsScreen;
pub use wifi_scan::WifiScanScreen;

use crate::{
    config::NOTICE_DISPLAY_MS,
    display::Canvas,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AppState {
    #[default]
    Main,
    Menu,
    Settings,
    WifiScan,
    WifiPassword,
    PresetSelect,
    PresetEdit,
    Error,
}

/// Output flags every screen carries.
#[derive(Clone, Copy, Debug, Default)]
pub struct Signals {
    next: Option<AppState>,
    redraw: bool,
}

impl Signals {
    pub fn request_state(&mut self, state: AppState) {
        self.next = Some(state);
    }

    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

pub trait Screen {
    fn enter(&mut self, ctx: &mut Ctx<'_>);

    fn exit(&mut self, _ctx: &mut Ctx<'_>) {}

    /// Runs once per loop before input is delivered.
    fn tick(&mut self, _ctx: &mut Ctx<'_>) {}

    fn on_encoder(&mut self, delta: i32, ctx: &mut Ctx<'_>);

    fn on_short(&mut self, ctx: &mut Ctx<'_>);

    fn on_long(&mut self, ctx: &mut Ctx<'_>);

    /// Composes a full frame; the caller pushes it with `show`.
    fn draw(&mut self, ctx: &Ctx<'_>, canvas: &mut dyn Canvas);

    fn signals(&mut self) -> &mut Signals;

    fn requested_state(&mut self) -> Option<AppState> {
        self.signals().next.take()
    }

    fn needs_redraw(&mut self) -> bool {
        core::mem::take(&mut self.signals().redraw)
    }
}

/// Short-lived message drawn over a screen.
#[derive(Clone, Copy, Debug, Default)]
pub struct Notice {
    text: &'static str,
    until_ms: u64,
}

impl Notice {
    pub fn show(&mut self, text: &'static str, now_ms: u64) {
        self.text = text;
        self.until_ms = now_ms + NOTICE_DISPLAY_MS;
    }

    pub fn is_visible(&self) -> bool {
        !self.text.is_empty()
    }

    /// Hides an expired notice; true when that changed the frame.
    pub fn expire(&mut self, now_ms: u64) -> bool {
        if self.is_visible() && now_ms >= self.until_ms {
            self.text = "";
            return true;
        }
        false
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        if !self.is_visible() {
            return;
        }
        canvas.fill_rect(6, 24, 116, 20, false);
        canvas.draw_rect(6, 24, 116, 20);
        canvas.draw_centered_text(self.text, 30, 1, false);
    }
}

/// Every screen, addressable by state.
#[derive(Default)]
pub struct ScreenRegistry {
    main: MainScreen,
    menu: MenuScreen,
    settings: SettingsScreen,
    wifi_scan: WifiScanScreen,
    wifi_password: WifiPasswordScreen,
    preset_select: PresetSelectScreen,
    preset_edit: PresetEditScreen,
    error: ErrorScreen,
}

impl ScreenRegistry {
    pub fn get_mut(&mut self, state: AppState) -> &mut dyn Screen {
        match state {
            AppState::Main => &mut self.main,
            AppState::Menu => &mut self.menu,
            AppState::Settings => &mut self.settings,
            AppState::WifiScan => &mut self.wifi_scan,
            AppState::WifiPassword => &mut self.wifi_password,
            AppState::PresetSelect => &mut self.preset_select,
            AppState::PresetEdit => &mut self.preset_edit,
            AppState::Error => &mut self.error,
        }
    }
}
