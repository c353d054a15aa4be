//! Preset management: pick, edit, toggle, delete and create.

use core::fmt::Write as _;

use heapless::{String, Vec};
use log::{info, warn};

use crate::{
    config::{BLUE_ZONE_Y, MAX_PRESETS},
    display::Canvas,
    preset::{PresetError, PresetType},
    text::{ellipsize, head_chars},
    ui::{MenuList, ModalDialog, TitleBarExtra, draw_title_bar, wrap_index},
};

use super::{AppState, Ctx, EditTarget, Notice, Screen, Signals};

const LIST_LABEL_CHARS: usize = 18;
const ADD_LABEL: &str = "+ Add New";
const BACK_LABEL: &str = "< Back";
const TYPE_ITEMS: [&str; 5] = ["Train", "Clock", "Weather", "Calendar", "Cancel"];
const CONFIRM_BUTTONS: [&str; 2] = ["Cancel", "Delete"];

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Mode {
    #[default]
    List,
    Action,
    Type,
    DeleteConfirm,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Action {
    Select,
    Edit,
    Toggle,
    Delete,
    Cancel,
}

impl Action {
    const ALL: [Self; 5] = [Self::Select, Self::Edit, Self::Toggle, Self::Delete, Self::Cancel];
}

#[derive(Default)]
pub struct PresetSelectScreen {
    signals: Signals,
    mode: Mode,
    list: MenuList,
    actions: MenuList,
    types: MenuList,
    confirm: ModalDialog,
    target: usize,
    notice: Notice,
}

impl PresetSelectScreen {
    fn list_len(ctx: &Ctx<'_>) -> usize {
        ctx.presets.len() + 2
    }

    fn persist(ctx: &mut Ctx<'_>) {
        if let Err(err) = ctx.presets.save_all(&mut *ctx.store) {
            warn!("preset-select: save failed: {:?}", err);
        }
    }

    fn open_list(&mut self, ctx: &Ctx<'_>) {
        self.mode = Mode::List;
        let last_preset = ctx.presets.len().saturating_sub(1);
        self.list.set_selected(self.target.min(last_preset));
    }

    fn on_list_short(&mut self, ctx: &mut Ctx<'_>) {
        let selected = self.list.selected();
        let count = ctx.presets.len();
        if selected < count {
            self.target = selected;
            self.mode = Mode::Action;
            self.actions.set_selected(0);
        } else if selected == count {
            if ctx.presets.is_full() {
                self.notice.show("List is full", ctx.now_ms);
            } else {
                self.mode = Mode::Type;
                self.types.set_selected(0);
            }
        } else {
            self.signals.request_state(AppState::Menu);
        }
    }

    fn on_action_short(&mut self, ctx: &mut Ctx<'_>) {
        let action = Action::ALL[self.actions.selected().min(Action::ALL.len() - 1)];
        match action {
            Action::Select => {
                ctx.presets.set_current(self.target);
                info!("preset-select: current={}", self.target);
                self.signals.request_state(AppState::Main);
            }
            Action::Edit => {
                ctx.handoff.edit = Some(EditTarget::Existing {
                    index: self.target,
                    return_to: AppState::PresetSelect,
                });
                self.signals.request_state(AppState::PresetEdit);
            }
            Action::Toggle => {
                let enabled = ctx.presets.get(self.target).is_some_and(|p| p.enabled);
                if ctx.presets.set_enabled(self.target, !enabled).is_ok() {
                    Self::persist(ctx);
                }
                self.open_list(ctx);
            }
            Action::Delete => {
                self.mode = Mode::DeleteConfirm;
                self.confirm.reset();
            }
            Action::Cancel => self.open_list(ctx),
        }
    }

    fn on_type_short(&mut self, ctx: &mut Ctx<'_>) {
        let selected = self.types.selected();
        match PresetType::ALL.get(selected) {
            Some(kind) => {
                ctx.handoff.edit = Some(EditTarget::Create {
                    kind: *kind,
                    return_to: AppState::PresetSelect,
                });
                self.signals.request_state(AppState::PresetEdit);
            }
            None => self.open_list(ctx),
        }
    }

    fn on_confirm_short(&mut self, ctx: &mut Ctx<'_>) {
        if self.confirm.selected() == 1 {
            match ctx.presets.delete(self.target) {
                Ok(()) => {
                    info!("preset-select: deleted {}", self.target);
                    Self::persist(ctx);
                }
                Err(PresetError::LastPreset) => {
                    self.notice.show("Can't delete last", ctx.now_ms);
                }
                Err(err) => warn!("preset-select: delete failed: {:?}", err),
            }
        }
        self.open_list(ctx);
    }

    fn list_rows(ctx: &Ctx<'_>) -> Vec<String<24>, { MAX_PRESETS + 2 }> {
        let mut rows = Vec::new();
        let current = ctx.presets.current_index();
        for (index, preset) in ctx.presets.iter().enumerate() {
            let marker = if index == current {
                '*'
            } else if !preset.enabled {
                '-'
            } else {
                ' '
            };
            let mut row: String<24> = String::new();
            let _ = row.push(marker);
            let label: String<24> = ellipsize(&preset.label(), LIST_LABEL_CHARS);
            let _ = row.push_str(&label);
            let _ = rows.push(row);
        }
        let _ = rows.push(crate::text::bounded(ADD_LABEL));
        let _ = rows.push(crate::text::bounded(BACK_LABEL));
        rows
    }
}

impl Screen for PresetSelectScreen {
    fn enter(&mut self, ctx: &mut Ctx<'_>) {
        self.target = ctx.presets.current_index();
        self.notice = Notice::default();
        self.open_list(ctx);
    }

    fn tick(&mut self, ctx: &mut Ctx<'_>) {
        if self.notice.expire(ctx.now_ms) {
            self.signals.request_redraw();
        }
    }

    fn on_encoder(&mut self, delta: i32, ctx: &mut Ctx<'_>) {
        match self.mode {
            Mode::List => {
                let next = wrap_index(self.list.selected(), delta, Self::list_len(ctx));
                self.list.set_selected(next);
            }
            Mode::Action => {
                let next = wrap_index(self.actions.selected(), delta, Action::ALL.len());
                self.actions.set_selected(next);
            }
            Mode::Type => {
                let next = wrap_index(self.types.selected(), delta, TYPE_ITEMS.len());
                self.types.set_selected(next);
            }
            Mode::DeleteConfirm => self.confirm.move_by(delta, CONFIRM_BUTTONS.len()),
        }
    }

    fn on_short(&mut self, ctx: &mut Ctx<'_>) {
        match self.mode {
            Mode::List => self.on_list_short(ctx),
            Mode::Action => self.on_action_short(ctx),
            Mode::Type => self.on_type_short(ctx),
            Mode::DeleteConfirm => self.on_confirm_short(ctx),
        }
    }

    fn on_long(&mut self, ctx: &mut Ctx<'_>) {
        match self.mode {
            Mode::List => self.signals.request_state(AppState::Menu),
            _ => self.open_list(ctx),
        }
    }

    fn draw(&mut self, ctx: &Ctx<'_>, canvas: &mut dyn Canvas) {
        canvas.clear();
        let target_name = ctx
            .presets
            .get(self.target)
            .map(|preset| preset.label())
            .unwrap_or_default();

        match self.mode {
            Mode::List => {
                draw_title_bar(canvas, "Presets", TitleBarExtra::None);
                let rows = Self::list_rows(ctx);
                self.list.draw(canvas, &rows, BLUE_ZONE_Y + 2);
            }
            Mode::Action => {
                let title: String<24> = ellipsize(&target_name, 20);
                draw_title_bar(canvas, &title, TitleBarExtra::None);
                let enabled = ctx.presets.get(self.target).is_some_and(|p| p.enabled);
                let toggle = if enabled { "Disable" } else { "Enable" };
                let items = ["Select", "Edit", toggle, "Delete", "Cancel"];
                self.actions.draw(canvas, &items, BLUE_ZONE_Y + 2);
            }
            Mode::Type => {
                draw_title_bar(canvas, "New Preset", TitleBarExtra::None);
                self.types.draw(canvas, &TYPE_ITEMS, BLUE_ZONE_Y + 2);
            }
            Mode::DeleteConfirm => {
                let mut line: String<32> = String::new();
                let _ = write!(line, "{}?", head_chars(&target_name, 18));
                self.confirm
                    .draw(canvas, "Delete preset", &[line.as_str()], &CONFIRM_BUTTONS);
            }
        }

        self.notice.draw(canvas);
    }

    fn signals(&mut self) -> &mut Signals {
        &mut self.signals
    }
}
