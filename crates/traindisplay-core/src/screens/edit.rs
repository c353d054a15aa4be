//! Preset editor: a field list, a character carousel per text field and a
//! small modal to delete, accept or revert the field being typed.

use core::fmt::Write as _;

use heapless::{String, Vec};
use log::{info, warn};

use crate::{
    config::{BLUE_ZONE_Y, STATION_NAME_CHARS, TEXT_INPUT_VISIBLE_CHARS},
    display::Canvas,
    preset::{Preset, PresetError},
    text::{bounded, head_chars, station_char, tail_chars},
    ui::{
        Charset, MenuList, ModalDialog, TitleBarExtra, draw_carousel, draw_text_input,
        draw_title_bar, wrap_index,
    },
};

use super::{AppState, Ctx, EditTarget, Notice, Screen, Signals};

const MODAL_BUTTONS: [&str; 3] = ["Del", "Done", "Cancel"];
const MODAL_DEL: usize = 0;
const MODAL_DONE: usize = 1;
const FIELD_PREVIEW_CHARS: usize = 10;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Field {
    Name,
    From,
    To,
    Trains,
    Save,
    Cancel,
}

impl Field {
    fn charset(self) -> Charset {
        match self {
            Self::From | Self::To => Charset::Station,
            _ => Charset::Keyboard,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Name => "Name:",
            Self::From => "From:",
            Self::To => "To:",
            Self::Trains => "Trains:",
            Self::Save => "Save",
            Self::Cancel => "Cancel",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Mode {
    #[default]
    Fields,
    Entry,
    Modal,
}

pub struct PresetEditScreen {
    signals: Signals,
    target: EditTarget,
    buffer: Preset,
    mode: Mode,
    fields: MenuList,
    field: Field,
    char_index: usize,
    /// Field text before the current entry session, restored on Cancel.
    backup: String<STATION_NAME_CHARS>,
    modal: ModalDialog,
    notice: Notice,
}

impl Default for PresetEditScreen {
    fn default() -> Self {
        Self {
            signals: Signals::default(),
            target: EditTarget::Existing {
                index: 0,
                return_to: AppState::Main,
            },
            buffer: Preset::default(),
            mode: Mode::Fields,
            fields: MenuList::new(),
            field: Field::Name,
            char_index: 0,
            backup: String::new(),
            modal: ModalDialog::new(),
            notice: Notice::default(),
        }
    }
}

impl PresetEditScreen {
    fn is_create(&self) -> bool {
        matches!(self.target, EditTarget::Create { .. })
    }

    fn return_to(&self) -> AppState {
        match self.target {
            EditTarget::Existing { return_to, .. } | EditTarget::Create { return_to, .. } => {
                return_to
            }
        }
    }

    fn visible_fields(&self) -> Vec<Field, 6> {
        let mut fields = Vec::new();
        let _ = fields.push(Field::Name);
        if self.buffer.is_train() {
            let _ = fields.push(Field::From);
            let _ = fields.push(Field::To);
            let _ = fields.push(Field::Trains);
        }
        let _ = fields.push(Field::Save);
        if self.is_create() {
            let _ = fields.push(Field::Cancel);
        }
        fields
    }

    fn field_text(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.buffer.name,
            Field::From => &self.buffer.from,
            Field::To => &self.buffer.to,
            _ => "",
        }
    }

    fn push_char(&mut self, ch: char) {
        let _ = match self.field {
            Field::Name => self.buffer.name.push(ch),
            Field::From => self.buffer.from.push(station_char(self.buffer.from.is_empty(), ch)),
            Field::To => self.buffer.to.push(station_char(self.buffer.to.is_empty(), ch)),
            _ => Ok(()),
        };
    }

    fn pop_char(&mut self) {
        match self.field {
            Field::Name => {
                self.buffer.name.pop();
            }
            Field::From => {
                self.buffer.from.pop();
            }
            Field::To => {
                self.buffer.to.pop();
            }
            _ => {}
        }
    }

    fn restore_backup(&mut self) {
        match self.field {
            Field::Name => self.buffer.name = bounded(&self.backup),
            Field::From => self.buffer.from = bounded(&self.backup),
            Field::To => self.buffer.to = bounded(&self.backup),
            _ => {}
        }
    }

    fn start_entry(&mut self, field: Field) {
        self.field = field;
        self.backup = bounded(self.field_text(field));
        self.char_index = 0;
        self.mode = Mode::Entry;
    }

    fn save(&mut self, ctx: &mut Ctx<'_>) {
        let result = match self.target {
            EditTarget::Create { .. } => ctx.presets.add(self.buffer.clone()).map(|index| {
                info!("preset-edit: added preset {}", index);
            }),
            EditTarget::Existing { index, .. } => ctx.presets.update(index, self.buffer.clone()),
        };

        match result {
            Ok(()) => {
                if let Err(err) = ctx.presets.save_all(&mut *ctx.store) {
                    warn!("preset-edit: save failed: {:?}", err);
                }
                let next = if self.is_create() {
                    AppState::PresetSelect
                } else {
                    self.return_to()
                };
                self.signals.request_state(next);
            }
            Err(err) => {
                let text = match err {
                    PresetError::EmptyName => "Name required",
                    PresetError::MissingStations => "Set From and To",
                    PresetError::Full => "List is full",
                    _ => "Invalid preset",
                };
                self.notice.show(text, ctx.now_ms);
            }
        }
    }

    fn on_field_short(&mut self, ctx: &mut Ctx<'_>) {
        let fields = self.visible_fields();
        let Some(field) = fields.get(self.fields.selected()).copied() else {
            return;
        };

        match field {
            Field::Name | Field::From | Field::To => self.start_entry(field),
            Field::Trains => {
                self.buffer.trains_to_display = self.buffer.trains_to_display % 4 + 1;
            }
            Field::Save => self.save(ctx),
            Field::Cancel => self.signals.request_state(self.return_to()),
        }
    }

    fn on_modal_short(&mut self) {
        match self.modal.selected() {
            MODAL_DEL => self.pop_char(),
            MODAL_DONE => self.mode = Mode::Fields,
            _ => {
                self.restore_backup();
                self.mode = Mode::Fields;
            }
        }
    }

    fn field_rows(&self) -> Vec<String<24>, 6> {
        let mut rows = Vec::new();
        for field in self.visible_fields() {
            let mut row: String<24> = String::new();
            match field {
                Field::Name if self.buffer.name.is_empty() && self.buffer.is_train() => {
                    let _ = row.push_str("Name: (optional)");
                }
                Field::Name | Field::From | Field::To => {
                    let _ = write!(
                        row,
                        "{} {}",
                        field.label(),
                        head_chars(self.field_text(field), FIELD_PREVIEW_CHARS)
                    );
                }
                Field::Trains => {
                    let _ = write!(row, "Trains: {}", self.buffer.trains_to_display);
                }
                Field::Save | Field::Cancel => {
                    let _ = row.push_str(field.label());
                }
            }
            let _ = rows.push(row);
        }
        rows
    }
}

impl Screen for PresetEditScreen {
    fn enter(&mut self, ctx: &mut Ctx<'_>) {
        self.target = ctx.handoff.edit.take().unwrap_or(EditTarget::Existing {
            index: ctx.presets.current_index(),
            return_to: AppState::Main,
        });
        self.buffer = match self.target {
            EditTarget::Create { kind, .. } => Preset::blank(kind),
            EditTarget::Existing { index, .. } => {
                ctx.presets.get(index).cloned().unwrap_or_default()
            }
        };
        self.mode = Mode::Fields;
        self.fields.set_selected(0);
        self.field = Field::Name;
        self.modal.reset();
        self.notice = Notice::default();
        info!("preset-edit: enter {:?}", self.target);
    }

    fn tick(&mut self, ctx: &mut Ctx<'_>) {
        if self.notice.expire(ctx.now_ms) {
            self.signals.request_redraw();
        }
    }

    fn on_encoder(&mut self, delta: i32, _ctx: &mut Ctx<'_>) {
        match self.mode {
            Mode::Fields => {
                let count = self.visible_fields().len();
                let next = wrap_index(self.fields.selected(), delta, count);
                self.fields.set_selected(next);
            }
            Mode::Entry => {
                self.char_index = wrap_index(self.char_index, delta, self.field.charset().len());
            }
            Mode::Modal => self.modal.move_by(delta, MODAL_BUTTONS.len()),
        }
    }

    fn on_short(&mut self, ctx: &mut Ctx<'_>) {
        match self.mode {
            Mode::Fields => self.on_field_short(ctx),
            Mode::Entry => {
                let ch = self.field.charset().at(self.char_index as i32);
                self.push_char(ch);
            }
            Mode::Modal => self.on_modal_short(),
        }
    }

    fn on_long(&mut self, _ctx: &mut Ctx<'_>) {
        match self.mode {
            Mode::Fields => self.signals.request_state(self.return_to()),
            Mode::Entry => {
                self.modal.reset();
                self.mode = Mode::Modal;
            }
            Mode::Modal => self.mode = Mode::Entry,
        }
    }

    fn draw(&mut self, _ctx: &Ctx<'_>, canvas: &mut dyn Canvas) {
        canvas.clear();

        match self.mode {
            Mode::Fields => {
                let mut title: String<24> = String::new();
                if self.is_create() {
                    let _ = write!(title, "New {}", self.buffer.kind.label());
                } else {
                    let _ = title.push_str("Edit Preset");
                }
                draw_title_bar(canvas, &title, TitleBarExtra::None);
                let rows = self.field_rows();
                self.fields.draw(canvas, &rows, BLUE_ZONE_Y + 2);
            }
            Mode::Entry => {
                draw_title_bar(canvas, "Edit Field", TitleBarExtra::None);
                draw_text_input(
                    canvas,
                    self.field.label(),
                    self.field_text(self.field),
                    20,
                    TEXT_INPUT_VISIBLE_CHARS,
                );
                draw_carousel(canvas, self.field.charset(), self.char_index, 38);
            }
            Mode::Modal => {
                let mut title: String<16> = String::new();
                let _ = write!(title, "Edit {}", self.field.label().trim_end_matches(':'));
                let value = tail_chars(self.field_text(self.field), TEXT_INPUT_VISIBLE_CHARS);
                self.modal.draw(canvas, &title, &[value], &MODAL_BUTTONS);
            }
        }

        self.notice.draw(canvas);
    }

    fn signals(&mut self) -> &mut Signals {
        &mut self.signals
    }
}
