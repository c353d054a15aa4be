//! Preset model and the repository that owns the ordered preset list.

use core::fmt::Write as _;

use heapless::{String, Vec};
use log::{debug, info, warn};

use crate::{
    config::{MAX_PRESETS, MAX_TRAINS, PRESET_NAME_CHARS, STATION_NAME_CHARS},
    settings::{self, KeyValueStore, StorageError},
    text::bounded,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PresetType {
    #[default]
    Train = 0,
    Clock = 1,
    Weather = 2,
    Calendar = 3,
}

impl PresetType {
    pub const ALL: [Self; 4] = [Self::Train, Self::Clock, Self::Weather, Self::Calendar];

    /// Unknown raw values read back as `Train`.
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Clock,
            2 => Self::Weather,
            3 => Self::Calendar,
            _ => Self::Train,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Train => "Train",
            Self::Clock => "Clock",
            Self::Weather => "Weather",
            Self::Calendar => "Calendar",
        }
    }
}

/// Room for two full station names around the arrow.
pub const PRESET_TITLE_CHARS: usize = 2 * STATION_NAME_CHARS + 4;

pub type PresetTitle = String<PRESET_TITLE_CHARS>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PresetError {
    EmptyName,
    MissingStations,
    InvalidTrainCount,
    IndexOutOfRange,
    LastPreset,
    Full,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Preset {
    pub name: String<PRESET_NAME_CHARS>,
    pub kind: PresetType,
    pub from: String<STATION_NAME_CHARS>,
    pub to: String<STATION_NAME_CHARS>,
    pub enabled: bool,
    pub trains_to_display: u8,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: PresetType::Train,
            from: String::new(),
            to: String::new(),
            enabled: true,
            trains_to_display: 1,
        }
    }
}

impl Preset {
    pub fn train(name: &str, from: &str, to: &str, trains_to_display: u8) -> Self {
        Self {
            name: bounded(name),
            kind: PresetType::Train,
            from: bounded(from),
            to: bounded(to),
            enabled: true,
            trains_to_display: Self::clamp_trains(trains_to_display),
        }
    }

    pub fn clock(name: &str) -> Self {
        Self {
            name: bounded(name),
            kind: PresetType::Clock,
            ..Self::default()
        }
    }

    /// Starting point of the create flow for `kind`.
    pub fn blank(kind: PresetType) -> Self {
        let name = match kind {
            PresetType::Train => "",
            other => other.label(),
        };
        Self {
            name: bounded(name),
            kind,
            ..Self::default()
        }
    }

    pub const fn clamp_trains(value: u8) -> u8 {
        if value < 1 {
            1
        } else if value > MAX_TRAINS {
            MAX_TRAINS
        } else {
            value
        }
    }

    pub fn is_train(&self) -> bool {
        self.kind == PresetType::Train
    }

    /// TRAIN needs both stations and may be unnamed; every other type needs a name.
    pub fn validate(&self) -> Result<(), PresetError> {
        if !(1..=MAX_TRAINS).contains(&self.trains_to_display) {
            return Err(PresetError::InvalidTrainCount);
        }

        match self.kind {
            PresetType::Train => {
                if self.from.trim().is_empty() || self.to.trim().is_empty() {
                    return Err(PresetError::MissingStations);
                }
            }
            _ => {
                if self.name.trim().is_empty() {
                    return Err(PresetError::EmptyName);
                }
            }
        }
        Ok(())
    }

    /// "From -> To" for trains, the name otherwise.
    pub fn title(&self) -> PresetTitle {
        let mut out = String::new();
        if self.is_train() {
            let _ = write!(out, "{} -> {}", self.from, self.to);
        } else {
            let _ = out.push_str(&self.name);
        }
        out
    }

    /// List label: the name, or the route when a train preset is unnamed.
    pub fn label(&self) -> PresetTitle {
        if self.name.is_empty() && self.is_train() {
            self.title()
        } else {
            bounded(&self.name)
        }
    }
}

/// Built-in presets seeded on first boot.
pub fn default_presets() -> Vec<Preset, MAX_PRESETS> {
    let mut presets = Vec::new();
    let _ = presets.push(Preset::train("Lausanne-Geneva", "Lausanne", "Geneve", 1));
    let _ = presets.push(Preset::train("Lausanne-Bern", "Lausanne", "Bern", 1));
    let _ = presets.push(Preset::train("Lausanne-Zurich", "Lausanne", "Zurich", 1));
    let _ = presets.push(Preset::clock("Clock"));
    presets
}

/// Ordered presets, the current cursor and a dirty marker for unsaved edits.
#[derive(Debug, Default, Clone)]
pub struct PresetRepository {
    entries: Vec<Preset, MAX_PRESETS>,
    current: usize,
    dirty: bool,
    persisted_count: usize,
}

impl PresetRepository {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            current: 0,
            dirty: false,
            persisted_count: 0,
        }
    }

    /// Reads every stored preset, seeding and saving the defaults when none exist.
    pub fn load_all<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<(), StorageError> {
        self.entries.clear();
        let count = settings::load_preset_count(store).min(MAX_PRESETS);

        for index in 0..count {
            match settings::load_preset(store, index) {
                Some(preset) => {
                    let _ = self.entries.push(preset);
                }
                None => warn!("presets: entry {} missing; skipped", index),
            }
        }
        self.persisted_count = count;

        if self.entries.is_empty() {
            info!("presets: none stored; seeding defaults");
            return self.initialize_defaults(store);
        }

        self.current = settings::load_current_index(store);
        if self.current >= self.entries.len() {
            self.current = 0;
        }
        self.dirty = false;
        info!(
            "presets: loaded count={} current={}",
            self.entries.len(),
            self.current
        );
        Ok(())
    }

    pub fn initialize_defaults<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<(), StorageError> {
        self.entries = default_presets();
        self.current = 0;
        self.dirty = true;
        self.save_all(store)
    }

    /// Writes the count, every entry and the current index, then commits.
    ///
    /// On failure the in-memory list is kept and stays dirty for the next save.
    pub fn save_all<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<(), StorageError> {
        let result = self.write_all(store);
        match result {
            Ok(()) => {
                self.dirty = false;
                self.persisted_count = self.entries.len();
                debug!("presets: saved count={}", self.entries.len());
            }
            Err(err) => {
                self.dirty = true;
                warn!("presets: save failed: {:?}", err);
            }
        }
        result
    }

    fn write_all<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        settings::save_preset_count(store, self.entries.len())?;
        for (index, preset) in self.entries.iter().enumerate() {
            settings::save_preset(store, index, preset)?;
        }
        settings::save_current_index(store, self.current)?;
        for stale in self.entries.len()..self.persisted_count {
            settings::remove_preset(store, stale)?;
        }
        store.commit()
    }

    pub fn add(&mut self, preset: Preset) -> Result<usize, PresetError> {
        preset.validate()?;
        self.entries.push(preset).map_err(|_| PresetError::Full)?;
        self.dirty = true;
        Ok(self.entries.len() - 1)
    }

    pub fn update(&mut self, index: usize, preset: Preset) -> Result<(), PresetError> {
        preset.validate()?;
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(PresetError::IndexOutOfRange)?;
        *slot = preset;
        self.dirty = true;
        Ok(())
    }

    /// Removes `index`; the last remaining preset can never be deleted.
    pub fn delete(&mut self, index: usize) -> Result<(), PresetError> {
        if self.entries.len() <= 1 {
            return Err(PresetError::LastPreset);
        }
        if index >= self.entries.len() {
            return Err(PresetError::IndexOutOfRange);
        }

        self.entries.remove(index);
        if self.current > index || self.current >= self.entries.len() {
            self.current = self.current.saturating_sub(1);
        }
        self.dirty = true;
        Ok(())
    }

    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> Result<(), PresetError> {
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(PresetError::IndexOutOfRange)?;
        if slot.enabled != enabled {
            slot.enabled = enabled;
            self.dirty = true;
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.entries.get(index)
    }

    pub fn current(&self) -> Option<&Preset> {
        self.entries.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn set_current(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        if self.current != index {
            self.current = index;
            self.dirty = true;
        }
        true
    }

    pub fn next(&mut self) {
        if !self.entries.is_empty() {
            self.set_current((self.current + 1) % self.entries.len());
        }
    }

    pub fn prev(&mut self) {
        if !self.entries.is_empty() {
            let len = self.entries.len();
            self.set_current((self.current + len - 1) % len);
        }
    }

    /// Moves to the next enabled preset, or plain `next` when all are disabled.
    pub fn next_enabled(&mut self) {
        let len = self.entries.len();
        let found = (1..=len)
            .map(|step| (self.current + step) % len)
            .find(|index| self.entries[*index].enabled);
        match found {
            Some(index) => {
                self.set_current(index);
            }
            None => self.next(),
        }
    }

    pub fn prev_enabled(&mut self) {
        let len = self.entries.len();
        let found = (1..=len)
            .map(|step| (self.current + len * step - step) % len)
            .find(|index| self.entries[*index].enabled);
        match found {
            Some(index) => {
                self.set_current(index);
            }
            None => self.prev(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemoryStore;

    fn seeded() -> (PresetRepository, MemoryStore) {
        let mut store = MemoryStore::new();
        let mut repo = PresetRepository::new();
        repo.load_all(&mut store).unwrap();
        (repo, store)
    }

    #[test]
    fn title_keeps_both_stations_at_full_length() {
        let from = "abcdefghijklmnopqrstuvwxyzabcdef";
        let to = "zyxwvutsrqponmlkjihgfedcbazyxwvu";
        let preset = Preset::train("", from, to, 1);

        let title = preset.title();
        assert!(title.ends_with(to));
        assert_eq!(title.len(), 2 * STATION_NAME_CHARS + 4);
        assert_eq!(preset.label(), title);
    }

    #[test]
    fn empty_store_seeds_four_defaults_and_saves() {
        let (repo, store) = seeded();

        assert_eq!(repo.len(), 4);
        assert_eq!(repo.current_index(), 0);
        assert_eq!(repo.current().unwrap().from.as_str(), "Lausanne");
        assert_eq!(repo.current().unwrap().to.as_str(), "Geneve");
        assert_eq!(repo.get(3).unwrap().kind, PresetType::Clock);
        assert!(!repo.is_dirty());
        assert_eq!(settings::load_preset_count(&store), 4);
    }

    #[test]
    fn current_index_round_trips_through_reload() {
        let (mut repo, mut store) = seeded();
        assert!(repo.set_current(2));
        repo.save_all(&mut store).unwrap();

        let mut reloaded = PresetRepository::new();
        reloaded.load_all(&mut store).unwrap();
        assert_eq!(reloaded.current_index(), 2);
    }

    #[test]
    fn out_of_range_current_index_resets_to_zero() {
        let (_, mut store) = seeded();
        settings::save_current_index(&mut store, 9).unwrap();

        let mut reloaded = PresetRepository::new();
        reloaded.load_all(&mut store).unwrap();
        assert_eq!(reloaded.current_index(), 0);
    }

    #[test]
    fn next_and_prev_wrap() {
        let (mut repo, _) = seeded();
        repo.prev();
        assert_eq!(repo.current_index(), 3);
        repo.next();
        assert_eq!(repo.current_index(), 0);
    }

    #[test]
    fn enabled_navigation_skips_disabled_entries() {
        let (mut repo, _) = seeded();
        repo.set_enabled(1, false).unwrap();
        repo.set_enabled(2, false).unwrap();

        repo.next_enabled();
        assert_eq!(repo.current_index(), 3);
        repo.prev_enabled();
        assert_eq!(repo.current_index(), 0);
        repo.prev_enabled();
        assert_eq!(repo.current_index(), 3);
    }

    #[test]
    fn all_disabled_falls_back_to_plain_next() {
        let (mut repo, _) = seeded();
        for index in 0..repo.len() {
            repo.set_enabled(index, false).unwrap();
        }
        repo.next_enabled();
        assert_eq!(repo.current_index(), 1);
        repo.prev_enabled();
        assert_eq!(repo.current_index(), 0);
    }

    #[test]
    fn deleting_the_last_preset_is_refused() {
        let mut store = MemoryStore::new();
        let mut repo = PresetRepository::new();
        repo.load_all(&mut store).unwrap();
        while repo.len() > 1 {
            repo.delete(0).unwrap();
        }

        let before = repo.get(0).cloned();
        assert_eq!(repo.delete(0), Err(PresetError::LastPreset));
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get(0).cloned(), before);
    }

    #[test]
    fn deleting_current_clamps_cursor() {
        let (mut repo, _) = seeded();
        repo.set_current(3);
        repo.delete(3).unwrap();
        assert_eq!(repo.current_index(), 2);

        repo.set_current(1);
        repo.delete(0).unwrap();
        assert_eq!(repo.current_index(), 0);
        assert_eq!(repo.current().unwrap().to.as_str(), "Bern");
    }

    #[test]
    fn shrinking_the_list_removes_stale_keys() {
        let (mut repo, mut store) = seeded();
        repo.delete(3).unwrap();
        repo.save_all(&mut store).unwrap();

        assert_eq!(settings::load_preset_count(&store), 3);
        assert_eq!(settings::load_preset(&store, 3), None);
    }

    #[test]
    fn validation_rules_depend_on_type() {
        assert_eq!(
            Preset::train("", "Lausanne", "", 1).validate(),
            Err(PresetError::MissingStations)
        );
        assert!(Preset::train("", "Lausanne", "Bern", 1).validate().is_ok());
        assert_eq!(Preset::clock("").validate(), Err(PresetError::EmptyName));

        let mut bad = Preset::clock("Clock");
        bad.trains_to_display = 5;
        assert_eq!(bad.validate(), Err(PresetError::InvalidTrainCount));
    }

    #[test]
    fn add_rejects_invalid_presets() {
        let (mut repo, _) = seeded();
        assert_eq!(
            repo.add(Preset::train("x", "", "", 1)),
            Err(PresetError::MissingStations)
        );
        assert_eq!(repo.add(Preset::clock("Desk")), Ok(4));
        assert!(repo.is_dirty());
    }

    #[test]
    fn failed_save_keeps_memory_and_dirty_flag() {
        let (mut repo, mut store) = seeded();
        repo.add(Preset::clock("Desk")).unwrap();
        store.set_fail_writes(true);

        assert_eq!(repo.save_all(&mut store), Err(StorageError::Backend));
        assert!(repo.is_dirty());
        assert_eq!(repo.len(), 5);

        store.set_fail_writes(false);
        repo.save_all(&mut store).unwrap();
        assert!(!repo.is_dirty());
        assert_eq!(settings::load_preset_count(&store), 5);
    }

    #[test]
    fn every_field_survives_save_and_load() {
        let (mut repo, mut store) = seeded();
        let mut preset = Preset::train("", "Fribourg", "Olten", 4);
        preset.enabled = false;
        let index = repo.add(preset.clone()).unwrap();
        repo.save_all(&mut store).unwrap();

        let mut reloaded = PresetRepository::new();
        reloaded.load_all(&mut store).unwrap();
        assert_eq!(reloaded.get(index), Some(&preset));
    }
}
