//! Persisted key/value settings: presets, credentials and the current index.
//!
//! Keys follow the `trainDisplay` namespace layout: `ssid`, `password`,
//! `presetCount`, `currentPreset` and `preset_<i>_<field>` per entry.

mod image;
mod memory;

pub use image::{KvEntry, KvImage, KEY_CHARS, MAX_ENTRIES, VALUE_CHARS, Value};
pub use memory::MemoryStore;

use core::fmt::Write as _;

use heapless::String;

use crate::{
    config::{
        PREFS_CURRENT_PRESET, PREFS_PRESET_COUNT, PREFS_PRESET_PREFIX, PREFS_WIFI_PASSWORD,
        PREFS_WIFI_SSID,
    },
    preset::{Preset, PresetType},
    text::bounded,
    wifi::Credentials,
};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StorageError {
    /// No room for another key.
    Full,
    KeyTooLong,
    ValueTooLong,
    /// The backing medium rejected a read or write.
    Backend,
    Corrupted,
}

/// Typed key/value backend.
///
/// Reads come from memory; `commit` makes pending writes durable.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<&Value>;
    fn put(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    fn commit(&mut self) -> Result<(), StorageError>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(Value::Str(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    fn get_i32(&self, key: &str, default: i32) -> i32 {
        match self.get(key) {
            Some(Value::I32(value)) => *value,
            _ => default,
        }
    }

    fn get_u8(&self, key: &str, default: u8) -> u8 {
        match self.get(key) {
            Some(Value::U8(value)) => *value,
            _ => default,
        }
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(Value::Bool(value)) => *value,
            _ => default,
        }
    }

    fn put_str(&mut self, key: &str, text: &str) -> Result<(), StorageError> {
        let mut value = String::new();
        value.push_str(text).map_err(|_| StorageError::ValueTooLong)?;
        self.put(key, Value::Str(value))
    }

    fn put_i32(&mut self, key: &str, value: i32) -> Result<(), StorageError> {
        self.put(key, Value::I32(value))
    }

    fn put_u8(&mut self, key: &str, value: u8) -> Result<(), StorageError> {
        self.put(key, Value::U8(value))
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), StorageError> {
        self.put(key, Value::Bool(value))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PresetField {
    Name,
    Type,
    From,
    To,
    Enabled,
    Trains,
}

impl PresetField {
    const ALL: [Self; 6] = [
        Self::Name,
        Self::Type,
        Self::From,
        Self::To,
        Self::Enabled,
        Self::Trains,
    ];

    const fn suffix(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Type => "type",
            Self::From => "from",
            Self::To => "to",
            Self::Enabled => "enabled",
            Self::Trains => "trains",
        }
    }
}

/// `preset_<index>_<field>`.
pub fn preset_key(index: usize, field: PresetField) -> String<KEY_CHARS> {
    let mut key = String::new();
    let _ = write!(key, "{}{}_{}", PREFS_PRESET_PREFIX, index, field.suffix());
    key
}

/// Stored credentials, present only when the SSID is non-empty.
pub fn load_wifi_credentials<S: KeyValueStore + ?Sized>(store: &S) -> Option<Credentials> {
    let ssid = store.get_str(PREFS_WIFI_SSID).unwrap_or("");
    if ssid.is_empty() {
        return None;
    }
    let password = store.get_str(PREFS_WIFI_PASSWORD).unwrap_or("");
    Some(Credentials::new(ssid, password))
}

pub fn save_wifi_credentials<S: KeyValueStore + ?Sized>(
    store: &mut S,
    credentials: &Credentials,
) -> Result<(), StorageError> {
    store.put_str(PREFS_WIFI_SSID, &credentials.ssid)?;
    store.put_str(PREFS_WIFI_PASSWORD, &credentials.password)?;
    store.commit()
}

pub fn clear_wifi_credentials<S: KeyValueStore + ?Sized>(
    store: &mut S,
) -> Result<(), StorageError> {
    store.remove(PREFS_WIFI_SSID)?;
    store.remove(PREFS_WIFI_PASSWORD)?;
    store.commit()
}

pub fn load_preset_count<S: KeyValueStore + ?Sized>(store: &S) -> usize {
    store.get_i32(PREFS_PRESET_COUNT, 0).max(0) as usize
}

pub fn save_preset_count<S: KeyValueStore + ?Sized>(
    store: &mut S,
    count: usize,
) -> Result<(), StorageError> {
    store.put_i32(PREFS_PRESET_COUNT, count as i32)
}

pub fn load_current_index<S: KeyValueStore + ?Sized>(store: &S) -> usize {
    store.get_i32(PREFS_CURRENT_PRESET, 0).max(0) as usize
}

pub fn save_current_index<S: KeyValueStore + ?Sized>(
    store: &mut S,
    index: usize,
) -> Result<(), StorageError> {
    store.put_i32(PREFS_CURRENT_PRESET, index as i32)
}

/// Loads entry `index`; absent when no name key was ever written.
///
/// Missing fields fall back to a TRAIN preset that is enabled and shows one
/// train, so records written before `trains` existed stay readable.
pub fn load_preset<S: KeyValueStore + ?Sized>(store: &S, index: usize) -> Option<Preset> {
    let name = store.get_str(&preset_key(index, PresetField::Name))?;
    let kind = PresetType::from_raw(store.get_i32(&preset_key(index, PresetField::Type), 0));
    let from = store
        .get_str(&preset_key(index, PresetField::From))
        .unwrap_or("");
    let to = store.get_str(&preset_key(index, PresetField::To)).unwrap_or("");

    Some(Preset {
        name: bounded(name),
        kind,
        from: bounded(from),
        to: bounded(to),
        enabled: store.get_bool(&preset_key(index, PresetField::Enabled), true),
        trains_to_display: Preset::clamp_trains(
            store.get_u8(&preset_key(index, PresetField::Trains), 1),
        ),
    })
}

pub fn save_preset<S: KeyValueStore + ?Sized>(
    store: &mut S,
    index: usize,
    preset: &Preset,
) -> Result<(), StorageError> {
    store.put_str(&preset_key(index, PresetField::Name), &preset.name)?;
    store.put_i32(&preset_key(index, PresetField::Type), preset.kind as i32)?;
    store.put_str(&preset_key(index, PresetField::From), &preset.from)?;
    store.put_str(&preset_key(index, PresetField::To), &preset.to)?;
    store.put_bool(&preset_key(index, PresetField::Enabled), preset.enabled)?;
    store.put_u8(
        &preset_key(index, PresetField::Trains),
        preset.trains_to_display,
    )
}

pub fn remove_preset<S: KeyValueStore + ?Sized>(
    store: &mut S,
    index: usize,
) -> Result<(), StorageError> {
    for field in PresetField::ALL {
        store.remove(&preset_key(index, field))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_keys_follow_namespace_layout() {
        assert_eq!(preset_key(0, PresetField::Name).as_str(), "preset_0_name");
        assert_eq!(
            preset_key(11, PresetField::Enabled).as_str(),
            "preset_11_enabled"
        );
    }

    #[test]
    fn preset_round_trips_through_store() {
        let mut store = MemoryStore::new();
        let preset = Preset::train("Commute", "Lausanne", "Bern", 3);

        save_preset(&mut store, 2, &preset).unwrap();
        assert_eq!(load_preset(&store, 2), Some(preset));
        assert_eq!(load_preset(&store, 3), None);
    }

    #[test]
    fn missing_trains_key_defaults_to_one() {
        let mut store = MemoryStore::new();
        save_preset(&mut store, 0, &Preset::train("Old", "Lausanne", "Geneve", 4)).unwrap();
        store
            .remove(&preset_key(0, PresetField::Trains))
            .unwrap();

        let loaded = load_preset(&store, 0).unwrap();
        assert_eq!(loaded.trains_to_display, 1);
        assert!(loaded.enabled);
    }

    #[test]
    fn credentials_need_a_non_empty_ssid() {
        let mut store = MemoryStore::new();
        assert_eq!(load_wifi_credentials(&store), None);

        store.put_str(PREFS_WIFI_SSID, "").unwrap();
        assert_eq!(load_wifi_credentials(&store), None);

        save_wifi_credentials(&mut store, &Credentials::new("home", "pass1234")).unwrap();
        let loaded = load_wifi_credentials(&store).unwrap();
        assert_eq!(loaded.ssid.as_str(), "home");
        assert_eq!(loaded.password.as_str(), "pass1234");

        clear_wifi_credentials(&mut store).unwrap();
        assert_eq!(load_wifi_credentials(&store), None);
    }

    #[test]
    fn typed_reads_ignore_mismatched_values() {
        let mut store = MemoryStore::new();
        store.put_bool(PREFS_PRESET_COUNT, true).unwrap();
        assert_eq!(load_preset_count(&store), 0);
    }
}
