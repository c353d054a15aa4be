use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use super::StorageError;

pub const KEY_CHARS: usize = 24;
pub const VALUE_CHARS: usize = 64;
/// Four global keys plus six per preset.
pub const MAX_ENTRIES: usize = 4 + 6 * crate::config::MAX_PRESETS + 4;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Str(String<VALUE_CHARS>),
    I32(i32),
    U8(u8),
    Bool(bool),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KvEntry {
    pub key: String<KEY_CHARS>,
    pub value: Value,
}

/// Ordered in-memory namespace image, serialisable as one record.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct KvImage {
    entries: Vec<KvEntry, MAX_ENTRIES>,
}

impl KvImage {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|entry| entry.key.as_str() == key)
            .map(|entry| &entry.value)
    }

    /// Inserts or replaces; returns whether the stored value changed.
    pub fn put(&mut self, key: &str, value: Value) -> Result<bool, StorageError> {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key.as_str() == key) {
            let changed = entry.value != value;
            entry.value = value;
            return Ok(changed);
        }

        let mut owned_key = String::new();
        owned_key
            .push_str(key)
            .map_err(|_| StorageError::KeyTooLong)?;
        self.entries
            .push(KvEntry {
                key: owned_key,
                value,
            })
            .map_err(|_| StorageError::Full)?;
        Ok(true)
    }

    /// Returns whether a key was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.iter().position(|entry| entry.key.as_str() == key) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &KvEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_replaces_existing_keys_in_place() {
        let mut image = KvImage::new();
        assert_eq!(image.put("presetCount", Value::I32(4)), Ok(true));
        assert_eq!(image.put("presetCount", Value::I32(4)), Ok(false));
        assert_eq!(image.put("presetCount", Value::I32(5)), Ok(true));
        assert_eq!(image.len(), 1);
        assert_eq!(image.get("presetCount"), Some(&Value::I32(5)));
    }

    #[test]
    fn oversized_keys_are_rejected() {
        let mut image = KvImage::new();
        let key = "k".repeat(KEY_CHARS + 1);
        assert_eq!(
            image.put(&key, Value::Bool(true)),
            Err(StorageError::KeyTooLong)
        );
        assert!(image.is_empty());
    }

    #[test]
    fn remove_reports_presence() {
        let mut image = KvImage::new();
        image.put("ssid", Value::Bool(false)).unwrap();
        assert!(image.remove("ssid"));
        assert!(!image.remove("ssid"));
    }
}
