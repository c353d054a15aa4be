use traindisplay_core::settings::{KeyValueStore, MemoryStore, StorageError, Value};
use traindisplay_hal_esp32s3::storage::nvs_store::NvsStore;

/// Flash when the settings sector is reachable, RAM otherwise.
pub(super) enum BoardStore {
    Flash(NvsStore),
    Volatile(MemoryStore),
}

impl BoardStore {
    pub(super) fn is_volatile(&self) -> bool {
        matches!(self, Self::Volatile(_))
    }
}

impl KeyValueStore for BoardStore {
    fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Flash(store) => store.get(key),
            Self::Volatile(store) => store.get(key),
        }
    }

    fn put(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        match self {
            Self::Flash(store) => store.put(key, value),
            Self::Volatile(store) => store.put(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match self {
            Self::Flash(store) => store.remove(key),
            Self::Volatile(store) => store.remove(key),
        }
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        match self {
            Self::Flash(store) => store.commit(),
            Self::Volatile(store) => store.commit(),
        }
    }
}
