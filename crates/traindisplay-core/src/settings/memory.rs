use super::{KeyValueStore, KvImage, StorageError, Value};

/// RAM-only store used by tests and as the volatile fallback when flash is
/// unavailable.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    image: KvImage,
    commits: u32,
    fail_writes: bool,
}

impl MemoryStore {
    pub const fn new() -> Self {
        Self {
            image: KvImage::new(),
            commits: 0,
            fail_writes: false,
        }
    }

    /// Makes every following `put` and `commit` fail with `Backend`.
    pub fn set_fail_writes(&mut self, fail_writes: bool) {
        self.fail_writes = fail_writes;
    }

    /// Successful commits so far.
    pub fn commits(&self) -> u32 {
        self.commits
    }

    pub fn image(&self) -> &KvImage {
        &self.image
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<&Value> {
        self.image.get(key)
    }

    fn put(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Backend);
        }
        self.image.put(key, value).map(|_| ())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Backend);
        }
        self.image.remove(key);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Backend);
        }
        self.commits = self.commits.saturating_add(1);
        Ok(())
    }
}
