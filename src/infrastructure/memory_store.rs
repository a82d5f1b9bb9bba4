// In-memory key-value store, used when persistence is disabled and in tests
use crate::application::key_value_store::KeyValueStore;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.insert(key, value);
        store
    }

    fn insert(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.insert(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}
