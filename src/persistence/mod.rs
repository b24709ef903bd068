//! Key-value persistence
//!
//! Features:
//! - `KeyValueStore` trait over string keys/values
//! - LocalStorage backend (wasm32) and in-memory backend (native, tests)
//! - JSON load/save helpers that fall back to defaults on absent or malformed data

#[cfg(target_arch = "wasm32")]
pub mod local_storage;

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorage;

/// Durable string key-value storage
pub trait KeyValueStore {
    /// Read a value, `None` when absent or unavailable
    fn get_item(&self, key: &str) -> Option<String>;
    /// Write a value, returns false if the backend rejected it
    fn set_item(&mut self, key: &str, value: &str) -> bool;
}

/// In-memory store (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> bool {
        self.items.insert(key.to_string(), value.to_string());
        true
    }
}

/// Best available store for the current platform
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn KeyValueStore> {
    match LocalStorage::open() {
        Some(storage) => Box::new(storage),
        None => {
            log::warn!("LocalStorage unavailable - records will not persist");
            Box::new(MemoryStore::new())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn KeyValueStore> {
    Box::new(MemoryStore::new())
}

/// Load a JSON value, falling back to `T::default()` when absent or malformed
pub fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(json) = store.get_item(key) else {
        log::info!("No stored value for '{}', using defaults", key);
        return T::default();
    };

    match serde_json::from_str(&json) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Malformed value for '{}' ({}), using defaults", key, e);
            T::default()
        }
    }
}

/// Save a value as JSON, returns whether the write went through
pub fn save_json<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => {
            let saved = store.set_item(key, &json);
            if !saved {
                log::warn!("Failed to write '{}'", key);
            }
            saved
        }
        Err(e) => {
            log::warn!("Failed to serialize '{}': {}", key, e);
            false
        }
    }
}
