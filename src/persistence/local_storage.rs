//! Browser LocalStorage backend

use super::KeyValueStore;

/// `window.localStorage` wrapper
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Open LocalStorage, `None` if the browser denies access
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()?;
        Some(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set_item(&mut self, key: &str, value: &str) -> bool {
        self.storage.set_item(key, value).is_ok()
    }
}
