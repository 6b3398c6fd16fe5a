use gloo_storage::{LocalStorage, Storage};
use venue_map_shared::KeyValueStore;

/// `localStorage`-backed store. Reads and writes are no-ops when the browser
/// denies storage (private mode, disabled cookies).
pub struct BrowserStore {
    storage: Option<web_sys::Storage>,
}

impl BrowserStore {
    pub fn detect() -> Self {
        let available = web_sys::window()
            .and_then(|window| window.local_storage().ok())
            .flatten()
            .is_some();
        let storage = available.then(LocalStorage::raw);
        if storage.is_none() {
            tracing::debug!("local storage unavailable, feed cache disabled");
        }
        Self { storage }
    }
}

impl KeyValueStore for BrowserStore {
    fn get_text(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set_text(&self, key: &str, value: &str) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };
        if let Err(error) = storage.set_item(key, value) {
            tracing::warn!(key, ?error, "failed to write local storage");
        }
    }
}
