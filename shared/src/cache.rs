use serde::Serialize;
use serde::de::DeserializeOwned;

/// Raw text key-value storage.
pub trait KeyValueStore {
    fn get_text(&self, key: &str) -> Option<String>;
    fn set_text(&self, key: &str, value: &str);
}

/// Store used when the environment offers no persistent storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStore;

impl KeyValueStore for NoStore {
    fn get_text(&self, _key: &str) -> Option<String> {
        None
    }

    fn set_text(&self, _key: &str, _value: &str) {}
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: std::cell::RefCell<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get_text(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set_text(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Text(String),
    Structured(serde_json::Value),
}

/// Stored text that looks like serialized data rather than a plain string.
fn looks_structured(text: &str) -> bool {
    text.contains('{') || text.trim_start().starts_with('[')
}

/// Key-value cache over a [`KeyValueStore`], serializing structured values to
/// JSON text and sniffing them back on read.
pub struct LocalCache<S> {
    store: S,
}

impl<S: KeyValueStore> LocalCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn get(&self, key: &str) -> Option<CachedValue> {
        let text = self.store.get_text(key)?;
        if !looks_structured(&text) {
            return Some(CachedValue::Text(text));
        }
        match serde_json::from_str(&text) {
            Ok(value) => Some(CachedValue::Structured(value)),
            Err(error) => {
                tracing::warn!(key, %error, "discarding unreadable cache entry");
                None
            }
        }
    }

    pub fn put(&self, key: &str, value: &CachedValue) {
        match value {
            CachedValue::Text(text) => self.store.set_text(key, text),
            CachedValue::Structured(value) => self.store.set_text(key, &value.to_string()),
        }
    }

    pub fn get_text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            CachedValue::Text(text) => Some(text),
            CachedValue::Structured(_) => None,
        }
    }

    pub fn put_text(&self, key: &str, text: &str) {
        self.store.set_text(key, text);
    }

    pub fn get_items<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        match self.get(key)? {
            CachedValue::Structured(value) => match serde_json::from_value(value) {
                Ok(items) => Some(items),
                Err(error) => {
                    tracing::warn!(key, %error, "cached items do not match their schema");
                    None
                }
            },
            CachedValue::Text(_) => None,
        }
    }

    pub fn put_items<T: Serialize>(&self, key: &str, items: &[T]) {
        match serde_json::to_string(items) {
            Ok(text) => self.store.set_text(key, &text),
            Err(error) => tracing::warn!(key, %error, "failed to serialize items for cache"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
    }

    #[test]
    fn plain_text_round_trips() {
        let cache = LocalCache::new(MemoryStore::new());
        cache.put("sessionsUpdated", &CachedValue::Text("2010-05-18".into()));
        assert_eq!(
            cache.get("sessionsUpdated"),
            Some(CachedValue::Text("2010-05-18".into()))
        );
        assert_eq!(cache.get_text("sessionsUpdated").as_deref(), Some("2010-05-18"));
    }

    #[test]
    fn structured_values_are_sniffed() {
        let cache = LocalCache::new(MemoryStore::new());
        cache.put("obj", &CachedValue::Structured(json!({ "a": 1 })));
        assert_eq!(cache.store().get_text("obj").as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(
            cache.get("obj"),
            Some(CachedValue::Structured(json!({ "a": 1 })))
        );
    }

    #[test]
    fn empty_list_reads_back_as_list() {
        let cache = LocalCache::new(MemoryStore::new());
        cache.put_items::<Item>("sandbox", &[]);
        assert_eq!(cache.get_items::<Item>("sandbox"), Some(vec![]));
    }

    #[test]
    fn typed_items_round_trip() {
        let cache = LocalCache::new(MemoryStore::new());
        let items = vec![Item { name: "a".into() }, Item { name: "b".into() }];
        cache.put_items("sandbox", &items);
        assert_eq!(cache.get_items::<Item>("sandbox"), Some(items));
    }

    #[test]
    fn corrupt_structured_text_reads_as_absent() {
        let store = MemoryStore::new();
        store.set_text("sessions", "[{broken");
        let cache = LocalCache::new(store);
        assert_eq!(cache.get("sessions"), None);
        assert_eq!(cache.get_items::<Item>("sessions"), None);
    }

    #[test]
    fn missing_store_is_a_no_op() {
        let cache = LocalCache::new(NoStore);
        cache.put_text("sessionsUpdated", "x");
        cache.put_items("sessions", &[Item { name: "a".into() }]);
        assert_eq!(cache.get("sessionsUpdated"), None);
        assert_eq!(cache.get_items::<Item>("sessions"), None);
    }
}
