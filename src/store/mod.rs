//! Durable key-value storage for session data.
//!
//! Every persisted collection is mirrored to the store as a side effect of
//! mutation and rehydrated once at startup. Values are serialized text;
//! anything that fails to deserialize on load is treated as absent.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Storage keys for the persisted session data.
pub mod keys {
    pub const LANGUAGE: &str = "saarthi_lang";
    pub const THEME: &str = "saarthi_theme";
    pub const REMINDERS: &str = "saarthi_reminders";
    pub const CHECKLIST: &str = "saarthi_checklist";
    pub const MESSAGES: &str = "saarthi_messages";
}

/// String key-value storage with synchronous, last-write-wins semantics.
pub trait KeyValueStore: Send {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
    fn clear(&mut self);
}

/// Load a JSON-serialized collection, falling back to the default when the
/// key is absent or the stored value no longer parses.
pub fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match store.load(key) {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Discarding unreadable value for {}: {}", key, e);
            T::default()
        }),
        None => T::default(),
    }
}

/// Persist a collection as JSON. Serialization of these plain data types
/// cannot fail in practice; a failure is logged and the old value kept.
pub fn save_json<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.save(key, &raw),
        Err(e) => warn!("Failed to serialize {}: {}", key, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::ChecklistItem;
    use uuid::Uuid;

    #[test]
    fn test_load_json_defaults_on_missing_key() {
        let store = MemoryStore::new();
        let items: Vec<ChecklistItem> = load_json(&store, keys::CHECKLIST);
        assert!(items.is_empty());
    }

    #[test]
    fn test_load_json_defaults_on_garbage() {
        let mut store = MemoryStore::new();
        store.save(keys::CHECKLIST, "not json at all");
        let items: Vec<ChecklistItem> = load_json(&store, keys::CHECKLIST);
        assert!(items.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let mut store = MemoryStore::new();
        let items = vec![ChecklistItem {
            id: Uuid::new_v4(),
            text: "buy vegetables".into(),
            completed: false,
        }];
        save_json(&mut store, keys::CHECKLIST, &items);
        let loaded: Vec<ChecklistItem> = load_json(&store, keys::CHECKLIST);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].text, "buy vegetables");
    }
}
