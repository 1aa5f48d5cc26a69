use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::session::SessionStore;

/// In-memory SessionStore for testing and native fallback.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{StoredIdentity, DELEGATION_KEY, IDENTITY_KEY};

    fn identity() -> StoredIdentity {
        StoredIdentity {
            principal: "2vxsx-fae".to_string(),
            delegation: "token-abc".to_string(),
            expires_at: Some(1_000),
        }
    }

    #[test]
    fn test_save_and_load_identity() {
        let store = MemorySessionStore::new();
        assert!(store.load_identity().is_none());

        store.save_identity(&identity());

        assert_eq!(store.load_identity(), Some(identity()));
        assert_eq!(store.get(DELEGATION_KEY).as_deref(), Some("token-abc"));
    }

    #[test]
    fn test_clear_identity_removes_both_keys() {
        let store = MemorySessionStore::new();
        store.save_identity(&identity());
        store.set("unrelated", "kept");

        store.clear_identity();

        assert!(store.get(IDENTITY_KEY).is_none());
        assert!(store.get(DELEGATION_KEY).is_none());
        assert_eq!(store.get("unrelated").as_deref(), Some("kept"));
    }

    #[test]
    fn test_corrupt_identity_is_ignored() {
        let store = MemorySessionStore::new();
        store.set(IDENTITY_KEY, "{not json");
        assert!(store.load_identity().is_none());
    }

    #[test]
    fn test_clear_empties_store() {
        let store = MemorySessionStore::new();
        store.save_identity(&identity());
        assert!(!store.is_empty());
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_identity_expiry() {
        let id = identity();
        assert!(id.is_valid_at(999));
        assert!(!id.is_valid_at(1_000));

        let no_expiry = StoredIdentity { expires_at: None, ..identity() };
        assert!(no_expiry.is_valid_at(i64::MAX));

        let empty = StoredIdentity { delegation: String::new(), ..identity() };
        assert!(!empty.is_valid_at(0));
    }
}
