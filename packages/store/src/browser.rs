//! # Browser storage for the web platform
//!
//! [`BrowserSessionStore`] keeps the identity bootstrap data in `window.localStorage`
//! so a reload does not force a new login. [`SessionStore::clear`] additionally wipes
//! `window.sessionStorage`, which the identity provider's popup flow may have used.
//!
//! ## Error handling
//!
//! Storage can be disabled (private mode, quota, sandboxed iframes). Every method
//! swallows those errors: reads return `None`, writes do nothing. A missing identity
//! just means the user is shown the login page.

use web_sys::Storage;

use crate::session::{SessionStore, DELEGATION_KEY, IDENTITY_KEY};

/// `localStorage`-backed SessionStore for the web platform.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserSessionStore;

impl BrowserSessionStore {
    pub fn new() -> Self {
        Self
    }

    fn local() -> Option<Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }

    fn session() -> Option<Storage> {
        web_sys::window()?.session_storage().ok().flatten()
    }
}

impl SessionStore for BrowserSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::local()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = Self::local() {
            if storage.set_item(key, value).is_err() {
                tracing::warn!("localStorage rejected write for {key}");
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::local() {
            let _ = storage.remove_item(key);
        }
    }

    fn clear(&self) {
        // Only our own keys: localStorage is shared with anything else on the origin.
        self.remove(IDENTITY_KEY);
        self.remove(DELEGATION_KEY);
        if let Some(storage) = Self::session() {
            let _ = storage.clear();
        }
    }
}
