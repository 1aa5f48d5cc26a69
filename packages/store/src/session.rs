//! # Session bootstrap storage
//!
//! The identity provider hands the app a delegation after the redirect-based login.
//! That delegation (and the principal it belongs to) is the only state this app keeps
//! between page loads. It lives in browser storage under two well-known keys and is
//! cleared on logout or reset.
//!
//! | Key | Value |
//! |-----|-------|
//! | [`IDENTITY_KEY`] | JSON-encoded [`StoredIdentity`] |
//! | [`DELEGATION_KEY`] | raw delegation token, mirrored for the transport layer |
//!
//! Implementations: [`crate::MemorySessionStore`] for tests and native builds,
//! `BrowserSessionStore` on the web platform.

use serde::{Deserialize, Serialize};

pub const IDENTITY_KEY: &str = "chama-identity";
pub const DELEGATION_KEY: &str = "chama-delegation";

/// Key/value storage for transient session bootstrap data.
///
/// Failures are swallowed by implementations: an unavailable storage area behaves like
/// an empty one, which simply means "not logged in".
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    /// Drop everything this app has stored, including any per-tab session data.
    fn clear(&self);

    /// Load the persisted identity, if any. Corrupt entries are treated as absent.
    fn load_identity(&self) -> Option<StoredIdentity> {
        let raw = self.get(IDENTITY_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!("Discarding unreadable stored identity: {e}");
                None
            }
        }
    }

    fn save_identity(&self, identity: &StoredIdentity) {
        match serde_json::to_string(identity) {
            Ok(raw) => {
                self.set(IDENTITY_KEY, &raw);
                self.set(DELEGATION_KEY, &identity.delegation);
            }
            Err(e) => tracing::error!("Failed to encode identity: {e}"),
        }
    }

    fn clear_identity(&self) {
        self.remove(IDENTITY_KEY);
        self.remove(DELEGATION_KEY);
    }
}

/// Identity bootstrap data returned by the identity provider's callback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredIdentity {
    /// Textual principal of the signed-in user.
    pub principal: String,
    /// Opaque delegation token presented to the canister gateway.
    pub delegation: String,
    /// Expiry in nanoseconds since the Unix epoch. `None` means no expiry was given.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl StoredIdentity {
    /// Whether the delegation is still usable at `now` (nanoseconds).
    pub fn is_valid_at(&self, now: i64) -> bool {
        !self.delegation.is_empty() && self.expires_at.map_or(true, |exp| exp > now)
    }
}
