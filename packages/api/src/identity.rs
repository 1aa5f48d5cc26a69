//! # Identity provider
//!
//! Login is redirect based. [`IdentityProvider::login_url`] sends the browser to the
//! provider, which redirects back to the callback route with the delegation in the
//! query string:
//!
//! ```text
//! /auth/callback?principal=<text>&delegation=<token>&expires_at=<ns>
//! /auth/callback?error=<reason>
//! ```
//!
//! [`IdentityProvider::complete_login`] turns that query into a stored session. The
//! cryptography behind the delegation belongs to the provider; this side only stores
//! the token and presents it to the gateway.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use reqwest::Url;
use store::config::IdentityConfig;
use store::{SessionStore, StoredIdentity};

use crate::error::TransportError;
use crate::models::{Principal, PrincipalError};
use crate::time::now_nanos;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IdentityError {
    #[error("login callback is missing `{0}`")]
    MissingParameter(&'static str),
    #[error("login callback carries an invalid principal: {0}")]
    InvalidPrincipal(#[from] PrincipalError),
    #[error("login was not completed: {0}")]
    Rejected(String),
    #[error("the delegation has already expired")]
    Expired,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Whether a stored, unexpired delegation exists.
    fn is_authenticated(&self) -> bool;

    fn principal(&self) -> Option<Principal>;

    /// The stored delegation, used to sign remote calls.
    fn credentials(&self) -> Option<StoredIdentity>;

    /// Where to send the browser to log in. `origin` is the app's own origin, e.g.
    /// `https://chama.example`, and is used to build the callback address.
    fn login_url(&self, origin: &str) -> String;

    /// Finish a login from the callback's query string (without the leading `?`).
    fn complete_login(&self, callback_query: &str) -> Result<Principal, IdentityError>;

    /// Revoke the delegation. Local session data is cleared even when this fails.
    async fn logout(&self) -> Result<(), IdentityError>;
}

/// Parse the callback query into the identity to store.
fn parse_callback(query: &str, now: i64) -> Result<StoredIdentity, IdentityError> {
    let query = query.trim_start_matches('?');
    let url = Url::parse(&format!("http://callback/?{query}"))
        .map_err(|e| IdentityError::Rejected(e.to_string()))?;

    let mut principal = None;
    let mut delegation = None;
    let mut expires_at = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "error" => return Err(IdentityError::Rejected(value.into_owned())),
            "principal" => principal = Some(value.into_owned()),
            "delegation" => delegation = Some(value.into_owned()),
            "expires_at" => expires_at = value.parse::<i64>().ok(),
            _ => {}
        }
    }

    let principal = Principal::from_text(
        principal
            .as_deref()
            .ok_or(IdentityError::MissingParameter("principal"))?,
    )?;
    let delegation = delegation
        .filter(|d| !d.is_empty())
        .ok_or(IdentityError::MissingParameter("delegation"))?;

    let identity = StoredIdentity {
        principal: principal.to_string(),
        delegation,
        expires_at,
    };
    if identity.is_valid_at(now) {
        Ok(identity)
    } else {
        Err(IdentityError::Expired)
    }
}

fn stored_principal(identity: &StoredIdentity) -> Option<Principal> {
    Principal::from_text(&identity.principal).ok()
}

/// Redirect-based identity backed by a [`SessionStore`].
pub struct DelegationIdentity<S: SessionStore> {
    store: S,
    config: IdentityConfig,
    client: reqwest::Client,
}

impl<S: SessionStore> DelegationIdentity<S> {
    pub fn new(store: S, config: IdentityConfig) -> Self {
        Self {
            store,
            config,
            client: reqwest::Client::new(),
        }
    }

    fn valid_identity(&self) -> Option<StoredIdentity> {
        self.store
            .load_identity()
            .filter(|identity| identity.is_valid_at(now_nanos()))
    }

    fn revoke_url(&self) -> Option<Url> {
        let mut url = Url::parse(&self.config.provider_url).ok()?;
        url.set_path("/logout");
        Some(url)
    }
}

#[async_trait(?Send)]
impl<S: SessionStore> IdentityProvider for DelegationIdentity<S> {
    fn is_authenticated(&self) -> bool {
        self.valid_identity()
            .as_ref()
            .and_then(stored_principal)
            .is_some()
    }

    fn principal(&self) -> Option<Principal> {
        self.valid_identity().as_ref().and_then(stored_principal)
    }

    fn credentials(&self) -> Option<StoredIdentity> {
        self.valid_identity()
    }

    fn login_url(&self, origin: &str) -> String {
        let callback = format!(
            "{}{}",
            origin.trim_end_matches('/'),
            self.config.callback_path
        );
        match Url::parse(&self.config.provider_url) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("callback", &callback);
                url.to_string()
            }
            Err(e) => {
                tracing::warn!("Identity provider URL is not absolute ({e}), using it verbatim");
                self.config.provider_url.clone()
            }
        }
    }

    fn complete_login(&self, callback_query: &str) -> Result<Principal, IdentityError> {
        let identity = parse_callback(callback_query, now_nanos())?;
        let principal = Principal::from_text(&identity.principal)?;
        self.store.save_identity(&identity);
        tracing::info!("Logged in as {}", principal.short());
        Ok(principal)
    }

    async fn logout(&self) -> Result<(), IdentityError> {
        let token = self.store.load_identity().map(|identity| identity.delegation);
        self.store.clear_identity();
        self.store.clear();

        let (Some(token), Some(url)) = (token, self.revoke_url()) else {
            return Ok(());
        };
        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, format!("Delegation {token}"))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(TransportError::Rejected {
                status: response.status().as_u16(),
                message: "delegation revocation refused".to_string(),
            }
            .into())
        }
    }
}

/// Identity that logs in without leaving the app. Used by tests and the `demo` build.
///
/// Its login URL points straight at the callback route with a fixed principal.
pub struct MemoryIdentity {
    principal: Principal,
    callback_path: String,
    current: RefCell<Option<StoredIdentity>>,
    fail_logout: Cell<bool>,
}

impl MemoryIdentity {
    pub fn new(principal: Principal, callback_path: impl Into<String>) -> Self {
        Self {
            principal,
            callback_path: callback_path.into(),
            current: RefCell::new(None),
            fail_logout: Cell::new(false),
        }
    }

    /// Make `logout` report a network failure, as an unreachable provider would.
    pub fn fail_logout(&self, fail: bool) {
        self.fail_logout.set(fail);
    }

    /// The query string the provider would send back.
    pub fn callback_query(&self) -> String {
        format!("principal={}&delegation=memory-delegation", self.principal)
    }
}

#[async_trait(?Send)]
impl IdentityProvider for MemoryIdentity {
    fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    fn principal(&self) -> Option<Principal> {
        self.current.borrow().as_ref().and_then(stored_principal)
    }

    fn credentials(&self) -> Option<StoredIdentity> {
        self.current.borrow().clone()
    }

    fn login_url(&self, _origin: &str) -> String {
        format!("{}?{}", self.callback_path, self.callback_query())
    }

    fn complete_login(&self, callback_query: &str) -> Result<Principal, IdentityError> {
        let identity = parse_callback(callback_query, now_nanos())?;
        let principal = Principal::from_text(&identity.principal)?;
        *self.current.borrow_mut() = Some(identity);
        Ok(principal)
    }

    async fn logout(&self) -> Result<(), IdentityError> {
        self.current.borrow_mut().take();
        if self.fail_logout.get() {
            Err(TransportError::Network("identity provider unreachable".into()).into())
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemorySessionStore;

    fn identity(store: MemorySessionStore) -> DelegationIdentity<MemorySessionStore> {
        DelegationIdentity::new(store, IdentityConfig::default())
    }

    #[test]
    fn test_parse_callback() {
        let parsed =
            parse_callback("?principal=aaaaa-aa&delegation=tok%2Bken&expires_at=200", 100).unwrap();
        assert_eq!(parsed.principal, "aaaaa-aa");
        assert_eq!(parsed.delegation, "tok+ken");
        assert_eq!(parsed.expires_at, Some(200));
    }

    #[test]
    fn test_parse_callback_errors() {
        assert_eq!(
            parse_callback("error=UserInterrupt", 0),
            Err(IdentityError::Rejected("UserInterrupt".into()))
        );
        assert_eq!(
            parse_callback("delegation=x", 0),
            Err(IdentityError::MissingParameter("principal"))
        );
        assert_eq!(
            parse_callback("principal=aaaaa-aa", 0),
            Err(IdentityError::MissingParameter("delegation"))
        );
        assert_eq!(
            parse_callback("principal=aaaaa-aa&delegation=x&expires_at=5", 10),
            Err(IdentityError::Expired)
        );
        assert!(matches!(
            parse_callback("principal=NOPE&delegation=x", 0),
            Err(IdentityError::InvalidPrincipal(_))
        ));
    }

    #[test]
    fn test_login_url_carries_callback() {
        let url = identity(MemorySessionStore::new()).login_url("https://chama.example/");
        assert!(url.starts_with("http://127.0.0.1:4943/?canisterId=rdmx6-jaaaa-aaaaa-aaadq-cai"));
        assert!(url.contains("callback=https%3A%2F%2Fchama.example%2Fauth%2Fcallback"));
    }

    #[test]
    fn test_complete_login_persists_session() {
        let store = MemorySessionStore::new();
        let id = identity(store.clone());
        assert!(!id.is_authenticated());

        let principal = id
            .complete_login("principal=aaaaa-aa&delegation=token")
            .unwrap();
        assert_eq!(principal.as_str(), "aaaaa-aa");
        assert!(id.is_authenticated());
        assert_eq!(id.principal(), Some(principal));
        assert_eq!(store.get(store::DELEGATION_KEY).as_deref(), Some("token"));
    }

    #[test]
    fn test_expired_session_is_unauthenticated() {
        let store = MemorySessionStore::new();
        store.save_identity(&StoredIdentity {
            principal: "aaaaa-aa".into(),
            delegation: "token".into(),
            expires_at: Some(1),
        });
        let id = identity(store);
        assert!(!id.is_authenticated());
        assert_eq!(id.credentials(), None);
    }

    #[tokio::test]
    async fn test_memory_identity_logout_failure_still_clears() {
        let id = MemoryIdentity::new(Principal::from_text("aaaaa-aa").unwrap(), "/auth/callback");
        assert_eq!(
            id.login_url("ignored"),
            "/auth/callback?principal=aaaaa-aa&delegation=memory-delegation"
        );
        id.complete_login(&id.callback_query()).unwrap();
        assert!(id.is_authenticated());

        id.fail_logout(true);
        assert!(id.logout().await.is_err());
        assert!(!id.is_authenticated());
    }
}
