//! # Session controller
//!
//! [`SessionController`] is the single owner of [`AuthState`]. Views never mutate the
//! state directly: they call the controller, which talks to the identity provider and
//! the user service and then publishes the new state to its subscriber (the UI's
//! signal). Every failure ends up as a readable `error` string; nothing here panics or
//! leaves the state half-updated.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ServiceError;
use crate::identity::{IdentityError, IdentityProvider};
use crate::models::{Principal, User, VerificationLevel};
use crate::retry::{retry_profile_fetch, ProfileLookup, RetryPolicy};
use crate::services::AppServices;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub principal: Option<Principal>,
    pub loading: bool,
    pub error: Option<String>,
    /// Signed in, but the registry has no profile yet.
    pub needs_registration: bool,
}

impl AuthState {
    /// State before the first [`SessionController::initialize`] completes.
    pub fn pending() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }
}

type Listener = Box<dyn Fn(&AuthState)>;

pub struct SessionController {
    identity: Rc<dyn IdentityProvider>,
    services: AppServices,
    retry: RetryPolicy,
    state: RefCell<AuthState>,
    listener: RefCell<Option<Listener>>,
}

impl SessionController {
    pub fn new(
        identity: Rc<dyn IdentityProvider>,
        services: AppServices,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            identity,
            services,
            retry,
            state: RefCell::new(AuthState::pending()),
            listener: RefCell::new(None),
        }
    }

    /// Called with every new state. Replaces any previous subscriber.
    pub fn subscribe(&self, listener: impl Fn(&AuthState) + 'static) {
        *self.listener.borrow_mut() = Some(Box::new(listener));
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn services(&self) -> &AppServices {
        &self.services
    }

    pub fn login_url(&self, origin: &str) -> String {
        self.identity.login_url(origin)
    }

    fn update(&self, f: impl FnOnce(&mut AuthState)) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            f(&mut state);
            state.clone()
        };
        if let Some(listener) = self.listener.borrow().as_ref() {
            listener(&snapshot);
        }
    }

    /// Check the stored session and, if there is one, load the profile.
    pub async fn initialize(&self) {
        self.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let Some(principal) = self
            .identity
            .is_authenticated()
            .then(|| self.identity.principal())
            .flatten()
        else {
            self.update(|s| *s = AuthState::default());
            return;
        };

        self.update(|s| {
            s.is_authenticated = true;
            s.principal = Some(principal);
        });

        let users = self.services.users.clone();
        let lookup = retry_profile_fetch(&self.retry, || {
            let users = users.clone();
            async move { users.try_get_current_user().await }
        })
        .await;
        self.apply_lookup(lookup);
    }

    fn apply_lookup(&self, lookup: ProfileLookup) {
        match lookup {
            ProfileLookup::Found(user) => {
                tracing::info!("Loaded profile for {}", user.name);
                self.update(|s| {
                    s.user = Some(user);
                    s.needs_registration = false;
                    s.error = None;
                    s.loading = false;
                });
            }
            ProfileLookup::Missing { attempts } => {
                tracing::info!("No profile after {attempts} attempts, registration needed");
                self.update(|s| {
                    s.user = None;
                    s.needs_registration = true;
                    s.loading = false;
                });
            }
            ProfileLookup::Failed {
                attempts,
                last_error,
            } => {
                tracing::warn!("Giving up on profile after {attempts} attempts: {last_error}");
                self.update(|s| {
                    s.user = None;
                    s.error = Some(last_error);
                    s.loading = false;
                });
            }
        }
    }

    /// Finish the redirect login with the callback's query string.
    pub async fn login(&self, callback_query: &str) -> Result<Principal, IdentityError> {
        self.update(|s| {
            s.loading = true;
            s.error = None;
        });
        match self.identity.complete_login(callback_query) {
            Ok(principal) => {
                self.services.reset();
                self.initialize().await;
                Ok(principal)
            }
            Err(e) => {
                tracing::error!("Login failed: {}", e);
                self.update(|s| {
                    s.loading = false;
                    s.error = Some(format!("Login failed: {e}"));
                });
                Err(e)
            }
        }
    }

    /// Sign out. Local state and cached handles are dropped even if the provider fails.
    pub async fn logout(&self) {
        self.update(|s| s.loading = true);
        if let Err(e) = self.identity.logout().await {
            tracing::warn!("Identity provider logout failed: {}", e);
        }
        self.services.reset();
        self.update(|s| *s = AuthState::default());
    }

    fn apply_profile(&self, result: &Result<User, ServiceError>) {
        match result {
            Ok(user) => {
                let user = user.clone();
                self.update(|s| {
                    s.user = Some(user);
                    s.needs_registration = false;
                    s.error = None;
                    s.loading = false;
                });
            }
            Err(e) => {
                let message = e.to_string();
                self.update(|s| {
                    s.error = Some(message);
                    s.loading = false;
                });
            }
        }
    }

    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<User, ServiceError> {
        self.update(|s| {
            s.loading = true;
            s.error = None;
        });
        let result = self.services.users.register_user(name, email, phone).await;
        self.apply_profile(&result);
        result
    }

    pub async fn update_profile(
        &self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<User, ServiceError> {
        self.update(|s| s.error = None);
        let result = self.services.users.update_profile(name, email, phone).await;
        self.apply_profile(&result);
        result
    }

    pub async fn verify_user(&self, level: VerificationLevel) -> Result<User, ServiceError> {
        self.update(|s| s.error = None);
        let result = self.services.users.verify_user(level).await;
        self.apply_profile(&result);
        result
    }

    /// Re-read the profile once, without the login retry budget.
    pub async fn refresh_user(&self) {
        if !self.state.borrow().is_authenticated {
            return;
        }
        let lookup = match self.services.users.try_get_current_user().await {
            Ok(Some(user)) => ProfileLookup::Found(user),
            Ok(None) => ProfileLookup::Missing { attempts: 1 },
            Err(e) => ProfileLookup::Failed {
                attempts: 1,
                last_error: e.to_string(),
            },
        };
        self.apply_lookup(lookup);
    }

    pub fn clear_error(&self) {
        self.update(|s| s.error = None);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;
    use crate::identity::MemoryIdentity;
    use crate::models::user::sample_user;
    use crate::remote::MemoryBackend;

    struct Harness {
        backend: MemoryBackend,
        identity: Rc<MemoryIdentity>,
        controller: SessionController,
    }

    fn harness() -> Harness {
        let backend = MemoryBackend::new();
        let identity = Rc::new(MemoryIdentity::new(
            Principal::from_text("aaaaa-aa").unwrap(),
            "/auth/callback",
        ));
        let services = AppServices::new(Rc::new(backend.clone()), identity.clone());
        let controller = SessionController::new(
            identity.clone(),
            services,
            RetryPolicy::new(3, Duration::ZERO),
        );
        Harness {
            backend,
            identity,
            controller,
        }
    }

    #[tokio::test]
    async fn test_initialize_without_session() {
        let h = harness();
        assert!(h.controller.state().loading);
        h.controller.initialize().await;
        assert_eq!(h.controller.state(), AuthState::default());
        assert_eq!(h.backend.profile_reads(), 0);
    }

    #[tokio::test]
    async fn test_login_loads_existing_profile() {
        let h = harness();
        h.backend.seed_user(sample_user("aaaaa-aa", "Wanjiku"));

        let principal = h
            .controller
            .login(&h.identity.callback_query())
            .await
            .unwrap();
        let state = h.controller.state();
        assert!(state.is_authenticated);
        assert_eq!(state.principal, Some(principal));
        assert_eq!(state.user.map(|u| u.name), Some("Wanjiku".to_string()));
        assert!(!state.loading);
        assert!(!state.needs_registration);
    }

    #[tokio::test]
    async fn test_login_retries_until_profile_appears() {
        let h = harness();
        h.backend.seed_user(sample_user("aaaaa-aa", "Wanjiku"));
        h.backend.hide_profiles_for(2);

        h.controller.login(&h.identity.callback_query()).await.unwrap();
        assert!(h.controller.state().user.is_some());
        assert_eq!(h.backend.profile_reads(), 3);
    }

    #[tokio::test]
    async fn test_missing_profile_needs_registration() {
        let h = harness();
        h.controller.login(&h.identity.callback_query()).await.unwrap();

        let state = h.controller.state();
        assert!(state.is_authenticated);
        assert!(state.needs_registration);
        assert_eq!(state.user, None);
        assert_eq!(state.error, None);
        assert_eq!(h.backend.profile_reads(), 3);

        h.controller
            .register_user("Wanjiku", "wanjiku@example.com", "+254712345678")
            .await
            .unwrap();
        let state = h.controller.state();
        assert!(!state.needs_registration);
        assert_eq!(state.user.map(|u| u.email), Some("wanjiku@example.com".into()));
    }

    #[tokio::test]
    async fn test_unreachable_registry_sets_error() {
        let h = harness();
        h.backend.set_offline(true);
        h.controller.login(&h.identity.callback_query()).await.unwrap();

        let state = h.controller.state();
        assert!(state.is_authenticated);
        assert!(!state.needs_registration);
        assert!(state.error.unwrap().starts_with("Network connection failed"));
    }

    #[tokio::test]
    async fn test_logout_clears_state_when_provider_fails() {
        let h = harness();
        h.backend.seed_user(sample_user("aaaaa-aa", "Wanjiku"));
        h.controller.login(&h.identity.callback_query()).await.unwrap();
        assert!(h.controller.state().user.is_some());

        h.identity.fail_logout(true);
        h.controller.logout().await;

        assert_eq!(h.controller.state(), AuthState::default());
        // Handles were rebuilt without credentials.
        assert_eq!(h.controller.services().users.get_current_user().await, None);
    }

    #[tokio::test]
    async fn test_bad_callback_reports_error() {
        let h = harness();
        let result = h.controller.login("error=UserInterrupt").await;
        assert!(result.is_err());
        let state = h.controller.state();
        assert!(!state.is_authenticated);
        assert_eq!(
            state.error.as_deref(),
            Some("Login failed: login was not completed: UserInterrupt")
        );
    }

    #[tokio::test]
    async fn test_subscriber_sees_every_update() {
        let h = harness();
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        h.controller.subscribe(move |_| counter.set(counter.get() + 1));
        h.controller.initialize().await;
        assert_eq!(seen.get(), 2);
    }

    #[tokio::test]
    async fn test_registration_error_is_reported() {
        let h = harness();
        h.controller.login(&h.identity.callback_query()).await.unwrap();
        let err = h
            .controller
            .register_user("Wanjiku", "not-an-email", "+254712345678")
            .await
            .unwrap_err();
        assert_eq!(h.controller.state().error, Some(err.to_string()));
        h.controller.clear_error();
        assert_eq!(h.controller.state().error, None);
    }
}
