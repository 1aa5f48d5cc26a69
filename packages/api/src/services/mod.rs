//! # Domain service wrappers
//!
//! One wrapper per canister. Each wrapper lazily builds a single remote handle through a
//! [`HandleCache`] and keeps it until [`AppServices::reset`] drops every handle on
//! logout. The next call then builds a fresh handle carrying the new credentials.
//!
//! | Call kind | Failure behaviour |
//! |-----------|-------------------|
//! | Mutation | `Err(ServiceError)` with a user-facing message, logged at `error` |
//! | Read | safe default (empty, zero, `None`), logged at `warn` |
//!
//! A few list reads whose pages show a retry banner return `Err` instead; they are
//! noted on the method.

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use crate::error::{CallError, ServiceError};
use crate::identity::IdentityProvider;
use crate::remote::{
    ChamaRegistry, ChatAssistant, Connector, FinancialLedger, QueryResult, UserRegistry,
};

mod chama;
mod chat;
mod financial;
mod user;

pub use chama::ChamaService;
pub use chat::ChatService;
pub use financial::FinancialService;
pub use user::UserService;

type Build<R> = Box<dyn Fn() -> QueryResult<Rc<R>>>;

/// A lazily built, shared remote handle.
pub struct HandleCache<R: ?Sized> {
    slot: RefCell<Option<Rc<R>>>,
    build: Build<R>,
}

impl<R: ?Sized> HandleCache<R> {
    pub fn new(build: impl Fn() -> QueryResult<Rc<R>> + 'static) -> Self {
        Self {
            slot: RefCell::new(None),
            build: Box::new(build),
        }
    }

    /// The cached handle, building it on first use.
    pub fn get(&self) -> QueryResult<Rc<R>> {
        let cached = self.slot.borrow().clone();
        if let Some(handle) = cached {
            return Ok(handle);
        }
        let handle = (self.build)()?;
        *self.slot.borrow_mut() = Some(Rc::clone(&handle));
        Ok(handle)
    }

    pub fn is_cached(&self) -> bool {
        self.slot.borrow().is_some()
    }

    pub fn reset(&self) {
        self.slot.borrow_mut().take();
    }
}

/// Every service, sharing one connector and one identity.
#[derive(Clone)]
pub struct AppServices {
    pub users: UserService,
    pub chamas: ChamaService,
    pub financial: FinancialService,
    pub chat: ChatService,
}

impl AppServices {
    pub fn new(connector: Rc<dyn Connector>, identity: Rc<dyn IdentityProvider>) -> Self {
        let users = {
            let (connector, identity) = (Rc::clone(&connector), Rc::clone(&identity));
            HandleCache::<dyn UserRegistry>::new(move || {
                connector.users(identity.credentials().as_ref())
            })
        };
        let chamas = {
            let (connector, identity) = (Rc::clone(&connector), Rc::clone(&identity));
            HandleCache::<dyn ChamaRegistry>::new(move || {
                connector.chamas(identity.credentials().as_ref())
            })
        };
        let ledger = {
            let (connector, identity) = (Rc::clone(&connector), Rc::clone(&identity));
            HandleCache::<dyn FinancialLedger>::new(move || {
                connector.ledger(identity.credentials().as_ref())
            })
        };
        let chat = HandleCache::<dyn ChatAssistant>::new(move || {
            connector.chat(identity.credentials().as_ref())
        });

        Self {
            users: UserService::new(users),
            chamas: ChamaService::new(chamas),
            financial: FinancialService::new(ledger),
            chat: ChatService::new(chat),
        }
    }

    /// Drop every cached handle. Called on login and logout.
    pub fn reset(&self) {
        self.users.reset();
        self.chamas.reset();
        self.financial.reset();
        self.chat.reset();
    }
}

/// Log a failed read and fall back to the type's default.
pub(crate) fn degrade<T: Default>(context: &str, result: QueryResult<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!("{}: {}", context, e);
        T::default()
    })
}

/// Log a failed mutation and convert it for the view.
pub(crate) fn fail<E>(context: &str, e: CallError<E>) -> ServiceError
where
    E: Display + Into<ServiceError>,
{
    tracing::error!("{}: {}", context, e);
    e.into()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::rc::Rc;

    use super::AppServices;
    use crate::identity::{IdentityProvider, MemoryIdentity};
    use crate::models::Principal;
    use crate::remote::MemoryBackend;

    /// Services wired to a fresh memory backend, already logged in as `principal`.
    pub fn signed_in(principal: &str) -> (MemoryBackend, Rc<MemoryIdentity>, AppServices) {
        let backend = MemoryBackend::new();
        let identity = Rc::new(MemoryIdentity::new(
            Principal::from_text(principal).unwrap(),
            "/auth/callback",
        ));
        identity.complete_login(&identity.callback_query()).unwrap();
        let services = AppServices::new(Rc::new(backend.clone()), identity.clone());
        (backend, identity, services)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::TransportError;

    #[test]
    fn test_handle_cache_builds_once_until_reset() {
        let builds = Rc::new(Cell::new(0));
        let counter = Rc::clone(&builds);
        let cache = HandleCache::<str>::new(move || {
            counter.set(counter.get() + 1);
            Ok(Rc::from("handle"))
        });

        assert!(!cache.is_cached());
        cache.get().unwrap();
        cache.get().unwrap();
        assert_eq!(builds.get(), 1);

        cache.reset();
        assert!(!cache.is_cached());
        cache.get().unwrap();
        assert_eq!(builds.get(), 2);
    }

    #[test]
    fn test_handle_cache_does_not_cache_failures() {
        let cache = HandleCache::<str>::new(|| Err(TransportError::Config("no id".into())));
        assert!(cache.get().is_err());
        assert!(!cache.is_cached());
    }

    #[tokio::test]
    async fn test_reset_picks_up_new_credentials() {
        let (backend, identity, services) = testing::signed_in("first-aa");
        services
            .users
            .register_user("First", "first@example.com", "+254712345678")
            .await
            .unwrap();
        assert!(services.users.get_current_user().await.is_some());

        identity.logout().await.unwrap();
        // Stale handle still acts as the previous caller until reset.
        assert!(services.users.get_current_user().await.is_some());
        services.reset();
        assert!(services.users.get_current_user().await.is_none());
        assert_eq!(backend.profile_reads(), 3);
    }
}
