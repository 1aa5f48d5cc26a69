//! # API crate: client-side access to the chama backend
//!
//! Everything the frontends need to talk to the backend canisters, with no UI in it.
//! Business rules (ledger correctness, treasury accounting, governance) live in the
//! canisters; this crate only calls them, turns their answers into typed values and
//! their failures into readable messages.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Records and variants mirrored from the canisters (`User`, `Chama`, `Transaction`, chat types) |
//! | [`error`] | Backend tags, transport failures, and the `ServiceError` views display |
//! | [`remote`] | One async trait per canister, the HTTP `CanisterAgent`, and the in-memory backend |
//! | [`services`] | `UserService`, `ChamaService`, `FinancialService`, `ChatService` with cached handles |
//! | [`identity`] | Redirect-based login via the identity provider |
//! | [`retry`] | Bounded profile fetch after login |
//! | [`session`] | `SessionController`, the single owner of `AuthState` |
//! | [`time`] | Nanosecond timestamps, formatting, and a platform sleep |
//!
//! ## Wiring
//!
//! ```ignore
//! let config = store::ClientConfig::from_build_env();
//! let identity = Rc::new(DelegationIdentity::new(BrowserSessionStore, config.identity.clone()));
//! let services = AppServices::new(Rc::new(CanisterConnector::new(config.clone())), identity.clone());
//! let session = SessionController::new(identity, services, RetryPolicy::from(&config.retry));
//! ```

pub mod error;
pub mod identity;
pub mod models;
pub mod remote;
pub mod retry;
pub mod services;
pub mod session;
pub mod time;

pub use error::{
    CallError, ChamaError, ServiceError, TransactionError, TransportError, UserError,
};
pub use identity::{DelegationIdentity, IdentityError, IdentityProvider, MemoryIdentity};
pub use remote::{CanisterConnector, Connector, MemoryBackend};
pub use retry::{ProfileLookup, RetryPolicy};
pub use services::{AppServices, ChamaService, ChatService, FinancialService, UserService};
pub use session::{AuthState, SessionController};
