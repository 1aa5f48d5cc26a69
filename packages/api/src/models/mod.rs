//! # Domain models mirrored from the backend canisters
//!
//! These types are owned by the backend; the client only displays them and sends them
//! back. Field names follow the canister records (`camelCase` on the wire), variant
//! names follow the canister variants.
//!
//! | Module | Types |
//! |--------|-------|
//! | [`principal`] | [`Principal`], the opaque identity handle |
//! | [`user`] | [`User`], [`UserStats`], [`UserFilter`], [`VerificationLevel`] |
//! | [`chama`] | [`Chama`], [`ChamaMember`], [`Treasury`], [`ChamaFilter`], [`NewChama`] and the variant enums |
//! | [`transaction`] | [`Transaction`], [`TransactionStats`], [`Balance`], [`TransactionFilter`] |
//! | [`chat`] | [`ChatSession`], [`ChatMessage`], [`ChatResponse`], [`ChatbotCapabilities`] |
//!
//! Amounts are whole Kenyan shillings. Timestamps are nanoseconds since the Unix epoch.

pub mod chama;
pub mod chat;
pub mod principal;
pub mod transaction;
pub mod user;

pub use chama::{
    Chama, ChamaFilter, ChamaId, ChamaMember, ChamaRules, ChamaSettings, ChamaStatus, ChamaType,
    ContributionFrequency, MeetingFrequency, MemberRole, MemberStatus, NewChama,
    NotificationSettings, Treasury,
};
pub use chat::{ChatMessage, ChatResponse, ChatSession, ChatbotCapabilities};
pub use principal::{Principal, PrincipalError};
pub use transaction::{
    Balance, Transaction, TransactionCategory, TransactionFilter, TransactionId,
    TransactionMetadata, TransactionStats, TransactionStatus, TransactionType,
};
pub use user::{User, UserFilter, UserStats, VerificationLevel};

/// Nanoseconds since the Unix epoch, as used by every backend timestamp.
pub type Timestamp = i64;
