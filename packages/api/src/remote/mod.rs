//! # Remote interfaces of the backend canisters
//!
//! One async trait per canister. Methods that the canister declares as returning a
//! result yield [`CallResult`], whose error is either the canister's tag or a
//! [`TransportError`]. Everything else yields [`QueryResult`].
//!
//! Implementations:
//!
//! - [`clients`]: HTTP clients over [`agent::CanisterAgent`].
//! - [`memory::MemoryBackend`]: an in-process fake used by tests and the `demo` feature.
//!
//! A [`Connector`] builds handles for a given set of credentials. The service layer
//! caches those handles and throws them away on logout.

use std::rc::Rc;

use async_trait::async_trait;
use store::StoredIdentity;

use crate::error::{CallError, ChamaError, TransactionError, TransportError, UserError};
use crate::models::{
    Balance, Chama, ChamaFilter, ChatResponse, ChatSession, ChatbotCapabilities, MemberRole,
    NewChama, Principal, Transaction, TransactionFilter, TransactionStats, TransactionStatus,
    User, UserFilter, UserStats, VerificationLevel,
};

pub mod agent;
pub mod clients;
pub mod memory;

pub use agent::CanisterAgent;
pub use clients::CanisterConnector;
pub use memory::MemoryBackend;

pub type CallResult<T, E> = Result<T, CallError<E>>;
pub type QueryResult<T> = Result<T, TransportError>;

#[async_trait(?Send)]
pub trait UserRegistry {
    async fn register_user(&self, name: &str, email: &str, phone: &str)
        -> CallResult<User, UserError>;
    async fn get_my_profile(&self) -> QueryResult<Option<User>>;
    async fn get_user_profile(&self, user: &Principal) -> QueryResult<Option<User>>;
    async fn update_profile(&self, name: &str, email: &str, phone: &str)
        -> CallResult<User, UserError>;
    async fn verify_user(&self, level: VerificationLevel) -> CallResult<User, UserError>;
    async fn get_my_stats(&self) -> QueryResult<Option<UserStats>>;
    async fn search_users(&self, query: &str) -> QueryResult<Vec<User>>;
    async fn get_all_users(&self, filter: Option<&UserFilter>) -> QueryResult<Vec<User>>;
    async fn get_user_count(&self) -> QueryResult<u64>;
    async fn add_chama_to_user(&self, user: &Principal, chama_id: &str) -> QueryResult<bool>;
    async fn health_check(&self) -> QueryResult<String>;
}

#[async_trait(?Send)]
pub trait ChamaRegistry {
    async fn create_chama(&self, chama: &NewChama) -> CallResult<Chama, ChamaError>;
    async fn get_chama(&self, chama_id: &str) -> QueryResult<Option<Chama>>;
    async fn update_chama(&self, chama_id: &str, chama: &Chama) -> CallResult<Chama, ChamaError>;
    async fn join_chama(&self, chama_id: &str) -> CallResult<Chama, ChamaError>;
    async fn add_member(&self, chama_id: &str, user: &Principal) -> CallResult<Chama, ChamaError>;
    async fn remove_member(&self, chama_id: &str, user: &Principal)
        -> CallResult<Chama, ChamaError>;
    async fn update_member_role(
        &self,
        chama_id: &str,
        user: &Principal,
        role: MemberRole,
    ) -> CallResult<Chama, ChamaError>;
    async fn get_chamas_by_creator(&self, creator: &Principal) -> QueryResult<Vec<Chama>>;
    async fn get_chamas_by_member(&self, member: &Principal) -> QueryResult<Vec<Chama>>;
    async fn get_my_chamas(&self) -> QueryResult<Vec<Chama>>;
    async fn get_public_chamas(&self, filter: Option<&ChamaFilter>) -> QueryResult<Vec<Chama>>;
    async fn search_chamas(&self, query: &str) -> QueryResult<Vec<Chama>>;
    async fn get_chama_count(&self) -> QueryResult<u64>;
    async fn health_check(&self) -> QueryResult<String>;
}

#[async_trait(?Send)]
pub trait FinancialLedger {
    async fn record_contribution(
        &self,
        chama_id: &str,
        amount: u64,
        description: &str,
    ) -> CallResult<Transaction, TransactionError>;
    async fn process_withdrawal(
        &self,
        chama_id: &str,
        amount: u64,
        description: &str,
    ) -> CallResult<Transaction, TransactionError>;
    async fn record_loan(
        &self,
        chama_id: &str,
        borrower: &Principal,
        amount: u64,
        description: &str,
    ) -> CallResult<Transaction, TransactionError>;
    async fn record_repayment(
        &self,
        chama_id: &str,
        amount: u64,
        description: &str,
    ) -> CallResult<Transaction, TransactionError>;
    async fn get_transaction(&self, transaction_id: &str) -> QueryResult<Option<Transaction>>;
    async fn update_transaction_status(
        &self,
        transaction_id: &str,
        status: TransactionStatus,
    ) -> CallResult<Transaction, TransactionError>;
    async fn get_user_balance(&self, chama_id: &str, user: &Principal) -> QueryResult<Balance>;
    async fn get_my_balance(&self, chama_id: &str) -> QueryResult<Balance>;
    async fn get_chama_treasury_balance(&self, chama_id: &str) -> QueryResult<u64>;
    async fn get_transactions_by_chama(
        &self,
        chama_id: &str,
        limit: Option<u64>,
    ) -> QueryResult<Vec<Transaction>>;
    async fn get_transactions_by_user(
        &self,
        user: &Principal,
        limit: Option<u64>,
    ) -> QueryResult<Vec<Transaction>>;
    async fn get_my_transactions(&self, limit: Option<u64>) -> QueryResult<Vec<Transaction>>;
    async fn get_filtered_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> QueryResult<Vec<Transaction>>;
    async fn get_chama_transaction_stats(&self, chama_id: &str) -> QueryResult<TransactionStats>;
    async fn get_transaction_count(&self) -> QueryResult<u64>;
    async fn health_check(&self) -> QueryResult<String>;
}

#[async_trait(?Send)]
pub trait ChatAssistant {
    async fn start_chat_session(&self) -> QueryResult<String>;
    async fn send_message(
        &self,
        session_id: &str,
        message: &str,
        context: Option<&str>,
    ) -> QueryResult<ChatResponse>;
    async fn get_chat_history(&self, session_id: &str) -> QueryResult<Option<ChatSession>>;
    async fn get_my_sessions(&self) -> QueryResult<Vec<ChatSession>>;
    async fn end_chat_session(&self, session_id: &str) -> QueryResult<bool>;
    async fn get_capabilities(&self) -> QueryResult<ChatbotCapabilities>;
    async fn health_check(&self) -> QueryResult<String>;
}

/// Builds remote handles bound to a caller. `None` means anonymous.
pub trait Connector {
    fn users(&self, caller: Option<&StoredIdentity>) -> QueryResult<Rc<dyn UserRegistry>>;
    fn chamas(&self, caller: Option<&StoredIdentity>) -> QueryResult<Rc<dyn ChamaRegistry>>;
    fn ledger(&self, caller: Option<&StoredIdentity>) -> QueryResult<Rc<dyn FinancialLedger>>;
    fn chat(&self, caller: Option<&StoredIdentity>) -> QueryResult<Rc<dyn ChatAssistant>>;
}
