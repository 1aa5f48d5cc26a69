//! HTTP clients for each canister, speaking the canister's own method names.

use std::rc::Rc;

use async_trait::async_trait;
use serde_json::json;
use store::{ClientConfig, StoredIdentity};

use super::agent::{CallKind, CanisterAgent};
use super::{
    CallResult, ChamaRegistry, ChatAssistant, Connector, FinancialLedger, QueryResult,
    UserRegistry,
};
use crate::error::{ChamaError, TransactionError, UserError};
use crate::models::{
    Balance, Chama, ChamaFilter, ChatResponse, ChatSession, ChatbotCapabilities, MemberRole,
    NewChama, Principal, Transaction, TransactionFilter, TransactionStats, TransactionStatus,
    User, UserFilter, UserStats, VerificationLevel,
};

use CallKind::{Query, Update};

/// Builds HTTP clients from the client configuration.
#[derive(Clone, Debug)]
pub struct CanisterConnector {
    config: ClientConfig,
}

impl CanisterConnector {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    fn agent(&self, caller: Option<&StoredIdentity>) -> CanisterAgent {
        let agent = CanisterAgent::new(&self.config.gateway.url);
        match caller {
            Some(identity) => agent.with_delegation(&identity.delegation),
            None => agent,
        }
    }
}

impl Connector for CanisterConnector {
    fn users(&self, caller: Option<&StoredIdentity>) -> QueryResult<Rc<dyn UserRegistry>> {
        Ok(Rc::new(UserRegistryClient {
            agent: self.agent(caller),
            canister_id: self.config.canisters.user_management.clone(),
        }))
    }

    fn chamas(&self, caller: Option<&StoredIdentity>) -> QueryResult<Rc<dyn ChamaRegistry>> {
        Ok(Rc::new(ChamaRegistryClient {
            agent: self.agent(caller),
            canister_id: self.config.canisters.chama_management.clone(),
        }))
    }

    fn ledger(&self, caller: Option<&StoredIdentity>) -> QueryResult<Rc<dyn FinancialLedger>> {
        Ok(Rc::new(FinancialLedgerClient {
            agent: self.agent(caller),
            canister_id: self.config.canisters.financial_operations.clone(),
        }))
    }

    fn chat(&self, caller: Option<&StoredIdentity>) -> QueryResult<Rc<dyn ChatAssistant>> {
        let canister_id = self.config.canisters.ai_chatbot()?.to_string();
        Ok(Rc::new(ChatAssistantClient {
            agent: self.agent(caller),
            canister_id,
        }))
    }
}

pub struct UserRegistryClient {
    agent: CanisterAgent,
    canister_id: String,
}

#[async_trait(?Send)]
impl UserRegistry for UserRegistryClient {
    async fn register_user(
        &self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> CallResult<User, UserError> {
        self.agent
            .invoke_result(&self.canister_id, Update, "registerUser", json!([name, email, phone]))
            .await
    }

    async fn get_my_profile(&self) -> QueryResult<Option<User>> {
        self.agent
            .invoke(&self.canister_id, Query, "getMyProfile", json!([]))
            .await
    }

    async fn get_user_profile(&self, user: &Principal) -> QueryResult<Option<User>> {
        self.agent
            .invoke(&self.canister_id, Query, "getUserProfile", json!([user]))
            .await
    }

    async fn update_profile(
        &self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> CallResult<User, UserError> {
        self.agent
            .invoke_result(&self.canister_id, Update, "updateProfile", json!([name, email, phone]))
            .await
    }

    async fn verify_user(&self, level: VerificationLevel) -> CallResult<User, UserError> {
        self.agent
            .invoke_result(&self.canister_id, Update, "verifyUser", json!([level]))
            .await
    }

    async fn get_my_stats(&self) -> QueryResult<Option<UserStats>> {
        self.agent
            .invoke(&self.canister_id, Query, "getMyStats", json!([]))
            .await
    }

    async fn search_users(&self, query: &str) -> QueryResult<Vec<User>> {
        self.agent
            .invoke(&self.canister_id, Query, "searchUsers", json!([query]))
            .await
    }

    async fn get_all_users(&self, filter: Option<&UserFilter>) -> QueryResult<Vec<User>> {
        self.agent
            .invoke(&self.canister_id, Query, "getAllUsers", json!([filter]))
            .await
    }

    async fn get_user_count(&self) -> QueryResult<u64> {
        self.agent
            .invoke(&self.canister_id, Query, "getUserCount", json!([]))
            .await
    }

    async fn add_chama_to_user(&self, user: &Principal, chama_id: &str) -> QueryResult<bool> {
        self.agent
            .invoke(&self.canister_id, Update, "addChamaToUser", json!([user, chama_id]))
            .await
    }

    async fn health_check(&self) -> QueryResult<String> {
        self.agent
            .invoke(&self.canister_id, Query, "healthCheck", json!([]))
            .await
    }
}

pub struct ChamaRegistryClient {
    agent: CanisterAgent,
    canister_id: String,
}

#[async_trait(?Send)]
impl ChamaRegistry for ChamaRegistryClient {
    async fn create_chama(&self, chama: &NewChama) -> CallResult<Chama, ChamaError> {
        let args = json!([
            chama.name,
            chama.description,
            chama.contribution_amount,
            chama.contribution_frequency,
            chama.chama_type,
            chama.max_members,
            chama.settings(),
        ]);
        self.agent
            .invoke_result(&self.canister_id, Update, "createChama", args)
            .await
    }

    async fn get_chama(&self, chama_id: &str) -> QueryResult<Option<Chama>> {
        self.agent
            .invoke(&self.canister_id, Query, "getChama", json!([chama_id]))
            .await
    }

    async fn update_chama(&self, chama_id: &str, chama: &Chama) -> CallResult<Chama, ChamaError> {
        self.agent
            .invoke_result(&self.canister_id, Update, "updateChama", json!([chama_id, chama]))
            .await
    }

    async fn join_chama(&self, chama_id: &str) -> CallResult<Chama, ChamaError> {
        self.agent
            .invoke_result(&self.canister_id, Update, "joinChama", json!([chama_id]))
            .await
    }

    async fn add_member(&self, chama_id: &str, user: &Principal) -> CallResult<Chama, ChamaError> {
        self.agent
            .invoke_result(&self.canister_id, Update, "addMember", json!([chama_id, user]))
            .await
    }

    async fn remove_member(
        &self,
        chama_id: &str,
        user: &Principal,
    ) -> CallResult<Chama, ChamaError> {
        self.agent
            .invoke_result(&self.canister_id, Update, "removeMember", json!([chama_id, user]))
            .await
    }

    async fn update_member_role(
        &self,
        chama_id: &str,
        user: &Principal,
        role: MemberRole,
    ) -> CallResult<Chama, ChamaError> {
        self.agent
            .invoke_result(
                &self.canister_id,
                Update,
                "updateMemberRole",
                json!([chama_id, user, role]),
            )
            .await
    }

    async fn get_chamas_by_creator(&self, creator: &Principal) -> QueryResult<Vec<Chama>> {
        self.agent
            .invoke(&self.canister_id, Query, "getChamasByCreator", json!([creator]))
            .await
    }

    async fn get_chamas_by_member(&self, member: &Principal) -> QueryResult<Vec<Chama>> {
        self.agent
            .invoke(&self.canister_id, Query, "getChamasByMember", json!([member]))
            .await
    }

    async fn get_my_chamas(&self) -> QueryResult<Vec<Chama>> {
        self.agent
            .invoke(&self.canister_id, Query, "getMyChamas", json!([]))
            .await
    }

    async fn get_public_chamas(&self, filter: Option<&ChamaFilter>) -> QueryResult<Vec<Chama>> {
        self.agent
            .invoke(&self.canister_id, Query, "getPublicChamas", json!([filter]))
            .await
    }

    async fn search_chamas(&self, query: &str) -> QueryResult<Vec<Chama>> {
        self.agent
            .invoke(&self.canister_id, Query, "searchChamas", json!([query]))
            .await
    }

    async fn get_chama_count(&self) -> QueryResult<u64> {
        self.agent
            .invoke(&self.canister_id, Query, "getChamaCount", json!([]))
            .await
    }

    async fn health_check(&self) -> QueryResult<String> {
        self.agent
            .invoke(&self.canister_id, Query, "healthCheck", json!([]))
            .await
    }
}

pub struct FinancialLedgerClient {
    agent: CanisterAgent,
    canister_id: String,
}

#[async_trait(?Send)]
impl FinancialLedger for FinancialLedgerClient {
    async fn record_contribution(
        &self,
        chama_id: &str,
        amount: u64,
        description: &str,
    ) -> CallResult<Transaction, TransactionError> {
        self.agent
            .invoke_result(
                &self.canister_id,
                Update,
                "recordContribution",
                json!([chama_id, amount, description]),
            )
            .await
    }

    async fn process_withdrawal(
        &self,
        chama_id: &str,
        amount: u64,
        description: &str,
    ) -> CallResult<Transaction, TransactionError> {
        self.agent
            .invoke_result(
                &self.canister_id,
                Update,
                "processWithdrawal",
                json!([chama_id, amount, description]),
            )
            .await
    }

    async fn record_loan(
        &self,
        chama_id: &str,
        borrower: &Principal,
        amount: u64,
        description: &str,
    ) -> CallResult<Transaction, TransactionError> {
        self.agent
            .invoke_result(
                &self.canister_id,
                Update,
                "recordLoan",
                json!([chama_id, borrower, amount, description]),
            )
            .await
    }

    async fn record_repayment(
        &self,
        chama_id: &str,
        amount: u64,
        description: &str,
    ) -> CallResult<Transaction, TransactionError> {
        self.agent
            .invoke_result(
                &self.canister_id,
                Update,
                "recordRepayment",
                json!([chama_id, amount, description]),
            )
            .await
    }

    async fn get_transaction(&self, transaction_id: &str) -> QueryResult<Option<Transaction>> {
        self.agent
            .invoke(&self.canister_id, Query, "getTransaction", json!([transaction_id]))
            .await
    }

    async fn update_transaction_status(
        &self,
        transaction_id: &str,
        status: TransactionStatus,
    ) -> CallResult<Transaction, TransactionError> {
        self.agent
            .invoke_result(
                &self.canister_id,
                Update,
                "updateTransactionStatus",
                json!([transaction_id, status]),
            )
            .await
    }

    async fn get_user_balance(&self, chama_id: &str, user: &Principal) -> QueryResult<Balance> {
        self.agent
            .invoke(&self.canister_id, Query, "getUserBalance", json!([chama_id, user]))
            .await
    }

    async fn get_my_balance(&self, chama_id: &str) -> QueryResult<Balance> {
        self.agent
            .invoke(&self.canister_id, Query, "getMyBalance", json!([chama_id]))
            .await
    }

    async fn get_chama_treasury_balance(&self, chama_id: &str) -> QueryResult<u64> {
        self.agent
            .invoke(
                &self.canister_id,
                Query,
                "getChamaTreasuryBalance",
                json!([chama_id]),
            )
            .await
    }

    async fn get_transactions_by_chama(
        &self,
        chama_id: &str,
        limit: Option<u64>,
    ) -> QueryResult<Vec<Transaction>> {
        self.agent
            .invoke(
                &self.canister_id,
                Query,
                "getTransactionsByChama",
                json!([chama_id, limit]),
            )
            .await
    }

    async fn get_transactions_by_user(
        &self,
        user: &Principal,
        limit: Option<u64>,
    ) -> QueryResult<Vec<Transaction>> {
        self.agent
            .invoke(
                &self.canister_id,
                Query,
                "getTransactionsByUser",
                json!([user, limit]),
            )
            .await
    }

    async fn get_my_transactions(&self, limit: Option<u64>) -> QueryResult<Vec<Transaction>> {
        self.agent
            .invoke(&self.canister_id, Query, "getMyTransactions", json!([limit]))
            .await
    }

    async fn get_filtered_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> QueryResult<Vec<Transaction>> {
        self.agent
            .invoke(
                &self.canister_id,
                Query,
                "getFilteredTransactions",
                json!([filter]),
            )
            .await
    }

    async fn get_chama_transaction_stats(&self, chama_id: &str) -> QueryResult<TransactionStats> {
        self.agent
            .invoke(
                &self.canister_id,
                Query,
                "getChamaTransactionStats",
                json!([chama_id]),
            )
            .await
    }

    async fn get_transaction_count(&self) -> QueryResult<u64> {
        self.agent
            .invoke(&self.canister_id, Query, "getTransactionCount", json!([]))
            .await
    }

    async fn health_check(&self) -> QueryResult<String> {
        self.agent
            .invoke(&self.canister_id, Query, "healthCheck", json!([]))
            .await
    }
}

pub struct ChatAssistantClient {
    agent: CanisterAgent,
    canister_id: String,
}

#[async_trait(?Send)]
impl ChatAssistant for ChatAssistantClient {
    async fn start_chat_session(&self) -> QueryResult<String> {
        self.agent
            .invoke(&self.canister_id, Update, "startChatSession", json!([]))
            .await
    }

    async fn send_message(
        &self,
        session_id: &str,
        message: &str,
        context: Option<&str>,
    ) -> QueryResult<ChatResponse> {
        self.agent
            .invoke(
                &self.canister_id,
                Update,
                "sendMessage",
                json!([session_id, message, context]),
            )
            .await
    }

    async fn get_chat_history(&self, session_id: &str) -> QueryResult<Option<ChatSession>> {
        self.agent
            .invoke(&self.canister_id, Query, "getChatHistory", json!([session_id]))
            .await
    }

    async fn get_my_sessions(&self) -> QueryResult<Vec<ChatSession>> {
        self.agent
            .invoke(&self.canister_id, Query, "getMySessions", json!([]))
            .await
    }

    async fn end_chat_session(&self, session_id: &str) -> QueryResult<bool> {
        self.agent
            .invoke(&self.canister_id, Update, "endChatSession", json!([session_id]))
            .await
    }

    async fn get_capabilities(&self) -> QueryResult<ChatbotCapabilities> {
        self.agent
            .invoke(&self.canister_id, Query, "getChatbotCapabilities", json!([]))
            .await
    }

    async fn health_check(&self) -> QueryResult<String> {
        self.agent
            .invoke(&self.canister_id, Query, "healthCheck", json!([]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;

    #[test]
    fn test_chat_requires_configured_canister() {
        let connector = CanisterConnector::new(ClientConfig::default());
        assert!(matches!(
            connector.chat(None),
            Err(TransportError::Config(_))
        ));

        let mut config = ClientConfig::default();
        config.canisters.ai_chatbot = Some("be2us-64aaa-aaaaa-qaabq-cai".into());
        assert!(CanisterConnector::new(config).chat(None).is_ok());
    }
}
