use std::rc::Rc;

use super::{degrade, fail, HandleCache};
use crate::error::ServiceError;
use crate::models::{
    Balance, Principal, Transaction, TransactionFilter, TransactionStats, TransactionStatus,
};
use crate::remote::FinancialLedger;

#[derive(Clone)]
pub struct FinancialService {
    handle: Rc<HandleCache<dyn FinancialLedger>>,
}

impl FinancialService {
    pub(crate) fn new(handle: HandleCache<dyn FinancialLedger>) -> Self {
        Self {
            handle: Rc::new(handle),
        }
    }

    pub fn reset(&self) {
        self.handle.reset();
    }

    pub async fn record_contribution(
        &self,
        chama_id: &str,
        amount: u64,
        description: &str,
    ) -> Result<Transaction, ServiceError> {
        async {
            self.handle
                .get()?
                .record_contribution(chama_id, amount, description)
                .await
        }
        .await
        .map_err(|e| fail("Contribution recording failed", e))
    }

    pub async fn process_withdrawal(
        &self,
        chama_id: &str,
        amount: u64,
        description: &str,
    ) -> Result<Transaction, ServiceError> {
        async {
            self.handle
                .get()?
                .process_withdrawal(chama_id, amount, description)
                .await
        }
        .await
        .map_err(|e| fail("Withdrawal processing failed", e))
    }

    pub async fn record_loan(
        &self,
        chama_id: &str,
        borrower: &Principal,
        amount: u64,
        description: &str,
    ) -> Result<Transaction, ServiceError> {
        async {
            self.handle
                .get()?
                .record_loan(chama_id, borrower, amount, description)
                .await
        }
        .await
        .map_err(|e| fail("Loan recording failed", e))
    }

    pub async fn record_repayment(
        &self,
        chama_id: &str,
        amount: u64,
        description: &str,
    ) -> Result<Transaction, ServiceError> {
        async {
            self.handle
                .get()?
                .record_repayment(chama_id, amount, description)
                .await
        }
        .await
        .map_err(|e| fail("Repayment recording failed", e))
    }

    pub async fn get_transaction_by_id(&self, transaction_id: &str) -> Option<Transaction> {
        degrade(
            "Failed to get transaction by ID",
            async { self.handle.get()?.get_transaction(transaction_id).await }.await,
        )
    }

    pub async fn update_transaction_status(
        &self,
        transaction_id: &str,
        status: TransactionStatus,
    ) -> Result<Transaction, ServiceError> {
        async {
            self.handle
                .get()?
                .update_transaction_status(transaction_id, status)
                .await
        }
        .await
        .map_err(|e| fail("Transaction status update failed", e))
    }

    pub async fn get_user_balance(&self, chama_id: &str, user: &Principal) -> Balance {
        degrade(
            "Failed to get user balance",
            async { self.handle.get()?.get_user_balance(chama_id, user).await }.await,
        )
    }

    pub async fn get_my_balance(&self, chama_id: &str) -> Balance {
        degrade(
            "Failed to get my balance",
            async { self.handle.get()?.get_my_balance(chama_id).await }.await,
        )
    }

    pub async fn get_chama_treasury_balance(&self, chama_id: &str) -> u64 {
        degrade(
            "Failed to get treasury balance",
            async { self.handle.get()?.get_chama_treasury_balance(chama_id).await }.await,
        )
    }

    pub async fn get_transactions_by_chama(
        &self,
        chama_id: &str,
        limit: Option<u64>,
    ) -> Vec<Transaction> {
        degrade(
            "Failed to get chama transactions",
            async {
                self.handle
                    .get()?
                    .get_transactions_by_chama(chama_id, limit)
                    .await
            }
            .await,
        )
    }

    pub async fn get_transactions_by_user(
        &self,
        user: &Principal,
        limit: Option<u64>,
    ) -> Vec<Transaction> {
        degrade(
            "Failed to get user transactions",
            async { self.handle.get()?.get_transactions_by_user(user, limit).await }.await,
        )
    }

    pub async fn get_my_transactions(&self, limit: Option<u64>) -> Vec<Transaction> {
        degrade(
            "Failed to get my transactions",
            async { self.handle.get()?.get_my_transactions(limit).await }.await,
        )
    }

    pub async fn get_filtered_transactions(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        degrade(
            "Failed to get filtered transactions",
            async { self.handle.get()?.get_filtered_transactions(filter).await }.await,
        )
    }

    pub async fn get_chama_transaction_stats(&self, chama_id: &str) -> TransactionStats {
        degrade(
            "Failed to get transaction stats",
            async { self.handle.get()?.get_chama_transaction_stats(chama_id).await }.await,
        )
    }

    pub async fn get_transaction_count(&self) -> u64 {
        degrade(
            "Failed to get transaction count",
            async { self.handle.get()?.get_transaction_count().await }.await,
        )
    }

    pub async fn health_check(&self) -> String {
        async { self.handle.get()?.health_check().await }
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Financial service health check failed: {}", e);
                "Service unavailable".to_string()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::signed_in;
    use crate::error::{ServiceError, TransactionError};
    use crate::models::{Balance, ChamaType, ContributionFrequency, NewChama, TransactionStatus};

    async fn chama_id(services: &crate::services::AppServices) -> String {
        services
            .chamas
            .create_chama(&NewChama {
                name: "Umoja".into(),
                description: "Monthly savings".into(),
                contribution_amount: 5_000,
                contribution_frequency: ContributionFrequency::Monthly,
                chama_type: ChamaType::Savings,
                max_members: 10,
                is_public: true,
                require_approval: false,
                enable_ai: false,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_contribution_updates_balance() {
        let (_, _, services) = signed_in("aaaaa-aa");
        let id = chama_id(&services).await;
        let tx = services
            .financial
            .record_contribution(&id, 12_500, "March (MPESA - QWE123RTY)")
            .await
            .unwrap();
        assert_eq!(tx.status, TransactionStatus::Completed);

        assert_eq!(
            services.financial.get_my_balance(&id).await,
            Balance {
                contributions: 12_500,
                withdrawals: 0
            }
        );
        assert_eq!(services.financial.get_my_transactions(None).await.len(), 1);
        assert_eq!(services.financial.get_transaction_count().await, 1);
        assert_eq!(
            services.financial.get_transaction_by_id(&tx.id).await,
            Some(tx)
        );
    }

    #[tokio::test]
    async fn test_ledger_errors_become_messages() {
        let (_, _, services) = signed_in("aaaaa-aa");
        let id = chama_id(&services).await;
        let err = services
            .financial
            .process_withdrawal(&id, 1_000, "Emergency")
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::Transaction(TransactionError::InsufficientFunds));
        assert_eq!(err.to_string(), "Insufficient funds");
    }

    #[tokio::test]
    async fn test_reads_degrade_to_zero() {
        let (backend, _, services) = signed_in("aaaaa-aa");
        backend.set_offline(true);
        assert_eq!(services.financial.get_my_balance("c").await, Balance::default());
        assert_eq!(services.financial.get_chama_treasury_balance("c").await, 0);
        assert_eq!(
            services.financial.get_chama_transaction_stats("c").await,
            Default::default()
        );
    }
}
