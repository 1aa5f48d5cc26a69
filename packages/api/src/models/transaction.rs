use std::fmt;

use serde::{Deserialize, Serialize};

use super::chama::variant_enum;
use super::{ChamaId, Principal, Timestamp};

pub type TransactionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionType {
    Contribution,
    Withdrawal,
    Loan,
    Repayment,
    Penalty,
    Dividend,
    Expense,
    Refund,
}

variant_enum!(TransactionType {
    Contribution => ("contribution", "Contribution"),
    Withdrawal => ("withdrawal", "Withdrawal"),
    Loan => ("loan", "Loan"),
    Repayment => ("repayment", "Repayment"),
    Penalty => ("penalty", "Penalty"),
    Dividend => ("dividend", "Dividend"),
    Expense => ("expense", "Expense"),
    Refund => ("refund", "Refund"),
});

impl TransactionType {
    /// Money flowing into the member's position (shown in green).
    pub fn is_credit(self) -> bool {
        matches!(
            self,
            Self::Contribution | Self::Repayment | Self::Dividend | Self::Refund
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionCategory {
    RegularContribution,
    CatchUpContribution,
    Emergency,
    Investment,
    Loan,
    Administrative,
    Social,
}

variant_enum!(TransactionCategory {
    RegularContribution => ("regularContribution", "Regular Contribution"),
    CatchUpContribution => ("catchUpContribution", "Catch-up Contribution"),
    Emergency => ("emergency", "Emergency"),
    Investment => ("investment", "Investment"),
    Loan => ("loan", "Loan"),
    Administrative => ("administrative", "Administrative"),
    Social => ("social", "Social"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
    Disputed,
}

variant_enum!(TransactionStatus {
    Pending => ("pending", "Pending"),
    Completed => ("completed", "Completed"),
    Failed => ("failed", "Failed"),
    Cancelled => ("cancelled", "Cancelled"),
    Disputed => ("disputed", "Disputed"),
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMetadata {
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub approved_by: Vec<Principal>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub chama_id: ChamaId,
    pub user_id: Principal,
    pub amount: u64,
    pub transaction_type: TransactionType,
    pub category: TransactionCategory,
    pub description: String,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub processed_by: Option<Principal>,
    pub status: TransactionStatus,
    #[serde(default)]
    pub metadata: Option<TransactionMetadata>,
}

/// Per-chama aggregates reported by the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStats {
    pub total_transactions: u64,
    pub total_contributions: u64,
    pub total_withdrawals: u64,
    pub total_loans: u64,
    pub average_transaction: u64,
    #[serde(default)]
    pub last_transaction_time: Option<Timestamp>,
}

/// What one member has put into and taken out of one chama.
///
/// On the wire this is the `(contributions, withdrawals)` tuple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u64, u64)", into = "(u64, u64)")]
pub struct Balance {
    pub contributions: u64,
    pub withdrawals: u64,
}

impl Balance {
    pub fn net(&self) -> i128 {
        i128::from(self.contributions) - i128::from(self.withdrawals)
    }
}

impl From<(u64, u64)> for Balance {
    fn from((contributions, withdrawals): (u64, u64)) -> Self {
        Self {
            contributions,
            withdrawals,
        }
    }
}

impl From<Balance> for (u64, u64) {
    fn from(balance: Balance) -> Self {
        (balance.contributions, balance.withdrawals)
    }
}

/// Server-side filter for `get_filtered_transactions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    pub chama_id: Option<ChamaId>,
    pub user_id: Option<Principal>,
    pub transaction_type: Option<TransactionType>,
    pub date_range: Option<(Timestamp, Timestamp)>,
    pub min_amount: Option<u64>,
    pub max_amount: Option<u64>,
    pub status: Option<TransactionStatus>,
}

impl TransactionFilter {
    /// Whether `tx` satisfies every populated field. Used by the in-memory backend.
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.chama_id.as_ref().is_none_or(|id| &tx.chama_id == id)
            && self.user_id.as_ref().is_none_or(|id| &tx.user_id == id)
            && self
                .transaction_type
                .is_none_or(|ty| tx.transaction_type == ty)
            && self
                .date_range
                .is_none_or(|(from, to)| (from..=to).contains(&tx.timestamp))
            && self.min_amount.is_none_or(|min| tx.amount >= min)
            && self.max_amount.is_none_or(|max| tx.amount <= max)
            && self.status.is_none_or(|status| tx.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(amount: u64, ty: TransactionType) -> Transaction {
        Transaction {
            id: "t1".into(),
            chama_id: "c1".into(),
            user_id: Principal::anonymous(),
            amount,
            transaction_type: ty,
            category: TransactionCategory::RegularContribution,
            description: "June".into(),
            timestamp: 10,
            processed_by: None,
            status: TransactionStatus::Completed,
            metadata: None,
        }
    }

    #[test]
    fn test_balance_is_a_tuple_on_the_wire() {
        let balance: Balance = serde_json::from_str("[12500, 2500]").unwrap();
        assert_eq!(balance.contributions, 12_500);
        assert_eq!(balance.net(), 10_000);
        assert_eq!(serde_json::to_string(&balance).unwrap(), "[12500,2500]");
    }

    #[test]
    fn test_filter_matches() {
        let t = tx(5_000, TransactionType::Contribution);
        assert!(TransactionFilter::default().matches(&t));

        let filter = TransactionFilter {
            min_amount: Some(1_000),
            transaction_type: Some(TransactionType::Contribution),
            date_range: Some((0, 20)),
            ..Default::default()
        };
        assert!(filter.matches(&t));

        let filter = TransactionFilter {
            status: Some(TransactionStatus::Pending),
            ..Default::default()
        };
        assert!(!filter.matches(&t));
    }

    #[test]
    fn test_credit_types() {
        assert!(TransactionType::Contribution.is_credit());
        assert!(!TransactionType::Withdrawal.is_credit());
        assert_eq!(
            TransactionCategory::from_key("catchUpContribution"),
            Some(TransactionCategory::CatchUpContribution)
        );
    }
}
