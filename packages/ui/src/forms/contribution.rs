//! Recording a contribution against a chama.

use api::models::Transaction;
use api::{FinancialService, ServiceError};

use super::FieldErrors;

pub const MIN_AMOUNT: u64 = 1;
pub const MAX_AMOUNT: u64 = 1_000_000;

/// Multipliers offered as quick-amount buttons.
pub const QUICK_MULTIPLIERS: [u64; 3] = [1, 2, 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaymentMethod {
    #[default]
    Mpesa,
    Bank,
    Cash,
    Airtel,
    Equity,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        Self::Mpesa,
        Self::Bank,
        Self::Cash,
        Self::Airtel,
        Self::Equity,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Mpesa => "mpesa",
            Self::Bank => "bank",
            Self::Cash => "cash",
            Self::Airtel => "airtel",
            Self::Equity => "equity",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mpesa => "M-Pesa",
            Self::Bank => "Bank Transfer",
            Self::Cash => "Cash",
            Self::Airtel => "Airtel Money",
            Self::Equity => "Equitel",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }

    /// Mobile money leaves an SMS reference that the treasurer checks against.
    pub fn needs_reference(self) -> bool {
        matches!(self, Self::Mpesa | Self::Airtel | Self::Equity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContributionField {
    Amount,
    Description,
    Reference,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContributionForm {
    pub amount: String,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContributionError {
    #[error("Please fix the highlighted fields")]
    Invalid(FieldErrors<ContributionField>),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Parse the amount box as typed. Bounds are checked on this value.
pub fn parse_amount(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite())
}

/// Round a validated amount to whole shillings for the ledger.
pub fn whole_shillings(amount: f64) -> u64 {
    amount.round().max(0.0) as u64
}

impl ContributionForm {
    /// A blank form pre-filled with the chama's regular contribution.
    pub fn for_amount(contribution_amount: u64) -> Self {
        Self {
            amount: contribution_amount.to_string(),
            description: String::new(),
            payment_method: PaymentMethod::default(),
            reference: String::new(),
        }
    }

    pub fn apply_quick_amount(&mut self, contribution_amount: u64, multiplier: u64) {
        self.amount = contribution_amount.saturating_mul(multiplier).to_string();
    }

    pub fn validate(&self) -> FieldErrors<ContributionField> {
        let mut errors = FieldErrors::default();

        match parse_amount(&self.amount) {
            None => errors.set(ContributionField::Amount, "Valid amount is required"),
            Some(a) if a < MIN_AMOUNT as f64 => {
                errors.set(ContributionField::Amount, "Amount must be at least KES 1")
            }
            Some(a) if a > MAX_AMOUNT as f64 => {
                errors.set(ContributionField::Amount, "Amount cannot exceed KES 1,000,000")
            }
            Some(_) => {}
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.set(ContributionField::Description, "Description is required");
        } else if description.chars().count() < 5 {
            errors.set(
                ContributionField::Description,
                "Description must be at least 5 characters",
            );
        }

        if self.payment_method.needs_reference() {
            let reference = self.reference.trim();
            if reference.is_empty() {
                errors.set(
                    ContributionField::Reference,
                    "Transaction reference is required for mobile payments",
                );
            } else if reference.chars().count() < 8 {
                errors.set(ContributionField::Reference, "Invalid transaction reference format");
            }
        }

        errors
    }

    /// The ledger description: `"{desc} ({METHOD}[ - ref])"`.
    pub fn ledger_description(&self) -> String {
        let method = self.payment_method.key().to_uppercase();
        let reference = self.reference.trim();
        if reference.is_empty() {
            format!("{} ({method})", self.description.trim())
        } else {
            format!("{} ({method} - {reference})", self.description.trim())
        }
    }

    /// Validate, then record the contribution. An invalid form makes no call.
    pub async fn submit(
        &self,
        chama_id: &str,
        financial: &FinancialService,
    ) -> Result<Transaction, ContributionError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(ContributionError::Invalid(errors));
        }
        let amount = parse_amount(&self.amount).map(whole_shillings).unwrap_or_default();
        let tx = financial
            .record_contribution(chama_id, amount, &self.ledger_description())
            .await?;
        tracing::info!("Recorded contribution {} of {} to {}", tx.id, amount, chama_id);
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::signed_in_with_chama;

    fn valid() -> ContributionForm {
        ContributionForm {
            amount: "5000".into(),
            description: "March contribution".into(),
            payment_method: PaymentMethod::Mpesa,
            reference: "QGH7XJ8K9L".into(),
        }
    }

    #[test]
    fn test_amount_bounds() {
        for (amount, message) in [
            ("", "Valid amount is required"),
            ("abc", "Valid amount is required"),
            ("0", "Amount must be at least KES 1"),
            ("-20", "Amount must be at least KES 1"),
            ("0.6", "Amount must be at least KES 1"),
            ("1000001", "Amount cannot exceed KES 1,000,000"),
            ("1000000.4", "Amount cannot exceed KES 1,000,000"),
        ] {
            let form = ContributionForm {
                amount: amount.into(),
                ..valid()
            };
            assert_eq!(form.validate().get(ContributionField::Amount), Some(message), "{amount}");
        }
        for amount in ["1", "1000000", "2500.4"] {
            let form = ContributionForm {
                amount: amount.into(),
                ..valid()
            };
            assert!(form.validate().is_empty(), "{amount}");
        }
    }

    #[test]
    fn test_description_length() {
        let form = ContributionForm {
            description: "  Jan ".into(),
            ..valid()
        };
        assert_eq!(
            form.validate().get(ContributionField::Description),
            Some("Description must be at least 5 characters")
        );
    }

    #[test]
    fn test_reference_rule_only_for_mobile_money() {
        let form = ContributionForm {
            reference: "QGH7".into(),
            ..valid()
        };
        assert_eq!(
            form.validate().get(ContributionField::Reference),
            Some("Invalid transaction reference format")
        );

        let form = ContributionForm {
            payment_method: PaymentMethod::Airtel,
            reference: String::new(),
            ..valid()
        };
        assert_eq!(
            form.validate().get(ContributionField::Reference),
            Some("Transaction reference is required for mobile payments")
        );

        for method in [PaymentMethod::Bank, PaymentMethod::Cash] {
            let form = ContributionForm {
                payment_method: method,
                reference: String::new(),
                ..valid()
            };
            assert!(form.validate().is_empty());
        }
    }

    #[test]
    fn test_ledger_description() {
        assert_eq!(
            valid().ledger_description(),
            "March contribution (MPESA - QGH7XJ8K9L)"
        );
        let cash = ContributionForm {
            payment_method: PaymentMethod::Cash,
            reference: String::new(),
            ..valid()
        };
        assert_eq!(cash.ledger_description(), "March contribution (CASH)");
    }

    #[test]
    fn test_quick_amounts() {
        let mut form = ContributionForm::for_amount(5_000);
        assert_eq!(form.amount, "5000");
        form.apply_quick_amount(5_000, QUICK_MULTIPLIERS[2]);
        assert_eq!(form.amount, "15000");
    }

    #[tokio::test]
    async fn test_fractional_amount_recorded_in_whole_shillings() {
        let (_backend, services, chama_id) = signed_in_with_chama().await;
        let form = ContributionForm {
            amount: "2500.6".into(),
            ..valid()
        };
        let tx = form.submit(&chama_id, &services.financial).await.unwrap();
        assert_eq!(tx.amount, 2_501);
    }

    #[tokio::test]
    async fn test_repeated_submit_while_in_flight_records_once() {
        let (backend, services, chama_id) = signed_in_with_chama().await;
        let form = valid();
        let mut latch = crate::forms::InFlight::default();
        let mut pending = Vec::new();
        for _ in 0..2 {
            if latch.try_begin() {
                pending.push(form.submit(&chama_id, &services.financial));
            }
        }
        assert_eq!(pending.len(), 1);
        for submission in pending {
            submission.await.unwrap();
        }
        latch.finish();
        assert_eq!(backend.transaction_total(), 1);
    }

    #[tokio::test]
    async fn test_valid_submit_records_once() {
        let (backend, services, chama_id) = signed_in_with_chama().await;
        let tx = valid().submit(&chama_id, &services.financial).await.unwrap();
        assert_eq!(tx.amount, 5_000);
        assert_eq!(tx.description, "March contribution (MPESA - QGH7XJ8K9L)");
        assert_eq!(backend.transaction_total(), 1);
    }

    #[tokio::test]
    async fn test_invalid_submit_makes_no_call() {
        let (backend, services, chama_id) = signed_in_with_chama().await;
        let form = ContributionForm {
            amount: "0".into(),
            ..valid()
        };
        let err = form.submit(&chama_id, &services.financial).await.unwrap_err();
        assert!(matches!(err, ContributionError::Invalid(_)));
        assert_eq!(backend.transaction_total(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_is_reported() {
        let (backend, services, chama_id) = signed_in_with_chama().await;
        backend.set_offline(true);
        let err = valid().submit(&chama_id, &services.financial).await.unwrap_err();
        assert!(matches!(err, ContributionError::Service(_)));
        assert!(err.to_string().starts_with("Network connection failed"));
    }
}
