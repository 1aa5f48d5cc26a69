//! Display formatting for amounts, counts and statuses.

use api::models::{ChamaStatus, TransactionStatus, TransactionType, VerificationLevel};

/// Group the digits of `n` in threes: `12500` becomes `"12,500"`.
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `"KES 12,500"`
pub fn kes(amount: u64) -> String {
    format!("KES {}", group_digits(amount))
}

/// Like [`kes`] but for net figures that may be negative.
pub fn kes_signed(amount: i128) -> String {
    let magnitude = u64::try_from(amount.unsigned_abs()).unwrap_or(u64::MAX);
    if amount < 0 {
        format!("-{}", kes(magnitude))
    } else {
        kes(magnitude)
    }
}

/// Amount with a sign for ledger rows: money in is `+`, money out is `-`.
pub fn signed_amount(amount: u64, ty: TransactionType) -> String {
    let sign = if ty.is_credit() { '+' } else { '-' };
    format!("{sign}{}", kes(amount))
}

pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// CSS modifier for a chama status badge.
pub fn chama_status_class(status: ChamaStatus) -> &'static str {
    match status {
        ChamaStatus::Active => "badge--success",
        ChamaStatus::Forming => "badge--info",
        ChamaStatus::Suspended => "badge--warning",
        ChamaStatus::Dissolved => "badge--muted",
    }
}

pub fn transaction_status_class(status: TransactionStatus) -> &'static str {
    match status {
        TransactionStatus::Completed => "badge--success",
        TransactionStatus::Pending => "badge--warning",
        TransactionStatus::Failed | TransactionStatus::Disputed => "badge--danger",
        TransactionStatus::Cancelled => "badge--muted",
    }
}

pub fn verification_class(level: VerificationLevel) -> &'static str {
    match level {
        VerificationLevel::Basic => "badge--muted",
        VerificationLevel::Intermediate => "badge--info",
        VerificationLevel::Advanced => "badge--success",
    }
}

/// Credit scores are shown as whole numbers out of 100.
pub fn credit_score(score: f64) -> String {
    format!("{:.0}/100", score.clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1_000), "1,000");
        assert_eq!(group_digits(12_500), "12,500");
        assert_eq!(group_digits(1_000_000), "1,000,000");
    }

    #[test]
    fn test_kes() {
        assert_eq!(kes(12_500), "KES 12,500");
        assert_eq!(kes_signed(-2_500), "-KES 2,500");
        assert_eq!(kes_signed(10_000), "KES 10,000");
    }

    #[test]
    fn test_signed_amount() {
        assert_eq!(signed_amount(5_000, TransactionType::Contribution), "+KES 5,000");
        assert_eq!(signed_amount(5_000, TransactionType::Withdrawal), "-KES 5,000");
    }

    #[test]
    fn test_plural_and_score() {
        assert_eq!(plural(1, "member", "members"), "1 member");
        assert_eq!(plural(3, "member", "members"), "3 members");
        assert_eq!(credit_score(72.6), "73/100");
        assert_eq!(credit_score(140.0), "100/100");
    }
}
