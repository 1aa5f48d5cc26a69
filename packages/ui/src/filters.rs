//! Client-side narrowing of lists the page has already fetched.
//!
//! Each query combines a free-text search with the structured filter the backend also
//! understands. Applying a query only ever removes items, and a default query keeps
//! everything in its original order.

use api::models::{
    Chama, ChamaFilter, Transaction, TransactionStatus, TransactionType, User, UserFilter,
};

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn folded(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_lowercase())
}

/// Contribution brackets offered on the discovery page, as `(key, label, range)`.
pub const CONTRIBUTION_BRACKETS: [(&str, &str, (u64, u64)); 4] = [
    ("100-1000", "KES 100 - 1,000", (100, 1_000)),
    ("1000-5000", "KES 1,000 - 5,000", (1_000, 5_000)),
    ("5000-10000", "KES 5,000 - 10,000", (5_000, 10_000)),
    ("10000-50000", "KES 10,000+", (10_000, 50_000)),
];

pub fn bracket_from_key(key: &str) -> Option<(u64, u64)> {
    CONTRIBUTION_BRACKETS
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, _, range)| *range)
}

pub fn bracket_key(range: Option<(u64, u64)>) -> &'static str {
    range
        .and_then(|r| CONTRIBUTION_BRACKETS.iter().find(|(_, _, b)| *b == r))
        .map(|(k, _, _)| *k)
        .unwrap_or("")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserQuery {
    pub text: String,
    pub filter: UserFilter,
    pub max_results: Option<usize>,
}

impl UserQuery {
    pub fn matches(&self, user: &User) -> bool {
        let text_ok = folded(&self.text).is_none_or(|q| {
            contains_folded(&user.name, &q) || contains_folded(&user.email, &q)
        });
        text_ok && self.filter.matches(user)
    }

    pub fn apply(&self, users: &[User]) -> Vec<User> {
        users
            .iter()
            .filter(|u| self.matches(u))
            .take(self.max_results.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// Whether any structured filter is set. The text box is not counted.
    pub fn has_filters(&self) -> bool {
        self.filter != UserFilter::default()
    }

    /// Clear text and filters; the result limit stays.
    pub fn clear(&mut self) {
        self.text.clear();
        self.filter = UserFilter::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChamaQuery {
    pub text: String,
    pub filter: ChamaFilter,
}

impl ChamaQuery {
    pub fn matches(&self, chama: &Chama) -> bool {
        let text_ok = folded(&self.text).is_none_or(|q| {
            contains_folded(&chama.name, &q) || contains_folded(&chama.description, &q)
        });
        text_ok && self.filter.matches(chama)
    }

    pub fn apply(&self, chamas: &[Chama]) -> Vec<Chama> {
        chamas.iter().filter(|c| self.matches(c)).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.filter == ChamaFilter::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub text: String,
    pub transaction_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
}

impl TransactionQuery {
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.transaction_type
            .is_none_or(|ty| tx.transaction_type == ty)
            && self.status.is_none_or(|status| tx.status == status)
            && folded(&self.text).is_none_or(|q| {
                contains_folded(&tx.description, &q) || contains_folded(&tx.id, &q)
            })
    }

    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{chama, transaction, user};
    use api::models::{ChamaType, VerificationLevel};

    #[test]
    fn test_user_query_text_and_filter() {
        let mut verified = user("bbbbb-bb", "Otieno Odhiambo");
        verified.is_verified = true;
        verified.verification_level = VerificationLevel::Intermediate;
        let users = vec![user("aaaaa-aa", "Wanjiku Kamau"), verified];

        let query = UserQuery {
            text: "  WANJIKU ".into(),
            ..Default::default()
        };
        assert_eq!(query.apply(&users).len(), 1);

        let query = UserQuery {
            filter: UserFilter {
                is_verified: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let found = query.apply(&users);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Otieno Odhiambo");
        assert!(query.has_filters());
    }

    #[test]
    fn test_user_query_clear_restores_list() {
        let mut verified = user("bbbbb-bb", "Otieno Odhiambo");
        verified.is_verified = true;
        let all = vec![user("aaaaa-aa", "Wanjiku Kamau"), verified];

        let mut query = UserQuery::default();
        assert_eq!(query.apply(&all), all);

        query.text = "otieno".into();
        query.filter.is_verified = Some(true);
        assert_eq!(query.apply(&all).len(), 1);

        query.clear();
        assert!(!query.has_filters());
        assert_eq!(query.apply(&all), all);
    }

    #[test]
    fn test_user_query_limit() {
        let users: Vec<_> = (0..5).map(|i| user("aaaaa-aa", &format!("Member {i}"))).collect();
        let query = UserQuery {
            max_results: Some(3),
            ..Default::default()
        };
        assert_eq!(query.apply(&users).len(), 3);
    }

    #[test]
    fn test_chama_query_never_grows_and_clears() {
        let mut invest = chama("c2", "Vijana Investment Club", 2_000);
        invest.chama_type = ChamaType::Investment;
        let all = vec![chama("c1", "Umoja Savings", 5_000), invest];

        let mut query = ChamaQuery::default();
        assert!(query.is_empty());
        assert_eq!(query.apply(&all), all);

        query.text = "club".into();
        query.filter.contribution_range = bracket_from_key("1000-5000");
        let narrowed = query.apply(&all);
        assert!(narrowed.len() <= all.len());
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].id, "c2");

        query.filter.chama_type = Some(ChamaType::Savings);
        assert!(query.apply(&all).is_empty());

        query.clear();
        assert_eq!(query.apply(&all), all);
    }

    #[test]
    fn test_transaction_query() {
        let all = vec![
            transaction("tx_1", 5_000, TransactionType::Contribution, "March (MPESA)"),
            transaction("tx_2", 1_000, TransactionType::Withdrawal, "School fees"),
        ];
        let query = TransactionQuery {
            text: "mpesa".into(),
            ..Default::default()
        };
        assert_eq!(query.apply(&all).len(), 1);

        let query = TransactionQuery {
            transaction_type: Some(TransactionType::Withdrawal),
            ..Default::default()
        };
        assert_eq!(query.apply(&all)[0].id, "tx_2");

        let query = TransactionQuery {
            text: "TX_".into(),
            ..Default::default()
        };
        assert_eq!(query.apply(&all).len(), 2);
        assert!(TransactionQuery::default().is_empty());
    }

    #[test]
    fn test_empty_transaction_query_keeps_everything() {
        let all = vec![
            transaction("tx_1", 5_000, TransactionType::Contribution, "March (MPESA)"),
            transaction("tx_2", 1_000, TransactionType::Withdrawal, "School fees"),
            transaction("tx_3", 2_000, TransactionType::Loan, "Stock for the shop"),
        ];
        let query = TransactionQuery::default();
        assert!(query.is_empty());
        assert_eq!(query.apply(&all), all);
    }

    #[test]
    fn test_brackets() {
        assert_eq!(bracket_from_key("5000-10000"), Some((5_000, 10_000)));
        assert_eq!(bracket_from_key(""), None);
        assert_eq!(bracket_key(Some((100, 1_000))), "100-1000");
        assert_eq!(bracket_key(None), "");
    }
}
