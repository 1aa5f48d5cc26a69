//! # User registry records
//!
//! [`User`] is the identity-bound profile kept by the user-registry canister. It is
//! created once through registration and mutated through profile updates and
//! verification upgrades; the client never deletes it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Principal, Timestamp};

/// Tiered trust status. Higher tiers unlock more features on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationLevel {
    Basic,
    Intermediate,
    Advanced,
}

impl VerificationLevel {
    pub const ALL: [VerificationLevel; 3] = [Self::Basic, Self::Intermediate, Self::Advanced];

    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// Wire name, also used as the value of `<select>` options.
    pub fn key(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.key() == key)
    }

    /// The tier a user can request next, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Basic => Some(Self::Intermediate),
            Self::Intermediate => Some(Self::Advanced),
            Self::Advanced => None,
        }
    }
}

impl fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Principal,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub is_verified: bool,
    pub verification_level: VerificationLevel,
    pub credit_score: f64,
    pub total_contributions: u64,
    pub total_withdrawals: u64,
    #[serde(default)]
    pub chamas_joined: Vec<String>,
    #[serde(default)]
    pub chamas_created: Vec<String>,
}

impl User {
    /// Up to two initials for avatar placeholders.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }

    pub fn net_savings(&self) -> i128 {
        i128::from(self.total_contributions) - i128::from(self.total_withdrawals)
    }
}

/// Aggregates computed by the registry for the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user_id: Principal,
    pub total_savings: u64,
    pub average_contribution: u64,
    pub contribution_streak: u64,
    pub risk_score: f64,
    pub reliability_score: f64,
    pub last_activity: Timestamp,
}

/// Server-side filter for `get_all_users`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    pub is_verified: Option<bool>,
    pub verification_level: Option<VerificationLevel>,
    pub min_credit_score: Option<f64>,
    pub chama_id: Option<String>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.is_verified.is_none_or(|v| user.is_verified == v)
            && self
                .verification_level
                .is_none_or(|level| user.verification_level == level)
            && self
                .min_credit_score
                .is_none_or(|min| user.credit_score >= min)
            && self.chama_id.as_ref().is_none_or(|id| {
                user.chamas_joined.contains(id) || user.chamas_created.contains(id)
            })
    }
}

#[cfg(test)]
pub(crate) fn sample_user(principal: &str, name: &str) -> User {
    User {
        id: Principal::from_text(principal).unwrap(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        phone: "+254712345678".to_string(),
        national_id: None,
        profile_image: None,
        created_at: 0,
        updated_at: 0,
        is_verified: false,
        verification_level: VerificationLevel::Basic,
        credit_score: 50.0,
        total_contributions: 0,
        total_withdrawals: 0,
        chamas_joined: Vec::new(),
        chamas_created: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials() {
        assert_eq!(sample_user("aaaaa-aa", "wanjiru kamau").initials(), "WK");
        assert_eq!(sample_user("aaaaa-aa", "Otieno").initials(), "O");
        assert_eq!(sample_user("aaaaa-aa", "a b c").initials(), "AB");
    }

    #[test]
    fn test_verification_level_keys() {
        for level in VerificationLevel::ALL {
            assert_eq!(VerificationLevel::from_key(level.key()), Some(level));
        }
        assert_eq!(VerificationLevel::from_key("platinum"), None);
        assert_eq!(VerificationLevel::Basic.next(), Some(VerificationLevel::Intermediate));
        assert_eq!(VerificationLevel::Advanced.next(), None);
    }

    #[test]
    fn test_user_wire_names() {
        let json = serde_json::to_value(sample_user("aaaaa-aa", "Akinyi")).unwrap();
        assert_eq!(json["verificationLevel"], "basic");
        assert_eq!(json["creditScore"], 50.0);
        assert_eq!(json["id"], "aaaaa-aa");
    }
}
