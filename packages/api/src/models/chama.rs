use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Principal, Timestamp};

pub type ChamaId = String;

/// Implements the label/key/from_key trio shared by every unit variant enum mirrored
/// from a canister variant.
macro_rules! variant_enum {
    ($name:ident { $($variant:ident => ($key:literal, $label:literal)),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire name, also used as the value of `<select>` options.
            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.key() == key)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

pub(crate) use variant_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContributionFrequency {
    Daily,
    Weekly,
    Biweekly,
    #[default]
    Monthly,
    Quarterly,
}

variant_enum!(ContributionFrequency {
    Daily => ("daily", "Daily"),
    Weekly => ("weekly", "Weekly"),
    Biweekly => ("biweekly", "Bi-weekly"),
    Monthly => ("monthly", "Monthly"),
    Quarterly => ("quarterly", "Quarterly"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeetingFrequency {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
    Quarterly,
}

variant_enum!(MeetingFrequency {
    Weekly => ("weekly", "Weekly"),
    Biweekly => ("biweekly", "Bi-weekly"),
    Monthly => ("monthly", "Monthly"),
    Quarterly => ("quarterly", "Quarterly"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChamaType {
    #[default]
    Savings,
    Investment,
    MicroCredit,
    Welfare,
    Business,
}

variant_enum!(ChamaType {
    Savings => ("savings", "Savings Group"),
    Investment => ("investment", "Investment Club"),
    MicroCredit => ("microCredit", "Micro-Credit Group"),
    Welfare => ("welfare", "Welfare Group"),
    Business => ("business", "Business Venture"),
});

impl ChamaType {
    /// One-line pitch shown on the type picker of the creation wizard.
    pub fn blurb(self) -> &'static str {
        match self {
            Self::Savings => "Focus on collective savings and financial goals",
            Self::Investment => "Pool funds for investments and wealth building",
            Self::MicroCredit => "Provide loans and credit to members",
            Self::Welfare => "Social support and community assistance",
            Self::Business => "Fund and support business initiatives",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChamaStatus {
    Forming,
    Active,
    Suspended,
    Dissolved,
}

variant_enum!(ChamaStatus {
    Forming => ("forming", "Forming"),
    Active => ("active", "Active"),
    Suspended => ("suspended", "Suspended"),
    Dissolved => ("dissolved", "Dissolved"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberRole {
    Owner,
    Admin,
    Treasurer,
    Secretary,
    Member,
}

variant_enum!(MemberRole {
    Owner => ("owner", "Owner"),
    Admin => ("admin", "Admin"),
    Treasurer => ("treasurer", "Treasurer"),
    Secretary => ("secretary", "Secretary"),
    Member => ("member", "Member"),
});

impl MemberRole {
    /// Roles an administrator may assign. Ownership is never transferred from the UI.
    pub const ASSIGNABLE: [MemberRole; 4] =
        [Self::Admin, Self::Treasurer, Self::Secretary, Self::Member];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberStatus {
    Active,
    Suspended,
    Inactive,
    Expelled,
}

variant_enum!(MemberStatus {
    Active => ("active", "Active"),
    Suspended => ("suspended", "Suspended"),
    Inactive => ("inactive", "Inactive"),
    Expelled => ("expelled", "Expelled"),
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamaMember {
    pub user_id: Principal,
    pub joined_at: Timestamp,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub contribution_balance: u64,
    pub loan_balance: u64,
    #[serde(default)]
    pub last_contribution: Option<Timestamp>,
    pub missed_contributions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamaRules {
    pub minimum_contribution: u64,
    pub late_penalty: u64,
    pub withdrawal_notice: u64,
    pub quorum_percentage: u64,
    pub loan_interest_rate: f64,
    pub max_loan_amount: u64,
    pub loan_repayment_period: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treasury {
    pub total_funds: u64,
    pub available_funds: u64,
    pub reserve_funds: u64,
    pub loans_funds: u64,
    pub emergency_funds: u64,
    pub last_updated: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub contribution_reminders: bool,
    pub meeting_notifications: bool,
    pub proposal_alerts: bool,
    pub loan_reminders: bool,
    pub ai_insights: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            contribution_reminders: true,
            meeting_notifications: true,
            proposal_alerts: true,
            loan_reminders: true,
            ai_insights: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamaSettings {
    pub is_public: bool,
    pub allow_external_loans: bool,
    pub require_approval_for_joining: bool,
    #[serde(rename = "enableAIRecommendations")]
    pub enable_ai_recommendations: bool,
    pub notification_preferences: NotificationSettings,
}

impl Default for ChamaSettings {
    fn default() -> Self {
        Self {
            is_public: true,
            allow_external_loans: false,
            require_approval_for_joining: true,
            enable_ai_recommendations: true,
            notification_preferences: NotificationSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chama {
    pub id: ChamaId,
    pub name: String,
    pub description: String,
    pub creator: Principal,
    pub admins: Vec<Principal>,
    pub members: Vec<ChamaMember>,
    pub max_members: u64,
    pub contribution_amount: u64,
    pub contribution_frequency: ContributionFrequency,
    pub meeting_frequency: MeetingFrequency,
    pub chama_type: ChamaType,
    pub rules: ChamaRules,
    pub treasury: Treasury,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub is_active: bool,
    pub status: ChamaStatus,
    pub settings: ChamaSettings,
}

impl Chama {
    pub fn member(&self, user: &Principal) -> Option<&ChamaMember> {
        self.members.iter().find(|m| &m.user_id == user)
    }

    pub fn is_member(&self, user: &Principal) -> bool {
        self.member(user).is_some()
    }

    pub fn is_admin(&self, user: &Principal) -> bool {
        &self.creator == user || self.admins.contains(user)
    }

    pub fn is_full(&self) -> bool {
        self.members.len() as u64 >= self.max_members
    }

    pub fn open_slots(&self) -> u64 {
        self.max_members.saturating_sub(self.members.len() as u64)
    }

    /// Whether a visitor may press "join": public, accepting, not already in, not full.
    pub fn can_join(&self, user: &Principal) -> bool {
        self.is_active && self.settings.is_public && !self.is_full() && !self.is_member(user)
    }
}

/// Arguments of `create_chama`, as collected by the creation wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChama {
    pub name: String,
    pub description: String,
    pub contribution_amount: u64,
    pub contribution_frequency: ContributionFrequency,
    pub chama_type: ChamaType,
    pub max_members: u64,
    pub is_public: bool,
    pub require_approval: bool,
    #[serde(rename = "enableAI")]
    pub enable_ai: bool,
}

impl NewChama {
    /// The settings record the backend should start the group with.
    pub fn settings(&self) -> ChamaSettings {
        ChamaSettings {
            is_public: self.is_public,
            require_approval_for_joining: self.require_approval,
            enable_ai_recommendations: self.enable_ai,
            ..ChamaSettings::default()
        }
    }
}

/// Server-side filter for `get_public_chamas`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamaFilter {
    pub chama_type: Option<ChamaType>,
    pub status: Option<ChamaStatus>,
    pub is_public: Option<bool>,
    pub min_members: Option<u64>,
    pub max_members: Option<u64>,
    pub contribution_range: Option<(u64, u64)>,
}

impl ChamaFilter {
    pub fn matches(&self, chama: &Chama) -> bool {
        let members = chama.members.len() as u64;
        self.chama_type.is_none_or(|ty| chama.chama_type == ty)
            && self.status.is_none_or(|status| chama.status == status)
            && self
                .is_public
                .is_none_or(|public| chama.settings.is_public == public)
            && self.min_members.is_none_or(|min| members >= min)
            && self.max_members.is_none_or(|max| members <= max)
            && self
                .contribution_range
                .is_none_or(|(lo, hi)| (lo..=hi).contains(&chama.contribution_amount))
    }
}

#[cfg(test)]
pub(crate) fn sample_chama(id: &str, creator: &Principal) -> Chama {
    Chama {
        id: id.to_string(),
        name: format!("Chama {id}"),
        description: "Monthly savings for the estate".to_string(),
        creator: creator.clone(),
        admins: vec![creator.clone()],
        members: vec![ChamaMember {
            user_id: creator.clone(),
            joined_at: 0,
            role: MemberRole::Owner,
            status: MemberStatus::Active,
            contribution_balance: 0,
            loan_balance: 0,
            last_contribution: None,
            missed_contributions: 0,
        }],
        max_members: 3,
        contribution_amount: 5_000,
        contribution_frequency: ContributionFrequency::Monthly,
        meeting_frequency: MeetingFrequency::Monthly,
        chama_type: ChamaType::Savings,
        rules: ChamaRules::default(),
        treasury: Treasury::default(),
        created_at: 0,
        updated_at: 0,
        is_active: true,
        status: ChamaStatus::Active,
        settings: ChamaSettings::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_wire_names() {
        assert_eq!(
            serde_json::to_value(ChamaType::MicroCredit).unwrap(),
            "microCredit"
        );
        assert_eq!(ChamaType::from_key("microCredit"), Some(ChamaType::MicroCredit));
        assert_eq!(ContributionFrequency::Biweekly.to_string(), "Bi-weekly");
        assert_eq!(MemberRole::from_key("owner"), Some(MemberRole::Owner));
        assert_eq!(ChamaStatus::from_key("closed"), None);
    }

    #[test]
    fn test_settings_wire_names() {
        let json = serde_json::to_value(ChamaSettings::default()).unwrap();
        assert_eq!(json["enableAIRecommendations"], true);
        assert_eq!(json["requireApprovalForJoining"], true);
        assert_eq!(json["notificationPreferences"]["aiInsights"], true);
    }

    #[test]
    fn test_membership_helpers() {
        let owner = Principal::from_text("aaaaa-aa").unwrap();
        let visitor = Principal::anonymous();
        let mut chama = sample_chama("c1", &owner);

        assert!(chama.is_admin(&owner));
        assert!(!chama.can_join(&owner));
        assert!(chama.can_join(&visitor));
        assert_eq!(chama.open_slots(), 2);

        chama.max_members = 1;
        assert!(chama.is_full());
        assert!(!chama.can_join(&visitor));
    }

    #[test]
    fn test_new_chama_settings() {
        let draft = NewChama {
            name: "Umoja".into(),
            description: "Neighbourhood savings".into(),
            contribution_amount: 1_000,
            contribution_frequency: ContributionFrequency::Weekly,
            chama_type: ChamaType::Welfare,
            max_members: 10,
            is_public: false,
            require_approval: false,
            enable_ai: true,
        };
        let settings = draft.settings();
        assert!(!settings.is_public);
        assert!(!settings.require_approval_for_joining);
        assert!(settings.enable_ai_recommendations);
    }
}
