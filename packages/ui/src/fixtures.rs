//! Record builders and in-memory sessions for unit tests.

use std::rc::Rc;

use api::models::{
    Chama, ChamaMember, ChamaRules, ChamaSettings, ChamaStatus, ChamaType, ContributionFrequency,
    MeetingFrequency, MemberRole, MemberStatus, NewChama, Principal, Transaction,
    TransactionCategory, TransactionStatus, TransactionType, Treasury, User, VerificationLevel,
};
use api::{AppServices, IdentityProvider, MemoryBackend, MemoryIdentity};

pub(crate) fn principal(text: &str) -> Principal {
    Principal::from_text(text).unwrap()
}

pub(crate) fn user(id: &str, name: &str) -> User {
    User {
        id: principal(id),
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

pub(crate) fn member(id: &str, role: MemberRole) -> ChamaMember {
    ChamaMember {
        user_id: principal(id),
        joined_at: 0,
        role,
        status: MemberStatus::Active,
        contribution_balance: 0,
        loan_balance: 0,
        last_contribution: None,
        missed_contributions: 0,
    }
}

pub(crate) fn chama(id: &str, name: &str, contribution_amount: u64) -> Chama {
    Chama {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} pools monthly savings"),
        creator: principal("aaaaa-aa"),
        admins: vec![principal("aaaaa-aa")],
        members: vec![member("aaaaa-aa", MemberRole::Owner)],
        max_members: 20,
        contribution_amount,
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

pub(crate) fn transaction(
    id: &str,
    amount: u64,
    transaction_type: TransactionType,
    description: &str,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        chama_id: "c1".to_string(),
        user_id: principal("aaaaa-aa"),
        amount,
        transaction_type,
        category: TransactionCategory::RegularContribution,
        description: description.to_string(),
        timestamp: 0,
        processed_by: None,
        status: TransactionStatus::Completed,
        metadata: None,
    }
}

/// A signed-in session against a fresh [`MemoryBackend`], with one chama the caller owns.
pub(crate) async fn signed_in_with_chama() -> (MemoryBackend, AppServices, String) {
    let (backend, services) = signed_in("aaaaa-aa");
    let chama = services
        .chamas
        .create_chama(&NewChama {
            name: "Umoja Savings".into(),
            description: "Monthly savings for the estate".into(),
            contribution_amount: 5_000,
            contribution_frequency: ContributionFrequency::Monthly,
            chama_type: ChamaType::Savings,
            max_members: 20,
            is_public: true,
            require_approval: false,
            enable_ai: true,
        })
        .await
        .unwrap();
    (backend, services, chama.id)
}

pub(crate) fn signed_in(id: &str) -> (MemoryBackend, AppServices) {
    let backend = MemoryBackend::new();
    let services = signed_in_on(&backend, id);
    (backend, services)
}

/// A second session on an existing backend, for flows involving two members.
pub(crate) fn signed_in_on(backend: &MemoryBackend, id: &str) -> AppServices {
    let identity = Rc::new(MemoryIdentity::new(principal(id), "/auth/callback"));
    identity.complete_login(&identity.callback_query()).unwrap();
    AppServices::new(Rc::new(backend.clone()), identity)
}
