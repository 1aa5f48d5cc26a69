//! In-process stand-in for the backend canisters.
//!
//! `MemoryBackend` answers every remote method from a shared in-memory state. It keeps
//! just enough bookkeeping to return plausible records and the same tags the canisters
//! use; it makes no attempt at ledger correctness. Cloning shares the state, and
//! [`MemoryBackend::as_caller`] gives a view of that state bound to a principal, which is
//! how the [`Connector`] impl hands out per-session handles.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use async_trait::async_trait;
use store::StoredIdentity;

use super::{
    CallResult, ChamaRegistry, ChatAssistant, Connector, FinancialLedger, QueryResult,
    UserRegistry,
};
use crate::error::{CallError, ChamaError, TransactionError, TransportError, UserError};
use crate::models::{
    Balance, Chama, ChamaFilter, ChamaMember, ChamaRules, ChamaStatus, ChatMessage, ChatResponse,
    ChatSession, ChatbotCapabilities, MeetingFrequency, MemberRole, MemberStatus, NewChama,
    Principal, Timestamp, Transaction, TransactionCategory, TransactionFilter, TransactionStats,
    TransactionStatus, TransactionType, Treasury, User, UserFilter, UserStats,
    VerificationLevel,
};

const SECOND: Timestamp = 1_000_000_000;
/// 2025-01-01T00:00:00Z, the first tick of the fake clock.
const EPOCH: Timestamp = 1_735_689_600 * SECOND;

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<Principal, User>,
    chamas: BTreeMap<String, Chama>,
    transactions: Vec<Transaction>,
    sessions: BTreeMap<String, ChatSession>,
    next_id: u64,
    ticks: i64,
    offline: bool,
    hidden_profile_reads: u32,
    profile_reads: u32,
    chat_calls: Vec<String>,
}

impl MemoryState {
    fn now(&mut self) -> Timestamp {
        self.ticks += 1;
        EPOCH + self.ticks * SECOND
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }
}

#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Rc<RefCell<MemoryState>>,
    caller: Option<Principal>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle on the same state that acts on behalf of `caller`.
    pub fn as_caller(&self, caller: Option<Principal>) -> Self {
        Self {
            state: Rc::clone(&self.state),
            caller,
        }
    }

    /// Make every subsequent call fail with a network error until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.state.borrow_mut().offline = offline;
    }

    /// Answer the next `reads` profile lookups as if the profile did not exist yet.
    pub fn hide_profiles_for(&self, reads: u32) {
        self.state.borrow_mut().hidden_profile_reads = reads;
    }

    /// How many times `get_my_profile` has been answered.
    pub fn profile_reads(&self) -> u32 {
        self.state.borrow().profile_reads
    }

    /// Number of ledger transactions recorded so far.
    pub fn transaction_total(&self) -> usize {
        self.state.borrow().transactions.len()
    }

    /// Chat methods called so far, in order, for asserting widget lifecycles.
    pub fn chat_calls(&self) -> Vec<String> {
        self.state.borrow().chat_calls.clone()
    }

    /// Insert a ready-made profile, bypassing registration.
    pub fn seed_user(&self, user: User) {
        self.state.borrow_mut().users.insert(user.id.clone(), user);
    }

    pub fn seed_chama(&self, chama: Chama) {
        self.state.borrow_mut().chamas.insert(chama.id.clone(), chama);
    }

    /// Populate a small community for the `demo` build: three members, two groups and
    /// a few months of contributions.
    pub fn with_demo_data(self, me: &Principal) -> Self {
        let people = [
            (me.clone(), "Wanjiku Kamau", "wanjiku@example.com"),
            (demo_principal("otieno"), "Otieno Odhiambo", "otieno@example.com"),
            (demo_principal("akinyi"), "Akinyi Achieng", "akinyi@example.com"),
        ];
        {
            let mut state = self.state.borrow_mut();
            for (id, name, email) in &people {
                let now = state.now();
                state
                    .users
                    .insert(id.clone(), new_user(id.clone(), name, email, "+254712345678", now));
            }
        }

        let owner = self.as_caller(Some(people[1].0.clone()));
        let groups = [
            ("Umoja Savings", "Monthly savings for the Umoja estate residents", 5_000),
            ("Vijana Investment Club", "Young professionals pooling funds into unit trusts", 2_000),
        ];
        let mut state = self.state.borrow_mut();
        for (name, description, amount) in groups {
            let now = state.now();
            let id = state.next_id("chama");
            let mut chama = new_chama(
                &id,
                &NewChama {
                    name: name.to_string(),
                    description: description.to_string(),
                    contribution_amount: amount,
                    contribution_frequency: Default::default(),
                    chama_type: Default::default(),
                    max_members: 20,
                    is_public: true,
                    require_approval: false,
                    enable_ai: true,
                },
                owner.caller.clone().unwrap_or_else(Principal::anonymous),
                now,
            );
            chama.members.push(new_member(people[2].0.clone(), MemberRole::Treasurer, now));
            state.chamas.insert(id, chama);
        }

        let first = state.chamas.keys().next().cloned();
        if let Some(chama_id) = first {
            if let Some(chama) = state.chamas.get_mut(&chama_id) {
                chama.members.push(new_member(me.clone(), MemberRole::Member, EPOCH));
            }
            for month in 0..3 {
                let now = state.now();
                let id = state.next_id("tx");
                let description = format!("Contribution {}", month + 1);
                let tx = contribution(&id, &chama_id, me, 5_000, &description, now);
                apply_transaction(&mut state, &tx);
                state.transactions.push(tx);
            }
        }
        drop(state);
        self
    }

    fn check_online(&self) -> Result<(), TransportError> {
        if self.state.borrow().offline {
            Err(TransportError::Network("memory backend is offline".into()))
        } else {
            Ok(())
        }
    }

    fn caller<E>(&self, unauthorized: E) -> Result<Principal, CallError<E>> {
        self.check_online()?;
        self.caller
            .clone()
            .filter(|p| !p.is_anonymous())
            .ok_or(CallError::Backend(unauthorized))
    }

    fn record(&self, chama_id: &str, draft: TxDraft) -> CallResult<Transaction, TransactionError> {
        let caller = self.caller(TransactionError::NotAuthorized)?;
        if draft.amount == 0 {
            return Err(CallError::Backend(TransactionError::InvalidAmount));
        }
        let mut state = self.state.borrow_mut();
        let chama = state
            .chamas
            .get(chama_id)
            .ok_or(CallError::Backend(TransactionError::ProcessingFailed))?;
        if !chama.is_member(&caller) {
            return Err(CallError::Backend(TransactionError::NotAuthorized));
        }
        let subject = draft.subject.clone().unwrap_or_else(|| caller.clone());
        let member = chama
            .member(&subject)
            .ok_or(CallError::Backend(TransactionError::NotAuthorized))?;

        match draft.transaction_type {
            TransactionType::Withdrawal if member.contribution_balance < draft.amount => {
                return Err(CallError::Backend(TransactionError::InsufficientFunds));
            }
            TransactionType::Loan => {
                if !chama.is_admin(&caller) {
                    return Err(CallError::Backend(TransactionError::NotAuthorized));
                }
                if chama.treasury.available_funds < draft.amount {
                    return Err(CallError::Backend(TransactionError::InsufficientFunds));
                }
            }
            _ => {}
        }

        let now = state.now();
        let id = state.next_id("tx");
        let tx = Transaction {
            id,
            chama_id: chama_id.to_string(),
            user_id: subject,
            amount: draft.amount,
            transaction_type: draft.transaction_type,
            category: draft.category,
            description: draft.description,
            timestamp: now,
            processed_by: Some(caller),
            status: TransactionStatus::Completed,
            metadata: None,
        };
        apply_transaction(&mut state, &tx);
        state.transactions.push(tx.clone());
        Ok(tx)
    }

    fn update_chama_with<F>(
        &self,
        chama_id: &str,
        admin_only: bool,
        f: F,
    ) -> CallResult<Chama, ChamaError>
    where
        F: FnOnce(&mut Chama, &Principal, Timestamp) -> Result<(), ChamaError>,
    {
        let caller = self.caller(ChamaError::NotAuthorized)?;
        let mut state = self.state.borrow_mut();
        let now = state.now();
        let chama = state
            .chamas
            .get_mut(chama_id)
            .ok_or(CallError::Backend(ChamaError::NotFound))?;
        if admin_only && !chama.is_admin(&caller) {
            return Err(CallError::Backend(ChamaError::NotAuthorized));
        }
        f(chama, &caller, now).map_err(CallError::Backend)?;
        chama.updated_at = now;
        Ok(chama.clone())
    }

    fn link_user_to_chama(&self, user: &Principal, chama_id: &str) {
        if let Some(profile) = self.state.borrow_mut().users.get_mut(user) {
            if !profile.chamas_joined.iter().any(|id| id == chama_id) {
                profile.chamas_joined.push(chama_id.to_string());
            }
        }
    }

    fn chat_call(&self, method: &str) -> Result<(), TransportError> {
        self.check_online()?;
        self.state.borrow_mut().chat_calls.push(method.to_string());
        Ok(())
    }
}

struct TxDraft {
    subject: Option<Principal>,
    amount: u64,
    transaction_type: TransactionType,
    category: TransactionCategory,
    description: String,
}

fn demo_principal(seed: &str) -> Principal {
    Principal::from_text(&format!("{seed}-demo-cai")).unwrap_or_else(|_| Principal::anonymous())
}

fn new_user(id: Principal, name: &str, email: &str, phone: &str, now: Timestamp) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        national_id: None,
        profile_image: None,
        created_at: now,
        updated_at: now,
        is_verified: false,
        verification_level: VerificationLevel::Basic,
        credit_score: 50.0,
        total_contributions: 0,
        total_withdrawals: 0,
        chamas_joined: Vec::new(),
        chamas_created: Vec::new(),
    }
}

fn new_member(user_id: Principal, role: MemberRole, now: Timestamp) -> ChamaMember {
    ChamaMember {
        user_id,
        joined_at: now,
        role,
        status: MemberStatus::Active,
        contribution_balance: 0,
        loan_balance: 0,
        last_contribution: None,
        missed_contributions: 0,
    }
}

fn new_chama(id: &str, draft: &NewChama, creator: Principal, now: Timestamp) -> Chama {
    Chama {
        id: id.to_string(),
        name: draft.name.clone(),
        description: draft.description.clone(),
        creator: creator.clone(),
        admins: vec![creator.clone()],
        members: vec![new_member(creator, MemberRole::Owner, now)],
        max_members: draft.max_members,
        contribution_amount: draft.contribution_amount,
        contribution_frequency: draft.contribution_frequency,
        meeting_frequency: MeetingFrequency::Monthly,
        chama_type: draft.chama_type,
        rules: ChamaRules {
            minimum_contribution: draft.contribution_amount,
            quorum_percentage: 50,
            ..ChamaRules::default()
        },
        treasury: Treasury {
            last_updated: now,
            ..Treasury::default()
        },
        created_at: now,
        updated_at: now,
        is_active: true,
        status: ChamaStatus::Active,
        settings: draft.settings(),
    }
}

fn contribution(
    id: &str,
    chama_id: &str,
    user: &Principal,
    amount: u64,
    description: &str,
    now: Timestamp,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        chama_id: chama_id.to_string(),
        user_id: user.clone(),
        amount,
        transaction_type: TransactionType::Contribution,
        category: TransactionCategory::RegularContribution,
        description: description.to_string(),
        timestamp: now,
        processed_by: Some(user.clone()),
        status: TransactionStatus::Completed,
        metadata: None,
    }
}

/// Move the treasury and member balances for a completed transaction.
fn apply_transaction(state: &mut MemoryState, tx: &Transaction) {
    if let Some(chama) = state.chamas.get_mut(&tx.chama_id) {
        let treasury = &mut chama.treasury;
        match tx.transaction_type {
            TransactionType::Contribution | TransactionType::Penalty => {
                treasury.total_funds += tx.amount;
                treasury.available_funds += tx.amount;
            }
            TransactionType::Withdrawal | TransactionType::Expense | TransactionType::Dividend => {
                treasury.total_funds = treasury.total_funds.saturating_sub(tx.amount);
                treasury.available_funds = treasury.available_funds.saturating_sub(tx.amount);
            }
            TransactionType::Loan => {
                treasury.available_funds = treasury.available_funds.saturating_sub(tx.amount);
                treasury.loans_funds += tx.amount;
            }
            TransactionType::Repayment => {
                treasury.available_funds += tx.amount;
                treasury.loans_funds = treasury.loans_funds.saturating_sub(tx.amount);
            }
            TransactionType::Refund => {}
        }
        treasury.last_updated = tx.timestamp;

        if let Some(member) = chama.members.iter_mut().find(|m| m.user_id == tx.user_id) {
            match tx.transaction_type {
                TransactionType::Contribution => {
                    member.contribution_balance += tx.amount;
                    member.last_contribution = Some(tx.timestamp);
                }
                TransactionType::Withdrawal => {
                    member.contribution_balance =
                        member.contribution_balance.saturating_sub(tx.amount);
                }
                TransactionType::Loan => member.loan_balance += tx.amount,
                TransactionType::Repayment => {
                    member.loan_balance = member.loan_balance.saturating_sub(tx.amount);
                }
                _ => {}
            }
        }
    }

    if let Some(user) = state.users.get_mut(&tx.user_id) {
        match tx.transaction_type {
            TransactionType::Contribution => user.total_contributions += tx.amount,
            TransactionType::Withdrawal => user.total_withdrawals += tx.amount,
            _ => {}
        }
    }
}

fn balance_of(state: &MemoryState, chama_id: &str, user: &Principal) -> Balance {
    state
        .transactions
        .iter()
        .filter(|tx| tx.chama_id == chama_id && &tx.user_id == user)
        .filter(|tx| tx.status == TransactionStatus::Completed)
        .fold(Balance::default(), |mut balance, tx| {
            match tx.transaction_type {
                TransactionType::Contribution => balance.contributions += tx.amount,
                TransactionType::Withdrawal => balance.withdrawals += tx.amount,
                _ => {}
            }
            balance
        })
}

/// Most recent first, optionally truncated.
fn newest<'a>(txs: impl Iterator<Item = &'a Transaction>, limit: Option<u64>) -> Vec<Transaction> {
    let mut txs: Vec<Transaction> = txs.cloned().collect();
    txs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    if let Some(limit) = limit {
        txs.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    txs
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

#[async_trait(?Send)]
impl UserRegistry for MemoryBackend {
    async fn register_user(
        &self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> CallResult<User, UserError> {
        let caller = self.caller(UserError::NotAuthorized)?;
        if name.trim().is_empty() || !looks_like_email(email) || phone.trim().is_empty() {
            return Err(CallError::Backend(UserError::InvalidData));
        }
        let mut state = self.state.borrow_mut();
        if state.users.contains_key(&caller)
            || state.users.values().any(|u| u.email.eq_ignore_ascii_case(email))
        {
            return Err(CallError::Backend(UserError::AlreadyExists));
        }
        let now = state.now();
        let user = new_user(caller.clone(), name, email, phone, now);
        state.users.insert(caller, user.clone());
        Ok(user)
    }

    async fn get_my_profile(&self) -> QueryResult<Option<User>> {
        self.check_online()?;
        let mut state = self.state.borrow_mut();
        state.profile_reads += 1;
        if state.hidden_profile_reads > 0 {
            state.hidden_profile_reads -= 1;
            return Ok(None);
        }
        Ok(self.caller.as_ref().and_then(|p| state.users.get(p).cloned()))
    }

    async fn get_user_profile(&self, user: &Principal) -> QueryResult<Option<User>> {
        self.check_online()?;
        Ok(self.state.borrow().users.get(user).cloned())
    }

    async fn update_profile(
        &self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> CallResult<User, UserError> {
        let caller = self.caller(UserError::NotAuthorized)?;
        if name.trim().is_empty() || !looks_like_email(email) {
            return Err(CallError::Backend(UserError::InvalidData));
        }
        let mut state = self.state.borrow_mut();
        let now = state.now();
        let user = state
            .users
            .get_mut(&caller)
            .ok_or(CallError::Backend(UserError::NotFound))?;
        user.name = name.to_string();
        user.email = email.to_string();
        user.phone = phone.to_string();
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn verify_user(&self, level: VerificationLevel) -> CallResult<User, UserError> {
        let caller = self.caller(UserError::NotAuthorized)?;
        let mut state = self.state.borrow_mut();
        let now = state.now();
        let user = state
            .users
            .get_mut(&caller)
            .ok_or(CallError::Backend(UserError::NotFound))?;
        user.verification_level = level;
        user.is_verified = true;
        user.credit_score = match level {
            VerificationLevel::Basic => 60.0,
            VerificationLevel::Intermediate => 70.0,
            VerificationLevel::Advanced => 80.0,
        };
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn get_my_stats(&self) -> QueryResult<Option<UserStats>> {
        self.check_online()?;
        let Some(caller) = self.caller.clone() else {
            return Ok(None);
        };
        let state = self.state.borrow();
        if !state.users.contains_key(&caller) {
            return Ok(None);
        }
        let mine: Vec<&Transaction> = state
            .transactions
            .iter()
            .filter(|tx| tx.user_id == caller && tx.transaction_type == TransactionType::Contribution)
            .collect();
        let total: u64 = mine.iter().map(|tx| tx.amount).sum();
        Ok(Some(UserStats {
            user_id: caller,
            total_savings: total,
            average_contribution: if mine.is_empty() { 0 } else { total / mine.len() as u64 },
            contribution_streak: mine.len() as u64,
            risk_score: 0.2,
            reliability_score: 0.8,
            last_activity: mine.iter().map(|tx| tx.timestamp).max().unwrap_or(0),
        }))
    }

    async fn search_users(&self, query: &str) -> QueryResult<Vec<User>> {
        self.check_online()?;
        let needle = query.to_lowercase();
        Ok(self
            .state
            .borrow()
            .users
            .values()
            .filter(|u| {
                u.name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn get_all_users(&self, filter: Option<&UserFilter>) -> QueryResult<Vec<User>> {
        self.check_online()?;
        Ok(self
            .state
            .borrow()
            .users
            .values()
            .filter(|u| filter.is_none_or(|f| f.matches(u)))
            .cloned()
            .collect())
    }

    async fn get_user_count(&self) -> QueryResult<u64> {
        self.check_online()?;
        Ok(self.state.borrow().users.len() as u64)
    }

    async fn add_chama_to_user(&self, user: &Principal, chama_id: &str) -> QueryResult<bool> {
        self.check_online()?;
        let known = self.state.borrow().users.contains_key(user);
        self.link_user_to_chama(user, chama_id);
        Ok(known)
    }

    async fn health_check(&self) -> QueryResult<String> {
        self.check_online()?;
        Ok("User management canister is healthy".to_string())
    }
}

#[async_trait(?Send)]
impl ChamaRegistry for MemoryBackend {
    async fn create_chama(&self, draft: &NewChama) -> CallResult<Chama, ChamaError> {
        let caller = self.caller(ChamaError::NotAuthorized)?;
        if draft.name.trim().is_empty() || draft.contribution_amount == 0 || draft.max_members == 0
        {
            return Err(CallError::Backend(ChamaError::InvalidData));
        }
        let mut state = self.state.borrow_mut();
        if state
            .chamas
            .values()
            .any(|c| c.name.eq_ignore_ascii_case(draft.name.trim()))
        {
            return Err(CallError::Backend(ChamaError::AlreadyExists));
        }
        let now = state.now();
        let id = state.next_id("chama");
        let chama = new_chama(&id, draft, caller.clone(), now);
        state.chamas.insert(id.clone(), chama.clone());
        if let Some(user) = state.users.get_mut(&caller) {
            user.chamas_created.push(id);
        }
        Ok(chama)
    }

    async fn get_chama(&self, chama_id: &str) -> QueryResult<Option<Chama>> {
        self.check_online()?;
        Ok(self.state.borrow().chamas.get(chama_id).cloned())
    }

    async fn update_chama(&self, chama_id: &str, updated: &Chama) -> CallResult<Chama, ChamaError> {
        self.update_chama_with(chama_id, true, |chama, _, _| {
            if updated.name.trim().is_empty() || updated.max_members < chama.members.len() as u64 {
                return Err(ChamaError::InvalidData);
            }
            chama.name = updated.name.clone();
            chama.description = updated.description.clone();
            chama.max_members = updated.max_members;
            chama.contribution_amount = updated.contribution_amount;
            chama.contribution_frequency = updated.contribution_frequency;
            chama.meeting_frequency = updated.meeting_frequency;
            chama.rules = updated.rules.clone();
            chama.settings = updated.settings.clone();
            Ok(())
        })
    }

    async fn join_chama(&self, chama_id: &str) -> CallResult<Chama, ChamaError> {
        let chama = self.update_chama_with(chama_id, false, |chama, caller, now| {
            if !chama.is_active {
                return Err(ChamaError::NotActive);
            }
            if chama.is_member(caller) {
                return Err(ChamaError::AlreadyExists);
            }
            if chama.is_full() {
                return Err(ChamaError::MaxMembersReached);
            }
            chama.members.push(new_member(caller.clone(), MemberRole::Member, now));
            Ok(())
        })?;
        if let Some(caller) = &self.caller {
            self.link_user_to_chama(caller, chama_id);
        }
        Ok(chama)
    }

    async fn add_member(&self, chama_id: &str, user: &Principal) -> CallResult<Chama, ChamaError> {
        let chama = self.update_chama_with(chama_id, true, |chama, _, now| {
            if chama.is_member(user) {
                return Err(ChamaError::AlreadyExists);
            }
            if chama.is_full() {
                return Err(ChamaError::MaxMembersReached);
            }
            chama.members.push(new_member(user.clone(), MemberRole::Member, now));
            Ok(())
        })?;
        self.link_user_to_chama(user, chama_id);
        Ok(chama)
    }

    async fn remove_member(
        &self,
        chama_id: &str,
        user: &Principal,
    ) -> CallResult<Chama, ChamaError> {
        self.update_chama_with(chama_id, true, |chama, _, _| {
            if &chama.creator == user {
                return Err(ChamaError::NotAuthorized);
            }
            let before = chama.members.len();
            chama.members.retain(|m| &m.user_id != user);
            chama.admins.retain(|a| a != user);
            if chama.members.len() == before {
                return Err(ChamaError::NotFound);
            }
            Ok(())
        })
    }

    async fn update_member_role(
        &self,
        chama_id: &str,
        user: &Principal,
        role: MemberRole,
    ) -> CallResult<Chama, ChamaError> {
        self.update_chama_with(chama_id, true, |chama, _, _| {
            if &chama.creator == user || role == MemberRole::Owner {
                return Err(ChamaError::NotAuthorized);
            }
            let member = chama
                .members
                .iter_mut()
                .find(|m| &m.user_id == user)
                .ok_or(ChamaError::NotFound)?;
            member.role = role;
            let is_admin = chama.admins.contains(user);
            match role {
                MemberRole::Admin if !is_admin => chama.admins.push(user.clone()),
                MemberRole::Admin => {}
                _ => chama.admins.retain(|a| a != user),
            }
            Ok(())
        })
    }

    async fn get_chamas_by_creator(&self, creator: &Principal) -> QueryResult<Vec<Chama>> {
        self.check_online()?;
        Ok(self
            .state
            .borrow()
            .chamas
            .values()
            .filter(|c| &c.creator == creator)
            .cloned()
            .collect())
    }

    async fn get_chamas_by_member(&self, member: &Principal) -> QueryResult<Vec<Chama>> {
        self.check_online()?;
        Ok(self
            .state
            .borrow()
            .chamas
            .values()
            .filter(|c| c.is_member(member))
            .cloned()
            .collect())
    }

    async fn get_my_chamas(&self) -> QueryResult<Vec<Chama>> {
        match self.caller.clone() {
            Some(me) => self.get_chamas_by_member(&me).await,
            None => self.check_online().map(|_| Vec::new()),
        }
    }

    async fn get_public_chamas(&self, filter: Option<&ChamaFilter>) -> QueryResult<Vec<Chama>> {
        self.check_online()?;
        Ok(self
            .state
            .borrow()
            .chamas
            .values()
            .filter(|c| c.settings.is_public)
            .filter(|c| filter.is_none_or(|f| f.matches(c)))
            .cloned()
            .collect())
    }

    async fn search_chamas(&self, query: &str) -> QueryResult<Vec<Chama>> {
        self.check_online()?;
        let needle = query.to_lowercase();
        Ok(self
            .state
            .borrow()
            .chamas
            .values()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn get_chama_count(&self) -> QueryResult<u64> {
        self.check_online()?;
        Ok(self.state.borrow().chamas.len() as u64)
    }

    async fn health_check(&self) -> QueryResult<String> {
        self.check_online()?;
        Ok("Chama management canister is healthy".to_string())
    }
}

#[async_trait(?Send)]
impl FinancialLedger for MemoryBackend {
    async fn record_contribution(
        &self,
        chama_id: &str,
        amount: u64,
        description: &str,
    ) -> CallResult<Transaction, TransactionError> {
        self.record(
            chama_id,
            TxDraft {
                subject: None,
                amount,
                transaction_type: TransactionType::Contribution,
                category: TransactionCategory::RegularContribution,
                description: description.to_string(),
            },
        )
    }

    async fn process_withdrawal(
        &self,
        chama_id: &str,
        amount: u64,
        description: &str,
    ) -> CallResult<Transaction, TransactionError> {
        self.record(
            chama_id,
            TxDraft {
                subject: None,
                amount,
                transaction_type: TransactionType::Withdrawal,
                category: TransactionCategory::Emergency,
                description: description.to_string(),
            },
        )
    }

    async fn record_loan(
        &self,
        chama_id: &str,
        borrower: &Principal,
        amount: u64,
        description: &str,
    ) -> CallResult<Transaction, TransactionError> {
        self.record(
            chama_id,
            TxDraft {
                subject: Some(borrower.clone()),
                amount,
                transaction_type: TransactionType::Loan,
                category: TransactionCategory::Loan,
                description: description.to_string(),
            },
        )
    }

    async fn record_repayment(
        &self,
        chama_id: &str,
        amount: u64,
        description: &str,
    ) -> CallResult<Transaction, TransactionError> {
        self.record(
            chama_id,
            TxDraft {
                subject: None,
                amount,
                transaction_type: TransactionType::Repayment,
                category: TransactionCategory::Loan,
                description: description.to_string(),
            },
        )
    }

    async fn get_transaction(&self, transaction_id: &str) -> QueryResult<Option<Transaction>> {
        self.check_online()?;
        Ok(self
            .state
            .borrow()
            .transactions
            .iter()
            .find(|tx| tx.id == transaction_id)
            .cloned())
    }

    async fn update_transaction_status(
        &self,
        transaction_id: &str,
        status: TransactionStatus,
    ) -> CallResult<Transaction, TransactionError> {
        let caller = self.caller(TransactionError::NotAuthorized)?;
        let mut state = self.state.borrow_mut();
        let index = state
            .transactions
            .iter()
            .position(|tx| tx.id == transaction_id)
            .ok_or(CallError::Backend(TransactionError::NotFound))?;
        let chama_id = state.transactions[index].chama_id.clone();
        let is_admin = state
            .chamas
            .get(&chama_id)
            .is_some_and(|c| c.is_admin(&caller));
        if !is_admin {
            return Err(CallError::Backend(TransactionError::NotAuthorized));
        }
        let tx = &mut state.transactions[index];
        tx.status = status;
        tx.processed_by = Some(caller);
        Ok(tx.clone())
    }

    async fn get_user_balance(&self, chama_id: &str, user: &Principal) -> QueryResult<Balance> {
        self.check_online()?;
        Ok(balance_of(&self.state.borrow(), chama_id, user))
    }

    async fn get_my_balance(&self, chama_id: &str) -> QueryResult<Balance> {
        self.check_online()?;
        Ok(match &self.caller {
            Some(me) => balance_of(&self.state.borrow(), chama_id, me),
            None => Balance::default(),
        })
    }

    async fn get_chama_treasury_balance(&self, chama_id: &str) -> QueryResult<u64> {
        self.check_online()?;
        Ok(self
            .state
            .borrow()
            .chamas
            .get(chama_id)
            .map_or(0, |c| c.treasury.available_funds))
    }

    async fn get_transactions_by_chama(
        &self,
        chama_id: &str,
        limit: Option<u64>,
    ) -> QueryResult<Vec<Transaction>> {
        self.check_online()?;
        let state = self.state.borrow();
        Ok(newest(
            state.transactions.iter().filter(|tx| tx.chama_id == chama_id),
            limit,
        ))
    }

    async fn get_transactions_by_user(
        &self,
        user: &Principal,
        limit: Option<u64>,
    ) -> QueryResult<Vec<Transaction>> {
        self.check_online()?;
        let state = self.state.borrow();
        Ok(newest(
            state.transactions.iter().filter(|tx| &tx.user_id == user),
            limit,
        ))
    }

    async fn get_my_transactions(&self, limit: Option<u64>) -> QueryResult<Vec<Transaction>> {
        match self.caller.clone() {
            Some(me) => self.get_transactions_by_user(&me, limit).await,
            None => self.check_online().map(|_| Vec::new()),
        }
    }

    async fn get_filtered_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> QueryResult<Vec<Transaction>> {
        self.check_online()?;
        let state = self.state.borrow();
        Ok(newest(
            state.transactions.iter().filter(|tx| filter.matches(tx)),
            None,
        ))
    }

    async fn get_chama_transaction_stats(&self, chama_id: &str) -> QueryResult<TransactionStats> {
        self.check_online()?;
        let state = self.state.borrow();
        let txs: Vec<&Transaction> = state
            .transactions
            .iter()
            .filter(|tx| tx.chama_id == chama_id)
            .collect();
        let sum_of = |ty: TransactionType| -> u64 {
            txs.iter()
                .filter(|tx| tx.transaction_type == ty)
                .map(|tx| tx.amount)
                .sum()
        };
        let total: u64 = txs.iter().map(|tx| tx.amount).sum();
        Ok(TransactionStats {
            total_transactions: txs.len() as u64,
            total_contributions: sum_of(TransactionType::Contribution),
            total_withdrawals: sum_of(TransactionType::Withdrawal),
            total_loans: sum_of(TransactionType::Loan),
            average_transaction: if txs.is_empty() { 0 } else { total / txs.len() as u64 },
            last_transaction_time: txs.iter().map(|tx| tx.timestamp).max(),
        })
    }

    async fn get_transaction_count(&self) -> QueryResult<u64> {
        self.check_online()?;
        Ok(self.state.borrow().transactions.len() as u64)
    }

    async fn health_check(&self) -> QueryResult<String> {
        self.check_online()?;
        Ok("Financial operations canister is healthy".to_string())
    }
}

/// Canned replies keyed on a few words, enough to drive the chat widget.
fn assistant_reply(message: &str) -> ChatResponse {
    let text = message.to_lowercase();
    let greeting = text
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| matches!(word, "hello" | "hi" | "habari" | "jambo"));
    let (reply, suggestions, data_type): (&str, &[&str], Option<&str>) = if greeting {
        (
            "Karibu! I'm your Chama assistant. I can help with:\n\n• Contributions and balances\n• Loans and repayments\n• Finding a chama to join",
            &["How do I contribute?", "Show my balance", "Find a chama"],
            None,
        )
    } else if text.contains("balance") {
        (
            "Your balance is the sum of your contributions minus withdrawals in each chama. Open a chama and check the Overview tab.",
            &["How do I contribute?"],
            Some("balance"),
        )
    } else if text.contains("contribut") {
        (
            "To contribute:\n\n• Open your chama\n• Choose the Contribute tab\n• Enter the amount and payment reference",
            &["Show my balance", "What payment methods are supported?"],
            None,
        )
    } else if text.contains("loan") {
        (
            "Loans are approved by the chama admins and paid out from available treasury funds.",
            &["How do I repay a loan?"],
            Some("loans"),
        )
    } else if text.contains("find") || text.contains("join") {
        (
            "Browse public groups on the Discover page and press Join on one that fits.",
            &["How do I create a chama?"],
            None,
        )
    } else {
        (
            "I'm not sure about that yet. Try asking about contributions, balances or loans.",
            &["How do I contribute?", "Show my balance"],
            None,
        )
    };
    ChatResponse {
        message: reply.to_string(),
        suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        requires_data: data_type.is_some(),
        data_type: data_type.map(str::to_string),
    }
}

#[async_trait(?Send)]
impl ChatAssistant for MemoryBackend {
    async fn start_chat_session(&self) -> QueryResult<String> {
        self.chat_call("startChatSession")?;
        let mut state = self.state.borrow_mut();
        let now = state.now();
        let id = state.next_id("session");
        let session = ChatSession {
            session_id: id.clone(),
            user_id: self.caller.clone().unwrap_or_else(Principal::anonymous),
            messages: Vec::new(),
            start_time: now,
            last_activity: now,
            is_active: true,
        };
        state.sessions.insert(id.clone(), session);
        Ok(id)
    }

    async fn send_message(
        &self,
        session_id: &str,
        message: &str,
        context: Option<&str>,
    ) -> QueryResult<ChatResponse> {
        self.chat_call("sendMessage")?;
        let response = assistant_reply(message);
        let user_id = self.caller.clone().unwrap_or_else(Principal::anonymous);
        let mut state = self.state.borrow_mut();
        let now = state.now();
        let ids = (state.next_id("msg"), state.next_id("msg"));
        if let Some(session) = state.sessions.get_mut(session_id) {
            session.messages.push(ChatMessage {
                id: ids.0,
                user_id: user_id.clone(),
                message: message.to_string(),
                is_user_message: true,
                timestamp: now,
                context: context.map(str::to_string),
            });
            session.messages.push(ChatMessage {
                id: ids.1,
                user_id,
                message: response.message.clone(),
                is_user_message: false,
                timestamp: now,
                context: None,
            });
            session.last_activity = now;
        }
        Ok(response)
    }

    async fn get_chat_history(&self, session_id: &str) -> QueryResult<Option<ChatSession>> {
        self.chat_call("getChatHistory")?;
        Ok(self.state.borrow().sessions.get(session_id).cloned())
    }

    async fn get_my_sessions(&self) -> QueryResult<Vec<ChatSession>> {
        self.chat_call("getMySessions")?;
        let me = self.caller.clone().unwrap_or_else(Principal::anonymous);
        Ok(self
            .state
            .borrow()
            .sessions
            .values()
            .filter(|s| s.user_id == me)
            .cloned()
            .collect())
    }

    async fn end_chat_session(&self, session_id: &str) -> QueryResult<bool> {
        self.chat_call("endChatSession")?;
        Ok(match self.state.borrow_mut().sessions.get_mut(session_id) {
            Some(session) if session.is_active => {
                session.is_active = false;
                true
            }
            _ => false,
        })
    }

    async fn get_capabilities(&self) -> QueryResult<ChatbotCapabilities> {
        self.chat_call("getChatbotCapabilities")?;
        Ok(ChatbotCapabilities {
            capabilities: vec![
                "Answer questions about contributions".into(),
                "Explain balances and loans".into(),
                "Help find a chama".into(),
            ],
            supported_languages: vec!["English".into(), "Swahili".into()],
            chama_features: vec!["Savings".into(), "Loans".into(), "Welfare".into()],
        })
    }

    async fn health_check(&self) -> QueryResult<String> {
        self.chat_call("healthCheck")?;
        Ok("AI chatbot canister is healthy".to_string())
    }
}

fn caller_principal(caller: Option<&StoredIdentity>) -> Option<Principal> {
    caller.and_then(|identity| Principal::from_text(&identity.principal).ok())
}

impl Connector for MemoryBackend {
    fn users(&self, caller: Option<&StoredIdentity>) -> QueryResult<Rc<dyn UserRegistry>> {
        Ok(Rc::new(self.as_caller(caller_principal(caller))))
    }

    fn chamas(&self, caller: Option<&StoredIdentity>) -> QueryResult<Rc<dyn ChamaRegistry>> {
        Ok(Rc::new(self.as_caller(caller_principal(caller))))
    }

    fn ledger(&self, caller: Option<&StoredIdentity>) -> QueryResult<Rc<dyn FinancialLedger>> {
        Ok(Rc::new(self.as_caller(caller_principal(caller))))
    }

    fn chat(&self, caller: Option<&StoredIdentity>) -> QueryResult<Rc<dyn ChatAssistant>> {
        Ok(Rc::new(self.as_caller(caller_principal(caller))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChamaType, ContributionFrequency};

    fn principal(text: &str) -> Principal {
        Principal::from_text(text).unwrap()
    }

    fn draft(name: &str, max_members: u64) -> NewChama {
        NewChama {
            name: name.into(),
            description: "Saving together every month".into(),
            contribution_amount: 5_000,
            contribution_frequency: ContributionFrequency::Monthly,
            chama_type: ChamaType::Savings,
            max_members,
            is_public: true,
            require_approval: false,
            enable_ai: true,
        }
    }

    #[tokio::test]
    async fn test_register_then_read_profile() {
        let backend = MemoryBackend::new();
        let me = backend.as_caller(Some(principal("aaaaa-aa")));

        assert_eq!(me.get_my_profile().await.unwrap(), None);
        let user = me
            .register_user("Wanjiku", "wanjiku@example.com", "+254712345678")
            .await
            .unwrap();
        assert_eq!(me.get_my_profile().await.unwrap(), Some(user));
        assert_eq!(
            me.register_user("Wanjiku", "wanjiku@example.com", "+254712345678")
                .await,
            Err(CallError::Backend(UserError::AlreadyExists))
        );
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_rejected() {
        let backend = MemoryBackend::new();
        assert_eq!(
            backend.create_chama(&draft("Umoja", 5)).await,
            Err(CallError::Backend(ChamaError::NotAuthorized))
        );
    }

    #[tokio::test]
    async fn test_join_until_full() {
        let backend = MemoryBackend::new();
        let owner = backend.as_caller(Some(principal("owner-aa")));
        let chama = owner.create_chama(&draft("Umoja", 2)).await.unwrap();

        let second = backend.as_caller(Some(principal("second-aa")));
        let joined = second.join_chama(&chama.id).await.unwrap();
        assert_eq!(joined.members.len(), 2);
        assert_eq!(
            second.join_chama(&chama.id).await,
            Err(CallError::Backend(ChamaError::AlreadyExists))
        );

        let third = backend.as_caller(Some(principal("third-aa")));
        assert_eq!(
            third.join_chama(&chama.id).await,
            Err(CallError::Backend(ChamaError::MaxMembersReached))
        );
    }

    #[tokio::test]
    async fn test_role_changes_need_admin() {
        let backend = MemoryBackend::new();
        let owner = backend.as_caller(Some(principal("owner-aa")));
        let member = principal("member-aa");
        let chama = owner.create_chama(&draft("Umoja", 5)).await.unwrap();
        backend
            .as_caller(Some(member.clone()))
            .join_chama(&chama.id)
            .await
            .unwrap();

        let updated = owner
            .update_member_role(&chama.id, &member, MemberRole::Admin)
            .await
            .unwrap();
        assert!(updated.is_admin(&member));

        let outsider = backend.as_caller(Some(principal("outsider-aa")));
        assert_eq!(
            outsider.remove_member(&chama.id, &member).await,
            Err(CallError::Backend(ChamaError::NotAuthorized))
        );
        assert_eq!(
            owner.remove_member(&chama.id, &principal("owner-aa")).await,
            Err(CallError::Backend(ChamaError::NotAuthorized))
        );
        let after = owner.remove_member(&chama.id, &member).await.unwrap();
        assert!(!after.is_member(&member));
        assert!(!after.is_admin(&member));
    }

    #[tokio::test]
    async fn test_contributions_move_balances() {
        let backend = MemoryBackend::new();
        let owner = backend.as_caller(Some(principal("owner-aa")));
        let chama = owner.create_chama(&draft("Umoja", 5)).await.unwrap();

        owner
            .record_contribution(&chama.id, 12_500, "March")
            .await
            .unwrap();
        assert_eq!(
            owner.process_withdrawal(&chama.id, 20_000, "School fees").await,
            Err(CallError::Backend(TransactionError::InsufficientFunds))
        );
        owner
            .process_withdrawal(&chama.id, 2_500, "School fees")
            .await
            .unwrap();

        let balance = owner.get_my_balance(&chama.id).await.unwrap();
        assert_eq!(balance, Balance { contributions: 12_500, withdrawals: 2_500 });
        assert_eq!(owner.get_chama_treasury_balance(&chama.id).await.unwrap(), 10_000);

        let stats = owner.get_chama_transaction_stats(&chama.id).await.unwrap();
        assert_eq!(stats.total_transactions, 2);
        assert_eq!(stats.average_transaction, 7_500);
        assert_eq!(
            owner.record_contribution(&chama.id, 0, "nothing").await,
            Err(CallError::Backend(TransactionError::InvalidAmount))
        );
    }

    #[tokio::test]
    async fn test_offline_fails_with_network_error() {
        let backend = MemoryBackend::new();
        backend.set_offline(true);
        assert!(matches!(
            backend.get_chama_count().await,
            Err(TransportError::Network(_))
        ));
        backend.set_offline(false);
        assert_eq!(backend.get_chama_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_chat_session_lifecycle() {
        let backend = MemoryBackend::new();
        let id = backend.start_chat_session().await.unwrap();
        let reply = backend.send_message(&id, "hello", Some("welcome")).await.unwrap();
        assert!(!reply.suggestions.is_empty());

        let history = backend.get_chat_history(&id).await.unwrap().unwrap();
        assert_eq!(history.messages.len(), 2);
        assert_eq!(history.messages[0].context.as_deref(), Some("welcome"));

        assert!(backend.end_chat_session(&id).await.unwrap());
        assert!(!backend.end_chat_session(&id).await.unwrap());
        assert_eq!(
            backend.chat_calls(),
            ["startChatSession", "sendMessage", "getChatHistory", "endChatSession", "endChatSession"]
        );
    }

    #[tokio::test]
    async fn test_demo_data() {
        let me = principal("me-demo-cai");
        let backend = MemoryBackend::new().with_demo_data(&me);
        let mine = backend.as_caller(Some(me.clone()));
        assert_eq!(mine.get_my_chamas().await.unwrap().len(), 1);
        assert_eq!(mine.get_public_chamas(None).await.unwrap().len(), 2);
        assert_eq!(mine.get_my_transactions(Some(2)).await.unwrap().len(), 2);
        assert_eq!(mine.get_my_profile().await.unwrap().unwrap().total_contributions, 15_000);
    }
}
