use api::models::{Chama, ChamaMember, MemberRole, MemberStatus, Principal, User};
use api::time::format_date;
use dioxus::prelude::*;

use crate::components::{Alert, AlertKind, Badge, Button, ButtonVariant, Select};
use crate::format::kes;
use crate::icons::{FaTrash, FaUserPlus, FaUsers, FaXmark};
use crate::views::ModalOverlay;
use crate::{use_services, Icon, UserSearch};

fn role_class(role: MemberRole) -> &'static str {
    match role {
        MemberRole::Owner => "badge--info",
        MemberRole::Admin => "badge--danger",
        MemberRole::Treasurer => "badge--success",
        MemberRole::Secretary => "badge--warning",
        MemberRole::Member => "badge--muted",
    }
}

fn member_status_class(status: MemberStatus) -> &'static str {
    match status {
        MemberStatus::Active => "badge--success",
        MemberStatus::Suspended => "badge--warning",
        MemberStatus::Inactive => "badge--muted",
        MemberStatus::Expelled => "badge--danger",
    }
}

fn role_options() -> Vec<(String, String)> {
    MemberRole::ASSIGNABLE
        .iter()
        .map(|r| (r.key().to_string(), r.label().to_string()))
        .collect()
}

#[derive(Clone, Copy, PartialEq)]
enum Outcome {
    Added,
    Removed,
    RoleChanged,
}

impl Outcome {
    fn message(self) -> &'static str {
        match self {
            Outcome::Added => "Member added successfully",
            Outcome::Removed => "Member removed successfully",
            Outcome::RoleChanged => "Member role updated successfully",
        }
    }
}

/// Member roster of a chama. Administrators can add, remove and re-role members;
/// every successful change hands the updated chama to `on_update`.
#[component]
pub fn MemberManagement(
    chama: Chama,
    #[props(default)] is_admin: bool,
    on_update: Option<EventHandler<Chama>>,
) -> Element {
    let services = use_services();
    let mut busy = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);
    let mut success = use_signal(|| Option::<Outcome>::None);
    let mut show_add = use_signal(|| false);
    let mut confirm_remove = use_signal(|| Option::<Principal>::None);

    // Every mutation goes through here so the busy flag and banners stay consistent.
    let chama_id = chama.id.clone();
    let run = use_callback(move |change: Change| {
        if busy() {
            return;
        }
        let services = services.clone();
        let chama_id = chama_id.clone();
        spawn(async move {
            busy.set(true);
            error.set(None);
            success.set(None);
            let chamas = &services.chamas;
            let (result, outcome) = match &change {
                Change::Add(user) => (chamas.add_member(&chama_id, user).await, Outcome::Added),
                Change::Remove(user) => {
                    (chamas.remove_member(&chama_id, user).await, Outcome::Removed)
                }
                Change::Role(user, role) => (
                    chamas.update_member_role(&chama_id, user, *role).await,
                    Outcome::RoleChanged,
                ),
            };
            match result {
                Ok(updated) => {
                    success.set(Some(outcome));
                    if let Some(handler) = on_update {
                        handler.call(updated);
                    }
                }
                Err(e) => {
                    tracing::error!("Member change failed: {}", e);
                    error.set(Some(e.to_string()));
                }
            }
            busy.set(false);
        });
    });

    let can_add = is_admin && !chama.is_full();
    let member_count = chama.members.len();

    rsx! {
        div {
            class: "member-management",

            div {
                class: "section-header",
                div {
                    h3 { class: "view-section-title", "Members" }
                    p { class: "view-muted", "{member_count} of {chama.max_members} members" }
                }
                if can_add {
                    Button {
                        variant: ButtonVariant::Primary,
                        onclick: move |_| show_add.set(true),
                        Icon { icon: FaUserPlus, width: 14, height: 14 }
                        " Add Member"
                    }
                }
            }

            if let Some(message) = error() {
                Alert { message, on_dismiss: move |_| error.set(None) }
            }
            if let Some(outcome) = success() {
                Alert {
                    kind: AlertKind::Success,
                    message: outcome.message().to_string(),
                    on_dismiss: move |_| success.set(None),
                }
            }

            div {
                class: "card",
                if chama.members.is_empty() {
                    div {
                        class: "empty-state",
                        Icon { icon: FaUsers, width: 32, height: 32 }
                        h3 { "No members yet" }
                        p { class: "view-muted", "Get started by adding the first members to your chama." }
                    }
                } else {
                    ul {
                        class: "member-rows",
                        for member in chama.members.clone() {
                            MemberRow {
                                key: "{member.user_id}",
                                manageable: is_admin && member.role != MemberRole::Owner,
                                busy: busy(),
                                on_role: move |(user, role): (Principal, MemberRole)| run.call(Change::Role(user, role)),
                                on_remove: move |user: Principal| confirm_remove.set(Some(user)),
                                member,
                            }
                        }
                    }
                }
            }

            if show_add() {
                ModalOverlay {
                    on_close: move |_| show_add.set(false),
                    div {
                        class: "modal-header",
                        h3 { "Add New Member" }
                        button {
                            class: "icon-button",
                            onclick: move |_| show_add.set(false),
                            Icon { icon: FaXmark, width: 16, height: 16 }
                        }
                    }
                    UserSearch {
                        max_results: 20,
                        on_select: move |user: User| {
                            show_add.set(false);
                            run.call(Change::Add(user.id));
                        },
                    }
                }
            }

            if let Some(user) = confirm_remove() {
                ModalOverlay {
                    on_close: move |_| confirm_remove.set(None),
                    div {
                        class: "modal-body",
                        h3 { "Remove member?" }
                        p { "Are you sure you want to remove member {user.short()} from {chama.name}?" }
                        div {
                            class: "form-actions",
                            Button {
                                variant: ButtonVariant::Destructive,
                                onclick: move |_| {
                                    confirm_remove.set(None);
                                    run.call(Change::Remove(user.clone()));
                                },
                                "Remove"
                            }
                            Button {
                                variant: ButtonVariant::Outline,
                                onclick: move |_| confirm_remove.set(None),
                                "Cancel"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[derive(Clone)]
enum Change {
    Add(Principal),
    Remove(Principal),
    Role(Principal, MemberRole),
}

#[component]
fn MemberRow(
    member: ChamaMember,
    manageable: bool,
    busy: bool,
    on_role: EventHandler<(Principal, MemberRole)>,
    on_remove: EventHandler<Principal>,
) -> Element {
    let initial = member
        .user_id
        .as_str()
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('?');
    let role_user = member.user_id.clone();
    let remove_user = member.user_id.clone();

    rsx! {
        li {
            class: "member-row",
            div {
                class: "member-info",
                span { class: "avatar", "{initial}" }
                div {
                    div {
                        class: "member-heading",
                        span { class: "member-id", "Member ID: {member.user_id.short()}" }
                        Badge { tone: role_class(member.role).to_string(), "{member.role.label()}" }
                        Badge { tone: member_status_class(member.status).to_string(), "{member.status.label()}" }
                    }
                    div {
                        class: "view-muted member-meta",
                        span { "Joined: {format_date(member.joined_at)}" }
                        span { "Balance: {kes(member.contribution_balance)}" }
                        if member.loan_balance > 0 {
                            span { class: "text-danger", "Loan: {kes(member.loan_balance)}" }
                        }
                        if member.missed_contributions > 0 {
                            span { class: "text-warning", "Missed: {member.missed_contributions} payments" }
                        }
                    }
                    if let Some(last) = member.last_contribution {
                        div { class: "view-muted", "Last contribution: {format_date(last)}" }
                    }
                }
            }
            if manageable {
                div {
                    class: "member-actions",
                    Select {
                        value: member.role.key().to_string(),
                        options: role_options(),
                        onchange: move |key: String| {
                            if let Some(role) = MemberRole::from_key(&key) {
                                on_role.call((role_user.clone(), role));
                            }
                        },
                    }
                    Button {
                        variant: ButtonVariant::Ghost,
                        disabled: busy,
                        title: "Remove member",
                        onclick: move |_| on_remove.call(remove_user.clone()),
                        Icon { icon: FaTrash, width: 14, height: 14 }
                    }
                }
            }
        }
    }
}
