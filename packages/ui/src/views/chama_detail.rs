use api::models::{Chama, Principal, Transaction};
use dioxus::prelude::*;

use crate::components::{Alert, AlertKind, Badge, Button, ButtonVariant, Spinner, TabBar, TabItem};
use crate::format::{chama_status_class, kes};
use crate::icons::{FaArrowLeft, FaCircleExclamation};
use crate::{use_auth, use_services, BalanceDisplay, ContributionForm, Icon, MemberManagement, TransactionList};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

/// What the signed-in member may do in one chama.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Access {
    pub is_owner: bool,
    pub is_admin: bool,
    pub is_member: bool,
}

impl Access {
    pub fn of(chama: &Chama, me: Option<&Principal>) -> Self {
        let Some(me) = me else {
            return Self::default();
        };
        let is_owner = &chama.creator == me;
        Self {
            is_owner,
            is_admin: is_owner || chama.is_admin(me),
            is_member: chama.is_member(me),
        }
    }

    pub fn tabs(self) -> Vec<TabItem> {
        let mut tabs = vec![
            TabItem::new("overview", "Overview"),
            TabItem::new("members", "Members"),
            TabItem::new("transactions", "Transactions"),
        ];
        if self.is_member {
            tabs.push(TabItem::new("contribute", "Contribute"));
        }
        if self.is_admin {
            tabs.push(TabItem::new("settings", "Settings"));
        }
        tabs
    }
}

#[component]
pub fn ChamaDetailView(chama_id: String, on_back: EventHandler<()>) -> Element {
    let auth = use_auth();
    let services = use_services();
    let mut active = use_signal(|| "overview");
    let mut reload = use_signal(|| 0u32);
    let mut refresh = use_signal(|| 0u32);
    let mut notice = use_signal(|| Option::<(AlertKind, String)>::None);

    let chama = use_resource(use_reactive((&chama_id,), move |(chama_id,)| {
        let services = services.clone();
        let _ = reload();
        async move { services.chamas.get_chama_by_id(&chama_id).await }
    }));

    let loaded = chama.read().clone();
    let Some(found) = loaded else {
        return rsx! {
            div { class: "view", Spinner { label: "Loading chama details..." } }
        };
    };
    let Some(chama) = found else {
        return rsx! {
            div {
                class: "view empty-state",
                Icon { icon: FaCircleExclamation, width: 32, height: 32 }
                h3 { "Error loading chama" }
                p { class: "view-muted", "Chama not found" }
                Button {
                    variant: ButtonVariant::Primary,
                    onclick: move |_| on_back.call(()),
                    "Back to My Chamas"
                }
            }
        };
    };

    let me = auth().principal;
    let access = Access::of(&chama, me.as_ref());
    let tabs = access.tabs();
    // Fall back to the overview when the current tab is not offered for this member.
    let current = if tabs.iter().any(|t| t.key == active()) {
        active()
    } else {
        "overview"
    };
    let recorded = move |tx: Transaction| {
        notice.set(Some((
            AlertKind::Success,
            format!("Contribution of {} recorded successfully!", kes(tx.amount)),
        )));
        refresh += 1;
        active.set("overview");
    };

    let interest = format!("{:.1}%", chama.rules.loan_interest_rate);

    let body = match current {
        "members" => rsx! {
            MemberManagement {
                chama: chama.clone(),
                is_admin: access.is_admin,
                on_update: move |_| reload += 1,
            }
        },
        "transactions" => rsx! {
            TransactionList {
                chama_id: Some(chama.id.clone()),
                limit: 50,
                title: "All Transactions",
                refresh: refresh(),
            }
        },
        "contribute" => rsx! {
            ContributionForm {
                chama: chama.clone(),
                on_recorded: recorded,
                on_cancel: move |_| active.set("overview"),
            }
        },
        "settings" => rsx! {
            div {
                class: "card",
                h3 { class: "view-section-title", "Chama Settings" }
                dl {
                    class: "detail-grid",
                    dt { "Chama Type" }
                    dd { "{chama.chama_type.label()}" }
                    dt { "Contribution Frequency" }
                    dd { "{chama.contribution_frequency.label()}" }
                    dt { "Meeting Frequency" }
                    dd { "{chama.meeting_frequency.label()}" }
                    dt { "Status" }
                    dd { "{chama.status.label()}" }
                    dt { "Visibility" }
                    dd { if chama.settings.is_public { "Public" } else { "Private" } }
                    dt { "Joining" }
                    dd { if chama.settings.require_approval_for_joining { "Approval required" } else { "Open" } }
                    dt { "Late Penalty" }
                    dd { "{kes(chama.rules.late_penalty)}" }
                    dt { "Loan Interest" }
                    dd { "{interest}" }
                    dt { "Quorum" }
                    dd { "{chama.rules.quorum_percentage}%" }
                }
            }
        },
        _ => rsx! {
            BalanceDisplay { chama: chama.clone(), refresh: refresh() }
            TransactionList {
                chama_id: Some(chama.id.clone()),
                limit: 5,
                show_filters: false,
                title: "Recent Activity",
                refresh: refresh(),
            }
            button {
                class: "link-button",
                onclick: move |_| active.set("transactions"),
                "View all transactions →"
            }
        },
    };

    rsx! {
        document::Stylesheet { href: VIEWS_CSS }

        div {
            class: "view",

            div {
                class: "card",
                div {
                    class: "view-header",
                    button {
                        class: "icon-button",
                        title: "Back",
                        onclick: move |_| on_back.call(()),
                        Icon { icon: FaArrowLeft, width: 14, height: 14 }
                    }
                    div {
                        class: "view-header-main",
                        h1 { class: "view-title", "{chama.name}" }
                        p { class: "view-muted", "{chama.description}" }
                        div {
                            class: "chip-row",
                            Badge { tone: chama_status_class(chama.status).to_string(), "{chama.status.label()}" }
                            span { class: "view-muted", "{chama.members.len()} / {chama.max_members} members" }
                            if access.is_owner {
                                Badge { tone: "badge--info", "Owner" }
                            } else if access.is_admin {
                                Badge { tone: "badge--info", "Admin" }
                            }
                        }
                    }
                }
                TabBar {
                    tabs,
                    active: current.to_string(),
                    on_select: move |key| active.set(key),
                }
            }

            if let Some((kind, message)) = notice() {
                Alert { kind, message, on_dismiss: move |_| notice.set(None) }
            }

            {body}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{chama, member, principal};
    use api::models::MemberRole;

    #[test]
    fn test_owner_sees_every_tab() {
        let umoja = chama("c1", "Umoja", 5_000);
        let access = Access::of(&umoja, Some(&principal("aaaaa-aa")));
        assert!(access.is_owner && access.is_admin && access.is_member);
        let keys: Vec<_> = access.tabs().iter().map(|t| t.key).collect();
        assert_eq!(keys, ["overview", "members", "transactions", "contribute", "settings"]);
    }

    #[test]
    fn test_plain_member_cannot_manage() {
        let mut umoja = chama("c1", "Umoja", 5_000);
        umoja.members.push(member("bbbbb-bb", MemberRole::Member));
        let access = Access::of(&umoja, Some(&principal("bbbbb-bb")));
        assert_eq!(
            access,
            Access {
                is_owner: false,
                is_admin: false,
                is_member: true
            }
        );
        assert_eq!(access.tabs().len(), 4);
    }

    #[test]
    fn test_visitor_only_browses() {
        let umoja = chama("c1", "Umoja", 5_000);
        assert_eq!(Access::of(&umoja, None).tabs().len(), 3);
        assert_eq!(Access::of(&umoja, Some(&principal("ccccc-cc"))).tabs().len(), 3);
    }
}
