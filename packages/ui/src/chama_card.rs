use api::models::{Chama, ChamaStatus, Principal};
use api::time::format_date;
use dioxus::prelude::*;

use crate::components::{Badge, Button, ButtonVariant};
use crate::format::{chama_status_class, kes, plural};
use crate::icons::{FaLock, FaRobot, FaUserCheck, FaUsers};
use crate::Icon;

/// Summary card used by the chama list, discovery and dashboard.
#[component]
pub fn ChamaCard(
    chama: Chama,
    #[props(default)] current_user: Option<Principal>,
    on_view: Option<EventHandler<Chama>>,
    on_join: Option<EventHandler<Chama>>,
    #[props(default)] joining: bool,
) -> Element {
    let is_member = current_user.as_ref().is_some_and(|me| chama.is_member(me));
    let is_owner = current_user.as_ref() == Some(&chama.creator);
    let filled = chama.members.len() as u64;
    let membership = if chama.max_members == 0 {
        100
    } else {
        (filled * 100 / chama.max_members).min(100)
    };
    let extra_members = chama.members.len().saturating_sub(5);
    let can_join = chama.status == ChamaStatus::Active && !chama.is_full();
    let join_handler = on_join.filter(|_| can_join && !is_member);
    let slots_left = format!("{} left", plural(chama.open_slots() as usize, "slot", "slots"));

    let view_chama = chama.clone();
    let join_chama = chama.clone();

    rsx! {
        div {
            class: "card chama-card",

            div {
                class: "chama-card-header",
                div {
                    class: "chama-card-badges",
                    Badge { tone: "badge--info", "{chama.chama_type.label()}" }
                    Badge { tone: chama_status_class(chama.status).to_string(), "{chama.status.label()}" }
                    if !chama.settings.is_public {
                        Badge { tone: "badge--muted",
                            Icon { icon: FaLock, width: 10, height: 10 }
                            " Private"
                        }
                    }
                }
                h3 { class: "chama-card-title", "{chama.name}" }
                p { class: "chama-card-description", "{chama.description}" }
            }

            div {
                class: "chama-card-body",
                div {
                    class: "stat-grid",
                    div {
                        class: "stat",
                        div { class: "stat-label", "Contribution" }
                        div { class: "stat-value", "{kes(chama.contribution_amount)}" }
                        div { class: "view-muted", "{chama.contribution_frequency.label()}" }
                    }
                    div {
                        class: "stat",
                        div { class: "stat-label", "Treasury" }
                        div { class: "stat-value", "{kes(chama.treasury.total_funds)}" }
                        div { class: "view-muted", "Total funds" }
                    }
                }

                div {
                    class: "progress",
                    div {
                        class: "progress-label",
                        span {
                            Icon { icon: FaUsers, width: 12, height: 12 }
                            " Members"
                        }
                        span { "{filled} / {chama.max_members}" }
                    }
                    div {
                        class: "progress-track",
                        div { class: "progress-fill", style: "width: {membership}%" }
                    }
                }

                div {
                    class: "chama-card-avatars",
                    for (index, member) in chama.members.iter().take(5).enumerate() {
                        span {
                            key: "{member.user_id}",
                            class: "avatar avatar--small",
                            title: "{member.role.label()}",
                            "{index + 1}"
                        }
                    }
                    if extra_members > 0 {
                        span { class: "avatar avatar--small avatar--more", "+{extra_members}" }
                    }
                    span { class: "view-muted", "Created {format_date(chama.created_at)}" }
                }

                div {
                    class: "chama-card-features",
                    if chama.settings.enable_ai_recommendations {
                        span {
                            Icon { icon: FaRobot, width: 12, height: 12 }
                            " AI Insights"
                        }
                    }
                    if chama.settings.allow_external_loans {
                        span { "Loans Available" }
                    }
                    if chama.settings.require_approval_for_joining {
                        span {
                            Icon { icon: FaUserCheck, width: 12, height: 12 }
                            " Approval Required"
                        }
                    }
                }
            }

            div {
                class: "chama-card-actions",
                div {
                    if is_member {
                        Badge { tone: "badge--success", if is_owner { "Owner" } else { "Member" } }
                    } else if chama.is_full() {
                        Badge { tone: "badge--muted", "Full" }
                    } else if chama.status == ChamaStatus::Forming {
                        Badge { tone: "badge--info", "Forming" }
                    }
                    if let Some(join) = join_handler {
                        Button {
                            variant: ButtonVariant::Primary,
                            disabled: joining,
                            onclick: move |_| join.call(join_chama.clone()),
                            if joining { "Joining..." } else { "Join" }
                        }
                    }
                    span { class: "view-muted", " {slots_left}" }
                }
                if let Some(view) = on_view {
                    Button {
                        variant: ButtonVariant::Outline,
                        onclick: move |_| view.call(view_chama.clone()),
                        "View Details"
                    }
                }
            }
        }
    }
}
