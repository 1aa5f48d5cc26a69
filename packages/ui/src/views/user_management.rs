use api::models::User;
use dioxus::prelude::*;

use crate::balance_display::Stat;
use crate::components::{TabBar, TabItem};
use crate::format::kes;
use crate::icons::FaXmark;
use crate::{use_auth, use_session, Icon, UserProfile, UserRegistration, UserSearch};

use super::ModalOverlay;

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

/// Profile, member directory and onboarding in one tabbed page.
#[component]
pub fn UserManagementView() -> Element {
    let auth = use_auth();
    let session = use_session();
    let mut active = use_signal(|| "profile");
    let mut selected = use_signal(|| Option::<User>::None);

    let state = auth();
    if !state.is_authenticated {
        return rsx! {
            div {
                class: "view empty-state",
                h3 { "Access Denied" }
                p { class: "view-muted", "Please log in to access user management features." }
            }
        };
    }

    let user = state.user.clone();
    let name = user.as_ref().map(|u| u.name.clone()).unwrap_or_default();
    let joined = user.as_ref().map(|u| u.chamas_joined.len()).unwrap_or(0);
    let contributed = user.as_ref().map(|u| u.total_contributions).unwrap_or(0);
    let verified = user.as_ref().is_some_and(|u| u.is_verified);
    let (status_label, status_mark) = if verified {
        ("Verified Account", "✓")
    } else {
        ("Pending Verification", "○")
    };

    let tabs = vec![
        TabItem::new("profile", "My Profile"),
        TabItem::new("search", "Find Users"),
        TabItem::new("register", "Register User"),
    ];

    rsx! {
        document::Stylesheet { href: VIEWS_CSS }

        div {
            class: "view",

            div {
                class: "card",
                div {
                    class: "view-header",
                    div {
                        h1 { class: "view-title", "User Management" }
                        p { class: "view-muted", "Manage your profile, search for users, and help onboard new members" }
                    }
                    span { class: "view-muted", "Welcome, " strong { "{name}" } }
                }
                TabBar {
                    tabs,
                    active: active().to_string(),
                    on_select: move |key| active.set(key),
                }
            }

            {match active() {
                "search" => rsx! {
                    UserSearch {
                        on_select: move |user: User| selected.set(Some(user)),
                        max_results: 50,
                    }
                },
                "register" => rsx! {
                    UserRegistration {
                        on_complete: move |_| {
                            active.set("profile");
                            let session = session.clone();
                            spawn(async move { session.refresh_user().await });
                        },
                        on_cancel: move |_| active.set("profile"),
                    }
                },
                _ => rsx! { UserProfile { show_stats: true } },
            }}

            if let Some(picked) = selected() {
                ModalOverlay {
                    wide: true,
                    on_close: move |_| selected.set(None),
                    div {
                        class: "modal-header",
                        h3 { "User Profile" }
                        button {
                            class: "icon-button",
                            onclick: move |_| selected.set(None),
                            Icon { icon: FaXmark, width: 14, height: 14 }
                        }
                    }
                    UserProfile { user_id: Some(picked.id.clone()), show_stats: false }
                }
            }

            div {
                class: "card",
                h3 { class: "view-section-title", "Quick Stats" }
                div {
                    class: "stat-grid",
                    Stat { label: "Chamas Joined", value: "{joined}" }
                    Stat { label: "Total Contributions", value: kes(contributed) }
                    Stat { label: status_label.to_string(), value: status_mark.to_string() }
                }
            }
        }
    }
}
