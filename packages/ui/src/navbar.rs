use dioxus::prelude::*;

use crate::icons::{FaCircleUser, FaPeopleGroup};
use crate::{use_auth, Icon, LogoutButton};

/// Top navigation bar. The platform crate passes its router links as children.
#[component]
pub fn Navbar(children: Element) -> Element {
    let auth = use_auth();
    let state = auth();
    let name = state
        .user
        .as_ref()
        .map(|u| u.name.clone())
        .or_else(|| state.principal.as_ref().map(|p| p.short()));

    rsx! {
        header {
            class: "navbar",
            div {
                class: "navbar-brand",
                Icon { icon: FaPeopleGroup, width: 20, height: 20 }
                span { "AI Chama Manager" }
            }
            nav {
                class: "navbar-links",
                {children}
            }
            if state.is_authenticated {
                div {
                    class: "navbar-user",
                    if let Some(name) = name {
                        span {
                            class: "navbar-user-name",
                            Icon { icon: FaCircleUser, width: 14, height: 14 }
                            " {name}"
                        }
                    }
                    LogoutButton { class: "button navbar-logout" }
                }
            }
        }
    }
}
