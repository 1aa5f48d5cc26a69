use dioxus::prelude::*;
use ui::components::{Alert, Spinner};
use ui::{use_auth, use_session, ChatBot, Navbar};

use crate::Route;

/// Shell for every signed-in page: navigation bar, the page, and the chat assistant.
///
/// Visitors without a session go to the login page; signed-in principals without a
/// profile go to registration first.
#[component]
pub fn AppLayout() -> Element {
    let auth = use_auth();
    let session = use_session();
    let nav = use_navigator();
    let state = auth();

    if state.loading && state.principal.is_none() {
        return rsx! {
            div { class: "app-loading", Spinner { label: "Loading your session..." } }
        };
    }
    if !state.is_authenticated {
        nav.replace(Route::Login {});
        return rsx! {};
    }
    if state.needs_registration {
        nav.replace(Route::Register {});
        return rsx! {};
    }

    rsx! {
        div {
            class: "app-shell",
            Navbar {
                Link { to: Route::Dashboard {}, active_class: "active", "Dashboard" }
                Link { to: Route::MyChamas {}, active_class: "active", "My Chamas" }
                Link { to: Route::DiscoverChamas {}, active_class: "active", "Discover" }
                Link { to: Route::Transactions {}, active_class: "active", "Transactions" }
                Link { to: Route::Users {}, active_class: "active", "Users" }
            }
            if let Some(message) = state.error {
                div {
                    class: "app-banner",
                    Alert { message, on_dismiss: move |_| session.clear_error() }
                }
            }
            main {
                class: "app-main",
                Outlet::<Route> {}
            }
            ChatBot {}
        }
    }
}
