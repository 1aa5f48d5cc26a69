use dioxus::prelude::*;
use ui::components::Spinner;
use ui::{use_auth, use_session, UserRegistration};

use crate::Route;

/// Profile completion for a principal the user registry does not know yet.
#[component]
pub fn Register() -> Element {
    let auth = use_auth();
    let session = use_session();
    let nav = use_navigator();
    let state = auth();

    if state.loading && state.principal.is_none() {
        return rsx! {
            div { class: "login-page", Spinner { label: "Loading..." } }
        };
    }
    if !state.is_authenticated {
        nav.replace(Route::Login {});
        return rsx! {};
    }
    if state.user.is_some() {
        nav.replace(Route::Dashboard {});
        return rsx! {};
    }

    rsx! {
        div {
            class: "register-page",
            UserRegistration {
                on_complete: move |_| {
                    nav.replace(Route::Dashboard {});
                },
                on_cancel: move |_| {
                    let session = session.clone();
                    spawn(async move {
                        session.logout().await;
                        nav.replace(Route::Login {});
                    });
                },
            }
        }
    }
}
