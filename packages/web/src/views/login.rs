//! Sign-in page and the identity provider's return route.

use dioxus::prelude::*;
use ui::components::{Alert, Spinner};
use ui::icons::{FaChartLine, FaPeopleGroup, FaRobot, FaShieldHalved};
use ui::{use_auth, use_session, Icon, LoginButton};

use crate::Route;

/// Login page component.
#[component]
pub fn Login() -> Element {
    let auth = use_auth();
    let nav = use_navigator();
    let state = auth();

    // Already signed in
    if !state.loading && state.is_authenticated {
        nav.replace(Route::Dashboard {});
    }

    rsx! {
        div {
            class: "login-page",
            div {
                class: "login-card",
                div {
                    class: "login-logo",
                    Icon { icon: FaPeopleGroup, width: 32, height: 32 }
                }
                h1 { "AI Chama Manager" }
                p { class: "login-tagline", "Save, lend and grow together with your chama" }

                if let Some(message) = state.error {
                    Alert { message }
                }

                LoginButton { class: "button login-button" }

                ul {
                    class: "login-features",
                    li {
                        Icon { icon: FaShieldHalved, width: 14, height: 14 }
                        " Secure sign-in without passwords"
                    }
                    li {
                        Icon { icon: FaChartLine, width: 14, height: 14 }
                        " Track contributions, loans and balances"
                    }
                    li {
                        Icon { icon: FaRobot, width: 14, height: 14 }
                        " AI assistant for financial guidance"
                    }
                }
            }
        }
    }
}

/// Landing route after the identity provider redirects back.
#[component]
pub fn AuthCallback(query: String) -> Element {
    let session = use_session();
    let nav = use_navigator();

    use_hook(move || {
        spawn(async move {
            match session.login(&query).await {
                Ok(principal) => {
                    tracing::info!("Signed in as {}", principal.short());
                    if session.state().needs_registration {
                        nav.replace(Route::Register {});
                    } else {
                        nav.replace(Route::Dashboard {});
                    }
                }
                Err(e) => {
                    tracing::error!("Identity callback rejected: {}", e);
                    nav.replace(Route::Login {});
                }
            }
        });
    });

    rsx! {
        div {
            class: "login-page",
            Spinner { label: "Completing sign-in..." }
        }
    }
}
