use dioxus::prelude::*;

use ui::AuthProvider;
use views::{
    AppLayout, AuthCallback, ChamaDetail, CreateChama, Dashboard, DiscoverChamas, Login, MyChamas,
    NotFound, Register, Transactions, Users,
};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Root {},
    #[route("/login")]
    Login {},
    #[route("/auth/callback?:..query")]
    AuthCallback { query: String },
    #[route("/register")]
    Register {},
    #[layout(AppLayout)]
        #[route("/dashboard")]
        Dashboard {},
        #[route("/users")]
        Users {},
        #[route("/chamas")]
        MyChamas {},
        #[route("/chamas/discover")]
        DiscoverChamas {},
        #[route("/chamas/create")]
        CreateChama {},
        #[route("/chamas/:id")]
        ChamaDetail { id: String },
        #[route("/transactions")]
        Transactions {},
    #[end_layout]
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

const FAVICON: Asset = asset!("/assets/favicon.svg");
const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::logger::initialize_default();
    tracing::info!("Starting AI Chama Manager");
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        // Global app resources
        document::Link { rel: "icon", href: FAVICON }
        document::Link { rel: "stylesheet", href: ui::UI_CSS }
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        ErrorBoundary {
            handle_error: |_: ErrorContext| rsx! {
                div {
                    class: "login-page",
                    div {
                        class: "login-card",
                        h1 { "Something went wrong" }
                        p { class: "login-tagline", "Reload the page to try again." }
                    }
                }
            },
            AuthProvider {
                Router::<Route> {}
            }
        }
    }
}

/// Send `/` to the dashboard once the session is known, or to the login page.
#[component]
fn Root() -> Element {
    let auth = ui::use_auth();
    let nav = use_navigator();
    let state = auth();
    if state.loading {
        return rsx! {
            ui::components::Spinner { label: "Loading..." }
        };
    }
    if state.is_authenticated {
        nav.replace(Route::Dashboard {});
    } else {
        nav.replace(Route::Login {});
    }
    rsx! {}
}
