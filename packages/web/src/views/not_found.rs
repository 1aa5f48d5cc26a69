use dioxus::prelude::*;

use crate::Route;

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");

    rsx! {
        div {
            class: "login-page",
            div {
                class: "login-card",
                h1 { "Page not found" }
                p { class: "login-tagline", "Nothing lives at /{path}." }
                Link { class: "button login-button", to: Route::Root {}, "Go home" }
            }
        }
    }
}
