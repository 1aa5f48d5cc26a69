use dioxus::prelude::*;

#[component]
pub fn Spinner(#[props(default)] label: String) -> Element {
    rsx! {
        div {
            class: "spinner-wrap",
            div { class: "spinner" }
            if !label.is_empty() {
                p { class: "view-muted", "{label}" }
            }
        }
    }
}
