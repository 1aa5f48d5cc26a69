use dioxus::prelude::*;

/// A small pill. `tone` is one of the `badge--*` modifiers from [`crate::format`].
#[component]
pub fn Badge(#[props(default)] tone: String, children: Element) -> Element {
    rsx! {
        span { class: "badge {tone}", {children} }
    }
}
