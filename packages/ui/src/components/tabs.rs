use dioxus::prelude::*;

#[derive(Clone, PartialEq)]
pub struct TabItem {
    pub key: &'static str,
    pub label: String,
}

impl TabItem {
    pub fn new(key: &'static str, label: impl Into<String>) -> Self {
        Self {
            key,
            label: label.into(),
        }
    }
}

#[component]
pub fn TabBar(tabs: Vec<TabItem>, active: String, on_select: EventHandler<&'static str>) -> Element {
    rsx! {
        nav {
            class: "tabs",
            for tab in tabs {
                button {
                    key: "{tab.key}",
                    class: if tab.key == active { "tab tab--active" } else { "tab" },
                    onclick: move |_| on_select.call(tab.key),
                    "{tab.label}"
                }
            }
        }
    }
}
