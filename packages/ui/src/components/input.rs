use dioxus::prelude::*;

#[component]
pub fn Input(
    oninput: Option<EventHandler<FormEvent>>,
    onchange: Option<EventHandler<FormEvent>>,
    #[props(extends = GlobalAttributes)]
    #[props(extends = input)]
    attributes: Vec<Attribute>,
) -> Element {
    rsx! {
        input {
            class: "input",
            oninput: move |e| {
                if let Some(f) = &oninput {
                    f.call(e);
                }
            },
            onchange: move |e| {
                if let Some(f) = &onchange {
                    f.call(e);
                }
            },
            ..attributes,
        }
    }
}

/// A labelled checkbox. `onchange` receives the new checked state.
#[component]
pub fn Checkbox(id: String, checked: bool, onchange: EventHandler<bool>, children: Element) -> Element {
    rsx! {
        label {
            class: "checkbox",
            r#for: "{id}",
            input {
                id: "{id}",
                r#type: "checkbox",
                checked,
                onchange: move |e: FormEvent| onchange.call(e.checked()),
            }
            span { {children} }
        }
    }
}

/// A native select over `(value, label)` pairs.
#[component]
pub fn Select(
    #[props(default)] id: String,
    #[props(default)] class: String,
    value: String,
    options: Vec<(String, String)>,
    onchange: EventHandler<String>,
) -> Element {
    rsx! {
        select {
            id: "{id}",
            class: "input select {class}",
            value: "{value}",
            onchange: move |e: FormEvent| onchange.call(e.value()),
            for (key, label) in options {
                option {
                    key: "{key}",
                    value: "{key}",
                    selected: key == value,
                    "{label}"
                }
            }
        }
    }
}
