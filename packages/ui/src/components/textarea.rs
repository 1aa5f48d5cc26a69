use dioxus::prelude::*;

#[derive(Copy, Clone, PartialEq, Default)]
pub enum TextareaVariant {
    #[default]
    Default,
    Outline,
}

impl TextareaVariant {
    pub fn class(&self) -> &'static str {
        match self {
            TextareaVariant::Default => "default",
            TextareaVariant::Outline => "outline",
        }
    }
}

#[component]
pub fn Textarea(
    #[props(default)] variant: TextareaVariant,
    oninput: Option<EventHandler<FormEvent>>,
    #[props(extends = GlobalAttributes)]
    #[props(extends = textarea)]
    attributes: Vec<Attribute>,
) -> Element {
    rsx! {
        textarea {
            class: "textarea",
            "data-style": variant.class(),
            oninput: move |e| {
                if let Some(f) = &oninput {
                    f.call(e);
                }
            },
            ..attributes,
        }
    }
}
