use dioxus::prelude::*;

use crate::icons::{FaCircleCheck, FaCircleExclamation, FaCircleInfo, FaXmark};
use crate::Icon;

#[derive(Copy, Clone, PartialEq, Default)]
pub enum AlertKind {
    #[default]
    Error,
    Success,
    Info,
}

/// Inline banner for service errors and confirmations.
///
/// `on_retry` adds a "Try again" button, `on_dismiss` a close button.
#[component]
pub fn Alert(
    #[props(default)] kind: AlertKind,
    message: String,
    on_retry: Option<EventHandler<()>>,
    on_dismiss: Option<EventHandler<()>>,
) -> Element {
    let (class, icon) = match kind {
        AlertKind::Error => (
            "alert alert--error",
            rsx! { Icon { icon: FaCircleExclamation, width: 14, height: 14 } },
        ),
        AlertKind::Success => (
            "alert alert--success",
            rsx! { Icon { icon: FaCircleCheck, width: 14, height: 14 } },
        ),
        AlertKind::Info => (
            "alert alert--info",
            rsx! { Icon { icon: FaCircleInfo, width: 14, height: 14 } },
        ),
    };
    rsx! {
        div {
            class,
            role: "alert",
            {icon}
            span { class: "alert-message", "{message}" }
            if let Some(retry) = on_retry {
                button {
                    class: "alert-action",
                    onclick: move |_| retry.call(()),
                    "Try again"
                }
            }
            if let Some(dismiss) = on_dismiss {
                button {
                    class: "alert-close",
                    title: "Dismiss",
                    onclick: move |_| dismiss.call(()),
                    Icon { icon: FaXmark, width: 12, height: 12 }
                }
            }
        }
    }
}
