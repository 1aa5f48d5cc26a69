use dioxus::prelude::*;
use ui::views::UserManagementView;

#[component]
pub fn Users() -> Element {
    rsx! {
        UserManagementView {}
    }
}
