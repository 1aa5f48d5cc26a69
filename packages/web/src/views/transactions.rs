use dioxus::prelude::*;
use ui::views::TransactionsView;

#[component]
pub fn Transactions() -> Element {
    rsx! {
        TransactionsView {}
    }
}
