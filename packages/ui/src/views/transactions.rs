use dioxus::prelude::*;

use crate::TransactionList;

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

/// Every ledger entry of the signed-in member across their chamas.
#[component]
pub fn TransactionsView() -> Element {
    rsx! {
        document::Stylesheet { href: VIEWS_CSS }

        div {
            class: "view",
            div {
                class: "view-header",
                div {
                    h1 { class: "view-title", "Transactions" }
                    p { class: "view-muted", "Contributions, withdrawals and loans across all your chamas" }
                }
            }
            TransactionList { limit: 50, title: "My Transactions" }
        }
    }
}
