use api::models::{Principal, Transaction, TransactionStatus, TransactionType};
use api::time::format_date_time;
use dioxus::prelude::*;

use crate::components::{Badge, Button, ButtonVariant, Input, Select, Spinner};
use crate::filters::TransactionQuery;
use crate::format::{signed_amount, transaction_status_class};
use crate::icons::{FaArrowDown, FaArrowUp};
use crate::use_services;
use crate::Icon;

fn type_options() -> Vec<(String, String)> {
    std::iter::once((String::new(), "All Types".to_string()))
        .chain(
            TransactionType::ALL
                .iter()
                .map(|t| (t.key().to_string(), t.label().to_string())),
        )
        .collect()
}

fn status_options() -> Vec<(String, String)> {
    std::iter::once((String::new(), "All Status".to_string()))
        .chain(
            TransactionStatus::ALL
                .iter()
                .map(|s| (s.key().to_string(), s.label().to_string())),
        )
        .collect()
}

/// Ledger rows for a chama, a member, or (with neither) the signed-in user.
#[component]
pub fn TransactionList(
    #[props(default)] chama_id: Option<String>,
    #[props(default)] user_id: Option<Principal>,
    #[props(default = 20)] limit: u64,
    #[props(default = true)] show_filters: bool,
    #[props(default = "Recent Transactions".to_string())] title: String,
    #[props(default)] refresh: u32,
) -> Element {
    let services = use_services();
    let mut page_limit = use_signal(|| limit);
    let mut query = use_signal(TransactionQuery::default);
    let mut expanded = use_signal(|| Option::<String>::None);

    let mut transactions = use_resource(use_reactive((&chama_id, &user_id, &refresh), move |(chama_id, user_id, refresh)| {
        let services = services.clone();
        async move {
            let limit = Some(page_limit());
            tracing::debug!("Loading transactions (refresh {})", refresh);
            match (&chama_id, &user_id) {
                (Some(chama), _) => {
                    services
                        .financial
                        .get_transactions_by_chama(chama, limit)
                        .await
                }
                (None, Some(user)) => {
                    services
                        .financial
                        .get_transactions_by_user(user, limit)
                        .await
                }
                (None, None) => services.financial.get_my_transactions(limit).await,
            }
        }
    }));

    let Some(all) = transactions.read().clone() else {
        return rsx! {
            div { class: "card", Spinner { label: "Loading transactions..." } }
        };
    };
    let current = query();
    let shown = current.apply(&all);
    let has_more = all.len() as u64 >= page_limit();

    rsx! {
        div {
            class: "card transaction-list",
            div {
                class: "card-header",
                h3 { class: "view-section-title", "{title}" }
                span { class: "view-muted", "{shown.len()} of {all.len()} transactions" }
            }

            if show_filters {
                div {
                    class: "filter-row",
                    Input {
                        r#type: "text",
                        placeholder: "Search transactions...",
                        value: current.text.clone(),
                        oninput: move |evt: FormEvent| query.write().text = evt.value(),
                    }
                    Select {
                        value: current.transaction_type.map(|t| t.key().to_string()).unwrap_or_default(),
                        options: type_options(),
                        onchange: move |key: String| query.write().transaction_type = TransactionType::from_key(&key),
                    }
                    Select {
                        value: current.status.map(|s| s.key().to_string()).unwrap_or_default(),
                        options: status_options(),
                        onchange: move |key: String| query.write().status = TransactionStatus::from_key(&key),
                    }
                }
            }

            if shown.is_empty() {
                div {
                    class: "empty-state",
                    p {
                        if all.is_empty() {
                            "No transactions have been recorded yet."
                        } else {
                            "No transactions match your current filters."
                        }
                    }
                }
            } else {
                ul {
                    class: "transaction-rows",
                    for tx in shown {
                        TransactionRow {
                            key: "{tx.id}",
                            open: expanded().as_deref() == Some(tx.id.as_str()),
                            on_toggle: move |id: String| {
                                let next = if expanded().as_deref() == Some(id.as_str()) { None } else { Some(id) };
                                expanded.set(next);
                            },
                            tx,
                        }
                    }
                }
            }

            if has_more {
                div {
                    class: "load-more",
                    Button {
                        variant: ButtonVariant::Ghost,
                        onclick: move |_| {
                            page_limit += limit;
                            transactions.restart();
                        },
                        "Load more transactions"
                    }
                }
            }
        }
    }
}

#[component]
fn TransactionRow(tx: Transaction, open: bool, on_toggle: EventHandler<String>) -> Element {
    let credit = tx.transaction_type.is_credit();
    let short_id: String = tx.id.chars().take(8).collect();
    let id = tx.id.clone();
    let reference = tx.metadata.as_ref().and_then(|m| m.reference.clone());
    let method = tx.metadata.as_ref().and_then(|m| m.payment_method.clone());

    rsx! {
        li {
            class: "transaction-row",
            div {
                class: if credit { "transaction-icon transaction-icon--credit" } else { "transaction-icon transaction-icon--debit" },
                if credit {
                    Icon { icon: FaArrowDown, width: 14, height: 14 }
                } else {
                    Icon { icon: FaArrowUp, width: 14, height: 14 }
                }
            }
            div {
                class: "transaction-main",
                div {
                    class: "transaction-heading",
                    span { class: "transaction-type", "{tx.transaction_type.label()}" }
                    Badge { tone: transaction_status_class(tx.status).to_string(), "{tx.status.label()}" }
                    span {
                        class: if credit { "amount amount--credit" } else { "amount amount--debit" },
                        "{signed_amount(tx.amount, tx.transaction_type)}"
                    }
                }
                p { class: "transaction-description", "{tx.description}" }
                div {
                    class: "view-muted transaction-meta",
                    span { "ID: {short_id}..." }
                    span { "{format_date_time(tx.timestamp)}" }
                    if let Some(reference) = reference {
                        span { "Ref: {reference}" }
                    }
                }
                if open {
                    dl {
                        class: "transaction-details",
                        dt { "Transaction ID" }
                        dd { "{tx.id}" }
                        dt { "Category" }
                        dd { "{tx.category.label()}" }
                        dt { "Chama" }
                        dd { "{tx.chama_id}" }
                        dt { "Member" }
                        dd { "{tx.user_id.short()}" }
                        if let Some(method) = method {
                            dt { "Payment method" }
                            dd { "{method}" }
                        }
                        if let Some(by) = &tx.processed_by {
                            dt { "Processed by" }
                            dd { "{by.short()}" }
                        }
                    }
                }
            }
            Button {
                variant: ButtonVariant::Ghost,
                onclick: move |_| on_toggle.call(id.clone()),
                if open { "Hide Details" } else { "View Details" }
            }
        }
    }
}
