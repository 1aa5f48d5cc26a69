//! Member balance, cycle progress and treasury overview for one chama.

use api::models::{Balance, Chama, Principal, TransactionStats};
use api::time::format_date;
use dioxus::prelude::*;

use crate::balance::{cycle_progress, remaining_in_cycle};
use crate::components::Spinner;
use crate::format::{kes, kes_signed};
use crate::use_services;

#[derive(Debug, Clone, Default, PartialEq)]
struct BalanceData {
    balance: Balance,
    treasury: u64,
    stats: TransactionStats,
}

/// Shows the signed-in member's balance, or `user_id`'s when given.
///
/// `refresh` is bumped by the parent after a contribution to reload the figures.
#[component]
pub fn BalanceDisplay(
    chama: Chama,
    #[props(default)] user_id: Option<Principal>,
    #[props(default = true)] show_details: bool,
    #[props(default)] refresh: u32,
) -> Element {
    let services = use_services();
    let chama_id = chama.id.clone();

    let data = use_resource(use_reactive((&chama_id, &user_id, &refresh), move |(chama_id, user_id, refresh)| {
        let services = services.clone();
        async move {
            tracing::debug!("Loading balance for {} (refresh {})", chama_id, refresh);
            let balance = match &user_id {
                Some(user) => services.financial.get_user_balance(&chama_id, user).await,
                None => services.financial.get_my_balance(&chama_id).await,
            };
            let treasury = services.financial.get_chama_treasury_balance(&chama_id).await;
            let stats = services.financial.get_chama_transaction_stats(&chama_id).await;
            BalanceData {
                balance,
                treasury,
                stats,
            }
        }
    }));

    let Some(data) = data.read().clone() else {
        return rsx! {
            div { class: "card balance-card", Spinner { label: "Loading balance..." } }
        };
    };

    let own = user_id.is_none();
    let progress = cycle_progress(data.balance.contributions, chama.contribution_amount);
    let remaining = remaining_in_cycle(data.balance.contributions, chama.contribution_amount);
    // Reads degrade to zero; fall back to the figure carried on the chama record.
    let treasury = if data.treasury == 0 {
        chama.treasury.total_funds
    } else {
        data.treasury
    };

    rsx! {
        div {
            class: "balance-display",

            div {
                class: "card balance-card balance-card--primary",
                h3 { class: "card-label", if own { "Your Balance" } else { "Member Balance" } }
                div { class: "balance-amount", "{kes_signed(data.balance.net())}" }
                div {
                    class: "balance-split",
                    span { "Contributed {kes(data.balance.contributions)}" }
                    span { "Withdrawn {kes(data.balance.withdrawals)}" }
                }
                if own {
                    div { class: "view-muted", "{progress.cycles} cycles completed" }
                    div {
                        class: "progress",
                        div {
                            class: "progress-label",
                            span { "Current Cycle Progress" }
                            span { "{progress.percent}%" }
                        }
                        div {
                            class: "progress-track",
                            div { class: "progress-fill", style: "width: {progress.percent}%" }
                        }
                        div {
                            class: "view-muted",
                            "{kes(remaining)} to the next target of {kes(chama.contribution_amount.saturating_mul(progress.cycles + 1))}"
                        }
                    }
                }
            }

            div {
                class: "card",
                h3 { class: "card-label", "Treasury" }
                div { class: "balance-amount", "{kes(treasury)}" }
                div {
                    class: "stat-grid",
                    Stat { label: "Members", value: "{chama.members.len()}" }
                    Stat { label: "Contribution", value: kes(chama.contribution_amount) }
                    Stat { label: "Frequency", value: chama.contribution_frequency.label().to_string() }
                    Stat { label: "Available", value: kes(chama.treasury.available_funds) }
                }
                if show_details {
                    div {
                        class: "stat-grid",
                        Stat { label: "Total funds", value: kes(chama.treasury.total_funds) }
                        Stat { label: "Reserve", value: kes(chama.treasury.reserve_funds) }
                        Stat { label: "On loan", value: kes(chama.treasury.loans_funds) }
                    }
                }
            }

            if show_details {
                div {
                    class: "card",
                    h3 { class: "card-label", "Activity" }
                    div {
                        class: "stat-grid",
                        Stat { label: "Transactions", value: "{data.stats.total_transactions}" }
                        Stat { label: "Contributions", value: kes(data.stats.total_contributions) }
                        Stat { label: "Withdrawals", value: kes(data.stats.total_withdrawals) }
                        Stat { label: "Loans", value: kes(data.stats.total_loans) }
                        Stat { label: "Average", value: kes(data.stats.average_transaction) }
                        Stat {
                            label: "Last transaction",
                            value: data
                                .stats
                                .last_transaction_time
                                .map(format_date)
                                .unwrap_or_else(|| "No transactions".to_string()),
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub(crate) fn Stat(label: String, value: String) -> Element {
    rsx! {
        div {
            class: "stat",
            div { class: "stat-label", "{label}" }
            div { class: "stat-value", "{value}" }
        }
    }
}
