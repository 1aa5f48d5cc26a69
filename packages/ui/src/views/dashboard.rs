use api::models::{Chama, Timestamp, Transaction, TransactionStatus, TransactionType};
use api::time::now_nanos;
use dioxus::prelude::*;

use crate::balance_display::Stat;
use crate::components::{Button, ButtonVariant, Spinner};
use crate::format::kes;
use crate::icons::{FaMagnifyingGlass, FaPeopleGroup, FaRobot, FaUserPlus};
use crate::{use_auth, use_services, ChamaCard, Icon, TransactionList, UserProfile};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

const MONTH_NANOS: i64 = 30 * 24 * 60 * 60 * 1_000_000_000;

/// Headline figures of the dashboard, derived from the member's chamas and ledger entries.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashboardStats {
    pub total_chamas: usize,
    /// Completed contributions minus completed withdrawals.
    pub total_savings: i64,
    pub total_transactions: usize,
    /// Completed contributions of the last 30 days.
    pub monthly_contributions: u64,
    pub pending_transactions: usize,
}

impl DashboardStats {
    pub fn compute(chamas: &[Chama], transactions: &[Transaction], now: Timestamp) -> Self {
        let mut stats = Self {
            total_chamas: chamas.len(),
            total_transactions: transactions.len(),
            ..Self::default()
        };
        for tx in transactions {
            if tx.status == TransactionStatus::Pending {
                stats.pending_transactions += 1;
            }
            if tx.status != TransactionStatus::Completed {
                continue;
            }
            let amount = i64::try_from(tx.amount).unwrap_or(i64::MAX);
            match tx.transaction_type {
                TransactionType::Contribution => {
                    stats.total_savings = stats.total_savings.saturating_add(amount);
                    if now.saturating_sub(tx.timestamp) <= MONTH_NANOS {
                        stats.monthly_contributions += tx.amount;
                    }
                }
                TransactionType::Withdrawal => {
                    stats.total_savings = stats.total_savings.saturating_sub(amount);
                }
                _ => {}
            }
        }
        stats
    }

    /// Savings tips for the recommendations card, most relevant first.
    pub fn recommendations(&self) -> Vec<&'static str> {
        let mut tips = Vec::new();
        if self.total_chamas == 0 {
            tips.push("Join or start a chama to begin saving with people you trust.");
        }
        if self.total_chamas > 0 && self.monthly_contributions == 0 {
            tips.push("You have not contributed in the last 30 days. A small regular amount keeps your streak alive.");
        }
        if self.pending_transactions > 0 {
            tips.push("Some of your transactions are still pending confirmation by the treasurer.");
        }
        if self.total_savings > 0 {
            tips.push("Increasing your monthly contribution by 15% would reach your goals about three months earlier.");
        }
        if tips.is_empty() {
            tips.push("Ask the assistant how other members structure their savings.");
        }
        tips
    }
}

/// Shared dashboard view.
///
/// Platform packages pass navigation callbacks for the quick actions.
#[component]
pub fn DashboardView(
    on_open_chama: EventHandler<String>,
    on_browse: EventHandler<()>,
    on_create: EventHandler<()>,
    on_transactions: EventHandler<()>,
) -> Element {
    let auth = use_auth();
    let services = use_services();

    let stats = use_resource(move || {
        let services = services.clone();
        async move {
            let chamas = services.chamas.get_my_chamas().await.unwrap_or_else(|e| {
                tracing::warn!("Dashboard could not load chamas: {}", e);
                Vec::new()
            });
            let transactions = services.financial.get_my_transactions(None).await;
            let stats = DashboardStats::compute(&chamas, &transactions, now_nanos());
            (stats, chamas)
        }
    });

    let state = auth();
    let name = state.user.as_ref().map(|u| u.name.clone()).unwrap_or_default();
    let verified = state.user.as_ref().is_some_and(|u| u.is_verified);
    let loaded = stats.read().clone();

    rsx! {
        document::Stylesheet { href: VIEWS_CSS }

        div {
            class: "view",

            div {
                class: "view-header",
                div {
                    h1 { class: "view-title", "Welcome back, {name}!" }
                    p { class: "view-muted", "Here's an overview of your chama activities" }
                }
                div {
                    class: "verification-status",
                    span { class: if verified { "status-dot status-dot--ok" } else { "status-dot status-dot--pending" } }
                    span { if verified { "Verified" } else { "Pending Verification" } }
                }
            }

            if let Some((stats, chamas)) = loaded {
                div {
                    class: "stat-grid stat-grid--wide",
                    Stat { label: "Total Chamas", value: "{stats.total_chamas}" }
                    Stat { label: "Total Savings", value: kes(stats.total_savings.max(0) as u64) }
                    Stat { label: "Transactions", value: "{stats.total_transactions}" }
                    Stat { label: "Contributed This Month", value: kes(stats.monthly_contributions) }
                }

                div {
                    class: "view-columns",

                    div {
                        class: "view-main",
                        div {
                            class: "card",
                            h3 { class: "view-section-title", "Quick Actions" }
                            div {
                                class: "quick-actions",
                                Button {
                                    variant: ButtonVariant::Primary,
                                    onclick: move |_| on_create.call(()),
                                    Icon { icon: FaUserPlus, width: 14, height: 14 }
                                    " Create Chama"
                                }
                                Button {
                                    variant: ButtonVariant::Outline,
                                    onclick: move |_| on_browse.call(()),
                                    Icon { icon: FaMagnifyingGlass, width: 14, height: 14 }
                                    " Browse Chamas"
                                }
                                Button {
                                    variant: ButtonVariant::Outline,
                                    onclick: move |_| on_transactions.call(()),
                                    "View Transactions"
                                }
                            }
                        }

                        if !chamas.is_empty() {
                            div {
                                class: "card",
                                h3 { class: "view-section-title",
                                    Icon { icon: FaPeopleGroup, width: 14, height: 14 }
                                    " Your Chamas"
                                }
                                div {
                                    class: "card-grid",
                                    for chama in chamas.into_iter().take(3) {
                                        ChamaCard {
                                            key: "{chama.id}",
                                            current_user: state.principal.clone(),
                                            on_view: move |c: Chama| on_open_chama.call(c.id),
                                            chama,
                                        }
                                    }
                                }
                            }
                        }

                        TransactionList { limit: 5, show_filters: false, title: "Recent Activity" }
                    }

                    div {
                        class: "view-aside",
                        UserProfile { show_stats: false }
                        div {
                            class: "card card--highlight",
                            h3 { class: "view-section-title",
                                Icon { icon: FaRobot, width: 14, height: 14 }
                                " AI-Powered Recommendations"
                            }
                            ul {
                                class: "tip-list",
                                for tip in stats.recommendations() {
                                    li { key: "{tip}", "{tip}" }
                                }
                            }
                        }
                    }
                }
            } else {
                Spinner { label: "Loading your overview..." }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{chama, transaction};

    const NOW: i64 = 100 * MONTH_NANOS;

    fn at(mut tx: Transaction, timestamp: Timestamp, status: TransactionStatus) -> Transaction {
        tx.timestamp = timestamp;
        tx.status = status;
        tx
    }

    #[test]
    fn test_savings_net_out_withdrawals() {
        let txs = vec![
            at(transaction("t1", 5_000, TransactionType::Contribution, "Jan"), 0, TransactionStatus::Completed),
            at(transaction("t2", 5_000, TransactionType::Contribution, "Feb"), 0, TransactionStatus::Completed),
            at(transaction("t3", 2_000, TransactionType::Withdrawal, "School fees"), 0, TransactionStatus::Completed),
            at(transaction("t4", 9_000, TransactionType::Withdrawal, "Rejected"), 0, TransactionStatus::Failed),
        ];
        let stats = DashboardStats::compute(&[chama("c1", "Umoja", 5_000)], &txs, NOW);

        assert_eq!(stats.total_chamas, 1);
        assert_eq!(stats.total_transactions, 4);
        assert_eq!(stats.total_savings, 8_000);
    }

    #[test]
    fn test_monthly_window_and_pending() {
        let txs = vec![
            at(transaction("t1", 1_000, TransactionType::Contribution, "Recent"), NOW - MONTH_NANOS / 2, TransactionStatus::Completed),
            at(transaction("t2", 3_000, TransactionType::Contribution, "Old"), NOW - 2 * MONTH_NANOS, TransactionStatus::Completed),
            at(transaction("t3", 4_000, TransactionType::Contribution, "Waiting"), NOW, TransactionStatus::Pending),
        ];
        let stats = DashboardStats::compute(&[], &txs, NOW);

        assert_eq!(stats.monthly_contributions, 1_000);
        assert_eq!(stats.pending_transactions, 1);
        assert_eq!(stats.total_savings, 4_000);
    }

    #[test]
    fn test_recommendations() {
        let newcomer = DashboardStats::default();
        assert_eq!(newcomer.recommendations().len(), 1);
        assert!(newcomer.recommendations()[0].starts_with("Join or start"));

        let lapsed = DashboardStats {
            total_chamas: 2,
            total_savings: 10_000,
            ..DashboardStats::default()
        };
        let tips = lapsed.recommendations();
        assert_eq!(tips.len(), 2);
        assert!(tips[0].contains("last 30 days"));
    }
}
