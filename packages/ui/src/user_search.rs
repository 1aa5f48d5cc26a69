use api::models::{User, VerificationLevel};
use api::time::format_date;
use dioxus::prelude::*;

use crate::components::{Badge, Input, Label, Select, Spinner};
use crate::filters::UserQuery;
use crate::format::{credit_score, kes, plural, verification_class};
use crate::icons::{FaChevronRight, FaMagnifyingGlass, FaUsers};
use crate::{use_services, Icon};

/// Queries shorter than this only narrow the loaded list.
const MIN_REMOTE_QUERY: usize = 3;

const SCORE_OPTIONS: [(&str, &str); 4] = [
    ("80", "Excellent (80+)"),
    ("60", "Good (60+)"),
    ("40", "Fair (40+)"),
    ("20", "Poor (20+)"),
];

fn score_class(score: f64) -> &'static str {
    if score >= 80.0 {
        "text-success"
    } else if score >= 60.0 {
        "text-warning"
    } else {
        "text-danger"
    }
}

/// Where the loaded list comes from. Short queries keep the previous source.
#[derive(Clone, PartialEq)]
enum Source {
    All,
    Search(String),
}

fn source_for(text: &str, current: &Source) -> Source {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Source::All
    } else if trimmed.chars().count() >= MIN_REMOTE_QUERY {
        Source::Search(trimmed.to_string())
    } else {
        current.clone()
    }
}

/// User directory with free-text search and advanced filters.
///
/// With `on_select` set, rows become clickable (used to pick a new chama member).
#[component]
pub fn UserSearch(
    on_select: Option<EventHandler<User>>,
    #[props(default = true)] show_filters: bool,
    #[props(default = 20)] max_results: usize,
) -> Element {
    let services = use_services();
    let mut query = use_signal(|| UserQuery {
        max_results: Some(max_results),
        ..UserQuery::default()
    });
    let mut source = use_signal(|| Source::All);
    let mut show_advanced = use_signal(|| false);

    let users = use_resource(move || {
        let services = services.clone();
        let source = source();
        async move {
            match source {
                Source::All => services.users.get_all_users(None).await,
                Source::Search(text) => services.users.search_users(&text).await,
            }
        }
    });

    let current = query();
    let loaded = users.read().clone();
    let shown = loaded
        .as_ref()
        .map(|all| current.apply(all))
        .unwrap_or_default();
    let total = loaded.as_ref().map(Vec::len).unwrap_or(0);
    let filter = current.filter.clone();

    let verified_value = match filter.is_verified {
        None => "",
        Some(true) => "true",
        Some(false) => "false",
    };
    let level_value = filter.verification_level.map(|l| l.key()).unwrap_or("");
    let score_value = filter
        .min_credit_score
        .map(|s| format!("{s:.0}"))
        .unwrap_or_default();

    rsx! {
        div {
            class: "user-search",

            div {
                class: "card",
                div {
                    class: "card-header",
                    h3 { class: "view-section-title", "Find Users" }
                    span { class: "view-muted", "{shown.len()} of {total} users" }
                }

                div {
                    class: "search-box",
                    Icon { icon: FaMagnifyingGlass, width: 14, height: 14 }
                    Input {
                        r#type: "text",
                        placeholder: "Search by name or email...",
                        value: current.text.clone(),
                        oninput: move |evt: FormEvent| {
                            let text = evt.value();
                            let next = source_for(&text, &source.peek());
                            if next != *source.peek() {
                                source.set(next);
                            }
                            query.write().text = text;
                        },
                    }
                }

                if show_filters {
                    button {
                        class: "link-button",
                        onclick: move |_| show_advanced.toggle(),
                        if show_advanced() { "Hide Advanced Filters" } else { "Advanced Filters" }
                    }
                    if show_advanced() {
                        div {
                            class: "filter-grid",
                            div {
                                Label { html_for: "verified-filter", "Verification Status" }
                                Select {
                                    id: "verified-filter",
                                    value: verified_value.to_string(),
                                    options: vec![
                                        (String::new(), "All Users".to_string()),
                                        ("true".to_string(), "Verified Only".to_string()),
                                        ("false".to_string(), "Unverified Only".to_string()),
                                    ],
                                    onchange: move |key: String| {
                                        query.write().filter.is_verified = match key.as_str() {
                                            "true" => Some(true),
                                            "false" => Some(false),
                                            _ => None,
                                        };
                                    },
                                }
                            }
                            div {
                                Label { html_for: "level-filter", "Verification Level" }
                                Select {
                                    id: "level-filter",
                                    value: level_value.to_string(),
                                    options: std::iter::once((String::new(), "All Levels".to_string()))
                                        .chain(VerificationLevel::ALL.iter().map(|l| (l.key().to_string(), l.label().to_string())))
                                        .collect::<Vec<_>>(),
                                    onchange: move |key: String| {
                                        query.write().filter.verification_level = VerificationLevel::from_key(&key);
                                    },
                                }
                            }
                            div {
                                Label { html_for: "score-filter", "Minimum Credit Score" }
                                Select {
                                    id: "score-filter",
                                    value: score_value,
                                    options: std::iter::once((String::new(), "Any Score".to_string()))
                                        .chain(SCORE_OPTIONS.iter().map(|(k, l)| (k.to_string(), l.to_string())))
                                        .collect::<Vec<_>>(),
                                    onchange: move |key: String| {
                                        query.write().filter.min_credit_score = key.parse::<f64>().ok();
                                    },
                                }
                            }
                            div {
                                class: "filter-actions",
                                button {
                                    class: "link-button",
                                    disabled: !current.has_filters() && current.text.is_empty(),
                                    onclick: move |_| {
                                        query.write().clear();
                                        source.set(Source::All);
                                    },
                                    "Clear All Filters"
                                }
                            }
                        }
                    }
                }
            }

            div {
                class: "card",
                div { class: "card-header", h4 { "Search Results" } }
                if loaded.is_none() {
                    Spinner { label: "Loading users..." }
                } else if shown.is_empty() {
                    div {
                        class: "empty-state",
                        Icon { icon: FaUsers, width: 32, height: 32 }
                        h3 { "No users found" }
                        p { class: "view-muted", "Try adjusting your search terms or filters." }
                    }
                } else {
                    ul {
                        class: "user-rows",
                        for user in shown {
                            UserRow { key: "{user.id}", selectable: on_select.is_some(), on_select, user }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn UserRow(user: User, selectable: bool, on_select: Option<EventHandler<User>>) -> Element {
    let (badge_tone, badge_label) = if user.is_verified {
        (
            verification_class(user.verification_level),
            user.verification_level.label(),
        )
    } else {
        ("badge--warning", "Unverified")
    };
    let initial = user
        .name
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();
    let chamas = plural(user.chamas_joined.len(), "Chama", "Chamas");
    let picked = user.clone();

    rsx! {
        li {
            class: if selectable { "user-row user-row--selectable" } else { "user-row" },
            onclick: move |_| {
                if let Some(handler) = on_select {
                    handler.call(picked.clone());
                }
            },
            span { class: "avatar", "{initial}" }
            div {
                class: "user-info",
                div {
                    class: "user-heading",
                    span { class: "user-name", "{user.name}" }
                    Badge { tone: badge_tone.to_string(), "{badge_label}" }
                }
                p { class: "view-muted", "{user.email}" }
                div {
                    class: "view-muted user-meta",
                    span { "Phone: {user.phone}" }
                    span {
                        "Credit Score: "
                        strong { class: score_class(user.credit_score), "{credit_score(user.credit_score)}" }
                    }
                    span { "Last active: {format_date(user.updated_at)}" }
                    if user.total_withdrawals > 0 {
                        span { "{kes(user.total_withdrawals)} withdrawn" }
                    }
                }
            }
            div {
                class: "user-stats",
                div { "{chamas}" }
                div { class: "view-muted", "{kes(user.total_contributions)} contributed" }
                div { class: "view-muted", "Joined {format_date(user.created_at)}" }
            }
            if selectable {
                Icon { icon: FaChevronRight, width: 12, height: 12 }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_queries_keep_current_source() {
        let searching = Source::Search("wan".to_string());
        assert!(source_for("wa", &searching) == searching);
        assert!(source_for("ab", &Source::All) == Source::All);
    }

    #[test]
    fn test_long_queries_search_remotely() {
        assert!(source_for("  wanj ", &Source::All) == Source::Search("wanj".to_string()));
    }

    #[test]
    fn test_empty_query_reloads_everyone() {
        let searching = Source::Search("wanjiku".to_string());
        assert!(source_for("   ", &searching) == Source::All);
    }

    #[test]
    fn test_score_class_thresholds() {
        assert_eq!(score_class(85.0), "text-success");
        assert_eq!(score_class(60.0), "text-warning");
        assert_eq!(score_class(10.0), "text-danger");
    }
}
