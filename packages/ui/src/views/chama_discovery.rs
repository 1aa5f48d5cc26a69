use api::models::{Chama, ChamaStatus, ChamaType};
use dioxus::prelude::*;

use crate::components::{Alert, AlertKind, Badge, Button, ButtonVariant, Input, Label, Select, Spinner};
use crate::filters::{bracket_from_key, bracket_key, ChamaQuery, CONTRIBUTION_BRACKETS};
use crate::icons::{FaMagnifyingGlass, FaPeopleGroup};
use crate::{use_auth, use_services, ChamaCard, Icon};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

/// Statuses offered by the status filter.
const DISCOVERABLE_STATUSES: [ChamaStatus; 2] = [ChamaStatus::Forming, ChamaStatus::Active];
const MEMBER_MINIMUMS: [u64; 3] = [5, 10, 20];

fn with_any(any: &str, options: impl Iterator<Item = (String, String)>) -> Vec<(String, String)> {
    std::iter::once((String::new(), any.to_string()))
        .chain(options)
        .collect()
}

/// Public chamas the member can browse and join.
#[component]
pub fn ChamaDiscoveryView(on_open_chama: EventHandler<String>, on_create: EventHandler<()>) -> Element {
    let auth = use_auth();
    let services = use_services();
    let mut query = use_signal(ChamaQuery::default);
    let mut reload = use_signal(|| 0u32);
    let mut joining = use_signal(|| Option::<String>::None);
    let mut notice = use_signal(|| Option::<(AlertKind, String)>::None);

    let loader = services.clone();
    let chamas = use_resource(move || {
        let services = loader.clone();
        let _ = reload();
        async move { services.chamas.get_public_chamas(None).await }
    });

    let join = use_callback(move |chama: Chama| {
        if joining.peek().is_some() {
            return;
        }
        let services = services.clone();
        spawn(async move {
            joining.set(Some(chama.id.clone()));
            notice.set(None);
            match services.chamas.join_chama(&chama.id).await {
                Ok(joined) => {
                    tracing::info!("Joined chama {}", joined.id);
                    notice.set(Some((AlertKind::Success, format!("You joined {}!", joined.name))));
                    reload += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to join chama {}: {}", chama.id, e);
                    notice.set(Some((AlertKind::Error, format!("Failed to join chama: {e}"))));
                }
            }
            joining.set(None);
        });
    });

    let me = auth().principal;
    let current = query();
    let filter = current.filter.clone();
    let loaded = chamas.read().clone();

    let type_options = with_any(
        "All Types",
        ChamaType::ALL.iter().map(|t| (t.key().to_string(), t.label().to_string())),
    );
    let status_options = with_any(
        "All Status",
        DISCOVERABLE_STATUSES
            .iter()
            .map(|s| (s.key().to_string(), s.label().to_string())),
    );
    let member_options = with_any(
        "Any Size",
        MEMBER_MINIMUMS
            .iter()
            .map(|n| (n.to_string(), format!("{n}+ Members"))),
    );
    let bracket_options = with_any(
        "Any Amount",
        CONTRIBUTION_BRACKETS
            .iter()
            .map(|(key, label, _)| (key.to_string(), label.to_string())),
    );
    let search_chip = format!("Search: \"{}\"", current.text.trim());

    rsx! {
        document::Stylesheet { href: VIEWS_CSS }

        div {
            class: "view",

            div {
                class: "card",
                div {
                    class: "view-header",
                    div {
                        h1 { class: "view-title", "Discover Chamas" }
                        p { class: "view-muted", "Find and join public savings groups that match your interests" }
                    }
                    Button {
                        variant: ButtonVariant::Primary,
                        onclick: move |_| on_create.call(()),
                        "Create New Chama"
                    }
                }

                div {
                    class: "search-box",
                    Icon { icon: FaMagnifyingGlass, width: 14, height: 14 }
                    Input {
                        r#type: "text",
                        placeholder: "Search chamas by name or description...",
                        value: current.text.clone(),
                        oninput: move |evt: FormEvent| query.write().text = evt.value(),
                    }
                }

                div {
                    class: "filter-grid",
                    div {
                        Label { html_for: "type-filter", "Type" }
                        Select {
                            id: "type-filter",
                            value: filter.chama_type.map(|t| t.key()).unwrap_or("").to_string(),
                            options: type_options,
                            onchange: move |key: String| query.write().filter.chama_type = ChamaType::from_key(&key),
                        }
                    }
                    div {
                        Label { html_for: "status-filter", "Status" }
                        Select {
                            id: "status-filter",
                            value: filter.status.map(|s| s.key()).unwrap_or("").to_string(),
                            options: status_options,
                            onchange: move |key: String| query.write().filter.status = ChamaStatus::from_key(&key),
                        }
                    }
                    div {
                        Label { html_for: "members-filter", "Members" }
                        Select {
                            id: "members-filter",
                            value: filter.min_members.map(|n| n.to_string()).unwrap_or_default(),
                            options: member_options,
                            onchange: move |key: String| query.write().filter.min_members = key.parse().ok(),
                        }
                    }
                    div {
                        Label { html_for: "contribution-filter", "Contribution" }
                        Select {
                            id: "contribution-filter",
                            value: bracket_key(filter.contribution_range).to_string(),
                            options: bracket_options,
                            onchange: move |key: String| query.write().filter.contribution_range = bracket_from_key(&key),
                        }
                    }
                }

                if !current.is_empty() {
                    div {
                        class: "chip-row",
                        span { class: "view-muted", "Active filters:" }
                        if !current.text.trim().is_empty() {
                            Badge { tone: "badge--info", "{search_chip}" }
                        }
                        if let Some(ty) = filter.chama_type {
                            Badge { tone: "badge--info", "Type: {ty.label()}" }
                        }
                        if let Some(status) = filter.status {
                            Badge { tone: "badge--info", "Status: {status.label()}" }
                        }
                        button {
                            class: "link-button",
                            onclick: move |_| query.write().clear(),
                            "Clear all"
                        }
                    }
                }
            }

            if let Some((kind, message)) = notice() {
                Alert { kind, message, on_dismiss: move |_| notice.set(None) }
            }

            {match loaded {
                None => rsx! { Spinner { label: "Discovering available chamas..." } },
                Some(Err(_)) => rsx! {
                    Alert {
                        message: "Failed to load available chamas. Please try again.",
                        on_retry: move |_| reload += 1,
                    }
                },
                Some(Ok(all)) => {
                    let shown = current.apply(&all);
                    rsx! {
                        p { class: "view-muted", "Showing {shown.len()} of {all.len()} available chamas" }
                        if shown.is_empty() {
                            div {
                                class: "empty-state",
                                Icon { icon: FaPeopleGroup, width: 32, height: 32 }
                                h3 { "No chamas found" }
                                p {
                                    class: "view-muted",
                                    if current.is_empty() {
                                        "No public chamas are available at the moment."
                                    } else {
                                        "Try adjusting your search criteria or filters."
                                    }
                                }
                                div {
                                    class: "form-actions",
                                    if !current.is_empty() {
                                        Button {
                                            variant: ButtonVariant::Outline,
                                            onclick: move |_| query.write().clear(),
                                            "Clear Filters"
                                        }
                                    }
                                    Button {
                                        variant: ButtonVariant::Primary,
                                        onclick: move |_| on_create.call(()),
                                        "Create New Chama"
                                    }
                                }
                            }
                        } else {
                            div {
                                class: "card-grid",
                                for chama in shown {
                                    ChamaCard {
                                        key: "{chama.id}",
                                        joining: joining().as_deref() == Some(chama.id.as_str()),
                                        current_user: me.clone(),
                                        on_view: move |c: Chama| on_open_chama.call(c.id),
                                        on_join: join,
                                        chama,
                                    }
                                }
                            }
                        }
                    }
                }
            }}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{principal, signed_in, signed_in_on};
    use api::models::{ChamaFilter, ContributionFrequency, NewChama};

    #[test]
    fn test_filter_options_start_with_any() {
        let options = with_any("Any Size", MEMBER_MINIMUMS.iter().map(|n| (n.to_string(), n.to_string())));
        assert_eq!(options.len(), 4);
        assert_eq!(options[0], (String::new(), "Any Size".to_string()));
    }

    #[tokio::test]
    async fn test_join_from_discovery() {
        let (backend, owner) = signed_in("aaaaa-aa");
        let visitor = signed_in_on(&backend, "bbbbb-bb");
        assert!(visitor.chamas.get_public_chamas(None).await.unwrap().is_empty());

        let created = owner
            .chamas
            .create_chama(&NewChama {
                name: "Jirani Welfare".into(),
                description: "Neighbours supporting each other".into(),
                contribution_amount: 1_000,
                contribution_frequency: ContributionFrequency::Weekly,
                chama_type: ChamaType::Welfare,
                max_members: 10,
                is_public: true,
                require_approval: false,
                enable_ai: false,
            })
            .await
            .unwrap();

        let query = ChamaQuery {
            text: "jirani".into(),
            filter: ChamaFilter {
                chama_type: Some(ChamaType::Welfare),
                ..ChamaFilter::default()
            },
        };
        let public = visitor.chamas.get_public_chamas(None).await.unwrap();
        assert_eq!(query.apply(&public).len(), 1);

        let joined = visitor.chamas.join_chama(&created.id).await.unwrap();
        assert!(joined.is_member(&principal("bbbbb-bb")));

        let again = visitor.chamas.join_chama(&created.id).await.unwrap_err();
        assert_eq!(again.to_string(), "Chama already exists");
    }
}
