use api::models::{Chama, Principal};
use dioxus::prelude::*;

use crate::components::{Alert, Button, ButtonVariant, Spinner, TabBar, TabItem};
use crate::icons::FaPeopleGroup;
use crate::{use_auth, use_services, ChamaCard, Icon};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChamaTab {
    #[default]
    All,
    Created,
    Member,
}

impl ChamaTab {
    pub const ALL: [ChamaTab; 3] = [Self::All, Self::Created, Self::Member];

    pub fn key(self) -> &'static str {
        match self {
            Self::All => "my-chamas",
            Self::Created => "created",
            Self::Member => "member",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All My Chamas",
            Self::Created => "Created by Me",
            Self::Member => "Member Of",
        }
    }

    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.key() == key)
            .unwrap_or_default()
    }

    fn empty_message(self) -> (&'static str, &'static str) {
        match self {
            Self::All => (
                "No chamas yet",
                "Get started by joining an existing chama or creating your own.",
            ),
            Self::Created => (
                "No chamas created",
                "Create your first chama to start building your savings group.",
            ),
            Self::Member => (
                "Not a member of any chamas",
                "Join a chama to start saving with others.",
            ),
        }
    }
}

/// The member's chamas, split the way the tabs show them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChamaLists {
    pub mine: Vec<Chama>,
    pub created: Vec<Chama>,
}

impl ChamaLists {
    /// `created` comes from the creator index when the backend was asked for it.
    /// Otherwise it is derived from `mine`.
    pub fn new(mine: Vec<Chama>, created: Option<Vec<Chama>>, me: &Principal) -> Self {
        let created = created.unwrap_or_else(|| {
            mine.iter()
                .filter(|c| &c.creator == me)
                .cloned()
                .collect()
        });
        Self { mine, created }
    }

    pub fn for_tab(&self, tab: ChamaTab, me: &Principal) -> Vec<Chama> {
        match tab {
            ChamaTab::All => self.mine.clone(),
            ChamaTab::Created => self.created.clone(),
            ChamaTab::Member => self
                .mine
                .iter()
                .filter(|c| &c.creator != me)
                .cloned()
                .collect(),
        }
    }

    pub fn count(&self, tab: ChamaTab, me: &Principal) -> usize {
        match tab {
            ChamaTab::All => self.mine.len(),
            ChamaTab::Created => self.created.len(),
            ChamaTab::Member => self.mine.iter().filter(|c| &c.creator != me).count(),
        }
    }
}

/// The chamas the signed-in member created or belongs to.
#[component]
pub fn ChamaListView(
    on_open_chama: EventHandler<String>,
    on_browse: EventHandler<()>,
    on_create: EventHandler<()>,
) -> Element {
    let auth = use_auth();
    let services = use_services();
    let mut tab = use_signal(ChamaTab::default);
    let mut reload = use_signal(|| 0u32);

    let lists = use_resource(move || {
        let services = services.clone();
        let me = auth().principal;
        let tab = tab();
        let _ = reload();
        async move {
            let Some(me) = me else {
                return Ok(ChamaLists::default());
            };
            let mine = services.chamas.get_my_chamas().await?;
            let created = if tab == ChamaTab::Created {
                Some(services.chamas.get_chamas_by_creator(&me).await?)
            } else {
                None
            };
            Ok::<_, api::ServiceError>(ChamaLists::new(mine, created, &me))
        }
    });

    let me = auth().principal.unwrap_or_else(Principal::anonymous);
    let current = tab();
    let loaded = lists.read().clone();

    let content = match loaded {
        None => rsx! { Spinner { label: "Loading your chamas..." } },
        Some(Err(_)) => rsx! {
            Alert {
                message: "Failed to load your chamas. Please try again.",
                on_retry: move |_| reload += 1,
            }
        },
        Some(Ok(lists)) => {
            let tabs = ChamaTab::ALL
                .into_iter()
                .map(|t| TabItem::new(t.key(), format!("{} ({})", t.label(), lists.count(t, &me))))
                .collect::<Vec<_>>();
            let shown = lists.for_tab(current, &me);
            let (title, hint) = current.empty_message();
            rsx! {
                div {
                    class: "card",
                    TabBar {
                        tabs,
                        active: current.key().to_string(),
                        on_select: move |key: &'static str| tab.set(ChamaTab::from_key(key)),
                    }
                }
                if shown.is_empty() {
                    div {
                        class: "empty-state",
                        Icon { icon: FaPeopleGroup, width: 32, height: 32 }
                        h3 { "{title}" }
                        p { class: "view-muted", "{hint}" }
                        div {
                            class: "form-actions",
                            Button {
                                variant: ButtonVariant::Outline,
                                onclick: move |_| on_browse.call(()),
                                "Browse Chamas"
                            }
                            Button {
                                variant: ButtonVariant::Primary,
                                onclick: move |_| on_create.call(()),
                                "Create Chama"
                            }
                        }
                    }
                } else {
                    div {
                        class: "card-grid",
                        for chama in shown {
                            ChamaCard {
                                key: "{chama.id}",
                                current_user: Some(me.clone()),
                                on_view: move |c: Chama| on_open_chama.call(c.id),
                                chama,
                            }
                        }
                    }
                }
            }
        }
    };

    rsx! {
        document::Stylesheet { href: VIEWS_CSS }

        div {
            class: "view",
            div {
                class: "view-header",
                div {
                    h1 { class: "view-title", "My Chamas" }
                    p { class: "view-muted", "Manage your savings groups and track your progress" }
                }
                div {
                    class: "form-actions",
                    Button {
                        variant: ButtonVariant::Outline,
                        onclick: move |_| on_browse.call(()),
                        "Browse Chamas"
                    }
                    Button {
                        variant: ButtonVariant::Primary,
                        onclick: move |_| on_create.call(()),
                        "Create Chama"
                    }
                }
            }
            {content}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{chama, principal};

    fn sample() -> (Principal, Vec<Chama>) {
        let me = principal("aaaaa-aa");
        let mut joined = chama("c2", "Jirani Welfare", 1_000);
        joined.creator = principal("bbbbb-bb");
        (me, vec![chama("c1", "Umoja Savings", 5_000), joined])
    }

    #[test]
    fn test_tabs_split_created_and_member() {
        let (me, mine) = sample();
        let lists = ChamaLists::new(mine, None, &me);

        assert_eq!(lists.count(ChamaTab::All, &me), 2);
        assert_eq!(lists.count(ChamaTab::Created, &me), 1);
        assert_eq!(lists.count(ChamaTab::Member, &me), 1);
        assert_eq!(lists.for_tab(ChamaTab::Member, &me)[0].id, "c2");
        assert_eq!(lists.for_tab(ChamaTab::Created, &me)[0].id, "c1");
    }

    #[test]
    fn test_creator_index_wins_when_fetched() {
        let (me, mine) = sample();
        let lists = ChamaLists::new(mine, Some(Vec::new()), &me);
        assert_eq!(lists.count(ChamaTab::Created, &me), 0);
        assert_eq!(lists.count(ChamaTab::All, &me), 2);
    }

    #[test]
    fn test_tab_keys() {
        assert_eq!(ChamaTab::from_key("created"), ChamaTab::Created);
        assert_eq!(ChamaTab::from_key("bogus"), ChamaTab::All);
    }

    #[tokio::test]
    async fn test_lists_against_memory_backend() {
        let (_backend, services, id) = crate::fixtures::signed_in_with_chama().await;
        let me = principal("aaaaa-aa");
        let mine = services.chamas.get_my_chamas().await.unwrap();
        let created = services.chamas.get_chamas_by_creator(&me).await.unwrap();
        let lists = ChamaLists::new(mine, Some(created), &me);

        assert_eq!(lists.for_tab(ChamaTab::Created, &me)[0].id, id);
        assert!(lists.for_tab(ChamaTab::Member, &me).is_empty());
    }
}
