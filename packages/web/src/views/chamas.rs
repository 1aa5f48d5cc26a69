//! Chama pages: the member's list, discovery, creation and the detail page.

use dioxus::prelude::*;
use ui::views::{ChamaDetailView, ChamaDiscoveryView, ChamaListView, CreateChamaView};

use crate::Route;

#[component]
pub fn MyChamas() -> Element {
    let nav = use_navigator();

    rsx! {
        ChamaListView {
            on_open_chama: move |id: String| {
                nav.push(Route::ChamaDetail { id });
            },
            on_browse: move |_| {
                nav.push(Route::DiscoverChamas {});
            },
            on_create: move |_| {
                nav.push(Route::CreateChama {});
            },
        }
    }
}

#[component]
pub fn DiscoverChamas() -> Element {
    let nav = use_navigator();

    rsx! {
        ChamaDiscoveryView {
            on_open_chama: move |id: String| {
                nav.push(Route::ChamaDetail { id });
            },
            on_create: move |_| {
                nav.push(Route::CreateChama {});
            },
        }
    }
}

#[component]
pub fn CreateChama() -> Element {
    let nav = use_navigator();

    rsx! {
        CreateChamaView {
            on_created: move |id: String| {
                nav.replace(Route::ChamaDetail { id });
            },
            on_cancel: move |_| {
                nav.push(Route::MyChamas {});
            },
        }
    }
}

#[component]
pub fn ChamaDetail(id: String) -> Element {
    let nav = use_navigator();

    rsx! {
        ChamaDetailView {
            chama_id: id,
            on_back: move |_| {
                nav.push(Route::MyChamas {});
            },
        }
    }
}
