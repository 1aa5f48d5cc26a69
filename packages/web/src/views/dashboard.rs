use dioxus::prelude::*;
use ui::views::DashboardView;

use crate::Route;

#[component]
pub fn Dashboard() -> Element {
    let nav = use_navigator();

    rsx! {
        DashboardView {
            on_open_chama: move |id: String| {
                nav.push(Route::ChamaDetail { id });
            },
            on_browse: move |_| {
                nav.push(Route::DiscoverChamas {});
            },
            on_create: move |_| {
                nav.push(Route::CreateChama {});
            },
            on_transactions: move |_| {
                nav.push(Route::Transactions {});
            },
        }
    }
}
