//! This crate contains all shared UI for the workspace.
//!
//! Form rules, filters and formatting are plain Rust in [`forms`], [`filters`],
//! [`format`] and [`balance`]; the components only wire signals to them.

use dioxus::prelude::*;

pub mod components;

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

pub const UI_CSS: Asset = asset!("/assets/ui.css");

pub mod balance;
pub mod filters;
pub mod format;
pub mod forms;

mod auth;
pub use auth::{use_auth, use_services, use_session, AuthProvider, LoginButton, LogoutButton};
pub use api::AuthState;

mod navbar;
pub use navbar::Navbar;

mod balance_display;
pub use balance_display::BalanceDisplay;

mod chama_card;
pub use chama_card::ChamaCard;

mod contribution_form;
pub use contribution_form::ContributionForm;

mod transaction_list;
pub use transaction_list::TransactionList;

mod member_management;
pub use member_management::MemberManagement;

mod user_search;
pub use user_search::UserSearch;

mod user_profile;
pub use user_profile::UserProfile;

mod user_registration;
pub use user_registration::UserRegistration;

mod chat_bot;
pub use chat_bot::ChatBot;

pub mod views;

#[cfg(test)]
mod fixtures;
