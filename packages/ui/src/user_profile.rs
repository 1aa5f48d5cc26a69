use std::time::Duration;

use api::models::{Principal, User, UserStats, VerificationLevel};
use api::time::{format_date, sleep};
use dioxus::prelude::*;

use crate::balance_display::Stat;
use crate::components::{Alert, AlertKind, Badge, Button, ButtonVariant, FieldError, Input, Label, Spinner};
use crate::format::{credit_score, kes, plural, verification_class};
use crate::forms::registration::{RegistrationField, RegistrationForm};
use crate::forms::{FieldErrors, InFlight};
use crate::icons::{FaPen, FaShieldHalved, FaTriangleExclamation};
use crate::{use_auth, use_services, use_session, Icon};

fn score_label(score: f64) -> &'static str {
    if score >= 80.0 {
        "Excellent"
    } else if score >= 60.0 {
        "Good"
    } else if score >= 40.0 {
        "Fair"
    } else {
        "Poor"
    }
}

/// The signed-in member's profile, or another member's when `user_id` is given.
///
/// Only the own profile can be edited or verified.
#[component]
pub fn UserProfile(
    #[props(default)] user_id: Option<Principal>,
    #[props(default = true)] show_stats: bool,
    on_update: Option<EventHandler<User>>,
) -> Element {
    let auth = use_auth();
    let services = use_services();
    let session = use_session();
    let own = user_id.is_none();

    let lookup = services.clone();
    let other = use_resource(use_reactive((&user_id,), move |(user_id,)| {
        let services = lookup.clone();
        async move {
            match user_id {
                Some(id) => services.users.get_user_by_id(&id).await,
                None => None,
            }
        }
    }));
    let stats = use_resource(move || {
        let services = services.clone();
        async move {
            if own && show_stats {
                services.users.get_user_stats().await
            } else {
                None
            }
        }
    });

    let mut editing = use_signal(|| false);
    let mut form = use_signal(RegistrationForm::default);
    let mut errors = use_signal(FieldErrors::<RegistrationField>::default);
    let mut saving = use_signal(InFlight::default);
    let mut verifying = use_signal(|| false);
    let mut notice = use_signal(|| Option::<(AlertKind, String)>::None);

    // Banners clear themselves after a few seconds.
    let flash = use_callback(move |(kind, message): (AlertKind, String)| {
        notice.set(Some((kind, message)));
        spawn(async move {
            sleep(Duration::from_secs(3)).await;
            notice.set(None);
        });
    });

    let user = if own {
        auth.read().user.clone()
    } else {
        other.read().clone().flatten()
    };

    if (own && auth.read().loading) || (!own && other.read().is_none()) {
        return rsx! {
            div { class: "card", Spinner { label: "Loading profile..." } }
        };
    }
    let Some(user) = user else {
        return rsx! {
            div { class: "card", p { class: "view-muted", "No user profile found." } }
        };
    };

    let save_session = session.clone();
    let handle_save = move |evt: FormEvent| {
        evt.prevent_default();
        let submission = match form().submission() {
            Ok(values) => values,
            Err(invalid) => {
                errors.set(invalid);
                return;
            }
        };
        let session = save_session.clone();
        if !saving.write().try_begin() {
            return;
        }
        spawn(async move {
            match session
                .update_profile(&submission.name, &submission.email, &submission.phone)
                .await
            {
                Ok(updated) => {
                    editing.set(false);
                    flash.call((AlertKind::Success, "Profile updated successfully!".to_string()));
                    if let Some(handler) = on_update {
                        handler.call(updated);
                    }
                }
                Err(e) => {
                    tracing::error!("Profile update failed: {}", e);
                    flash.call((AlertKind::Error, e.to_string()));
                }
            }
            saving.write().finish();
        });
    };

    let verify = {
        let session = session.clone();
        move |level: VerificationLevel| {
            let session = session.clone();
            spawn(async move {
                verifying.set(true);
                match session.verify_user(level).await {
                    Ok(updated) => {
                        flash.call((
                            AlertKind::Success,
                            format!("Account verified at {} level!", level.label()),
                        ));
                        if let Some(handler) = on_update {
                            handler.call(updated);
                        }
                    }
                    Err(e) => {
                        tracing::error!("Verification failed: {}", e);
                        flash.call((AlertKind::Error, format!("Verification failed: {e}")));
                    }
                }
                verifying.set(false);
            });
        }
    };
    // Unverified members start at Basic; verified ones can request the next tier.
    let next_level = if user.is_verified {
        user.verification_level.next()
    } else {
        Some(VerificationLevel::Basic)
    };

    let initial = user
        .name
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();
    let (badge_tone, badge_label) = if user.is_verified {
        (verification_class(user.verification_level), format!("{} Verified", user.verification_level.label()))
    } else {
        ("badge--warning", "Unverified".to_string())
    };
    let joined = plural(user.chamas_joined.len(), "chama", "chamas");
    let created = plural(user.chamas_created.len(), "chama", "chamas");
    let edit_user = user.clone();
    let current = form();

    rsx! {
        div {
            class: "user-profile",

            div {
                class: "card",
                div {
                    class: "profile-header",
                    span { class: "avatar avatar--large", "{initial}" }
                    div {
                        h3 { class: "profile-name", "{user.name}" }
                        div {
                            class: "profile-badges",
                            Badge { tone: badge_tone.to_string(), "{badge_label}" }
                            Badge {
                                tone: "badge--info",
                                "Credit Score: {credit_score(user.credit_score)} ({score_label(user.credit_score)})"
                            }
                        }
                    }
                    if own && !editing() {
                        Button {
                            variant: ButtonVariant::Outline,
                            onclick: move |_| {
                                form.set(RegistrationForm::from_user(&edit_user));
                                errors.set(FieldErrors::default());
                                editing.set(true);
                            },
                            Icon { icon: FaPen, width: 12, height: 12 }
                            " Edit Profile"
                        }
                    }
                }

                if let Some((kind, message)) = notice() {
                    Alert { kind, message, on_dismiss: move |_| notice.set(None) }
                }

                if own && editing() {
                    form {
                        class: "form-stack",
                        onsubmit: handle_save,
                        div {
                            Label { html_for: "profile-name", "Full Name" }
                            Input {
                                id: "profile-name",
                                r#type: "text",
                                value: current.name.clone(),
                                oninput: move |evt: FormEvent| {
                                    form.write().name = evt.value();
                                    errors.write().clear(RegistrationField::Name);
                                },
                            }
                            FieldError { message: errors().get(RegistrationField::Name).map(str::to_string) }
                        }
                        div {
                            Label { html_for: "profile-email", "Email Address" }
                            Input {
                                id: "profile-email",
                                r#type: "email",
                                value: current.email.clone(),
                                oninput: move |evt: FormEvent| {
                                    form.write().email = evt.value();
                                    errors.write().clear(RegistrationField::Email);
                                },
                            }
                            FieldError { message: errors().get(RegistrationField::Email).map(str::to_string) }
                        }
                        div {
                            Label { html_for: "profile-phone", "Phone Number" }
                            Input {
                                id: "profile-phone",
                                r#type: "tel",
                                value: current.phone.clone(),
                                oninput: move |evt: FormEvent| {
                                    form.write().phone = evt.value();
                                    errors.write().clear(RegistrationField::Phone);
                                },
                            }
                            FieldError { message: errors().get(RegistrationField::Phone).map(str::to_string) }
                        }
                        div {
                            class: "form-actions",
                            Button {
                                variant: ButtonVariant::Primary,
                                r#type: "submit",
                                disabled: saving().is_active(),
                                if saving().is_active() { "Saving..." } else { "Save Changes" }
                            }
                            Button {
                                variant: ButtonVariant::Outline,
                                r#type: "button",
                                onclick: move |_| {
                                    editing.set(false);
                                    errors.set(FieldErrors::default());
                                },
                                "Cancel"
                            }
                        }
                    }
                } else {
                    dl {
                        class: "detail-grid",
                        dt { "Email Address" }
                        dd { "{user.email}" }
                        dt { "Phone Number" }
                        dd { "{user.phone}" }
                        dt { "Member Since" }
                        dd { "{format_date(user.created_at)}" }
                        dt { "Total Contributions" }
                        dd { "{kes(user.total_contributions)}" }
                        dt { "Chamas Joined" }
                        dd { "{joined}" }
                        dt { "Chamas Created" }
                        dd { "{created}" }
                    }
                }
            }

            if own {
                if let Some(level) = next_level {
                    div {
                        class: "notice notice--warning",
                        div {
                            class: "notice-title",
                            if user.is_verified {
                                Icon { icon: FaShieldHalved, width: 14, height: 14 }
                                " Upgrade Your Verification"
                            } else {
                                Icon { icon: FaTriangleExclamation, width: 14, height: 14 }
                                " Verify Your Account"
                            }
                        }
                        p {
                            "Increase your trust score by verifying your identity. Higher verification levels give you access to more features and better loan terms."
                        }
                        Button {
                            variant: ButtonVariant::Primary,
                            disabled: verifying(),
                            onclick: move |_| verify(level),
                            if verifying() { "Verifying..." } else { "{level.label()} Verification" }
                        }
                    }
                }
            }

            if own && show_stats {
                if let Some(Some(stats)) = stats.read().clone() {
                    StatsCard { stats }
                }
            }
        }
    }
}

#[component]
fn StatsCard(stats: UserStats) -> Element {
    rsx! {
        div {
            class: "card",
            h3 { class: "view-section-title", "Your Statistics" }
            div {
                class: "stat-grid",
                Stat { label: "Total Savings", value: kes(stats.total_savings) }
                Stat { label: "Average Contribution", value: kes(stats.average_contribution) }
                Stat { label: "Contribution Streak", value: plural(stats.contribution_streak as usize, "period", "periods") }
                Stat { label: "Risk Score", value: format!("{:.0}%", stats.risk_score) }
                Stat { label: "Reliability Score", value: format!("{:.0}%", stats.reliability_score) }
                Stat { label: "Last Activity", value: format_date(stats.last_activity) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_labels() {
        assert_eq!(score_label(92.0), "Excellent");
        assert_eq!(score_label(60.0), "Good");
        assert_eq!(score_label(45.5), "Fair");
        assert_eq!(score_label(3.0), "Poor");
    }
}
