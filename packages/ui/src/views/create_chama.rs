use api::models::{ChamaType, ContributionFrequency};
use dioxus::prelude::*;

use crate::components::{Alert, Button, ButtonVariant, Checkbox, FieldError, Input, Label, Select, Textarea};
use crate::format::kes;
use crate::forms::InFlight;
use crate::forms::create_chama::{ChamaField, ChamaWizard, WizardStep, FREQUENCIES};
use crate::icons::{FaCircleCheck, FaCircleInfo, FaLock};
use crate::{use_services, Icon};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

const CONTRIBUTION_GUIDELINES: [&str; 4] = [
    "Set a realistic amount all members can afford",
    "Consider seasonal income variations",
    "Start conservative - you can increase later",
    "Factor in late payment penalties",
];

/// Four-step chama creation wizard. `on_created` receives the new chama's id.
#[component]
pub fn CreateChamaView(on_created: EventHandler<String>, on_cancel: EventHandler<()>) -> Element {
    let services = use_services();
    let mut wizard = use_signal(ChamaWizard::default);
    let mut submitting = use_signal(InFlight::default);
    let mut submit_error = use_signal(|| Option::<String>::None);

    let handle_submit = move |_| {
        let request = match wizard().submission() {
            Ok(request) => request,
            Err((step, errors)) => {
                wizard.write().show_errors(step, errors);
                return;
            }
        };
        let services = services.clone();
        if !submitting.write().try_begin() {
            return;
        }
        spawn(async move {
            submit_error.set(None);
            match services.chamas.create_chama(&request).await {
                Ok(chama) => {
                    tracing::info!("Created chama {}", chama.id);
                    on_created.call(chama.id);
                }
                Err(e) => {
                    tracing::error!("Chama creation failed: {}", e);
                    submit_error.set(Some(e.to_string()));
                }
            }
            submitting.write().finish();
        });
    };

    let current = wizard();
    let step = current.step();
    let errors = current.errors().clone();
    let draft = current.draft.clone();

    let body = match step {
        WizardStep::BasicInformation => rsx! {
            div {
                Label { html_for: "name", "Chama Name *" }
                Input {
                    id: "name",
                    r#type: "text",
                    placeholder: "e.g., Tech Savers Group",
                    value: draft.name.clone(),
                    oninput: move |evt: FormEvent| {
                        let mut w = wizard.write();
                        w.draft.name = evt.value();
                        w.clear_error(ChamaField::Name);
                    },
                }
                FieldError { message: errors.get(ChamaField::Name).map(str::to_string) }
            }
            div {
                Label { html_for: "description", "Description *" }
                Textarea {
                    id: "description",
                    rows: "4",
                    placeholder: "Describe the purpose and goals of your chama...",
                    value: draft.description.clone(),
                    oninput: move |evt: FormEvent| {
                        let mut w = wizard.write();
                        w.draft.description = evt.value();
                        w.clear_error(ChamaField::Description);
                    },
                }
                FieldError { message: errors.get(ChamaField::Description).map(str::to_string) }
            }
            div {
                Label { html_for: "chama-type", "Chama Type *" }
                div {
                    class: "choice-list",
                    for ty in ChamaType::ALL.iter().copied() {
                        label {
                            key: "{ty.key()}",
                            class: if ty == draft.chama_type { "choice choice--selected" } else { "choice" },
                            input {
                                r#type: "radio",
                                name: "chama-type",
                                checked: ty == draft.chama_type,
                                onchange: move |_| wizard.write().draft.chama_type = ty,
                            }
                            div {
                                strong { "{ty.label()}" }
                                p { class: "view-muted", "{ty.blurb()}" }
                            }
                        }
                    }
                }
            }
        },
        WizardStep::FinancialSettings => rsx! {
            div {
                Label { html_for: "contribution-amount", "Contribution Amount (KES) *" }
                Input {
                    id: "contribution-amount",
                    r#type: "number",
                    min: "100",
                    placeholder: "5000",
                    value: draft.contribution_amount.clone(),
                    oninput: move |evt: FormEvent| {
                        let mut w = wizard.write();
                        w.draft.contribution_amount = evt.value();
                        w.clear_error(ChamaField::ContributionAmount);
                    },
                }
                FieldError { message: errors.get(ChamaField::ContributionAmount).map(str::to_string) }
            }
            div {
                Label { html_for: "contribution-frequency", "Contribution Frequency *" }
                Select {
                    id: "contribution-frequency",
                    value: draft.contribution_frequency.key().to_string(),
                    options: FREQUENCIES
                        .iter()
                        .map(|f| (f.key().to_string(), f.label().to_string()))
                        .collect::<Vec<_>>(),
                    onchange: move |key: String| {
                        if let Some(frequency) = ContributionFrequency::from_key(&key) {
                            wizard.write().draft.contribution_frequency = frequency;
                        }
                    },
                }
            }
            div {
                Label { html_for: "max-members", "Maximum Members *" }
                Input {
                    id: "max-members",
                    r#type: "number",
                    min: "3",
                    max: "100",
                    placeholder: "20",
                    value: draft.max_members.clone(),
                    oninput: move |evt: FormEvent| {
                        let mut w = wizard.write();
                        w.draft.max_members = evt.value();
                        w.clear_error(ChamaField::MaxMembers);
                    },
                }
                FieldError { message: errors.get(ChamaField::MaxMembers).map(str::to_string) }
                p { class: "view-muted", "You can change this later, but it affects group dynamics and management." }
            }
            div {
                class: "notice notice--info",
                div {
                    class: "notice-title",
                    Icon { icon: FaCircleInfo, width: 14, height: 14 }
                    " Contribution Guidelines"
                }
                ul {
                    for line in CONTRIBUTION_GUIDELINES {
                        li { key: "{line}", "{line}" }
                    }
                }
            }
        },
        WizardStep::GroupSettings => rsx! {
            div {
                Checkbox {
                    id: "is-public",
                    checked: draft.is_public,
                    onchange: move |checked: bool| wizard.write().draft.is_public = checked,
                    strong { "Public Group" }
                    p { class: "view-muted", "Allow anyone to discover and request to join this chama" }
                }
            }
            div {
                Checkbox {
                    id: "require-approval",
                    checked: draft.require_approval,
                    onchange: move |checked: bool| wizard.write().draft.require_approval = checked,
                    strong { "Require Approval for New Members" }
                    p { class: "view-muted", "New members must be approved by admins before joining" }
                }
            }
            div {
                Checkbox {
                    id: "enable-ai",
                    checked: draft.enable_ai,
                    onchange: move |checked: bool| wizard.write().draft.enable_ai = checked,
                    strong { "Enable AI Recommendations" }
                    p { class: "view-muted", "Get AI-powered insights and financial recommendations" }
                }
            }
            div {
                class: "notice notice--warning",
                div {
                    class: "notice-title",
                    Icon { icon: FaLock, width: 14, height: 14 }
                    " Privacy & Security"
                }
                p {
                    "All chama data is stored by the backend canisters. Even public groups keep financial details private. Only members can see contributions and balances."
                }
            }
        },
        WizardStep::Review => {
            let amount = draft
                .contribution_amount
                .trim()
                .parse::<f64>()
                .map(|a| kes(a.round() as u64))
                .unwrap_or_else(|_| draft.contribution_amount.clone());
            let yes_no = |on: bool| if on { "Yes" } else { "No" };
            rsx! {
                h3 { class: "view-section-title", "Review Your Chama" }
                dl {
                    class: "detail-grid",
                    dt { "Name" }
                    dd { "{draft.name.trim()}" }
                    dt { "Type" }
                    dd { "{draft.chama_type.label()}" }
                    dt { "Contribution" }
                    dd { "{amount} {draft.contribution_frequency.label()}" }
                    dt { "Maximum Members" }
                    dd { "{draft.max_members.trim()}" }
                    dt { "Description" }
                    dd { "{draft.description.trim()}" }
                }
                h4 { "Settings" }
                dl {
                    class: "detail-grid",
                    dt { "Public Group" }
                    dd { "{yes_no(draft.is_public)}" }
                    dt { "Requires Approval" }
                    dd { "{yes_no(draft.require_approval)}" }
                    dt { "AI Recommendations" }
                    dd { "{yes_no(draft.enable_ai)}" }
                }
            }
        }
    };

    rsx! {
        document::Stylesheet { href: VIEWS_CSS }

        div {
            class: "view view--narrow",

            div {
                class: "view-header view-header--center",
                div {
                    h1 { class: "view-title", "Create Your Chama" }
                    p { class: "view-muted", "Set up a new savings group in a few simple steps" }
                }
            }

            nav {
                class: "wizard-steps",
                aria_label: "Progress",
                for s in WizardStep::ALL {
                    button {
                        key: "{s.number()}",
                        class: if s == step {
                            "wizard-step wizard-step--current"
                        } else if s < step {
                            "wizard-step wizard-step--done"
                        } else {
                            "wizard-step"
                        },
                        onclick: move |_| {
                            wizard.write().jump_to(s);
                        },
                        span {
                            class: "wizard-step-number",
                            if s < step {
                                Icon { icon: FaCircleCheck, width: 12, height: 12 }
                            } else {
                                "{s.number()}"
                            }
                        }
                        span { class: "wizard-step-title", "{s.title()}" }
                    }
                }
            }

            div {
                class: "card form-stack",
                {body}

                if let Some(message) = submit_error() {
                    Alert { message, on_dismiss: move |_| submit_error.set(None) }
                }
            }

            div {
                class: "wizard-actions",
                div {
                    if step != WizardStep::BasicInformation {
                        Button {
                            variant: ButtonVariant::Outline,
                            onclick: move |_| {
                                wizard.write().prev();
                            },
                            "Previous"
                        }
                    }
                    Button {
                        variant: ButtonVariant::Ghost,
                        onclick: move |_| on_cancel.call(()),
                        "Cancel"
                    }
                }
                if current.is_last_step() {
                    Button {
                        variant: ButtonVariant::Primary,
                        disabled: submitting().is_active(),
                        onclick: handle_submit,
                        if submitting().is_active() { "Creating Chama..." } else { "Create Chama" }
                    }
                } else {
                    Button {
                        variant: ButtonVariant::Primary,
                        onclick: move |_| {
                            wizard.write().next();
                        },
                        "Next"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::forms::create_chama::ChamaWizard;

    #[tokio::test]
    async fn test_wizard_submission_creates_matching_chama() {
        let (_backend, services) = crate::fixtures::signed_in("aaaaa-aa");
        let mut wizard = ChamaWizard::default();
        wizard.draft.name = "  Tech Savers Group ".into();
        wizard.draft.description = "Developers saving towards a shared office".into();
        wizard.draft.contribution_amount = "2500".into();
        wizard.draft.max_members = "12".into();
        wizard.draft.enable_ai = false;

        let request = wizard.submission().unwrap();
        let chama = services.chamas.create_chama(&request).await.unwrap();

        assert_eq!(chama.name, "Tech Savers Group");
        assert_eq!(chama.contribution_amount, 2_500);
        assert_eq!(chama.max_members, 12);
        assert!(!chama.settings.enable_ai_recommendations);
        assert_eq!(services.chamas.get_chama_by_id(&chama.id).await, Some(chama));
    }
}
