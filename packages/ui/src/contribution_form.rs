use api::models::{Chama, Transaction};
use dioxus::prelude::*;

use crate::components::{Alert, Button, ButtonVariant, FieldError, Input, Label, Textarea};
use crate::format::kes;
use crate::forms::contribution::{
    parse_amount, whole_shillings, ContributionError, ContributionField, ContributionForm as Form, PaymentMethod,
    QUICK_MULTIPLIERS,
};
use crate::forms::{FieldErrors, InFlight};
use crate::use_services;

#[component]
pub fn ContributionForm(
    chama: Chama,
    on_recorded: EventHandler<Transaction>,
    on_cancel: Option<EventHandler<()>>,
) -> Element {
    let services = use_services();
    let base = chama.contribution_amount;
    let mut form = use_signal(|| Form::for_amount(base));
    let mut errors = use_signal(FieldErrors::<ContributionField>::default);
    let mut submit_error = use_signal(|| Option::<String>::None);
    let mut submitting = use_signal(InFlight::default);

    let chama_id = chama.id.clone();
    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if !submitting.write().try_begin() {
            return;
        }
        let services = services.clone();
        let chama_id = chama_id.clone();
        spawn(async move {
            submit_error.set(None);
            let snapshot = form();
            match snapshot.submit(&chama_id, &services.financial).await {
                Ok(tx) => {
                    errors.set(FieldErrors::default());
                    form.set(Form::for_amount(base));
                    on_recorded.call(tx);
                }
                Err(ContributionError::Invalid(invalid)) => errors.set(invalid),
                Err(e) => {
                    tracing::error!("Contribution failed: {}", e);
                    submit_error.set(Some(e.to_string()));
                }
            }
            submitting.write().finish();
        });
    };

    let current = form();
    let preview = parse_amount(&current.amount)
        .filter(|a| *a >= 0.0)
        .map(|a| kes(whole_shillings(a)))
        .unwrap_or_else(|| kes(0));

    rsx! {
        div {
            class: "card contribution-form",
            h3 { class: "view-section-title", "Make Contribution" }
            p { class: "view-muted", "Contribute to " strong { "{chama.name}" } }

            form {
                onsubmit: handle_submit,
                class: "form-stack",

                div {
                    Label { html_for: "amount", "Contribution Amount (KES) *" }
                    div {
                        class: "input-with-suffix",
                        Input {
                            id: "amount",
                            r#type: "number",
                            min: "1",
                            step: "1",
                            value: current.amount.clone(),
                            oninput: move |evt: FormEvent| {
                                form.write().amount = evt.value();
                                errors.write().clear(ContributionField::Amount);
                            },
                        }
                        span { class: "view-muted", "{preview}" }
                    }
                    FieldError { message: errors().get(ContributionField::Amount).map(str::to_string) }
                    div {
                        class: "quick-amounts",
                        for multiplier in QUICK_MULTIPLIERS {
                            button {
                                key: "{multiplier}",
                                r#type: "button",
                                class: "chip",
                                onclick: move |_| {
                                    form.write().apply_quick_amount(base, multiplier);
                                    errors.write().clear(ContributionField::Amount);
                                },
                                "{multiplier}x ({kes(base.saturating_mul(multiplier))})"
                            }
                        }
                    }
                }

                div {
                    Label { html_for: "payment-method", "Payment Method *" }
                    div {
                        class: "payment-methods",
                        for method in PaymentMethod::ALL {
                            label {
                                key: "{method.key()}",
                                class: if current.payment_method == method { "payment-method payment-method--selected" } else { "payment-method" },
                                input {
                                    r#type: "radio",
                                    name: "payment-method",
                                    value: method.key(),
                                    checked: current.payment_method == method,
                                    onchange: move |_| {
                                        form.write().payment_method = method;
                                        errors.write().clear(ContributionField::Reference);
                                    },
                                }
                                span { "{method.label()}" }
                            }
                        }
                    }
                }

                if current.payment_method.needs_reference() {
                    div {
                        Label { html_for: "reference", "Transaction Reference *" }
                        Input {
                            id: "reference",
                            r#type: "text",
                            placeholder: "e.g., QGH7XJ8K9L (from SMS confirmation)",
                            value: current.reference.clone(),
                            oninput: move |evt: FormEvent| {
                                form.write().reference = evt.value();
                                errors.write().clear(ContributionField::Reference);
                            },
                        }
                        FieldError { message: errors().get(ContributionField::Reference).map(str::to_string) }
                        p { class: "view-muted", "Enter the confirmation code from your {current.payment_method.label()} message" }
                    }
                }

                div {
                    Label { html_for: "description", "Description *" }
                    Textarea {
                        id: "description",
                        rows: "3",
                        placeholder: "e.g., Monthly contribution for December 2024",
                        value: current.description.clone(),
                        oninput: move |evt: FormEvent| {
                            form.write().description = evt.value();
                            errors.write().clear(ContributionField::Description);
                        },
                    }
                    FieldError { message: errors().get(ContributionField::Description).map(str::to_string) }
                }

                if let Some(err) = submit_error() {
                    Alert { message: err, on_dismiss: move |_| submit_error.set(None) }
                }

                div {
                    class: "form-actions",
                    Button {
                        variant: ButtonVariant::Primary,
                        r#type: "submit",
                        disabled: submitting().is_active(),
                        if submitting().is_active() { "Recording Contribution..." } else { "Record Contribution" }
                    }
                    if let Some(cancel) = on_cancel {
                        Button {
                            variant: ButtonVariant::Outline,
                            r#type: "button",
                            onclick: move |_| cancel.call(()),
                            "Cancel"
                        }
                    }
                }
            }

            div {
                class: "notice",
                h4 { "Important Notes" }
                ul {
                    li { "Ensure you have completed the actual payment before recording here" }
                    li { "Keep your transaction reference for verification purposes" }
                    li { "Contributions are recorded immediately and cannot be easily reversed" }
                }
            }
        }
    }
}
