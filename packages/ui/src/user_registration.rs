use api::models::User;
use dioxus::prelude::*;

use crate::components::{Alert, Button, ButtonVariant, Checkbox, FieldError, Input, Label};
use crate::forms::registration::{RegistrationField, RegistrationForm};
use crate::forms::{FieldErrors, InFlight};
use crate::icons::{FaLock, FaUser};
use crate::{use_session, Icon};

/// Profile completion form for a signed-in principal without a registry record.
#[component]
pub fn UserRegistration(
    on_complete: Option<EventHandler<User>>,
    on_cancel: Option<EventHandler<()>>,
) -> Element {
    let session = use_session();
    let mut form = use_signal(RegistrationForm::default);
    let mut errors = use_signal(FieldErrors::<RegistrationField>::default);
    let mut submit_error = use_signal(|| Option::<String>::None);
    let mut submitting = use_signal(InFlight::default);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let registration = match form().submission() {
            Ok(values) => values,
            Err(invalid) => {
                errors.set(invalid);
                return;
            }
        };
        let session = session.clone();
        if !submitting.write().try_begin() {
            return;
        }
        spawn(async move {
            submit_error.set(None);
            match session
                .register_user(&registration.name, &registration.email, &registration.phone)
                .await
            {
                Ok(user) => {
                    tracing::info!("Registered {}", user.id);
                    if let Some(handler) = on_complete {
                        handler.call(user);
                    }
                }
                Err(e) => {
                    tracing::error!("Registration failed: {}", e);
                    submit_error.set(Some(e.to_string()));
                }
            }
            submitting.write().finish();
        });
    };

    let current = form();

    rsx! {
        div {
            class: "registration",
            div {
                class: "registration-header",
                span { class: "avatar avatar--large", Icon { icon: FaUser, width: 20, height: 20 } }
                h2 { "Complete Your Profile" }
                p { class: "view-muted", "We need a few details to set up your account" }
            }

            form {
                class: "form-stack",
                onsubmit: handle_submit,

                div {
                    Label { html_for: "name", "Full Name *" }
                    Input {
                        id: "name",
                        r#type: "text",
                        autocomplete: "name",
                        placeholder: "Enter your full name",
                        value: current.name.clone(),
                        oninput: move |evt: FormEvent| {
                            form.write().name = evt.value();
                            errors.write().clear(RegistrationField::Name);
                        },
                    }
                    FieldError { message: errors().get(RegistrationField::Name).map(str::to_string) }
                }

                div {
                    Label { html_for: "email", "Email Address *" }
                    Input {
                        id: "email",
                        r#type: "email",
                        autocomplete: "email",
                        placeholder: "Enter your email address",
                        value: current.email.clone(),
                        oninput: move |evt: FormEvent| {
                            form.write().email = evt.value();
                            errors.write().clear(RegistrationField::Email);
                        },
                    }
                    FieldError { message: errors().get(RegistrationField::Email).map(str::to_string) }
                }

                div {
                    Label { html_for: "phone", "Phone Number *" }
                    Input {
                        id: "phone",
                        r#type: "tel",
                        autocomplete: "tel",
                        placeholder: "0712345678 or +254712345678",
                        value: current.phone.clone(),
                        oninput: move |evt: FormEvent| {
                            form.write().phone = evt.value();
                            errors.write().clear(RegistrationField::Phone);
                        },
                    }
                    FieldError { message: errors().get(RegistrationField::Phone).map(str::to_string) }
                    p { class: "view-muted", "We support Kenyan phone numbers (Safaricom, Airtel, Telkom)" }
                }

                div {
                    Checkbox {
                        id: "accept-terms",
                        checked: current.accept_terms,
                        onchange: move |checked: bool| {
                            form.write().accept_terms = checked;
                            errors.write().clear(RegistrationField::AcceptTerms);
                        },
                        "I agree to the Terms and Conditions and Privacy Policy"
                    }
                    FieldError { message: errors().get(RegistrationField::AcceptTerms).map(str::to_string) }
                }

                if let Some(message) = submit_error() {
                    Alert { message, on_dismiss: move |_| submit_error.set(None) }
                }

                div {
                    class: "form-actions",
                    Button {
                        variant: ButtonVariant::Primary,
                        r#type: "submit",
                        disabled: submitting().is_active(),
                        if submitting().is_active() { "Creating Account..." } else { "Create Account" }
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
                class: "notice notice--info",
                Icon { icon: FaLock, width: 12, height: 12 }
                p {
                    strong { "Your data is secure: " }
                    "Your profile is stored by the Chama canisters and tied to your Internet Identity. Your private keys never leave your device."
                }
            }
        }
    }
}
