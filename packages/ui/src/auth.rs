//! Authentication context and hooks for the UI.
//!
//! [`AuthProvider`] owns the one [`SessionController`] of the app and mirrors its
//! state into a signal. Views read the signal through [`use_auth`] and go through the
//! controller (via [`use_session`]) for anything that changes it.

use std::rc::Rc;

use api::{AppServices, AuthState, RetryPolicy, SessionController};
use dioxus::prelude::*;
use store::ClientConfig;

/// Get the current authentication state.
/// Returns a signal that updates whenever the session controller publishes.
pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

pub fn use_session() -> Rc<SessionController> {
    use_context::<Rc<SessionController>>()
}

/// The domain services bound to the current session.
pub fn use_services() -> AppServices {
    use_context::<AppServices>()
}

#[cfg(feature = "demo")]
fn build_session(config: ClientConfig) -> SessionController {
    use api::models::Principal;
    use api::{MemoryBackend, MemoryIdentity};

    let me = Principal::from_text("wanjiku-demo-cai").unwrap_or_else(|_| Principal::anonymous());
    let identity = Rc::new(MemoryIdentity::new(me.clone(), config.identity.callback_path.clone()));
    let backend = MemoryBackend::new().with_demo_data(&me);
    tracing::info!("Running against the in-memory demo backend");
    let services = AppServices::new(Rc::new(backend), identity.clone());
    SessionController::new(identity, services, RetryPolicy::from(&config.retry))
}

#[cfg(not(feature = "demo"))]
fn build_session(config: ClientConfig) -> SessionController {
    use api::{CanisterConnector, DelegationIdentity};

    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    let sessions = store::BrowserSessionStore::new();
    #[cfg(not(all(target_arch = "wasm32", feature = "web")))]
    let sessions = store::MemorySessionStore::new();

    let retry = RetryPolicy::from(&config.retry);
    let identity = Rc::new(DelegationIdentity::new(sessions, config.identity.clone()));
    let services = AppServices::new(Rc::new(CanisterConnector::new(config)), identity.clone());
    SessionController::new(identity, services, retry)
}

/// Provider component that manages authentication state.
/// Wrap your app with this component to enable authentication.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let auth_state = use_signal(AuthState::pending);

    let session = use_hook(|| {
        let controller = Rc::new(build_session(ClientConfig::from_build_env()));
        controller.subscribe(move |state| {
            let mut auth_state = auth_state;
            auth_state.set(state.clone());
        });
        controller
    });

    use_context_provider(|| auth_state);
    use_context_provider(|| session.services().clone());
    let session = use_context_provider(|| session);

    // Restore a stored session on mount
    let _ = use_resource(move || {
        let session = Rc::clone(&session);
        async move { session.initialize().await }
    });

    rsx! {
        {children}
    }
}

/// The page origin, used as the identity provider's return address.
fn origin() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
            return origin;
        }
    }
    String::new()
}

pub(crate) fn redirect(url: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(url) {
                tracing::error!("Failed to redirect to {}: {:?}", url, e);
            }
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    tracing::warn!("No browser to redirect to {}", url);
}

/// Button that sends the user to the identity provider.
#[component]
pub fn LoginButton(
    #[props(default = "Login with Internet Identity".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let session = use_session();
    let mut loading = use_signal(|| false);

    let onclick = move |_| {
        loading.set(true);
        let url = session.login_url(&origin());
        tracing::info!("Redirecting to identity provider");
        redirect(&url);
    };

    rsx! {
        button {
            class: "{class}",
            disabled: loading(),
            onclick: onclick,
            if loading() {
                "Connecting..."
            } else {
                "{label}"
            }
        }
    }
}

/// Button to log out the current user.
#[component]
pub fn LogoutButton(
    #[props(default = "Logout".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let session = use_session();

    let onclick = move |_| {
        let session = Rc::clone(&session);
        async move {
            session.logout().await;
            redirect("/login");
        }
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}
