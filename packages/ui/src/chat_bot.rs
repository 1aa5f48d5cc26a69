//! Floating assistant widget backed by the chatbot canister.

use api::models::{ChatMessage, ChatResponse, Principal};
use api::time::{format_time, now_nanos};
use dioxus::prelude::*;

use crate::components::{Button, ButtonVariant};
use crate::icons::{FaComments, FaPaperPlane, FaRobot, FaUser, FaXmark};
use crate::{use_auth, use_services, Icon};

const WELCOME_MESSAGE: &str = "hello";
const WELCOME_CONTEXT: &str = "welcome";

/// Put every bullet on its own line and collapse the blank lines that leaves behind.
pub fn format_message(message: &str) -> String {
    message
        .replace('•', "\n•")
        .replace("\n\n", "\n")
        .trim()
        .to_string()
}

/// Messages shown in the widget plus the suggestions of the latest reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub messages: Vec<ChatMessage>,
    pub suggestions: Vec<String>,
    next_id: u64,
}

impl Transcript {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }

    /// Echo the user's message before the backend answers. Blank input is ignored.
    pub fn push_user(&mut self, user: &Principal, text: &str, context: Option<&str>) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        let id = self.next_id("user");
        self.messages.push(ChatMessage {
            id,
            user_id: user.clone(),
            message: text.to_string(),
            is_user_message: true,
            timestamp: now_nanos(),
            context: context.map(str::to_string),
        });
        true
    }

    pub fn push_reply(&mut self, user: &Principal, response: ChatResponse) {
        let id = self.next_id("ai");
        self.messages.push(ChatMessage {
            id,
            user_id: user.clone(),
            message: format_message(&response.message),
            is_user_message: false,
            timestamp: now_nanos(),
            context: None,
        });
        self.suggestions = response.suggestions;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[component]
pub fn ChatBot() -> Element {
    let auth = use_auth();
    let services = use_services();
    let mut open = use_signal(|| false);
    let mut session_id = use_signal(|| Option::<String>::None);
    let mut transcript = use_signal(Transcript::default);
    let mut loading = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);
    let mut draft = use_signal(String::new);

    let me = auth.read().principal.clone();
    let signed_in = auth.read().is_authenticated;

    let start = use_callback({
        let services = services.clone();
        move |_: ()| {
            let services = services.clone();
            let Some(me) = auth.peek().principal.clone() else {
                return;
            };
            spawn(async move {
                loading.set(true);
                error.set(None);
                transcript.write().clear();
                match services.chat.start_chat_session().await {
                    Ok(id) => {
                        session_id.set(Some(id.clone()));
                        match services
                            .chat
                            .send_message(&id, WELCOME_MESSAGE, Some(WELCOME_CONTEXT))
                            .await
                        {
                            Ok(reply) => transcript.write().push_reply(&me, reply),
                            Err(e) => tracing::warn!("Failed to send welcome message: {}", e),
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to initialize chat: {}", e);
                        error.set(Some("Failed to start chat session. Please try again.".to_string()));
                    }
                }
                loading.set(false);
            });
        }
    });

    let send = use_callback({
        let services = services.clone();
        move |text: String| {
            let (Some(id), Some(me)) = (session_id(), auth.peek().principal.clone()) else {
                return;
            };
            if loading() || !transcript.write().push_user(&me, &text, None) {
                return;
            }
            draft.set(String::new());
            let services = services.clone();
            spawn(async move {
                loading.set(true);
                error.set(None);
                match services.chat.send_message(&id, text.trim(), None).await {
                    Ok(reply) => transcript.write().push_reply(&me, reply),
                    Err(e) => {
                        tracing::error!("Failed to send message: {}", e);
                        error.set(Some("Failed to send message. Please try again.".to_string()));
                    }
                }
                loading.set(false);
            });
        }
    });

    let close = move |_| {
        let ended = session_id.peek().clone();
        session_id.set(None);
        if let Some(id) = ended {
            let services = services.clone();
            spawn(async move {
                if !services.chat.end_chat_session(&id).await {
                    tracing::warn!("Chat session {} was not closed cleanly", id);
                }
            });
        }
        transcript.write().clear();
        error.set(None);
        open.set(false);
    };

    if !open() {
        return rsx! {
            button {
                class: "chat-launcher",
                title: "Chama AI Assistant",
                onclick: move |_| {
                    open.set(true);
                    if signed_in && session_id.peek().is_none() {
                        start.call(());
                    }
                },
                Icon { icon: FaComments, width: 22, height: 22 }
            }
        };
    }

    let log = transcript();

    rsx! {
        div {
            class: "chat-panel",
            div {
                class: "chat-header",
                span { class: "avatar", Icon { icon: FaRobot, width: 14, height: 14 } }
                div {
                    h3 { "Chama AI Assistant" }
                    p { "Here to help with your chama" }
                }
                button {
                    class: "icon-button",
                    title: "Close",
                    onclick: close,
                    Icon { icon: FaXmark, width: 14, height: 14 }
                }
            }

            div {
                class: "chat-messages",
                if !signed_in || me.is_none() {
                    p { class: "empty-state view-muted", "Please log in to use the AI assistant." }
                } else if let Some(message) = error() {
                    div {
                        class: "empty-state",
                        p { class: "text-danger", "{message}" }
                        Button {
                            variant: ButtonVariant::Primary,
                            onclick: move |_| {
                                if session_id.peek().is_none() {
                                    start.call(());
                                } else {
                                    error.set(None);
                                }
                            },
                            "Try Again"
                        }
                    }
                } else {
                    for message in log.messages.iter().cloned() {
                        MessageBubble { key: "{message.id}", message }
                    }
                    if loading() {
                        div {
                            class: "chat-typing",
                            span {}
                            span {}
                            span {}
                        }
                    }
                }
            }

            if !log.suggestions.is_empty() {
                div {
                    class: "chat-suggestions",
                    p { class: "view-muted", "Suggested questions:" }
                    div {
                        class: "chip-row",
                        for suggestion in log.suggestions.iter().cloned() {
                            button {
                                key: "{suggestion}",
                                class: "chip",
                                disabled: loading(),
                                onclick: move |_| send.call(suggestion.clone()),
                                "{suggestion}"
                            }
                        }
                    }
                }
            }

            if signed_in && session_id().is_some() {
                form {
                    class: "chat-input",
                    onsubmit: move |evt: FormEvent| {
                        evt.prevent_default();
                        send.call(draft());
                    },
                    input {
                        class: "input",
                        r#type: "text",
                        placeholder: "Ask me about your chama...",
                        disabled: loading(),
                        value: "{draft}",
                        oninput: move |evt: FormEvent| draft.set(evt.value()),
                    }
                    button {
                        class: "icon-button",
                        r#type: "submit",
                        disabled: loading() || draft().trim().is_empty(),
                        Icon { icon: FaPaperPlane, width: 14, height: 14 }
                    }
                }
            }
        }
    }
}

#[component]
fn MessageBubble(message: ChatMessage) -> Element {
    let mine = message.is_user_message;
    rsx! {
        div {
            class: if mine { "chat-message chat-message--user" } else { "chat-message chat-message--bot" },
            span {
                class: "avatar avatar--small",
                if mine {
                    Icon { icon: FaUser, width: 10, height: 10 }
                } else {
                    Icon { icon: FaRobot, width: 10, height: 10 }
                }
            }
            div {
                div { class: "chat-bubble", "{message.message}" }
                div { class: "chat-time", "{format_time(message.timestamp)}" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::principal;

    #[test]
    fn test_format_message_breaks_bullets() {
        let formatted = format_message("Options: • Save • Borrow");
        assert_eq!(formatted, "Options: \n• Save \n• Borrow");
    }

    #[test]
    fn test_format_message_collapses_blank_lines() {
        assert_eq!(format_message("Hi\n\nthere\n"), "Hi\nthere");
        assert_eq!(format_message("Tips:\n• one"), "Tips:\n• one");
    }

    #[test]
    fn test_blank_input_is_not_echoed() {
        let mut transcript = Transcript::default();
        assert!(!transcript.push_user(&principal("aaaaa-aa"), "   ", None));
        assert!(transcript.messages.is_empty());
    }

    #[test]
    fn test_reply_replaces_suggestions() {
        let me = principal("aaaaa-aa");
        let mut transcript = Transcript::default();
        assert!(transcript.push_user(&me, " How do I save? ", Some("savings")));
        transcript.push_reply(
            &me,
            ChatResponse {
                message: "Try this: • Contribute monthly".to_string(),
                suggestions: vec!["Show my balance".to_string()],
                requires_data: false,
                data_type: None,
            },
        );

        assert_eq!(transcript.messages.len(), 2);
        assert_eq!(transcript.messages[0].message, "How do I save?");
        assert_eq!(transcript.messages[0].context.as_deref(), Some("savings"));
        assert!(!transcript.messages[1].is_user_message);
        assert_eq!(transcript.messages[1].message, "Try this: \n• Contribute monthly");
        assert_eq!(transcript.suggestions, vec!["Show my balance".to_string()]);
        assert_ne!(transcript.messages[0].id, transcript.messages[1].id);
    }

    #[tokio::test]
    async fn test_welcome_exchange_against_memory_backend() {
        let (backend, services) = crate::fixtures::signed_in("aaaaa-aa");
        let session = services.chat.start_chat_session().await.unwrap();
        let reply = services
            .chat
            .send_message(&session, WELCOME_MESSAGE, Some(WELCOME_CONTEXT))
            .await
            .unwrap();

        let mut transcript = Transcript::default();
        transcript.push_reply(&principal("aaaaa-aa"), reply);
        assert_eq!(transcript.messages.len(), 1);
        assert_eq!(backend.chat_calls(), ["startChatSession", "sendMessage"]);
        assert!(services.chat.end_chat_session(&session).await);
    }
}
