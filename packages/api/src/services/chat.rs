use std::rc::Rc;

use super::{degrade, HandleCache};
use crate::error::ServiceError;
use crate::models::{ChatResponse, ChatSession, ChatbotCapabilities};
use crate::remote::ChatAssistant;

/// The assistant's sessions are best effort: a failed `start` or `send` is reported to
/// the widget, everything else degrades quietly.
#[derive(Clone)]
pub struct ChatService {
    handle: Rc<HandleCache<dyn ChatAssistant>>,
}

impl ChatService {
    pub(crate) fn new(handle: HandleCache<dyn ChatAssistant>) -> Self {
        Self {
            handle: Rc::new(handle),
        }
    }

    pub fn reset(&self) {
        self.handle.reset();
    }

    pub async fn start_chat_session(&self) -> Result<String, ServiceError> {
        async { self.handle.get()?.start_chat_session().await }
            .await
            .map_err(|e| {
                tracing::error!("Failed to start chat session: {}", e);
                ServiceError::Transport(e)
            })
    }

    pub async fn send_message(
        &self,
        session_id: &str,
        message: &str,
        context: Option<&str>,
    ) -> Result<ChatResponse, ServiceError> {
        async {
            self.handle
                .get()?
                .send_message(session_id, message, context)
                .await
        }
        .await
        .map_err(|e| {
            tracing::error!("Failed to send chat message: {}", e);
            ServiceError::Transport(e)
        })
    }

    pub async fn get_chat_history(&self, session_id: &str) -> Option<ChatSession> {
        degrade(
            "Failed to get chat history",
            async { self.handle.get()?.get_chat_history(session_id).await }.await,
        )
    }

    pub async fn get_my_sessions(&self) -> Vec<ChatSession> {
        degrade(
            "Failed to get chat sessions",
            async { self.handle.get()?.get_my_sessions().await }.await,
        )
    }

    pub async fn end_chat_session(&self, session_id: &str) -> bool {
        degrade(
            "Failed to end chat session",
            async { self.handle.get()?.end_chat_session(session_id).await }.await,
        )
    }

    pub async fn get_capabilities(&self) -> ChatbotCapabilities {
        degrade(
            "Failed to get chatbot capabilities",
            async { self.handle.get()?.get_capabilities().await }.await,
        )
    }

    pub async fn health_check(&self) -> String {
        async { self.handle.get()?.health_check().await }
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Chat service health check failed: {}", e);
                "Service unavailable".to_string()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::signed_in;

    #[tokio::test]
    async fn test_session_round_trip() {
        let (_, _, services) = signed_in("aaaaa-aa");
        let session = services.chat.start_chat_session().await.unwrap();
        let reply = services
            .chat
            .send_message(&session, "hello", Some("welcome"))
            .await
            .unwrap();
        assert!(reply.message.contains("Karibu"));
        assert_eq!(services.chat.get_my_sessions().await.len(), 1);
        assert!(services.chat.end_chat_session(&session).await);
        assert!(!services.chat.get_capabilities().await.capabilities.is_empty());
    }

    #[tokio::test]
    async fn test_offline_start_reports_error() {
        let (backend, _, services) = signed_in("aaaaa-aa");
        backend.set_offline(true);
        assert!(services.chat.start_chat_session().await.is_err());
        assert!(!services.chat.end_chat_session("session_1").await);
    }
}
