use serde::{Deserialize, Serialize};

use super::{Principal, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub user_id: Principal,
    pub message: String,
    pub is_user_message: bool,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub session_id: String,
    pub user_id: Principal,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub start_time: Timestamp,
    pub last_activity: Timestamp,
    pub is_active: bool,
}

/// The assistant's answer to one message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub requires_data: bool,
    #[serde(default)]
    pub data_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotCapabilities {
    pub capabilities: Vec<String>,
    pub supported_languages: Vec<String>,
    pub chama_features: Vec<String>,
}
