use serde::Serialize;

use crate::models::chat_messages::ChatMessage;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReplyResponse {
    pub session_id: String,
    pub reply: String,
    pub source: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageItem {
    pub id: i32,
    pub sender: String,
    pub message: String,
    pub created_at: String,
}

impl From<ChatMessage> for ChatMessageItem {
    fn from(data: ChatMessage) -> Self {
        Self {
            id: data.id,
            sender: data.sender,
            message: data.message,
            created_at: crate::utils::format_time_str(&data.created_at),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryResponse {
    pub session_id: String,
    pub messages: Vec<ChatMessageItem>,
}
