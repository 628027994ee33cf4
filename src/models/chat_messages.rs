use crate::schema::chat_messages;
use diesel::prelude::*;
use chrono::NaiveDateTime;

#[derive(Queryable, Clone)]
pub struct ChatMessage {
    pub id: i32,
    pub session_id: String,
    pub sender: String,
    pub message: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = chat_messages)]
pub struct NewChatMessage {
    pub session_id: String,
    pub sender: String,
    pub message: String,
    pub created_at: NaiveDateTime,
}

pub const SENDER_USER: &str = "user";
pub const SENDER_BOT: &str = "bot";
