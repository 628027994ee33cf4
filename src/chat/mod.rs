pub mod assistant;
mod requests;
mod responses;

use crate::{
    database::get_db_conn,
    error::ApiError,
    models::chat_messages::{ChatMessage, NewChatMessage, SENDER_BOT, SENDER_USER},
    schema::chat_messages,
    DbPool,
};
use actix_web::{get, post, web};
use diesel::prelude::*;
use tracing::{debug, warn};

pub use self::assistant::Assistant;
use self::{requests::*, responses::*};

pub const HISTORY_LEN: i64 = 10;
pub const MAX_MESSAGE_LEN: usize = 2000;
const MAX_SESSION_ID_LEN: usize = 64;

pub const SOURCE_AI: &str = "ai";
pub const SOURCE_FALLBACK: &str = "fallback";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(send_message).service(chat_history);
}

crate::api_funcs! {
    (post, send_message, "", Ok, (pool: web::Data<DbPool>, assistant: web::Data<Assistant>, info: web::Json<ChatRequest>)),
    (get, chat_history, "/{session_id}", Ok, (pool: web::Data<DbPool>, path: web::Path<String>)),
}

fn check_session_id(session_id: &str) -> Result<(), ApiError> {
    let valid = !session_id.is_empty()
        && session_id.len() <= MAX_SESSION_ID_LEN
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ApiError::BadRequest("Invalid session id".to_string()));
    }
    Ok(())
}

async fn send_message_impl(
    pool: web::Data<DbPool>,
    assistant: web::Data<Assistant>,
    info: web::Json<ChatRequest>,
) -> Result<ChatReplyResponse, ApiError> {
    let info = info.into_inner();
    let message = crate::utils::required(&info.message, "Message")?;
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(ApiError::BadRequest(format!(
            "Message must be at most {} characters",
            MAX_MESSAGE_LEN
        )));
    }
    let session_id = match crate::utils::optional(info.session_id) {
        Some(session_id) => {
            check_session_id(&session_id)?;
            session_id
        }
        None => crate::utils::generate_token(),
    };

    let data = NewChatMessage {
        session_id: session_id.clone(),
        sender: SENDER_USER.to_string(),
        message: message.clone(),
        created_at: crate::utils::now(),
    };
    let mut conn = get_db_conn(&pool)?;
    let history = web::block(move || {
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let saved = diesel::insert_into(chat_messages::table)
                .values(&data)
                .get_result::<ChatMessage>(conn)?;
            let mut history = chat_messages::table
                .filter(chat_messages::session_id.eq(&data.session_id))
                .filter(chat_messages::id.lt(saved.id))
                .order(chat_messages::id.desc())
                .limit(HISTORY_LEN)
                .load::<ChatMessage>(conn)?;
            history.reverse();
            Ok(history)
        })
    })
    .await??;

    let (reply, source) = if assistant.is_configured() {
        match assistant.complete(&history, &message).await {
            Ok(reply) => (reply, SOURCE_AI),
            Err(err) => {
                warn!(%session_id, "AI reply failed, using fallback: {:#}", err);
                (assistant::fallback_reply(&message).to_string(), SOURCE_FALLBACK)
            }
        }
    } else {
        debug!(%session_id, "AI not configured, using fallback");
        (assistant::fallback_reply(&message).to_string(), SOURCE_FALLBACK)
    };

    let data = NewChatMessage {
        session_id: session_id.clone(),
        sender: SENDER_BOT.to_string(),
        message: reply.clone(),
        created_at: crate::utils::now(),
    };
    let mut conn = get_db_conn(&pool)?;
    web::block(move || {
        diesel::insert_into(chat_messages::table)
            .values(&data)
            .execute(&mut conn)
    })
    .await??;

    Ok(ChatReplyResponse {
        session_id,
        reply,
        source,
    })
}

async fn chat_history_impl(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> Result<ChatHistoryResponse, ApiError> {
    let session_id = path.into_inner();
    check_session_id(&session_id)?;

    let mut conn = get_db_conn(&pool)?;
    let id = session_id.clone();
    let messages = web::block(move || {
        chat_messages::table
            .filter(chat_messages::session_id.eq(id))
            .order(chat_messages::id.asc())
            .load::<ChatMessage>(&mut conn)
    })
    .await??;

    Ok(ChatHistoryResponse {
        session_id,
        messages: messages.into_iter().map(ChatMessageItem::from).collect(),
    })
}
