//! Replies for the site chat widget: an OpenAI-compatible completion when a key
//! is configured, a keyword-based canned answer otherwise.

use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    models::chat_messages::{ChatMessage, SENDER_BOT},
};

pub const SYSTEM_PROMPT: &str = "You are the virtual assistant of a hospital website. \
Answer briefly and politely. Help visitors find doctors, book appointments through the \
website, learn about services and careers. Never give a diagnosis; for emergencies tell \
the visitor to call emergency services immediately.";

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionContent,
}

#[derive(Deserialize)]
struct CompletionContent {
    content: Option<String>,
}

pub struct Assistant {
    client: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl Assistant {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.ai_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.ai_api_key.clone(),
            api_url: config.ai_api_url.trim_end_matches('/').to_string(),
            model: config.ai_model.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// One completion call with the system prompt, `history` (oldest first) and `message`.
    pub async fn complete(&self, history: &[ChatMessage], message: &str) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("AI API key not configured"))?;

        let mut messages = vec![CompletionMessage {
            role: "system",
            content: SYSTEM_PROMPT,
        }];
        messages.extend(history.iter().map(|m| CompletionMessage {
            role: if m.sender == SENDER_BOT { "assistant" } else { "user" },
            content: &m.message,
        }));
        messages.push(CompletionMessage {
            role: "user",
            content: message,
        });

        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: 0.7,
            max_tokens: 400,
        };
        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .context("Chat completion request failed")?
            .error_for_status()
            .context("Chat completion returned an error status")?
            .json::<CompletionResponse>()
            .await
            .context("Invalid chat completion response")?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| anyhow!("Chat completion had no content"))
    }
}

const FALLBACK_RULES: &[(&[&str], &str)] = &[
    (
        &["emergency", "urgent", "bleeding", "chest pain", "unconscious"],
        "If this is an emergency, please call emergency services or go to the nearest \
emergency department right away.",
    ),
    (
        &["appointment", "book", "schedule", "reserve"],
        "You can book an appointment from the Doctors page: choose a doctor, pick a date \
and select one of the free time slots. You need to be logged in as a patient.",
    ),
    (
        &["doctor", "specialist", "physician", "specialty"],
        "Our Doctors page lists every available specialist. You can filter by specialty \
or search by name to see their schedule.",
    ),
    (
        &["job", "career", "vacancy", "apply", "hiring", "work"],
        "Open positions are listed on our Careers page. Create an account to apply and \
upload your resume.",
    ),
    (
        &["service", "department", "treatment"],
        "You can find the full list of our medical services on the Services page.",
    ),
    (
        &["hour", "open", "visiting", "time"],
        "Our outpatient clinics are open Monday to Saturday. The emergency department is \
open 24 hours a day, every day.",
    ),
    (
        &["hello", "hi", "hey", "good morning", "good evening"],
        "Hello! I am the hospital assistant. How can I help you today?",
    ),
];

const FALLBACK_DEFAULT: &str = "Thank you for your message. I can help with appointments, \
doctors, services and careers. For anything else please contact our front desk.";

const INFLECTIONS: &[&str] = &["s", "es", "d", "ed", "ing", "ers"];

/// `word` is `keyword` itself or, for keywords of three letters or more, the
/// keyword with a common inflection ("book" matches "booking", "hi" only "hi").
fn matches_keyword(word: &str, keyword: &str) -> bool {
    match word.strip_prefix(keyword) {
        Some("") => true,
        Some(rest) => keyword.len() >= 3 && INFLECTIONS.contains(&rest),
        None => false,
    }
}

/// Canned answer picked by the first matching keyword group.
pub fn fallback_reply(message: &str) -> &'static str {
    let text = message.to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    FALLBACK_RULES
        .iter()
        .find(|(keywords, _)| {
            keywords.iter().any(|keyword| {
                if keyword.contains(' ') {
                    text.contains(keyword)
                } else {
                    words.iter().any(|word| matches_keyword(word, keyword))
                }
            })
        })
        .map(|(_, reply)| *reply)
        .unwrap_or(FALLBACK_DEFAULT)
}
