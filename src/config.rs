use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::Context;
use tracing::{info, warn};

const DEV_JWT_SECRET: &str = "hospital-dev-secret-change-me";

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub upload_dir: PathBuf,
    pub ai_api_key: Option<String>,
    pub ai_api_url: String,
    pub ai_model: String,
    pub ai_timeout_secs: u64,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// Reads the process environment, after `.env` has been loaded by the caller.
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        Ok(Self {
            bind_address: try_load("BIND_ADDRESS", "127.0.0.1:8080")?,
            database_url: try_load("DATABASE_URL", "hospital.db")?,
            jwt_secret,
            jwt_expiry_hours: try_load("JWT_EXPIRY_HOURS", "24")?,
            upload_dir: try_load("UPLOAD_DIR", "uploads")?,
            ai_api_key: var("AI_API_KEY"),
            ai_api_url: try_load("AI_API_URL", "https://api.openai.com/v1")?,
            ai_model: try_load("AI_MODEL", "gpt-4o-mini")?,
            ai_timeout_secs: try_load("AI_TIMEOUT_SECS", "20")?,
            admin_email: var("ADMIN_EMAIL"),
            admin_password: var("ADMIN_PASSWORD"),
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    parse_value(key, &raw)
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Invalid {key} value: {raw:?}"))
}
