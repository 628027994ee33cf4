//! JWT session token creation and verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::ApiError, models::users::Role};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    /// Unique per login so two logins in the same second still differ.
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<i32, ApiError> {
        self.sub
            .parse()
            .map_err(|_| ApiError::Unauthorized("Invalid token".to_string()))
    }
}

pub fn create_token(user_id: i32, role: Role, config: &Config) -> Result<String, ApiError> {
    let now = Utc::now();
    let exp = now + Duration::hours(config.jwt_expiry_hours);
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        jti: crate::utils::generate_token(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("create JWT: {e}")))
}

pub fn verify_token(token: &str, config: &Config) -> Result<Claims, ApiError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let data = decode::<Claims>(token, &key, &Validation::default()).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => ApiError::Unauthorized("Token expired".to_string()),
        _ => ApiError::Unauthorized("Invalid token".to_string()),
    })?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config() -> Config {
        Config {
            bind_address: "127.0.0.1:0".to_string(),
            database_url: ":memory:".to_string(),
            jwt_secret: "unit-test-secret".to_string(),
            jwt_expiry_hours: 1,
            upload_dir: PathBuf::from("uploads"),
            ai_api_key: None,
            ai_api_url: "http://localhost".to_string(),
            ai_model: "test".to_string(),
            ai_timeout_secs: 1,
            admin_email: None,
            admin_password: None,
        }
    }

    #[test]
    fn token_round_trip_keeps_user_and_role() {
        let config = config();
        let token = create_token(42, Role::Hr, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role, "hr");
    }

    #[test]
    fn consecutive_tokens_differ() {
        let config = config();
        let a = create_token(1, Role::Patient, &config).unwrap();
        let b = create_token(1, Role::Patient, &config).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = config();
        let token = create_token(1, Role::Patient, &config).unwrap();
        let other = Config {
            jwt_secret: "different".to_string(),
            ..config
        };
        assert!(matches!(
            verify_token(&token, &other),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = config();
        let past = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: "1".to_string(),
            role: "patient".to_string(),
            jti: "x".to_string(),
            iat: past.timestamp(),
            exp: (past + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();
        match verify_token(&token, &config) {
            Err(ApiError::Unauthorized(msg)) => assert_eq!(msg, "Token expired"),
            other => panic!("unexpected result: {:?}", other.map(|c| c.sub)),
        }
    }
}
