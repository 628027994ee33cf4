use actix_web::{error::BlockingError, http::StatusCode, HttpResponse, ResponseError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;
use thiserror::Error;

pub const SESSION_REPLACED: &str = "SESSION_REPLACED";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    /// The bearer token is valid but a newer login replaced it.
    #[error("Your session has been replaced by a newer login")]
    SessionReplaced,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Database(#[from] DieselError),

    #[error("DB connection: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("blocking task: {0}")]
    Blocking(#[from] BlockingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found", what))
    }

    /// Message sent to the client. Internal failures never leak details.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Database(DieselError::NotFound) => "Resource not found".to_string(),
            ApiError::Database(DieselError::DatabaseError(kind, _)) => match kind {
                DatabaseErrorKind::UniqueViolation => "Resource already exists".to_string(),
                DatabaseErrorKind::ForeignKeyViolation => {
                    "Invalid reference to related resource".to_string()
                }
                _ => "Internal server error".to_string(),
            },
            ApiError::Database(_)
            | ApiError::Pool(_)
            | ApiError::Blocking(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::SessionReplaced => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Database(DieselError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(DieselError::DatabaseError(kind, _)) => match kind {
                DatabaseErrorKind::UniqueViolation => StatusCode::CONFLICT,
                DatabaseErrorKind::ForeignKeyViolation => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Database(_)
            | ApiError::Pool(_)
            | ApiError::Blocking(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Internal service error: {:#}", self);
        } else if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            tracing::info!("Authorization error: {}", self);
        } else {
            tracing::debug!("Client error: {}", self);
        }

        let code = match self {
            ApiError::SessionReplaced => Some(SESSION_REPLACED),
            _ => None,
        };
        HttpResponse::build(status).json(ErrorBody {
            error: self.user_message(),
            code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let err = ApiError::Conflict("Email already registered".to_string());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.user_message(), "Email already registered");
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = ApiError::Internal(anyhow::anyhow!("secret connection string"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "Internal server error");
    }

    #[test]
    fn diesel_not_found_maps_to_404() {
        let err = ApiError::from(DieselError::NotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn session_replaced_is_unauthorized() {
        assert_eq!(
            ApiError::SessionReplaced.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
