use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use diesel::prelude::*;
use futures::future::LocalBoxFuture;

use crate::{
    auth::token,
    config::Config,
    database::get_db_conn,
    error::ApiError,
    models::users::{Role, User},
    DbPool,
};

/// The caller behind a valid bearer token.
///
/// Extraction fails with 401 when the token is missing, invalid or expired,
/// when the account is gone or deactivated, and (for every role but admin)
/// when the token is not the user's current session token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "You do not have permission to perform this action".to_string(),
            ))
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        self.require(&[Role::Admin])
    }

    pub fn require_staff(&self) -> Result<(), ApiError> {
        self.require(&[Role::Hr, Role::Admin])
    }
}

pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

async fn authenticate(
    token: Option<String>,
    pool: Option<web::Data<DbPool>>,
    config: Option<web::Data<Config>>,
) -> Result<AuthUser, ApiError> {
    use crate::schema::users;

    let token = token.ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;
    let (pool, config) = match (pool, config) {
        (Some(pool), Some(config)) => (pool, config),
        _ => return Err(ApiError::Internal(anyhow::anyhow!("application state missing"))),
    };

    let claims = token::verify_token(&token, &config)?;
    let user_id = claims.user_id()?;

    let mut conn = get_db_conn(&pool)?;
    let user = web::block(move || {
        users::table
            .find(user_id)
            .first::<User>(&mut conn)
            .optional()
    })
    .await??
    .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Unauthorized("Account is deactivated".to_string()));
    }

    let role: Role = user.role.parse()?;
    if role != Role::Admin {
        match user.session_token.as_deref() {
            None => {
                return Err(ApiError::Unauthorized(
                    "Session expired, please log in again".to_string(),
                ))
            }
            Some(current) if current != token => return Err(ApiError::SessionReplaced),
            Some(_) => {}
        }
    }

    Ok(AuthUser {
        id: user.id,
        email: user.email,
        name: user.name,
        role,
    })
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let config = req.app_data::<web::Data<Config>>().cloned();
        Box::pin(authenticate(token, pool, config))
    }
}
