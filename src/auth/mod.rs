pub mod extractor;
pub mod password;
mod requests;
pub mod responses;
pub mod token;

use crate::{
    config::Config,
    database::get_db_conn,
    error::ApiError,
    models::users::{NewUser, Role, UpdateUser, User},
    protocol::MessageResponse,
    DbPool,
};
use actix_web::{get, post, put, web};
use diesel::{prelude::*, SqliteConnection};
use tracing::info;

pub use self::extractor::AuthUser;
use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(me)
        .service(update_me)
        .service(change_password);
}

crate::api_funcs! {
    (post, register, "/register", Created, (pool: web::Data<DbPool>, info: web::Json<RegisterRequest>)),
    (post, login, "/login", Ok, (pool: web::Data<DbPool>, config: web::Data<Config>, info: web::Json<LoginRequest>)),
    (post, logout, "/logout", Ok, (pool: web::Data<DbPool>, auth: AuthUser)),
    (get, me, "/me", Ok, (pool: web::Data<DbPool>, auth: AuthUser)),
    (put, update_me, "/me", Ok, (pool: web::Data<DbPool>, auth: AuthUser, info: web::Json<UpdateProfileRequest>)),
    (put, change_password, "/password", Ok, (pool: web::Data<DbPool>, auth: AuthUser, info: web::Json<ChangePasswordRequest>)),
}

pub(crate) fn normalize_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim().to_lowercase();
    crate::utils::assert_email(&email)?;
    Ok(email)
}

/// Inserts a user after checking the email is free, inside the caller's transaction.
pub(crate) fn insert_user(conn: &mut SqliteConnection, data: NewUser) -> Result<User, ApiError> {
    use crate::schema::users;

    let res = users::table
        .filter(users::email.eq(&data.email))
        .count()
        .get_result::<i64>(conn)?;
    if res > 0 {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    Ok(diesel::insert_into(users::table)
        .values(&data)
        .get_result::<User>(conn)?)
}

async fn register_impl(
    pool: web::Data<DbPool>,
    info: web::Json<RegisterRequest>,
) -> Result<UserResponse, ApiError> {
    let info = info.into_inner();
    let name = crate::utils::required(&info.name, "Name")?;
    let email = normalize_email(&info.email)?;
    crate::utils::assert_password(&info.password)?;

    let now = crate::utils::now();
    let data = NewUser {
        email,
        password: password::hash_password(&info.password)?,
        name,
        phone: crate::utils::optional(info.phone),
        role: Role::Patient.as_str().to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let mut conn = get_db_conn(&pool)?;
    let user = web::block(move || conn.transaction(|conn| insert_user(conn, data))).await??;
    info!(user_id = user.id, "patient registered");

    Ok(UserResponse { user: user.into() })
}

async fn login_impl(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    info: web::Json<LoginRequest>,
) -> Result<LoginResponse, ApiError> {
    use crate::schema::users;

    let info = info.into_inner();
    let email = info.email.trim().to_lowercase();

    let mut conn = get_db_conn(&pool)?;
    let user = web::block(move || {
        users::table
            .filter(users::email.eq(email))
            .first::<User>(&mut conn)
            .optional()
    })
    .await??;

    let user = match user {
        Some(user) if password::verify_password(&info.password, &user.password) => user,
        _ => {
            return Err(ApiError::Unauthorized(
                "Invalid email or password".to_string(),
            ))
        }
    };
    if !user.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".to_string()));
    }

    let role: Role = user.role.parse()?;
    let login_token = token::create_token(user.id, role, &config)?;

    let mut user = user;
    if role != Role::Admin {
        let mut conn = get_db_conn(&pool)?;
        let session_token = login_token.clone();
        let user_id = user.id;
        user = web::block(move || {
            diesel::update(users::table.find(user_id))
                .set(users::session_token.eq(Some(session_token)))
                .get_result::<User>(&mut conn)
        })
        .await??;
    }
    info!(user_id = user.id, role = %role, "user logged in");

    Ok(LoginResponse {
        token: login_token,
        user: user.into(),
    })
}

async fn logout_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
) -> Result<MessageResponse, ApiError> {
    use crate::schema::users;

    if auth.role != Role::Admin {
        let mut conn = get_db_conn(&pool)?;
        let user_id = auth.id;
        web::block(move || {
            diesel::update(users::table.find(user_id))
                .set(users::session_token.eq(None::<String>))
                .execute(&mut conn)
        })
        .await??;
    }
    info!(user_id = auth.id, "user logged out");

    Ok(MessageResponse::ok("Logged out"))
}

async fn me_impl(pool: web::Data<DbPool>, auth: AuthUser) -> Result<UserResponse, ApiError> {
    use crate::schema::users;

    let mut conn = get_db_conn(&pool)?;
    let user = web::block(move || users::table.find(auth.id).first::<User>(&mut conn)).await??;

    Ok(UserResponse { user: user.into() })
}

async fn update_me_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    info: web::Json<UpdateProfileRequest>,
) -> Result<UserResponse, ApiError> {
    use crate::schema::users;

    let info = info.into_inner();
    let name = info
        .name
        .map(|name| crate::utils::required(name, "Name"))
        .transpose()?;
    let data = UpdateUser {
        name,
        phone: crate::utils::optional(info.phone),
        updated_at: Some(crate::utils::now()),
        ..Default::default()
    };

    let mut conn = get_db_conn(&pool)?;
    let user = web::block(move || {
        diesel::update(users::table.find(auth.id))
            .set(&data)
            .get_result::<User>(&mut conn)
    })
    .await??;

    Ok(UserResponse { user: user.into() })
}

async fn change_password_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    info: web::Json<ChangePasswordRequest>,
) -> Result<MessageResponse, ApiError> {
    use crate::schema::users;

    let info = info.into_inner();
    crate::utils::assert_password(&info.new_password)?;

    let mut conn = get_db_conn(&pool)?;
    let user_id = auth.id;
    web::block(move || {
        conn.transaction::<_, ApiError, _>(|conn| {
            let user = users::table.find(user_id).first::<User>(conn)?;
            if !password::verify_password(&info.current_password, &user.password) {
                return Err(ApiError::BadRequest(
                    "Current password is incorrect".to_string(),
                ));
            }

            diesel::update(users::table.find(user_id))
                .set((
                    users::password.eq(password::hash_password(&info.new_password)?),
                    users::updated_at.eq(crate::utils::now()),
                ))
                .execute(conn)?;

            Ok(())
        })
    })
    .await??;
    info!(user_id, "password changed");

    Ok(MessageResponse::ok("Password updated"))
}
