mod requests;
mod responses;

use crate::{
    auth::{
        insert_user, normalize_email, password,
        responses::{UserItem, UserResponse},
        AuthUser,
    },
    database::{assert, get_db_conn},
    error::ApiError,
    models::users::{NewUser, Role, UpdateUser, User},
    protocol::{MessageResponse, PageQuery},
    schema::users,
    utils::LIKE_ESCAPE,
    DbPool,
};
use actix_web::{delete, get, post, put, web};
use diesel::{prelude::*, sqlite::Sqlite};
use tracing::info;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(view_user)
        .service(create_user)
        .service(update_user)
        .service(reset_password)
        .service(delete_user);
}

crate::api_funcs! {
    (get, list_users, "", Ok, (pool: web::Data<DbPool>, auth: AuthUser, info: web::Query<UserListQuery>, page: web::Query<PageQuery>)),
    (get, view_user, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>)),
    (post, create_user, "", Created, (pool: web::Data<DbPool>, auth: AuthUser, info: web::Json<CreateUserRequest>)),
    (put, update_user, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>, info: web::Json<UpdateUserRequest>)),
    (put, reset_password, "/{id}/password", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>, info: web::Json<ResetPasswordRequest>)),
    (delete, delete_user, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>)),
}

const DOCTOR_ACCOUNTS: &str = "Doctor accounts are managed through /api/doctors";

/// Rules for an admin editing `target`: no self-demotion or self-deactivation,
/// and the doctor role is never granted or removed here.
fn check_update(
    actor_id: i32,
    target_id: i32,
    current: Role,
    role: Option<Role>,
    is_active: Option<bool>,
) -> Result<(), ApiError> {
    if actor_id == target_id {
        if matches!(role, Some(role) if role != Role::Admin) {
            return Err(ApiError::BadRequest(
                "You cannot change your own role".to_string(),
            ));
        }
        if is_active == Some(false) {
            return Err(ApiError::BadRequest(
                "You cannot deactivate your own account".to_string(),
            ));
        }
    }
    if let Some(role) = role {
        if role != current && (role == Role::Doctor || current == Role::Doctor) {
            return Err(ApiError::BadRequest(DOCTOR_ACCOUNTS.to_string()));
        }
    }
    Ok(())
}

struct UserFilter {
    role: Option<Role>,
    pattern: String,
}

impl UserFilter {
    fn query(&self) -> users::BoxedQuery<'static, Sqlite> {
        let mut query = users::table
            .filter(
                users::name
                    .like(self.pattern.clone())
                    .escape(LIKE_ESCAPE)
                    .or(users::email.like(self.pattern.clone()).escape(LIKE_ESCAPE)),
            )
            .into_boxed();
        if let Some(role) = self.role {
            query = query.filter(users::role.eq(role.as_str()));
        }
        query
    }
}

async fn list_users_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    info: web::Query<UserListQuery>,
    page: web::Query<PageQuery>,
) -> Result<UserListResponse, ApiError> {
    auth.require_admin()?;
    let info = info.into_inner();
    let filter = UserFilter {
        role: crate::utils::optional(info.role)
            .map(|s| s.parse::<Role>())
            .transpose()?,
        pattern: crate::utils::get_str_pattern_opt(info.search),
    };
    let (offset, limit) = (page.offset(), page.limit());

    let mut conn = get_db_conn(&pool)?;
    let (users, total) = web::block(move || {
        let total = filter.query().count().get_result::<i64>(&mut conn)?;
        let users = filter
            .query()
            .order(users::created_at.desc())
            .offset(offset)
            .limit(limit)
            .load::<User>(&mut conn)?;
        Ok::<_, diesel::result::Error>((users, total))
    })
    .await??;

    Ok(UserListResponse {
        users: users.into_iter().map(UserItem::from).collect(),
        total,
    })
}

async fn view_user_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<UserResponse, ApiError> {
    auth.require_admin()?;
    let user_id = path.into_inner();

    let mut conn = get_db_conn(&pool)?;
    let user = web::block(move || {
        users::table
            .find(user_id)
            .first::<User>(&mut conn)
            .optional()
    })
    .await??
    .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(UserResponse { user: user.into() })
}

async fn create_user_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    info: web::Json<CreateUserRequest>,
) -> Result<UserResponse, ApiError> {
    auth.require_admin()?;
    let info = info.into_inner();
    let role: Role = info.role.trim().parse()?;
    if role == Role::Doctor {
        return Err(ApiError::BadRequest(DOCTOR_ACCOUNTS.to_string()));
    }
    let name = crate::utils::required(&info.name, "Name")?;
    let email = normalize_email(&info.email)?;
    crate::utils::assert_password(&info.password)?;

    let now = crate::utils::now();
    let data = NewUser {
        email,
        password: password::hash_password(&info.password)?,
        name,
        phone: crate::utils::optional(info.phone),
        role: role.as_str().to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let mut conn = get_db_conn(&pool)?;
    let user =
        web::block(move || conn.immediate_transaction(|conn| insert_user(conn, data))).await??;
    info!(user_id = user.id, role = %role, created_by = auth.id, "user created");

    Ok(UserResponse { user: user.into() })
}

async fn update_user_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
    info: web::Json<UpdateUserRequest>,
) -> Result<UserResponse, ApiError> {
    auth.require_admin()?;
    let user_id = path.into_inner();
    let info = info.into_inner();
    let role = crate::utils::optional(info.role)
        .map(|s| s.parse::<Role>())
        .transpose()?;
    let data = UpdateUser {
        name: info
            .name
            .map(|v| crate::utils::required(v, "Name"))
            .transpose()?,
        phone: crate::utils::optional(info.phone),
        role: role.map(|role| role.as_str().to_string()),
        is_active: info.is_active,
        updated_at: Some(crate::utils::now()),
    };

    let mut conn = get_db_conn(&pool)?;
    let actor_id = auth.id;
    let user = web::block(move || {
        conn.transaction::<_, ApiError, _>(|conn| {
            let current = users::table
                .find(user_id)
                .first::<User>(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found("User"))?;
            check_update(
                actor_id,
                user_id,
                current.role.parse()?,
                role,
                data.is_active,
            )?;

            if data.is_active == Some(false) {
                diesel::update(users::table.find(user_id))
                    .set(users::session_token.eq(None::<String>))
                    .execute(conn)?;
            }
            Ok(diesel::update(users::table.find(user_id))
                .set(&data)
                .get_result::<User>(conn)?)
        })
    })
    .await??;
    info!(user_id, updated_by = actor_id, "user updated");

    Ok(UserResponse { user: user.into() })
}

async fn reset_password_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
    info: web::Json<ResetPasswordRequest>,
) -> Result<MessageResponse, ApiError> {
    auth.require_admin()?;
    let user_id = path.into_inner();
    let info = info.into_inner();
    crate::utils::assert_password(&info.password)?;
    assert::assert_user(&pool, user_id).await?;

    let hashed_password = password::hash_password(&info.password)?;
    let mut conn = get_db_conn(&pool)?;
    web::block(move || {
        diesel::update(users::table.find(user_id))
            .set((
                users::password.eq(hashed_password),
                users::session_token.eq(None::<String>),
                users::updated_at.eq(crate::utils::now()),
            ))
            .execute(&mut conn)
    })
    .await??;
    info!(user_id, reset_by = auth.id, "password reset by admin");

    Ok(MessageResponse::ok("Password reset"))
}

async fn delete_user_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<MessageResponse, ApiError> {
    auth.require_admin()?;
    let user_id = path.into_inner();
    if user_id == auth.id {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }
    assert::assert_user(&pool, user_id).await?;

    let mut conn = get_db_conn(&pool)?;
    web::block(move || diesel::delete(users::table.find(user_id)).execute(&mut conn)).await??;
    info!(user_id, deleted_by = auth.id, "user deleted");

    Ok(MessageResponse::ok("User deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_cannot_demote_or_deactivate_self() {
        assert!(check_update(1, 1, Role::Admin, Some(Role::Hr), None).is_err());
        assert!(check_update(1, 1, Role::Admin, None, Some(false)).is_err());
        assert!(check_update(1, 1, Role::Admin, Some(Role::Admin), Some(true)).is_ok());
    }

    #[test]
    fn doctor_role_is_not_managed_here() {
        assert!(check_update(1, 2, Role::Patient, Some(Role::Doctor), None).is_err());
        assert!(check_update(1, 2, Role::Doctor, Some(Role::Patient), None).is_err());
        assert!(check_update(1, 2, Role::Doctor, Some(Role::Doctor), Some(false)).is_ok());
        assert!(check_update(1, 2, Role::Patient, Some(Role::Hr), None).is_ok());
    }
}
