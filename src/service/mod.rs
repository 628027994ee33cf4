mod requests;
mod responses;

use crate::{
    auth::AuthUser,
    database::get_db_conn,
    error::ApiError,
    models::services::{NewService, ServiceData, UpdateService},
    protocol::MessageResponse,
    schema::services,
    DbPool,
};
use actix_web::{delete, get, post, put, web};
use diesel::{prelude::*, SqliteConnection};
use tracing::info;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(list_services)
        .service(all_services)
        .service(view_service)
        .service(create_service)
        .service(update_service)
        .service(delete_service);
}

crate::api_funcs! {
    (get, list_services, "", Ok, (pool: web::Data<DbPool>)),
    (get, all_services, "/all", Ok, (pool: web::Data<DbPool>, auth: AuthUser)),
    (get, view_service, "/{slug}", Ok, (pool: web::Data<DbPool>, path: web::Path<String>)),
    (post, create_service, "", Created, (pool: web::Data<DbPool>, auth: AuthUser, info: web::Json<CreateServiceRequest>)),
    (put, update_service, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>, info: web::Json<UpdateServiceRequest>)),
    (delete, delete_service, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>)),
}

fn free_slug(conn: &mut SqliteConnection, name: &str, except: Option<i32>) -> QueryResult<String> {
    let base = crate::utils::slugify(name);
    crate::utils::unique_slug(&base, |slug| {
        let res = services::table
            .filter(services::slug.eq(slug))
            .filter(services::id.ne(except.unwrap_or(0)))
            .count()
            .get_result::<i64>(conn)?;
        Ok(res > 0)
    })
}

async fn list_services_impl(pool: web::Data<DbPool>) -> Result<ServicesResponse, ApiError> {
    let mut conn = get_db_conn(&pool)?;
    let services = web::block(move || {
        services::table
            .filter(services::is_active.eq(true))
            .order((services::display_order.asc(), services::name.asc()))
            .load::<ServiceData>(&mut conn)
    })
    .await??;

    Ok(ServicesResponse {
        services: services.into_iter().map(ServiceItem::from).collect(),
    })
}

async fn all_services_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
) -> Result<ServicesResponse, ApiError> {
    auth.require_admin()?;

    let mut conn = get_db_conn(&pool)?;
    let services = web::block(move || {
        services::table
            .order((services::display_order.asc(), services::name.asc()))
            .load::<ServiceData>(&mut conn)
    })
    .await??;

    Ok(ServicesResponse {
        services: services.into_iter().map(ServiceItem::from).collect(),
    })
}

async fn view_service_impl(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> Result<ServiceResponse, ApiError> {
    let slug = path.into_inner();

    let mut conn = get_db_conn(&pool)?;
    let service = web::block(move || {
        services::table
            .filter(services::slug.eq(slug))
            .filter(services::is_active.eq(true))
            .first::<ServiceData>(&mut conn)
            .optional()
    })
    .await??
    .ok_or_else(|| ApiError::not_found("Service"))?;

    Ok(ServiceResponse {
        service: service.into(),
    })
}

async fn create_service_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    info: web::Json<CreateServiceRequest>,
) -> Result<ServiceResponse, ApiError> {
    auth.require_admin()?;
    let info = info.into_inner();
    let name = crate::utils::required(&info.name, "Name")?;
    let description = crate::utils::required(&info.description, "Description")?;
    let now = crate::utils::now();

    let mut conn = get_db_conn(&pool)?;
    let service = web::block(move || {
        conn.immediate_transaction::<_, ApiError, _>(|conn| {
            let data = NewService {
                slug: free_slug(conn, &name, None)?,
                name,
                description,
                icon: crate::utils::optional(info.icon),
                image_url: crate::utils::optional(info.image_url),
                display_order: info.display_order,
                is_active: info.is_active,
                created_at: now,
                updated_at: now,
            };
            Ok(diesel::insert_into(services::table)
                .values(&data)
                .get_result::<ServiceData>(conn)?)
        })
    })
    .await??;
    info!(service_id = service.id, slug = %service.slug, "service created");

    Ok(ServiceResponse {
        service: service.into(),
    })
}

async fn update_service_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
    info: web::Json<UpdateServiceRequest>,
) -> Result<ServiceResponse, ApiError> {
    auth.require_admin()?;
    let service_id = path.into_inner();
    let info = info.into_inner();
    let name = info
        .name
        .map(|v| crate::utils::required(v, "Name"))
        .transpose()?;
    let description = info
        .description
        .map(|v| crate::utils::required(v, "Description"))
        .transpose()?;

    let mut conn = get_db_conn(&pool)?;
    let service = web::block(move || {
        conn.immediate_transaction::<_, ApiError, _>(|conn| {
            let current = services::table
                .find(service_id)
                .first::<ServiceData>(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found("Service"))?;

            let slug = match &name {
                Some(name) if *name != current.name => {
                    Some(free_slug(conn, name, Some(service_id))?)
                }
                _ => None,
            };
            let data = UpdateService {
                name,
                slug,
                description,
                icon: crate::utils::optional(info.icon),
                image_url: crate::utils::optional(info.image_url),
                display_order: info.display_order,
                is_active: info.is_active,
                updated_at: Some(crate::utils::now()),
            };
            Ok(diesel::update(services::table.find(service_id))
                .set(&data)
                .get_result::<ServiceData>(conn)?)
        })
    })
    .await??;

    Ok(ServiceResponse {
        service: service.into(),
    })
}

async fn delete_service_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<MessageResponse, ApiError> {
    auth.require_admin()?;
    let service_id = path.into_inner();

    let mut conn = get_db_conn(&pool)?;
    let res = web::block(move || {
        diesel::delete(services::table.find(service_id)).execute(&mut conn)
    })
    .await??;
    if res == 0 {
        return Err(ApiError::not_found("Service"));
    }
    info!(service_id, "service deleted");

    Ok(MessageResponse::ok("Service deleted"))
}
