#[macro_use]
extern crate diesel;

pub mod analytics;
pub mod application;
pub mod appointment;
pub mod auth;
pub mod chat;
pub mod config;
pub mod database;
pub mod doctor;
pub mod error;
pub mod job;
pub mod models;
pub mod news;
pub mod protocol;
pub mod schema;
pub mod service;
pub mod story;
pub mod upload;
pub mod users;
pub mod utils;

use actix_files::Files;
use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError},
    get, web, HttpRequest,
};
use diesel::{r2d2::ConnectionManager, RunQueryDsl, SqliteConnection};

use crate::{
    chat::Assistant, config::Config, database::get_db_conn, error::ApiError,
    protocol::HealthResponse,
};

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

/// Shared state handed to every worker's `App`.
#[derive(Clone)]
pub struct AppState {
    pub pool: web::Data<DbPool>,
    pub config: web::Data<Config>,
    pub assistant: web::Data<Assistant>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> anyhow::Result<Self> {
        let assistant = Assistant::new(&config)?;
        Ok(Self {
            pool: web::Data::new(pool),
            config: web::Data::new(config),
            assistant: web::Data::new(assistant),
        })
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.pool.clone())
            .app_data(self.config.clone())
            .app_data(self.assistant.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .app_data(web::PathConfig::default().error_handler(path_error))
            .service(
                web::scope("/api")
                    .service(health)
                    .service(web::scope("/auth").configure(auth::config))
                    .service(web::scope("/doctors").configure(doctor::config))
                    .service(web::scope("/appointments").configure(appointment::config))
                    .service(web::scope("/jobs").configure(job::config))
                    .service(web::scope("/applications").configure(application::config))
                    .service(web::scope("/news").configure(news::config))
                    .service(web::scope("/services").configure(service::config))
                    .service(web::scope("/sch-stories").configure(story::config))
                    .service(web::scope("/users").configure(users::config))
                    .service(web::scope("/upload").configure(upload::config))
                    .service(web::scope("/chat").configure(chat::config))
                    .service(web::scope("/analytics").configure(analytics::config)),
            )
            .service(Files::new("/uploads", &self.config.upload_dir));
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            ApiError::PayloadTooLarge("Request body too large".to_string()).into()
        }
        err => ApiError::BadRequest(format!("Invalid JSON body: {}", err)).into(),
    }
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(format!("Invalid query string: {}", err)).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(format!("Invalid path parameter: {}", err)).into()
}

crate::api_funcs! {
    (get, health, "/health", Ok, (pool: web::Data<DbPool>)),
}

async fn health_impl(pool: web::Data<DbPool>) -> Result<HealthResponse, ApiError> {
    let mut conn = get_db_conn(&pool)?;
    web::block(move || diesel::sql_query("SELECT 1").execute(&mut conn)).await??;

    Ok(HealthResponse { status: "ok" })
}
