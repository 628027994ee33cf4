pub mod assert;

use crate::{
    auth::password,
    error::ApiError,
    models::users::{NewUser, Role},
    DbPool,
};
use actix_web::web;
use anyhow::Context;
use diesel::{
    connection::SimpleConnection,
    prelude::*,
    r2d2::{ConnectionManager, CustomizeConnection},
    SqliteConnection,
};
use r2d2::PooledConnection;
use tracing::info;

const SCHEMA_SQL: &str = include_str!("schema.sql");

#[derive(Debug)]
struct SqliteCustomizer;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn build_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    r2d2::Pool::builder()
        .connection_customizer(Box::new(SqliteCustomizer))
        .build(manager)
        .context("Failed to create pool")
}

pub fn get_db_conn(
    pool: &web::Data<DbPool>,
) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>, ApiError> {
    Ok(pool.get()?)
}

/// Creates every table that does not exist yet.
pub fn init_schema(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get().context("DB connection")?;
    conn.batch_execute("PRAGMA journal_mode = WAL;")
        .context("Failed to enable WAL")?;
    conn.batch_execute(SCHEMA_SQL)
        .context("Failed to create schema")?;
    Ok(())
}

/// Inserts an admin account with the given credentials unless the email is taken.
pub fn seed_admin(pool: &DbPool, email: &str, raw_password: &str) -> anyhow::Result<bool> {
    use crate::schema::users;

    let mut conn = pool.get().context("DB connection")?;
    let email = email.trim().to_lowercase();
    let exists = users::table
        .filter(users::email.eq(&email))
        .count()
        .get_result::<i64>(&mut conn)
        .context("DB error")?;
    if exists > 0 {
        return Ok(false);
    }

    let now = crate::utils::now();
    let data = NewUser {
        email: email.clone(),
        password: password::hash_password(raw_password)?,
        name: "Administrator".to_string(),
        phone: None,
        role: Role::Admin.as_str().to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    diesel::insert_into(users::table)
        .values(&data)
        .execute(&mut conn)
        .context("DB error")?;
    info!(%email, "seeded administrator account");

    Ok(true)
}
