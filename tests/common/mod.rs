#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test::{self, TestRequest},
};
use chrono::{Duration, NaiveDate};
use diesel::prelude::*;
use hospital_server::{
    auth::password,
    config::Config,
    database,
    models::{
        doctors::NewDoctor,
        doctor_schedules::NewSchedule,
        users::{NewUser, Role},
    },
    schema::{doctor_schedules, doctors, users},
    AppState, DbPool,
};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const PASSWORD: &str = "password123";

/// A fresh database and upload directory per test.
pub struct TestContext {
    pub dir: TempDir,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config {
            bind_address: "127.0.0.1:0".to_string(),
            database_url: dir.path().join("test.db").to_string_lossy().into_owned(),
            jwt_secret: "integration-test-secret".to_string(),
            jwt_expiry_hours: 1,
            upload_dir: dir.path().join("uploads"),
            ai_api_key: None,
            ai_api_url: "http://127.0.0.1:9/v1".to_string(),
            ai_model: "test-model".to_string(),
            ai_timeout_secs: 2,
            admin_email: None,
            admin_password: None,
        };
        customize(&mut config);
        std::fs::create_dir_all(&config.upload_dir).unwrap();

        let pool = database::build_pool(&config.database_url).unwrap();
        database::init_schema(&pool).unwrap();
        let state = AppState::new(pool, config).unwrap();

        Self { dir, state }
    }

    pub fn pool(&self) -> &DbPool {
        &self.state.pool
    }

    pub fn insert_user(&self, name: &str, email: &str, role: Role) -> i32 {
        let now = chrono::Utc::now().naive_utc();
        let data = NewUser {
            email: email.to_string(),
            password: password::hash_password(PASSWORD).unwrap(),
            name: name.to_string(),
            phone: None,
            role: role.as_str().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let mut conn = self.pool().get().unwrap();
        diesel::insert_into(users::table)
            .values(&data)
            .returning(users::id)
            .get_result::<i32>(&mut conn)
            .unwrap()
    }

    /// A doctor account with its profile; returns the doctor id.
    pub fn insert_doctor(&self, name: &str, email: &str, specialty: &str) -> i32 {
        let user_id = self.insert_user(name, email, Role::Doctor);
        let now = chrono::Utc::now().naive_utc();
        let data = NewDoctor {
            user_id,
            specialty: specialty.to_string(),
            department: None,
            qualification: None,
            experience_years: 5,
            bio: None,
            image_url: None,
            is_available: true,
            created_at: now,
            updated_at: now,
        };
        let mut conn = self.pool().get().unwrap();
        diesel::insert_into(doctors::table)
            .values(&data)
            .returning(doctors::id)
            .get_result::<i32>(&mut conn)
            .unwrap()
    }

    pub fn insert_schedule(&self, doctor_id: i32, date: NaiveDate, start: &str, end: &str, max_patients: i32) {
        let data = NewSchedule {
            doctor_id,
            day_of_week: hospital_server::doctor::slots::day_of_week(date),
            start_time: chrono::NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            end_time: chrono::NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
            max_patients,
        };
        let mut conn = self.pool().get().unwrap();
        diesel::insert_into(doctor_schedules::table)
            .values(&data)
            .execute(&mut conn)
            .unwrap();
    }
}

/// Builds the full application for a `TestContext`.
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new().configure(|cfg| $ctx.state.configure(cfg)),
        )
        .await
    };
}

pub fn future_date(days: i64) -> NaiveDate {
    chrono::Local::now().date_naive() + Duration::days(days)
}

pub fn with_token(req: TestRequest, token: Option<&str>) -> TestRequest {
    match token {
        Some(token) => req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token))),
        None => req,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> TestRequest {
    with_token(TestRequest::get().uri(uri), token)
}

pub fn post(uri: &str, token: Option<&str>, body: Value) -> TestRequest {
    with_token(TestRequest::post().uri(uri).set_json(body), token)
}

pub fn put(uri: &str, token: Option<&str>, body: Value) -> TestRequest {
    with_token(TestRequest::put().uri(uri).set_json(body), token)
}

pub fn delete(uri: &str, token: Option<&str>) -> TestRequest {
    with_token(TestRequest::delete().uri(uri), token)
}

/// Sends a request and returns the status with the JSON body (`Null` when empty).
pub async fn send<S>(app: &S, req: TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

pub async fn login<S>(app: &S, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        post(
            "/api/auth/login",
            None,
            json!({ "email": email, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}
