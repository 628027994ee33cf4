#[macro_use]
mod common;

use actix_web::http::StatusCode;
use common::*;
use hospital_server::models::users::Role;
use serde_json::json;

#[actix_web::test]
async fn admin_creates_and_lists_users() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    ctx.insert_user("Root", "root@example.com", Role::Admin);
    ctx.insert_user("Pat", "pat@example.com", Role::Patient);
    let admin = login(&app, "root@example.com").await;
    let pat = login(&app, "pat@example.com").await;

    let (status, _) = send(&app, get("/api/users", Some(&pat))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        post(
            "/api/users",
            Some(&admin),
            json!({ "name": "Helen", "email": "helen@example.com", "password": PASSWORD, "role": "hr" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["user"]["role"], "hr");
    login(&app, "helen@example.com").await;

    let (status, body) = send(
        &app,
        post(
            "/api/users",
            Some(&admin),
            json!({ "name": "Doc", "email": "doc@example.com", "password": PASSWORD, "role": "doctor" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Doctor accounts are managed through /api/doctors");

    let (status, _) = send(
        &app,
        post(
            "/api/users",
            Some(&admin),
            json!({ "name": "Dup", "email": "pat@example.com", "password": PASSWORD, "role": "patient" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, get("/api/users", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);

    let (_, body) = send(&app, get("/api/users?role=hr", Some(&admin))).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["users"][0]["email"], "helen@example.com");

    let (_, body) = send(&app, get("/api/users?search=pat", Some(&admin))).await;
    assert_eq!(body["total"], 1);
    let (_, body) = send(&app, get("/api/users?search=_", Some(&admin))).await;
    assert_eq!(body["total"], 0);

    let (status, _) = send(&app, get("/api/users?role=nurse", Some(&admin))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn deactivation_ends_the_session() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    ctx.insert_user("Root", "root@example.com", Role::Admin);
    let pat_id = ctx.insert_user("Pat", "pat@example.com", Role::Patient);
    let admin = login(&app, "root@example.com").await;
    let pat = login(&app, "pat@example.com").await;

    let (status, body) = send(
        &app,
        put(
            &format!("/api/users/{}", pat_id),
            Some(&admin),
            json!({ "isActive": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["isActive"], false);

    let (status, _) = send(&app, get("/api/auth/me", Some(&pat))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        put(
            &format!("/api/users/{}", pat_id),
            Some(&admin),
            json!({ "isActive": true, "role": "hr" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let hr = login(&app, "pat@example.com").await;
    let (status, _) = send(&app, get("/api/jobs/all", Some(&hr))).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn admin_cannot_lock_themselves_out() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let admin_id = ctx.insert_user("Root", "root@example.com", Role::Admin);
    let admin = login(&app, "root@example.com").await;
    let uri = format!("/api/users/{}", admin_id);

    let (status, _) = send(&app, put(&uri, Some(&admin), json!({ "role": "patient" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, put(&uri, Some(&admin), json!({ "isActive": false }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = send(&app, delete(&uri, Some(&admin))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You cannot delete your own account");
}

#[actix_web::test]
async fn password_reset_and_delete() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    ctx.insert_user("Root", "root@example.com", Role::Admin);
    let pat_id = ctx.insert_user("Pat", "pat@example.com", Role::Patient);
    let admin = login(&app, "root@example.com").await;
    let pat = login(&app, "pat@example.com").await;

    let (status, _) = send(
        &app,
        put(
            &format!("/api/users/{}/password", pat_id),
            Some(&admin),
            json!({ "password": "brand-new-secret" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get("/api/auth/me", Some(&pat))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &app,
        post(
            "/api/auth/login",
            None,
            json!({ "email": "pat@example.com", "password": "brand-new-secret" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/users/{}", pat_id);
    let (status, _) = send(&app, delete(&uri, Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get(&uri, Some(&admin))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
