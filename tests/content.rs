#[macro_use]
mod common;

use actix_web::http::StatusCode;
use common::*;
use hospital_server::models::users::Role;
use serde_json::json;

#[actix_web::test]
async fn news_slugs_and_publishing() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    ctx.insert_user("Root", "root@example.com", Role::Admin);
    let admin = login(&app, "root@example.com").await;

    let (status, body) = send(
        &app,
        post(
            "/api/news",
            Some(&admin),
            json!({ "title": "New MRI Wing Opens!", "content": "The   new wing\nis open.", "isPublished": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["article"]["slug"], "new-mri-wing-opens");
    assert_eq!(body["article"]["excerpt"], "The new wing is open.");
    assert_eq!(body["article"]["category"], "general");
    assert!(body["article"]["publishedAt"].is_string());

    let (status, body) = send(
        &app,
        post(
            "/api/news",
            Some(&admin),
            json!({ "title": "New MRI wing opens", "content": "Draft follow-up", "category": "events" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["article"]["slug"], "new-mri-wing-opens-2");
    assert!(body["article"]["publishedAt"].is_null());
    let draft_id = body["article"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, get("/api/news", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    let (status, _) = send(&app, get("/api/news/new-mri-wing-opens-2", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, get("/api/news/all", Some(&admin))).await;
    assert_eq!(body["total"], 2);

    let (status, body) = send(
        &app,
        put(
            &format!("/api/news/{}", draft_id),
            Some(&admin),
            json!({ "isPublished": true, "title": "Open day" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["article"]["slug"], "open-day");
    assert!(body["article"]["publishedAt"].is_string());

    let (_, body) = send(&app, get("/api/news?category=events", None)).await;
    assert_eq!(body["total"], 1);
    let (status, body) = send(&app, get("/api/news/open-day", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["article"]["content"], "Draft follow-up");

    let (status, _) = send(&app, delete(&format!("/api/news/{}", draft_id), Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, delete(&format!("/api/news/{}", draft_id), Some(&admin))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn news_requires_admin() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    ctx.insert_user("Helen", "hr@example.com", Role::Hr);
    let hr = login(&app, "hr@example.com").await;

    let (status, _) = send(
        &app,
        post("/api/news", Some(&hr), json!({ "title": "T", "content": "C" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, post("/api/news", None, json!({ "title": "T", "content": "C" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn titles_named_like_routes_stay_reachable() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    ctx.insert_user("Root", "root@example.com", Role::Admin);
    let admin = login(&app, "root@example.com").await;

    let (status, body) = send(
        &app,
        post(
            "/api/news",
            Some(&admin),
            json!({ "title": "All", "content": "Everyone is welcome", "isPublished": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["article"]["slug"], "all-2");
    let (status, body) = send(&app, get("/api/news/all-2", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["article"]["title"], "All");

    let (status, body) = send(
        &app,
        post(
            "/api/services",
            Some(&admin),
            json!({ "name": "ALL!", "description": "Everything" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["service"]["slug"], "all-2");
    let (status, _) = send(&app, get("/api/services/all-2", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn services_are_listed_by_display_order() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    ctx.insert_user("Root", "root@example.com", Role::Admin);
    let admin = login(&app, "root@example.com").await;

    for (name, order, active) in [("Radiology", 2, true), ("Cardiology", 1, true), ("Dental", 0, false)] {
        let (status, body) = send(
            &app,
            post(
                "/api/services",
                Some(&admin),
                json!({ "name": name, "description": "Care", "displayOrder": order, "isActive": active }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }

    let (status, body) = send(&app, get("/api/services", None)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body["services"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Cardiology", "Radiology"]);

    let (_, body) = send(&app, get("/api/services/all", Some(&admin))).await;
    assert_eq!(body["services"].as_array().unwrap().len(), 3);

    let (status, body) = send(&app, get("/api/services/cardiology", None)).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["service"]["id"].as_i64().unwrap();
    let (status, _) = send(&app, get("/api/services/dental", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        put(
            &format!("/api/services/{}", id),
            Some(&admin),
            json!({ "name": "Heart Care" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"]["slug"], "heart-care");

    let (status, _) = send(&app, delete(&format!("/api/services/{}", id), Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, get("/api/services", None)).await;
    assert_eq!(body["services"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn only_one_story_is_active() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    ctx.insert_user("Root", "root@example.com", Role::Admin);
    let admin = login(&app, "root@example.com").await;

    let (status, body) = send(&app, get("/api/sch-stories/active", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["story"].is_null());

    let (_, body) = send(
        &app,
        post(
            "/api/sch-stories",
            Some(&admin),
            json!({ "title": "First", "isActive": true }),
        ),
    )
    .await;
    let first = body["story"]["id"].as_i64().unwrap();
    let (status, body) = send(
        &app,
        post(
            "/api/sch-stories",
            Some(&admin),
            json!({ "title": "Second", "videoUrl": "/uploads/videos/a.mp4", "isActive": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let second = body["story"]["id"].as_i64().unwrap();

    let (_, body) = send(&app, get("/api/sch-stories/active", None)).await;
    assert_eq!(body["story"]["id"], second);

    let (status, body) = send(
        &app,
        put(&format!("/api/sch-stories/{}/activate", first), Some(&admin), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["story"]["isActive"], true);

    let (_, body) = send(&app, get("/api/sch-stories", Some(&admin))).await;
    let active: Vec<_> = body["stories"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["isActive"] == true)
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert_eq!(active, [first]);

    let (status, _) = send(
        &app,
        put(&format!("/api/sch-stories/{}/activate", 9999), Some(&admin), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, delete(&format!("/api/sch-stories/{}", first), Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, get("/api/sch-stories/active", None)).await;
    assert!(body["story"].is_null());
}
