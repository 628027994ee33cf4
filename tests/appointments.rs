#[macro_use]
mod common;

use actix_web::http::StatusCode;
use common::*;
use hospital_server::models::users::Role;
use serde_json::{json, Value};

fn available_times(body: &Value) -> Vec<String> {
    body["slots"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|slot| slot["available"] == true)
        .map(|slot| slot["time"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn admin_manages_doctors_and_schedules() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    ctx.insert_user("Root", "root@example.com", Role::Admin);
    ctx.insert_user("Pat", "pat@example.com", Role::Patient);
    let admin = login(&app, "root@example.com").await;
    let patient = login(&app, "pat@example.com").await;

    let doctor = json!({
        "name": "Dr. House",
        "email": "house@example.com",
        "password": PASSWORD,
        "specialty": "Diagnostics",
        "experienceYears": 12,
    });
    let (status, _) = send(&app, post("/api/doctors", Some(&patient), doctor.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, post("/api/doctors", Some(&admin), doctor)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let doctor_id = body["doctor"]["id"].as_i64().unwrap();
    assert_eq!(body["doctor"]["name"], "Dr. House");
    assert_eq!(body["doctor"]["isAvailable"], true);

    // the new account can log in as a doctor
    let (status, body) = send(
        &app,
        post(
            "/api/auth/login",
            None,
            json!({ "email": "house@example.com", "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "doctor");

    let uri = format!("/api/doctors/{}/schedules", doctor_id);
    let (status, body) = send(
        &app,
        put(
            &uri,
            Some(&admin),
            json!({ "schedules": [
                { "dayOfWeek": 1, "startTime": "09:00", "endTime": "12:00", "maxPatients": 4 },
                { "dayOfWeek": 1, "startTime": "13:00", "endTime": "15:00" },
            ]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Duplicate schedule for Monday");

    let (status, body) = send(
        &app,
        put(
            &uri,
            Some(&admin),
            json!({ "schedules": [
                { "dayOfWeek": 1, "startTime": "09:00", "endTime": "12:00", "maxPatients": 4 },
                { "dayOfWeek": 3, "startTime": "13:00", "endTime": "15:00" },
            ]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["schedules"].as_array().unwrap().len(), 2);

    let (status, body) = send(&app, get(&format!("/api/doctors/{}", doctor_id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["schedules"][0]["dayName"], "Monday");
    assert_eq!(body["schedules"][1]["maxPatients"], 16);

    let (status, body) = send(&app, get("/api/doctors?specialty=Diagnostics", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctors"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, get("/api/doctors?search=_", None)).await;
    assert!(body["doctors"].as_array().unwrap().is_empty());
    let (_, body) = send(&app, get("/api/doctors?specialty=%25", None)).await;
    assert!(body["doctors"].as_array().unwrap().is_empty());

    let (_, body) = send(&app, get("/api/doctors/specialties", None)).await;
    assert_eq!(body["specialties"], json!(["Diagnostics"]));

    let (status, body) = send(
        &app,
        put(
            &format!("/api/doctors/{}", doctor_id),
            Some(&admin),
            json!({ "isAvailable": false, "name": "Gregory House" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctor"]["isAvailable"], false);
    assert_eq!(body["doctor"]["name"], "Gregory House");

    let (status, _) = send(&app, delete(&format!("/api/doctors/{}", doctor_id), Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get(&format!("/api/doctors/{}", doctor_id), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn booking_consumes_a_slot() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let date = future_date(7);
    let doctor_id = ctx.insert_doctor("Dr. Who", "who@example.com", "General");
    ctx.insert_schedule(doctor_id, date, "09:00", "11:00", 16);
    ctx.insert_user("Pat", "pat@example.com", Role::Patient);
    ctx.insert_user("Sam", "sam@example.com", Role::Patient);
    let pat = login(&app, "pat@example.com").await;
    let sam = login(&app, "sam@example.com").await;

    let slots_uri = format!("/api/doctors/{}/slots?date={}", doctor_id, date);
    let (status, body) = send(&app, get(&slots_uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(available_times(&body), ["09:00", "09:30", "10:00", "10:30"]);

    let booking = json!({
        "doctorId": doctor_id,
        "appointmentDate": date.to_string(),
        "appointmentTime": "09:30",
        "reason": "Checkup",
    });
    let (status, body) = send(&app, post("/api/appointments", Some(&pat), booking.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["appointment"]["status"], "pending");
    assert_eq!(body["appointment"]["doctorName"], "Dr. Who");
    assert_eq!(body["appointment"]["appointmentTime"], "09:30");
    let appointment_id = body["appointment"]["id"].as_i64().unwrap();

    let (_, body) = send(&app, get(&slots_uri, None)).await;
    assert_eq!(available_times(&body), ["09:00", "10:00", "10:30"]);
    assert_eq!(body["booked"], 1);

    let (status, body) = send(&app, post("/api/appointments", Some(&sam), booking)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "This time slot is already booked");

    // only the owner may cancel
    let cancel_uri = format!("/api/appointments/{}/cancel", appointment_id);
    let (status, _) = send(&app, put(&cancel_uri, Some(&sam), json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, put(&cancel_uri, Some(&pat), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status"], "cancelled");

    let (status, _) = send(&app, put(&cancel_uri, Some(&pat), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, get(&slots_uri, None)).await;
    assert_eq!(available_times(&body).len(), 4);

    let (status, body) = send(&app, get("/api/appointments/my", Some(&pat))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointments"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn unavailable_doctor_offers_no_slots() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let date = future_date(7);
    let doctor_id = ctx.insert_doctor("Dr. Who", "who@example.com", "General");
    ctx.insert_schedule(doctor_id, date, "09:00", "10:00", 16);
    ctx.insert_user("Root", "root@example.com", Role::Admin);
    ctx.insert_user("Pat", "pat@example.com", Role::Patient);
    let admin = login(&app, "root@example.com").await;
    let pat = login(&app, "pat@example.com").await;

    let (status, _) = send(
        &app,
        put(
            &format!("/api/doctors/{}", doctor_id),
            Some(&admin),
            json!({ "isAvailable": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let slots_uri = format!("/api/doctors/{}/slots?date={}", doctor_id, date);
    let (status, body) = send(&app, get(&slots_uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["slots"].as_array().unwrap().len(), 2);
    assert!(available_times(&body).is_empty());

    let (status, body) = send(
        &app,
        post(
            "/api/appointments",
            Some(&pat),
            json!({ "doctorId": doctor_id, "appointmentDate": date.to_string(), "appointmentTime": "09:00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Doctor is not available for appointments");

    let (status, _) = send(
        &app,
        put(
            &format!("/api/doctors/{}", doctor_id),
            Some(&admin),
            json!({ "isAvailable": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, get(&slots_uri, None)).await;
    assert_eq!(available_times(&body), ["09:00", "09:30"]);
}

#[actix_web::test]
async fn booking_rejects_invalid_requests() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let date = future_date(7);
    let doctor_id = ctx.insert_doctor("Dr. Who", "who@example.com", "General");
    ctx.insert_schedule(doctor_id, date, "09:00", "11:00", 1);
    ctx.insert_user("Pat", "pat@example.com", Role::Patient);
    let pat = login(&app, "pat@example.com").await;

    let book = |date: String, time: &str| {
        post(
            "/api/appointments",
            Some(&pat),
            json!({ "doctorId": doctor_id, "appointmentDate": date, "appointmentTime": time }),
        )
    };

    let (status, body) = send(&app, book(future_date(-1).to_string(), "09:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot book an appointment in the past");

    let (status, body) = send(&app, book(date.to_string(), "09:15")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Requested time is not a valid slot");

    let (status, _) = send(&app, book(date.to_string(), "10:45")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, book(future_date(8).to_string(), "09:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Doctor does not work on"));

    let (status, _) = send(&app, book(date.to_string(), "09:00")).await;
    assert_eq!(status, StatusCode::CREATED);

    // max_patients is 1, so the rest of the day is gone
    let (status, body) = send(&app, book(date.to_string(), "10:00")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "No more appointments available on this date");

    let (_, body) = send(
        &app,
        get(&format!("/api/doctors/{}/slots?date={}", doctor_id, date), None),
    )
    .await;
    assert_eq!(body["available"], false);
    assert!(available_times(&body).is_empty());

    let (status, _) = send(
        &app,
        post(
            "/api/appointments",
            Some(&pat),
            json!({ "doctorId": 9999, "appointmentDate": date.to_string(), "appointmentTime": "09:00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn only_patients_book() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let date = future_date(7);
    let doctor_id = ctx.insert_doctor("Dr. Who", "who@example.com", "General");
    ctx.insert_schedule(doctor_id, date, "09:00", "11:00", 16);
    ctx.insert_user("Helen", "hr@example.com", Role::Hr);
    let hr = login(&app, "hr@example.com").await;

    let (status, _) = send(
        &app,
        post(
            "/api/appointments",
            Some(&hr),
            json!({ "doctorId": doctor_id, "appointmentDate": date.to_string(), "appointmentTime": "09:00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admin_and_doctor_views() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let date = future_date(7);
    let doctor_id = ctx.insert_doctor("Dr. Who", "who@example.com", "General");
    ctx.insert_schedule(doctor_id, date, "09:00", "11:00", 16);
    ctx.insert_user("Root", "root@example.com", Role::Admin);
    ctx.insert_user("Pat", "pat@example.com", Role::Patient);
    let admin = login(&app, "root@example.com").await;
    let pat = login(&app, "pat@example.com").await;
    let doctor = login(&app, "who@example.com").await;

    for time in ["09:00", "10:00"] {
        let (status, _) = send(
            &app,
            post(
                "/api/appointments",
                Some(&pat),
                json!({ "doctorId": doctor_id, "appointmentDate": date.to_string(), "appointmentTime": time }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(&app, get("/api/appointments", Some(&pat))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, get("/api/appointments?limit=1", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["appointments"].as_array().unwrap().len(), 1);
    let appointment_id = body["appointments"][0]["id"].as_i64().unwrap();
    assert_eq!(body["appointments"][0]["patientName"], "Pat");

    let status_uri = format!("/api/appointments/{}/status", appointment_id);
    let (status, body) = send(&app, put(&status_uri, Some(&admin), json!({ "status": "done" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid appointment status: done");

    let (status, body) = send(
        &app,
        put(
            &status_uri,
            Some(&admin),
            json!({ "status": "approved", "notes": "Bring previous results" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status"], "approved");
    assert_eq!(body["appointment"]["notes"], "Bring previous results");

    let (status, body) = send(&app, get("/api/appointments?status=approved", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let (status, body) = send(&app, get("/api/doctors/me/appointments", Some(&doctor))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["appointments"].as_array().unwrap().len(), 2);
    assert_eq!(body["appointments"][0]["appointmentTime"], "09:00");

    let (status, _) = send(&app, get("/api/doctors/me/appointments", Some(&pat))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        delete(&format!("/api/appointments/{}", appointment_id), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, get("/api/appointments", Some(&admin))).await;
    assert_eq!(body["total"], 1);
}
