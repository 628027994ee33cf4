mod requests;
pub mod responses;

use std::collections::HashMap;

use crate::{
    auth::AuthUser,
    database::{assert, get_db_conn},
    doctor::slots,
    error::ApiError,
    models::{
        appointments::{Appointment, AppointmentStatus, NewAppointment, UpdateAppointment},
        doctor_schedules::DAY_NAMES,
        doctors::Doctor,
        users::{Role, User},
    },
    protocol::{MessageResponse, PageQuery},
    schema::appointments,
    DbPool,
};
use actix_web::{delete, get, post, put, web};
use chrono::NaiveDate;
use diesel::{prelude::*, sqlite::Sqlite, SqliteConnection};
use tracing::info;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(book_appointment)
        .service(my_appointments)
        .service(cancel_appointment)
        .service(list_appointments)
        .service(update_status)
        .service(delete_appointment);
}

crate::api_funcs! {
    (post, book_appointment, "", Created, (pool: web::Data<DbPool>, auth: AuthUser, info: web::Json<BookAppointmentRequest>)),
    (get, my_appointments, "/my", Ok, (pool: web::Data<DbPool>, auth: AuthUser)),
    (put, cancel_appointment, "/{id}/cancel", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>)),
    (get, list_appointments, "", Ok, (pool: web::Data<DbPool>, auth: AuthUser, info: web::Query<AppointmentListQuery>, page: web::Query<PageQuery>)),
    (put, update_status, "/{id}/status", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>, info: web::Json<UpdateStatusRequest>)),
    (delete, delete_appointment, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>)),
}

/// Attaches patient and doctor names to appointment rows.
pub(crate) fn describe_appointments(
    conn: &mut SqliteConnection,
    rows: Vec<Appointment>,
) -> QueryResult<Vec<AppointmentItem>> {
    use crate::schema::{doctors, users};

    let doctor_ids: Vec<i32> = rows.iter().map(|a| a.doctor_id).collect();
    let patient_ids: Vec<i32> = rows.iter().map(|a| a.patient_id).collect();

    let doctors: HashMap<i32, (String, String)> = doctors::table
        .inner_join(users::table)
        .filter(doctors::id.eq_any(doctor_ids))
        .select((doctors::id, users::name, doctors::specialty))
        .load::<(i32, String, String)>(conn)?
        .into_iter()
        .map(|(id, name, specialty)| (id, (name, specialty)))
        .collect();
    let patients: HashMap<i32, User> = users::table
        .filter(users::id.eq_any(patient_ids))
        .load::<User>(conn)?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    Ok(rows
        .into_iter()
        .map(|data| {
            let (doctor_name, specialty) = doctors
                .get(&data.doctor_id)
                .cloned()
                .unwrap_or_default();
            let patient = patients.get(&data.patient_id);
            AppointmentItem {
                id: data.id,
                patient_id: data.patient_id,
                patient_name: patient.map(|p| p.name.clone()).unwrap_or_default(),
                patient_email: patient.map(|p| p.email.clone()).unwrap_or_default(),
                patient_phone: patient.and_then(|p| p.phone.clone()),
                doctor_id: data.doctor_id,
                doctor_name,
                specialty,
                appointment_date: crate::utils::format_date(&data.appointment_date),
                appointment_time: crate::utils::format_time(&data.appointment_time),
                reason: data.reason,
                notes: data.notes,
                status: data.status,
                created_at: crate::utils::format_time_str(&data.created_at),
                updated_at: crate::utils::format_time_str(&data.updated_at),
            }
        })
        .collect())
}

fn describe_one(conn: &mut SqliteConnection, data: Appointment) -> Result<AppointmentItem, ApiError> {
    describe_appointments(conn, vec![data])?
        .pop()
        .ok_or_else(|| ApiError::not_found("Appointment"))
}

async fn book_appointment_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    info: web::Json<BookAppointmentRequest>,
) -> Result<AppointmentResponse, ApiError> {
    use crate::schema::{doctors, users};

    auth.require(&[Role::Patient])?;
    let info = info.into_inner();
    let date = crate::utils::parse_date(&info.appointment_date)?;
    let time = crate::utils::parse_time(&info.appointment_time)?;
    if slots::has_started(date, time, crate::utils::local_now()) {
        return Err(ApiError::BadRequest(
            "Cannot book an appointment in the past".to_string(),
        ));
    }

    let now = crate::utils::now();
    let data = NewAppointment {
        patient_id: auth.id,
        doctor_id: info.doctor_id,
        appointment_date: date,
        appointment_time: time,
        reason: crate::utils::optional(info.reason),
        status: AppointmentStatus::Pending.as_str().to_string(),
        created_at: now,
        updated_at: now,
    };

    let mut conn = get_db_conn(&pool)?;
    let appointment = web::block(move || {
        conn.immediate_transaction::<_, ApiError, _>(|conn| {
            let (doctor, user) = doctors::table
                .inner_join(users::table)
                .filter(doctors::id.eq(data.doctor_id))
                .first::<(Doctor, User)>(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found("Doctor"))?;
            if !doctor.is_available || !user.is_active {
                return Err(ApiError::BadRequest(
                    "Doctor is not available for appointments".to_string(),
                ));
            }

            let plan = slots::load_day_plan(conn, doctor.id, date)?;
            let schedule = plan.schedule.as_ref().ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "Doctor does not work on {}",
                    DAY_NAMES[slots::day_of_week(date) as usize]
                ))
            })?;
            if !slots::slot_times(schedule.start_time, schedule.end_time).contains(&time) {
                return Err(ApiError::BadRequest(
                    "Requested time is not a valid slot".to_string(),
                ));
            }
            if plan.booked.contains(&time) {
                return Err(ApiError::Conflict(
                    "This time slot is already booked".to_string(),
                ));
            }
            if plan.is_full() {
                return Err(ApiError::Conflict(
                    "No more appointments available on this date".to_string(),
                ));
            }

            let appointment = diesel::insert_into(appointments::table)
                .values(&data)
                .get_result::<Appointment>(conn)?;
            describe_one(conn, appointment)
        })
    })
    .await??;
    info!(
        appointment_id = appointment.id,
        doctor_id = appointment.doctor_id,
        patient_id = appointment.patient_id,
        "appointment booked"
    );

    Ok(AppointmentResponse { appointment })
}

async fn my_appointments_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
) -> Result<AppointmentsResponse, ApiError> {
    let mut conn = get_db_conn(&pool)?;
    let appointments = web::block(move || {
        let rows = appointments::table
            .filter(appointments::patient_id.eq(auth.id))
            .order((
                appointments::appointment_date.desc(),
                appointments::appointment_time.desc(),
            ))
            .load::<Appointment>(&mut conn)?;
        describe_appointments(&mut conn, rows)
    })
    .await??;

    Ok(AppointmentsResponse { appointments })
}

async fn cancel_appointment_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<AppointmentResponse, ApiError> {
    let appointment_id = path.into_inner();

    let mut conn = get_db_conn(&pool)?;
    let appointment = web::block(move || {
        conn.transaction::<_, ApiError, _>(|conn| {
            let current = appointments::table
                .find(appointment_id)
                .first::<Appointment>(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found("Appointment"))?;
            if current.patient_id != auth.id {
                return Err(ApiError::Forbidden(
                    "You can only cancel your own appointments".to_string(),
                ));
            }
            let status: AppointmentStatus = current.status.parse()?;
            if !status.is_cancellable() {
                return Err(ApiError::BadRequest(format!(
                    "Cannot cancel an appointment that is {}",
                    status
                )));
            }

            let data = UpdateAppointment {
                status: Some(AppointmentStatus::Cancelled.as_str().to_string()),
                updated_at: Some(crate::utils::now()),
                ..Default::default()
            };
            let appointment = diesel::update(appointments::table.find(appointment_id))
                .set(&data)
                .get_result::<Appointment>(conn)?;
            describe_one(conn, appointment)
        })
    })
    .await??;
    info!(appointment_id, "appointment cancelled by patient");

    Ok(AppointmentResponse { appointment })
}

struct AppointmentFilter {
    status: Option<AppointmentStatus>,
    doctor_id: Option<i32>,
    date: Option<NaiveDate>,
}

impl AppointmentFilter {
    fn query(&self) -> appointments::BoxedQuery<'static, Sqlite> {
        let mut query = appointments::table.into_boxed();
        if let Some(status) = self.status {
            query = query.filter(appointments::status.eq(status.as_str()));
        }
        if let Some(doctor_id) = self.doctor_id {
            query = query.filter(appointments::doctor_id.eq(doctor_id));
        }
        if let Some(date) = self.date {
            query = query.filter(appointments::appointment_date.eq(date));
        }
        query
    }
}

async fn list_appointments_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    info: web::Query<AppointmentListQuery>,
    page: web::Query<PageQuery>,
) -> Result<AppointmentListResponse, ApiError> {
    auth.require_admin()?;
    let info = info.into_inner();
    let filter = AppointmentFilter {
        status: crate::utils::optional(info.status)
            .map(|s| s.parse::<AppointmentStatus>())
            .transpose()?,
        doctor_id: info.doctor_id,
        date: crate::utils::parse_date_opt(info.date)?,
    };
    let (offset, limit) = (page.offset(), page.limit());

    let mut conn = get_db_conn(&pool)?;
    let (appointments, total) = web::block(move || {
        let total = filter.query().count().get_result::<i64>(&mut conn)?;
        let rows = filter
            .query()
            .order((
                appointments::appointment_date.desc(),
                appointments::appointment_time.desc(),
            ))
            .offset(offset)
            .limit(limit)
            .load::<Appointment>(&mut conn)?;
        Ok::<_, ApiError>((describe_appointments(&mut conn, rows)?, total))
    })
    .await??;

    Ok(AppointmentListResponse {
        appointments,
        total,
    })
}

async fn update_status_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
    info: web::Json<UpdateStatusRequest>,
) -> Result<AppointmentResponse, ApiError> {
    auth.require_admin()?;
    let appointment_id = path.into_inner();
    let info = info.into_inner();
    let status: AppointmentStatus = info.status.trim().parse()?;
    assert::assert_appointment(&pool, appointment_id).await?;

    let data = UpdateAppointment {
        status: Some(status.as_str().to_string()),
        notes: crate::utils::optional(info.notes),
        updated_at: Some(crate::utils::now()),
    };

    let mut conn = get_db_conn(&pool)?;
    let appointment = web::block(move || {
        let appointment = diesel::update(appointments::table.find(appointment_id))
            .set(&data)
            .get_result::<Appointment>(&mut conn)?;
        describe_one(&mut conn, appointment)
    })
    .await??;
    info!(appointment_id, status = %status, "appointment status updated");

    Ok(AppointmentResponse { appointment })
}

async fn delete_appointment_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<MessageResponse, ApiError> {
    auth.require_admin()?;
    let appointment_id = path.into_inner();
    assert::assert_appointment(&pool, appointment_id).await?;

    let mut conn = get_db_conn(&pool)?;
    web::block(move || {
        diesel::delete(appointments::table.find(appointment_id)).execute(&mut conn)
    })
    .await??;
    info!(appointment_id, "appointment deleted");

    Ok(MessageResponse::ok("Appointment deleted"))
}
