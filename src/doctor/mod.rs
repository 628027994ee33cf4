mod requests;
pub mod responses;
pub mod slots;

use crate::{
    appointment::describe_appointments,
    auth::{insert_user, normalize_email, password, AuthUser},
    database::{assert, get_db_conn},
    error::ApiError,
    models::{
        appointments::{Appointment, AppointmentStatus},
        doctor_schedules::{NewSchedule, Schedule, DAY_NAMES},
        doctors::{Doctor, NewDoctor, UpdateDoctor},
        users::{NewUser, Role, UpdateUser, User},
    },
    protocol::{MessageResponse, PageQuery},
    utils::LIKE_ESCAPE,
    DbPool,
};
use actix_web::{delete, get, post, put, web};
use diesel::{prelude::*, SqliteConnection};
use tracing::info;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(search_doctor)
        .service(list_specialties)
        .service(my_appointments)
        .service(view_doctor)
        .service(view_slots)
        .service(create_doctor)
        .service(update_doctor)
        .service(delete_doctor)
        .service(set_schedules);
}

crate::api_funcs! {
    (get, search_doctor, "", Ok, (pool: web::Data<DbPool>, info: web::Query<SearchDoctorQuery>, page: web::Query<PageQuery>)),
    (get, list_specialties, "/specialties", Ok, (pool: web::Data<DbPool>)),
    (get, my_appointments, "/me/appointments", Ok, (pool: web::Data<DbPool>, auth: AuthUser, info: web::Query<DoctorAppointmentsQuery>)),
    (get, view_doctor, "/{id}", Ok, (pool: web::Data<DbPool>, path: web::Path<i32>)),
    (get, view_slots, "/{id}/slots", Ok, (pool: web::Data<DbPool>, path: web::Path<i32>, info: web::Query<SlotsQuery>)),
    (post, create_doctor, "", Created, (pool: web::Data<DbPool>, auth: AuthUser, info: web::Json<CreateDoctorRequest>)),
    (put, update_doctor, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>, info: web::Json<UpdateDoctorRequest>)),
    (delete, delete_doctor, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>)),
    (put, set_schedules, "/{id}/schedules", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>, info: web::Json<SetSchedulesRequest>)),
}

fn find_doctor(conn: &mut SqliteConnection, doctor_id: i32) -> Result<(Doctor, User), ApiError> {
    use crate::schema::{doctors, users};

    doctors::table
        .inner_join(users::table)
        .filter(doctors::id.eq(doctor_id))
        .first::<(Doctor, User)>(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Doctor"))
}

async fn search_doctor_impl(
    pool: web::Data<DbPool>,
    info: web::Query<SearchDoctorQuery>,
    page: web::Query<PageQuery>,
) -> Result<SearchDoctorResponse, ApiError> {
    use crate::schema::{doctors, users};

    let info = info.into_inner();
    let specialty_pattern = crate::utils::get_str_pattern_opt(info.specialty);
    let name_pattern = crate::utils::get_str_pattern_opt(info.search);

    let mut conn = get_db_conn(&pool)?;
    let doctors = web::block(move || {
        doctors::table
            .inner_join(users::table)
            .filter(doctors::is_available.eq(true))
            .filter(users::is_active.eq(true))
            .filter(doctors::specialty.like(specialty_pattern).escape(LIKE_ESCAPE))
            .filter(users::name.like(name_pattern).escape(LIKE_ESCAPE))
            .order(users::name.asc())
            .offset(page.offset())
            .limit(page.limit())
            .load::<(Doctor, User)>(&mut conn)
    })
    .await??;

    Ok(SearchDoctorResponse {
        doctors: doctors.into_iter().map(DoctorItem::from).collect(),
    })
}

async fn list_specialties_impl(pool: web::Data<DbPool>) -> Result<SpecialtiesResponse, ApiError> {
    use crate::schema::{doctors, users};

    let mut conn = get_db_conn(&pool)?;
    let specialties = web::block(move || {
        doctors::table
            .inner_join(users::table)
            .filter(doctors::is_available.eq(true))
            .filter(users::is_active.eq(true))
            .select(doctors::specialty)
            .distinct()
            .order(doctors::specialty.asc())
            .load::<String>(&mut conn)
    })
    .await??;

    Ok(SpecialtiesResponse { specialties })
}

async fn my_appointments_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    info: web::Query<DoctorAppointmentsQuery>,
) -> Result<DoctorAppointmentsResponse, ApiError> {
    use crate::schema::{appointments, doctors};

    auth.require(&[Role::Doctor])?;
    let info = info.into_inner();
    let date = crate::utils::parse_date_opt(info.date)?;
    let status = crate::utils::optional(info.status)
        .map(|s| s.parse::<AppointmentStatus>())
        .transpose()?;

    let mut conn = get_db_conn(&pool)?;
    let appointments = web::block(move || {
        let doctor_id = doctors::table
            .filter(doctors::user_id.eq(auth.id))
            .select(doctors::id)
            .first::<i32>(&mut conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Doctor profile"))?;

        let mut query = appointments::table
            .filter(appointments::doctor_id.eq(doctor_id))
            .into_boxed();
        if let Some(date) = date {
            query = query.filter(appointments::appointment_date.eq(date));
        }
        if let Some(status) = status {
            query = query.filter(appointments::status.eq(status.as_str()));
        }
        let rows = query
            .order((
                appointments::appointment_date.asc(),
                appointments::appointment_time.asc(),
            ))
            .load::<Appointment>(&mut conn)?;

        Ok::<_, ApiError>(describe_appointments(&mut conn, rows)?)
    })
    .await??;

    Ok(DoctorAppointmentsResponse { appointments })
}

async fn view_doctor_impl(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<DoctorDetailResponse, ApiError> {
    use crate::schema::doctor_schedules;

    let doctor_id = path.into_inner();
    let mut conn = get_db_conn(&pool)?;
    let (doctor, schedules) = web::block(move || {
        let doctor = find_doctor(&mut conn, doctor_id)?;
        let schedules = doctor_schedules::table
            .filter(doctor_schedules::doctor_id.eq(doctor_id))
            .order(doctor_schedules::day_of_week.asc())
            .load::<Schedule>(&mut conn)?;
        Ok::<_, ApiError>((doctor, schedules))
    })
    .await??;

    Ok(DoctorDetailResponse {
        doctor: doctor.into(),
        schedules: schedules.into_iter().map(ScheduleItem::from).collect(),
    })
}

async fn view_slots_impl(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    info: web::Query<SlotsQuery>,
) -> Result<SlotsResponse, ApiError> {
    let doctor_id = path.into_inner();
    let date = crate::utils::parse_date(&info.date)?;
    assert::assert_doctor(&pool, doctor_id).await?;

    let mut conn = get_db_conn(&pool)?;
    let plan = web::block(move || slots::load_day_plan(&mut conn, doctor_id, date)).await??;

    let day_of_week = slots::day_of_week(date);
    let slots = plan
        .slots(crate::utils::local_now())
        .into_iter()
        .map(|slot| SlotItem {
            time: crate::utils::format_time(&slot.time),
            available: slot.available,
        })
        .collect::<Vec<_>>();

    Ok(SlotsResponse {
        doctor_id,
        date: crate::utils::format_date(&date),
        day_of_week,
        day_name: DAY_NAMES[day_of_week as usize],
        available: slots.iter().any(|slot| slot.available),
        start_time: plan
            .schedule
            .as_ref()
            .map(|s| crate::utils::format_time(&s.start_time)),
        end_time: plan
            .schedule
            .as_ref()
            .map(|s| crate::utils::format_time(&s.end_time)),
        max_patients: plan.schedule.as_ref().map(|s| s.max_patients),
        booked: plan.booked.len(),
        slots,
    })
}

async fn create_doctor_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    info: web::Json<CreateDoctorRequest>,
) -> Result<DoctorResponse, ApiError> {
    use crate::schema::doctors;

    auth.require_admin()?;
    let info = info.into_inner();
    let name = crate::utils::required(&info.name, "Name")?;
    let email = normalize_email(&info.email)?;
    crate::utils::assert_password(&info.password)?;
    let specialty = crate::utils::required(&info.specialty, "Specialty")?;
    if info.experience_years < 0 {
        return Err(ApiError::BadRequest(
            "Experience years cannot be negative".to_string(),
        ));
    }

    let now = crate::utils::now();
    let user_data = NewUser {
        email,
        password: password::hash_password(&info.password)?,
        name,
        phone: crate::utils::optional(info.phone),
        role: Role::Doctor.as_str().to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let mut conn = get_db_conn(&pool)?;
    let doctor = web::block(move || {
        conn.transaction::<_, ApiError, _>(|conn| {
            let user = insert_user(conn, user_data)?;
            let data = NewDoctor {
                user_id: user.id,
                specialty,
                department: crate::utils::optional(info.department),
                qualification: crate::utils::optional(info.qualification),
                experience_years: info.experience_years,
                bio: crate::utils::optional(info.bio),
                image_url: crate::utils::optional(info.image_url),
                is_available: info.is_available,
                created_at: now,
                updated_at: now,
            };
            let doctor = diesel::insert_into(doctors::table)
                .values(&data)
                .get_result::<Doctor>(conn)?;
            Ok((doctor, user))
        })
    })
    .await??;
    info!(doctor_id = doctor.0.id, "doctor created");

    Ok(DoctorResponse {
        doctor: doctor.into(),
    })
}

async fn update_doctor_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
    info: web::Json<UpdateDoctorRequest>,
) -> Result<DoctorResponse, ApiError> {
    use crate::schema::{doctors, users};

    auth.require_admin()?;
    let doctor_id = path.into_inner();
    let info = info.into_inner();
    if matches!(info.experience_years, Some(years) if years < 0) {
        return Err(ApiError::BadRequest(
            "Experience years cannot be negative".to_string(),
        ));
    }

    let now = crate::utils::now();
    let user_data = UpdateUser {
        name: info
            .name
            .map(|name| crate::utils::required(name, "Name"))
            .transpose()?,
        phone: crate::utils::optional(info.phone),
        updated_at: Some(now),
        ..Default::default()
    };
    let doctor_data = UpdateDoctor {
        specialty: info
            .specialty
            .map(|specialty| crate::utils::required(specialty, "Specialty"))
            .transpose()?,
        department: crate::utils::optional(info.department),
        qualification: crate::utils::optional(info.qualification),
        experience_years: info.experience_years,
        bio: crate::utils::optional(info.bio),
        image_url: crate::utils::optional(info.image_url),
        is_available: info.is_available,
        updated_at: Some(now),
    };

    let mut conn = get_db_conn(&pool)?;
    let doctor = web::block(move || {
        conn.transaction::<_, ApiError, _>(|conn| {
            let (doctor, _) = find_doctor(conn, doctor_id)?;
            diesel::update(doctors::table.find(doctor.id))
                .set(&doctor_data)
                .execute(conn)?;
            diesel::update(users::table.find(doctor.user_id))
                .set(&user_data)
                .execute(conn)?;
            find_doctor(conn, doctor_id)
        })
    })
    .await??;

    Ok(DoctorResponse {
        doctor: doctor.into(),
    })
}

async fn delete_doctor_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<MessageResponse, ApiError> {
    use crate::schema::users;

    auth.require_admin()?;
    let doctor_id = path.into_inner();

    let mut conn = get_db_conn(&pool)?;
    web::block(move || {
        conn.transaction::<_, ApiError, _>(|conn| {
            let (doctor, _) = find_doctor(conn, doctor_id)?;
            diesel::delete(users::table.find(doctor.user_id)).execute(conn)?;
            Ok(())
        })
    })
    .await??;
    info!(doctor_id, "doctor deleted");

    Ok(MessageResponse::ok("Doctor deleted"))
}

/// Checks a weekly schedule and turns it into rows for `doctor_id`.
fn validate_schedules(
    doctor_id: i32,
    inputs: Vec<ScheduleInput>,
) -> Result<Vec<NewSchedule>, ApiError> {
    let mut seen = [false; 7];
    let mut schedules = Vec::with_capacity(inputs.len());
    for input in inputs {
        if !(0..7).contains(&input.day_of_week) {
            return Err(ApiError::BadRequest(format!(
                "Invalid day of week: {}",
                input.day_of_week
            )));
        }
        let day = input.day_of_week as usize;
        if seen[day] {
            return Err(ApiError::BadRequest(format!(
                "Duplicate schedule for {}",
                DAY_NAMES[day]
            )));
        }
        seen[day] = true;

        let start_time = crate::utils::parse_time(&input.start_time)?;
        let end_time = crate::utils::parse_time(&input.end_time)?;
        if start_time >= end_time {
            return Err(ApiError::BadRequest(format!(
                "Start time must be before end time on {}",
                DAY_NAMES[day]
            )));
        }
        let max_patients = input.max_patients.unwrap_or(16);
        if max_patients <= 0 {
            return Err(ApiError::BadRequest(
                "Max patients must be positive".to_string(),
            ));
        }

        schedules.push(NewSchedule {
            doctor_id,
            day_of_week: input.day_of_week,
            start_time,
            end_time,
            max_patients,
        });
    }
    Ok(schedules)
}

async fn set_schedules_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
    info: web::Json<SetSchedulesRequest>,
) -> Result<SchedulesResponse, ApiError> {
    use crate::schema::doctor_schedules;

    auth.require_admin()?;
    let doctor_id = path.into_inner();
    let data = validate_schedules(doctor_id, info.into_inner().schedules)?;
    assert::assert_doctor(&pool, doctor_id).await?;

    let mut conn = get_db_conn(&pool)?;
    let schedules = web::block(move || {
        conn.transaction::<_, ApiError, _>(|conn| {
            diesel::delete(
                doctor_schedules::table.filter(doctor_schedules::doctor_id.eq(doctor_id)),
            )
            .execute(conn)?;
            diesel::insert_into(doctor_schedules::table)
                .values(&data)
                .execute(conn)?;
            Ok(doctor_schedules::table
                .filter(doctor_schedules::doctor_id.eq(doctor_id))
                .order(doctor_schedules::day_of_week.asc())
                .load::<Schedule>(conn)?)
        })
    })
    .await??;
    info!(doctor_id, days = schedules.len(), "doctor schedules replaced");

    Ok(SchedulesResponse {
        schedules: schedules.into_iter().map(ScheduleItem::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(day: i32, start: &str, end: &str, max: Option<i32>) -> ScheduleInput {
        ScheduleInput {
            day_of_week: day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            max_patients: max,
        }
    }

    #[test]
    fn schedules_default_max_patients() {
        let rows = validate_schedules(3, vec![input(1, "09:00", "12:00", None)]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].doctor_id, 3);
        assert_eq!(rows[0].max_patients, 16);
    }

    #[test]
    fn schedules_reject_bad_input() {
        assert!(validate_schedules(1, vec![input(7, "09:00", "12:00", None)]).is_err());
        assert!(validate_schedules(1, vec![input(1, "12:00", "09:00", None)]).is_err());
        assert!(validate_schedules(1, vec![input(1, "09:00", "12:00", Some(0))]).is_err());
        assert!(validate_schedules(
            1,
            vec![
                input(2, "09:00", "12:00", None),
                input(2, "13:00", "17:00", None)
            ]
        )
        .is_err());
    }
}
