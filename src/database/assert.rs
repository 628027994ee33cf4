use actix_web::web;
use diesel::prelude::*;

use crate::{database::get_db_conn, error::ApiError, DbPool};

pub async fn assert_user(pool: &web::Data<DbPool>, user_id: i32) -> Result<(), ApiError> {
    use crate::schema::users;

    let mut conn = get_db_conn(pool)?;
    let res = web::block(move || {
        users::table
            .filter(users::id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)
    })
    .await??;

    if res == 0 {
        return Err(ApiError::not_found("User"));
    }

    Ok(())
}

pub async fn assert_doctor(pool: &web::Data<DbPool>, doctor_id: i32) -> Result<(), ApiError> {
    use crate::schema::doctors;

    let mut conn = get_db_conn(pool)?;
    let res = web::block(move || {
        doctors::table
            .filter(doctors::id.eq(doctor_id))
            .count()
            .get_result::<i64>(&mut conn)
    })
    .await??;

    if res == 0 {
        return Err(ApiError::not_found("Doctor"));
    }

    Ok(())
}

pub async fn assert_job(pool: &web::Data<DbPool>, job_id: i32) -> Result<(), ApiError> {
    use crate::schema::jobs;

    let mut conn = get_db_conn(pool)?;
    let res = web::block(move || {
        jobs::table
            .filter(jobs::id.eq(job_id))
            .count()
            .get_result::<i64>(&mut conn)
    })
    .await??;

    if res == 0 {
        return Err(ApiError::not_found("Job"));
    }

    Ok(())
}

pub async fn assert_appointment(
    pool: &web::Data<DbPool>,
    appointment_id: i32,
) -> Result<(), ApiError> {
    use crate::schema::appointments;

    let mut conn = get_db_conn(pool)?;
    let res = web::block(move || {
        appointments::table
            .filter(appointments::id.eq(appointment_id))
            .count()
            .get_result::<i64>(&mut conn)
    })
    .await??;

    if res == 0 {
        return Err(ApiError::not_found("Appointment"));
    }

    Ok(())
}

pub async fn assert_application(
    pool: &web::Data<DbPool>,
    application_id: i32,
) -> Result<(), ApiError> {
    use crate::schema::job_applications;

    let mut conn = get_db_conn(pool)?;
    let res = web::block(move || {
        job_applications::table
            .filter(job_applications::id.eq(application_id))
            .count()
            .get_result::<i64>(&mut conn)
    })
    .await??;

    if res == 0 {
        return Err(ApiError::not_found("Application"));
    }

    Ok(())
}

pub async fn assert_story(pool: &web::Data<DbPool>, story_id: i32) -> Result<(), ApiError> {
    use crate::schema::sch_stories;

    let mut conn = get_db_conn(pool)?;
    let res = web::block(move || {
        sch_stories::table
            .filter(sch_stories::id.eq(story_id))
            .count()
            .get_result::<i64>(&mut conn)
    })
    .await??;

    if res == 0 {
        return Err(ApiError::not_found("Story"));
    }

    Ok(())
}
