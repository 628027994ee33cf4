mod requests;
mod responses;

use std::collections::HashMap;

use crate::{
    auth::AuthUser,
    database::{assert, get_db_conn},
    error::ApiError,
    models::jobs::{Job, NewJob, UpdateJob},
    protocol::MessageResponse,
    utils::LIKE_ESCAPE,
    DbPool,
};
use actix_web::{delete, get, post, put, web};
use diesel::{dsl::count_star, prelude::*, SqliteConnection};
use tracing::info;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(search_job)
        .service(all_jobs)
        .service(view_job)
        .service(create_job)
        .service(update_job)
        .service(delete_job);
}

crate::api_funcs! {
    (get, search_job, "", Ok, (pool: web::Data<DbPool>, info: web::Query<SearchJobQuery>)),
    (get, all_jobs, "/all", Ok, (pool: web::Data<DbPool>, auth: AuthUser)),
    (get, view_job, "/{id}", Ok, (pool: web::Data<DbPool>, path: web::Path<i32>)),
    (post, create_job, "", Created, (pool: web::Data<DbPool>, auth: AuthUser, info: web::Json<CreateJobRequest>)),
    (put, update_job, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>, info: web::Json<UpdateJobRequest>)),
    (delete, delete_job, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>)),
}

/// Number of applications per job id. Jobs without applications are absent.
pub(crate) fn application_counts(conn: &mut SqliteConnection) -> QueryResult<HashMap<i32, i64>> {
    use crate::schema::job_applications;

    Ok(job_applications::table
        .group_by(job_applications::job_id)
        .select((job_applications::job_id, count_star()))
        .load::<(i32, i64)>(conn)?
        .into_iter()
        .collect())
}

async fn search_job_impl(
    pool: web::Data<DbPool>,
    info: web::Query<SearchJobQuery>,
) -> Result<JobsResponse, ApiError> {
    use crate::schema::jobs;

    let info = info.into_inner();
    let department_pattern = crate::utils::get_str_pattern_opt(info.department);
    let title_pattern = crate::utils::get_str_pattern_opt(info.search);
    let today = crate::utils::today();

    let mut conn = get_db_conn(&pool)?;
    let jobs = web::block(move || {
        jobs::table
            .filter(jobs::is_active.eq(true))
            .filter(jobs::deadline.is_null().or(jobs::deadline.ge(today)))
            .filter(jobs::department.like(department_pattern).escape(LIKE_ESCAPE))
            .filter(jobs::title.like(title_pattern).escape(LIKE_ESCAPE))
            .order(jobs::created_at.desc())
            .load::<Job>(&mut conn)
    })
    .await??;

    Ok(JobsResponse {
        jobs: jobs.into_iter().map(JobItem::from).collect(),
    })
}

async fn all_jobs_impl(pool: web::Data<DbPool>, auth: AuthUser) -> Result<JobsResponse, ApiError> {
    use crate::schema::jobs;

    auth.require_staff()?;

    let mut conn = get_db_conn(&pool)?;
    let (jobs, counts) = web::block(move || {
        let jobs = jobs::table
            .order(jobs::created_at.desc())
            .load::<Job>(&mut conn)?;
        let counts = application_counts(&mut conn)?;
        Ok::<_, diesel::result::Error>((jobs, counts))
    })
    .await??;

    Ok(JobsResponse {
        jobs: jobs
            .into_iter()
            .map(|job| {
                let count = counts.get(&job.id).copied().unwrap_or(0);
                JobItem {
                    application_count: Some(count),
                    ..JobItem::from(job)
                }
            })
            .collect(),
    })
}

async fn view_job_impl(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<JobResponse, ApiError> {
    use crate::schema::jobs;

    let job_id = path.into_inner();
    let mut conn = get_db_conn(&pool)?;
    let job = web::block(move || {
        jobs::table
            .find(job_id)
            .filter(jobs::is_active.eq(true))
            .first::<Job>(&mut conn)
            .optional()
    })
    .await??
    .ok_or_else(|| ApiError::not_found("Job"))?;

    Ok(JobResponse { job: job.into() })
}

async fn create_job_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    info: web::Json<CreateJobRequest>,
) -> Result<JobResponse, ApiError> {
    use crate::schema::jobs;

    auth.require_staff()?;
    let info = info.into_inner();
    let now = crate::utils::now();
    let data = NewJob {
        title: crate::utils::required(&info.title, "Title")?,
        department: crate::utils::required(&info.department, "Department")?,
        location: crate::utils::required(&info.location, "Location")?,
        employment_type: crate::utils::required(&info.employment_type, "Employment type")?,
        description: crate::utils::required(&info.description, "Description")?,
        requirements: crate::utils::optional(info.requirements),
        salary_range: crate::utils::optional(info.salary_range),
        deadline: crate::utils::parse_date_opt(info.deadline)?,
        is_active: info.is_active,
        created_by: Some(auth.id),
        created_at: now,
        updated_at: now,
    };

    let mut conn = get_db_conn(&pool)?;
    let job = web::block(move || {
        diesel::insert_into(jobs::table)
            .values(&data)
            .get_result::<Job>(&mut conn)
    })
    .await??;
    info!(job_id = job.id, created_by = auth.id, "job posted");

    Ok(JobResponse { job: job.into() })
}

async fn update_job_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
    info: web::Json<UpdateJobRequest>,
) -> Result<JobResponse, ApiError> {
    use crate::schema::jobs;

    auth.require_staff()?;
    let job_id = path.into_inner();
    let info = info.into_inner();

    let data = UpdateJob {
        title: info
            .title
            .map(|v| crate::utils::required(v, "Title"))
            .transpose()?,
        department: info
            .department
            .map(|v| crate::utils::required(v, "Department"))
            .transpose()?,
        location: info
            .location
            .map(|v| crate::utils::required(v, "Location"))
            .transpose()?,
        employment_type: info
            .employment_type
            .map(|v| crate::utils::required(v, "Employment type"))
            .transpose()?,
        description: info
            .description
            .map(|v| crate::utils::required(v, "Description"))
            .transpose()?,
        requirements: crate::utils::optional(info.requirements),
        salary_range: crate::utils::optional(info.salary_range),
        deadline: crate::utils::parse_date_opt(info.deadline)?,
        is_active: info.is_active,
        updated_at: Some(crate::utils::now()),
    };
    assert::assert_job(&pool, job_id).await?;

    let mut conn = get_db_conn(&pool)?;
    let job = web::block(move || {
        diesel::update(jobs::table.find(job_id))
            .set(&data)
            .get_result::<Job>(&mut conn)
    })
    .await??;

    Ok(JobResponse { job: job.into() })
}

async fn delete_job_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<MessageResponse, ApiError> {
    use crate::schema::jobs;

    auth.require_staff()?;
    let job_id = path.into_inner();
    assert::assert_job(&pool, job_id).await?;

    let mut conn = get_db_conn(&pool)?;
    web::block(move || diesel::delete(jobs::table.find(job_id)).execute(&mut conn)).await??;
    info!(job_id, "job deleted");

    Ok(MessageResponse::ok("Job deleted"))
}
