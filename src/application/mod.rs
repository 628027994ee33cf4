mod requests;
mod responses;

use std::collections::HashMap;

use crate::{
    auth::AuthUser,
    database::{assert, get_db_conn},
    error::ApiError,
    models::{
        job_applications::{
            ApplicationStatus, JobApplication, NewJobApplication, UpdateJobApplication,
        },
        jobs::Job,
        users::Role,
    },
    protocol::{MessageResponse, PageQuery},
    schema::job_applications,
    DbPool,
};
use actix_web::{delete, get, post, put, web};
use diesel::{prelude::*, sqlite::Sqlite, SqliteConnection};
use tracing::info;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(apply)
        .service(my_applications)
        .service(check_application)
        .service(list_applications)
        .service(view_application)
        .service(update_status)
        .service(delete_application);
}

crate::api_funcs! {
    (post, apply, "", Created, (pool: web::Data<DbPool>, auth: AuthUser, info: web::Json<ApplyRequest>)),
    (get, my_applications, "/my", Ok, (pool: web::Data<DbPool>, auth: AuthUser)),
    (get, check_application, "/check/{job_id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>)),
    (get, list_applications, "", Ok, (pool: web::Data<DbPool>, auth: AuthUser, info: web::Query<ApplicationListQuery>, page: web::Query<PageQuery>)),
    (get, view_application, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>)),
    (put, update_status, "/{id}/status", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>, info: web::Json<UpdateApplicationStatusRequest>)),
    (delete, delete_application, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>)),
}

fn attach_jobs(
    conn: &mut SqliteConnection,
    rows: Vec<JobApplication>,
) -> QueryResult<Vec<ApplicationItem>> {
    use crate::schema::jobs;

    let job_ids: Vec<i32> = rows.iter().map(|a| a.job_id).collect();
    let jobs: HashMap<i32, Job> = jobs::table
        .filter(jobs::id.eq_any(job_ids))
        .load::<Job>(conn)?
        .into_iter()
        .map(|job| (job.id, job))
        .collect();

    Ok(rows
        .into_iter()
        .filter_map(|data| {
            let job = jobs.get(&data.job_id)?.clone();
            Some(ApplicationItem::from((data, job)))
        })
        .collect())
}

fn find_application(
    conn: &mut SqliteConnection,
    application_id: i32,
) -> Result<ApplicationItem, ApiError> {
    use crate::schema::jobs;

    job_applications::table
        .inner_join(jobs::table)
        .filter(job_applications::id.eq(application_id))
        .first::<(JobApplication, Job)>(conn)
        .optional()?
        .map(ApplicationItem::from)
        .ok_or_else(|| ApiError::not_found("Application"))
}

async fn apply_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    info: web::Json<ApplyRequest>,
) -> Result<ApplicationResponse, ApiError> {
    use crate::schema::jobs;

    auth.require(&[Role::Patient])?;
    let info = info.into_inner();
    let now = crate::utils::now();
    let data = NewJobApplication {
        job_id: info.job_id,
        user_id: auth.id,
        full_name: crate::utils::required(&info.full_name, "Full name")?,
        email: crate::auth::normalize_email(&info.email)?,
        phone: crate::utils::optional(info.phone),
        cover_letter: crate::utils::optional(info.cover_letter),
        resume_url: crate::utils::optional(info.resume_url),
        status: ApplicationStatus::Pending.as_str().to_string(),
        created_at: now,
        updated_at: now,
    };
    let today = crate::utils::today();

    let mut conn = get_db_conn(&pool)?;
    let application = web::block(move || {
        conn.immediate_transaction::<_, ApiError, _>(|conn| {
            let job = jobs::table
                .find(data.job_id)
                .first::<Job>(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found("Job"))?;
            if !job.is_open(today) {
                return Err(ApiError::BadRequest(
                    "This job is no longer accepting applications".to_string(),
                ));
            }

            let res = job_applications::table
                .filter(job_applications::job_id.eq(data.job_id))
                .filter(job_applications::user_id.eq(data.user_id))
                .count()
                .get_result::<i64>(conn)?;
            if res > 0 {
                return Err(ApiError::Conflict(
                    "You have already applied for this job".to_string(),
                ));
            }

            let application = diesel::insert_into(job_applications::table)
                .values(&data)
                .get_result::<JobApplication>(conn)?;
            Ok(ApplicationItem::from((application, job)))
        })
    })
    .await??;
    info!(
        application_id = application.id,
        job_id = application.job_id,
        user_id = auth.id,
        "job application submitted"
    );

    Ok(ApplicationResponse { application })
}

async fn my_applications_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
) -> Result<ApplicationsResponse, ApiError> {
    let mut conn = get_db_conn(&pool)?;
    let applications = web::block(move || {
        let rows = job_applications::table
            .filter(job_applications::user_id.eq(auth.id))
            .order(job_applications::created_at.desc())
            .load::<JobApplication>(&mut conn)?;
        attach_jobs(&mut conn, rows)
    })
    .await??;

    Ok(ApplicationsResponse { applications })
}

async fn check_application_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<CheckApplicationResponse, ApiError> {
    let job_id = path.into_inner();
    let mut conn = get_db_conn(&pool)?;
    let status = web::block(move || {
        job_applications::table
            .filter(job_applications::job_id.eq(job_id))
            .filter(job_applications::user_id.eq(auth.id))
            .select(job_applications::status)
            .first::<String>(&mut conn)
            .optional()
    })
    .await??;

    Ok(CheckApplicationResponse {
        applied: status.is_some(),
        status,
    })
}

struct ApplicationFilter {
    status: Option<ApplicationStatus>,
    job_id: Option<i32>,
}

impl ApplicationFilter {
    fn query(&self) -> job_applications::BoxedQuery<'static, Sqlite> {
        let mut query = job_applications::table.into_boxed();
        if let Some(status) = self.status {
            query = query.filter(job_applications::status.eq(status.as_str()));
        }
        if let Some(job_id) = self.job_id {
            query = query.filter(job_applications::job_id.eq(job_id));
        }
        query
    }
}

async fn list_applications_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    info: web::Query<ApplicationListQuery>,
    page: web::Query<PageQuery>,
) -> Result<ApplicationListResponse, ApiError> {
    auth.require_staff()?;
    let info = info.into_inner();
    let filter = ApplicationFilter {
        status: crate::utils::optional(info.status)
            .map(|s| s.parse::<ApplicationStatus>())
            .transpose()?,
        job_id: info.job_id,
    };
    let (offset, limit) = (page.offset(), page.limit());

    let mut conn = get_db_conn(&pool)?;
    let (applications, total) = web::block(move || {
        let total = filter.query().count().get_result::<i64>(&mut conn)?;
        let rows = filter
            .query()
            .order(job_applications::created_at.desc())
            .offset(offset)
            .limit(limit)
            .load::<JobApplication>(&mut conn)?;
        Ok::<_, diesel::result::Error>((attach_jobs(&mut conn, rows)?, total))
    })
    .await??;

    Ok(ApplicationListResponse {
        applications,
        total,
    })
}

async fn view_application_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<ApplicationResponse, ApiError> {
    auth.require_staff()?;
    let application_id = path.into_inner();

    let mut conn = get_db_conn(&pool)?;
    let application = web::block(move || find_application(&mut conn, application_id)).await??;

    Ok(ApplicationResponse { application })
}

async fn update_status_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
    info: web::Json<UpdateApplicationStatusRequest>,
) -> Result<ApplicationResponse, ApiError> {
    auth.require_staff()?;
    let application_id = path.into_inner();
    let info = info.into_inner();
    let status: ApplicationStatus = info.status.trim().parse()?;
    assert::assert_application(&pool, application_id).await?;

    let data = UpdateJobApplication {
        status: Some(status.as_str().to_string()),
        hr_notes: crate::utils::optional(info.hr_notes),
        updated_at: Some(crate::utils::now()),
    };

    let mut conn = get_db_conn(&pool)?;
    let application = web::block(move || {
        diesel::update(job_applications::table.find(application_id))
            .set(&data)
            .execute(&mut conn)?;
        find_application(&mut conn, application_id)
    })
    .await??;
    info!(application_id, status = %status, reviewer = auth.id, "application status updated");

    Ok(ApplicationResponse { application })
}

async fn delete_application_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<MessageResponse, ApiError> {
    auth.require_staff()?;
    let application_id = path.into_inner();
    assert::assert_application(&pool, application_id).await?;

    let mut conn = get_db_conn(&pool)?;
    web::block(move || {
        diesel::delete(job_applications::table.find(application_id)).execute(&mut conn)
    })
    .await??;
    info!(application_id, "application deleted");

    Ok(MessageResponse::ok("Application deleted"))
}
