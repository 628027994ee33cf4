mod responses;

use std::collections::BTreeMap;

use crate::{
    auth::AuthUser,
    database::get_db_conn,
    error::ApiError,
    models::{
        appointments::AppointmentStatus, job_applications::ApplicationStatus, users::Role,
    },
    DbPool,
};
use actix_web::{get, web};
use diesel::{dsl::count_star, prelude::*};

use self::responses::*;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(overview).service(recruitment);
}

crate::api_funcs! {
    (get, overview, "/overview", Ok, (pool: web::Data<DbPool>, auth: AuthUser)),
    (get, recruitment, "/recruitment", Ok, (pool: web::Data<DbPool>, auth: AuthUser)),
}

/// Zero-filled counts keyed by every known value; unknown stored values are dropped.
fn tally<I>(known: I, rows: Vec<(String, i64)>) -> BTreeMap<&'static str, i64>
where
    I: IntoIterator<Item = &'static str>,
{
    let mut counts: BTreeMap<&'static str, i64> = known.into_iter().map(|k| (k, 0)).collect();
    for (value, count) in rows {
        if let Some(slot) = counts.get_mut(value.as_str()) {
            *slot += count;
        }
    }
    counts
}

async fn overview_impl(pool: web::Data<DbPool>, auth: AuthUser) -> Result<OverviewResponse, ApiError> {
    use crate::schema::{appointments, doctors, job_applications, jobs, news, services, users};

    auth.require_admin()?;
    let today = crate::utils::today();

    let mut conn = get_db_conn(&pool)?;
    let res = web::block(move || {
        let roles = users::table
            .group_by(users::role)
            .select((users::role, count_star()))
            .load::<(String, i64)>(&mut conn)?;
        let statuses = appointments::table
            .group_by(appointments::status)
            .select((appointments::status, count_star()))
            .load::<(String, i64)>(&mut conn)?;
        let appointments_today = appointments::table
            .filter(appointments::appointment_date.eq(today))
            .count()
            .get_result::<i64>(&mut conn)?;
        let jobs_total = jobs::table.count().get_result::<i64>(&mut conn)?;
        let jobs_active = jobs::table
            .filter(jobs::is_active.eq(true))
            .count()
            .get_result::<i64>(&mut conn)?;
        let applications = job_applications::table
            .count()
            .get_result::<i64>(&mut conn)?;
        let doctors = doctors::table.count().get_result::<i64>(&mut conn)?;
        let published_news = news::table
            .filter(news::is_published.eq(true))
            .count()
            .get_result::<i64>(&mut conn)?;
        let active_services = services::table
            .filter(services::is_active.eq(true))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok::<_, diesel::result::Error>(OverviewResponse {
            users: UserStats {
                total: roles.iter().map(|(_, n)| n).sum(),
                by_role: tally(Role::ALL.iter().map(|r| r.as_str()), roles),
            },
            appointments: AppointmentStats {
                total: statuses.iter().map(|(_, n)| n).sum(),
                today: appointments_today,
                by_status: tally(AppointmentStatus::ALL.iter().map(|s| s.as_str()), statuses),
            },
            jobs: JobStats {
                total: jobs_total,
                active: jobs_active,
            },
            applications,
            content: ContentStats {
                doctors,
                published_news,
                active_services,
            },
        })
    })
    .await??;

    Ok(res)
}

async fn recruitment_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
) -> Result<RecruitmentResponse, ApiError> {
    use crate::schema::{job_applications, jobs};

    auth.require_staff()?;

    let mut conn = get_db_conn(&pool)?;
    let res = web::block(move || {
        let statuses = job_applications::table
            .group_by(job_applications::status)
            .select((job_applications::status, count_star()))
            .load::<(String, i64)>(&mut conn)?;
        let counts = crate::job::application_counts(&mut conn)?;
        let jobs = jobs::table
            .select((jobs::id, jobs::title, jobs::is_active))
            .load::<(i32, String, bool)>(&mut conn)?;

        let mut by_job: Vec<JobApplicationCount> = jobs
            .into_iter()
            .map(|(job_id, title, is_active)| JobApplicationCount {
                job_id,
                title,
                is_active,
                applications: counts.get(&job_id).copied().unwrap_or(0),
            })
            .collect();
        by_job.sort_by(|a, b| {
            b.applications
                .cmp(&a.applications)
                .then_with(|| a.job_id.cmp(&b.job_id))
        });

        Ok::<_, diesel::result::Error>(RecruitmentResponse {
            total_applications: statuses.iter().map(|(_, n)| n).sum(),
            by_status: tally(ApplicationStatus::ALL.iter().map(|s| s.as_str()), statuses),
            by_job,
        })
    })
    .await??;

    Ok(res)
}
