use serde::Serialize;

use crate::models::{job_applications::JobApplication, jobs::Job};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationItem {
    pub id: i32,
    pub job_id: i32,
    pub job_title: String,
    pub department: String,
    pub user_id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: String,
    pub hr_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<(JobApplication, Job)> for ApplicationItem {
    fn from((data, job): (JobApplication, Job)) -> Self {
        Self {
            id: data.id,
            job_id: job.id,
            job_title: job.title,
            department: job.department,
            user_id: data.user_id,
            full_name: data.full_name,
            email: data.email,
            phone: data.phone,
            cover_letter: data.cover_letter,
            resume_url: data.resume_url,
            status: data.status,
            hr_notes: data.hr_notes,
            created_at: crate::utils::format_time_str(&data.created_at),
            updated_at: crate::utils::format_time_str(&data.updated_at),
        }
    }
}

#[derive(Serialize)]
pub struct ApplicationResponse {
    pub application: ApplicationItem,
}

#[derive(Serialize)]
pub struct ApplicationsResponse {
    pub applications: Vec<ApplicationItem>,
}

#[derive(Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationItem>,
    pub total: i64,
}

#[derive(Serialize)]
pub struct CheckApplicationResponse {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
