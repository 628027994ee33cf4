use serde::Serialize;

use crate::models::jobs::Job;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobItem {
    pub id: i32,
    pub title: String,
    pub department: String,
    pub location: String,
    pub employment_type: String,
    pub description: String,
    pub requirements: Option<String>,
    pub salary_range: Option<String>,
    pub deadline: Option<String>,
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_count: Option<i64>,
}

impl From<Job> for JobItem {
    fn from(data: Job) -> Self {
        Self {
            id: data.id,
            title: data.title,
            department: data.department,
            location: data.location,
            employment_type: data.employment_type,
            description: data.description,
            requirements: data.requirements,
            salary_range: data.salary_range,
            deadline: data.deadline.as_ref().map(crate::utils::format_date),
            is_active: data.is_active,
            created_by: data.created_by,
            created_at: crate::utils::format_time_str(&data.created_at),
            updated_at: crate::utils::format_time_str(&data.updated_at),
            application_count: None,
        }
    }
}

#[derive(Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<JobItem>,
}

#[derive(Serialize)]
pub struct JobResponse {
    pub job: JobItem,
}
