use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: i64,
    pub by_role: BTreeMap<&'static str, i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentStats {
    pub total: i64,
    pub today: i64,
    pub by_status: BTreeMap<&'static str, i64>,
}

#[derive(Serialize)]
pub struct JobStats {
    pub total: i64,
    pub active: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStats {
    pub doctors: i64,
    pub published_news: i64,
    pub active_services: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub users: UserStats,
    pub appointments: AppointmentStats,
    pub jobs: JobStats,
    pub applications: i64,
    pub content: ContentStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplicationCount {
    pub job_id: i32,
    pub title: String,
    pub is_active: bool,
    pub applications: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruitmentResponse {
    pub total_applications: i64,
    pub by_status: BTreeMap<&'static str, i64>,
    pub by_job: Vec<JobApplicationCount>,
}
