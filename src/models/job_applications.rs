use crate::schema::job_applications;
use diesel::prelude::*;
use chrono::NaiveDateTime;

#[derive(Queryable, Clone)]
pub struct JobApplication {
    pub id: i32,
    pub job_id: i32,
    pub user_id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: String,
    pub hr_notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = job_applications)]
pub struct NewJobApplication {
    pub job_id: i32,
    pub user_id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = job_applications)]
pub struct UpdateJobApplication {
    pub status: Option<String>,
    pub hr_notes: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

string_enum!(ApplicationStatus, "application status" {
    Pending => "pending",
    Reviewing => "reviewing",
    Interviewed => "interviewed",
    Accepted => "accepted",
    Rejected => "rejected",
});
