use crate::schema::jobs;
use diesel::prelude::*;
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Queryable, Clone)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub department: String,
    pub location: String,
    pub employment_type: String,
    pub description: String,
    pub requirements: Option<String>,
    pub salary_range: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = jobs)]
pub struct NewJob {
    pub title: String,
    pub department: String,
    pub location: String,
    pub employment_type: String,
    pub description: String,
    pub requirements: Option<String>,
    pub salary_range: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = jobs)]
pub struct UpdateJob {
    pub title: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub salary_range: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub is_active: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Job {
    /// A job accepts applications while active and until the end of its deadline day.
    pub fn is_open(&self, today: NaiveDate) -> bool {
        self.is_active && self.deadline.map_or(true, |deadline| deadline >= today)
    }
}
