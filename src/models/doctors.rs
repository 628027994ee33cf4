use crate::schema::doctors;
use diesel::prelude::*;
use chrono::NaiveDateTime;

#[derive(Queryable, Identifiable, Clone)]
#[diesel(table_name = doctors)]
pub struct Doctor {
    pub id: i32,
    pub user_id: i32,
    pub specialty: String,
    pub department: Option<String>,
    pub qualification: Option<String>,
    pub experience_years: i32,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = doctors)]
pub struct NewDoctor {
    pub user_id: i32,
    pub specialty: String,
    pub department: Option<String>,
    pub qualification: Option<String>,
    pub experience_years: i32,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = doctors)]
pub struct UpdateDoctor {
    pub specialty: Option<String>,
    pub department: Option<String>,
    pub qualification: Option<String>,
    pub experience_years: Option<i32>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
}
