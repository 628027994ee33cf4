use crate::schema::sch_stories;
use diesel::prelude::*;
use chrono::NaiveDateTime;

#[derive(Queryable, Clone)]
pub struct Story {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = sch_stories)]
pub struct NewStory {
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = sch_stories)]
pub struct UpdateStory {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
}
